//! WebSocket relay client.
//!
//! One connection per query: `REQ` is sent, `EVENT`s are collected until the
//! relay signals `EOSE` (or `CLOSED`), then the subscription is closed and
//! the socket dropped. Deadlines are the caller's concern.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};
use zapstore_schema::{Event, Filter};

use crate::error::{Error, Result};
use crate::source::EventSource;

/// Relay endpoint used when none is configured.
pub const DEFAULT_RELAY: &str = "wss://relay.zapstore.dev";

/// Queries a single relay.
#[derive(Debug, Clone)]
pub struct RelayClient {
    url: String,
}

impl RelayClient {
    /// Client for the relay at `url` (`wss://` or `ws://`).
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Relay URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// A relay-to-client message this client cares about.
#[derive(Debug, PartialEq)]
enum RelayMessage {
    Event(Box<Event>),
    EndOfStored,
    Closed(String),
    Notice(String),
    Other,
}

fn parse_message(text: &str, sub_id: &str) -> Result<RelayMessage, serde_json::Error> {
    let frame: Vec<Value> = serde_json::from_str(text)?;
    let label = frame.first().and_then(Value::as_str).unwrap_or_default();
    let for_us = frame.get(1).and_then(Value::as_str) == Some(sub_id);

    Ok(match label {
        "EVENT" if for_us => match frame.get(2) {
            Some(ev) => RelayMessage::Event(Box::new(serde_json::from_value(ev.clone())?)),
            None => RelayMessage::Other,
        },
        "EOSE" if for_us => RelayMessage::EndOfStored,
        "CLOSED" if for_us => RelayMessage::Closed(
            frame
                .get(2)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        ),
        "NOTICE" => RelayMessage::Notice(
            frame
                .get(1)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        ),
        _ => RelayMessage::Other,
    })
}

fn subscription_id() -> String {
    format!("zap-{:016x}", rand::random::<u64>())
}

#[async_trait]
impl EventSource for RelayClient {
    async fn query(&self, filter: &Filter) -> Result<Vec<Event>> {
        let ctx = || format!("querying relay {}", self.url);

        let (mut ws, _) = connect_async(self.url.as_str())
            .await
            .map_err(|e| Error::transport(format!("connecting to relay {}", self.url), e))?;

        let sub_id = subscription_id();
        let req = json!(["REQ", &sub_id, filter.to_json()]).to_string();
        debug!(relay = %self.url, %req, "subscribing");
        ws.send(Message::Text(req))
            .await
            .map_err(|e| Error::transport(ctx(), e))?;

        let mut events = Vec::new();
        while let Some(msg) = ws.next().await {
            let text = match msg.map_err(|e| Error::transport(ctx(), e))? {
                Message::Text(text) => text,
                Message::Close(_) => break,
                _ => continue,
            };

            match parse_message(&text, &sub_id) {
                Ok(RelayMessage::Event(ev)) => events.push(*ev),
                Ok(RelayMessage::EndOfStored) => break,
                Ok(RelayMessage::Closed(reason)) => {
                    return Err(Error::transport(
                        ctx(),
                        format!("subscription closed by relay: {reason}"),
                    ));
                }
                Ok(RelayMessage::Notice(notice)) => warn!(relay = %self.url, %notice, "relay notice"),
                Ok(RelayMessage::Other) => {}
                Err(e) => debug!(relay = %self.url, error = %e, "ignoring malformed frame"),
            }
        }

        let close = json!(["CLOSE", &sub_id]).to_string();
        if let Err(e) = ws.send(Message::Text(close)).await {
            debug!(relay = %self.url, error = %e, "failed to close subscription");
        }
        if let Err(e) = ws.close(None).await {
            debug!(relay = %self.url, error = %e, "failed to close connection");
        }

        debug!(relay = %self.url, count = events.len(), "query complete");
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_event_for_subscription() {
        let text = r#"["EVENT","s1",{"id":"e1","pubkey":"pk","created_at":1,"kind":32267,"tags":[["d","foo"]],"content":"","sig":"00"}]"#;
        match parse_message(text, "s1").unwrap() {
            RelayMessage::Event(ev) => {
                assert_eq!(ev.id, "e1");
                assert_eq!(ev.tag_value("d"), Some("foo"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_ignores_other_subscriptions() {
        let text = r#"["EOSE","other"]"#;
        assert_eq!(parse_message(text, "s1").unwrap(), RelayMessage::Other);
        assert_eq!(
            parse_message(r#"["EOSE","s1"]"#, "s1").unwrap(),
            RelayMessage::EndOfStored
        );
    }

    #[test]
    fn test_parse_closed_and_notice() {
        assert_eq!(
            parse_message(r#"["CLOSED","s1","error: rate-limited"]"#, "s1").unwrap(),
            RelayMessage::Closed("error: rate-limited".into())
        );
        assert_eq!(
            parse_message(r#"["NOTICE","slow down"]"#, "s1").unwrap(),
            RelayMessage::Notice("slow down".into())
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_message("not json", "s1").is_err());
    }

    #[test]
    fn test_subscription_ids_differ() {
        assert_ne!(subscription_id(), subscription_id());
    }
}
