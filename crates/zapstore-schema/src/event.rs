//! Directory events and query filters.
//!
//! The event shape follows NIP-01: an id, an author key, a numeric kind and an
//! ordered list of tags, each tag being a list of strings whose first element
//! is the tag name. Signatures and timestamps are carried but not inspected.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Application metadata (parameterized replaceable).
pub const KIND_APP: u32 = 32267;
/// Release metadata (parameterized replaceable).
pub const KIND_RELEASE: u32 = 30063;
/// Asset metadata.
pub const KIND_ASSET: u32 = 3063;
/// Generic file metadata, used for assets by older publishers.
pub const KIND_FILE_METADATA: u32 = 1063;

/// A signed directory event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event id (hex).
    pub id: String,
    /// Author public key (hex).
    pub pubkey: String,
    /// Unix timestamp.
    #[serde(default)]
    pub created_at: i64,
    /// Event kind.
    pub kind: u32,
    /// Ordered tags.
    #[serde(default)]
    pub tags: Vec<Vec<String>>,
    /// Free-form content.
    #[serde(default)]
    pub content: String,
    /// Signature (hex).
    #[serde(default)]
    pub sig: String,
}

impl Event {
    /// First value of the first tag named `name`.
    pub fn tag_value(&self, name: &str) -> Option<&str> {
        self.tag_values(name).next()
    }

    /// First value of every tag named `name`, in order.
    pub fn tag_values<'a, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a str> + use<'a, 'n> {
        self.tags
            .iter()
            .filter(move |tag| tag.len() >= 2 && tag[0] == name)
            .map(|tag| tag[1].as_str())
    }
}

/// A query filter.
///
/// Empty constraints are ignored; every non-empty one must hold for an event
/// to match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    /// Exact event ids.
    pub ids: Vec<String>,
    /// Author public keys.
    pub authors: Vec<String>,
    /// Event kinds.
    pub kinds: Vec<u32>,
    /// Tag name to accepted values.
    pub tags: BTreeMap<String, Vec<String>>,
    /// Free-text search string.
    pub search: Option<String>,
    /// Maximum number of results.
    pub limit: Option<usize>,
}

impl Filter {
    /// An empty filter that matches everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to the given kinds.
    pub fn kinds(mut self, kinds: impl IntoIterator<Item = u32>) -> Self {
        self.kinds.extend(kinds);
        self
    }

    /// Restrict to the given authors.
    pub fn authors<S: Into<String>>(mut self, authors: impl IntoIterator<Item = S>) -> Self {
        self.authors.extend(authors.into_iter().map(Into::into));
        self
    }

    /// Restrict to the given event ids.
    pub fn ids<S: Into<String>>(mut self, ids: impl IntoIterator<Item = S>) -> Self {
        self.ids.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Require a tag named `name` carrying one of `values`.
    pub fn tag<S: Into<String>>(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        self.tags
            .entry(name.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    /// Free-text search.
    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.search = Some(query.into());
        self
    }

    /// Cap the number of results.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Wire representation: tag constraints become `"#<name>"` keys and empty
    /// constraints are omitted.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        if !self.ids.is_empty() {
            map.insert("ids".into(), Value::from(self.ids.clone()));
        }
        if !self.authors.is_empty() {
            map.insert("authors".into(), Value::from(self.authors.clone()));
        }
        if !self.kinds.is_empty() {
            map.insert("kinds".into(), Value::from(self.kinds.clone()));
        }
        for (name, values) in &self.tags {
            map.insert(format!("#{name}"), Value::from(values.clone()));
        }
        if let Some(search) = &self.search {
            map.insert("search".into(), Value::from(search.clone()));
        }
        if let Some(limit) = self.limit {
            map.insert("limit".into(), Value::from(limit));
        }
        Value::Object(map)
    }

    /// Whether `event` satisfies every constraint (the limit is not a
    /// per-event constraint and is ignored here).
    pub fn matches(&self, event: &Event) -> bool {
        if !self.ids.is_empty() && !self.ids.contains(&event.id) {
            return false;
        }
        if !self.authors.is_empty() && !self.authors.contains(&event.pubkey) {
            return false;
        }
        if !self.kinds.is_empty() && !self.kinds.contains(&event.kind) {
            return false;
        }

        let tags_hold = self.tags.iter().all(|(name, accepted)| {
            accepted.is_empty()
                || event
                    .tag_values(name)
                    .any(|value| accepted.iter().any(|a| a == value))
        });
        if !tags_hold {
            return false;
        }

        match &self.search {
            Some(query) if !query.is_empty() => {
                let needle = query.to_lowercase();
                event.content.to_lowercase().contains(&needle)
                    || event
                        .tags
                        .iter()
                        .flat_map(|tag| tag.iter().skip(1))
                        .any(|value| value.to_lowercase().contains(&needle))
            }
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| (*s).to_string()).collect()
    }

    fn app_event() -> Event {
        Event {
            id: "e1".into(),
            pubkey: "pk".into(),
            created_at: 1_700_000_000,
            kind: KIND_APP,
            tags: vec![
                tag(&["d", "dev.zapstore.nak"]),
                tag(&["name", "nak"]),
                tag(&["f", "linux-x86_64"]),
                tag(&["f", "darwin-arm64"]),
                tag(&["summary", "The Nostr army knife"]),
            ],
            content: String::new(),
            sig: String::new(),
        }
    }

    #[test]
    fn test_tag_lookup() {
        let ev = app_event();
        assert_eq!(ev.tag_value("d"), Some("dev.zapstore.nak"));
        assert_eq!(ev.tag_value("missing"), None);
        let platforms: Vec<&str> = ev.tag_values("f").collect();
        assert_eq!(platforms, vec!["linux-x86_64", "darwin-arm64"]);
    }

    #[test]
    fn test_short_tags_are_ignored() {
        let mut ev = app_event();
        ev.tags.insert(0, tag(&["d"]));
        assert_eq!(ev.tag_value("d"), Some("dev.zapstore.nak"));
    }

    #[test]
    fn test_filter_wire_shape() {
        let filter = Filter::new()
            .kinds([KIND_APP])
            .tag("d", ["dev.zapstore.nak"])
            .tag("f", ["linux-x86_64"])
            .limit(1);

        let json = filter.to_json();
        assert_eq!(
            json,
            serde_json::json!({
                "kinds": [32267],
                "#d": ["dev.zapstore.nak"],
                "#f": ["linux-x86_64"],
                "limit": 1
            })
        );
    }

    #[test]
    fn test_filter_matches_tags_and_kinds() {
        let ev = app_event();
        assert!(Filter::new().matches(&ev));
        assert!(Filter::new().tag("f", ["darwin-arm64"]).matches(&ev));
        assert!(!Filter::new().tag("f", ["windows-x86_64"]).matches(&ev));
        assert!(!Filter::new().kinds([KIND_RELEASE]).matches(&ev));
        assert!(!Filter::new().authors(["other"]).matches(&ev));
        assert!(Filter::new().ids(["e1", "e2"]).matches(&ev));
    }

    #[test]
    fn test_filter_search_is_case_insensitive() {
        let ev = app_event();
        assert!(Filter::new().search("ARMY").matches(&ev));
        assert!(!Filter::new().search("bitcoin").matches(&ev));
    }

    #[test]
    fn test_event_round_trips_wire_json() {
        let raw = r#"{"id":"ab","pubkey":"cd","created_at":1,"kind":3063,
            "tags":[["url","https://x/y"],["x","00"]],"content":"","sig":"ef"}"#;
        let ev: Event = serde_json::from_str(raw).unwrap();
        assert_eq!(ev.kind, KIND_ASSET);
        assert_eq!(ev.tag_value("url"), Some("https://x/y"));
    }
}
