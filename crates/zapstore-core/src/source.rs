//! Event-query capability.
//!
//! The resolver only needs "give me the events matching this filter". The
//! networked implementation lives in [`crate::relay`]; [`MemoryEventSource`]
//! answers from a fixed set and backs the resolver tests.

use std::sync::Arc;

use async_trait::async_trait;
use zapstore_schema::{Event, Filter};

use crate::error::Result;

/// Anything that can answer an event filter.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Events matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the source cannot be reached.
    async fn query(&self, filter: &Filter) -> Result<Vec<Event>>;
}

#[async_trait]
impl<T: EventSource + ?Sized> EventSource for Arc<T> {
    async fn query(&self, filter: &Filter) -> Result<Vec<Event>> {
        (**self).query(filter).await
    }
}

#[async_trait]
impl<T: EventSource + ?Sized> EventSource for &T {
    async fn query(&self, filter: &Filter) -> Result<Vec<Event>> {
        (**self).query(filter).await
    }
}

/// In-memory event set. Results come back in insertion order.
#[derive(Debug, Default, Clone)]
pub struct MemoryEventSource {
    events: Vec<Event>,
}

impl MemoryEventSource {
    /// Empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an event.
    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Number of stored events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the source holds no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl FromIterator<Event> for MemoryEventSource {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

#[async_trait]
impl EventSource for MemoryEventSource {
    async fn query(&self, filter: &Filter) -> Result<Vec<Event>> {
        let matching = self.events.iter().filter(|e| filter.matches(e)).cloned();
        Ok(match filter.limit {
            Some(n) => matching.take(n).collect(),
            None => matching.collect(),
        })
    }
}
