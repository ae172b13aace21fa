use chrono::{DateTime, Utc};

use crate::Event;

/// The latest deduplicated snapshot and the time it was synced.
///
/// The store is only ever replaced wholesale: the remote window slides, so
/// appending would keep events the server no longer returns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeedStore {
    events: Vec<Event>,
    last_sync: Option<DateTime<Utc>>,
}

impl FeedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, events: Vec<Event>, synced_at: DateTime<Utc>) {
        self.events = events;
        self.last_sync = Some(synced_at);
    }

    pub fn current_events(&self) -> &[Event] {
        &self.events
    }

    pub fn last_sync_time(&self) -> Option<DateTime<Utc>> {
        self.last_sync
    }

    /// Event count to compare the next snapshot against; `None` before the first sync.
    pub fn previous_count(&self) -> Option<usize> {
        self.last_sync.map(|_| self.events.len())
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
