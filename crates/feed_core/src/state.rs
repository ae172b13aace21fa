use chrono::{DateTime, Utc};

use crate::format::{format_timestamp, new_events_label};
use crate::view_model::{EventRowView, FeedViewModel};
use crate::{DeltaSignal, DeltaToken, DeltaTracker, Event, FeedStore, FetchError};

/// Everything the pipeline knows about the feed.
///
/// Only [`crate::update`] mutates it; readers go through [`FeedState::view`]
/// or [`FeedState::store`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedState {
    store: FeedStore,
    delta: DeltaTracker,
    loading: bool,
    in_flight: Option<u64>,
    last_error: Option<FetchError>,
    dirty: bool,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            store: FeedStore::new(),
            delta: DeltaTracker::new(),
            loading: true,
            in_flight: None,
            last_error: None,
            dirty: false,
        }
    }
}

impl FeedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &FeedStore {
        &self.store
    }

    pub fn delta(&self) -> Option<DeltaSignal> {
        self.delta.signal()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    pub fn view(&self) -> FeedViewModel {
        let new_event_count = self.delta.count();
        FeedViewModel {
            events: self.store.current_events().iter().map(row_view).collect(),
            event_count: self.store.len(),
            last_sync: self.store.last_sync_time(),
            new_event_count,
            new_events_label: new_events_label(new_event_count),
            loading: self.loading,
            syncing: self.in_flight.is_some(),
            last_error: self.last_error.as_ref().map(ToString::to_string),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything visible changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn begin_cycle(&mut self, generation: u64) {
        self.in_flight = Some(generation);
    }

    /// Replaces the store with an already deduplicated snapshot.
    ///
    /// Returns the positive delta signal, if any.
    pub(crate) fn apply_snapshot(
        &mut self,
        events: Vec<Event>,
        synced_at: DateTime<Utc>,
    ) -> Option<DeltaSignal> {
        let signal = self.delta.record(self.store.previous_count(), events.len());
        self.store.replace(events, synced_at);
        self.finish_cycle();
        self.last_error = None;
        self.dirty = true;
        signal
    }

    pub(crate) fn apply_failure(&mut self, error: FetchError) {
        self.finish_cycle();
        self.last_error = Some(error);
        self.dirty = true;
    }

    pub(crate) fn expire_delta(&mut self, token: DeltaToken) {
        if self.delta.expire(token) {
            self.dirty = true;
        }
    }

    /// Ends any cycle left outstanding by a stop. The store is kept.
    pub(crate) fn halt(&mut self) {
        if self.in_flight.is_some() || self.loading {
            self.finish_cycle();
            self.dirty = true;
        }
    }

    fn finish_cycle(&mut self) {
        self.in_flight = None;
        self.loading = false;
    }
}

fn row_view(event: &Event) -> EventRowView {
    EventRowView {
        event_type: event.event_type,
        type_label: event.event_type.label(),
        author: event.author.clone(),
        from_branch: event.from_branch.clone(),
        to_branch: event.to_branch.clone(),
        message: event.message.clone(),
        timestamp: format_timestamp(event.timestamp),
    }
}
