use chrono::{DateTime, Utc};

use crate::EventType;

/// Read-only projection of the feed for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeedViewModel {
    pub events: Vec<EventRowView>,
    pub event_count: usize,
    pub last_sync: Option<DateTime<Utc>>,
    pub new_event_count: usize,
    pub new_events_label: Option<String>,
    pub loading: bool,
    pub syncing: bool,
    pub last_error: Option<String>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRowView {
    pub event_type: EventType,
    pub type_label: &'static str,
    pub author: String,
    pub from_branch: Option<String>,
    pub to_branch: Option<String>,
    pub message: String,
    pub timestamp: String,
}
