use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Push,
    PullRequest,
    Merge,
}

impl EventType {
    /// Wire name, as served by the events endpoint.
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Push => "push",
            EventType::PullRequest => "pull_request",
            EventType::Merge => "merge",
        }
    }

    /// Human readable name used by the view model.
    pub fn label(self) -> &'static str {
        match self {
            EventType::Push => "push",
            EventType::PullRequest => "pull request",
            EventType::Merge => "merge",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One repository activity entry as served by `GET /api/events`.
///
/// The server issues no identifier; see [`IdentityKey`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub event_type: EventType,
    pub author: String,
    #[serde(default)]
    pub from_branch: Option<String>,
    #[serde(default)]
    pub to_branch: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl Event {
    pub fn new(
        event_type: EventType,
        author: impl Into<String>,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            event_type,
            author: author.into(),
            from_branch: None,
            to_branch: None,
            timestamp,
            message: message.into(),
        }
    }

    pub fn with_branches(mut self, from: Option<&str>, to: Option<&str>) -> Self {
        self.from_branch = from.map(ToOwned::to_owned);
        self.to_branch = to.map(ToOwned::to_owned);
        self
    }

    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey::of(self)
    }
}

/// Digest of the full event tuple, used in place of a server-issued id.
///
/// Two events with identical type, author, message, timestamp and branches
/// map to the same key and are treated as duplicates.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdentityKey([u8; 32]);

impl IdentityKey {
    pub fn of(event: &Event) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(event.event_type.as_str().as_bytes());
        update_field(&mut hasher, Some(&event.author));
        update_field(&mut hasher, Some(&event.message));
        hasher.update(event.timestamp.timestamp().to_be_bytes());
        hasher.update(event.timestamp.timestamp_subsec_nanos().to_be_bytes());
        update_field(&mut hasher, event.from_branch.as_deref());
        update_field(&mut hasher, event.to_branch.as_deref());
        let digest = hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

// Length-prefixed so adjacent fields cannot bleed into each other.
fn update_field(hasher: &mut Sha256, value: Option<&str>) {
    match value {
        Some(text) => {
            hasher.update([1u8]);
            hasher.update((text.len() as u64).to_be_bytes());
            hasher.update(text.as_bytes());
        }
        None => hasher.update([0u8]),
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0.iter().take(6) {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentityKey({self})")
    }
}
