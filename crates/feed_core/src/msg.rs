use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The scheduler began a cycle tagged with `generation`.
    CycleStarted { generation: u64 },
    /// A fetch resolved with a raw (not yet deduplicated) snapshot.
    SnapshotFetched {
        events: Vec<crate::Event>,
        synced_at: DateTime<Utc>,
    },
    /// A fetch failed; the store must stay as it is.
    FetchFailed { error: crate::FetchError },
    /// The display window of a delta signal elapsed.
    DeltaExpired { token: crate::DeltaToken },
    /// Polling ended; any in-flight cycle will never resolve.
    PollingStopped,
    /// Fallback for placeholder wiring.
    NoOp,
}
