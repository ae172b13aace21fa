//! Feed engine: HTTP fetching, the poll scheduler and the sync pipeline.
mod engine;
mod fetch;
mod scheduler;
mod types;

pub use engine::{EngineSettings, FeedEngine, FeedReader, DEFAULT_LIMIT, DEFAULT_POLL_INTERVAL};
pub use feed_core::{FailureKind, FetchError};
pub use fetch::{decode_snapshot, FeedFetcher, FetchSettings, ReqwestFeedFetcher};
pub use scheduler::{CycleTicket, PollHandle, PollScheduler, SchedulerState};
pub use types::{CycleOutcome, EngineEvent};
