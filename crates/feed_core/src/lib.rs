//! Feed core: event model, deduplication, delta tracking and the pure feed state machine.
mod dedupe;
mod delta;
mod effect;
mod error;
mod event;
mod format;
mod msg;
mod state;
mod store;
mod update;
mod view_model;

pub use dedupe::dedupe;
pub use delta::{compute_delta, DeltaSignal, DeltaToken, DeltaTracker, DELTA_DISPLAY_DURATION};
pub use effect::Effect;
pub use error::{FailureKind, FetchError};
pub use event::{Event, EventType, IdentityKey};
pub use format::{format_timestamp, new_events_label};
pub use msg::Msg;
pub use state::FeedState;
pub use store::FeedStore;
pub use update::update;
pub use view_model::{EventRowView, FeedViewModel};
