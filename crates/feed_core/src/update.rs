use crate::{dedupe, Effect, FeedState, Msg, DELTA_DISPLAY_DURATION};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: FeedState, msg: Msg) -> (FeedState, Vec<Effect>) {
    let effects = match msg {
        Msg::CycleStarted { generation } => {
            state.begin_cycle(generation);
            Vec::new()
        }
        Msg::SnapshotFetched { events, synced_at } => {
            let events = dedupe(events);
            match state.apply_snapshot(events, synced_at) {
                Some(signal) => vec![Effect::ClearDeltaAfter {
                    token: signal.token,
                    after: DELTA_DISPLAY_DURATION,
                }],
                None => Vec::new(),
            }
        }
        Msg::FetchFailed { error } => {
            state.apply_failure(error);
            Vec::new()
        }
        Msg::DeltaExpired { token } => {
            state.expire_delta(token);
            Vec::new()
        }
        Msg::PollingStopped => {
            state.halt();
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
