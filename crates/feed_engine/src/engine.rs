use std::num::NonZeroU32;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use feed_core::{update, DeltaSignal, Effect, FeedState, FeedStore, FeedViewModel, Msg};
use feed_logging::{feed_debug, feed_info, feed_warn};
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::fetch::FeedFetcher;
use crate::scheduler::{CycleTicket, PollHandle, PollScheduler, SchedulerState};
use crate::{CycleOutcome, EngineEvent};

pub const DEFAULT_LIMIT: u32 = 20;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub limit: NonZeroU32,
    pub poll_interval: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            limit: NonZeroU32::new(DEFAULT_LIMIT).unwrap_or(NonZeroU32::MIN),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

type SharedState = Arc<Mutex<FeedState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, FeedState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn dispatch(state: &SharedState, msg: Msg) -> Vec<Effect> {
    let mut guard = lock(state);
    let current = std::mem::take(&mut *guard);
    let (next, effects) = update(current, msg);
    *guard = next;
    effects
}

/// Runs the feed pipeline on a poll loop and exposes read-only access to it.
///
/// Dropping the engine stops polling, cancels pending delta timers and
/// settles the view for readers that outlive it.
pub struct FeedEngine {
    state: SharedState,
    poll: PollHandle,
    _halt_guard: HaltOnDrop,
    effects_cancel: CancellationToken,
    _effects_guard: DropGuard,
    event_rx: mpsc::UnboundedReceiver<EngineEvent>,
}

impl FeedEngine {
    /// Starts polling immediately. Must be called from within a Tokio runtime.
    pub fn start(fetcher: Arc<dyn FeedFetcher>, settings: EngineSettings) -> Self {
        let state = SharedState::default();
        let effects_cancel = CancellationToken::new();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let limit = settings.limit;

        let pipeline = Pipeline {
            fetcher,
            state: state.clone(),
            limit,
            event_tx,
            effects_cancel: effects_cancel.clone(),
        };
        let poll = PollScheduler::new(settings.poll_interval).start(move |ticket| {
            let pipeline = pipeline.clone();
            async move { pipeline.run_cycle(ticket).await }
        });
        feed_info!("feed engine started (limit {limit})");

        Self {
            _halt_guard: HaltOnDrop(state.clone()),
            state,
            poll,
            _effects_guard: effects_cancel.clone().drop_guard(),
            effects_cancel,
            event_rx,
        }
    }

    pub fn reader(&self) -> FeedReader {
        FeedReader {
            state: self.state.clone(),
        }
    }

    pub fn view(&self) -> FeedViewModel {
        lock(&self.state).view()
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.poll.state()
    }

    /// Stops polling and pending delta timers. Returns immediately.
    pub fn stop(&self) {
        self.poll.stop();
        self.effects_cancel.cancel();
        dispatch(&self.state, Msg::PollingStopped);
    }

    /// Stops the engine and waits for the poll loop to exit.
    pub async fn shutdown(self) {
        self.effects_cancel.cancel();
        self.poll.shutdown().await;
        dispatch(&self.state, Msg::PollingStopped);
        feed_info!("feed engine shut down");
    }

    pub fn try_recv(&mut self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Waits for the next engine event; `None` once the poll loop is gone.
    pub async fn next_event(&mut self) -> Option<EngineEvent> {
        self.event_rx.recv().await
    }
}

/// Declared after the poll handle, so it runs once polling has stopped.
struct HaltOnDrop(SharedState);

impl Drop for HaltOnDrop {
    fn drop(&mut self) {
        dispatch(&self.0, Msg::PollingStopped);
    }
}

/// Cloneable read-only access to the engine's feed state.
#[derive(Clone)]
pub struct FeedReader {
    state: SharedState,
}

impl FeedReader {
    pub fn view(&self) -> FeedViewModel {
        lock(&self.state).view()
    }

    pub fn store(&self) -> FeedStore {
        lock(&self.state).store().clone()
    }

    pub fn delta(&self) -> Option<DeltaSignal> {
        lock(&self.state).delta()
    }

    /// Returns a fresh view only if something visible changed since the last call.
    pub fn take_dirty_view(&self) -> Option<FeedViewModel> {
        let mut guard = lock(&self.state);
        if guard.consume_dirty() {
            Some(guard.view())
        } else {
            None
        }
    }
}

#[derive(Clone)]
struct Pipeline {
    fetcher: Arc<dyn FeedFetcher>,
    state: SharedState,
    limit: NonZeroU32,
    event_tx: mpsc::UnboundedSender<EngineEvent>,
    effects_cancel: CancellationToken,
}

impl Pipeline {
    async fn run_cycle(&self, ticket: CycleTicket) {
        let generation = ticket.generation();
        ticket.commit(|| dispatch(&self.state, Msg::CycleStarted { generation }));
        feed_debug!("cycle {generation}: fetching up to {} events", self.limit);

        let committed = match self.fetcher.fetch(self.limit).await {
            Ok(events) => {
                let received = events.len();
                let msg = Msg::SnapshotFetched {
                    events,
                    synced_at: Utc::now(),
                };
                ticket.commit(|| {
                    let effects = dispatch(&self.state, msg);
                    let guard = lock(&self.state);
                    let outcome = CycleOutcome::Synced {
                        received,
                        kept: guard.store().len(),
                        delta: guard.delta().map_or(0, |signal| signal.count),
                    };
                    (effects, outcome)
                })
            }
            Err(error) => {
                feed_warn!("cycle {generation}: fetch failed: {error}");
                let kind = error.kind;
                ticket.commit(|| {
                    let effects = dispatch(&self.state, Msg::FetchFailed { error });
                    (effects, CycleOutcome::Failed(kind))
                })
            }
        };

        let outcome = match committed {
            Some((effects, outcome)) => {
                if let CycleOutcome::Synced {
                    received,
                    kept,
                    delta,
                } = outcome
                {
                    feed_info!(
                        "cycle {generation}: synced {kept} events ({} duplicates dropped, +{delta} new)",
                        received - kept
                    );
                }
                self.run_effects(effects);
                outcome
            }
            None => {
                feed_debug!("cycle {generation}: result arrived after stop, discarded");
                CycleOutcome::Discarded
            }
        };

        let _ = self.event_tx.send(EngineEvent::CycleCompleted {
            generation,
            outcome,
        });
    }

    fn run_effects(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ClearDeltaAfter { token, after } => {
                    let state = self.state.clone();
                    let event_tx = self.event_tx.clone();
                    let cancel = self.effects_cancel.clone();
                    tokio::spawn(async move {
                        tokio::select! {
                            biased;
                            _ = cancel.cancelled() => {}
                            _ = tokio::time::sleep(after) => {
                                dispatch(&state, Msg::DeltaExpired { token });
                                let _ = event_tx.send(EngineEvent::DeltaCleared { token });
                            }
                        }
                    });
                }
            }
        }
    }
}
