//! Fixed-cadence, single-flight poll loop.
//!
//! The first cycle runs as soon as the loop task is scheduled, then one per
//! interval boundary measured from that start. A boundary that passes while a
//! cycle is still outstanding is dropped, never queued, so at most one cycle
//! is ever in flight.
//!
//! Every cycle receives a [`CycleTicket`] carrying its generation. Results
//! must be applied through [`CycleTicket::commit`], which refuses once
//! [`PollHandle::stop`] has bumped the generation. Together with the stop
//! flag this guarantees that nothing runs or lands after `stop` returns.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use feed_logging::{feed_debug, feed_info};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Started, but the first cycle has not begun yet.
    Idle,
    Polling { cycle: u64 },
    Stopped,
}

#[derive(Debug, Default)]
struct Lifecycle {
    cycles_started: u64,
    generation: u64,
    stopped: bool,
}

type SharedLifecycle = Arc<Mutex<Lifecycle>>;

fn lock(lifecycle: &SharedLifecycle) -> MutexGuard<'_, Lifecycle> {
    lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone)]
pub struct PollScheduler {
    interval: Duration,
}

impl PollScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(MIN_INTERVAL),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawns the poll loop on the current Tokio runtime and returns at once.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start<F, Fut>(self, cycle: F) -> PollHandle
    where
        F: FnMut(CycleTicket) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let lifecycle = SharedLifecycle::default();
        let cancel = CancellationToken::new();
        feed_info!(
            "poll scheduler started (interval {} ms)",
            self.interval.as_millis()
        );

        let task = tokio::spawn(run_loop(
            self.interval,
            lifecycle.clone(),
            cancel.clone(),
            cycle,
        ));

        PollHandle {
            lifecycle,
            cancel,
            task: Some(task),
        }
    }
}

async fn run_loop<F, Fut>(
    interval: Duration,
    lifecycle: SharedLifecycle,
    cancel: CancellationToken,
    mut cycle: F,
) where
    F: FnMut(CycleTicket) -> Fut,
    Fut: Future<Output = ()>,
{
    let origin = Instant::now();
    let mut boundary: u128 = 0;

    loop {
        let Some(ticket) = begin_cycle(&lifecycle) else {
            break;
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = cycle(ticket) => {}
        }

        let elapsed = Instant::now().saturating_duration_since(origin);
        let next = elapsed.as_nanos() / interval.as_nanos() + 1;
        let dropped = next - boundary - 1;
        if dropped > 0 {
            feed_debug!("dropped {dropped} poll boundaries while a cycle was in flight");
        }
        boundary = next;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = sleep_until(boundary_instant(origin, interval, next)) => {}
        }
    }

    feed_debug!("poll loop exited");
}

fn boundary_instant(origin: Instant, interval: Duration, index: u128) -> Instant {
    let offset = interval.as_nanos().saturating_mul(index);
    origin + Duration::from_nanos(u64::try_from(offset).unwrap_or(u64::MAX))
}

fn begin_cycle(lifecycle: &SharedLifecycle) -> Option<CycleTicket> {
    let mut guard = lock(lifecycle);
    if guard.stopped {
        return None;
    }
    guard.cycles_started += 1;
    guard.generation = guard.cycles_started;
    Some(CycleTicket {
        generation: guard.generation,
        lifecycle: lifecycle.clone(),
    })
}

/// Tag handed to one cycle; the gate through which its result is applied.
#[derive(Debug)]
pub struct CycleTicket {
    generation: u64,
    lifecycle: SharedLifecycle,
}

impl CycleTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        let guard = lock(&self.lifecycle);
        !guard.stopped && guard.generation == self.generation
    }

    /// Runs `apply` only if this cycle is still current.
    ///
    /// The check and `apply` happen under the lock `stop` takes, so a commit
    /// either completes before `stop` returns or does not happen at all.
    pub fn commit<R>(&self, apply: impl FnOnce() -> R) -> Option<R> {
        let guard = lock(&self.lifecycle);
        if guard.stopped || guard.generation != self.generation {
            return None;
        }
        let result = apply();
        drop(guard);
        Some(result)
    }
}

/// Owns a running poll loop. Dropping the handle stops the loop.
#[derive(Debug)]
pub struct PollHandle {
    lifecycle: SharedLifecycle,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Stops polling. Returns immediately; idempotent.
    ///
    /// After this returns no new cycle begins and no in-flight cycle can
    /// commit its result.
    pub fn stop(&self) {
        {
            let mut guard = lock(&self.lifecycle);
            if guard.stopped {
                return;
            }
            guard.stopped = true;
            guard.generation += 1;
        }
        self.cancel.cancel();
        feed_info!("poll scheduler stopped");
    }

    pub fn state(&self) -> SchedulerState {
        let guard = lock(&self.lifecycle);
        if guard.stopped {
            SchedulerState::Stopped
        } else if guard.cycles_started == 0 {
            SchedulerState::Idle
        } else {
            SchedulerState::Polling {
                cycle: guard.cycles_started,
            }
        }
    }

    pub fn current_generation(&self) -> u64 {
        lock(&self.lifecycle).generation
    }

    /// Stops polling and waits for the loop task to exit.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::boundary_instant;
    use std::time::Duration;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn boundaries_are_multiples_of_interval() {
        let origin = Instant::now();
        let interval = Duration::from_secs(15);
        assert_eq!(boundary_instant(origin, interval, 0), origin);
        assert_eq!(
            boundary_instant(origin, interval, 3),
            origin + Duration::from_secs(45)
        );
    }
}
