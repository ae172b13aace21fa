#![allow(dead_code)]

use std::collections::VecDeque;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use chrono::{DateTime, Duration, TimeZone, Utc};
use feed_core::{Event, EventType};
use feed_engine::{FeedFetcher, FetchError};
use tokio::sync::Semaphore;
use tokio::time::Instant;

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(feed_logging::initialize_for_tests);
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap()
}

pub fn event(n: i64) -> Event {
    Event::new(
        EventType::Push,
        format!("author{n}"),
        format!("commit {n}"),
        base_time() + Duration::minutes(n),
    )
    .with_branches(None, Some("main"))
}

pub fn events(range: std::ops::RangeInclusive<i64>) -> Vec<Event> {
    range.map(event).collect()
}

/// Fetcher that replays scripted responses, optionally holding each fetch
/// until the test releases it.
pub struct ScriptedFetcher {
    responses: Mutex<VecDeque<Result<Vec<Event>, FetchError>>>,
    gate: Semaphore,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    started_at: Mutex<Vec<Instant>>,
    limits: Mutex<Vec<u32>>,
}

impl ScriptedFetcher {
    pub fn open(responses: Vec<Result<Vec<Event>, FetchError>>) -> Arc<Self> {
        Self::with_permits(responses, Semaphore::MAX_PERMITS)
    }

    pub fn gated(responses: Vec<Result<Vec<Event>, FetchError>>) -> Arc<Self> {
        Self::with_permits(responses, 0)
    }

    fn with_permits(responses: Vec<Result<Vec<Event>, FetchError>>, permits: usize) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            gate: Semaphore::new(permits),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            started_at: Mutex::new(Vec::new()),
            limits: Mutex::new(Vec::new()),
        })
    }

    /// Lets `n` pending or future fetches resolve.
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn started_at(&self) -> Vec<Instant> {
        self.started_at.lock().unwrap().clone()
    }

    pub fn limits(&self) -> Vec<u32> {
        self.limits.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl FeedFetcher for ScriptedFetcher {
    async fn fetch(&self, limit: NonZeroU32) -> Result<Vec<Event>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started_at.lock().unwrap().push(Instant::now());
        self.limits.lock().unwrap().push(limit.get());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let permit = self.gate.acquire().await.expect("gate closed");
        permit.forget();

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}
