use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch, Notify};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{interval, MissedTickBehavior};

use crate::feeds::{Feed, FeedError, SourceKind};

use super::state::RefreshState;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

type CycleResult<T> = Result<Vec<T>, FeedError>;

#[derive(Debug)]
struct WorkerHandle {
    source: SourceKind,
    stop_tx: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

/// Read side of one registered source.
pub struct SourceHandle<T> {
    source: SourceKind,
    state: watch::Receiver<RefreshState<T>>,
    trigger: Arc<Notify>,
}

impl<T> Clone for SourceHandle<T> {
    fn clone(&self) -> Self {
        Self {
            source: self.source,
            state: self.state.clone(),
            trigger: self.trigger.clone(),
        }
    }
}

impl<T: Clone> SourceHandle<T> {
    pub fn snapshot(&self) -> RefreshState<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RefreshState<T>> {
        self.state.clone()
    }

    /// Starts a cycle now unless one is already in flight.
    pub fn refresh_now(&self) {
        log::debug!("{} refresh requested", self.source);
        self.trigger.notify_one();
    }
}

/// Runs one polling worker per registered source.
#[derive(Debug, Default)]
pub struct Scheduler {
    workers: Vec<WorkerHandle>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns the worker for `source`. The first cycle starts immediately.
    pub fn register<F: Feed>(
        &mut self,
        source: SourceKind,
        feed: F,
        every: Duration,
    ) -> SourceHandle<F::Record> {
        let every = if every < MIN_INTERVAL {
            log::warn!("{} refresh interval {:?} too small, clamping", source, every);
            MIN_INTERVAL
        } else {
            every
        };

        let (state_tx, state_rx) = watch::channel(RefreshState::default());
        let (stop_tx, stop_rx) = oneshot::channel();
        let trigger = Arc::new(Notify::new());

        let join = tokio::spawn(run_source(
            source,
            Arc::new(feed),
            every,
            state_tx,
            trigger.clone(),
            stop_rx,
        ));

        log::info!("{} refresh every {}", source, humantime::format_duration(every));
        self.workers.push(WorkerHandle {
            source,
            stop_tx,
            join,
        });

        SourceHandle {
            source,
            state: state_rx,
            trigger,
        }
    }

    /// Cancels all future ticks. Fetches already in flight run to completion
    /// but their results are dropped.
    pub async fn stop(&mut self) {
        let workers: Vec<_> = self
            .workers
            .drain(..)
            .map(|worker| {
                let _ = worker.stop_tx.send(());
                (worker.source, worker.join)
            })
            .collect();

        for (source, join) in workers {
            if let Err(e) = join.await {
                log::warn!("{} refresh worker ended abnormally: {}", source, e);
            }
            log::info!("{} refresh stopped", source);
        }
    }
}

async fn run_source<F: Feed>(
    source: SourceKind,
    feed: Arc<F>,
    every: Duration,
    state_tx: watch::Sender<RefreshState<F::Record>>,
    trigger: Arc<Notify>,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut in_flight: Option<JoinHandle<CycleResult<F::Record>>> = None;

    loop {
        tokio::select! {
            biased;
            _ = &mut stop_rx => break,
            joined = wait_for(&mut in_flight) => {
                in_flight = None;
                apply_outcome(source, &state_tx, joined);
            }
            _ = ticker.tick() => start_cycle(source, &feed, &mut in_flight),
            _ = trigger.notified() => start_cycle(source, &feed, &mut in_flight),
        }
    }

    if in_flight.is_some() {
        log::debug!("{} stopped with a cycle in flight, result will be discarded", source);
    }
}

async fn wait_for<T>(in_flight: &mut Option<JoinHandle<T>>) -> Result<T, JoinError> {
    match in_flight {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

fn start_cycle<F: Feed>(
    source: SourceKind,
    feed: &Arc<F>,
    in_flight: &mut Option<JoinHandle<CycleResult<F::Record>>>,
) {
    if in_flight.is_some() {
        log::debug!("{} previous cycle still pending, skipping tick", source);
        return;
    }

    let feed = Arc::clone(feed);
    *in_flight = Some(tokio::spawn(async move { feed.fetch().await }));
}

fn apply_outcome<T>(
    source: SourceKind,
    state_tx: &watch::Sender<RefreshState<T>>,
    joined: Result<CycleResult<T>, JoinError>,
) {
    match joined {
        Ok(Ok(records)) => {
            log::debug!("{} fetched {} records", source, records.len());
            state_tx.send_modify(|state| state.apply_success(records, Utc::now()));
        }
        Ok(Err(e)) => {
            log::warn!("{} refresh failed: {}", source, e);
            state_tx.send_modify(|state| state.apply_failure(e.to_string()));
        }
        Err(e) => {
            log::warn!("{} refresh task failed: {}", source, e);
            state_tx.send_modify(|state| state.apply_failure(e.to_string()));
        }
    }
}
