//! Drives a [`SyncEngine`] on a fixed interval.
//!
//! The engine lives inside a single task; fetches run on their own tasks
//! and the loop joins the in-flight one, so at most one result is applied
//! at a time and the engine is never touched from anywhere else.

use crate::engine::{CycleOutcome, CycleTicket, SyncEngine};
use crate::error::FetchError;
use crate::facility::Facility;
use crate::render::MapRenderer;
use crate::source::FacilitySource;
use crate::status::{SharedStatus, SyncStatus};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

type FetchResult = Result<Vec<Facility>, FetchError>;

/// Requests an immediate, out-of-schedule cycle.
#[derive(Debug, Clone, Default)]
pub struct RefreshTrigger(Arc<Notify>);

impl RefreshTrigger {
    pub fn fire(&self) {
        self.0.notify_one();
    }
}

pub struct PollerHandle {
    trigger: RefreshTrigger,
    status: SharedStatus,
    shutdown: CancellationToken,
    task: JoinHandle<()>,
    joined: bool,
}

impl PollerHandle {
    pub fn trigger(&self) -> RefreshTrigger {
        self.trigger.clone()
    }

    pub fn status(&self) -> SharedStatus {
        self.status.clone()
    }

    pub fn snapshot(&self) -> SyncStatus {
        self.status.snapshot()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Resolves when the poller task exits without having been stopped.
    /// Cancel safe; after it resolves, [`PollerHandle::stop`] no longer
    /// waits on the task.
    pub async fn exited(&mut self) -> Result<(), JoinError> {
        let res = (&mut self.task).await;
        self.joined = true;
        res
    }

    /// Cancels the timer and any in-flight fetch. Once this returns the
    /// engine has been dropped and no further render commands are issued.
    pub async fn stop(self) {
        self.shutdown.cancel();
        if self.joined {
            return;
        }
        if let Err(e) = self.task.await {
            warn!(name: "poller.stop.join_failed", error = ?e, "poller task did not shut down cleanly");
        }
    }
}

/// Starts polling. The first fetch happens immediately.
///
/// `period` must be non-zero; the configuration layer rejects a zero interval.
pub fn start<S, R>(engine: SyncEngine<R>, source: Arc<S>, period: Duration) -> PollerHandle
where
    S: FacilitySource,
    R: MapRenderer + Send + 'static,
{
    let trigger = RefreshTrigger::default();
    let status = SharedStatus::default();
    let shutdown = CancellationToken::new();

    let task = tokio::spawn(poll_loop(
        engine,
        source,
        period,
        trigger.clone(),
        status.clone(),
        shutdown.clone(),
    ));

    PollerHandle {
        trigger,
        status,
        shutdown,
        task,
        joined: false,
    }
}

struct InFlight {
    ticket: CycleTicket,
    task: JoinHandle<FetchResult>,
}

async fn join_in_flight(in_flight: &mut Option<InFlight>) -> (CycleTicket, Result<FetchResult, JoinError>) {
    match in_flight {
        Some(fetch) => (fetch.ticket, (&mut fetch.task).await),
        None => std::future::pending().await,
    }
}

async fn poll_loop<S, R>(
    mut engine: SyncEngine<R>,
    source: Arc<S>,
    period: Duration,
    trigger: RefreshTrigger,
    status: SharedStatus,
    shutdown: CancellationToken,
) where
    S: FacilitySource,
    R: MapRenderer + Send + 'static,
{
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut in_flight: Option<InFlight> = None;

    info!(name: "poller.loop.initialized", period = ?period, "initialized facility poller");
    loop {
        tokio::select! {
            biased;
            () = shutdown.cancelled() => {
                info!(name: "poller.shutdown.requested", "shutdown requested, exiting poller loop");
                break;
            }
            (ticket, joined) = join_in_flight(&mut in_flight), if in_flight.is_some() => {
                in_flight = None;
                let result = joined.unwrap_or_else(|e| {
                    warn!(name: "poller.fetch.task_failed", cycle = ticket.cycle(), error = ?e, "fetch task ended without a result");
                    Err(FetchError::Interrupted(e.to_string()))
                });
                record_outcome(&status, engine.complete_cycle(ticket, result));
            }
            _ = ticker.tick() => {
                if let Some(ticket) = engine.begin_cycle() {
                    in_flight = Some(spawn_fetch(&source, ticket, &status));
                } else {
                    debug!(name: "poller.tick.skipped", "previous cycle still in flight, skipping tick");
                    status.update(|s| s.ticks_skipped += 1);
                }
            }
            () = trigger.0.notified() => {
                if let Some(superseded) = in_flight.take() {
                    superseded.task.abort();
                    status.update(|s| s.cycles_stale += 1);
                }
                if let Some(ticket) = engine.supersede_cycle() {
                    debug!(name: "poller.refresh.triggered", cycle = ticket.cycle(), "refresh requested");
                    in_flight = Some(spawn_fetch(&source, ticket, &status));
                }
            }
        }
    }

    engine.stop();
    if let Some(fetch) = in_flight {
        fetch.task.abort();
    }
}

fn spawn_fetch<S: FacilitySource>(source: &Arc<S>, ticket: CycleTicket, status: &SharedStatus) -> InFlight {
    status.update(|s| s.last_attempted_update = Some(Utc::now()));
    let source = Arc::clone(source);
    InFlight {
        ticket,
        task: tokio::spawn(async move { source.fetch().await }),
    }
}

fn record_outcome(status: &SharedStatus, outcome: CycleOutcome) {
    match outcome {
        CycleOutcome::Applied(summary) => status.update(|s| {
            s.last_successful_update = Some(Utc::now());
            s.cycles_applied += 1;
            s.facilities_dropped += summary.dropped as u64;
            s.rendered_markers = summary.rendered;
        }),
        CycleOutcome::Failed { error, .. } => status.update(|s| {
            s.cycles_failed += 1;
            s.last_error = Some(format!("{}: {error}", error.kind()));
        }),
        CycleOutcome::Stale { .. } => status.update(|s| s.cycles_stale += 1),
        CycleOutcome::Stopped { .. } => {}
    }
}
