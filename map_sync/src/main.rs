#![warn(clippy::pedantic)]
mod error;
mod live_map;
mod routes;

use crate::error::MainError;
use crate::live_map::LiveMap;
use crate::routes::{AppState, run_server};
use shared::error::InitializationError;
use shared::{init_tracing, load_config, shutdown_listener};
use std::sync::Arc;
use std::time::Duration;
use sync_engine::filter::{filter_channel, run_filter_input};
use sync_engine::{EngineSettings, FilterState, HttpSource, SyncEngine, Viewport, poller};
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const FILTER_CHANNEL_CAPACITY: usize = 32;

#[tokio::main]
async fn main() -> Result<(), MainError> {
    init_tracing()?;

    let config = load_config().map_err(InitializationError::from)?;
    info!(name: "config.loaded", config = ?config, "config loaded");

    let interval_seconds = config.source.interval_seconds();
    let filter_state = FilterState::new();
    let viewport = Viewport::default();
    let map = LiveMap::default();

    let engine = SyncEngine::new(
        map.clone(),
        filter_state.clone(),
        viewport.clone(),
        EngineSettings::from_config(&config),
    );
    let source = Arc::new(HttpSource::new(config.source.url.clone(), config.source.kind)?);
    let mut poller_handle = poller::start(engine, source, Duration::from_secs(interval_seconds));

    // Cancellation token shared across tasks; listener cancels on SIGINT/SIGTERM.
    let shutdown_token = CancellationToken::new();
    let mut signal_handle = tokio::spawn(shutdown_listener(Some(shutdown_token.clone())));

    let (toggles, toggle_input) = filter_channel(FILTER_CHANNEL_CAPACITY);
    let refresh = poller_handle.trigger();
    let filter_handle = tokio::spawn(run_filter_input(
        toggle_input,
        filter_state.clone(),
        move |_| refresh.fire(),
    ));

    let state = AppState {
        status: poller_handle.status(),
        map,
        filter_state,
        toggles,
        viewport,
        refresh: poller_handle.trigger(),
        interval_seconds,
    };
    let mut axum_handle = tokio::spawn(run_server(
        config.bind_addr().to_string(),
        state,
        shutdown_token.clone(),
    ));

    let (mut first_err, axum_done) = tokio::select! {
        res = &mut axum_handle => {
            info!(name: "axum.exited", "http server exited first, shutting down");
            (server_result(res).err(), true)
        }
        res = poller_handle.exited() => {
            warn!(name: "poller.exited", result = ?res, "facility poller exited before shutdown was requested");
            (Some(res.map_or_else(MainError::from, |()| MainError::PollerExited)), false)
        }
        res = &mut signal_handle => {
            info!(name: "listener.completed", "SIGINT/SIGTERM listener finished, shutting down");
            (res.err().map(MainError::from), false)
        }
    };
    shutdown_token.cancel();

    info!(name: "poller.stopping", "stopping facility poller");
    poller_handle.stop().await;

    if !axum_done {
        info!(name: "axum.completion.awaiting", "awaiting http server shutdown");
        if let Err(e) = server_result(axum_handle.await) {
            first_err.get_or_insert(e);
        }
    }

    // The server held the last toggle sender, so the listener drains and returns.
    if let Err(join) = filter_handle.await {
        first_err.get_or_insert(join.into());
    }

    first_err.map_or(Ok(()), Err)
}

fn server_result(res: Result<Result<(), std::io::Error>, JoinError>) -> Result<(), MainError> {
    let res = match res {
        Ok(inner) => inner.map_err(MainError::from),
        Err(join) => Err(MainError::from(join)),
    };
    if let Err(e) = &res {
        warn!(name: "axum.failed", error = ?e, "http server stopped with an error");
    }
    res
}
