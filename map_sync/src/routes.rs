use crate::live_map::{LiveMap, MapView};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use sync_engine::filter::FilterToggle;
use sync_engine::{Category, FilterState, RefreshTrigger, SharedStatus, SyncStatus, Viewport};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

#[derive(Clone)]
pub struct AppState {
    pub status: SharedStatus,
    pub map: LiveMap,
    pub filter_state: FilterState,
    pub toggles: mpsc::Sender<FilterToggle>,
    pub viewport: Viewport,
    pub refresh: RefreshTrigger,
    pub interval_seconds: u64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/status", get(status))
        .route("/markers", get(markers))
        .route("/filters", get(filters))
        .route("/filters/{category}", put(set_filter))
        .route("/viewport", put(set_viewport))
        .route("/refresh", post(refresh))
        .with_state(state)
}

pub async fn run_server(
    bind_addr: String,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<(), std::io::Error> {
    info!(name: "axum.initialized", bind_addr = %bind_addr, "starting axum server");
    let listener = TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;
    Ok(())
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let SyncStatus {
        last_attempted_update,
        last_successful_update,
        last_error,
        rendered_markers,
        ..
    } = state.status.snapshot();
    let last_error = last_error.unwrap_or_else(|| "unknown".to_string());

    let Some(last_successful_update) = last_successful_update else {
        return if let Some(last_attempted_update) = last_attempted_update {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!(
                    "Facilities have not been successfully synced. Last attempted update: {last_attempted_update}. Last error: {last_error}"
                ),
            )
        } else {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "No attempted or successful facility syncs".to_string(),
            )
        };
    };

    let max_age = TimeDelta::seconds(i64::try_from(state.interval_seconds.saturating_mul(2)).unwrap_or(i64::MAX));
    if (Utc::now() - last_successful_update) > max_age {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!(
                "Facilities not synced in the last {} seconds. Last successful update: {last_successful_update}. Last error: {last_error}",
                max_age.num_seconds()
            ),
        )
    } else {
        (
            StatusCode::OK,
            format!(
                "Facilities last synced: {last_successful_update}. Rendered markers: {rendered_markers}"
            ),
        )
    }
}

async fn status(State(state): State<AppState>) -> Json<SyncStatus> {
    Json(state.status.snapshot())
}

async fn markers(State(state): State<AppState>) -> Json<MapView> {
    Json(state.map.view())
}

#[derive(Debug, Serialize, PartialEq)]
pub struct FilterEntry {
    pub category: Category,
    pub label: &'static str,
    pub color: &'static str,
    pub visible: bool,
}

async fn filters(State(state): State<AppState>) -> Json<Vec<FilterEntry>> {
    let snapshot = state.filter_state.snapshot();
    Json(
        Category::ALL
            .into_iter()
            .map(|category| FilterEntry {
                category,
                label: category.label(),
                color: category.color(),
                visible: snapshot.is_visible(category),
            })
            .collect(),
    )
}

#[derive(Debug, Deserialize)]
pub struct VisibilityBody {
    pub visible: bool,
}

#[instrument(skip(state))]
async fn set_filter(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Json(body): Json<VisibilityBody>,
) -> StatusCode {
    let Ok(category) = category.parse::<Category>() else {
        return StatusCode::NOT_FOUND;
    };

    let toggle = FilterToggle {
        category,
        visible: body.visible,
    };
    if let Err(e) = state.toggles.send(toggle).await {
        warn!(name: "routes.filter.closed", error = ?e, "filter input is no longer accepting toggles");
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    StatusCode::ACCEPTED
}

#[derive(Debug, Deserialize)]
pub struct ViewportBody {
    pub mobile: bool,
}

#[instrument(skip(state))]
async fn set_viewport(State(state): State<AppState>, Json(body): Json<ViewportBody>) -> StatusCode {
    if state.viewport.set_mobile(body.mobile) {
        info!(name: "routes.viewport.changed", mobile = body.mobile, "device mode changed");
        state.refresh.fire();
    }
    StatusCode::NO_CONTENT
}

async fn refresh(State(state): State<AppState>) -> StatusCode {
    state.refresh.fire();
    StatusCode::ACCEPTED
}
