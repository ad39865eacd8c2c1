//! Axum-based HTTP surface: sensor state, live updates and the fee dialogs

use crate::config::Config;
use crate::error::PorssisahkoError;
use crate::options::{self, ABORT_SINGLE_INSTANCE};
use crate::runtime::SupervisorHandle;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::WatchStream;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub handle: SupervisorHandle,
    pub config: Arc<Config>,
}

fn error_status(err: &PorssisahkoError) -> StatusCode {
    match err {
        PorssisahkoError::Validation { .. } => StatusCode::BAD_REQUEST,
        PorssisahkoError::AlreadyConfigured => StatusCode::CONFLICT,
        PorssisahkoError::Config { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_body(err: &PorssisahkoError) -> (StatusCode, Json<serde_json::Value>) {
    (error_status(err), Json(json!({"error": err.to_string()})))
}

pub(crate) async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub(crate) async fn sensor_state(State(state): State<AppState>) -> impl IntoResponse {
    match state.handle.sensor() {
        Some(sensor) => (StatusCode::OK, Json(json!(sensor.state()))),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"error": "sensor not set up"})),
        ),
    }
}

pub(crate) async fn events(State(state): State<AppState>) -> impl IntoResponse {
    // A reload publishes its first snapshot before the sensor is back, so
    // re-registration must trigger a frame as well
    let snapshots = WatchStream::new(state.handle.subscribe_state()).map(|_| ());
    let registrations = WatchStream::new(state.handle.subscribe_sensor()).map(|_| ());
    let handle = state.handle.clone();
    let stream = snapshots.merge(registrations).filter_map(move |()| {
        let sensor = handle.sensor()?;
        let payload = serde_json::to_string(&sensor.state()).ok()?;
        Some(Ok::<Event, std::convert::Infallible>(
            Event::default().event("state").data(payload),
        ))
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

pub(crate) async fn get_setup(State(state): State<AppState>) -> impl IntoResponse {
    match state.handle.entry().await {
        Ok(Some(_)) => (
            StatusCode::OK,
            Json(json!({"type": "abort", "reason": ABORT_SINGLE_INSTANCE})),
        ),
        Ok(None) => (
            StatusCode::OK,
            Json(json!({"type": "form", "form": options::user_step_form()})),
        ),
        Err(e) => error_body(&e),
    }
}

pub(crate) async fn post_setup(
    State(state): State<AppState>,
    Json(input): Json<serde_json::Value>,
) -> impl IntoResponse {
    let parsed = match options::parse_user_input(&input) {
        Ok(o) => o,
        Err(e) => return error_body(&e),
    };
    match state.handle.install(parsed).await {
        Ok(entry) => (
            StatusCode::OK,
            Json(json!({"type": "create_entry", "title": entry.title, "entry_id": entry.entry_id})),
        ),
        Err(PorssisahkoError::AlreadyConfigured) => (
            StatusCode::CONFLICT,
            Json(json!({"type": "abort", "reason": ABORT_SINGLE_INSTANCE})),
        ),
        Err(e) => error_body(&e),
    }
}

pub(crate) async fn get_options(State(state): State<AppState>) -> impl IntoResponse {
    match state.handle.entry().await {
        Ok(Some(entry)) => (
            StatusCode::OK,
            Json(json!({"type": "form", "form": options::options_step_form(&entry)})),
        ),
        Ok(None) => error_body(&PorssisahkoError::config("No config entry")),
        Err(e) => error_body(&e),
    }
}

pub(crate) async fn post_options(
    State(state): State<AppState>,
    Json(input): Json<serde_json::Value>,
) -> impl IntoResponse {
    let parsed = match options::parse_user_input(&input) {
        Ok(o) => o,
        Err(e) => return error_body(&e),
    };
    match state.handle.update_options(parsed).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({"type": "create_entry", "data": parsed})),
        ),
        Err(e) => error_body(&e),
    }
}

pub(crate) async fn get_config(State(state): State<AppState>) -> impl IntoResponse {
    let json = serde_json::to_value(state.config.as_ref())
        .unwrap_or_else(|_| json!({"error": "serialization"}));
    Json(json)
}

pub(crate) async fn get_config_schema() -> impl IntoResponse {
    let schema = schemars::schema_for!(crate::config::Config);
    Json(serde_json::to_value(&schema).unwrap_or_else(|_| json!({"error": "schema"})))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/state", get(sensor_state))
        .route("/api/events", get(events))
        .route("/api/setup", get(get_setup).post(post_setup))
        .route("/api/options", get(get_options).post(post_options))
        .route("/api/config", get(get_config))
        .route("/api/config/schema", get(get_config_schema))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let router = build_router(state);
    let logger = crate::logging::get_logger("web");
    logger.info(&format!(
        "Starting web server; requested host={host}, port={port}"
    ));

    let addr = match host.parse::<IpAddr>() {
        Ok(ip) => SocketAddr::new(ip, port),
        Err(_) => {
            logger.warn(&format!("Invalid host '{host}'; falling back to 127.0.0.1"));
            ([127, 0, 0, 1], port).into()
        }
    };

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    logger.info(&format!(
        "Web server listening at http://{local_addr} (state /api/state, options /api/options)"
    ));

    axum::serve(listener, router).await?;
    Ok(())
}
