//! HTTP Front End
//!
//! JSON API over a shared [`Dispatcher`]. Each run is moved onto tokio's
//! blocking pool, so several triggers can execute at the same time.

use crate::dispatcher::{DispatchError, Dispatcher, UnitSource};
use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use demorun_report::RenderedOutcome;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }

    fn err(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: false,
            data: None,
            error: Some(message.into()),
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UnitInfo {
    pub identifier: String,
    pub display_name: String,
    pub environment: PathBuf,
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, (StatusCode, Json<ApiResponse<T>>)>;

fn error_response<T>(err: DispatchError) -> (StatusCode, Json<ApiResponse<T>>) {
    let status = match err {
        DispatchError::UnitNotFound(_) => StatusCode::NOT_FOUND,
        _ => {
            warn!("Request failed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, ApiResponse::err(err.to_string()))
}

pub fn create_router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/units", get(list_units))
        .route("/api/units/:id", get(view_unit))
        .route("/api/units/:id/run", post(run_unit))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { dispatcher })
}

/// Bind `addr` and serve until the process is stopped
pub async fn serve(dispatcher: Arc<Dispatcher>, addr: &str) -> anyhow::Result<()> {
    let app = create_router(dispatcher);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Starting server on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health_check() -> Json<ApiResponse<String>> {
    ApiResponse::ok("OK".to_string())
}

async fn list_units(State(state): State<AppState>) -> ApiResult<Vec<UnitInfo>> {
    let units = state.dispatcher.list().map_err(error_response)?;
    let infos = units
        .into_iter()
        .map(|unit| UnitInfo {
            environment: state
                .dispatcher
                .environment_for(&unit.identifier)
                .to_path_buf(),
            identifier: unit.identifier,
            display_name: unit.display_name,
        })
        .collect();
    Ok(ApiResponse::ok(infos))
}

async fn view_unit(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<UnitSource> {
    let source = state.dispatcher.view(&id).map_err(error_response)?;
    Ok(ApiResponse::ok(source))
}

async fn run_unit(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<RenderedOutcome> {
    let dispatcher = Arc::clone(&state.dispatcher);
    let joined = tokio::task::spawn_blocking(move || dispatcher.execute(&id)).await;
    match joined {
        Ok(result) => Ok(ApiResponse::ok(result.map_err(error_response)?)),
        Err(e) => {
            warn!("Execution task failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiResponse::err(format!("Execution task failed: {}", e)),
            ))
        }
    }
}
