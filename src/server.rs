use crate::basemap::Outline;
use crate::config::AppConfig;
use crate::controller::Command;
use crate::dashboard::{build_dashboard, Dashboard, Frame, View};
use crate::data::FilterOptions;
use crate::filter::FilterForm;
use crate::lookup::Tooltip;
use crate::snapshot::encode_png;
use crate::types::FilterState;
use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{error, info};

/// Lifecycle of the one-time dataset load.
pub enum LoadState {
    Loading,
    Ready(Box<Dashboard>),
    Failed(String),
}

pub struct AppState {
    /// Requests take this lock for the whole command, so commands apply one at a time.
    pub load: Mutex<LoadState>,
    pub config: AppConfig,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            load: Mutex::new(LoadState::Loading),
            config,
        }
    }

    pub fn set(&self, next: LoadState) {
        match self.load.lock() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }

    fn with_dashboard<T>(&self, f: impl FnOnce(&mut Dashboard) -> T) -> Result<T, ApiError> {
        let mut guard = self.load.lock().map_err(|_| ApiError::Poisoned)?;
        match &mut *guard {
            LoadState::Loading => Err(ApiError::Loading),
            LoadState::Failed(message) => Err(ApiError::LoadFailed(message.clone())),
            LoadState::Ready(dashboard) => Ok(f(dashboard)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("dataset is still loading")]
    Loading,
    #[error("dataset failed to load: {0}")]
    LoadFailed(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("dashboard state is poisoned")]
    Poisoned,
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Loading => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::LoadFailed(_) | ApiError::Poisoned | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    Loading,
    Ready,
    Failed,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: LoadStatus,
    pub communes: Option<usize>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Next,
    Previous,
}

#[derive(Debug, Deserialize)]
pub struct PageRequest {
    pub page: Option<usize>,
    pub step: Option<Step>,
}

#[derive(Deserialize)]
pub struct LookupParams {
    lat: f64,
    lon: f64,
}

pub fn router(state: SharedState) -> Router {
    let static_files = ServeDir::new(&state.config.server.static_dir);

    Router::new()
        .route("/api/status", get(status_handler))
        .route("/api/options", get(options_handler))
        .route("/api/view", get(view_handler))
        .route("/api/filter", post(filter_handler))
        .route("/api/page", post(page_handler))
        .route("/api/lookup", get(lookup_handler))
        .route("/api/basemap", get(basemap_handler))
        .route("/api/map.png", get(map_png_handler))
        .fallback_service(static_files)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(config: AppConfig) -> Result<()> {
    let port = config.server.port;
    let state: SharedState = Arc::new(AppState::new(config));

    // the only asynchronous work: one load, no retry
    tokio::spawn(load_in_background(state.clone()));

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}

pub async fn load_in_background(state: SharedState) {
    let next = match build_dashboard(&state.config).await {
        Ok(dashboard) => LoadState::Ready(Box::new(dashboard)),
        Err(e) => {
            error!("Failed to load dataset: {:#}", e);
            LoadState::Failed(format!("{:#}", e))
        }
    };
    state.set(next);
}

async fn status_handler(State(state): State<SharedState>) -> Json<StatusResponse> {
    let response = match state.with_dashboard(|d| d.controller().dataset().len()) {
        Ok(communes) => StatusResponse { status: LoadStatus::Ready, communes: Some(communes), error: None },
        Err(ApiError::Loading) => StatusResponse { status: LoadStatus::Loading, communes: None, error: None },
        Err(e) => StatusResponse { status: LoadStatus::Failed, communes: None, error: Some(e.to_string()) },
    };
    Json(response)
}

async fn options_handler(State(state): State<SharedState>) -> Result<Json<FilterOptions>, ApiError> {
    state.with_dashboard(|d| Json(d.options()))
}

async fn view_handler(State(state): State<SharedState>) -> Result<Json<View>, ApiError> {
    state.with_dashboard(|d| Json(d.view()))
}

async fn filter_handler(
    State(state): State<SharedState>,
    Json(form): Json<FilterForm>,
) -> Result<Json<Frame>, ApiError> {
    let filter = FilterState::from_form(&form).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    state.with_dashboard(|d| Json(d.dispatch(Command::FilterChanged(filter))))
}

async fn page_handler(
    State(state): State<SharedState>,
    Json(request): Json<PageRequest>,
) -> Result<Json<Frame>, ApiError> {
    let command = match (request.page, request.step) {
        (Some(page), _) => Command::PageRequested(page),
        (None, Some(Step::Next)) => Command::NextPage,
        (None, Some(Step::Previous)) => Command::PreviousPage,
        (None, None) => return Err(ApiError::BadRequest("expected `page` or `step`".to_string())),
    };
    state.with_dashboard(|d| Json(d.dispatch(command)))
}

async fn lookup_handler(
    State(state): State<SharedState>,
    Query(params): Query<LookupParams>,
) -> Result<Json<Option<Tooltip>>, ApiError> {
    let radius = state.config.server.lookup_radius;
    state.with_dashboard(|d| Json(d.lookup(params.lon, params.lat, radius)))
}

async fn basemap_handler(State(state): State<SharedState>) -> Result<Json<Vec<Outline>>, ApiError> {
    state.with_dashboard(|d| Json(d.outlines().to_vec()))
}

async fn map_png_handler(State(state): State<SharedState>) -> Result<Response, ApiError> {
    let img = state.with_dashboard(|d| d.render_map_image())?;
    let png = encode_png(&img).map_err(|e| ApiError::Internal(format!("{:#}", e)))?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InputConfig;
    use crate::data::Dataset;
    use crate::test_support::sample_records;

    fn config() -> AppConfig {
        AppConfig {
            input: InputConfig { data_source: "missing-file.csv".to_string(), basemap: None },
            map: Default::default(),
            chart: Default::default(),
            server: Default::default(),
            output: Default::default(),
        }
    }

    fn ready_state(n: usize) -> SharedState {
        let config = config();
        let (dashboard, _) = Dashboard::new(Arc::new(Dataset::from_records(sample_records(n))), &config);
        let state = AppState::new(config);
        state.set(LoadState::Ready(Box::new(dashboard)));
        Arc::new(state)
    }

    #[tokio::test]
    async fn endpoints_are_unavailable_while_loading() {
        let state = Arc::new(AppState::new(config()));

        let Json(status) = status_handler(State(state.clone())).await;
        assert_eq!(status.status, LoadStatus::Loading);

        let err = view_handler(State(state)).await.unwrap_err();
        assert!(matches!(err, ApiError::Loading));
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn failed_load_is_reported_and_blocks_the_dashboard() {
        let state = Arc::new(AppState::new(config()));
        load_in_background(state.clone()).await;

        let Json(status) = status_handler(State(state.clone())).await;
        assert_eq!(status.status, LoadStatus::Failed);
        assert!(status.error.unwrap().contains("missing-file.csv"));

        let err = options_handler(State(state)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn filter_then_page_through_the_api() {
        let state = ready_state(23);

        let form = FilterForm {
            category: "all".to_string(),
            server: "all".to_string(),
            https: "Oui".to_string(),
            population: String::new(),
        };
        let Json(frame) = filter_handler(State(state.clone()), Json(form)).await.unwrap();
        assert_eq!(frame.filtered, 12);
        assert!(frame.map.is_some());
        assert_eq!(frame.table.page.total_pages, 2);

        let request = PageRequest { page: None, step: Some(Step::Next) };
        let Json(frame) = page_handler(State(state.clone()), Json(request)).await.unwrap();
        assert!(frame.map.is_none());
        assert_eq!(frame.table.page.current_page, 2);
        assert_eq!(frame.table.rows.len(), 2);

        let Json(status) = status_handler(State(state)).await;
        assert_eq!(status.communes, Some(23));
    }

    #[tokio::test]
    async fn unknown_category_is_a_bad_request() {
        let state = ready_state(5);
        let form = FilterForm { category: "Obsolète".to_string(), ..FilterForm::default() };
        let err = filter_handler(State(state), Json(form)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_page_request_is_rejected() {
        let state = ready_state(5);
        let request = PageRequest { page: None, step: None };
        assert!(matches!(
            page_handler(State(state), Json(request)).await,
            Err(ApiError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn lookup_and_png_serve_the_current_map() {
        let state = ready_state(5);

        let params = LookupParams { lat: 43.1, lon: 1.05 };
        let Json(tip) = lookup_handler(State(state.clone()), Query(params)).await.unwrap();
        assert_eq!(tip.unwrap().code, "10001");

        let response = map_png_handler(State(state)).await.unwrap();
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    }
}
