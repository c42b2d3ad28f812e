use axum::{Router, extract::FromRef, http::HeaderName, routing::get};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Navigation core: route matching, access gating and the session it reads.
pub mod errors;
pub mod gate;
pub mod session;

// Data contracts shared with the backend and the renderer.
pub mod models;

// HTTP surface.
pub mod auth;
pub mod config;
pub mod handlers;

// Page route declarations, segregated by access level (Public, Admin).
pub mod routes;

// --- Public Re-exports ---

pub use config::AppConfig;
pub use errors::GateError;
pub use gate::{Decision, NavigationGate, PageId, RedirectReason, Route, RouteTable};
pub use session::{KeyValueSessionStore, MemorySessionStore, Session, SessionStore, SessionUser};

/// ApiDoc
///
/// OpenAPI document for the navigation endpoints plus every data contract the
/// frontend and backend exchange, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(handlers::list_routes, handlers::navigate),
    components(
        schemas(
            gate::PageId, gate::Decision, gate::RedirectReason,
            models::RouteSummary, models::PageView,
            models::Comment, models::Species, models::SpeciesDetailResponse,
            models::Observation, models::ObservationLocation, models::ObservationProperties,
            models::DetailedObservation, models::DetailedObservationProperties,
            models::MapObservation, models::MapCoordinates, models::MapObservationProperties,
            models::FilterOptions, models::TaxaOptions,
        )
    ),
    tags(
        (name = "biodiversity-portal", description = "Page navigation and observation data contracts")
    )
)]
struct ApiDoc;

/// GateState
///
/// The navigation gate shared across requests. It is immutable after startup.
pub type GateState = Arc<NavigationGate>;

/// AppState
///
/// Single container for everything handlers need, cloned cheaply per request.
#[derive(Clone)]
pub struct AppState {
    pub gate: GateState,
    pub config: AppConfig,
}

impl AppState {
    /// Builds the state around the application's own route table.
    pub fn new(config: AppConfig) -> Result<Self, GateError> {
        let gate = NavigationGate::new(routes::route_table()?)?;
        Ok(Self {
            gate: Arc::new(gate),
            config,
        })
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for GateState {
    fn from_ref(app_state: &AppState) -> GateState {
        app_state.gate.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the HTTP surface: health and API endpoints, the OpenAPI document, and
/// the page fallback that runs every other path through the navigation gate.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(|| async { "ok" }))
        .route("/api/routes", get(handlers::list_routes))
        .route("/api/navigate", get(handlers::navigate))
        // Anything else is a page path.
        .fallback(handlers::render_page)
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the per-request span, tagged with the `x-request-id` set by the layer above
/// so every log line of one request correlates.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
