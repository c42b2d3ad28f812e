use crate::{
    GateState,
    auth::CurrentSession,
    errors::GateError,
    gate::Decision,
    models::{PageView, RouteSummary},
};
use axum::{
    Json,
    extract::{Query, State},
    http::{Method, StatusCode, Uri, header},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

/// Response header naming why a page navigation was redirected.
pub const REDIRECT_REASON_HEADER: &str = "x-redirect-reason";

// --- Query Structs ---

/// NavigateQuery
///
/// Query parameters of the dry-run navigation endpoint (GET /api/navigate).
#[derive(Deserialize, utoipa::IntoParams)]
pub struct NavigateQuery {
    /// Target path to resolve, e.g. `/admin/dashboard` or `/species/Puma_concolor`.
    pub path: String,
}

// --- Handlers ---

/// list_routes
///
/// Lists the route table in declaration order, which is also match precedence.
#[utoipa::path(
    get,
    path = "/api/routes",
    responses((status = 200, description = "Route table", body = [RouteSummary]))
)]
pub async fn list_routes(State(gate): State<GateState>) -> Json<Vec<RouteSummary>> {
    Json(gate.table().routes().iter().map(RouteSummary::from).collect())
}

/// navigate
///
/// Resolves a target path against the caller's session without performing the
/// navigation. Clients use it to decide where a link should really go.
#[utoipa::path(
    get,
    path = "/api/navigate",
    params(NavigateQuery),
    responses(
        (status = 200, description = "Navigation decision", body = Decision),
        (status = 404, description = "No route matches the path")
    )
)]
pub async fn navigate(
    State(gate): State<GateState>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<NavigateQuery>,
) -> Result<Json<Decision>, GateError> {
    gate.resolve(&query.path, &session).map(Json)
}

/// render_page
///
/// Fallback for every path that is not an API endpoint: each one is a page
/// navigation. A permitted navigation returns the page view for the renderer; a
/// denied one becomes a 303 redirect carrying its reason in `x-redirect-reason`.
/// Pages are only ever fetched: any method other than GET or HEAD is a 405.
pub async fn render_page(
    State(gate): State<GateState>,
    CurrentSession(session): CurrentSession,
    method: Method,
    uri: Uri,
) -> Result<Response, GateError> {
    if method != Method::GET && method != Method::HEAD {
        return Ok((
            StatusCode::METHOD_NOT_ALLOWED,
            [(header::ALLOW, "GET, HEAD")],
        )
            .into_response());
    }

    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());

    let response = match gate.resolve(target, &session)? {
        Decision::Proceed { page, params, .. } => Json(PageView {
            page,
            path: uri.path().to_string(),
            params,
        })
        .into_response(),
        Decision::Redirect { to, reason } => (
            [(REDIRECT_REASON_HEADER, reason.as_str())],
            Redirect::to(&to),
        )
            .into_response(),
    };

    Ok(response)
}
