use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// GateError
///
/// Every failure the navigation layer can surface to its caller. Access denials are
/// not errors: they come back as `Decision::Redirect` with an inspectable reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    /// No pattern in the route table matches the requested path.
    #[error("no route matches path '{path}'")]
    RouteNotFound { path: String },

    #[error("invalid route pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("route name '{0}' is declared more than once")]
    DuplicateRouteName(String),

    #[error("no route is named '{0}'")]
    UnknownRouteName(String),

    #[error("route '{route}' requires parameter '{param}'")]
    MissingParam { route: String, param: String },

    /// A configured redirect target is unmatched or is itself gated.
    #[error("redirect target '{0}' must resolve to an ungated route")]
    InvalidRedirect(String),
}

impl GateError {
    pub fn status(&self) -> StatusCode {
        match self {
            GateError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            GateError::UnknownRouteName(_) | GateError::MissingParam { .. } => {
                StatusCode::BAD_REQUEST
            }
            // Table construction problems reaching a request are server faults.
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}
