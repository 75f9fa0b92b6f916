use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use miette::Diagnostic;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum AuthzError {
    #[error("Authorization model is not loaded")]
    #[diagnostic(
        code(valoris::authz::not_loaded),
        help("Call `PolicyEngine::load` before issuing queries; the service must not run unloaded")
    )]
    NotLoaded,

    #[error("Policy store error: {0}")]
    #[diagnostic(code(valoris::authz::store))]
    Store(#[from] sea_orm::DbErr),

    #[error("Invalid policy rule: {0}")]
    #[diagnostic(
        code(valoris::authz::invalid_rule),
        help("Permission rows need non-null v0 (role), v1 (resource) and v2 (action) slots")
    )]
    InvalidRule(String),

    #[error("Invalid policy input: {0}")]
    #[diagnostic(
        code(valoris::authz::invalid_input),
        help("role, resource and action are required and must not be blank")
    )]
    InvalidInput(String),

    #[error("Policy engine lock poisoned")]
    #[diagnostic(code(valoris::authz::poisoned))]
    EnginePoisoned,
}

impl IntoResponse for AuthzError {
    fn into_response(self) -> Response {
        let status = match &self {
            AuthzError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}
