use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::authz::resolver::ResourceResolver;
use crate::authz::types::AuthorizationDecision;
use crate::principal::Principal;
use crate::web::AppState;

/// Request-scoped authorization gate, layered over every route.
///
/// Runs after the principal adapter and before business logic. Paths the
/// resolver does not know are unprotected and pass through, as do requests
/// without an authenticated principal: authentication enforcement is an
/// upstream concern and this filter never answers 401. Everything else is
/// allowed iff any caller role holds a matching policy; otherwise the
/// request is answered 403 on the spot.
pub async fn authorize(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let Some(resource) = state.resolver.resolve(req.uri().path()) else {
        return next.run(req).await;
    };
    let resource = resource.to_string();

    let Some(principal) = req.extensions().get::<Principal>().cloned() else {
        return next.run(req).await;
    };

    let action = ResourceResolver::action_for(req.method());

    for role in &principal.roles {
        match state.engine.enforce(role, &resource, action) {
            Ok(true) => {
                tracing::debug!(
                    role,
                    resource = %resource,
                    action,
                    subject = %principal.subject,
                    "Access granted"
                );
                return next.run(req).await;
            }
            Ok(false) => {}
            // A failing role check must not turn into a 500 when another
            // role could still grant access; treat it as a non-match.
            Err(e) => {
                tracing::error!(role, error = %e, "Policy evaluation failed for role");
            }
        }
    }

    let decision = AuthorizationDecision {
        allowed: false,
        roles: principal.roles.clone(),
        resource,
        action: action.to_string(),
    };
    tracing::warn!(
        method = %req.method(),
        path = req.uri().path(),
        subject = %principal.subject,
        roles = ?decision.roles,
        resource = %decision.resource,
        action = %decision.action,
        "Access denied"
    );
    deny()
}

/// Generic denial body: nothing about the evaluated roles or resources
/// leaks to the client.
fn deny() -> Response {
    (StatusCode::FORBIDDEN, Json(json!({ "error": "Access denied" }))).into_response()
}
