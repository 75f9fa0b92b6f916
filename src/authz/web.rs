use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::authz::errors::AuthzError;
use crate::authz::types::{ExistsResponse, MutationResponse, PolicyInput, PolicyView};
use crate::web::AppState;

/// Administrative policy surface. Mounted under `/api/admin/policies`,
/// which the resolver maps to the `policies` resource, so the filter
/// guards these routes like any other.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/admin/policies",
            get(list_policies).post(add_policy).delete(remove_policy),
        )
        .route("/api/admin/policies/roles/{role}", get(policies_for_role))
        .route("/api/admin/policies/check", post(check_policy))
        .route("/api/admin/policies/reload", post(reload_policies))
}

async fn list_policies(State(state): State<AppState>) -> Result<Json<Vec<PolicyView>>, AuthzError> {
    let tuples = state.admin.all_policies()?;
    Ok(Json(tuples.iter().map(PolicyView::from).collect()))
}

async fn policies_for_role(
    State(state): State<AppState>,
    Path(role): Path<String>,
) -> Result<Json<Vec<PolicyView>>, AuthzError> {
    let tuples = state.admin.policies_for_role(&role)?;
    Ok(Json(tuples.iter().map(PolicyView::from).collect()))
}

async fn add_policy(
    State(state): State<AppState>,
    Json(input): Json<PolicyInput>,
) -> Result<(StatusCode, Json<MutationResponse>), AuthzError> {
    let (role, resource, action) = input.normalized()?;
    if state.admin.add_policy(role, resource, action).await? {
        Ok((
            StatusCode::CREATED,
            Json(MutationResponse {
                success: true,
                message: format!("Policy ({role}, {resource}, {action}) added"),
            }),
        ))
    } else {
        Ok((
            StatusCode::BAD_REQUEST,
            Json(MutationResponse {
                success: false,
                message: format!("Policy ({role}, {resource}, {action}) already exists"),
            }),
        ))
    }
}

async fn remove_policy(
    State(state): State<AppState>,
    Json(input): Json<PolicyInput>,
) -> Result<(StatusCode, Json<MutationResponse>), AuthzError> {
    let (role, resource, action) = input.normalized()?;
    if state.admin.remove_policy(role, resource, action).await? {
        Ok((
            StatusCode::OK,
            Json(MutationResponse {
                success: true,
                message: format!("Policy ({role}, {resource}, {action}) removed"),
            }),
        ))
    } else {
        Ok((
            StatusCode::NOT_FOUND,
            Json(MutationResponse {
                success: false,
                message: format!("Policy ({role}, {resource}, {action}) not found"),
            }),
        ))
    }
}

async fn check_policy(
    State(state): State<AppState>,
    Json(input): Json<PolicyInput>,
) -> Result<Json<ExistsResponse>, AuthzError> {
    let (role, resource, action) = input.normalized()?;
    let exists = state.admin.has_policy(role, resource, action)?;
    Ok(Json(ExistsResponse { exists }))
}

async fn reload_policies(
    State(state): State<AppState>,
) -> Result<Json<MutationResponse>, AuthzError> {
    state.admin.reload_policy().await?;
    Ok(Json(MutationResponse {
        success: true,
        message: "Policies reloaded from store".to_string(),
    }))
}
