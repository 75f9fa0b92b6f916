use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use miette::IntoDiagnostic;
use sea_orm::DatabaseConnection;
use tower_http::trace::TraceLayer;

use crate::authz::engine::PolicyEngine;
use crate::authz::resolver::ResourceResolver;
use crate::authz::service::PolicyAdminService;
use crate::principal;
use crate::settings::Settings;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub db: DatabaseConnection,
    pub engine: Arc<PolicyEngine>,
    pub resolver: Arc<ResourceResolver>,
    pub admin: PolicyAdminService,
}

// Security headers middleware
async fn security_headers(request: Request<Body>, next: Next) -> impl IntoResponse {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(
        HeaderName::from_static("x-frame-options"),
        HeaderValue::from_static("DENY"),
    );
    headers.insert(
        HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        HeaderName::from_static("referrer-policy"),
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    response
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Assemble the full application router. Layer order matters: requests
/// pass tracing, then security headers, then the principal adapter, then
/// the authorization filter, before reaching any route.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .merge(crate::authz::web::router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            crate::authz::filter::authorize,
        ))
        .layer(middleware::from_fn(principal::attach_principal))
        .layer(middleware::from_fn(security_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(
    settings: Settings,
    db: DatabaseConnection,
    engine: Arc<PolicyEngine>,
    resolver: Arc<ResourceResolver>,
) -> miette::Result<()> {
    let admin = PolicyAdminService::new(db.clone(), engine.clone());
    let state = AppState {
        settings: Arc::new(settings),
        db,
        engine,
        resolver,
        admin,
    };

    let addr: SocketAddr = format!(
        "{}:{}",
        state.settings.server.host, state.settings.server.port
    )
    .parse()
    .map_err(|e| miette::miette!("bad listen addr: {e}"))?;

    let router = app_router(state);

    tracing::info!(%addr, "Valoris API listening");
    let listener = tokio::net::TcpListener::bind(addr).await.into_diagnostic()?;
    axum::serve(listener, router).await.into_diagnostic()?;
    Ok(())
}
