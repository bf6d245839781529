// rest/mod.rs — Public REST API server.
//
// Axum HTTP server bridging REST calls to the entity stores and the
// movement coordinator.
//
// Endpoints (all under /api/v1):
//   GET  /health                      (no auth)
//   POST /auth/register               (no auth)
//   GET|POST /prospects         PUT|DELETE /prospects/{id}
//   GET|POST /interactions           DELETE /interactions/{id}
//   GET|POST /followups         PUT|DELETE /followups/{id}
//   GET|POST /routed-contacts   PUT|DELETE /routed-contacts/{id}
//   POST /moves
//   GET  /stats

pub mod auth;
pub mod routes;

use anyhow::Result;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::AppContext;

pub async fn start_rest_server(ctx: Arc<AppContext>) -> Result<()> {
    let bind = format!("{}:{}", ctx.config.bind_address, ctx.config.port);
    let addr: SocketAddr = bind.parse()?;

    let router = build_router(ctx);

    info!("REST API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        // Health (no auth)
        .route("/api/v1/health", get(routes::health::health))
        // Registration (no auth — returns the bearer token)
        .route("/api/v1/auth/register", post(routes::users::register))
        // Prospects
        .route(
            "/api/v1/prospects",
            get(routes::prospects::list).post(routes::prospects::create),
        )
        .route(
            "/api/v1/prospects/{id}",
            put(routes::prospects::update).delete(routes::prospects::remove),
        )
        // Interactions
        .route(
            "/api/v1/interactions",
            get(routes::interactions::list).post(routes::interactions::create),
        )
        .route(
            "/api/v1/interactions/{id}",
            delete(routes::interactions::remove),
        )
        // Followups
        .route(
            "/api/v1/followups",
            get(routes::followups::list).post(routes::followups::create),
        )
        .route(
            "/api/v1/followups/{id}",
            put(routes::followups::update).delete(routes::followups::remove),
        )
        // Routed contacts (sector triage board)
        .route(
            "/api/v1/routed-contacts",
            get(routes::routed_contacts::list).post(routes::routed_contacts::create),
        )
        .route(
            "/api/v1/routed-contacts/{id}",
            put(routes::routed_contacts::update).delete(routes::routed_contacts::remove),
        )
        // Record movement
        .route("/api/v1/moves", post(routes::moves::create))
        // Dashboard counters
        .route("/api/v1/stats", get(routes::stats::dashboard))
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}
