//! Rutas de la API
//!
//! Este módulo contiene los routers del scheduler y el armado de la
//! aplicación completa.

pub mod scheduler_routes;

use axum::{response::Json, routing::get, Router};
use serde_json::json;

use crate::middleware::auth::auth_middleware;
use crate::middleware::cors::cors_middleware;
use crate::state::AppState;

/// Armar la aplicación completa: rutas del scheduler detrás del
/// middleware JWT, más el health check público.
pub fn create_app(state: AppState) -> Router {
    let scheduler = Router::new()
        .nest("/api/routes", scheduler_routes::create_route_slots_router())
        .nest(
            "/api/slot-assignments",
            scheduler_routes::create_assignments_router(),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_endpoint))
        .merge(scheduler)
        .layer(cors_middleware())
        .with_state(state)
}

/// Endpoint de health check
async fn health_endpoint() -> Json<serde_json::Value> {
    Json(json!({
        "service": "transit-slot-scheduler",
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
