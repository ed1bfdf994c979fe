//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and the aggregate services
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request DTOs, request-shape validation and JSON mapping
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Router over already-built services. Tests call this directly.
pub fn router(services: Arc<AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        store: services.store.clone(),
    };

    routes::router()
        .route_layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ))
        .layer(ServiceBuilder::new().layer(Extension(services)))
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &ApiConfig) -> anyhow::Result<Router> {
    let services = services::build_services(config).await?;
    Ok(router(Arc::new(services)))
}
