use axum::{routing::get, Router};

pub mod common;
pub mod companies;
pub mod projects;
pub mod system;
pub mod tickets;
pub mod users;

pub const API_PREFIX: &str = "/api/v1/companies";

/// All routes. Authentication is decided per matched route by the auth layer.
pub fn router() -> Router {
    let projects = projects::router().nest("/:project_id/tickets", tickets::router());

    let companies = companies::router()
        .nest("/:company_id/users", users::router())
        .nest("/:company_id/projects", projects);

    Router::new()
        .route("/health", get(system::health))
        .nest(API_PREFIX, companies)
}
