use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use tracker_core::{CompanyId, ProjectId, TicketId};

use crate::app::dto;
use crate::app::errors;
use crate::app::routes::common::{json_body, no_content, respond, respond_list};
use crate::app::services::AppServices;
use crate::context::CallerContext;

/// Nested under `/api/v1/companies/:company_id/projects/:project_id/tickets`.
pub fn router() -> Router {
    Router::new()
        .route("/", get(list_tickets).post(create_ticket))
        .route(
            "/:ticket_id",
            get(get_ticket).patch(update_ticket).delete(delete_ticket),
        )
}

pub async fn list_tickets(
    Extension(services): Extension<Arc<AppServices>>,
    Path((company_id, project_id)): Path<(CompanyId, ProjectId)>,
) -> axum::response::Response {
    respond_list(
        services.domain.tickets.list(company_id, project_id).await,
        dto::ticket_to_json,
    )
}

pub async fn get_ticket(
    Extension(services): Extension<Arc<AppServices>>,
    Path((company_id, project_id, ticket_id)): Path<(CompanyId, ProjectId, TicketId)>,
) -> axum::response::Response {
    respond(
        StatusCode::OK,
        services
            .domain
            .tickets
            .get(company_id, project_id, ticket_id)
            .await,
        dto::ticket_to_json,
    )
}

pub async fn create_ticket(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path((company_id, project_id)): Path<(CompanyId, ProjectId)>,
    body: Result<Json<dto::TicketRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match json_body(body) {
        Ok(b) => b,
        Err(response) => return response,
    };
    let draft = match body.into_draft() {
        Ok(d) => d,
        Err(fields) => return errors::validation_error(fields),
    };

    respond(
        StatusCode::CREATED,
        services
            .domain
            .tickets
            .create(caller.principal(), company_id, project_id, draft)
            .await,
        dto::ticket_to_json,
    )
}

pub async fn update_ticket(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path((company_id, project_id, ticket_id)): Path<(CompanyId, ProjectId, TicketId)>,
    body: Result<Json<dto::TicketRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match json_body(body) {
        Ok(b) => b,
        Err(response) => return response,
    };
    respond(
        StatusCode::OK,
        services
            .domain
            .tickets
            .update(
                caller.principal(),
                company_id,
                project_id,
                ticket_id,
                body.into_patch(),
            )
            .await,
        dto::ticket_to_json,
    )
}

pub async fn delete_ticket(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path((company_id, project_id, ticket_id)): Path<(CompanyId, ProjectId, TicketId)>,
) -> axum::response::Response {
    no_content(
        services
            .domain
            .tickets
            .delete(caller.principal(), company_id, project_id, ticket_id)
            .await,
    )
}
