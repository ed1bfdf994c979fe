use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};

use tracker_core::{CompanyId, ProjectId, UserId};

use crate::app::dto;
use crate::app::errors;
use crate::app::routes::common::{json_body, no_content, respond, respond_list};
use crate::app::services::AppServices;
use crate::context::CallerContext;

/// Nested under `/api/v1/companies/:company_id/projects`.
pub fn router() -> Router {
    Router::new()
        .route("/", get(list_projects).post(create_project))
        .route(
            "/:project_id",
            get(get_project).patch(update_project).delete(delete_project),
        )
        .route("/:project_id/users", get(list_members))
        .route("/:project_id/add-user/:user_id", post(add_member))
        .route("/:project_id/remove-user/:user_id", delete(remove_member))
}

pub async fn list_projects(
    Extension(services): Extension<Arc<AppServices>>,
    Path(company_id): Path<CompanyId>,
) -> axum::response::Response {
    respond_list(
        services.domain.projects.list(company_id).await,
        dto::project_to_json,
    )
}

pub async fn get_project(
    Extension(services): Extension<Arc<AppServices>>,
    Path((company_id, project_id)): Path<(CompanyId, ProjectId)>,
) -> axum::response::Response {
    respond(
        StatusCode::OK,
        services.domain.projects.get(company_id, project_id).await,
        dto::project_to_json,
    )
}

pub async fn list_members(
    Extension(services): Extension<Arc<AppServices>>,
    Path((company_id, project_id)): Path<(CompanyId, ProjectId)>,
) -> axum::response::Response {
    respond_list(
        services.domain.projects.members(company_id, project_id).await,
        dto::user_to_json,
    )
}

pub async fn create_project(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(company_id): Path<CompanyId>,
    body: Result<Json<dto::ProjectRequest>, JsonRejection>,
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
            .projects
            .create(caller.principal(), company_id, draft)
            .await,
        dto::project_to_json,
    )
}

pub async fn update_project(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path((company_id, project_id)): Path<(CompanyId, ProjectId)>,
    body: Result<Json<dto::ProjectRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match json_body(body) {
        Ok(b) => b,
        Err(response) => return response,
    };
    respond(
        StatusCode::OK,
        services
            .domain
            .projects
            .update(caller.principal(), company_id, project_id, body.into_patch())
            .await,
        dto::project_to_json,
    )
}

pub async fn delete_project(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path((company_id, project_id)): Path<(CompanyId, ProjectId)>,
) -> axum::response::Response {
    no_content(
        services
            .domain
            .projects
            .delete(caller.principal(), company_id, project_id)
            .await,
    )
}

pub async fn add_member(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path((company_id, project_id, user_id)): Path<(CompanyId, ProjectId, UserId)>,
) -> axum::response::Response {
    no_content(
        services
            .domain
            .projects
            .add_member(caller.principal(), company_id, project_id, user_id)
            .await,
    )
}

pub async fn remove_member(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path((company_id, project_id, user_id)): Path<(CompanyId, ProjectId, UserId)>,
) -> axum::response::Response {
    no_content(
        services
            .domain
            .projects
            .remove_member(caller.principal(), company_id, project_id, user_id)
            .await,
    )
}
