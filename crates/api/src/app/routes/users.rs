use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};

use tracker_core::{CompanyId, RoleId, UserId};

use crate::app::dto;
use crate::app::errors;
use crate::app::routes::common::{json_body, no_content, respond, respond_list};
use crate::app::services::AppServices;
use crate::context::CallerContext;

/// Nested under `/api/v1/companies/:company_id/users`.
pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route(
            "/:user_id",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .route("/:user_id/assign-role/:role_id", patch(assign_role))
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Path(company_id): Path<CompanyId>,
) -> axum::response::Response {
    respond_list(
        services.domain.users.list(company_id).await,
        dto::user_to_json,
    )
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path((company_id, user_id)): Path<(CompanyId, UserId)>,
) -> axum::response::Response {
    respond(
        StatusCode::OK,
        services.domain.users.get(company_id, user_id).await,
        dto::user_to_json,
    )
}

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(company_id): Path<CompanyId>,
    body: Result<Json<dto::UserRequest>, JsonRejection>,
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
        services.domain.users.create(company_id, draft).await,
        dto::user_to_json,
    )
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path((company_id, user_id)): Path<(CompanyId, UserId)>,
    body: Result<Json<dto::UserRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match json_body(body) {
        Ok(b) => b,
        Err(response) => return response,
    };
    let patch = match body.into_patch() {
        Ok(p) => p,
        Err(fields) => return errors::validation_error(fields),
    };

    respond(
        StatusCode::OK,
        services
            .domain
            .users
            .update(caller.principal(), company_id, user_id, patch)
            .await,
        dto::user_to_json,
    )
}

pub async fn assign_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path((company_id, user_id, role_id)): Path<(CompanyId, UserId, RoleId)>,
) -> axum::response::Response {
    respond(
        StatusCode::OK,
        services
            .domain
            .users
            .assign_role(caller.principal(), company_id, user_id, role_id)
            .await,
        dto::user_to_json,
    )
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path((company_id, user_id)): Path<(CompanyId, UserId)>,
) -> axum::response::Response {
    no_content(
        services
            .domain
            .users
            .delete(caller.principal(), company_id, user_id)
            .await,
    )
}
