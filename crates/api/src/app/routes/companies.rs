use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use tracker_core::CompanyId;

use crate::app::dto;
use crate::app::errors;
use crate::app::routes::common::{json_body, respond, respond_list};
use crate::app::services::AppServices;
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_companies).post(create_company))
        .route("/:company_id", get(get_company))
}

pub async fn list_companies(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    respond_list(services.domain.companies.list().await, dto::company_to_json)
}

pub async fn get_company(
    Extension(services): Extension<Arc<AppServices>>,
    Path(company_id): Path<CompanyId>,
) -> axum::response::Response {
    respond(
        StatusCode::OK,
        services.domain.companies.get(company_id).await,
        dto::company_to_json,
    )
}

pub async fn create_company(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    body: Result<Json<dto::CompanyRequest>, JsonRejection>,
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
            .companies
            .create(caller.principal(), draft)
            .await,
        dto::company_to_json,
    )
}
