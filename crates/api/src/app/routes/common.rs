use axum::{extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse, Json};

use tracker_core::DomainResult;

use crate::app::errors;

/// Render a service result: the mapped body on success, the error payload otherwise.
pub fn respond<T>(
    status: StatusCode,
    result: DomainResult<T>,
    to_json: impl FnOnce(&T) -> serde_json::Value,
) -> axum::response::Response {
    match result {
        Ok(value) => (status, Json(to_json(&value))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub fn respond_list<T>(
    result: DomainResult<Vec<T>>,
    to_json: impl Fn(&T) -> serde_json::Value,
) -> axum::response::Response {
    respond(StatusCode::OK, result, |items| {
        serde_json::Value::Array(items.iter().map(to_json).collect())
    })
}

pub fn no_content(result: DomainResult<()>) -> axum::response::Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Unwrap a JSON body, answering unreadable bodies with the error payload
/// instead of the extractor's plain-text rejection.
pub fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, axum::response::Response> {
    body.map(|Json(value)| value).map_err(|rejection| {
        errors::json_error(rejection.status(), "invalid_body", rejection.body_text())
    })
}
