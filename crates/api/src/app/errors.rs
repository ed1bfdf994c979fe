use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::error;

use tracker_core::DomainError;

/// Field name → message, for request-shape validation failures.
pub type FieldErrors = BTreeMap<&'static str, String>;

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let status = match &err {
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::AlreadyExists { .. } => StatusCode::CONFLICT,
        DomainError::DateParse(_) => StatusCode::CONFLICT,
        DomainError::NotAllowed { .. } => StatusCode::BAD_REQUEST,
        DomainError::Unauthorized(_) => StatusCode::FORBIDDEN,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::Persistence(msg) => {
            error!(error = %msg, "store failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    json_error(status, err.code(), err.to_string())
}

pub fn validation_error(fields: FieldErrors) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        axum::Json(json!({
            "error": "validation_error",
            "fields": fields,
        })),
    )
        .into_response()
}

pub fn unauthenticated() -> axum::response::Response {
    json_error(
        StatusCode::UNAUTHORIZED,
        "unauthenticated",
        "missing or invalid api key",
    )
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_error_kind() {
        let cases = [
            (DomainError::not_found("companyId", 1), StatusCode::NOT_FOUND),
            (DomainError::already_exists("name", "a"), StatusCode::CONFLICT),
            (DomainError::date_parse("x"), StatusCode::CONFLICT),
            (DomainError::not_allowed("name", ""), StatusCode::BAD_REQUEST),
            (DomainError::unauthorized(), StatusCode::FORBIDDEN),
            (DomainError::conflict("fk"), StatusCode::CONFLICT),
            (DomainError::persistence("down"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(domain_error_to_response(err).status(), status);
        }
    }
}
