use std::sync::Arc;

use axum::{
    extract::{MatchedPath, State},
    http::{HeaderMap, Method},
    middleware::Next,
    response::Response,
};
use tracing::{debug, Instrument};
use uuid::Uuid;

use tracker_auth::{ApiKey, API_KEY_HEADER};
use tracker_domain::{authenticate, Store};

use crate::app::errors;
use crate::context::CallerContext;

/// Operations reachable without credentials, as (method, route pattern).
pub const PUBLIC_ROUTES: &[(&str, &str)] = &[
    ("GET", "/health"),
    ("GET", "/api/v1/companies"),
    ("GET", "/api/v1/companies/:company_id"),
    ("GET", "/api/v1/companies/:company_id/users"),
    ("POST", "/api/v1/companies/:company_id/users"),
    ("GET", "/api/v1/companies/:company_id/projects"),
    ("GET", "/api/v1/companies/:company_id/projects/:project_id"),
    ("GET", "/api/v1/companies/:company_id/projects/:project_id/users"),
    ("GET", "/api/v1/companies/:company_id/projects/:project_id/tickets"),
    (
        "GET",
        "/api/v1/companies/:company_id/projects/:project_id/tickets/:ticket_id",
    ),
];

pub fn is_public(method: &Method, route: &str) -> bool {
    PUBLIC_ROUTES
        .iter()
        .any(|(m, pattern)| *m == method.as_str() && *pattern == route)
}

#[derive(Clone)]
pub struct AuthState {
    pub store: Arc<dyn Store>,
}

/// Resolve the `ApiKey` header for protected routes and attach the caller.
///
/// Runs as a route layer, so the matched route pattern is always present.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let span = tracing::info_span!(
        "request",
        request_id = %Uuid::now_v7(),
        method = %req.method(),
        route = %route,
    );

    async move {
        if is_public(req.method(), &route) {
            return next.run(req).await;
        }

        let Some(key) = extract_api_key(req.headers()) else {
            debug!("missing api key");
            return errors::unauthenticated();
        };

        let principal = match authenticate(&*state.store, &key).await {
            Ok(Some(principal)) => principal,
            Ok(None) => return errors::unauthenticated(),
            Err(e) => return errors::domain_error_to_response(e),
        };

        req.extensions_mut().insert(CallerContext::new(principal));
        next.run(req).await
    }
    .instrument(span)
    .await
}

fn extract_api_key(headers: &HeaderMap) -> Option<ApiKey> {
    let value = headers.get(API_KEY_HEADER)?.to_str().ok()?.trim();
    if value.is_empty() {
        return None;
    }
    Some(ApiKey::from_string(value))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderName;

    use super::*;

    #[test]
    fn reads_are_public_except_user_detail() {
        assert!(is_public(&Method::GET, "/api/v1/companies"));
        assert!(is_public(
            &Method::GET,
            "/api/v1/companies/:company_id/projects/:project_id/tickets/:ticket_id"
        ));
        assert!(!is_public(
            &Method::GET,
            "/api/v1/companies/:company_id/users/:user_id"
        ));
    }

    #[test]
    fn only_user_creation_is_a_public_write() {
        assert!(is_public(&Method::POST, "/api/v1/companies/:company_id/users"));
        assert!(!is_public(&Method::POST, "/api/v1/companies"));
        assert!(!is_public(&Method::POST, "/api/v1/companies/:company_id/projects"));
        assert!(!is_public(
            &Method::PATCH,
            "/api/v1/companies/:company_id/users/:user_id"
        ));
    }

    #[test]
    fn api_key_header_is_trimmed_and_required() {
        let name = HeaderName::from_bytes(API_KEY_HEADER.as_bytes()).unwrap();
        let mut headers = HeaderMap::new();
        assert!(extract_api_key(&headers).is_none());

        headers.insert(name.clone(), " abc ".parse().unwrap());
        assert_eq!(extract_api_key(&headers).unwrap().as_str(), "abc");

        headers.insert(name, "   ".parse().unwrap());
        assert!(extract_api_key(&headers).is_none());
    }
}
