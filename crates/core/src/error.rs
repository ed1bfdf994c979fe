//! Domain error model.

use core::fmt::Display;

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Request-scoped domain failure.
///
/// Every variant is terminal for the request that produced it. None of them
/// are retried or recovered inside the services.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A referenced entity or reference value does not exist.
    ///
    /// `hint` lists the accepted values when the lookup was against a
    /// reference table.
    #[error("{}", not_found_message(.property, .value, .hint))]
    NotFound {
        property: &'static str,
        value: String,
        hint: Option<String>,
    },

    /// A unique property is already taken.
    #[error("{property} with value {value} already exists")]
    AlreadyExists { property: &'static str, value: String },

    /// The caller is authenticated but the policy rejects the action.
    #[error("{}", unauthorized_message(.0))]
    Unauthorized(Option<i64>),

    /// A field value is syntactically present but not acceptable.
    #[error("property {property} with value {value} not allowed")]
    NotAllowed { property: &'static str, value: String },

    /// A date string did not match `dd-MM-yyyy`.
    #[error("Text '{0}' could not be parsed")]
    DateParse(String),

    /// The store rejected a write for a reason other than uniqueness.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The store failed; fatal for the request.
    #[error("persistence failure: {0}")]
    Persistence(String),
}

fn not_found_message(property: &str, value: &str, hint: &Option<String>) -> String {
    match hint {
        Some(hint) => format!("{property} property with value {value} not found, try -> {hint}"),
        None => format!("{property} with value {value} not found"),
    }
}

fn unauthorized_message(subject: &Option<i64>) -> String {
    match subject {
        Some(id) => format!("user with id {id} is not authorized for this"),
        None => "you are not authorized for this action".to_string(),
    }
}

impl DomainError {
    pub fn not_found(property: &'static str, value: impl Display) -> Self {
        Self::NotFound {
            property,
            value: value.to_string(),
            hint: None,
        }
    }

    pub fn not_found_with_hint(
        property: &'static str,
        value: impl Display,
        hint: impl Into<String>,
    ) -> Self {
        Self::NotFound {
            property,
            value: value.to_string(),
            hint: Some(hint.into()),
        }
    }

    pub fn already_exists(property: &'static str, value: impl Display) -> Self {
        Self::AlreadyExists {
            property,
            value: value.to_string(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::Unauthorized(None)
    }

    pub fn unauthorized_subject(id: impl Into<i64>) -> Self {
        Self::Unauthorized(Some(id.into()))
    }

    pub fn not_allowed(property: &'static str, value: impl Display) -> Self {
        Self::NotAllowed {
            property,
            value: value.to_string(),
        }
    }

    pub fn date_parse(raw: impl Into<String>) -> Self {
        Self::DateParse(raw.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Stable machine-readable code for error payloads.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::AlreadyExists { .. } => "already_exists",
            Self::Unauthorized(_) => "unauthorized",
            Self::NotAllowed { .. } => "not_allowed",
            Self::DateParse(_) => "date_parse_error",
            Self::Conflict(_) => "conflict",
            Self::Persistence(_) => "persistence_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_the_public_wording() {
        assert_eq!(
            DomainError::not_found("companyId", 9).to_string(),
            "companyId with value 9 not found"
        );
        assert_eq!(
            DomainError::not_found_with_hint("ticketType", "Unknown", "Bug, Enhancement").to_string(),
            "ticketType property with value Unknown not found, try -> Bug, Enhancement"
        );
        assert_eq!(
            DomainError::already_exists("projectName", "P1").to_string(),
            "projectName with value P1 already exists"
        );
        assert_eq!(
            DomainError::unauthorized().to_string(),
            "you are not authorized for this action"
        );
        assert_eq!(
            DomainError::unauthorized_subject(5).to_string(),
            "user with id 5 is not authorized for this"
        );
        assert_eq!(
            DomainError::not_allowed("name", "").to_string(),
            "property name with value  not allowed"
        );
        assert_eq!(
            DomainError::date_parse("31-02").to_string(),
            "Text '31-02' could not be parsed"
        );
    }

    #[test]
    fn codes_are_distinct_per_kind() {
        let codes = [
            DomainError::not_found("a", 1).code(),
            DomainError::already_exists("a", 1).code(),
            DomainError::unauthorized().code(),
            DomainError::not_allowed("a", 1).code(),
            DomainError::date_parse("x").code(),
            DomainError::conflict("x").code(),
            DomainError::persistence("x").code(),
        ];
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
    }
}
