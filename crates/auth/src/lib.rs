//! `tracker-auth`: pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: the API layer
//! resolves a [`Principal`] from the request credential and the services ask
//! [`authorize`] whether that principal may perform an [`Action`].

pub mod api_key;
pub mod authorize;
pub mod principal;
pub mod roles;

pub use api_key::{ApiKey, API_KEY_HEADER};
pub use authorize::{authorize, Action, AuthzError};
pub use principal::Principal;
pub use roles::{Role, UnknownRole};
