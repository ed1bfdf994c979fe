//! Resolution of the request credential to the acting principal.

use tracing::debug;

use tracker_auth::{ApiKey, Principal};
use tracker_core::DomainResult;

use crate::ports::UserRepository;

/// Resolve an API key to its user. `None` when no user holds the key.
///
/// Every request re-authenticates; nothing is cached.
pub async fn authenticate<S>(store: &S, key: &ApiKey) -> DomainResult<Option<Principal>>
where
    S: UserRepository + ?Sized,
{
    let Some(user) = store.user_by_api_key(key).await? else {
        debug!("api key did not resolve to a user");
        return Ok(None);
    };

    Ok(Some(Principal::new(user.id, user.company_id, user.role.role)))
}
