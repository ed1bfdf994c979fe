use tracker_auth::Principal;
use tracker_core::UserId;

/// Authenticated caller for a request.
///
/// Inserted by the auth middleware on every protected route; handlers pass
/// the principal on to the services explicitly.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CallerContext {
    principal: Principal,
}

impl CallerContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn user_id(&self) -> UserId {
        self.principal.user_id
    }
}
