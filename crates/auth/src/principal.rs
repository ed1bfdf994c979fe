use tracker_core::{CompanyId, UserId};

use crate::Role;

/// The authenticated caller, resolved once per request.
///
/// Carries exactly what the policy needs: who, in which company, acting as
/// which role. Passed explicitly into every service call.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub company_id: CompanyId,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: UserId, company_id: CompanyId, role: Role) -> Self {
        Self {
            user_id,
            company_id,
            role,
        }
    }

    pub fn is(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }

    /// Admin of the given company.
    pub fn administers(&self, company_id: CompanyId) -> bool {
        self.role == Role::Admin && self.company_id == company_id
    }
}
