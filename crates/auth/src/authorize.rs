use thiserror::Error;

use tracker_core::{CompanyId, UserId};

use crate::{Principal, Role};

/// A mutating operation together with the resource facts its predicate needs.
///
/// The services load those facts (owning company, project manager, creator,
/// membership) before asking; the policy itself never touches storage.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Action {
    CreateProject { company_id: CompanyId },
    UpdateProject { company_id: CompanyId },
    DeleteProject { project_company_id: CompanyId },
    AlterProjectMembers { project_manager_id: UserId },
    CreateTicket { caller_is_member: bool },
    UpdateTicket { creator_id: UserId, project_manager_id: UserId },
    DeleteTicket { project_manager_id: UserId },
    UpdateUser { user_id: UserId, user_company_id: CompanyId },
    AssignRole { user_id: UserId, user_company_id: CompanyId },
    DeleteUser { user_id: UserId, user_company_id: CompanyId },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::CreateProject { .. } => "project.create",
            Action::UpdateProject { .. } => "project.update",
            Action::DeleteProject { .. } => "project.delete",
            Action::AlterProjectMembers { .. } => "project.members",
            Action::CreateTicket { .. } => "ticket.create",
            Action::UpdateTicket { .. } => "ticket.update",
            Action::DeleteTicket { .. } => "ticket.delete",
            Action::UpdateUser { .. } => "user.update",
            Action::AssignRole { .. } => "user.assign_role",
            Action::DeleteUser { .. } => "user.delete",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: {action} denied for user {user_id}")]
    Forbidden { action: &'static str, user_id: UserId },
}

/// Decide whether `principal` may perform `action`.
///
/// - No IO
/// - No panics
/// - Role checks compare role values; identity checks compare primary keys
pub fn authorize(principal: &Principal, action: &Action) -> Result<(), AuthzError> {
    let allowed = match *action {
        Action::CreateProject { company_id } | Action::UpdateProject { company_id } => {
            principal.administers(company_id)
        }
        Action::DeleteProject { project_company_id } => principal.administers(project_company_id),
        Action::AlterProjectMembers { project_manager_id } => {
            principal.is(project_manager_id) && principal.role == Role::ProjectManager
        }
        Action::CreateTicket { caller_is_member } => caller_is_member,
        Action::UpdateTicket {
            creator_id,
            project_manager_id,
        } => principal.is(creator_id) || principal.is(project_manager_id),
        Action::DeleteTicket { project_manager_id } => principal.is(project_manager_id),
        Action::UpdateUser {
            user_id,
            user_company_id,
        }
        | Action::AssignRole {
            user_id,
            user_company_id,
        }
        | Action::DeleteUser {
            user_id,
            user_company_id,
        } => principal.is(user_id) || principal.administers(user_company_id),
    };

    if allowed {
        Ok(())
    } else {
        Err(AuthzError::Forbidden {
            action: action.name(),
            user_id: principal.user_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn principal(id: i64, company: i64, role: Role) -> Principal {
        Principal::new(UserId::new(id), CompanyId::new(company), role)
    }

    fn role_strategy() -> impl Strategy<Value = Role> {
        prop_oneof![
            Just(Role::Admin),
            Just(Role::ProjectManager),
            Just(Role::Developer)
        ]
    }

    #[test]
    fn project_admin_actions_require_admin_in_same_company() {
        let action = Action::CreateProject {
            company_id: CompanyId::new(1),
        };
        assert!(authorize(&principal(1, 1, Role::Admin), &action).is_ok());
        assert!(authorize(&principal(1, 2, Role::Admin), &action).is_err());
        assert!(authorize(&principal(1, 1, Role::ProjectManager), &action).is_err());

        let delete = Action::DeleteProject {
            project_company_id: CompanyId::new(3),
        };
        assert!(authorize(&principal(9, 3, Role::Admin), &delete).is_ok());
        assert!(authorize(&principal(9, 1, Role::Admin), &delete).is_err());
    }

    #[test]
    fn member_changes_need_the_managing_project_manager() {
        let action = Action::AlterProjectMembers {
            project_manager_id: UserId::new(4),
        };
        assert!(authorize(&principal(4, 1, Role::ProjectManager), &action).is_ok());
        // The manager id matches but the role was changed since assignment.
        assert!(authorize(&principal(4, 1, Role::Developer), &action).is_err());
        assert!(authorize(&principal(5, 1, Role::ProjectManager), &action).is_err());
        assert!(authorize(&principal(5, 1, Role::Admin), &action).is_err());
    }

    #[test]
    fn ticket_update_allows_creator_or_manager() {
        let action = Action::UpdateTicket {
            creator_id: UserId::new(2),
            project_manager_id: UserId::new(3),
        };
        assert!(authorize(&principal(2, 1, Role::Developer), &action).is_ok());
        assert!(authorize(&principal(3, 1, Role::Developer), &action).is_ok());
        assert!(authorize(&principal(4, 1, Role::Admin), &action).is_err());
    }

    #[test]
    fn denial_names_the_action_and_caller() {
        let err = authorize(
            &principal(7, 1, Role::Developer),
            &Action::DeleteTicket {
                project_manager_id: UserId::new(3),
            },
        )
        .unwrap_err();
        assert_eq!(
            err,
            AuthzError::Forbidden {
                action: "ticket.delete",
                user_id: UserId::new(7)
            }
        );
    }

    proptest! {
        #[test]
        fn ticket_creation_depends_only_on_membership(
            id in 1i64..50, company in 1i64..5, role in role_strategy(), member in any::<bool>()
        ) {
            let result = authorize(&principal(id, company, role), &Action::CreateTicket { caller_is_member: member });
            prop_assert_eq!(result.is_ok(), member);
        }

        #[test]
        fn user_self_service_always_allowed(
            id in 1i64..50, company in 1i64..5, other_company in 1i64..5, role in role_strategy()
        ) {
            let caller = principal(id, company, role);
            for action in [
                Action::UpdateUser { user_id: UserId::new(id), user_company_id: CompanyId::new(other_company) },
                Action::AssignRole { user_id: UserId::new(id), user_company_id: CompanyId::new(other_company) },
                Action::DeleteUser { user_id: UserId::new(id), user_company_id: CompanyId::new(other_company) },
            ] {
                prop_assert!(authorize(&caller, &action).is_ok());
            }
        }

        #[test]
        fn user_management_of_others_is_admin_of_their_company(
            caller_id in 1i64..25, target_id in 25i64..50,
            company in 1i64..5, target_company in 1i64..5, role in role_strategy()
        ) {
            let caller = principal(caller_id, company, role);
            let action = Action::DeleteUser {
                user_id: UserId::new(target_id),
                user_company_id: CompanyId::new(target_company),
            };
            let expected = role == Role::Admin && company == target_company;
            prop_assert_eq!(authorize(&caller, &action).is_ok(), expected);
        }

        #[test]
        fn ticket_deletion_is_manager_only(
            caller_id in 1i64..20, pm_id in 1i64..20, role in role_strategy()
        ) {
            let result = authorize(
                &principal(caller_id, 1, role),
                &Action::DeleteTicket { project_manager_id: UserId::new(pm_id) },
            );
            prop_assert_eq!(result.is_ok(), caller_id == pm_id);
        }
    }
}
