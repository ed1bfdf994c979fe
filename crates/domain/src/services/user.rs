use std::sync::Arc;

use tracing::{info, instrument};

use tracker_auth::{Action, ApiKey, Principal, Role};
use tracker_core::{Clock, CompanyId, DomainError, DomainResult, RoleId, UserId};

use crate::model::{Company, NewUser, User, UserDraft, UserPatch, UserView};
use crate::ports::Store;

use super::{check, is_blank, load_company};

pub struct UserService<S: ?Sized> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S: ?Sized> Clone for UserService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            clock: self.clock.clone(),
        }
    }
}

impl<S: Store + ?Sized> UserService<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn list(&self, company_id: CompanyId) -> DomainResult<Vec<UserView>> {
        let company = load_company(&*self.store, company_id).await?;
        let users = self.store.users_in_company(company_id).await?;
        Ok(users.into_iter().map(|u| view(u, &company)).collect())
    }

    pub async fn get(&self, company_id: CompanyId, user_id: UserId) -> DomainResult<UserView> {
        let company = load_company(&*self.store, company_id).await?;
        let user = self.load_user(company_id, user_id).await?;
        Ok(view(user, &company))
    }

    /// Register a user in a company. Open to anonymous callers.
    ///
    /// New users always start as `Developer` with a fresh API key.
    #[instrument(skip(self, draft), err)]
    pub async fn create(&self, company_id: CompanyId, draft: UserDraft) -> DomainResult<UserView> {
        let company = load_company(&*self.store, company_id).await?;

        if is_blank(&draft.username) {
            return Err(DomainError::not_allowed("username", &draft.username));
        }

        if self.store.user_by_username(&draft.username).await?.is_some() {
            return Err(DomainError::already_exists("username", &draft.username));
        }

        let role = self
            .store
            .role_by_value(Role::Developer)
            .await?
            .ok_or_else(|| DomainError::not_found("role", Role::Developer))?;

        let user = self
            .store
            .insert_user(NewUser {
                username: draft.username,
                api_key: ApiKey::generate(),
                created_at: self.clock.today(),
                company_id,
                role,
            })
            .await?;

        info!(user_id = %user.id, company_id = %company_id, "user created");
        Ok(view(user, &company))
    }

    #[instrument(skip(self, caller, patch), fields(caller = %caller.user_id), err)]
    pub async fn update(
        &self,
        caller: &Principal,
        company_id: CompanyId,
        user_id: UserId,
        patch: UserPatch,
    ) -> DomainResult<UserView> {
        let company = load_company(&*self.store, company_id).await?;
        let mut user = self.load_user(company_id, user_id).await?;

        check(
            caller,
            Action::UpdateUser {
                user_id: user.id,
                user_company_id: user.company_id,
            },
        )?;

        if let Some(username) = patch.username {
            if is_blank(&username) {
                return Err(DomainError::not_allowed("username", &username));
            }

            // Keeping one's own name is not a collision.
            if let Some(holder) = self.store.user_by_username(&username).await? {
                if holder.id != user.id {
                    return Err(DomainError::already_exists("username", &username));
                }
            }

            user.username = username;
        }

        let user = self.store.update_user(&user).await?;
        info!(user_id = %user.id, "user updated");
        Ok(view(user, &company))
    }

    /// Assign a role by its reference-row id.
    #[instrument(skip(self, caller), fields(caller = %caller.user_id), err)]
    pub async fn assign_role(
        &self,
        caller: &Principal,
        company_id: CompanyId,
        user_id: UserId,
        role_id: RoleId,
    ) -> DomainResult<UserView> {
        let company = load_company(&*self.store, company_id).await?;
        let mut user = self.load_user(company_id, user_id).await?;

        let role = self
            .store
            .role_by_id(role_id)
            .await?
            .ok_or_else(|| DomainError::not_found("roleId", role_id))?;

        check(
            caller,
            Action::AssignRole {
                user_id: user.id,
                user_company_id: user.company_id,
            },
        )?;

        user.role = role;
        let user = self.store.update_user(&user).await?;
        info!(user_id = %user.id, role = %role.role, "role assigned");
        Ok(view(user, &company))
    }

    #[instrument(skip(self, caller), fields(caller = %caller.user_id), err)]
    pub async fn delete(
        &self,
        caller: &Principal,
        company_id: CompanyId,
        user_id: UserId,
    ) -> DomainResult<()> {
        load_company(&*self.store, company_id).await?;
        let user = self.load_user(company_id, user_id).await?;

        check(
            caller,
            Action::DeleteUser {
                user_id: user.id,
                user_company_id: user.company_id,
            },
        )?;

        self.store.delete_user(user.id).await?;
        info!(user_id = %user.id, "user deleted");
        Ok(())
    }

    async fn load_user(&self, company_id: CompanyId, user_id: UserId) -> DomainResult<User> {
        self.store
            .user_in_company(user_id, company_id)
            .await?
            .ok_or_else(|| DomainError::not_found("userId", user_id))
    }
}

pub(super) fn view(user: User, company: &Company) -> UserView {
    UserView {
        user,
        company_name: company.name.clone(),
    }
}
