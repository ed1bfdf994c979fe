use std::sync::Arc;

use tracing::{info, instrument};

use tracker_auth::{Action, Principal, Role};
use tracker_core::{CompanyId, DomainError, DomainResult, ProjectId, UserId};

use crate::dates;
use crate::model::{NewProject, Project, ProjectDraft, ProjectPatch, User, UserView};
use crate::ports::Store;

use super::user::view;
use super::{check, is_blank, load_company, load_project};

pub struct ProjectService<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for ProjectService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: Store + ?Sized> ProjectService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn list(&self, company_id: CompanyId) -> DomainResult<Vec<Project>> {
        load_company(&*self.store, company_id).await?;
        Ok(self.store.projects_in_company(company_id).await?)
    }

    pub async fn get(&self, company_id: CompanyId, project_id: ProjectId) -> DomainResult<Project> {
        load_company(&*self.store, company_id).await?;
        load_project(&*self.store, company_id, project_id).await
    }

    pub async fn members(
        &self,
        company_id: CompanyId,
        project_id: ProjectId,
    ) -> DomainResult<Vec<UserView>> {
        let company = load_company(&*self.store, company_id).await?;
        let project = load_project(&*self.store, company_id, project_id).await?;
        let members = self.store.members(project.id).await?;
        Ok(members.into_iter().map(|u| view(u, &company)).collect())
    }

    /// Create a project managed by an existing `ProjectManager` of the company.
    ///
    /// A missing manager is `NotFound`, a manager with another role is
    /// `Unauthorized` naming the candidate.
    #[instrument(skip(self, caller, draft), fields(caller = %caller.user_id), err)]
    pub async fn create(
        &self,
        caller: &Principal,
        company_id: CompanyId,
        draft: ProjectDraft,
    ) -> DomainResult<Project> {
        load_company(&*self.store, company_id).await?;

        let manager = self
            .store
            .user_in_company(draft.project_manager_id, company_id)
            .await?
            .ok_or_else(|| DomainError::not_found("projectManagerId", draft.project_manager_id))?;

        check(caller, Action::CreateProject { company_id })?;

        if manager.role.role != Role::ProjectManager {
            return Err(DomainError::unauthorized_subject(manager.id));
        }

        if is_blank(&draft.name) {
            return Err(DomainError::not_allowed("projectName", &draft.name));
        }

        if self.store.project_by_name(&draft.name).await?.is_some() {
            return Err(DomainError::already_exists("projectName", &draft.name));
        }

        let start_date = dates::parse_optional(draft.start_date.as_deref())?;
        let end_date = dates::parse_optional(draft.end_date.as_deref())?;

        let project = self
            .store
            .insert_project(NewProject {
                name: draft.name,
                description: draft.description,
                start_date,
                end_date,
                company_id,
                project_manager_id: manager.id,
            })
            .await?;

        info!(project_id = %project.id, company_id = %company_id, "project created");
        Ok(project)
    }

    /// Partial update. A replacement manager that is missing or not a
    /// `ProjectManager` is reported as `NotFound` either way.
    #[instrument(skip(self, caller, patch), fields(caller = %caller.user_id), err)]
    pub async fn update(
        &self,
        caller: &Principal,
        company_id: CompanyId,
        project_id: ProjectId,
        patch: ProjectPatch,
    ) -> DomainResult<Project> {
        load_company(&*self.store, company_id).await?;
        let mut project = load_project(&*self.store, company_id, project_id).await?;

        let manager = match patch.project_manager_id {
            Some(candidate) => Some(self.eligible_manager(company_id, candidate).await?),
            None => None,
        };

        check(caller, Action::UpdateProject { company_id })?;

        if let Some(name) = &patch.name {
            if is_blank(name) {
                return Err(DomainError::not_allowed("projectName", name));
            }
            if let Some(other) = self.store.project_by_name(name).await? {
                if other.id != project.id {
                    return Err(DomainError::already_exists("projectName", name));
                }
            }
        }

        if let Some(start) = dates::parse_optional(patch.start_date.as_deref())? {
            project.start_date = Some(start);
        }
        if let Some(end) = dates::parse_optional(patch.end_date.as_deref())? {
            project.end_date = Some(end);
        }
        if let Some(name) = patch.name {
            project.name = name;
        }
        if let Some(description) = patch.description {
            project.description = Some(description);
        }
        if let Some(manager) = manager {
            project.project_manager_id = manager.id;
        }

        let project = self.store.update_project(&project).await?;
        info!(project_id = %project.id, "project updated");
        Ok(project)
    }

    /// Delete a project together with its tickets and membership rows.
    #[instrument(skip(self, caller), fields(caller = %caller.user_id), err)]
    pub async fn delete(
        &self,
        caller: &Principal,
        company_id: CompanyId,
        project_id: ProjectId,
    ) -> DomainResult<()> {
        load_company(&*self.store, company_id).await?;
        let project = load_project(&*self.store, company_id, project_id).await?;

        check(
            caller,
            Action::DeleteProject {
                project_company_id: project.company_id,
            },
        )?;

        self.store.delete_project(project.id).await?;
        info!(project_id = %project.id, "project deleted");
        Ok(())
    }

    #[instrument(skip(self, caller), fields(caller = %caller.user_id), err)]
    pub async fn add_member(
        &self,
        caller: &Principal,
        company_id: CompanyId,
        project_id: ProjectId,
        user_id: UserId,
    ) -> DomainResult<()> {
        let (project, user) = self
            .membership_target(caller, company_id, project_id, user_id)
            .await?;

        if self.store.is_member(project.id, user.id).await? {
            return Err(DomainError::already_exists("userId", user.id));
        }

        self.store.add_member(project.id, user.id).await?;
        info!(project_id = %project.id, user_id = %user.id, "member added");
        Ok(())
    }

    #[instrument(skip(self, caller), fields(caller = %caller.user_id), err)]
    pub async fn remove_member(
        &self,
        caller: &Principal,
        company_id: CompanyId,
        project_id: ProjectId,
        user_id: UserId,
    ) -> DomainResult<()> {
        let (project, user) = self
            .membership_target(caller, company_id, project_id, user_id)
            .await?;

        if !self.store.is_member(project.id, user.id).await? {
            return Err(DomainError::not_found("userId", user.id));
        }

        // A concurrent removal between the check and the write lands here.
        if !self.store.remove_member(project.id, user.id).await? {
            return Err(DomainError::not_found("userId", user.id));
        }

        info!(project_id = %project.id, user_id = %user.id, "member removed");
        Ok(())
    }

    /// Checks shared by member add/remove, up to the membership test itself.
    async fn membership_target(
        &self,
        caller: &Principal,
        company_id: CompanyId,
        project_id: ProjectId,
        user_id: UserId,
    ) -> DomainResult<(Project, User)> {
        load_company(&*self.store, company_id).await?;
        let project = load_project(&*self.store, company_id, project_id).await?;

        let user = self
            .store
            .user_in_company(user_id, company_id)
            .await?
            .ok_or_else(|| DomainError::not_found("userId", user_id))?;

        check(
            caller,
            Action::AlterProjectMembers {
                project_manager_id: project.project_manager_id,
            },
        )?;

        // Users of other companies are reported as absent, not forbidden.
        if caller.company_id != user.company_id {
            return Err(DomainError::not_found("userId", user_id));
        }

        Ok((project, user))
    }

    async fn eligible_manager(&self, company_id: CompanyId, candidate: UserId) -> DomainResult<User> {
        match self.store.user_in_company(candidate, company_id).await? {
            Some(user) if user.role.role == Role::ProjectManager => Ok(user),
            _ => Err(DomainError::not_found("projectManagerId", candidate)),
        }
    }
}
