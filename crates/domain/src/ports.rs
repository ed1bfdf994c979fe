//! Lookup gateways and persistence ports.
//!
//! Every lookup is scoped by the parent id supplied in the call; nothing is
//! cached between requests. Writes rely on the store's own unique
//! constraints as the final arbiter, since the services check-then-write.

use async_trait::async_trait;
use thiserror::Error;

use tracker_auth::{ApiKey, Role};
use tracker_core::{CompanyId, DomainError, ProjectId, RoleId, TicketId, UserId};

use crate::model::{
    Company, CompanyDraft, NewProject, NewTicket, NewUser, Project, RoleRef, Ticket, User,
};
use crate::reference::ReferenceTable;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("unique violation on {property} = {value}")]
    UniqueViolation { property: &'static str, value: String },

    /// A row is still referenced (or references a missing row).
    #[error("foreign key violation: {0}")]
    ForeignKeyViolation(String),

    #[error("store backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for DomainError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::UniqueViolation { property, value } => {
                DomainError::already_exists(property, value)
            }
            StoreError::ForeignKeyViolation(msg) => DomainError::conflict(msg),
            StoreError::Backend(msg) => DomainError::persistence(msg),
        }
    }
}

#[async_trait]
pub trait CompanyRepository: Send + Sync {
    async fn list_companies(&self) -> StoreResult<Vec<Company>>;
    async fn company(&self, id: CompanyId) -> StoreResult<Option<Company>>;
    async fn company_by_name(&self, name: &str) -> StoreResult<Option<Company>>;
    /// Fails with `UniqueViolation("name")` on a taken name.
    async fn insert_company(&self, draft: CompanyDraft) -> StoreResult<Company>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn users_in_company(&self, company_id: CompanyId) -> StoreResult<Vec<User>>;
    async fn user_in_company(&self, id: UserId, company_id: CompanyId)
    -> StoreResult<Option<User>>;
    async fn user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    /// Exact, case-sensitive credential lookup.
    async fn user_by_api_key(&self, key: &ApiKey) -> StoreResult<Option<User>>;
    /// Fails with `UniqueViolation("username")` or `UniqueViolation("apiKey")`.
    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;
    async fn update_user(&self, user: &User) -> StoreResult<User>;
    /// Removes the user's membership rows with it. Fails with
    /// `ForeignKeyViolation` while the user manages a project or created a ticket.
    async fn delete_user(&self, id: UserId) -> StoreResult<()>;
}

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn projects_in_company(&self, company_id: CompanyId) -> StoreResult<Vec<Project>>;
    async fn project_in_company(
        &self,
        id: ProjectId,
        company_id: CompanyId,
    ) -> StoreResult<Option<Project>>;
    async fn project_by_name(&self, name: &str) -> StoreResult<Option<Project>>;
    /// Fails with `UniqueViolation("projectName")` on a taken name.
    async fn insert_project(&self, project: NewProject) -> StoreResult<Project>;
    async fn update_project(&self, project: &Project) -> StoreResult<Project>;
    /// Deletes the project's tickets and membership rows in the same write.
    async fn delete_project(&self, id: ProjectId) -> StoreResult<()>;

    async fn members(&self, project_id: ProjectId) -> StoreResult<Vec<User>>;
    async fn is_member(&self, project_id: ProjectId, user_id: UserId) -> StoreResult<bool>;
    /// Fails with `UniqueViolation("userId")` when the row already exists.
    async fn add_member(&self, project_id: ProjectId, user_id: UserId) -> StoreResult<()>;
    /// Returns whether a row was removed.
    async fn remove_member(&self, project_id: ProjectId, user_id: UserId) -> StoreResult<bool>;
}

#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn tickets_in_project(&self, project_id: ProjectId) -> StoreResult<Vec<Ticket>>;
    async fn ticket_in_project(
        &self,
        id: TicketId,
        project_id: ProjectId,
    ) -> StoreResult<Option<Ticket>>;
    async fn ticket_by_name(&self, project_id: ProjectId, name: &str)
    -> StoreResult<Option<Ticket>>;
    /// Fails with `UniqueViolation("name")` on a name taken within the project.
    async fn insert_ticket(&self, ticket: NewTicket) -> StoreResult<Ticket>;
    async fn update_ticket(&self, ticket: &Ticket) -> StoreResult<Ticket>;
    async fn delete_ticket(&self, id: TicketId) -> StoreResult<()>;
}

#[async_trait]
pub trait ReferenceRepository: Send + Sync {
    async fn role_by_id(&self, id: RoleId) -> StoreResult<Option<RoleRef>>;
    async fn role_by_value(&self, role: Role) -> StoreResult<Option<RoleRef>>;
    /// Literals currently persisted in `table`, in table order.
    async fn reference_literals(&self, table: ReferenceTable) -> StoreResult<Vec<String>>;
}

/// Everything the services need from persistence.
pub trait Store:
    CompanyRepository + UserRepository + ProjectRepository + TicketRepository + ReferenceRepository
{
}

impl<T> Store for T where
    T: CompanyRepository
        + UserRepository
        + ProjectRepository
        + TicketRepository
        + ReferenceRepository
        + ?Sized
{
}
