//! Aggregate services.
//!
//! Each operation re-derives every ancestor scope from the ids it is given
//! and applies its checks in a fixed order, stopping at the first failure:
//!
//! 1. parent existence (company, then project)
//! 2. referenced entity existence
//! 3. authorization predicate
//! 4. field validity
//! 5. uniqueness against siblings
//! 6. mutation

use std::sync::Arc;

use tracing::warn;

use tracker_auth::{authorize, Action, Principal};
use tracker_core::{Clock, CompanyId, DomainError, DomainResult, ProjectId};

use crate::model::{Company, Project};
use crate::ports::Store;

mod company;
mod project;
mod ticket;
mod user;

pub use company::CompanyService;
pub use project::ProjectService;
pub use ticket::TicketService;
pub use user::UserService;

/// The four services over one shared store and clock.
pub struct Services<S: ?Sized> {
    pub companies: CompanyService<S>,
    pub users: UserService<S>,
    pub projects: ProjectService<S>,
    pub tickets: TicketService<S>,
}

impl<S: Store + ?Sized> Services<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            companies: CompanyService::new(store.clone()),
            users: UserService::new(store.clone(), clock.clone()),
            projects: ProjectService::new(store.clone()),
            tickets: TicketService::new(store, clock),
        }
    }
}

// -------------------------
// Shared check steps
// -------------------------

async fn load_company<S: Store + ?Sized>(store: &S, id: CompanyId) -> DomainResult<Company> {
    store
        .company(id)
        .await?
        .ok_or_else(|| DomainError::not_found("companyId", id))
}

async fn load_project<S: Store + ?Sized>(
    store: &S,
    company_id: CompanyId,
    project_id: ProjectId,
) -> DomainResult<Project> {
    store
        .project_in_company(project_id, company_id)
        .await?
        .ok_or_else(|| DomainError::not_found("projectId", project_id))
}

fn check(caller: &Principal, action: Action) -> DomainResult<()> {
    authorize(caller, &action).map_err(|e| {
        warn!(user_id = %caller.user_id, action = action.name(), error = %e, "authorization denied");
        DomainError::unauthorized()
    })
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
