//! Demo data for local runs.
//!
//! Seeds one company with an admin, a project manager and a developer, plus
//! a project the developer is a member of. Goes through the services so the
//! data obeys every rule a client would hit.

use tracing::info;

use tracker_auth::{Principal, Role};
use tracker_core::{CompanyId, DomainError, DomainResult};
use tracker_domain::{CompanyDraft, ProjectDraft, Services, Store, UserDraft, UserView};

pub const DEMO_COMPANY: &str = "Acme";

/// Credentials of the seeded accounts.
#[derive(Debug, Clone)]
pub struct DemoAccounts {
    pub company_id: CompanyId,
    pub admin: UserView,
    pub project_manager: UserView,
    pub developer: UserView,
}

/// Seed the demo company unless it already exists.
pub async fn seed_demo_data<S>(store: &S, services: &Services<S>) -> DomainResult<Option<DemoAccounts>>
where
    S: Store + ?Sized,
{
    if store.company_by_name(DEMO_COMPANY).await?.is_some() {
        info!("demo data already present");
        return Ok(None);
    }

    let company = store
        .insert_company(CompanyDraft {
            name: DEMO_COMPANY.to_string(),
            description: Some("demo tenant".to_string()),
        })
        .await?;

    let admin = promoted(store, services, company.id, "admin", Role::Admin).await?;
    let project_manager = promoted(store, services, company.id, "manager", Role::ProjectManager).await?;
    let developer = services
        .users
        .create(
            company.id,
            UserDraft {
                username: "developer".to_string(),
            },
        )
        .await?;

    let admin_principal = principal(&admin);
    let project = services
        .projects
        .create(
            &admin_principal,
            company.id,
            ProjectDraft {
                name: "Demo".to_string(),
                description: Some("seeded project".to_string()),
                start_date: None,
                end_date: None,
                project_manager_id: project_manager.user.id,
            },
        )
        .await?;

    let pm_principal = principal(&project_manager);
    for member in [&project_manager, &developer] {
        services
            .projects
            .add_member(&pm_principal, company.id, project.id, member.user.id)
            .await?;
    }

    info!(company_id = %company.id, project_id = %project.id, "demo data seeded");
    Ok(Some(DemoAccounts {
        company_id: company.id,
        admin,
        project_manager,
        developer,
    }))
}

/// Create a user and let it assign itself `role` (self-service is allowed).
async fn promoted<S>(
    store: &S,
    services: &Services<S>,
    company_id: CompanyId,
    username: &str,
    role: Role,
) -> DomainResult<UserView>
where
    S: Store + ?Sized,
{
    let created = services
        .users
        .create(
            company_id,
            UserDraft {
                username: username.to_string(),
            },
        )
        .await?;

    let role = store
        .role_by_value(role)
        .await?
        .ok_or_else(|| DomainError::not_found("role", role))?;

    services
        .users
        .assign_role(&principal(&created), company_id, created.user.id, role.id)
        .await
}

fn principal(view: &UserView) -> Principal {
    Principal::new(view.user.id, view.user.company_id, view.user.role.role)
}
