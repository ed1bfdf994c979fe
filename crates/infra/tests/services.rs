//! Aggregate service behaviour over the in-memory store: check order,
//! authorization predicates and invariants.

use std::sync::Arc;

use chrono::NaiveDate;

use tracker_auth::{Principal, Role};
use tracker_core::{CompanyId, DomainError, FixedClock, ProjectId, RoleId, TicketId, UserId};
use tracker_domain::ports::{CompanyRepository, ReferenceRepository, UserRepository};
use tracker_domain::{
    CompanyDraft, Project, ProjectDraft, ProjectPatch, ReferenceTable, Services, TicketDraft,
    TicketPatch, UserDraft, UserPatch,
};
use tracker_infra::InMemoryStore;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
}

struct World {
    store: Arc<InMemoryStore>,
    services: Services<InMemoryStore>,
    company: CompanyId,
    admin: Principal,
    pm: Principal,
    dev: Principal,
}

impl World {
    async fn new() -> Self {
        let store = Arc::new(InMemoryStore::with_reference_data());
        let services = Services::new(store.clone(), Arc::new(FixedClock(today())));
        let company = store
            .insert_company(CompanyDraft {
                name: "Acme".to_string(),
                description: None,
            })
            .await
            .unwrap()
            .id;

        let mut world = Self {
            store,
            services,
            company,
            admin: placeholder(),
            pm: placeholder(),
            dev: placeholder(),
        };
        world.admin = world.user_with_role(company, "admin", Role::Admin).await;
        world.pm = world.user_with_role(company, "pm", Role::ProjectManager).await;
        world.dev = world.user_with_role(company, "dev", Role::Developer).await;
        world
    }

    async fn user_with_role(&self, company: CompanyId, name: &str, role: Role) -> Principal {
        let created = self
            .services
            .users
            .create(company, UserDraft { username: name.to_string() })
            .await
            .unwrap();
        let me = Principal::new(created.user.id, company, created.user.role.role);
        let role_id = self.store.role_by_value(role).await.unwrap().unwrap().id;
        self.services
            .users
            .assign_role(&me, company, me.user_id, role_id)
            .await
            .unwrap();
        Principal::new(me.user_id, company, role)
    }

    async fn second_company(&self) -> CompanyId {
        self.store
            .insert_company(CompanyDraft {
                name: "Globex".to_string(),
                description: None,
            })
            .await
            .unwrap()
            .id
    }

    async fn project(&self, name: &str) -> Project {
        self.services
            .projects
            .create(&self.admin, self.company, draft(name, self.pm.user_id))
            .await
            .unwrap()
    }
}

fn placeholder() -> Principal {
    Principal::new(UserId::new(0), CompanyId::new(0), Role::Developer)
}

fn draft(name: &str, pm: UserId) -> ProjectDraft {
    ProjectDraft {
        name: name.to_string(),
        description: Some("desc".to_string()),
        start_date: Some("01-02-2024".to_string()),
        end_date: Some("30-06-2024".to_string()),
        project_manager_id: pm,
    }
}

fn ticket(name: &str) -> TicketDraft {
    TicketDraft {
        name: name.to_string(),
        description: None,
        ticket_type: "Bug".to_string(),
        ticket_priority: "High".to_string(),
        ticket_status: "New".to_string(),
    }
}

const MISSING_COMPANY: CompanyId = CompanyId::new(9_999);

// -------------------------
// Scope checks come first
// -------------------------

#[tokio::test]
async fn unknown_company_is_reported_before_anything_else() {
    let w = World::new().await;
    let s = &w.services;
    let expected = DomainError::not_found("companyId", MISSING_COMPANY);

    // An unauthorized caller, a missing project and a bogus body do not matter.
    assert_eq!(s.users.list(MISSING_COMPANY).await.unwrap_err(), expected);
    assert_eq!(s.projects.list(MISSING_COMPANY).await.unwrap_err(), expected);
    assert_eq!(
        s.projects
            .create(&w.dev, MISSING_COMPANY, draft("", UserId::new(77)))
            .await
            .unwrap_err(),
        expected
    );
    assert_eq!(
        s.projects
            .delete(&w.dev, MISSING_COMPANY, ProjectId::new(1))
            .await
            .unwrap_err(),
        expected
    );
    assert_eq!(
        s.tickets
            .create(&w.dev, MISSING_COMPANY, ProjectId::new(1), ticket("x"))
            .await
            .unwrap_err(),
        expected
    );
    assert_eq!(
        s.users
            .delete(&w.dev, MISSING_COMPANY, w.admin.user_id)
            .await
            .unwrap_err(),
        expected
    );
    assert_eq!(
        s.users
            .create(MISSING_COMPANY, UserDraft { username: "admin".to_string() })
            .await
            .unwrap_err(),
        expected
    );
}

#[tokio::test]
async fn project_of_another_company_is_not_found() {
    let w = World::new().await;
    let other = w.second_company().await;
    let project = w.project("P1").await;
    let expected = DomainError::not_found("projectId", project.id);

    assert_eq!(w.services.projects.get(other, project.id).await.unwrap_err(), expected);
    assert_eq!(w.services.tickets.list(other, project.id).await.unwrap_err(), expected);
    assert_eq!(
        w.services
            .projects
            .update(&w.admin, other, project.id, ProjectPatch::default())
            .await
            .unwrap_err(),
        expected
    );
    assert_eq!(
        w.services
            .projects
            .add_member(&w.pm, other, project.id, w.dev.user_id)
            .await
            .unwrap_err(),
        expected
    );
}

// -------------------------
// Projects
// -------------------------

#[tokio::test]
async fn admin_creates_project_and_duplicate_name_is_rejected() {
    let w = World::new().await;
    let project = w.project("P1").await;

    assert_eq!(project.project_manager_id, w.pm.user_id);
    assert_eq!(project.start_date, NaiveDate::from_ymd_opt(2024, 2, 1));
    assert_eq!(project.end_date, NaiveDate::from_ymd_opt(2024, 6, 30));

    let fetched = w.services.projects.get(w.company, project.id).await.unwrap();
    assert_eq!(fetched.name, "P1");
    assert_eq!(fetched.description.as_deref(), Some("desc"));

    let err = w
        .services
        .projects
        .create(&w.admin, w.company, draft("P1", w.pm.user_id))
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::already_exists("projectName", "P1"));
}

#[tokio::test]
async fn project_names_are_unique_across_companies() {
    let w = World::new().await;
    w.project("Shared").await;

    let other = w.second_company().await;
    let admin = w.user_with_role(other, "other-admin", Role::Admin).await;
    let pm = w.user_with_role(other, "other-pm", Role::ProjectManager).await;

    let err = w
        .services
        .projects
        .create(&admin, other, draft("Shared", pm.user_id))
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::already_exists("projectName", "Shared"));
}

#[tokio::test]
async fn project_create_checks_manager_then_caller_then_manager_role() {
    let w = World::new().await;
    let s = &w.services.projects;

    // Missing manager wins over an unauthorized caller.
    assert_eq!(
        s.create(&w.dev, w.company, draft("P", UserId::new(404)))
            .await
            .unwrap_err(),
        DomainError::not_found("projectManagerId", UserId::new(404))
    );

    // Non-admin caller.
    assert_eq!(
        s.create(&w.pm, w.company, draft("P", w.pm.user_id))
            .await
            .unwrap_err(),
        DomainError::unauthorized()
    );

    // Admin of another company.
    let other = w.second_company().await;
    let foreign_admin = w.user_with_role(other, "foreign", Role::Admin).await;
    assert_eq!(
        s.create(&foreign_admin, w.company, draft("P", w.pm.user_id))
            .await
            .unwrap_err(),
        DomainError::unauthorized()
    );

    // Candidate exists but is not a project manager: unauthorized naming the candidate.
    assert_eq!(
        s.create(&w.admin, w.company, draft("P", w.dev.user_id))
            .await
            .unwrap_err(),
        DomainError::unauthorized_subject(w.dev.user_id)
    );
}

#[tokio::test]
async fn project_create_rejects_malformed_dates_after_other_checks() {
    let w = World::new().await;
    let mut bad = draft("P", w.pm.user_id);
    bad.start_date = Some("2024-02-01".to_string());

    assert_eq!(
        w.services
            .projects
            .create(&w.admin, w.company, bad)
            .await
            .unwrap_err(),
        DomainError::date_parse("2024-02-01")
    );
}

#[tokio::test]
async fn project_update_reports_any_bad_manager_as_not_found() {
    let w = World::new().await;
    let project = w.project("P1").await;
    let s = &w.services.projects;

    for candidate in [w.dev.user_id, UserId::new(404)] {
        let err = s
            .update(
                &w.admin,
                w.company,
                project.id,
                ProjectPatch {
                    project_manager_id: Some(candidate),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::not_found("projectManagerId", candidate));
    }
}

#[tokio::test]
async fn project_update_merges_and_validates_name() {
    let w = World::new().await;
    let project = w.project("P1").await;
    w.project("P2").await;
    let s = &w.services.projects;

    assert_eq!(
        s.update(&w.pm, w.company, project.id, ProjectPatch::default())
            .await
            .unwrap_err(),
        DomainError::unauthorized()
    );

    let blank = ProjectPatch {
        name: Some("  ".to_string()),
        ..Default::default()
    };
    assert_eq!(
        s.update(&w.admin, w.company, project.id, blank).await.unwrap_err(),
        DomainError::not_allowed("projectName", "  ")
    );

    let taken = ProjectPatch {
        name: Some("P2".to_string()),
        ..Default::default()
    };
    assert_eq!(
        s.update(&w.admin, w.company, project.id, taken).await.unwrap_err(),
        DomainError::already_exists("projectName", "P2")
    );

    // Keeping its own name is fine; omitted fields keep their values.
    let updated = s
        .update(
            &w.admin,
            w.company,
            project.id,
            ProjectPatch {
                name: Some("P1".to_string()),
                end_date: Some("31-12-2024".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "P1");
    assert_eq!(updated.description.as_deref(), Some("desc"));
    assert_eq!(updated.start_date, project.start_date);
    assert_eq!(updated.end_date, NaiveDate::from_ymd_opt(2024, 12, 31));
    assert_eq!(updated.project_manager_id, w.pm.user_id);

    // Identical payload twice yields the same project.
    let again = s
        .update(
            &w.admin,
            w.company,
            project.id,
            ProjectPatch {
                name: Some("P1".to_string()),
                end_date: Some("31-12-2024".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(again, updated);
}

#[tokio::test]
async fn project_delete_requires_admin_and_cascades() {
    let w = World::new().await;
    let project = w.project("P1").await;
    let s = &w.services;

    s.projects
        .add_member(&w.pm, w.company, project.id, w.dev.user_id)
        .await
        .unwrap();
    let t = s
        .tickets
        .create(&w.dev, w.company, project.id, ticket("T1"))
        .await
        .unwrap();

    assert_eq!(
        s.projects.delete(&w.pm, w.company, project.id).await.unwrap_err(),
        DomainError::unauthorized()
    );

    s.projects.delete(&w.admin, w.company, project.id).await.unwrap();
    assert_eq!(
        s.projects.get(w.company, project.id).await.unwrap_err(),
        DomainError::not_found("projectId", project.id)
    );
    assert_eq!(
        s.tickets.get(w.company, project.id, t.id).await.unwrap_err(),
        DomainError::not_found("projectId", project.id)
    );
}

// -------------------------
// Membership
// -------------------------

#[tokio::test]
async fn members_are_added_once_and_removed_once() {
    let w = World::new().await;
    let project = w.project("P1").await;
    let s = &w.services.projects;

    s.add_member(&w.pm, w.company, project.id, w.dev.user_id).await.unwrap();
    assert_eq!(
        s.add_member(&w.pm, w.company, project.id, w.dev.user_id)
            .await
            .unwrap_err(),
        DomainError::already_exists("userId", w.dev.user_id)
    );

    let members = s.members(w.company, project.id).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].user.id, w.dev.user_id);
    assert_eq!(members[0].company_name, "Acme");

    s.remove_member(&w.pm, w.company, project.id, w.dev.user_id)
        .await
        .unwrap();
    assert_eq!(
        s.remove_member(&w.pm, w.company, project.id, w.dev.user_id)
            .await
            .unwrap_err(),
        DomainError::not_found("userId", w.dev.user_id)
    );
}

#[tokio::test]
async fn only_the_managing_project_manager_alters_members() {
    let w = World::new().await;
    let project = w.project("P1").await;
    let other_pm = w.user_with_role(w.company, "pm2", Role::ProjectManager).await;
    let s = &w.services.projects;

    // Unknown user is reported before the caller is judged.
    assert_eq!(
        s.add_member(&w.dev, w.company, project.id, UserId::new(404))
            .await
            .unwrap_err(),
        DomainError::not_found("userId", UserId::new(404))
    );

    for caller in [&w.admin, &w.dev, &other_pm] {
        assert_eq!(
            s.add_member(caller, w.company, project.id, w.dev.user_id)
                .await
                .unwrap_err(),
            DomainError::unauthorized()
        );
    }

    // The manager lost the role after assignment.
    let developer_role = w.store.role_by_value(Role::Developer).await.unwrap().unwrap();
    w.services
        .users
        .assign_role(&w.admin, w.company, w.pm.user_id, developer_role.id)
        .await
        .unwrap();
    let demoted = Principal::new(w.pm.user_id, w.company, Role::Developer);
    assert_eq!(
        s.add_member(&demoted, w.company, project.id, w.dev.user_id)
            .await
            .unwrap_err(),
        DomainError::unauthorized()
    );
}

// -------------------------
// Tickets
// -------------------------

#[tokio::test]
async fn non_member_cannot_open_tickets_until_added() {
    let w = World::new().await;
    let project = w.project("P1").await;
    let s = &w.services;

    assert_eq!(
        s.tickets
            .create(&w.dev, w.company, project.id, ticket("T1"))
            .await
            .unwrap_err(),
        DomainError::unauthorized()
    );

    s.projects
        .add_member(&w.pm, w.company, project.id, w.dev.user_id)
        .await
        .unwrap();
    let created = s
        .tickets
        .create(&w.dev, w.company, project.id, ticket("T1"))
        .await
        .unwrap();

    assert_eq!(created.creator_id, w.dev.user_id);
    assert_eq!(created.created_at, today());
    assert_eq!(created.updated_at, None);
    assert_eq!(created.project_id, project.id);

    assert_eq!(
        s.tickets
            .create(&w.dev, w.company, project.id, ticket("T1"))
            .await
            .unwrap_err(),
        DomainError::already_exists("name", "T1")
    );
}

#[tokio::test]
async fn ticket_names_are_scoped_to_their_project() {
    let w = World::new().await;
    let p1 = w.project("P1").await;
    let p2 = w.project("P2").await;
    let s = &w.services;

    for project in [&p1, &p2] {
        s.projects
            .add_member(&w.pm, w.company, project.id, w.dev.user_id)
            .await
            .unwrap();
        s.tickets
            .create(&w.dev, w.company, project.id, ticket("Same"))
            .await
            .unwrap();
    }
    assert_eq!(s.tickets.list(w.company, p1.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_reference_literal_lists_the_live_values() {
    let w = World::new().await;
    let project = w.project("P1").await;
    w.services
        .projects
        .add_member(&w.pm, w.company, project.id, w.dev.user_id)
        .await
        .unwrap();

    let mut bad = ticket("T1");
    bad.ticket_type = "Unknown".to_string();
    assert_eq!(
        w.services
            .tickets
            .create(&w.dev, w.company, project.id, bad.clone())
            .await
            .unwrap_err(),
        DomainError::not_found_with_hint(
            "ticketType",
            "Unknown",
            "GeneralTask, NewFeature, ChangeRequest, Enhancement, Bug"
        )
    );

    w.store.set_reference_literals(
        ReferenceTable::TicketType,
        vec!["Bug".to_string(), "Enhancement".to_string()],
    );
    bad.ticket_type = "NewFeature".to_string();
    assert_eq!(
        w.services
            .tickets
            .create(&w.dev, w.company, project.id, bad)
            .await
            .unwrap_err(),
        DomainError::not_found_with_hint("ticketType", "NewFeature", "Bug, Enhancement")
    );
}

#[tokio::test]
async fn ticket_update_by_creator_or_manager_only() {
    let w = World::new().await;
    let project = w.project("P1").await;
    let s = &w.services;
    let other_dev = w.user_with_role(w.company, "dev2", Role::Developer).await;
    for user in [w.dev.user_id, other_dev.user_id] {
        s.projects
            .add_member(&w.pm, w.company, project.id, user)
            .await
            .unwrap();
    }
    let t = s
        .tickets
        .create(&w.dev, w.company, project.id, ticket("T1"))
        .await
        .unwrap();

    let status = |raw: &str| TicketPatch {
        ticket_status: Some(raw.to_string()),
        ..Default::default()
    };

    assert_eq!(
        s.tickets
            .update(&other_dev, w.company, project.id, t.id, status("Testing"))
            .await
            .unwrap_err(),
        DomainError::unauthorized()
    );

    let by_creator = s
        .tickets
        .update(&w.dev, w.company, project.id, t.id, status("Development"))
        .await
        .unwrap();
    assert_eq!(by_creator.ticket_status.to_string(), "Development");
    assert_eq!(by_creator.updated_at, Some(today()));
    assert_eq!(by_creator.created_at, t.created_at);
    assert_eq!(by_creator.name, "T1");

    // Any status is reachable from any other.
    let by_manager = s
        .tickets
        .update(&w.pm, w.company, project.id, t.id, status("New"))
        .await
        .unwrap();
    assert_eq!(by_manager.ticket_status.to_string(), "New");
}

#[tokio::test]
async fn ticket_update_with_its_own_name_is_rejected_as_duplicate() {
    let w = World::new().await;
    let project = w.project("P1").await;
    let s = &w.services;
    s.projects
        .add_member(&w.pm, w.company, project.id, w.dev.user_id)
        .await
        .unwrap();
    let t = s
        .tickets
        .create(&w.dev, w.company, project.id, ticket("T1"))
        .await
        .unwrap();

    let err = s
        .tickets
        .update(
            &w.dev,
            w.company,
            project.id,
            t.id,
            TicketPatch {
                name: Some("T1".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::already_exists("name", "T1"));
}

#[tokio::test]
async fn ticket_rename_to_blank_is_not_allowed() {
    let w = World::new().await;
    let project = w.project("P1").await;
    let s = &w.services;
    s.projects
        .add_member(&w.pm, w.company, project.id, w.dev.user_id)
        .await
        .unwrap();
    let t = s
        .tickets
        .create(&w.dev, w.company, project.id, ticket("T1"))
        .await
        .unwrap();

    let err = s
        .tickets
        .update(
            &w.dev,
            w.company,
            project.id,
            t.id,
            TicketPatch {
                name: Some("   ".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::not_allowed("name", "   "));

    let kept = s.tickets.get(w.company, project.id, t.id).await.unwrap();
    assert_eq!(kept.name, "T1");
    assert_eq!(kept.updated_at, None);
}

#[tokio::test]
async fn ticket_delete_is_manager_only_and_scoped() {
    let w = World::new().await;
    let project = w.project("P1").await;
    let s = &w.services;
    s.projects
        .add_member(&w.pm, w.company, project.id, w.dev.user_id)
        .await
        .unwrap();
    let t = s
        .tickets
        .create(&w.dev, w.company, project.id, ticket("T1"))
        .await
        .unwrap();

    assert_eq!(
        s.tickets
            .delete(&w.pm, w.company, project.id, TicketId::new(404))
            .await
            .unwrap_err(),
        DomainError::not_found("ticketId", TicketId::new(404))
    );
    assert_eq!(
        s.tickets
            .delete(&w.dev, w.company, project.id, t.id)
            .await
            .unwrap_err(),
        DomainError::unauthorized()
    );

    s.tickets.delete(&w.pm, w.company, project.id, t.id).await.unwrap();
    assert!(s.tickets.list(w.company, project.id).await.unwrap().is_empty());
}

// -------------------------
// Users
// -------------------------

#[tokio::test]
async fn new_users_are_developers_with_a_fresh_key() {
    let w = World::new().await;
    let created = w
        .services
        .users
        .create(w.company, UserDraft { username: "newbie".to_string() })
        .await
        .unwrap();

    assert_eq!(created.user.role.role, Role::Developer);
    assert_eq!(created.user.created_at, today());
    assert_eq!(created.company_name, "Acme");
    assert_eq!(created.user.api_key.as_str().len(), 64);

    let found = w.store.user_by_api_key(&created.user.api_key).await.unwrap();
    assert_eq!(found.map(|u| u.id), Some(created.user.id));

    assert_eq!(
        w.services
            .users
            .create(w.company, UserDraft { username: "newbie".to_string() })
            .await
            .unwrap_err(),
        DomainError::already_exists("username", "newbie")
    );
}

#[tokio::test]
async fn user_create_fails_without_developer_role_row() {
    let w = World::new().await;
    w.store.remove_role(Role::Developer);

    assert_eq!(
        w.services
            .users
            .create(w.company, UserDraft { username: "late".to_string() })
            .await
            .unwrap_err(),
        DomainError::not_found("role", "Developer")
    );
}

#[tokio::test]
async fn user_update_self_or_company_admin() {
    let w = World::new().await;
    let s = &w.services.users;
    let rename = |name: &str| UserPatch {
        username: Some(name.to_string()),
    };

    assert_eq!(
        s.update(&w.pm, w.company, w.dev.user_id, rename("x"))
            .await
            .unwrap_err(),
        DomainError::unauthorized()
    );

    let other = w.second_company().await;
    let foreign_admin = w.user_with_role(other, "foreign", Role::Admin).await;
    assert_eq!(
        s.update(&foreign_admin, w.company, w.dev.user_id, rename("x"))
            .await
            .unwrap_err(),
        DomainError::unauthorized()
    );

    assert_eq!(
        s.update(&w.dev, w.company, w.dev.user_id, rename(" "))
            .await
            .unwrap_err(),
        DomainError::not_allowed("username", " ")
    );
    assert_eq!(
        s.update(&w.dev, w.company, w.dev.user_id, rename("pm"))
            .await
            .unwrap_err(),
        DomainError::already_exists("username", "pm")
    );

    let renamed = s
        .update(&w.dev, w.company, w.dev.user_id, rename("dev-renamed"))
        .await
        .unwrap();
    assert_eq!(renamed.user.username, "dev-renamed");

    // Same payload again is idempotent.
    let again = s
        .update(&w.admin, w.company, w.dev.user_id, rename("dev-renamed"))
        .await
        .unwrap();
    assert_eq!(again, renamed);
}

#[tokio::test]
async fn role_assignment_requires_existing_role() {
    let w = World::new().await;

    assert_eq!(
        w.services
            .users
            .assign_role(&w.admin, w.company, w.dev.user_id, RoleId::new(42))
            .await
            .unwrap_err(),
        DomainError::not_found("roleId", RoleId::new(42))
    );

    // A developer may promote itself; the policy does not restrict role values.
    let admin_role = w.store.role_by_value(Role::Admin).await.unwrap().unwrap();
    let promoted = w
        .services
        .users
        .assign_role(&w.dev, w.company, w.dev.user_id, admin_role.id)
        .await
        .unwrap();
    assert_eq!(promoted.user.role.role, Role::Admin);
}

#[tokio::test]
async fn user_deletes_own_account() {
    let w = World::new().await;
    let s = &w.services.users;

    assert_eq!(
        s.delete(&w.pm, w.company, w.dev.user_id).await.unwrap_err(),
        DomainError::unauthorized()
    );

    s.delete(&w.dev, w.company, w.dev.user_id).await.unwrap();
    assert_eq!(
        s.get(w.company, w.dev.user_id).await.unwrap_err(),
        DomainError::not_found("userId", w.dev.user_id)
    );
}

#[tokio::test]
async fn manager_of_a_project_cannot_be_deleted() {
    let w = World::new().await;
    w.project("P1").await;

    let err = w
        .services
        .users
        .delete(&w.admin, w.company, w.pm.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));
}

// -------------------------
// Companies
// -------------------------

#[tokio::test]
async fn companies_have_unique_non_blank_names() {
    let w = World::new().await;
    let s = &w.services.companies;

    let created = s
        .create(
            &w.dev,
            CompanyDraft {
                name: "Initech".to_string(),
                description: Some("software".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(s.get(created.id).await.unwrap(), created);
    assert_eq!(s.list().await.unwrap().len(), 2);

    assert_eq!(
        s.create(
            &w.dev,
            CompanyDraft {
                name: "Acme".to_string(),
                description: None,
            },
        )
        .await
        .unwrap_err(),
        DomainError::already_exists("name", "Acme")
    );
    assert_eq!(
        s.create(&w.dev, CompanyDraft::default()).await.unwrap_err(),
        DomainError::not_allowed("name", "")
    );
}

#[tokio::test]
async fn demo_accounts_never_render_their_keys() {
    let store = Arc::new(InMemoryStore::with_reference_data());
    let services = Services::new(store.clone(), Arc::new(FixedClock(today())));

    let accounts = tracker_infra::seed_demo_data(&*store, &services)
        .await
        .unwrap()
        .expect("fresh store gets demo data");
    let rendered = format!("{accounts:?}");

    for account in [&accounts.admin, &accounts.project_manager, &accounts.developer] {
        assert!(!rendered.contains(account.user.api_key.as_str()));
        assert!(rendered.contains(&account.user.username));
    }
    assert_eq!(accounts.admin.user.role.role, Role::Admin);
    assert_eq!(accounts.project_manager.user.role.role, Role::ProjectManager);

    // A second run finds the demo company and leaves it alone.
    assert!(tracker_infra::seed_demo_data(&*store, &services)
        .await
        .unwrap()
        .is_none());
}
