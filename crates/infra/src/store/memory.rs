//! In-memory store for tests/dev.
//!
//! All tables live behind one `RwLock`, so a multi-table write (project
//! delete with its tickets and memberships) is a single critical section.
//! Unique constraints are enforced on every write, mirroring the database
//! schema, so racing check-then-write callers still get `UniqueViolation`.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use tracker_auth::{ApiKey, Role};
use tracker_core::{CompanyId, ProjectId, RoleId, TicketId, UserId};
use tracker_domain::ports::{
    CompanyRepository, ProjectRepository, ReferenceRepository, TicketRepository, UserRepository,
};
use tracker_domain::{
    Company, CompanyDraft, NewProject, NewTicket, NewUser, Project, ReferenceTable, RoleRef,
    StoreError, StoreResult, Ticket, User,
};

#[derive(Debug, Default)]
struct Tables {
    companies: BTreeMap<CompanyId, Company>,
    users: BTreeMap<UserId, User>,
    projects: BTreeMap<ProjectId, Project>,
    tickets: BTreeMap<TicketId, Ticket>,
    memberships: BTreeSet<(ProjectId, UserId)>,
    roles: Vec<RoleRef>,
    references: HashMap<ReferenceTable, Vec<String>>,
    sequence: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.sequence += 1;
        self.sequence
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Tables>,
}

impl InMemoryStore {
    /// Empty store without reference rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the role and ticket reference tables.
    pub fn with_reference_data() -> Self {
        let store = Self::new();
        store.seed_reference_data();
        store
    }

    /// Insert any missing reference rows. Idempotent.
    pub fn seed_reference_data(&self) {
        let Ok(mut tables) = self.inner.write() else {
            return;
        };

        for role in Role::ALL {
            if !tables.roles.iter().any(|r| r.role == role) {
                let next = tables.roles.iter().map(|r| r.id.get()).max().unwrap_or(0) + 1;
                let id = RoleId::new(next);
                tables.roles.push(RoleRef { id, role });
            }
        }

        for table in ReferenceTable::ALL {
            let literals = tables.references.entry(table).or_default();
            for literal in table.default_literals() {
                if !literals.iter().any(|l| l == literal) {
                    literals.push(literal.to_string());
                }
            }
        }
    }

    /// Replace the literals of one reference table.
    pub fn set_reference_literals(&self, table: ReferenceTable, literals: Vec<String>) {
        if let Ok(mut tables) = self.inner.write() {
            tables.references.insert(table, literals);
        }
    }

    /// Drop a role reference row.
    pub fn remove_role(&self, role: Role) {
        if let Ok(mut tables) = self.inner.write() {
            tables.roles.retain(|r| r.role != role);
        }
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.inner
            .read()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.inner
            .write()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }
}

fn unique(property: &'static str, value: &str) -> StoreError {
    StoreError::UniqueViolation {
        property,
        value: value.to_string(),
    }
}

#[async_trait]
impl CompanyRepository for InMemoryStore {
    async fn list_companies(&self) -> StoreResult<Vec<Company>> {
        Ok(self.read()?.companies.values().cloned().collect())
    }

    async fn company(&self, id: CompanyId) -> StoreResult<Option<Company>> {
        Ok(self.read()?.companies.get(&id).cloned())
    }

    async fn company_by_name(&self, name: &str) -> StoreResult<Option<Company>> {
        Ok(self
            .read()?
            .companies
            .values()
            .find(|c| c.name == name)
            .cloned())
    }

    async fn insert_company(&self, draft: CompanyDraft) -> StoreResult<Company> {
        let mut tables = self.write()?;
        if tables.companies.values().any(|c| c.name == draft.name) {
            return Err(unique("name", &draft.name));
        }

        let company = Company {
            id: CompanyId::new(tables.next_id()),
            name: draft.name,
            description: draft.description,
        };
        tables.companies.insert(company.id, company.clone());
        Ok(company)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn users_in_company(&self, company_id: CompanyId) -> StoreResult<Vec<User>> {
        Ok(self
            .read()?
            .users
            .values()
            .filter(|u| u.company_id == company_id)
            .cloned()
            .collect())
    }

    async fn user_in_company(
        &self,
        id: UserId,
        company_id: CompanyId,
    ) -> StoreResult<Option<User>> {
        Ok(self
            .read()?
            .users
            .get(&id)
            .filter(|u| u.company_id == company_id)
            .cloned())
    }

    async fn user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn user_by_api_key(&self, key: &ApiKey) -> StoreResult<Option<User>> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| u.api_key == *key)
            .cloned())
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.write()?;
        if !tables.companies.contains_key(&user.company_id) {
            return Err(StoreError::ForeignKeyViolation(format!(
                "company {} does not exist",
                user.company_id
            )));
        }
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(unique("username", &user.username));
        }
        if tables.users.values().any(|u| u.api_key == user.api_key) {
            return Err(unique("apiKey", "<redacted>"));
        }

        let user = User {
            id: UserId::new(tables.next_id()),
            username: user.username,
            api_key: user.api_key,
            created_at: user.created_at,
            company_id: user.company_id,
            role: user.role,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, user: &User) -> StoreResult<User> {
        let mut tables = self.write()?;
        if !tables.users.contains_key(&user.id) {
            return Err(StoreError::Backend(format!("user {} vanished", user.id)));
        }
        if tables
            .users
            .values()
            .any(|u| u.id != user.id && u.username == user.username)
        {
            return Err(unique("username", &user.username));
        }

        tables.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn delete_user(&self, id: UserId) -> StoreResult<()> {
        let mut tables = self.write()?;
        if tables.projects.values().any(|p| p.project_manager_id == id) {
            return Err(StoreError::ForeignKeyViolation(format!(
                "user {id} still manages a project"
            )));
        }
        if tables.tickets.values().any(|t| t.creator_id == id) {
            return Err(StoreError::ForeignKeyViolation(format!(
                "user {id} still created tickets"
            )));
        }

        tables.memberships.retain(|(_, member)| *member != id);
        tables.users.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl ProjectRepository for InMemoryStore {
    async fn projects_in_company(&self, company_id: CompanyId) -> StoreResult<Vec<Project>> {
        Ok(self
            .read()?
            .projects
            .values()
            .filter(|p| p.company_id == company_id)
            .cloned()
            .collect())
    }

    async fn project_in_company(
        &self,
        id: ProjectId,
        company_id: CompanyId,
    ) -> StoreResult<Option<Project>> {
        Ok(self
            .read()?
            .projects
            .get(&id)
            .filter(|p| p.company_id == company_id)
            .cloned())
    }

    async fn project_by_name(&self, name: &str) -> StoreResult<Option<Project>> {
        Ok(self
            .read()?
            .projects
            .values()
            .find(|p| p.name == name)
            .cloned())
    }

    async fn insert_project(&self, project: NewProject) -> StoreResult<Project> {
        let mut tables = self.write()?;
        if tables.projects.values().any(|p| p.name == project.name) {
            return Err(unique("projectName", &project.name));
        }
        if !tables.users.contains_key(&project.project_manager_id) {
            return Err(StoreError::ForeignKeyViolation(format!(
                "user {} does not exist",
                project.project_manager_id
            )));
        }

        let project = Project {
            id: ProjectId::new(tables.next_id()),
            name: project.name,
            description: project.description,
            start_date: project.start_date,
            end_date: project.end_date,
            company_id: project.company_id,
            project_manager_id: project.project_manager_id,
        };
        tables.projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn update_project(&self, project: &Project) -> StoreResult<Project> {
        let mut tables = self.write()?;
        if !tables.projects.contains_key(&project.id) {
            return Err(StoreError::Backend(format!("project {} vanished", project.id)));
        }
        if tables
            .projects
            .values()
            .any(|p| p.id != project.id && p.name == project.name)
        {
            return Err(unique("projectName", &project.name));
        }

        tables.projects.insert(project.id, project.clone());
        Ok(project.clone())
    }

    async fn delete_project(&self, id: ProjectId) -> StoreResult<()> {
        let mut tables = self.write()?;
        tables.tickets.retain(|_, t| t.project_id != id);
        tables.memberships.retain(|(project, _)| *project != id);
        tables.projects.remove(&id);
        Ok(())
    }

    async fn members(&self, project_id: ProjectId) -> StoreResult<Vec<User>> {
        let tables = self.read()?;
        Ok(tables
            .memberships
            .range((project_id, UserId::new(i64::MIN))..=(project_id, UserId::new(i64::MAX)))
            .filter_map(|(_, user_id)| tables.users.get(user_id).cloned())
            .collect())
    }

    async fn is_member(&self, project_id: ProjectId, user_id: UserId) -> StoreResult<bool> {
        Ok(self.read()?.memberships.contains(&(project_id, user_id)))
    }

    async fn add_member(&self, project_id: ProjectId, user_id: UserId) -> StoreResult<()> {
        let mut tables = self.write()?;
        if !tables.projects.contains_key(&project_id) || !tables.users.contains_key(&user_id) {
            return Err(StoreError::ForeignKeyViolation(format!(
                "membership ({project_id}, {user_id}) references a missing row"
            )));
        }
        if !tables.memberships.insert((project_id, user_id)) {
            return Err(unique("userId", &user_id.to_string()));
        }
        Ok(())
    }

    async fn remove_member(&self, project_id: ProjectId, user_id: UserId) -> StoreResult<bool> {
        Ok(self.write()?.memberships.remove(&(project_id, user_id)))
    }
}

#[async_trait]
impl TicketRepository for InMemoryStore {
    async fn tickets_in_project(&self, project_id: ProjectId) -> StoreResult<Vec<Ticket>> {
        Ok(self
            .read()?
            .tickets
            .values()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn ticket_in_project(
        &self,
        id: TicketId,
        project_id: ProjectId,
    ) -> StoreResult<Option<Ticket>> {
        Ok(self
            .read()?
            .tickets
            .get(&id)
            .filter(|t| t.project_id == project_id)
            .cloned())
    }

    async fn ticket_by_name(&self, project_id: ProjectId, name: &str) -> StoreResult<Option<Ticket>> {
        Ok(self
            .read()?
            .tickets
            .values()
            .find(|t| t.project_id == project_id && t.name == name)
            .cloned())
    }

    async fn insert_ticket(&self, ticket: NewTicket) -> StoreResult<Ticket> {
        let mut tables = self.write()?;
        if tables
            .tickets
            .values()
            .any(|t| t.project_id == ticket.project_id && t.name == ticket.name)
        {
            return Err(unique("name", &ticket.name));
        }
        if !tables.projects.contains_key(&ticket.project_id) {
            return Err(StoreError::ForeignKeyViolation(format!(
                "project {} does not exist",
                ticket.project_id
            )));
        }

        let ticket = Ticket {
            id: TicketId::new(tables.next_id()),
            name: ticket.name,
            description: ticket.description,
            created_at: ticket.created_at,
            updated_at: None,
            project_id: ticket.project_id,
            creator_id: ticket.creator_id,
            ticket_type: ticket.ticket_type,
            ticket_priority: ticket.ticket_priority,
            ticket_status: ticket.ticket_status,
        };
        tables.tickets.insert(ticket.id, ticket.clone());
        Ok(ticket)
    }

    async fn update_ticket(&self, ticket: &Ticket) -> StoreResult<Ticket> {
        let mut tables = self.write()?;
        if !tables.tickets.contains_key(&ticket.id) {
            return Err(StoreError::Backend(format!("ticket {} vanished", ticket.id)));
        }
        if tables.tickets.values().any(|t| {
            t.id != ticket.id && t.project_id == ticket.project_id && t.name == ticket.name
        }) {
            return Err(unique("name", &ticket.name));
        }

        tables.tickets.insert(ticket.id, ticket.clone());
        Ok(ticket.clone())
    }

    async fn delete_ticket(&self, id: TicketId) -> StoreResult<()> {
        self.write()?.tickets.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl ReferenceRepository for InMemoryStore {
    async fn role_by_id(&self, id: RoleId) -> StoreResult<Option<RoleRef>> {
        Ok(self.read()?.roles.iter().find(|r| r.id == id).copied())
    }

    async fn role_by_value(&self, role: Role) -> StoreResult<Option<RoleRef>> {
        Ok(self.read()?.roles.iter().find(|r| r.role == role).copied())
    }

    async fn reference_literals(&self, table: ReferenceTable) -> StoreResult<Vec<String>> {
        Ok(self
            .read()?
            .references
            .get(&table)
            .cloned()
            .unwrap_or_default())
    }
}
