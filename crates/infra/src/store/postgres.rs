//! Postgres-backed store.
//!
//! ## Error Mapping
//!
//! | PostgreSQL Error Code | StoreError | Scenario |
//! |----------------------|------------|----------|
//! | `23505` unique violation | `UniqueViolation` | a concurrent writer took the name between check and insert |
//! | `23503` foreign key violation | `ForeignKeyViolation` | deleting a user still referenced by a project or ticket |
//! | any other / pool / network | `Backend` | fatal for the request |
//!
//! Unique constraint names map back to the request property that owns them.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::{info, instrument};

use tracker_auth::{ApiKey, Role};
use tracker_core::{CompanyId, ProjectId, RoleId, TicketId, UserId};
use tracker_domain::ports::{
    CompanyRepository, ProjectRepository, ReferenceRepository, TicketRepository, UserRepository,
};
use tracker_domain::{
    Company, CompanyDraft, NewProject, NewTicket, NewUser, Project, ReferenceTable,
    ReferenceValue, RoleRef, StoreError, StoreResult, Ticket, TicketPriority, TicketStatus,
    TicketType, User,
};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS companies (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL CONSTRAINT companies_name_key UNIQUE,
        description TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS roles (
        id BIGSERIAL PRIMARY KEY,
        role TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        username TEXT NOT NULL CONSTRAINT users_username_key UNIQUE,
        api_key TEXT NOT NULL CONSTRAINT users_api_key_key UNIQUE,
        created_at DATE NOT NULL,
        company_id BIGINT NOT NULL REFERENCES companies(id),
        role_id BIGINT NOT NULL REFERENCES roles(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS projects (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL CONSTRAINT projects_name_key UNIQUE,
        description TEXT,
        start_date DATE,
        end_date DATE,
        company_id BIGINT NOT NULL REFERENCES companies(id),
        project_manager_id BIGINT NOT NULL REFERENCES users(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS project_members (
        project_id BIGINT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
        user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        CONSTRAINT project_members_pkey PRIMARY KEY (project_id, user_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS ticket_types (
        id BIGSERIAL PRIMARY KEY,
        value TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS ticket_priorities (
        id BIGSERIAL PRIMARY KEY,
        value TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS ticket_statuses (
        id BIGSERIAL PRIMARY KEY,
        value TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tickets (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT,
        created_at DATE NOT NULL,
        updated_at DATE,
        project_id BIGINT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
        creator_id BIGINT NOT NULL REFERENCES users(id),
        ticket_type_id BIGINT NOT NULL REFERENCES ticket_types(id),
        ticket_priority_id BIGINT NOT NULL REFERENCES ticket_priorities(id),
        ticket_status_id BIGINT NOT NULL REFERENCES ticket_statuses(id),
        CONSTRAINT tickets_project_id_name_key UNIQUE (project_id, name)
    )
    "#,
];

const USER_COLUMNS: &str = r#"
    SELECT u.id, u.username, u.api_key, u.created_at, u.company_id, u.role_id, r.role
    FROM users u
    JOIN roles r ON r.id = u.role_id
"#;

const TICKET_COLUMNS: &str = r#"
    SELECT t.id, t.name, t.description, t.created_at, t.updated_at, t.project_id, t.creator_id,
           ty.value AS ticket_type, pr.value AS ticket_priority, st.value AS ticket_status
    FROM tickets t
    JOIN ticket_types ty ON ty.id = t.ticket_type_id
    JOIN ticket_priorities pr ON pr.id = t.ticket_priority_id
    JOIN ticket_statuses st ON st.id = t.ticket_status_id
"#;

const PROJECT_COLUMNS: &str = r#"
    SELECT id, name, description, start_date, end_date, company_id, project_manager_id
    FROM projects
"#;

fn reference_table_name(table: ReferenceTable) -> &'static str {
    match table {
        ReferenceTable::TicketType => "ticket_types",
        ReferenceTable::TicketPriority => "ticket_priorities",
        ReferenceTable::TicketStatus => "ticket_statuses",
    }
}

/// Postgres-backed implementation of every repository port.
///
/// Uses the SQLx connection pool, which is `Send + Sync`. Multi-statement
/// writes run in one transaction.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the schema if missing.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("migrate", e))?;
        }
        info!("schema ready");
        Ok(())
    }

    /// Insert any missing reference rows. Idempotent.
    #[instrument(skip(self), err)]
    pub async fn seed_reference_data(&self) -> StoreResult<()> {
        for role in Role::ALL {
            sqlx::query("INSERT INTO roles (role) VALUES ($1) ON CONFLICT (role) DO NOTHING")
                .bind(role.as_str())
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("seed_roles", e))?;
        }

        for table in ReferenceTable::ALL {
            let sql = format!(
                "INSERT INTO {} (value) VALUES ($1) ON CONFLICT (value) DO NOTHING",
                reference_table_name(table)
            );
            for literal in table.default_literals() {
                sqlx::query(&sql)
                    .bind(literal)
                    .execute(&*self.pool)
                    .await
                    .map_err(|e| map_sqlx_error("seed_references", e))?;
            }
        }
        Ok(())
    }

    async fn reference_id(&self, table: ReferenceTable, literal: &str) -> StoreResult<i64> {
        let sql = format!("SELECT id FROM {} WHERE value = $1", reference_table_name(table));
        let row = sqlx::query(&sql)
            .bind(literal)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("reference_id", e))?;

        match row {
            Some(row) => row.try_get("id").map_err(|e| map_sqlx_error("reference_id", e)),
            None => Err(StoreError::ForeignKeyViolation(format!(
                "{} has no row {literal}",
                reference_table_name(table)
            ))),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Companies
// ─────────────────────────────────────────────────────────────────────────────

fn company_from_row(row: &PgRow) -> Result<Company, sqlx::Error> {
    Ok(Company {
        id: CompanyId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
    })
}

#[async_trait]
impl CompanyRepository for PostgresStore {
    async fn list_companies(&self) -> StoreResult<Vec<Company>> {
        let rows = sqlx::query("SELECT id, name, description FROM companies ORDER BY id")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_companies", e))?;
        rows.iter()
            .map(company_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("list_companies", e))
    }

    async fn company(&self, id: CompanyId) -> StoreResult<Option<Company>> {
        let row = sqlx::query("SELECT id, name, description FROM companies WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("company", e))?;
        row.as_ref()
            .map(company_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("company", e))
    }

    async fn company_by_name(&self, name: &str) -> StoreResult<Option<Company>> {
        let row = sqlx::query("SELECT id, name, description FROM companies WHERE name = $1")
            .bind(name)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("company_by_name", e))?;
        row.as_ref()
            .map(company_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("company_by_name", e))
    }

    #[instrument(skip(self, draft), err)]
    async fn insert_company(&self, draft: CompanyDraft) -> StoreResult<Company> {
        let row = sqlx::query(
            r#"
            INSERT INTO companies (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description
            "#,
        )
        .bind(&draft.name)
        .bind(&draft.description)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_write_error("insert_company", e, &[("name", &draft.name)]))?;
        company_from_row(&row).map_err(|e| map_sqlx_error("insert_company", e))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    let role: String = row.try_get("role")?;
    let role = role
        .parse::<Role>()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
    Ok(User {
        id: UserId::new(row.try_get("id")?),
        username: row.try_get("username")?,
        api_key: ApiKey::from_string(row.try_get::<String, _>("api_key")?),
        created_at: row.try_get::<NaiveDate, _>("created_at")?,
        company_id: CompanyId::new(row.try_get("company_id")?),
        role: RoleRef {
            id: RoleId::new(row.try_get("role_id")?),
            role,
        },
    })
}

impl PostgresStore {
    async fn fetch_user(&self, operation: &str, id: UserId) -> StoreResult<User> {
        let row = sqlx::query(&format!("{USER_COLUMNS} WHERE u.id = $1"))
            .bind(id.get())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
        user_from_row(&row).map_err(|e| map_sqlx_error(operation, e))
    }

    async fn fetch_users(&self, operation: &str, sql: &str, bind: i64) -> StoreResult<Vec<User>> {
        let rows = sqlx::query(sql)
            .bind(bind)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
        rows.iter()
            .map(user_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error(operation, e))
    }

    async fn fetch_optional_user(
        &self,
        operation: &str,
        sql: &str,
        bind: &str,
    ) -> StoreResult<Option<User>> {
        let row = sqlx::query(sql)
            .bind(bind)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
        row.as_ref()
            .map(user_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error(operation, e))
    }
}

#[async_trait]
impl UserRepository for PostgresStore {
    async fn users_in_company(&self, company_id: CompanyId) -> StoreResult<Vec<User>> {
        let sql = format!("{USER_COLUMNS} WHERE u.company_id = $1 ORDER BY u.id");
        self.fetch_users("users_in_company", &sql, company_id.get())
            .await
    }

    async fn user_in_company(
        &self,
        id: UserId,
        company_id: CompanyId,
    ) -> StoreResult<Option<User>> {
        let row = sqlx::query(&format!(
            "{USER_COLUMNS} WHERE u.id = $1 AND u.company_id = $2"
        ))
        .bind(id.get())
        .bind(company_id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("user_in_company", e))?;
        row.as_ref()
            .map(user_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("user_in_company", e))
    }

    async fn user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let sql = format!("{USER_COLUMNS} WHERE u.username = $1");
        self.fetch_optional_user("user_by_username", &sql, username)
            .await
    }

    async fn user_by_api_key(&self, key: &ApiKey) -> StoreResult<Option<User>> {
        let sql = format!("{USER_COLUMNS} WHERE u.api_key = $1");
        self.fetch_optional_user("user_by_api_key", &sql, key.as_str())
            .await
    }

    #[instrument(skip(self, user), err)]
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (username, api_key, created_at, company_id, role_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&user.username)
        .bind(user.api_key.as_str())
        .bind(user.created_at)
        .bind(user.company_id.get())
        .bind(user.role.id.get())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| {
            map_write_error(
                "insert_user",
                e,
                &[("username", &user.username), ("apiKey", "<redacted>")],
            )
        })?;

        let id: i64 = row
            .try_get("id")
            .map_err(|e| map_sqlx_error("insert_user", e))?;
        self.fetch_user("insert_user", UserId::new(id)).await
    }

    #[instrument(skip(self, user), fields(user_id = %user.id), err)]
    async fn update_user(&self, user: &User) -> StoreResult<User> {
        sqlx::query("UPDATE users SET username = $2, role_id = $3 WHERE id = $1")
            .bind(user.id.get())
            .bind(&user.username)
            .bind(user.role.id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_write_error("update_user", e, &[("username", &user.username)]))?;
        self.fetch_user("update_user", user.id).await
    }

    #[instrument(skip(self), err)]
    async fn delete_user(&self, id: UserId) -> StoreResult<()> {
        // Membership rows cascade; project/ticket references raise 23503.
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_user", e))?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Projects and membership
// ─────────────────────────────────────────────────────────────────────────────

fn project_from_row(row: &PgRow) -> Result<Project, sqlx::Error> {
    Ok(Project {
        id: ProjectId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        company_id: CompanyId::new(row.try_get("company_id")?),
        project_manager_id: UserId::new(row.try_get("project_manager_id")?),
    })
}

#[async_trait]
impl ProjectRepository for PostgresStore {
    async fn projects_in_company(&self, company_id: CompanyId) -> StoreResult<Vec<Project>> {
        let rows = sqlx::query(&format!(
            "{PROJECT_COLUMNS} WHERE company_id = $1 ORDER BY id"
        ))
        .bind(company_id.get())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("projects_in_company", e))?;
        rows.iter()
            .map(project_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("projects_in_company", e))
    }

    async fn project_in_company(
        &self,
        id: ProjectId,
        company_id: CompanyId,
    ) -> StoreResult<Option<Project>> {
        let row = sqlx::query(&format!(
            "{PROJECT_COLUMNS} WHERE id = $1 AND company_id = $2"
        ))
        .bind(id.get())
        .bind(company_id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("project_in_company", e))?;
        row.as_ref()
            .map(project_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("project_in_company", e))
    }

    async fn project_by_name(&self, name: &str) -> StoreResult<Option<Project>> {
        let row = sqlx::query(&format!("{PROJECT_COLUMNS} WHERE name = $1"))
            .bind(name)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("project_by_name", e))?;
        row.as_ref()
            .map(project_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("project_by_name", e))
    }

    #[instrument(skip(self, project), err)]
    async fn insert_project(&self, project: NewProject) -> StoreResult<Project> {
        let row = sqlx::query(
            r#"
            INSERT INTO projects (name, description, start_date, end_date, company_id, project_manager_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, description, start_date, end_date, company_id, project_manager_id
            "#,
        )
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.start_date)
        .bind(project.end_date)
        .bind(project.company_id.get())
        .bind(project.project_manager_id.get())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_write_error("insert_project", e, &[("projectName", &project.name)]))?;
        project_from_row(&row).map_err(|e| map_sqlx_error("insert_project", e))
    }

    #[instrument(skip(self, project), fields(project_id = %project.id), err)]
    async fn update_project(&self, project: &Project) -> StoreResult<Project> {
        let row = sqlx::query(
            r#"
            UPDATE projects
            SET name = $2, description = $3, start_date = $4, end_date = $5, project_manager_id = $6
            WHERE id = $1
            RETURNING id, name, description, start_date, end_date, company_id, project_manager_id
            "#,
        )
        .bind(project.id.get())
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.start_date)
        .bind(project.end_date)
        .bind(project.project_manager_id.get())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_write_error("update_project", e, &[("projectName", &project.name)]))?;
        project_from_row(&row).map_err(|e| map_sqlx_error("update_project", e))
    }

    #[instrument(skip(self), err)]
    async fn delete_project(&self, id: ProjectId) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        for sql in [
            "DELETE FROM tickets WHERE project_id = $1",
            "DELETE FROM project_members WHERE project_id = $1",
            "DELETE FROM projects WHERE id = $1",
        ] {
            sqlx::query(sql)
                .bind(id.get())
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("delete_project", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))
    }

    async fn members(&self, project_id: ProjectId) -> StoreResult<Vec<User>> {
        let sql = format!(
            "{USER_COLUMNS} JOIN project_members m ON m.user_id = u.id WHERE m.project_id = $1 ORDER BY u.id"
        );
        self.fetch_users("members", &sql, project_id.get()).await
    }

    async fn is_member(&self, project_id: ProjectId, user_id: UserId) -> StoreResult<bool> {
        let row = sqlx::query(
            "SELECT EXISTS (SELECT 1 FROM project_members WHERE project_id = $1 AND user_id = $2) AS present",
        )
        .bind(project_id.get())
        .bind(user_id.get())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("is_member", e))?;
        row.try_get("present")
            .map_err(|e| map_sqlx_error("is_member", e))
    }

    #[instrument(skip(self), err)]
    async fn add_member(&self, project_id: ProjectId, user_id: UserId) -> StoreResult<()> {
        sqlx::query("INSERT INTO project_members (project_id, user_id) VALUES ($1, $2)")
            .bind(project_id.get())
            .bind(user_id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| {
                map_write_error("add_member", e, &[("userId", &user_id.to_string())])
            })?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn remove_member(&self, project_id: ProjectId, user_id: UserId) -> StoreResult<bool> {
        let result =
            sqlx::query("DELETE FROM project_members WHERE project_id = $1 AND user_id = $2")
                .bind(project_id.get())
                .bind(user_id.get())
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("remove_member", e))?;
        Ok(result.rows_affected() > 0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tickets
// ─────────────────────────────────────────────────────────────────────────────

fn reference_from_row<R: ReferenceValue>(row: &PgRow, column: &str) -> Result<R, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    R::from_literal(&raw).ok_or_else(|| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: format!("unknown {} literal '{raw}'", R::PROPERTY).into(),
    })
}

fn ticket_from_row(row: &PgRow) -> Result<Ticket, sqlx::Error> {
    Ok(Ticket {
        id: TicketId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        project_id: ProjectId::new(row.try_get("project_id")?),
        creator_id: UserId::new(row.try_get("creator_id")?),
        ticket_type: reference_from_row::<TicketType>(row, "ticket_type")?,
        ticket_priority: reference_from_row::<TicketPriority>(row, "ticket_priority")?,
        ticket_status: reference_from_row::<TicketStatus>(row, "ticket_status")?,
    })
}

impl PostgresStore {
    async fn fetch_ticket(&self, operation: &str, id: TicketId) -> StoreResult<Ticket> {
        let row = sqlx::query(&format!("{TICKET_COLUMNS} WHERE t.id = $1"))
            .bind(id.get())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
        ticket_from_row(&row).map_err(|e| map_sqlx_error(operation, e))
    }
}

#[async_trait]
impl TicketRepository for PostgresStore {
    async fn tickets_in_project(&self, project_id: ProjectId) -> StoreResult<Vec<Ticket>> {
        let rows = sqlx::query(&format!(
            "{TICKET_COLUMNS} WHERE t.project_id = $1 ORDER BY t.id"
        ))
        .bind(project_id.get())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("tickets_in_project", e))?;
        rows.iter()
            .map(ticket_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("tickets_in_project", e))
    }

    async fn ticket_in_project(
        &self,
        id: TicketId,
        project_id: ProjectId,
    ) -> StoreResult<Option<Ticket>> {
        let row = sqlx::query(&format!(
            "{TICKET_COLUMNS} WHERE t.id = $1 AND t.project_id = $2"
        ))
        .bind(id.get())
        .bind(project_id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("ticket_in_project", e))?;
        row.as_ref()
            .map(ticket_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("ticket_in_project", e))
    }

    async fn ticket_by_name(
        &self,
        project_id: ProjectId,
        name: &str,
    ) -> StoreResult<Option<Ticket>> {
        let row = sqlx::query(&format!(
            "{TICKET_COLUMNS} WHERE t.project_id = $1 AND t.name = $2"
        ))
        .bind(project_id.get())
        .bind(name)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("ticket_by_name", e))?;
        row.as_ref()
            .map(ticket_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("ticket_by_name", e))
    }

    #[instrument(skip(self, ticket), err)]
    async fn insert_ticket(&self, ticket: NewTicket) -> StoreResult<Ticket> {
        let type_id = self
            .reference_id(ReferenceTable::TicketType, ticket.ticket_type.as_str())
            .await?;
        let priority_id = self
            .reference_id(ReferenceTable::TicketPriority, ticket.ticket_priority.as_str())
            .await?;
        let status_id = self
            .reference_id(ReferenceTable::TicketStatus, ticket.ticket_status.as_str())
            .await?;

        let row = sqlx::query(
            r#"
            INSERT INTO tickets
                (name, description, created_at, updated_at, project_id, creator_id,
                 ticket_type_id, ticket_priority_id, ticket_status_id)
            VALUES ($1, $2, $3, NULL, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(&ticket.name)
        .bind(&ticket.description)
        .bind(ticket.created_at)
        .bind(ticket.project_id.get())
        .bind(ticket.creator_id.get())
        .bind(type_id)
        .bind(priority_id)
        .bind(status_id)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_write_error("insert_ticket", e, &[("name", &ticket.name)]))?;

        let id: i64 = row
            .try_get("id")
            .map_err(|e| map_sqlx_error("insert_ticket", e))?;
        self.fetch_ticket("insert_ticket", TicketId::new(id)).await
    }

    #[instrument(skip(self, ticket), fields(ticket_id = %ticket.id), err)]
    async fn update_ticket(&self, ticket: &Ticket) -> StoreResult<Ticket> {
        let type_id = self
            .reference_id(ReferenceTable::TicketType, ticket.ticket_type.as_str())
            .await?;
        let priority_id = self
            .reference_id(ReferenceTable::TicketPriority, ticket.ticket_priority.as_str())
            .await?;
        let status_id = self
            .reference_id(ReferenceTable::TicketStatus, ticket.ticket_status.as_str())
            .await?;

        sqlx::query(
            r#"
            UPDATE tickets
            SET name = $2, description = $3, updated_at = $4,
                ticket_type_id = $5, ticket_priority_id = $6, ticket_status_id = $7
            WHERE id = $1
            "#,
        )
        .bind(ticket.id.get())
        .bind(&ticket.name)
        .bind(&ticket.description)
        .bind(ticket.updated_at)
        .bind(type_id)
        .bind(priority_id)
        .bind(status_id)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_write_error("update_ticket", e, &[("name", &ticket.name)]))?;

        self.fetch_ticket("update_ticket", ticket.id).await
    }

    #[instrument(skip(self), err)]
    async fn delete_ticket(&self, id: TicketId) -> StoreResult<()> {
        sqlx::query("DELETE FROM tickets WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_ticket", e))?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Reference tables
// ─────────────────────────────────────────────────────────────────────────────

fn role_from_row(row: &PgRow) -> Result<RoleRef, sqlx::Error> {
    let role: String = row.try_get("role")?;
    Ok(RoleRef {
        id: RoleId::new(row.try_get("id")?),
        role: role
            .parse::<Role>()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
    })
}

#[async_trait]
impl ReferenceRepository for PostgresStore {
    async fn role_by_id(&self, id: RoleId) -> StoreResult<Option<RoleRef>> {
        let row = sqlx::query("SELECT id, role FROM roles WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("role_by_id", e))?;
        row.as_ref()
            .map(role_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("role_by_id", e))
    }

    async fn role_by_value(&self, role: Role) -> StoreResult<Option<RoleRef>> {
        let row = sqlx::query("SELECT id, role FROM roles WHERE role = $1")
            .bind(role.as_str())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("role_by_value", e))?;
        row.as_ref()
            .map(role_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("role_by_value", e))
    }

    async fn reference_literals(&self, table: ReferenceTable) -> StoreResult<Vec<String>> {
        let sql = format!(
            "SELECT value FROM {} ORDER BY id",
            reference_table_name(table)
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("reference_literals", e))?;
        rows.iter()
            .map(|row| row.try_get::<String, _>("value"))
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("reference_literals", e))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Error mapping
// ─────────────────────────────────────────────────────────────────────────────

/// Property owning each unique constraint of the schema.
fn constraint_property(constraint: &str) -> Option<&'static str> {
    match constraint {
        "companies_name_key" => Some("name"),
        "users_username_key" => Some("username"),
        "users_api_key_key" => Some("apiKey"),
        "projects_name_key" => Some("projectName"),
        "tickets_project_id_name_key" => Some("name"),
        "project_members_pkey" => Some("userId"),
        _ => None,
    }
}

/// Map a write failure, naming the offending value for unique violations.
///
/// `values` pairs each property the write could collide on with the value
/// that was being written.
fn map_write_error(operation: &str, err: sqlx::Error, values: &[(&'static str, &str)]) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            let property = db_err.constraint().and_then(constraint_property);
            if let Some(&(property, value)) = property
                .and_then(|p| values.iter().find(|(candidate, _)| *candidate == p))
            {
                return StoreError::UniqueViolation {
                    property,
                    value: value.to_string(),
                };
            }
        }
    }
    map_sqlx_error(operation, err)
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());

            match db_err.code().as_deref() {
                Some("23505") => StoreError::UniqueViolation {
                    property: db_err
                        .constraint()
                        .and_then(constraint_property)
                        .unwrap_or("unknown"),
                    value: String::new(),
                },
                Some("23503") => StoreError::ForeignKeyViolation(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}
