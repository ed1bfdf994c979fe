//! Entities and the inputs the services accept.
//!
//! Relations are stored as foreign keys only. Project membership is a join
//! fact owned by the store, never a collection embedded in either side.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use tracker_auth::{ApiKey, Role};
use tracker_core::{CompanyId, ProjectId, RoleId, TicketId, UserId};

// ─────────────────────────────────────────────────────────────────────────────
// Entities
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub description: Option<String>,
}

/// A role reference row.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RoleRef {
    pub id: RoleId,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub api_key: ApiKey,
    pub created_at: NaiveDate,
    pub company_id: CompanyId,
    pub role: RoleRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub company_id: CompanyId,
    pub project_manager_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub id: TicketId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: NaiveDate,
    pub updated_at: Option<NaiveDate>,
    pub project_id: ProjectId,
    pub creator_id: UserId,
    pub ticket_type: TicketType,
    pub ticket_priority: TicketPriority,
    pub ticket_status: TicketStatus,
}

/// A user together with the name of its company, as rendered to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserView {
    pub user: User,
    pub company_name: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Ticket reference values
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketType {
    GeneralTask,
    NewFeature,
    ChangeRequest,
    Enhancement,
    Bug,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketPriority {
    Low,
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketStatus {
    New,
    Development,
    Testing,
    Resolved,
}

// ─────────────────────────────────────────────────────────────────────────────
// Store inputs (ids assigned by the store)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub api_key: ApiKey,
    pub created_at: NaiveDate,
    pub company_id: CompanyId,
    pub role: RoleRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub company_id: CompanyId,
    pub project_manager_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    pub name: String,
    pub description: Option<String>,
    pub created_at: NaiveDate,
    pub project_id: ProjectId,
    pub creator_id: UserId,
    pub ticket_type: TicketType,
    pub ticket_priority: TicketPriority,
    pub ticket_status: TicketStatus,
}

// ─────────────────────────────────────────────────────────────────────────────
// Service inputs
//
// Drafts carry the fields a create requires; patches leave every field
// optional and absent fields keep their current value.
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyDraft {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDraft {
    pub username: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub username: Option<String>,
}

/// Dates arrive as raw `dd-MM-yyyy` strings and are parsed by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub project_manager_id: UserId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub project_manager_id: Option<UserId>,
}

/// Reference values arrive as raw literals and are resolved against the
/// persisted reference tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketDraft {
    pub name: String,
    pub description: Option<String>,
    pub ticket_type: String,
    pub ticket_priority: String,
    pub ticket_status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub ticket_type: Option<String>,
    pub ticket_priority: Option<String>,
    pub ticket_status: Option<String>,
}
