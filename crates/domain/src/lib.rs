//! `tracker-domain`: entities, lookup ports and the aggregate services.
//!
//! Every service operation takes the calling [`Principal`] explicitly and
//! walks the same ordered protocol: parent scopes exist, referenced entities
//! exist, the policy allows the caller, fields are acceptable, unique values
//! are free, then the write happens.

pub mod dates;
pub mod identity;
pub mod model;
pub mod ports;
pub mod reference;
pub mod services;

pub use identity::authenticate;
pub use model::{
    Company, CompanyDraft, NewProject, NewTicket, NewUser, Project, ProjectDraft, ProjectPatch,
    RoleRef, Ticket, TicketDraft, TicketPatch, TicketPriority, TicketStatus, TicketType, User,
    UserDraft, UserPatch, UserView,
};
pub use ports::{Store, StoreError, StoreResult};
pub use reference::{resolve, ReferenceTable, ReferenceValue};
pub use services::{CompanyService, ProjectService, Services, TicketService, UserService};

pub use tracker_auth::Principal;
