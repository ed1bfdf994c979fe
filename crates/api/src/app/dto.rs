use serde::Deserialize;

use tracker_core::UserId;
use tracker_domain::{
    Company, CompanyDraft, Project, ProjectDraft, ProjectPatch, Ticket, TicketDraft, TicketPatch,
    UserDraft, UserPatch, UserView,
};

use crate::app::errors::FieldErrors;

// -------------------------
// Request DTOs
//
// Every field is optional on the wire so a missing required field surfaces
// as a field error rather than a body rejection.
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct CompanyRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserRequest {
    pub username: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRequest {
    pub project_name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub project_manager_id: Option<UserId>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub ticket_type: Option<String>,
    pub ticket_priority: Option<String>,
    pub ticket_status: Option<String>,
}

fn required(
    errors: &mut FieldErrors,
    field: &'static str,
    message: &str,
    value: Option<String>,
) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => {
            errors.insert(field, message.to_string());
            String::new()
        }
    }
}

fn finish<T>(errors: FieldErrors, value: T) -> Result<T, FieldErrors> {
    if errors.is_empty() { Ok(value) } else { Err(errors) }
}

impl CompanyRequest {
    pub fn into_draft(self) -> Result<CompanyDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = required(&mut errors, "name", "name should not be blank", self.name);
        finish(
            errors,
            CompanyDraft {
                name,
                description: self.description,
            },
        )
    }
}

impl UserRequest {
    pub fn into_draft(self) -> Result<UserDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        let username = required(
            &mut errors,
            "username",
            "username should not be blank",
            self.username,
        );
        finish(errors, UserDraft { username })
    }

    /// Updates validate the body the same way creates do.
    pub fn into_patch(self) -> Result<UserPatch, FieldErrors> {
        let draft = self.into_draft()?;
        Ok(UserPatch {
            username: Some(draft.username),
        })
    }
}

impl ProjectRequest {
    pub fn into_draft(self) -> Result<ProjectDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = required(
            &mut errors,
            "projectName",
            "projectname should not be blank",
            self.project_name,
        );
        let project_manager_id = match self.project_manager_id {
            Some(id) => id,
            None => {
                errors.insert(
                    "projectManagerId",
                    "projectManagerId should not be null".to_string(),
                );
                UserId::new(0)
            }
        };

        finish(
            errors,
            ProjectDraft {
                name,
                description: self.description,
                start_date: self.start_date,
                end_date: self.end_date,
                project_manager_id,
            },
        )
    }

    pub fn into_patch(self) -> ProjectPatch {
        ProjectPatch {
            name: self.project_name,
            description: self.description,
            start_date: self.start_date,
            end_date: self.end_date,
            project_manager_id: self.project_manager_id,
        }
    }
}

impl TicketRequest {
    pub fn into_draft(self) -> Result<TicketDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = required(&mut errors, "name", "name should not be blank", self.name);
        let ticket_type = required(
            &mut errors,
            "ticketType",
            "ticketType should not be blank",
            self.ticket_type,
        );
        let ticket_priority = required(
            &mut errors,
            "ticketPriority",
            "ticketPriority should not be blank",
            self.ticket_priority,
        );
        let ticket_status = required(
            &mut errors,
            "ticketStatus",
            "ticketStatus should not be blank",
            self.ticket_status,
        );

        finish(
            errors,
            TicketDraft {
                name,
                description: self.description,
                ticket_type,
                ticket_priority,
                ticket_status,
            },
        )
    }

    pub fn into_patch(self) -> TicketPatch {
        TicketPatch {
            name: self.name,
            description: self.description,
            ticket_type: self.ticket_type,
            ticket_priority: self.ticket_priority,
            ticket_status: self.ticket_status,
        }
    }
}

// -------------------------
// Response mapping
// -------------------------

pub fn company_to_json(c: &Company) -> serde_json::Value {
    serde_json::json!({
        "id": c.id,
        "name": c.name,
        "description": c.description,
    })
}

pub fn user_to_json(v: &UserView) -> serde_json::Value {
    serde_json::json!({
        "id": v.user.id,
        "username": v.user.username,
        "company": v.company_name,
        "role": v.user.role.role.as_str(),
        "apiKey": v.user.api_key.as_str(),
    })
}

pub fn project_to_json(p: &Project) -> serde_json::Value {
    serde_json::json!({
        "id": p.id,
        "projectName": p.name,
        "description": p.description,
        "startDate": p.start_date,
        "endDate": p.end_date,
        "projectManagerId": p.project_manager_id,
    })
}

pub fn ticket_to_json(t: &Ticket) -> serde_json::Value {
    serde_json::json!({
        "id": t.id,
        "name": t.name,
        "description": t.description,
        "createdAt": t.created_at,
        "updatedAt": t.updated_at,
        "projectId": t.project_id,
        "creatorId": t.creator_id,
        "ticketType": t.ticket_type,
        "ticketPriority": t.ticket_priority,
        "ticketStatus": t.ticket_status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_ticket_fields_are_all_reported() {
        let errors = TicketRequest {
            name: Some("  ".to_string()),
            ..Default::default()
        }
        .into_draft()
        .unwrap_err();

        assert_eq!(errors.len(), 4);
        assert_eq!(errors["name"], "name should not be blank");
        assert_eq!(errors["ticketType"], "ticketType should not be blank");
        assert_eq!(errors["ticketPriority"], "ticketPriority should not be blank");
        assert_eq!(errors["ticketStatus"], "ticketStatus should not be blank");
    }

    #[test]
    fn project_create_requires_name_and_manager() {
        let errors = ProjectRequest::default().into_draft().unwrap_err();
        assert_eq!(errors["projectName"], "projectname should not be blank");
        assert_eq!(errors["projectManagerId"], "projectManagerId should not be null");

        let draft = ProjectRequest {
            project_name: Some("P1".to_string()),
            project_manager_id: Some(UserId::new(3)),
            start_date: Some("01-01-2024".to_string()),
            ..Default::default()
        }
        .into_draft()
        .unwrap();
        assert_eq!(draft.name, "P1");
        assert_eq!(draft.start_date.as_deref(), Some("01-01-2024"));
    }

    #[test]
    fn project_requests_use_camel_case_fields() {
        let req: ProjectRequest = serde_json::from_value(serde_json::json!({
            "projectName": "P1",
            "projectManagerId": 4,
            "endDate": "02-02-2024"
        }))
        .unwrap();

        let patch = req.into_patch();
        assert_eq!(patch.name.as_deref(), Some("P1"));
        assert_eq!(patch.project_manager_id, Some(UserId::new(4)));
        assert_eq!(patch.end_date.as_deref(), Some("02-02-2024"));
        assert_eq!(patch.start_date, None);
    }
}
