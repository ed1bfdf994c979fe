use std::sync::Arc;

use tracing::{info, instrument};

use tracker_auth::{Action, Principal};
use tracker_core::{Clock, CompanyId, DomainError, DomainResult, ProjectId, TicketId};

use crate::model::{NewTicket, Ticket, TicketDraft, TicketPatch};
use crate::ports::Store;
use crate::reference::{resolve, ReferenceValue};

use super::{check, is_blank, load_company, load_project};

pub struct TicketService<S: ?Sized> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S: ?Sized> Clone for TicketService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            clock: self.clock.clone(),
        }
    }
}

impl<S: Store + ?Sized> TicketService<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn list(
        &self,
        company_id: CompanyId,
        project_id: ProjectId,
    ) -> DomainResult<Vec<Ticket>> {
        load_company(&*self.store, company_id).await?;
        let project = load_project(&*self.store, company_id, project_id).await?;
        Ok(self.store.tickets_in_project(project.id).await?)
    }

    pub async fn get(
        &self,
        company_id: CompanyId,
        project_id: ProjectId,
        ticket_id: TicketId,
    ) -> DomainResult<Ticket> {
        load_company(&*self.store, company_id).await?;
        let project = load_project(&*self.store, company_id, project_id).await?;
        self.load_ticket(project.id, ticket_id).await
    }

    /// Open a ticket in a project the caller is a member of.
    #[instrument(skip(self, caller, draft), fields(caller = %caller.user_id), err)]
    pub async fn create(
        &self,
        caller: &Principal,
        company_id: CompanyId,
        project_id: ProjectId,
        draft: TicketDraft,
    ) -> DomainResult<Ticket> {
        load_company(&*self.store, company_id).await?;
        let project = load_project(&*self.store, company_id, project_id).await?;

        let caller_is_member = self.store.is_member(project.id, caller.user_id).await?;
        check(caller, Action::CreateTicket { caller_is_member })?;

        if is_blank(&draft.name) {
            return Err(DomainError::not_allowed("name", &draft.name));
        }

        if self.store.ticket_by_name(project.id, &draft.name).await?.is_some() {
            return Err(DomainError::already_exists("name", &draft.name));
        }

        let ticket = self
            .store
            .insert_ticket(NewTicket {
                name: draft.name,
                description: draft.description,
                created_at: self.clock.today(),
                project_id: project.id,
                creator_id: caller.user_id,
                ticket_type: self.resolve(&draft.ticket_type).await?,
                ticket_priority: self.resolve(&draft.ticket_priority).await?,
                ticket_status: self.resolve(&draft.ticket_status).await?,
            })
            .await?;

        info!(ticket_id = %ticket.id, project_id = %project.id, "ticket created");
        Ok(ticket)
    }

    /// Partial update by the ticket's creator or the project manager.
    ///
    /// A supplied name is rejected when any ticket of the project carries it,
    /// the ticket being updated included. Resending the current name fails.
    #[instrument(skip(self, caller, patch), fields(caller = %caller.user_id), err)]
    pub async fn update(
        &self,
        caller: &Principal,
        company_id: CompanyId,
        project_id: ProjectId,
        ticket_id: TicketId,
        patch: TicketPatch,
    ) -> DomainResult<Ticket> {
        load_company(&*self.store, company_id).await?;
        let project = load_project(&*self.store, company_id, project_id).await?;
        let mut ticket = self.load_ticket(project.id, ticket_id).await?;

        check(
            caller,
            Action::UpdateTicket {
                creator_id: ticket.creator_id,
                project_manager_id: project.project_manager_id,
            },
        )?;

        if let Some(name) = &patch.name {
            if is_blank(name) {
                return Err(DomainError::not_allowed("name", name));
            }
            // TODO: exclude the ticket itself once clients stop relying on the self-duplicate rejection.
            if self.store.ticket_by_name(project.id, name).await?.is_some() {
                return Err(DomainError::already_exists("name", name));
            }
        }

        if let Some(raw) = &patch.ticket_type {
            ticket.ticket_type = self.resolve(raw).await?;
        }
        if let Some(raw) = &patch.ticket_priority {
            ticket.ticket_priority = self.resolve(raw).await?;
        }
        if let Some(raw) = &patch.ticket_status {
            ticket.ticket_status = self.resolve(raw).await?;
        }
        if let Some(name) = patch.name {
            ticket.name = name;
        }
        if let Some(description) = patch.description {
            ticket.description = Some(description);
        }
        ticket.updated_at = Some(self.clock.today());

        let ticket = self.store.update_ticket(&ticket).await?;
        info!(ticket_id = %ticket.id, "ticket updated");
        Ok(ticket)
    }

    /// Only the project manager deletes tickets.
    #[instrument(skip(self, caller), fields(caller = %caller.user_id), err)]
    pub async fn delete(
        &self,
        caller: &Principal,
        company_id: CompanyId,
        project_id: ProjectId,
        ticket_id: TicketId,
    ) -> DomainResult<()> {
        load_company(&*self.store, company_id).await?;
        let project = load_project(&*self.store, company_id, project_id).await?;
        let ticket = self.load_ticket(project.id, ticket_id).await?;

        check(
            caller,
            Action::DeleteTicket {
                project_manager_id: project.project_manager_id,
            },
        )?;

        self.store.delete_ticket(ticket.id).await?;
        info!(ticket_id = %ticket.id, "ticket deleted");
        Ok(())
    }

    async fn load_ticket(&self, project_id: ProjectId, ticket_id: TicketId) -> DomainResult<Ticket> {
        self.store
            .ticket_in_project(ticket_id, project_id)
            .await?
            .ok_or_else(|| DomainError::not_found("ticketId", ticket_id))
    }

    async fn resolve<R: ReferenceValue>(&self, raw: &str) -> DomainResult<R> {
        let persisted = self.store.reference_literals(R::TABLE).await?;
        resolve(raw, &persisted)
    }
}
