//! Support ticket service

use crate::error::{BizdeskError, BizdeskResult};
use crate::models::{ClientId, Entity, Ticket, TicketPriority, TicketStatus};
use crate::storage::Storage;

pub struct TicketService<'a> {
    storage: &'a Storage,
}

impl<'a> TicketService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Open a ticket for a client
    pub fn open(
        &self,
        client_reference: &str,
        subject: &str,
        body: &str,
        priority: TicketPriority,
    ) -> BizdeskResult<Ticket> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(BizdeskError::Validation("Ticket subject cannot be empty".into()));
        }

        let client = self.storage.clients.resolve(client_reference)?;
        if client.is_trashed() {
            return Err(BizdeskError::Validation(format!(
                "Client '{}' is deleted",
                client.company
            )));
        }

        let mut ticket = Ticket::new(client.id, subject, self.storage.acting_user());
        ticket.body = body.trim().to_string();
        ticket.priority = priority;
        self.storage.create(ticket)
    }

    /// Count a staff reply on an open ticket
    pub fn reply(&self, reference: &str) -> BizdeskResult<Ticket> {
        let mut ticket = self.find(reference)?;
        if !ticket.is_open() {
            return Err(BizdeskError::Validation(format!(
                "Ticket '{}' is closed; reopen it to reply",
                ticket.subject
            )));
        }
        ticket.replies += 1;
        self.storage.update(ticket)
    }

    pub fn close(&self, reference: &str) -> BizdeskResult<Ticket> {
        self.set_status(reference, TicketStatus::Closed)
    }

    pub fn reopen(&self, reference: &str) -> BizdeskResult<Ticket> {
        self.set_status(reference, TicketStatus::Open)
    }

    pub fn set_priority(&self, reference: &str, priority: TicketPriority) -> BizdeskResult<Ticket> {
        let mut ticket = self.find(reference)?;
        ticket.priority = priority;
        self.storage.update(ticket)
    }

    pub fn find(&self, reference: &str) -> BizdeskResult<Ticket> {
        self.storage.tickets.resolve(reference)
    }

    /// Active tickets, optionally only the open ones of one client
    pub fn list(&self, client_id: Option<ClientId>, open_only: bool) -> BizdeskResult<Vec<Ticket>> {
        self.storage.tickets.filter(|t| {
            !t.is_trashed()
                && client_id.map_or(true, |id| t.client_id == id)
                && (!open_only || t.is_open())
        })
    }

    pub fn delete(&self, reference: &str) -> BizdeskResult<Ticket> {
        let ticket = self.find(reference)?;
        self.storage.delete::<Ticket>(ticket.key())
    }

    fn set_status(&self, reference: &str, status: TicketStatus) -> BizdeskResult<Ticket> {
        let mut ticket = self.find(reference)?;
        if ticket.status == status {
            return Err(BizdeskError::Validation(format!(
                "Ticket '{}' is already {}",
                ticket.subject, status
            )));
        }
        ticket.status = status;
        self.storage.update(ticket)
    }
}
