//! Support ticket CLI commands

use clap::Subcommand;

use crate::display::format_ticket_list;
use crate::error::{BizdeskError, BizdeskResult};
use crate::models::{Entity, TicketPriority};
use crate::services::{ClientService, TicketService};
use crate::storage::Storage;

use super::client_names;

/// Ticket subcommands
#[derive(Subcommand)]
pub enum TicketCommands {
    /// Open a ticket for a client
    Open {
        /// Client name or ID
        client: String,
        subject: String,
        #[arg(short, long, default_value = "")]
        body: String,
        /// low, normal or high
        #[arg(short, long, default_value = "normal")]
        priority: String,
    },
    /// List tickets
    List {
        /// Only tickets of this client
        #[arg(short, long)]
        client: Option<String>,
        /// Hide closed tickets
        #[arg(long)]
        open: bool,
    },
    /// Count a reply on a ticket
    Reply { ticket: String },
    /// Close a ticket
    Close { ticket: String },
    /// Reopen a closed ticket
    Reopen { ticket: String },
    /// Change a ticket's priority
    Priority { ticket: String, priority: String },
    /// Soft-delete a ticket
    Delete { ticket: String },
}

/// Handle a ticket command
pub fn handle_ticket_command(storage: &Storage, cmd: TicketCommands) -> BizdeskResult<()> {
    let service = TicketService::new(storage);

    match cmd {
        TicketCommands::Open {
            client,
            subject,
            body,
            priority,
        } => {
            let ticket = service.open(&client, &subject, &body, parse_priority(&priority)?)?;
            println!("Opened ticket {}: {}", ticket.id, ticket.subject);
        }

        TicketCommands::List { client, open } => {
            let client_id = match client {
                Some(reference) => Some(ClientService::new(storage).find(&reference)?.id()),
                None => None,
            };
            let tickets = service.list(client_id, open)?;
            print!("{}", format_ticket_list(&tickets, &client_names(storage)?));
        }

        TicketCommands::Reply { ticket } => {
            let updated = service.reply(&ticket)?;
            println!("Ticket {} now has {} replies", updated.id, updated.replies);
        }

        TicketCommands::Close { ticket } => {
            let closed = service.close(&ticket)?;
            println!("Closed ticket {}", closed.id);
        }

        TicketCommands::Reopen { ticket } => {
            let reopened = service.reopen(&ticket)?;
            println!("Reopened ticket {}", reopened.id);
        }

        TicketCommands::Priority { ticket, priority } => {
            let updated = service.set_priority(&ticket, parse_priority(&priority)?)?;
            println!("Ticket {} priority set to {}", updated.id, updated.priority);
        }

        TicketCommands::Delete { ticket } => {
            let deleted = service.delete(&ticket)?;
            println!("Deleted ticket {}", deleted.id);
        }
    }

    Ok(())
}

fn parse_priority(raw: &str) -> BizdeskResult<TicketPriority> {
    TicketPriority::parse(raw).ok_or_else(|| {
        BizdeskError::Validation(format!(
            "Invalid priority: '{}'. Valid priorities: low, normal, high",
            raw
        ))
    })
}
