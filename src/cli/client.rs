//! Client CLI commands

use clap::Subcommand;

use crate::display::{format_client_details, format_client_list};
use crate::error::BizdeskResult;
use crate::services::{ClientChanges, ClientService};
use crate::storage::Storage;

/// Client subcommands
#[derive(Subcommand)]
pub enum ClientCommands {
    /// Add a new client
    Add {
        /// Company or display name
        company: String,
        /// Billing email address
        email: String,
        /// Contact person
        #[arg(short, long)]
        contact: Option<String>,
        #[arg(short, long)]
        phone: Option<String>,
        #[arg(short, long)]
        address: Option<String>,
    },
    /// List clients
    List {
        /// Include deleted clients
        #[arg(short, long)]
        all: bool,
    },
    /// Show client details
    Show {
        /// Client name or ID
        client: String,
    },
    /// Edit a client
    Edit {
        /// Client name or ID
        client: String,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        contact: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// New phone number (empty string clears it)
        #[arg(long)]
        phone: Option<String>,
        /// New address (empty string clears it)
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Soft-delete a client
    Delete {
        /// Client name or ID
        client: String,
    },
    /// Restore a deleted client
    Restore {
        /// Client name or ID
        client: String,
    },
    /// Permanently remove a client without documents
    Purge {
        /// Client name or ID
        client: String,
    },
}

/// Handle a client command
pub fn handle_client_command(storage: &Storage, cmd: ClientCommands) -> BizdeskResult<()> {
    let service = ClientService::new(storage);

    match cmd {
        ClientCommands::Add {
            company,
            email,
            contact,
            phone,
            address,
        } => {
            let client = service.create(&company, &email)?;

            let changes = ClientChanges {
                contact_name: contact,
                phone,
                address,
                ..Default::default()
            };
            let client = if changes.is_empty() {
                client
            } else {
                service.update(&client.id.to_string(), changes)?
            };

            println!("Created client: {}", client.company);
            println!("  Email: {}", client.email);
            println!("  ID: {}", client.id);
        }

        ClientCommands::List { all } => {
            let clients = service.list(all)?;
            print!("{}", format_client_list(&clients));
        }

        ClientCommands::Show { client } => {
            let found = service.find(&client)?;
            print!("{}", format_client_details(&found));
        }

        ClientCommands::Edit {
            client,
            company,
            contact,
            email,
            phone,
            address,
            notes,
        } => {
            let changes = ClientChanges {
                company,
                contact_name: contact,
                email,
                phone,
                address,
                notes,
            };
            if changes.is_empty() {
                println!("No changes specified. Use --company, --email, --phone, etc.");
                return Ok(());
            }

            let updated = service.update(&client, changes)?;
            println!("Updated client: {}", updated.company);
        }

        ClientCommands::Delete { client } => {
            let deleted = service.delete(&client)?;
            println!("Deleted client: {}", deleted.company);
        }

        ClientCommands::Restore { client } => {
            let restored = service.restore(&client)?;
            println!("Restored client: {}", restored.company);
        }

        ClientCommands::Purge { client } => {
            let purged = service.purge(&client)?;
            println!("Permanently removed client: {}", purged.company);
        }
    }

    Ok(())
}
