//! Invoice CLI commands

use clap::Subcommand;

use crate::config::Settings;
use crate::display::format_invoice_list;
use crate::error::{BizdeskError, BizdeskResult};
use crate::models::InvoiceStatus;
use crate::services::InvoiceService;
use crate::storage::Storage;

use super::client_names;
use super::quote::parse_date;

/// Invoice subcommands
#[derive(Subcommand)]
pub enum InvoiceCommands {
    /// List invoices
    List {
        /// Only invoices with this status (unpaid, paid, cancelled)
        #[arg(short, long)]
        status: Option<String>,
    },
    /// Set the payment due date
    Due {
        /// Invoice number or ID
        invoice: String,
        /// Due date (YYYY-MM-DD)
        date: String,
    },
    /// Record payment
    Pay { invoice: String },
    /// Cancel an unpaid invoice
    Cancel { invoice: String },
}

/// Handle an invoice command
pub fn handle_invoice_command(
    storage: &Storage,
    settings: &Settings,
    cmd: InvoiceCommands,
) -> BizdeskResult<()> {
    let service = InvoiceService::new(storage);

    match cmd {
        InvoiceCommands::List { status } => {
            let status = status
                .as_deref()
                .map(|raw| {
                    InvoiceStatus::parse(raw).ok_or_else(|| {
                        BizdeskError::Validation(format!(
                            "Invalid invoice status: '{}'. Valid statuses: unpaid, paid, cancelled",
                            raw
                        ))
                    })
                })
                .transpose()?;

            let invoices = service.list(status)?;
            print!(
                "{}",
                format_invoice_list(
                    &invoices,
                    &client_names(storage)?,
                    &settings.currency_symbol
                )
            );
        }

        InvoiceCommands::Due { invoice, date } => {
            let updated = service.set_due_date(&invoice, parse_date(&date)?)?;
            println!("Invoice {} is due on {}", updated.number, date);
        }

        InvoiceCommands::Pay { invoice } => {
            let paid = service.mark_paid(&invoice)?;
            println!("Invoice {} marked as paid", paid.number);
        }

        InvoiceCommands::Cancel { invoice } => {
            let cancelled = service.cancel(&invoice)?;
            println!("Invoice {} cancelled", cancelled.number);
        }
    }

    Ok(())
}
