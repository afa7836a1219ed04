//! Quote CLI commands

use chrono::NaiveDate;
use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_quote_details, format_quote_list};
use crate::error::{BizdeskError, BizdeskResult};
use crate::models::{DocumentLine, Entity, QuoteStatus};
use crate::services::{ClientService, ProductService, QuoteService};
use crate::storage::Storage;

use super::{client_names, parse_money};

/// Quote subcommands
#[derive(Subcommand)]
pub enum QuoteCommands {
    /// Draft a quote for a client
    Create {
        /// Client name or ID
        client: String,
        /// Last day the offer is valid (YYYY-MM-DD)
        #[arg(long)]
        valid_until: Option<String>,
    },
    /// Add a line to a draft or sent quote
    AddLine {
        /// Quote number or ID
        quote: String,
        /// Line description; defaults to the product name with --product
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long, default_value = "1")]
        quantity: u32,
        /// Unit price; defaults to the product price with --product
        #[arg(short, long)]
        price: Option<String>,
        /// Catalog product SKU or name
        #[arg(long)]
        product: Option<String>,
    },
    /// List quotes
    List {
        /// Only quotes with this status
        #[arg(short, long)]
        status: Option<String>,
    },
    /// Show a quote with its lines
    Show {
        /// Quote number or ID
        quote: String,
    },
    /// Mark a quote as sent to the client
    Send { quote: String },
    /// Record the client's acceptance
    Accept { quote: String },
    /// Record the client's refusal
    Reject { quote: String },
    /// Convert an accepted quote into an invoice
    Convert { quote: String },
    /// Withdraw a quote that was never invoiced
    Delete { quote: String },
}

/// Handle a quote command
pub fn handle_quote_command(
    storage: &Storage,
    settings: &Settings,
    cmd: QuoteCommands,
) -> BizdeskResult<()> {
    let service = QuoteService::new(storage, settings);
    let currency = settings.currency_symbol.as_str();

    match cmd {
        QuoteCommands::Create {
            client,
            valid_until,
        } => {
            let client = ClientService::new(storage).find(&client)?;
            let valid_until = valid_until.as_deref().map(parse_date).transpose()?;

            let quote = service.create(client.id(), Vec::new(), valid_until)?;
            println!("Created quote {} for {}", quote.number, client.company);
        }

        QuoteCommands::AddLine {
            quote,
            description,
            quantity,
            price,
            product,
        } => {
            let line = match product {
                Some(reference) => {
                    let product = ProductService::new(storage).find(&reference)?;
                    let unit_price = match price {
                        Some(price) => parse_money(&price)?,
                        None => product.unit_price,
                    };
                    let mut line = DocumentLine::new(
                        description.unwrap_or_else(|| product.name.clone()),
                        quantity,
                        unit_price,
                    );
                    line.product_id = Some(product.id());
                    line
                }
                None => {
                    let description = description.ok_or_else(|| {
                        BizdeskError::Validation(
                            "A line needs --description unless --product is given".into(),
                        )
                    })?;
                    let price = price.ok_or_else(|| {
                        BizdeskError::Validation(
                            "A line needs --price unless --product is given".into(),
                        )
                    })?;
                    DocumentLine::new(description, quantity, parse_money(&price)?)
                }
            };

            let updated = service.add_line(&quote, line)?;
            println!(
                "Added line to {}; total is now {}{}",
                updated.number, currency, updated.total
            );
        }

        QuoteCommands::List { status } => {
            let status = status.as_deref().map(parse_status).transpose()?;
            let quotes = service.list(status)?;
            print!(
                "{}",
                format_quote_list(&quotes, &client_names(storage)?, currency)
            );
        }

        QuoteCommands::Show { quote } => {
            let found = service.find(&quote)?;
            let client = storage
                .clients
                .get(*found.client_id.as_uuid())?
                .map(|c| c.company)
                .unwrap_or_else(|| found.client_id.to_string());
            print!("{}", format_quote_details(&found, &client, currency));
        }

        QuoteCommands::Send { quote } => {
            let sent = service.send(&quote)?;
            println!("Quote {} marked as sent", sent.number);
        }

        QuoteCommands::Accept { quote } => {
            let accepted = service.accept(&quote)?;
            println!("Quote {} accepted", accepted.number);
        }

        QuoteCommands::Reject { quote } => {
            let rejected = service.reject(&quote)?;
            println!("Quote {} rejected", rejected.number);
        }

        QuoteCommands::Convert { quote } => {
            let invoice = service.convert(&quote)?;
            println!(
                "Issued invoice {} for {}{}",
                invoice.number, currency, invoice.total
            );
        }

        QuoteCommands::Delete { quote } => {
            let deleted = service.delete(&quote)?;
            println!("Quote {} withdrawn", deleted.number);
        }
    }

    Ok(())
}

pub(crate) fn parse_date(raw: &str) -> BizdeskResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        BizdeskError::Validation(format!("Invalid date '{}'. Use YYYY-MM-DD", raw))
    })
}

fn parse_status(raw: &str) -> BizdeskResult<QuoteStatus> {
    QuoteStatus::parse(raw).ok_or_else(|| {
        BizdeskError::Validation(format!(
            "Invalid quote status: '{}'. Valid statuses: draft, sent, accepted, rejected, converted",
            raw
        ))
    })
}
