//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod activity;
pub mod client;
pub mod invoice;
pub mod order;
pub mod product;
pub mod quote;
pub mod ticket;
pub mod user;

pub use activity::{handle_activity_command, ActivityCommands, ExportFormat};
pub use client::{handle_client_command, ClientCommands};
pub use invoice::{handle_invoice_command, InvoiceCommands};
pub use order::{handle_order_command, OrderCommands};
pub use product::{handle_product_command, ProductCommands};
pub use quote::{handle_quote_command, QuoteCommands};
pub use ticket::{handle_ticket_command, TicketCommands};
pub use user::{handle_user_command, UserCommands};

use std::collections::HashMap;

use crate::error::{BizdeskError, BizdeskResult};
use crate::models::{Money, Entity};
use crate::storage::Storage;

/// Parse a user-typed amount such as "12.50"
pub(crate) fn parse_money(raw: &str) -> BizdeskResult<Money> {
    Money::parse(raw).map_err(|e| {
        BizdeskError::Validation(format!(
            "{}. Use a format like '1000.00' or '1000'",
            e
        ))
    })
}

/// Company names of every client, including deleted ones
pub(crate) fn client_names(
    storage: &Storage,
) -> BizdeskResult<HashMap<crate::models::ClientId, String>> {
    Ok(storage
        .clients
        .get_all()?
        .into_iter()
        .map(|c| (c.id(), c.company))
        .collect())
}
