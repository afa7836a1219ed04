//! Web order CLI commands

use clap::Subcommand;

use crate::config::Settings;
use crate::display::format_order_list;
use crate::error::{BizdeskError, BizdeskResult};
use crate::models::OrderStatus;
use crate::services::WebOrderService;
use crate::storage::Storage;

use super::{client_names, parse_money};

/// Order subcommands
#[derive(Subcommand)]
pub enum OrderCommands {
    /// Record an order placed in the web shop
    Add {
        /// Shop reference, e.g. WEB-10042
        reference: String,
        /// Client name or ID
        client: String,
        /// Order total
        total: String,
        #[arg(long)]
        ship_to: Option<String>,
    },
    /// List orders
    List {
        /// Only orders with this status
        #[arg(short, long)]
        status: Option<String>,
    },
    /// Move an order to a new status
    Move {
        /// Order reference or ID
        order: String,
        /// processing, shipped, completed or cancelled
        status: String,
        /// Carrier tracking number (when shipping)
        #[arg(short, long)]
        tracking: Option<String>,
    },
    /// Archive a completed or cancelled order
    Archive { order: String },
    /// Bring an archived order back
    Restore { order: String },
}

/// Handle an order command
pub fn handle_order_command(
    storage: &Storage,
    settings: &Settings,
    cmd: OrderCommands,
) -> BizdeskResult<()> {
    let service = WebOrderService::new(storage);

    match cmd {
        OrderCommands::Add {
            reference,
            client,
            total,
            ship_to,
        } => {
            let order = service.create(
                &reference,
                &client,
                parse_money(&total)?,
                ship_to.as_deref().unwrap_or_default(),
            )?;
            println!(
                "Recorded order {} ({}{})",
                order.reference, settings.currency_symbol, order.total
            );
        }

        OrderCommands::List { status } => {
            let status = status.as_deref().map(parse_status).transpose()?;
            let orders = service.list(status)?;
            print!(
                "{}",
                format_order_list(&orders, &client_names(storage)?, &settings.currency_symbol)
            );
        }

        OrderCommands::Move {
            order,
            status,
            tracking,
        } => {
            let moved = service.transition(&order, parse_status(&status)?, tracking)?;
            println!("Order {} is now {}", moved.reference, moved.status);
        }

        OrderCommands::Archive { order } => {
            let archived = service.delete(&order)?;
            println!("Archived order {}", archived.reference);
        }

        OrderCommands::Restore { order } => {
            let restored = service.restore(&order)?;
            println!("Restored order {}", restored.reference);
        }
    }

    Ok(())
}

fn parse_status(raw: &str) -> BizdeskResult<OrderStatus> {
    OrderStatus::parse(raw).ok_or_else(|| {
        BizdeskError::Validation(format!(
            "Invalid order status: '{}'. Valid statuses: pending, processing, shipped, completed, cancelled",
            raw
        ))
    })
}
