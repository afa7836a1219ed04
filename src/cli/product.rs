//! Product catalog CLI commands

use clap::Subcommand;

use crate::config::Settings;
use crate::display::format_product_list;
use crate::error::BizdeskResult;
use crate::services::{ProductChanges, ProductService};
use crate::storage::Storage;

use super::parse_money;

/// Product subcommands
#[derive(Subcommand)]
pub enum ProductCommands {
    /// Add a product to the catalog
    Add {
        /// Stock keeping unit (stored uppercase)
        sku: String,
        name: String,
        /// Unit price (e.g., "49.90")
        price: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// List products
    List {
        /// Include deleted products
        #[arg(short, long)]
        all: bool,
    },
    /// Edit a product
    Edit {
        /// SKU, name or ID
        product: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Withdraw the product from sale
        #[arg(long, conflicts_with = "activate")]
        deactivate: bool,
        /// Put the product back on sale
        #[arg(long)]
        activate: bool,
    },
    /// Soft-delete a product
    Delete {
        /// SKU, name or ID
        product: String,
    },
    /// Restore a deleted product
    Restore {
        /// SKU, name or ID
        product: String,
    },
}

/// Handle a product command
pub fn handle_product_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ProductCommands,
) -> BizdeskResult<()> {
    let service = ProductService::new(storage);

    match cmd {
        ProductCommands::Add {
            sku,
            name,
            price,
            description,
        } => {
            let product = service.create(&sku, &name, parse_money(&price)?)?;
            let product = match description {
                Some(description) => service.update(
                    &product.sku,
                    ProductChanges {
                        description: Some(description),
                        ..Default::default()
                    },
                )?,
                None => product,
            };

            println!("Created product: {} ({})", product.name, product.sku);
            println!(
                "  Price: {}{}",
                settings.currency_symbol, product.unit_price
            );
        }

        ProductCommands::List { all } => {
            let products = service.list(all)?;
            print!("{}", format_product_list(&products, &settings.currency_symbol));
        }

        ProductCommands::Edit {
            product,
            name,
            price,
            description,
            deactivate,
            activate,
        } => {
            let unit_price = price.as_deref().map(parse_money).transpose()?;
            let active = match (activate, deactivate) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            let changes = ProductChanges {
                name,
                description,
                unit_price,
                active,
            };
            if changes.is_empty() {
                println!("No changes specified. Use --name, --price, --description, etc.");
                return Ok(());
            }

            let updated = service.update(&product, changes)?;
            println!("Updated product: {} ({})", updated.name, updated.sku);
        }

        ProductCommands::Delete { product } => {
            let deleted = service.delete(&product)?;
            println!("Deleted product: {}", deleted.sku);
        }

        ProductCommands::Restore { product } => {
            let restored = service.restore(&product)?;
            println!("Restored product: {}", restored.sku);
        }
    }

    Ok(())
}
