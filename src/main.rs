use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use bizdesk::auth::{Principal, SessionActor};
use bizdesk::cli::{
    handle_activity_command, handle_client_command, handle_invoice_command,
    handle_order_command, handle_product_command, handle_quote_command, handle_ticket_command,
    handle_user_command,
};
use bizdesk::config::{AuditFailurePolicy, BizdeskPaths, Locale, Settings};
use bizdesk::logging::init_logging;
use bizdesk::services::UserService;
use bizdesk::storage::Storage;

#[derive(Parser)]
#[command(
    name = "bizdesk",
    version,
    about = "Back-office CLI for clients, quotes, orders and support",
    long_about = "bizdesk keeps clients, products, quotes, invoices, web orders and \
                  support tickets in local JSON files, and records every change in an \
                  append-only audit trail."
)]
struct Cli {
    /// Act as this user (email); changes are attributed to them
    #[arg(long = "as", global = true, value_name = "EMAIL")]
    acting_as: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory
    Init,

    /// Show or change configuration
    Config {
        /// Language of audit descriptions (en, fr)
        #[arg(long)]
        locale: Option<String>,
        /// What to do when an audit write fails (propagate, warn)
        #[arg(long)]
        audit_policy: Option<String>,
        /// Default log filter, e.g. "info" or "bizdesk=debug"
        #[arg(long)]
        log_level: Option<String>,
        /// Symbol printed before amounts
        #[arg(long)]
        currency: Option<String>,
    },

    #[command(flatten)]
    Data(DataCommands),
}

/// Commands that work on the stored records
#[derive(Subcommand)]
enum DataCommands {
    /// Back-office user management
    #[command(subcommand)]
    User(bizdesk::cli::UserCommands),

    /// Client management
    #[command(subcommand)]
    Client(bizdesk::cli::ClientCommands),

    /// Product catalog
    #[command(subcommand)]
    Product(bizdesk::cli::ProductCommands),

    /// Quotes and their conversion to invoices
    #[command(subcommand)]
    Quote(bizdesk::cli::QuoteCommands),

    /// Invoices
    #[command(subcommand)]
    Invoice(bizdesk::cli::InvoiceCommands),

    /// Web shop orders
    #[command(subcommand)]
    Order(bizdesk::cli::OrderCommands),

    /// Support tickets
    #[command(subcommand)]
    Ticket(bizdesk::cli::TicketCommands),

    /// Audit trail
    #[command(subcommand, alias = "log")]
    Activity(bizdesk::cli::ActivityCommands),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = BizdeskPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;
    init_logging(&settings.log_level)?;

    let command = match cli.command {
        Some(command) => command,
        None => {
            println!("bizdesk - back-office records with an audit trail");
            println!();
            println!("Run 'bizdesk --help' for usage information.");
            println!("Run 'bizdesk init' to set up a new data directory.");
            return Ok(());
        }
    };

    let command = match command {
        Commands::Init => {
            println!("Initializing bizdesk at: {}", paths.base_dir().display());
            paths.ensure_directories()?;
            settings.save(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Next steps:");
            println!("  bizdesk user add <name> <email>");
            println!("  bizdesk --as <email> client add <company> <email>");
            return Ok(());
        }
        Commands::Config {
            locale,
            audit_policy,
            log_level,
            currency,
        } => {
            return handle_config(&paths, &mut settings, locale, audit_policy, log_level, currency);
        }
        Commands::Data(command) => command,
    };

    if !paths.is_initialized() {
        bail!("bizdesk is not initialized here. Run 'bizdesk init' first.");
    }

    let actor = Arc::new(SessionActor::new());
    let storage = Storage::open(paths, &settings, actor.clone())
        .context("Failed to open the data directory")?;

    if let Some(email) = cli.acting_as {
        match UserService::new(&storage).find_by_email(&email)? {
            Some(user) if user.deleted_at.is_none() => {
                tracing::debug!(user = %user.id, "acting as stored user");
                actor.sign_in(Principal::user(&user));
            }
            _ => {
                tracing::warn!(email = %email, "unknown user; changes will be unattributed");
                actor.sign_in(Principal::Unpersisted(email));
            }
        }
    }

    match command {
        DataCommands::User(cmd) => handle_user_command(&storage, cmd)?,
        DataCommands::Client(cmd) => handle_client_command(&storage, cmd)?,
        DataCommands::Product(cmd) => handle_product_command(&storage, &settings, cmd)?,
        DataCommands::Quote(cmd) => handle_quote_command(&storage, &settings, cmd)?,
        DataCommands::Invoice(cmd) => handle_invoice_command(&storage, &settings, cmd)?,
        DataCommands::Order(cmd) => handle_order_command(&storage, &settings, cmd)?,
        DataCommands::Ticket(cmd) => handle_ticket_command(&storage, cmd)?,
        DataCommands::Activity(cmd) => handle_activity_command(&storage, cmd)?,
    }

    Ok(())
}

fn handle_config(
    paths: &BizdeskPaths,
    settings: &mut Settings,
    locale: Option<String>,
    audit_policy: Option<String>,
    log_level: Option<String>,
    currency: Option<String>,
) -> Result<()> {
    let changing =
        locale.is_some() || audit_policy.is_some() || log_level.is_some() || currency.is_some();

    if let Some(locale) = locale {
        settings.locale = Locale::parse(&locale)
            .with_context(|| format!("Unknown locale '{}'. Use en or fr", locale))?;
    }
    if let Some(policy) = audit_policy {
        settings.audit.failure_policy = AuditFailurePolicy::parse(&policy)
            .with_context(|| format!("Unknown audit policy '{}'. Use propagate or warn", policy))?;
    }
    if let Some(level) = log_level {
        bizdesk::logging::build_filter(&level)?;
        settings.log_level = level;
    }
    if let Some(currency) = currency {
        settings.currency_symbol = currency;
    }

    if changing {
        settings.save(paths)?;
        println!("Configuration saved.");
        println!();
    }

    println!("bizdesk Configuration");
    println!("=====================");
    println!("Base directory:  {}", paths.base_dir().display());
    println!("Data directory:  {}", paths.data_dir().display());
    println!("Activity log:    {}", paths.activity_log().display());
    println!();
    println!("Settings:");
    println!("  Locale:               {:?}", settings.locale);
    println!("  Audit failure policy: {:?}", settings.audit.failure_policy);
    println!("  Log level:            {}", settings.log_level);
    println!("  Currency symbol:      {}", settings.currency_symbol);
    println!(
        "  Document prefixes:    quotes {}, invoices {}",
        settings.quote_prefix, settings.invoice_prefix
    );

    Ok(())
}
