//! Audit trail CLI commands
//!
//! Browse, inspect and export the activity log.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};
use uuid::Uuid;

use crate::display::{format_activity_details, format_activity_list};
use crate::error::{BizdeskError, BizdeskResult};
use crate::events::LifecycleEvent;
use crate::export::{export_activity_csv, export_activity_json, export_activity_yaml};
use crate::models::{Entity, EntityKind};
use crate::services::{ProductService, UserService};
use crate::storage::{ActivityQuery, Storage};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// JSON document with metadata
    Json,
    /// YAML document with a commented header
    Yaml,
    /// One row per record
    Csv,
}

impl ExportFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

/// Filters shared by `list` and `export`
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ActivityFilter {
    /// Only this log (e.g. client, web_order)
    #[arg(short, long)]
    pub log: Option<String>,
    /// Only records about this entity (UUID, or a name/ID together with --log)
    #[arg(short, long)]
    pub subject: Option<String>,
    /// Only records caused by this user (email or ID)
    #[arg(short, long)]
    pub causer: Option<String>,
    /// Only this event (created, updated, deleted, restored)
    #[arg(short, long)]
    pub event: Option<String>,
}

/// Activity subcommands
#[derive(Subcommand)]
pub enum ActivityCommands {
    /// List recorded activity, oldest first
    List {
        #[command(flatten)]
        filter: ActivityFilter,
        /// Show only the most recent N records
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
    /// Show one record with all changed fields
    Show {
        /// Activity ID
        id: String,
    },
    /// Export the audit trail to a file
    Export {
        /// Output file path
        output: PathBuf,
        /// Export format; guessed from the extension when omitted
        #[arg(short, long, value_enum)]
        format: Option<ExportFormat>,
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
        #[command(flatten)]
        filter: ActivityFilter,
    },
}

/// Handle an activity command
pub fn handle_activity_command(storage: &Storage, cmd: ActivityCommands) -> BizdeskResult<()> {
    match cmd {
        ActivityCommands::List { filter, limit } => {
            let query = build_query(storage, &filter)?.limit(limit);
            let records = storage.activity.query(&query)?;
            print!("{}", format_activity_list(&records));
        }

        ActivityCommands::Show { id } => {
            let record = storage.activity.resolve(&id)?;
            print!("{}", format_activity_details(&record));
        }

        ActivityCommands::Export {
            output,
            format,
            pretty,
            filter,
        } => {
            let format = format
                .or_else(|| ExportFormat::from_path(&output))
                .unwrap_or(ExportFormat::Json);
            let query = build_query(storage, &filter)?;

            let file = File::create(&output).map_err(|e| {
                BizdeskError::Export(format!("Failed to create {}: {}", output.display(), e))
            })?;
            let mut writer = BufWriter::new(file);

            match format {
                ExportFormat::Json => export_activity_json(storage, &query, &mut writer, pretty)?,
                ExportFormat::Yaml => export_activity_yaml(storage, &query, &mut writer)?,
                ExportFormat::Csv => export_activity_csv(storage, &query, &mut writer)?,
            }
            writer.flush()?;

            let count = storage.activity.query(&query)?.len();
            println!(
                "Exported {} activity record(s) to {}",
                count,
                output.display()
            );
        }
    }

    Ok(())
}

/// Turn CLI filters into a query, resolving names to keys
pub fn build_query(storage: &Storage, filter: &ActivityFilter) -> BizdeskResult<ActivityQuery> {
    let mut query = ActivityQuery::new();

    let kind = match &filter.log {
        Some(log) => {
            let kind = EntityKind::parse(log).ok_or_else(|| {
                BizdeskError::Validation(format!("Unknown log name: '{}'", log))
            })?;
            query = query.log_name(kind.log_name());
            Some(kind)
        }
        None => None,
    };

    if let Some(subject) = &filter.subject {
        query = query.subject(resolve_subject(storage, kind, subject)?);
    }

    if let Some(causer) = &filter.causer {
        query = query.causer(UserService::new(storage).find(causer)?.key());
    }

    if let Some(event) = &filter.event {
        let event = LifecycleEvent::from_token(&event.trim().to_lowercase()).ok_or_else(|| {
            BizdeskError::Validation(format!(
                "Unknown event: '{}'. Valid events: created, updated, deleted, restored",
                event
            ))
        })?;
        query = query.event(event);
    }

    Ok(query)
}

fn resolve_subject(
    storage: &Storage,
    kind: Option<EntityKind>,
    reference: &str,
) -> BizdeskResult<Uuid> {
    if let Ok(key) = Uuid::parse_str(reference.trim()) {
        return Ok(key);
    }

    let kind = kind.ok_or_else(|| {
        BizdeskError::Validation(
            "Give --log with --subject, or pass the subject's full UUID".into(),
        )
    })?;

    match kind {
        EntityKind::User => UserService::new(storage).find(reference).map(|e| e.key()),
        EntityKind::Client => storage.clients.resolve(reference).map(|e| e.key()),
        EntityKind::Product => ProductService::new(storage).find(reference).map(|e| e.key()),
        EntityKind::Quote => storage.quotes.resolve(reference).map(|e| e.key()),
        EntityKind::Invoice => storage.invoices.resolve(reference).map(|e| e.key()),
        EntityKind::WebOrder => storage.web_orders.resolve(reference).map(|e| e.key()),
        EntityKind::Ticket => storage.tickets.resolve(reference).map(|e| e.key()),
        EntityKind::Activity => Err(BizdeskError::Validation(
            "Activity records are never the subject of other records".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::NoActor;
    use crate::config::{BizdeskPaths, Settings};
    use crate::models::Client;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = BizdeskPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths, &Settings::default(), Arc::new(NoActor)).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ExportFormat::from_path(Path::new("trail.YML")),
            Some(ExportFormat::Yaml)
        );
        assert_eq!(ExportFormat::from_path(Path::new("trail")), None);
    }

    #[test]
    fn test_build_query_resolves_subject_by_name() {
        let (_temp, storage) = create_test_storage();
        let client = storage.create(Client::new("Acme", "a@x.com")).unwrap();

        let filter = ActivityFilter {
            log: Some("Client".into()),
            subject: Some("acme".into()),
            event: Some("Created".into()),
            ..Default::default()
        };
        let query = build_query(&storage, &filter).unwrap();

        assert_eq!(query.log_name.as_deref(), Some("client"));
        assert_eq!(query.subject, Some(client.key()));
        assert_eq!(query.event, Some(LifecycleEvent::Created));
    }

    #[test]
    fn test_build_query_rejects_bad_filters() {
        let (_temp, storage) = create_test_storage();

        let unknown_log = ActivityFilter {
            log: Some("widget".into()),
            ..Default::default()
        };
        assert!(build_query(&storage, &unknown_log).unwrap_err().is_validation());

        let bare_subject = ActivityFilter {
            subject: Some("acme".into()),
            ..Default::default()
        };
        assert!(build_query(&storage, &bare_subject).unwrap_err().is_validation());

        let bad_event = ActivityFilter {
            event: Some("saved".into()),
            ..Default::default()
        };
        assert!(build_query(&storage, &bad_event).unwrap_err().is_validation());
    }
}
