//! JSON export of the audit trail
//!
//! The document carries a schema version so that an export can be read back
//! and checked before it is trusted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::Write;

use crate::audit::AuditRecord;
use crate::error::{BizdeskError, BizdeskResult};
use crate::storage::{ActivityQuery, Storage};

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Exported slice of the activity log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: String,

    pub metadata: ExportMetadata,

    /// Records in chronological order
    pub records: Vec<AuditRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub record_count: usize,

    /// Distinct log names present in the export
    pub log_names: Vec<String>,

    /// Filter the export was taken with, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_name_filter: Option<String>,

    pub earliest: Option<DateTime<Utc>>,

    pub latest: Option<DateTime<Utc>>,
}

impl ActivityExport {
    /// Collect the records matching `query`
    pub fn from_storage(storage: &Storage, query: &ActivityQuery) -> BizdeskResult<Self> {
        let records = storage.activity.query(query)?;

        let log_names: BTreeSet<_> = records.iter().map(|r| r.log_name.clone()).collect();
        let metadata = ExportMetadata {
            record_count: records.len(),
            log_names: log_names.into_iter().collect(),
            log_name_filter: query.log_name.clone(),
            earliest: records.iter().map(|r| r.created_at).min(),
            latest: records.iter().map(|r| r.created_at).max(),
        };

        Ok(Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            metadata,
            records,
        })
    }

    /// Validate the export structure
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version != EXPORT_SCHEMA_VERSION {
            return Err(format!(
                "Schema version mismatch: expected {}, got {}",
                EXPORT_SCHEMA_VERSION, self.schema_version
            ));
        }

        if self.metadata.record_count != self.records.len() {
            return Err(format!(
                "Metadata lists {} records but the export holds {}",
                self.metadata.record_count,
                self.records.len()
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for record in &self.records {
            if !seen.insert(record.id) {
                return Err(format!("Record {} appears twice", record.id));
            }
            if record.log_name != record.subject_type.log_name() {
                return Err(format!(
                    "Record {} has log name '{}' for a {} subject",
                    record.id, record.log_name, record.subject_type
                ));
            }
        }

        Ok(())
    }
}

/// Export matching records as JSON
pub fn export_activity_json<W: Write>(
    storage: &Storage,
    query: &ActivityQuery,
    writer: &mut W,
    pretty: bool,
) -> BizdeskResult<()> {
    let export = ActivityExport::from_storage(storage, query)?;

    if pretty {
        serde_json::to_writer_pretty(writer, &export)
    } else {
        serde_json::to_writer(writer, &export)
    }
    .map_err(|e| BizdeskError::Export(e.to_string()))?;

    Ok(())
}

/// Read back and validate a JSON export
pub fn read_activity_json(json_str: &str) -> BizdeskResult<ActivityExport> {
    let export: ActivityExport =
        serde_json::from_str(json_str).map_err(|e| BizdeskError::Export(e.to_string()))?;

    export.validate().map_err(BizdeskError::Export)?;

    Ok(export)
}
