//! Audit trail export
//!
//! Writes the activity log, optionally filtered by an [`ActivityQuery`], in
//! three formats:
//! - JSON: machine-readable, with schema version and metadata
//! - YAML: the same document with a commented header
//! - CSV: one row per record for spreadsheets
//!
//! [`ActivityQuery`]: crate::storage::ActivityQuery

pub mod csv;
pub mod json;
pub mod yaml;

pub use self::csv::export_activity_csv;
pub use self::json::{export_activity_json, read_activity_json, ActivityExport, EXPORT_SCHEMA_VERSION};
pub use self::yaml::export_activity_yaml;
