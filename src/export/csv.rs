//! CSV export of the audit trail
//!
//! One row per record. Properties are flattened into a readable change
//! summary plus the raw JSON for tools that want the structured form.

use std::io::Write;

use crate::error::{BizdeskError, BizdeskResult};
use crate::storage::{ActivityQuery, Storage};

const HEADER: [&str; 11] = [
    "ID",
    "Created At",
    "Log",
    "Event",
    "Description",
    "Subject Type",
    "Subject ID",
    "Causer Type",
    "Causer ID",
    "Changes",
    "Properties",
];

/// Export matching records as CSV
pub fn export_activity_csv<W: Write>(
    storage: &Storage,
    query: &ActivityQuery,
    writer: &mut W,
) -> BizdeskResult<()> {
    let records = storage.activity.query(query)?;
    let csv_err = |e: ::csv::Error| BizdeskError::Export(e.to_string());

    let mut out = ::csv::Writer::from_writer(writer);
    out.write_record(HEADER).map_err(csv_err)?;

    for record in &records {
        let id = record.id.to_string();
        let properties = serde_json::to_string(&record.properties)?;
        let created_at = record.created_at.to_rfc3339();
        let event = record.event.to_string();
        let subject_id = record.subject_id.to_string();
        let causer_type = record
            .causer_type
            .map(|kind| kind.type_name().to_string())
            .unwrap_or_default();
        let causer_id = record.causer_id.map(|id| id.to_string()).unwrap_or_default();
        let changes = record.diff_summary().unwrap_or_default();

        out.write_record([
            id.as_str(),
            created_at.as_str(),
            record.log_name.as_str(),
            event.as_str(),
            record.description.as_str(),
            record.subject_type.type_name(),
            subject_id.as_str(),
            causer_type.as_str(),
            causer_id.as_str(),
            changes.as_str(),
            properties.as_str(),
        ])
        .map_err(csv_err)?;
    }

    out.flush().map_err(|e| BizdeskError::Export(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::NoActor;
    use crate::config::{BizdeskPaths, Settings};
    use crate::models::Client;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = BizdeskPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths, &Settings::default(), Arc::new(NoActor)).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_export_activity_csv() {
        let (_temp_dir, storage) = create_test_storage();
        let client = storage.create(Client::new("Acme, Inc.", "old@x.com")).unwrap();
        let mut edited = client.clone();
        edited.email = "new@x.com".into();
        storage.update(edited).unwrap();

        let mut output = Vec::new();
        export_activity_csv(&storage, &ActivityQuery::new(), &mut output).unwrap();

        let csv_string = String::from_utf8(output).unwrap();
        let mut lines = csv_string.lines();
        assert!(lines.next().unwrap().starts_with("ID,Created At,Log,Event"));
        assert_eq!(csv_string.lines().count(), 3);
        assert!(csv_string.contains("\"Acme, Inc.\""));
        assert!(csv_string.contains("email: \"\"old@x.com\"\" -> \"\"new@x.com\"\""));
    }

    #[test]
    fn test_export_reads_back_with_csv_reader() {
        let (_temp_dir, storage) = create_test_storage();
        storage.create(Client::new("Acme", "a@x.com")).unwrap();

        let mut output = Vec::new();
        export_activity_csv(&storage, &ActivityQuery::new(), &mut output).unwrap();

        let mut reader = ::csv::Reader::from_reader(output.as_slice());
        let rows: Vec<_> = reader.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][2], "client");
        assert_eq!(&rows[0][3], "created");
        assert_eq!(&rows[0][7], "");
    }
}
