//! YAML export of the audit trail
//!
//! Same document as the JSON export, preceded by a commented header for
//! people reading the file.

use std::io::Write;

use crate::error::{BizdeskError, BizdeskResult};
use crate::export::json::ActivityExport;
use crate::storage::{ActivityQuery, Storage};

/// Export matching records as YAML
pub fn export_activity_yaml<W: Write>(
    storage: &Storage,
    query: &ActivityQuery,
    writer: &mut W,
) -> BizdeskResult<()> {
    let export = ActivityExport::from_storage(storage, query)?;
    let io_err = |e: std::io::Error| BizdeskError::Export(e.to_string());

    writeln!(writer, "# bizdesk activity export").map_err(io_err)?;
    writeln!(writer, "# Generated: {}", export.exported_at).map_err(io_err)?;
    writeln!(writer, "# App Version: {}", export.app_version).map_err(io_err)?;
    writeln!(writer, "# Records: {}", export.metadata.record_count).map_err(io_err)?;
    if let Some(log_name) = &export.metadata.log_name_filter {
        writeln!(writer, "# Log: {}", log_name).map_err(io_err)?;
    }
    writeln!(writer, "#").map_err(io_err)?;
    writeln!(
        writer,
        "# Sensitive fields are masked; this file is safe to share with auditors."
    )
    .map_err(io_err)?;
    writeln!(writer).map_err(io_err)?;

    serde_yaml::to_writer(writer, &export).map_err(|e| BizdeskError::Export(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{hash_password, ClearPassword, NoActor};
    use crate::config::{BizdeskPaths, Settings};
    use crate::models::{Client, User};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = BizdeskPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths, &Settings::default(), Arc::new(NoActor)).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_yaml_export() {
        let (_temp_dir, storage) = create_test_storage();
        storage.create(Client::new("Acme", "a@x.com")).unwrap();

        let mut output = Vec::new();
        export_activity_yaml(&storage, &ActivityQuery::new().log_name("client"), &mut output)
            .unwrap();

        let yaml = String::from_utf8(output).unwrap();
        assert!(yaml.starts_with("# bizdesk activity export"));
        assert!(yaml.contains("# Log: client"));
        assert!(yaml.contains("schema_version"));
        assert!(yaml.contains("Client — Creation"));
    }

    #[test]
    fn test_yaml_export_keeps_secrets_masked() {
        let (_temp_dir, storage) = create_test_storage();
        let hash = hash_password(&ClearPassword::new("correct horse")).unwrap();
        storage.create(User::new("Sam", "sam@x.com", hash.clone())).unwrap();

        let mut output = Vec::new();
        export_activity_yaml(&storage, &ActivityQuery::new(), &mut output).unwrap();

        let yaml = String::from_utf8(output).unwrap();
        assert!(!yaml.contains(&hash));
        assert!(yaml.contains("********"));
    }
}
