//! Path management for bizdesk
//!
//! Provides XDG-compliant path resolution for configuration, entity data,
//! and the activity log.
//!
//! ## Path Resolution Order
//!
//! 1. `BIZDESK_DATA_DIR` environment variable (if set)
//! 2. The platform config directory (`~/.config/bizdesk` on Linux)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::BizdeskError;
use crate::models::EntityKind;

/// Manages all paths used by bizdesk
#[derive(Debug, Clone)]
pub struct BizdeskPaths {
    /// Base directory for all bizdesk data
    base_dir: PathBuf,
}

impl BizdeskPaths {
    /// Create a new BizdeskPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined and
    /// `BIZDESK_DATA_DIR` is not set.
    pub fn new() -> Result<Self, BizdeskError> {
        let base_dir = if let Ok(custom) = std::env::var("BIZDESK_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            ProjectDirs::from("", "", "bizdesk")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .ok_or_else(|| {
                    BizdeskError::Config("Could not determine a config directory".into())
                })?
        };

        Ok(Self { base_dir })
    }

    /// Create BizdeskPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory (<base>/data/)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the append-only activity log
    pub fn activity_log(&self) -> PathBuf {
        self.base_dir.join("activity.log")
    }

    /// Get the JSON file backing an entity kind (e.g. data/web_orders.json)
    pub fn entity_file(&self, kind: EntityKind) -> PathBuf {
        self.data_dir().join(format!("{}s.json", kind.log_name()))
    }

    /// Ensure the base and data directories exist
    pub fn ensure_directories(&self) -> Result<(), BizdeskError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| BizdeskError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| BizdeskError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }

    /// Check if bizdesk has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = BizdeskPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.data_dir(), temp_dir.path().join("data"));
        assert_eq!(paths.activity_log(), temp_dir.path().join("activity.log"));
    }

    #[test]
    fn test_entity_files() {
        let temp_dir = TempDir::new().unwrap();
        let paths = BizdeskPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(
            paths.entity_file(EntityKind::WebOrder),
            temp_dir.path().join("data").join("web_orders.json")
        );
        assert_eq!(
            paths.entity_file(EntityKind::Client),
            temp_dir.path().join("data").join("clients.json")
        );
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = BizdeskPaths::with_base_dir(temp_dir.path().join("nested"));

        paths.ensure_directories().unwrap();

        assert!(paths.data_dir().exists());
        assert!(!paths.is_initialized());
    }
}
