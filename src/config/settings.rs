//! Settings for bizdesk
//!
//! Manages preferences including the audit trail locale, what happens when an
//! audit write fails, logging verbosity and document numbering.

use serde::{Deserialize, Serialize};

use super::paths::BizdeskPaths;
use crate::error::BizdeskError;

/// Language used for audit descriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Fr,
}

impl Locale {
    /// Parse a locale tag such as "en", "fr" or "fr_FR"
    pub fn parse(s: &str) -> Option<Self> {
        let lang = s.split(['_', '-']).next().unwrap_or(s);
        match lang.to_lowercase().as_str() {
            "en" => Some(Self::En),
            "fr" => Some(Self::Fr),
            _ => None,
        }
    }
}

/// What to do when writing an audit record fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuditFailurePolicy {
    /// Fail the originating mutation (it is rolled back)
    #[default]
    Propagate,
    /// Log a warning and keep the originating mutation
    Warn,
}

impl AuditFailurePolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "propagate" | "fail" => Some(Self::Propagate),
            "warn" => Some(Self::Warn),
            _ => None,
        }
    }
}

/// Audit trail settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuditSettings {
    #[serde(default)]
    pub failure_policy: AuditFailurePolicy,
}

/// Settings for bizdesk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Locale for audit descriptions
    #[serde(default)]
    pub locale: Locale,

    /// Audit trail behaviour
    #[serde(default)]
    pub audit: AuditSettings,

    /// Default tracing filter (overridden by `BIZDESK_LOG`)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Currency symbol used when displaying amounts
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Prefix for quote numbers (Q-2026-0001)
    #[serde(default = "default_quote_prefix")]
    pub quote_prefix: String,

    /// Prefix for invoice numbers (F-2026-0001)
    #[serde(default = "default_invoice_prefix")]
    pub invoice_prefix: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_quote_prefix() -> String {
    "Q".to_string()
}

fn default_invoice_prefix() -> String {
    "F".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            locale: Locale::default(),
            audit: AuditSettings::default(),
            log_level: default_log_level(),
            currency_symbol: default_currency(),
            quote_prefix: default_quote_prefix(),
            invoice_prefix: default_invoice_prefix(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or return defaults if the file doesn't exist
    pub fn load_or_create(paths: &BizdeskPaths) -> Result<Self, BizdeskError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                BizdeskError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                BizdeskError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &BizdeskPaths) -> Result<(), BizdeskError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            BizdeskError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| BizdeskError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.locale, Locale::En);
        assert_eq!(settings.audit.failure_policy, AuditFailurePolicy::Propagate);
        assert_eq!(settings.quote_prefix, "Q");
        assert_eq!(settings.invoice_prefix, "F");
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = BizdeskPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.locale = Locale::Fr;
        settings.audit.failure_policy = AuditFailurePolicy::Warn;
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.locale, Locale::Fr);
        assert_eq!(loaded.audit.failure_policy, AuditFailurePolicy::Warn);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"locale": "fr"}"#).unwrap();
        assert_eq!(settings.locale, Locale::Fr);
        assert_eq!(settings.log_level, "warn");
        assert_eq!(settings.audit.failure_policy, AuditFailurePolicy::Propagate);
    }

    #[test]
    fn test_locale_parse() {
        assert_eq!(Locale::parse("fr_FR"), Some(Locale::Fr));
        assert_eq!(Locale::parse("EN-us"), Some(Locale::En));
        assert_eq!(Locale::parse("de"), None);
    }

    #[test]
    fn test_failure_policy_parse() {
        assert_eq!(AuditFailurePolicy::parse("WARN"), Some(AuditFailurePolicy::Warn));
        assert_eq!(
            AuditFailurePolicy::parse("propagate"),
            Some(AuditFailurePolicy::Propagate)
        );
        assert_eq!(AuditFailurePolicy::parse("ignore"), None);
    }
}
