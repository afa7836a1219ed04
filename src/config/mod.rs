//! Configuration module for bizdesk
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - Settings persistence (locale, audit failure policy, document numbering)

pub mod paths;
pub mod settings;

pub use paths::BizdeskPaths;
pub use settings::{AuditFailurePolicy, AuditSettings, Locale, Settings};
