//! Append-only activity log
//!
//! Audit records are stored one JSON object per line in `activity.log`. Lines
//! are only ever appended; the store refuses to rewrite or drop a record.

use std::path::{Path, PathBuf};
use std::sync::RwLock;
use uuid::Uuid;

use crate::audit::AuditRecord;
use crate::error::{BizdeskError, BizdeskResult};
use crate::events::LifecycleEvent;
use crate::models::{Entity, EntityId, EntityKind};

use super::file_io::{append_json_line, read_json_lines, write_json_lines_atomic};
use super::repository::EntityStore;

/// Filter for reading the activity log
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityQuery {
    pub log_name: Option<String>,
    pub subject: Option<Uuid>,
    pub causer: Option<Uuid>,
    pub event: Option<LifecycleEvent>,
    /// Keep only the most recent N matches
    pub limit: Option<usize>,
}

impl ActivityQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log_name(mut self, log_name: impl Into<String>) -> Self {
        self.log_name = Some(log_name.into());
        self
    }

    pub fn subject(mut self, key: Uuid) -> Self {
        self.subject = Some(key);
        self
    }

    pub fn causer(mut self, key: Uuid) -> Self {
        self.causer = Some(key);
        self
    }

    pub fn event(mut self, event: LifecycleEvent) -> Self {
        self.event = Some(event);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, record: &AuditRecord) -> bool {
        self.log_name
            .as_deref()
            .map_or(true, |name| record.log_name == name)
            && self.subject.map_or(true, |key| record.subject_id == key)
            && self.causer.map_or(true, |key| record.causer_id == Some(key))
            && self.event.map_or(true, |event| record.event == event)
    }
}

/// The activity (audit) store
pub struct ActivityLog {
    path: PathBuf,
    records: RwLock<Vec<AuditRecord>>,
}

impl ActivityLog {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            records: RwLock::new(Vec::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn load(&self) -> BizdeskResult<()> {
        let loaded: Vec<AuditRecord> = read_json_lines(&self.path)?;
        let mut records = self
            .records
            .write()
            .map_err(|e| BizdeskError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        *records = loaded;
        Ok(())
    }

    /// Append a record, flushing it to disk before it becomes visible
    pub fn append(&self, record: &AuditRecord) -> BizdeskResult<()> {
        let mut records = self
            .records
            .write()
            .map_err(|e| BizdeskError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        if records.iter().any(|r| r.id == record.id) {
            return Err(BizdeskError::Duplicate {
                entity_type: EntityKind::Activity.type_name(),
                identifier: record.id.to_string(),
            });
        }

        append_json_line(&self.path, record)?;
        records.push(record.clone());
        Ok(())
    }

    /// Take back the records appended after the first `len`
    ///
    /// Only the storage unit of work calls this, when a write is undone after
    /// its records were appended. Records are otherwise never removed.
    pub(crate) fn rollback_to(&self, len: usize) -> BizdeskResult<()> {
        let mut records = self
            .records
            .write()
            .map_err(|e| BizdeskError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        if records.len() <= len {
            return Ok(());
        }

        write_json_lines_atomic(&self.path, &records[..len])?;
        tracing::debug!(dropped = records.len() - len, "activity records rolled back");
        records.truncate(len);
        Ok(())
    }

    /// All records, oldest first
    pub fn all(&self) -> BizdeskResult<Vec<AuditRecord>> {
        self.query(&ActivityQuery::default())
    }

    /// Matching records in chronological order
    pub fn query(&self, query: &ActivityQuery) -> BizdeskResult<Vec<AuditRecord>> {
        let records = self
            .records
            .read()
            .map_err(|e| BizdeskError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let matching: Vec<AuditRecord> = records
            .iter()
            .filter(|r| query.matches(r))
            .cloned()
            .collect();

        let start = query
            .limit
            .map_or(0, |limit| matching.len().saturating_sub(limit));
        Ok(matching[start..].to_vec())
    }

    /// History of one entity
    pub fn for_subject(&self, key: Uuid) -> BizdeskResult<Vec<AuditRecord>> {
        self.query(&ActivityQuery::new().subject(key))
    }

    pub fn get(&self, key: Uuid) -> BizdeskResult<Option<AuditRecord>> {
        let records = self
            .records
            .read()
            .map_err(|e| BizdeskError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(records.iter().find(|r| r.key() == key).cloned())
    }

    /// Find a record by short id or UUID prefix
    pub fn resolve(&self, reference: &str) -> BizdeskResult<AuditRecord> {
        let records = self
            .records
            .read()
            .map_err(|e| BizdeskError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut matches: Vec<&AuditRecord> =
            records.iter().filter(|r| r.id.matches(reference)).collect();

        match matches.len() {
            0 => Err(BizdeskError::not_found(EntityKind::Activity, reference)),
            1 => Ok(matches.remove(0).clone()),
            n => Err(BizdeskError::Validation(format!(
                "'{}' matches {} activity records; be more specific",
                reference, n
            ))),
        }
    }

    pub fn count(&self) -> BizdeskResult<usize> {
        let records = self
            .records
            .read()
            .map_err(|e| BizdeskError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(records.len())
    }
}

impl EntityStore<AuditRecord> for ActivityLog {
    fn fetch(&self, key: Uuid) -> BizdeskResult<Option<AuditRecord>> {
        self.get(key)
    }

    fn insert(&self, record: &AuditRecord) -> BizdeskResult<()> {
        self.append(record)
    }

    fn replace(&self, record: &AuditRecord) -> BizdeskResult<()> {
        Err(BizdeskError::Immutable(format!(
            "activity {} cannot be updated",
            record.id
        )))
    }

    fn remove(&self, key: Uuid) -> BizdeskResult<()> {
        Err(BizdeskError::Immutable(format!(
            "activity {} cannot be deleted",
            key
        )))
    }
}
