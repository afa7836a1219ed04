//! Audit record data structures
//!
//! One [`AuditRecord`] is written per accepted lifecycle notification. Records
//! are immutable once appended to the activity log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::events::LifecycleEvent;
use crate::models::{ActivityId, Entity, EntityKind, EntityRef, FieldDef, FieldMap, FieldType, UserId};

use super::diff::generate_diff;

pub const ACTIVITY_SCHEMA: &[FieldDef] = &[
    FieldDef::new("id", FieldType::Id),
    FieldDef::new("log_name", FieldType::Text),
    FieldDef::new("event", FieldType::Enum),
    FieldDef::new("description", FieldType::Text),
    FieldDef::new("subject_type", FieldType::Enum),
    FieldDef::new("subject_id", FieldType::Reference),
    FieldDef::new("causer_type", FieldType::Enum),
    FieldDef::new("causer_id", FieldType::Reference),
    FieldDef::new("properties", FieldType::Object),
    FieldDef::new("created_at", FieldType::Timestamp),
];

/// Structured payload of a record
///
/// Which maps are present depends on the event: `attributes` for creations,
/// restorations and updates, `old` for updates and deletions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<FieldMap>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old: Option<FieldMap>,
}

impl AuditProperties {
    pub fn is_empty(&self) -> bool {
        self.attributes.is_none() && self.old.is_none()
    }
}

/// A single audit trail entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: ActivityId,

    /// Partition of the trail, the snake-cased subject type
    pub log_name: String,

    pub event: LifecycleEvent,

    /// Localized, e.g. `Web Order — Update`
    pub description: String,

    pub subject_type: EntityKind,

    pub subject_id: Uuid,

    /// Acting principal; both `None` for system-initiated changes
    pub causer_type: Option<EntityKind>,

    pub causer_id: Option<Uuid>,

    #[serde(default)]
    pub properties: AuditProperties,

    pub created_at: DateTime<Utc>,
}

impl AuditRecord {
    pub fn builder(event: LifecycleEvent, subject: EntityRef) -> AuditRecordBuilder {
        AuditRecordBuilder::new(event, subject)
    }

    pub fn subject(&self) -> EntityRef {
        EntityRef::new(self.subject_type, self.subject_id)
    }

    pub fn causer(&self) -> Option<EntityRef> {
        match (self.causer_type, self.causer_id) {
            (Some(kind), Some(key)) => Some(EntityRef::new(kind, key)),
            _ => None,
        }
    }

    /// `field: old -> new` summary; for creations and deletions the missing
    /// side shows up as `(added)`/`(removed)`
    pub fn diff_summary(&self) -> Option<String> {
        let empty = FieldMap::new();
        let old = self.properties.old.as_ref().unwrap_or(&empty);
        let new = self.properties.attributes.as_ref().unwrap_or(&empty);
        generate_diff(old, new)
    }

    /// Format the record for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {} {}",
            self.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.id,
            self.log_name,
            self.description
        );

        output.push_str(&format!(" ({})", self.subject()));

        match self.causer() {
            Some(causer) => output.push_str(&format!(" by {}", causer)),
            None => output.push_str(" by system"),
        }

        if self.event == LifecycleEvent::Updated {
            if let Some(diff) = self.diff_summary() {
                output.push_str(&format!("\n  Changes: {}", diff));
            }
        }

        output
    }
}

/// Incremental construction of an [`AuditRecord`]
#[derive(Debug, Clone)]
pub struct AuditRecordBuilder {
    event: LifecycleEvent,
    subject: EntityRef,
    log_name: Option<String>,
    description: Option<String>,
    causer: Option<EntityRef>,
    properties: AuditProperties,
    created_at: Option<DateTime<Utc>>,
}

impl AuditRecordBuilder {
    pub fn new(event: LifecycleEvent, subject: EntityRef) -> Self {
        Self {
            event,
            subject,
            log_name: None,
            description: None,
            causer: None,
            properties: AuditProperties::default(),
            created_at: None,
        }
    }

    /// Override the partition; defaults to the subject kind's log name
    pub fn log_name(mut self, log_name: impl Into<String>) -> Self {
        self.log_name = Some(log_name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn causer(mut self, causer: Option<EntityRef>) -> Self {
        self.causer = causer;
        self
    }

    pub fn attributes(mut self, attributes: FieldMap) -> Self {
        self.properties.attributes = Some(attributes);
        self
    }

    pub fn old(mut self, old: FieldMap) -> Self {
        self.properties.old = Some(old);
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    pub fn build(self) -> AuditRecord {
        let kind = self.subject.kind;
        AuditRecord {
            id: ActivityId::new(),
            log_name: self.log_name.unwrap_or_else(|| kind.log_name()),
            event: self.event,
            description: self
                .description
                .unwrap_or_else(|| format!("{} {}", kind.humanized(), self.event)),
            subject_type: kind,
            subject_id: self.subject.key,
            causer_type: self.causer.map(|c| c.kind),
            causer_id: self.causer.map(|c| c.key),
            properties: self.properties,
            created_at: self.created_at.unwrap_or_else(Utc::now),
        }
    }
}

impl Entity for AuditRecord {
    const KIND: EntityKind = EntityKind::Activity;
    type Id = ActivityId;

    fn id(&self) -> ActivityId {
        self.id
    }

    fn key(&self) -> Uuid {
        *self.id.as_uuid()
    }

    fn label(&self) -> String {
        self.description.clone()
    }

    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        None
    }

    // Records are append-only; the activity store refuses these mutations.
    fn set_deleted_at(&mut self, _at: Option<DateTime<Utc>>) {}

    fn touch(&mut self, _at: DateTime<Utc>, _by: Option<UserId>) {}
}
