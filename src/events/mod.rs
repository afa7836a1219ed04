//! Entity lifecycle notifications
//!
//! The storage layer announces every committed mutation on one channel per
//! event kind. Observers subscribe through an explicit [`ObserverRegistry`]
//! owned by the storage instance, so each test can build its own.

mod registry;

pub use registry::ObserverRegistry;

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::audit::{changed_fields, AuditRecord};
use crate::error::BizdeskResult;
use crate::models::{Entity, EntityKind, FieldMap};

/// Kind of committed mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleEvent {
    Created,
    Updated,
    Deleted,
    Restored,
}

impl LifecycleEvent {
    pub const ALL: [LifecycleEvent; 4] = [
        Self::Created,
        Self::Updated,
        Self::Deleted,
        Self::Restored,
    ];

    /// Channel token, e.g. `created`
    pub fn token(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::Restored => "restored",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.token() == token)
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// State of a persisted entity at notification time
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySnapshot {
    pub kind: EntityKind,
    pub key: Uuid,
    /// Current field values
    pub attributes: FieldMap,
    /// Values before the mutation; equal to `attributes` unless updated
    pub original: FieldMap,
}

impl EntitySnapshot {
    pub fn capture<E: Entity>(entity: &E) -> BizdeskResult<Self> {
        let attributes = entity.attributes()?;
        Ok(Self {
            kind: E::KIND,
            key: entity.key(),
            original: attributes.clone(),
            attributes,
        })
    }

    /// Record the pre-mutation values (for updates)
    pub fn with_original(mut self, original: FieldMap) -> Self {
        self.original = original;
        self
    }

    /// Fields whose value differs from the original, with their new value
    pub fn changes(&self) -> FieldMap {
        changed_fields(&self.original, &self.attributes)
    }
}

/// One element of a notification payload
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A persisted entity instance
    Entity(EntitySnapshot),
    /// Anything else a channel might carry; observers ignore it
    Value(serde_json::Value),
}

/// Write access handed to observers during dispatch
pub trait ActivityWriter {
    fn write_activity(&self, record: AuditRecord) -> BizdeskResult<()>;
}

/// A subscriber to lifecycle channels
pub trait LifecycleObserver: Send + Sync {
    /// Stable name; a registry holds at most one observer per name per channel
    fn name(&self) -> &str;

    fn handle(
        &self,
        writer: &dyn ActivityWriter,
        event: &str,
        payload: &[Payload],
    ) -> BizdeskResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Client;

    #[test]
    fn test_tokens_round_trip() {
        for event in LifecycleEvent::ALL {
            assert_eq!(LifecycleEvent::from_token(event.token()), Some(event));
        }
        assert_eq!(LifecycleEvent::from_token("saved"), None);
        assert_eq!(
            serde_json::to_string(&LifecycleEvent::Updated).unwrap(),
            "\"updated\""
        );
    }

    #[test]
    fn test_capture_has_no_changes() {
        let client = Client::new("Acme", "a@x.com");
        let snapshot = EntitySnapshot::capture(&client).unwrap();

        assert_eq!(snapshot.kind, EntityKind::Client);
        assert_eq!(snapshot.key, *client.id.as_uuid());
        assert!(snapshot.changes().is_empty());
    }

    #[test]
    fn test_changes_against_original() {
        let before = Client::new("Acme", "a@x.com");
        let mut after = before.clone();
        after.email = "b@x.com".into();

        let snapshot = EntitySnapshot::capture(&after)
            .unwrap()
            .with_original(before.attributes().unwrap());

        let changes = snapshot.changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes["email"], "b@x.com");
    }
}
