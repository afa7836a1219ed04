//! Document history for quotes and invoices
//!
//! Quotes and invoices declare a dedicated audit trail, so the generic
//! interceptor ignores them. This logger writes their records instead, with
//! business wording ("Quote Q-2026-0001 accepted") rather than generic
//! Creation/Update descriptions.
//!
//! Services call it from inside the storage unit of work
//! (`Storage::create_with` and friends), so a history write that fails under
//! [`AuditFailurePolicy::Propagate`] undoes the document change as well.

use crate::audit::{changed_fields, redact, strip_bookkeeping, AuditRecord, AuditRecordBuilder};
use crate::config::AuditFailurePolicy;
use crate::error::BizdeskResult;
use crate::events::{ActivityWriter, LifecycleEvent};
use crate::models::{Entity, EntityRef, FieldMap};
use crate::storage::Storage;

pub struct DocumentLog<'a> {
    storage: &'a Storage,
}

impl<'a> DocumentLog<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// A document was issued; the full state goes into `attributes`
    pub fn issued<E: Entity>(&self, document: &E, message: impl Into<String>) -> BizdeskResult<()> {
        let record = self
            .base(LifecycleEvent::Created, document, message)
            .attributes(redact(document.attributes()?))
            .build();
        self.write(record)
    }

    /// A document changed; only the fields that differ are recorded
    pub fn changed<E: Entity>(
        &self,
        before: &E,
        after: &E,
        message: impl Into<String>,
    ) -> BizdeskResult<()> {
        let original = before.attributes()?;
        let new = strip_bookkeeping(changed_fields(&original, &after.attributes()?));
        let old: FieldMap = new
            .keys()
            .map(|key| (key.clone(), original.get(key).cloned().unwrap_or_default()))
            .collect();

        let record = self
            .base(LifecycleEvent::Updated, after, message)
            .attributes(redact(new))
            .old(redact(old))
            .build();
        self.write(record)
    }

    /// A document was withdrawn
    pub fn removed<E: Entity>(&self, document: &E, message: impl Into<String>) -> BizdeskResult<()> {
        let record = self
            .base(LifecycleEvent::Deleted, document, message)
            .old(redact(document.attributes()?))
            .build();
        self.write(record)
    }

    fn base<E: Entity>(
        &self,
        event: LifecycleEvent,
        document: &E,
        message: impl Into<String>,
    ) -> AuditRecordBuilder {
        let causer = self
            .storage
            .actor()
            .current()
            .and_then(|principal| principal.as_entity());

        AuditRecord::builder(event, EntityRef::of(document))
            .description(message)
            .causer(causer)
    }

    fn write(&self, record: AuditRecord) -> BizdeskResult<()> {
        tracing::debug!(log = %record.log_name, description = %record.description, "document history");
        let subject = record.subject();

        match self.storage.write_activity(record) {
            Ok(()) => Ok(()),
            Err(e) => match self.storage.audit_policy() {
                AuditFailurePolicy::Propagate => Err(e),
                AuditFailurePolicy::Warn => {
                    tracing::warn!(%subject, error = %e, "failed to write document history");
                    Ok(())
                }
            },
        }
    }
}
