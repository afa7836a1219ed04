//! The generic audit observer
//!
//! Subscribed once per storage instance to the four lifecycle channels. For
//! each entity snapshot it receives it applies, in order:
//!
//! 1. skip audit records themselves
//! 2. skip kinds that keep their own audit trail
//! 3. for updates, skip when only bookkeeping fields changed
//!
//! and otherwise writes one redacted [`AuditRecord`] attributed to the
//! current principal.

use std::sync::Arc;

use crate::auth::ActorResolver;
use crate::config::{AuditFailurePolicy, Locale};
use crate::error::BizdeskResult;
use crate::events::{
    ActivityWriter, EntitySnapshot, LifecycleEvent, LifecycleObserver, ObserverRegistry, Payload,
};
use crate::models::{EntityKind, EntityRef, FieldMap};

use super::describe::describe;
use super::diff::strip_bookkeeping;
use super::record::AuditRecord;
use super::redact::redact;

pub struct AuditInterceptor {
    actor: Arc<dyn ActorResolver>,
    locale: Locale,
    policy: AuditFailurePolicy,
}

impl AuditInterceptor {
    pub const NAME: &'static str = "audit";

    pub fn new(actor: Arc<dyn ActorResolver>, locale: Locale, policy: AuditFailurePolicy) -> Self {
        Self {
            actor,
            locale,
            policy,
        }
    }

    /// Subscribe to every lifecycle channel
    ///
    /// Returns how many subscriptions were added; registering the same
    /// interceptor again adds none.
    pub fn register(self: Arc<Self>, registry: &mut ObserverRegistry) -> usize {
        LifecycleEvent::ALL
            .into_iter()
            .filter(|event| registry.subscribe(event.token(), self.clone()))
            .count()
    }

    /// Build the record for one snapshot, or `None` if it is filtered out
    pub fn build_record(
        &self,
        event: LifecycleEvent,
        snapshot: &EntitySnapshot,
    ) -> Option<AuditRecord> {
        if snapshot.kind == EntityKind::Activity {
            return None;
        }

        if snapshot.kind.has_dedicated_audit() {
            tracing::trace!(kind = %snapshot.kind, "kind has a dedicated audit logger");
            return None;
        }

        let subject = EntityRef::new(snapshot.kind, snapshot.key);
        let builder = AuditRecord::builder(event, subject)
            .description(describe(snapshot.kind, event.token(), self.locale))
            .causer(self.current_causer());

        let builder = match event {
            LifecycleEvent::Created | LifecycleEvent::Restored => {
                builder.attributes(redact(snapshot.attributes.clone()))
            }
            LifecycleEvent::Deleted => builder.old(redact(snapshot.attributes.clone())),
            LifecycleEvent::Updated => {
                let changes = strip_bookkeeping(snapshot.changes());
                if changes.is_empty() {
                    tracing::trace!(kind = %snapshot.kind, "only bookkeeping fields changed");
                    return None;
                }

                let old: FieldMap = changes
                    .keys()
                    .map(|key| {
                        let value = snapshot.original.get(key).cloned().unwrap_or_default();
                        (key.clone(), value)
                    })
                    .collect();

                builder.attributes(redact(changes)).old(redact(old))
            }
        };

        Some(builder.build())
    }

    fn current_causer(&self) -> Option<EntityRef> {
        self.actor.current().and_then(|principal| principal.as_entity())
    }

    fn persist(&self, writer: &dyn ActivityWriter, record: AuditRecord) -> BizdeskResult<()> {
        let subject = record.subject();
        let event = record.event;

        match writer.write_activity(record) {
            Ok(()) => {
                tracing::debug!(%subject, %event, "audit record written");
                Ok(())
            }
            Err(e) => match self.policy {
                AuditFailurePolicy::Propagate => Err(e),
                AuditFailurePolicy::Warn => {
                    tracing::warn!(%subject, %event, error = %e, "failed to write audit record");
                    Ok(())
                }
            },
        }
    }
}

impl LifecycleObserver for AuditInterceptor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn handle(
        &self,
        writer: &dyn ActivityWriter,
        event: &str,
        payload: &[Payload],
    ) -> BizdeskResult<()> {
        let Some(event) = LifecycleEvent::from_token(event) else {
            tracing::debug!(event, "ignoring unknown lifecycle channel");
            return Ok(());
        };

        for item in payload {
            let Payload::Entity(snapshot) = item else {
                continue;
            };

            if let Some(record) = self.build_record(event, snapshot) {
                self.persist(writer, record)?;
            }
        }

        Ok(())
    }
}
