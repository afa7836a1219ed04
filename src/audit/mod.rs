//! Generic audit trail
//!
//! Every committed mutation of a persisted entity is announced on a lifecycle
//! channel. The [`AuditInterceptor`] listens on all four channels and turns
//! each accepted notification into one [`AuditRecord`]:
//!
//! - records themselves, and kinds with a dedicated logger, are skipped
//! - updates touching only bookkeeping fields are skipped
//! - payload maps are redacted before they are written
//!
//! Records are appended to the activity log (JSON lines) through the same
//! generic write path as any other entity.

mod describe;
mod diff;
mod interceptor;
pub mod record;
mod redact;

pub use describe::{action_word, describe};
pub use diff::{
    changed_fields, generate_detailed_diff, generate_diff, strip_bookkeeping, BOOKKEEPING_FIELDS,
};
pub use interceptor::AuditInterceptor;
pub use record::{AuditProperties, AuditRecord, AuditRecordBuilder};
pub use redact::{is_sensitive, redact, REDACTED, SENSITIVE_FIELDS};
