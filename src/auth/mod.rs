//! Actor attribution and credentials
//!
//! The storage layer asks an [`ActorResolver`] who is acting when it stamps
//! `updated_by` and when the audit interceptor records a causer.

mod actor;
mod password;

pub use actor::{acting_user, ActorResolver, NoActor, Principal, SessionActor};
pub use password::{generate_secret, generate_recovery_codes, hash_password, verify_password, ClearPassword};
