//! Strongly-typed ID wrappers for all entity types
//!
//! Using newtype wrappers prevents accidentally mixing up IDs from different
//! entity types at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;
use uuid::Uuid;

/// Behaviour shared by every typed ID
pub trait EntityId: Copy + Eq + Hash + fmt::Display + Send + Sync {
    fn uuid(&self) -> Uuid;

    /// Whether a user-typed reference points at this ID
    ///
    /// Accepts the full UUID, the short display form (`cli-1a2b3c4d`)
    /// or any UUID prefix of at least 4 characters.
    fn matches(&self, reference: &str) -> bool;
}

/// Macro to generate ID newtype wrappers
macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create an ID from an existing UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Parse an ID from a full UUID string
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl EntityId for $name {
            fn uuid(&self) -> Uuid {
                self.0
            }

            fn matches(&self, reference: &str) -> bool {
                let reference = reference.trim().to_lowercase();
                let bare = reference
                    .strip_prefix($display_prefix)
                    .unwrap_or(&reference);
                bare.len() >= 4 && self.0.to_string().starts_with(bare)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, &self.0.to_string()[..8])
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_id!(UserId, "usr-");
define_id!(ClientId, "cli-");
define_id!(ProductId, "prd-");
define_id!(QuoteId, "quo-");
define_id!(InvoiceId, "inv-");
define_id!(WebOrderId, "ord-");
define_id!(TicketId, "tkt-");
define_id!(ActivityId, "act-");
