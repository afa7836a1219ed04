//! User model
//!
//! Back-office staff accounts. Users are the principals recorded as the
//! causer of audit records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::entity::{Entity, EntityKind, FieldDef, FieldType};
use super::ids::UserId;

pub const USER_SCHEMA: &[FieldDef] = &[
    FieldDef::new("id", FieldType::Id),
    FieldDef::new("name", FieldType::Text),
    FieldDef::new("email", FieldType::Text),
    FieldDef::new("password", FieldType::Secret),
    FieldDef::new("remember_token", FieldType::Secret),
    FieldDef::new("two_factor_secret", FieldType::Secret),
    FieldDef::new("two_factor_recovery_codes", FieldType::Secret),
    FieldDef::new("is_admin", FieldType::Boolean),
    FieldDef::new("created_at", FieldType::Timestamp),
    FieldDef::new("updated_at", FieldType::Timestamp),
    FieldDef::new("deleted_at", FieldType::Timestamp),
];

/// A back-office user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,

    pub name: String,

    /// Login email, unique (case-insensitive)
    pub email: String,

    /// Argon2id PHC string, never the clear password
    pub password: String,

    /// Token for "remember me" sessions
    #[serde(default)]
    pub remember_token: Option<String>,

    /// Base64 two-factor enrollment secret
    #[serde(default)]
    pub two_factor_secret: Option<String>,

    #[serde(default)]
    pub two_factor_recovery_codes: Vec<String>,

    #[serde(default)]
    pub is_admin: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Create a user from an already-hashed password
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            name: name.into(),
            email: email.into(),
            password: password_hash.into(),
            remember_token: None,
            two_factor_secret: None,
            two_factor_recovery_codes: Vec::new(),
            is_admin: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn has_two_factor(&self) -> bool {
        self.two_factor_secret.is_some()
    }

    pub fn validate(&self) -> Result<(), UserValidationError> {
        if self.name.trim().is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if !super::client::looks_like_email(&self.email) {
            return Err(UserValidationError::InvalidEmail(self.email.clone()));
        }
        Ok(())
    }
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::User;
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }

    fn key(&self) -> Uuid {
        *self.id.as_uuid()
    }

    fn label(&self) -> String {
        self.email.clone()
    }

    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    fn set_deleted_at(&mut self, at: Option<DateTime<Utc>>) {
        self.deleted_at = at;
    }

    fn touch(&mut self, at: DateTime<Utc>, _by: Option<UserId>) {
        self.updated_at = at;
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// Validation errors for users
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyName,
    InvalidEmail(String),
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "User name cannot be empty"),
            Self::InvalidEmail(email) => write!(f, "Invalid email address: '{}'", email),
        }
    }
}

impl std::error::Error for UserValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_keys_match_schema() {
        let user = User::new("Ada", "ada@example.com", "$argon2id$hash");
        let value = serde_json::to_value(&user).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        let schema: Vec<_> = USER_SCHEMA.iter().map(|f| f.name.to_string()).collect();
        assert_eq!(keys, schema);
    }

    #[test]
    fn test_validation() {
        let mut user = User::new("Ada", "ada@example.com", "hash");
        assert!(user.validate().is_ok());

        user.email = "not-an-email".into();
        assert!(matches!(
            user.validate(),
            Err(UserValidationError::InvalidEmail(_))
        ));

        user.name = "  ".into();
        assert_eq!(user.validate(), Err(UserValidationError::EmptyName));
    }

    #[test]
    fn test_display() {
        let user = User::new("Ada", "ada@example.com", "hash");
        assert_eq!(user.to_string(), "Ada <ada@example.com>");
    }
}
