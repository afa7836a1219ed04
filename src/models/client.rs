//! Client model
//!
//! Customers that receive quotes, invoices and web orders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::entity::{Entity, EntityKind, FieldDef, FieldType};
use super::ids::{ClientId, UserId};

pub const CLIENT_SCHEMA: &[FieldDef] = &[
    FieldDef::new("id", FieldType::Id),
    FieldDef::new("company", FieldType::Text),
    FieldDef::new("contact_name", FieldType::Text),
    FieldDef::new("email", FieldType::Text),
    FieldDef::new("phone", FieldType::Text),
    FieldDef::new("address", FieldType::Text),
    FieldDef::new("notes", FieldType::Text),
    FieldDef::new("created_at", FieldType::Timestamp),
    FieldDef::new("updated_at", FieldType::Timestamp),
    FieldDef::new("deleted_at", FieldType::Timestamp),
];

/// A customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,

    /// Company or display name
    pub company: String,

    #[serde(default)]
    pub contact_name: String,

    pub email: String,

    #[serde(default)]
    pub phone: Option<String>,

    #[serde(default)]
    pub address: Option<String>,

    #[serde(default)]
    pub notes: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Client {
    pub fn new(company: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ClientId::new(),
            company: company.into(),
            contact_name: String::new(),
            email: email.into(),
            phone: None,
            address: None,
            notes: String::new(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn validate(&self) -> Result<(), ClientValidationError> {
        if self.company.trim().is_empty() {
            return Err(ClientValidationError::EmptyCompany);
        }
        if self.company.len() > 150 {
            return Err(ClientValidationError::CompanyTooLong(self.company.len()));
        }
        if !looks_like_email(&self.email) {
            return Err(ClientValidationError::InvalidEmail(self.email.clone()));
        }
        Ok(())
    }
}

/// Minimal shape check: one `@`, non-empty local part, dotted domain
pub fn looks_like_email(email: &str) -> bool {
    match email.trim().split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

impl Entity for Client {
    const KIND: EntityKind = EntityKind::Client;
    type Id = ClientId;

    fn id(&self) -> ClientId {
        self.id
    }

    fn key(&self) -> Uuid {
        *self.id.as_uuid()
    }

    fn label(&self) -> String {
        self.company.clone()
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

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.company, self.email)
    }
}

/// Validation errors for clients
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientValidationError {
    EmptyCompany,
    CompanyTooLong(usize),
    InvalidEmail(String),
}

impl fmt::Display for ClientValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCompany => write!(f, "Client company cannot be empty"),
            Self::CompanyTooLong(len) => {
                write!(f, "Client company too long ({} chars, max 150)", len)
            }
            Self::InvalidEmail(email) => write!(f, "Invalid email address: '{}'", email),
        }
    }
}

impl std::error::Error for ClientValidationError {}
