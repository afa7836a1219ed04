//! Invoice model
//!
//! Invoices are issued from accepted quotes and track payment status.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::entity::{Entity, EntityKind, FieldDef, FieldType};
use super::ids::{ClientId, InvoiceId, QuoteId, UserId};
use super::money::Money;
use super::quote::{lines_total, DocumentLine, Quote};

pub const INVOICE_SCHEMA: &[FieldDef] = &[
    FieldDef::new("id", FieldType::Id),
    FieldDef::new("number", FieldType::Text),
    FieldDef::new("client_id", FieldType::Reference),
    FieldDef::new("quote_id", FieldType::Reference),
    FieldDef::new("status", FieldType::Enum),
    FieldDef::new("lines", FieldType::List),
    FieldDef::new("total", FieldType::Money),
    FieldDef::new("due_date", FieldType::Date),
    FieldDef::new("created_by", FieldType::Reference),
    FieldDef::new("updated_by", FieldType::Reference),
    FieldDef::new("created_at", FieldType::Timestamp),
    FieldDef::new("updated_at", FieldType::Timestamp),
    FieldDef::new("deleted_at", FieldType::Timestamp),
];

/// Payment status of an invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    #[default]
    Unpaid,
    Paid,
    Cancelled,
}

impl InvoiceStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "unpaid" | "open" => Some(Self::Unpaid),
            "paid" => Some(Self::Paid),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unpaid => write!(f, "unpaid"),
            Self::Paid => write!(f, "paid"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// An invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,

    /// Document number, e.g. F-2026-0001
    pub number: String,

    pub client_id: ClientId,

    /// Quote this invoice was converted from
    #[serde(default)]
    pub quote_id: Option<QuoteId>,

    pub status: InvoiceStatus,

    #[serde(default)]
    pub lines: Vec<DocumentLine>,

    pub total: Money,

    #[serde(default)]
    pub due_date: Option<NaiveDate>,

    #[serde(default)]
    pub created_by: Option<UserId>,

    #[serde(default)]
    pub updated_by: Option<UserId>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Invoice {
    /// Build an unpaid invoice carrying over the quote's client and lines
    pub fn from_quote(number: impl Into<String>, quote: &Quote, created_by: Option<UserId>) -> Self {
        let now = Utc::now();
        Self {
            id: InvoiceId::new(),
            number: number.into(),
            client_id: quote.client_id,
            quote_id: Some(quote.id),
            status: InvoiceStatus::Unpaid,
            lines: quote.lines.clone(),
            total: lines_total(&quote.lines),
            due_date: None,
            created_by,
            updated_by: created_by,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

impl Entity for Invoice {
    const KIND: EntityKind = EntityKind::Invoice;
    type Id = InvoiceId;

    fn id(&self) -> InvoiceId {
        self.id
    }

    fn key(&self) -> Uuid {
        *self.id.as_uuid()
    }

    fn label(&self) -> String {
        self.number.clone()
    }

    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    fn set_deleted_at(&mut self, at: Option<DateTime<Utc>>) {
        self.deleted_at = at;
    }

    fn touch(&mut self, at: DateTime<Utc>, by: Option<UserId>) {
        self.updated_at = at;
        if by.is_some() {
            self.updated_by = by;
        }
    }
}

impl fmt::Display for Invoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.number, self.status, self.total)
    }
}
