//! Quote model
//!
//! A priced offer to a client. Accepted quotes convert into invoices.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::entity::{Entity, EntityKind, FieldDef, FieldType};
use super::ids::{ClientId, InvoiceId, ProductId, QuoteId, UserId};
use super::money::Money;

pub const QUOTE_SCHEMA: &[FieldDef] = &[
    FieldDef::new("id", FieldType::Id),
    FieldDef::new("number", FieldType::Text),
    FieldDef::new("client_id", FieldType::Reference),
    FieldDef::new("status", FieldType::Enum),
    FieldDef::new("lines", FieldType::List),
    FieldDef::new("total", FieldType::Money),
    FieldDef::new("valid_until", FieldType::Date),
    FieldDef::new("invoice_id", FieldType::Reference),
    FieldDef::new("created_by", FieldType::Reference),
    FieldDef::new("updated_by", FieldType::Reference),
    FieldDef::new("created_at", FieldType::Timestamp),
    FieldDef::new("updated_at", FieldType::Timestamp),
    FieldDef::new("deleted_at", FieldType::Timestamp),
];

/// One priced line of a quote or invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentLine {
    #[serde(default)]
    pub product_id: Option<ProductId>,
    pub description: String,
    pub quantity: u32,
    pub unit_price: Money,
}

impl DocumentLine {
    pub fn new(description: impl Into<String>, quantity: u32, unit_price: Money) -> Self {
        Self {
            product_id: None,
            description: description.into(),
            quantity,
            unit_price,
        }
    }

    pub fn total(&self) -> Money {
        self.unit_price * self.quantity
    }
}

/// Sum of line totals
pub fn lines_total(lines: &[DocumentLine]) -> Money {
    lines.iter().map(DocumentLine::total).sum()
}

/// Lifecycle status of a quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    #[default]
    Draft,
    Sent,
    Accepted,
    Rejected,
    /// Turned into an invoice; final
    Converted,
}

impl QuoteStatus {
    pub fn can_transition_to(&self, next: QuoteStatus) -> bool {
        use QuoteStatus::*;
        matches!(
            (self, next),
            (Draft, Sent)
                | (Draft, Accepted)
                | (Sent, Accepted)
                | (Draft, Rejected)
                | (Sent, Rejected)
                | (Accepted, Converted)
        )
    }

    /// Whether lines may still be edited
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft | Self::Sent)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "sent" => Some(Self::Sent),
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            "converted" | "invoiced" => Some(Self::Converted),
            _ => None,
        }
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Sent => write!(f, "sent"),
            Self::Accepted => write!(f, "accepted"),
            Self::Rejected => write!(f, "rejected"),
            Self::Converted => write!(f, "converted"),
        }
    }
}

/// A quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: QuoteId,

    /// Document number, e.g. Q-2026-0001
    pub number: String,

    pub client_id: ClientId,

    pub status: QuoteStatus,

    #[serde(default)]
    pub lines: Vec<DocumentLine>,

    /// Cached sum of the lines
    pub total: Money,

    #[serde(default)]
    pub valid_until: Option<NaiveDate>,

    /// Set once converted
    #[serde(default)]
    pub invoice_id: Option<InvoiceId>,

    #[serde(default)]
    pub created_by: Option<UserId>,

    #[serde(default)]
    pub updated_by: Option<UserId>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Quote {
    pub fn new(number: impl Into<String>, client_id: ClientId, created_by: Option<UserId>) -> Self {
        let now = Utc::now();
        Self {
            id: QuoteId::new(),
            number: number.into(),
            client_id,
            status: QuoteStatus::Draft,
            lines: Vec::new(),
            total: Money::zero(),
            valid_until: None,
            invoice_id: None,
            created_by,
            updated_by: created_by,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Append a line and refresh the cached total
    pub fn add_line(&mut self, line: DocumentLine) {
        self.lines.push(line);
        self.total = lines_total(&self.lines);
    }
}

impl Entity for Quote {
    const KIND: EntityKind = EntityKind::Quote;
    type Id = QuoteId;

    fn id(&self) -> QuoteId {
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

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.number, self.status, self.total)
    }
}
