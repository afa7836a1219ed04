//! Web order model
//!
//! Orders placed through the online shop and fulfilled from the back office.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::entity::{Entity, EntityKind, FieldDef, FieldType};
use super::ids::{ClientId, UserId, WebOrderId};
use super::money::Money;

pub const WEB_ORDER_SCHEMA: &[FieldDef] = &[
    FieldDef::new("id", FieldType::Id),
    FieldDef::new("reference", FieldType::Text),
    FieldDef::new("client_id", FieldType::Reference),
    FieldDef::new("status", FieldType::Enum),
    FieldDef::new("total", FieldType::Money),
    FieldDef::new("shipping_address", FieldType::Text),
    FieldDef::new("tracking_number", FieldType::Text),
    FieldDef::new("created_at", FieldType::Timestamp),
    FieldDef::new("updated_at", FieldType::Timestamp),
    FieldDef::new("deleted_at", FieldType::Timestamp),
];

/// Fulfillment status of a web order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Pending -> Processing -> Shipped -> Completed; any open order may be
    /// cancelled
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, next) {
            (Pending, Processing) | (Processing, Shipped) | (Shipped, Completed) => true,
            (from, Cancelled) => !from.is_final(),
            _ => false,
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "shipped" => Some(Self::Shipped),
            "completed" | "complete" => Some(Self::Completed),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Processing => write!(f, "processing"),
            Self::Shipped => write!(f, "shipped"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// An order from the web shop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebOrder {
    pub id: WebOrderId,

    /// Shop reference, e.g. WEB-10042
    pub reference: String,

    pub client_id: ClientId,

    pub status: OrderStatus,

    pub total: Money,

    #[serde(default)]
    pub shipping_address: String,

    #[serde(default)]
    pub tracking_number: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl WebOrder {
    pub fn new(reference: impl Into<String>, client_id: ClientId, total: Money) -> Self {
        let now = Utc::now();
        Self {
            id: WebOrderId::new(),
            reference: reference.into(),
            client_id,
            status: OrderStatus::Pending,
            total,
            shipping_address: String::new(),
            tracking_number: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

impl Entity for WebOrder {
    const KIND: EntityKind = EntityKind::WebOrder;
    type Id = WebOrderId;

    fn id(&self) -> WebOrderId {
        self.id
    }

    fn key(&self) -> Uuid {
        *self.id.as_uuid()
    }

    fn label(&self) -> String {
        self.reference.clone()
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

impl fmt::Display for WebOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.reference, self.status, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_keys_match_schema() {
        let order = WebOrder::new("WEB-1", ClientId::new(), Money::from_cents(4200));
        let value = serde_json::to_value(&order).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        let schema: Vec<_> = WEB_ORDER_SCHEMA.iter().map(|f| f.name.to_string()).collect();
        assert_eq!(keys, schema);
    }

    #[test]
    fn test_status_transitions() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Shipped));
        assert!(Shipped.can_transition_to(Completed));
        assert!(Shipped.can_transition_to(Cancelled));
        assert!(!Pending.can_transition_to(Shipped));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Cancelled));
        assert!(!Shipped.can_transition_to(Pending));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(OrderStatus::parse("Shipped"), Some(OrderStatus::Shipped));
        assert_eq!(OrderStatus::parse("canceled"), Some(OrderStatus::Cancelled));
        assert_eq!(OrderStatus::parse("lost"), None);
    }
}
