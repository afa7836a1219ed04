//! Product model
//!
//! Catalog items that quote and invoice lines can reference.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::entity::{Entity, EntityKind, FieldDef, FieldType};
use super::ids::{ProductId, UserId};
use super::money::Money;

pub const PRODUCT_SCHEMA: &[FieldDef] = &[
    FieldDef::new("id", FieldType::Id),
    FieldDef::new("sku", FieldType::Text),
    FieldDef::new("name", FieldType::Text),
    FieldDef::new("description", FieldType::Text),
    FieldDef::new("unit_price", FieldType::Money),
    FieldDef::new("active", FieldType::Boolean),
    FieldDef::new("created_at", FieldType::Timestamp),
    FieldDef::new("updated_at", FieldType::Timestamp),
    FieldDef::new("deleted_at", FieldType::Timestamp),
];

/// A catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,

    /// Stock keeping unit, unique (case-insensitive)
    pub sku: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    pub unit_price: Money,

    /// Inactive products can't be added to new documents
    pub active: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Product {
    pub fn new(sku: impl Into<String>, name: impl Into<String>, unit_price: Money) -> Self {
        let now = Utc::now();
        Self {
            id: ProductId::new(),
            sku: sku.into(),
            name: name.into(),
            description: String::new(),
            unit_price,
            active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn validate(&self) -> Result<(), ProductValidationError> {
        if self.sku.trim().is_empty() {
            return Err(ProductValidationError::EmptySku);
        }
        if self.name.trim().is_empty() {
            return Err(ProductValidationError::EmptyName);
        }
        if self.unit_price.is_negative() {
            return Err(ProductValidationError::NegativePrice);
        }
        Ok(())
    }
}

impl Entity for Product {
    const KIND: EntityKind = EntityKind::Product;
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }

    fn key(&self) -> Uuid {
        *self.id.as_uuid()
    }

    fn label(&self) -> String {
        self.sku.clone()
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

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.sku, self.name, self.unit_price)
    }
}

/// Validation errors for products
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductValidationError {
    EmptySku,
    EmptyName,
    NegativePrice,
}

impl fmt::Display for ProductValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySku => write!(f, "Product SKU cannot be empty"),
            Self::EmptyName => write!(f, "Product name cannot be empty"),
            Self::NegativePrice => write!(f, "Product price cannot be negative"),
        }
    }
}

impl std::error::Error for ProductValidationError {}
