//! Product service

use crate::error::{BizdeskError, BizdeskResult};
use crate::models::{Entity, Money, Product};
use crate::storage::Storage;

/// Optional edits to a product
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub unit_price: Option<Money>,
    pub active: Option<bool>,
}

impl ProductChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.unit_price.is_none()
            && self.active.is_none()
    }
}

/// Service for the product catalog
pub struct ProductService<'a> {
    storage: &'a Storage,
}

impl<'a> ProductService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Add a product to the catalog
    pub fn create(&self, sku: &str, name: &str, unit_price: Money) -> BizdeskResult<Product> {
        let product = Product::new(sku.trim().to_uppercase(), name.trim(), unit_price);
        product
            .validate()
            .map_err(|e| BizdeskError::Validation(e.to_string()))?;

        if self.find_by_sku(&product.sku)?.is_some() {
            return Err(BizdeskError::Duplicate {
                entity_type: "Product",
                identifier: product.sku,
            });
        }

        self.storage.create(product)
    }

    pub fn update(&self, reference: &str, changes: ProductChanges) -> BizdeskResult<Product> {
        let mut product = self.find(reference)?;

        if let Some(name) = changes.name {
            product.name = name.trim().to_string();
        }
        if let Some(description) = changes.description {
            product.description = description;
        }
        if let Some(price) = changes.unit_price {
            product.unit_price = price;
        }
        if let Some(active) = changes.active {
            product.active = active;
        }

        product
            .validate()
            .map_err(|e| BizdeskError::Validation(e.to_string()))?;
        self.storage.update(product)
    }

    /// Find by SKU, short id or exact name
    pub fn find(&self, reference: &str) -> BizdeskResult<Product> {
        match self.find_by_sku(reference)? {
            Some(product) => Ok(product),
            None => self.storage.products.resolve(reference),
        }
    }

    pub fn find_by_sku(&self, sku: &str) -> BizdeskResult<Option<Product>> {
        let sku = sku.trim().to_uppercase();
        self.storage.products.find_by(|p| p.sku == sku)
    }

    pub fn list(&self, include_deleted: bool) -> BizdeskResult<Vec<Product>> {
        if include_deleted {
            self.storage.products.get_all()
        } else {
            self.storage.products.active()
        }
    }

    pub fn delete(&self, reference: &str) -> BizdeskResult<Product> {
        let product = self.find(reference)?;
        self.storage.delete::<Product>(product.key())
    }

    pub fn restore(&self, reference: &str) -> BizdeskResult<Product> {
        let product = self.find(reference)?;
        self.storage.restore::<Product>(product.key())
    }
}
