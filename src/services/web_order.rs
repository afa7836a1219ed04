//! Web order service
//!
//! Orders come in from the shop and are walked through fulfillment here.
//! They have no dedicated history, so every status change is picked up by
//! the generic audit interceptor under the `web_order` log name.

use crate::error::{BizdeskError, BizdeskResult};
use crate::models::{Entity, Money, OrderStatus, WebOrder};
use crate::storage::Storage;

pub struct WebOrderService<'a> {
    storage: &'a Storage,
}

impl<'a> WebOrderService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Record an order placed in the shop
    pub fn create(
        &self,
        reference: &str,
        client_reference: &str,
        total: Money,
        shipping_address: &str,
    ) -> BizdeskResult<WebOrder> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(BizdeskError::Validation("Order reference cannot be empty".into()));
        }
        if total.is_negative() {
            return Err(BizdeskError::Validation(format!(
                "Order total cannot be negative: {}",
                total
            )));
        }

        let client = self.storage.clients.resolve(client_reference)?;
        if client.is_trashed() {
            return Err(BizdeskError::Validation(format!(
                "Client '{}' is deleted",
                client.company
            )));
        }

        let taken = self
            .storage
            .web_orders
            .find_by(|o| o.reference.eq_ignore_ascii_case(reference))?;
        if taken.is_some() {
            return Err(BizdeskError::Duplicate {
                entity_type: "WebOrder",
                identifier: reference.to_string(),
            });
        }

        let mut order = WebOrder::new(reference, client.id, total);
        order.shipping_address = shipping_address.trim().to_string();
        self.storage.create(order)
    }

    /// Move an order to its next fulfillment status
    ///
    /// A tracking number may be attached when the order ships.
    pub fn transition(
        &self,
        reference: &str,
        next: OrderStatus,
        tracking_number: Option<String>,
    ) -> BizdeskResult<WebOrder> {
        let mut order = self.find(reference)?;

        if !order.status.can_transition_to(next) {
            return Err(BizdeskError::InvalidTransition {
                entity_type: "WebOrder",
                from: order.status.to_string(),
                to: next.to_string(),
            });
        }
        if tracking_number.is_some() && next != OrderStatus::Shipped {
            return Err(BizdeskError::Validation(
                "A tracking number can only be set when shipping".into(),
            ));
        }

        order.status = next;
        if let Some(tracking) = tracking_number {
            order.tracking_number = Some(tracking.trim().to_string());
        }

        let order = self.storage.update(order)?;
        tracing::info!(order = %order.reference, status = %next, "order moved");
        Ok(order)
    }

    pub fn find(&self, reference: &str) -> BizdeskResult<WebOrder> {
        self.storage.web_orders.resolve(reference)
    }

    pub fn list(&self, status: Option<OrderStatus>) -> BizdeskResult<Vec<WebOrder>> {
        self.storage
            .web_orders
            .filter(|o| !o.is_trashed() && status.map_or(true, |s| o.status == s))
    }

    /// Archive a finished order
    pub fn delete(&self, reference: &str) -> BizdeskResult<WebOrder> {
        let order = self.find(reference)?;
        if !order.status.is_final() {
            return Err(BizdeskError::Validation(format!(
                "Order {} is still {}; complete or cancel it first",
                order.reference, order.status
            )));
        }
        self.storage.delete::<WebOrder>(order.key())
    }

    pub fn restore(&self, reference: &str) -> BizdeskResult<WebOrder> {
        let order = self.find(reference)?;
        self.storage.restore::<WebOrder>(order.key())
    }
}
