//! Invoice service
//!
//! Invoices are only created by converting a quote; afterwards they can be
//! marked paid or cancelled. Each change is written to the `invoice` history.

use chrono::NaiveDate;

use crate::error::{BizdeskError, BizdeskResult};
use crate::models::{ClientId, Invoice, InvoiceStatus};
use crate::storage::Storage;

use super::document_log::DocumentLog;

pub struct InvoiceService<'a> {
    storage: &'a Storage,
}

impl<'a> InvoiceService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Find by number, short id or UUID prefix
    pub fn find(&self, reference: &str) -> BizdeskResult<Invoice> {
        self.storage.invoices.resolve(reference)
    }

    pub fn list(&self, status: Option<InvoiceStatus>) -> BizdeskResult<Vec<Invoice>> {
        self.storage
            .invoices
            .filter(|i| status.map_or(true, |s| i.status == s))
    }

    pub fn for_client(&self, client_id: ClientId) -> BizdeskResult<Vec<Invoice>> {
        self.storage.invoices.filter(|i| i.client_id == client_id)
    }

    /// Set the payment due date of an unpaid invoice
    pub fn set_due_date(&self, reference: &str, due: NaiveDate) -> BizdeskResult<Invoice> {
        let before = self.find(reference)?;
        self.require_unpaid(&before, "rescheduled")?;

        let mut invoice = before.clone();
        invoice.due_date = Some(due);
        let log = DocumentLog::new(self.storage);
        self.storage.update_with(invoice, |before, after| {
            log.changed(before, after, format!("Invoice {} due on {}", after.number, due))
        })
    }

    pub fn mark_paid(&self, reference: &str) -> BizdeskResult<Invoice> {
        self.settle(reference, InvoiceStatus::Paid)
    }

    pub fn cancel(&self, reference: &str) -> BizdeskResult<Invoice> {
        self.settle(reference, InvoiceStatus::Cancelled)
    }

    fn settle(&self, reference: &str, next: InvoiceStatus) -> BizdeskResult<Invoice> {
        let before = self.find(reference)?;
        if before.status != InvoiceStatus::Unpaid {
            return Err(BizdeskError::InvalidTransition {
                entity_type: "Invoice",
                from: before.status.to_string(),
                to: next.to_string(),
            });
        }

        let mut invoice = before.clone();
        invoice.status = next;
        let log = DocumentLog::new(self.storage);
        let invoice = self.storage.update_with(invoice, |before, after| {
            log.changed(before, after, format!("Invoice {} {}", after.number, next))
        })?;

        tracing::info!(invoice = %invoice.number, status = %next, "invoice settled");
        Ok(invoice)
    }

    fn require_unpaid(&self, invoice: &Invoice, action: &str) -> BizdeskResult<()> {
        if invoice.status == InvoiceStatus::Unpaid {
            Ok(())
        } else {
            Err(BizdeskError::Validation(format!(
                "Invoice {} is {} and cannot be {}",
                invoice.number, invoice.status, action
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::NoActor;
    use crate::config::{BizdeskPaths, Settings};
    use crate::models::{Client, DocumentLine, Money};
    use crate::services::QuoteService;
    use crate::storage::ActivityQuery;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn storage_with_invoice() -> (TempDir, Storage, Invoice) {
        let temp_dir = TempDir::new().unwrap();
        let paths = BizdeskPaths::with_base_dir(temp_dir.path().to_path_buf());
        let settings = Settings::default();
        let storage = Storage::open(paths, &settings, Arc::new(NoActor)).unwrap();

        let client = storage.create(Client::new("Acme", "a@x.com")).unwrap();
        let quotes = QuoteService::new(&storage, &settings);
        let quote = quotes
            .create(
                client.id,
                vec![DocumentLine::new("Audit", 1, Money::from_cents(99000))],
                None,
            )
            .unwrap();
        quotes.accept(&quote.number).unwrap();
        let invoice = quotes.convert(&quote.number).unwrap();

        (temp_dir, storage, invoice)
    }

    #[test]
    fn test_mark_paid() {
        let (_temp, storage, invoice) = storage_with_invoice();
        let service = InvoiceService::new(&storage);

        let paid = service.mark_paid(&invoice.number).unwrap();
        assert_eq!(paid.status, InvoiceStatus::Paid);

        let history = storage
            .activity
            .query(&ActivityQuery::new().log_name("invoice"))
            .unwrap();
        let last = history.last().unwrap();
        assert_eq!(last.description, format!("Invoice {} paid", invoice.number));
        assert_eq!(last.properties.old.as_ref().unwrap()["status"], "unpaid");
        assert_eq!(last.properties.attributes.as_ref().unwrap()["status"], "paid");
    }

    #[test]
    fn test_cannot_cancel_paid_invoice() {
        let (_temp, storage, invoice) = storage_with_invoice();
        let service = InvoiceService::new(&storage);

        service.mark_paid(&invoice.number).unwrap();
        assert!(matches!(
            service.cancel(&invoice.number).unwrap_err(),
            BizdeskError::InvalidTransition { .. }
        ));
        assert!(service
            .set_due_date(&invoice.number, NaiveDate::from_ymd_opt(2026, 12, 1).unwrap())
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_list_by_status() {
        let (_temp, storage, invoice) = storage_with_invoice();
        let service = InvoiceService::new(&storage);

        assert_eq!(service.list(Some(InvoiceStatus::Unpaid)).unwrap().len(), 1);
        service.cancel(&invoice.number).unwrap();
        assert!(service.list(Some(InvoiceStatus::Unpaid)).unwrap().is_empty());
        assert_eq!(service.list(None).unwrap().len(), 1);
        assert_eq!(service.for_client(invoice.client_id).unwrap().len(), 1);
    }
}
