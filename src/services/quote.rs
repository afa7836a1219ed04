//! Quote service
//!
//! Quotes move Draft -> Sent -> Accepted/Rejected, and an accepted quote
//! converts once into an invoice. Quotes and invoices keep their own
//! document history through [`DocumentLog`]; the generic interceptor skips
//! them.

use chrono::{Datelike, NaiveDate, Utc};

use crate::config::Settings;
use crate::error::{BizdeskError, BizdeskResult};
use crate::models::{ClientId, DocumentLine, Entity, Invoice, Quote, QuoteStatus};
use crate::storage::Storage;

use super::document_log::DocumentLog;

/// Next number in the `PREFIX-YYYY-NNNN` sequence for `year`
///
/// Numbers with another prefix or year are ignored; the sequence restarts
/// at 0001 every year.
pub fn next_document_number<'n>(
    prefix: &str,
    year: i32,
    existing: impl IntoIterator<Item = &'n str>,
) -> String {
    let stem = format!("{}-{}-", prefix, year);
    let last = existing
        .into_iter()
        .filter_map(|number| number.strip_prefix(&stem))
        .filter_map(|seq| seq.parse::<u32>().ok())
        .max()
        .unwrap_or(0);

    format!("{}{:04}", stem, last + 1)
}

/// Service for quotes and their conversion into invoices
pub struct QuoteService<'a> {
    storage: &'a Storage,
    settings: &'a Settings,
}

impl<'a> QuoteService<'a> {
    pub fn new(storage: &'a Storage, settings: &'a Settings) -> Self {
        Self { storage, settings }
    }

    /// Draft a new quote for a client
    pub fn create(
        &self,
        client_id: ClientId,
        lines: Vec<DocumentLine>,
        valid_until: Option<NaiveDate>,
    ) -> BizdeskResult<Quote> {
        let client = self
            .storage
            .clients
            .get(*client_id.as_uuid())?
            .filter(|c| !c.is_trashed())
            .ok_or_else(|| BizdeskError::client_not_found(client_id.to_string()))?;

        let existing = self.storage.quotes.get_all()?;
        let number = next_document_number(
            &self.settings.quote_prefix,
            Utc::now().year(),
            existing.iter().map(|q| q.number.as_str()),
        );

        let mut quote = Quote::new(number, client.id, self.storage.acting_user());
        quote.valid_until = valid_until;
        for line in lines {
            quote.add_line(line);
        }

        let log = DocumentLog::new(self.storage);
        self.storage.create_with(quote, |quote| {
            log.issued(
                quote,
                format!("Quote {} drafted for {}", quote.number, client.company),
            )
        })
    }

    /// Add a line to a quote that is still editable
    pub fn add_line(&self, reference: &str, line: DocumentLine) -> BizdeskResult<Quote> {
        let before = self.find(reference)?;
        if !before.status.is_editable() {
            return Err(BizdeskError::Validation(format!(
                "Quote {} is {} and can no longer be edited",
                before.number, before.status
            )));
        }
        if line.quantity == 0 {
            return Err(BizdeskError::Validation("Quantity must be at least 1".into()));
        }

        let mut quote = before.clone();
        quote.add_line(line);
        let log = DocumentLog::new(self.storage);
        self.storage.update_with(quote, |before, after| {
            log.changed(
                before,
                after,
                format!("Quote {} line added, total {}", after.number, after.total),
            )
        })
    }

    pub fn send(&self, reference: &str) -> BizdeskResult<Quote> {
        self.transition(reference, QuoteStatus::Sent)
    }

    pub fn accept(&self, reference: &str) -> BizdeskResult<Quote> {
        self.transition(reference, QuoteStatus::Accepted)
    }

    pub fn reject(&self, reference: &str) -> BizdeskResult<Quote> {
        self.transition(reference, QuoteStatus::Rejected)
    }

    /// Turn an accepted quote into an unpaid invoice
    pub fn convert(&self, reference: &str) -> BizdeskResult<Invoice> {
        let before = self.find(reference)?;

        if before.invoice_id.is_some() || before.status == QuoteStatus::Converted {
            return Err(BizdeskError::Validation(format!(
                "Quote {} has already been converted",
                before.number
            )));
        }
        if before.status != QuoteStatus::Accepted {
            return Err(BizdeskError::InvalidTransition {
                entity_type: "Quote",
                from: before.status.to_string(),
                to: QuoteStatus::Converted.to_string(),
            });
        }
        if before.lines.is_empty() {
            return Err(BizdeskError::Validation(format!(
                "Quote {} has no lines to invoice",
                before.number
            )));
        }

        let existing = self.storage.invoices.get_all()?;
        let number = next_document_number(
            &self.settings.invoice_prefix,
            Utc::now().year(),
            existing.iter().map(|i| i.number.as_str()),
        );

        let log = DocumentLog::new(self.storage);
        let checkpoint = self.storage.activity.count()?;

        let invoice = self.storage.create_with(
            Invoice::from_quote(number, &before, self.storage.acting_user()),
            |invoice| {
                log.issued(
                    invoice,
                    format!("Invoice {} issued from quote {}", invoice.number, before.number),
                )
            },
        )?;

        let mut quote = before.clone();
        quote.status = QuoteStatus::Converted;
        quote.invoice_id = Some(invoice.id);

        let converted = self.storage.update_with(quote, |before, after| {
            log.changed(
                before,
                after,
                format!("Quote {} converted into invoice {}", after.number, invoice.number),
            )
        });
        let quote = match converted {
            Ok(quote) => quote,
            Err(e) => {
                tracing::warn!(quote = %before.number, error = %e, "conversion failed, removing invoice");
                if let Err(undo) = self.storage.force_delete::<Invoice>(invoice.key()) {
                    tracing::error!(invoice = %invoice.number, error = %undo, "could not remove invoice");
                }
                if let Err(undo) = self.storage.activity.rollback_to(checkpoint) {
                    tracing::error!(invoice = %invoice.number, error = %undo, "could not take back invoice history");
                }
                return Err(e);
            }
        };

        tracing::info!(quote = %quote.number, invoice = %invoice.number, "quote converted");
        Ok(invoice)
    }

    /// Find by number, short id or UUID prefix
    pub fn find(&self, reference: &str) -> BizdeskResult<Quote> {
        self.storage.quotes.resolve(reference).map_err(|e| {
            if e.is_not_found() {
                BizdeskError::quote_not_found(reference)
            } else {
                e
            }
        })
    }

    pub fn list(&self, status: Option<QuoteStatus>) -> BizdeskResult<Vec<Quote>> {
        self.storage
            .quotes
            .filter(|q| !q.is_trashed() && status.map_or(true, |s| q.status == s))
    }

    /// Withdraw a quote that was never converted
    pub fn delete(&self, reference: &str) -> BizdeskResult<Quote> {
        let quote = self.find(reference)?;
        if quote.status == QuoteStatus::Converted {
            return Err(BizdeskError::Validation(format!(
                "Quote {} has been invoiced and cannot be deleted",
                quote.number
            )));
        }

        let log = DocumentLog::new(self.storage);
        self.storage.delete_with::<Quote>(quote.key(), |quote| {
            log.removed(quote, format!("Quote {} withdrawn", quote.number))
        })
    }

    fn transition(&self, reference: &str, next: QuoteStatus) -> BizdeskResult<Quote> {
        let before = self.find(reference)?;
        if !before.status.can_transition_to(next) {
            return Err(BizdeskError::InvalidTransition {
                entity_type: "Quote",
                from: before.status.to_string(),
                to: next.to_string(),
            });
        }

        let mut quote = before.clone();
        quote.status = next;
        let log = DocumentLog::new(self.storage);
        self.storage.update_with(quote, |before, after| {
            log.changed(before, after, format!("Quote {} {}", after.number, next))
        })
    }
}
