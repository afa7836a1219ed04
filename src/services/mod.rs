//! Service layer for bizdesk
//!
//! Services validate input and apply business rules, then write through the
//! generic storage path so the lifecycle observers (and the audit trail) see
//! every change. Quotes and invoices also keep their own document history.

pub mod client;
pub mod document_log;
pub mod invoice;
pub mod product;
pub mod quote;
pub mod ticket;
pub mod user;
pub mod web_order;

pub use client::{ClientChanges, ClientService};
pub use document_log::DocumentLog;
pub use invoice::InvoiceService;
pub use product::{ProductChanges, ProductService};
pub use quote::{next_document_number, QuoteService};
pub use ticket::TicketService;
pub use user::UserService;
pub use web_order::WebOrderService;
