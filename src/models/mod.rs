//! Core data models for bizdesk
//!
//! This module contains the persisted entity types (users, clients, products,
//! quotes, invoices, web orders, support tickets) and the schema/kind metadata
//! the audit trail relies on.

pub mod client;
pub mod entity;
pub mod ids;
pub mod invoice;
pub mod money;
pub mod product;
pub mod quote;
pub mod ticket;
pub mod user;
pub mod web_order;

pub use client::Client;
pub use entity::{Entity, EntityKind, EntityRef, FieldDef, FieldMap, FieldType};
pub use ids::{ActivityId, EntityId, ClientId, InvoiceId, ProductId, QuoteId, TicketId, UserId, WebOrderId};
pub use invoice::{Invoice, InvoiceStatus};
pub use money::Money;
pub use product::Product;
pub use quote::{DocumentLine, Quote, QuoteStatus};
pub use ticket::{Ticket, TicketPriority, TicketStatus};
pub use user::User;
pub use web_order::{OrderStatus, WebOrder};
