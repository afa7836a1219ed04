//! Quote, invoice, order and ticket display formatting

use std::collections::HashMap;

use tabled::Tabled;

use crate::models::{ClientId, Invoice, Quote, Ticket, WebOrder};

use super::{render_table, truncate};

/// Company names keyed by client id, for the Client column
pub type ClientNames = HashMap<ClientId, String>;

fn client_name(names: &ClientNames, id: &ClientId) -> String {
    names.get(id).cloned().unwrap_or_else(|| id.to_string())
}

#[derive(Tabled)]
struct DocumentRow {
    #[tabled(rename = "Number")]
    number: String,
    #[tabled(rename = "Client")]
    client: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Lines")]
    lines: usize,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Date")]
    date: String,
}

#[derive(Tabled)]
struct OrderRow {
    #[tabled(rename = "Reference")]
    reference: String,
    #[tabled(rename = "Client")]
    client: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Tracking")]
    tracking: String,
}

#[derive(Tabled)]
struct TicketRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Subject")]
    subject: String,
    #[tabled(rename = "Client")]
    client: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Replies")]
    replies: u32,
}

pub fn format_quote_list(quotes: &[Quote], names: &ClientNames, currency: &str) -> String {
    let rows = quotes
        .iter()
        .map(|q| DocumentRow {
            number: q.number.clone(),
            client: client_name(names, &q.client_id),
            status: q.status.to_string(),
            lines: q.lines.len(),
            total: format!("{}{}", currency, q.total),
            date: q.created_at.format("%Y-%m-%d").to_string(),
        })
        .collect();
    render_table(rows, "No quotes found.")
}

pub fn format_invoice_list(invoices: &[Invoice], names: &ClientNames, currency: &str) -> String {
    let rows = invoices
        .iter()
        .map(|i| DocumentRow {
            number: i.number.clone(),
            client: client_name(names, &i.client_id),
            status: i.status.to_string(),
            lines: i.lines.len(),
            total: format!("{}{}", currency, i.total),
            date: i.created_at.format("%Y-%m-%d").to_string(),
        })
        .collect();
    render_table(rows, "No invoices found.")
}

/// Format a quote with its lines
pub fn format_quote_details(quote: &Quote, client: &str, currency: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Quote {} ({})\n", quote.number, quote.status));
    output.push_str(&format!("  Client:       {}\n", client));
    if let Some(valid_until) = quote.valid_until {
        output.push_str(&format!("  Valid until:  {}\n", valid_until));
    }
    if let Some(invoice_id) = quote.invoice_id {
        output.push_str(&format!("  Invoice:      {}\n", invoice_id));
    }
    output.push('\n');

    if quote.lines.is_empty() {
        output.push_str("  (no lines)\n");
    }
    for line in &quote.lines {
        output.push_str(&format!(
            "  {:<40} {:>5} x {:>10} = {:>10}\n",
            truncate(&line.description, 40),
            line.quantity,
            format!("{}{}", currency, line.unit_price),
            format!("{}{}", currency, line.total()),
        ));
    }
    output.push_str(&format!("  {:>72}\n", format!("Total: {}{}", currency, quote.total)));

    output
}

pub fn format_order_list(orders: &[WebOrder], names: &ClientNames, currency: &str) -> String {
    let rows = orders
        .iter()
        .map(|o| OrderRow {
            reference: o.reference.clone(),
            client: client_name(names, &o.client_id),
            status: o.status.to_string(),
            total: format!("{}{}", currency, o.total),
            tracking: o.tracking_number.clone().unwrap_or_default(),
        })
        .collect();
    render_table(rows, "No orders found.")
}

pub fn format_ticket_list(tickets: &[Ticket], names: &ClientNames) -> String {
    let rows = tickets
        .iter()
        .map(|t| TicketRow {
            id: t.id.to_string(),
            subject: truncate(&t.subject, 40),
            client: client_name(names, &t.client_id),
            priority: t.priority.to_string(),
            status: t.status.to_string(),
            replies: t.replies,
        })
        .collect();
    render_table(rows, "No tickets found.")
}
