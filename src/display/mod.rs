//! Display formatting for terminal output
//!
//! List views are rendered as tables; detail views are plain indented text.

pub mod activity;
pub mod directory;
pub mod documents;

pub use activity::{format_activity_details, format_activity_list};
pub use directory::{
    format_client_details, format_client_list, format_product_list, format_user_details,
    format_user_list,
};
pub use documents::{
    format_invoice_list, format_order_list, format_quote_details, format_quote_list,
    format_ticket_list,
};

use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Render rows with the shared table style, or `empty` when there are none
pub(crate) fn render_table<T: Tabled>(rows: Vec<T>, empty: &str) -> String {
    if rows.is_empty() {
        return format!("{}\n", empty);
    }
    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("{}\n", table)
}

/// Shorten `s` to `max` characters, marking the cut with `...`
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer description", 10), "a longe...");
        assert_eq!(truncate("déjà vu déjà vu", 8), "déjà ...");
    }
}
