//! Client, product and user display formatting

use tabled::Tabled;

use crate::models::{Client, Entity, Product, User};

use super::{render_table, truncate};

#[derive(Tabled)]
struct ClientRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Company")]
    company: String,
    #[tabled(rename = "Contact")]
    contact: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Status")]
    status: &'static str,
}

#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "SKU")]
    sku: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Status")]
    status: &'static str,
}

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Admin")]
    admin: &'static str,
    #[tabled(rename = "2FA")]
    two_factor: &'static str,
}

fn status<E: Entity>(entity: &E) -> &'static str {
    if entity.is_trashed() {
        "deleted"
    } else {
        "active"
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

pub fn format_client_list(clients: &[Client]) -> String {
    let rows = clients
        .iter()
        .map(|c| ClientRow {
            id: c.id.to_string(),
            company: truncate(&c.company, 30),
            contact: c.contact_name.clone(),
            email: c.email.clone(),
            status: status(c),
        })
        .collect();
    render_table(rows, "No clients found.")
}

/// Format a single client's details
pub fn format_client_details(client: &Client) -> String {
    let mut output = String::new();

    output.push_str(&format!("Client: {}\n", client.company));
    output.push_str(&format!("  ID:       {}\n", client.id));
    output.push_str(&format!("  Email:    {}\n", client.email));
    if !client.contact_name.is_empty() {
        output.push_str(&format!("  Contact:  {}\n", client.contact_name));
    }
    if let Some(phone) = &client.phone {
        output.push_str(&format!("  Phone:    {}\n", phone));
    }
    if let Some(address) = &client.address {
        output.push_str(&format!("  Address:  {}\n", address));
    }
    if !client.notes.is_empty() {
        output.push_str(&format!("  Notes:    {}\n", client.notes));
    }
    output.push_str(&format!(
        "  Created:  {}\n",
        client.created_at.format("%Y-%m-%d %H:%M")
    ));
    if let Some(deleted_at) = client.deleted_at {
        output.push_str(&format!("  Deleted:  {}\n", deleted_at.format("%Y-%m-%d %H:%M")));
    }

    output
}

pub fn format_product_list(products: &[Product], currency: &str) -> String {
    let rows = products
        .iter()
        .map(|p| ProductRow {
            sku: p.sku.clone(),
            name: truncate(&p.name, 40),
            price: format!("{}{}", currency, p.unit_price),
            status: if p.is_trashed() {
                "deleted"
            } else if p.active {
                "active"
            } else {
                "inactive"
            },
        })
        .collect();
    render_table(rows, "No products found.")
}

/// User list; credentials are never shown
pub fn format_user_list(users: &[User]) -> String {
    let rows = users
        .iter()
        .map(|u| UserRow {
            id: u.id.to_string(),
            name: u.name.clone(),
            email: u.email.clone(),
            admin: yes_no(u.is_admin),
            two_factor: yes_no(u.two_factor_secret.is_some()),
        })
        .collect();
    render_table(rows, "No users found.")
}

pub fn format_user_details(user: &User) -> String {
    let mut output = String::new();

    output.push_str(&format!("User: {}\n", user.name));
    output.push_str(&format!("  ID:          {}\n", user.id));
    output.push_str(&format!("  Email:       {}\n", user.email));
    output.push_str(&format!("  Admin:       {}\n", yes_no(user.is_admin)));
    output.push_str(&format!(
        "  Two-factor:  {}\n",
        if user.two_factor_secret.is_some() {
            format!(
                "enabled ({} recovery codes)",
                user.two_factor_recovery_codes.len()
            )
        } else {
            "disabled".to_string()
        }
    ));
    if user.is_trashed() {
        output.push_str("  Status:      deleted\n");
    }

    output
}
