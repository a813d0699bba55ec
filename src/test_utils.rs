//! Shared test utilities.
//!
//! Helpers for setting up an in-memory database and building invoices with
//! sensible defaults.

use crate::{
    config::database::create_tables,
    core::{
        invoice::{NewInvoice, save_invoice},
        totals::LineItemInput,
    },
    entities,
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    create_tables(&db).await?;
    Ok(db)
}

/// Parses a `YYYY-MM-DD` literal.
///
/// # Panics
/// Panics on a malformed date; only used with literals in tests.
#[allow(clippy::expect_used)]
pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("test date literal")
}

/// Creates an invoice header with sensible defaults.
///
/// # Defaults
/// * `invoice_date`: 2024-06-01
/// * customer: "Acme Corp", `billing@example.com`, "555-1234"
/// * `discount_requested`: 3.0
/// * `tax_rate`: 10.0
pub fn sample_header(invoice_no: &str) -> NewInvoice {
    NewInvoice {
        invoice_no: invoice_no.to_string(),
        invoice_date: date("2024-06-01"),
        customer_name: "Acme Corp".to_string(),
        customer_email: "billing@example.com".to_string(),
        customer_phone: "555-1234".to_string(),
        billing_address: "1 Main Street\nSpringfield".to_string(),
        notes: String::new(),
        discount_requested: 3.0,
        tax_rate: 10.0,
    }
}

/// Two items worth 25.00 in total: 2 x 10.00 and 1 x 5.00.
pub fn sample_items() -> Vec<LineItemInput> {
    vec![
        LineItemInput::new("Widget", 2.0, 10.0),
        LineItemInput::new("Gadget", 1.0, 5.0),
    ]
}

/// Saves an invoice with the sample items, dated `invoice_date`.
pub async fn save_dated(
    db: &DatabaseConnection,
    invoice_no: &str,
    invoice_date: &str,
) -> Result<entities::invoice::Model> {
    let mut header = sample_header(invoice_no);
    header.invoice_date = date(invoice_date);
    save_invoice(db, &header, &sample_items()).await
}
