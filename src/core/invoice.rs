//! Invoice store - Saves invoices atomically and reads them back.
//!
//! An invoice header and all of its line items are written in one database
//! transaction, so a failed save leaves nothing behind. Saved invoices are never
//! updated or deleted. The database handle is always passed in by the caller.

use crate::{
    core::totals::{LineItemInput, compute_totals},
    entities::{Invoice, LineItem, invoice, line_item},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{
    FromQueryResult, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait, prelude::*,
};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

/// Header fields of an invoice about to be saved.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    /// Unique human-readable number
    pub invoice_no: String,
    /// Date printed on the invoice
    pub invoice_date: NaiveDate,
    /// Customer display name
    pub customer_name: String,
    /// Customer email address
    pub customer_email: String,
    /// Customer phone number
    pub customer_phone: String,
    /// Free-form billing address
    pub billing_address: String,
    /// Free-text notes
    pub notes: String,
    /// Discount as entered; clamped into `[0, subtotal]` when saved
    pub discount_requested: f64,
    /// Tax rate in percent
    pub tax_rate: f64,
}

/// One row of the invoice listing, also the column set of the CSV export.
#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct InvoiceSummary {
    /// Invoice id
    pub id: i64,
    /// Invoice number
    pub invoice_no: String,
    /// Invoice date
    pub invoice_date: NaiveDate,
    /// Customer display name
    pub customer_name: String,
    /// Customer email address
    pub customer_email: String,
    /// Customer phone number
    pub customer_phone: String,
    /// Subtotal before discount and tax
    pub subtotal: f64,
    /// Applied discount
    pub discount_amount: f64,
    /// Tax rate in percent
    pub tax_rate: f64,
    /// Tax charged
    pub tax_amount: f64,
    /// Amount due
    pub total: f64,
    /// When the invoice was saved
    pub created_at: DateTimeUtc,
}

/// Criteria for [`list_invoices`]. Each field is optional and applied independently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceFilter {
    /// Case-insensitive substring of the number, customer name, email or phone
    pub text: Option<String>,
    /// Earliest invoice date, inclusive
    pub from: Option<NaiveDate>,
    /// Latest invoice date, inclusive
    pub to: Option<NaiveDate>,
}

/// A saved invoice together with its line items in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDetail {
    /// Header row
    pub invoice: invoice::Model,
    /// Line items, oldest first
    pub items: Vec<line_item::Model>,
}

/// Builds an invoice number of the form `PREFIX-YYYYMMDD-XXXXXX` for today's local date.
///
/// The 6 hex characters come from a random UUID. Collisions are not checked here;
/// the unique constraint on the store rejects them at save time.
#[must_use]
pub fn generate_invoice_number(prefix: &str) -> String {
    let today = chrono::Local::now().date_naive();
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format_invoice_number(prefix, today, &suffix[..6])
}

/// Formats an invoice number from its parts, upper-casing the suffix.
#[must_use]
pub fn format_invoice_number(prefix: &str, date: NaiveDate, suffix: &str) -> String {
    format!(
        "{}-{}-{}",
        prefix.trim(),
        date.format("%Y%m%d"),
        suffix.to_uppercase()
    )
}

fn ensure_finite(value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidAmount { amount: value })
    }
}

/// Saves an invoice header and its items in a single transaction.
///
/// Totals are computed from `items` with the requested discount and tax rate, and
/// text fields are trimmed. Returns the stored header; its `id` identifies the invoice.
///
/// # Errors
/// Returns an error if:
/// - `items` is empty (`EmptyItemList`, checked before the store is touched)
/// - the invoice number is blank (`InvalidInput`)
/// - an amount, quantity or price is NaN or infinite (`InvalidAmount`)
/// - the invoice number already exists (`DuplicateInvoiceNumber`)
/// - the database write fails
#[instrument(skip(db, header, items), fields(invoice_no = %header.invoice_no, item_count = items.len()))]
pub async fn save_invoice<C>(
    db: &C,
    header: &NewInvoice,
    items: &[LineItemInput],
) -> Result<invoice::Model>
where
    C: ConnectionTrait + TransactionTrait,
{
    if items.is_empty() {
        return Err(Error::EmptyItemList);
    }

    let invoice_no = header.invoice_no.trim();
    if invoice_no.is_empty() {
        return Err(Error::InvalidInput {
            message: "Invoice number cannot be empty".to_string(),
        });
    }

    ensure_finite(header.discount_requested)?;
    ensure_finite(header.tax_rate)?;
    for item in items {
        ensure_finite(item.quantity_or_zero())?;
        ensure_finite(item.unit_price_or_zero())?;
    }

    let totals = compute_totals(items, header.discount_requested, header.tax_rate);

    let txn = db.begin().await?;

    let model = invoice::ActiveModel {
        invoice_no: Set(invoice_no.to_string()),
        invoice_date: Set(header.invoice_date),
        customer_name: Set(header.customer_name.trim().to_string()),
        customer_email: Set(header.customer_email.trim().to_string()),
        customer_phone: Set(header.customer_phone.trim().to_string()),
        billing_address: Set(header.billing_address.trim().to_string()),
        subtotal: Set(totals.subtotal),
        discount_amount: Set(totals.discount),
        tax_rate: Set(header.tax_rate),
        tax_amount: Set(totals.tax_amount),
        total: Set(totals.total),
        notes: Set(header.notes.trim().to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let saved = match model.insert(&txn).await {
        Ok(saved) => saved,
        Err(e) => {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                warn!("Rejected duplicate invoice number");
                txn.rollback().await?;
                return Err(Error::DuplicateInvoiceNumber {
                    invoice_no: invoice_no.to_string(),
                });
            }
            return Err(e.into());
        }
    };

    let rows = items.iter().map(|item| line_item::ActiveModel {
        invoice_id: Set(saved.id),
        description: Set(item.description.trim().to_string()),
        quantity: Set(item.quantity_or_zero()),
        unit_price: Set(item.unit_price_or_zero()),
        line_total: Set(item.line_total()),
        ..Default::default()
    });
    if let Err(e) = LineItem::insert_many(rows).exec(&txn).await {
        warn!(error = %e, "Line item insert failed, rolling back");
        txn.rollback().await?;
        return Err(e.into());
    }

    txn.commit().await?;

    info!(invoice_id = saved.id, total = saved.total, "Invoice saved");
    Ok(saved)
}

impl InvoiceSummary {
    /// Whether any searchable column contains `needle`, which must already be lowercase.
    ///
    /// `SQLite`'s `lower()` and `LIKE` only fold ASCII, so matching happens here with
    /// full Unicode lowercasing instead.
    fn matches_text(&self, needle: &str) -> bool {
        [
            &self.invoice_no,
            &self.customer_name,
            &self.customer_email,
            &self.customer_phone,
        ]
        .into_iter()
        .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Lists invoice summaries matching `filter`, newest invoice date first and the
/// higher id first among invoices sharing a date.
pub async fn list_invoices<C>(db: &C, filter: &InvoiceFilter) -> Result<Vec<InvoiceSummary>>
where
    C: ConnectionTrait,
{
    let mut query = Invoice::find().select_only().columns([
        invoice::Column::Id,
        invoice::Column::InvoiceNo,
        invoice::Column::InvoiceDate,
        invoice::Column::CustomerName,
        invoice::Column::CustomerEmail,
        invoice::Column::CustomerPhone,
        invoice::Column::Subtotal,
        invoice::Column::DiscountAmount,
        invoice::Column::TaxRate,
        invoice::Column::TaxAmount,
        invoice::Column::Total,
        invoice::Column::CreatedAt,
    ]);

    if let Some(from) = filter.from {
        query = query.filter(invoice::Column::InvoiceDate.gte(from));
    }
    if let Some(to) = filter.to {
        query = query.filter(invoice::Column::InvoiceDate.lte(to));
    }

    let mut rows = query
        .order_by_desc(invoice::Column::InvoiceDate)
        .order_by_desc(invoice::Column::Id)
        .into_model::<InvoiceSummary>()
        .all(db)
        .await?;

    if let Some(needle) = filter
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
    {
        rows.retain(|row| row.matches_text(&needle));
    }

    debug!(count = rows.len(), ?filter, "Listed invoices");
    Ok(rows)
}

/// Fetches an invoice and its items, or `None` when no invoice has this id.
pub async fn get_invoice<C>(db: &C, invoice_id: i64) -> Result<Option<InvoiceDetail>>
where
    C: ConnectionTrait,
{
    let Some(invoice) = Invoice::find_by_id(invoice_id).one(db).await? else {
        return Ok(None);
    };

    let items = invoice
        .find_related(LineItem)
        .order_by_asc(line_item::Column::Id)
        .all(db)
        .await?;

    Ok(Some(InvoiceDetail { invoice, items }))
}

/// Like [`get_invoice`], but a missing invoice is an `InvoiceNotFound` error.
pub async fn require_invoice<C>(db: &C, invoice_id: i64) -> Result<InvoiceDetail>
where
    C: ConnectionTrait,
{
    get_invoice(db, invoice_id)
        .await?
        .ok_or(Error::InvoiceNotFound { id: invoice_id })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase, PaginatorTrait};

    #[tokio::test]
    async fn test_empty_item_list_rejected_before_store() -> Result<()> {
        // A mock with no prepared results fails on any query, so reaching the
        // store would surface as a database error instead.
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = save_invoice(&db, &sample_header("INV-EMPTY"), &[]).await;
        assert!(matches!(result.unwrap_err(), Error::EmptyItemList));
        assert!(db.into_transaction_log().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_save_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let items = sample_items();

        let result = save_invoice(&db, &sample_header("   "), &items).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidInput { message: _ }));

        let mut header = sample_header("INV-NAN");
        header.tax_rate = f64::NAN;
        let result = save_invoice(&db, &header, &items).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { amount: _ }));

        let bad_items = vec![LineItemInput::new("Broken", f64::INFINITY, 1.0)];
        let result = save_invoice(&db, &sample_header("INV-INF"), &bad_items).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { amount: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_save_computes_totals() -> Result<()> {
        let db = setup_test_db().await?;

        let saved = save_invoice(&db, &sample_header("INV-TOTALS"), &sample_items()).await?;

        assert_eq!(saved.subtotal, 25.0);
        assert_eq!(saved.discount_amount, 3.0);
        assert_eq!(saved.tax_rate, 10.0);
        assert_eq!(saved.tax_amount, 2.2);
        assert_eq!(saved.total, 24.2);
        Ok(())
    }

    #[tokio::test]
    async fn test_save_stores_applied_discount() -> Result<()> {
        let db = setup_test_db().await?;
        let mut header = sample_header("INV-CLAMP");
        header.discount_requested = 500.0;

        let saved = save_invoice(&db, &header, &sample_items()).await?;

        assert_eq!(saved.discount_amount, 25.0);
        assert_eq!(saved.tax_amount, 0.0);
        assert_eq!(saved.total, 0.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_get_returns_saved_fields_and_item_order() -> Result<()> {
        let db = setup_test_db().await?;
        let mut header = sample_header("INV-ROUNDTRIP");
        header.customer_name = "  Jane Doe  ".to_string();
        header.notes = "Net 30".to_string();
        let items = vec![
            LineItemInput::new("Zeta", 1.0, 1.0),
            LineItemInput::new("Alpha", 2.0, 2.5),
            LineItemInput::new("Mid", 3.0, 0.335),
        ];

        let saved = save_invoice(&db, &header, &items).await?;
        let detail = get_invoice(&db, saved.id).await?.unwrap();

        assert_eq!(detail.invoice, saved);
        assert_eq!(detail.invoice.invoice_no, "INV-ROUNDTRIP");
        assert_eq!(detail.invoice.invoice_date, header.invoice_date);
        assert_eq!(detail.invoice.customer_name, "Jane Doe");
        assert_eq!(detail.invoice.customer_email, header.customer_email);
        assert_eq!(detail.invoice.customer_phone, header.customer_phone);
        assert_eq!(detail.invoice.billing_address, header.billing_address);
        assert_eq!(detail.invoice.notes, "Net 30");

        let descriptions: Vec<&str> = detail.items.iter().map(|i| i.description.as_str()).collect();
        assert_eq!(descriptions, vec!["Zeta", "Alpha", "Mid"]);
        assert_eq!(detail.items[1].quantity, 2.0);
        assert_eq!(detail.items[1].unit_price, 2.5);
        assert_eq!(detail.items[1].line_total, 5.0);
        assert_eq!(detail.items[2].line_total, 1.01);
        assert!(detail.items.iter().all(|i| i.invoice_id == saved.id));
        Ok(())
    }

    #[tokio::test]
    async fn test_get_missing_invoice() -> Result<()> {
        let db = setup_test_db().await?;

        assert!(get_invoice(&db, 999).await?.is_none());
        let result = require_invoice(&db, 999).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvoiceNotFound { id: 999 }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_invoice_number_rejected_without_partial_write() -> Result<()> {
        let db = setup_test_db().await?;
        save_invoice(&db, &sample_header("INV-DUP"), &sample_items()).await?;

        let more_items = vec![
            LineItemInput::new("Extra", 1.0, 1.0),
            LineItemInput::new("Another", 1.0, 2.0),
            LineItemInput::new("Third", 1.0, 3.0),
        ];
        let result = save_invoice(&db, &sample_header("INV-DUP"), &more_items).await;

        match result.unwrap_err() {
            Error::DuplicateInvoiceNumber { invoice_no } => assert_eq!(invoice_no, "INV-DUP"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(Invoice::find().count(&db).await?, 1);
        assert_eq!(LineItem::find().count(&db).await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_orders_by_date_then_id_descending() -> Result<()> {
        let db = setup_test_db().await?;
        let first = save_dated(&db, "INV-A", "2024-03-01").await?;
        let second = save_dated(&db, "INV-B", "2024-05-10").await?;
        let third = save_dated(&db, "INV-C", "2024-03-01").await?;

        let rows = list_invoices(&db, &InvoiceFilter::default()).await?;
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();

        assert_eq!(ids, vec![second.id, third.id, first.id]);
        assert_eq!(rows[0].invoice_no, "INV-B");
        assert_eq!(rows[0].total, second.total);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_text_filter_is_case_insensitive() -> Result<()> {
        let db = setup_test_db().await?;
        let mut header = sample_header("INV-JOHN");
        header.customer_name = "Someone".to_string();
        header.customer_email = "JOHN@x.com".to_string();
        header.customer_phone = String::new();
        save_invoice(&db, &header, &sample_items()).await?;

        let mut other = sample_header("INV-OTHER");
        other.customer_name = "Mary".to_string();
        other.customer_email = "mary@y.org".to_string();
        other.customer_phone = "555-0100".to_string();
        save_invoice(&db, &other, &sample_items()).await?;

        let filter = InvoiceFilter {
            text: Some("john".to_string()),
            ..Default::default()
        };
        let rows = list_invoices(&db, &filter).await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].customer_email, "JOHN@x.com");

        let by_phone = InvoiceFilter {
            text: Some("0100".to_string()),
            ..Default::default()
        };
        let rows = list_invoices(&db, &by_phone).await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].invoice_no, "INV-OTHER");

        let by_number = InvoiceFilter {
            text: Some("inv-".to_string()),
            ..Default::default()
        };
        assert_eq!(list_invoices(&db, &by_number).await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_text_filter_treats_wildcards_literally() -> Result<()> {
        let db = setup_test_db().await?;
        save_invoice(&db, &sample_header("INV-PLAIN"), &sample_items()).await?;

        for text in ["%", "_", "INV_PLAIN"] {
            let filter = InvoiceFilter {
                text: Some(text.to_string()),
                ..Default::default()
            };
            assert!(list_invoices(&db, &filter).await?.is_empty(), "{text} matched");
        }

        let blank = InvoiceFilter {
            text: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(list_invoices(&db, &blank).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_text_filter_folds_non_ascii_case() -> Result<()> {
        let db = setup_test_db().await?;
        let mut header = sample_header("INV-ZOLA");
        header.customer_name = "ÉMILE Zola".to_string();
        save_invoice(&db, &header, &sample_items()).await?;
        save_invoice(&db, &sample_header("INV-ACME"), &sample_items()).await?;

        for text in ["ÉMILE", "émile", "Émile", "zola", "émile zola"] {
            let filter = InvoiceFilter {
                text: Some(text.to_string()),
                ..Default::default()
            };
            let rows = list_invoices(&db, &filter).await?;
            assert_eq!(rows.len(), 1, "{text} should match one invoice");
            assert_eq!(rows[0].invoice_no, "INV-ZOLA");
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_list_text_and_date_filters_combine() -> Result<()> {
        let db = setup_test_db().await?;
        save_dated(&db, "INV-OLD", "2023-12-31").await?;
        save_dated(&db, "INV-NEW", "2024-01-02").await?;

        let filter = InvoiceFilter {
            text: Some("acme".to_string()),
            from: Some(date("2024-01-01")),
            ..Default::default()
        };
        let numbers: Vec<String> = list_invoices(&db, &filter)
            .await?
            .into_iter()
            .map(|r| r.invoice_no)
            .collect();
        assert_eq!(numbers, vec!["INV-NEW"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_item_insert_leaves_no_header() -> Result<()> {
        let db = setup_test_db().await?;
        save_invoice(&db, &sample_header("INV-FIRST"), &sample_items()).await?;

        // The header insert succeeds, then writing the items fails.
        db.execute_unprepared("DROP TABLE line_items").await?;
        let result = save_invoice(&db, &sample_header("INV-ORPHAN"), &sample_items()).await;

        assert!(matches!(result.unwrap_err(), Error::Database(_)));
        assert_eq!(Invoice::find().count(&db).await?, 1);
        let orphan = Invoice::find()
            .filter(invoice::Column::InvoiceNo.eq("INV-ORPHAN"))
            .one(&db)
            .await?;
        assert!(orphan.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_list_date_bounds_are_inclusive() -> Result<()> {
        let db = setup_test_db().await?;
        save_dated(&db, "INV-JAN", "2024-01-15").await?;
        save_dated(&db, "INV-FEB", "2024-02-01").await?;
        save_dated(&db, "INV-MAR", "2024-03-31").await?;

        let both = InvoiceFilter {
            from: Some(date("2024-02-01")),
            to: Some(date("2024-03-31")),
            ..Default::default()
        };
        let numbers: Vec<String> = list_invoices(&db, &both)
            .await?
            .into_iter()
            .map(|r| r.invoice_no)
            .collect();
        assert_eq!(numbers, vec!["INV-MAR", "INV-FEB"]);

        let from_only = InvoiceFilter {
            from: Some(date("2024-03-31")),
            ..Default::default()
        };
        assert_eq!(list_invoices(&db, &from_only).await?.len(), 1);

        let to_only = InvoiceFilter {
            to: Some(date("2024-01-15")),
            ..Default::default()
        };
        assert_eq!(list_invoices(&db, &to_only).await?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_generate_invoice_number_format() {
        let number = generate_invoice_number("INV");
        let parts: Vec<&str> = number.split('-').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "INV");
        assert_eq!(parts[1].len(), 8);
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 6);
        assert!(
            parts[2]
                .chars()
                .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
        );
    }

    #[test]
    fn test_format_invoice_number() {
        assert_eq!(
            format_invoice_number("ACME", date("2024-07-04"), "a1b2c3"),
            "ACME-20240704-A1B2C3"
        );
    }
}
