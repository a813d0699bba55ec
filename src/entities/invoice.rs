//! Invoice entity - The header row of a saved invoice.
//!
//! Holds the invoice number, customer details, pricing inputs and the derived
//! totals. Line items live in their own table and are removed with the header.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Invoice header database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    /// Store-generated identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable invoice number, unique across the store
    #[sea_orm(unique)]
    pub invoice_no: String,
    /// Date printed on the invoice
    pub invoice_date: Date,
    /// Customer display name
    pub customer_name: String,
    /// Customer email address
    pub customer_email: String,
    /// Customer phone number
    pub customer_phone: String,
    /// Free-form billing address, may span several lines
    pub billing_address: String,
    /// Sum of the rounded line totals before discount and tax
    pub subtotal: f64,
    /// Discount actually applied, already clamped into `[0, subtotal]`
    pub discount_amount: f64,
    /// Tax rate in percent
    pub tax_rate: f64,
    /// Tax charged on the taxable amount
    pub tax_amount: f64,
    /// Amount due
    pub total: f64,
    /// Free-text notes printed on the invoice
    pub notes: String,
    /// When the invoice was saved
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Invoice and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One invoice owns many line items
    #[sea_orm(has_many = "super::line_item::Entity")]
    LineItems,
}

impl Related<super::line_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
