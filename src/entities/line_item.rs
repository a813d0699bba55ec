//! Line item entity - One billable entry of a saved invoice.
//!
//! Rows are written together with their `invoice_id` header and deleted with it
//! (`ON DELETE CASCADE`). Insertion order is the display order.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Line item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "line_items")]
pub struct Model {
    /// Store-generated identifier, increasing in insertion order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the invoice this item belongs to
    pub invoice_id: i64,
    /// What was billed
    pub description: String,
    /// Billed quantity
    pub quantity: f64,
    /// Price per unit
    pub unit_price: f64,
    /// `round2(quantity * unit_price)`
    pub line_total: f64,
}

/// Defines relationships between `LineItem` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line item belongs to one invoice
    #[sea_orm(
        belongs_to = "super::invoice::Entity",
        from = "Column::InvoiceId",
        to = "super::invoice::Column::Id",
        on_delete = "Cascade"
    )]
    Invoice,
}

impl Related<super::invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoice.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
