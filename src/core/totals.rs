//! Invoice totals - subtotal, discount, tax and total from a list of line items.
//!
//! Everything here is pure arithmetic with no validation: absent quantities or prices
//! count as zero, and negative inputs flow through unchanged. Callers that need
//! non-negative items check them before building the list.

use serde::{Deserialize, Serialize};

/// Bias added before rounding so values such as `1.005`, which are stored slightly
/// below the half-cent in binary, still round up. Historical invoices were computed
/// with this bias, so it must stay.
pub const ROUNDING_EPSILON: f64 = 0.000_000_1;

/// One billable entry as supplied by a caller, before it is stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItemInput {
    /// What is being billed
    pub description: String,
    /// Billed quantity; `None` counts as zero
    #[serde(default)]
    pub quantity: Option<f64>,
    /// Price per unit; `None` counts as zero
    #[serde(default)]
    pub unit_price: Option<f64>,
}

impl LineItemInput {
    /// Builds an item with both numeric fields present.
    #[must_use]
    pub fn new(description: impl Into<String>, quantity: f64, unit_price: f64) -> Self {
        Self {
            description: description.into(),
            quantity: Some(quantity),
            unit_price: Some(unit_price),
        }
    }

    /// Quantity, with an absent value read as zero.
    #[must_use]
    pub fn quantity_or_zero(&self) -> f64 {
        self.quantity.unwrap_or(0.0)
    }

    /// Unit price, with an absent value read as zero.
    #[must_use]
    pub fn unit_price_or_zero(&self) -> f64 {
        self.unit_price.unwrap_or(0.0)
    }

    /// `round2(quantity * unit_price)`
    #[must_use]
    pub fn line_total(&self) -> f64 {
        round2(self.quantity_or_zero() * self.unit_price_or_zero())
    }
}

/// Derived amounts of an invoice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    /// Rounded sum of `quantity * unit_price` over all items
    pub subtotal: f64,
    /// Discount actually applied, clamped into `[0, subtotal]`
    pub discount: f64,
    /// `subtotal - discount`, never negative
    pub taxable: f64,
    /// Rounded tax on the taxable amount
    pub tax_amount: f64,
    /// Rounded `taxable + tax_amount`
    pub total: f64,
}

/// Rounds to 2 decimal places, half away from zero, after adding [`ROUNDING_EPSILON`].
#[must_use]
pub fn round2(value: f64) -> f64 {
    ((value + ROUNDING_EPSILON) * 100.0).round() / 100.0
}

/// Computes the invoice totals for `items`.
///
/// The requested discount is silently clamped into `[0, subtotal]`, and the tax rate
/// is a percentage applied to the amount left after the discount.
#[must_use]
pub fn compute_totals(items: &[LineItemInput], discount_requested: f64, tax_rate: f64) -> Totals {
    let subtotal = round2(
        items
            .iter()
            .map(|item| item.quantity_or_zero() * item.unit_price_or_zero())
            .sum(),
    );
    let discount = round2(discount_requested.max(0.0).min(subtotal));
    let taxable = (subtotal - discount).max(0.0);
    let tax_amount = round2(taxable * tax_rate / 100.0);
    let total = round2(taxable + tax_amount);

    Totals {
        subtotal,
        discount,
        taxable,
        tax_amount,
        total,
    }
}
