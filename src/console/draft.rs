//! Draft invoice - the in-progress invoice held between console commands.
//!
//! The draft owns the mutable item list. The store never sees it directly: on
//! save the console hands over an immutable snapshot via [`DraftInvoice::to_new_invoice`]
//! and [`DraftInvoice::items`].

use crate::{
    core::{
        invoice::{NewInvoice, generate_invoice_number},
        totals::{LineItemInput, Totals, compute_totals},
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use std::{fmt, str::FromStr};

/// Header fields that can be edited with `set <field> <value>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    /// Invoice number
    Number,
    /// Invoice date, `YYYY-MM-DD`
    Date,
    /// Customer name
    Name,
    /// Customer email
    Email,
    /// Customer phone
    Phone,
    /// Billing address; `\n` starts a new line
    Address,
    /// Notes; `\n` starts a new line
    Notes,
    /// Requested discount amount
    Discount,
    /// Tax rate in percent
    Tax,
}

impl DraftField {
    /// Every field, in the order they are shown.
    pub const ALL: [Self; 9] = [
        Self::Number,
        Self::Date,
        Self::Name,
        Self::Email,
        Self::Phone,
        Self::Address,
        Self::Notes,
        Self::Discount,
        Self::Tax,
    ];

    /// Keyword used on the command line.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Date => "date",
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Address => "address",
            Self::Notes => "notes",
            Self::Discount => "discount",
            Self::Tax => "tax",
        }
    }
}

impl FromStr for DraftField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let keyword = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|field| field.keyword() == keyword)
            .ok_or_else(|| Error::InvalidInput {
                message: format!(
                    "Unknown field '{s}'. Expected one of: {}",
                    Self::ALL.map(Self::keyword).join(", ")
                ),
            })
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Parses a non-negative, finite number typed by the user.
pub fn parse_amount(value: &str) -> Result<f64> {
    let amount: f64 = value.trim().parse().map_err(|_| Error::InvalidInput {
        message: format!("'{}' is not a number", value.trim()),
    })?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(amount)
}

/// Parses a `YYYY-MM-DD` date typed by the user.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| Error::InvalidInput {
        message: format!("'{}' is not a date (expected YYYY-MM-DD)", value.trim()),
    })
}

/// The invoice being composed in the console session.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftInvoice {
    prefix: String,
    invoice_no: String,
    invoice_date: NaiveDate,
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    billing_address: String,
    notes: String,
    discount: f64,
    tax_rate: f64,
    items: Vec<LineItemInput>,
}

impl DraftInvoice {
    /// Starts an empty draft dated today with a freshly generated number.
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.trim().to_string(),
            invoice_no: generate_invoice_number(prefix),
            invoice_date: chrono::Local::now().date_naive(),
            customer_name: String::new(),
            customer_email: String::new(),
            customer_phone: String::new(),
            billing_address: String::new(),
            notes: String::new(),
            discount: 0.0,
            tax_rate: 0.0,
            items: Vec::new(),
        }
    }

    /// Prefix used for generated invoice numbers.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Current invoice number.
    #[must_use]
    pub fn invoice_no(&self) -> &str {
        &self.invoice_no
    }

    /// Items added so far, in the order they were added.
    #[must_use]
    pub fn items(&self) -> &[LineItemInput] {
        &self.items
    }

    /// Changes the prefix and generates a new invoice number with it.
    pub fn set_prefix(&mut self, prefix: &str) -> Result<()> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Err(Error::InvalidInput {
                message: "Invoice prefix cannot be empty".to_string(),
            });
        }
        self.prefix = prefix.to_string();
        self.invoice_no = generate_invoice_number(prefix);
        Ok(())
    }

    /// Sets one header field from user text.
    pub fn set_field(&mut self, field: DraftField, value: &str) -> Result<()> {
        let text = value.trim().replace("\\n", "\n");
        match field {
            DraftField::Number => {
                if text.is_empty() {
                    return Err(Error::InvalidInput {
                        message: "Invoice number cannot be empty".to_string(),
                    });
                }
                self.invoice_no = text;
            }
            DraftField::Date => self.invoice_date = parse_date(value)?,
            DraftField::Name => self.customer_name = text,
            DraftField::Email => self.customer_email = text,
            DraftField::Phone => self.customer_phone = text,
            DraftField::Address => self.billing_address = text,
            DraftField::Notes => self.notes = text,
            DraftField::Discount => self.discount = parse_amount(value)?,
            DraftField::Tax => self.tax_rate = parse_amount(value)?,
        }
        Ok(())
    }

    /// Appends an item. Quantity and unit price must be non-negative and finite; the
    /// description may be blank.
    pub fn add_item(&mut self, description: &str, quantity: f64, unit_price: f64) -> Result<()> {
        let description = description.trim();
        for amount in [quantity, unit_price] {
            if !amount.is_finite() || amount < 0.0 {
                return Err(Error::InvalidAmount { amount });
            }
        }

        self.items
            .push(LineItemInput::new(description, quantity, unit_price));
        Ok(())
    }

    /// Removes and returns the item at `index` (0-based).
    pub fn remove_item(&mut self, index: usize) -> Result<LineItemInput> {
        if index >= self.items.len() {
            return Err(Error::InvalidInput {
                message: format!(
                    "No item at index {index} (the draft has {} items)",
                    self.items.len()
                ),
            });
        }
        Ok(self.items.remove(index))
    }

    /// Live totals preview for the current items and pricing inputs.
    #[must_use]
    pub fn totals(&self) -> Totals {
        compute_totals(&self.items, self.discount, self.tax_rate)
    }

    /// Snapshot of the header fields for saving.
    #[must_use]
    pub fn to_new_invoice(&self) -> NewInvoice {
        NewInvoice {
            invoice_no: self.invoice_no.clone(),
            invoice_date: self.invoice_date,
            customer_name: self.customer_name.clone(),
            customer_email: self.customer_email.clone(),
            customer_phone: self.customer_phone.clone(),
            billing_address: self.billing_address.clone(),
            notes: self.notes.clone(),
            discount_requested: self.discount,
            tax_rate: self.tax_rate,
        }
    }

    /// Clears the items and generates a fresh invoice number, keeping the customer
    /// and pricing fields for the next invoice.
    pub fn reset(&mut self) {
        self.items.clear();
        self.invoice_no = generate_invoice_number(&self.prefix);
    }

    /// Human-readable summary of the draft with its totals preview.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut lines = vec![
            format!("Invoice No: {}", self.invoice_no),
            format!("Date: {}", self.invoice_date.format("%Y-%m-%d")),
            format!(
                "Customer: {} | {} | {}",
                self.customer_name, self.customer_email, self.customer_phone
            ),
        ];
        if !self.billing_address.is_empty() {
            lines.push(format!("Address: {}", self.billing_address.replace('\n', ", ")));
        }
        if !self.notes.is_empty() {
            lines.push(format!("Notes: {}", self.notes.replace('\n', " ")));
        }

        if self.items.is_empty() {
            lines.push("No line items yet. Use `add <description> | <qty> | <unit price>`.".to_string());
        } else {
            lines.push("Items:".to_string());
            for (index, item) in self.items.iter().enumerate() {
                lines.push(format!(
                    "  [{index}] {} - {:.2} x {:.2} = {:.2}",
                    item.description,
                    item.quantity_or_zero(),
                    item.unit_price_or_zero(),
                    item.line_total()
                ));
            }
        }

        let totals = self.totals();
        lines.push(format!(
            "Subtotal: {:.2} | Discount: {:.2} | Tax: {:.2} ({:.2}%) | Total: {:.2}",
            totals.subtotal, totals.discount, totals.tax_amount, self.tax_rate, totals.total
        ));
        lines.join("\n")
    }
}
