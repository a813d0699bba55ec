//! Core business logic - framework-agnostic invoicing operations.
//!
//! Nothing in here knows about the console; every store operation takes the
//! database handle as an argument.

/// Printable HTML invoice rendering
pub mod document;
/// CSV export of the invoice listing
pub mod export;
/// Invoice persistence: save, list, fetch, number generation
pub mod invoice;
/// Subtotal, discount, tax and total computation
pub mod totals;

pub use invoice::{
    InvoiceDetail, InvoiceFilter, InvoiceSummary, NewInvoice, generate_invoice_number,
    get_invoice, list_invoices, require_invoice, save_invoice,
};
pub use totals::{LineItemInput, Totals, compute_totals, round2};
