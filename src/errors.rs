//! Unified error types for the invoicing core and console.

use thiserror::Error;

/// Every failure the invoicing system can report.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// Underlying database failure (disk, connectivity, SQL)
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// An invoice with this number is already stored
    #[error("Invoice number '{invoice_no}' already exists")]
    DuplicateInvoiceNumber {
        /// The rejected invoice number
        invoice_no: String,
    },

    /// Save attempted without any line items
    #[error("An invoice needs at least one line item")]
    EmptyItemList,

    /// No invoice exists with the requested id
    #[error("Invoice {id} not found")]
    InvoiceNotFound {
        /// The requested invoice id
        id: i64,
    },

    /// A monetary amount or quantity is not usable
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected value
        amount: f64,
    },

    /// A text input is missing or malformed
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Human-readable description of the problem
        message: String,
    },

    /// File system failure while reading input or writing exports
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
