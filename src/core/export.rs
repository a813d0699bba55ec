//! CSV export of the invoice listing.
//!
//! The columns are exactly those of [`InvoiceSummary`], in listing order, so an
//! exported file matches what the listing shows for the same filter.

use crate::{core::invoice::InvoiceSummary, errors::Result};
use std::{fs, io::Write, path::Path};
use tracing::info;

/// File name used when an export path is not given.
pub const DEFAULT_EXPORT_FILE_NAME: &str = "invoices_export.csv";

/// Writes `rows` as CSV with a header row to `writer`.
///
/// # Errors
/// Returns an error if serialization or the underlying write fails.
pub fn write_invoices_csv<W: Write>(writer: W, rows: &[InvoiceSummary]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

/// Writes `rows` to a CSV file at `path`, creating parent directories as needed.
///
/// # Errors
/// Returns an error if the file cannot be created or written.
pub fn export_invoices_csv(path: &Path, rows: &[InvoiceSummary]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::File::create(path)?;
    write_invoices_csv(file, rows)?;
    info!(count = rows.len(), ?path, "Exported invoice listing");
    Ok(())
}
