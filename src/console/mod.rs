//! Console layer - line-oriented front end for the invoicing core.
//!
//! The console owns the session state (the [`DraftInvoice`]) and the database
//! handle, turns each input line into a [`Command`], and reports results as text.
//! Expected outcomes such as a duplicate invoice number or a missing invoice are
//! answered with a message; anything else is returned as an error so the loop can
//! log it and carry on.

/// Command parsing
pub mod commands;
/// Draft invoice session state
pub mod draft;

pub use commands::{Command, HELP_TEXT};
pub use draft::{DraftField, DraftInvoice};

use crate::{
    config::AppConfig,
    core::{
        document::{invoice_html_file_name, render_invoice_html},
        export::{DEFAULT_EXPORT_FILE_NAME, export_invoices_csv},
        invoice::{InvoiceFilter, InvoiceSummary, get_invoice, list_invoices, save_invoice},
    },
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{error, info};

/// Outcome of executing one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Text to show the user
    Message(String),
    /// The user asked to leave
    Quit,
}

impl Reply {
    fn message(text: impl Into<String>) -> Self {
        Self::Message(text.into())
    }
}

/// An interactive invoicing session.
pub struct Console {
    db: DatabaseConnection,
    config: AppConfig,
    draft: DraftInvoice,
}

fn format_listing(rows: &[InvoiceSummary]) -> String {
    if rows.is_empty() {
        return "No invoices match.".to_string();
    }
    let mut lines = vec![format!(
        "{:>5}  {:<22}  {:<10}  {:<24}  {:>12}",
        "ID", "Invoice No", "Date", "Customer", "Total"
    )];
    lines.extend(rows.iter().map(|row| {
        format!(
            "{:>5}  {:<22}  {:<10}  {:<24}  {:>12.2}",
            row.id,
            row.invoice_no,
            row.invoice_date.format("%Y-%m-%d"),
            row.customer_name,
            row.total
        )
    }));
    lines.push(format!("{} invoice(s)", rows.len()));
    lines.join("\n")
}

impl Console {
    /// Starts a session with an empty draft.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Self {
        let draft = DraftInvoice::new(&config.invoice_prefix);
        Self { db, config, draft }
    }

    /// The invoice currently being composed.
    #[must_use]
    pub const fn draft(&self) -> &DraftInvoice {
        &self.draft
    }

    fn export_path(&self, requested: Option<PathBuf>, default_name: String) -> PathBuf {
        requested.unwrap_or_else(|| self.config.export_dir.join(default_name))
    }

    async fn save(&mut self) -> Result<Reply> {
        let header = self.draft.to_new_invoice();
        match save_invoice(&self.db, &header, self.draft.items()).await {
            Ok(saved) => {
                self.draft.reset();
                Ok(Reply::message(format!(
                    "✅ Saved invoice #{} (ID {}). Total {:.2}. Next invoice number: {}",
                    saved.invoice_no,
                    saved.id,
                    saved.total,
                    self.draft.invoice_no()
                )))
            }
            Err(Error::DuplicateInvoiceNumber { invoice_no }) => Ok(Reply::message(format!(
                "❌ Invoice number '{invoice_no}' already exists. Change it with `set number <value>` and save again."
            ))),
            Err(Error::EmptyItemList) => Ok(Reply::message(
                "❌ Add at least one line item before saving.",
            )),
            Err(e) => Err(e),
        }
    }

    async fn list(&self, filter: &InvoiceFilter) -> Result<Reply> {
        let rows = list_invoices(&self.db, filter).await?;
        Ok(Reply::message(format_listing(&rows)))
    }

    async fn export(&self, path: Option<PathBuf>, filter: &InvoiceFilter) -> Result<Reply> {
        let rows = list_invoices(&self.db, filter).await?;
        if rows.is_empty() {
            return Ok(Reply::message("ℹ️ No invoices match, nothing exported."));
        }
        let path = self.export_path(path, DEFAULT_EXPORT_FILE_NAME.to_string());
        export_invoices_csv(&path, &rows)?;
        Ok(Reply::message(format!(
            "⬇️ Exported {} invoice(s) to {}",
            rows.len(),
            path.display()
        )))
    }

    async fn view(&self, id: i64) -> Result<Reply> {
        let Some(detail) = get_invoice(&self.db, id).await? else {
            return Ok(Reply::message("ℹ️ Invoice not found."));
        };

        let invoice = &detail.invoice;
        let mut lines = vec![
            format!("Invoice No: {}", invoice.invoice_no),
            format!("Date: {}", invoice.invoice_date.format("%Y-%m-%d")),
            format!("Customer: {}", invoice.customer_name),
        ];
        lines.extend(detail.items.iter().map(|item| {
            format!(
                "  {} - {:.2} x {:.2} = {:.2}",
                item.description, item.quantity, item.unit_price, item.line_total
            )
        }));
        lines.push(format!(
            "Subtotal: {:.2} | Discount: {:.2} | Tax: {:.2} ({:.2}%) | Total: {:.2}",
            invoice.subtotal,
            invoice.discount_amount,
            invoice.tax_amount,
            invoice.tax_rate,
            invoice.total
        ));
        Ok(Reply::message(lines.join("\n")))
    }

    async fn html(&self, id: i64, path: Option<PathBuf>) -> Result<Reply> {
        let Some(detail) = get_invoice(&self.db, id).await? else {
            return Ok(Reply::message("ℹ️ Invoice not found."));
        };

        let html = render_invoice_html(&detail, &self.config.company);
        let path = self.export_path(path, invoice_html_file_name(&detail.invoice));
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, html)?;
        info!(invoice_id = id, ?path, "Wrote HTML invoice");
        Ok(Reply::message(format!(
            "⬇️ Wrote invoice {} to {}",
            detail.invoice.invoice_no,
            path.display()
        )))
    }

    /// Executes one command against the session.
    ///
    /// # Errors
    /// Returns validation errors from the draft and any storage or I/O failure.
    /// Duplicate numbers, empty drafts and missing invoices are answered with a
    /// message instead.
    pub async fn execute(&mut self, command: Command) -> Result<Reply> {
        match command {
            Command::Help => Ok(Reply::message(HELP_TEXT)),
            Command::Show => Ok(Reply::message(self.draft.describe())),
            Command::Set { field, value } => {
                self.draft.set_field(field, &value)?;
                Ok(Reply::message(format!("✅ Updated {field}.")))
            }
            Command::Add {
                description,
                quantity,
                unit_price,
            } => {
                self.draft.add_item(&description, quantity, unit_price)?;
                let totals = self.draft.totals();
                Ok(Reply::message(format!(
                    "✅ Added '{}'. {} item(s), total {:.2}",
                    description.trim(),
                    self.draft.items().len(),
                    totals.total
                )))
            }
            Command::Remove { index } => {
                let removed = self.draft.remove_item(index)?;
                Ok(Reply::message(format!("✅ Removed '{}'.", removed.description)))
            }
            Command::Prefix { prefix } => {
                self.draft.set_prefix(&prefix)?;
                Ok(Reply::message(format!(
                    "✅ New invoice number: {}",
                    self.draft.invoice_no()
                )))
            }
            Command::Save => self.save().await,
            Command::Reset => {
                self.draft.reset();
                Ok(Reply::message(format!(
                    "🧹 Draft cleared. New invoice number: {}",
                    self.draft.invoice_no()
                )))
            }
            Command::List { filter } => self.list(&filter).await,
            Command::Export { path, filter } => self.export(path, &filter).await,
            Command::View { id } => self.view(id).await,
            Command::Html { id, path } => self.html(id, path).await,
            Command::Quit => Ok(Reply::Quit),
        }
    }

    /// Reads commands from `reader` until end of input or `quit`, writing replies
    /// to `writer`. A failed command is reported and the session continues.
    ///
    /// # Errors
    /// Returns an error only if reading input or writing output fails.
    pub async fn run<R, W>(&mut self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        writer
            .write_all(format!("Invoicer ready. Draft invoice {}. Type `help` for commands.\n", self.draft.invoice_no()).as_bytes())
            .await?;

        while let Some(line) = lines.next_line().await? {
            let reply = match Command::parse(&line) {
                Ok(None) => continue,
                Ok(Some(command)) => self.execute(command).await,
                Err(e) => Err(e),
            };

            let text = match reply {
                Ok(Reply::Quit) => break,
                Ok(Reply::Message(text)) => text,
                Err(e @ (Error::InvalidInput { .. } | Error::InvalidAmount { .. })) => {
                    format!("❌ {e}")
                }
                Err(e) => {
                    error!("Command failed: {}", e);
                    format!("❌ {e}. Please try again.")
                }
            };
            writer.write_all(text.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }

        writer.flush().await?;
        Ok(())
    }
}
