//! Console command parsing.
//!
//! One line of input becomes one [`Command`]. Parsing never touches the draft or
//! the database, so malformed input is rejected before anything changes.

use crate::{
    console::draft::{DraftField, parse_amount, parse_date},
    core::invoice::InvoiceFilter,
    errors::{Error, Result},
};
use std::path::PathBuf;

/// Help text listing every command.
pub const HELP_TEXT: &str = "Invoicer commands\n\
    Draft\n\
    \x20 show                                   Show the draft invoice and its totals\n\
    \x20 set <field> <value>                    Fields: number, date, name, email, phone, address, notes, discount, tax\n\
    \x20 add <description> | <qty> | <price>    Add a line item\n\
    \x20 remove <index>                         Remove the line item at <index>\n\
    \x20 prefix <prefix>                        Change the prefix and generate a new invoice number\n\
    \x20 save                                   Save the draft as a new invoice\n\
    \x20 reset                                  Clear the line items and start a new invoice number\n\
    Saved invoices\n\
    \x20 list [from=YYYY-MM-DD] [to=YYYY-MM-DD] [text]             List invoices, newest first\n\
    \x20 export [out=PATH] [from=YYYY-MM-DD] [to=YYYY-MM-DD] [text] Export the listing as CSV\n\
    \x20 view <id>                              Show a saved invoice\n\
    \x20 html <id> [path]                       Write a printable HTML invoice\n\
    Other\n\
    \x20 help                                   Show this help\n\
    \x20 quit                                   Exit";

/// A parsed console command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Print the help text
    Help,
    /// Print the draft
    Show,
    /// Set a draft header field
    Set {
        /// Field to change
        field: DraftField,
        /// Raw value as typed
        value: String,
    },
    /// Append a line item to the draft
    Add {
        /// Item description
        description: String,
        /// Quantity
        quantity: f64,
        /// Unit price
        unit_price: f64,
    },
    /// Remove a draft line item by index
    Remove {
        /// 0-based item index
        index: usize,
    },
    /// Change the invoice number prefix
    Prefix {
        /// New prefix
        prefix: String,
    },
    /// Save the draft
    Save,
    /// Clear the draft items
    Reset,
    /// List saved invoices
    List {
        /// Listing criteria
        filter: InvoiceFilter,
    },
    /// Export the filtered listing as CSV
    Export {
        /// Destination file; the configured export directory when absent
        path: Option<PathBuf>,
        /// Listing criteria
        filter: InvoiceFilter,
    },
    /// Show a saved invoice
    View {
        /// Invoice id
        id: i64,
    },
    /// Write a saved invoice as HTML
    Html {
        /// Invoice id
        id: i64,
        /// Destination file; the configured export directory when absent
        path: Option<PathBuf>,
    },
    /// Leave the console
    Quit,
}

fn invalid(message: impl Into<String>) -> Error {
    Error::InvalidInput {
        message: message.into(),
    }
}

fn parse_id(value: &str) -> Result<i64> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(format!("'{}' is not an invoice id", value.trim())))
}

/// Splits `key=value` options out of `args`; the remaining words form the search text.
fn parse_listing_args(args: &str, allow_out: bool) -> Result<(InvoiceFilter, Option<PathBuf>)> {
    let mut filter = InvoiceFilter::default();
    let mut out = None;
    let mut words = Vec::new();

    for token in args.split_whitespace() {
        if let Some(value) = token.strip_prefix("from=") {
            filter.from = Some(parse_date(value)?);
        } else if let Some(value) = token.strip_prefix("to=") {
            filter.to = Some(parse_date(value)?);
        } else if let Some(value) = token.strip_prefix("out=").filter(|_| allow_out) {
            out = Some(PathBuf::from(value));
        } else {
            words.push(token);
        }
    }

    if !words.is_empty() {
        filter.text = Some(words.join(" "));
    }
    Ok((filter, out))
}

fn parse_add(args: &str) -> Result<Command> {
    let parts: Vec<&str> = args.split('|').map(str::trim).collect();
    let [description, quantity, unit_price] = parts.as_slice() else {
        return Err(invalid("Usage: add <description> | <qty> | <unit price>"));
    };
    Ok(Command::Add {
        description: (*description).to_string(),
        quantity: parse_amount(quantity)?,
        unit_price: parse_amount(unit_price)?,
    })
}

impl Command {
    /// Parses one input line. Blank lines yield `Ok(None)`.
    ///
    /// # Errors
    /// Returns `InvalidInput` (or `InvalidAmount` for negative numbers) when the
    /// command is unknown or its arguments are malformed.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (name, args) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(name, args)| (name, args.trim()));

        let command = match name.to_lowercase().as_str() {
            "help" | "?" => Self::Help,
            "show" | "draft" => Self::Show,
            "set" => {
                let (field, value) = args
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| invalid("Usage: set <field> <value>"))?;
                Self::Set {
                    field: field.parse()?,
                    value: value.trim().to_string(),
                }
            }
            "add" => parse_add(args)?,
            "remove" | "rm" => Self::Remove {
                index: args
                    .parse()
                    .map_err(|_| invalid("Usage: remove <index>"))?,
            },
            "prefix" => {
                if args.is_empty() {
                    return Err(invalid("Usage: prefix <prefix>"));
                }
                Self::Prefix {
                    prefix: args.to_string(),
                }
            }
            "save" => Self::Save,
            "reset" => Self::Reset,
            "list" | "ls" => Self::List {
                filter: parse_listing_args(args, false)?.0,
            },
            "export" => {
                let (filter, path) = parse_listing_args(args, true)?;
                Self::Export { path, filter }
            }
            "view" => Self::View {
                id: parse_id(args)?,
            },
            "html" => {
                let (id, path) = args
                    .split_once(char::is_whitespace)
                    .map_or((args, None), |(id, path)| {
                        (id, Some(PathBuf::from(path.trim())))
                    });
                Self::Html {
                    id: parse_id(id)?,
                    path,
                }
            }
            "quit" | "exit" => Self::Quit,
            other => {
                return Err(invalid(format!(
                    "Unknown command '{other}'. Type `help` for the list of commands."
                )));
            }
        };
        Ok(Some(command))
    }
}
