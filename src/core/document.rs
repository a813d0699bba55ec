//! Printable HTML invoice.
//!
//! The output is a single self-contained document with inline styles, suitable for
//! saving to disk and printing from a browser. All user-supplied text is escaped.

use crate::{
    config::CompanyConfig,
    core::invoice::InvoiceDetail,
    entities::{invoice, line_item},
};

const STYLES: &str = "<style>
body { font-family: Arial, sans-serif; margin: 24px; }
.header { display:flex; justify-content: space-between; align-items: flex-start; }
.brand { font-size: 20px; font-weight: bold; }
.muted { color:#666; }
table { border-collapse: collapse; width: 100%; margin-top: 16px; }
th, td { border: 1px solid #ddd; padding: 8px; }
th { text-align:left; background: #f7f7f7; }
.right { text-align: right; }
.totals { width: 320px; margin-left: auto; }
.footer { margin-top: 24px; font-size: 12px; color:#666; }
.caps { text-transform: uppercase; letter-spacing: .06em; font-size: 12px; }
.title { font-size: 24px; font-weight: 700; }
.grid { display:grid; grid-template-columns: 1fr 1fr; gap: 12px; margin-top: 12px; }
pre { white-space: pre-wrap; }
</style>";

/// Escapes the five HTML-significant characters.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// File name for a rendered invoice, e.g. `INV-20240601-A1B2C3.html`.
#[must_use]
pub fn invoice_html_file_name(invoice: &invoice::Model) -> String {
    let safe: String = invoice
        .invoice_no
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{safe}.html")
}

fn item_row(item: &line_item::Model) -> String {
    format!(
        "<tr><td>{}</td><td class=right>{:.2}</td><td class=right>{:.2}</td><td class=right>{:.2}</td></tr>",
        escape_html(&item.description),
        item.quantity,
        item.unit_price,
        item.line_total
    )
}

/// Renders `detail` as a complete HTML document branded with `company`.
#[must_use]
pub fn render_invoice_html(detail: &InvoiceDetail, company: &CompanyConfig) -> String {
    let invoice = &detail.invoice;
    let mut out = String::with_capacity(4096);

    out.push_str("<!doctype html>\n<html><head><meta charset='utf-8'>");
    out.push_str(&format!(
        "<title>Invoice {}</title>",
        escape_html(&invoice.invoice_no)
    ));
    out.push_str(STYLES);
    out.push_str("</head>\n<body>\n");

    // Header block
    out.push_str("<div class=header><div><div class=title>Invoice</div>");
    out.push_str(&format!(
        "<div class=muted>Invoice No: <strong>{}</strong></div>\
         <div class=muted>Date: <strong>{}</strong></div></div>",
        escape_html(&invoice.invoice_no),
        invoice.invoice_date.format("%Y-%m-%d")
    ));
    out.push_str("<div class=brand>");
    out.push_str(&escape_html(&company.name));
    if !company.address_lines.is_empty() {
        let lines: Vec<String> = company
            .address_lines
            .iter()
            .map(String::as_str)
            .map(escape_html)
            .collect();
        out.push_str(&format!("<br><span class=muted>{}</span>", lines.join("<br>")));
    }
    out.push_str("</div></div>\n");

    // Customer and notes blocks
    out.push_str(&format!(
        "<div class=grid><div><div class=caps>Bill To</div>\
         <div><strong>{}</strong></div>\
         <div class=muted>{}</div>\
         <div class=muted>{}</div>\
         <pre>{}</pre></div>\
         <div><div class=caps>Notes</div><pre>{}</pre></div></div>\n",
        escape_html(&invoice.customer_name),
        escape_html(&invoice.customer_email),
        escape_html(&invoice.customer_phone),
        escape_html(&invoice.billing_address),
        escape_html(&invoice.notes)
    ));

    // Items
    out.push_str(
        "<table><thead><tr><th>Description</th><th class=right>Qty</th>\
         <th class=right>Unit Price</th><th class=right>Line Total</th></tr></thead><tbody>",
    );
    for item in &detail.items {
        out.push_str(&item_row(item));
    }
    out.push_str("</tbody></table>\n");

    // Totals
    out.push_str(&format!(
        "<table class=totals>\
         <tr><td>Subtotal</td><td class=right>{:.2}</td></tr>\
         <tr><td>Discount</td><td class=right>{:.2}</td></tr>\
         <tr><td>Tax Rate</td><td class=right>{:.2}%</td></tr>\
         <tr><td>Tax Amount</td><td class=right>{:.2}</td></tr>\
         <tr><th>Total</th><th class=right>{:.2}</th></tr>\
         </table>\n",
        invoice.subtotal,
        invoice.discount_amount,
        invoice.tax_rate,
        invoice.tax_amount,
        invoice.total
    ));

    out.push_str("<div class=footer>");
    out.push_str(&escape_html(&company.footer));
    out.push_str("</div>\n</body></html>\n");
    out
}
