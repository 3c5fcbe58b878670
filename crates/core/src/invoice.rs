//! Invoices.

use std::io;

use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{cart::CartLine, money::Amount, orders::OrderRecord};

/// Shown in place of a blank order field.
pub const BLANK_FIELD: &str = "N/A";

/// Errors that can occur when writing an invoice.
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// IO error
    #[error("IO error")]
    Io,
}

/// One printable invoice row.
#[derive(Debug, Clone, PartialEq, Eq)]
struct InvoiceLine {
    title: String,
    variant: String,
    quantity: u32,
    unit_price: Amount,
    line_total: Amount,
}

/// A printable invoice built from a stored order.
///
/// The invoice is a pure view: building one never mutates the order. The
/// stored `total_amount` is authoritative; the line items are recomputed for
/// display only, and a mismatch between the two is logged, not corrected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    order_number: String,
    date: String,
    status: String,
    payment_method: String,
    payment_ref: String,
    customer: String,
    address: String,
    state: String,
    pincode: String,
    phone_number: String,
    lines: Vec<InvoiceLine>,
    items_total: Amount,
    shipping: Amount,
    grand_total: Amount,
}

impl Invoice {
    /// Build an invoice from a stored order.
    ///
    /// Blank order fields render as [`BLANK_FIELD`] rather than failing; an
    /// invoice can always be produced for any stored order.
    #[must_use]
    pub fn from_order(order: &OrderRecord) -> Self {
        let items_total: Amount = order.cart_items.iter().map(CartLine::line_total).sum();
        let recomputed = items_total.saturating_add(order.shipping_charges);

        if recomputed != order.total_amount {
            tracing::warn!(
                order = %order.display_id,
                stored = %order.total_amount,
                recomputed = %recomputed,
                "stored order total differs from recomputed line totals",
            );
        }

        let lines = order
            .cart_items
            .iter()
            .map(|line| InvoiceLine {
                title: or_blank(&line.title),
                variant: line
                    .variant
                    .as_deref()
                    .map_or_else(|| BLANK_FIELD.to_owned(), or_blank),
                quantity: line.quantity,
                unit_price: line.price,
                line_total: line.line_total(),
            })
            .collect();

        Self {
            order_number: or_blank(&order.display_id),
            date: or_blank(&order.date),
            status: order.status.display_name().to_owned(),
            payment_method: order.payment_method.display_name().to_owned(),
            payment_ref: or_blank(&order.payment_id),
            customer: or_blank(&order.address.name),
            address: or_blank(&order.address.address),
            state: or_blank(&order.address.state),
            pincode: or_blank(&order.address.pincode),
            phone_number: or_blank(&order.address.phone_number),
            lines,
            items_total,
            shipping: order.shipping_charges,
            grand_total: order.total_amount,
        }
    }

    /// The grand total printed on the invoice.
    #[must_use]
    pub fn grand_total(&self) -> Amount {
        self.grand_total
    }

    /// Render the invoice as printable text.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!("Invoice for order #{}\n", self.order_number));
        out.push_str(&format!("Date: {}\n", self.date));
        out.push_str(&format!("Status: {}\n", self.status));
        out.push_str(&format!(
            "Payment: {} (ref {})\n",
            self.payment_method, self.payment_ref
        ));
        out.push_str(&format!(
            "Deliver to: {}, {}, {} {} ({})\n",
            self.customer, self.address, self.state, self.pincode, self.phone_number
        ));

        out.push('\n');
        out.push_str(&self.items_table());
        out.push('\n');
        out.push('\n');
        out.push_str(&self.summary());

        out
    }

    /// Write the rendered invoice to `out`.
    ///
    /// # Errors
    ///
    /// Returns [`InvoiceError::Io`] if the writer fails.
    pub fn write_to(&self, out: &mut impl io::Write) -> Result<(), InvoiceError> {
        writeln!(out, "{}", self.render()).map_err(|_err| InvoiceError::Io)
    }

    fn items_table(&self) -> String {
        let mut builder = Builder::default();

        builder.push_record(["Item", "Variant", "Qty", "Price", "Total"]);

        for line in &self.lines {
            builder.push_record([
                line.title.clone(),
                line.variant.clone(),
                line.quantity.to_string(),
                line.unit_price.to_string(),
                line.line_total.to_string(),
            ]);
        }

        let mut table = builder.build();
        let mut theme = Theme::from(Style::modern_rounded());
        let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

        theme.remove_horizontal_lines();
        theme.insert_horizontal_line(1, separator);

        table.with(theme);
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(2..5), Alignment::right());

        table.to_string()
    }

    fn summary(&self) -> String {
        let rows = [
            ("Items:", self.items_total),
            ("Shipping:", self.shipping),
            ("Total:", self.grand_total),
        ];

        let value_width = rows
            .iter()
            .map(|(_, value)| value.to_string().len())
            .max()
            .unwrap_or(0);

        rows.iter()
            .map(|(label, value)| {
                let value = value.to_string();
                format!(" {label:<10}{value:>value_width$}\n")
            })
            .collect()
    }
}

fn or_blank(value: &str) -> String {
    if value.trim().is_empty() {
        BLANK_FIELD.to_owned()
    } else {
        value.to_owned()
    }
}
