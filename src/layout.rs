//! Pagination engine: turns an invoice into an ordered sequence of pages of
//! positioned draw operations.
//!
//! All coordinates here are top-down page-relative millimetres (A4 portrait);
//! the renderer flips to PDF space. The engine performs no text measurement
//! itself — widths come from the injected [`TextMeasure`] capability — and it
//! emits neither page numbers nor the footer band, because both need the
//! final page count (the renderer retrofits them once the sequence ends).

use crate::measure::{FontStyle, TextMeasure};
use crate::model::{CompanyInfo, Invoice, LineItem, format_amount, format_currency};
use crate::words::amount_in_words;

/// Fractions of the usable table width, left to right. Sum to 1.0.
pub const COLUMN_FRACTIONS: [f32; 5] = [0.22, 0.18, 0.18, 0.18, 0.24];

pub const COLUMN_HEADERS: [&str; 5] = [
    "Items Description",
    "Division",
    "Square Meters",
    "Price/Sq Meter",
    "Amount",
];

/// Horizontal padding inside a table cell (each side).
const CELL_PAD: f32 = 2.0;
/// Height of the column header row.
const HEADER_ROW_H: f32 = 8.0;
/// Summary box plus the words line beneath it.
const SUMMARY_BLOCK_H: f32 = 40.0;

const TITLE_SIZE: f32 = 26.0;
const LABEL_SIZE: f32 = 10.0;
const BODY_SIZE: f32 = 9.0;
const WORDS_SIZE: f32 = 9.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageKind {
    Logo,
    Qr,
}

/// One positioned drawing instruction. For `Align::Center` and
/// `Align::Right`, `x` is the anchor the rendered text is centred on or ends
/// at.
#[derive(Clone, Debug)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        text: String,
        size_pt: f32,
        style: FontStyle,
        align: Align,
        max_width: Option<f32>,
    },
    /// Stroked rectangle (cell and summary borders).
    Rect { x: f32, y: f32, w: f32, h: f32 },
    Image {
        kind: ImageKind,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
    },
}

pub struct Page {
    pub ops: Vec<DrawOp>,
}

/// Fixed layout constants driving every pagination decision, in millimetres.
#[derive(Clone, Copy, Debug)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_left: f32,
    /// Band at the bottom of every page reserved for the footer image and
    /// page number.
    pub footer_reserve: f32,
    /// Top offset for content on continuation pages.
    pub continuation_top: f32,
    pub min_row_height: f32,
    /// Height of one wrapped text line inside a cell.
    pub line_height: f32,
    pub summary_width: f32,
    pub summary_height: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            page_width: 210.0,
            page_height: 297.0,
            margin_left: 15.0,
            footer_reserve: 60.0,
            continuation_top: 30.0,
            min_row_height: 8.0,
            line_height: 7.0,
            summary_width: 80.0,
            summary_height: 30.0,
        }
    }
}

impl PageGeometry {
    pub fn table_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin_left
    }

    /// Lowest y a row or the summary block may extend to.
    pub fn max_content_y(&self) -> f32 {
        self.page_height - self.footer_reserve
    }

    pub fn column_widths(&self) -> [f32; 5] {
        COLUMN_FRACTIONS.map(|f| f * self.table_width())
    }
}

/// Wrap a free-text cell value against its column width. More than two
/// wrapped lines is lossy by design: exactly two are kept and the second is
/// ellipsized to fit.
pub fn wrap_cell<M: TextMeasure + ?Sized>(text: &str, col_width: f32, measure: &M) -> Vec<String> {
    let inner = col_width - 2.0 * CELL_PAD;
    let mut lines = measure.wrap(text, FontStyle::Regular, BODY_SIZE, inner);
    if lines.len() > 2 {
        lines.truncate(2);
        let mut second = std::mem::take(&mut lines[1]);
        loop {
            let candidate = format!("{second}...");
            if second.is_empty()
                || measure.text_width(&candidate, FontStyle::Regular, BODY_SIZE) <= inner
            {
                lines[1] = candidate;
                break;
            }
            second.pop();
        }
    }
    lines
}

/// Exact row height for one line item, computed before any drawing so the
/// page-break decision never has to guess.
pub fn row_height<M: TextMeasure + ?Sized>(
    item: &LineItem,
    geom: &PageGeometry,
    measure: &M,
) -> f32 {
    let cols = geom.column_widths();
    let name_lines = wrap_cell(&item.product_name, cols[0], measure).len() as f32;
    let unit_lines = wrap_cell(&item.unit, cols[1], measure).len() as f32;
    geom.min_row_height
        .max(name_lines * geom.line_height)
        .max(unit_lines * geom.line_height)
}

/// Lay the invoice out into pages. The returned iterator is lazy, finite and
/// non-restartable: each page is computed when pulled, and the sequence ends
/// after the summary block has been placed.
pub fn paginate<'a, M: TextMeasure>(
    invoice: &'a Invoice,
    invoice_number: &str,
    company: &'a CompanyInfo,
    geom: PageGeometry,
    measure: &'a M,
) -> Pages<'a, M> {
    Pages {
        invoice,
        number: invoice_number.to_string(),
        company,
        geom,
        measure,
        next_item: 0,
        started: false,
        summary_pending: false,
        done: false,
    }
}

pub struct Pages<'a, M: TextMeasure> {
    invoice: &'a Invoice,
    number: String,
    company: &'a CompanyInfo,
    geom: PageGeometry,
    measure: &'a M,
    next_item: usize,
    started: bool,
    summary_pending: bool,
    done: bool,
}

impl<M: TextMeasure> Pages<'_, M> {
    fn col_x(&self, col: usize) -> f32 {
        let widths = self.geom.column_widths();
        self.geom.margin_left + widths[..col].iter().sum::<f32>()
    }

    fn label_value(&self, ops: &mut Vec<DrawOp>, y: f32, label: &str, value: &str) {
        let x = self.geom.margin_left;
        ops.push(DrawOp::Text {
            x,
            y,
            text: label.to_string(),
            size_pt: LABEL_SIZE,
            style: FontStyle::Bold,
            align: Align::Left,
            max_width: None,
        });
        ops.push(DrawOp::Text {
            x: x + 35.0,
            y,
            text: value.to_string(),
            size_pt: LABEL_SIZE,
            style: FontStyle::Regular,
            align: Align::Left,
            max_width: Some(self.geom.page_width - 65.0 - (x + 35.0)),
        });
    }

    /// Document header: logo band, title, date, detail stack and QR stamp.
    /// Returns the y where the table starts.
    fn emit_document_header(&self, ops: &mut Vec<DrawOp>) -> f32 {
        let geom = &self.geom;
        let inv = self.invoice;

        ops.push(DrawOp::Image {
            kind: ImageKind::Logo,
            x: 0.0,
            y: 10.0,
            w: geom.page_width,
            h: 50.0,
        });

        let title_y = 62.0;
        ops.push(DrawOp::Text {
            x: geom.page_width / 2.0,
            y: title_y,
            text: "Invoice".to_string(),
            size_pt: TITLE_SIZE,
            style: FontStyle::Bold,
            align: Align::Center,
            max_width: None,
        });
        ops.push(DrawOp::Text {
            x: geom.page_width - 60.0,
            y: title_y,
            text: "Date:".to_string(),
            size_pt: LABEL_SIZE,
            style: FontStyle::Bold,
            align: Align::Left,
            max_width: None,
        });
        ops.push(DrawOp::Text {
            x: geom.page_width - 45.0,
            y: title_y,
            text: inv.formatted_date(),
            size_pt: LABEL_SIZE,
            style: FontStyle::Regular,
            align: Align::Left,
            max_width: None,
        });

        let details_top = title_y + 8.0;
        let qr_size = 38.0;
        ops.push(DrawOp::Image {
            kind: ImageKind::Qr,
            x: geom.page_width - 60.0,
            y: details_top,
            w: qr_size,
            h: qr_size,
        });

        let mut y = details_top;
        let spacing = 7.0;
        let mut row = |ops: &mut Vec<DrawOp>, label: &str, value: &str| {
            self.label_value(ops, y, label, value);
            y += spacing;
        };

        row(ops, "Invoice No:", &self.number);
        row(ops, "Customer:", &inv.customer_name);
        let optional: [(&str, &Option<String>); 9] = [
            ("Mobile:", &inv.mobile),
            ("Customer VAT:", &inv.vat_number),
            ("Address:", &inv.address),
            ("CR Number:", &inv.cr_number),
            ("Supply Date:", &inv.supply_date),
            ("Due Date:", &inv.due_date),
            ("Contract No:", &inv.contract_number),
            ("Invoice Period:", &inv.invoice_period),
            ("Project No:", &inv.project_number),
        ];
        for (label, value) in optional {
            if let Some(value) = value {
                row(ops, label, value);
            }
        }
        row(ops, "Bank Name:", &self.company.bank_name);
        row(ops, "Account Title:", &self.company.account_title);
        row(ops, "IBAN:", &self.company.iban);
        y += 5.0;

        // The table spans the full width, so it must clear the QR stamp.
        (y + 10.0).max(details_top + qr_size + 6.0)
    }

    /// Column header row at `top`; returns the y of the first body row.
    fn emit_table_header(&self, ops: &mut Vec<DrawOp>, top: f32) -> f32 {
        let widths = self.geom.column_widths();
        for (col, header) in COLUMN_HEADERS.iter().enumerate() {
            ops.push(DrawOp::Text {
                x: self.col_x(col) + CELL_PAD,
                y: top + 6.0,
                text: header.to_string(),
                size_pt: LABEL_SIZE,
                style: FontStyle::Bold,
                align: Align::Left,
                max_width: Some(widths[col] - 2.0 * CELL_PAD),
            });
        }
        top + HEADER_ROW_H
    }

    fn emit_row(&self, ops: &mut Vec<DrawOp>, item: &LineItem, top: f32, height: f32) {
        let widths = self.geom.column_widths();
        for col in 0..widths.len() {
            ops.push(DrawOp::Rect {
                x: self.col_x(col),
                y: top,
                w: widths[col],
                h: height,
            });
        }

        let name_lines = wrap_cell(&item.product_name, widths[0], self.measure);
        let unit_lines = wrap_cell(&item.unit, widths[1], self.measure);
        for (idx, line) in name_lines.iter().enumerate() {
            ops.push(DrawOp::Text {
                x: self.col_x(0) + CELL_PAD,
                y: top + 6.0 + idx as f32 * self.geom.line_height,
                text: line.clone(),
                size_pt: BODY_SIZE,
                style: FontStyle::Regular,
                align: Align::Left,
                max_width: Some(widths[0] - 2.0 * CELL_PAD),
            });
        }
        for (idx, line) in unit_lines.iter().enumerate() {
            ops.push(DrawOp::Text {
                x: self.col_x(1) + CELL_PAD,
                y: top + 6.0 + idx as f32 * self.geom.line_height,
                text: line.clone(),
                size_pt: BODY_SIZE,
                style: FontStyle::Regular,
                align: Align::Left,
                max_width: Some(widths[1] - 2.0 * CELL_PAD),
            });
        }

        // Numeric columns: single line, vertically centred.
        let center_y = top + height / 2.0 + 2.0;
        let cells = [
            format!("{} m", format_amount(item.quantity)),
            format_amount(item.unit_price),
            format_amount(item.line_subtotal()),
        ];
        for (offset, text) in cells.into_iter().enumerate() {
            let col = 2 + offset;
            ops.push(DrawOp::Text {
                x: self.col_x(col) + CELL_PAD,
                y: center_y,
                text,
                size_pt: BODY_SIZE,
                style: FontStyle::Regular,
                align: Align::Left,
                max_width: Some(widths[col] - 2.0 * CELL_PAD),
            });
        }
    }

    fn emit_summary(&self, ops: &mut Vec<DrawOp>, top: f32) {
        let geom = &self.geom;
        let inv = self.invoice;
        let x = geom.page_width - geom.summary_width - geom.margin_left;
        ops.push(DrawOp::Rect {
            x,
            y: top,
            w: geom.summary_width,
            h: geom.summary_height,
        });

        let rows = [
            ("Subtotal:", inv.subtotal),
            ("Tax (15%):", inv.tax),
            ("Total Amount:", inv.total),
        ];
        for (idx, (label, amount)) in rows.into_iter().enumerate() {
            let y = top + 8.0 * (idx as f32 + 1.0);
            ops.push(DrawOp::Text {
                x: x + 5.0,
                y,
                text: label.to_string(),
                size_pt: LABEL_SIZE,
                style: FontStyle::Bold,
                align: Align::Left,
                max_width: None,
            });
            ops.push(DrawOp::Text {
                x: x + geom.summary_width - 5.0,
                y,
                text: format_currency(amount),
                size_pt: LABEL_SIZE,
                style: FontStyle::Regular,
                align: Align::Right,
                max_width: None,
            });
        }

        ops.push(DrawOp::Text {
            x: geom.margin_left,
            y: top + SUMMARY_BLOCK_H,
            text: format!("({})", amount_in_words(inv.total)),
            size_pt: WORDS_SIZE,
            style: FontStyle::Italic,
            align: Align::Left,
            max_width: None,
        });
    }
}

impl<M: TextMeasure> Iterator for Pages<'_, M> {
    type Item = Page;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut ops: Vec<DrawOp> = Vec::new();
        let geom = self.geom;
        let limit = geom.max_content_y();

        if self.summary_pending {
            // The summary did not fit below the last row; it gets a page of
            // its own and is never split.
            self.emit_summary(&mut ops, geom.continuation_top);
            self.summary_pending = false;
            self.done = true;
            return Some(Page { ops });
        }

        let mut cursor = if !self.started {
            self.started = true;
            let table_top = self.emit_document_header(&mut ops);
            self.emit_table_header(&mut ops, table_top)
        } else {
            self.emit_table_header(&mut ops, geom.continuation_top)
        };

        let mut placed = 0usize;
        while self.next_item < self.invoice.items.len() {
            let item = &self.invoice.items[self.next_item];
            let height = row_height(item, &geom, self.measure);
            if cursor + height > limit && placed > 0 {
                // Atomic row placement: the row moves whole to the next page.
                break;
            }
            log::debug!(
                "row={} height={:.1} cursor={:.1}",
                self.next_item,
                height,
                cursor
            );
            self.emit_row(&mut ops, item, cursor, height);
            cursor += height;
            self.next_item += 1;
            placed += 1;
        }

        if self.next_item == self.invoice.items.len() {
            let summary_top = cursor + 10.0;
            if summary_top + SUMMARY_BLOCK_H > limit {
                self.summary_pending = true;
            } else {
                self.emit_summary(&mut ops, summary_top);
                self.done = true;
            }
        }

        Some(Page { ops })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::FixedAdvance;

    fn item(name: &str, unit: &str) -> LineItem {
        LineItem {
            product_name: name.into(),
            unit: unit.into(),
            quantity: 1.0,
            unit_price: 10.0,
            vat_percent: 15.0,
            subtotal: 10.0,
        }
    }

    #[test]
    fn column_fractions_cover_table_width() {
        let geom = PageGeometry::default();
        let sum: f32 = geom.column_widths().iter().sum();
        assert!((sum - geom.table_width()).abs() < 0.01);
    }

    #[test]
    fn single_line_row_uses_minimum_height() {
        let geom = PageGeometry::default();
        let m = FixedAdvance(1.0);
        assert_eq!(row_height(&item("short", "u"), &geom, &m), 8.0);
    }

    #[test]
    fn wrapped_row_is_strictly_taller() {
        let geom = PageGeometry::default();
        let m = FixedAdvance(1.0);
        // First column is 0.22 * 180 = 39.6mm wide, 35.6 usable.
        let one = row_height(&item(&"a".repeat(30), "u"), &geom, &m);
        let two = row_height(&item(&"a b".repeat(15), "u"), &geom, &m);
        assert_eq!(one, 8.0);
        assert_eq!(two, 14.0);
        assert!(two > one);
    }
}
