//! Editing session over one draft invoice.
//!
//! All numeric input arrives as strings, exactly as typed. Validation is
//! atomic: a rejected mutation leaves the item list untouched, and the
//! cached aggregates are recomputed after every successful change so they
//! never go stale mid-session.

use chrono::Local;
use rand::Rng;

use crate::error::Error;
use crate::model::{DEFAULT_VAT_PERCENT, Invoice, LineItem};

/// Random four-digit display number, assigned per session rather than
/// persisted with the record.
pub fn fresh_invoice_number() -> String {
    rand::thread_rng().gen_range(1000..=9999).to_string()
}

pub struct Session {
    invoice: Invoice,
    number: String,
}

fn parse_positive(raw: &str, field: &str) -> Result<f64, Error> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| Error::Validation(format!("{field} must be a number")))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::Validation(format!(
            "{field} must be greater than zero"
        )));
    }
    Ok(value)
}

fn parse_vat(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .unwrap_or(DEFAULT_VAT_PERCENT)
}

fn build_item(name: &str, unit: &str, quantity: &str, price: &str, vat: &str) -> Result<LineItem, Error> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation(
            "Please enter an item description".to_string(),
        ));
    }
    let unit = unit.trim();
    if unit.is_empty() {
        return Err(Error::Validation("Please enter a division".to_string()));
    }
    let quantity = parse_positive(quantity, "Quantity")?;
    let unit_price = parse_positive(price, "Price")?;
    let mut item = LineItem {
        product_name: name.to_string(),
        unit: unit.to_string(),
        quantity,
        unit_price,
        vat_percent: parse_vat(vat),
        subtotal: 0.0,
    };
    item.subtotal = item.line_subtotal();
    Ok(item)
}

impl Session {
    /// Start a blank draft dated now.
    pub fn new() -> Self {
        let invoice = Invoice {
            date: Local::now().format("%Y-%m-%dT%H:%M").to_string(),
            ..Invoice::default()
        };
        Self {
            invoice,
            number: fresh_invoice_number(),
        }
    }

    /// Resume editing a stored record. Aggregates are recomputed immediately
    /// because persisted caches are never trusted.
    pub fn load(mut invoice: Invoice) -> Self {
        invoice.recompute();
        Self {
            invoice,
            number: fresh_invoice_number(),
        }
    }

    pub fn invoice(&self) -> &Invoice {
        &self.invoice
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn set_customer_name(&mut self, name: &str) {
        self.invoice.customer_name = name.trim().to_string();
    }

    pub fn set_date(&mut self, date: &str) {
        self.invoice.date = date.trim().to_string();
    }

    /// Edit optional header fields in place. Header fields never affect the
    /// amounts, so no recompute happens here.
    pub fn edit_header(&mut self, edit: impl FnOnce(&mut Invoice)) {
        edit(&mut self.invoice);
    }

    pub fn add_item(
        &mut self,
        name: &str,
        unit: &str,
        quantity: &str,
        price: &str,
        vat: &str,
    ) -> Result<(), Error> {
        let item = build_item(name, unit, quantity, price, vat)?;
        self.invoice.items.push(item);
        self.invoice.recompute();
        Ok(())
    }

    pub fn update_item(
        &mut self,
        index: usize,
        name: &str,
        unit: &str,
        quantity: &str,
        price: &str,
        vat: &str,
    ) -> Result<(), Error> {
        if index >= self.invoice.items.len() {
            return Err(Error::Validation(format!("No item at position {index}")));
        }
        let item = build_item(name, unit, quantity, price, vat)?;
        self.invoice.items[index] = item;
        self.invoice.recompute();
        Ok(())
    }

    pub fn delete_item(&mut self, index: usize) -> Result<(), Error> {
        if index >= self.invoice.items.len() {
            return Err(Error::Validation(format!("No item at position {index}")));
        }
        self.invoice.items.remove(index);
        self.invoice.recompute();
        Ok(())
    }

    /// Close the session. A record is only releasable with a customer name
    /// and at least one item.
    pub fn finish(mut self) -> Result<Invoice, Error> {
        if self.invoice.customer_name.trim().is_empty() {
            return Err(Error::Validation(
                "Please enter a customer name".to_string(),
            ));
        }
        if self.invoice.items.is_empty() {
            return Err(Error::Validation(
                "Please add at least one item".to_string(),
            ));
        }
        self.invoice.recompute();
        Ok(self.invoice)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_item_updates_aggregates() {
        let mut session = Session::new();
        session.add_item("Gypsum board", "Ceilings", "12", "35.5", "15").unwrap();
        let inv = session.invoice();
        assert_eq!(inv.items.len(), 1);
        assert_eq!(inv.subtotal, 426.0);
        assert!((inv.tax - 63.9).abs() < 1e-9);
        assert!((inv.total - 489.9).abs() < 1e-9);
    }

    #[test]
    fn rejected_input_leaves_items_untouched() {
        let mut session = Session::new();
        session.add_item("A", "u", "1", "10", "15").unwrap();

        let err = session.add_item("B", "u", "0", "10", "15").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(session.invoice().items.len(), 1);
        assert_eq!(session.invoice().subtotal, 10.0);

        let err = session.add_item("C", "u", "2", "abc", "15").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(session.invoice().items.len(), 1);

        let err = session.add_item("", "u", "2", "3", "15").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(session.invoice().items.len(), 1);

        let err = session.add_item("D", "   ", "2", "3", "15").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(session.invoice().items.len(), 1);
        assert_eq!(session.invoice().subtotal, 10.0);
    }

    #[test]
    fn unparsable_vat_falls_back_to_default() {
        let mut session = Session::new();
        session.add_item("A", "u", "1", "10", "").unwrap();
        session.add_item("B", "u", "1", "10", "7.5").unwrap();
        assert_eq!(session.invoice().items[0].vat_percent, 15.0);
        assert_eq!(session.invoice().items[1].vat_percent, 7.5);
    }

    #[test]
    fn update_and_delete_recompute() {
        let mut session = Session::new();
        session.add_item("A", "u", "1", "10", "15").unwrap();
        session.add_item("B", "u", "2", "20", "15").unwrap();
        assert_eq!(session.invoice().subtotal, 50.0);

        session.update_item(0, "A", "u", "3", "10", "15").unwrap();
        assert_eq!(session.invoice().subtotal, 70.0);

        session.delete_item(1).unwrap();
        assert_eq!(session.invoice().subtotal, 30.0);

        assert!(session.delete_item(5).is_err());
        assert!(session.update_item(9, "X", "u", "1", "1", "").is_err());
    }

    #[test]
    fn finish_requires_customer_and_items() {
        let session = Session::new();
        assert!(matches!(session.finish(), Err(Error::Validation(_))));

        let mut session = Session::new();
        session.set_customer_name("Acme");
        assert!(matches!(session.finish(), Err(Error::Validation(_))));

        let mut session = Session::new();
        session.set_customer_name("Acme");
        session.add_item("A", "u", "1", "10", "15").unwrap();
        let invoice = session.finish().unwrap();
        assert_eq!(invoice.customer_name, "Acme");
        assert_eq!(invoice.total, 11.5);
    }

    #[test]
    fn fresh_numbers_are_four_digits() {
        for _ in 0..50 {
            let n: u32 = fresh_invoice_number().parse().unwrap();
            assert!((1000..=9999).contains(&n));
        }
    }
}
