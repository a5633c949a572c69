use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Flat tax rate applied to the invoice subtotal. Independent of the per-item
/// `vat_percent` field; the two are intentionally not reconciled.
pub const TAX_RATE: f64 = 0.15;

pub const DEFAULT_VAT_PERCENT: f64 = 15.0;

fn default_vat() -> f64 {
    DEFAULT_VAT_PERCENT
}

/// One billable row. `subtotal` is a persisted cache of
/// `quantity * unit_price`; the session rewrites it on every mutation and no
/// reader trusts it without recomputing.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_name: String,
    /// Unit / division text. Older records call this field `productCode`.
    #[serde(alias = "productCode")]
    pub unit: String,
    pub quantity: f64,
    pub unit_price: f64,
    #[serde(default = "default_vat")]
    pub vat_percent: f64,
    pub subtotal: f64,
}

impl LineItem {
    pub fn line_subtotal(&self) -> f64 {
        self.quantity * self.unit_price
    }

    pub fn vat_amount(&self) -> f64 {
        self.line_subtotal() * self.vat_percent / 100.0
    }

    pub fn line_total(&self) -> f64 {
        self.line_subtotal() + self.vat_amount()
    }
}

/// The persisted invoice record, one JSON file per invoice. Optional header
/// fields are omitted from the file when unset.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub customer_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cr_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supply_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_number: Option<String>,
    /// ISO-8601 date/time string as entered (`2026-08-30T12:34` style).
    pub date: String,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub subtotal: f64,
    #[serde(default)]
    pub tax: f64,
    #[serde(default)]
    pub total: f64,
    /// Backing record identity. `None` means a fresh file name on save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

impl Invoice {
    /// Recompute every cached amount from current field values: per-item
    /// subtotals, then `subtotal` / `tax` (flat 15%) / `total`.
    pub fn recompute(&mut self) {
        for item in &mut self.items {
            item.subtotal = item.line_subtotal();
        }
        self.subtotal = self.items.iter().map(LineItem::line_subtotal).sum();
        self.tax = self.subtotal * TAX_RATE;
        self.total = self.subtotal + self.tax;
    }

    /// Invoice date formatted for display (`dd/mm/yyyy hh:mm`), falling back
    /// to the raw string when it does not parse.
    pub fn formatted_date(&self) -> String {
        parse_date(&self.date)
            .map(|dt| dt.format("%d/%m/%Y %H:%M").to_string())
            .unwrap_or_else(|| self.date.clone())
    }

    /// Date-only form used in the QR payload and record listings.
    pub fn formatted_day(&self) -> String {
        parse_date(&self.date)
            .map(|dt| dt.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| self.date.clone())
    }
}

fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    // datetime-local ("2026-08-30T12:34"), with seconds, or full RFC 3339
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.naive_local())
        })
}

/// Issuer details printed in the document header. Loaded from a config file
/// when present; the defaults are the built-in letterhead.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    pub bank_name: String,
    pub account_title: String,
    pub iban: String,
}

impl Default for CompanyInfo {
    fn default() -> Self {
        Self {
            bank_name: "Alrajhi Bank".to_string(),
            account_title: "Al-Fatih Contracting Company".to_string(),
            iban: "SA44 2000 0001 2345 6789 1234".to_string(),
        }
    }
}

/// Two decimal places, the fixed precision for every on-screen and rendered
/// amount.
pub fn format_amount(value: f64) -> String {
    format!("{value:.2}")
}

/// `SAR 1,234.56` — currency code prefix with thousands grouping.
pub fn format_currency(value: f64) -> String {
    let formatted = format_amount(value.abs());
    let (whole, cents) = formatted.split_once('.').unwrap_or((&formatted, "00"));
    let mut grouped = String::new();
    let digits: Vec<char> = whole.chars().collect();
    for (i, ch) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*ch);
    }
    let sign = if value < 0.0 { "-" } else { "" };
    format!("SAR {sign}{grouped}.{cents}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_amounts_derive_from_quantity_and_price() {
        let item = LineItem {
            product_name: "Gypsum board".into(),
            unit: "Ceilings".into(),
            quantity: 12.0,
            unit_price: 35.5,
            vat_percent: 15.0,
            subtotal: 0.0, // stale cache must not matter
        };
        assert_eq!(item.line_subtotal(), 426.0);
        assert!((item.vat_amount() - 63.9).abs() < 1e-9);
        assert!((item.line_total() - 489.9).abs() < 1e-9);
    }

    #[test]
    fn recompute_uses_flat_tax_rate() {
        let mut invoice = Invoice {
            customer_name: "Acme".into(),
            date: "2026-08-30T10:00".into(),
            items: vec![
                LineItem {
                    product_name: "A".into(),
                    unit: "u".into(),
                    quantity: 2.0,
                    unit_price: 100.0,
                    vat_percent: 5.0, // per-line rate must not affect invoice tax
                    subtotal: 0.0,
                },
                LineItem {
                    product_name: "B".into(),
                    unit: "u".into(),
                    quantity: 1.0,
                    unit_price: 50.0,
                    vat_percent: 15.0,
                    subtotal: 999.0,
                },
            ],
            ..Invoice::default()
        };
        invoice.recompute();
        assert_eq!(invoice.subtotal, 250.0);
        assert!((invoice.tax - 37.5).abs() < 1e-9);
        assert!((invoice.total - 287.5).abs() < 1e-9);
        assert_eq!(invoice.items[1].subtotal, 50.0);
    }

    #[test]
    fn vat_percent_defaults_on_deserialize() {
        let json =
            r#"{"productName":"A","productCode":"div","quantity":1,"unitPrice":2,"subtotal":2}"#;
        let item: LineItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.vat_percent, 15.0);
        assert_eq!(item.unit, "div"); // legacy alias
    }

    #[test]
    fn currency_grouping() {
        assert_eq!(format_currency(0.0), "SAR 0.00");
        assert_eq!(format_currency(1234.5), "SAR 1,234.50");
        assert_eq!(format_currency(1_234_567.891), "SAR 1,234,567.89");
    }

    #[test]
    fn date_formats() {
        let invoice = Invoice {
            date: "2026-08-30T09:05".into(),
            ..Invoice::default()
        };
        assert_eq!(invoice.formatted_date(), "30/08/2026 09:05");
        assert_eq!(invoice.formatted_day(), "30/08/2026");

        let odd = Invoice {
            date: "yesterday".into(),
            ..Invoice::default()
        };
        assert_eq!(odd.formatted_date(), "yesterday");
    }
}
