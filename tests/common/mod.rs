#![allow(dead_code)] // not every test binary uses every helper

use invox::model::{Invoice, LineItem};

pub fn item(name: &str, quantity: f64, unit_price: f64) -> LineItem {
    LineItem {
        product_name: name.to_string(),
        unit: "Ceilings".to_string(),
        quantity,
        unit_price,
        vat_percent: 15.0,
        subtotal: quantity * unit_price,
    }
}

pub fn invoice_with_items(count: usize) -> Invoice {
    let mut invoice = Invoice {
        customer_name: "Acme Contracting".to_string(),
        date: "2026-08-30T10:00".to_string(),
        items: (0..count)
            .map(|i| item(&format!("Item {i:03}"), 1.0, 10.0))
            .collect(),
        ..Invoice::default()
    };
    invoice.recompute();
    invoice
}

/// Tiny valid PNG for asset plumbing in tests.
pub fn png_bytes() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([200, 30, 30, 255]));
    let mut buf = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}
