//! QR stamp for the document header.

use image::{ImageBuffer, Luma};
use qrcode::{EcLevel, QrCode};

use crate::error::Error;
use crate::model::{Invoice, format_amount};

/// Plain-text payload scanned from the printed invoice.
pub fn payload(invoice: &Invoice, invoice_number: &str) -> String {
    format!(
        "Invoice: {}\nDate: {}\nCustomer: {}\nTotal: {}",
        invoice_number,
        invoice.formatted_day(),
        invoice.customer_name,
        format_amount(invoice.total),
    )
}

/// Encode the invoice stamp as an 8-bit grayscale bitmap, quiet zone
/// included. The renderer embeds the pixels as a DeviceGray image XObject.
pub fn stamp(invoice: &Invoice, invoice_number: &str) -> Result<ImageBuffer<Luma<u8>, Vec<u8>>, Error> {
    let code = QrCode::with_error_correction_level(payload(invoice, invoice_number), EcLevel::M)
        .map_err(|e| Error::Qr(e.to_string()))?;
    let image = code
        .render::<Luma<u8>>()
        .min_dimensions(150, 150)
        .build();
    Ok(image)
}
