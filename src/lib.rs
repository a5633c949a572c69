pub mod error;
pub mod layout;
pub mod measure;
pub mod model;
pub mod pdf;
pub mod qr;
pub mod session;
pub mod store;
pub mod words;

pub use error::Error;

use std::time::Instant;

use crate::layout::PageGeometry;
use crate::measure::HelveticaMetrics;
use crate::model::{CompanyInfo, Invoice};
use crate::pdf::Assets;

/// Render one invoice to PDF bytes. The invoice is expected to come out of a
/// finished session, with aggregates already recomputed.
pub fn generate_pdf(
    invoice: &Invoice,
    invoice_number: &str,
    company: &CompanyInfo,
    assets: &Assets,
) -> Result<Vec<u8>, Error> {
    let t0 = Instant::now();

    let stamp = qr::stamp(invoice, invoice_number)?;
    let t_qr = t0.elapsed();

    let geometry = PageGeometry::default();
    let metrics = HelveticaMetrics::new();
    let pages = layout::paginate(invoice, invoice_number, company, geometry, &metrics);
    let bytes = pdf::render(pages, &geometry, assets, &stamp, &metrics)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: qr={:.1}ms, render={:.1}ms, total={:.1}ms (output {} bytes)",
        t_qr.as_secs_f64() * 1000.0,
        (t_total - t_qr).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(bytes)
}
