mod common;

use common::{invoice_with_items, item};
use invox::layout::{DrawOp, Page, PageGeometry, paginate, row_height, wrap_cell};
use invox::measure::FixedAdvance;
use invox::model::{CompanyInfo, Invoice};

// One character = 1mm, so wrap decisions are exact.
const MEASURE: FixedAdvance = FixedAdvance(1.0);

fn pages_for(invoice: &Invoice) -> Vec<Page> {
    let company = CompanyInfo::default();
    paginate(invoice, "1234", &company, PageGeometry::default(), &MEASURE).collect()
}

fn texts(page: &Page) -> Vec<&str> {
    page.ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

fn rect_bottoms(page: &Page) -> Vec<f32> {
    page.ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Rect { y, h, .. } => Some(y + h),
            _ => None,
        })
        .collect()
}

fn rect_count(page: &Page) -> usize {
    rect_bottoms(page).len()
}

#[test]
fn row_height_grows_monotonically_and_caps_at_two_lines() {
    let geom = PageGeometry::default();
    let mut last = 0.0;
    for len in [3, 10, 40, 120, 500] {
        let h = row_height(&item(&"a ".repeat(len), 1.0, 10.0), &geom, &MEASURE);
        assert!(h >= last, "height shrank at len {len}");
        assert!(h <= 14.0, "height above two-line cap at len {len}");
        last = h;
    }
    assert_eq!(last, 14.0);
}

#[test]
fn long_description_truncates_to_two_lines_with_ellipsis() {
    let geom = PageGeometry::default();
    let col = geom.column_widths()[0];
    for len in (3..500).step_by(13) {
        let text = "ab ".repeat(len);
        let lines = wrap_cell(&text, col, &MEASURE);
        assert!(lines.len() <= 2, "len {len}: {} lines", lines.len());
        for line in &lines {
            // Every emitted line, ellipsized or not, fits the cell.
            assert!(line.chars().count() as f32 <= col - 4.0, "len {len}");
        }
    }
    let lines = wrap_cell(&"word ".repeat(100), col, &MEASURE);
    assert_eq!(lines.len(), 2);
    assert!(lines[1].ends_with("..."));
}

#[test]
fn rows_never_cross_the_footer_reserve() {
    let geom = PageGeometry::default();
    let invoice = invoice_with_items(60);
    for (idx, page) in pages_for(&invoice).iter().enumerate() {
        for bottom in rect_bottoms(page) {
            assert!(
                bottom <= geom.max_content_y() + 0.01,
                "page {idx}: rect bottom {bottom} in footer reserve"
            );
        }
    }
}

#[test]
fn continuation_pages_with_rows_start_with_the_column_header() {
    let invoice = invoice_with_items(60);
    let pages = pages_for(&invoice);
    assert!(pages.len() > 2);
    for (idx, page) in pages.iter().enumerate().skip(1) {
        if rect_count(page) > 1 {
            let first = texts(page)[0];
            assert_eq!(first, "Items Description", "page {idx}");
        }
    }
}

#[test]
fn every_item_appears_exactly_once() {
    let invoice = invoice_with_items(60);
    let pages = pages_for(&invoice);
    let all: Vec<&str> = pages.iter().flat_map(|p| texts(p)).collect();
    for i in 0..60 {
        let name = format!("Item {i:03}");
        let count = all.iter().filter(|t| **t == name).count();
        assert_eq!(count, 1, "{name} drawn {count} times");
    }
}

#[test]
fn summary_lands_on_the_last_page_only() {
    let invoice = invoice_with_items(60);
    let pages = pages_for(&invoice);
    for (idx, page) in pages.iter().enumerate() {
        let has_total = texts(page).contains(&"Total Amount:");
        assert_eq!(has_total, idx == pages.len() - 1, "page {idx}");
    }
    let last = texts(pages.last().unwrap())
        .iter()
        .any(|t| t.starts_with('(') && t.ends_with(')'));
    assert!(last, "words line missing from last page");
}

#[test]
fn summary_is_forced_whole_onto_a_fresh_page() {
    // Thirteen single-line rows fill the first page right up to the reserve,
    // leaving no room for the summary block.
    let invoice = invoice_with_items(13);
    let pages = pages_for(&invoice);
    assert_eq!(pages.len(), 2);
    let last = pages.last().unwrap();
    assert_eq!(rect_count(last), 1, "summary page has only the summary box");
    assert!(!texts(last).contains(&"Items Description"));
    assert!(texts(last).contains(&"Total Amount:"));
}

#[test]
fn summary_shares_the_page_when_it_fits() {
    let invoice = invoice_with_items(5);
    let pages = pages_for(&invoice);
    assert_eq!(pages.len(), 1);
    assert!(texts(&pages[0]).contains(&"Total Amount:"));
}

#[test]
fn spilled_rows_continue_under_a_repeated_header() {
    let invoice = invoice_with_items(20);
    let pages = pages_for(&invoice);
    assert_eq!(pages.len(), 2);
    assert_eq!(texts(&pages[1])[0], "Items Description");
    assert!(texts(&pages[1]).contains(&"Total Amount:"));
}

#[test]
fn zero_items_still_yields_a_complete_page() {
    let invoice = invoice_with_items(0);
    let pages = pages_for(&invoice);
    assert_eq!(pages.len(), 1);
    let t = texts(&pages[0]);
    assert!(t.contains(&"Items Description"));
    assert!(t.contains(&"Total Amount:"));
    assert_eq!(rect_count(&pages[0]), 1);
}

#[test]
fn first_page_carries_header_and_qr_stamp() {
    let invoice = invoice_with_items(1);
    let pages = pages_for(&invoice);
    let images: Vec<_> = pages[0]
        .ops
        .iter()
        .filter(|op| matches!(op, DrawOp::Image { .. }))
        .collect();
    assert_eq!(images.len(), 2, "logo and QR stamp");
    let t = texts(&pages[0]);
    assert!(t.contains(&"Invoice"));
    assert!(t.contains(&"Invoice No:"));
    assert!(t.contains(&"1234"));
    assert!(t.contains(&"Acme Contracting"));
}
