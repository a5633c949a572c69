//! PDF assembly on top of the layout engine's draw ops.
//!
//! The layout runs in top-down millimetres; everything here converts to
//! bottom-up points. Text uses the base-14 Helvetica family with
//! WinAnsiEncoding, so no font embedding is needed. Page numbers and the
//! footer band are added after layout, once the page count is known.

use std::path::Path;

use image::{GrayImage, Luma};
use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str};

use crate::error::Error;
use crate::layout::{Align, DrawOp, ImageKind, Page, PageGeometry};
use crate::measure::{FontStyle, TextMeasure, to_winansi_bytes};

const MM_TO_PT: f32 = 72.0 / 25.4;

/// Raster assets placed on the page. The logo is mandatory because the
/// header layout commits space for it; the footer band is decorative and a
/// missing file only logs a warning.
#[derive(Debug)]
pub struct Assets {
    pub logo_png: Vec<u8>,
    pub footer_png: Option<Vec<u8>>,
}

impl Assets {
    pub fn load(logo: &Path, footer: &Path) -> Result<Self, Error> {
        let logo_png =
            std::fs::read(logo).map_err(|_| Error::AssetMissing(logo.display().to_string()))?;
        let footer_png = match std::fs::read(footer) {
            Ok(data) => Some(data),
            Err(_) => {
                log::warn!(
                    "footer image not found: {} — rendering without footer band",
                    footer.display()
                );
                None
            }
        };
        Ok(Self { logo_png, footer_png })
    }
}

fn font_for(style: FontStyle) -> Name<'static> {
    match style {
        FontStyle::Regular => Name(b"F1"),
        FontStyle::Bold => Name(b"F2"),
        FontStyle::Italic => Name(b"F3"),
    }
}

/// Embed a PNG as an RGB image XObject with an optional alpha SMask.
fn embed_png(
    pdf: &mut Pdf,
    alloc: &mut dyn FnMut() -> Ref,
    data: &[u8],
    label: &str,
) -> Result<Ref, Error> {
    let cursor = std::io::Cursor::new(data);
    let reader =
        image::ImageReader::with_format(std::io::BufReader::new(cursor), image::ImageFormat::Png);
    let decoded = reader
        .decode()
        .map_err(|e| Error::AssetMissing(format!("{label}: {e}")))?;
    let rgba: image::RgbaImage = decoded.to_rgba8();
    let (w, h) = (rgba.width(), rgba.height());
    let has_alpha = rgba.pixels().any(|p| p.0[3] < 255);

    let rgb_data: Vec<u8> = rgba.pixels().flat_map(|p| [p.0[0], p.0[1], p.0[2]]).collect();
    let compressed_rgb = miniz_oxide::deflate::compress_to_vec_zlib(&rgb_data, 6);

    let smask_ref = if has_alpha {
        let alpha_data: Vec<u8> = rgba.pixels().map(|p| p.0[3]).collect();
        let compressed_alpha = miniz_oxide::deflate::compress_to_vec_zlib(&alpha_data, 6);
        let mask_ref = alloc();
        let mut mask = pdf.image_xobject(mask_ref, &compressed_alpha);
        mask.filter(Filter::FlateDecode);
        mask.width(w as i32);
        mask.height(h as i32);
        mask.color_space().device_gray();
        mask.bits_per_component(8);
        Some(mask_ref)
    } else {
        None
    };

    let xobj_ref = alloc();
    let mut xobj = pdf.image_xobject(xobj_ref, &compressed_rgb);
    xobj.filter(Filter::FlateDecode);
    xobj.width(w as i32);
    xobj.height(h as i32);
    xobj.color_space().device_rgb();
    xobj.bits_per_component(8);
    if let Some(mask_ref) = smask_ref {
        xobj.s_mask(mask_ref);
    }
    Ok(xobj_ref)
}

/// Embed the QR bitmap as an 8-bit DeviceGray XObject.
fn embed_gray(pdf: &mut Pdf, alloc: &mut dyn FnMut() -> Ref, img: &GrayImage) -> Ref {
    let pixels: Vec<u8> = img.pixels().map(|p: &Luma<u8>| p.0[0]).collect();
    let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&pixels, 6);
    let xobj_ref = alloc();
    let mut xobj = pdf.image_xobject(xobj_ref, &compressed);
    xobj.filter(Filter::FlateDecode);
    xobj.width(img.width() as i32);
    xobj.height(img.height() as i32);
    xobj.color_space().device_gray();
    xobj.bits_per_component(8);
    xobj_ref
}

fn draw_text<M: TextMeasure + ?Sized>(
    content: &mut Content,
    geom: &PageGeometry,
    measure: &M,
    x: f32,
    y: f32,
    text: &str,
    size_pt: f32,
    style: FontStyle,
    align: Align,
    max_width: Option<f32>,
) {
    let width = measure.text_width(text, style, size_pt);
    let anchor_x = match align {
        Align::Left => x,
        Align::Center => x - width / 2.0,
        Align::Right => x - width,
    };
    // Squeeze overlong single-line text into its cell instead of overflowing.
    let scaling = match max_width {
        Some(max) if width > max && width > 0.0 => Some(100.0 * max / width),
        _ => None,
    };

    content.begin_text();
    content.set_font(font_for(style), size_pt);
    if let Some(s) = scaling {
        content.set_horizontal_scaling(s);
    }
    content.next_line(anchor_x * MM_TO_PT, (geom.page_height - y) * MM_TO_PT);
    content.show(Str(&to_winansi_bytes(text)));
    if scaling.is_some() {
        content.set_horizontal_scaling(100.0);
    }
    content.end_text();
}

/// Assemble the finished PDF from laid-out pages. Consumes the page sequence,
/// then retrofits "Page i of n" onto every page and the footer image onto the
/// last one.
pub fn render<I, M>(
    pages: I,
    geom: &PageGeometry,
    assets: &Assets,
    qr: &GrayImage,
    measure: &M,
) -> Result<Vec<u8>, Error>
where
    I: Iterator<Item = Page>,
    M: TextMeasure + ?Sized,
{
    let t0 = std::time::Instant::now();
    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();

    // Base-14 Helvetica variants, no embedding required.
    let font_refs: [(Name<'static>, &'static [u8], Ref); 3] = [
        (Name(b"F1"), b"Helvetica", alloc()),
        (Name(b"F2"), b"Helvetica-Bold", alloc()),
        (Name(b"F3"), b"Helvetica-Oblique", alloc()),
    ];
    for &(_, base, font_ref) in &font_refs {
        pdf.type1_font(font_ref)
            .base_font(Name(base))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    let logo_ref = embed_png(&mut pdf, &mut alloc, &assets.logo_png, "logo")?;
    let footer_ref = match &assets.footer_png {
        Some(data) => Some(embed_png(&mut pdf, &mut alloc, data, "footer")?),
        None => None,
    };
    let qr_ref = embed_gray(&mut pdf, &mut alloc, qr);

    let mut image_xobjects: Vec<(&[u8], Ref)> =
        vec![(b"Logo".as_slice(), logo_ref), (b"Qr".as_slice(), qr_ref)];
    if let Some(footer_ref) = footer_ref {
        image_xobjects.push((b"Footer".as_slice(), footer_ref));
    }

    let t_images = t0.elapsed();

    let mut all_contents: Vec<Content> = Vec::new();
    for page in pages {
        let mut content = Content::new();
        for op in &page.ops {
            match op {
                DrawOp::Text {
                    x,
                    y,
                    text,
                    size_pt,
                    style,
                    align,
                    max_width,
                } => {
                    draw_text(
                        &mut content,
                        geom,
                        measure,
                        *x,
                        *y,
                        text,
                        *size_pt,
                        *style,
                        *align,
                        *max_width,
                    );
                }
                DrawOp::Rect { x, y, w, h } => {
                    content.save_state();
                    content.set_line_width(0.4);
                    content.rect(
                        x * MM_TO_PT,
                        (geom.page_height - y - h) * MM_TO_PT,
                        w * MM_TO_PT,
                        h * MM_TO_PT,
                    );
                    content.stroke();
                    content.restore_state();
                }
                DrawOp::Image { kind, x, y, w, h } => {
                    let name = match kind {
                        ImageKind::Logo => Name(b"Logo"),
                        ImageKind::Qr => Name(b"Qr"),
                    };
                    content.save_state();
                    content.transform([
                        w * MM_TO_PT,
                        0.0,
                        0.0,
                        h * MM_TO_PT,
                        x * MM_TO_PT,
                        (geom.page_height - y - h) * MM_TO_PT,
                    ]);
                    content.x_object(name);
                    content.restore_state();
                }
            }
        }
        all_contents.push(content);
    }

    let t_layout = t0.elapsed();

    // Page numbers and the footer band need the final count, so they go on
    // after the page sequence has been fully pulled.
    let total = all_contents.len();
    for (idx, content) in all_contents.iter_mut().enumerate() {
        draw_text(
            content,
            geom,
            measure,
            geom.page_width / 2.0,
            geom.page_height - 35.0,
            &format!("Page {} of {}", idx + 1, total),
            10.0,
            FontStyle::Regular,
            Align::Center,
            None,
        );
        if idx == total - 1 && footer_ref.is_some() {
            content.save_state();
            content.transform([
                geom.page_width * MM_TO_PT,
                0.0,
                0.0,
                30.0 * MM_TO_PT,
                0.0,
                0.0,
            ]);
            content.x_object(Name(b"Footer"));
            content.restore_state();
        }
    }

    let t_retrofit = t0.elapsed();

    let page_ids: Vec<Ref> = (0..total).map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = (0..total).map(|_| alloc()).collect();

    for (i, c) in all_contents.into_iter().enumerate() {
        let raw = c.finish();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
        pdf.stream(content_ids[i], &compressed).filter(Filter::FlateDecode);
    }

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(total as i32);

    for i in 0..total {
        let mut page = pdf.page(page_ids[i]);
        page.media_box(Rect::new(
            0.0,
            0.0,
            geom.page_width * MM_TO_PT,
            geom.page_height * MM_TO_PT,
        ))
        .parent(pages_id)
        .contents(content_ids[i]);
        let mut resources = page.resources();
        {
            let mut fonts = resources.fonts();
            for &(name, _, font_ref) in &font_refs {
                fonts.pair(name, font_ref);
            }
        }
        let mut xobjects = resources.x_objects();
        for &(name, xobj_ref) in &image_xobjects {
            xobjects.pair(Name(name), xobj_ref);
        }
    }

    let t_assembly = t0.elapsed();

    log::info!(
        "Render phases: images={:.1}ms, layout={:.1}ms, retrofit={:.1}ms, assembly={:.1}ms ({} pages)",
        t_images.as_secs_f64() * 1000.0,
        (t_layout - t_images).as_secs_f64() * 1000.0,
        (t_retrofit - t_layout).as_secs_f64() * 1000.0,
        (t_assembly - t_retrofit).as_secs_f64() * 1000.0,
        total,
    );

    Ok(pdf.finish())
}
