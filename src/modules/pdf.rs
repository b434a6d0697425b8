//! Single-page PDF document around an already encoded JPEG stream.
//!
//! Pixels are encoded by the `image` crate and the document structure by
//! `pdf-writer`. No Info dictionary is written, so the document carries no
//! producer or date metadata.

use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref};

/// Colour space of the embedded JPEG stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfColorSpace {
    Gray,
    Rgb,
}

const IMAGE_NAME: Name<'static> = Name(b"Im0");

/// Build a one-page document whose page is exactly `width` x `height` points
/// (one point per pixel) and shows `jpeg` full-bleed.
pub fn jpeg_page(jpeg: &[u8], width: u32, height: u32, color_space: PdfColorSpace) -> Vec<u8> {
    let catalog_id = Ref::new(1);
    let page_tree_id = Ref::new(2);
    let page_id = Ref::new(3);
    let image_id = Ref::new(4);
    let content_id = Ref::new(5);

    let (w, h) = (width as f32, height as f32);
    let mut pdf = Pdf::new();

    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id).kids([page_id]).count(1);

    let mut page = pdf.page(page_id);
    page.media_box(Rect::new(0.0, 0.0, w, h));
    page.parent(page_tree_id);
    page.contents(content_id);
    page.resources().x_objects().pair(IMAGE_NAME, image_id);
    page.finish();

    let mut image = pdf.image_xobject(image_id, jpeg);
    image.filter(Filter::DctDecode);
    image.width(width as i32);
    image.height(height as i32);
    match color_space {
        PdfColorSpace::Gray => image.color_space().device_gray(),
        PdfColorSpace::Rgb => image.color_space().device_rgb(),
    };
    image.bits_per_component(8);
    image.finish();

    let mut content = Content::new();
    content.save_state();
    content.transform([w, 0.0, 0.0, h, 0.0, 0.0]);
    content.x_object(IMAGE_NAME);
    content.restore_state();
    pdf.stream(content_id, &content.finish());

    pdf.finish()
}
