//! HEIF/HEIC through libheif.
//!
//! Images cross the boundary as interleaved 8-bit RGB or RGBA. libheif rows
//! may be padded, so copies always go row by row using the plane stride.

use std::error::Error;

use image::{DynamicImage, RgbImage, RgbaImage};
use libheif_rs::{
    Channel, ColorSpace, CompressionFormat, EncoderQuality, HeifContext, Image as HeifImage, LibHeif,
    RgbChroma,
};

type BoxError = Box<dyn Error + Send + Sync>;

/// Decode the primary image of a HEIF container.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, BoxError> {
    let lib_heif = LibHeif::new();
    let context = HeifContext::read_from_bytes(bytes)?;
    let handle = context.primary_image_handle()?;

    let has_alpha = handle.has_alpha_channel();
    let chroma = if has_alpha { RgbChroma::Rgba } else { RgbChroma::Rgb };
    let decoded = lib_heif.decode(&handle, ColorSpace::Rgb(chroma), None)?;

    let planes = decoded.planes();
    let plane = planes.interleaved.ok_or("decoded image has no interleaved plane")?;
    let (width, height) = (plane.width, plane.height);
    let channels = if has_alpha { 4 } else { 3 };
    let row_len = width as usize * channels;

    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for row in plane.data.chunks(plane.stride).take(height as usize) {
        pixels.extend_from_slice(&row[..row_len]);
    }

    let image = if has_alpha {
        RgbaImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgba8)
    } else {
        RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8)
    };
    image.ok_or_else(|| "decoded plane is smaller than its size".into())
}

/// Encode `image` as a single-image HEIC file with the HEVC encoder.
pub fn encode(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, BoxError> {
    let (width, height) = (image.width(), image.height());
    let (chroma, channels, pixels) = if image.color().has_alpha() {
        (RgbChroma::Rgba, 4, image.to_rgba8().into_raw())
    } else {
        (RgbChroma::Rgb, 3, image.to_rgb8().into_raw())
    };
    let row_len = width as usize * channels;

    let mut heif_image = HeifImage::new(width, height, ColorSpace::Rgb(chroma))?;
    heif_image.create_plane(Channel::Interleaved, width, height, 8)?;
    {
        let planes = heif_image.planes_mut();
        let mut plane = planes.interleaved.ok_or("new image has no interleaved plane")?;
        let stride = plane.stride;
        for (y, row) in pixels.chunks_exact(row_len).enumerate() {
            plane.data[y * stride..y * stride + row_len].copy_from_slice(row);
        }
    }

    let lib_heif = LibHeif::new();
    let mut encoder = lib_heif.encoder_for_format(CompressionFormat::Hevc)?;
    encoder.set_quality(EncoderQuality::Lossy(quality))?;

    let mut context = HeifContext::new()?;
    context.encode_image(&heif_image, &mut encoder, None)?;
    Ok(context.write_to_bytes()?)
}
