//! Input decoding.
//!
//! Most formats go through `image`. HEIF, ICNS and PCX are read with their own
//! crates and handed back as a [`DynamicImage`], so the rest of the pipeline
//! never sees the difference. Content wins over the extension: the extension
//! is only consulted when the leading bytes match nothing known.

use std::error::Error;
use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::error::{DecodingError, ImageFormatHint};
use image::{DynamicImage, ImageError, ImageFormat, ImageReader, RgbImage, RgbaImage};

use super::validator::extension_of;
use crate::error::{ConvertError, Result};

type BoxError = Box<dyn Error + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Codec {
    Image,
    Heif,
    Icns,
    Pcx,
}

impl Codec {
    fn name(&self) -> &'static str {
        match self {
            Codec::Image => "image",
            Codec::Heif => "HEIF",
            Codec::Icns => "ICNS",
            Codec::Pcx => "PCX",
        }
    }
}

const HEIF_BRANDS: &[&[u8; 4]] = &[
    b"heic", b"heix", b"hevc", b"hevx", b"heim", b"heis", b"hevm", b"hevs", b"mif1", b"msf1",
];

/// True for an ISO-BMFF `ftyp` box naming a HEIF brand that is not AVIF.
fn is_heif(bytes: &[u8]) -> bool {
    if bytes.len() < 12 || &bytes[4..8] != b"ftyp" {
        return false;
    }
    let box_len = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
    let ftyp = &bytes[8..box_len.clamp(12, bytes.len())];
    let brands: Vec<&[u8]> = ftyp.chunks_exact(4).collect();

    !brands.contains(&b"avif".as_slice())
        && brands.iter().any(|brand| HEIF_BRANDS.iter().any(|heif| heif.as_slice() == *brand))
}

/// ZSoft header: manufacturer 0x0A, version 0-5, RLE encoding.
fn is_pcx(bytes: &[u8]) -> bool {
    bytes.len() >= 128 && bytes[0] == 0x0A && bytes[1] <= 5 && bytes[2] == 1
}

fn detect(bytes: &[u8], path: &Path) -> Codec {
    if is_heif(bytes) {
        return Codec::Heif;
    }
    if bytes.starts_with(b"icns") {
        return Codec::Icns;
    }
    if image::guess_format(bytes).is_ok() {
        return Codec::Image;
    }
    if is_pcx(bytes) {
        return Codec::Pcx;
    }
    match extension_of(path).as_str() {
        "heic" | "heif" => Codec::Heif,
        "icns" => Codec::Icns,
        "pcx" => Codec::Pcx,
        _ => Codec::Image,
    }
}

/// Decode the file at `path` into pixels.
pub fn decode(path: &Path) -> Result<DynamicImage> {
    let bytes = fs::read(path).map_err(|e| ConvertError::io(path, e))?;

    let codec = detect(&bytes, path);
    log::debug!("Decoding {} with the {} decoder", path.display(), codec.name());

    let decoded = match codec {
        Codec::Image => decode_with_image(bytes, path),
        other => {
            let result = match other {
                Codec::Heif => decode_heif(&bytes),
                Codec::Icns => decode_icns(&bytes),
                _ => decode_pcx(&bytes),
            };
            result.map_err(|e| {
                ImageError::Decoding(DecodingError::new(ImageFormatHint::Name(other.name().to_string()), e))
            })
        }
    };

    decoded.map_err(|source| ConvertError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

fn decode_with_image(bytes: Vec<u8>, path: &Path) -> std::result::Result<DynamicImage, ImageError> {
    let mut reader = ImageReader::new(Cursor::new(bytes));
    if let Ok(format) = ImageFormat::from_path(path) {
        reader.set_format(format);
    }
    reader.with_guessed_format().map_err(ImageError::IoError)?.decode()
}

fn decode_pcx(bytes: &[u8]) -> std::result::Result<DynamicImage, BoxError> {
    let mut reader = pcx::Reader::new(Cursor::new(bytes))?;
    let width = reader.width() as usize;
    let height = reader.height() as usize;
    if width == 0 || height == 0 {
        return Err("image has no pixels".into());
    }

    if !reader.is_paletted() {
        let mut rgb = vec![0u8; width * height * 3];
        for row in rgb.chunks_exact_mut(width * 3) {
            reader.next_row_rgb(row)?;
        }
        return rgb_image(width, height, rgb);
    }

    let mut indices = vec![0u8; width * height];
    for row in indices.chunks_exact_mut(width) {
        reader.next_row_paletted(row)?;
    }
    let mut palette = [0u8; 256 * 3];
    let entries = reader.read_palette(&mut palette)?;

    let mut rgb = Vec::with_capacity(width * height * 3);
    for &index in &indices {
        let index = index as usize;
        if index >= entries {
            return Err(format!("palette index {index} out of range ({entries} entries)").into());
        }
        rgb.extend_from_slice(&palette[index * 3..index * 3 + 3]);
    }
    rgb_image(width, height, rgb)
}

fn rgb_image(width: usize, height: usize, rgb: Vec<u8>) -> std::result::Result<DynamicImage, BoxError> {
    RgbImage::from_raw(width as u32, height as u32, rgb)
        .map(DynamicImage::ImageRgb8)
        .ok_or_else(|| "pixel buffer does not match the header size".into())
}

/// Largest icon in the family that the crate can decode.
fn decode_icns(bytes: &[u8]) -> std::result::Result<DynamicImage, BoxError> {
    let family = icns::IconFamily::read(Cursor::new(bytes))?;

    let mut types = family.available_icons();
    types.sort_by_key(|t| std::cmp::Reverse(t.pixel_width() * t.pixel_height()));

    let mut last_error: Option<BoxError> = None;
    for icon_type in types {
        match family.get_icon_with_type(icon_type) {
            Ok(icon) => {
                let icon = icon.convert_to(icns::PixelFormat::RGBA);
                let (width, height) = (icon.width(), icon.height());
                return RgbaImage::from_raw(width, height, icon.into_data().into_vec())
                    .map(DynamicImage::ImageRgba8)
                    .ok_or_else(|| "icon data does not match its size".into());
            }
            Err(e) => last_error = Some(e.into()),
        }
    }
    Err(last_error.unwrap_or_else(|| "icon family holds no images".into()))
}

#[cfg(feature = "heif")]
fn decode_heif(bytes: &[u8]) -> std::result::Result<DynamicImage, BoxError> {
    super::heif::decode(bytes)
}

#[cfg(not(feature = "heif"))]
fn decode_heif(_bytes: &[u8]) -> std::result::Result<DynamicImage, BoxError> {
    Err("built without HEIF support (enable the `heif` feature)".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb};
    use tempfile::TempDir;

    fn ftyp(major: &[u8; 4], compatible: &[&[u8; 4]]) -> Vec<u8> {
        let len = 16 + 4 * compatible.len();
        let mut bytes = (len as u32).to_be_bytes().to_vec();
        bytes.extend_from_slice(b"ftyp");
        bytes.extend_from_slice(major);
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        for brand in compatible {
            bytes.extend_from_slice(*brand);
        }
        bytes.extend_from_slice(b"\0\0\0\x08meta");
        bytes
    }

    /// 4x2 paletted PCX (version 5, 8 bits, one plane) with a VGA palette.
    fn paletted_pcx() -> Vec<u8> {
        let (width, height) = (4u16, 2u16);
        let mut header = vec![0u8; 128];
        header[0] = 0x0A;
        header[1] = 5;
        header[2] = 1;
        header[3] = 8;
        header[8..10].copy_from_slice(&(width - 1).to_le_bytes());
        header[10..12].copy_from_slice(&(height - 1).to_le_bytes());
        header[65] = 1;
        header[66..68].copy_from_slice(&width.to_le_bytes());
        header[68..70].copy_from_slice(&1u16.to_le_bytes());

        let mut bytes = header;
        // Values below 0xC0 are literal bytes in the RLE stream.
        bytes.extend_from_slice(&[0, 1, 2, 3]);
        bytes.extend_from_slice(&[3, 2, 1, 0]);
        bytes.push(0x0C);
        let mut palette = vec![0u8; 256 * 3];
        palette[3..6].copy_from_slice(&[255, 0, 0]);
        palette[6..9].copy_from_slice(&[0, 255, 0]);
        palette[9..12].copy_from_slice(&[0, 0, 255]);
        bytes.extend_from_slice(&palette);
        bytes
    }

    #[test]
    fn heif_brands_are_recognised() {
        assert!(is_heif(&ftyp(b"heic", &[b"mif1", b"heic"])));
        assert!(is_heif(&ftyp(b"mif1", &[b"heix"])));
        assert!(!is_heif(&ftyp(b"avif", &[b"mif1", b"avif"])));
        assert!(!is_heif(&ftyp(b"mif1", &[b"avif"])));
        assert!(!is_heif(b"\x89PNG\r\n\x1a\n0000"));
    }

    #[test]
    fn content_decides_before_extension() {
        let png = b"\x89PNG\r\n\x1a\n rest";
        assert_eq!(detect(png, Path::new("x.heic")), Codec::Image);
        assert_eq!(detect(&ftyp(b"heic", &[]), Path::new("x.png")), Codec::Heif);
        assert_eq!(detect(b"icns\0\0\0\x08", Path::new("x.png")), Codec::Icns);
        assert_eq!(detect(&paletted_pcx(), Path::new("x.dat")), Codec::Pcx);
        assert_eq!(detect(b"garbage", Path::new("x.pcx")), Codec::Pcx);
        assert_eq!(detect(b"garbage", Path::new("x.HEIF")), Codec::Heif);
        assert_eq!(detect(b"garbage", Path::new("x.gif")), Codec::Image);
    }

    #[test]
    fn paletted_pcx_decodes_through_palette() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tiles.pcx");
        fs::write(&path, paletted_pcx()).unwrap();

        let image = decode(&path).unwrap();
        assert_eq!(image.dimensions(), (4, 2));
        let rgb = image.to_rgb8();
        assert_eq!(*rgb.get_pixel(0, 0), Rgb([0, 0, 0]));
        assert_eq!(*rgb.get_pixel(1, 0), Rgb([255, 0, 0]));
        assert_eq!(*rgb.get_pixel(3, 0), Rgb([0, 0, 255]));
        assert_eq!(*rgb.get_pixel(1, 1), Rgb([0, 255, 0]));
    }

    #[test]
    fn damaged_icns_is_a_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.icns");
        fs::write(&path, b"icns\0\0\0\xFFtruncated").unwrap();

        let err = decode(&path).unwrap_err();
        assert!(matches!(err, ConvertError::Decode { .. }), "got {err}");
    }

    #[cfg(not(feature = "heif"))]
    #[test]
    fn heif_without_feature_names_the_missing_support() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("photo.heic");
        fs::write(&path, ftyp(b"heic", &[b"mif1"])).unwrap();

        let err = decode(&path).unwrap_err();
        assert!(matches!(err, ConvertError::Decode { .. }));
        assert!(err.to_string().contains("heif"), "got {err}");
    }
}
