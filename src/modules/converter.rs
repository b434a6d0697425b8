use std::fs;
use std::io::{self, Cursor, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::{ColorType, DynamicImage, ImageBuffer, ImageError, ImageFormat, Pixel};

use super::decoders::decode;
use super::formats::{OutputFormat, TargetFormat};
use super::naming;
use super::pdf::{self, PdfColorSpace};
use crate::error::{ConvertError, Result};

/// Quality used when none is configured; matches the usual codec default.
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Converts single files into `<output_root>/converted_<target>/`.
///
/// Holds no state between calls; every conversion decodes, transforms and
/// writes one file on the calling thread.
#[derive(Debug, Clone)]
pub struct Converter {
    output_root: PathBuf,
    jpeg_quality: u8,
}

impl Default for Converter {
    fn default() -> Self {
        Self {
            output_root: PathBuf::new(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl Converter {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            ..Self::default()
        }
    }

    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    pub fn output_dir(&self, target: &TargetFormat) -> PathBuf {
        self.output_root.join(target.output_dir_name())
    }

    /// Convert `source` to `target`, returning the path that was written.
    pub fn convert(&self, source: &Path, target: &TargetFormat) -> Result<PathBuf> {
        log::info!("Converting file: {} to {}", source.display(), target);

        let result = self.convert_inner(source, target);
        match &result {
            Ok(path) => log::info!("Image saved successfully: {}", path.display()),
            Err(e) => log::warn!("Error during conversion for {}: {}", source.display(), e),
        }
        result
    }

    fn convert_inner(&self, source: &Path, target: &TargetFormat) -> Result<PathBuf> {
        let decoded = decode(source)?;
        log::debug!(
            "Opened image: {} ({}x{}, {:?})",
            source.display(),
            decoded.width(),
            decoded.height(),
            decoded.color()
        );

        let mut image = strip_metadata(&decoded);
        drop(decoded);

        if needs_jpeg_samples(target.format()) {
            image = to_jpeg_samples(image);
        } else if target.format() == OutputFormat::Ppm {
            image = to_pixmap_samples(image);
        }

        if !target.format().can_encode() {
            return Err(ConvertError::UnsupportedTarget {
                format: target.to_string(),
            });
        }

        let bytes = self.encode(&image, target.format(), source)?;
        self.persist(&bytes, source, target)
    }

    fn encode(&self, image: &DynamicImage, format: OutputFormat, source: &Path) -> Result<Vec<u8>> {
        let encode_err = |e: ImageError| ConvertError::Encode {
            path: source.to_path_buf(),
            source: e,
        };

        let mut bytes = Vec::new();
        match format {
            OutputFormat::Jpeg => {
                let encoder = JpegEncoder::new_with_quality(&mut bytes, self.jpeg_quality);
                image.write_with_encoder(encoder).map_err(encode_err)?;
            }
            OutputFormat::Png => {
                let encoder = PngEncoder::new_with_quality(
                    &mut bytes,
                    CompressionType::Default,
                    FilterType::Adaptive,
                );
                image.write_with_encoder(encoder).map_err(encode_err)?;
            }
            OutputFormat::Tiff => {
                image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Tiff).map_err(encode_err)?;
            }
            OutputFormat::Webp => {
                image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::WebP).map_err(encode_err)?;
            }
            OutputFormat::Ppm => {
                let encoder =
                    PnmEncoder::new(&mut bytes).with_subtype(PnmSubtype::Pixmap(SampleEncoding::Binary));
                image.write_with_encoder(encoder).map_err(encode_err)?;
            }
            OutputFormat::Pdf => {
                let mut jpeg = Vec::new();
                let encoder = JpegEncoder::new_with_quality(&mut jpeg, self.jpeg_quality);
                image.write_with_encoder(encoder).map_err(encode_err)?;

                let color_space = if image.color().channel_count() == 1 {
                    PdfColorSpace::Gray
                } else {
                    PdfColorSpace::Rgb
                };
                bytes = pdf::jpeg_page(&jpeg, image.width(), image.height(), color_space);
            }
            OutputFormat::Heic => {
                bytes = self.encode_heic(image).map_err(encode_err)?;
            }
        }
        Ok(bytes)
    }

    #[cfg(feature = "heif")]
    fn encode_heic(&self, image: &DynamicImage) -> std::result::Result<Vec<u8>, ImageError> {
        use image::error::{EncodingError, ImageFormatHint};

        super::heif::encode(image, self.jpeg_quality).map_err(|e| {
            ImageError::Encoding(EncodingError::new(ImageFormatHint::Name("HEIF".to_string()), e))
        })
    }

    #[cfg(not(feature = "heif"))]
    fn encode_heic(&self, _image: &DynamicImage) -> std::result::Result<Vec<u8>, ImageError> {
        use image::error::{ImageFormatHint, UnsupportedError, UnsupportedErrorKind};

        let hint = ImageFormatHint::Name("HEIF".to_string());
        Err(ImageError::Unsupported(UnsupportedError::from_format_and_kind(
            hint.clone(),
            UnsupportedErrorKind::Format(hint),
        )))
    }

    fn persist(&self, bytes: &[u8], source: &Path, target: &TargetFormat) -> Result<PathBuf> {
        let stem = source.file_stem().ok_or_else(|| {
            ConvertError::io(
                source,
                io::Error::new(io::ErrorKind::InvalidInput, "source has no file name"),
            )
        })?;

        let dir = self.output_dir(target);
        if !dir.is_dir() {
            log::info!("Creating output folder: {}", dir.display());
            fs::create_dir_all(&dir).map_err(|e| ConvertError::io(&dir, e))?;
        }

        let (path, mut file) =
            naming::claim(&dir, stem, target.extension()).map_err(|e| ConvertError::io(&dir, e))?;
        log::info!("Saving image to: {}", path.display());

        if let Err(e) = file.write_all(bytes).and_then(|()| file.sync_all()) {
            drop(file);
            if let Err(cleanup) = fs::remove_file(&path) {
                log::warn!("Could not remove partial output {}: {}", path.display(), cleanup);
            }
            return Err(ConvertError::io(&path, e));
        }

        Ok(path)
    }
}

/// Convert `source` into `converted_<target>` under the working directory.
pub fn convert(source: impl AsRef<Path>, target_format: &str) -> Result<PathBuf> {
    let target = TargetFormat::parse(target_format)?;
    Converter::default().convert(source.as_ref(), &target)
}

/// Copy only the pixels of `image` into a freshly allocated buffer of the
/// same colour type and size. Nothing else of the decoded file survives.
pub fn strip_metadata(image: &DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(buf) => DynamicImage::ImageLuma8(copy_pixels(buf)),
        DynamicImage::ImageLumaA8(buf) => DynamicImage::ImageLumaA8(copy_pixels(buf)),
        DynamicImage::ImageRgb8(buf) => DynamicImage::ImageRgb8(copy_pixels(buf)),
        DynamicImage::ImageRgba8(buf) => DynamicImage::ImageRgba8(copy_pixels(buf)),
        DynamicImage::ImageLuma16(buf) => DynamicImage::ImageLuma16(copy_pixels(buf)),
        DynamicImage::ImageLumaA16(buf) => DynamicImage::ImageLumaA16(copy_pixels(buf)),
        DynamicImage::ImageRgb16(buf) => DynamicImage::ImageRgb16(copy_pixels(buf)),
        DynamicImage::ImageRgba16(buf) => DynamicImage::ImageRgba16(copy_pixels(buf)),
        DynamicImage::ImageRgb32F(buf) => DynamicImage::ImageRgb32F(copy_pixels(buf)),
        DynamicImage::ImageRgba32F(buf) => DynamicImage::ImageRgba32F(copy_pixels(buf)),
        other => DynamicImage::ImageRgba32F(other.to_rgba32f()),
    }
}

fn copy_pixels<P: Pixel>(source: &ImageBuffer<P, Vec<P::Subpixel>>) -> ImageBuffer<P, Vec<P::Subpixel>> {
    let mut copy = ImageBuffer::new(source.width(), source.height());
    for (dst, src) in copy.pixels_mut().zip(source.pixels()) {
        *dst = *src;
    }
    copy
}

fn needs_jpeg_samples(format: OutputFormat) -> bool {
    matches!(format, OutputFormat::Jpeg | OutputFormat::Pdf)
}

/// Reduce `image` to what a JPEG stream can hold: 8-bit gray or RGB, no alpha.
pub fn to_jpeg_samples(image: DynamicImage) -> DynamicImage {
    let color = image.color();
    if color.has_alpha() {
        log::info!("Converting {color:?} to RGB for JPEG format");
        return DynamicImage::ImageRgb8(image.to_rgb8());
    }

    match color {
        ColorType::L8 | ColorType::Rgb8 => image,
        ColorType::L16 => DynamicImage::ImageLuma8(image.to_luma8()),
        _ => DynamicImage::ImageRgb8(image.to_rgb8()),
    }
}

/// Reduce `image` to 8-bit RGB, the only layout a binary PPM pixmap holds.
pub fn to_pixmap_samples(image: DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageRgb8(_) => image,
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Luma, LumaA, Rgba, RgbaImage};
    use tempfile::TempDir;

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 2) as u8, (y * 2) as u8, ((x + y) % 256) as u8, (x % 200 + 55) as u8])
        })
    }

    #[test]
    fn strip_keeps_type_size_and_pixels() {
        let original = DynamicImage::ImageRgba8(gradient(17, 9));
        let stripped = strip_metadata(&original);

        assert_eq!(stripped.color(), ColorType::Rgba8);
        assert_eq!(stripped.dimensions(), (17, 9));
        assert_eq!(stripped.as_bytes(), original.as_bytes());
    }

    #[test]
    fn strip_keeps_sixteen_bit_gray() {
        let buf = ImageBuffer::from_fn(4, 4, |x, y| Luma([(x * 1000 + y) as u16]));
        let original = DynamicImage::ImageLuma16(buf);
        let stripped = strip_metadata(&original);

        assert_eq!(stripped.color(), ColorType::L16);
        assert_eq!(stripped.as_bytes(), original.as_bytes());
    }

    #[test]
    fn jpeg_samples_drop_alpha() {
        let rgba = DynamicImage::ImageRgba8(gradient(3, 3));
        assert_eq!(to_jpeg_samples(rgba).color(), ColorType::Rgb8);

        let gray_alpha = DynamicImage::ImageLumaA8(ImageBuffer::from_pixel(2, 2, LumaA([10u8, 20])));
        assert_eq!(to_jpeg_samples(gray_alpha).color(), ColorType::Rgb8);
    }

    #[test]
    fn jpeg_samples_narrow_deep_images() {
        let gray16 = DynamicImage::ImageLuma16(ImageBuffer::from_pixel(2, 2, Luma([40_000u16])));
        assert_eq!(to_jpeg_samples(gray16).color(), ColorType::L8);

        let gray8 = DynamicImage::ImageLuma8(ImageBuffer::from_pixel(2, 2, Luma([7u8])));
        assert_eq!(to_jpeg_samples(gray8).color(), ColorType::L8);
    }

    #[test]
    fn pixmap_samples_are_rgb8() {
        let rgba = DynamicImage::ImageRgba8(gradient(3, 3));
        let gray = DynamicImage::ImageLuma8(ImageBuffer::from_pixel(2, 2, Luma([7u8])));
        let deep = DynamicImage::ImageLuma16(ImageBuffer::from_pixel(2, 2, Luma([40_000u16])));

        for image in [rgba, gray, deep] {
            assert_eq!(to_pixmap_samples(image).color(), ColorType::Rgb8);
        }
    }

    #[test]
    fn quality_is_clamped() {
        assert_eq!(Converter::default().with_jpeg_quality(0).jpeg_quality(), 1);
        assert_eq!(Converter::default().with_jpeg_quality(250).jpeg_quality(), 100);
        assert_eq!(Converter::default().jpeg_quality(), DEFAULT_JPEG_QUALITY);
    }

    #[test]
    fn output_dir_uses_lowercase_target() {
        let converter = Converter::new("/tmp/out");
        let target = TargetFormat::parse("TIFF").unwrap();
        assert_eq!(converter.output_dir(&target), Path::new("/tmp/out/converted_tiff"));
    }

    #[test]
    fn missing_source_is_io_error() {
        let dir = TempDir::new().unwrap();
        let converter = Converter::new(dir.path());
        let target = TargetFormat::parse("png").unwrap();

        let err = converter.convert(&dir.path().join("ghost.png"), &target).unwrap_err();
        assert!(matches!(err, ConvertError::Io { .. }));
        assert!(!dir.path().join("converted_png").exists());
    }
}
