use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;

use crate::error::ConvertError;

/// Extensions accepted as inputs, lowercase and without the leading dot.
pub static SUPPORTED_INPUTS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "jpeg", "jpg", "png", "heic", "ppm", "blp", "bmp", "dds", "dib", "eps", "gif", "icns",
        "ico", "im", "msp", "pcx", "tiff", "sgi", "spider", "tga", "xbm", "webp", "avif",
    ]
    .into_iter()
    .collect()
});

/// Targets offered to the user, sorted.
pub const SUPPORTED_OUTPUTS: &[&str] = &["HEIC", "JPG", "PDF", "PNG", "PPM", "TIFF", "WEBP"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Heic,
    Jpeg,
    Pdf,
    Png,
    Ppm,
    Tiff,
    Webp,
}

impl OutputFormat {
    pub fn as_str(&self) -> &str {
        match self {
            OutputFormat::Heic => "HEIC",
            OutputFormat::Jpeg => "JPEG",
            OutputFormat::Pdf => "PDF",
            OutputFormat::Png => "PNG",
            OutputFormat::Ppm => "PPM",
            OutputFormat::Tiff => "TIFF",
            OutputFormat::Webp => "WebP",
        }
    }

    /// Whether this build can write the format. HEIC needs the `heif` feature.
    pub fn can_encode(&self) -> bool {
        match self {
            OutputFormat::Heic => cfg!(feature = "heif"),
            _ => true,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        let format = match name {
            "jpg" | "jpeg" => OutputFormat::Jpeg,
            "png" => OutputFormat::Png,
            "tif" | "tiff" => OutputFormat::Tiff,
            "webp" => OutputFormat::Webp,
            "ppm" => OutputFormat::Ppm,
            "heic" | "heif" => OutputFormat::Heic,
            "pdf" => OutputFormat::Pdf,
            _ => return None,
        };
        Some(format)
    }
}

/// A target chosen by the user.
///
/// The lowercase spelling the user picked is kept verbatim: it becomes both
/// the output extension and part of the output directory name, so `JPEG`
/// and `JPG` land in different folders with different extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFormat {
    format: OutputFormat,
    name: String,
}

impl TargetFormat {
    pub fn parse(raw: &str) -> Result<Self, ConvertError> {
        let name = raw.trim().to_lowercase();
        let format = OutputFormat::from_name(&name)
            .ok_or_else(|| ConvertError::UnknownTarget(raw.to_string()))?;
        Ok(Self { format, name })
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn extension(&self) -> &str {
        &self.name
    }

    pub fn output_dir_name(&self) -> String {
        format!("converted_{}", self.name)
    }

    pub fn is_jpeg(&self) -> bool {
        self.format == OutputFormat::Jpeg
    }
}

impl FromStr for TargetFormat {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outputs_are_sorted_and_parse() {
        let mut sorted = SUPPORTED_OUTPUTS.to_vec();
        sorted.sort();
        assert_eq!(sorted, SUPPORTED_OUTPUTS);

        for name in SUPPORTED_OUTPUTS {
            assert!(TargetFormat::parse(name).is_ok(), "{name} should parse");
        }
    }

    #[test]
    fn inputs_are_lowercase_without_dots() {
        assert_eq!(SUPPORTED_INPUTS.len(), 23);
        for ext in SUPPORTED_INPUTS.iter() {
            assert_eq!(*ext, ext.to_lowercase());
            assert!(!ext.starts_with('.'));
        }
    }

    #[test]
    fn target_keeps_chosen_spelling() {
        let jpg: TargetFormat = "JPG".parse().unwrap();
        let jpeg: TargetFormat = "Jpeg".parse().unwrap();
        assert_eq!(jpg.format(), OutputFormat::Jpeg);
        assert_eq!(jpeg.format(), OutputFormat::Jpeg);
        assert_eq!(jpg.extension(), "jpg");
        assert_eq!(jpeg.output_dir_name(), "converted_jpeg");
        assert!(jpg.is_jpeg());
        assert_eq!(jpeg.to_string(), "jpeg");
    }

    #[test]
    fn unknown_target_is_rejected() {
        let err = TargetFormat::parse("bmpx").unwrap_err();
        assert!(matches!(err, ConvertError::UnknownTarget(ref name) if name == "bmpx"));
    }

    #[test]
    fn heic_encoder_follows_the_heif_feature() {
        let heic = TargetFormat::parse("heic").unwrap();
        assert_eq!(heic.format().can_encode(), cfg!(feature = "heif"));
        assert!(TargetFormat::parse("png").unwrap().format().can_encode());
    }
}
