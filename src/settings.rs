use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::modules::converter::{Converter, DEFAULT_JPEG_QUALITY};
use crate::modules::formats::SUPPORTED_OUTPUTS;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("settings are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemePreference {
    #[default]
    System,
    Light,
    Dark,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub target_format: String,
    pub theme_preference: ThemePreference,
    pub output_root: Option<PathBuf>,
    pub jpeg_quality: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_format: "JPG".to_string(),
            theme_preference: ThemePreference::System,
            output_root: None,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl Settings {
    pub fn load() -> Self {
        let config_path = Self::get_config_path();
        match Self::load_from(&config_path) {
            Ok(settings) => settings,
            Err(SettingsError::Io(e)) if e.kind() == io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                log::warn!("Ignoring settings at {}: {}", config_path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        let config_path = Self::get_config_path();
        if let Err(e) = self.save_to(&config_path) {
            log::warn!("Could not save settings to {}: {}", config_path.display(), e);
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn get_config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("image_converter");
        path.push("settings.json");
        path
    }

    /// Stored target if it is still offered, otherwise the first offered one.
    pub fn target_or_default(&self) -> &str {
        SUPPORTED_OUTPUTS
            .iter()
            .find(|name| name.eq_ignore_ascii_case(&self.target_format))
            .copied()
            .unwrap_or(SUPPORTED_OUTPUTS[0])
    }

    pub fn converter(&self) -> Converter {
        let root = self.output_root.clone().unwrap_or_default();
        Converter::new(root).with_jpeg_quality(self.jpeg_quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn round_trips_through_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let settings = Settings {
            target_format: "PNG".to_string(),
            theme_preference: ThemePreference::Dark,
            output_root: Some(PathBuf::from("/data/out")),
            jpeg_quality: 90,
        };
        settings.save_to(&path).unwrap();

        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "target_format": "WEBP" }"#).unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.target_format, "WEBP");
        assert_eq!(settings.jpeg_quality, DEFAULT_JPEG_QUALITY);
        assert_eq!(settings.theme_preference, ThemePreference::System);
        assert!(settings.output_root.is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(Settings::load_from(&path), Err(SettingsError::Json(_))));
    }

    #[test]
    fn unknown_target_falls_back_to_first_output() {
        let mut settings = Settings::default();
        assert_eq!(settings.target_or_default(), "JPG");

        settings.target_format = "tiff".to_string();
        assert_eq!(settings.target_or_default(), "TIFF");

        settings.target_format = "BMP".to_string();
        assert_eq!(settings.target_or_default(), SUPPORTED_OUTPUTS[0]);
    }

    #[test]
    fn converter_uses_stored_values() {
        let settings = Settings {
            output_root: Some(PathBuf::from("exports")),
            jpeg_quality: 0,
            ..Settings::default()
        };
        let converter = settings.converter();
        assert_eq!(converter.output_root(), Path::new("exports"));
        assert_eq!(converter.jpeg_quality(), 1);
    }
}
