use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use image_converter::modules::batch;
use image_converter::{ConvertError, SUPPORTED_INPUTS, SUPPORTED_OUTPUTS, Settings, TargetFormat};

#[derive(Parser, Debug)]
#[command(name = "image_converter")]
#[command(about = "Convert images between formats, stripping metadata", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Images to convert; opens the window when none are given
    pub files: Vec<PathBuf>,

    /// Target format (HEIC, JPG, PDF, PNG, PPM, TIFF, WEBP)
    #[arg(short = 't', long = "to", value_name = "FORMAT")]
    pub target: Option<String>,

    /// Directory under which converted_<format>/ is created
    #[arg(short, long, value_name = "DIR")]
    pub output_root: Option<PathBuf>,

    /// JPEG quality used for JPG and PDF output
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: Option<u8>,

    /// Print the supported input extensions and output formats
    #[arg(long)]
    pub list_formats: bool,

    /// Enable debug logging
    #[arg(long, short)]
    pub verbose: bool,
}

impl Cli {
    /// Layer command-line overrides on top of stored settings.
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(target) = &self.target {
            settings.target_format = target.clone();
        }
        if let Some(root) = &self.output_root {
            settings.output_root = Some(root.clone());
        }
        if let Some(quality) = self.quality {
            settings.jpeg_quality = quality;
        }
    }
}

/// Settings for one run of the window.
///
/// `active` carries the command-line overrides and drives conversions.
/// `stored` mirrors the settings file and is the only copy ever saved, so
/// one-off flags never leak into later runs.
#[derive(Debug, Clone)]
pub struct Session {
    pub stored: Settings,
    pub active: Settings,
}

impl Session {
    pub fn new(stored: Settings, cli: &Cli) -> Self {
        let mut active = stored.clone();
        cli.apply_to(&mut active);
        Self { stored, active }
    }

    /// Apply a choice the user made to both copies.
    pub fn remember(&mut self, update: impl Fn(&mut Settings)) {
        update(&mut self.active);
        update(&mut self.stored);
    }
}

pub fn format_list() -> String {
    let mut inputs: Vec<&str> = SUPPORTED_INPUTS.iter().copied().collect();
    inputs.sort_unstable();
    format!(
        "Inputs:  {}\nOutputs: {}",
        inputs.join(", "),
        SUPPORTED_OUTPUTS.join(", ")
    )
}

/// Convert `files` without opening a window.
///
/// Exit codes: 0 when every file converted, 1 when some failed, 2 when the
/// batch was rejected before anything ran.
pub fn run_headless(files: &[PathBuf], settings: &Settings) -> ExitCode {
    let target = match TargetFormat::parse(&settings.target_format) {
        Ok(target) => target,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Supported outputs: {}", SUPPORTED_OUTPUTS.join(", "));
            return ExitCode::from(2);
        }
    };

    let report = batch::run(settings.converter(), files, target, |done, total, outcome| {
        match &outcome.result {
            Ok(path) => println!("[{done}/{total}] {} -> {}", outcome.source.display(), path.display()),
            Err(e) => println!("[{done}/{total}] {} failed: {e}", outcome.source.display()),
        }
    });

    match report {
        Ok(report) => {
            println!("{}", report.summary());
            if report.all_succeeded() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e @ ConvertError::Unacceptable { .. }) => {
            eprintln!("File formats not supported: {e}");
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(2)
        }
    }
}
