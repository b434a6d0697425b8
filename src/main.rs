mod app;
mod cli;
mod style;

use std::process::ExitCode;

use clap::Parser;
use eframe::egui;

use image_converter::Settings;

use crate::app::ConverterApp;
use crate::cli::{Cli, Session};

fn run_window(session: Session) -> ExitCode {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([600.0, 400.0])
            .with_min_inner_size([420.0, 360.0])
            .with_drag_and_drop(true)
            .with_title("Image Converter"),
        ..Default::default()
    };

    let result = eframe::run_native(
        "Image Converter",
        options,
        Box::new(|cc| Ok(Box::new(ConverterApp::new(cc, session)))),
    );

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Window closed with an error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    if cli.list_formats {
        println!("{}", cli::format_list());
        return ExitCode::SUCCESS;
    }

    let session = Session::new(Settings::load(), &cli);

    if cli.files.is_empty() {
        return run_window(session);
    }
    cli::run_headless(&cli.files, &session.active)
}
