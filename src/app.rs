use eframe::egui;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use image_converter::modules::validator;
use image_converter::{
    Batch, BatchReport, ConvertError, SUPPORTED_INPUTS, SUPPORTED_OUTPUTS, Settings, TargetFormat,
    ThemePreference,
};

use crate::cli::Session;
use crate::style::{self, ColorPalette, PanelColors, ThemeMode};

const IDLE_STATUS: &str = "Accepting Images";
const FLASH_DURATION: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
struct PendingImage {
    path: PathBuf,
    extension: String,
    size_kb: Option<u64>,
}

impl PendingImage {
    fn new(path: PathBuf) -> Self {
        let extension = validator::extension_of(&path).to_uppercase();
        let size_kb = std::fs::metadata(&path).ok().map(|m| m.len() / 1024);
        Self { path, extension, size_kb }
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

/// Drag-and-drop front end. Conversions run one file per frame on the UI
/// thread so the progress bar moves between files.
pub struct ConverterApp {
    session: Session,
    theme_mode: ThemeMode,
    images: Vec<PendingImage>,
    batch: Option<Batch>,
    last_report: Option<BatchReport>,
    status: String,
    status_until: Option<Instant>,
    drag_hover: bool,
}

impl ConverterApp {
    pub fn new(cc: &eframe::CreationContext<'_>, mut session: Session) -> Self {
        session.active.target_format = session.active.target_or_default().to_string();

        let theme_mode = match session.active.theme_preference {
            ThemePreference::System => ThemeMode::from_system(cc.egui_ctx.theme()),
            ThemePreference::Light => ThemeMode::Light,
            ThemePreference::Dark => ThemeMode::Dark,
        };
        style::apply_theme(&cc.egui_ctx, theme_mode);

        Self {
            session,
            theme_mode,
            images: Vec::new(),
            batch: None,
            last_report: None,
            status: IDLE_STATUS.to_string(),
            status_until: None,
            drag_hover: false,
        }
    }

    /// Record a choice made in the window and write the stored settings.
    fn remember(&mut self, update: impl Fn(&mut Settings)) {
        self.session.remember(update);
        self.session.stored.save();
    }

    fn flash(&mut self, text: impl Into<String>) {
        self.status = text.into();
        self.status_until = Some(Instant::now() + FLASH_DURATION);
    }

    fn is_converting(&self) -> bool {
        self.batch.is_some()
    }

    fn add_images(&mut self, paths: Vec<PathBuf>) {
        if paths.is_empty() {
            return;
        }
        if validator::acceptable(&paths, &SUPPORTED_INPUTS) {
            self.images.extend(paths.into_iter().map(PendingImage::new));
            self.flash("Images added. Press 'Convert Images' to start processing.");
        } else {
            self.flash("File formats not supported");
        }
    }

    fn clear_images(&mut self) {
        self.images.clear();
        self.last_report = None;
    }

    fn start_conversion(&mut self) {
        if self.images.is_empty() {
            self.flash("No images to process");
            return;
        }

        let target = match TargetFormat::parse(&self.session.active.target_format) {
            Ok(target) => target,
            Err(e) => {
                self.flash(e.to_string());
                return;
            }
        };

        let paths: Vec<PathBuf> = self.images.iter().map(|img| img.path.clone()).collect();
        match Batch::new(self.session.active.converter(), &paths, target) {
            Ok(batch) => {
                self.last_report = None;
                self.status = "Images added. Processing...".to_string();
                self.status_until = None;
                self.batch = Some(batch);
            }
            Err(ConvertError::Unacceptable { .. }) => self.flash("File formats not supported"),
            Err(e) => self.flash(e.to_string()),
        }
    }

    fn step_conversion(&mut self, ctx: &egui::Context) {
        let Some(batch) = &mut self.batch else {
            return;
        };

        batch.step();
        if batch.is_finished() {
            if let Some(batch) = self.batch.take() {
                let report = batch.into_report();
                self.flash(format!("Done: {}", report.summary()));
                self.last_report = Some(report);
            }
        }
        ctx.request_repaint();
    }

    fn handle_file_drops(&mut self, ctx: &egui::Context) {
        let (hovered, dropped) = ctx.input(|i| {
            let hovered: Vec<PathBuf> = i.raw.hovered_files.iter().filter_map(|f| f.path.clone()).collect();
            let dropped: Vec<PathBuf> = i.raw.dropped_files.iter().filter_map(|f| f.path.clone()).collect();
            (hovered, dropped)
        });

        if !hovered.is_empty() {
            self.drag_hover = true;
            self.status_until = None;
            self.status = if validator::acceptable(&hovered, &SUPPORTED_INPUTS) {
                "Images detected, release to start".to_string()
            } else {
                "File formats not supported".to_string()
            };
        } else if self.drag_hover {
            self.drag_hover = false;
            if !self.is_converting() {
                self.status = IDLE_STATUS.to_string();
            }
        }

        if !dropped.is_empty() && !self.is_converting() {
            self.add_images(dropped);
        }
    }

    fn expire_status(&mut self, ctx: &egui::Context) {
        if let Some(until) = self.status_until {
            let now = Instant::now();
            if now >= until {
                self.status_until = None;
                self.status = IDLE_STATUS.to_string();
            } else {
                ctx.request_repaint_after(until - now);
            }
        }
    }

    fn pick_files(&mut self) {
        let mut extensions: Vec<&str> = SUPPORTED_INPUTS.iter().copied().collect();
        extensions.sort_unstable();
        if let Some(paths) = rfd::FileDialog::new().add_filter("Images", extensions.as_slice()).pick_files() {
            self.add_images(paths);
        }
    }

    fn render_header(&mut self, ui: &mut egui::Ui, colors: PanelColors) {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Image Converter").size(22.0).color(colors.text));

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let label = match self.theme_mode {
                    ThemeMode::Dark => "Light",
                    ThemeMode::Light => "Dark",
                };
                if ui.button(label).clicked() {
                    self.theme_mode = match self.theme_mode {
                        ThemeMode::Dark => ThemeMode::Light,
                        ThemeMode::Light => ThemeMode::Dark,
                    };
                    let preference = match self.theme_mode {
                        ThemeMode::Dark => ThemePreference::Dark,
                        ThemeMode::Light => ThemePreference::Light,
                    };
                    style::apply_theme(ui.ctx(), self.theme_mode);
                    self.remember(|settings| settings.theme_preference = preference);
                }
            });
        });
    }

    fn render_format_selector(&mut self, ui: &mut egui::Ui, colors: PanelColors) {
        let enabled = !self.is_converting();
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Target Format").color(colors.muted));
            ui.add_enabled_ui(enabled, |ui| {
                egui::ComboBox::from_id_salt("target_format")
                    .width(140.0)
                    .selected_text(&self.session.active.target_format)
                    .show_ui(ui, |ui| {
                        for name in SUPPORTED_OUTPUTS {
                            if ui
                                .selectable_value(&mut self.session.active.target_format, name.to_string(), *name)
                                .clicked()
                            {
                                let chosen = name.to_string();
                                self.remember(|settings| settings.target_format = chosen.clone());
                            }
                        }
                    });
            });

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.add_enabled(enabled, egui::Button::new("Output Folder")).clicked() {
                    if let Some(dir) = rfd::FileDialog::new().pick_folder() {
                        self.remember(|settings| settings.output_root = Some(dir.clone()));
                    }
                }
            });
        });

        let root = self
            .session
            .active
            .output_root
            .as_ref()
            .map(|dir| dir.display().to_string())
            .unwrap_or_else(|| "working directory".to_string());
        ui.label(
            egui::RichText::new(format!(
                "Saving into converted_{} under {}",
                self.session.active.target_format.to_lowercase(),
                root
            ))
            .size(11.0)
            .color(colors.muted),
        );
    }

    fn render_drop_zone(&mut self, ui: &mut egui::Ui, colors: PanelColors) {
        let (zone_bg, zone_border) = match (self.drag_hover, self.theme_mode) {
            (true, ThemeMode::Dark) => (ColorPalette::ZINC_700, ColorPalette::BLUE_500),
            (true, ThemeMode::Light) => (ColorPalette::GRAY_200, ColorPalette::BLUE_500),
            (false, ThemeMode::Dark) => (ColorPalette::ZINC_900, ColorPalette::ZINC_600),
            (false, ThemeMode::Light) => (egui::Color32::WHITE, ColorPalette::GRAY_400),
        };

        let height = (ui.available_height() - 190.0).max(90.0);
        let (rect, response) = ui.allocate_exact_size(
            egui::vec2(ui.available_width(), height),
            egui::Sense::click(),
        );

        ui.painter().rect_filled(rect, 6.0, zone_bg);
        ui.painter().rect_stroke(
            rect,
            6.0,
            egui::Stroke::new(2.0, zone_border),
            egui::StrokeKind::Inside,
        );

        let hint = if self.images.is_empty() {
            "Drop Image(s) Here".to_string()
        } else {
            let last = &self.images[self.images.len() - 1];
            let size = last.size_kb.map(|kb| format!("{kb} KB")).unwrap_or_else(|| "unknown size".to_string());
            format!("Drop Image(s) Here\nlast added: {} ({} | {})", last.file_name(), last.extension, size)
        };
        ui.painter().text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            hint,
            egui::FontId::proportional(14.0),
            colors.muted,
        );

        if response.clicked() && !self.is_converting() {
            self.pick_files();
        }
    }

    fn render_progress(&self, ui: &mut egui::Ui) {
        let (done, total, fill) = match (&self.batch, &self.last_report) {
            (Some(batch), _) => {
                let (done, total) = batch.progress();
                (done, total, ColorPalette::BLUE_500)
            }
            (None, Some(report)) => {
                let fill = if report.all_succeeded() { ColorPalette::GREEN_500 } else { ColorPalette::RED_500 };
                (report.outcomes.len(), report.outcomes.len(), fill)
            }
            (None, None) => (0, 0, ColorPalette::BLUE_500),
        };

        let fraction = if total > 0 { done as f32 / total as f32 } else { 0.0 };
        ui.add(
            egui::ProgressBar::new(fraction)
                .fill(fill)
                .text(format!("{done}/{total}")),
        );
    }

    fn render_actions(&mut self, ui: &mut egui::Ui, colors: PanelColors) {
        let converting = self.is_converting();
        ui.horizontal(|ui| {
            if style::primary_button(ui, "Convert Images", !converting).clicked() {
                self.start_conversion();
            }
            if style::secondary_button(ui, "Clear Images", !converting).clicked() {
                self.clear_images();
            }
            ui.label(
                egui::RichText::new(format!("Images added: {}", self.images.len())).color(colors.text),
            );
        });
    }

    fn render_report(&self, ui: &mut egui::Ui, colors: PanelColors) {
        let Some(report) = &self.last_report else {
            return;
        };

        style::panel_frame(colors).show(ui, |ui| {
            ui.label(egui::RichText::new(report.summary()).color(colors.text));
            egui::ScrollArea::vertical().max_height(120.0).show(ui, |ui| {
                for outcome in &report.outcomes {
                    match &outcome.result {
                        Ok(path) => {
                            ui.label(
                                egui::RichText::new(format!("{} -> {}", outcome.file_name(), path.display()))
                                    .size(11.0)
                                    .color(colors.muted),
                            );
                        }
                        Err(e) => {
                            ui.label(
                                egui::RichText::new(format!("{} [{}]: {}", outcome.file_name(), e.kind().as_str(), e))
                                    .size(11.0)
                                    .color(ColorPalette::RED_400),
                            );
                        }
                    }
                }
            });
        });
    }
}

impl eframe::App for ConverterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if matches!(self.session.active.theme_preference, ThemePreference::System) {
            let system_theme = ThemeMode::from_system(ctx.theme());
            if self.theme_mode != system_theme {
                self.theme_mode = system_theme;
                style::apply_theme(ctx, self.theme_mode);
            }
        }

        self.handle_file_drops(ctx);
        self.step_conversion(ctx);
        self.expire_status(ctx);

        let colors = PanelColors::for_theme(self.theme_mode);

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_header(ui, colors);
            self.render_format_selector(ui, colors);
            ui.add_space(4.0);
            self.render_drop_zone(ui, colors);
            self.render_actions(ui, colors);
            self.render_progress(ui);
            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new(&self.status).color(colors.text));
            });
            self.render_report(ui, colors);
        });
    }
}
