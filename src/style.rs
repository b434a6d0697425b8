use eframe::egui;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThemeMode {
    Light,
    Dark,
}

impl ThemeMode {
    pub fn from_system(theme: egui::Theme) -> Self {
        match theme {
            egui::Theme::Dark => ThemeMode::Dark,
            egui::Theme::Light => ThemeMode::Light,
        }
    }
}

pub struct ColorPalette;

impl ColorPalette {
    pub const BLUE_500: egui::Color32 = egui::Color32::from_rgb(59, 130, 246);
    pub const BLUE_600: egui::Color32 = egui::Color32::from_rgb(37, 99, 235);

    pub const GRAY_50: egui::Color32 = egui::Color32::from_rgb(249, 250, 251);
    pub const GRAY_100: egui::Color32 = egui::Color32::from_rgb(243, 244, 246);
    pub const GRAY_200: egui::Color32 = egui::Color32::from_rgb(229, 231, 235);
    pub const GRAY_300: egui::Color32 = egui::Color32::from_rgb(209, 213, 219);
    pub const GRAY_400: egui::Color32 = egui::Color32::from_rgb(156, 163, 175);
    pub const GRAY_700: egui::Color32 = egui::Color32::from_rgb(55, 65, 81);
    pub const GRAY_800: egui::Color32 = egui::Color32::from_rgb(31, 41, 55);

    pub const ZINC_200: egui::Color32 = egui::Color32::from_rgb(228, 228, 231);
    pub const ZINC_400: egui::Color32 = egui::Color32::from_rgb(161, 161, 170);
    pub const ZINC_500: egui::Color32 = egui::Color32::from_rgb(113, 113, 122);
    pub const ZINC_600: egui::Color32 = egui::Color32::from_rgb(82, 82, 91);
    pub const ZINC_700: egui::Color32 = egui::Color32::from_rgb(63, 63, 70);
    pub const ZINC_800: egui::Color32 = egui::Color32::from_rgb(39, 39, 42);
    pub const ZINC_900: egui::Color32 = egui::Color32::from_rgb(24, 24, 27);

    pub const GREEN_500: egui::Color32 = egui::Color32::from_rgb(34, 197, 94);
    pub const RED_400: egui::Color32 = egui::Color32::from_rgb(248, 113, 113);
    pub const RED_500: egui::Color32 = egui::Color32::from_rgb(239, 68, 68);
}

/// Colours a panel needs, picked once per frame for the active theme.
#[derive(Debug, Clone, Copy)]
pub struct PanelColors {
    pub fill: egui::Color32,
    pub border: egui::Color32,
    pub text: egui::Color32,
    pub muted: egui::Color32,
}

impl PanelColors {
    pub fn for_theme(theme: ThemeMode) -> Self {
        match theme {
            ThemeMode::Dark => Self {
                fill: ColorPalette::ZINC_800,
                border: ColorPalette::ZINC_700,
                text: ColorPalette::ZINC_200,
                muted: ColorPalette::ZINC_400,
            },
            ThemeMode::Light => Self {
                fill: ColorPalette::GRAY_50,
                border: ColorPalette::GRAY_300,
                text: ColorPalette::GRAY_800,
                muted: ColorPalette::ZINC_600,
            },
        }
    }
}

pub fn panel_frame(colors: PanelColors) -> egui::Frame {
    egui::Frame::new()
        .fill(colors.fill)
        .stroke(egui::Stroke::new(1.0, colors.border))
        .corner_radius(8.0)
        .inner_margin(12.0)
}

pub fn apply_theme(ctx: &egui::Context, theme: ThemeMode) {
    let mut style = (*ctx.style()).clone();

    style.visuals.widgets.noninteractive.corner_radius = egui::CornerRadius::same(4);
    style.visuals.widgets.inactive.corner_radius = egui::CornerRadius::same(4);
    style.visuals.widgets.hovered.corner_radius = egui::CornerRadius::same(4);
    style.visuals.widgets.active.corner_radius = egui::CornerRadius::same(4);

    style.spacing.item_spacing = egui::vec2(8.0, 8.0);
    style.spacing.button_padding = egui::vec2(12.0, 6.0);

    match theme {
        ThemeMode::Dark => {
            style.visuals.dark_mode = true;
            style.visuals.panel_fill = ColorPalette::ZINC_900;
            style.visuals.window_fill = ColorPalette::ZINC_900;
            style.visuals.faint_bg_color = ColorPalette::ZINC_800;
            style.visuals.widgets.inactive.weak_bg_fill = ColorPalette::ZINC_800;
            style.visuals.widgets.inactive.bg_stroke = egui::Stroke::new(1.0, ColorPalette::ZINC_600);
            style.visuals.widgets.hovered.bg_stroke = egui::Stroke::new(1.0, ColorPalette::ZINC_500);
        }
        ThemeMode::Light => {
            style.visuals.dark_mode = false;
            style.visuals.panel_fill = ColorPalette::GRAY_50;
            style.visuals.window_fill = ColorPalette::GRAY_50;
            style.visuals.faint_bg_color = ColorPalette::GRAY_100;
            style.visuals.widgets.inactive.weak_bg_fill = ColorPalette::GRAY_100;
            style.visuals.widgets.inactive.bg_stroke = egui::Stroke::new(1.0, ColorPalette::GRAY_300);
            style.visuals.widgets.hovered.bg_stroke = egui::Stroke::new(1.0, ColorPalette::GRAY_400);
            style.visuals.widgets.noninteractive.fg_stroke = egui::Stroke::new(1.0, ColorPalette::GRAY_700);
        }
    }

    ctx.set_style(style);
}

pub fn primary_button(ui: &mut egui::Ui, text: &str, enabled: bool) -> egui::Response {
    ui.scope(|ui| {
        let style = ui.style_mut();
        for widget in [&mut style.visuals.widgets.inactive, &mut style.visuals.widgets.active] {
            widget.bg_fill = ColorPalette::BLUE_600;
            widget.weak_bg_fill = ColorPalette::BLUE_600;
            widget.fg_stroke = egui::Stroke::new(1.0, egui::Color32::WHITE);
            widget.bg_stroke = egui::Stroke::NONE;
        }
        style.visuals.widgets.hovered.bg_fill = ColorPalette::BLUE_500;
        style.visuals.widgets.hovered.weak_bg_fill = ColorPalette::BLUE_500;
        style.visuals.widgets.hovered.fg_stroke = egui::Stroke::new(1.0, egui::Color32::WHITE);

        let button = egui::Button::new(egui::RichText::new(text).size(15.0))
            .min_size(egui::vec2(150.0, 36.0))
            .corner_radius(6.0);
        ui.add_enabled(enabled, button)
    })
    .inner
}

pub fn secondary_button(ui: &mut egui::Ui, text: &str, enabled: bool) -> egui::Response {
    let button = egui::Button::new(egui::RichText::new(text).size(15.0))
        .min_size(egui::vec2(150.0, 36.0))
        .corner_radius(6.0);
    ui.add_enabled(enabled, button)
}
