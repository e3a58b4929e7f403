//! Color theme and glyphs for Dream Explorer.
//!
//! A deep-violet night palette by default with an optional high-contrast override.

use ratatui::style::{Color, Modifier, Style};

use dream_types::{Rgb, ui::UiOptions};

/// Night palette constants.
mod colors {
    use super::Color;

    // === Backgrounds ===
    pub const BG_DARK: Color = Color::Rgb(3, 0, 10); // matches the scene fog
    pub const BG_PANEL: Color = Color::Rgb(16, 10, 32);
    pub const BG_BORDER: Color = Color::Rgb(72, 60, 110);

    // === Foregrounds ===
    pub const TEXT_PRIMARY: Color = Color::Rgb(226, 222, 240);
    pub const TEXT_SECONDARY: Color = Color::Rgb(176, 168, 204);
    pub const TEXT_MUTED: Color = Color::Rgb(110, 104, 138);
    pub const TEXT_DISABLED: Color = Color::Rgb(84, 80, 104);

    // === Accents ===
    pub const PRIMARY: Color = Color::Rgb(149, 127, 184);
    pub const CYAN: Color = Color::Rgb(0, 255, 255);
    pub const YELLOW: Color = Color::Rgb(230, 195, 132);
    pub const RED: Color = Color::Rgb(255, 93, 98);
}

/// Resolved theme palette used by the UI.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg_dark: Color,
    pub bg_panel: Color,
    pub bg_border: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_muted: Color,
    pub text_disabled: Color,
    pub primary: Color,
    pub accent: Color,
    pub warning: Color,
    pub error: Color,
    /// Whether scene colors are passed through as true color.
    pub true_color: bool,
}

impl Palette {
    #[must_use]
    pub fn standard() -> Self {
        Self {
            bg_dark: colors::BG_DARK,
            bg_panel: colors::BG_PANEL,
            bg_border: colors::BG_BORDER,
            text_primary: colors::TEXT_PRIMARY,
            text_secondary: colors::TEXT_SECONDARY,
            text_muted: colors::TEXT_MUTED,
            text_disabled: colors::TEXT_DISABLED,
            primary: colors::PRIMARY,
            accent: colors::CYAN,
            warning: colors::YELLOW,
            error: colors::RED,
            true_color: true,
        }
    }

    #[must_use]
    pub fn high_contrast() -> Self {
        Self {
            bg_dark: Color::Black,
            bg_panel: Color::Black,
            bg_border: Color::Gray,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            text_muted: Color::DarkGray,
            text_disabled: Color::DarkGray,
            primary: Color::White,
            accent: Color::Cyan,
            warning: Color::Yellow,
            error: Color::Red,
            true_color: false,
        }
    }

    /// Terminal color for a scene color.
    ///
    /// High contrast maps everything to white, cyan, or black by brightness.
    #[must_use]
    pub fn scene_color(&self, color: Rgb) -> Color {
        let Rgb(r, g, b) = color;
        if self.true_color {
            return Color::Rgb(r, g, b);
        }
        let brightness = r.max(g).max(b);
        if brightness < 48 {
            Color::Black
        } else if r < g / 2 && b > r {
            Color::Cyan
        } else {
            Color::White
        }
    }
}

#[must_use]
pub fn palette(options: UiOptions) -> Palette {
    if options.high_contrast {
        Palette::high_contrast()
    } else {
        Palette::standard()
    }
}

/// ASCII/Unicode glyphs for the scene and spinners.
#[derive(Debug, Clone, Copy)]
pub struct Glyphs {
    /// Star glyphs from faintest to brightest.
    pub stars: &'static [&'static str],
    /// Shades for the guiding light, outer rim to core.
    pub orb: &'static [&'static str],
    pub crosshair: &'static str,
    pub locked: &'static str,
    pub unlocked: &'static str,
    pub spinner_frames: &'static [&'static str],
}

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const SPINNER_FRAMES_ASCII: &[&str] = &["|", "/", "-", "\\"];

const STARS: &[&str] = &["·", "∙", "•", "✦"];
const STARS_ASCII: &[&str] = &[".", ".", "+", "*"];

const ORB: &[&str] = &["░", "▒", "▓", "█"];
const ORB_ASCII: &[&str] = &[":", "o", "O", "@"];

#[must_use]
pub fn glyphs(options: UiOptions) -> Glyphs {
    if options.ascii_only {
        Glyphs {
            stars: STARS_ASCII,
            orb: ORB_ASCII,
            crosshair: "+",
            locked: "[*]",
            unlocked: "[ ]",
            spinner_frames: SPINNER_FRAMES_ASCII,
        }
    } else {
        Glyphs {
            stars: STARS,
            orb: ORB,
            crosshair: "┼",
            locked: "◉",
            unlocked: "○",
            spinner_frames: SPINNER_FRAMES,
        }
    }
}

/// When `reduced_motion` is enabled, returns a static glyph instead of cycling.
#[must_use]
pub fn spinner_frame(tick: usize, options: UiOptions) -> &'static str {
    let frames = glyphs(options).spinner_frames;
    if options.reduced_motion {
        frames[0]
    } else {
        frames[tick % frames.len()]
    }
}

/// Pick from `levels` by `intensity` in `[0, 1]`.
#[must_use]
pub fn ramp(levels: &'static [&'static str], intensity: f32) -> &'static str {
    if levels.is_empty() {
        return " ";
    }
    let last = levels.len() - 1;
    let index = (intensity.clamp(0.0, 1.0) * last as f32).round() as usize;
    levels[index.min(last)]
}

/// Pre-defined styles for common UI elements.
pub mod styles {
    use super::{Modifier, Palette, Style};

    #[must_use]
    pub fn title(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.accent)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn feedback(palette: &Palette) -> Style {
        Style::default().fg(palette.text_secondary)
    }

    #[must_use]
    pub fn feedback_error(palette: &Palette) -> Style {
        Style::default().fg(palette.error)
    }

    #[must_use]
    pub fn button(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.bg_dark)
            .bg(palette.primary)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn button_disabled(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.text_disabled)
            .bg(palette.bg_panel)
    }

    #[must_use]
    pub fn key_hint(palette: &Palette) -> Style {
        Style::default().fg(palette.text_muted)
    }

    #[must_use]
    pub fn key_highlight(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.warning)
            .add_modifier(Modifier::BOLD)
    }
}
