//! Theme support for Markdown Monster
//!
//! Themes are applied in two layers: egui `Visuals` for the whole UI, and a
//! small set of window chrome colors (title bar, menu separators) that the
//! dark theme overrides.

use eframe::egui::{Color32, Context, Stroke, Visuals};
use log::debug;

use crate::config::Theme;

/// Title bar color used by the dark theme override.
pub const DARK_TITLE_BAR: Color32 = Color32::from_rgb(0x33, 0x33, 0x33);

// ─────────────────────────────────────────────────────────────────────────────
// Window Chrome
// ─────────────────────────────────────────────────────────────────────────────

/// Colors of the custom window chrome drawn around the editor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowChrome {
    /// Title bar fill while the window is focused
    pub title_bar: Color32,
    /// Title bar fill while the window is not focused
    pub inactive_title_bar: Color32,
    /// Menu separator lines
    pub menu_separator: Color32,
}

impl Default for WindowChrome {
    fn default() -> Self {
        Self {
            title_bar: Color32::from_rgb(0x41, 0x7a, 0xb8),
            inactive_title_bar: Color32::from_rgb(0xe0, 0xe0, 0xe0),
            menu_separator: Color32::from_rgb(0xc8, 0xc8, 0xc8),
        }
    }
}

impl WindowChrome {
    /// Apply the dark theme's hardcoded overrides.
    pub fn apply_dark_override(&mut self) {
        self.title_bar = DARK_TITLE_BAR;
        self.inactive_title_bar = Color32::WHITE;
        self.menu_separator = DARK_TITLE_BAR;
    }

    /// Title bar fill for the current focus state.
    pub fn title_fill(&self, focused: bool) -> Color32 {
        if focused {
            self.title_bar
        } else {
            self.inactive_title_bar
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// egui Visuals
// ─────────────────────────────────────────────────────────────────────────────

/// egui visuals for a concrete theme (`Default` renders as dark).
pub fn visuals_for(theme: Theme) -> Visuals {
    match theme {
        Theme::Light => Visuals::light(),
        Theme::Dark | Theme::Default => {
            let mut visuals = Visuals::dark();
            visuals.panel_fill = Color32::from_rgb(0x25, 0x25, 0x26);
            visuals.window_fill = Color32::from_rgb(0x2d, 0x2d, 0x30);
            visuals.extreme_bg_color = Color32::from_rgb(0x1e, 0x1e, 0x1e);
            visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, DARK_TITLE_BAR);
            visuals
        }
    }
}

/// Apply a theme's visuals to the egui context.
pub fn apply_visuals(ctx: &Context, theme: Theme) {
    debug!("Applying {} visuals", theme.label());
    ctx.set_visuals(visuals_for(theme));
}
