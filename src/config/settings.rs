//! User settings and preferences for Markdown Monster
//!
//! This module defines the `Settings` struct that holds all user-configurable
//! options, with serde support for JSON persistence.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::get_config_dir;

// ─────────────────────────────────────────────────────────────────────────────
// Theme Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Available color themes for the editor.
///
/// `Default` is only meaningful as a request ("use whatever is configured");
/// stored settings always resolve it to a concrete theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
    Default,
}

impl Theme {
    /// Get a display label for the theme.
    pub fn label(&self) -> &'static str {
        match self {
            Theme::Dark => "Dark",
            Theme::Light => "Light",
            Theme::Default => "Default",
        }
    }

    /// Toggle between the two concrete themes.
    pub fn toggle(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark | Theme::Default => Theme::Light,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Window Size Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Window dimensions and position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowSize {
    /// Window width in pixels
    pub width: f32,
    /// Window height in pixels
    pub height: f32,
    /// Whether the window was maximized
    #[serde(default)]
    pub maximized: bool,
}

impl Default for WindowSize {
    fn default() -> Self {
        Self {
            width: 1100.0,
            height: 760.0,
            maximized: false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Update / Usage Tracking
// ─────────────────────────────────────────────────────────────────────────────

/// Usage counters maintained across application runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ApplicationUpdates {
    /// Number of times the application has been started
    pub access_count: i32,
    /// Set until the first run has completed
    pub first_run: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Main Settings Struct
// ─────────────────────────────────────────────────────────────────────────────

/// User preferences and application settings.
///
/// This struct is serialized to JSON and persisted to the user's config directory.
/// All fields have sensible defaults via the `Default` trait and `#[serde(default)]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // ─────────────────────────────────────────────────────────────────────────
    // Appearance
    // ─────────────────────────────────────────────────────────────────────────
    /// Color theme
    pub theme: Theme,

    /// Font size for the editor (in points)
    pub font_size: f32,

    /// Window size and position
    pub window_size: WindowSize,

    // ─────────────────────────────────────────────────────────────────────────
    // Files
    // ─────────────────────────────────────────────────────────────────────────
    /// Folder holding the error log and other shared application files
    pub common_folder: PathBuf,

    /// Recently opened files (most recent first)
    pub recent_files: Vec<PathBuf>,

    /// Maximum number of recent files to remember
    pub max_recent_files: usize,

    // ─────────────────────────────────────────────────────────────────────────
    // Reporting
    // ─────────────────────────────────────────────────────────────────────────
    /// Endpoint that receives bug reports (empty disables submission)
    pub bug_report_url: String,

    /// Endpoint that receives telemetry events (empty disables submission)
    pub telemetry_url: String,

    /// Whether anonymous usage telemetry may be sent
    pub send_telemetry: bool,

    /// Usage counters
    pub application_updates: ApplicationUpdates,

    // ─────────────────────────────────────────────────────────────────────────
    // Security
    // ─────────────────────────────────────────────────────────────────────────
    /// Mix a per-installation key into password encryption.
    ///
    /// Turn this off to share encrypted settings between machines through
    /// cloud-synced folders.
    pub use_machine_encryption_key_for_passwords: bool,

    /// Registration key entered by the user
    pub unlock_key: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Appearance
            theme: Theme::default(),
            font_size: 14.0,
            window_size: WindowSize::default(),

            // Files
            common_folder: default_common_folder(),
            recent_files: Vec::new(),
            max_recent_files: 10,

            // Reporting
            bug_report_url: String::new(),
            telemetry_url: String::new(),
            send_telemetry: true,
            application_updates: ApplicationUpdates {
                access_count: 0,
                first_run: true,
            },

            // Security
            use_machine_encryption_key_for_passwords: true,
            unlock_key: None,
        }
    }
}

/// The common folder defaults to the configuration directory.
fn default_common_folder() -> PathBuf {
    get_config_dir().unwrap_or_else(|_| std::env::temp_dir().join("markdown-monster"))
}

impl Settings {
    /// Add a file to the recent files list.
    ///
    /// If the file already exists in the list, it's moved to the front.
    /// The list is trimmed to `max_recent_files`.
    pub fn add_recent_file(&mut self, path: PathBuf) {
        self.recent_files.retain(|p| p != &path);
        self.recent_files.insert(0, path);
        self.recent_files.truncate(self.max_recent_files);
    }

    /// Whether a registration key has been entered.
    pub fn is_registered(&self) -> bool {
        self.unlock_key
            .as_deref()
            .map(|key| !key.trim().is_empty())
            .unwrap_or(false)
    }

    /// Record an application start in the usage counters.
    pub fn record_access(&mut self) {
        self.application_updates.access_count =
            self.application_updates.access_count.saturating_add(1);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Validation Constants and Sanitization
    // ─────────────────────────────────────────────────────────────────────────

    /// Minimum allowed font size.
    pub const MIN_FONT_SIZE: f32 = 8.0;
    /// Maximum allowed font size.
    pub const MAX_FONT_SIZE: f32 = 72.0;
    /// Minimum window dimension.
    pub const MIN_WINDOW_SIZE: f32 = 200.0;
    /// Maximum window dimension.
    pub const MAX_WINDOW_SIZE: f32 = 10000.0;

    /// Sanitize settings by clamping values to valid ranges.
    ///
    /// This is useful after loading settings from a file that might have
    /// been manually edited with invalid values.
    pub fn sanitize(&mut self) {
        // A stored theme is always concrete
        if self.theme == Theme::Default {
            self.theme = Theme::Dark;
        }

        self.font_size = self
            .font_size
            .clamp(Self::MIN_FONT_SIZE, Self::MAX_FONT_SIZE);

        self.window_size.width = self
            .window_size
            .width
            .clamp(Self::MIN_WINDOW_SIZE, Self::MAX_WINDOW_SIZE);
        self.window_size.height = self
            .window_size
            .height
            .clamp(Self::MIN_WINDOW_SIZE, Self::MAX_WINDOW_SIZE);

        if self.max_recent_files == 0 {
            self.max_recent_files = 10;
        } else if self.max_recent_files > 100 {
            self.max_recent_files = 100;
        }
        self.recent_files.truncate(self.max_recent_files);

        if self.application_updates.access_count < 0 {
            self.application_updates.access_count = 0;
        }

        if self.common_folder.as_os_str().is_empty() {
            self.common_folder = default_common_folder();
        }
    }

    /// Load settings and sanitize them to ensure validity.
    ///
    /// This is a convenience method that deserializes and then sanitizes.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();

        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.font_size, 14.0);
        assert!(settings.send_telemetry);
        assert!(settings.use_machine_encryption_key_for_passwords);
        assert!(settings.bug_report_url.is_empty());
        assert_eq!(settings.application_updates.access_count, 0);
        assert!(settings.application_updates.first_run);
        assert!(!settings.is_registered());
        assert!(!settings.common_folder.as_os_str().is_empty());
    }

    #[test]
    fn test_add_recent_file() {
        let mut settings = Settings::default();
        settings.max_recent_files = 3;

        settings.add_recent_file(PathBuf::from("/post1.md"));
        settings.add_recent_file(PathBuf::from("/post2.md"));
        settings.add_recent_file(PathBuf::from("/post3.md"));
        assert_eq!(settings.recent_files[0], PathBuf::from("/post3.md"));

        // Existing file moves to the front
        settings.add_recent_file(PathBuf::from("/post1.md"));
        assert_eq!(settings.recent_files[0], PathBuf::from("/post1.md"));
        assert_eq!(settings.recent_files.len(), 3);

        // New file trims the oldest
        settings.add_recent_file(PathBuf::from("/post4.md"));
        assert_eq!(settings.recent_files.len(), 3);
        assert!(!settings.recent_files.contains(&PathBuf::from("/post2.md")));
    }

    #[test]
    fn test_theme_serialization() {
        assert_eq!(serde_json::to_string(&Theme::Dark).unwrap(), "\"dark\"");
        assert_eq!(serde_json::to_string(&Theme::Light).unwrap(), "\"light\"");
        assert_eq!(
            serde_json::from_str::<Theme>("\"default\"").unwrap(),
            Theme::Default
        );
    }

    #[test]
    fn test_theme_toggle() {
        assert_eq!(Theme::Dark.toggle(), Theme::Light);
        assert_eq!(Theme::Light.toggle(), Theme::Dark);
        assert_eq!(Theme::Default.toggle(), Theme::Light);
    }

    #[test]
    fn test_is_registered() {
        let mut settings = Settings::default();
        settings.unlock_key = Some("   ".to_string());
        assert!(!settings.is_registered());

        settings.unlock_key = Some("MM-1234".to_string());
        assert!(settings.is_registered());
    }

    #[test]
    fn test_record_access() {
        let mut settings = Settings::default();
        settings.record_access();
        settings.record_access();
        assert_eq!(settings.application_updates.access_count, 2);
    }

    #[test]
    fn test_settings_serialization_roundtrip() {
        let original = Settings {
            unlock_key: Some("key".to_string()),
            telemetry_url: "https://example.com/telemetry".to_string(),
            ..Settings::default()
        };
        let json = serde_json::to_string_pretty(&original).unwrap();
        let deserialized: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(original, deserialized);
    }

    #[test]
    fn test_settings_deserialize_with_defaults() {
        let json = r#"{"theme": "light", "send_telemetry": false}"#;
        let settings: Settings = serde_json::from_str(json).unwrap();

        assert_eq!(settings.theme, Theme::Light);
        assert!(!settings.send_telemetry);
        assert_eq!(settings.font_size, 14.0);
        assert!(settings.use_machine_encryption_key_for_passwords);
    }

    #[test]
    fn test_sanitize_resolves_default_theme() {
        let mut settings = Settings::default();
        settings.theme = Theme::Default;
        settings.sanitize();
        assert_eq!(settings.theme, Theme::Dark);
    }

    #[test]
    fn test_sanitize_clamps_values() {
        let mut settings = Settings::default();
        settings.font_size = 4.0;
        settings.window_size.width = 10.0;
        settings.application_updates.access_count = -5;
        settings.common_folder = PathBuf::new();
        settings.sanitize();

        assert_eq!(settings.font_size, Settings::MIN_FONT_SIZE);
        assert_eq!(settings.window_size.width, Settings::MIN_WINDOW_SIZE);
        assert_eq!(settings.application_updates.access_count, 0);
        assert!(!settings.common_folder.as_os_str().is_empty());
    }

    #[test]
    fn test_from_json_sanitized() {
        let json = r#"{"font_size": 400.0, "theme": "default"}"#;
        let settings = Settings::from_json_sanitized(json).unwrap();
        assert_eq!(settings.font_size, Settings::MAX_FONT_SIZE);
        assert_eq!(settings.theme, Theme::Dark);
    }
}
