//! Weblog accounts and add-in configuration
//!
//! Stored as `weblogs.json` next to `settings.json`. Passwords are kept
//! encrypted with the application context's credential encryption.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::{get_config_dir, write_json_atomic};
use crate::context::AppContext;
use crate::error::Result;

/// File name of the weblog configuration.
pub const WEBLOG_CONFIG_FILE_NAME: &str = "weblogs.json";

/// Folder (under the documents directory) where new posts are created.
const DEFAULT_POSTS_FOLDER: &str = "Markdown Monster Weblog Posts";

/// Publishing protocol spoken by a weblog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WeblogApiType {
    #[default]
    MetaWeblogApi,
    /// WordPress exposes the MetaWeblog methods on `xmlrpc.php`
    WordPress,
}

impl WeblogApiType {
    pub fn label(&self) -> &'static str {
        match self {
            WeblogApiType::MetaWeblogApi => "MetaWeblog API",
            WeblogApiType::WordPress => "WordPress",
        }
    }
}

/// One configured weblog account.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeblogInfo {
    pub name: String,
    pub api_url: String,
    pub blog_id: String,
    pub username: String,
    /// Encrypted once the configuration has been saved
    pub password: String,
    pub api_type: WeblogApiType,
}

/// Weblog add-in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeblogConfiguration {
    pub weblogs: Vec<WeblogInfo>,
    pub last_weblog_accessed: String,
    pub posts_folder: PathBuf,
}

impl Default for WeblogConfiguration {
    fn default() -> Self {
        Self {
            weblogs: Vec::new(),
            last_weblog_accessed: String::new(),
            posts_folder: default_posts_folder(),
        }
    }
}

fn default_posts_folder() -> PathBuf {
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join(DEFAULT_POSTS_FOLDER)
}

impl WeblogConfiguration {
    /// Names of all configured weblogs, in configuration order.
    pub fn weblog_names(&self) -> Vec<String> {
        self.weblogs.iter().map(|w| w.name.clone()).collect()
    }

    /// Look up a weblog by name (case-insensitive).
    pub fn find_weblog(&self, name: &str) -> Option<&WeblogInfo> {
        self.weblogs
            .iter()
            .find(|w| w.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Encrypt any plain-text passwords before the configuration is written.
    pub fn encrypt_passwords(&mut self, ctx: &AppContext) -> Result<()> {
        for weblog in &mut self.weblogs {
            weblog.password = ctx.encrypt(&weblog.password, None)?;
        }
        Ok(())
    }

    fn sanitize(&mut self) {
        self.weblogs.retain(|w| !w.name.trim().is_empty());
        if self.posts_folder.as_os_str().is_empty() {
            self.posts_folder = default_posts_folder();
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Persistence
// ─────────────────────────────────────────────────────────────────────────────

/// Loads and saves [`WeblogConfiguration`].
#[derive(Debug, Clone)]
pub struct WeblogStore {
    path: PathBuf,
}

impl WeblogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the application config directory.
    pub fn in_config_dir() -> Result<Self> {
        Ok(Self::new(get_config_dir()?.join(WEBLOG_CONFIG_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the configuration, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load(&self) -> WeblogConfiguration {
        if !self.path.exists() {
            info!("No weblog configuration at {}", self.path.display());
            return WeblogConfiguration::default();
        }

        let parsed = std::fs::read_to_string(&self.path)
            .map_err(crate::error::Error::from)
            .and_then(|text| Ok(serde_json::from_str::<WeblogConfiguration>(&text)?));

        match parsed {
            Ok(mut config) => {
                config.sanitize();
                info!(
                    "Loaded {} weblog(s) from {}",
                    config.weblogs.len(),
                    self.path.display()
                );
                config
            }
            Err(e) => {
                warn!(
                    "Failed to load weblog configuration from {}: {}. Using defaults.",
                    self.path.display(),
                    e
                );
                WeblogConfiguration::default()
            }
        }
    }

    pub fn save(&self, config: &WeblogConfiguration) -> Result<()> {
        write_json_atomic(&self.path, config)?;
        info!("Weblog configuration saved to {}", self.path.display());
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
