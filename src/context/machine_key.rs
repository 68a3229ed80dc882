//! Per-installation machine key.
//!
//! The key is a random UUID generated on first use and persisted so that
//! credentials encrypted on this machine can be decrypted on later runs.

use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::config::get_config_dir;
use crate::error::{Error, Result};

/// File holding the machine key inside the config directory.
const MACHINE_KEY_FILE: &str = "machine.key";

/// Source of the machine-specific encryption key.
pub trait MachineKeyProvider: Send + Sync {
    /// Return the machine key, creating and persisting it if absent.
    fn get_or_create_machine_key(&self) -> Result<String>;
}

/// Machine key stored as a plain-text GUID in a file.
#[derive(Debug, Clone)]
pub struct FileMachineKeyStore {
    path: PathBuf,
}

impl FileMachineKeyStore {
    /// Store the key at an explicit path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store the key in the application's config directory.
    pub fn in_config_dir() -> Result<Self> {
        Ok(Self::new(get_config_dir()?.join(MACHINE_KEY_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn key_error(&self, source: std::io::Error) -> Error {
        Error::MachineKey {
            path: self.path.clone(),
            source,
        }
    }
}

impl MachineKeyProvider for FileMachineKeyStore {
    fn get_or_create_machine_key(&self) -> Result<String> {
        if self.path.exists() {
            let stored = fs::read_to_string(&self.path).map_err(|e| self.key_error(e))?;
            let stored = stored.trim();
            if !stored.is_empty() {
                debug!("Machine key loaded from {}", self.path.display());
                return Ok(stored.to_string());
            }
        }

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| self.key_error(e))?;
        }

        let key = Uuid::new_v4().to_string();
        fs::write(&self.path, &key).map_err(|e| self.key_error(e))?;
        info!("Created new machine key at {}", self.path.display());
        Ok(key)
    }
}
