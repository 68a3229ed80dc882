//! Application state management for Markdown Monster
//!
//! `AppState` owns the open document tabs and the status bar message. It is
//! the document accessor and host window the weblog post composer works
//! against.
//!
//! # Example
//!
//! ```ignore
//! let mut state = AppState::new();
//! state.open_file(PathBuf::from("post.md"))?;
//! state.show_status("Opened", Some(Duration::from_secs(3)));
//! ```

use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::weblog::{DocumentAccessor, HostWindow};

// ─────────────────────────────────────────────────────────────────────────────
// Tabs
// ─────────────────────────────────────────────────────────────────────────────

/// An open document.
#[derive(Debug, Clone)]
pub struct Tab {
    /// Unique identifier for this tab
    pub id: usize,
    /// File path (None for unsaved/new documents)
    pub path: Option<PathBuf>,
    /// Document content
    pub content: String,
    /// Content as last loaded or saved
    original_content: String,
}

impl Tab {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            path: None,
            content: String::new(),
            original_content: String::new(),
        }
    }

    pub fn with_file(id: usize, path: PathBuf, content: String) -> Self {
        Self {
            id,
            path: Some(path),
            content: content.clone(),
            original_content: content,
        }
    }

    /// Check if the tab has unsaved changes.
    pub fn is_modified(&self) -> bool {
        self.content != self.original_content
    }

    /// Display title: file name, `*` when modified.
    pub fn title(&self) -> String {
        let name = self
            .path
            .as_ref()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("Untitled");

        if self.is_modified() {
            format!("{}*", name)
        } else {
            name.to_string()
        }
    }

    pub fn mark_saved(&mut self) {
        self.original_content = self.content.clone();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Status Bar
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct StatusMessage {
    text: String,
    expires: Option<Instant>,
}

// ─────────────────────────────────────────────────────────────────────────────
// AppState
// ─────────────────────────────────────────────────────────────────────────────

/// Open tabs plus transient UI state.
#[derive(Debug)]
pub struct AppState {
    tabs: Vec<Tab>,
    active_tab_index: usize,
    next_tab_id: usize,
    status: Option<StatusMessage>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// State with a single empty tab.
    pub fn new() -> Self {
        let mut state = Self {
            tabs: Vec::new(),
            active_tab_index: 0,
            next_tab_id: 0,
            status: None,
        };
        state.new_tab();
        state
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn active_tab_index(&self) -> usize {
        self.active_tab_index
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.tabs.get(self.active_tab_index)
    }

    pub fn active_tab_mut(&mut self) -> Option<&mut Tab> {
        self.tabs.get_mut(self.active_tab_index)
    }

    /// Create a new empty tab and make it active.
    pub fn new_tab(&mut self) -> usize {
        self.tabs.push(Tab::new(self.next_tab_id));
        self.next_tab_id += 1;
        self.active_tab_index = self.tabs.len() - 1;
        debug!("Created new tab at index {}", self.active_tab_index);
        self.active_tab_index
    }

    /// Open a file in a new tab, or switch to it when already open.
    pub fn open_file(&mut self, path: PathBuf) -> Result<usize> {
        if let Some(index) = self.find_tab_by_path(&path) {
            self.active_tab_index = index;
            info!("File already open, switching to tab {}", index);
            return Ok(index);
        }

        let content = std::fs::read_to_string(&path)?;

        // Replace an untouched empty tab instead of piling up "Untitled"
        let reuse = self
            .active_tab()
            .is_some_and(|t| t.path.is_none() && t.content.is_empty());
        let tab = Tab::with_file(self.next_tab_id, path.clone(), content);
        self.next_tab_id += 1;

        if reuse {
            self.tabs[self.active_tab_index] = tab;
        } else {
            self.tabs.push(tab);
            self.active_tab_index = self.tabs.len() - 1;
        }

        info!("Opened file: {}", path.display());
        Ok(self.active_tab_index)
    }

    pub fn find_tab_by_path(&self, path: &Path) -> Option<usize> {
        self.tabs
            .iter()
            .position(|t| t.path.as_deref() == Some(path))
    }

    pub fn set_active_tab(&mut self, index: usize) -> bool {
        if index < self.tabs.len() {
            self.active_tab_index = index;
            true
        } else {
            warn!("Invalid tab index: {}", index);
            false
        }
    }

    /// Close a tab; the last tab is replaced by an empty one.
    pub fn close_tab(&mut self, index: usize) -> bool {
        if index >= self.tabs.len() {
            return false;
        }
        self.tabs.remove(index);

        if self.tabs.is_empty() {
            self.new_tab();
        } else if self.active_tab_index >= self.tabs.len() {
            self.active_tab_index = self.tabs.len() - 1;
        } else if index < self.active_tab_index {
            self.active_tab_index -= 1;
        }
        true
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.tabs.iter().any(Tab::is_modified)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // File Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Save the active tab to its file path.
    pub fn save_active_tab(&mut self) -> Result<PathBuf> {
        let tab = self
            .active_tab_mut()
            .ok_or_else(|| Error::Application("No active tab".to_string()))?;
        let path = tab.path.clone().ok_or_else(|| {
            Error::Application("No file path set. Use 'Save As' instead.".to_string())
        })?;

        write_tab(tab, &path)?;
        Ok(path)
    }

    /// Save the active tab to a new path.
    pub fn save_active_tab_as(&mut self, path: PathBuf) -> Result<PathBuf> {
        let tab = self
            .active_tab_mut()
            .ok_or_else(|| Error::Application("No active tab".to_string()))?;

        write_tab(tab, &path)?;
        tab.path = Some(path.clone());
        Ok(path)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Status Bar
    // ─────────────────────────────────────────────────────────────────────────

    /// Current status message; expired messages are cleared.
    pub fn status(&mut self) -> Option<&str> {
        if self
            .status
            .as_ref()
            .and_then(|s| s.expires)
            .is_some_and(|expires| Instant::now() >= expires)
        {
            self.status = None;
        }
        self.status.as_ref().map(|s| s.text.as_str())
    }
}

fn write_tab(tab: &mut Tab, path: &Path) -> Result<()> {
    std::fs::write(path, &tab.content).map_err(|e| Error::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    tab.mark_saved();
    info!("Saved file: {}", path.display());
    Ok(())
}

impl DocumentAccessor for AppState {
    fn document_id(&self) -> Option<usize> {
        self.active_tab().map(|t| t.id)
    }

    fn select_document(&mut self, id: usize) -> bool {
        match self.tabs.iter().position(|t| t.id == id) {
            Some(index) => self.set_active_tab(index),
            None => false,
        }
    }

    fn markdown(&self) -> String {
        self.active_tab()
            .map(|t| t.content.clone())
            .unwrap_or_default()
    }

    fn set_markdown(&mut self, markdown: String) {
        if let Some(tab) = self.active_tab_mut() {
            tab.content = markdown;
        }
    }
}

impl HostWindow for AppState {
    fn show_status(&mut self, message: &str, timeout: Option<Duration>) {
        self.status = Some(StatusMessage {
            text: message.to_string(),
            expires: timeout.map(|t| Instant::now() + t),
        });
    }

    fn open_tab(&mut self, path: &Path) -> Result<()> {
        self.open_file(path.to_path_buf()).map(|_| ())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
