//! Native file dialog integration using the rfd crate

use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
use std::path::{Path, PathBuf};

/// File extension filters for Markdown documents.
const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "mdown", "mkd", "mkdn"];

/// Opens a native file dialog for a Markdown document.
///
/// Returns `None` if the dialog was cancelled.
pub fn open_markdown_dialog(initial_dir: Option<&Path>) -> Option<PathBuf> {
    let mut dialog = FileDialog::new()
        .set_title("Open Markdown Document")
        .add_filter("Markdown Files", MARKDOWN_EXTENSIONS)
        .add_filter("All Files", &["*"]);

    if let Some(dir) = initial_dir {
        dialog = dialog.set_directory(dir);
    }

    dialog.pick_file()
}

/// Opens a native save dialog for a Markdown document.
///
/// Returns `None` if the dialog was cancelled.
pub fn save_markdown_dialog(
    initial_dir: Option<&Path>,
    default_name: Option<&str>,
) -> Option<PathBuf> {
    let mut dialog = FileDialog::new()
        .set_title("Save Markdown Document")
        .add_filter("Markdown Files", MARKDOWN_EXTENSIONS)
        .add_filter("All Files", &["*"]);

    if let Some(dir) = initial_dir {
        dialog = dialog.set_directory(dir);
    }

    if let Some(name) = default_name {
        dialog = dialog.set_file_name(name);
    }

    dialog.save_file()
}

/// Ask whether unsaved changes may be discarded.
pub fn confirm_discard_changes(document: &str) -> bool {
    let result = MessageDialog::new()
        .set_level(MessageLevel::Warning)
        .set_title("Unsaved Changes")
        .set_description(format!("'{}' has unsaved changes. Discard them?", document))
        .set_buttons(MessageButtons::YesNo)
        .show();

    matches!(result, MessageDialogResult::Yes)
}
