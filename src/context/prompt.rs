//! Continue-or-exit prompt shown after an unhandled error.

use rfd::{MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};

/// Asks the user whether the application should keep running.
pub trait ErrorPrompt: Send + Sync {
    /// Return `true` to continue, `false` to exit.
    fn ask_continue(&self, title: &str, message: &str) -> bool;
}

/// Native message box via `rfd`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeErrorPrompt;

impl ErrorPrompt for NativeErrorPrompt {
    fn ask_continue(&self, title: &str, message: &str) -> bool {
        let result = MessageDialog::new()
            .set_level(MessageLevel::Error)
            .set_title(title)
            .set_description(message)
            .set_buttons(MessageButtons::YesNo)
            .show();

        !matches!(result, MessageDialogResult::No)
    }
}
