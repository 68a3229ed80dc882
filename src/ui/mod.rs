//! UI components for Markdown Monster
//!
//! Window chrome and dialogs drawn by the main application.

mod title_bar;
mod weblog_dialog;

pub use title_bar::{handle_edge_resize, show_title_bar, TitleBarAction};
pub use weblog_dialog::{show_weblog_dialog, WeblogDialogAction};
