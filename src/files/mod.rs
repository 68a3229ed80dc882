//! File operations module for Markdown Monster
//!
//! Native open/save dialogs for Markdown documents.

pub mod dialogs;
