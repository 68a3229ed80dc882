//! File name helpers
//!
//! Post titles become folder and file names, so every character that is not
//! valid in a file name on any supported platform is replaced.

/// Characters that are never valid in a file name (control characters are
/// handled separately).
const INVALID_FILE_NAME_CHARS: &[char] = &['"', '<', '>', '|', ':', '*', '?', '\\', '/'];

/// Replacement for invalid characters.
const REPLACEMENT: char = '-';

/// Whether `c` may not appear in a file name.
#[inline]
pub fn is_invalid_file_name_char(c: char) -> bool {
    c.is_control() || INVALID_FILE_NAME_CHARS.contains(&c)
}

/// Replace every invalid file name character in `title` with `-`.
///
/// # Example
/// ```ignore
/// assert_eq!(safe_file_name("What? A <post>"), "What- A -post-");
/// ```
pub fn safe_file_name(title: &str) -> String {
    title
        .chars()
        .map(|c| {
            if is_invalid_file_name_char(c) {
                REPLACEMENT
            } else {
                c
            }
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
