//! Weblog post metadata stored as YAML front matter.
//!
//! A post keeps its publishing information at the top of the document:
//!
//! ```text
//! ---
//! title: Rust for Markdown
//! weblogName: Personal Blog
//! postId: '1234'
//! ---
//! # Rust for Markdown
//! ```
//!
//! Keys the add-in does not know about are preserved when the metadata is
//! written back.

use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};

/// Front matter keys owned by [`WeblogPostMetadata`].
const METADATA_KEYS: &[&str] = &[
    "title",
    "abstract",
    "keywords",
    "categories",
    "weblogName",
    "postId",
    "permalink",
    "featuredImageUrl",
];

/// Delimiter line around front matter.
const DELIMITER: &str = "---";

/// Publishing metadata of one post.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WeblogPostMetadata {
    pub title: String,
    #[serde(rename = "abstract", skip_serializing_if = "String::is_empty")]
    pub abstract_text: String,
    /// Comma separated
    #[serde(
        skip_serializing_if = "String::is_empty",
        deserialize_with = "comma_list"
    )]
    pub keywords: String,
    /// Comma separated
    #[serde(
        skip_serializing_if = "String::is_empty",
        deserialize_with = "comma_list"
    )]
    pub categories: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub weblog_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permalink: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image_url: Option<String>,
}

impl WeblogPostMetadata {
    /// Categories as a trimmed list.
    pub fn category_list(&self) -> Vec<String> {
        split_list(&self.categories)
    }

    /// Keywords as a trimmed list.
    pub fn keyword_list(&self) -> Vec<String> {
        split_list(&self.keywords)
    }
}

/// Accept `a, b` as well as a YAML sequence `[a, b]`; both become `a, b`.
fn comma_list<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    fn scalar(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    let value = Value::deserialize(deserializer)?;
    match &value {
        Value::Null => Ok(String::new()),
        Value::Sequence(items) => Ok(items
            .iter()
            .filter_map(scalar)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")),
        other => scalar(other).ok_or_else(|| {
            serde::de::Error::custom("expected a comma separated string or a list")
        }),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Front Matter
// ─────────────────────────────────────────────────────────────────────────────

/// Split a document into its front matter (without delimiters) and body.
///
/// Returns `None` for the front matter when the document does not start with
/// a `---` line or the block is never closed.
pub fn split_front_matter(markdown: &str) -> (Option<&str>, &str) {
    let Some(first_end) = markdown.find('\n') else {
        return (None, markdown);
    };
    if markdown[..first_end].trim_end() != DELIMITER {
        return (None, markdown);
    }

    let rest = &markdown[first_end + 1..];
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            return (Some(&rest[..offset]), &rest[offset + line.len()..]);
        }
        offset += line.len();
    }

    (None, markdown)
}

/// The document without its front matter.
pub fn markdown_body(markdown: &str) -> &str {
    split_front_matter(markdown).1
}

/// Text of the first level-one heading, if any.
pub fn first_heading(markdown: &str) -> Option<String> {
    markdown
        .lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix("# "))
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
}

fn front_matter_mapping(yaml: Option<&str>) -> Result<Mapping> {
    match yaml {
        Some(yaml) if !yaml.trim().is_empty() => Ok(serde_yaml::from_str(yaml)?),
        _ => Ok(Mapping::new()),
    }
}

/// Read post metadata from a document.
///
/// Without a front matter title the first `# heading` is used.
pub fn parse_post_metadata(markdown: &str) -> Result<WeblogPostMetadata> {
    let (yaml, body) = split_front_matter(markdown);

    let mut metadata: WeblogPostMetadata = match yaml {
        Some(yaml) if !yaml.trim().is_empty() => serde_yaml::from_str(yaml)?,
        _ => WeblogPostMetadata::default(),
    };

    if metadata.title.trim().is_empty() {
        metadata.title = first_heading(body).unwrap_or_default();
    }
    Ok(metadata)
}

/// Write post metadata into a document's front matter.
///
/// Existing front matter keys not owned by the metadata are kept; the body
/// is left untouched.
pub fn set_post_metadata(markdown: &str, metadata: &WeblogPostMetadata) -> Result<String> {
    let (yaml, body) = split_front_matter(markdown);
    let mut mapping = front_matter_mapping(yaml)?;

    let Value::Mapping(fields) = serde_yaml::to_value(metadata)? else {
        return Err(Error::FrontMatter {
            message: "post metadata did not serialize to a mapping".to_string(),
            source: None,
        });
    };

    for key in METADATA_KEYS {
        mapping.remove(*key);
    }
    for (key, value) in fields {
        mapping.insert(key, value);
    }

    let yaml = serde_yaml::to_string(&mapping)?;
    Ok(format!("{DELIMITER}\n{yaml}{DELIMITER}\n{body}"))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
