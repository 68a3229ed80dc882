//! Weblog add-in: the model behind the post composer
//!
//! Turns a Markdown document into a weblog post. Metadata lives in the
//! document's front matter, the body is rendered to HTML with comrak and
//! sent through a [`WeblogPublisher`].

use comrak::{markdown_to_html, Options};
use log::{info, warn};
use std::sync::Arc;

use crate::context::AppContext;
use crate::error::{Error, Result, ResultExt};
use crate::weblog::config::WeblogConfiguration;
use crate::weblog::metadata::{
    markdown_body, parse_post_metadata, set_post_metadata, WeblogPostMetadata,
};
use crate::weblog::metaweblog::{PostPayload, WeblogPublisher};

/// A post accepted by the weblog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPost {
    pub post_id: String,
    /// The document with the post id written into its front matter
    pub markdown: String,
}

/// Operations the post composer needs from a publishing add-in.
pub trait WeblogAddin {
    /// Metadata of a document; falls back to defaults for unreadable front matter.
    fn post_config_from_markdown(&self, markdown: &str) -> WeblogPostMetadata;

    /// Write metadata into the document's front matter.
    fn set_config_in_markdown(&self, markdown: &str, metadata: &WeblogPostMetadata)
        -> Result<String>;

    /// Publish a document that already carries its metadata.
    fn send_post(&self, markdown: &str, config: &WeblogConfiguration) -> Result<PublishedPost>;

    /// Markdown for a new, empty post.
    fn new_weblog_post(&self, metadata: &WeblogPostMetadata) -> String;
}

// ─────────────────────────────────────────────────────────────────────────────
// Markdown Weblog Add-in
// ─────────────────────────────────────────────────────────────────────────────

/// Render a post body (without front matter) to HTML.
pub fn render_post_html(body: &str) -> String {
    let mut options = Options::default();

    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.footnotes = true;
    options.render.unsafe_ = true;

    markdown_to_html(body, &options)
}

/// Remove the leading `# Title` line; the weblog shows the title itself.
fn strip_title_heading<'a>(body: &'a str, title: &str) -> &'a str {
    let trimmed = body.trim_start();
    let Some(first_line) = trimmed.lines().next() else {
        return body;
    };
    match first_line.trim().strip_prefix("# ") {
        Some(heading) if heading.trim() == title.trim() => {
            trimmed[first_line.len()..].trim_start_matches(['\r', '\n'])
        }
        _ => body,
    }
}

/// The default add-in: MetaWeblog publishing with front matter metadata.
pub struct MarkdownWeblogAddin {
    ctx: Arc<AppContext>,
    publisher: Box<dyn WeblogPublisher>,
}

impl MarkdownWeblogAddin {
    pub fn new(ctx: Arc<AppContext>, publisher: Box<dyn WeblogPublisher>) -> Self {
        Self { ctx, publisher }
    }

    fn build_payload(&self, markdown: &str, metadata: &WeblogPostMetadata) -> PostPayload {
        let body = strip_title_heading(markdown_body(markdown), &metadata.title);
        PostPayload {
            post_id: metadata.post_id.clone().filter(|id| !id.trim().is_empty()),
            title: metadata.title.clone(),
            html: render_post_html(body),
            excerpt: metadata.abstract_text.clone(),
            keywords: metadata.keywords.clone(),
            categories: metadata.category_list(),
            publish: true,
        }
    }
}

impl WeblogAddin for MarkdownWeblogAddin {
    fn post_config_from_markdown(&self, markdown: &str) -> WeblogPostMetadata {
        parse_post_metadata(markdown)
            .unwrap_or_warn_default(WeblogPostMetadata::default(), "Reading post metadata")
    }

    fn set_config_in_markdown(
        &self,
        markdown: &str,
        metadata: &WeblogPostMetadata,
    ) -> Result<String> {
        set_post_metadata(markdown, metadata)
    }

    fn send_post(&self, markdown: &str, config: &WeblogConfiguration) -> Result<PublishedPost> {
        let mut metadata = parse_post_metadata(markdown)?;
        if metadata.title.trim().is_empty() {
            return Err(Error::Publish("The post has no title".to_string()));
        }

        let weblog_name = if metadata.weblog_name.trim().is_empty() {
            config.last_weblog_accessed.as_str()
        } else {
            metadata.weblog_name.as_str()
        };
        let weblog = config.find_weblog(weblog_name).ok_or_else(|| {
            Error::Publish(format!("Weblog '{}' is not configured", weblog_name))
        })?;

        let password = self.ctx.decrypt(&weblog.password, None)?;
        let payload = self.build_payload(markdown, &metadata);

        info!("Uploading '{}' to {}", metadata.title, weblog.name);
        let post_id = self.publisher.publish(weblog, &password, &payload)?;

        metadata.weblog_name = weblog.name.clone();
        metadata.post_id = Some(post_id.clone());
        let markdown = set_post_metadata(markdown, &metadata)?;

        self.ctx.send_telemetry("Weblog Post", Some(weblog.api_type.label()));
        Ok(PublishedPost { post_id, markdown })
    }

    fn new_weblog_post(&self, metadata: &WeblogPostMetadata) -> String {
        let body = format!("# {}\n\n", metadata.title);
        match set_post_metadata(&body, metadata) {
            Ok(markdown) => markdown,
            Err(e) => {
                warn!("Unable to write post metadata: {}", e);
                body
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
