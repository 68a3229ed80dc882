//! Post composer
//!
//! Behavior of the "Post to Weblog" dialog, independent of how it is drawn.
//! The dialog edits the active document's post metadata, then either
//! publishes the document or creates a new post file.
//!
//! ```text
//! open ──► Editing ──post ok──────► Closed
//!             │  ▲
//!             │  └──post failed (stays open for retry)
//!             └──new post────────► Closed
//! ```

use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::Theme;
use crate::error::{Error, Result};
use crate::string_utils::safe_file_name;
use crate::weblog::metadata::WeblogPostMetadata;
use crate::weblog::WeblogService;

/// How long the upload result stays in the status bar.
const STATUS_TIMEOUT: Duration = Duration::from_secs(5);

/// Access to the document being edited.
pub trait DocumentAccessor {
    /// Identifier of the active document, if any.
    fn document_id(&self) -> Option<usize>;

    /// Make `id` the active document; `false` when it no longer exists.
    fn select_document(&mut self, id: usize) -> bool;

    fn markdown(&self) -> String;
    fn set_markdown(&mut self, markdown: String);
}

/// The editor window hosting the dialog.
pub trait HostWindow {
    /// Show a status bar message; `None` keeps it until replaced.
    fn show_status(&mut self, message: &str, timeout: Option<Duration>);

    /// Open a file in a new editor tab.
    fn open_tab(&mut self, path: &Path) -> Result<()>;
}

/// Dialog lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerState {
    Editing,
    Closed,
}

/// Result of the Post button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostOutcome {
    Published { post_id: String },
    Failed { message: String },
}

/// State of one open post composer.
#[derive(Debug, Clone)]
pub struct PostComposer {
    /// Metadata being edited
    pub metadata: WeblogPostMetadata,
    /// Configured weblogs for the weblog picker
    pub weblog_names: Vec<String>,
    /// Title typed for a new post
    pub new_title: String,
    /// Theme the dialog is drawn with
    pub theme: Theme,
    /// Document the dialog was opened for
    document: Option<usize>,
    state: ComposerState,
}

impl PostComposer {
    /// Open the composer for the active document.
    pub fn open<D: DocumentAccessor + ?Sized>(service: &WeblogService, document: &D) -> Self {
        let theme = service.ctx().set_theme(Theme::Default, None);
        let metadata = service.addin().post_config_from_markdown(&document.markdown());

        Self {
            metadata,
            weblog_names: service.config.weblog_names(),
            new_title: String::new(),
            theme,
            document: document.document_id(),
            state: ComposerState::Editing,
        }
    }

    pub fn state(&self) -> ComposerState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ComposerState::Editing
    }

    /// Write the metadata into the document and publish it.
    ///
    /// The dialog closes only when the weblog accepted the post; on failure
    /// it stays open so the user can fix the metadata and retry.
    pub fn post<H>(&mut self, service: &mut WeblogService, host: &mut H) -> PostOutcome
    where
        H: DocumentAccessor + HostWindow + ?Sized,
    {
        // Always publish the document the dialog was opened for
        if let Some(id) = self.document {
            if !host.select_document(id) {
                let err = Error::Publish("The document for this post has been closed.".into());
                return self.failed(host, err);
            }
        }

        let markdown = match service
            .addin()
            .set_config_in_markdown(&host.markdown(), &self.metadata)
        {
            Ok(markdown) => markdown,
            Err(e) => return self.failed(host, e),
        };
        host.set_markdown(markdown.clone());

        service.config.last_weblog_accessed = self.metadata.weblog_name.clone();

        host.show_status("Uploading Blog post...", None);
        let published = match service.addin().send_post(&markdown, &service.config) {
            Ok(published) => published,
            Err(e) => return self.failed(host, e),
        };

        host.set_markdown(published.markdown);
        self.metadata.post_id = Some(published.post_id.clone());
        host.show_status("Blog post uploaded successfully.", Some(STATUS_TIMEOUT));

        self.close(service);
        PostOutcome::Published {
            post_id: published.post_id,
        }
    }

    fn failed<H: HostWindow + ?Sized>(&self, host: &mut H, err: Error) -> PostOutcome {
        warn!("Weblog post failed: {}", err);
        let message = err.to_string();
        host.show_status(&message, Some(STATUS_TIMEOUT));
        PostOutcome::Failed { message }
    }

    /// Create a post file named after `new_title` and open it.
    ///
    /// Returns `Ok(None)` without doing anything when the title is empty.
    pub fn new_post<H>(
        &mut self,
        service: &mut WeblogService,
        host: &mut H,
    ) -> Result<Option<PathBuf>>
    where
        H: HostWindow + ?Sized,
    {
        let title = self.new_title.trim();
        let file_name = safe_file_name(title);
        if file_name.trim_matches('.').trim().is_empty() {
            return Ok(None);
        }

        let folder = service.config.posts_folder.join(&file_name);
        if !folder.exists() {
            fs::create_dir_all(&folder).map_err(|e| Error::FileWrite {
                path: folder.clone(),
                source: e,
            })?;
        }
        let output_file = folder.join(format!("{}.md", file_name));

        let markdown = service.addin().new_weblog_post(&WeblogPostMetadata {
            title: title.to_string(),
            weblog_name: service.config.last_weblog_accessed.clone(),
            ..Default::default()
        });
        fs::write(&output_file, markdown).map_err(|e| Error::FileWrite {
            path: output_file.clone(),
            source: e,
        })?;
        info!("Created new post {}", output_file.display());

        host.open_tab(&output_file)?;
        self.close(service);
        Ok(Some(output_file))
    }

    /// Close the dialog and save the weblog configuration.
    pub fn close(&mut self, service: &mut WeblogService) {
        if self.state == ComposerState::Closed {
            return;
        }
        self.state = ComposerState::Closed;

        if let Err(e) = service.save_configuration() {
            service.ctx().log("Unable to save weblog configuration", Some(&e));
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::{test_context, TestContext};
    use crate::state::AppState;
    use crate::weblog::addin::{PublishedPost, WeblogAddin};
    use crate::weblog::config::{WeblogConfiguration, WeblogInfo, WeblogStore};
    use crate::weblog::metadata::{parse_post_metadata, set_post_metadata};
    use std::cell::RefCell;
    use std::sync::Arc;

    /// Add-in that succeeds or fails on demand.
    struct FakeAddin {
        fail_with: Option<String>,
        sent: RefCell<Vec<(String, String)>>,
    }

    impl WeblogAddin for FakeAddin {
        fn post_config_from_markdown(&self, markdown: &str) -> WeblogPostMetadata {
            parse_post_metadata(markdown).unwrap_or_default()
        }

        fn set_config_in_markdown(
            &self,
            markdown: &str,
            metadata: &WeblogPostMetadata,
        ) -> Result<String> {
            set_post_metadata(markdown, metadata)
        }

        fn send_post(&self, markdown: &str, config: &WeblogConfiguration) -> Result<PublishedPost> {
            self.sent
                .borrow_mut()
                .push((markdown.to_string(), config.last_weblog_accessed.clone()));
            match &self.fail_with {
                Some(message) => Err(Error::Publish(message.clone())),
                None => {
                    let mut metadata = parse_post_metadata(markdown)?;
                    metadata.post_id = Some("77".to_string());
                    Ok(PublishedPost {
                        post_id: "77".to_string(),
                        markdown: set_post_metadata(markdown, &metadata)?,
                    })
                }
            }
        }

        fn new_weblog_post(&self, metadata: &WeblogPostMetadata) -> String {
            format!("weblog: {}\n# {}\n", metadata.weblog_name, metadata.title)
        }
    }

    #[derive(Default)]
    struct FakeHost {
        markdown: String,
        statuses: Vec<(String, Option<Duration>)>,
        opened: Vec<PathBuf>,
    }

    impl DocumentAccessor for FakeHost {
        fn document_id(&self) -> Option<usize> {
            Some(0)
        }

        fn select_document(&mut self, id: usize) -> bool {
            id == 0
        }

        fn markdown(&self) -> String {
            self.markdown.clone()
        }

        fn set_markdown(&mut self, markdown: String) {
            self.markdown = markdown;
        }
    }

    impl HostWindow for FakeHost {
        fn show_status(&mut self, message: &str, timeout: Option<Duration>) {
            self.statuses.push((message.to_string(), timeout));
        }

        fn open_tab(&mut self, path: &Path) -> Result<()> {
            self.opened.push(path.to_path_buf());
            Ok(())
        }
    }

    struct Fixture {
        _test: TestContext,
        service: WeblogService,
    }

    fn fixture(fail_with: Option<&str>) -> Fixture {
        let test = test_context(|s| s.theme = Theme::Dark);
        let store = WeblogStore::new(test.dir.path().join("weblogs.json"));
        let mut service = WeblogService::new(
            Arc::clone(&test.ctx),
            store,
            Box::new(FakeAddin {
                fail_with: fail_with.map(str::to_string),
                sent: RefCell::new(Vec::new()),
            }),
        );
        service.config.posts_folder = test.dir.path().join("posts");
        service.config.weblogs = vec![
            WeblogInfo {
                name: "Personal".to_string(),
                password: "plain".to_string(),
                ..Default::default()
            },
            WeblogInfo {
                name: "Work".to_string(),
                ..Default::default()
            },
        ];
        service.config.last_weblog_accessed = "Work".to_string();
        Fixture {
            _test: test,
            service,
        }
    }

    fn host_with(markdown: &str) -> FakeHost {
        FakeHost {
            markdown: markdown.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_open_loads_names_and_metadata() {
        let f = fixture(None);
        let host = host_with("---\ntitle: Draft\nweblogName: Personal\n---\nBody");

        let composer = PostComposer::open(&f.service, &host);
        assert!(composer.is_open());
        assert_eq!(composer.weblog_names, vec!["Personal", "Work"]);
        assert_eq!(composer.metadata.title, "Draft");
        assert_eq!(composer.metadata.weblog_name, "Personal");
        assert_eq!(composer.theme, Theme::Dark);
    }

    #[test]
    fn test_post_success_closes_and_saves() {
        let mut f = fixture(None);
        let mut host = host_with("# My Post\n\nText");
        let mut composer = PostComposer::open(&f.service, &host);
        composer.metadata.weblog_name = "Personal".to_string();
        composer.metadata.categories = "Rust".to_string();

        let outcome = composer.post(&mut f.service, &mut host);
        assert_eq!(
            outcome,
            PostOutcome::Published {
                post_id: "77".to_string()
            }
        );
        assert_eq!(composer.state(), ComposerState::Closed);
        assert_eq!(composer.metadata.post_id.as_deref(), Some("77"));

        // Metadata and post id were written back into the document
        let meta = parse_post_metadata(&host.markdown).unwrap();
        assert_eq!(meta.categories, "Rust");
        assert_eq!(meta.post_id.as_deref(), Some("77"));

        assert_eq!(host.statuses[0], ("Uploading Blog post...".to_string(), None));
        assert_eq!(
            host.statuses.last().unwrap(),
            &(
                "Blog post uploaded successfully.".to_string(),
                Some(STATUS_TIMEOUT)
            )
        );

        // Closing saved the configuration with encrypted passwords
        let saved = f.service.store().load();
        assert_eq!(saved.last_weblog_accessed, "Personal");
        assert_ne!(saved.weblogs[0].password, "plain");
    }

    fn two_tabs(f: &Fixture) -> AppState {
        let dir = f._test.dir.path();
        fs::write(dir.join("a.md"), "# Post A\n").unwrap();
        fs::write(dir.join("b.md"), "# Post B\n").unwrap();

        let mut state = AppState::new();
        state.open_file(dir.join("a.md")).unwrap();
        state.open_file(dir.join("b.md")).unwrap();
        state.set_active_tab(0);
        state
    }

    #[test]
    fn test_post_targets_document_it_was_opened_for() {
        let mut f = fixture(None);
        let mut state = two_tabs(&f);
        let mut composer = PostComposer::open(&f.service, &state);
        composer.metadata.weblog_name = "Personal".to_string();
        assert_eq!(composer.metadata.title, "Post A");

        // User switches tabs while the dialog is open
        state.set_active_tab(1);

        let outcome = composer.post(&mut f.service, &mut state);
        assert!(matches!(outcome, PostOutcome::Published { .. }));
        assert_eq!(state.active_tab_index(), 0);

        let a = parse_post_metadata(&state.tabs()[0].content).unwrap();
        assert_eq!(a.title, "Post A");
        assert_eq!(a.post_id.as_deref(), Some("77"));
        assert_eq!(state.tabs()[1].content, "# Post B\n");
    }

    #[test]
    fn test_post_fails_when_document_was_closed() {
        let mut f = fixture(None);
        let mut state = two_tabs(&f);
        let mut composer = PostComposer::open(&f.service, &state);
        composer.metadata.weblog_name = "Personal".to_string();

        state.close_tab(0);

        let outcome = composer.post(&mut f.service, &mut state);
        assert!(matches!(&outcome, PostOutcome::Failed { message } if message.contains("closed")));
        assert!(composer.is_open());
        assert_eq!(state.tabs()[0].content, "# Post B\n");
    }

    #[test]
    fn test_post_failure_stays_open() {
        let mut f = fixture(Some("Invalid login"));
        let mut host = host_with("# My Post\n");
        let mut composer = PostComposer::open(&f.service, &host);
        composer.metadata.weblog_name = "Personal".to_string();

        let outcome = composer.post(&mut f.service, &mut host);
        assert!(
            matches!(&outcome, PostOutcome::Failed { message } if message.contains("Invalid login"))
        );
        assert!(composer.is_open());
        assert!(composer.metadata.post_id.is_none());

        // The status reports the failure, not success
        let (last, _) = host.statuses.last().unwrap();
        assert!(last.contains("Invalid login"));
        assert!(!host.statuses.iter().any(|(s, _)| s.contains("successfully")));

        // Not closed, so nothing saved yet
        assert!(!f.service.store().path().exists());

        // Metadata is in the document for the retry
        assert!(host.markdown.contains("weblogName: Personal"));
    }

    #[test]
    fn test_new_post_creates_file_and_opens_tab() {
        let mut f = fixture(None);
        let mut host = FakeHost::default();
        let mut composer = PostComposer::open(&f.service, &host);
        composer.new_title = "What? A <new> post".to_string();

        let path = composer.new_post(&mut f.service, &mut host).unwrap().unwrap();
        let expected = f
            .service
            .config
            .posts_folder
            .join("What- A -new- post")
            .join("What- A -new- post.md");
        assert_eq!(path, expected);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "weblog: Work\n# What? A <new> post\n"
        );
        assert_eq!(host.opened, vec![expected]);
        assert!(!composer.is_open());
    }

    #[test]
    fn test_new_post_empty_title_is_noop() {
        let mut f = fixture(None);
        let mut host = FakeHost::default();
        let mut composer = PostComposer::open(&f.service, &host);

        composer.new_title = "   ".to_string();
        assert_eq!(composer.new_post(&mut f.service, &mut host).unwrap(), None);
        composer.new_title = "..".to_string();
        assert_eq!(composer.new_post(&mut f.service, &mut host).unwrap(), None);

        assert!(composer.is_open());
        assert!(host.opened.is_empty());
        assert!(!f.service.config.posts_folder.exists());
    }

    #[test]
    fn test_close_saves_configuration_once() {
        let mut f = fixture(None);
        let host = FakeHost::default();
        let mut composer = PostComposer::open(&f.service, &host);

        composer.close(&mut f.service);
        assert!(!composer.is_open());
        assert!(f.service.store().path().exists());

        fs::remove_file(f.service.store().path()).unwrap();
        composer.close(&mut f.service);
        assert!(!f.service.store().path().exists());
    }
}
