//! Application context for Markdown Monster
//!
//! `AppContext` is created once in `main` and shared (via `Arc`) with every
//! component that needs configuration, credential encryption, error logging,
//! bug reporting, telemetry or theme application.
//!
//! # Usage
//!
//! ```ignore
//! let ctx = Arc::new(AppContext::with_defaults(load_config())?);
//! install_panic_hook(&ctx);
//!
//! let stored = ctx.encrypt("hunter2", None)?;
//! ctx.send_telemetry("Startup", None);
//! ```

mod crypto;
mod environment;
mod error_log;
mod machine_key;
mod prompt;
mod reports;
mod worker;

pub use crypto::{decrypt_string, encrypt_string, is_encrypted, ENCRYPTED_POSTFIX};
pub use environment::{
    app_version, os_version, runtime_description, version_for_display, PRODUCT_NAME,
};
pub use error_log::{ErrorDetails, ErrorLog, ERROR_LOG_FILE};
pub use machine_key::{FileMachineKeyStore, MachineKeyProvider};
pub use prompt::{ErrorPrompt, NativeErrorPrompt};
pub use reports::{
    BugReport, HttpPoster, ReqwestPoster, Telemetry, BUG_REPORT_TIMEOUT, TELEMETRY_TIMEOUT,
};
pub use worker::BackgroundWorker;

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard};

use crate::config::{Settings, Theme};
use crate::error::Result;
use crate::theme::WindowChrome;

/// Registered users stop sending telemetry after this many starts.
pub const REGISTERED_TELEMETRY_LIMIT: i32 = 350;

/// Message logged for errors caught by the top-level handler.
const LAST_RESORT_MESSAGE: &str = "Last Resort Handler";

// ─────────────────────────────────────────────────────────────────────────────
// Application Context
// ─────────────────────────────────────────────────────────────────────────────

/// Process-wide services shared by the editor and its add-ins.
pub struct AppContext {
    settings: RwLock<Settings>,
    started: DateTime<Utc>,
    key_provider: Box<dyn MachineKeyProvider>,
    machine_key: Mutex<Option<String>>,
    poster: Arc<dyn HttpPoster>,
    worker: BackgroundWorker,
    error_log: ErrorLog,
    prompt: Box<dyn ErrorPrompt>,
    last_panic: Mutex<Option<ErrorDetails>>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("started", &self.started)
            .field("error_log", &self.error_log)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Create a context from explicit collaborators.
    pub fn new(
        settings: Settings,
        key_provider: Box<dyn MachineKeyProvider>,
        poster: Arc<dyn HttpPoster>,
        prompt: Box<dyn ErrorPrompt>,
    ) -> Self {
        let error_log = ErrorLog::new(&settings.common_folder);
        info!("Error log at {}", error_log.path().display());

        Self {
            settings: RwLock::new(settings),
            started: Utc::now(),
            key_provider,
            machine_key: Mutex::new(None),
            poster,
            worker: BackgroundWorker::default(),
            error_log,
            prompt,
            last_panic: Mutex::new(None),
        }
    }

    /// Create a context with the file-backed machine key, reqwest and native prompts.
    pub fn with_defaults(settings: Settings) -> Result<Self> {
        Ok(Self::new(
            settings,
            Box::new(FileMachineKeyStore::in_config_dir()?),
            Arc::new(ReqwestPoster::new()),
            Box::new(NativeErrorPrompt),
        ))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration
    // ─────────────────────────────────────────────────────────────────────────

    /// Read access to the current settings.
    pub fn settings(&self) -> RwLockReadGuard<'_, Settings> {
        self.settings.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Modify the settings in place.
    pub fn update_settings<F>(&self, f: F)
    where
        F: FnOnce(&mut Settings),
    {
        let mut settings = self.settings.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut settings);
    }

    /// When this context was created.
    pub fn started(&self) -> DateTime<Utc> {
        self.started
    }

    /// Location of the error log file.
    pub fn error_log_path(&self) -> &Path {
        self.error_log.path()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Encryption
    // ─────────────────────────────────────────────────────────────────────────

    /// The per-installation key, loaded once and cached.
    fn machine_key(&self) -> Result<String> {
        let mut cached = self.machine_key.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(key) = cached.as_ref() {
            return Ok(key.clone());
        }
        let key = self.key_provider.get_or_create_machine_key()?;
        *cached = Some(key.clone());
        Ok(key)
    }

    /// Key used for password encryption.
    ///
    /// Falls back to the fixed base key when machine keys are disabled so
    /// encrypted settings can be shared between machines.
    pub fn encryption_machine_key(&self) -> Result<String> {
        if !self.settings().use_machine_encryption_key_for_passwords {
            return Ok(crypto::BASE_KEY.to_string());
        }
        self.machine_key()
    }

    fn key_for(&self, use_machine_key: Option<bool>) -> Result<String> {
        let use_machine_key = use_machine_key
            .unwrap_or_else(|| self.settings().use_machine_encryption_key_for_passwords);
        if use_machine_key {
            self.encryption_machine_key()
        } else {
            Ok(crypto::BASE_KEY.to_string())
        }
    }

    /// Encrypt a credential for storage.
    ///
    /// `use_machine_key` of `None` follows the configuration. Empty and
    /// already-encrypted values are returned unchanged.
    pub fn encrypt(&self, value: &str, use_machine_key: Option<bool>) -> Result<String> {
        if value.is_empty() || is_encrypted(value) {
            return Ok(value.to_string());
        }
        encrypt_string(value, &self.key_for(use_machine_key)?)
    }

    /// Reverse of [`AppContext::encrypt`].
    pub fn decrypt(&self, value: &str, use_machine_key: Option<bool>) -> Result<String> {
        if value.is_empty() || !is_encrypted(value) {
            return Ok(value.to_string());
        }
        decrypt_string(value, &self.key_for(use_machine_key)?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Logging
    // ─────────────────────────────────────────────────────────────────────────

    /// Write a message to the error log.
    ///
    /// With an error attached the entry includes version and environment
    /// information and a bug report is submitted in the background.
    pub fn log(&self, message: &str, err: Option<&(dyn std::error::Error + 'static)>) {
        let details = err.map(ErrorDetails::from_error);
        self.log_details(message, details.as_ref());
    }

    /// Log an error using its root cause as the message.
    pub fn log_error(&self, err: &(dyn std::error::Error + 'static)) {
        let details = ErrorDetails::from_error(err);
        self.log_details(&details.message.clone(), Some(&details));
    }

    /// Write an entry for already-captured error details.
    pub fn log_details(&self, message: &str, details: Option<&ErrorDetails>) {
        let text = match details {
            Some(details) => {
                self.send_bug_report(details, Some(message));
                format!(
                    "{}\n{} v{}\n{}\n---\n{}\n{}\n---------------------------\n\n",
                    message,
                    PRODUCT_NAME,
                    app_version(),
                    runtime_description(),
                    details.source,
                    details.stack_trace
                )
            }
            None => message.to_string(),
        };

        if let Err(e) = self.error_log.append(&text) {
            error!("Unable to write error log: {}", e);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Bug Reports & Telemetry
    // ─────────────────────────────────────────────────────────────────────────

    /// Submit a bug report in the background.
    ///
    /// Returns `true` when the report was queued. Submission failures are
    /// logged without an error attached, so they never trigger another report.
    pub fn send_bug_report(&self, details: &ErrorDetails, message: Option<&str>) -> bool {
        let url = self.settings().bug_report_url.clone();
        if url.is_empty() {
            debug!("No bug report URL configured, skipping report");
            return false;
        }

        let report = BugReport::new(details, message);
        let body = match serde_json::to_value(&report) {
            Ok(body) => body,
            Err(e) => {
                warn!("Unable to serialize bug report: {}", e);
                return false;
            }
        };

        let poster = Arc::clone(&self.poster);
        let error_log = self.error_log.clone();
        self.worker.submit(move || {
            if let Err(e) = poster.post_json(&url, &body, BUG_REPORT_TIMEOUT) {
                if let Err(log_err) = error_log.append(&format!("Unable to report bug: {}", e)) {
                    warn!("Unable to write error log: {}", log_err);
                }
            }
        })
    }

    /// Send a usage event in the background.
    ///
    /// Nothing is sent when telemetry is disabled or when a registered user
    /// has started the application more than `REGISTERED_TELEMETRY_LIMIT`
    /// times. Returns `true` when the event was queued.
    pub fn send_telemetry(&self, operation: &str, data: Option<&str>) -> bool {
        let (url, telemetry) = {
            let settings = self.settings();
            let registered = settings.is_registered();
            let access = settings.application_updates.access_count;

            if !settings.send_telemetry || (registered && access > REGISTERED_TELEMETRY_LIMIT) {
                return false;
            }
            if settings.telemetry_url.is_empty() {
                debug!("No telemetry URL configured, skipping '{}'", operation);
                return false;
            }

            let elapsed = (Utc::now() - self.started).num_seconds();
            let telemetry = Telemetry {
                version: app_version().to_string(),
                registered,
                operation: operation.to_string(),
                data: data.map(str::to_string),
                access,
                time: i32::try_from(elapsed).unwrap_or(i32::MAX),
            };
            (settings.telemetry_url.clone(), telemetry)
        };

        let body = match serde_json::to_value(&telemetry) {
            Ok(body) => body,
            Err(e) => {
                warn!("Unable to serialize telemetry: {}", e);
                return false;
            }
        };

        let poster = Arc::clone(&self.poster);
        let error_log = self.error_log.clone();
        self.worker.submit(move || {
            if let Err(e) = poster.post_json(&url, &body, TELEMETRY_TIMEOUT) {
                if let Err(log_err) = error_log.append(&format!("Unable to send telemetry: {}", e))
                {
                    warn!("Unable to write error log: {}", log_err);
                }
            }
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Unhandled Errors
    // ─────────────────────────────────────────────────────────────────────────

    /// Log an unhandled error and ask the user whether to continue.
    ///
    /// Returns `true` if the application should keep running.
    pub fn handle_application_error(&self, err: &(dyn std::error::Error + 'static)) -> bool {
        let details = ErrorDetails::from_error(err);
        self.log_details(LAST_RESORT_MESSAGE, Some(&details));
        self.prompt_continue(&details)
    }

    /// Record a panic caught by the panic hook.
    pub fn record_panic(&self, details: ErrorDetails) {
        error!("Unhandled panic: {} at {}", details.message, details.source);
        self.log_details(LAST_RESORT_MESSAGE, Some(&details));
        *self.last_panic.lock().unwrap_or_else(PoisonError::into_inner) = Some(details);
    }

    /// Ask whether to continue after a panic unwound to the UI loop.
    pub fn confirm_continue_after_panic(&self) -> bool {
        let details = self
            .last_panic
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .unwrap_or_else(|| ErrorDetails::from_message("Unknown error"));
        self.prompt_continue(&details)
    }

    fn prompt_continue(&self, details: &ErrorDetails) -> bool {
        let message = format!(
            "Yikes! Something went wrong...\n\n{}\n\n\
             The error has been recorded and written to a log file and you can\n\
             review the details or report the error via Help | Show Error Log\n\n\
             Do you want to continue?",
            details.message
        );
        self.prompt
            .ask_continue(&format!("{} Error", PRODUCT_NAME), &message)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Theme
    // ─────────────────────────────────────────────────────────────────────────

    /// Resolve `theme` (`Default` means the configured theme) and apply the
    /// window chrome override when a window is given.
    pub fn set_theme(&self, theme: Theme, window: Option<&mut WindowChrome>) -> Theme {
        let resolved = match theme {
            Theme::Default => self.settings().theme,
            other => other,
        };

        if let Some(window) = window {
            self.set_theme_window_override(window);
        }
        resolved
    }

    /// Override window chrome colors when the configured theme is dark.
    pub fn set_theme_window_override(&self, window: &mut WindowChrome) {
        if self.settings().theme == Theme::Dark {
            window.apply_dark_override();
        }
    }
}

/// Route panics into the context's last-resort handler.
///
/// The previous hook still runs so panics keep printing to stderr.
pub fn install_panic_hook(ctx: &Arc<AppContext>) {
    let weak = Arc::downgrade(ctx);
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        if let Some(ctx) = weak.upgrade() {
            ctx.record_panic(ErrorDetails::from_panic(info));
        }
        previous(info);
    }));
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::Value;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    /// Records every POST; optionally fails them.
    #[derive(Default)]
    pub(crate) struct RecordingPoster {
        pub calls: Mutex<Vec<(String, Value, Duration)>>,
        pub fail: AtomicBool,
    }

    impl HttpPoster for RecordingPoster {
        fn post_json(&self, url: &str, body: &Value, timeout: Duration) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push((url.to_string(), body.clone(), timeout));
            if self.fail.load(Ordering::SeqCst) {
                return Err(Error::HttpStatus {
                    url: url.to_string(),
                    status: 500,
                });
            }
            Ok(())
        }
    }

    pub(crate) struct StaticKey(pub &'static str);

    impl MachineKeyProvider for StaticKey {
        fn get_or_create_machine_key(&self) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    pub(crate) struct ScriptedPrompt {
        pub answer: bool,
        pub asked: Arc<Mutex<Vec<String>>>,
    }

    impl ErrorPrompt for ScriptedPrompt {
        fn ask_continue(&self, _title: &str, message: &str) -> bool {
            self.asked.lock().unwrap().push(message.to_string());
            self.answer
        }
    }

    pub(crate) struct TestContext {
        pub dir: TempDir,
        pub poster: Arc<RecordingPoster>,
        pub asked: Arc<Mutex<Vec<String>>>,
        pub ctx: Arc<AppContext>,
    }

    /// Context writing into a temp folder with reporting endpoints configured.
    pub(crate) fn test_context(configure: impl FnOnce(&mut Settings)) -> TestContext {
        let dir = TempDir::new().unwrap();
        let mut settings = Settings {
            common_folder: dir.path().to_path_buf(),
            bug_report_url: "https://reports.test/bug".to_string(),
            telemetry_url: "https://reports.test/telemetry".to_string(),
            ..Settings::default()
        };
        configure(&mut settings);

        let poster = Arc::new(RecordingPoster::default());
        let asked = Arc::new(Mutex::new(Vec::new()));
        let ctx = Arc::new(AppContext::new(
            settings,
            Box::new(StaticKey("3f2b9d7e-machine")),
            poster.clone(),
            Box::new(ScriptedPrompt {
                answer: true,
                asked: asked.clone(),
            }),
        ));
        TestContext {
            dir,
            poster,
            asked,
            ctx,
        }
    }

    /// Drop the context (joining background jobs) and return the log text.
    fn finish(test: TestContext) -> (String, Arc<RecordingPoster>, TempDir) {
        let TestContext {
            dir, poster, ctx, ..
        } = test;
        let log = ErrorLog::new(dir.path());
        drop(ctx);
        (log.read().unwrap(), poster, dir)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Encryption
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_encrypt_roundtrip_both_modes() {
        let test = test_context(|_| {});
        let ctx = &test.ctx;

        for mode in [Some(true), Some(false), None] {
            let encrypted = ctx.encrypt("my password", mode).unwrap();
            assert!(encrypted.ends_with(ENCRYPTED_POSTFIX));
            assert_eq!(ctx.decrypt(&encrypted, mode).unwrap(), "my password");
        }
    }

    #[test]
    fn test_machine_key_and_base_key_differ() {
        let test = test_context(|_| {});
        let encrypted = test.ctx.encrypt("secret", Some(true)).unwrap();
        assert!(test.ctx.decrypt(&encrypted, Some(false)).is_err());
    }

    #[test]
    fn test_machine_key_disabled_uses_base_key() {
        let test = test_context(|s| s.use_machine_encryption_key_for_passwords = false);
        assert_eq!(
            test.ctx.encryption_machine_key().unwrap(),
            crypto::BASE_KEY
        );

        // Shareable: decrypts with the plain base key
        let encrypted = test.ctx.encrypt("shared", Some(true)).unwrap();
        assert_eq!(decrypt_string(&encrypted, crypto::BASE_KEY).unwrap(), "shared");
    }

    #[test]
    fn test_encrypt_empty_and_idempotent() {
        let test = test_context(|_| {});
        assert_eq!(test.ctx.encrypt("", None).unwrap(), "");
        assert_eq!(test.ctx.decrypt("", None).unwrap(), "");

        let once = test.ctx.encrypt("value", None).unwrap();
        assert_eq!(test.ctx.encrypt(&once, None).unwrap(), once);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Logging & Bug Reports
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_log_message_without_error() {
        let test = test_context(|_| {});
        test.ctx.log("Plain message", None);

        let (log, poster, _dir) = finish(test);
        assert!(log.contains(" - Plain message"));
        assert!(!log.contains("---------------------------"));
        assert!(poster.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_log_with_error_writes_details_and_reports() {
        let test = test_context(|_| {});
        let err = Error::Application("disk on fire".to_string());
        test.ctx.log("Saving failed", Some(&err));

        let (log, poster, _dir) = finish(test);
        assert!(log.contains("Saving failed\nMarkdown Monster v"));
        assert!(log.contains("disk on fire"));
        assert!(log.contains("---------------------------"));

        let calls = poster.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (url, body, timeout) = &calls[0];
        assert_eq!(url, "https://reports.test/bug");
        assert_eq!(*timeout, BUG_REPORT_TIMEOUT);
        assert_eq!(body["Message"], "Saving failed\r\ndisk on fire");
        assert_eq!(body["Product"], "Markdown Monster");
    }

    #[test]
    fn test_log_error_uses_root_cause_message() {
        let test = test_context(|s| s.bug_report_url.clear());
        let err = Error::FileWrite {
            path: "post.md".into(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "device full"),
        };
        test.ctx.log_error(&err);

        let (log, _, _dir) = finish(test);
        assert!(log.contains(" - device full\n"));
    }

    #[test]
    fn test_failed_bug_report_is_logged_once() {
        let test = test_context(|_| {});
        test.poster.fail.store(true, Ordering::SeqCst);
        test.ctx
            .log("Boom", Some(&Error::Application("bad".to_string())));

        let (log, poster, _dir) = finish(test);
        assert_eq!(log.matches("Unable to report bug").count(), 1);
        // The failure entry itself never triggers another report
        assert_eq!(poster.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_bug_report_skipped_without_url() {
        let test = test_context(|s| s.bug_report_url.clear());
        assert!(!test
            .ctx
            .send_bug_report(&ErrorDetails::from_message("x"), None));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Telemetry
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_telemetry_sent_when_enabled() {
        let test = test_context(|s| s.application_updates.access_count = 12);
        assert!(test.ctx.send_telemetry("Startup", Some("first")));

        let (_, poster, _dir) = finish(test);
        let calls = poster.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (url, body, timeout) = &calls[0];
        assert_eq!(url, "https://reports.test/telemetry");
        assert_eq!(*timeout, TELEMETRY_TIMEOUT);
        assert_eq!(body["Operation"], "Startup");
        assert_eq!(body["Data"], "first");
        assert_eq!(body["Access"], 12);
        assert_eq!(body["Registered"], false);
    }

    #[test]
    fn test_telemetry_disabled() {
        let test = test_context(|s| s.send_telemetry = false);
        assert!(!test.ctx.send_telemetry("Startup", None));

        let (_, poster, _dir) = finish(test);
        assert!(poster.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_telemetry_registered_user_threshold() {
        let test = test_context(|s| {
            s.unlock_key = Some("REG-KEY".to_string());
            s.application_updates.access_count = REGISTERED_TELEMETRY_LIMIT;
        });
        assert!(test.ctx.send_telemetry("AtLimit", None));

        test.ctx
            .update_settings(|s| s.application_updates.access_count = 351);
        assert!(!test.ctx.send_telemetry("OverLimit", None));
    }

    #[test]
    fn test_telemetry_unregistered_ignores_threshold() {
        let test = test_context(|s| s.application_updates.access_count = 5000);
        assert!(test.ctx.send_telemetry("Heavy user", None));
    }

    #[test]
    fn test_telemetry_failure_logged_without_report() {
        let test = test_context(|_| {});
        test.poster.fail.store(true, Ordering::SeqCst);
        test.ctx.send_telemetry("Startup", None);

        let (log, poster, _dir) = finish(test);
        assert!(log.contains("Unable to send telemetry"));
        assert_eq!(poster.calls.lock().unwrap().len(), 1);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Unhandled errors
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_handle_application_error_prompts_and_logs() {
        let test = test_context(|s| s.bug_report_url.clear());
        let keep_running = test
            .ctx
            .handle_application_error(&Error::Application("render failed".to_string()));
        assert!(keep_running);

        let asked = test.asked.lock().unwrap().clone();
        assert_eq!(asked.len(), 1);
        assert!(asked[0].contains("render failed"));
        assert!(asked[0].ends_with("Do you want to continue?"));

        let (log, _, _dir) = finish(test);
        assert!(log.contains("Last Resort Handler"));
    }

    #[test]
    fn test_recorded_panic_is_prompted_once() {
        let test = test_context(|s| s.bug_report_url.clear());
        test.ctx
            .record_panic(ErrorDetails::from_message("index out of bounds"));

        assert!(test.ctx.confirm_continue_after_panic());
        assert!(test.asked.lock().unwrap()[0].contains("index out of bounds"));

        // A second prompt has nothing recorded
        test.ctx.confirm_continue_after_panic();
        assert!(test.asked.lock().unwrap()[1].contains("Unknown error"));
    }

    #[test]
    fn test_panic_hook_logs_reports_and_prompts() {
        const MESSAGE: &str = "editor state corrupted";
        let test = test_context(|_| {});

        let saved = std::panic::take_hook();
        install_panic_hook(&test.ctx);
        let result = std::panic::catch_unwind(|| panic!("{}", MESSAGE));
        drop(std::panic::take_hook());
        std::panic::set_hook(saved);
        assert!(result.is_err());

        assert!(test.ctx.confirm_continue_after_panic());
        let asked = test.asked.lock().unwrap().clone();
        assert_eq!(asked.len(), 1);
        assert!(asked[0].contains(MESSAGE));

        let (log, poster, _dir) = finish(test);
        assert!(log.contains("Last Resort Handler"));

        // Other tests may panic concurrently; count only this panic's reports
        let calls = poster.calls.lock().unwrap();
        let reports = calls
            .iter()
            .filter(|(url, body, _)| {
                url.ends_with("/bug")
                    && body["Message"].as_str().is_some_and(|m| m.contains(MESSAGE))
            })
            .count();
        assert_eq!(reports, 1);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Theme
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_set_theme_dark_overrides_window() {
        let test = test_context(|s| s.theme = Theme::Dark);
        let mut chrome = WindowChrome::default();

        let resolved = test.ctx.set_theme(Theme::Default, Some(&mut chrome));
        assert_eq!(resolved, Theme::Dark);
        assert_eq!(chrome.title_bar, crate::theme::DARK_TITLE_BAR);
    }

    #[test]
    fn test_set_theme_light_is_noop() {
        let test = test_context(|s| s.theme = Theme::Light);
        let mut chrome = WindowChrome::default();

        let resolved = test.ctx.set_theme(Theme::Default, Some(&mut chrome));
        assert_eq!(resolved, Theme::Light);
        assert_eq!(chrome, WindowChrome::default());

        assert_eq!(test.ctx.set_theme(Theme::Dark, None), Theme::Dark);
    }
}
