//! Main application module for Markdown Monster
//!
//! This module implements the eframe App trait for the main window: the
//! editor shell (tabs, menus, status bar), the Post to Weblog dialog and the
//! last-resort handling of panics raised while drawing a frame.

use eframe::egui;
use log::{debug, info, warn};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::config::{save_config_silent, Theme};
use crate::context::{
    app_version, os_version, runtime_description, version_for_display, AppContext,
    PRODUCT_NAME,
};
use crate::files::dialogs::{confirm_discard_changes, open_markdown_dialog, save_markdown_dialog};
use crate::state::AppState;
use crate::theme::{apply_visuals, WindowChrome};
use crate::ui::{
    handle_edge_resize, show_title_bar, show_weblog_dialog, TitleBarAction, WeblogDialogAction,
};
use crate::weblog::{HostWindow, PostComposer, PostOutcome, WeblogService};

/// How long file operation messages stay in the status bar.
const STATUS_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(4);

/// Keyboard shortcut actions, detected first and executed afterwards.
#[derive(Debug, Clone, Copy)]
enum KeyboardAction {
    /// New tab (Ctrl+N)
    New,
    /// Open file dialog (Ctrl+O)
    Open,
    /// Save current file (Ctrl+S)
    Save,
    /// Save As dialog (Ctrl+Shift+S)
    SaveAs,
    /// Close current tab (Ctrl+W)
    CloseTab,
    /// Post to weblog (Ctrl+Shift+W)
    PostToWeblog,
}

/// The main application struct that holds all state and implements eframe::App.
pub struct MonsterApp {
    /// Shared configuration, logging and reporting services
    app: Arc<AppContext>,
    /// Open documents and status bar
    state: AppState,
    /// Weblog add-in and its configuration
    weblog: WeblogService,
    /// Open Post to Weblog dialog
    composer: Option<PostComposer>,
    /// Last failure shown inside the dialog
    composer_message: Option<String>,
    /// Window chrome colors for the current theme
    chrome: WindowChrome,
    /// Theme currently applied
    theme: Theme,
    show_about: bool,
    should_exit: bool,
}

impl MonsterApp {
    pub fn new(cc: &eframe::CreationContext<'_>, app: Arc<AppContext>, weblog: WeblogService) -> Self {
        let mut chrome = WindowChrome::default();
        let theme = app.set_theme(Theme::Default, Some(&mut chrome));
        apply_visuals(&cc.egui_ctx, theme);

        Self {
            app,
            state: AppState::new(),
            weblog,
            composer: None,
            composer_message: None,
            chrome,
            theme,
            show_about: false,
            should_exit: false,
        }
    }

    fn window_title(&self) -> String {
        match self.state.active_tab() {
            Some(tab) => format!("{} - {}", tab.title(), PRODUCT_NAME),
            None => PRODUCT_NAME.to_string(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Actions
    // ─────────────────────────────────────────────────────────────────────────

    fn open_file(&mut self, path: std::path::PathBuf) {
        match self.state.open_file(path.clone()) {
            Ok(_) => {
                self.app.update_settings(|s| s.add_recent_file(path));
            }
            Err(e) => {
                warn!("Failed to open {}: {}", path.display(), e);
                self.state
                    .show_status(&format!("Unable to open file: {}", e), Some(STATUS_TIMEOUT));
            }
        }
    }

    fn handle_open(&mut self) {
        let initial_dir = self
            .state
            .active_tab()
            .and_then(|t| t.path.as_ref())
            .and_then(|p| p.parent().map(|d| d.to_path_buf()));
        if let Some(path) = open_markdown_dialog(initial_dir.as_deref()) {
            self.open_file(path);
        }
    }

    fn handle_save(&mut self) {
        let has_path = self
            .state
            .active_tab()
            .is_some_and(|t| t.path.is_some());
        if !has_path {
            self.handle_save_as();
            return;
        }

        match self.state.save_active_tab() {
            Ok(path) => self
                .state
                .show_status(&format!("Saved {}", path.display()), Some(STATUS_TIMEOUT)),
            Err(e) => {
                self.app.log_error(&e);
                self.state.show_status(&e.to_string(), Some(STATUS_TIMEOUT));
            }
        }
    }

    fn handle_save_as(&mut self) {
        let default_name = self
            .weblog
            .addin()
            .post_config_from_markdown(&self.active_markdown())
            .title;
        let default_name = if default_name.is_empty() {
            "Untitled.md".to_string()
        } else {
            format!("{}.md", crate::string_utils::safe_file_name(&default_name))
        };

        let Some(path) = save_markdown_dialog(None, Some(&default_name)) else {
            return;
        };
        match self.state.save_active_tab_as(path) {
            Ok(path) => {
                self.state
                    .show_status(&format!("Saved {}", path.display()), Some(STATUS_TIMEOUT));
                self.app.update_settings(|s| s.add_recent_file(path));
            }
            Err(e) => {
                self.app.log_error(&e);
                self.state.show_status(&e.to_string(), Some(STATUS_TIMEOUT));
            }
        }
    }

    fn handle_close_tab(&mut self) {
        let index = self.state.active_tab_index();
        let Some(tab) = self.state.active_tab() else {
            return;
        };
        if tab.is_modified() && !confirm_discard_changes(&tab.title()) {
            return;
        }
        self.state.close_tab(index);
    }

    fn active_markdown(&self) -> String {
        self.state
            .active_tab()
            .map(|t| t.content.clone())
            .unwrap_or_default()
    }

    fn open_weblog_dialog(&mut self) {
        if self.composer.is_none() {
            debug!("Opening Post to Weblog dialog");
            self.composer = Some(PostComposer::open(&self.weblog, &self.state));
            self.composer_message = None;
        }
    }

    fn toggle_theme(&mut self, ctx: &egui::Context) {
        let next = self.theme.toggle();
        self.app.update_settings(|s| s.theme = next);

        self.chrome = WindowChrome::default();
        self.theme = self.app.set_theme(next, Some(&mut self.chrome));
        apply_visuals(ctx, self.theme);
        info!("Switched to {} theme", self.theme.label());
    }

    fn show_error_log(&mut self) {
        let path = self.app.error_log_path().to_path_buf();
        if !path.exists() {
            self.state
                .show_status("No errors have been logged.", Some(STATUS_TIMEOUT));
            return;
        }
        if let Err(e) = open::that(&path) {
            warn!("Unable to open {}: {}", path.display(), e);
            self.state.show_status(
                &format!("Error log: {}", path.display()),
                Some(STATUS_TIMEOUT),
            );
        }
    }

    /// Handle a close request; returns `true` if the window may close.
    fn handle_close_request(&mut self) -> bool {
        if self.should_exit {
            return true;
        }
        if self.state.has_unsaved_changes() && !confirm_discard_changes("Some documents") {
            return false;
        }
        self.should_exit = true;
        true
    }

    /// Persist settings and the weblog configuration.
    fn shutdown(&mut self, ctx: &egui::Context) {
        let (rect, maximized) = ctx.input(|i| (i.viewport().inner_rect, i.viewport().maximized));
        self.app.update_settings(|s| {
            if let Some(rect) = rect {
                s.window_size.width = rect.width();
                s.window_size.height = rect.height();
            }
            s.window_size.maximized = maximized.unwrap_or(false);
        });

        if let Some(mut composer) = self.composer.take() {
            composer.close(&mut self.weblog);
        }
        save_config_silent(&self.app.settings());
        info!("{} shutdown complete", PRODUCT_NAME);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────────────────────────────

    fn handle_keyboard_shortcuts(&mut self, ctx: &egui::Context) {
        let action = ctx.input_mut(|i| {
            let shortcuts = [
                (egui::Modifiers::COMMAND | egui::Modifiers::SHIFT, egui::Key::S, KeyboardAction::SaveAs),
                (egui::Modifiers::COMMAND | egui::Modifiers::SHIFT, egui::Key::W, KeyboardAction::PostToWeblog),
                (egui::Modifiers::COMMAND, egui::Key::S, KeyboardAction::Save),
                (egui::Modifiers::COMMAND, egui::Key::O, KeyboardAction::Open),
                (egui::Modifiers::COMMAND, egui::Key::N, KeyboardAction::New),
                (egui::Modifiers::COMMAND, egui::Key::W, KeyboardAction::CloseTab),
            ];
            shortcuts.into_iter().find_map(|(modifiers, key, action)| {
                i.consume_shortcut(&egui::KeyboardShortcut::new(modifiers, key))
                    .then_some(action)
            })
        });

        match action {
            Some(KeyboardAction::New) => {
                self.state.new_tab();
            }
            Some(KeyboardAction::Open) => self.handle_open(),
            Some(KeyboardAction::Save) => self.handle_save(),
            Some(KeyboardAction::SaveAs) => self.handle_save_as(),
            Some(KeyboardAction::CloseTab) => self.handle_close_tab(),
            Some(KeyboardAction::PostToWeblog) => self.open_weblog_dialog(),
            None => {}
        }
    }

    fn render_menu(&mut self, ctx: &egui::Context) {
        let modal = self.composer.is_some();
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            // The weblog dialog is modal
            ui.set_enabled(!modal);
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("New").clicked() {
                        self.state.new_tab();
                        ui.close_menu();
                    }
                    if ui.button("Open...").clicked() {
                        ui.close_menu();
                        self.handle_open();
                    }
                    let recent = self.app.settings().recent_files.clone();
                    ui.add_enabled_ui(!recent.is_empty(), |ui| {
                        ui.menu_button("Open Recent", |ui| {
                            for path in recent {
                                if ui.button(path.display().to_string()).clicked() {
                                    ui.close_menu();
                                    self.open_file(path);
                                }
                            }
                        });
                    });
                    ui.separator();
                    if ui.button("Save").clicked() {
                        ui.close_menu();
                        self.handle_save();
                    }
                    if ui.button("Save As...").clicked() {
                        ui.close_menu();
                        self.handle_save_as();
                    }
                    if ui.button("Close Tab").clicked() {
                        ui.close_menu();
                        self.handle_close_tab();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ui.close_menu();
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Weblog", |ui| {
                    if ui.button("Post to Weblog...").clicked() {
                        ui.close_menu();
                        self.open_weblog_dialog();
                    }
                });

                ui.menu_button("View", |ui| {
                    let label = format!("Switch to {} Theme", self.theme.toggle().label());
                    if ui.button(label).clicked() {
                        ui.close_menu();
                        self.toggle_theme(ctx);
                    }
                });

                ui.menu_button("Help", |ui| {
                    if ui.button("Show Error Log").clicked() {
                        ui.close_menu();
                        self.show_error_log();
                    }
                    if ui.button("About").clicked() {
                        ui.close_menu();
                        self.show_about = true;
                    }
                });
            });
        });
    }

    fn render_status_bar(&mut self, ctx: &egui::Context) {
        let status = self.state.status().unwrap_or("Ready").to_string();
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(status);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.weak(format!("v{}", version_for_display(app_version())));
                });
            });
        });
    }

    fn render_editor(&mut self, ctx: &egui::Context) {
        let font_size = self.app.settings().font_size;
        let modal = self.composer.is_some();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.set_enabled(!modal);
            let mut switch_to = None;
            ui.horizontal_wrapped(|ui| {
                let active = self.state.active_tab_index();
                for (index, tab) in self.state.tabs().iter().enumerate() {
                    if ui.selectable_label(index == active, tab.title()).clicked() {
                        switch_to = Some(index);
                    }
                }
            });
            if let Some(index) = switch_to {
                self.state.set_active_tab(index);
            }
            ui.separator();

            if let Some(tab) = self.state.active_tab_mut() {
                egui::ScrollArea::vertical()
                    .id_source(tab.id)
                    .show(ui, |ui| {
                        ui.add(
                            egui::TextEdit::multiline(&mut tab.content)
                                .font(egui::FontId::monospace(font_size))
                                .desired_width(f32::INFINITY)
                                .desired_rows(30)
                                .frame(false),
                        );
                    });
            }
        });
    }

    fn render_about(&mut self, ctx: &egui::Context) {
        let mut open = self.show_about;
        egui::Window::new(format!("About {}", PRODUCT_NAME))
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.heading(PRODUCT_NAME);
                ui.label(format!("Version {}", version_for_display(app_version())));
                ui.label(runtime_description());
                ui.label(os_version());
                ui.label(format!(
                    "Running since {}",
                    self.app.started().with_timezone(&chrono::Local).format("%H:%M:%S")
                ));
                ui.add_space(6.0);
                ui.weak(format!(
                    "Error log: {}",
                    self.app.error_log_path().display()
                ));
            });
        self.show_about = open;
    }

    fn render_weblog_dialog(&mut self, ctx: &egui::Context) {
        let Some(composer) = self.composer.as_mut() else {
            return;
        };

        match show_weblog_dialog(ctx, composer, self.composer_message.as_deref()) {
            WeblogDialogAction::Post => match composer.post(&mut self.weblog, &mut self.state) {
                PostOutcome::Published { post_id } => {
                    info!("Weblog post {} published", post_id);
                }
                PostOutcome::Failed { message } => self.composer_message = Some(message),
            },
            WeblogDialogAction::NewPost => {
                match composer.new_post(&mut self.weblog, &mut self.state) {
                    Ok(Some(path)) => self.app.update_settings(|s| s.add_recent_file(path)),
                    Ok(None) => {}
                    Err(e) => {
                        self.composer_message = Some(e.to_string());
                        if !self.app.handle_application_error(&e) {
                            self.should_exit = true;
                            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                        }
                    }
                }
            }
            WeblogDialogAction::Close => composer.close(&mut self.weblog),
            WeblogDialogAction::None => {}
        }

        if !composer.is_open() {
            self.composer = None;
            self.composer_message = None;
        }
    }

    /// Draw one frame.
    fn render(&mut self, ctx: &egui::Context) {
        let in_resize_zone = handle_edge_resize(ctx);

        let title = self.window_title();
        if show_title_bar(ctx, &self.chrome, &title, in_resize_zone) == TitleBarAction::Close {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        self.render_menu(ctx);
        self.render_status_bar(ctx);
        self.render_editor(ctx);
        self.render_weblog_dialog(ctx);
        if self.show_about {
            self.render_about(ctx);
        }

        if self.composer.is_none() {
            self.handle_keyboard_shortcuts(ctx);
        }
    }
}

impl eframe::App for MonsterApp {
    /// Called each time the UI needs repainting.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.viewport().close_requested()) {
            if self.handle_close_request() {
                self.shutdown(ctx);
            } else {
                ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            }
        }

        // The panic hook has already logged and reported the panic
        let frame = panic::catch_unwind(AssertUnwindSafe(|| self.render(ctx)));
        if frame.is_err() && !self.app.confirm_continue_after_panic() {
            self.should_exit = true;
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        // Keep expiring status messages moving
        ctx.request_repaint_after(std::time::Duration::from_millis(500));
    }
}
