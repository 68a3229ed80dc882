// Hide console window on Windows in release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! Markdown Monster - Main Entry Point
//!
//! A Markdown editor that publishes posts to MetaWeblog compatible blogs.
//! Built with Rust and egui.

mod app;
mod config;
mod context;
mod error;
mod files;
mod state;
mod string_utils;
mod theme;
mod ui;
mod weblog;

use app::MonsterApp;
use config::{load_config, save_config_silent};
use context::{
    install_panic_hook, AppContext, FileMachineKeyStore, NativeErrorPrompt, ReqwestPoster,
    PRODUCT_NAME,
};
use log::{info, warn};
use std::sync::Arc;
use weblog::{WeblogService, WeblogStore, WEBLOG_CONFIG_FILE_NAME};

// Note: Native window decorations are disabled for the custom title bar, so
// the dark theme's window override also colors the title area.

fn main() -> eframe::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!(
        "Starting {} {}",
        PRODUCT_NAME,
        context::version_for_display(context::app_version())
    );

    let mut settings = load_config();
    settings.record_access();
    save_config_silent(&settings);

    let window_size = settings.window_size;
    info!(
        "Window configuration: {}x{}, maximized: {}",
        window_size.width, window_size.height, window_size.maximized
    );

    let app = match AppContext::with_defaults(settings.clone()) {
        Ok(app) => app,
        Err(e) => {
            // No config directory: keep the machine key next to the temp files
            warn!("Using temporary machine key: {}", e);
            AppContext::new(
                settings,
                Box::new(FileMachineKeyStore::new(
                    std::env::temp_dir().join("markdown-monster-machine.key"),
                )),
                Arc::new(ReqwestPoster::new()),
                Box::new(NativeErrorPrompt),
            )
        }
    };
    let app = Arc::new(app);
    install_panic_hook(&app);
    app.send_telemetry("Startup", None);

    let weblog = WeblogService::with_defaults(Arc::clone(&app)).unwrap_or_else(|e| {
        warn!("Weblog configuration unavailable: {}", e);
        let addin = weblog::MarkdownWeblogAddin::new(
            Arc::clone(&app),
            Box::new(weblog::MetaWeblogClient::new()),
        );
        WeblogService::new(
            Arc::clone(&app),
            WeblogStore::new(std::env::temp_dir().join(WEBLOG_CONFIG_FILE_NAME)),
            Box::new(addin),
        )
    });

    // Configure the native window options with custom title bar (no native decorations)
    let viewport = eframe::egui::ViewportBuilder::default()
        .with_title(PRODUCT_NAME)
        .with_decorations(false)
        .with_inner_size([window_size.width, window_size.height])
        .with_min_inner_size([480.0, 320.0])
        .with_maximized(window_size.maximized);

    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        PRODUCT_NAME,
        native_options,
        Box::new(move |cc| Ok(Box::new(MonsterApp::new(cc, app, weblog)))),
    )
}
