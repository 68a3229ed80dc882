//! Post to Weblog dialog.
//!
//! Draws a [`PostComposer`] and reports which button was pressed. The
//! composer itself performs the actions.

use eframe::egui::{self, Color32, Key, RichText};

use crate::config::Theme;
use crate::weblog::PostComposer;

/// Button pressed in the dialog this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeblogDialogAction {
    /// Nothing pressed (dialog still open)
    None,
    /// Publish the active document
    Post,
    /// Create a new post from the entered title
    NewPost,
    /// Close without posting
    Close,
}

/// Show the dialog; `message` is the last failure, if any.
pub fn show_weblog_dialog(
    ctx: &egui::Context,
    composer: &mut PostComposer,
    message: Option<&str>,
) -> WeblogDialogAction {
    let mut action = WeblogDialogAction::None;

    if ctx.input(|i| i.key_pressed(Key::Escape)) {
        return WeblogDialogAction::Close;
    }

    let is_dark = composer.theme != Theme::Light;
    let (bg_color, border_color, muted) = if is_dark {
        (
            Color32::from_rgb(40, 40, 45),
            Color32::from_rgb(70, 70, 80),
            Color32::from_rgb(150, 150, 160),
        )
    } else {
        (
            Color32::from_rgb(250, 250, 250),
            Color32::from_rgb(180, 180, 190),
            Color32::from_rgb(100, 100, 110),
        )
    };

    egui::Window::new("📤 Post to Weblog")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .frame(
            egui::Frame::window(&ctx.style())
                .fill(bg_color)
                .stroke(egui::Stroke::new(1.0, border_color))
                .rounding(8.0),
        )
        .show(ctx, |ui| {
            ui.set_min_width(460.0);
            ui.add_space(8.0);

            egui::Grid::new("weblog_post_fields")
                .num_columns(2)
                .spacing([10.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Title:");
                    ui.add(
                        egui::TextEdit::singleline(&mut composer.metadata.title)
                            .desired_width(340.0),
                    );
                    ui.end_row();

                    ui.label("Weblog:");
                    let selected = if composer.metadata.weblog_name.is_empty() {
                        "Select a weblog".to_string()
                    } else {
                        composer.metadata.weblog_name.clone()
                    };
                    egui::ComboBox::from_id_source("weblog_name")
                        .selected_text(selected)
                        .width(340.0)
                        .show_ui(ui, |ui| {
                            for name in &composer.weblog_names {
                                ui.selectable_value(
                                    &mut composer.metadata.weblog_name,
                                    name.clone(),
                                    name.as_str(),
                                );
                            }
                        });
                    ui.end_row();

                    ui.label("Abstract:");
                    ui.add(
                        egui::TextEdit::multiline(&mut composer.metadata.abstract_text)
                            .desired_rows(3)
                            .desired_width(340.0),
                    );
                    ui.end_row();

                    ui.label("Categories:");
                    ui.add(
                        egui::TextEdit::singleline(&mut composer.metadata.categories)
                            .hint_text("comma separated")
                            .desired_width(340.0),
                    );
                    ui.end_row();

                    ui.label("Keywords:");
                    ui.add(
                        egui::TextEdit::singleline(&mut composer.metadata.keywords)
                            .hint_text("comma separated")
                            .desired_width(340.0),
                    );
                    ui.end_row();
                });

            if let Some(post_id) = &composer.metadata.post_id {
                ui.add_space(4.0);
                ui.label(
                    RichText::new(format!("Updates existing post {}", post_id))
                        .small()
                        .color(muted),
                );
            }

            if let Some(message) = message {
                ui.add_space(6.0);
                ui.colored_label(Color32::from_rgb(220, 80, 80), message);
            }

            ui.add_space(12.0);
            ui.horizontal(|ui| {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let can_post = !composer.metadata.title.trim().is_empty()
                        && !composer.metadata.weblog_name.is_empty();
                    if ui
                        .add_enabled(can_post, egui::Button::new("Post"))
                        .clicked()
                    {
                        action = WeblogDialogAction::Post;
                    }

                    ui.add_space(8.0);

                    if ui.button("Cancel").clicked() {
                        action = WeblogDialogAction::Close;
                    }
                });
            });

            ui.add_space(8.0);
            ui.separator();
            ui.add_space(4.0);

            ui.label(RichText::new("New post").strong());
            ui.horizontal(|ui| {
                let response = ui.add(
                    egui::TextEdit::singleline(&mut composer.new_title)
                        .hint_text("Title of the new post")
                        .desired_width(340.0),
                );
                let enter = response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));
                let can_create = !composer.new_title.trim().is_empty();
                if ui
                    .add_enabled(can_create, egui::Button::new("Create"))
                    .clicked()
                    || (enter && can_create)
                {
                    action = WeblogDialogAction::NewPost;
                }
            });

            if composer.weblog_names.is_empty() {
                ui.add_space(4.0);
                ui.label(
                    RichText::new("No weblogs configured. Add them to weblogs.json.")
                        .small()
                        .color(muted),
                );
            }

            ui.add_space(4.0);
        });

    action
}
