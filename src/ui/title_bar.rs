//! Custom title bar and edge resizing for the borderless main window.
//!
//! The title bar is filled from [`WindowChrome`], so the dark theme's
//! window override shows up here.

use eframe::egui::{self, CursorIcon, Pos2, Rect, ResizeDirection, ViewportCommand};

use crate::theme::WindowChrome;

/// Width of the grab zone along the window edges.
const RESIZE_MARGIN: f32 = 6.0;

/// Button pressed in the title bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleBarAction {
    None,
    Close,
}

/// Edge or corner under `pos`, if any.
fn resize_direction(window: Rect, pos: Pos2) -> Option<ResizeDirection> {
    let west = pos.x - window.min.x < RESIZE_MARGIN;
    let east = window.max.x - pos.x < RESIZE_MARGIN;
    let north = pos.y - window.min.y < RESIZE_MARGIN;
    let south = window.max.y - pos.y < RESIZE_MARGIN;

    match (north, south, west, east) {
        (true, _, true, _) => Some(ResizeDirection::NorthWest),
        (true, _, _, true) => Some(ResizeDirection::NorthEast),
        (_, true, true, _) => Some(ResizeDirection::SouthWest),
        (_, true, _, true) => Some(ResizeDirection::SouthEast),
        (true, ..) => Some(ResizeDirection::North),
        (_, true, ..) => Some(ResizeDirection::South),
        (_, _, true, _) => Some(ResizeDirection::West),
        (.., true) => Some(ResizeDirection::East),
        _ => None,
    }
}

fn resize_cursor(direction: ResizeDirection) -> CursorIcon {
    match direction {
        ResizeDirection::North => CursorIcon::ResizeNorth,
        ResizeDirection::South => CursorIcon::ResizeSouth,
        ResizeDirection::East => CursorIcon::ResizeEast,
        ResizeDirection::West => CursorIcon::ResizeWest,
        ResizeDirection::NorthEast => CursorIcon::ResizeNorthEast,
        ResizeDirection::NorthWest => CursorIcon::ResizeNorthWest,
        ResizeDirection::SouthEast => CursorIcon::ResizeSouthEast,
        ResizeDirection::SouthWest => CursorIcon::ResizeSouthWest,
    }
}

/// Start a native resize when the pointer is pressed on a window edge.
///
/// Returns `true` while the pointer is over a resize zone.
pub fn handle_edge_resize(ctx: &egui::Context) -> bool {
    if ctx.input(|i| i.viewport().maximized.unwrap_or(false)) {
        return false;
    }

    let (pos, pressed) = ctx.input(|i| (i.pointer.hover_pos(), i.pointer.primary_pressed()));
    let Some(direction) = pos.and_then(|pos| resize_direction(ctx.screen_rect(), pos)) else {
        return false;
    };

    ctx.set_cursor_icon(resize_cursor(direction));
    if pressed {
        ctx.send_viewport_cmd(ViewportCommand::BeginResize(direction));
    }
    true
}

/// Draw the title bar. Dragging moves the window, double-click maximizes.
pub fn show_title_bar(
    ctx: &egui::Context,
    chrome: &WindowChrome,
    title: &str,
    in_resize_zone: bool,
) -> TitleBarAction {
    let mut action = TitleBarAction::None;
    let focused = ctx.input(|i| i.viewport().focused.unwrap_or(true));
    let is_maximized = ctx.input(|i| i.viewport().maximized.unwrap_or(false));

    let fill = chrome.title_fill(focused);
    let text_color = if fill.r() as u32 + fill.g() as u32 + fill.b() as u32 > 384 {
        egui::Color32::from_rgb(30, 30, 30)
    } else {
        egui::Color32::from_rgb(230, 230, 230)
    };

    egui::TopBottomPanel::top("title_bar")
        .frame(
            egui::Frame::none()
                .fill(fill)
                .inner_margin(egui::Margin::symmetric(8.0, 4.0)),
        )
        .show_separator_line(false)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(title).size(12.0).color(text_color));

                let drag_rect = ui.available_rect_before_wrap();
                let drag = ui.allocate_rect(drag_rect, egui::Sense::click_and_drag());
                if drag.double_clicked() {
                    ctx.send_viewport_cmd(ViewportCommand::Maximized(!is_maximized));
                }
                if drag.dragged() && !in_resize_zone {
                    ctx.send_viewport_cmd(ViewportCommand::StartDrag);
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let button = |label: &str| {
                        egui::Button::new(egui::RichText::new(label).size(14.0).color(text_color))
                            .frame(false)
                            .min_size(egui::vec2(40.0, 24.0))
                    };

                    if ui.add(button("×")).on_hover_text("Close").clicked() {
                        action = TitleBarAction::Close;
                    }
                    let max_icon = if is_maximized { "❐" } else { "□" };
                    if ui.add(button(max_icon)).on_hover_text("Maximize").clicked() {
                        ctx.send_viewport_cmd(ViewportCommand::Maximized(!is_maximized));
                    }
                    if ui.add(button("–")).on_hover_text("Minimize").clicked() {
                        ctx.send_viewport_cmd(ViewportCommand::Minimized(true));
                    }
                });
            });
        });

    // Line between the title bar and the menu
    egui::TopBottomPanel::top("title_separator")
        .exact_height(1.0)
        .frame(egui::Frame::none().fill(chrome.menu_separator))
        .show_separator_line(false)
        .show(ctx, |_| {});

    action
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> Rect {
        Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(200.0, 100.0))
    }

    #[test]
    fn test_corners() {
        assert_eq!(
            resize_direction(window(), Pos2::new(1.0, 1.0)),
            Some(ResizeDirection::NorthWest)
        );
        assert_eq!(
            resize_direction(window(), Pos2::new(199.0, 99.0)),
            Some(ResizeDirection::SouthEast)
        );
    }

    #[test]
    fn test_edges_and_center() {
        assert_eq!(
            resize_direction(window(), Pos2::new(100.0, 2.0)),
            Some(ResizeDirection::North)
        );
        assert_eq!(
            resize_direction(window(), Pos2::new(198.0, 50.0)),
            Some(ResizeDirection::East)
        );
        assert_eq!(resize_direction(window(), Pos2::new(100.0, 50.0)), None);
    }

    #[test]
    fn test_cursor_for_direction() {
        assert_eq!(
            resize_cursor(ResizeDirection::SouthWest),
            CursorIcon::ResizeSouthWest
        );
    }
}
