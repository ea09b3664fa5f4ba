// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Video overlay: frame display and live marker rendering.
//!
//! This module shows the current frame, paints the markers active at
//! the playhead with the shared triangle geometry, and reports pointer
//! activity to the caller as [`OverlayAction`]s.

use egui::{Align2, Color32, FontId, Pos2, Sense, Stroke};
use uuid::Uuid;

use crate::models::session::EditSession;
use crate::sampling::compositor;
use crate::util::geometry;

/// Raw pointer activity on the overlay surface, in fractions of the
/// rendered frame rect.
pub enum OverlayAction {
    None,
    Pressed { fx: f64, fy: f64 },
    Dragged { fx: f64, fy: f64 },
    Released,
    Clicked { fx: f64, fy: f64 },
}

/// Display the overlay area and report pointer activity.
pub fn show(
    ui: &mut egui::Ui,
    session: Option<&EditSession>,
    frame_texture: &Option<egui::TextureHandle>,
    selected: Option<Uuid>,
) -> OverlayAction {
    let mut action = OverlayAction::None;
    ui.style_mut().visuals.extreme_bg_color = Color32::from_gray(40);

    let available_size = ui.available_size();

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        ui.set_min_size(available_size);

        let (Some(session), Some(texture)) = (session, frame_texture) else {
            show_welcome(ui);
            return;
        };

        // Aspect-fit the frame into the available space.
        let available = ui.available_size();
        let img_aspect = session.frame_width as f32 / session.frame_height.max(1) as f32;
        let available_aspect = available.x / available.y.max(1.0);

        let (display_width, display_height) = if img_aspect > available_aspect {
            (available.x, available.x / img_aspect)
        } else {
            (available.y * img_aspect, available.y)
        };

        let x_offset = (available.x - display_width) / 2.0;
        let y_offset = (available.y - display_height) / 2.0;
        let image_rect = egui::Rect::from_min_size(
            ui.min_rect().min + egui::vec2(x_offset, y_offset),
            egui::vec2(display_width, display_height),
        );

        ui.painter().image(
            texture.id(),
            image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            Color32::WHITE,
        );

        // Markers active at the playhead, oldest first so newer ones
        // paint on top, matching hit-test order.
        let painter = ui.painter_at(image_rect);
        let min_dim = display_width.min(display_height) as f64;
        for a in session.store.active_at(session.playhead) {
            let tri = geometry::triangle_vertices(
                a.x,
                a.y,
                a.size,
                display_width as f64,
                display_height as f64,
            );
            let points: Vec<Pos2> = tri
                .vertices()
                .iter()
                .map(|(x, y)| {
                    Pos2::new(image_rect.min.x + *x as f32, image_rect.min.y + *y as f32)
                })
                .collect();

            let color = a.color.to_egui();
            let stroke_w = compositor::scaled_stroke(a.stroke_width, min_dim) as f32;
            let stroke = if selected == Some(a.id) {
                Stroke::new(stroke_w + 1.5, Color32::WHITE)
            } else {
                Stroke::new(stroke_w, color)
            };
            painter.add(egui::Shape::convex_polygon(
                points.clone(),
                color.gamma_multiply(0.15),
                stroke,
            ));

            if let Some(label) = &a.label {
                painter.text(
                    Pos2::new(points[0].x, points[0].y - 4.0),
                    Align2::CENTER_BOTTOM,
                    label,
                    FontId::proportional(11.0),
                    color,
                );
            }
        }

        // Pointer activity as fractions of this frame's rect; the rect
        // is re-measured every frame, so resizes mid-gesture are safe.
        let response = ui.allocate_rect(image_rect, Sense::click_and_drag());
        if let Some(pos) = response.interact_pointer_pos() {
            let fx = ((pos.x - image_rect.min.x) / image_rect.width()) as f64;
            let fy = ((pos.y - image_rect.min.y) / image_rect.height()) as f64;
            if response.drag_started() {
                action = OverlayAction::Pressed { fx, fy };
            } else if response.dragged() {
                action = OverlayAction::Dragged { fx, fy };
            } else if response.drag_stopped() {
                action = OverlayAction::Released;
            } else if response.clicked() {
                action = OverlayAction::Clicked { fx, fy };
            }
        }
    });

    action
}

fn show_welcome(ui: &mut egui::Ui) {
    ui.centered_and_justified(|ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(20.0);
            ui.heading(
                egui::RichText::new("TRIMARK")
                    .size(32.0)
                    .color(Color32::from_gray(200)),
            );
            ui.label(
                egui::RichText::new("Triangular markers over frame sequences")
                    .size(14.0)
                    .color(Color32::from_gray(150)),
            );
            ui.add_space(20.0);
            ui.label(
                egui::RichText::new("Open a frame folder to begin annotating")
                    .color(Color32::from_gray(180)),
            );
            ui.add_space(10.0);
            ui.label(
                egui::RichText::new("File → Open Frame Folder...")
                    .weak()
                    .color(Color32::from_gray(130)),
            );
        });
    });
}
