// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Marker properties panel.
//!
//! Lists the markers grouped by derived track, edits the selected
//! marker's fields, and hosts the dataset upload form. Time bounds
//! edited here are programmatic mutations: they clamp to the media
//! range but are not subject to the minimum clip length.

use egui::RichText;
use uuid::Uuid;

use crate::models::session::EditSession;

/// Panel requests handled by the app.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertiesAction {
    None,
    SelectAnnotation(Uuid),
    DeleteAnnotation(Uuid),
    Upload,
}

/// Credentials and naming for the dataset uploader.
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    pub base_url: String,
    pub api_key: String,
    pub part_id: String,
    pub dataset: String,
    pub extra_tags: String,
}

impl UploadForm {
    pub fn ready(&self) -> bool {
        !self.base_url.is_empty() && !self.dataset.is_empty()
    }

    /// User tags, comma-separated in the form field.
    pub fn tags(&self) -> Vec<String> {
        self.extra_tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect()
    }
}

pub fn show(
    ui: &mut egui::Ui,
    session: Option<&mut EditSession>,
    selected: Option<Uuid>,
    upload_form: &mut UploadForm,
    has_frames: bool,
    upload_status: Option<&str>,
) -> PropertiesAction {
    let mut action = PropertiesAction::None;

    ui.heading("Markers");
    ui.separator();

    let Some(session) = session else {
        ui.label(RichText::new("No media loaded").weak());
        return action;
    };

    egui::ScrollArea::vertical().show(ui, |ui| {
        let tracks = session.store.tracks();
        if tracks.is_empty() {
            ui.label(RichText::new("Click the video to place a marker").weak());
        }

        let key_scale = 10f64.powi(crate::config::TRACK_KEY_DECIMALS);
        for (i, track) in tracks.iter().enumerate() {
            ui.label(
                RichText::new(format!(
                    "Track {} @ ({:.2}, {:.2}), {} markers",
                    i + 1,
                    track.key.x as f64 / key_scale,
                    track.key.y as f64 / key_scale,
                    track.members.len()
                ))
                .small()
                .weak(),
            );
            for id in &track.members {
                let Some(a) = session.store.get(*id) else { continue };
                let title = a
                    .label
                    .clone()
                    .unwrap_or_else(|| format!("{:.2}s to {:.2}s", a.start, a.end));
                let is_selected = selected == Some(*id);
                ui.horizontal(|ui| {
                    let (r, g, b) = (a.color.r, a.color.g, a.color.b);
                    ui.label(RichText::new("▲").color(egui::Color32::from_rgb(r, g, b)));
                    if ui.selectable_label(is_selected, title).clicked() {
                        action = PropertiesAction::SelectAnnotation(*id);
                    }
                    if ui.small_button("🗑").clicked() {
                        action = PropertiesAction::DeleteAnnotation(*id);
                    }
                });
            }
            ui.add_space(4.0);
        }

        // Editor for the selected marker.
        if let Some(id) = selected {
            let duration = session.duration;
            if let Some(a) = session.store.get_mut(id) {
                ui.separator();
                ui.heading("Selected marker");

                let mut rgb = [a.color.r, a.color.g, a.color.b];
                ui.horizontal(|ui| {
                    ui.label("Color:");
                    if ui.color_edit_button_srgb(&mut rgb).changed() {
                        a.color = crate::models::annotation::Color::new(rgb[0], rgb[1], rgb[2]);
                    }
                });

                ui.add(egui::Slider::new(&mut a.size, 0.01..=0.5).text("Size"));
                ui.add(egui::Slider::new(&mut a.stroke_width, 1.0..=12.0).text("Stroke"));

                ui.horizontal(|ui| {
                    ui.label("Start:");
                    ui.add(
                        egui::DragValue::new(&mut a.start)
                            .speed(0.05)
                            .range(0.0..=a.end),
                    );
                    ui.label("End:");
                    let lo = a.start;
                    ui.add(
                        egui::DragValue::new(&mut a.end)
                            .speed(0.05)
                            .range(lo..=duration),
                    );
                });

                let mut label = a.label.clone().unwrap_or_default();
                ui.horizontal(|ui| {
                    ui.label("Label:");
                    if ui.text_edit_singleline(&mut label).changed() {
                        a.label = if label.is_empty() { None } else { Some(label) };
                    }
                });
            }
        }

        ui.separator();
        ui.heading("Dataset upload");
        ui.label(RichText::new("Credentials stay in this session").small().weak());

        egui::Grid::new("upload_form").num_columns(2).show(ui, |ui| {
            ui.label("Server:");
            ui.text_edit_singleline(&mut upload_form.base_url);
            ui.end_row();
            ui.label("API key:");
            ui.add(egui::TextEdit::singleline(&mut upload_form.api_key).password(true));
            ui.end_row();
            ui.label("Part id:");
            ui.text_edit_singleline(&mut upload_form.part_id);
            ui.end_row();
            ui.label("Dataset:");
            ui.text_edit_singleline(&mut upload_form.dataset);
            ui.end_row();
            ui.label("Tags:");
            ui.text_edit_singleline(&mut upload_form.extra_tags);
            ui.end_row();
        });

        let can_upload = has_frames && upload_form.ready();
        if ui.add_enabled(can_upload, egui::Button::new("⬆ Upload frames")).clicked() {
            action = PropertiesAction::Upload;
        }
        if !has_frames {
            ui.label(RichText::new("Sample frames first").small().weak());
        }
        if let Some(status) = upload_status {
            ui.label(RichText::new(status).small());
        }
    });

    action
}
