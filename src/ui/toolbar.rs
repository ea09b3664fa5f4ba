// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar: pointer mode, transport, and sampling controls.

use crate::app::{Mode, SamplingSettings};

/// Toolbar requests handled by the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    None,
    TogglePlay,
    Sample,
    ExportArchive,
    Reset,
}

pub fn show(
    ui: &mut egui::Ui,
    mode: &mut Mode,
    settings: &mut SamplingSettings,
    media_loaded: bool,
    playing: bool,
    sampling: bool,
    has_frames: bool,
    playhead: f64,
    duration: f64,
) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        ui.label("Mode:");

        if ui.selectable_label(*mode == Mode::Scrub, "⬍ Scrub").clicked() {
            *mode = Mode::Scrub;
        }
        if ui.selectable_label(*mode == Mode::Select, "⛶ Select").clicked() {
            *mode = Mode::Select;
        }

        ui.separator();

        let play_label = if playing { "⏸ Pause" } else { "▶ Play" };
        if ui.add_enabled(media_loaded && !sampling, egui::Button::new(play_label)).clicked() {
            action = ToolbarAction::TogglePlay;
        }
        ui.label(
            egui::RichText::new(format!("{} / {}", fmt(playhead), fmt(duration)))
                .monospace()
                .weak(),
        );

        ui.separator();

        ui.label("Rate (Hz):");
        ui.add(
            egui::DragValue::new(&mut settings.hz)
                .speed(0.1)
                .range(0.1..=120.0),
        );
        ui.checkbox(&mut settings.burn_in, "Burn-in");

        if ui.add_enabled(media_loaded && !sampling, egui::Button::new("⬇ Sample")).clicked() {
            action = ToolbarAction::Sample;
        }
        if ui.add_enabled(has_frames && !sampling, egui::Button::new("🗀 Export...")).clicked() {
            action = ToolbarAction::ExportArchive;
        }

        ui.separator();

        if ui.add_enabled(media_loaded, egui::Button::new("Reset")).clicked() {
            action = ToolbarAction::Reset;
        }

        let hint = match mode {
            Mode::Scrub => "Drag the timeline to seek, click the video to place markers",
            Mode::Select => "Drag on the timeline to choose the sampling range",
        };
        ui.label(egui::RichText::new(hint).italics().weak());
    });

    action
}

fn fmt(secs: f64) -> String {
    let total = secs.max(0.0);
    format!("{}:{:05.2}", (total / 60.0) as u64, total % 60.0)
}
