// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Timeline scrubber, selection band, and marker bands.
//!
//! The timeline reports raw pointer activity to the caller as
//! [`TimelineAction`]s; the drag engine decides what a gesture means.
//! All horizontal positions are fractions of the current rendered
//! width, measured fresh on every event.

use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Stroke};
use uuid::Uuid;

use crate::engine::drag::TimelineTarget;
use crate::models::session::EditSession;

/// Raw pointer activity on the timeline surface.
pub enum TimelineAction {
    None,
    Pressed { target: TimelineTarget, frac: f64 },
    Dragged { frac: f64 },
    Released,
    Clicked { target: TimelineTarget, frac: f64 },
}

const RULER_H: f32 = 18.0;
const SELECTION_LANE_H: f32 = 16.0;
const TRACK_LANE_H: f32 = 14.0;
const LANE_GAP: f32 = 2.0;
/// Pixel half-width of the grab zone around a band edge.
const HANDLE_PX: f32 = 5.0;

fn format_time(secs: f64) -> String {
    let total = secs.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Draw the timeline and report pointer activity.
pub fn show(ui: &mut egui::Ui, session: &EditSession, selected: Option<Uuid>) -> TimelineAction {
    let tracks = session.store.tracks();
    let lane_count = tracks.len().max(1);
    let height = RULER_H
        + SELECTION_LANE_H
        + lane_count as f32 * (TRACK_LANE_H + LANE_GAP)
        + LANE_GAP;

    let width = ui.available_width();
    let (rect, response) =
        ui.allocate_exact_size(egui::vec2(width, height), Sense::click_and_drag());
    let painter = ui.painter_at(rect);

    painter.rect_filled(rect, 2.0, Color32::from_gray(28));

    let duration = session.duration.max(f64::EPSILON);
    let to_x = |t: f64| rect.min.x + (t / duration) as f32 * rect.width();
    let to_frac = |x: f32| ((x - rect.min.x) / rect.width()) as f64;

    // Ruler ticks and labels.
    let ruler_rect = Rect::from_min_size(rect.min, egui::vec2(rect.width(), RULER_H));
    let step = tick_step(duration, rect.width());
    let mut s = 0.0;
    while s <= duration {
        let x = to_x(s);
        painter.line_segment(
            [Pos2::new(x, ruler_rect.max.y - 5.0), Pos2::new(x, ruler_rect.max.y)],
            Stroke::new(1.0, Color32::from_gray(70)),
        );
        painter.text(
            Pos2::new(x + 3.0, ruler_rect.min.y + 2.0),
            Align2::LEFT_TOP,
            format_time(s),
            FontId::monospace(9.0),
            Color32::from_gray(130),
        );
        s += step;
    }

    // Selection band.
    let sel_top = rect.min.y + RULER_H + LANE_GAP;
    let sel_rect = Rect::from_min_max(
        Pos2::new(rect.min.x, sel_top),
        Pos2::new(rect.max.x, sel_top + SELECTION_LANE_H),
    );
    if let Some(sel) = session.selection {
        let band = Rect::from_min_max(
            Pos2::new(to_x(sel.start), sel_rect.min.y),
            Pos2::new(to_x(sel.end), sel_rect.max.y),
        );
        painter.rect_filled(band, 2.0, Color32::from_rgba_unmultiplied(80, 140, 220, 70));
        painter.rect_stroke(band, 2.0, Stroke::new(1.0, Color32::from_rgb(80, 140, 220)));
        for x in [band.min.x, band.max.x] {
            painter.line_segment(
                [Pos2::new(x, band.min.y), Pos2::new(x, band.max.y)],
                Stroke::new(3.0, Color32::from_rgb(120, 180, 255)),
            );
        }
    }

    // One lane per derived track, bands in marker color.
    for (lane, track) in tracks.iter().enumerate() {
        let lane_top =
            sel_rect.max.y + LANE_GAP + lane as f32 * (TRACK_LANE_H + LANE_GAP);
        for id in &track.members {
            let Some(a) = session.store.get(*id) else { continue };
            let band = Rect::from_min_max(
                Pos2::new(to_x(a.start), lane_top),
                Pos2::new(to_x(a.end), lane_top + TRACK_LANE_H),
            );
            let color = a.color.to_egui();
            painter.rect_filled(band, 2.0, color.gamma_multiply(0.45));
            let stroke = if selected == Some(*id) {
                Stroke::new(2.0, Color32::WHITE)
            } else {
                Stroke::new(1.0, color)
            };
            painter.rect_stroke(band, 2.0, stroke);
        }
    }

    // Playhead.
    let px = to_x(session.playhead);
    painter.line_segment(
        [Pos2::new(px, rect.min.y), Pos2::new(px, rect.max.y)],
        Stroke::new(1.5, Color32::from_rgb(240, 200, 60)),
    );

    // Pointer activity. Bounds are re-derived from this frame's rect,
    // so a resize mid-gesture cannot use stale geometry.
    let mut action = TimelineAction::None;
    if let Some(pos) = response.interact_pointer_pos() {
        let frac = to_frac(pos.x);
        if response.drag_started() {
            action = TimelineAction::Pressed {
                target: hit_target(pos, rect, session, &tracks, to_x),
                frac,
            };
        } else if response.dragged() {
            action = TimelineAction::Dragged { frac };
        } else if response.drag_stopped() {
            action = TimelineAction::Released;
        } else if response.clicked() {
            action = TimelineAction::Clicked {
                target: hit_target(pos, rect, session, &tracks, to_x),
                frac,
            };
        }
    }
    action
}

/// A tick spacing that keeps labels readable at any width.
fn tick_step(duration: f64, width: f32) -> f64 {
    let target_px = 70.0;
    let raw = duration * (target_px / width.max(1.0)) as f64;
    let steps = [0.5, 1.0, 2.0, 5.0, 10.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0];
    steps
        .iter()
        .copied()
        .find(|s| *s >= raw)
        .unwrap_or(600.0)
}

/// Resolve what the pointer went down on.
fn hit_target(
    pos: Pos2,
    rect: Rect,
    session: &EditSession,
    tracks: &[crate::models::annotation::Track],
    to_x: impl Fn(f64) -> f32,
) -> TimelineTarget {
    let sel_top = rect.min.y + RULER_H + LANE_GAP;
    let sel_bottom = sel_top + SELECTION_LANE_H;

    if pos.y >= sel_top && pos.y < sel_bottom {
        if let Some(sel) = session.selection {
            let sx = to_x(sel.start);
            let ex = to_x(sel.end);
            if (pos.x - sx).abs() <= HANDLE_PX {
                return TimelineTarget::SelectionStart;
            }
            if (pos.x - ex).abs() <= HANDLE_PX {
                return TimelineTarget::SelectionEnd;
            }
            if pos.x > sx && pos.x < ex {
                return TimelineTarget::SelectionBody;
            }
        }
        return TimelineTarget::Background;
    }

    for (lane, track) in tracks.iter().enumerate() {
        let lane_top = sel_bottom + LANE_GAP + lane as f32 * (TRACK_LANE_H + LANE_GAP);
        if pos.y < lane_top || pos.y >= lane_top + TRACK_LANE_H {
            continue;
        }
        // Newest first, matching the render z-order of overlapping bands.
        for id in track.members.iter().rev() {
            let Some(a) = session.store.get(*id) else { continue };
            let sx = to_x(a.start);
            let ex = to_x(a.end);
            if (pos.x - sx).abs() <= HANDLE_PX {
                return TimelineTarget::AnnotationStart(*id);
            }
            if (pos.x - ex).abs() <= HANDLE_PX {
                return TimelineTarget::AnnotationEnd(*id);
            }
            if pos.x > sx && pos.x < ex {
                return TimelineTarget::AnnotationBody(*id);
            }
        }
        return TimelineTarget::Background;
    }

    TimelineTarget::Background
}
