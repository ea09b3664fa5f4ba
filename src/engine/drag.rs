// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! The drag interaction engine.
//!
//! One finite-state machine consumes pointer events from both surfaces
//! (the timeline and the video overlay) and applies the resulting
//! mutations to the playhead, the selection, or a marker's geometry and
//! time range. Exactly one gesture is active at a time; its state lives
//! only from pointer-down to pointer-up.
//!
//! Positions arrive as fractions of the controlling surface's current
//! rendered extent. The UI re-measures its bounds on every event, so a
//! container resize mid-gesture changes nothing here.

use uuid::Uuid;

use crate::config;
use crate::models::annotation::Annotation;
use crate::models::session::{EditSession, TimeRange};
use crate::util::geometry;

/// The active gesture. Each variant carries only the fields it needs,
/// so illegal combinations cannot be represented.
#[derive(Debug, Clone, PartialEq)]
pub enum DragState {
    /// Scrubbing the playhead from the timeline background.
    Seeking,
    /// Sweeping out a new selection from an anchor time.
    CreatingSelection { anchor: f64 },
    /// Shifting both bounds of a marker's time range by one delta.
    MovingAnnotationRange {
        id: Uuid,
        grab: f64,
        orig_start: f64,
        orig_end: f64,
    },
    /// Adjusting a marker's start bound only.
    ResizingAnnotationStart { id: Uuid, orig_end: f64 },
    /// Adjusting a marker's end bound only.
    ResizingAnnotationEnd { id: Uuid, orig_start: f64 },
    /// Shifting both bounds of the selection by one delta.
    MovingSelection { grab: f64, orig: TimeRange },
    /// Adjusting the selection's start bound only.
    ResizingSelectionStart { orig_end: f64 },
    /// Adjusting the selection's end bound only.
    ResizingSelectionEnd { orig_start: f64 },
    /// Repositioning a marker on the video overlay.
    DraggingAnnotationPosition { id: Uuid, moved: bool },
}

/// What the pointer went down on, as resolved by the timeline surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimelineTarget {
    /// Ruler or empty band area.
    Background,
    SelectionBody,
    SelectionStart,
    SelectionEnd,
    AnnotationBody(Uuid),
    AnnotationStart(Uuid),
    AnnotationEnd(Uuid),
}

/// Result of a plain click on the overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickOutcome {
    /// An existing marker was hit and selected.
    Selected(Uuid),
    /// A new marker was created (and selected).
    Created(Uuid),
    /// The canonical spot is already occupied; the occupant was
    /// selected instead and no record was created.
    Duplicate(Uuid),
    /// Click swallowed by the one-shot post-drag suppression.
    Ignored,
}

#[derive(Debug, Default)]
pub struct DragEngine {
    state: Option<DragState>,
    selected: Option<Uuid>,
    /// Set when a position drag actually moved; the next overlay click
    /// is swallowed exactly once so the click that the host fires after
    /// a drag is not misread as "create".
    suppress_click: bool,
}

impl DragEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Option<&DragState> {
        self.state.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.state.is_some()
    }

    pub fn selected(&self) -> Option<Uuid> {
        self.selected
    }

    pub fn select(&mut self, id: Option<Uuid>) {
        self.selected = id;
    }

    /// Pointer-down on the timeline. `frac` is the horizontal position
    /// as a fraction of the timeline's current width.
    pub fn timeline_press(
        &mut self,
        target: TimelineTarget,
        frac: f64,
        select_mode: bool,
        session: &mut EditSession,
    ) {
        let t = session.clamp_time(frac * session.duration);

        self.state = Some(match target {
            TimelineTarget::Background => {
                if select_mode {
                    session.selection = Some(TimeRange::new(t, t));
                    DragState::CreatingSelection { anchor: t }
                } else {
                    session.playhead = t;
                    DragState::Seeking
                }
            }
            TimelineTarget::SelectionBody => match session.selection {
                Some(orig) => DragState::MovingSelection { grab: t, orig },
                None => return,
            },
            TimelineTarget::SelectionStart => match session.selection {
                Some(orig) => DragState::ResizingSelectionStart { orig_end: orig.end },
                None => return,
            },
            TimelineTarget::SelectionEnd => match session.selection {
                Some(orig) => DragState::ResizingSelectionEnd { orig_start: orig.start },
                None => return,
            },
            TimelineTarget::AnnotationBody(id) => match session.store.get(id) {
                Some(a) => {
                    self.selected = Some(id);
                    DragState::MovingAnnotationRange {
                        id,
                        grab: t,
                        orig_start: a.start,
                        orig_end: a.end,
                    }
                }
                None => return,
            },
            TimelineTarget::AnnotationStart(id) => match session.store.get(id) {
                Some(a) => {
                    self.selected = Some(id);
                    DragState::ResizingAnnotationStart { id, orig_end: a.end }
                }
                None => return,
            },
            TimelineTarget::AnnotationEnd(id) => match session.store.get(id) {
                Some(a) => {
                    self.selected = Some(id);
                    DragState::ResizingAnnotationEnd { id, orig_start: a.start }
                }
                None => return,
            },
        });
    }

    /// Pointer-move on the timeline while a gesture is active. Events
    /// from a surface other than the one that started the gesture are
    /// ignored by construction: overlay variants never match here.
    pub fn timeline_move(&mut self, frac: f64, session: &mut EditSession) {
        let t = session.clamp_time(frac * session.duration);
        let duration = session.duration;

        match self.state.clone() {
            Some(DragState::Seeking) => {
                session.playhead = t;
            }
            Some(DragState::CreatingSelection { anchor }) => {
                session.selection = Some(TimeRange::new(anchor.min(t), anchor.max(t)));
            }
            Some(DragState::MovingSelection { grab, orig }) => {
                let len = orig.len();
                let start = (orig.start + (t - grab)).min(duration - len).max(0.0);
                session.selection = Some(TimeRange::new(start, start + len));
            }
            Some(DragState::ResizingSelectionStart { orig_end }) => {
                let start = t.clamp(0.0, orig_end);
                session.selection = Some(TimeRange::new(start, orig_end));
            }
            Some(DragState::ResizingSelectionEnd { orig_start }) => {
                let end = t.clamp(orig_start, duration);
                session.selection = Some(TimeRange::new(orig_start, end));
            }
            Some(DragState::MovingAnnotationRange {
                id,
                grab,
                orig_start,
                orig_end,
            }) => {
                let len = orig_end - orig_start;
                let start = (orig_start + (t - grab)).min(duration - len).max(0.0);
                if let Some(a) = session.store.get_mut(id) {
                    a.start = start;
                    a.end = start + len;
                }
            }
            Some(DragState::ResizingAnnotationStart { id, orig_end }) => {
                let start = t.min((orig_end - config::MIN_CLIP_SECS).max(0.0)).max(0.0);
                if let Some(a) = session.store.get_mut(id) {
                    a.start = start;
                }
            }
            Some(DragState::ResizingAnnotationEnd { id, orig_start }) => {
                let end = t.max((orig_start + config::MIN_CLIP_SECS).min(duration)).min(duration);
                if let Some(a) = session.store.get_mut(id) {
                    a.end = end;
                }
            }
            Some(DragState::DraggingAnnotationPosition { .. }) | None => {}
        }
    }

    /// Pointer-down on the video overlay. `(fx, fy)` are fractions of
    /// the overlay's current rendered rect. Returns true when a marker
    /// was hit and a position drag began.
    pub fn overlay_press(&mut self, fx: f64, fy: f64, session: &mut EditSession) -> bool {
        let (w, h) = (session.frame_width as f64, session.frame_height as f64);
        let hit = geometry::find_topmost_at(
            fx * w,
            fy * h,
            session.playhead,
            session.store.as_slice(),
            w,
            h,
        )
        .map(|a| a.id);

        match hit {
            Some(id) => {
                self.selected = Some(id);
                self.state = Some(DragState::DraggingAnnotationPosition { id, moved: false });
                true
            }
            None => false,
        }
    }

    /// Pointer-move on the overlay while a position drag is active.
    pub fn overlay_move(&mut self, fx: f64, fy: f64, session: &mut EditSession) {
        if let Some(DragState::DraggingAnnotationPosition { id, .. }) = self.state {
            if let Some(a) = session.store.get_mut(id) {
                a.x = fx.clamp(0.0, 1.0);
                a.y = fy.clamp(0.0, 1.0);
            }
            self.state = Some(DragState::DraggingAnnotationPosition { id, moved: true });
        }
    }

    /// A plain click on the overlay: select the topmost active marker
    /// under the point, or create one on empty ground, rejecting exact
    /// canonical duplicates in favor of the existing occupant.
    pub fn overlay_click(&mut self, fx: f64, fy: f64, session: &mut EditSession) -> ClickOutcome {
        if self.suppress_click {
            self.suppress_click = false;
            return ClickOutcome::Ignored;
        }

        let (w, h) = (session.frame_width as f64, session.frame_height as f64);
        if let Some(hit) = geometry::find_topmost_at(
            fx * w,
            fy * h,
            session.playhead,
            session.store.as_slice(),
            w,
            h,
        ) {
            let id = hit.id;
            self.selected = Some(id);
            return ClickOutcome::Selected(id);
        }

        let candidate = Annotation::at(fx, fy, session.playhead, session.duration);
        if let Some(existing) = session.store.find_by_key(candidate.track_key()) {
            let id = existing.id;
            self.selected = Some(id);
            return ClickOutcome::Duplicate(id);
        }

        let id = candidate.id;
        session.store.push(candidate);
        self.selected = Some(id);
        ClickOutcome::Created(id)
    }

    /// Pointer-up or pointer-cancel: unconditionally back to idle.
    pub fn release(&mut self) {
        if let Some(DragState::DraggingAnnotationPosition { moved: true, .. }) = self.state {
            self.suppress_click = true;
        }
        self.state = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::Color;

    fn session() -> EditSession {
        EditSession::new("clip".into(), 100.0, 1000, 1000)
    }

    fn frac(t: f64) -> f64 {
        t / 100.0
    }

    #[test]
    fn test_seek_press_and_move() {
        let mut s = session();
        let mut e = DragEngine::new();

        e.timeline_press(TimelineTarget::Background, frac(10.0), false, &mut s);
        assert_eq!(s.playhead, 10.0);
        assert_eq!(e.state(), Some(&DragState::Seeking));

        e.timeline_move(frac(42.0), &mut s);
        assert_eq!(s.playhead, 42.0);

        e.release();
        assert!(e.state().is_none());
    }

    #[test]
    fn test_create_selection_sweeps_both_directions() {
        let mut s = session();
        let mut e = DragEngine::new();

        e.timeline_press(TimelineTarget::Background, frac(20.0), true, &mut s);
        assert_eq!(s.selection, Some(TimeRange::new(20.0, 20.0)));

        e.timeline_move(frac(35.0), &mut s);
        assert_eq!(s.selection, Some(TimeRange::new(20.0, 35.0)));

        // Sweep back past the anchor.
        e.timeline_move(frac(5.0), &mut s);
        assert_eq!(s.selection, Some(TimeRange::new(5.0, 20.0)));
    }

    #[test]
    fn test_selection_bounds_never_leave_media() {
        let mut s = session();
        let mut e = DragEngine::new();
        s.selection = Some(TimeRange::new(10.0, 30.0));

        e.timeline_press(TimelineTarget::SelectionBody, frac(20.0), false, &mut s);
        // Drag far past the right edge; width is preserved, end clamps.
        e.timeline_move(frac(99.0), &mut s);
        let sel = s.selection.unwrap();
        assert!((sel.len() - 20.0).abs() < 1e-9);
        assert!(sel.end <= 100.0);
        assert!(sel.start >= 0.0);
    }

    #[test]
    fn test_selection_resize_cannot_cross() {
        let mut s = session();
        let mut e = DragEngine::new();
        s.selection = Some(TimeRange::new(10.0, 30.0));

        e.timeline_press(TimelineTarget::SelectionStart, frac(10.0), false, &mut s);
        e.timeline_move(frac(80.0), &mut s);
        let sel = s.selection.unwrap();
        assert!(sel.start <= sel.end);
        assert_eq!(sel.end, 30.0);
    }

    #[test]
    fn test_annotation_resize_enforces_min_length() {
        let mut s = session();
        let mut e = DragEngine::new();
        let mut a = Annotation::at(0.5, 0.5, 10.0, 100.0);
        a.start = 10.0;
        a.end = 20.0;
        let id = a.id;
        s.store.push(a);

        // Drag the end handle far to the left, past the start.
        e.timeline_press(TimelineTarget::AnnotationEnd(id), frac(20.0), false, &mut s);
        e.timeline_move(frac(0.0), &mut s);
        e.release();

        let a = s.store.get(id).unwrap();
        assert!(a.end - a.start >= config::MIN_CLIP_SECS - 1e-9);
        assert_eq!(a.start, 10.0);

        // Same for the start handle dragged past the end.
        e.timeline_press(TimelineTarget::AnnotationStart(id), frac(10.0), false, &mut s);
        e.timeline_move(frac(99.0), &mut s);
        e.release();

        let a = s.store.get(id).unwrap();
        assert!(a.end - a.start >= config::MIN_CLIP_SECS - 1e-9);
    }

    #[test]
    fn test_annotation_move_preserves_length() {
        let mut s = session();
        let mut e = DragEngine::new();
        let mut a = Annotation::at(0.5, 0.5, 10.0, 100.0);
        a.start = 10.0;
        a.end = 16.0;
        let id = a.id;
        s.store.push(a);

        e.timeline_press(TimelineTarget::AnnotationBody(id), frac(12.0), false, &mut s);
        e.timeline_move(frac(95.0), &mut s);

        let a = s.store.get(id).unwrap();
        assert!((a.end - a.start - 6.0).abs() < 1e-9);
        assert!(a.end <= 100.0);
        assert_eq!(e.selected(), Some(id));
    }

    #[test]
    fn test_overlay_drag_moves_marker_and_clamps() {
        let mut s = session();
        let mut e = DragEngine::new();
        let a = Annotation::at(0.5, 0.5, 0.0, 100.0);
        let id = a.id;
        s.store.push(a);
        s.playhead = 1.0;

        assert!(e.overlay_press(0.5, 0.5, &mut s));
        e.overlay_move(1.7, -0.3, &mut s);
        e.release();

        let a = s.store.get(id).unwrap();
        assert_eq!(a.x, 1.0);
        assert_eq!(a.y, 0.0);
    }

    #[test]
    fn test_overlay_press_misses_inactive_marker() {
        let mut s = session();
        let mut e = DragEngine::new();
        let mut a = Annotation::at(0.5, 0.5, 0.0, 100.0);
        a.start = 50.0;
        a.end = 60.0;
        s.store.push(a);
        s.playhead = 1.0;

        assert!(!e.overlay_press(0.5, 0.5, &mut s));
        assert!(e.state().is_none());
    }

    #[test]
    fn test_click_after_drag_is_suppressed_once() {
        let mut s = session();
        let mut e = DragEngine::new();
        let a = Annotation::at(0.5, 0.5, 0.0, 100.0);
        s.store.push(a);
        s.playhead = 1.0;

        e.overlay_press(0.5, 0.5, &mut s);
        e.overlay_move(0.6, 0.6, &mut s);
        e.release();

        // The synthetic click right after the drag does not create.
        assert_eq!(e.overlay_click(0.9, 0.9, &mut s), ClickOutcome::Ignored);
        assert_eq!(s.store.len(), 1);

        // The next one behaves normally again.
        assert!(matches!(
            e.overlay_click(0.9, 0.9, &mut s),
            ClickOutcome::Created(_)
        ));
        assert_eq!(s.store.len(), 2);
    }

    #[test]
    fn test_click_empty_creates_at_playhead() {
        let mut s = session();
        let mut e = DragEngine::new();
        s.playhead = 12.0;

        let outcome = e.overlay_click(0.25, 0.75, &mut s);
        let id = match outcome {
            ClickOutcome::Created(id) => id,
            other => panic!("expected creation, got {other:?}"),
        };

        let a = s.store.get(id).unwrap();
        assert_eq!(a.start, 12.0);
        assert_eq!(a.end, 12.0 + config::DEFAULT_CLIP_SECS);
        assert_eq!(e.selected(), Some(id));
    }

    #[test]
    fn test_duplicate_position_selects_existing() {
        let mut s = session();
        let mut e = DragEngine::new();

        // Occupy the spot, but make it inactive at the playhead so the
        // click cannot simply hit it.
        let mut a = Annotation::at(0.25, 0.75, 0.0, 100.0);
        a.start = 50.0;
        a.end = 55.0;
        a.color = Color::default();
        let id = a.id;
        s.store.push(a);
        s.playhead = 1.0;

        let outcome = e.overlay_click(0.25, 0.75, &mut s);
        assert_eq!(outcome, ClickOutcome::Duplicate(id));
        assert_eq!(s.store.len(), 1);
        assert_eq!(e.selected(), Some(id));
    }

    #[test]
    fn test_click_inside_active_triangle_selects() {
        let mut s = session();
        let mut e = DragEngine::new();
        let a = Annotation::at(0.5, 0.5, 0.0, 100.0);
        let id = a.id;
        s.store.push(a);
        s.playhead = 1.0;

        assert_eq!(e.overlay_click(0.5, 0.5, &mut s), ClickOutcome::Selected(id));
        assert_eq!(s.store.len(), 1);
    }

    #[test]
    fn test_press_on_missing_target_stays_idle() {
        let mut s = session();
        let mut e = DragEngine::new();

        e.timeline_press(
            TimelineTarget::AnnotationBody(Uuid::new_v4()),
            frac(10.0),
            false,
            &mut s,
        );
        assert!(e.state().is_none());

        e.timeline_press(TimelineTarget::SelectionBody, frac(10.0), false, &mut s);
        assert!(e.state().is_none());
    }
}
