// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Editing session state.
//!
//! This module manages the per-source session: playhead, the single
//! sampling selection, the marker store, and the run-scoped sequence
//! tag used to name exported frames.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::annotation::AnnotationStore;
use crate::config;

/// The sub-interval of the media chosen for sampling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    pub fn len(&self) -> f64 {
        self.end - self.start
    }

    pub fn contains(&self, time: f64) -> bool {
        self.start <= time && time <= self.end
    }
}

/// A short user-facing message (title + detail).
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub title: String,
    pub detail: String,
    pub error: bool,
}

impl Notice {
    pub fn info(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            detail: detail.into(),
            error: false,
        }
    }

    pub fn error(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            detail: detail.into(),
            error: true,
        }
    }
}

/// Session state for one loaded media source.
///
/// Created when media is loaded, reset in place on "reset session".
/// The sequence tag is regenerated on load and reset only, so repeated
/// sampling/export cycles on the same source share one tag.
#[derive(Debug, Clone)]
pub struct EditSession {
    pub source_name: String,
    pub duration: f64,
    pub frame_width: u32,
    pub frame_height: u32,
    pub playhead: f64,
    pub selection: Option<TimeRange>,
    pub store: AnnotationStore,
    sequence_tag: String,
}

impl EditSession {
    /// Start a session for a freshly loaded source. The selection
    /// defaults to the first `DEFAULT_SELECTION_SECS` of the media.
    pub fn new(source_name: String, duration: f64, frame_width: u32, frame_height: u32) -> Self {
        Self {
            source_name,
            duration,
            frame_width,
            frame_height,
            playhead: 0.0,
            selection: Some(TimeRange::new(
                0.0,
                config::DEFAULT_SELECTION_SECS.min(duration),
            )),
            store: AnnotationStore::new(),
            sequence_tag: fresh_tag(),
        }
    }

    /// Clear markers and selection, regenerate the sequence tag.
    pub fn reset(&mut self) {
        self.store.clear();
        self.selection = None;
        self.playhead = 0.0;
        self.sequence_tag = fresh_tag();
    }

    pub fn sequence_tag(&self) -> &str {
        &self.sequence_tag
    }

    pub fn clamp_time(&self, t: f64) -> f64 {
        t.clamp(0.0, self.duration)
    }
}

fn fresh_tag() -> String {
    let id = Uuid::new_v4();
    id.simple().to_string()[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::Annotation;

    #[test]
    fn test_default_selection_is_clipped() {
        let long = EditSession::new("a".into(), 120.0, 1920, 1080);
        assert_eq!(long.selection, Some(TimeRange::new(0.0, 30.0)));

        let short = EditSession::new("b".into(), 8.0, 1920, 1080);
        assert_eq!(short.selection, Some(TimeRange::new(0.0, 8.0)));
    }

    #[test]
    fn test_time_range_normalizes_order() {
        let r = TimeRange::new(5.0, 2.0);
        assert_eq!(r.start, 2.0);
        assert_eq!(r.end, 5.0);
        assert!(r.contains(2.0));
        assert!(r.contains(5.0));
        assert!(!r.contains(5.5));
    }

    #[test]
    fn test_reset_clears_state_and_rotates_tag() {
        let mut session = EditSession::new("clip".into(), 60.0, 1920, 1080);
        session.store.push(Annotation::at(0.5, 0.5, 1.0, 60.0));
        session.playhead = 12.0;
        let tag = session.sequence_tag().to_string();

        session.reset();
        assert!(session.store.is_empty());
        assert_eq!(session.selection, None);
        assert_eq!(session.playhead, 0.0);
        assert_ne!(session.sequence_tag(), tag);
    }

    #[test]
    fn test_tag_stable_without_reset() {
        let session = EditSession::new("clip".into(), 60.0, 1920, 1080);
        let a = session.sequence_tag().to_string();
        let b = session.sequence_tag().to_string();
        assert_eq!(a, b);
        assert_eq!(a.len(), 8);
    }
}
