// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data structures.
//!
//! This module defines the time-ranged triangular markers, the store
//! that owns them, and the derived track grouping.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::config;

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_egui(self) -> egui::Color32 {
        egui::Color32::from_rgb(self.r, self.g, self.b)
    }

    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

impl Default for Color {
    fn default() -> Self {
        let [r, g, b] = config::DEFAULT_COLOR;
        Self { r, g, b }
    }
}

/// A time-ranged triangular marker.
///
/// `(x, y)` is the triangle centroid in normalized frame coordinates and
/// `size` is the side length as a fraction of `min(width, height)`.
/// `stroke_width` is defined against the 1080 px baseline dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: Uuid,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub stroke_width: f64,
    pub color: Color,
    pub start: f64,
    pub end: f64,
    pub label: Option<String>,
}

impl Annotation {
    /// Create a marker at a normalized position with default geometry,
    /// spanning `DEFAULT_CLIP_SECS` from `at`, clipped to `duration`.
    pub fn at(x: f64, y: f64, at: f64, duration: f64) -> Self {
        let start = at.clamp(0.0, duration);
        let end = (start + config::DEFAULT_CLIP_SECS).min(duration).max(start);
        Self {
            id: Uuid::new_v4(),
            x: x.clamp(0.0, 1.0),
            y: y.clamp(0.0, 1.0),
            size: config::DEFAULT_TRIANGLE_SIZE,
            stroke_width: config::DEFAULT_STROKE_WIDTH,
            color: Color::default(),
            start,
            end,
            label: None,
        }
    }

    /// Whether the marker's time range contains `time` (inclusive).
    pub fn active_at(&self, time: f64) -> bool {
        self.start <= time && time <= self.end
    }

    /// Canonical identity key: rounded position plus color. Two markers
    /// with equal keys are treated as the same tracked object.
    pub fn track_key(&self) -> TrackKey {
        let scale = 10f64.powi(config::TRACK_KEY_DECIMALS);
        TrackKey {
            x: (self.x * scale).round() as i64,
            y: (self.y * scale).round() as i64,
            color: self.color,
        }
    }
}

/// Rounded position + color key identifying a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TrackKey {
    pub x: i64,
    pub y: i64,
    pub color: Color,
}

/// A derived grouping of markers believed to be the same tracked object.
/// Recomputed on every read; never a source of truth.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub key: TrackKey,
    pub members: Vec<Uuid>,
}

/// Ordered collection of markers. Creation order is preserved; newer
/// markers render on top of older ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationStore {
    items: Vec<Annotation>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Annotation] {
        &self.items
    }

    pub fn get(&self, id: Uuid) -> Option<&Annotation> {
        self.items.iter().find(|a| a.id == id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut Annotation> {
        self.items.iter_mut().find(|a| a.id == id)
    }

    pub fn push(&mut self, annotation: Annotation) {
        self.items.push(annotation);
    }

    pub fn remove(&mut self, id: Uuid) -> Option<Annotation> {
        let idx = self.items.iter().position(|a| a.id == id)?;
        Some(self.items.remove(idx))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Replace the whole collection (undo/redo restore path).
    pub fn replace(&mut self, items: Vec<Annotation>) {
        self.items = items;
    }

    pub fn to_vec(&self) -> Vec<Annotation> {
        self.items.clone()
    }

    /// Markers whose time range contains `time`, in creation order.
    pub fn active_at(&self, time: f64) -> impl Iterator<Item = &Annotation> {
        self.items.iter().filter(move |a| a.active_at(time))
    }

    /// Find a marker occupying the given canonical position + color.
    pub fn find_by_key(&self, key: TrackKey) -> Option<&Annotation> {
        self.items.iter().find(|a| a.track_key() == key)
    }

    /// Group the current markers into tracks by canonical key.
    ///
    /// Stateless query over the live collection; membership is
    /// independent of insertion order.
    pub fn tracks(&self) -> Vec<Track> {
        let mut groups: BTreeMap<TrackKey, Vec<Uuid>> = BTreeMap::new();
        for a in &self.items {
            groups.entry(a.track_key()).or_default().push(a.id);
        }
        groups
            .into_iter()
            .map(|(key, mut members)| {
                members.sort();
                Track { key, members }
            })
            .collect()
    }
}
