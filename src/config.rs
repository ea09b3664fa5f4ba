// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Tunable constants.
//!
//! Everything a deployment might reasonably want to adjust lives here so
//! the rest of the code never hardcodes a magic number twice.

/// Duration given to a freshly created marker, clipped to media length.
pub const DEFAULT_CLIP_SECS: f64 = 3.0;

/// Shortest clip length a resize handle will produce.
pub const MIN_CLIP_SECS: f64 = 0.1;

/// Default selection length on media load, clipped to media length.
pub const DEFAULT_SELECTION_SECS: f64 = 30.0;

/// Default sampling rate in frames per second of media time.
pub const DEFAULT_SAMPLE_HZ: f64 = 2.0;

/// Side length of a new triangle as a fraction of min(width, height).
pub const DEFAULT_TRIANGLE_SIZE: f64 = 0.06;

/// Reference stroke width for a new marker, defined against
/// [`STROKE_BASELINE_DIM`].
pub const DEFAULT_STROKE_WIDTH: f64 = 3.0;

/// Baseline dimension the reference stroke width is defined against.
/// Burned-in strokes scale as `stroke * min_dim / STROKE_BASELINE_DIM`.
pub const STROKE_BASELINE_DIM: f64 = 1080.0;

/// Decimal places used when rounding a marker position into its
/// canonical track key.
pub const TRACK_KEY_DECIMALS: i32 = 3;

/// Playback rate of an image-sequence source, in frames per second.
pub const SEQUENCE_FPS: f64 = 30.0;

/// Color assigned to a freshly created marker (RGB).
pub const DEFAULT_COLOR: [u8; 3] = [255, 64, 64];
