// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media sources.
//!
//! The sampling pipeline and the viewer drive media through the
//! [`MediaSource`] trait: native dimensions, a seekable position with a
//! settle notification, transport controls, and access to the currently
//! displayed frame. The shipped implementation plays a folder of image
//! files as a fixed-rate sequence; decoding real video containers is
//! deliberately out of scope.

use anyhow::{anyhow, Context, Result};
use image::RgbaImage;
use std::path::{Path, PathBuf};

use crate::config;

/// Outcome of polling an in-flight seek.
///
/// A settle notification may arrive before the new pixels are painted;
/// callers that capture frames wait one extra tick after `Settled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekStatus {
    /// No seek in flight.
    Idle,
    /// Seek requested, not yet settled.
    Pending,
    /// The position change has settled.
    Settled,
    /// The seek could not be completed; the previous frame remains.
    Failed,
}

/// A continuous, seekable image stream.
pub trait MediaSource {
    /// Native pixel dimensions.
    fn dimensions(&self) -> (u32, u32);

    /// Total length in seconds.
    fn duration(&self) -> f64;

    /// Current position in seconds.
    fn position(&self) -> f64;

    /// Ask the source to move to `time`. Settlement is reported by
    /// [`MediaSource::poll_seek`].
    fn request_seek(&mut self, time: f64);

    /// Drive an in-flight seek forward and report its state. `Settled`
    /// and `Failed` are reported exactly once per request.
    fn poll_seek(&mut self) -> SeekStatus;

    /// The currently displayed frame at native dimensions.
    fn frame(&mut self) -> Result<&RgbaImage>;

    fn is_paused(&self) -> bool;

    /// Pause or resume playback. Resuming may be rejected by the
    /// backend, in which case the source stays paused.
    fn set_paused(&mut self, paused: bool) -> Result<()>;

    fn rate(&self) -> f64;

    fn set_rate(&mut self, rate: f64);

    /// Advance the playback clock by `dt` wall-clock seconds.
    fn advance(&mut self, dt: f64);

    /// Display name used for exports.
    fn name(&self) -> &str;
}

/// Result of scanning a folder, produced on a background thread.
pub struct LoadedSequence {
    pub name: String,
    pub files: Vec<PathBuf>,
    pub width: u32,
    pub height: u32,
    pub first_frame: RgbaImage,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif"];

/// Scan a folder for image files and decode the first one for its
/// dimensions. Runs on a loader thread; see `app.rs`.
pub fn scan_sequence(dir: &Path) -> Result<LoadedSequence> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
                .unwrap_or(false)
        })
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(anyhow!("no image files in {}", dir.display()));
    }

    let first_frame = load_frame(&files[0])?;
    let (width, height) = first_frame.dimensions();

    let name = dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("sequence")
        .to_string();

    Ok(LoadedSequence {
        name,
        files,
        width,
        height,
        first_frame,
    })
}

fn load_frame(path: &Path) -> Result<RgbaImage> {
    let img = image::open(path)
        .with_context(|| format!("failed to load image {}", path.display()))?;
    Ok(img.to_rgba8())
}

/// A folder of still images played back at [`config::SEQUENCE_FPS`].
///
/// Frames are decoded lazily on seek; the most recently decoded frame
/// is kept so repeated reads at the same position are free.
pub struct ImageSequenceSource {
    name: String,
    files: Vec<PathBuf>,
    width: u32,
    height: u32,
    fps: f64,
    position: f64,
    paused: bool,
    rate: f64,
    pending_seek: Option<f64>,
    current: (usize, RgbaImage),
}

impl ImageSequenceSource {
    pub fn new(loaded: LoadedSequence) -> Self {
        Self {
            name: loaded.name,
            files: loaded.files,
            width: loaded.width,
            height: loaded.height,
            fps: config::SEQUENCE_FPS,
            position: 0.0,
            paused: true,
            rate: 1.0,
            pending_seek: None,
            current: (0, loaded.first_frame),
        }
    }

    fn index_for(&self, time: f64) -> usize {
        let idx = (time * self.fps).floor() as i64;
        idx.clamp(0, self.files.len() as i64 - 1) as usize
    }

    fn ensure_frame(&mut self, index: usize) -> Result<()> {
        if self.current.0 != index {
            let img = load_frame(&self.files[index])?;
            // All frames must match the native dimensions reported to
            // the compositor; odd-sized files get scaled.
            let img = if img.dimensions() == (self.width, self.height) {
                img
            } else {
                image::imageops::resize(
                    &img,
                    self.width,
                    self.height,
                    image::imageops::FilterType::Triangle,
                )
            };
            self.current = (index, img);
        }
        Ok(())
    }
}

impl MediaSource for ImageSequenceSource {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn duration(&self) -> f64 {
        self.files.len() as f64 / self.fps
    }

    fn position(&self) -> f64 {
        self.position
    }

    fn request_seek(&mut self, time: f64) {
        self.pending_seek = Some(time.clamp(0.0, self.duration()));
    }

    fn poll_seek(&mut self) -> SeekStatus {
        match self.pending_seek.take() {
            None => SeekStatus::Idle,
            Some(target) => {
                let index = self.index_for(target);
                match self.ensure_frame(index) {
                    Ok(()) => {
                        self.position = target;
                        SeekStatus::Settled
                    }
                    Err(e) => {
                        log::warn!("seek to {target:.3}s failed: {e:#}");
                        SeekStatus::Failed
                    }
                }
            }
        }
    }

    fn frame(&mut self) -> Result<&RgbaImage> {
        let index = self.index_for(self.position);
        self.ensure_frame(index)?;
        Ok(&self.current.1)
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn set_paused(&mut self, paused: bool) -> Result<()> {
        self.paused = paused;
        Ok(())
    }

    fn rate(&self) -> f64 {
        self.rate
    }

    fn set_rate(&mut self, rate: f64) {
        self.rate = rate;
    }

    fn advance(&mut self, dt: f64) {
        if !self.paused {
            self.position = (self.position + dt * self.rate).min(self.duration());
            if self.position >= self.duration() {
                self.paused = true;
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
