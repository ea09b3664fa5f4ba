// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Archive export.
//!
//! Packages a captured frame set into one zip: a PNG per frame with a
//! deterministic name, plus a `manifest.json` describing the run.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Write};
use uuid::Uuid;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::models::annotation::{AnnotationStore, Color};
use crate::models::frame::FrameSet;

/// `(index, time)` pair for one captured frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameStamp {
    pub index: usize,
    pub time: f64,
}

/// Descriptor of one marker as exported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerRecord {
    pub id: Uuid,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub stroke_width: f64,
    pub color: Color,
    pub start: f64,
    pub end: f64,
    pub label: Option<String>,
    pub burned_in: bool,
}

/// The archive's machine-readable description of a sampling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub sequence_tag: String,
    pub source_name: String,
    pub selection_start: f64,
    pub selection_end: f64,
    pub sample_hz: f64,
    pub frames: Vec<FrameStamp>,
    pub annotations: Vec<MarkerRecord>,
}

impl Manifest {
    pub fn new(set: &FrameSet, store: &AnnotationStore, source_name: &str) -> Self {
        Self {
            sequence_tag: set.sequence_tag.clone(),
            source_name: source_name.to_string(),
            selection_start: set.range.start,
            selection_end: set.range.end,
            sample_hz: set.sample_hz,
            frames: set
                .frames
                .iter()
                .map(|f| FrameStamp {
                    index: f.index,
                    time: f.time,
                })
                .collect(),
            annotations: store
                .iter()
                .map(|a| MarkerRecord {
                    id: a.id,
                    x: a.x,
                    y: a.y,
                    size: a.size,
                    stroke_width: a.stroke_width,
                    color: a.color,
                    start: a.start,
                    end: a.end,
                    label: a.label.clone(),
                    burned_in: set.burn_in,
                })
                .collect(),
        }
    }
}

/// Deterministic file name for one frame: run tag, capture index, and
/// the resolved timestamp in milliseconds.
pub fn frame_file_name(tag: &str, index: usize, time: f64) -> String {
    format!("{tag}_{index:05}_{:08}ms.png", (time * 1000.0).round() as u64)
}

/// Build the archive bytes: every frame image plus the manifest.
pub fn pack_archive(set: &FrameSet, store: &AnnotationStore, source_name: &str) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    // PNGs are already compressed; store them as-is.
    let image_opts = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for frame in &set.frames {
        let name = frame_file_name(&set.sequence_tag, frame.index, frame.time);
        writer
            .start_file(name.as_str(), image_opts)
            .with_context(|| format!("failed to start archive entry {name}"))?;
        writer.write_all(&frame.data)?;
    }

    let manifest = Manifest::new(set, store, source_name);
    let json = serde_json::to_vec_pretty(&manifest).context("failed to serialize manifest")?;
    let manifest_opts =
        SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    writer
        .start_file("manifest.json", manifest_opts)
        .context("failed to start manifest entry")?;
    writer.write_all(&json)?;

    let cursor = writer.finish().context("failed to finalize archive")?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::Annotation;
    use crate::models::frame::Frame;
    use crate::models::session::TimeRange;
    use std::io::Read;

    fn frame_set() -> FrameSet {
        FrameSet {
            sequence_tag: "cafe0123".into(),
            range: TimeRange::new(1.0, 3.0),
            sample_hz: 1.0,
            burn_in: true,
            frames: vec![
                Frame {
                    index: 0,
                    time: 1.0,
                    data: vec![1, 2, 3],
                },
                Frame {
                    index: 1,
                    time: 2.0,
                    data: vec![4, 5, 6],
                },
                Frame {
                    index: 2,
                    time: 3.0,
                    data: vec![7, 8, 9],
                },
            ],
        }
    }

    #[test]
    fn test_frame_file_name_is_deterministic() {
        assert_eq!(frame_file_name("cafe0123", 0, 0.0), "cafe0123_00000_00000000ms.png");
        assert_eq!(frame_file_name("cafe0123", 7, 2.5), "cafe0123_00007_00002500ms.png");
    }

    #[test]
    fn test_archive_contains_frames_and_manifest() {
        let set = frame_set();
        let mut store = AnnotationStore::new();
        store.push(Annotation::at(0.5, 0.5, 1.0, 10.0));

        let bytes = pack_archive(&set, &store, "clip").unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 4);

        let mut manifest_json = String::new();
        archive
            .by_name("manifest.json")
            .unwrap()
            .read_to_string(&mut manifest_json)
            .unwrap();
        let manifest: Manifest = serde_json::from_str(&manifest_json).unwrap();

        assert_eq!(manifest.sequence_tag, "cafe0123");
        assert_eq!(manifest.source_name, "clip");
        assert_eq!(manifest.selection_start, 1.0);
        assert_eq!(manifest.selection_end, 3.0);
        assert_eq!(manifest.frames.len(), 3);
        assert_eq!(manifest.frames[1], FrameStamp { index: 1, time: 2.0 });
        assert_eq!(manifest.annotations.len(), 1);
        assert!(manifest.annotations[0].burned_in);
    }

    #[test]
    fn test_archive_frame_bytes_roundtrip() {
        let set = frame_set();
        let store = AnnotationStore::new();

        let bytes = pack_archive(&set, &store, "clip").unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();

        let mut data = Vec::new();
        archive
            .by_name("cafe0123_00001_00002000ms.png")
            .unwrap()
            .read_to_end(&mut data)
            .unwrap();
        assert_eq!(data, vec![4, 5, 6]);
    }
}
