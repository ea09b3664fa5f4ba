// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation set serialization.
//!
//! This module handles exporting the current marker set in YAML and
//! JSON formats, independent of the frame archive.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::models::annotation::Annotation;
use crate::models::session::EditSession;

/// Standalone annotation document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationDoc {
    pub source_name: String,
    pub duration: f64,
    pub frame_width: u32,
    pub frame_height: u32,
    pub annotations: Vec<Annotation>,
}

impl AnnotationDoc {
    pub fn from_session(session: &EditSession) -> Self {
        Self {
            source_name: session.source_name.clone(),
            duration: session.duration,
            frame_width: session.frame_width,
            frame_height: session.frame_height,
            annotations: session.store.to_vec(),
        }
    }
}

/// Export the marker set to YAML format.
pub fn export_yaml(doc: &AnnotationDoc, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(doc)?;
    std::fs::write(path, yaml)?;
    Ok(())
}

/// Export the marker set to JSON format.
pub fn export_json(doc: &AnnotationDoc, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(doc)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_serializes_both_ways() {
        let mut session = EditSession::new("clip".into(), 30.0, 640, 480);
        session.store.push(Annotation::at(0.4, 0.6, 2.0, 30.0));
        let doc = AnnotationDoc::from_session(&session);

        let yaml = serde_yaml::to_string(&doc).unwrap();
        let back: AnnotationDoc = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.annotations.len(), 1);
        assert_eq!(back.source_name, "clip");

        let json = serde_json::to_string(&doc).unwrap();
        let back: AnnotationDoc = serde_json::from_str(&json).unwrap();
        assert_eq!(back.annotations[0].start, 2.0);
    }
}
