// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Remote dataset upload.
//!
//! The core hands each captured frame's bytes, the run tag, and any
//! user-supplied tags to a [`DatasetSink`] in capture order, then
//! associates the returned identifiers with a named dataset. Auth,
//! retries, and failure policy live behind the sink.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::sync::mpsc::{channel, Receiver};

/// Destination for captured frames.
pub trait DatasetSink: Send {
    /// Upload one frame, returning the server-side identifier.
    fn upload_frame(&self, data: &[u8], tags: &[String]) -> Result<String>;

    /// Associate previously uploaded identifiers with a dataset.
    fn attach(&self, dataset: &str, ids: &[String]) -> Result<()>;
}

/// Progress events from the upload worker.
#[derive(Debug, Clone)]
pub enum UploadEvent {
    Progress { sent: usize, total: usize },
    Finished { count: usize },
    Failed(String),
}

/// Upload frames on a background thread, reporting over a channel.
/// Frames are submitted strictly in the given (capture) order.
pub fn spawn_upload(
    sink: Box<dyn DatasetSink>,
    frames: Vec<Vec<u8>>,
    tags: Vec<String>,
    dataset: String,
) -> Receiver<UploadEvent> {
    let (sender, receiver) = channel();

    std::thread::spawn(move || {
        let total = frames.len();
        let mut ids = Vec::with_capacity(total);

        for (i, data) in frames.iter().enumerate() {
            match sink.upload_frame(data, &tags) {
                Ok(id) => ids.push(id),
                Err(e) => {
                    let _ = sender.send(UploadEvent::Failed(format!(
                        "frame {i} upload failed: {e:#}"
                    )));
                    return;
                }
            }
            let _ = sender.send(UploadEvent::Progress { sent: i + 1, total });
        }

        if let Err(e) = sink.attach(&dataset, &ids) {
            let _ = sender.send(UploadEvent::Failed(format!("dataset attach failed: {e:#}")));
            return;
        }

        log::info!("uploaded {total} frames to dataset {dataset}");
        let _ = sender.send(UploadEvent::Finished { count: total });
    });

    receiver
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    id: String,
}

/// HTTP implementation of [`DatasetSink`].
pub struct HttpDatasetSink {
    base_url: String,
    api_key: String,
    part_id: String,
    client: reqwest::blocking::Client,
}

impl HttpDatasetSink {
    pub fn new(base_url: String, api_key: String, part_id: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            part_id,
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl DatasetSink for HttpDatasetSink {
    fn upload_frame(&self, data: &[u8], tags: &[String]) -> Result<String> {
        let joined_tags = tags.join(",");
        let response = self
            .client
            .post(format!("{}/frames", self.base_url))
            .bearer_auth(&self.api_key)
            .query(&[("part", self.part_id.as_str()), ("tags", joined_tags.as_str())])
            .header(reqwest::header::CONTENT_TYPE, "image/png")
            .body(data.to_vec())
            .send()
            .context("frame upload request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!("frame upload rejected: {}", response.status()));
        }
        let parsed: UploadResponse = response.json().context("malformed upload response")?;
        Ok(parsed.id)
    }

    fn attach(&self, dataset: &str, ids: &[String]) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/datasets/{dataset}/frames", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&ids)
            .send()
            .context("dataset attach request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!("dataset attach rejected: {}", response.status()));
        }
        Ok(())
    }
}
