// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! TRIMARK - Triangular Marker Annotator
//!
//! A cross-platform desktop application for marking objects in frame
//! sequences with time-ranged triangular markers, sampling the marked
//! range into still images, and exporting or uploading the result.

mod app;
mod config;
mod engine;
mod io;
mod models;
mod sampling;
mod ui;
mod util;

use anyhow::Result;
use app::TrimarkApp;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("TRIMARK - Triangular Marker Annotator"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "TRIMARK",
        options,
        Box::new(|_cc| Ok(Box::new(TrimarkApp::new()))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
