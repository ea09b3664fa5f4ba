// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Burn-in compositing.
//!
//! Stamps marker triangles onto a captured frame and encodes the result.
//! Vertex math comes from [`crate::util::geometry`] so the burned-in
//! shapes match the live overlay exactly.

use anyhow::{Context, Result};
use image::RgbaImage;
use std::io::Cursor;

use crate::config;
use crate::models::annotation::Annotation;
use crate::util::geometry;

/// Stroke width in pixels for a frame whose smaller dimension is
/// `min_dim`. Reference widths are defined against the 1080 px baseline
/// and never drop below one pixel.
pub fn scaled_stroke(stroke_width: f64, min_dim: f64) -> f64 {
    (stroke_width * min_dim / config::STROKE_BASELINE_DIM).max(1.0)
}

/// Stamp every given marker onto `img` in place.
pub fn burn_in(img: &mut RgbaImage, annotations: &[&Annotation]) {
    let (w, h) = img.dimensions();
    let (wf, hf) = (w as f64, h as f64);
    let min_dim = wf.min(hf);

    for a in annotations {
        let tri = geometry::triangle_vertices(a.x, a.y, a.size, wf, hf);
        let stroke = scaled_stroke(a.stroke_width, min_dim);
        let color = a.color.to_rgba();

        stamp_line(img, tri.apex, tri.left, stroke, color);
        stamp_line(img, tri.left, tri.right, stroke, color);
        stamp_line(img, tri.right, tri.apex, stroke, color);
    }
}

/// Encode a frame to PNG bytes.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("failed to encode frame as PNG")?;
    Ok(buf)
}

/// Stamp a thick line segment by walking it in sub-pixel steps and
/// filling a square of `thickness` around each step.
fn stamp_line(
    img: &mut RgbaImage,
    from: (f64, f64),
    to: (f64, f64),
    thickness: f64,
    color: [u8; 4],
) {
    let (x0, y0) = from;
    let (x1, y1) = to;
    let dx = x1 - x0;
    let dy = y1 - y0;
    let len = (dx * dx + dy * dy).sqrt();
    let steps = (len * 2.0).ceil().max(1.0) as i64;
    let half_t = (thickness / 2.0).round().max(0.0) as i64;
    let (w, h) = (img.width() as i64, img.height() as i64);

    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        let cx = (x0 + dx * t).round() as i64;
        let cy = (y0 + dy * t).round() as i64;

        for oy in -half_t..=half_t {
            for ox in -half_t..=half_t {
                let px = cx + ox;
                let py = cy + oy;
                if (0..w).contains(&px) && (0..h).contains(&py) {
                    img.put_pixel(px as u32, py as u32, image::Rgba(color));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::Color;

    fn gray_frame(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, image::Rgba([128, 128, 128, 255]))
    }

    fn contains_color(img: &RgbaImage, color: [u8; 4]) -> bool {
        img.pixels().any(|p| p.0 == color)
    }

    #[test]
    fn test_burn_in_stamps_marker_color() {
        let mut img = gray_frame(320, 240);
        let mut a = Annotation::at(0.5, 0.5, 0.0, 10.0);
        a.color = Color::new(255, 0, 0);

        burn_in(&mut img, &[&a]);
        assert!(contains_color(&img, [255, 0, 0, 255]));
    }

    #[test]
    fn test_no_markers_leaves_frame_untouched() {
        let mut img = gray_frame(320, 240);
        let before = img.clone();
        burn_in(&mut img, &[]);
        assert_eq!(img, before);
    }

    #[test]
    fn test_stroke_scales_with_resolution() {
        assert_eq!(scaled_stroke(3.0, 1080.0), 3.0);
        assert_eq!(scaled_stroke(3.0, 2160.0), 6.0);
        // Tiny frames never drop below one pixel.
        assert_eq!(scaled_stroke(1.0, 32.0), 1.0);
    }

    #[test]
    fn test_marker_at_edge_does_not_panic() {
        let mut img = gray_frame(64, 64);
        let mut a = Annotation::at(0.0, 0.0, 0.0, 10.0);
        a.size = 0.5;
        burn_in(&mut img, &[&a]);

        let mut b = Annotation::at(1.0, 1.0, 0.0, 10.0);
        b.size = 0.5;
        burn_in(&mut img, &[&b]);
    }

    #[test]
    fn test_encode_png_roundtrip() {
        let img = gray_frame(16, 16);
        let bytes = encode_png(&img).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded, img);
    }
}
