// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Triangle geometry.
//!
//! Vertex derivation, point containment, and topmost hit-testing for
//! the equilateral markers. The live overlay painter and the export
//! compositor both go through [`triangle_vertices`]; there is exactly
//! one copy of this math.

use crate::models::annotation::Annotation;

/// Pixel-space vertices of an apex-up equilateral triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub apex: (f64, f64),
    pub left: (f64, f64),
    pub right: (f64, f64),
}

impl Triangle {
    pub fn vertices(&self) -> [(f64, f64); 3] {
        [self.apex, self.left, self.right]
    }
}

/// Derive pixel-space vertices from a normalized descriptor.
///
/// `(x, y)` is the centroid in `[0,1]²`, `size` the side length as a
/// fraction of `min(width, height)`.
pub fn triangle_vertices(x: f64, y: f64, size: f64, width: f64, height: f64) -> Triangle {
    let min_dim = width.min(height);
    let side = size * min_dim;
    let h = side * 3f64.sqrt() / 2.0;
    let half_base = side / 2.0;
    let centroid_offset = h / 3.0;

    let cx = x * width;
    let cy = y * height;

    Triangle {
        apex: (cx, cy - (h - centroid_offset)),
        left: (cx - half_base, cy + centroid_offset),
        right: (cx + half_base, cy + centroid_offset),
    }
}

/// Barycentric containment test, inclusive of edges.
///
/// A near-degenerate triangle reports "not contained" rather than
/// dividing by a vanishing determinant.
pub fn point_in_triangle(px: f64, py: f64, tri: &Triangle) -> bool {
    let (x1, y1) = tri.apex;
    let (x2, y2) = tri.left;
    let (x3, y3) = tri.right;

    let det = (y2 - y3) * (x1 - x3) + (x3 - x2) * (y1 - y3);
    if det.abs() < 1e-9 {
        return false;
    }

    let w1 = ((y2 - y3) * (px - x3) + (x3 - x2) * (py - y3)) / det;
    let w2 = ((y3 - y1) * (px - x3) + (x1 - x3) * (py - y3)) / det;
    let w3 = 1.0 - w1 - w2;

    (0.0..=1.0).contains(&w1) && (0.0..=1.0).contains(&w2) && (0.0..=1.0).contains(&w3)
}

/// Topmost marker containing the pixel-space point at `time`.
///
/// Candidates are the markers active at `time`, tested in reverse
/// creation order so the most recently added one wins overlaps,
/// matching the z-order of an append-only render list.
pub fn find_topmost_at(
    px: f64,
    py: f64,
    time: f64,
    annotations: &[Annotation],
    width: f64,
    height: f64,
) -> Option<&Annotation> {
    annotations
        .iter()
        .rev()
        .filter(|a| a.active_at(time))
        .find(|a| {
            let tri = triangle_vertices(a.x, a.y, a.size, width, height);
            point_in_triangle(px, py, &tri)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_derivation() {
        let tri = triangle_vertices(0.5, 0.5, 0.1, 1920.0, 1080.0);

        let side = 0.1 * 1080.0;
        let h = side * 3f64.sqrt() / 2.0;

        assert!((tri.apex.0 - 960.0).abs() < 1e-9);
        assert!((tri.apex.1 - (540.0 - h * 2.0 / 3.0)).abs() < 1e-9);
        assert!((tri.left.0 - (960.0 - side / 2.0)).abs() < 1e-9);
        assert!((tri.left.1 - (540.0 + h / 3.0)).abs() < 1e-9);
        assert!((tri.right.0 - (960.0 + side / 2.0)).abs() < 1e-9);
        assert!((tri.right.1 - tri.left.1).abs() < 1e-9);
    }

    #[test]
    fn test_centroid_is_descriptor_position() {
        let tri = triangle_vertices(0.3, 0.7, 0.2, 640.0, 480.0);
        let cx = (tri.apex.0 + tri.left.0 + tri.right.0) / 3.0;
        let cy = (tri.apex.1 + tri.left.1 + tri.right.1) / 3.0;
        assert!((cx - 0.3 * 640.0).abs() < 1e-9);
        assert!((cy - 0.7 * 480.0).abs() < 1e-9);
    }

    #[test]
    fn test_containment() {
        let tri = triangle_vertices(0.5, 0.5, 0.5, 1000.0, 1000.0);

        // Centroid is inside.
        assert!(point_in_triangle(500.0, 500.0, &tri));
        // Vertices are on the boundary, inclusive.
        assert!(point_in_triangle(tri.apex.0, tri.apex.1, &tri));
        assert!(point_in_triangle(tri.left.0, tri.left.1, &tri));
        // Far corner is outside.
        assert!(!point_in_triangle(10.0, 10.0, &tri));
        // Just above the apex is outside.
        assert!(!point_in_triangle(tri.apex.0, tri.apex.1 - 1.0, &tri));
    }

    #[test]
    fn test_degenerate_triangle_not_contained() {
        let tri = triangle_vertices(0.5, 0.5, 0.0, 1000.0, 1000.0);
        assert!(!point_in_triangle(500.0, 500.0, &tri));
    }

    #[test]
    fn test_topmost_none_when_nothing_hits() {
        let a = Annotation::at(0.2, 0.2, 0.0, 60.0);
        let list = vec![a];
        assert!(find_topmost_at(900.0, 900.0, 1.0, &list, 1000.0, 1000.0).is_none());
    }

    #[test]
    fn test_topmost_prefers_newest() {
        let older = Annotation::at(0.5, 0.5, 0.0, 60.0);
        let newer = Annotation::at(0.5, 0.5, 0.0, 60.0);
        let newer_id = newer.id;
        let list = vec![older, newer];

        let hit = find_topmost_at(500.0, 500.0, 1.0, &list, 1000.0, 1000.0).unwrap();
        assert_eq!(hit.id, newer_id);
    }

    #[test]
    fn test_topmost_filters_by_time() {
        let mut a = Annotation::at(0.5, 0.5, 0.0, 60.0);
        a.start = 10.0;
        a.end = 20.0;
        let list = vec![a];

        assert!(find_topmost_at(500.0, 500.0, 5.0, &list, 1000.0, 1000.0).is_none());
        assert!(find_topmost_at(500.0, 500.0, 15.0, &list, 1000.0, 1000.0).is_some());
    }
}
