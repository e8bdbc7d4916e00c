// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared helpers for Tessera's integration tests.

// LINEBENDER LINT SET - lib.rs - v2
// See https://linebender.org/wiki/canonical-lints/
// These lints aren't included in Cargo.toml because they
// shouldn't apply to examples and tests
#![warn(unused_crate_dependencies)]
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![allow(missing_docs, reason = "test support code")]

use tessera::kurbo::{CubicBez, Line, Point};

/// Circle approximation constant for four cubic arcs.
const KAPPA: f64 = 0.552_284_749_830_793_4;

/// The four edges of an axis-aligned rectangle, traced clockwise.
pub fn rect_lines(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Line> {
    polygon_lines(&[(x0, y0), (x1, y0), (x1, y1), (x0, y1)])
}

/// Closed polygon edges through `vertices` in order.
pub fn polygon_lines(vertices: &[(f64, f64)]) -> Vec<Line> {
    let n = vertices.len();
    (0..n)
        .map(|i| {
            let (ax, ay) = vertices[i];
            let (bx, by) = vertices[(i + 1) % n];
            Line::new((ax, ay), (bx, by))
        })
        .collect()
}

/// A circle as four cubic arcs, traced in one consistent direction.
pub fn circle_cubics(cx: f64, cy: f64, r: f64) -> Vec<CubicBez> {
    let k = KAPPA * r;
    let p = |x, y| Point::new(x, y);
    vec![
        CubicBez::new(
            p(cx + r, cy),
            p(cx + r, cy + k),
            p(cx + k, cy + r),
            p(cx, cy + r),
        ),
        CubicBez::new(
            p(cx, cy + r),
            p(cx - k, cy + r),
            p(cx - r, cy + k),
            p(cx - r, cy),
        ),
        CubicBez::new(
            p(cx - r, cy),
            p(cx - r, cy - k),
            p(cx - k, cy - r),
            p(cx, cy - r),
        ),
        CubicBez::new(
            p(cx, cy - r),
            p(cx + k, cy - r),
            p(cx + r, cy - k),
            p(cx + r, cy),
        ),
    ]
}

/// Total coverage, i.e. the shape's area in pixels.
pub fn coverage_sum(coverage: &[f32]) -> f64 {
    coverage.iter().map(|&c| c as f64).sum()
}

/// Largest per-pixel difference between two coverage buffers.
pub fn max_abs_diff(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f32::max)
}
