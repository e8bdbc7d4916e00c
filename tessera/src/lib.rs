// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A tile-based analytic rasterizer for filled vector paths.
//!
//! Tessera converts filled Bézier paths into per-pixel coverage through a
//! sparse, tile-parallel pipeline: curves are flattened into line segments,
//! segments are binned into 16×16 pixel tiles by a pair of integer
//! digital-differential-analyzer walks, winding backdrops are propagated
//! across tile rows, and each touched tile is rasterized analytically with
//! exact trapezoidal area coverage. Tiles the path never crosses cost
//! nothing, so sparse paths on large canvases stay cheap.
//!
//! The entry point is [`Rasterizer`]:
//!
//! ```
//! use tessera::{peniko::Fill, PathGeometry, Rasterizer};
//! use tessera::kurbo::Line;
//!
//! let square = [
//!     Line::new((4.0, 4.0), (28.0, 4.0)),
//!     Line::new((28.0, 4.0), (28.0, 28.0)),
//!     Line::new((28.0, 28.0), (4.0, 28.0)),
//!     Line::new((4.0, 28.0), (4.0, 4.0)),
//! ];
//! let mut rasterizer = Rasterizer::new();
//! let coverage = rasterizer.rasterize(PathGeometry::Lines(&square), Fill::NonZero, 32, 32);
//! assert_eq!(coverage[10 * 32 + 10], 1.0);
//! assert_eq!(coverage[0], 0.0);
//! ```
//!
//! Coverage is geometry-only: compositing the resulting alpha field against
//! a paint source is left to the caller.

// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![forbid(unsafe_code)]

mod backdrop;
mod coarse;
mod euler;
mod fine;
mod flatten;
mod math;
mod path_count;
mod path_tiling;
mod render;

pub mod tile;

pub use peniko;
pub use peniko::kurbo;

pub use render::{DEFAULT_TOLERANCE, PathGeometry, Rasterizer};
