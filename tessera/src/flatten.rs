// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adaptive flattening of cubic Béziers into line segments.
//!
//! Candidate parameter intervals are accepted when an Euler spiral fitted to
//! the interval is within tolerance of the cubic (a closed-form Fréchet
//! distance bound), then the accepted arc is subdivided into lines by
//! closed-form inverse arc-length evaluation of the spiral. This emits close
//! to the minimum number of segments for the requested tolerance, unlike
//! fixed-step parametric sampling.

use std::f32::consts::FRAC_1_SQRT_2;

use crate::euler::{CubicParams, EulerParams, EulerSeg};
use crate::math::Vec2;
use crate::tile::FlatLine;

/// Threshold below which a derivative is considered too small.
const DERIV_THRESH: f32 = 1e-6;
/// Amount to nudge t when derivative is near-zero.
const DERIV_EPS: f32 = 1e-6;
/// Limit for subdivision of cubic Béziers.
const SUBDIV_LIMIT: f32 = 1.0 / 65536.0;

/// Integer device-space bounding box, grown as lines are emitted.
#[derive(Debug)]
pub(crate) struct IntBbox {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl Default for IntBbox {
    fn default() -> Self {
        Self {
            x0: 0x7fff_ffff,
            y0: 0x7fff_ffff,
            x1: -0x8000_0000,
            y1: -0x8000_0000,
        }
    }
}

impl IntBbox {
    pub fn add_pt(&mut self, pt: Vec2) {
        self.x0 = self.x0.min(pt.x.floor() as i32);
        self.y0 = self.y0.min(pt.y.floor() as i32);
        self.x1 = self.x1.max(pt.x.ceil() as i32);
        self.y1 = self.y1.max(pt.y.ceil() as i32);
    }
}

/// A cubic Bézier in device-space f32 coordinates.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Cubic {
    pub p0: Vec2,
    pub p1: Vec2,
    pub p2: Vec2,
    pub p3: Vec2,
}

/// Evaluate both the point and derivative of a cubic Bézier.
fn eval_cubic_and_deriv(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f32) -> (Vec2, Vec2) {
    let m = 1.0 - t;
    let mm = m * m;
    let mt = m * t;
    let tt = t * t;
    let p = p0 * (mm * m) + (p1 * (3.0 * mm) + p2 * (3.0 * mt) + p3 * tt) * t;
    let q = (p1 - p0) * mm + (p2 - p1) * (2.0 * mt) + (p3 - p2) * tt;
    (p, q)
}

fn output_line(p0: Vec2, p1: Vec2, lines: &mut Vec<FlatLine>, bbox: &mut IntBbox) {
    bbox.add_pt(p0);
    bbox.add_pt(p1);
    lines.push(FlatLine::new(p0.to_array(), p1.to_array()));
}

/// How the accepted arc's inverse arc-length map is evaluated.
#[derive(Clone, Copy)]
enum ArcInverse {
    /// `|k1|` is near zero; arc length is linear in the parameter.
    Linear,
    /// General case: cube-root inverse of the normalized integral
    /// `x -> x * sqrt(|x|)`.
    CubeRoot { int0: f32, integral: f32 },
}

/// Flatten one cubic, appending lines and growing the device bbox.
///
/// A cubic whose four control points coincide emits nothing.
pub(crate) fn flatten_cubic(
    cubic: Cubic,
    tol: f32,
    lines: &mut Vec<FlatLine>,
    bbox: &mut IntBbox,
) {
    let Cubic { p0, p1, p2, p3 } = cubic;
    // Exact equality: dropping only exactly-degenerate cubics preserves
    // watertightness of the surrounding path.
    if p0 == p1 && p0 == p2 && p0 == p3 {
        return;
    }

    // The interval traversal is an iterative encoding of depth-first
    // bisection: `t0_u * dt` is the interval start, and on acceptance the
    // trailing zeros of the incremented counter tell how many stack frames
    // to pop, each pop doubling the interval width.
    let mut t0_u: u32 = 0;
    let mut dt: f32 = 1.;
    let mut last_p = p0;
    let mut last_q = p1 - p0;
    // Avoid near-zero derivatives by sampling at a nearby t instead.
    if last_q.length_squared() < DERIV_THRESH.powi(2) {
        last_q = eval_cubic_and_deriv(p0, p1, p2, p3, DERIV_EPS).1;
    }
    let mut last_t = 0.;
    let mut lp0 = p0;

    loop {
        let t0 = (t0_u as f32) * dt;
        if t0 == 1. {
            break;
        }
        let mut t1 = t0 + dt;
        let this_p0 = last_p;
        let this_q0 = last_q;
        let (mut this_p1, mut this_q1) = eval_cubic_and_deriv(p0, p1, p2, p3, t1);
        if this_q1.length_squared() < DERIV_THRESH.powi(2) {
            let (new_p1, new_q1) = eval_cubic_and_deriv(p0, p1, p2, p3, t1 - DERIV_EPS);
            this_q1 = new_q1;
            // Change just the derivative at the endpoint, but also move the
            // point so it matches the derivative exactly if in the interior.
            if t1 < 1. {
                this_p1 = new_p1;
                t1 -= DERIV_EPS;
            }
        }
        let actual_dt = t1 - last_t;
        let params = CubicParams::from_points_derivs(this_p0, this_p1, this_q0, this_q1, actual_dt);
        if params.err <= tol || dt <= SUBDIV_LIMIT {
            // Accept this interval: fit the spiral and emit its lines.
            let euler_params = EulerParams::from_angles(params.th0, params.th1);
            let es = EulerSeg::from_params(this_p0, this_p1, euler_params);

            let (k0, k1) = (es.params.k0 - 0.5 * es.params.k1, es.params.k1);

            // Number of subdivisions for curvature = 1, scaled to tolerance.
            let scale_multiplier =
                0.5 * FRAC_1_SQRT_2 * (params.chord_len / (es.params.ch * tol)).sqrt();
            const K1_THRESH: f32 = 1e-3;
            let (n_frac, inverse) = if k1.abs() < K1_THRESH {
                let k = k0 + 0.5 * k1;
                (k.abs().sqrt(), ArcInverse::Linear)
            } else {
                let f = |x: f32| x * x.abs().sqrt();
                let int0 = f(k0);
                let integral = f(k0 + k1) - int0;
                ((2. / 3.) * integral / k1, ArcInverse::CubeRoot { int0, integral })
            };
            let n = (n_frac * scale_multiplier).ceil().clamp(1.0, 100.0);
            for i in 0..n as usize {
                let lp1 = if i == n as usize - 1 && t1 == 1.0 {
                    p3
                } else {
                    let t = (i + 1) as f32 / n;
                    let s = match inverse {
                        ArcInverse::Linear => t,
                        ArcInverse::CubeRoot { int0, integral } => {
                            let c = (integral * t + int0).cbrt();
                            let inv = c * c.abs();
                            (inv - k0) / k1
                        }
                    };
                    es.eval(s)
                };
                output_line(lp0, lp1, lines, bbox);
                lp0 = lp1;
            }
            last_p = this_p1;
            last_q = this_q1;
            last_t = t1;
            // Advance to the next interval; beginning of the next is the end
            // of this one.
            t0_u += 1;
            let shift = t0_u.trailing_zeros();
            t0_u >>= shift;
            dt *= (1 << shift) as f32;
        } else {
            // Subdivide; halve the interval while retaining its start.
            t0_u = t0_u.saturating_mul(2);
            dt *= 0.5;
        }
    }
}
