// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Euler-spiral fitting for adaptive cubic flattening.
//!
//! An Euler spiral (curvature linear in arc length) is fitted to a cubic
//! sub-interval so that the flattener can bound the Fréchet distance in
//! closed form and evaluate the accepted arc without parametric stepping.

#![expect(
    clippy::excessive_precision,
    reason = "Uses the same constants as the f64 derivation"
)]

use crate::math::Vec2;

/// Threshold for tangents to be considered near zero length.
pub(crate) const TANGENT_THRESH: f32 = 1e-6;

/// Parameters derived from a cubic Bézier sub-interval for fitting a G1
/// continuous Euler spiral segment and estimating the Fréchet distance.
///
/// The tangent angles are measured against the chord, so equal angles
/// correspond to a circular arc.
#[derive(Debug)]
pub(crate) struct CubicParams {
    /// Tangent angle relative to chord at start.
    pub(crate) th0: f32,
    /// Tangent angle relative to chord at end.
    pub(crate) th1: f32,
    /// The effective chord length, always a robustly nonzero value.
    pub(crate) chord_len: f32,
    /// The estimated error between the source cubic and the proposed spiral.
    pub(crate) err: f32,
}

#[derive(Debug)]
pub(crate) struct EulerParams {
    pub(crate) th0: f32,
    /// Curvature at the midpoint of the segment.
    pub(crate) k0: f32,
    /// Total curvature variation over the segment.
    pub(crate) k1: f32,
    /// Chord length of the normalized segment.
    pub(crate) ch: f32,
}

/// An Euler spiral segment anchored at concrete endpoints.
#[derive(Debug)]
pub(crate) struct EulerSeg {
    pub(crate) p0: Vec2,
    pub(crate) p1: Vec2,
    pub(crate) params: EulerParams,
}

impl CubicParams {
    /// Compute parameters from endpoints and derivatives.
    ///
    /// Robust across a wide range of inputs; in particular it splits between
    /// near-zero chord length and the happy path. In the former case the
    /// spiral parameters would not be valid, so a straight line is proposed
    /// along with a conservative estimate of its distance to the source
    /// cubic. That estimate keeps two tricky cases honest: very short
    /// sub-intervals, which must be accepted as single segments, and loops
    /// with a short chord, which must keep subdividing.
    ///
    /// Near-cusp intervals (one tangent angle past 90 degrees) get a fixed
    /// coarse error so subdivision binary-searches toward the cusp instead
    /// of trusting an analytic bound that would wildly overestimate.
    pub(crate) fn from_points_derivs(p0: Vec2, p1: Vec2, q0: Vec2, q1: Vec2, dt: f32) -> Self {
        let chord = p1 - p0;
        let chord_squared = chord.length_squared();
        let chord_len = chord_squared.sqrt();
        if chord_squared < TANGENT_THRESH.powi(2) {
            // Near-zero chord; straight line case. The error coefficient was
            // determined empirically through randomized testing.
            let chord_err = ((9. / 32.0) * (q0.length_squared() + q1.length_squared())).sqrt() * dt;
            return Self {
                th0: 0.0,
                th1: 0.0,
                chord_len: TANGENT_THRESH,
                err: chord_err,
            };
        }
        let scale = dt / chord_squared;
        let h0 = Vec2::new(
            q0.x * chord.x + q0.y * chord.y,
            q0.y * chord.x - q0.x * chord.y,
        );
        let th0 = h0.atan2();
        let d0 = h0.length() * scale;
        let h1 = Vec2::new(
            q1.x * chord.x + q1.y * chord.y,
            q1.x * chord.y - q1.y * chord.x,
        );
        let th1 = h1.atan2();
        let d1 = h1.length() * scale;

        // Estimate error of geometric Hermite interpolation to Euler spiral.
        let cth0 = th0.cos();
        let cth1 = th1.cos();
        let mut err = if cth0 * cth1 < 0.0 {
            // Near-cusp case; 2.0 approximates the worst-case distance from a
            // spiral with 0 and pi tangents to the chord.
            2.0
        } else {
            // The 1e-9 floor protects against divide-by-zero at a double
            // cusp, which should in the general case cause subdivisions.
            let e0 = (2. / 3.) / (1.0 + cth0).max(1e-9);
            let e1 = (2. / 3.) / (1.0 + cth1).max(1e-9);
            let s0 = th0.sin();
            let s1 = th1.sin();
            let s01 = cth0 * s1 + cth1 * s0;
            let amin = 0.15 * (2. * e0 * s0 + 2. * e1 * s1 - e0 * e1 * s01);
            let a = 0.15 * (2. * d0 * s0 + 2. * d1 * s1 - d0 * d1 * s01);
            let aerr = (a - amin).abs();
            let symm = (th0 + th1).abs();
            let asymm = (th0 - th1).abs();
            let dist = (d0 - e0).hypot(d1 - e1);
            let ctr = 4.625e-6 * symm.powi(5) + 7.5e-3 * asymm * symm.powi(2);
            let halo_symm = 5e-3 * symm * dist;
            let halo_asymm = 7e-2 * asymm * dist;
            ctr + 1.55 * aerr + halo_symm + halo_asymm
        };
        err *= chord_len;
        Self {
            th0,
            th1,
            chord_len,
            err,
        }
    }
}

impl EulerParams {
    /// Fit spiral curvature parameters from the two tangent angles.
    ///
    /// Closed-form polynomial approximation of the inverse of the spiral's
    /// endpoint-angle map; `ch` is the matching chord length.
    pub(crate) fn from_angles(th0: f32, th1: f32) -> Self {
        let k0 = th0 + th1;
        let dth = th1 - th0;
        let d2 = dth * dth;
        let k2 = k0 * k0;
        let mut a = 6.0;
        a -= d2 * (1. / 70.);
        a -= (d2 * d2) * (1. / 10780.);
        a += (d2 * d2 * d2) * 2.769178184818219e-07;
        let b = -0.1 + d2 * (1. / 4200.) + d2 * d2 * 1.6959677820260655e-05;
        let c = -1. / 1400. + d2 * 6.84915970574303e-05 - k2 * 7.936475029053326e-06;
        a += (b + c * k2) * k2;
        let k1 = dth * a;

        let mut ch = 1.0;
        ch -= d2 * (1. / 40.);
        ch += (d2 * d2) * 0.00034226190482569864;
        ch -= (d2 * d2 * d2) * 1.9349474568904524e-06;
        let b = -1. / 24. + d2 * 0.0024702380951963226 - d2 * d2 * 3.7297408997537985e-05;
        let c = 1. / 1920. - d2 * 4.87350869747975e-05 - k2 * 3.1001936068463107e-06;
        ch += (b + c * k2) * k2;
        Self { th0, k0, k1, ch }
    }

    pub(crate) fn eval_th(&self, t: f32) -> f32 {
        (self.k0 + 0.5 * self.k1 * (t - 1.0)) * t - self.th0
    }

    /// Evaluate the normalized curve at the given parameter.
    ///
    /// The parameter is in the range 0..1 and the result goes from (0, 0) to
    /// (1, 0).
    fn eval(&self, t: f32) -> Vec2 {
        let thm = self.eval_th(t * 0.5);
        let k0 = self.k0;
        let k1 = self.k1;
        let (u, v) = integ_euler_10((k0 + k1 * (0.5 * t - 0.5)) * t, k1 * t * t);
        let s = t / self.ch * thm.sin();
        let c = t / self.ch * thm.cos();
        let x = u * c - v * s;
        let y = -v * c - u * s;
        Vec2::new(x, y)
    }
}

impl EulerSeg {
    pub(crate) fn from_params(p0: Vec2, p1: Vec2, params: EulerParams) -> Self {
        Self { p0, p1, params }
    }

    /// Evaluate the segment in the coordinate space of its endpoints.
    pub(crate) fn eval(&self, t: f32) -> Vec2 {
        let Vec2 { x, y } = self.params.eval(t);
        let chord = self.p1 - self.p0;
        Vec2::new(
            self.p0.x + chord.x * x - chord.y * y,
            self.p0.y + chord.x * y + chord.y * x,
        )
    }
}

/// Integrate the Euler spiral with a 10th order polynomial.
///
/// Conservative: very good accuracy for angles up to about a radian, and
/// larger angles essentially only occur at cusps. The cost over a lower
/// degree polynomial is a handful of multiply-adds.
fn integ_euler_10(k0: f32, k1: f32) -> (f32, f32) {
    let t1_1 = k0;
    let t1_2 = 0.5 * k1;
    let t2_2 = t1_1 * t1_1;
    let t2_3 = 2. * (t1_1 * t1_2);
    let t2_4 = t1_2 * t1_2;
    let t3_4 = t2_2 * t1_2 + t2_3 * t1_1;
    let t3_6 = t2_4 * t1_2;
    let t4_4 = t2_2 * t2_2;
    let t4_5 = 2. * (t2_2 * t2_3);
    let t4_6 = 2. * (t2_2 * t2_4) + t2_3 * t2_3;
    let t4_7 = 2. * (t2_3 * t2_4);
    let t4_8 = t2_4 * t2_4;
    let t5_6 = t4_4 * t1_2 + t4_5 * t1_1;
    let t5_8 = t4_6 * t1_2 + t4_7 * t1_1;
    let t6_6 = t4_4 * t2_2;
    let t6_7 = t4_4 * t2_3 + t4_5 * t2_2;
    let t6_8 = t4_4 * t2_4 + t4_5 * t2_3 + t4_6 * t2_2;
    let t7_8 = t6_6 * t1_2 + t6_7 * t1_1;
    let t8_8 = t6_6 * t2_2;
    let mut u = 1.;
    u -= (1. / 24.) * t2_2 + (1. / 160.) * t2_4;
    u += (1. / 1920.) * t4_4 + (1. / 10752.) * t4_6 + (1. / 55296.) * t4_8;
    u -= (1. / 322560.) * t6_6 + (1. / 1658880.) * t6_8;
    u += (1. / 92897280.) * t8_8;
    let mut v = (1. / 12.) * t1_2;
    v -= (1. / 480.) * t3_4 + (1. / 2688.) * t3_6;
    v += (1. / 53760.) * t5_6 + (1. / 276480.) * t5_8;
    v -= (1. / 11612160.) * t7_8;
    (u, v)
}

#[cfg(test)]
mod tests {
    use super::{EulerParams, EulerSeg};
    use crate::math::Vec2;

    #[test]
    fn straight_segment_evaluates_on_chord() {
        let params = EulerParams::from_angles(0.0, 0.0);
        let seg = EulerSeg::from_params(Vec2::new(1.0, 2.0), Vec2::new(5.0, 2.0), params);
        for i in 0..=4 {
            let t = i as f32 / 4.0;
            let p = seg.eval(t);
            assert!((p.y - 2.0).abs() < 1e-5);
            assert!((p.x - (1.0 + 4.0 * t)).abs() < 1e-4);
        }
    }

    #[test]
    fn arc_params_are_symmetric() {
        // Equal tangent angles describe a circular arc: no curvature
        // variation across the segment.
        let params = EulerParams::from_angles(0.3, 0.3);
        assert!(params.k1.abs() < 1e-5);
        assert!(params.ch < 1.0);
    }

    #[test]
    fn endpoints_are_interpolated() {
        let params = EulerParams::from_angles(0.2, 0.5);
        let p0 = Vec2::new(-3.0, 1.0);
        let p1 = Vec2::new(4.0, -2.0);
        let seg = EulerSeg::from_params(p0, p1, params);
        let start = seg.eval(0.0);
        let end = seg.eval(1.0);
        assert!((start - p0).length() < 1e-4);
        assert!((end - p1).length() < 2e-3);
    }
}
