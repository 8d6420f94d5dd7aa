/*
 * gnomon
 * Copyright (C) 2026 Gnomon contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! The rotation kernel (C1): direction cosine matrices, the 21 symbolic Euler-angle sequences,
//! and their closed-form time derivatives.

/// The smallest difference between two radians is set to one arcsecond.
pub(crate) const EPSILON_RAD: f64 = 4.8e-6;
/// Equality tolerance for f64 comparisons of rotation matrices.
pub(crate) const EPSILON: f64 = 1e-12;

mod dcm;
mod sequence;

pub use dcm::{angular_velocity_from_dcm, skew, DCM};
pub use sequence::{angle_to_dcm_generic, Axis, RotationSequence};

use crate::errors::MathError;
use crate::math::dual::{d1_mat, d2_mat, d3_mat, Dual1, Dual2, Dual3, DualScalar};
use nalgebra::Matrix3;

fn theta_series<T: DualScalar>(angle: f64, rate: f64, s: T) -> T {
    T::constant(angle) + T::constant(rate) * s
}

fn theta_series2<T: DualScalar>(angle: f64, rate: f64, accel: f64, s: T) -> T {
    T::constant(angle) + T::constant(rate) * s + T::constant(0.5 * accel) * (s * s)
}

fn theta_series3<T: DualScalar>(angle: f64, rate: f64, accel: f64, jerk: f64, s: T) -> T {
    T::constant(angle) + T::constant(rate) * s + T::constant(0.5 * accel) * (s * s) + T::constant(jerk / 6.0) * (s * s * s)
}

/// Builds the DCM for a set of Euler angles (no derivatives): one of the 21 closed-form
/// expressions named by `seq`.
pub fn angle_to_dcm(angles: &[f64], seq: RotationSequence) -> Result<DCM, MathError> {
    Ok(DCM(angle_to_dcm_generic(angles, seq)?))
}

/// Builds the DCM and its first time derivative from `(angle, rate)` pairs. Derivatives are
/// obtained by forward-mode automatic differentiation (C8) of the same symbolic composition used
/// by [`angle_to_dcm`], rather than a hand-transcribed table of 21 separate derivative formulas:
/// the two are mathematically identical, since dual-number differentiation of `sin`/`cos` is
/// exact, not a numerical approximation.
pub fn angle_to_ddcm(angle_rates: &[(f64, f64)], seq: RotationSequence) -> Result<(Matrix3<f64>, Matrix3<f64>), MathError> {
    seq.validate()?;
    if angle_rates.len() != seq.arity() {
        return Err(MathError::DimensionMismatch {
            action: "building a DCM first derivative from Euler angle rates",
            expected: seq.arity(),
            got: angle_rates.len(),
        });
    }
    let f = |s: Dual1| -> Matrix3<Dual1> {
        let thetas: Vec<Dual1> = angle_rates.iter().map(|(a, r)| theta_series(*a, *r, s)).collect();
        angle_to_dcm_generic(&thetas, seq).expect("arity already validated")
    };
    Ok(d1_mat(f, 0.0))
}

/// Builds the DCM and its first and second time derivatives from `(angle, rate, accel)` triples.
pub fn angle_to_d2dcm(
    angle_triples: &[(f64, f64, f64)],
    seq: RotationSequence,
) -> Result<(Matrix3<f64>, Matrix3<f64>, Matrix3<f64>), MathError> {
    seq.validate()?;
    if angle_triples.len() != seq.arity() {
        return Err(MathError::DimensionMismatch {
            action: "building a DCM second derivative from Euler angle accelerations",
            expected: seq.arity(),
            got: angle_triples.len(),
        });
    }
    let f = |s: Dual2| -> Matrix3<Dual2> {
        let thetas: Vec<Dual2> = angle_triples.iter().map(|(a, r, acc)| theta_series2(*a, *r, *acc, s)).collect();
        angle_to_dcm_generic(&thetas, seq).expect("arity already validated")
    };
    Ok(d2_mat(f, 0.0))
}

/// Builds the DCM and its first, second, and third (jerk) time derivatives from
/// `(angle, rate, accel, jerk)` quadruples.
pub fn angle_to_d3dcm(
    angle_quads: &[(f64, f64, f64, f64)],
    seq: RotationSequence,
) -> Result<(Matrix3<f64>, Matrix3<f64>, Matrix3<f64>, Matrix3<f64>), MathError> {
    seq.validate()?;
    if angle_quads.len() != seq.arity() {
        return Err(MathError::DimensionMismatch {
            action: "building a DCM third derivative from Euler angle jerks",
            expected: seq.arity(),
            got: angle_quads.len(),
        });
    }
    let f = |s: Dual3| -> Matrix3<Dual3> {
        let thetas: Vec<Dual3> = angle_quads
            .iter()
            .map(|(a, r, acc, j)| theta_series3(*a, *r, *acc, *j, s))
            .collect();
        angle_to_dcm_generic(&thetas, seq).expect("arity already validated")
    };
    Ok(d3_mat(f, 0.0))
}
