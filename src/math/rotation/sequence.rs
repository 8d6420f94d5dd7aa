/*
 * gnomon
 * Copyright (C) 2026 Gnomon contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::errors::{InvalidSequenceSnafu, MathError};
use crate::math::dual::DualScalar;
use nalgebra::Matrix3;
use snafu::ensure;

/// One of the three principal axes an elementary rotation can be taken about.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// A symbolic Euler-angle rotation sequence: one of the 3 singletons, 6 pairs, or 12 triplets
/// of principal-axis rotations (adjacent axes in a triplet must differ, as in any Euler/Tait-Bryan
/// convention).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RotationSequence {
    Single(Axis),
    Pair(Axis, Axis),
    Triplet(Axis, Axis, Axis),
}

impl RotationSequence {
    /// Number of Euler angles this sequence expects.
    pub fn arity(&self) -> usize {
        match self {
            RotationSequence::Single(_) => 1,
            RotationSequence::Pair(_, _) => 2,
            RotationSequence::Triplet(_, _, _) => 3,
        }
    }

    /// Validates the adjacency constraint (no two consecutive axes may repeat) and returns the
    /// axes as a slice-friendly array, padded with `None`.
    fn axes(&self) -> [Option<Axis>; 3] {
        match *self {
            RotationSequence::Single(a) => [Some(a), None, None],
            RotationSequence::Pair(a, b) => [Some(a), Some(b), None],
            RotationSequence::Triplet(a, b, c) => [Some(a), Some(b), Some(c)],
        }
    }

    pub fn validate(&self) -> Result<(), MathError> {
        let axes = self.axes();
        for pair in axes.windows(2) {
            if let (Some(a), Some(b)) = (pair[0], pair[1]) {
                ensure!(
                    a != b,
                    InvalidSequenceSnafu {
                        seq: "consecutive axes must differ",
                        action: "validating a rotation sequence",
                    }
                );
            }
        }
        Ok(())
    }
}

fn elementary<T: DualScalar>(axis: Axis, theta: T) -> Matrix3<T> {
    let s = theta.sin();
    let c = theta.cos();
    let z = T::constant(0.0);
    let o = T::constant(1.0);
    match axis {
        Axis::X => Matrix3::new(o, z, z, z, c, s, z, -s, c),
        Axis::Y => Matrix3::new(c, z, -s, z, o, z, s, z, c),
        Axis::Z => Matrix3::new(c, s, z, -s, c, z, z, z, o),
    }
}

/// Builds the composed direction cosine matrix for `thetas` applied in sequence, generic over
/// any [`DualScalar`] so the same composition can be run at plain `f64` precision or through
/// forward-mode duals to recover its time derivatives.
///
/// Angles are applied in order: the frame is first rotated about `thetas[0]`'s axis, then about
/// `thetas[1]`'s, then `thetas[2]`'s, composing as `R = R_n * ... * R_2 * R_1`.
pub fn angle_to_dcm_generic<T: DualScalar>(
    thetas: &[T],
    seq: RotationSequence,
) -> Result<Matrix3<T>, MathError> {
    seq.validate()?;
    let axes = seq.axes();
    if thetas.len() != seq.arity() {
        return Err(MathError::DimensionMismatch {
            action: "building a DCM from Euler angles",
            expected: seq.arity(),
            got: thetas.len(),
        });
    }

    let mut out: Option<Matrix3<T>> = None;
    for (axis, theta) in axes.iter().zip(thetas.iter()) {
        let axis = match axis {
            Some(a) => *a,
            None => break,
        };
        let r = elementary(axis, *theta);
        out = Some(match out {
            None => r,
            Some(acc) => r * acc,
        });
    }
    // arity() >= 1 always holds, so `out` is always populated.
    Ok(out.expect("rotation sequence arity is always at least one"))
}

#[cfg(test)]
mod ut_sequence {
    use super::*;

    #[test]
    fn triplet_rejects_repeated_adjacent_axis() {
        let seq = RotationSequence::Triplet(Axis::Z, Axis::Z, Axis::X);
        assert!(seq.validate().is_err());
    }

    #[test]
    fn pair_accepts_distinct_axes() {
        let seq = RotationSequence::Pair(Axis::X, Axis::Y);
        assert!(seq.validate().is_ok());
    }

    #[test]
    fn single_axis_matches_elementary_rotation() {
        let m = angle_to_dcm_generic(&[std::f64::consts::FRAC_PI_2], RotationSequence::Single(Axis::Z)).unwrap();
        let expect = elementary(Axis::Z, std::f64::consts::FRAC_PI_2);
        assert_eq!(m, expect);
    }
}
