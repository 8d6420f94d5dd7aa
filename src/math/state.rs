/*
 * gnomon
 * Copyright (C) 2026 Gnomon contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! [`StateN`], a fixed-arity tower of a position vector and up to three of its time derivatives
//! (velocity, acceleration, jerk). The translational counterpart to [`crate::math::rot::Rot`].

use core::ops::{Add, Sub};
use nalgebra::Vector3;

use crate::math::rot::Rot;

/// A position vector bundled with up to `O - 1` of its time derivatives: `vecs[0]` is position,
/// `vecs[1]` velocity, `vecs[2]` acceleration, `vecs[3]` jerk.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StateN<const O: usize> {
    pub vecs: [Vector3<f64>; O],
}

impl<const O: usize> StateN<O> {
    pub fn zero() -> Self {
        StateN { vecs: [Vector3::zeros(); O] }
    }

    pub fn from_vecs(vecs: [Vector3<f64>; O]) -> Self {
        StateN { vecs }
    }

    pub fn position(&self) -> Vector3<f64> {
        self.vecs[0]
    }

    /// Applies a rotation tower to this state tower via the Leibniz product rule: the n-th order
    /// entry of `R . r` is the sum over k of `C(n,k) * R^(k) * r^(n-k)`.
    pub fn rotate_by(&self, rot: &Rot<O>) -> StateN<O> {
        const fn binomial(n: usize, k: usize) -> f64 {
            const PASCAL: [[u32; 4]; 4] = [[1, 0, 0, 0], [1, 1, 0, 0], [1, 2, 1, 0], [1, 3, 3, 1]];
            PASCAL[n][k] as f64
        }
        let mut vecs = [Vector3::zeros(); O];
        for (n, slot) in vecs.iter_mut().enumerate() {
            let mut acc = Vector3::zeros();
            for k in 0..=n {
                acc += rot.mats[k] * self.vecs[n - k] * binomial(n, k);
            }
            *slot = acc;
        }
        StateN { vecs }
    }

    pub fn truncate<const K: usize>(&self) -> StateN<K> {
        assert!(K <= O, "cannot truncate a {O}-order state to {K} orders");
        let vecs = core::array::from_fn(|i| self.vecs[i]);
        StateN { vecs }
    }
}

impl<const O: usize> Add for StateN<O> {
    type Output = StateN<O>;
    fn add(self, rhs: StateN<O>) -> StateN<O> {
        let vecs = core::array::from_fn(|i| self.vecs[i] + rhs.vecs[i]);
        StateN { vecs }
    }
}

impl<const O: usize> Sub for StateN<O> {
    type Output = StateN<O>;
    fn sub(self, rhs: StateN<O>) -> StateN<O> {
        let vecs = core::array::from_fn(|i| self.vecs[i] - rhs.vecs[i]);
        StateN { vecs }
    }
}

#[cfg(test)]
mod ut_state {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Matrix3;

    #[test]
    fn rotate_by_identity_preserves_state() {
        let s = StateN::<2>::from_vecs([Vector3::new(1.0, 2.0, 3.0), Vector3::new(0.1, 0.2, 0.3)]);
        let id = Rot::<2>::identity();
        let rotated = s.rotate_by(&id);
        assert_relative_eq!(rotated.vecs[0], s.vecs[0], epsilon = 1e-12);
        assert_relative_eq!(rotated.vecs[1], s.vecs[1], epsilon = 1e-12);
    }

    #[test]
    fn rotate_by_with_nonzero_angular_rate_applies_transport_theorem() {
        // A rotating frame with Rdot != 0 must inject the rotation's own rate into velocity.
        let rot = Rot::<2>::from_mats([Matrix3::identity(), Matrix3::from_element(0.0)]);
        let s = StateN::<2>::from_vecs([Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 1.0, 0.0)]);
        let out = s.rotate_by(&rot);
        assert_relative_eq!(out.vecs[0], Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(out.vecs[1], Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    }
}
