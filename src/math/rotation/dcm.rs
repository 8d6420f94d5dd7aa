/*
 * gnomon
 * Copyright (C) 2026 Gnomon contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use core::fmt;
use core::ops::Mul;
use nalgebra::{Matrix3, Vector3};

use super::EPSILON;

/// A direction cosine matrix: an orthonormal 3x3 rotation matrix, `det = +1`.
///
/// Unlike the teacher's `DCM` (which bundled a matrix with an optional first time derivative),
/// this type is the bare order-0 rotation; higher derivative orders are carried alongside it by
/// [`crate::math::rot::Rot`] rather than folded into this struct, since this engine needs up to
/// the third derivative (jerk), not just the first.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DCM(pub Matrix3<f64>);

impl DCM {
    pub fn identity() -> Self {
        DCM(Matrix3::identity())
    }

    pub fn is_identity(&self) -> bool {
        (self.0 - Matrix3::identity()).abs().max() < EPSILON
    }

    /// Checks orthonormality: columns unit length, mutually orthogonal, determinant `+1`.
    pub fn is_valid(&self, unit_tol: f64) -> bool {
        let prod = self.0.transpose() * self.0;
        (prod - Matrix3::identity()).abs().max() < unit_tol && (self.0.determinant() - 1.0).abs() < unit_tol
    }

    /// Projects `self` back onto the nearest orthonormal matrix via Gram-Schmidt on the columns.
    /// Used to arrest floating point drift after many compositions (invariant I-2).
    pub fn orthonormalize(&self) -> Self {
        let c0 = self.0.column(0).normalize();
        let c1 = (self.0.column(1) - c0 * c0.dot(&self.0.column(1))).normalize();
        let c2 = c0.cross(&c1);
        DCM(Matrix3::from_columns(&[c0, c1, c2]))
    }

    pub fn transpose(&self) -> Self {
        DCM(self.0.transpose())
    }
}

impl Default for DCM {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for DCM {
    type Output = DCM;
    fn mul(self, rhs: DCM) -> DCM {
        DCM(self.0 * rhs.0)
    }
}

impl Mul<Vector3<f64>> for DCM {
    type Output = Vector3<f64>;
    fn mul(self, rhs: Vector3<f64>) -> Vector3<f64> {
        self.0 * rhs
    }
}

impl fmt::Display for DCM {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The skew-symmetric (cross-product) matrix `[v]×` such that `[v]× w == v.cross(&w)`.
pub fn skew(v: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(0.0, -v.z, v.y, v.z, 0.0, -v.x, -v.y, v.x, 0.0)
}

/// Recovers the angular velocity vector `ω` such that `Ṁ = -[ω]× M` (the transport theorem),
/// given a DCM and its first time derivative.
pub fn angular_velocity_from_dcm(m: &Matrix3<f64>, m_dot: &Matrix3<f64>) -> Vector3<f64> {
    let omega_skew = -m_dot * m.transpose();
    Vector3::new(omega_skew[(2, 1)], omega_skew[(0, 2)], omega_skew[(1, 0)])
}

#[cfg(test)]
mod ut_dcm {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn identity_is_valid_and_orthonormal() {
        let d = DCM::identity();
        assert!(d.is_valid(1e-12));
        assert!(d.is_identity());
    }

    #[test]
    fn orthonormalize_is_idempotent_on_a_valid_dcm() {
        let theta = 0.7_f64;
        let (s, c) = theta.sin_cos();
        let d = DCM(Matrix3::new(c, s, 0.0, -s, c, 0.0, 0.0, 0.0, 1.0));
        let fixed = d.orthonormalize();
        assert_relative_eq!(fixed.0, d.0, epsilon = 1e-12);
    }

    #[test]
    fn skew_matches_cross_product() {
        let v = Vector3::new(1.0, 2.0, 3.0);
        let w = Vector3::new(-1.0, 0.5, 2.0);
        assert_relative_eq!(skew(&v) * w, v.cross(&w), epsilon = 1e-12);
    }
}
