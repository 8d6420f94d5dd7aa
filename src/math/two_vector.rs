/*
 * gnomon
 * Copyright (C) 2026 Gnomon contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Two-vectors frame construction: build an orthonormal triad from a primary vector (which
//! pins one axis exactly) and a secondary vector (which only pins a half-plane, refined via
//! Gram-Schmidt), differentiated through [`DualScalar`] to whatever order is needed.
//!
//! The four public entry points ([`rot3`], [`rot6`], [`rot9`], [`rot12`]) are named for the
//! dimension of the block rotation matrix they ultimately back in [`crate::math::state::StateN`]:
//! position-only (3x3), position+velocity (6x6), +acceleration (9x9), +jerk (12x12).

use nalgebra::{Matrix3, Vector3};

use crate::errors::{DegenerateVectorsSnafu, MathError};
use crate::math::dual::{d1_mat, d2_mat, d3_mat, Dual1, Dual2, Dual3, DualScalar};
use crate::math::rot::Rot;

/// Which principal axis the primary and secondary vectors pin.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TriadAxis {
    X,
    Y,
    Z,
}

fn axis_index(a: TriadAxis) -> usize {
    match a {
        TriadAxis::X => 0,
        TriadAxis::Y => 1,
        TriadAxis::Z => 2,
    }
}

fn third_axis(primary_axis: TriadAxis, secondary_axis: TriadAxis) -> TriadAxis {
    [TriadAxis::X, TriadAxis::Y, TriadAxis::Z]
        .into_iter()
        .find(|a| *a != primary_axis && *a != secondary_axis)
        .expect("exactly one axis remains once primary and secondary are fixed")
}

/// True if `(primary_axis, secondary_axis, third_axis)` is a cyclic permutation of (X, Y, Z)
/// (i.e. XY, YZ, ZX), false for the three anti-cyclic pairs (YX, ZY, XZ).
fn is_cyclic(primary_axis: TriadAxis, secondary_axis: TriadAxis) -> bool {
    (axis_index(secondary_axis) + 3 - axis_index(primary_axis)) % 3 == 1
}

fn cross<T: DualScalar>(a: [T; 3], b: [T; 3]) -> [T; 3] {
    [a[1] * b[2] - a[2] * b[1], a[2] * b[0] - a[0] * b[2], a[0] * b[1] - a[1] * b[0]]
}

fn dot<T: DualScalar>(a: [T; 3], b: [T; 3]) -> T {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn scale<T: DualScalar>(a: [T; 3], s: T) -> [T; 3] {
    [a[0] * s, a[1] * s, a[2] * s]
}

fn norm<T: DualScalar>(a: [T; 3]) -> T {
    dot(a, a).sqrt()
}

fn normalize<T: DualScalar>(a: [T; 3]) -> [T; 3] {
    scale(a, norm(a).recip())
}

/// Builds the triad generically: `e_primary = normalize(primary)`, `e_third =
/// normalize(primary x secondary)`, `e_secondary = e_third x e_primary`, assigned to rows
/// according to `primary_axis`/`secondary_axis`.
///
/// `(primary_axis, secondary_axis)` -> `third_axis` must come out right-handed (X,Y,Z cyclic)
/// for the assigned rows to form a proper (det = +1) rotation rather than a reflection. The raw
/// cross product is the same regardless of which rows it lands in, so the three anti-cyclic
/// pairs (YX, XZ, ZY) need `e_third`'s sign flipped to compensate, mirroring NAIF SPICE's
/// `twovec` sign handling.
fn triad_generic<T: DualScalar>(primary: [T; 3], secondary: [T; 3], primary_axis: TriadAxis, secondary_axis: TriadAxis) -> Matrix3<T> {
    let e_p = normalize(primary);
    let mut e_third = normalize(cross(primary, secondary));
    if !is_cyclic(primary_axis, secondary_axis) {
        e_third = scale(e_third, T::constant(-1.0));
    }
    let e_s = cross(e_third, e_p);

    let mut rows = [[T::constant(0.0); 3]; 3];
    rows[axis_index(primary_axis)] = e_p;
    rows[axis_index(secondary_axis)] = e_s;
    rows[axis_index(third_axis(primary_axis, secondary_axis))] = e_third;

    Matrix3::new(
        rows[0][0], rows[0][1], rows[0][2], rows[1][0], rows[1][1], rows[1][2], rows[2][0], rows[2][1], rows[2][2],
    )
}

fn validate(primary: &Vector3<f64>, secondary: &Vector3<f64>, primary_axis: TriadAxis, secondary_axis: TriadAxis) -> Result<(), MathError> {
    if primary_axis == secondary_axis {
        return DegenerateVectorsSnafu {
            action: "primary and secondary axis assignments must differ",
        }
        .fail();
    }
    if primary.norm() < f64::EPSILON {
        return DegenerateVectorsSnafu {
            action: "primary vector is numerically zero",
        }
        .fail();
    }
    if primary.cross(secondary).norm() < f64::EPSILON {
        return DegenerateVectorsSnafu {
            action: "primary and secondary vectors are parallel",
        }
        .fail();
    }
    Ok(())
}

/// Seeds a Taylor-series-in-`s` version of a vector given up to its first three time
/// derivatives (pads with zero vectors for orders the caller does not supply).
fn series<T: DualScalar>(coeffs: &[Vector3<f64>], s: T) -> [T; 3] {
    let mut acc = [T::constant(0.0), T::constant(0.0), T::constant(0.0)];
    let mut power = T::constant(1.0);
    let mut fact = 1.0_f64;
    for (n, c) in coeffs.iter().enumerate() {
        if n > 0 {
            fact *= n as f64;
        }
        let coeff = T::constant(1.0 / fact);
        acc = [acc[0] + T::constant(c.x) * power * coeff, acc[1] + T::constant(c.y) * power * coeff, acc[2] + T::constant(c.z) * power * coeff];
        power = power * s;
    }
    acc
}

/// Order-0 triad (`rot3`): a bare orthonormal DCM built from position vectors alone.
pub fn rot3(primary: Vector3<f64>, secondary: Vector3<f64>, primary_axis: TriadAxis, secondary_axis: TriadAxis) -> Result<Rot<1>, MathError> {
    validate(&primary, &secondary, primary_axis, secondary_axis)?;
    let m = triad_generic([primary.x, primary.y, primary.z], [secondary.x, secondary.y, secondary.z], primary_axis, secondary_axis);
    Ok(Rot::from_mats([m]))
}

/// `rot6`: triad and its first time derivative, from position and velocity.
pub fn rot6(
    primary: (Vector3<f64>, Vector3<f64>),
    secondary: (Vector3<f64>, Vector3<f64>),
    primary_axis: TriadAxis,
    secondary_axis: TriadAxis,
) -> Result<Rot<2>, MathError> {
    validate(&primary.0, &secondary.0, primary_axis, secondary_axis)?;
    let p_coeffs = [primary.0, primary.1];
    let s_coeffs = [secondary.0, secondary.1];
    let f = move |s: Dual1| -> Matrix3<Dual1> { triad_generic(series(&p_coeffs, s), series(&s_coeffs, s), primary_axis, secondary_axis) };
    let (m0, m1) = d1_mat(f, 0.0);
    Ok(Rot::from_mats([m0, m1]))
}

/// `rot9`: triad through its second time derivative, from position, velocity, and acceleration.
pub fn rot9(
    primary: (Vector3<f64>, Vector3<f64>, Vector3<f64>),
    secondary: (Vector3<f64>, Vector3<f64>, Vector3<f64>),
    primary_axis: TriadAxis,
    secondary_axis: TriadAxis,
) -> Result<Rot<3>, MathError> {
    validate(&primary.0, &secondary.0, primary_axis, secondary_axis)?;
    let p_coeffs = [primary.0, primary.1, primary.2];
    let s_coeffs = [secondary.0, secondary.1, secondary.2];
    let f = move |s: Dual2| -> Matrix3<Dual2> { triad_generic(series(&p_coeffs, s), series(&s_coeffs, s), primary_axis, secondary_axis) };
    let (m0, m1, m2) = d2_mat(f, 0.0);
    Ok(Rot::from_mats([m0, m1, m2]))
}

/// `rot12`: triad through its third (jerk) time derivative.
pub fn rot12(
    primary: (Vector3<f64>, Vector3<f64>, Vector3<f64>, Vector3<f64>),
    secondary: (Vector3<f64>, Vector3<f64>, Vector3<f64>, Vector3<f64>),
    primary_axis: TriadAxis,
    secondary_axis: TriadAxis,
) -> Result<Rot<4>, MathError> {
    validate(&primary.0, &secondary.0, primary_axis, secondary_axis)?;
    let p_coeffs = [primary.0, primary.1, primary.2, primary.3];
    let s_coeffs = [secondary.0, secondary.1, secondary.2, secondary.3];
    let f = move |s: Dual3| -> Matrix3<Dual3> { triad_generic(series(&p_coeffs, s), series(&s_coeffs, s), primary_axis, secondary_axis) };
    let (m0, m1, m2, m3) = d3_mat(f, 0.0);
    Ok(Rot::from_mats([m0, m1, m2, m3]))
}

#[cfg(test)]
mod ut_two_vector {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case(TriadAxis::X, TriadAxis::Y)]
    #[case(TriadAxis::Y, TriadAxis::Z)]
    #[case(TriadAxis::Z, TriadAxis::X)]
    #[case(TriadAxis::Y, TriadAxis::X)]
    #[case(TriadAxis::Z, TriadAxis::Y)]
    #[case(TriadAxis::X, TriadAxis::Z)]
    fn rot3_is_a_proper_rotation_for_every_axis_pair(#[case] primary_axis: TriadAxis, #[case] secondary_axis: TriadAxis) {
        let p = Vector3::new(1.0, 0.2, 0.0);
        let s = Vector3::new(0.0, 1.0, 0.3);
        let r = rot3(p, s, primary_axis, secondary_axis).unwrap();
        let m = r.mats[0];
        assert_relative_eq!(m * m.transpose(), Matrix3::identity(), epsilon = 1e-10);
        assert_relative_eq!(m.determinant(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn rot3_produces_orthonormal_triad() {
        let p = Vector3::new(1.0, 0.0, 0.0);
        let s = Vector3::new(0.0, 1.0, 0.0);
        let r = rot3(p, s, TriadAxis::X, TriadAxis::Y).unwrap();
        let m = r.mats[0];
        assert_relative_eq!(m * m.transpose(), Matrix3::identity(), epsilon = 1e-10);
        assert_relative_eq!(m.determinant(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn rot3_rejects_parallel_vectors() {
        let p = Vector3::new(1.0, 0.0, 0.0);
        let s = Vector3::new(2.0, 0.0, 0.0);
        assert!(rot3(p, s, TriadAxis::X, TriadAxis::Y).is_err());
    }

    #[test]
    fn rot6_value_matches_rot3() {
        let p = (Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 0.1, 0.0));
        let s = (Vector3::new(0.0, 1.0, 0.0), Vector3::new(0.0, 0.0, 0.2));
        let r6 = rot6(p, s, TriadAxis::X, TriadAxis::Y).unwrap();
        let r3 = rot3(p.0, s.0, TriadAxis::X, TriadAxis::Y).unwrap();
        assert_relative_eq!(r6.mats[0], r3.mats[0], epsilon = 1e-10);
    }

    #[test]
    fn rot9_first_derivative_matches_rot6() {
        let p = (Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 0.1, 0.0), Vector3::new(0.0, 0.0, 0.01));
        let s = (Vector3::new(0.0, 1.0, 0.0), Vector3::new(0.1, 0.0, 0.2), Vector3::new(0.0, 0.0, 0.0));
        let r9 = rot9(p, s, TriadAxis::X, TriadAxis::Y).unwrap();
        let r6 = rot6((p.0, p.1), (s.0, s.1), TriadAxis::X, TriadAxis::Y).unwrap();
        assert_relative_eq!(r9.mats[0], r6.mats[0], epsilon = 1e-9);
        assert_relative_eq!(r9.mats[1], r6.mats[1], epsilon = 1e-9);
    }
}
