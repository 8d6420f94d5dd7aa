/*
 * gnomon
 * Copyright (C) 2026 Gnomon contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Forward-mode automatic differentiation (C8), used to synthesize the derivatives a Rotating
//! axes or Dynamical point did not supply analytically.
//!
//! The scheme is a dual number nested three levels deep: [`Dual1`] carries a value and its first
//! derivative, [`Dual2`] is a `Dual1` of `Dual1` (carries up to the second derivative), and
//! [`Dual3`] is a `Dual2` of `Dual1` (carries up to the third, i.e. jerk). This mirrors the
//! teacher crate's use of `hyperdual::OHyperdual` for forward-mode differentiation, specialized
//! to the single-variable (time), fixed-depth-three case this engine needs instead of
//! `hyperdual`'s multivariate first-order Jacobians.

use core::ops::{Add, Mul, Neg, Sub};
use nalgebra::{Matrix3, Vector3};

/// A scalar type that forward-mode differentiation can run over: real arithmetic plus the two
/// trigonometric primitives the rotation kernel needs.
pub trait DualScalar:
    Copy + Clone + core::fmt::Debug + PartialEq + Add<Output = Self> + Sub<Output = Self> + Mul<Output = Self> + Neg<Output = Self> + 'static
{
    fn constant(v: f64) -> Self;
    fn sin(self) -> Self;
    fn cos(self) -> Self;
    fn recip(self) -> Self;
    fn sqrt(self) -> Self;
}

impl DualScalar for f64 {
    fn constant(v: f64) -> Self {
        v
    }
    fn sin(self) -> Self {
        f64::sin(self)
    }
    fn cos(self) -> Self {
        f64::cos(self)
    }
    fn recip(self) -> Self {
        f64::recip(self)
    }
    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }
}

/// `Dual<T> = value + eps * T`, a first-order forward-mode dual number generic over its own
/// scalar. Nesting `T` recovers higher derivative orders: `Dual<Dual<f64>>` tracks up to the
/// second derivative, `Dual<Dual<Dual<f64>>>` up to the third.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Dual<T> {
    pub val: T,
    pub eps: T,
}

impl<T: DualScalar> DualScalar for Dual<T> {
    fn constant(v: f64) -> Self {
        Dual {
            val: T::constant(v),
            eps: T::constant(0.0),
        }
    }

    fn sin(self) -> Self {
        Dual {
            val: self.val.sin(),
            eps: self.val.cos() * self.eps,
        }
    }

    fn cos(self) -> Self {
        Dual {
            val: self.val.cos(),
            eps: -(self.val.sin()) * self.eps,
        }
    }

    /// `d/dt (1/v) = -v' / v^2`.
    fn recip(self) -> Self {
        let r = self.val.recip();
        Dual {
            val: r,
            eps: -(self.eps * r * r),
        }
    }

    /// `d/dt sqrt(v) = v' / (2 sqrt(v))`.
    fn sqrt(self) -> Self {
        let sv = self.val.sqrt();
        Dual {
            val: sv,
            eps: self.eps * (T::constant(0.5) * sv.recip()),
        }
    }
}

impl<T: DualScalar> Add for Dual<T> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Dual {
            val: self.val + rhs.val,
            eps: self.eps + rhs.eps,
        }
    }
}

impl<T: DualScalar> Sub for Dual<T> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Dual {
            val: self.val - rhs.val,
            eps: self.eps - rhs.eps,
        }
    }
}

impl<T: DualScalar> Mul for Dual<T> {
    type Output = Self;
    /// Product rule: `(a + a'ε)(b + b'ε) = ab + (a'b + ab')ε` (ε² truncated away).
    fn mul(self, rhs: Self) -> Self {
        Dual {
            val: self.val * rhs.val,
            eps: self.eps * rhs.val + self.val * rhs.eps,
        }
    }
}

impl<T: DualScalar> Neg for Dual<T> {
    type Output = Self;
    fn neg(self) -> Self {
        Dual {
            val: -self.val,
            eps: -self.eps,
        }
    }
}

/// Carries a value and its first time derivative.
pub type Dual1 = Dual<f64>;
/// Carries a value and its first and second time derivatives.
pub type Dual2 = Dual<Dual1>;
/// Carries a value and its first, second, and third (jerk) time derivatives.
pub type Dual3 = Dual<Dual2>;

impl Dual1 {
    fn seed(t: f64) -> Self {
        Dual { val: t, eps: 1.0 }
    }
}

impl Dual2 {
    fn seed(t: f64) -> Self {
        Dual {
            val: Dual1::seed(t),
            eps: Dual { val: 1.0, eps: 0.0 },
        }
    }
}

impl Dual3 {
    fn seed(t: f64) -> Self {
        Dual {
            val: Dual2::seed(t),
            eps: Dual {
                val: Dual { val: 1.0, eps: 0.0 },
                eps: Dual { val: 0.0, eps: 0.0 },
            },
        }
    }
}

fn vec3_map<T: DualScalar, U: Copy, F: Fn(T) -> U>(v: Vector3<T>, f: F) -> Vector3<U>
where
    U: nalgebra::Scalar,
{
    Vector3::new(f(v.x), f(v.y), f(v.z))
}

fn mat3_map<T: DualScalar, U: Copy, F: Fn(T) -> U>(m: Matrix3<T>, f: F) -> Matrix3<U>
where
    U: nalgebra::Scalar,
{
    Matrix3::from_fn(|r, c| f(m[(r, c)]))
}

/// D¹(f, t): the value and first time derivative of a scalar-in, vector-out function.
pub fn d1<F>(f: F, t: f64) -> (Vector3<f64>, Vector3<f64>)
where
    F: Fn(Vector3<Dual1>) -> Vector3<Dual1>,
{
    let x = Vector3::new(Dual1::seed(t), Dual1::seed(t), Dual1::seed(t));
    let r = f(x);
    (vec3_map(r, |d| d.val), vec3_map(r, |d| d.eps))
}

/// D²(f, t): value, 1st, and 2nd time derivatives.
pub fn d2<F>(f: F, t: f64) -> (Vector3<f64>, Vector3<f64>, Vector3<f64>)
where
    F: Fn(Vector3<Dual2>) -> Vector3<Dual2>,
{
    let x = Vector3::new(Dual2::seed(t), Dual2::seed(t), Dual2::seed(t));
    let r = f(x);
    (
        vec3_map(r, |d| d.val.val),
        vec3_map(r, |d| d.val.eps),
        vec3_map(r, |d| d.eps.eps),
    )
}

/// D³(f, t): value, 1st, 2nd, and 3rd (jerk) time derivatives.
pub fn d3<F>(f: F, t: f64) -> (Vector3<f64>, Vector3<f64>, Vector3<f64>, Vector3<f64>)
where
    F: Fn(Vector3<Dual3>) -> Vector3<Dual3>,
{
    let x = Vector3::new(Dual3::seed(t), Dual3::seed(t), Dual3::seed(t));
    let r = f(x);
    (
        vec3_map(r, |d| d.val.val.val),
        vec3_map(r, |d| d.val.val.eps),
        vec3_map(r, |d| d.val.eps.eps),
        vec3_map(r, |d| d.eps.eps.eps),
    )
}

/// Matrix-valued analogue of [`d1`], used by Rotating axes producers (value = DCM, not a
/// position vector).
pub fn d1_mat<F>(f: F, t: f64) -> (Matrix3<f64>, Matrix3<f64>)
where
    F: Fn(Dual1) -> Matrix3<Dual1>,
{
    let r = f(Dual1::seed(t));
    (mat3_map(r, |d| d.val), mat3_map(r, |d| d.eps))
}

/// Matrix-valued analogue of [`d2`].
pub fn d2_mat<F>(f: F, t: f64) -> (Matrix3<f64>, Matrix3<f64>, Matrix3<f64>)
where
    F: Fn(Dual2) -> Matrix3<Dual2>,
{
    let r = f(Dual2::seed(t));
    (
        mat3_map(r, |d| d.val.val),
        mat3_map(r, |d| d.val.eps),
        mat3_map(r, |d| d.eps.eps),
    )
}

/// Matrix-valued analogue of [`d3`].
pub fn d3_mat<F>(f: F, t: f64) -> (Matrix3<f64>, Matrix3<f64>, Matrix3<f64>, Matrix3<f64>)
where
    F: Fn(Dual3) -> Matrix3<Dual3>,
{
    let r = f(Dual3::seed(t));
    (
        mat3_map(r, |d| d.val.val.val),
        mat3_map(r, |d| d.val.val.eps),
        mat3_map(r, |d| d.val.eps.eps),
        mat3_map(r, |d| d.eps.eps.eps),
    )
}

#[cfg(test)]
mod ut_dual {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sine_matches_closed_form_derivatives() {
        // f(t) = (sin t, cos t, 0); f' = (cos t, -sin t, 0); f'' = (-sin t, -cos t, 0); f''' = (-cos t, sin t, 0)
        let f = |t: Dual3| Vector3::new(t.sin(), t.cos(), Dual3::constant(0.0));
        let t0 = 0.4;
        let (val, d1v, d2v, d3v) = d3(f, t0);
        assert_relative_eq!(val.x, t0.sin(), epsilon = 1e-12);
        assert_relative_eq!(val.y, t0.cos(), epsilon = 1e-12);
        assert_relative_eq!(d1v.x, t0.cos(), epsilon = 1e-12);
        assert_relative_eq!(d1v.y, -t0.sin(), epsilon = 1e-12);
        assert_relative_eq!(d2v.x, -t0.sin(), epsilon = 1e-12);
        assert_relative_eq!(d2v.y, -t0.cos(), epsilon = 1e-12);
        assert_relative_eq!(d3v.x, -t0.cos(), epsilon = 1e-12);
        assert_relative_eq!(d3v.y, t0.sin(), epsilon = 1e-12);
    }
}
