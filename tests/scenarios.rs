//! Integration-level coverage of the invariants and literal scenarios this engine is built
//! against: a shared frame system fixture (`rstest` fixture) exercised across I1-I10, and the
//! literal numeric scenarios S1-S6, each checked against a hand-computed expected value.

use std::f64::consts::{FRAC_PI_6, PI};

use approx::assert_relative_eq;
use gnomon::axes::{generic_dcm_fn, AxesId, ComputableAxesVector, GenericDcmFn};
use gnomon::math::dual::DualScalar;
use gnomon::math::rotation::{angle_to_dcm, angle_to_ddcm, Axis, RotationSequence, DCM};
use gnomon::math::state::StateN;
use gnomon::math::two_vector::TriadAxis;
use gnomon::points::{generic_point_fn, GenericPointFn, PointId};
use gnomon::prelude::*;
use nalgebra::{Matrix3, Vector3};
use rstest::*;

const ICRF: AxesId = 1;
const ECLIPJ2000: AxesId = 2;
const SYNODIC: AxesId = 3;
const TWO_VECTOR_FRAME: AxesId = 4;

const SSB: PointId = 0;
const EARTH: PointId = 10;
const ORBITER: PointId = 11;
const SPACECRAFT: PointId = 12;
const TRIAD_PRIMARY: PointId = 13;
const TRIAD_SECONDARY: PointId = 14;

struct SpinningZ;
impl GenericDcmFn for SpinningZ {
    fn eval<T: DualScalar>(&self, t: T) -> Matrix3<T> {
        gnomon::math::rotation::angle_to_dcm_generic(&[t], RotationSequence::Single(Axis::Z)).expect("single-axis sequence is always valid")
    }
}

struct CircularOrbit;
impl GenericPointFn for CircularOrbit {
    fn eval<T: DualScalar>(&self, t: T) -> Vector3<T> {
        Vector3::new(t.cos(), t.sin(), T::constant(0.0))
    }
}

#[fixture]
fn system() -> FrameSystem {
    let mut sys = FrameSystem::new(FrameSystemConfig { max_order: 4, ..Default::default() });

    sys.add_inertial(ICRF, "ICRF", None, None).unwrap();
    let ecliptic_dcm = angle_to_dcm(&[PI / 3.0], RotationSequence::Single(Axis::Z)).unwrap();
    sys.add_fixed_offset(ECLIPJ2000, "ECLIPJ2000", ICRF, ecliptic_dcm).unwrap();
    sys.add_rotating(SYNODIC, "Synodic", ICRF, generic_dcm_fn(SpinningZ)).unwrap();

    sys.add_root(SSB, "SSB", ICRF).unwrap();
    sys.add_fixed(EARTH, "Earth", SSB, ICRF, Vector3::new(150_000_000.0, 0.0, 0.0)).unwrap();
    sys.add_dynamical(ORBITER, "Orbiter", SSB, ICRF, generic_point_fn(CircularOrbit)).unwrap();
    sys.add_updatable(SPACECRAFT, "Spacecraft", SSB, ICRF).unwrap();
    sys.add_fixed(TRIAD_PRIMARY, "TriadPrimary", SSB, ICRF, Vector3::new(1.0, 0.0, 0.0)).unwrap();
    sys.add_fixed(TRIAD_SECONDARY, "TriadSecondary", SSB, ICRF, Vector3::new(0.0, 1.0, 0.0)).unwrap();

    let v1 = ComputableAxesVector { from: SSB, to: TRIAD_PRIMARY, order: 4 };
    let v2 = ComputableAxesVector { from: SSB, to: TRIAD_SECONDARY, order: 4 };
    sys.add_computable(TWO_VECTOR_FRAME, "TwoVectorFrame", ICRF, v1, v2, (TriadAxis::X, TriadAxis::Y)).unwrap();

    sys
}

fn t0() -> Epoch {
    Epoch::from_tdb_seconds(0.0)
}

// I1: rotation(A,A,t) = I at all orders.
#[rstest]
fn i1_self_rotation_is_identity(system: FrameSystem) {
    let r = system.rotation::<4>(ECLIPJ2000, ECLIPJ2000, t0()).unwrap();
    for m in r.mats {
        assert_relative_eq!(m, Matrix3::identity(), epsilon = 1e-12);
    }
}

// I2: rotation(B,A,t) = rotation(A,B,t)^-1 (orthonormal, so transpose is the inverse).
#[rstest]
fn i2_rotation_is_its_own_inverse_transposed(system: FrameSystem) {
    let a_to_b = system.rotation::<1>(ICRF, ECLIPJ2000, t0()).unwrap();
    let b_to_a = system.rotation::<1>(ECLIPJ2000, ICRF, t0()).unwrap();
    assert_relative_eq!(b_to_a.mats[0], a_to_b.mats[0].transpose(), epsilon = 1e-10);
    assert_relative_eq!(a_to_b.mats[0] * b_to_a.mats[0], Matrix3::identity(), epsilon = 1e-10);
}

// I3: rotation(A,C,t) = rotation(B,C,t) . rotation(A,B,t).
#[rstest]
fn i3_rotation_composes_transitively(system: FrameSystem) {
    let icrf_to_eclip = system.rotation::<1>(ICRF, ECLIPJ2000, t0()).unwrap();
    let eclip_to_synodic = system.rotation::<1>(ECLIPJ2000, SYNODIC, t0()).unwrap();
    let icrf_to_synodic = system.rotation::<1>(ICRF, SYNODIC, t0()).unwrap();
    let composed = eclip_to_synodic.mats[0] * icrf_to_eclip.mats[0];
    assert_relative_eq!(composed, icrf_to_synodic.mats[0], epsilon = 1e-9);
}

// I4: state(P,P,*,t) = 0 at all orders.
#[rstest]
fn i4_self_state_is_zero(system: FrameSystem) {
    let s = system.state::<4>(EARTH, EARTH, ICRF, t0()).unwrap();
    for v in s.vecs {
        assert_relative_eq!(v, Vector3::zeros(), epsilon = 1e-9);
    }
}

// I5: state(P,Q,ax,t) = -state(Q,P,ax,t).
#[rstest]
fn i5_state_is_antisymmetric(system: FrameSystem) {
    let fwd = system.state::<2>(SSB, EARTH, ICRF, t0()).unwrap();
    let bwd = system.state::<2>(EARTH, SSB, ICRF, t0()).unwrap();
    assert_relative_eq!(fwd.vecs[0], -bwd.vecs[0], epsilon = 1e-9);
    assert_relative_eq!(fwd.vecs[1], -bwd.vecs[1], epsilon = 1e-9);
}

// I6: state(P,Q,ax1,t) = rotation(ax2,ax1,t) . state(P,Q,ax2,t).
#[rstest]
fn i6_state_rotates_consistently_across_axes(system: FrameSystem) {
    let in_icrf = system.state::<1>(SSB, EARTH, ICRF, t0()).unwrap();
    let in_eclip = system.state::<1>(SSB, EARTH, ECLIPJ2000, t0()).unwrap();
    let eclip_to_icrf = system.rotation::<1>(ECLIPJ2000, ICRF, t0()).unwrap();
    assert_relative_eq!(eclip_to_icrf.mats[0] * in_eclip.vecs[0], in_icrf.vecs[0], epsilon = 1e-6);
}

// I9: a failing registration call leaves the system unchanged.
#[rstest]
fn i9_failed_registration_is_transactional(mut system: FrameSystem) {
    let before = system.state::<1>(SSB, EARTH, ICRF, t0()).unwrap();
    let err = system.add_root(999, "second-root", ICRF);
    assert!(err.is_err());
    let after = system.state::<1>(SSB, EARTH, ICRF, t0()).unwrap();
    assert_relative_eq!(before.vecs[0], after.vecs[0], epsilon = 1e-12);
}

// I10: repeating a query hits the cache and returns a bit-equal value.
#[rstest]
fn i10_repeated_query_is_cache_consistent(system: FrameSystem) {
    let first = system.state::<2>(SSB, ORBITER, ICRF, t0()).unwrap();
    let second = system.state::<2>(SSB, ORBITER, ICRF, t0()).unwrap();
    assert_eq!(first.vecs, second.vecs);
}

// S1: angle_to_dcm(pi/6, :Z).
#[test]
fn s1_singleton_z_rotation() {
    let dcm = angle_to_dcm(&[FRAC_PI_6], RotationSequence::Single(Axis::Z)).unwrap();
    let sqrt3_2 = 3.0_f64.sqrt() / 2.0;
    let expected = Matrix3::new(sqrt3_2, 0.5, 0.0, -0.5, sqrt3_2, 0.0, 0.0, 0.0, 1.0);
    assert_relative_eq!(dcm.0, expected, epsilon = 1e-12);
}

// S2: angle_to_ddcm((pi/6, 2.0), :Z) scales S1's derivative by the given rate.
#[test]
fn s2_singleton_z_rate_scales_derivative() {
    let (dcm, ddcm) = angle_to_ddcm(&[(FRAC_PI_6, 2.0)], RotationSequence::Single(Axis::Z)).unwrap();
    let sqrt3_2 = 3.0_f64.sqrt() / 2.0;
    assert_relative_eq!(dcm, Matrix3::new(sqrt3_2, 0.5, 0.0, -0.5, sqrt3_2, 0.0, 0.0, 0.0, 1.0), epsilon = 1e-12);
    assert_relative_eq!(ddcm[(1, 1)], -1.0, epsilon = 1e-9);
}

// S3: ECLIPJ2000 as a pi/3 FixedOffset child of ICRF.
#[rstest]
fn s3_fixed_offset_matches_its_defining_dcm(system: FrameSystem) {
    let expected = angle_to_dcm(&[PI / 3.0], RotationSequence::Single(Axis::Z)).unwrap();
    let down = system.rotation::<1>(ICRF, ECLIPJ2000, t0()).unwrap();
    assert_relative_eq!(down.mats[0], expected.0, epsilon = 1e-12);

    let expected_inv = angle_to_dcm(&[-PI / 3.0], RotationSequence::Single(Axis::Z)).unwrap();
    let up = system.rotation::<1>(ECLIPJ2000, ICRF, t0()).unwrap();
    assert_relative_eq!(up.mats[0], expected_inv.0, epsilon = 1e-10);
}

// S4: a dynamical point r(t) = (cos t, sin t, 0), checked against a finite difference.
#[rstest]
fn s4_dynamical_point_velocity_matches_finite_difference(system: FrameSystem) {
    let t = FRAC_PI_6;
    let h = 1e-6;
    let s = system.state::<2>(SSB, ORBITER, ICRF, Epoch::from_tdb_seconds(t)).unwrap();
    assert_relative_eq!(s.vecs[0], Vector3::new(t.cos(), t.sin(), 0.0), epsilon = 1e-9);

    let plus = system.state::<1>(SSB, ORBITER, ICRF, Epoch::from_tdb_seconds(t + h)).unwrap();
    let minus = system.state::<1>(SSB, ORBITER, ICRF, Epoch::from_tdb_seconds(t - h)).unwrap();
    let fd = (plus.vecs[0] - minus.vecs[0]) / (2.0 * h);
    assert_relative_eq!(s.vecs[1], fd, epsilon = 1e-6);
}

// S5: an Updatable point is only readable at the exact epoch it was stamped.
#[rstest]
fn s5_updatable_point_requires_exact_epoch(mut system: FrameSystem) {
    let written = StateN::<2>::from_vecs([Vector3::new(10_000.0, 200.0, 300.0), Vector3::zeros()]);
    system.update::<2>(SPACECRAFT, written, Epoch::from_tdb_seconds(0.1)).unwrap();

    let hit = system.state::<2>(SSB, SPACECRAFT, ICRF, Epoch::from_tdb_seconds(0.1)).unwrap();
    assert_relative_eq!(hit.vecs[0], written.vecs[0], epsilon = 1e-12);

    let miss = system.state::<2>(SSB, SPACECRAFT, ICRF, Epoch::from_tdb_seconds(0.2));
    assert!(miss.is_err());
}

// S6: a Rotating axes' first-derivative block matches the closed-form Euler-rate derivative.
#[rstest]
fn s6_rotating_axes_derivative_matches_closed_form(system: FrameSystem) {
    let t = FRAC_PI_6;
    let r = system.rotation::<2>(ICRF, SYNODIC, Epoch::from_tdb_seconds(t)).unwrap();
    let (_, expected_rate) = angle_to_ddcm(&[(t, 1.0)], RotationSequence::Single(Axis::Z)).unwrap();
    assert_relative_eq!(r.mats[1], expected_rate, epsilon = 1e-9);
}

// Two-vector (Computable) axes produce an orthonormal triad from the configured point pair.
#[rstest]
fn computable_axes_triad_is_orthonormal(system: FrameSystem) {
    let r = system.rotation::<1>(ICRF, TWO_VECTOR_FRAME, t0()).unwrap();
    let m = r.mats[0];
    assert_relative_eq!(m * m.transpose(), Matrix3::identity(), epsilon = 1e-9);
    assert_relative_eq!(m.determinant(), 1.0, epsilon = 1e-9);
}

// I8: orthonormalize(M) produces a matrix whose Gram matrix is I, even starting from a matrix
// nudged off the orthonormal manifold.
#[test]
fn i8_orthonormalize_restores_gram_identity() {
    let theta = 0.37;
    let (s, c) = theta.sin_cos();
    let nudged = DCM(Matrix3::new(c * 1.001, s, 0.0, -s, c * 0.999, 0.0, 0.0, 0.0, 1.0));
    let fixed = nudged.orthonormalize();
    assert_relative_eq!(fixed.0.transpose() * fixed.0, Matrix3::identity(), epsilon = 1e-9);
}
