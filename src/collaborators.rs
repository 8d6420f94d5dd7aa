/*
 * gnomon
 * Copyright (C) 2026 Gnomon contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Boundary contracts for collaborators this engine consumes but does not implement: ephemeris
//! kernel I/O, time-scale conversion, and planetary orientation series. Each is a trait; wiring
//! a concrete implementation (SPK files, IAU precession-nutation tables, a TDB clock) is entirely
//! the caller's responsibility.

use hifitime::Epoch;
use nalgebra::{Matrix3, Vector3};

use crate::errors::PointError;
use crate::NodeId;

/// Describes one target an [`EphemerisProvider`] can serve: which center it is computed
/// relative to, which axes its vectors are expressed in, and what time span it covers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EphemerisRecord {
    pub target: NodeId,
    pub center: NodeId,
    pub axes: NodeId,
    pub coverage_start: Epoch,
    pub coverage_end: Epoch,
}

/// External source of target/center ephemeris states, consulted by Ephemeris point nodes.
/// Deliberately out of this crate's implementation scope: kernel file formats, caching, and
/// interpolation all live on the other side of this boundary.
pub trait EphemerisProvider: Send + Sync {
    /// All (target, center, axes, coverage) tuples this provider can serve.
    fn position_records(&self) -> Vec<EphemerisRecord>;

    /// Position (and, for `order >= 1`, velocity/acceleration/jerk) of `target` relative to
    /// `center` at `epoch`, expressed in the record's axes. `order` selects how many derivative
    /// levels are populated: 0 -> position only, 1 -> +velocity, 2 -> +acceleration, 3 -> +jerk.
    fn compute(&self, order: usize, target: NodeId, center: NodeId, epoch: Epoch) -> Result<Vec<Vector3<f64>>, PointError>;
}

/// Converts engine epochs to the time scale a query actually needs (typically TDB seconds past
/// J2000). Out of scope for this crate's implementation; see §1 of the accompanying design
/// documentation.
pub trait TimeProvider: Send + Sync {
    fn seconds_past_j2000_tdb(&self, epoch: Epoch) -> f64;
}

/// Supplies a planetary body's orientation DCM and its first two time derivatives, typically
/// backed by IAU precession-nutation series. Used by `Computable`/`Rotating`-style axes wiring
/// that wraps planetary orientation data; not implemented by this crate.
pub trait PlanetaryOrientation: Send + Sync {
    fn dcm(&self, epoch: Epoch) -> Matrix3<f64>;
    fn ddcm(&self, epoch: Epoch) -> Matrix3<f64>;
    fn d2dcm(&self, epoch: Epoch) -> Matrix3<f64>;
}
