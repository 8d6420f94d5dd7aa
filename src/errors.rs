/*
 * gnomon
 * Copyright (C) 2026 Gnomon contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use hifitime::Epoch;
use snafu::prelude::*;

use crate::NodeId;

/// Errors raised while evaluating the rotation kernel (C1): DCM construction,
/// Euler angle sequences, and the two-vectors frame construction.
#[derive(Copy, Clone, Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum MathError {
    #[snafu(display("`{seq}` is not a valid rotation sequence for {action}"))]
    InvalidSequence { seq: &'static str, action: &'static str },
    #[snafu(display("{action} requires {expected} components but got {got}"))]
    DimensionMismatch {
        action: &'static str,
        expected: usize,
        got: usize,
    },
    #[snafu(display("cannot construct a two-vectors frame: {action}"))]
    DegenerateVectors { action: &'static str },
}

/// Errors raised while walking or mutating the mapped graph (C4).
#[derive(Copy, Clone, Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum GraphError {
    #[snafu(display("node id {id} is already registered"))]
    DuplicateId { id: NodeId },
    #[snafu(display("name `{name}` is already registered"))]
    DuplicateName { name: &'static str },
    #[snafu(display("node id {id} is not registered"))]
    UnknownNode { id: NodeId },
    #[snafu(display("no path exists between node {from} and node {to}"))]
    Disjoint { from: NodeId, to: NodeId },
    #[snafu(display(
        "graph depth exceeded {max_depth} hops while searching for a path from {from} to {to}; this indicates a cycle"
    ))]
    MaxDepthExceeded {
        from: NodeId,
        to: NodeId,
        max_depth: usize,
    },
}

/// Errors specific to axes-node registration and evaluation (C5).
#[derive(Clone, Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AxesError {
    #[snafu(display("while {action}, {source}"))]
    AxesGraph {
        action: &'static str,
        source: GraphError,
    },
    #[snafu(display("axes {id} must be a registered Inertial node to parent another Inertial node"))]
    InvalidParent { id: NodeId },
    #[snafu(display("axes {id} is FixedOffset or Inertial and requires a DCM at registration"))]
    MissingDcm { id: NodeId },
    #[snafu(display("while {action}, {source}"))]
    AxesMath {
        action: &'static str,
        source: MathError,
    },
    #[snafu(display("while {action}, {source}"))]
    AxesPoint {
        action: &'static str,
        #[snafu(source(from(PointError, Box::new)))]
        source: Box<PointError>,
    },
}

/// Errors specific to point-node registration and evaluation (C6).
#[derive(Copy, Clone, Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PointError {
    #[snafu(display("while {action}, {source}"))]
    PointGraph {
        action: &'static str,
        source: GraphError,
    },
    #[snafu(display("a point graph may only have one Root point, but one is already registered as {existing}"))]
    DuplicateRoot { existing: NodeId },
    #[snafu(display("ephemeris provider reports {count} distinct (center, axes) pairs for target {target}, expected exactly one"))]
    AmbiguousEphemeris { target: NodeId, count: usize },
    #[snafu(display("ephemeris provider has no data for target {target}"))]
    UnknownEphemerisTarget { target: NodeId },
    #[snafu(display(
        "point {id} is Updatable but has not been written at epoch {epoch} (or was written at a different epoch)"
    ))]
    NotUpdated { id: NodeId, epoch: Epoch },
    #[snafu(display("external ephemeris provider could not satisfy epoch {epoch} for target {target}: {detail}"))]
    DataGap {
        target: NodeId,
        epoch: Epoch,
        detail: &'static str,
    },
    #[snafu(display("while {action}, {source}"))]
    PointMath {
        action: &'static str,
        source: MathError,
    },
}

/// Top-level error returned by [`crate::FrameSystem`] queries and registration calls.
#[derive(Clone, Debug, PartialEq, Snafu)]
#[snafu(visibility(pub))]
pub enum FrameError {
    #[snafu(display("while {action}, {source}"))]
    Axes {
        action: &'static str,
        source: AxesError,
    },
    #[snafu(display("while {action}, {source}"))]
    Point {
        action: &'static str,
        source: PointError,
    },
    #[snafu(display("requested derivative order {requested} exceeds this system's configured order {max}"))]
    OrderExceeded { requested: usize, max: usize },
    #[snafu(display(
        "light-time iteration from {from} to {to} did not converge to {tolerance_s}s within {max_iterations} iterations"
    ))]
    LightTimeNoConverge {
        from: NodeId,
        to: NodeId,
        max_iterations: usize,
        tolerance_s: f64,
    },
    #[snafu(display("thread index {index} exceeds the configured worker-thread count {capacity}"))]
    ThreadCapacityExceeded { index: usize, capacity: usize },
}

pub type FrameResult<T> = Result<T, FrameError>;
