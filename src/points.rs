/*
 * gnomon
 * Copyright (C) 2026 Gnomon contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! The points subsystem (C6): nodes of the translation graph, their registration, and their
//! producers. Evaluation lives in [`crate::translations`].

use std::collections::HashSet;
use std::sync::Arc;

use log::debug;
use nalgebra::Vector3;

use crate::cache::ThreadCache;
use crate::collaborators::EphemerisProvider;
use crate::errors::{GraphError, PointError};
use crate::math::dual::{d1, d2, d3, DualScalar};
use crate::math::rot::MAX_ORDER;
use crate::math::state::StateN;
use crate::system::FrameSystem;
use crate::NodeId;

pub type PointId = NodeId;

/// The state-production semantics of a point node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PointClass {
    Root,
    Fixed,
    Ephemeris,
    Updatable,
    Dynamical,
}

/// A generic (dual-number-differentiable) time-to-position function, analogous to
/// [`crate::axes::GenericDcmFn`] but for a Dynamical point's position rather than a Rotating
/// axes' DCM.
pub trait GenericPointFn: Send + Sync {
    fn eval<T: DualScalar>(&self, t: T) -> Vector3<T>;
}

pub(crate) trait ErasedPointFn: Send + Sync {
    fn value(&self, t: f64) -> Vector3<f64>;
    fn d1(&self, t: f64) -> (Vector3<f64>, Vector3<f64>);
    fn d2(&self, t: f64) -> (Vector3<f64>, Vector3<f64>, Vector3<f64>);
    fn d3(&self, t: f64) -> (Vector3<f64>, Vector3<f64>, Vector3<f64>, Vector3<f64>);
}

/// Dual-number scalars are seeded identically across all three `Vector3` components before
/// being handed to a [`GenericPointFn`], so reading any single component back out (here `.x`)
/// recovers the scalar-in, vector-out derivative the C8 entry points were built for.
impl<F: GenericPointFn> ErasedPointFn for F {
    fn value(&self, t: f64) -> Vector3<f64> {
        self.eval(t)
    }
    fn d1(&self, t: f64) -> (Vector3<f64>, Vector3<f64>) {
        d1(|v| self.eval(v.x), t)
    }
    fn d2(&self, t: f64) -> (Vector3<f64>, Vector3<f64>, Vector3<f64>) {
        d2(|v| self.eval(v.x), t)
    }
    fn d3(&self, t: f64) -> (Vector3<f64>, Vector3<f64>, Vector3<f64>, Vector3<f64>) {
        d3(|v| self.eval(v.x), t)
    }
}

/// Wraps a [`GenericPointFn`] for storage in a `Dynamical` point node.
pub fn generic_point_fn<F: GenericPointFn + 'static>(f: F) -> Box<dyn ErasedPointFn> {
    Box::new(f)
}

pub(crate) enum PointProducer {
    Root,
    Fixed(Vector3<f64>),
    Ephemeris(Arc<dyn EphemerisProvider>),
    Updatable,
    Dynamical(Box<dyn ErasedPointFn>),
}

pub(crate) struct PointNode {
    pub id: NodeId,
    pub name: &'static str,
    pub class: PointClass,
    pub parent_id: NodeId,
    pub axes_id: NodeId,
    pub producer: PointProducer,
    pub cache: ThreadCache<StateN<MAX_ORDER>>,
}

fn wrap_graph_err(action: &'static str) -> impl Fn(GraphError) -> PointError {
    move |source| PointError::PointGraph { action, source }
}

impl FrameSystem {
    /// Registers the unique root of the point graph.
    pub fn add_root(&mut self, id: PointId, name: &'static str, axes_id: NodeId) -> Result<(), PointError> {
        if let Some(existing) = self.points.root() {
            return Err(PointError::DuplicateRoot { existing });
        }
        if !self.axes.has_vertex(axes_id) {
            return Err(PointError::PointGraph {
                action: "resolving the axes of a Root point",
                source: GraphError::UnknownNode { id: axes_id },
            });
        }
        debug!(target: "gnomon::points", "registering Root point {id} ({name})");
        let node = PointNode {
            id,
            name,
            class: PointClass::Root,
            parent_id: id,
            axes_id,
            producer: PointProducer::Root,
            cache: ThreadCache::new(self.config.worker_threads),
        };
        self.points.add_vertex(id, name, None, node).map_err(wrap_graph_err("registering a Root point"))
    }

    pub fn add_fixed(&mut self, id: PointId, name: &'static str, parent: PointId, axes_id: NodeId, offset: Vector3<f64>) -> Result<(), PointError> {
        if !self.axes.has_vertex(axes_id) {
            return Err(PointError::PointGraph {
                action: "resolving the axes of a Fixed point",
                source: GraphError::UnknownNode { id: axes_id },
            });
        }
        debug!(target: "gnomon::points", "registering Fixed point {id} ({name}) parent={parent}");
        let node = PointNode {
            id,
            name,
            class: PointClass::Fixed,
            parent_id: parent,
            axes_id,
            producer: PointProducer::Fixed(offset),
            cache: ThreadCache::new(self.config.worker_threads),
        };
        self.points
            .add_vertex(id, name, Some(parent), node)
            .map_err(wrap_graph_err("registering a Fixed point"))
    }

    /// Discovers `id`'s center and axes from `provider`'s advertised records rather than taking
    /// them as parameters; fails with `AmbiguousEphemeris` if the provider reports more than one
    /// distinct `(center, axes)` pair for the same target.
    pub fn add_ephemeris(&mut self, id: PointId, name: &'static str, provider: Arc<dyn EphemerisProvider>) -> Result<(), PointError> {
        let records: Vec<_> = provider.position_records().into_iter().filter(|r| r.target == id).collect();
        if records.is_empty() {
            return Err(PointError::UnknownEphemerisTarget { target: id });
        }
        let distinct: HashSet<(NodeId, NodeId)> = records.iter().map(|r| (r.center, r.axes)).collect();
        if distinct.len() > 1 {
            return Err(PointError::AmbiguousEphemeris { target: id, count: distinct.len() });
        }
        let record = records[0];
        if !self.points.has_vertex(record.center) {
            return Err(PointError::PointGraph {
                action: "resolving the center of an Ephemeris point",
                source: GraphError::UnknownNode { id: record.center },
            });
        }
        if !self.axes.has_vertex(record.axes) {
            return Err(PointError::PointGraph {
                action: "resolving the axes of an Ephemeris point",
                source: GraphError::UnknownNode { id: record.axes },
            });
        }
        debug!(target: "gnomon::points", "registering Ephemeris point {id} ({name}) center={}", record.center);
        let node = PointNode {
            id,
            name,
            class: PointClass::Ephemeris,
            parent_id: record.center,
            axes_id: record.axes,
            producer: PointProducer::Ephemeris(provider),
            cache: ThreadCache::new(self.config.worker_threads),
        };
        self.points
            .add_vertex(id, name, Some(record.center), node)
            .map_err(wrap_graph_err("registering an Ephemeris point"))
    }

    pub fn add_updatable(&mut self, id: PointId, name: &'static str, parent: PointId, axes_id: NodeId) -> Result<(), PointError> {
        if !self.axes.has_vertex(axes_id) {
            return Err(PointError::PointGraph {
                action: "resolving the axes of an Updatable point",
                source: GraphError::UnknownNode { id: axes_id },
            });
        }
        debug!(target: "gnomon::points", "registering Updatable point {id} ({name}) parent={parent}");
        let node = PointNode {
            id,
            name,
            class: PointClass::Updatable,
            parent_id: parent,
            axes_id,
            producer: PointProducer::Updatable,
            cache: ThreadCache::new(self.config.worker_threads),
        };
        self.points
            .add_vertex(id, name, Some(parent), node)
            .map_err(wrap_graph_err("registering an Updatable point"))
    }

    pub fn add_dynamical(&mut self, id: PointId, name: &'static str, parent: PointId, axes_id: NodeId, f: Box<dyn ErasedPointFn>) -> Result<(), PointError> {
        if !self.axes.has_vertex(axes_id) {
            return Err(PointError::PointGraph {
                action: "resolving the axes of a Dynamical point",
                source: GraphError::UnknownNode { id: axes_id },
            });
        }
        debug!(target: "gnomon::points", "registering Dynamical point {id} ({name}) parent={parent}");
        let node = PointNode {
            id,
            name,
            class: PointClass::Dynamical,
            parent_id: parent,
            axes_id,
            producer: PointProducer::Dynamical(f),
            cache: ThreadCache::new(self.config.worker_threads),
        };
        self.points
            .add_vertex(id, name, Some(parent), node)
            .map_err(wrap_graph_err("registering a Dynamical point"))
    }
}
