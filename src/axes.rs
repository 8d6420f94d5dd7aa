/*
 * gnomon
 * Copyright (C) 2026 Gnomon contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! The axes subsystem (C5): nodes of the rotation graph, their registration, and their
//! producers. Evaluation (walking a path and composing producers) lives in
//! [`crate::rotations`], which is what actually answers `rotation<K>` queries; this module only
//! owns node storage and the registration calls.

use log::debug;

use crate::cache::ThreadCache;
use crate::errors::{AxesError, GraphError, MathError, PointError};
use crate::math::dual::{d1_mat, d2_mat, d3_mat, DualScalar};
use crate::math::rot::{Rot, MAX_ORDER};
use crate::math::rotation::DCM;
use crate::math::two_vector::TriadAxis;
use crate::system::FrameSystem;
use crate::NodeId;
use nalgebra::Matrix3;

pub type AxesId = NodeId;

/// The state-production semantics of an axes node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AxesClass {
    Inertial,
    FixedOffset,
    Rotating,
    Computable,
}

/// A pair of points whose relative state (pulled from the point graph) the `Computable` class
/// uses as one of its two defining vectors, plus the maximum derivative order this descriptor is
/// expected to supply (validated against the system's configured order at registration).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ComputableAxesVector {
    pub from: NodeId,
    pub to: NodeId,
    pub order: usize,
}

/// A generic (dual-number-differentiable) time-to-DCM function. Implementors write `eval` once,
/// generic over [`DualScalar`]; [`ErasedDcmFn`] (object-safe, blanket-implemented below) is what
/// actually gets stored in a `Rotating` axes node, since trait objects cannot have generic
/// methods.
pub trait GenericDcmFn: Send + Sync {
    fn eval<T: DualScalar>(&self, t: T) -> Matrix3<T>;
}

pub(crate) trait ErasedDcmFn: Send + Sync {
    fn value(&self, t: f64) -> Matrix3<f64>;
    fn d1(&self, t: f64) -> (Matrix3<f64>, Matrix3<f64>);
    fn d2(&self, t: f64) -> (Matrix3<f64>, Matrix3<f64>, Matrix3<f64>);
    fn d3(&self, t: f64) -> (Matrix3<f64>, Matrix3<f64>, Matrix3<f64>, Matrix3<f64>);
}

impl<F: GenericDcmFn> ErasedDcmFn for F {
    fn value(&self, t: f64) -> Matrix3<f64> {
        self.eval(t)
    }
    fn d1(&self, t: f64) -> (Matrix3<f64>, Matrix3<f64>) {
        d1_mat(|x| self.eval(x), t)
    }
    fn d2(&self, t: f64) -> (Matrix3<f64>, Matrix3<f64>, Matrix3<f64>) {
        d2_mat(|x| self.eval(x), t)
    }
    fn d3(&self, t: f64) -> (Matrix3<f64>, Matrix3<f64>, Matrix3<f64>, Matrix3<f64>) {
        d3_mat(|x| self.eval(x), t)
    }
}

/// Wraps a [`GenericDcmFn`] for storage in a `Rotating` axes node.
pub fn generic_dcm_fn<F: GenericDcmFn + 'static>(f: F) -> Box<dyn ErasedDcmFn> {
    Box::new(f)
}

pub(crate) enum AxesProducer {
    Identity,
    ConstDcm(DCM),
    Rotating(Box<dyn ErasedDcmFn>),
    Computable {
        v1: ComputableAxesVector,
        v2: ComputableAxesVector,
        seq: (TriadAxis, TriadAxis),
    },
}

pub(crate) struct AxesNode {
    pub id: NodeId,
    pub name: &'static str,
    pub class: AxesClass,
    pub parent_id: NodeId,
    pub producer: AxesProducer,
    pub cache: ThreadCache<Rot<MAX_ORDER>>,
}

fn wrap_graph_err(action: &'static str) -> impl Fn(GraphError) -> AxesError {
    move |source| AxesError::AxesGraph { action, source }
}

impl FrameSystem {
    /// Registers the axes graph's unique inertial root (`parent`/`dcm` both `None`), or an
    /// Inertial child of another Inertial node (`parent`/`dcm` both `Some`).
    pub fn add_inertial(&mut self, id: AxesId, name: &'static str, parent: Option<AxesId>, dcm: Option<DCM>) -> Result<(), AxesError> {
        let producer = match (parent, dcm) {
            (None, None) => AxesProducer::Identity,
            (Some(p), Some(d)) => {
                let parent_node = self.axes.get(p).map_err(wrap_graph_err("resolving the parent of an Inertial axes node"))?;
                if parent_node.class != AxesClass::Inertial {
                    return Err(AxesError::InvalidParent { id: p });
                }
                AxesProducer::ConstDcm(d)
            }
            _ => return Err(AxesError::MissingDcm { id }),
        };
        debug!(target: "gnomon::axes", "registering Inertial axes {id} ({name})");
        let node = AxesNode {
            id,
            name,
            class: AxesClass::Inertial,
            parent_id: parent.unwrap_or(id),
            producer,
            cache: ThreadCache::new(self.config.worker_threads),
        };
        self.axes.add_vertex(id, name, parent, node).map_err(wrap_graph_err("registering an Inertial axes node"))
    }

    pub fn add_fixed_offset(&mut self, id: AxesId, name: &'static str, parent: AxesId, dcm: DCM) -> Result<(), AxesError> {
        debug!(target: "gnomon::axes", "registering FixedOffset axes {id} ({name}) parent={parent}");
        let node = AxesNode {
            id,
            name,
            class: AxesClass::FixedOffset,
            parent_id: parent,
            producer: AxesProducer::ConstDcm(dcm),
            cache: ThreadCache::new(self.config.worker_threads),
        };
        self.axes
            .add_vertex(id, name, Some(parent), node)
            .map_err(wrap_graph_err("registering a FixedOffset axes node"))
    }

    pub fn add_rotating(&mut self, id: AxesId, name: &'static str, parent: AxesId, f: Box<dyn ErasedDcmFn>) -> Result<(), AxesError> {
        debug!(target: "gnomon::axes", "registering Rotating axes {id} ({name}) parent={parent}");
        let node = AxesNode {
            id,
            name,
            class: AxesClass::Rotating,
            parent_id: parent,
            producer: AxesProducer::Rotating(f),
            cache: ThreadCache::new(self.config.worker_threads),
        };
        self.axes.add_vertex(id, name, Some(parent), node).map_err(wrap_graph_err("registering a Rotating axes node"))
    }

    pub fn add_computable(
        &mut self,
        id: AxesId,
        name: &'static str,
        parent: AxesId,
        v1: ComputableAxesVector,
        v2: ComputableAxesVector,
        seq: (TriadAxis, TriadAxis),
    ) -> Result<(), AxesError> {
        if seq.0 == seq.1 {
            return Err(AxesError::AxesMath {
                action: "validating a Computable axes two-vector sequence",
                source: MathError::DegenerateVectors {
                    action: "primary and secondary axis assignments must differ",
                },
            });
        }
        for pt in [v1.from, v1.to, v2.from, v2.to] {
            if !self.points.has_vertex(pt) {
                return Err(AxesError::AxesPoint {
                    action: "resolving Computable axes vector descriptors",
                    source: Box::new(PointError::PointGraph {
                        action: "looking up a Computable axes descriptor point",
                        source: GraphError::UnknownNode { id: pt },
                    }),
                });
            }
        }
        debug!(target: "gnomon::axes", "registering Computable axes {id} ({name}) parent={parent}");
        let node = AxesNode {
            id,
            name,
            class: AxesClass::Computable,
            parent_id: parent,
            producer: AxesProducer::Computable { v1, v2, seq },
            cache: ThreadCache::new(self.config.worker_threads),
        };
        self.axes
            .add_vertex(id, name, Some(parent), node)
            .map_err(wrap_graph_err("registering a Computable axes node"))
    }
}
