/*
 * gnomon
 * Copyright (C) 2026 Gnomon contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! The axes-side half of the transform evaluator (C7): walks the axes graph's path between two
//! axes nodes, composing each edge's rotation (or its inverse, depending on traversal direction)
//! via [`crate::graph::Direction`].

use hifitime::Epoch;
use log::trace;
use nalgebra::Matrix3;

use crate::axes::{AxesId, AxesNode, AxesProducer};
use crate::errors::{AxesError, FrameError};
use crate::graph::Direction;
use crate::math::rot::{Rot, MAX_ORDER};
use crate::math::two_vector;
use crate::system::FrameSystem;

impl FrameSystem {
    /// The composed rotation carrying vectors expressed in `from` axes into `to` axes at
    /// `epoch`, populated up to order `K - 1`. `K` must not exceed this system's configured
    /// `max_order`.
    pub fn rotation<const K: usize>(&self, from: AxesId, to: AxesId, epoch: Epoch) -> Result<Rot<K>, FrameError> {
        if K > self.config.max_order {
            return Err(FrameError::OrderExceeded { requested: K, max: self.config.max_order });
        }
        Ok(self.rotation_full(from, to, epoch)?.truncate::<K>())
    }

    /// Same walk as [`Self::rotation`], always materialized at [`MAX_ORDER`] and without the
    /// `max_order` check against the caller's requested order. Used internally (by `Computable`
    /// axes and by the point-side evaluator) to rotate a fully-populated tower or state, since
    /// those call sites are plumbing, not a caller-facing order request.
    pub(crate) fn rotation_full(&self, from: AxesId, to: AxesId, epoch: Epoch) -> Result<Rot<MAX_ORDER>, FrameError> {
        let path = self.axes.get_path(from, to).map_err(|source| FrameError::Axes {
            action: "walking the axes graph path",
            source: AxesError::AxesGraph {
                action: "walking the axes graph path",
                source,
            },
        })?;

        let mut acc = Rot::<MAX_ORDER>::identity();
        for step in path {
            let edge = self.axes_edge_rot(step.node, epoch)?;
            let edge = match step.direction {
                Direction::Down => edge,
                Direction::Up => edge.transpose(),
            };
            acc = edge.compose(&acc);
        }
        Ok(acc)
    }

    /// Evaluates one axes node's own producer (not the accumulated path), caching by the calling
    /// thread's slot. Returns the "parent axes -> this node's axes" tower, always at full
    /// [`MAX_ORDER`]; callers truncate to whatever order they actually need.
    fn axes_edge_rot(&self, id: AxesId, epoch: Epoch) -> Result<Rot<MAX_ORDER>, FrameError> {
        let node = self.axes.get(id).map_err(|source| FrameError::Axes {
            action: "resolving an axes node along a rotation path",
            source: AxesError::AxesGraph {
                action: "resolving an axes node along a rotation path",
                source,
            },
        })?;

        let slot = self.thread_index.index();
        if let Some(hit) = node.cache.get(slot, epoch, MAX_ORDER)? {
            trace!(target: "gnomon::rotations", "axes {id} cache hit at slot {slot}");
            return Ok(hit);
        }

        trace!(target: "gnomon::rotations", "axes {id} producer invoked at epoch {epoch}");
        let value = self.axes_producer_eval(node, epoch)?;
        node.cache.store(slot, epoch, MAX_ORDER, value)?;
        Ok(value)
    }

    fn axes_producer_eval(&self, node: &AxesNode, epoch: Epoch) -> Result<Rot<MAX_ORDER>, FrameError> {
        let t = epoch.to_tdb_seconds();
        match &node.producer {
            AxesProducer::Identity => Ok(Rot::identity()),
            AxesProducer::ConstDcm(dcm) => {
                let mut mats = [Matrix3::zeros(); MAX_ORDER];
                mats[0] = dcm.0;
                Ok(Rot::from_mats(mats))
            }
            AxesProducer::Rotating(f) => {
                let (m0, m1, m2, m3) = f.d3(t);
                Ok(Rot::from_mats([m0, m1, m2, m3]))
            }
            AxesProducer::Computable { v1, v2, seq } => {
                let parent_axes = node.parent_id;
                let s1 = self.state_full(v1.from, v1.to, parent_axes, epoch)?;
                let s2 = self.state_full(v2.from, v2.to, parent_axes, epoch)?;
                let primary = (s1.vecs[0], s1.vecs[1], s1.vecs[2], s1.vecs[3]);
                let secondary = (s2.vecs[0], s2.vecs[1], s2.vecs[2], s2.vecs[3]);
                two_vector::rot12(primary, secondary, seq.0, seq.1).map_err(|source| FrameError::Axes {
                    action: "evaluating a Computable axes two-vector triad",
                    source: AxesError::AxesMath {
                        action: "evaluating a Computable axes two-vector triad",
                        source,
                    },
                })
            }
        }
    }
}

#[cfg(test)]
mod ut_rotations {
    use super::*;
    use crate::axes::{generic_dcm_fn, ComputableAxesVector, GenericDcmFn};
    use crate::math::dual::DualScalar;
    use crate::math::rotation::{angle_to_dcm_generic, Axis, RotationSequence};
    use crate::math::two_vector::TriadAxis;
    use crate::system::FrameSystem;
    use hifitime::Epoch;
    use nalgebra::Vector3;
    use std::f64::consts::PI;

    const ICRF: AxesId = 1;
    const ECLIP: AxesId = 2;
    const SSB: crate::NodeId = 0;

    fn epoch0() -> Epoch {
        Epoch::from_tdb_seconds(0.0)
    }

    #[test]
    fn rotation_to_self_is_identity_at_every_order() {
        let mut sys = FrameSystem::new(crate::system::FrameSystemConfig { max_order: 4, ..Default::default() });
        sys.add_inertial(ICRF, "ICRF", None, None).unwrap();
        let r = sys.rotation::<4>(ICRF, ICRF, epoch0()).unwrap();
        for m in r.mats {
            assert!((m - Matrix3::identity()).abs().max() < 1e-12);
        }
    }

    #[test]
    fn fixed_offset_rotation_inverts_when_walked_up() {
        let mut sys = FrameSystem::default();
        sys.add_inertial(ICRF, "ICRF", None, None).unwrap();
        let theta = PI / 3.0;
        let dcm = crate::math::rotation::angle_to_dcm(&[theta], RotationSequence::Single(Axis::Z)).unwrap();
        sys.add_fixed_offset(ECLIP, "ECLIPJ2000", ICRF, dcm).unwrap();

        let down = sys.rotation::<1>(ICRF, ECLIP, epoch0()).unwrap();
        assert!((down.mats[0] - dcm.0).abs().max() < 1e-12);

        let up = sys.rotation::<1>(ECLIP, ICRF, epoch0()).unwrap();
        assert!((up.mats[0] - dcm.0.transpose()).abs().max() < 1e-10);
    }

    struct SpinningZ;
    impl GenericDcmFn for SpinningZ {
        fn eval<T: DualScalar>(&self, t: T) -> Matrix3<T> {
            let thetas = [t];
            angle_to_dcm_generic(&thetas, RotationSequence::Single(Axis::Z)).expect("single-axis sequence is always valid")
        }
    }

    #[test]
    fn rotating_axes_first_derivative_matches_closed_form() {
        let mut sys = FrameSystem::new(crate::system::FrameSystemConfig { max_order: 2, ..Default::default() });
        sys.add_inertial(ICRF, "ICRF", None, None).unwrap();
        sys.add_rotating(ECLIP, "Synodic", ICRF, generic_dcm_fn(SpinningZ)).unwrap();

        let t = PI / 6.0;
        let epoch = Epoch::from_tdb_seconds(t);
        let r = sys.rotation::<2>(ICRF, ECLIP, epoch).unwrap();
        let (_, expected_rate) = crate::math::rotation::angle_to_ddcm(&[(t, 1.0)], RotationSequence::Single(Axis::Z)).unwrap();
        assert!((r.mats[1] - expected_rate).abs().max() < 1e-9);
    }

    #[test]
    fn query_above_configured_order_is_rejected() {
        let mut sys = FrameSystem::new(crate::system::FrameSystemConfig { max_order: 1, ..Default::default() });
        sys.add_inertial(ICRF, "ICRF", None, None).unwrap();
        let err = sys.rotation::<2>(ICRF, ICRF, epoch0()).unwrap_err();
        assert!(matches!(err, FrameError::OrderExceeded { requested: 2, max: 1 }));
    }

    #[test]
    fn computable_axes_builds_triad_from_point_states() {
        let mut sys = FrameSystem::new(crate::system::FrameSystemConfig { max_order: 4, ..Default::default() });
        sys.add_inertial(ICRF, "ICRF", None, None).unwrap();
        sys.add_root(SSB, "SSB", ICRF).unwrap();
        sys.add_fixed(10, "PrimaryTarget", SSB, ICRF, Vector3::new(1.0, 0.0, 0.0)).unwrap();
        sys.add_fixed(11, "SecondaryTarget", SSB, ICRF, Vector3::new(0.0, 1.0, 0.0)).unwrap();

        let v1 = ComputableAxesVector { from: SSB, to: 10, order: 4 };
        let v2 = ComputableAxesVector { from: SSB, to: 11, order: 4 };
        sys.add_computable(20, "TwoVectorFrame", ICRF, v1, v2, (TriadAxis::X, TriadAxis::Y)).unwrap();

        let r = sys.rotation::<1>(ICRF, 20, epoch0()).unwrap();
        let m = r.mats[0];
        assert!((m * m.transpose() - Matrix3::identity()).abs().max() < 1e-9);
    }
}
