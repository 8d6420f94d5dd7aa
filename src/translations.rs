/*
 * gnomon
 * Copyright (C) 2026 Gnomon contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! The points-side half of the transform evaluator (C7): walks the point graph's path between
//! two points, rotating each edge's locally-expressed state into the query's axes and summing
//! with sign according to traversal direction. Also owns the `update` entry point for Updatable
//! points, and the light-time fixed-point iteration.

use hifitime::{Epoch, Unit};
use log::{trace, warn};
use nalgebra::Vector3;

use crate::axes::AxesId;
use crate::constants::SPEED_OF_LIGHT_KM_S;
use crate::errors::{FrameError, PointError};
use crate::graph::Direction;
use crate::math::rot::MAX_ORDER;
use crate::math::state::StateN;
use crate::points::{PointId, PointNode, PointProducer};
use crate::system::FrameSystem;
use crate::NodeId;

impl FrameSystem {
    /// The accumulated state of `to` relative to `from`, expressed in `axes`, at `epoch`,
    /// populated up to order `K - 1`. `K` must not exceed this system's configured `max_order`.
    pub fn state<const K: usize>(&self, from: PointId, to: PointId, axes: AxesId, epoch: Epoch) -> Result<StateN<K>, FrameError> {
        if K > self.config.max_order {
            return Err(FrameError::OrderExceeded { requested: K, max: self.config.max_order });
        }
        self.state_at_order::<K>(from, to, axes, epoch, K)
    }

    /// Same walk as [`Self::state`], always at [`MAX_ORDER`] and without the `max_order` check.
    /// Used internally by `Computable` axes, which always need the full tower (through jerk) to
    /// build a two-vector triad regardless of what order the caller's own query asked for; an
    /// Updatable point along the path must have been stamped to the full order to feed one.
    pub(crate) fn state_full(&self, from: PointId, to: PointId, axes: AxesId, epoch: Epoch) -> Result<StateN<MAX_ORDER>, FrameError> {
        self.state_at_order::<MAX_ORDER>(from, to, axes, epoch, MAX_ORDER)
    }

    /// Shared walk for [`Self::state`] and [`Self::state_full`]. `required_order` is threaded
    /// down to Updatable points separately from `K` so that a plain `state::<K>` query only
    /// demands an Updatable writer to have stamped up to `K`, while the `state_full` path (used
    /// to feed a Computable axes triad) always demands the full order.
    fn state_at_order<const K: usize>(&self, from: PointId, to: PointId, axes: AxesId, epoch: Epoch, required_order: usize) -> Result<StateN<K>, FrameError> {
        let path = self.points.get_path(from, to).map_err(|source| FrameError::Point {
            action: "walking the point graph path",
            source: PointError::PointGraph {
                action: "walking the point graph path",
                source,
            },
        })?;

        let mut acc = StateN::<K>::zero();
        for step in path {
            let (local_axes, local_full) = self.point_edge_state(step.node, epoch, required_order)?;
            let local: StateN<K> = local_full.truncate();
            let rot = self.rotation_full(local_axes, axes, epoch)?.truncate::<K>();
            let rotated = local.rotate_by(&rot);
            acc = match step.direction {
                Direction::Down => acc + rotated,
                Direction::Up => acc - rotated,
            };
        }
        Ok(acc)
    }

    /// Evaluates one point node's own producer, caching by the calling thread's slot. Returns
    /// the node's declared axes and its "parent point -> this point" state tower. `required_order`
    /// is only enforced for Updatable points, whose cache holds exactly what an external writer
    /// stamped rather than something a producer can always synthesize on demand.
    fn point_edge_state(&self, id: PointId, epoch: Epoch, required_order: usize) -> Result<(NodeId, StateN<MAX_ORDER>), FrameError> {
        let node = self.points.get(id).map_err(|source| FrameError::Point {
            action: "resolving a point node along a state path",
            source: PointError::PointGraph {
                action: "resolving a point node along a state path",
                source,
            },
        })?;

        if matches!(node.producer, PointProducer::Updatable) {
            let slot = self.thread_index.index();
            let hit = node.cache.get(slot, epoch, required_order)?;
            return match hit {
                Some(value) => Ok((node.axes_id, value)),
                None => Err(FrameError::Point {
                    action: "reading an Updatable point",
                    source: PointError::NotUpdated { id, epoch },
                }),
            };
        }

        let slot = self.thread_index.index();
        if let Some(hit) = node.cache.get(slot, epoch, MAX_ORDER)? {
            trace!(target: "gnomon::translations", "point {id} cache hit at slot {slot}");
            return Ok((node.axes_id, hit));
        }

        trace!(target: "gnomon::translations", "point {id} producer invoked at epoch {epoch}");
        let value = self.point_producer_eval(node, epoch)?;
        node.cache.store(slot, epoch, MAX_ORDER, value)?;
        Ok((node.axes_id, value))
    }

    fn point_producer_eval(&self, node: &PointNode, epoch: Epoch) -> Result<StateN<MAX_ORDER>, FrameError> {
        let t = epoch.to_tdb_seconds();
        match &node.producer {
            PointProducer::Root => Ok(StateN::zero()),
            PointProducer::Fixed(offset) => {
                let mut vecs = [Vector3::zeros(); MAX_ORDER];
                vecs[0] = *offset;
                Ok(StateN::from_vecs(vecs))
            }
            PointProducer::Ephemeris(provider) => {
                let raw = provider.compute(MAX_ORDER - 1, node.id, node.parent_id, epoch).map_err(|source| FrameError::Point {
                    action: "querying an Ephemeris point's provider",
                    source,
                })?;
                let mut vecs = [Vector3::zeros(); MAX_ORDER];
                for (slot, v) in vecs.iter_mut().zip(raw.into_iter()) {
                    *slot = v;
                }
                Ok(StateN::from_vecs(vecs))
            }
            PointProducer::Updatable => unreachable!("Updatable points are handled by point_edge_state before reaching the producer"),
            PointProducer::Dynamical(f) => {
                let (v0, v1, v2, v3) = f.d3(t);
                Ok(StateN::from_vecs([v0, v1, v2, v3]))
            }
        }
    }

    /// Stamps an Updatable point's cache slot with an externally computed state, valid only for
    /// the exact `epoch` it was written at and at orders up to `K - 1`. Per-thread: each writer
    /// thread stamps its own slot, mirroring how readers only ever consult their own slot.
    pub fn update<const K: usize>(&self, point: PointId, state: StateN<K>, epoch: Epoch) -> Result<(), FrameError> {
        let node = self.points.get(point).map_err(|source| FrameError::Point {
            action: "writing to an Updatable point",
            source: PointError::PointGraph {
                action: "writing to an Updatable point",
                source,
            },
        })?;
        let mut vecs = [Vector3::zeros(); MAX_ORDER];
        for (slot, v) in vecs.iter_mut().zip(state.vecs.into_iter()) {
            *slot = v;
        }
        let slot = self.thread_index.index();
        node.cache.store(slot, epoch, K, StateN::from_vecs(vecs))?;
        Ok(())
    }

    /// Solves `t_emit = t_recv - ||r(t_emit)|| / c` by fixed-point iteration, returning the
    /// converged emission epoch. `r` is re-evaluated each iteration as the position of `target`
    /// relative to `observer` in `axes` at the current trial epoch.
    pub fn light_time_emission_epoch(&self, observer: PointId, target: PointId, axes: AxesId, t_recv: Epoch) -> Result<Epoch, FrameError> {
        let tol = Unit::Second * self.config.light_time_tolerance_s;
        let mut t_emit = t_recv;
        for _ in 0..self.config.light_time_max_iterations {
            let r = self.state::<1>(observer, target, axes, t_emit)?;
            let delay_s = r.position().norm() / SPEED_OF_LIGHT_KM_S;
            let next = t_recv - Unit::Second * delay_s;
            if (next - t_emit).abs() < tol {
                return Ok(next);
            }
            t_emit = next;
        }
        warn!(target: "gnomon::translations", "light-time iteration from {observer} to {target} failed to converge within {} iterations", self.config.light_time_max_iterations);
        Err(FrameError::LightTimeNoConverge {
            from: observer,
            to: target,
            max_iterations: self.config.light_time_max_iterations,
            tolerance_s: self.config.light_time_tolerance_s,
        })
    }
}

#[cfg(test)]
mod ut_translations {
    use super::*;
    use crate::points::{generic_point_fn, GenericPointFn};
    use crate::system::{FrameSystem, FrameSystemConfig};
    use approx::assert_relative_eq;

    const ICRF: AxesId = 1;
    const SSB: PointId = 0;

    fn epoch_at(t: f64) -> Epoch {
        Epoch::from_tdb_seconds(t)
    }

    fn base_system(max_order: usize) -> FrameSystem {
        let mut sys = FrameSystem::new(FrameSystemConfig { max_order, ..Default::default() });
        sys.add_inertial(ICRF, "ICRF", None, None).unwrap();
        sys.add_root(SSB, "SSB", ICRF).unwrap();
        sys
    }

    #[test]
    fn state_of_a_point_relative_to_itself_is_zero() {
        let sys = base_system(1);
        let s = sys.state::<1>(SSB, SSB, ICRF, epoch_at(0.0)).unwrap();
        assert_relative_eq!(s.position(), Vector3::zeros(), epsilon = 1e-12);
    }

    #[test]
    fn fixed_point_state_reverses_sign_when_observer_and_target_swap() {
        let mut sys = base_system(1);
        sys.add_fixed(10, "Target", SSB, ICRF, Vector3::new(1.0, 2.0, 3.0)).unwrap();
        let fwd = sys.state::<1>(SSB, 10, ICRF, epoch_at(0.0)).unwrap();
        let bwd = sys.state::<1>(10, SSB, ICRF, epoch_at(0.0)).unwrap();
        assert_relative_eq!(fwd.position(), -bwd.position(), epsilon = 1e-12);
    }

    struct CircularOrbit;
    impl GenericPointFn for CircularOrbit {
        fn eval<T: crate::math::dual::DualScalar>(&self, t: T) -> Vector3<T> {
            Vector3::new(t.cos(), t.sin(), T::constant(0.0))
        }
    }

    #[test]
    fn dynamical_point_velocity_matches_closed_form() {
        let mut sys = base_system(2);
        sys.add_dynamical(10, "Orbiter", SSB, ICRF, generic_point_fn(CircularOrbit)).unwrap();
        let t = std::f64::consts::FRAC_PI_6;
        let s = sys.state::<2>(SSB, 10, ICRF, epoch_at(t)).unwrap();
        assert_relative_eq!(s.vecs[0], Vector3::new(t.cos(), t.sin(), 0.0), epsilon = 1e-9);
        assert_relative_eq!(s.vecs[1], Vector3::new(-t.sin(), t.cos(), 0.0), epsilon = 1e-9);
    }

    #[test]
    fn updatable_point_returns_written_state_only_at_the_written_epoch() {
        let mut sys = base_system(2);
        sys.add_updatable(10, "Spacecraft", SSB, ICRF).unwrap();
        let written = StateN::<2>::from_vecs([Vector3::new(10_000.0, 200.0, 300.0), Vector3::zeros()]);
        sys.update::<2>(10, written, epoch_at(0.1)).unwrap();

        let hit = sys.state::<2>(SSB, 10, ICRF, epoch_at(0.1)).unwrap();
        assert_relative_eq!(hit.vecs[0], written.vecs[0], epsilon = 1e-12);

        let miss = sys.state::<2>(SSB, 10, ICRF, epoch_at(0.2));
        assert!(matches!(miss, Err(FrameError::Point { source: PointError::NotUpdated { .. }, .. })));
    }

    #[test]
    fn light_time_converges_for_a_stationary_target() {
        let mut sys = base_system(1);
        sys.add_fixed(10, "Target", SSB, ICRF, Vector3::new(1_000_000.0, 0.0, 0.0)).unwrap();
        let t_recv = epoch_at(1_000.0);
        let t_emit = sys.light_time_emission_epoch(SSB, 10, ICRF, t_recv).unwrap();
        assert!(t_emit < t_recv);
        let expected_delay = 1_000_000.0 / SPEED_OF_LIGHT_KM_S;
        assert_relative_eq!((t_recv - t_emit).to_seconds(), expected_delay, epsilon = 1e-6);
    }
}
