/*
 * gnomon
 * Copyright (C) 2026 Gnomon contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! [`FrameSystem`]: the engine's single entry point, owning the axes graph, the point graph,
//! and the per-thread evaluation caches. Registration methods live on `impl FrameSystem` blocks
//! spread across [`crate::axes`] and [`crate::points`]; queries live in [`crate::rotations`] and
//! [`crate::translations`].

use crate::axes::AxesNode;
use crate::graph::MappedGraph;
use crate::points::PointNode;
use crate::thread_index::{AutoThreadIndex, ThreadIndex};

/// Tunables fixed at construction time and consulted by every registration and query call.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameSystemConfig {
    /// Highest derivative order (1..=4, see [`crate::math::rot::MAX_ORDER`]) this system will
    /// ever materialize for a query. Producers still compute into the fixed-size `Rot<MAX_ORDER>`
    /// / `StateN<MAX_ORDER>` internally; this only bounds what `rotation`/`state` will hand back
    /// before raising `OrderExceeded`.
    pub max_order: usize,
    /// Size of each node's per-thread cache; callers with more concurrent evaluator threads than
    /// this will see `ThreadCapacityExceeded` once their `ThreadIndex` hands out an index that
    /// doesn't fit.
    pub worker_threads: usize,
    /// Convergence tolerance, in seconds, for the light-time fixed-point iteration.
    pub light_time_tolerance_s: f64,
    /// Iteration cap for the same fixed-point loop, guarding against non-convergent inputs.
    pub light_time_max_iterations: usize,
}

impl Default for FrameSystemConfig {
    fn default() -> Self {
        FrameSystemConfig {
            max_order: 2,
            worker_threads: 1,
            light_time_tolerance_s: 1e-6,
            light_time_max_iterations: 10,
        }
    }
}

/// The axes graph, the point graph, and their shared configuration and thread-slot assignment.
/// Cheap to construct; the expensive state lives in per-node caches populated lazily by queries.
pub struct FrameSystem {
    pub(crate) axes: MappedGraph<AxesNode>,
    pub(crate) points: MappedGraph<PointNode>,
    pub(crate) config: FrameSystemConfig,
    pub(crate) thread_index: Box<dyn ThreadIndex>,
}

impl FrameSystem {
    pub fn new(config: FrameSystemConfig) -> Self {
        FrameSystem {
            axes: MappedGraph::new(),
            points: MappedGraph::new(),
            config,
            thread_index: Box::new(AutoThreadIndex::default()),
        }
    }

    /// Swaps in a caller-supplied [`ThreadIndex`], e.g. one that pins slots to a known worker
    /// pool's thread indices rather than assigning them on first use.
    pub fn with_thread_index(mut self, thread_index: Box<dyn ThreadIndex>) -> Self {
        self.thread_index = thread_index;
        self
    }

    pub fn config(&self) -> &FrameSystemConfig {
        &self.config
    }
}

impl Default for FrameSystem {
    fn default() -> Self {
        FrameSystem::new(FrameSystemConfig::default())
    }
}

#[cfg(test)]
mod ut_system {
    use super::*;

    #[test]
    fn default_config_is_single_threaded_order_two() {
        let sys = FrameSystem::default();
        assert_eq!(sys.config().max_order, 2);
        assert_eq!(sys.config().worker_threads, 1);
    }

    #[test]
    fn custom_config_round_trips() {
        let cfg = FrameSystemConfig {
            max_order: 4,
            worker_threads: 8,
            light_time_tolerance_s: 1e-9,
            light_time_max_iterations: 20,
        };
        let sys = FrameSystem::new(cfg.clone());
        assert_eq!(*sys.config(), cfg);
    }
}
