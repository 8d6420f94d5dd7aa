/*
 * gnomon
 * Copyright (C) 2026 Gnomon contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

extern crate hifitime;
extern crate log;

pub mod axes;
pub mod cache;
pub mod collaborators;
pub mod constants;
pub mod errors;
pub mod graph;
pub mod math;
pub mod points;
pub mod rotations;
pub mod system;
pub mod thread_index;
pub mod translations;

/// Re-export of hifitime, the epoch/duration library used at every evaluator boundary.
pub mod time {
    pub use hifitime::*;
}

pub mod prelude {
    pub use crate::axes::{AxesClass, AxesId};
    pub use crate::collaborators::{
        EphemerisProvider, EphemerisRecord, PlanetaryOrientation, TimeProvider,
    };
    pub use crate::errors::{FrameError, FrameResult};
    pub use crate::math::rot::Rot;
    pub use crate::math::rotation::{RotationSequence, DCM};
    pub use crate::math::state::StateN;
    pub use crate::points::{PointClass, PointId};
    pub use crate::system::{FrameSystem, FrameSystemConfig};
    pub use crate::time::Epoch;
}

/// The signed integer key space used for both axes and point nodes, in the style of NAIF ids.
pub type NodeId = i32;
