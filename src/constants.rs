/*
 * gnomon
 * Copyright (C) 2026 Gnomon contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::NodeId;

/// Speed of light in kilometers per second (km/s), used by the light-time iteration in
/// [`crate::translations`].
pub const SPEED_OF_LIGHT_KM_S: f64 = 299_792.458;

/// Commonly used NAIF-style ids for axes roots and point roots. Callers are free to use any
/// id space; these are provided purely as ergonomic defaults, mirroring the teacher's
/// `constants::celestial_objects` module.
pub mod ids {
    use super::NodeId;

    /// Conventional id for the inertial root of the axes graph (ICRF/J2000-like).
    pub const ICRF: NodeId = 1;
    /// Conventional id for the root of the points graph (solar system barycenter-like).
    pub const SSB: NodeId = 0;
}
