/*
 * gnomon
 * Copyright (C) 2026 Gnomon contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Per-thread, per-node memoization (part of C7). Each node owns one [`ThreadCache`] sized to
//! the system's configured worker-thread count; slot `i` is read and written only by the thread
//! [`crate::thread_index::ThreadIndex`] maps to `i`, so no cross-thread contention is expected in
//! practice even though each slot is guarded by an `RwLock` (see the concurrency note in
//! DESIGN.md: safe Rust has no way to hand out a shared `&FrameSystem` and still mutate through
//! it without some interior-mutability primitive).

use std::sync::RwLock;

use hifitime::Epoch;
use log::trace;

use crate::errors::FrameError;

#[derive(Clone)]
struct CacheEntry<T> {
    epoch: Epoch,
    stamped_order: usize,
    value: T,
}

/// A fixed-capacity array of optional cache entries, one per worker thread.
pub struct ThreadCache<T> {
    slots: Vec<RwLock<Option<CacheEntry<T>>>>,
}

impl<T: Clone> ThreadCache<T> {
    pub fn new(capacity: usize) -> Self {
        ThreadCache {
            slots: (0..capacity).map(|_| RwLock::new(None)).collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn slot(&self, index: usize) -> Result<&RwLock<Option<CacheEntry<T>>>, FrameError> {
        self.slots.get(index).ok_or(FrameError::ThreadCapacityExceeded {
            index,
            capacity: self.slots.len(),
        })
    }

    /// Returns a cached value if present for `epoch` with `stamped_order >= min_order`.
    pub fn get(&self, slot: usize, epoch: Epoch, min_order: usize) -> Result<Option<T>, FrameError> {
        let guard = self.slot(slot)?.read().expect("cache slot lock poisoned");
        let hit = guard.as_ref().filter(|e| e.epoch == epoch && e.stamped_order >= min_order).map(|e| e.value.clone());
        if hit.is_some() {
            trace!(target: "gnomon::cache", "hit at slot {slot} epoch={epoch} min_order={min_order}");
        } else {
            trace!(target: "gnomon::cache", "miss at slot {slot} epoch={epoch} min_order={min_order}");
        }
        Ok(hit)
    }

    pub fn store(&self, slot: usize, epoch: Epoch, order: usize, value: T) -> Result<(), FrameError> {
        let mut guard = self.slot(slot)?.write().expect("cache slot lock poisoned");
        *guard = Some(CacheEntry { epoch, stamped_order: order, value });
        Ok(())
    }
}
