/*
 * gnomon
 * Copyright (C) 2026 Gnomon contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Maps the calling thread to a stable slot in `0..T` for the per-thread caches (C7). The engine
//! does not reach for thread-local storage itself; callers that care about cache locality supply
//! a [`ThreadIndex`], and single-threaded callers can fall back to [`AutoThreadIndex`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread::ThreadId;

/// Maps the calling thread to a slot index less than the system's configured worker-thread
/// count. Implementations must be deterministic for a given thread across calls.
pub trait ThreadIndex: Send + Sync {
    fn index(&self) -> usize;
}

/// Assigns slots on first use via an atomic counter, remembering the assignment per
/// [`ThreadId`] behind a mutex. This is the default used by [`crate::system::FrameSystem`] when
/// the caller does not supply their own [`ThreadIndex`]; it is not on any hot path more than
/// once per thread.
pub struct AutoThreadIndex {
    next: AtomicUsize,
    assigned: Mutex<Vec<(ThreadId, usize)>>,
}

impl Default for AutoThreadIndex {
    fn default() -> Self {
        AutoThreadIndex {
            next: AtomicUsize::new(0),
            assigned: Mutex::new(Vec::new()),
        }
    }
}

impl ThreadIndex for AutoThreadIndex {
    fn index(&self) -> usize {
        let me = std::thread::current().id();
        let mut table = self.assigned.lock().expect("thread index table poisoned");
        if let Some((_, idx)) = table.iter().find(|(id, _)| *id == me) {
            return *idx;
        }
        let idx = self.next.fetch_add(1, Ordering::Relaxed);
        table.push((me, idx));
        idx
    }
}

#[cfg(test)]
mod ut_thread_index {
    use super::*;

    #[test]
    fn same_thread_gets_same_slot() {
        let ti = AutoThreadIndex::default();
        assert_eq!(ti.index(), ti.index());
    }

    #[test]
    fn distinct_threads_get_distinct_slots() {
        let ti = std::sync::Arc::new(AutoThreadIndex::default());
        let ti2 = ti.clone();
        let a = ti.index();
        let b = std::thread::spawn(move || ti2.index()).join().unwrap();
        assert_ne!(a, b);
    }
}
