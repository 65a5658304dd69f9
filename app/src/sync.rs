//! Stale-response guard for racing refreshes.
//!
//! A list refresh triggered by a socket event can race one triggered by a
//! user action; whichever response lands last must not clobber a newer one.
//! Every outgoing read takes a tag from `SeqCounter`, and `Latest` only
//! applies a response whose tag is at least as new as what it already holds.

use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out monotonically increasing tags for outgoing reads.
#[derive(Debug, Default)]
pub struct SeqCounter(AtomicU64);

impl SeqCounter {
    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Holder that only moves forward in tag order.
#[derive(Debug, Default)]
pub struct Latest<T> {
    value: T,
    version: u64,
}

impl<T> Latest<T> {
    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.value
    }

    /// Applies `value` unless a newer-tagged response was already applied.
    /// Returns false when the response was discarded as stale.
    pub fn apply(&mut self, version: u64, value: T) -> bool {
        if version < self.version {
            return false;
        }
        self.version = version;
        self.value = value;
        true
    }
}
