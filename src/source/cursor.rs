use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Shared counter naming the next unit of work to claim
///
/// The value lives in an atomic so `has_next` checks can read it without
/// taking the lock. Every write goes through a [`CursorGuard`], which can only
/// be obtained by holding the lock, so two workers never snapshot and advance
/// the same value.
#[derive(Debug)]
pub struct Cursor {
    value: AtomicU64,
    lock: Mutex<()>,
}

impl Cursor {
    pub fn new(start: u64) -> Self {
        Self {
            value: AtomicU64::new(start),
            lock: Mutex::new(()),
        }
    }

    /// Unlocked read, only suitable for termination checks
    pub fn load(&self) -> u64 {
        self.value.load(Ordering::SeqCst)
    }

    /// The cursor reached `u64::MAX` and cannot hand out further values
    pub fn is_exhausted(&self) -> bool {
        self.load() == u64::MAX
    }

    /// Acquire the claim lock, blocking until it is free
    ///
    /// A poisoned lock is recovered: the counter is written in a single atomic
    /// store, so a panic elsewhere in the critical section cannot leave it torn.
    pub fn lock(&self) -> CursorGuard<'_> {
        let held = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        CursorGuard {
            cursor: self,
            _held: held,
        }
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Proof that the claim lock is held; released on drop
pub struct CursorGuard<'a> {
    cursor: &'a Cursor,
    _held: MutexGuard<'a, ()>,
}

impl CursorGuard<'_> {
    pub fn value(&self) -> u64 {
        self.cursor.value.load(Ordering::SeqCst)
    }

    /// Move the cursor forward, saturating at `u64::MAX`
    ///
    /// Returns `false` when the cursor did not move.
    pub fn advance(&mut self, step: u64) -> bool {
        let current = self.value();
        let next = current.saturating_add(step);
        self.cursor.value.store(next, Ordering::SeqCst);
        next != current
    }
}
