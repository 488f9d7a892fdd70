//! Cursor-guarded work sources
//!
//! A [`WorkSource`] hands out units of work to the workers of a
//! [`WorkerPool`](crate::pool::WorkerPool). All sources share the same
//! discipline:
//!
//! ```text
//! lock cursor ─▶ snapshot value ─▶ next() ─▶ unlock ─▶ fetch(snapshot) ─▶ Page
//! └──────────── claim (serialized) ──────────────┘    └── may run in parallel ──┘
//! ```
//!
//! Only the assignment of an index is serialized. Slow I/O belongs after the
//! claim so that network waits of different workers overlap.
//!
//! # Example
//!
//! ```rust
//! use pagepool::source::{Cursor, Page, WorkSource};
//!
//! struct Countdown {
//!     cursor: Cursor,
//! }
//!
//! impl WorkSource for Countdown {
//!     type Response = u64;
//!
//!     fn cursor(&self) -> &Cursor {
//!         &self.cursor
//!     }
//!
//!     fn has_next(&self) -> bool {
//!         self.cursor.load() < 3
//!     }
//!
//!     fn fetch(&self) -> anyhow::Result<Option<Page<u64>>> {
//!         Ok(self.claim().map(|index| Page::new(index, index * index)))
//!     }
//! }
//!
//! let source = Countdown { cursor: Cursor::new(0) };
//! let page = source.fetch().unwrap().unwrap();
//! assert_eq!(page.response, Some(0));
//! ```

mod cursor;
mod page;

pub use cursor::{Cursor, CursorGuard};
pub use page::Page;

use anyhow::Result;

/// Capability set every concrete scraper implements
///
/// Sources are shared by reference across worker threads, so all methods take
/// `&self` and any mutable state other than the cursor needs its own
/// synchronization.
pub trait WorkSource: Send + Sync {
    type Response: Send;

    /// The shared cursor this source claims from
    fn cursor(&self) -> &Cursor;

    /// Termination check, read without the lock
    ///
    /// Must not mutate anything: calling it repeatedly without an intervening
    /// [`next`](WorkSource::next) gives the same answer. The default never
    /// terminates, so bounded sources override it.
    fn has_next(&self) -> bool {
        true
    }

    /// Advance the cursor by one step
    ///
    /// Requiring the guard means this can only run inside a claim.
    fn next(&self, guard: &mut CursorGuard<'_>) {
        guard.advance(1);
    }

    /// Atomically snapshot and advance the cursor
    ///
    /// Returns `None` when another worker took the last value between the
    /// caller's unlocked `has_next` check and lock acquisition, or when `next`
    /// could not move the cursor because it is saturated at `u64::MAX`.
    fn claim(&self) -> Option<u64> {
        let mut guard = self.cursor().lock();
        if !self.has_next() {
            return None;
        }
        let value = guard.value();
        self.next(&mut guard);
        if guard.value() == value {
            return None;
        }
        Some(value)
    }

    /// Claim the next unit of work and fetch it
    ///
    /// The default claims an index and returns a page without a response.
    /// Overrides should call [`claim`](WorkSource::claim) first and do their
    /// I/O afterwards, outside the lock.
    fn fetch(&self) -> Result<Option<Page<Self::Response>>> {
        Ok(self.claim().map(Page::empty))
    }

    /// Text printed in front of the elapsed time in progress lines
    ///
    /// The default is only the page name: `Response` carries no `Debug`
    /// bound, so sources that want the response in the line override this.
    fn page_to_log_string(&self, page: &Page<Self::Response>) -> String {
        page.name.clone()
    }
}
