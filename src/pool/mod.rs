//! Worker pool driving a cursor-guarded work source
//!
//! This module owns the **execution** side of pagepool: spawning a fixed set of
//! worker threads, running the claim loop in each of them and joining them
//! again. What a unit of work is and how it is fetched belongs to the
//! [`WorkSource`](crate::source::WorkSource) implementation.
//!
//! # Worker Loop
//!
//! Every worker runs the same body until the source is exhausted:
//!
//! ```text
//! while !stopped && source.has_next() {
//!     page = source.fetch()      // claim under lock, I/O outside
//!     callback(pool, &page)      // caller side effects (persisting, ...)
//!     log(page)                  // "<label> HHh MMm SSs elapsed"
//! }
//! ```
//!
//! # Failure Isolation
//!
//! An error returned by `fetch` or by the callback ends the worker that hit it.
//! Its siblings keep draining the source, so [`WorkerPool::run`] always
//! returns once the source is exhausted. Failed workers are listed in the
//! [`RunSummary`].
//!
//! # Example Usage
//!
//! ```rust
//! use pagepool::pool::{ProgressLog, WorkerPool};
//! use pagepool::sources::RangeSource;
//! use std::sync::Mutex;
//!
//! let source = RangeSource::new(0, 10, |index| Ok(index * 2));
//! let pool = WorkerPool::with_processes(source, 4).with_progress(ProgressLog::silent());
//!
//! let total = Mutex::new(0);
//! let summary = pool
//!     .run(|_, page| {
//!         *total.lock().unwrap() += page.response.unwrap_or(0);
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! assert_eq!(summary.pages, 10);
//! assert_eq!(*total.lock().unwrap(), 90);
//! ```

pub mod core;
pub mod progress;

// Re-export main types for easier access
pub use self::core::{
    DEFAULT_PROCESSES, PoolConfig, RunSummary, StopHandle, WorkerFailure, WorkerPool,
};
pub use progress::{ProgressLog, format_elapsed};
