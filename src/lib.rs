//! # pagepool - parallel page fetching over a shared cursor
//!
//! A fixed pool of worker threads drains a [`WorkSource`](source::WorkSource):
//! each worker repeatedly claims the next cursor value under a lock, fetches
//! the page for it outside the lock, hands the page to a caller-supplied
//! callback and prints a progress line.
//!
//! ## Layout
//!
//! - [`source`]: the cursor, its lock guard, pages and the `WorkSource` trait
//! - [`pool`]: the worker pool, the claim loop and progress output
//! - [`sources`]: ready-made sources (an index range with a dry URL planner)
//! - [`config`]: layered configuration for the binary
//! - [`cli`]: the `pagepool` command line
//!
//! ## Quick Start
//!
//! ```bash
//! # Claim 0..100 with 8 workers and save every page under ./pages
//! pagepool run --workers 8 --limit 100 --out pages
//! ```

pub mod cli;
pub mod config;
pub mod pool;
pub mod source;
pub mod sources;

pub use cli::{Cli, Output};
pub use config::PagepoolConfig;
pub use pool::{PoolConfig, RunSummary, WorkerPool};
pub use source::{Cursor, Page, WorkSource};

/// Result type alias for pagepool operations
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
