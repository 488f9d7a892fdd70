//! Configuration management for pagepool
//!
//! Settings are layered with figment: embedded defaults, then user and
//! repository files (TOML, JSON or YAML), then `PAGEPOOL_` environment
//! variables, then command line flags.

mod core;

pub use self::core::{
    ConfigOverrides, OutputOverrides, OutputSection, PagepoolConfig, PoolOverrides, PoolSection,
    RangeOverrides, RangeSection,
};
