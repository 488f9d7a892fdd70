//! Command implementations for the pagepool CLI
//!
//! Each command is organized into its own module.

pub mod config;
pub mod run;
pub mod version;
