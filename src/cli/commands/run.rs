//! Run command implementation
//!
//! Drives a [`RangeSource`] over the configured range. Each claimed index is
//! turned into a search URL by a [`QueryPlanner`]; when an output directory is
//! configured the callback saves every page there as `<name>.txt`.

use crate::cli::Output;
use crate::config::{ConfigOverrides, OutputOverrides, PagepoolConfig, PoolOverrides, RangeOverrides};
use crate::pool::{ProgressLog, RunSummary, WorkerPool, format_elapsed};
use crate::source::Page;
use crate::sources::{QueryPlanner, RangeSource};
use anyhow::{Context, Result, bail};
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Number of worker threads
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// First index to claim
    #[arg(long)]
    pub start: Option<u64>,

    /// Exclusive upper bound of the claimed range
    #[arg(long)]
    pub limit: Option<u64>,

    /// Prefix each claimed index is appended to
    #[arg(long)]
    pub url_prefix: Option<String>,

    /// Save one file per page into this directory
    #[arg(short, long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Do not print per-page progress lines
    #[arg(long)]
    pub no_progress: bool,
}

impl RunArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            pool: PoolOverrides {
                processes: self.workers,
                quiet_progress: self.no_progress.then_some(true),
            },
            range: RangeOverrides {
                start: self.start,
                limit: self.limit,
                url_prefix: self.url_prefix.clone(),
            },
            output: OutputOverrides {
                directory: self.out.clone(),
            },
        }
    }
}

/// Execute the run command
pub fn execute(args: RunArgs, custom_config: Option<&str>, output: &Output) -> Result<()> {
    let config = PagepoolConfig::load_with(custom_config, Some(&args.overrides()))?;
    config.validate()?;

    let directory = config.output.directory.as_deref();
    if let Some(dir) = directory {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    }

    output.verbose(&format!(
        "Claiming [{}, {}) with {} workers",
        config.range.start, config.range.limit, config.pool.processes
    ));

    let planner = QueryPlanner::new(config.range.url_prefix.clone());
    let source = RangeSource::new(config.range.start, config.range.limit, |index| {
        planner.plan(index)
    });
    let progress = if config.pool.quiet_progress || output.is_quiet() {
        ProgressLog::silent()
    } else {
        ProgressLog::stdout()
    };
    let pool = WorkerPool::new(source, config.pool_config()).with_progress(progress);

    let summary = pool.run(|_, page| match directory {
        Some(dir) => save_page(dir, page),
        None => Ok(()),
    })?;

    report(&summary, directory, output)
}

/// Persist a page as `<dir>/<name>.txt`
fn save_page(dir: &Path, page: &Page<String>) -> Result<()> {
    let path = dir.join(format!("{}.txt", page.name));
    let body = page.response.as_deref().unwrap_or_default();
    fs::write(&path, format!("{body}\n"))
        .with_context(|| format!("Failed to write page {}", path.display()))
}

fn report(summary: &RunSummary, directory: Option<&Path>, output: &Output) -> Result<()> {
    let elapsed = format_elapsed(summary.elapsed);

    if summary.is_success() {
        output.task_summary(
            "✔",
            &format!("Fetched {} pages in {}", summary.pages, elapsed),
            true,
        );
        if let Some(dir) = directory {
            output.info(&format!("Pages saved to {}", dir.display()));
        }
        return Ok(());
    }

    output.task_summary(
        "✖",
        &format!(
            "Fetched {} pages in {}, {} worker(s) failed",
            summary.pages,
            elapsed,
            summary.failures.len()
        ),
        false,
    );
    for failure in &summary.failures {
        output.error(&format!("worker {}: {:#}", failure.worker, failure.error));
    }
    bail!("{} worker(s) failed", summary.failures.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_overrides_only_carry_given_flags() {
        let args = RunArgs {
            workers: Some(4),
            no_progress: true,
            ..Default::default()
        };
        let overrides = args.overrides();
        assert_eq!(overrides.pool.processes, Some(4));
        assert_eq!(overrides.pool.quiet_progress, Some(true));
        assert!(overrides.range.limit.is_none());
        assert!(overrides.output.directory.is_none());

        let quiet = RunArgs::default().overrides();
        assert!(quiet.pool.quiet_progress.is_none());
    }

    #[test]
    fn test_save_page_writes_response() {
        let dir = TempDir::new().unwrap();
        let page = Page::new(7, "https://example.test/?q=7".to_string());
        save_page(dir.path(), &page).unwrap();

        let written = fs::read_to_string(dir.path().join("7.txt")).unwrap();
        assert_eq!(written, "https://example.test/?q=7\n");
    }

    #[test]
    fn test_save_page_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let page = Page::new(1, String::new());
        let result = save_page(&dir.path().join("missing"), &page);
        assert!(result.is_err());
    }
}
