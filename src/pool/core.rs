use super::progress::ProgressLog;
use crate::source::{Page, WorkSource};
use anyhow::{Result, anyhow, ensure};
use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Worker count used when nothing else is configured
pub const DEFAULT_PROCESSES: usize = 10;

/// Configuration for a worker pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Number of worker threads spawned by each run (must be at least 1)
    pub processes: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            processes: DEFAULT_PROCESSES,
        }
    }
}

/// Cloneable handle asking the workers of a pool to exit early
///
/// Workers observe the request at their next loop-top check, alongside
/// `has_next`, so a page that is already being fetched still completes.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        if !self.0.swap(true, Ordering::SeqCst) {
            warn!("Stop requested, workers will exit after their current page");
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A worker that ended because its fetch or callback failed, or it panicked
#[derive(Debug)]
pub struct WorkerFailure {
    pub worker: usize,
    pub error: anyhow::Error,
}

/// Outcome of one [`WorkerPool::run`]
#[derive(Debug)]
pub struct RunSummary {
    /// Pages that went through callback and progress log
    pub pages: usize,
    /// Time since the pool was constructed
    pub elapsed: Duration,
    pub failures: Vec<WorkerFailure>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed_workers(&self) -> Vec<usize> {
        self.failures.iter().map(|f| f.worker).collect()
    }
}

/// Fixed-size pool of worker threads draining a [`WorkSource`]
pub struct WorkerPool<S: WorkSource> {
    source: S,
    config: PoolConfig,
    start_time: Instant,
    progress: ProgressLog,
    stop: StopHandle,
}

impl<S: WorkSource> WorkerPool<S> {
    pub fn new(source: S, config: PoolConfig) -> Self {
        Self {
            source,
            config,
            start_time: Instant::now(),
            progress: ProgressLog::default(),
            stop: StopHandle::default(),
        }
    }

    pub fn with_processes(source: S, processes: usize) -> Self {
        Self::new(source, PoolConfig { processes })
    }

    /// Replace the progress output (stdout by default)
    pub fn with_progress(mut self, progress: ProgressLog) -> Self {
        self.progress = progress;
        self
    }

    pub fn processes(&self) -> usize {
        self.config.processes
    }

    /// Change the worker count for subsequent runs
    pub fn set_processes(&mut self, processes: usize) {
        self.config.processes = processes;
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn start_time(&self) -> Instant {
        self.start_time
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn stop(&self) {
        self.stop.stop();
    }

    /// Write the progress line for a page
    pub fn log(&self, page: &Page<S::Response>) {
        self.progress
            .record(&self.source.page_to_log_string(page), self.elapsed());
    }

    /// Spawn `processes` workers, each running the claim loop, and wait for all of them
    ///
    /// `callback` is invoked once per fetched page, from whichever worker
    /// claimed it. An error from the source's `fetch` or from the callback ends
    /// only the worker that hit it; the remaining workers keep draining the
    /// source and the failure is reported in the returned [`RunSummary`].
    ///
    /// Blocks for as long as the source's `has_next` stays true.
    pub fn run<F>(&self, callback: F) -> Result<RunSummary>
    where
        F: Fn(&Self, &Page<S::Response>) -> Result<()> + Sync,
    {
        let processes = self.config.processes;
        ensure!(processes >= 1, "worker pool needs at least one process");

        info!(
            processes,
            cursor = self.source.cursor().load(),
            "Starting worker pool"
        );

        let pages = AtomicUsize::new(0);
        let callback = &callback;
        let pages_ref = &pages;

        let outcomes = crossbeam::thread::scope(|s| -> Result<Vec<_>> {
            let mut handles = Vec::with_capacity(processes);
            for worker in 0..processes {
                let handle = s
                    .builder()
                    .name(format!("pagepool-w{worker}"))
                    .spawn(move |_| {
                        let outcome = self.work(worker, callback, pages_ref);
                        if let Err(e) = &outcome {
                            error!(worker, "Worker stopped early: {:#}", e);
                        }
                        outcome
                    })?;
                handles.push(handle);
            }

            Ok(handles
                .into_iter()
                .enumerate()
                .map(|(worker, handle)| (worker, handle.join()))
                .collect())
        })
        .map_err(|_| anyhow!("Thread panic occurred during worker pool run"))??;

        let mut failures = Vec::new();
        for (worker, joined) in outcomes {
            let error = match joined {
                Ok(Ok(())) => continue,
                Ok(Err(error)) => error,
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    error!(worker, "Worker panicked: {}", message);
                    anyhow!("worker panicked: {message}")
                }
            };
            failures.push(WorkerFailure { worker, error });
        }

        let summary = RunSummary {
            pages: pages.load(Ordering::SeqCst),
            elapsed: self.elapsed(),
            failures,
        };
        info!(
            pages = summary.pages,
            failed_workers = summary.failures.len(),
            "Worker pool finished"
        );
        Ok(summary)
    }

    /// Body of a single worker
    fn work<F>(&self, worker: usize, callback: &F, pages: &AtomicUsize) -> Result<()>
    where
        F: Fn(&Self, &Page<S::Response>) -> Result<()>,
    {
        debug!(worker, "Worker started");
        while !self.stop.is_stopped() && self.source.has_next() {
            // Lost the race for the last value; has_next is false now
            let Some(page) = self.source.fetch()? else {
                if self.source.cursor().is_exhausted() {
                    debug!(worker, "Cursor exhausted");
                    break;
                }
                continue;
            };
            debug!(worker, index = page.index, "Claimed page");
            callback(self, &page)?;
            self.log(&page);
            pages.fetch_add(1, Ordering::SeqCst);
        }
        debug!(worker, "Worker finished");
        Ok(())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Cursor;
    use std::sync::Mutex;

    struct Counter {
        cursor: Cursor,
        limit: u64,
    }

    impl Counter {
        fn new(limit: u64) -> Self {
            Self {
                cursor: Cursor::new(0),
                limit,
            }
        }
    }

    impl WorkSource for Counter {
        type Response = ();

        fn cursor(&self) -> &Cursor {
            &self.cursor
        }

        fn has_next(&self) -> bool {
            self.cursor.load() < self.limit
        }
    }

    fn quiet(source: Counter, processes: usize) -> WorkerPool<Counter> {
        WorkerPool::with_processes(source, processes).with_progress(ProgressLog::silent())
    }

    #[test]
    fn test_default_config() {
        assert_eq!(PoolConfig::default().processes, 10);
        let pool = WorkerPool::new(Counter::new(0), PoolConfig::default());
        assert_eq!(pool.processes(), 10);
    }

    #[test]
    fn test_run_visits_every_index() {
        let pool = quiet(Counter::new(50), 4);
        let seen = Mutex::new(Vec::new());
        let summary = pool
            .run(|_, page| {
                seen.lock().unwrap().push(page.index);
                Ok(())
            })
            .unwrap();

        let mut seen = seen.into_inner().unwrap();
        seen.sort_unstable();
        assert_eq!(seen, (0..50).collect::<Vec<_>>());
        assert_eq!(summary.pages, 50);
        assert!(summary.is_success());
    }

    #[test]
    fn test_zero_processes_is_rejected() {
        let pool = quiet(Counter::new(3), 0);
        let result = pool.run(|_, _| Ok(()));
        assert!(result.is_err());
    }

    #[test]
    fn test_set_processes_before_run() {
        let mut pool = quiet(Counter::new(6), 10);
        pool.set_processes(1);
        assert_eq!(pool.processes(), 1);

        let order = Mutex::new(Vec::new());
        pool.run(|_, page| {
            order.lock().unwrap().push(page.index);
            Ok(())
        })
        .unwrap();
        assert_eq!(order.into_inner().unwrap(), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_callback_error_ends_only_that_worker() {
        let pool = quiet(Counter::new(20), 3);
        let seen = Mutex::new(Vec::new());
        let summary = pool
            .run(|_, page| {
                if page.index == 4 {
                    anyhow::bail!("cannot persist page 4");
                }
                seen.lock().unwrap().push(page.index);
                Ok(())
            })
            .unwrap();

        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.pages, 19);
        assert!(summary.failures[0].error.to_string().contains("page 4"));
        assert_eq!(seen.into_inner().unwrap().len(), 19);
    }

    #[test]
    fn test_worker_panic_is_reported() {
        let pool = quiet(Counter::new(10), 2);
        let summary = pool
            .run(|_, page| {
                if page.index == 0 {
                    panic!("boom");
                }
                Ok(())
            })
            .unwrap();

        assert_eq!(summary.failures.len(), 1);
        assert!(summary.failures[0].error.to_string().contains("boom"));
        assert_eq!(summary.pages, 9);
    }

    #[test]
    fn test_stop_from_callback() {
        let pool = quiet(Counter::new(1_000), 1);
        let summary = pool
            .run(|pool, page| {
                if page.index == 2 {
                    pool.stop();
                }
                Ok(())
            })
            .unwrap();

        assert_eq!(summary.pages, 3);
        assert!(pool.stop_handle().is_stopped());
        assert_eq!(pool.source().cursor().load(), 3);
    }

    #[test]
    fn test_exhausted_cursor_ends_unbounded_run() {
        struct Unbounded {
            cursor: Cursor,
        }

        impl WorkSource for Unbounded {
            type Response = ();

            fn cursor(&self) -> &Cursor {
                &self.cursor
            }
        }

        let pool = WorkerPool::with_processes(
            Unbounded {
                cursor: Cursor::new(u64::MAX - 3),
            },
            4,
        )
        .with_progress(ProgressLog::silent());
        let seen = Mutex::new(Vec::new());
        let summary = pool
            .run(|_, page| {
                seen.lock().unwrap().push(page.index);
                Ok(())
            })
            .unwrap();

        let mut seen = seen.into_inner().unwrap();
        seen.sort_unstable();
        assert_eq!(seen, vec![u64::MAX - 3, u64::MAX - 2, u64::MAX - 1]);
        assert_eq!(summary.pages, 3);
        assert!(summary.is_success());
    }

    #[test]
    fn test_panic_message() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42_u8), "unknown panic payload");
    }
}
