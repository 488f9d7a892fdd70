use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Render an elapsed duration as `HHh MMm SSs`
///
/// Hours are not wrapped at 24; runs longer than 99 hours simply widen the
/// hour field.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours:02}h {minutes:02}m {seconds:02}s")
}

/// Per-page progress output shared by all workers
///
/// Each page produces exactly one line, `<label> <HHh MMm SSs> elapsed`.
/// Lines from different workers never tear but their order is arbitrary.
pub struct ProgressLog {
    sink: Option<Mutex<Box<dyn Write + Send>>>,
}

impl ProgressLog {
    pub fn stdout() -> Self {
        Self::to_writer(io::stdout())
    }

    pub fn silent() -> Self {
        Self { sink: None }
    }

    pub fn to_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            sink: Some(Mutex::new(Box::new(writer))),
        }
    }

    pub fn is_silent(&self) -> bool {
        self.sink.is_none()
    }

    pub fn line(label: &str, elapsed: Duration) -> String {
        format!("{} {} elapsed", label, format_elapsed(elapsed))
    }

    /// Write one progress line; output errors are dropped
    pub fn record(&self, label: &str, elapsed: Duration) {
        if let Some(sink) = &self.sink {
            let mut writer = sink.lock().unwrap_or_else(PoisonError::into_inner);
            let _ = writeln!(writer, "{}", Self::line(label, elapsed));
            let _ = writer.flush();
        }
    }
}

impl Default for ProgressLog {
    fn default() -> Self {
        Self::stdout()
    }
}

impl std::fmt::Debug for ProgressLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressLog")
            .field("silent", &self.is_silent())
            .finish()
    }
}
