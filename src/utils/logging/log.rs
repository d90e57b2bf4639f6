//! Timed log lines around file reads and writes

use std::path::{Path, PathBuf};
use std::time::Instant;

/// Logs the start of a file operation, then its row count and duration
#[derive(Debug)]
pub struct TimedOperation {
    what: &'static str,
    path: PathBuf,
    start: Instant,
}

impl TimedOperation {
    #[must_use]
    pub fn start(what: &'static str, path: &Path) -> Self {
        log::info!("{what}: {}", path.display());
        Self {
            what,
            path: path.to_path_buf(),
            start: Instant::now(),
        }
    }

    pub fn finish(self, rows: usize) {
        log::info!(
            "{}: {rows} rows ({}) in {:.2?}",
            self.what,
            self.path.display(),
            self.start.elapsed()
        );
    }
}
