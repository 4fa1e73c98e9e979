//! Frame write logging.
//!
//! When `FEMTO_WRITE_LOG` points at a file, every frame flushed to the
//! terminal is appended there as well, so a session can be replayed or
//! inspected offline. The sink is strictly best-effort: the first append
//! failure disables it for the rest of the session.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Default)]
pub struct WriteLog {
    path: Option<PathBuf>,
    failed: bool,
}

impl WriteLog {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            failed: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.path.is_some() && !self.failed
    }

    /// Append `data` to the log file, if configured and still healthy.
    pub fn record(&mut self, data: &str) {
        if self.failed {
            return;
        }
        let Some(path) = self.path.as_ref() else {
            return;
        };
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| file.write_all(data.as_bytes()));
        if result.is_err() {
            self.failed = true;
        }
    }
}
