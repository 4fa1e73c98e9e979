use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide error type.
///
/// The terminal and window-size variants are fatal: the editor cannot
/// continue without a known terminal state. Save failures never reach
/// this type; they are reported in the status bar and editing continues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read terminal attributes: {0}")]
    TerminalAttrs(#[source] io::Error),

    #[error("failed to apply raw terminal attributes: {0}")]
    RawMode(#[source] io::Error),

    #[error("could not determine terminal size: {0}")]
    WindowSize(#[source] io::Error),

    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),
}
