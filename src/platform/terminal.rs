//! Raw terminal control over the process stdin/stdout fds.
//!
//! Raw mode is a scoped resource: [`RawModeGuard`] restores the original
//! termios on drop, and [`install_signal_cleanup`] covers SIGTERM/SIGHUP
//! so the user's shell is left usable on every exit path.

use std::io;
use std::thread::{self, JoinHandle};

use libc::{self, c_int};
use signal_hook::iterator::Signals;

use crate::config::EnvConfig;
use crate::core::key::ByteSource;
use crate::error::Error;
use crate::logging::WriteLog;

const CLEAR_AND_HOME: &str = "\x1b[2J\x1b[H";
const CURSOR_TO_CORNER: &str = "\x1b[999C\x1b[999B";
const QUERY_CURSOR_POSITION: &str = "\x1b[6n";

fn get_termios(fd: c_int) -> io::Result<libc::termios> {
    let mut termios = unsafe { std::mem::zeroed::<libc::termios>() };
    let result = unsafe { libc::tcgetattr(fd, &mut termios) };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(termios)
}

fn set_termios(fd: c_int, termios: &libc::termios) -> io::Result<()> {
    let result = unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, termios) };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

fn wait_writable(fd: c_int) -> io::Result<()> {
    let mut fds = libc::pollfd {
        fd,
        events: libc::POLLOUT,
        revents: 0,
    };
    loop {
        let result = unsafe { libc::poll(&mut fds, 1, -1) };
        if result < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        if result > 0 && (fds.revents & libc::POLLOUT) != 0 {
            return Ok(());
        }
    }
}

fn write_all_fd(fd: c_int, bytes: &[u8]) -> io::Result<()> {
    let mut written = 0;
    while written < bytes.len() {
        let remaining = &bytes[written..];
        let result =
            unsafe { libc::write(fd, remaining.as_ptr() as *const libc::c_void, remaining.len()) };
        if result > 0 {
            written += result as usize;
            continue;
        }
        if result == 0 {
            return Err(io::Error::new(io::ErrorKind::WriteZero, "write returned 0"));
        }
        let err = io::Error::last_os_error();
        match err.kind() {
            io::ErrorKind::Interrupted => continue,
            io::ErrorKind::WouldBlock => wait_writable(fd)?,
            _ => return Err(err),
        }
    }
    Ok(())
}

/// Parse the `ESC[{row};{col}` payload of a cursor position report
/// (the trailing `R` is consumed by the reader).
fn parse_cursor_report(reply: &[u8]) -> Option<(usize, usize)> {
    let body = reply.strip_prefix(b"\x1b[")?;
    let body = std::str::from_utf8(body).ok()?;
    let (rows, cols) = body.split_once(';')?;
    Some((rows.parse().ok()?, cols.parse().ok()?))
}

/// Terminal handle owning the raw-mode lifecycle on stdin/stdout.
pub struct RawTerminal {
    stdin_fd: c_int,
    stdout_fd: c_int,
    original: Option<libc::termios>,
    write_log: WriteLog,
}

impl RawTerminal {
    pub fn new(cfg: &EnvConfig) -> Self {
        Self {
            stdin_fd: libc::STDIN_FILENO,
            stdout_fd: libc::STDOUT_FILENO,
            original: None,
            write_log: WriteLog::new(cfg.write_log.clone()),
        }
    }

    /// Capture the current attributes and apply the raw set: no line
    /// buffering, no echo, no signal generation, no literal-next, no
    /// software flow control, no CR/LF translation, 8-bit chars, and a
    /// read policy of "whatever is available, or empty after ~100 ms".
    pub fn enable_raw_mode(&mut self) -> Result<(), Error> {
        let original = get_termios(self.stdin_fd).map_err(Error::TerminalAttrs)?;
        self.original = Some(original);

        let mut raw = original;
        raw.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
        raw.c_oflag &= !libc::OPOST;
        raw.c_cflag |= libc::CS8;
        raw.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);
        raw.c_cc[libc::VMIN] = 0;
        raw.c_cc[libc::VTIME] = 1;
        set_termios(self.stdin_fd, &raw).map_err(Error::RawMode)
    }

    /// Restore the attributes captured by `enable_raw_mode`.
    pub fn restore(&mut self) -> io::Result<()> {
        match self.original.as_ref() {
            Some(original) => set_termios(self.stdin_fd, original),
            None => Ok(()),
        }
    }

    pub fn original_termios(&self) -> Option<libc::termios> {
        self.original
    }

    /// Write the whole buffer in one logical flush.
    pub fn write(&mut self, data: &str) -> io::Result<()> {
        write_all_fd(self.stdout_fd, data.as_bytes())?;
        self.write_log.record(data);
        Ok(())
    }

    /// Terminal size via `TIOCGWINSZ`; `None` if the ioctl fails or
    /// reports a zero dimension.
    pub fn probe_winsize(&self) -> Option<(usize, usize)> {
        let mut size = libc::winsize {
            ws_row: 0,
            ws_col: 0,
            ws_xpixel: 0,
            ws_ypixel: 0,
        };
        let result = unsafe { libc::ioctl(self.stdout_fd, libc::TIOCGWINSZ, &mut size) };
        if result == 0 && size.ws_row > 0 && size.ws_col > 0 {
            Some((size.ws_row as usize, size.ws_col as usize))
        } else {
            None
        }
    }

    /// Terminal size as `(rows, cols)`, falling back to moving the
    /// cursor to the bottom-right corner and querying its position when
    /// the ioctl is unavailable. Failure here is fatal.
    pub fn window_size(&mut self) -> Result<(usize, usize), Error> {
        if let Some(size) = self.probe_winsize() {
            return Ok(size);
        }
        self.cursor_fallback_size().map_err(Error::WindowSize)
    }

    fn cursor_fallback_size(&mut self) -> io::Result<(usize, usize)> {
        self.write(CURSOR_TO_CORNER)?;
        self.write(QUERY_CURSOR_POSITION)?;

        let mut reply = Vec::with_capacity(16);
        while reply.len() < 32 {
            match self.read_byte()? {
                Some(b'R') | None => break,
                Some(byte) => reply.push(byte),
            }
        }
        parse_cursor_report(&reply).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                "malformed cursor position report",
            )
        })
    }
}

impl ByteSource for RawTerminal {
    /// One byte from stdin, or `None` when the VTIME window elapses.
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = 0u8;
        let result =
            unsafe { libc::read(self.stdin_fd, &mut byte as *mut u8 as *mut libc::c_void, 1) };
        match result {
            1 => Ok(Some(byte)),
            0 => Ok(None),
            _ => {
                let err = io::Error::last_os_error();
                match err.kind() {
                    io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => Ok(None),
                    _ => Err(err),
                }
            }
        }
    }
}

/// RAII wrapper that clears the screen and restores cooked mode on drop,
/// covering normal quits, fatal-error returns, and panics alike.
pub struct RawModeGuard {
    term: RawTerminal,
}

impl RawModeGuard {
    pub fn enter(mut term: RawTerminal) -> Result<Self, Error> {
        term.enable_raw_mode()?;
        Ok(Self { term })
    }

    pub fn term_mut(&mut self) -> &mut RawTerminal {
        &mut self.term
    }

    pub fn original_termios(&self) -> Option<libc::termios> {
        self.term.original_termios()
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = self.term.write(CLEAR_AND_HOME);
        let _ = self.term.restore();
    }
}

/// Background signal watcher that restores the terminal before dying.
pub struct SignalCleanup {
    handle: signal_hook::iterator::Handle,
    thread: Option<JoinHandle<()>>,
}

impl Drop for SignalCleanup {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Restore `original` and exit 1 if SIGTERM or SIGHUP arrives while the
/// editor is in raw mode. Keyboard signals are already disabled by raw
/// mode itself; this covers signals from outside the terminal.
pub fn install_signal_cleanup(original: libc::termios) -> io::Result<SignalCleanup> {
    let mut signals = Signals::new([libc::SIGTERM, libc::SIGHUP])?;
    let handle = signals.handle();

    let thread = thread::spawn(move || {
        if signals.forever().next().is_some() {
            let _ = write_all_fd(libc::STDOUT_FILENO, CLEAR_AND_HOME.as_bytes());
            let _ = unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &original) };
            std::process::exit(1);
        }
    });

    Ok(SignalCleanup {
        handle,
        thread: Some(thread),
    })
}

#[cfg(test)]
mod tests {
    use super::parse_cursor_report;

    #[test]
    fn cursor_report_parses_rows_and_cols() {
        assert_eq!(parse_cursor_report(b"\x1b[24;80"), Some((24, 80)));
        assert_eq!(parse_cursor_report(b"\x1b[1;1"), Some((1, 1)));
    }

    #[test]
    fn cursor_report_rejects_garbage() {
        assert_eq!(parse_cursor_report(b""), None);
        assert_eq!(parse_cursor_report(b"[24;80"), None);
        assert_eq!(parse_cursor_report(b"\x1b[24,80"), None);
        assert_eq!(parse_cursor_report(b"\x1b[x;y"), None);
    }
}
