//! Editor state and the main dispatch loop.

pub mod search;

use std::path::PathBuf;
use std::time::Instant;

use crate::config::EnvConfig;
use crate::core::document::Document;
use crate::core::key::{read_key, Key, KeyDecoder};
use crate::error::Error;
use crate::platform::terminal::{install_signal_cleanup, RawModeGuard, RawTerminal};
use crate::render;

const fn ctrl(ch: u8) -> u8 {
    ch & 0x1f
}

const CTRL_F: u8 = ctrl(b'f');
const CTRL_H: u8 = ctrl(b'h');
const CTRL_L: u8 = ctrl(b'l');
const CTRL_Q: u8 = ctrl(b'q');
const CTRL_S: u8 = ctrl(b's');

/// What the run loop should do after a dispatched key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Quit,
    Save,
    Find,
}

/// Per-keystroke hook for modal prompts. The search feature supplies
/// one; the plain "save as" prompt supplies none.
pub trait PromptObserver {
    fn on_key(&mut self, ed: &mut Editor, text: &str, key: Key);
}

/// The whole editor context: document, cursor, scroll window, viewport,
/// status message, and the quit countdown. Mutated only by the main
/// loop and its synchronous callees.
pub struct Editor {
    pub doc: Document,
    /// Cursor in character space; `cy` may equal the row count and `cx`
    /// may equal the row length, never beyond.
    pub cx: usize,
    pub cy: usize,
    /// Cursor in render space, recomputed from `cx` every frame.
    pub rx: usize,
    pub rowoff: usize,
    pub coloff: usize,
    pub screen_rows: usize,
    pub screen_cols: usize,
    pub tab_stop: usize,
    status: Option<(String, Instant)>,
    quit_times: u32,
    quit_limit: u32,
}

impl Editor {
    /// `term_rows`/`term_cols` are the full terminal dimensions; two
    /// rows are reserved for the status and message bars.
    pub fn new(doc: Document, term_rows: usize, term_cols: usize, cfg: &EnvConfig) -> Self {
        Self {
            doc,
            cx: 0,
            cy: 0,
            rx: 0,
            rowoff: 0,
            coloff: 0,
            screen_rows: term_rows.saturating_sub(2).max(1),
            screen_cols: term_cols.max(1),
            tab_stop: cfg.tab_stop,
            status: None,
            quit_times: cfg.quit_times,
            quit_limit: cfg.quit_times,
        }
    }

    /// The viewport never collapses below one cell, even on a terminal
    /// too short to hold the two bars.
    pub fn set_viewport(&mut self, term_rows: usize, term_cols: usize) {
        self.screen_rows = term_rows.saturating_sub(2).max(1);
        self.screen_cols = term_cols.max(1);
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some((text.into(), Instant::now()));
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn status(&self) -> Option<(&str, Instant)> {
        self.status
            .as_ref()
            .map(|(text, set_at)| (text.as_str(), *set_at))
    }

    pub fn quit_times_left(&self) -> u32 {
        self.quit_times
    }

    fn current_row_len(&self) -> usize {
        self.doc.row(self.cy).map(|row| row.len()).unwrap_or(0)
    }

    pub fn move_cursor(&mut self, key: Key) {
        match key {
            Key::ArrowLeft => {
                if self.cx > 0 {
                    self.cx -= 1;
                } else if self.cy > 0 {
                    self.cy -= 1;
                    self.cx = self.current_row_len();
                }
            }
            Key::ArrowRight => {
                if let Some(row) = self.doc.row(self.cy) {
                    if self.cx < row.len() {
                        self.cx += 1;
                    } else {
                        self.cy += 1;
                        self.cx = 0;
                    }
                }
            }
            Key::ArrowUp => {
                if self.cy > 0 {
                    self.cy -= 1;
                }
            }
            Key::ArrowDown => {
                if self.cy < self.doc.len() {
                    self.cy += 1;
                }
            }
            _ => {}
        }
        // Vertical moves snap the cursor back inside the new row.
        self.cx = self.cx.min(self.current_row_len());
    }

    fn insert_char(&mut self, ch: char) {
        self.doc.insert_char(self.cy, self.cx, ch, self.tab_stop);
        self.cx += 1;
    }

    fn insert_newline(&mut self) {
        if self.cx == 0 {
            self.doc.insert_row(self.cy, "", self.tab_stop);
        } else {
            self.doc.split_line(self.cy, self.cx, self.tab_stop);
        }
        self.cy += 1;
        self.cx = 0;
    }

    fn delete_char(&mut self) {
        if self.cy == self.doc.len() {
            return;
        }
        if self.cx == 0 && self.cy == 0 {
            // Intended boundary behavior: nothing above to merge into.
            return;
        }
        if self.cx > 0 {
            self.doc.delete_char(self.cy, self.cx - 1, self.tab_stop);
            self.cx -= 1;
        } else {
            let prev_len = self.doc.row(self.cy - 1).map(|row| row.len()).unwrap_or(0);
            self.doc.merge_rows(self.cy - 1, self.cy, self.tab_stop);
            self.cy -= 1;
            self.cx = prev_len;
        }
    }

    /// Dispatch one logical key against the editor state.
    pub fn handle_key(&mut self, key: Key) -> Outcome {
        let mut outcome = Outcome::Continue;
        match key {
            Key::Byte(b'\r') => self.insert_newline(),
            Key::Byte(CTRL_Q) => {
                // The configured count is the total number of presses,
                // so the last one exits instead of warning.
                if self.doc.is_dirty() && self.quit_times > 1 {
                    self.quit_times -= 1;
                    self.set_status(format!(
                        "WARNING!!! File has unsaved changes. \
                         Press Ctrl-Q {} more times to quit.",
                        self.quit_times
                    ));
                    return Outcome::Continue;
                }
                return Outcome::Quit;
            }
            Key::Byte(CTRL_S) => outcome = Outcome::Save,
            Key::Byte(CTRL_F) => outcome = Outcome::Find,
            Key::Home => self.cx = 0,
            Key::End => self.cx = self.current_row_len(),
            Key::Backspace | Key::Byte(CTRL_H) => self.delete_char(),
            Key::Delete => {
                self.move_cursor(Key::ArrowRight);
                self.delete_char();
            }
            Key::PageUp => {
                self.cy = self.rowoff;
                for _ in 0..self.screen_rows {
                    self.move_cursor(Key::ArrowUp);
                }
            }
            Key::PageDown => {
                self.cy = (self.rowoff + self.screen_rows).saturating_sub(1).min(self.doc.len());
                for _ in 0..self.screen_rows {
                    self.move_cursor(Key::ArrowDown);
                }
            }
            Key::ArrowUp | Key::ArrowDown | Key::ArrowLeft | Key::ArrowRight => {
                self.move_cursor(key)
            }
            Key::Byte(CTRL_L) | Key::Esc => {}
            Key::Byte(byte) => {
                // Printable ASCII plus tab only; bytes 0x80 and above
                // are fragments of multi-byte sequences, not characters.
                if byte == b'\t' || (byte.is_ascii() && !byte.is_ascii_control()) {
                    self.insert_char(byte as char);
                }
            }
        }
        // Any key other than the quit chord re-arms the countdown.
        self.quit_times = self.quit_limit;
        outcome
    }
}

fn refresh(term: &mut RawTerminal, ed: &mut Editor) -> Result<(), Error> {
    if let Some((rows, cols)) = term.probe_winsize() {
        ed.set_viewport(rows, cols);
    }
    render::scroll(ed);
    let frame = render::draw(ed, Instant::now());
    term.write(&frame)?;
    Ok(())
}

/// Modal input loop. `{}` in `template` is replaced with the input so
/// far and shown as the status message. Returns `None` on ESC.
pub fn prompt(
    term: &mut RawTerminal,
    decoder: &mut KeyDecoder,
    ed: &mut Editor,
    template: &str,
    mut observer: Option<&mut dyn PromptObserver>,
) -> Result<Option<String>, Error> {
    let mut input = String::new();
    loop {
        ed.set_status(template.replace("{}", &input));
        refresh(term, ed)?;

        let key = read_key(term, decoder)?;
        match key {
            Key::Backspace | Key::Delete | Key::Byte(CTRL_H) => {
                input.pop();
            }
            Key::Esc => {
                ed.clear_status();
                if let Some(observer) = observer.as_mut() {
                    observer.on_key(ed, &input, key);
                }
                return Ok(None);
            }
            Key::Byte(b'\r') if !input.is_empty() => {
                ed.clear_status();
                if let Some(observer) = observer.as_mut() {
                    observer.on_key(ed, &input, key);
                }
                return Ok(Some(input));
            }
            Key::Byte(byte) if byte.is_ascii() && !byte.is_ascii_control() => {
                input.push(byte as char);
            }
            _ => {}
        }

        if let Some(observer) = observer.as_mut() {
            observer.on_key(ed, &input, key);
        }
    }
}

/// Ctrl-S flow: prompt for a name if the document is unnamed, then
/// write. I/O failures are reported in the status bar, never fatal.
fn save(term: &mut RawTerminal, decoder: &mut KeyDecoder, ed: &mut Editor) -> Result<(), Error> {
    if ed.doc.filename().is_none() {
        match prompt(term, decoder, ed, "Save as: {} (ESC to cancel)", None)? {
            Some(name) => ed.doc.set_filename(PathBuf::from(name)),
            None => {
                ed.set_status("Save aborted");
                return Ok(());
            }
        }
    }
    match ed.doc.save() {
        Ok(bytes) => ed.set_status(format!("{bytes} bytes written to disk")),
        Err(err) => ed.set_status(format!("Can't save! I/O error: {err}")),
    }
    Ok(())
}

/// Ctrl-F flow: incremental search under a prompt; cancelling restores
/// the pre-search cursor and scroll state exactly.
fn find(term: &mut RawTerminal, decoder: &mut KeyDecoder, ed: &mut Editor) -> Result<(), Error> {
    let saved = (ed.cx, ed.cy, ed.coloff, ed.rowoff);
    let mut observer = search::FindObserver::new();
    let accepted = prompt(
        term,
        decoder,
        ed,
        "Search: {} (Use ESC/Arrows/Enter)",
        Some(&mut observer),
    )?;
    if accepted.is_none() {
        (ed.cx, ed.cy, ed.coloff, ed.rowoff) = saved;
    }
    Ok(())
}

/// Open the optional file and run the editor until the user quits.
pub fn run(path: Option<PathBuf>) -> Result<(), Error> {
    let cfg = EnvConfig::from_env();

    let mut guard = RawModeGuard::enter(RawTerminal::new(&cfg))?;
    let _signals = guard
        .original_termios()
        .map(install_signal_cleanup)
        .transpose()?;

    let term = guard.term_mut();
    let (term_rows, term_cols) = term.window_size()?;

    let doc = match path {
        Some(path) => Document::open(&path, cfg.tab_stop)?,
        None => Document::new(),
    };

    let mut ed = Editor::new(doc, term_rows, term_cols, &cfg);
    ed.set_status("HELP: Ctrl-S = save | Ctrl-Q = quit | Ctrl-F = find");

    let mut decoder = KeyDecoder::new();
    loop {
        refresh(term, &mut ed)?;
        let key = read_key(term, &mut decoder)?;
        match ed.handle_key(key) {
            Outcome::Continue => {}
            Outcome::Quit => break,
            Outcome::Save => save(term, &mut decoder, &mut ed)?,
            Outcome::Find => find(term, &mut decoder, &mut ed)?,
        }
    }
    Ok(())
}
