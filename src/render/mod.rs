//! Frame building.
//!
//! `draw` assembles the whole frame — cursor hide/home, visible rows,
//! status bar, message bar, cursor placement, cursor show — into a
//! single string. The run loop flushes it with exactly one terminal
//! write, which is what keeps repaints flicker-free.

use std::fmt::Write;
use std::time::{Duration, Instant};

use crate::editor::Editor;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const HIDE_CURSOR: &str = "\x1b[?25l";
const SHOW_CURSOR: &str = "\x1b[?25h";
const CURSOR_HOME: &str = "\x1b[H";
const CLEAR_LINE: &str = "\x1b[K";
const REVERSE_VIDEO: &str = "\x1b[7m";
const RESET_ATTRS: &str = "\x1b[m";

/// How long a status message stays visible after being set.
pub const MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Recompute `rx` and clamp the scroll offsets so the cursor stays
/// inside the viewport.
pub fn scroll(ed: &mut Editor) {
    ed.rx = match ed.doc.row(ed.cy) {
        Some(row) => row.cx_to_rx(ed.cx, ed.tab_stop),
        None => 0,
    };

    if ed.cy < ed.rowoff {
        ed.rowoff = ed.cy;
    }
    if ed.cy >= ed.rowoff + ed.screen_rows {
        ed.rowoff = ed.cy + 1 - ed.screen_rows;
    }
    if ed.rx < ed.coloff {
        ed.coloff = ed.rx;
    }
    if ed.rx >= ed.coloff + ed.screen_cols {
        ed.coloff = ed.rx + 1 - ed.screen_cols;
    }
}

/// Build one complete frame. Pure with respect to the terminal: the
/// caller owns the flush.
pub fn draw(ed: &Editor, now: Instant) -> String {
    let mut buf = String::with_capacity(ed.screen_rows * ed.screen_cols);
    buf.push_str(HIDE_CURSOR);
    buf.push_str(CURSOR_HOME);

    draw_rows(ed, &mut buf);
    draw_status_bar(ed, &mut buf);
    draw_message_bar(ed, now, &mut buf);

    let _ = write!(
        buf,
        "\x1b[{};{}H",
        (ed.cy - ed.rowoff) + 1,
        (ed.rx - ed.coloff) + 1
    );
    buf.push_str(SHOW_CURSOR);
    buf
}

fn draw_rows(ed: &Editor, buf: &mut String) {
    for y in 0..ed.screen_rows {
        let filerow = y + ed.rowoff;
        match ed.doc.row(filerow) {
            Some(row) => {
                let slice: String = row
                    .render()
                    .chars()
                    .skip(ed.coloff)
                    .take(ed.screen_cols)
                    .collect();
                buf.push_str(&slice);
            }
            None => {
                if ed.doc.is_empty() && y == ed.screen_rows / 3 {
                    draw_welcome(ed, buf);
                } else {
                    buf.push('~');
                }
            }
        }
        buf.push_str(CLEAR_LINE);
        buf.push_str("\r\n");
    }
}

fn draw_welcome(ed: &Editor, buf: &mut String) {
    let welcome = format!("Femto editor -- version {VERSION}");
    let shown: String = welcome.chars().take(ed.screen_cols).collect();
    let mut padding = (ed.screen_cols.saturating_sub(shown.chars().count())) / 2;
    if padding > 0 {
        buf.push('~');
        padding -= 1;
    }
    for _ in 0..padding {
        buf.push(' ');
    }
    buf.push_str(&shown);
}

fn draw_status_bar(ed: &Editor, buf: &mut String) {
    buf.push_str(REVERSE_VIDEO);

    let name = ed
        .doc
        .filename()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "[No Name]".to_string());
    let name: String = name.chars().take(20).collect();
    let modified = if ed.doc.is_dirty() { " (modified)" } else { "" };
    let left = format!("{name} - {} lines{modified}", ed.doc.len());
    let right = format!("{}/{}", ed.cy + 1, ed.doc.len());

    let mut line: String = left.chars().take(ed.screen_cols).collect();
    let mut used = line.chars().count();
    while used < ed.screen_cols {
        if ed.screen_cols - used == right.chars().count() {
            line.push_str(&right);
            break;
        }
        line.push(' ');
        used += 1;
    }
    buf.push_str(&line);

    buf.push_str(RESET_ATTRS);
    buf.push_str("\r\n");
}

fn draw_message_bar(ed: &Editor, now: Instant, buf: &mut String) {
    buf.push_str(CLEAR_LINE);
    if let Some((text, set_at)) = ed.status() {
        if now.duration_since(set_at) < MESSAGE_TIMEOUT {
            let shown: String = text.chars().take(ed.screen_cols).collect();
            buf.push_str(&shown);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::{draw, scroll, MESSAGE_TIMEOUT, VERSION};
    use crate::config::EnvConfig;
    use crate::core::document::Document;
    use crate::editor::Editor;

    const TAB: usize = 8;

    fn editor_with(lines: &[&str], rows: usize, cols: usize) -> Editor {
        let mut doc = Document::new();
        for (i, line) in lines.iter().enumerate() {
            doc.insert_row(i, *line, TAB);
        }
        Editor::new(doc, rows, cols, &EnvConfig::default())
    }

    #[test]
    fn frame_is_bracketed_by_cursor_hide_and_show() {
        let ed = editor_with(&["hello"], 10, 40);
        let frame = draw(&ed, Instant::now());
        assert!(frame.starts_with("\x1b[?25l\x1b[H"));
        assert!(frame.ends_with("\x1b[?25h"));
    }

    #[test]
    fn welcome_banner_only_on_empty_document() {
        let ed = editor_with(&[], 12, 60);
        let frame = draw(&ed, Instant::now());
        assert!(frame.contains(&format!("Femto editor -- version {VERSION}")));

        let ed = editor_with(&["text"], 12, 60);
        let frame = draw(&ed, Instant::now());
        assert!(!frame.contains("Femto editor"));
    }

    #[test]
    fn status_bar_shows_name_lines_and_position() {
        let ed = editor_with(&["a", "b", "c"], 10, 40);
        let frame = draw(&ed, Instant::now());
        assert!(frame.contains("\x1b[7m"));
        assert!(frame.contains("[No Name] - 3 lines"));
        assert!(frame.contains("1/3"));
    }

    #[test]
    fn status_bar_marks_modified_documents() {
        let mut ed = editor_with(&["a"], 10, 40);
        ed.doc.insert_char(0, 0, 'x', TAB);
        let frame = draw(&ed, Instant::now());
        assert!(frame.contains("(modified)"));
    }

    #[test]
    fn expired_status_message_is_not_painted() {
        let mut ed = editor_with(&["a"], 10, 40);
        ed.set_status("hello there");
        let frame = draw(&ed, Instant::now());
        assert!(frame.contains("hello there"));

        let later = Instant::now() + MESSAGE_TIMEOUT + Duration::from_secs(1);
        let frame = draw(&ed, later);
        assert!(!frame.contains("hello there"));
    }

    #[test]
    fn rows_are_clipped_to_the_horizontal_window() {
        let mut ed = editor_with(&["abcdefghij"], 10, 4);
        ed.cx = 2;
        ed.coloff = 2;
        scroll(&mut ed);
        let frame = draw(&ed, Instant::now());
        assert!(frame.contains("cdef\x1b[K"));
        assert!(!frame.contains("abcdef"));
    }

    #[test]
    fn scroll_keeps_cursor_inside_viewport() {
        let lines: Vec<String> = (0..50).map(|i| format!("line {i}")).collect();
        let refs: Vec<&str> = lines.iter().map(|s| s.as_str()).collect();
        let mut ed = editor_with(&refs, 10, 40);

        ed.cy = 30;
        scroll(&mut ed);
        assert!(ed.rowoff <= ed.cy && ed.cy < ed.rowoff + ed.screen_rows);

        ed.cy = 2;
        scroll(&mut ed);
        assert!(ed.rowoff <= ed.cy && ed.cy < ed.rowoff + ed.screen_rows);
    }

    #[test]
    fn scroll_keeps_render_column_inside_viewport() {
        let long = "x".repeat(200);
        let mut ed = editor_with(&[&long], 10, 40);
        ed.cx = 150;
        scroll(&mut ed);
        assert!(ed.coloff <= ed.rx && ed.rx < ed.coloff + ed.screen_cols);

        ed.cx = 3;
        scroll(&mut ed);
        assert!(ed.coloff <= ed.rx && ed.rx < ed.coloff + ed.screen_cols);
    }

    #[test]
    fn tiny_terminal_still_draws_a_frame() {
        // Two terminal rows leave nothing after the bars; the viewport
        // clamp keeps one content row so the cursor math stays in range.
        let mut ed = editor_with(&["alpha", "beta", "gamma"], 2, 40);
        ed.cy = 2;
        scroll(&mut ed);
        assert!(ed.rowoff <= ed.cy && ed.cy < ed.rowoff + ed.screen_rows);
        let frame = draw(&ed, Instant::now());
        assert!(frame.ends_with("\x1b[?25h"));
    }

    #[test]
    fn rx_accounts_for_tabs_when_scrolling() {
        let mut ed = editor_with(&["\tabc"], 10, 40);
        ed.cx = 1;
        scroll(&mut ed);
        assert_eq!(ed.rx, 8);
    }
}
