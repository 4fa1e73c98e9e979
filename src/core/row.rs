//! Single text row with a tab-expanded render cache.

/// One line of text, without its trailing newline.
///
/// `render` is always a pure function of `chars` and the tab stop: every
/// mutation recomputes it, so it can never be read stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    chars: String,
    render: String,
}

impl Row {
    pub fn new(text: impl Into<String>, tab_stop: usize) -> Self {
        let mut row = Self {
            chars: text.into(),
            render: String::new(),
        };
        row.update_render(tab_stop);
        row
    }

    pub fn chars(&self) -> &str {
        &self.chars
    }

    pub fn render(&self) -> &str {
        &self.render
    }

    /// Length in characters (cursor positions run `0..=len`).
    pub fn len(&self) -> usize {
        self.chars.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Width of the rendered row in columns.
    pub fn render_width(&self) -> usize {
        self.render.chars().count()
    }

    /// Insert `ch` at character index `at`; an index past the end appends.
    pub fn insert_char(&mut self, at: usize, ch: char, tab_stop: usize) {
        let at = at.min(self.len());
        let idx = byte_index(&self.chars, at);
        self.chars.insert(idx, ch);
        self.update_render(tab_stop);
    }

    /// Delete the character at `at`; out-of-range is a no-op.
    /// Returns whether anything was removed.
    pub fn delete_char(&mut self, at: usize, tab_stop: usize) -> bool {
        if at >= self.len() {
            return false;
        }
        let idx = byte_index(&self.chars, at);
        self.chars.remove(idx);
        self.update_render(tab_stop);
        true
    }

    /// Append `text` to the end of the row (line-merge path).
    pub fn append(&mut self, text: &str, tab_stop: usize) {
        self.chars.push_str(text);
        self.update_render(tab_stop);
    }

    /// Truncate at `at` and return the removed suffix (line-split path).
    pub fn split_off(&mut self, at: usize, tab_stop: usize) -> String {
        let idx = byte_index(&self.chars, at.min(self.len()));
        let tail = self.chars.split_off(idx);
        self.update_render(tab_stop);
        tail
    }

    /// Map a character index to its render column.
    pub fn cx_to_rx(&self, cx: usize, tab_stop: usize) -> usize {
        let mut rx = 0;
        for ch in self.chars.chars().take(cx) {
            if ch == '\t' {
                rx += (tab_stop - 1) - (rx % tab_stop);
            }
            rx += 1;
        }
        rx
    }

    /// Map a render column back to the character index that covers it.
    /// A column past the full render width clamps to the row length.
    pub fn rx_to_cx(&self, rx: usize, tab_stop: usize) -> usize {
        let mut cur = 0;
        for (cx, ch) in self.chars.chars().enumerate() {
            if ch == '\t' {
                cur += (tab_stop - 1) - (cur % tab_stop);
            }
            cur += 1;
            if cur > rx {
                return cx;
            }
        }
        self.len()
    }

    fn update_render(&mut self, tab_stop: usize) {
        let mut render = String::with_capacity(self.chars.len());
        let mut col = 0;
        for ch in self.chars.chars() {
            if ch == '\t' {
                render.push(' ');
                col += 1;
                while col % tab_stop != 0 {
                    render.push(' ');
                    col += 1;
                }
            } else {
                render.push(ch);
                col += 1;
            }
        }
        self.render = render;
    }
}

fn byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(idx, _)| idx)
        .unwrap_or(s.len())
}
