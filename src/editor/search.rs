//! Incremental search over the document.

use crate::core::key::Key;
use crate::editor::{Editor, PromptObserver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// Prompt observer driving find-as-you-type.
///
/// Arrow keys pick the direction and step to the next hit; any other
/// key restarts the search from the top with the updated query. The
/// scan walks rows circularly from the last hit, matches against the
/// rendered text, and maps the hit back into character space so the
/// cursor lands on an editable position.
#[derive(Debug)]
pub struct FindObserver {
    last_match: Option<usize>,
    direction: Direction,
}

impl FindObserver {
    pub fn new() -> Self {
        Self {
            last_match: None,
            direction: Direction::Forward,
        }
    }
}

impl Default for FindObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptObserver for FindObserver {
    fn on_key(&mut self, ed: &mut Editor, query: &str, key: Key) {
        match key {
            Key::Esc | Key::Byte(b'\r') => {
                self.last_match = None;
                self.direction = Direction::Forward;
                return;
            }
            Key::ArrowRight | Key::ArrowDown => self.direction = Direction::Forward,
            Key::ArrowLeft | Key::ArrowUp => self.direction = Direction::Backward,
            _ => {
                self.last_match = None;
                self.direction = Direction::Forward;
            }
        }

        if query.is_empty() || ed.doc.is_empty() {
            return;
        }
        if self.last_match.is_none() {
            self.direction = Direction::Forward;
        }

        let rows = ed.doc.len() as isize;
        let step: isize = match self.direction {
            Direction::Forward => 1,
            Direction::Backward => -1,
        };
        let mut current = self.last_match.map(|at| at as isize).unwrap_or(-1);

        for _ in 0..rows {
            current += step;
            if current == -1 {
                current = rows - 1;
            } else if current == rows {
                current = 0;
            }

            let row = &ed.doc.rows()[current as usize];
            if let Some(pos) = row.render().find(query) {
                let rx = row.render()[..pos].chars().count();
                self.last_match = Some(current as usize);
                ed.cy = current as usize;
                ed.cx = row.rx_to_cx(rx, ed.tab_stop);
                // Force scroll() to bring the hit row to the top.
                ed.rowoff = ed.doc.len();
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FindObserver;
    use crate::config::EnvConfig;
    use crate::core::document::Document;
    use crate::core::key::Key;
    use crate::editor::{Editor, PromptObserver};

    const TAB: usize = 8;

    fn editor_with(lines: &[&str]) -> Editor {
        let mut doc = Document::new();
        for (i, line) in lines.iter().enumerate() {
            doc.insert_row(i, *line, TAB);
        }
        Editor::new(doc, 24, 80, &EnvConfig::default())
    }

    #[test]
    fn forward_search_wraps_circularly() {
        let mut ed = editor_with(&["hello", "world", "hello again"]);
        let mut find = FindObserver::new();

        // Typing the final query character starts from the top.
        find.on_key(&mut ed, "hello", Key::Byte(b'o'));
        assert_eq!(ed.cy, 0);

        find.on_key(&mut ed, "hello", Key::ArrowRight);
        assert_eq!(ed.cy, 2);

        find.on_key(&mut ed, "hello", Key::ArrowRight);
        assert_eq!(ed.cy, 0);
    }

    #[test]
    fn backward_search_steps_the_other_way() {
        let mut ed = editor_with(&["hello", "world", "hello again"]);
        let mut find = FindObserver::new();

        find.on_key(&mut ed, "hello", Key::Byte(b'o'));
        assert_eq!(ed.cy, 0);

        find.on_key(&mut ed, "hello", Key::ArrowLeft);
        assert_eq!(ed.cy, 2);

        find.on_key(&mut ed, "hello", Key::ArrowLeft);
        assert_eq!(ed.cy, 0);
    }

    #[test]
    fn cursor_lands_on_match_column() {
        let mut ed = editor_with(&["say hello there"]);
        let mut find = FindObserver::new();
        find.on_key(&mut ed, "hello", Key::Byte(b'o'));
        assert_eq!((ed.cy, ed.cx), (0, 4));
    }

    #[test]
    fn match_in_tab_expanded_text_maps_to_char_index() {
        // "\thello": the render is eight spaces then the word, so the
        // hit column must map back through the tab.
        let mut ed = editor_with(&["\thello"]);
        let mut find = FindObserver::new();
        find.on_key(&mut ed, "hello", Key::Byte(b'o'));
        assert_eq!((ed.cy, ed.cx), (0, 1));
    }

    #[test]
    fn typing_resets_match_state() {
        let mut ed = editor_with(&["ab", "ab"]);
        let mut find = FindObserver::new();

        find.on_key(&mut ed, "a", Key::Byte(b'a'));
        assert_eq!(ed.cy, 0);
        find.on_key(&mut ed, "ab", Key::ArrowRight);
        assert_eq!(ed.cy, 1);

        // A new query character searches from the top again.
        find.on_key(&mut ed, "ab", Key::Byte(b'b'));
        assert_eq!(ed.cy, 0);
    }

    #[test]
    fn no_match_leaves_cursor_alone() {
        let mut ed = editor_with(&["alpha", "beta"]);
        ed.cy = 1;
        ed.cx = 2;
        let mut find = FindObserver::new();
        find.on_key(&mut ed, "zzz", Key::Byte(b'z'));
        assert_eq!((ed.cy, ed.cx), (1, 2));
    }

    #[test]
    fn search_forces_scroll_recenter() {
        let lines: Vec<String> = (0..50)
            .map(|i| if i == 40 { "needle".into() } else { format!("{i}") })
            .collect();
        let refs: Vec<&str> = lines.iter().map(|s| s.as_str()).collect();
        let mut ed = editor_with(&refs);

        let mut find = FindObserver::new();
        find.on_key(&mut ed, "needle", Key::Byte(b'e'));
        assert_eq!(ed.cy, 40);
        assert_eq!(ed.rowoff, ed.doc.len());

        crate::render::scroll(&mut ed);
        assert_eq!(ed.rowoff, 40);
    }
}
