//! Text editor for the edit tab
//!
//! A plain multi-line buffer with a cursor. The cursor column counts
//! characters, not bytes, so multi-byte text moves one glyph per key.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

/// Spaces inserted for the Tab key while editing
const INDENT: &str = "  ";

#[derive(Debug, Clone)]
pub struct TextEditor {
    lines: Vec<String>,
    cursor_row: usize,
    /// Character index into the cursor row
    cursor_col: usize,
}

impl TextEditor {
    pub fn new(text: &str) -> Self {
        TextEditor {
            lines: text.split('\n').map(str::to_string).collect(),
            cursor_row: 0,
            cursor_col: 0,
        }
    }

    /// The buffer text; inverse of [`TextEditor::new`]
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn cursor_position(&self) -> (usize, usize) {
        (self.cursor_row, self.cursor_col)
    }

    fn line_len(&self, row: usize) -> usize {
        self.lines.get(row).map_or(0, |line| line.chars().count())
    }

    fn byte_index(&self) -> usize {
        let line = &self.lines[self.cursor_row];
        line.char_indices()
            .nth(self.cursor_col)
            .map_or(line.len(), |(index, _)| index)
    }

    fn clamp_cursor_column(&mut self) {
        self.cursor_col = self.cursor_col.min(self.line_len(self.cursor_row));
    }

    fn insert_str(&mut self, text: &str) {
        let at = self.byte_index();
        self.lines[self.cursor_row].insert_str(at, text);
        self.cursor_col += text.chars().count();
    }

    fn split_line(&mut self) {
        let at = self.byte_index();
        let rest = self.lines[self.cursor_row].split_off(at);
        self.lines.insert(self.cursor_row + 1, rest);
        self.cursor_row += 1;
        self.cursor_col = 0;
    }

    fn backspace(&mut self) -> bool {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
            let at = self.byte_index();
            self.lines[self.cursor_row].remove(at);
            true
        } else if self.cursor_row > 0 {
            let line = self.lines.remove(self.cursor_row);
            self.cursor_row -= 1;
            self.cursor_col = self.line_len(self.cursor_row);
            self.lines[self.cursor_row].push_str(&line);
            true
        } else {
            false
        }
    }

    fn delete(&mut self) -> bool {
        if self.cursor_col < self.line_len(self.cursor_row) {
            let at = self.byte_index();
            self.lines[self.cursor_row].remove(at);
            true
        } else if self.cursor_row + 1 < self.lines.len() {
            let next = self.lines.remove(self.cursor_row + 1);
            self.lines[self.cursor_row].push_str(&next);
            true
        } else {
            false
        }
    }

    /// Apply an editing key; returns whether the text changed
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                let mut buf = [0; 4];
                self.insert_str(c.encode_utf8(&mut buf));
                true
            }
            KeyCode::Tab => {
                self.insert_str(INDENT);
                true
            }
            KeyCode::Enter => {
                self.split_line();
                true
            }
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Up => {
                if self.cursor_row > 0 {
                    self.cursor_row -= 1;
                    self.clamp_cursor_column();
                }
                false
            }
            KeyCode::Down => {
                if self.cursor_row + 1 < self.lines.len() {
                    self.cursor_row += 1;
                    self.clamp_cursor_column();
                }
                false
            }
            KeyCode::Left => {
                self.cursor_col = self.cursor_col.saturating_sub(1);
                false
            }
            KeyCode::Right => {
                if self.cursor_col < self.line_len(self.cursor_row) {
                    self.cursor_col += 1;
                }
                false
            }
            KeyCode::Home => {
                self.cursor_col = 0;
                false
            }
            KeyCode::End => {
                self.cursor_col = self.line_len(self.cursor_row);
                false
            }
            _ => false,
        }
    }

    /// Draw the buffer, scrolled so the cursor row is visible
    pub fn render(&self, frame: &mut Frame, area: Rect, show_cursor: bool) {
        let cursor_style = Style::default()
            .bg(Color::Yellow)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD);
        let scroll = self
            .cursor_row
            .saturating_sub(usize::from(area.height).saturating_sub(1));

        let lines: Vec<Line> = self
            .lines
            .iter()
            .enumerate()
            .skip(scroll)
            .map(|(row, text)| {
                if !show_cursor || row != self.cursor_row {
                    return Line::from(text.clone());
                }
                let mut spans: Vec<Span> = text
                    .chars()
                    .enumerate()
                    .map(|(col, ch)| {
                        if col == self.cursor_col {
                            Span::styled(ch.to_string(), cursor_style)
                        } else {
                            Span::raw(ch.to_string())
                        }
                    })
                    .collect();
                if self.cursor_col >= self.line_len(row) {
                    spans.push(Span::styled(" ", cursor_style));
                }
                Line::from(spans)
            })
            .collect();

        frame.render_widget(Paragraph::new(lines), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    fn type_str(editor: &mut TextEditor, text: &str) {
        for ch in text.chars() {
            editor.handle_key(key(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn test_text_round_trips() {
        for text in ["", "a", "a\n", "a\n\nb\n"] {
            assert_eq!(TextEditor::new(text).text(), text);
        }
    }

    #[test]
    fn test_insert_and_newline() {
        let mut editor = TextEditor::new("");
        type_str(&mut editor, "ab");
        editor.handle_key(key(KeyCode::Enter));
        type_str(&mut editor, "c");
        assert_eq!(editor.text(), "ab\nc");
        assert_eq!(editor.cursor_position(), (1, 1));
    }

    #[test]
    fn test_backspace_joins_lines() {
        let mut editor = TextEditor::new("ab\ncd");
        editor.handle_key(key(KeyCode::Down));
        assert!(editor.handle_key(key(KeyCode::Backspace)));
        assert_eq!(editor.text(), "abcd");
        assert_eq!(editor.cursor_position(), (0, 2));
        assert!(!TextEditor::new("x").handle_key(key(KeyCode::Backspace)));
    }

    #[test]
    fn test_multibyte_characters() {
        let mut editor = TextEditor::new("é");
        editor.handle_key(key(KeyCode::End));
        type_str(&mut editor, "ü");
        editor.handle_key(key(KeyCode::Left));
        editor.handle_key(key(KeyCode::Backspace));
        assert_eq!(editor.text(), "ü");
    }

    #[test]
    fn test_vertical_move_clamps_column() {
        let mut editor = TextEditor::new("long line\nab");
        editor.handle_key(key(KeyCode::End));
        editor.handle_key(key(KeyCode::Down));
        assert_eq!(editor.cursor_position(), (1, 2));
    }

    #[test]
    fn test_control_chars_are_not_inserted() {
        let mut editor = TextEditor::new("");
        let changed = editor.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
        assert!(!changed);
        assert_eq!(editor.text(), "");
    }
}
