//! Application state and key handling
//!
//! The App owns the [`Session`] and the runner used for re-runs, plus the
//! purely visual state the session does not care about: which double pane
//! has focus, per-pane scroll offsets, the checklist cursor and the text
//! editor. Keys are translated into session [`Event`]s; everything else
//! about a transition is the session's business.

use super::editor::TextEditor;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use passview::{Direction, Event, PaneId, PipelineRunner, Redraw, Session, Tab};

/// Lines moved by PageUp/PageDown
const PAGE: u16 = 10;

pub struct App {
    pub session: Session,
    runner: Box<dyn PipelineRunner>,
    /// Focused pane on the double tab
    pub double_focus: PaneId,
    scroll: [u16; 5],
    /// Highlighted row of the pass checklist
    pub checklist_cursor: usize,
    pub editor: TextEditor,
    /// Keys go to the editor instead of the app
    pub editing: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(session: Session, runner: Box<dyn PipelineRunner>) -> Self {
        let editor = TextEditor::new(session.edit().buffer());
        App {
            session,
            runner,
            double_focus: PaneId::DoubleLeft,
            scroll: [0; 5],
            checklist_cursor: 0,
            editor,
            editing: false,
            should_quit: false,
        }
    }

    /// Pane that receives selection keys on the current tab
    pub fn focused_pane(&self) -> Option<PaneId> {
        match self.session.tab() {
            Tab::Sequential => Some(PaneId::SeqRight),
            Tab::Single => Some(PaneId::Single),
            Tab::Double => Some(self.double_focus),
            Tab::Edit => None,
        }
    }

    pub fn scroll(&self, pane: PaneId) -> u16 {
        self.scroll[pane as usize]
    }

    fn dispatch(&mut self, event: Event) -> bool {
        match self.session.dispatch(event, self.runner.as_mut()) {
            Ok(redraw) => self.reset_scroll(&redraw),
            Err(err) => tracing::debug!("event rejected: {err}"),
        }
        true
    }

    fn reset_scroll(&mut self, redraw: &Redraw) {
        for pane in redraw.iter() {
            self.scroll[pane as usize] = 0;
        }
    }

    /// Label of the stage `delta` steps away from what `pane` shows
    fn neighbour_label(&self, pane: PaneId, delta: isize) -> Option<String> {
        let store = self.session.store();
        let target = self
            .session
            .view()
            .stage_index(pane)
            .checked_add_signed(delta)?;
        let first = if pane.allows_initial() { 0 } else { 1 };
        if target < first || target >= store.stage_count() {
            return None;
        }
        store.display_label(target)
    }

    fn select_neighbour(&mut self, delta: isize) -> bool {
        let Some(pane) = self.focused_pane() else {
            return false;
        };
        match self.neighbour_label(pane, delta) {
            Some(label) => self.dispatch(Event::SelectPass { pane, label }),
            None => false,
        }
    }

    fn scroll_by(&mut self, up: bool) -> bool {
        let panes: Vec<PaneId> = match self.session.tab() {
            Tab::Double => vec![self.double_focus],
            tab => tab.panes().to_vec(),
        };
        for pane in panes {
            let offset = &mut self.scroll[pane as usize];
            *offset = if up {
                offset.saturating_sub(PAGE)
            } else {
                offset.saturating_add(PAGE)
            };
        }
        true
    }

    /// Push the editor text into the session; marks it dirty when changed
    fn sync_buffer(&mut self) {
        let text = self.editor.text();
        if text != self.session.edit().buffer() {
            self.dispatch(Event::EditBuffer(text));
        }
    }

    /// Handle a keyboard event
    ///
    /// Returns whether anything changed
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return true;
        }
        if ctrl && key.code == KeyCode::Char('s') && self.session.tab() == Tab::Edit {
            self.sync_buffer();
            return self.dispatch(Event::Apply);
        }
        if self.editing {
            return self.handle_editing_key(key);
        }

        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                true
            }
            KeyCode::Tab => self.dispatch(Event::SwitchTab(self.session.tab().next())),
            KeyCode::BackTab => self.dispatch(Event::SwitchTab(self.session.tab().prev())),
            KeyCode::Char('l') => self.dispatch(Event::ToggleLineNumbers),
            KeyCode::Char('s') => self.dispatch(Event::CycleHighlightStyle),
            KeyCode::PageUp => self.scroll_by(true),
            KeyCode::PageDown => self.scroll_by(false),
            _ => match self.session.tab() {
                Tab::Sequential => self.handle_sequential_key(key),
                Tab::Single => self.handle_single_key(key),
                Tab::Double => self.handle_double_key(key),
                Tab::Edit => self.handle_edit_key(key),
            },
        }
    }

    fn handle_sequential_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Left => self.dispatch(Event::Step(Direction::Prev)),
            KeyCode::Right => self.dispatch(Event::Step(Direction::Next)),
            _ => false,
        }
    }

    fn handle_single_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Up => self.select_neighbour(-1),
            KeyCode::Down => self.select_neighbour(1),
            _ => false,
        }
    }

    fn handle_double_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Left => {
                self.double_focus = PaneId::DoubleLeft;
                true
            }
            KeyCode::Right => {
                self.double_focus = PaneId::DoubleRight;
                true
            }
            KeyCode::Up => self.select_neighbour(-1),
            KeyCode::Down => self.select_neighbour(1),
            _ => false,
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) -> bool {
        let options = self.session.edit().pass_options().len();
        match key.code {
            KeyCode::Up => {
                self.checklist_cursor = self.checklist_cursor.saturating_sub(1);
                true
            }
            KeyCode::Down => {
                if self.checklist_cursor + 1 < options {
                    self.checklist_cursor += 1;
                }
                true
            }
            KeyCode::Char(' ') if options > 0 => {
                self.dispatch(Event::TogglePass(self.checklist_cursor + 1))
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                self.editing = true;
                true
            }
            KeyCode::Char('a') => self.dispatch(Event::Apply),
            _ => false,
        }
    }

    fn handle_editing_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Esc {
            self.editing = false;
            self.sync_buffer();
            return true;
        }
        self.editor.handle_key(key);
        true
    }
}
