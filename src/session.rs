//! The explorer session: one store, five pane cursors, one edit session
//!
//! Every user action arrives as an [`Event`]. [`Session::dispatch`] maps it
//! onto one state transition and returns the [`Redraw`] set, the panes whose
//! content the transition invalidated. Rendering is left to the caller, which
//! asks for [`Session::render_pane`] on whatever the redraw set names.
//!
//! Events run to completion one at a time. The only slow transition is
//! [`Session::apply_changes`], which hands the edit buffer to a
//! [`PipelineRunner`]. While the runner works the edit session sits in
//! [`ApplyState::Applying`], which refuses a second apply. The new store is
//! swapped in only once the runner has returned a result that satisfies
//! [`check_contract`]; any failure leaves the current store, every cursor and
//! the dirty flag exactly as they were, so the user can fix the input and
//! apply again.

use crate::config::{ConfigError, ViewConfig};
use crate::highlight::{RenderStyle, Renderer, SessionId};
use crate::labels;
use crate::runner::{check_contract, PipelineFailure, PipelineRunner};
use crate::stages::StageStore;
use crate::tokenizer::tokenize;
use crate::view::{DisplayPrefs, Direction, PaneId, Redraw, SelectError, Tab, ViewState};
use std::collections::BTreeSet;
use std::rc::Rc;
use thiserror::Error;

/// Errors from a session transition; none of them end the session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Select(#[from] SelectError),
    #[error("unknown highlight style '{0}'")]
    UnknownHighlightStyle(String),
    #[error("no pass with ordinal {0} in the edit list")]
    UnknownPassOrdinal(usize),
    #[error("nothing to apply")]
    ApplyUnavailable,
    #[error(transparent)]
    Pipeline(#[from] PipelineFailure),
}

/// Where the edit session stands relative to the displayed store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplyState {
    /// The displayed store reflects the buffer and pass selection
    #[default]
    Clean,
    /// The buffer or selection changed since the last apply
    Dirty,
    /// A runner is working on the current buffer
    Applying,
}

/// The edit tab's state: buffer text and the pass checklist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    buffer: String,
    /// Pass names offered as checkboxes; fixed for the session
    catalog: Vec<String>,
    options: Vec<String>,
    /// 1-based ordinals into `catalog`
    selected: BTreeSet<usize>,
    state: ApplyState,
}

impl EditSession {
    /// Buffer seeded with the initial text, every pass checked
    pub fn new(store: &StageStore) -> Self {
        let catalog: Vec<String> = store.passes().iter().map(|p| p.raw_name.clone()).collect();
        EditSession {
            buffer: store.initial_text().to_string(),
            options: labels::uniquify(&catalog),
            selected: (1..=catalog.len()).collect(),
            catalog,
            state: ApplyState::Clean,
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn catalog(&self) -> &[String] {
        &self.catalog
    }

    /// Checkbox labels, parallel to the catalog
    pub fn pass_options(&self) -> &[String] {
        &self.options
    }

    pub fn is_selected(&self, ordinal: usize) -> bool {
        self.selected.contains(&ordinal)
    }

    pub fn selected_ordinals(&self) -> impl Iterator<Item = usize> + '_ {
        self.selected.iter().copied()
    }

    /// Identifiers to hand to a runner: selected passes in catalog order,
    /// trimmed
    pub fn selected_identifiers(&self) -> Vec<String> {
        self.selected
            .iter()
            .map(|&ordinal| self.catalog[ordinal - 1].trim().to_string())
            .collect()
    }

    pub fn state(&self) -> ApplyState {
        self.state
    }

    pub fn is_dirty(&self) -> bool {
        self.state != ApplyState::Clean
    }

    /// Whether the apply action is enabled
    pub fn can_apply(&self) -> bool {
        self.state == ApplyState::Dirty
    }

    /// Enable apply. Idempotent; only a successful apply clears it.
    pub fn mark_dirty(&mut self) {
        if self.state == ApplyState::Clean {
            self.state = ApplyState::Dirty;
        }
    }

    /// Replace the buffer; returns whether the text changed
    pub fn set_buffer(&mut self, text: String) -> bool {
        if text == self.buffer {
            return false;
        }
        self.buffer = text;
        self.mark_dirty();
        true
    }

    /// Check or uncheck one pass; returns whether the selection changed
    pub fn set_pass_selected(&mut self, ordinal: usize, selected: bool) -> Result<bool, SessionError> {
        if ordinal == 0 || ordinal > self.catalog.len() {
            return Err(SessionError::UnknownPassOrdinal(ordinal));
        }
        let changed = if selected {
            self.selected.insert(ordinal)
        } else {
            self.selected.remove(&ordinal)
        };
        if changed {
            self.mark_dirty();
        }
        Ok(changed)
    }

    /// Flip one checkbox; returns its new state
    pub fn toggle_pass(&mut self, ordinal: usize) -> Result<bool, SessionError> {
        let selected = !self.is_selected(ordinal);
        self.set_pass_selected(ordinal, selected)?;
        Ok(selected)
    }
}

/// What a pane currently shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaneContent<'a> {
    Stage {
        index: usize,
        /// Ordinal display label of the stage
        label: String,
        text: &'a str,
    },
    /// The last selection named a pass that does not exist
    NotFound { label: &'a str },
}

impl PaneContent<'_> {
    /// Placeholder message for a failed selection
    pub fn not_found_message(label: &str) -> String {
        SelectError::UnknownPass(label.to_string()).to_string()
    }
}

/// A user action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    SelectPass { pane: PaneId, label: String },
    Step(Direction),
    ToggleLineNumbers,
    SetHighlightStyle(String),
    CycleHighlightStyle,
    SwitchTab(Tab),
    EditBuffer(String),
    TogglePass(usize),
    Apply,
}

/// One explorer session
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    store: Rc<StageStore>,
    view: ViewState,
    prefs: DisplayPrefs,
    edit: EditSession,
    tab: Tab,
    message: Option<String>,
}

impl Session {
    /// A session with default cursors and preferences
    pub fn new(store: StageStore) -> Self {
        Self::with_id(store, SessionId::generate())
    }

    pub fn with_id(store: StageStore, id: SessionId) -> Self {
        Session {
            id,
            view: ViewState::new(&store),
            prefs: DisplayPrefs::default(),
            edit: EditSession::new(&store),
            store: Rc::new(store),
            tab: Tab::default(),
            message: None,
        }
    }

    /// A session whose tab, pane selections and preferences come from
    /// startup configuration.
    ///
    /// Unknown tab names, labels missing from `store`, and the initial
    /// sentinel on the sequential tab are configuration mistakes and fail
    /// with [`ConfigError::InvalidTabConfig`].
    pub fn from_config(store: StageStore, config: &ViewConfig) -> Result<Self, ConfigError> {
        let mut session = Session::new(store);
        session.prefs = DisplayPrefs::new(config.line_numbers, &config.highlight_style)
            .ok_or_else(|| ConfigError::UnknownHighlightStyle(config.highlight_style.clone()))?;

        let Some(tab_name) = config.tab.as_deref() else {
            return Ok(session);
        };
        let tab: Tab = tab_name
            .parse()
            .map_err(|name| ConfigError::InvalidTabConfig(format!("unknown tab '{name}'")))?;
        session.tab = tab;

        let store = Rc::clone(&session.store);
        let mut select = |pane: PaneId, label: &str| {
            session
                .view
                .select(pane, label, &store)
                .map(|_| ())
                .map_err(|err| ConfigError::InvalidTabConfig(format!("{tab} tab: {err}")))
        };

        match tab {
            Tab::Sequential => {
                if let Some(label) = config.pass.as_deref() {
                    if store.resolve(label) == Some(0) {
                        return Err(ConfigError::InvalidTabConfig(
                            "the Sequential tab has no Initial option".to_string(),
                        ));
                    }
                    select(PaneId::SeqRight, label)?;
                }
            }
            Tab::Single => {
                if let Some(label) = config.pass.as_deref() {
                    select(PaneId::Single, label)?;
                }
            }
            Tab::Double => {
                if let Some(label) = config.pass.as_deref() {
                    select(PaneId::DoubleLeft, label)?;
                }
                if let Some(label) = config.pass2.as_deref() {
                    select(PaneId::DoubleRight, label)?;
                }
            }
            Tab::Edit => {}
        }

        tracing::debug!(session = %session.id, %tab, "session configured");
        Ok(session)
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn store(&self) -> &StageStore {
        &self.store
    }

    /// Shared handle to the current store snapshot
    pub fn store_handle(&self) -> Rc<StageStore> {
        Rc::clone(&self.store)
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn prefs(&self) -> &DisplayPrefs {
        &self.prefs
    }

    /// Mutable access for preferences that are not session transitions,
    /// such as embedding
    pub fn prefs_mut(&mut self) -> &mut DisplayPrefs {
        &mut self.prefs
    }

    pub fn edit(&self) -> &EditSession {
        &self.edit
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    /// Outcome of the last transition, for a status line
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn render_style(&self) -> RenderStyle {
        self.prefs.render_style()
    }

    /// Apply one event.
    ///
    /// Errors are also recorded as the session message; the session stays
    /// usable after any of them.
    pub fn dispatch<R>(&mut self, event: Event, runner: &mut R) -> Result<Redraw, SessionError>
    where
        R: PipelineRunner + ?Sized,
    {
        tracing::debug!(session = %self.id, ?event, "dispatch");
        self.message = None;
        let result = match event {
            Event::SelectPass { pane, label } => self.select_pane(pane, &label),
            Event::Step(direction) => Ok(self.step_sequential(direction)),
            Event::ToggleLineNumbers => Ok(self.toggle_line_numbers()),
            Event::SetHighlightStyle(name) => self.set_highlight_style(&name),
            Event::CycleHighlightStyle => Ok(self.cycle_highlight_style()),
            Event::SwitchTab(tab) => Ok(self.switch_tab(tab)),
            Event::EditBuffer(text) => Ok(self.edit_buffer(text)),
            Event::TogglePass(ordinal) => self.toggle_pass(ordinal),
            Event::Apply => self.apply_changes(runner),
        };

        if let Err(err) = &result {
            self.message = Some(err.to_string());
        }
        result
    }

    /// Point a pane at the stage named by `label`.
    pub fn select_pane(&mut self, pane: PaneId, label: &str) -> Result<Redraw, SessionError> {
        match self.view.select(pane, label, &self.store) {
            Ok(redraw) => Ok(redraw),
            Err(err) => {
                tracing::debug!(%pane, %label, "selection failed: {err}");
                Err(err.into())
            }
        }
    }

    pub fn step_sequential(&mut self, direction: Direction) -> Redraw {
        self.view.step(direction, &self.store)
    }

    pub fn toggle_line_numbers(&mut self) -> Redraw {
        self.prefs.toggle_line_numbers();
        Redraw::all()
    }

    pub fn set_highlight_style(&mut self, name: &str) -> Result<Redraw, SessionError> {
        if self.prefs.set_highlight_style(name) {
            Ok(Redraw::all())
        } else {
            Err(SessionError::UnknownHighlightStyle(name.to_string()))
        }
    }

    pub fn cycle_highlight_style(&mut self) -> Redraw {
        self.prefs.cycle_highlight_style();
        Redraw::all()
    }

    pub fn switch_tab(&mut self, tab: Tab) -> Redraw {
        self.tab = tab;
        Redraw::of(tab.panes())
    }

    /// Replace the edit buffer. The displayed stages do not change until an
    /// apply succeeds.
    pub fn edit_buffer(&mut self, text: String) -> Redraw {
        self.edit.set_buffer(text);
        Redraw::none()
    }

    pub fn toggle_pass(&mut self, ordinal: usize) -> Result<Redraw, SessionError> {
        self.edit.toggle_pass(ordinal)?;
        Ok(Redraw::none())
    }

    pub fn set_pass_selected(&mut self, ordinal: usize, selected: bool) -> Result<Redraw, SessionError> {
        self.edit.set_pass_selected(ordinal, selected)?;
        Ok(Redraw::none())
    }

    pub fn mark_dirty(&mut self) {
        self.edit.mark_dirty();
    }

    /// Re-run the selected passes over the edit buffer.
    ///
    /// On success the store is replaced, every cursor returns to its default
    /// and the edit session is clean again. On failure nothing but the
    /// session message changes and apply is enabled again for a retry.
    pub fn apply_changes<R>(&mut self, runner: &mut R) -> Result<Redraw, SessionError>
    where
        R: PipelineRunner + ?Sized,
    {
        if !self.edit.can_apply() {
            return Err(SessionError::ApplyUnavailable);
        }
        self.edit.state = ApplyState::Applying;

        let input = self.edit.buffer.clone();
        let passes = self.edit.selected_identifiers();
        let outcome = runner
            .run(input.as_bytes(), &passes)
            .and_then(|store| check_contract(input.as_bytes(), &passes, &store).map(|()| store));

        match outcome {
            Ok(store) => {
                self.view.reset(&store);
                self.store = Rc::new(store);
                self.edit.state = ApplyState::Clean;
                self.message = Some(format!("Applied {} passes", passes.len()));
                tracing::info!(session = %self.id, passes = passes.len(), "pipeline re-run applied");
                Ok(Redraw::all())
            }
            Err(failure) => {
                self.edit.state = ApplyState::Dirty;
                tracing::warn!(session = %self.id, "pipeline re-run failed: {failure}");
                Err(failure.into())
            }
        }
    }

    /// What `pane` shows right now
    pub fn pane_content(&self, pane: PaneId) -> PaneContent<'_> {
        if let Some(label) = self.view.not_found(pane) {
            return PaneContent::NotFound { label };
        }
        let index = self.view.stage_index(pane);
        PaneContent::Stage {
            index,
            label: self.store.display_label(index).unwrap_or_default(),
            text: self.store.stage_text(index).unwrap_or_default(),
        }
    }

    /// Tokenize and render the stage shown by `pane`; `None` when the pane
    /// shows the not-found marker.
    pub fn render_pane<Rd: Renderer>(&self, pane: PaneId, renderer: &Rd) -> Option<Rd::Output> {
        match self.pane_content(pane) {
            PaneContent::Stage { text, .. } => {
                Some(renderer.render(&tokenize(text), &self.render_style()))
            }
            PaneContent::NotFound { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::NoRunner;

    fn store() -> StageStore {
        StageStore::new(vec!["s0", "s1", "s2"], vec!["canon", "cse"]).unwrap()
    }

    #[test]
    fn test_edit_session_defaults() {
        let edit = EditSession::new(&store());
        assert_eq!(edit.buffer(), "s0");
        assert_eq!(edit.pass_options(), &["--canon", "--cse"]);
        assert_eq!(edit.selected_identifiers(), vec!["canon", "cse"]);
        assert!(!edit.is_dirty());
        assert!(!edit.can_apply());
    }

    #[test]
    fn test_unchanged_buffer_stays_clean() {
        let mut edit = EditSession::new(&store());
        assert!(!edit.set_buffer("s0".into()));
        assert!(!edit.is_dirty());
        assert!(edit.set_buffer("s0 edited".into()));
        assert!(edit.can_apply());
    }

    #[test]
    fn test_toggle_pass_marks_dirty_and_filters_identifiers() {
        let mut edit = EditSession::new(&store());
        assert_eq!(edit.toggle_pass(1), Ok(false));
        assert!(edit.is_dirty());
        assert_eq!(edit.selected_identifiers(), vec!["cse"]);
        assert_eq!(edit.toggle_pass(1), Ok(true));
        // re-checking does not make it clean again
        assert!(edit.is_dirty());
        assert_eq!(edit.toggle_pass(3), Err(SessionError::UnknownPassOrdinal(3)));
        assert_eq!(edit.toggle_pass(0), Err(SessionError::UnknownPassOrdinal(0)));
    }

    #[test]
    fn test_apply_requires_dirty() {
        let mut session = Session::new(store());
        let err = session.dispatch(Event::Apply, &mut NoRunner).unwrap_err();
        assert_eq!(err, SessionError::ApplyUnavailable);
        assert_eq!(session.message(), Some("nothing to apply"));
    }

    #[test]
    fn test_applying_state_blocks_reentry() {
        let mut session = Session::new(store());
        session.mark_dirty();
        session.edit.state = ApplyState::Applying;
        assert_eq!(
            session.apply_changes(&mut NoRunner),
            Err(SessionError::ApplyUnavailable)
        );
    }

    #[test]
    fn test_contract_violation_is_a_failure() {
        let mut session = Session::new(store());
        session.edit_buffer("changed".into());
        let mut runner = |_: &[u8], _: &[String]| {
            Ok::<_, PipelineFailure>(StageStore::initial_only("something else"))
        };
        let err = session.apply_changes(&mut runner).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Pipeline(PipelineFailure::ContractViolation(_))
        ));
        assert!(session.edit().can_apply());
    }

    #[test]
    fn test_pane_content_shows_marker() {
        let mut session = Session::new(store());
        let _ = session.select_pane(PaneId::DoubleLeft, "--nope");
        assert_eq!(
            session.pane_content(PaneId::DoubleLeft),
            PaneContent::NotFound { label: "--nope" }
        );
        assert_eq!(
            PaneContent::not_found_message("--nope"),
            "No pass found named --nope"
        );
        match session.pane_content(PaneId::DoubleRight) {
            PaneContent::Stage { index, label, text } => {
                assert_eq!(index, 1);
                assert_eq!(label, "[1/2] canon");
                assert_eq!(text, "s1");
            }
            other => panic!("unexpected content {other:?}"),
        }
    }

    #[test]
    fn test_style_events_redraw_everything() {
        let mut session = Session::new(store());
        let redraw = session
            .dispatch(Event::ToggleLineNumbers, &mut NoRunner)
            .unwrap();
        assert!(redraw.is_all());
        assert!(!session.prefs().show_line_numbers);

        let err = session
            .dispatch(Event::SetHighlightStyle("neon".into()), &mut NoRunner)
            .unwrap_err();
        assert_eq!(err, SessionError::UnknownHighlightStyle("neon".into()));
        assert_eq!(session.prefs().highlight_style(), "default");
    }

    #[test]
    fn test_switch_tab_redraws_its_panes() {
        let mut session = Session::new(store());
        let redraw = session.switch_tab(Tab::Double);
        assert!(redraw.contains(PaneId::DoubleLeft));
        assert!(redraw.contains(PaneId::DoubleRight));
        assert!(!redraw.contains(PaneId::Single));
        assert!(session.switch_tab(Tab::Edit).is_empty());
    }
}
