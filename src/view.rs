//! Pane cursors and display preferences
//!
//! Five panes show stages across the viewing tabs:
//!
//! - Sequential: `SeqRight` picks any pass; `SeqLeft` always shows the stage
//!   just before it and cannot be selected on its own.
//! - Single: one pane over the initial text and every pass.
//! - Double: two independent panes over the initial text and every pass.
//!
//! The edit tab has no pane; it hosts the edit session instead.
//!
//! Every stored index stays within the current store's stage range. A
//! selection that names an unknown pass leaves the index alone and puts a
//! "not found" marker on the pane until the next valid selection or reset.

use crate::highlight::{Palette, RenderStyle};
use crate::stages::StageStore;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One stage-viewing pane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PaneId {
    SeqLeft,
    SeqRight,
    Single,
    DoubleLeft,
    DoubleRight,
}

impl PaneId {
    pub const ALL: [PaneId; 5] = [
        PaneId::SeqLeft,
        PaneId::SeqRight,
        PaneId::Single,
        PaneId::DoubleLeft,
        PaneId::DoubleRight,
    ];

    /// Whether the pane's picker offers the initial sentinel
    pub fn allows_initial(&self) -> bool {
        !matches!(self, PaneId::SeqLeft | PaneId::SeqRight)
    }

    fn slot(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for PaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The four top-level views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    Sequential,
    Single,
    Double,
    Edit,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Sequential, Tab::Single, Tab::Double, Tab::Edit];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Sequential => "Sequential",
            Tab::Single => "Single",
            Tab::Double => "Double",
            Tab::Edit => "Edit",
        }
    }

    /// Panes displayed on this tab
    pub fn panes(&self) -> &'static [PaneId] {
        match self {
            Tab::Sequential => &[PaneId::SeqLeft, PaneId::SeqRight],
            Tab::Single => &[PaneId::Single],
            Tab::Double => &[PaneId::DoubleLeft, PaneId::DoubleRight],
            Tab::Edit => &[],
        }
    }

    pub fn next(&self) -> Tab {
        Tab::ALL[(*self as usize + 1) % Tab::ALL.len()]
    }

    pub fn prev(&self) -> Tab {
        Tab::ALL[(*self as usize + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tab::ALL
            .into_iter()
            .find(|tab| tab.title().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| s.to_string())
    }
}

/// Step direction for the sequential view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

/// Errors selecting a stage for a pane
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    #[error("No pass found named {0}")]
    UnknownPass(String),
    #[error("pane {0} follows another pane and cannot be selected directly")]
    DerivedPane(PaneId),
}

/// Set of panes a state change invalidated
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Redraw(BTreeSet<PaneId>);

impl Redraw {
    pub fn none() -> Self {
        Redraw::default()
    }

    pub fn all() -> Self {
        Redraw(PaneId::ALL.into_iter().collect())
    }

    pub fn of(panes: &[PaneId]) -> Self {
        Redraw(panes.iter().copied().collect())
    }

    pub fn contains(&self, pane: PaneId) -> bool {
        self.0.contains(&pane)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_all(&self) -> bool {
        self.0.len() == PaneId::ALL.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = PaneId> + '_ {
        self.0.iter().copied()
    }
}

/// Global display preferences; independent of any cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayPrefs {
    pub show_line_numbers: bool,
    highlight_style: String,
    pub embedded: bool,
}

impl DisplayPrefs {
    /// Preferences with a validated palette name
    pub fn new(show_line_numbers: bool, highlight_style: &str) -> Option<Self> {
        let palette = Palette::by_name(highlight_style)?;
        Some(DisplayPrefs {
            show_line_numbers,
            highlight_style: palette.name.to_string(),
            embedded: false,
        })
    }

    pub fn highlight_style(&self) -> &str {
        &self.highlight_style
    }

    pub fn toggle_line_numbers(&mut self) {
        self.show_line_numbers = !self.show_line_numbers;
    }

    /// Switch palette; returns false and leaves the style alone for unknown names
    pub fn set_highlight_style(&mut self, name: &str) -> bool {
        match Palette::by_name(name) {
            Some(palette) => {
                self.highlight_style = palette.name.to_string();
                true
            }
            None => false,
        }
    }

    /// Move to the next palette in the list, wrapping around
    pub fn cycle_highlight_style(&mut self) {
        let names: Vec<&str> = Palette::names().collect();
        let current = names
            .iter()
            .position(|name| *name == self.highlight_style)
            .unwrap_or(0);
        self.highlight_style = names[(current + 1) % names.len()].to_string();
    }

    pub fn render_style(&self) -> RenderStyle {
        RenderStyle {
            highlight_style: self.highlight_style.clone(),
            show_line_numbers: self.show_line_numbers,
            embedded: self.embedded,
        }
    }
}

impl Default for DisplayPrefs {
    fn default() -> Self {
        DisplayPrefs {
            show_line_numbers: true,
            highlight_style: Palette::default_palette().name.to_string(),
            embedded: false,
        }
    }
}

/// Stage cursors for every pane
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    /// Indexed by [`PaneId`]; the `SeqLeft` slot is unused, it is derived
    indices: [usize; 5],
    not_found: [Option<String>; 5],
}

impl ViewState {
    /// Cursors at their defaults for `store`
    pub fn new(store: &StageStore) -> Self {
        let first_pass = first_pass(store);
        let mut indices = [0; 5];
        indices[PaneId::SeqRight.slot()] = first_pass;
        indices[PaneId::DoubleRight.slot()] = first_pass;
        ViewState {
            indices,
            not_found: Default::default(),
        }
    }

    /// Back to defaults, clearing every marker
    pub fn reset(&mut self, store: &StageStore) {
        *self = ViewState::new(store);
    }

    /// Stage index shown by `pane`
    pub fn stage_index(&self, pane: PaneId) -> usize {
        match pane {
            PaneId::SeqLeft => self.indices[PaneId::SeqRight.slot()].saturating_sub(1),
            other => self.indices[other.slot()],
        }
    }

    /// Label of a failed selection, if the pane is showing the marker
    pub fn not_found(&self, pane: PaneId) -> Option<&str> {
        let slot = match pane {
            PaneId::SeqLeft => PaneId::SeqRight.slot(),
            other => other.slot(),
        };
        self.not_found[slot].as_deref()
    }

    /// Point `pane` at the stage named by `label`.
    pub fn select(
        &mut self,
        pane: PaneId,
        label: &str,
        store: &StageStore,
    ) -> Result<Redraw, SelectError> {
        if pane == PaneId::SeqLeft {
            return Err(SelectError::DerivedPane(pane));
        }

        let resolved = store
            .resolve(label)
            .filter(|&index| index > 0 || pane.allows_initial());
        let redraw = match pane {
            PaneId::SeqRight => Redraw::of(&[PaneId::SeqLeft, PaneId::SeqRight]),
            other => Redraw::of(&[other]),
        };

        match resolved {
            Some(index) => {
                self.indices[pane.slot()] = index;
                self.not_found[pane.slot()] = None;
                Ok(redraw)
            }
            None => {
                self.not_found[pane.slot()] = Some(label.to_string());
                Err(SelectError::UnknownPass(label.to_string()))
            }
        }
    }

    /// Move the sequential view one pass back or forward, clamped to the
    /// first and last pass.
    pub fn step(&mut self, direction: Direction, store: &StageStore) -> Redraw {
        let count = store.pass_count();
        if count == 0 {
            return Redraw::none();
        }

        let slot = PaneId::SeqRight.slot();
        let current = self.indices[slot].max(1);
        self.indices[slot] = match direction {
            Direction::Prev => current.saturating_sub(1).max(1),
            Direction::Next => (current + 1).min(count),
        };
        self.not_found[slot] = None;
        Redraw::of(&[PaneId::SeqLeft, PaneId::SeqRight])
    }
}

fn first_pass(store: &StageStore) -> usize {
    store.pass_count().min(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(passes: usize) -> StageStore {
        let stages: Vec<String> = (0..=passes).map(|i| format!("stage {i}")).collect();
        let names: Vec<String> = (1..=passes).map(|i| format!("p{i}")).collect();
        StageStore::new(stages, names).unwrap()
    }

    #[test]
    fn test_defaults() {
        let view = ViewState::new(&store(3));
        assert_eq!(view.stage_index(PaneId::SeqRight), 1);
        assert_eq!(view.stage_index(PaneId::SeqLeft), 0);
        assert_eq!(view.stage_index(PaneId::Single), 0);
        assert_eq!(view.stage_index(PaneId::DoubleLeft), 0);
        assert_eq!(view.stage_index(PaneId::DoubleRight), 1);
    }

    #[test]
    fn test_defaults_without_passes() {
        let store = store(0);
        let mut view = ViewState::new(&store);
        for pane in PaneId::ALL {
            assert_eq!(view.stage_index(pane), 0);
        }
        assert!(view.step(Direction::Next, &store).is_empty());
        assert_eq!(view.stage_index(PaneId::SeqRight), 0);
    }

    #[test]
    fn test_seq_left_follows_seq_right() {
        let store = store(4);
        let mut view = ViewState::new(&store);
        for label in store.option_labels(false) {
            view.select(PaneId::SeqRight, &label, &store).unwrap();
            let right = view.stage_index(PaneId::SeqRight);
            assert_eq!(view.stage_index(PaneId::SeqLeft), right.saturating_sub(1));
        }
    }

    #[test]
    fn test_step_clamps_at_both_ends() {
        let store = store(2);
        let mut view = ViewState::new(&store);
        view.step(Direction::Prev, &store);
        assert_eq!(view.stage_index(PaneId::SeqRight), 1);
        view.step(Direction::Next, &store);
        view.step(Direction::Next, &store);
        assert_eq!(view.stage_index(PaneId::SeqRight), 2);
        assert_eq!(view.stage_index(PaneId::SeqLeft), 1);
    }

    #[test]
    fn test_unknown_label_keeps_index_and_marks_pane() {
        let store = store(2);
        let mut view = ViewState::new(&store);
        view.select(PaneId::Single, "--p2", &store).unwrap();

        let err = view.select(PaneId::Single, "--nope", &store).unwrap_err();
        assert_eq!(err, SelectError::UnknownPass("--nope".into()));
        assert_eq!(view.stage_index(PaneId::Single), 2);
        assert_eq!(view.not_found(PaneId::Single), Some("--nope"));

        view.select(PaneId::Single, &store.initial_label(), &store)
            .unwrap();
        assert_eq!(view.not_found(PaneId::Single), None);
        assert_eq!(view.stage_index(PaneId::Single), 0);
    }

    #[test]
    fn test_sequential_rejects_initial_sentinel() {
        let store = store(2);
        let mut view = ViewState::new(&store);
        let initial = store.initial_label();
        assert!(view.select(PaneId::SeqRight, &initial, &store).is_err());
        assert_eq!(view.stage_index(PaneId::SeqRight), 1);
        assert_eq!(view.not_found(PaneId::SeqLeft), Some(initial.as_str()));
    }

    #[test]
    fn test_seq_left_is_not_selectable() {
        let store = store(2);
        let mut view = ViewState::new(&store);
        assert_eq!(
            view.select(PaneId::SeqLeft, "--p1", &store),
            Err(SelectError::DerivedPane(PaneId::SeqLeft))
        );
    }

    #[test]
    fn test_tab_parsing_and_cycling() {
        assert_eq!("double".parse::<Tab>(), Ok(Tab::Double));
        assert_eq!(" Edit ".parse::<Tab>(), Ok(Tab::Edit));
        assert!("split".parse::<Tab>().is_err());
        assert_eq!(Tab::Edit.next(), Tab::Sequential);
        assert_eq!(Tab::Sequential.prev(), Tab::Edit);
    }

    #[test]
    fn test_prefs_style_validation() {
        let mut prefs = DisplayPrefs::default();
        assert!(!prefs.set_highlight_style("nope"));
        assert_eq!(prefs.highlight_style(), "default");
        assert!(prefs.set_highlight_style("MONOKAI"));
        assert_eq!(prefs.highlight_style(), "monokai");
        prefs.cycle_highlight_style();
        assert_eq!(prefs.highlight_style(), "solarized-dark");
        assert!(DisplayPrefs::new(true, "bogus").is_none());
    }
}
