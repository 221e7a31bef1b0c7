//! # passview
//!
//! Explore how an MLIR program changes across a pipeline of optimizer passes.
//!
//! A [`StageStore`] holds the program text before any pass ran and after each
//! pass. A [`Session`] keeps the stage cursors of every viewing pane, the
//! display preferences, and an edit session that re-runs a chosen subset of
//! passes over an edited text through a [`PipelineRunner`]. Stages are shown
//! through the [`tokenizer`] and one of the [`highlight`] renderers.

pub mod config;
pub mod highlight;
pub mod labels;
pub mod runner;
pub mod session;
pub mod stages;
pub mod tokenizer;
pub mod view;

pub use crate::config::{ConfigError, Loader, PassviewConfig, RunnerConfig, ViewConfig};
pub use crate::highlight::{HtmlRenderer, Palette, RenderStyle, Renderer, SessionId, TerminalRenderer};
pub use crate::runner::{check_contract, NoRunner, PipelineFailure, PipelineRunner, ProcessRunner};
pub use crate::session::{ApplyState, EditSession, Event, PaneContent, Session, SessionError};
pub use crate::stages::{PassDescriptor, PipelineResult, Stage, StageStore, StoreError};
pub use crate::tokenizer::{tokenize, Token, TokenKind};
pub use crate::view::{Direction, DisplayPrefs, PaneId, Redraw, SelectError, Tab, ViewState};
