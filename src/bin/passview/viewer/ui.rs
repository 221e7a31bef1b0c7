//! UI rendering logic
//!
//! Layout structure:
//! - Tab bar (1 line, fixed)
//! - Middle section, depending on the tab:
//!   - Sequential: previous stage | current stage
//!   - Single: one stage
//!   - Double: two independently chosen stages
//!   - Edit: input editor | pass checklist
//! - Status line (1 line, fixed)

use super::app::App;
use passview::{ApplyState, PaneContent, PaneId, Tab, TerminalRenderer};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};
use ratatui::Frame;

/// Minimum terminal width required for the UI
const MIN_TERMINAL_WIDTH: u16 = 50;
/// Width allocated to the pass checklist on the edit tab
const CHECKLIST_WIDTH: u16 = 32;
/// Height of the status line
const STATUS_LINE_HEIGHT: u16 = 1;

/// Render the entire UI
pub fn render(frame: &mut Frame, app: &App, file_name: &str) {
    let size = frame.area();

    if size.width < MIN_TERMINAL_WIDTH {
        render_error_too_narrow(frame, size);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(STATUS_LINE_HEIGHT),
        ])
        .split(size);

    render_tab_bar(frame, chunks[0], app, file_name);
    match app.session.tab() {
        Tab::Sequential => render_split(frame, chunks[1], app, PaneId::SeqLeft, PaneId::SeqRight),
        Tab::Single => render_pane(frame, chunks[1], app, PaneId::Single),
        Tab::Double => {
            render_split(frame, chunks[1], app, PaneId::DoubleLeft, PaneId::DoubleRight)
        }
        Tab::Edit => render_edit(frame, chunks[1], app),
    }
    render_status_line(frame, chunks[2], app);
}

fn render_error_too_narrow(frame: &mut Frame, area: Rect) {
    let msg = format!(
        "Terminal too narrow: {} < {} chars",
        area.width, MIN_TERMINAL_WIDTH
    );
    let paragraph =
        Paragraph::new(msg).style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD));
    frame.render_widget(paragraph, area);
}

fn render_tab_bar(frame: &mut Frame, area: Rect, app: &App, file_name: &str) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(file_name.len() as u16 + 2)])
        .split(area);

    let bar = Style::default().fg(Color::Black).bg(Color::Cyan);
    let selected = Tab::ALL
        .iter()
        .position(|tab| *tab == app.session.tab())
        .unwrap_or(0);
    let tabs = Tabs::new(Tab::ALL.iter().map(|tab| tab.title()))
        .select(selected)
        .style(bar)
        .highlight_style(bar.add_modifier(Modifier::BOLD | Modifier::REVERSED));
    frame.render_widget(tabs, chunks[0]);

    let title = Paragraph::new(format!(" {file_name} ")).style(bar.add_modifier(Modifier::BOLD));
    frame.render_widget(title, chunks[1]);
}

fn render_split(frame: &mut Frame, area: Rect, app: &App, left: PaneId, right: PaneId) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_pane(frame, chunks[0], app, left);
    render_pane(frame, chunks[1], app, right);
}

fn render_pane(frame: &mut Frame, area: Rect, app: &App, pane: PaneId) {
    let focused = app.session.tab() == Tab::Double && app.double_focus == pane;
    let content = app.session.pane_content(pane);
    let label = match &content {
        PaneContent::Stage { label, .. } => label.clone(),
        PaneContent::NotFound { label } => label.to_string(),
    };
    let title = if focused {
        format!("{label} [FOCUSED]")
    } else {
        label
    };

    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let paragraph = match content {
        PaneContent::NotFound { label } => Paragraph::new(PaneContent::not_found_message(label))
            .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        PaneContent::Stage { .. } => match app.session.render_pane(pane, &TerminalRenderer) {
            Some(text) => Paragraph::new(text),
            None => Paragraph::new(""),
        },
    };
    frame.render_widget(paragraph.scroll((app.scroll(pane), 0)), inner);
}

fn render_edit(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(CHECKLIST_WIDTH)])
        .split(area);

    let title = if app.editing {
        "Input [EDITING]"
    } else {
        "Input"
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(chunks[0]);
    frame.render_widget(block, chunks[0]);
    app.editor.render(frame, inner, app.editing);

    let edit = app.session.edit();
    let lines: Vec<Line> = edit
        .pass_options()
        .iter()
        .enumerate()
        .map(|(row, option)| {
            let mark = if edit.is_selected(row + 1) { 'x' } else { ' ' };
            let text = format!("[{mark}] {option}");
            if !app.editing && row == app.checklist_cursor {
                Line::from(Span::styled(
                    text,
                    Style::default().add_modifier(Modifier::REVERSED),
                ))
            } else {
                Line::from(text)
            }
        })
        .collect();

    let state = match edit.state() {
        ApplyState::Clean => "Passes",
        ApplyState::Dirty => "Passes [a: apply]",
        ApplyState::Applying => "Passes [applying]",
    };
    let checklist = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(state));
    frame.render_widget(checklist, chunks[1]);
}

fn key_hints(app: &App) -> &'static str {
    if app.editing {
        return "Esc: done  Ctrl+S: apply";
    }
    match app.session.tab() {
        Tab::Sequential => "←/→: step  l: lines  s: style  Tab: next view  q: quit",
        Tab::Single => "↑/↓: stage  l: lines  s: style  Tab: next view  q: quit",
        Tab::Double => "←/→: focus  ↑/↓: stage  Tab: next view  q: quit",
        Tab::Edit => "e: edit  space: toggle pass  a: apply  q: quit",
    }
}

fn render_status_line(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = Vec::new();
    match app.session.message() {
        Some(message) => spans.push(Span::styled(
            message.to_string(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        None => spans.push(Span::raw(key_hints(app))),
    }

    let prefs = app.session.prefs();
    spans.push(Span::raw(" | "));
    spans.push(Span::styled("Style: ", Style::default().fg(Color::Yellow)));
    spans.push(Span::raw(prefs.highlight_style().to_string()));
    if prefs.show_line_numbers {
        spans.push(Span::raw(" | #"));
    }

    let paragraph =
        Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black).fg(Color::White));
    frame.render_widget(paragraph, area);
}
