//! Terminal setup and the event loop for the interactive viewer
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use passview::{PipelineRunner, Session};
use ratatui::prelude::*;
use std::io;
use std::time::Duration;

use super::app::App;
use super::ui;

/// Run the viewer over `session` until the user quits
pub fn run_viewer(
    session: Session,
    runner: Box<dyn PipelineRunner>,
    file_name: &str,
) -> io::Result<()> {
    let mut app = App::new(session, runner);
    tracing::info!(session = %app.session.id(), file = file_name, "viewer started");

    enable_raw_mode()?;
    let stdout = io::stdout();
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app, file_name);

    disable_raw_mode()?;
    terminal.clear()?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    file_name: &str,
) -> io::Result<()> {
    loop {
        terminal.draw(|frame| {
            ui::render(frame, app, file_name);
        })?;

        if app.should_quit {
            return Ok(());
        }

        if event::poll(Duration::from_millis(100))? {
            // Resize needs no handling: the next draw uses the new size
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }
    }
}
