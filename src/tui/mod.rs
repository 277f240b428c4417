pub mod app;
pub mod ui;

use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::runtime::Handle;

use crate::client::StatsTransport;

use app::{App, Completion, View};

pub fn run<T: StatsTransport + 'static>(runtime: &Handle, mut app: App<T>) -> Result<()> {
    let (tx, rx) = mpsc::channel::<Completion>();

    // The first submission starts right away; later ones are user-initiated.
    app.submit(runtime, &tx);

    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, runtime, &mut app, &tx, rx);

    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_loop<T: StatsTransport + 'static>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    runtime: &Handle,
    app: &mut App<T>,
    tx: &mpsc::Sender<Completion>,
    rx: mpsc::Receiver<Completion>,
) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        while let Ok(completion) = rx.try_recv() {
            app.complete(completion);
        }
        app.controller.tick(Instant::now());

        // Short poll so fades progress smoothly.
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match app.view {
                    View::Main => match key.code {
                        KeyCode::Char('q') => {
                            app.should_quit = true;
                        }
                        KeyCode::Char('s') | KeyCode::Enter => {
                            app.submit(runtime, tx);
                        }
                        KeyCode::Char('n') | KeyCode::Char(' ') | KeyCode::Right => {
                            app.advance();
                        }
                        KeyCode::Char('c') => {
                            app.cancel();
                        }
                        KeyCode::Char('e') => {
                            app.open_export();
                        }
                        KeyCode::Char('a') => {
                            app.view = View::About;
                        }
                        _ => {}
                    },
                    View::About => match key.code {
                        KeyCode::Esc | KeyCode::Char('q') => {
                            app.view = View::Main;
                        }
                        _ => {}
                    },
                    View::Export => match key.code {
                        KeyCode::Esc => {
                            app.view = View::Main;
                        }
                        KeyCode::Tab => {
                            app.cycle_export_format();
                        }
                        KeyCode::Enter => {
                            app.export();
                        }
                        _ => {}
                    },
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
