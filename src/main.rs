use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::*;
use tracing::{info, warn};

use cricbuzz_terminal::app::App;
use cricbuzz_terminal::config::{self, ApiConfig, DbConfig};
use cricbuzz_terminal::cricbuzz_api::CricbuzzClient;
use cricbuzz_terminal::db::Database;
use cricbuzz_terminal::http_client::http_client;
use cricbuzz_terminal::logging;

mod ui;

fn main() -> Result<()> {
    config::load_dotenv();
    let _log_guard = logging::init_file_logging();

    let api_config = match ApiConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}\n\n{}", config::missing_api_key_help());
            return Ok(());
        }
    };
    let client = CricbuzzClient::from_http(http_client(&api_config)?);

    let db_config = match DbConfig::from_env() {
        Ok(config) => Some(config),
        Err(err) => {
            warn!(error = %err, "database not configured");
            None
        }
    };
    let db = Database::open(db_config.as_ref());
    let mut app = App::new(client, db, db_config.map(|c| c.describe()));
    info!("starting dashboard");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);

    loop {
        terminal.draw(|f| ui::ui(f, &app.state))?;

        // The frame above shows the busy line; now do the blocking work.
        if app.pending().is_some() {
            app.run_pending();
            continue;
        }

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
