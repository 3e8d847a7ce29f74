// Question dataset browser on ratatui + crossterm.
// - loads the bundled sample at startup; JSON / JSONL from a Hugging Face dataset repo on demand
// - cards: search + sort + limit; gallery: start-index filter + image fields
// - loads run on a worker thread; stale results are dropped

mod ui;

use std::{
    fs::OpenOptions,
    io,
    path::Path,
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::{unbounded, Receiver};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use qbank::{
    config::{Cli, Settings},
    session::LoadOutcome,
    Fetcher, HttpFetcher,
};
use ui::App;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli)?;
    init_logging(&settings.log_file)?;
    tracing::info!(variant = ?settings.variant, host = %settings.host, "starting");

    let fetcher: Arc<dyn Fetcher> =
        Arc::new(HttpFetcher::new(settings.timeout).context("failed to build HTTP client")?);
    let (tx, rx) = unbounded::<LoadOutcome>();
    let mut app = App::new(&settings, fetcher, tx);
    app.load_sample();

    // terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, &rx);

    // restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    if let Err(e) = &res {
        tracing::error!(error = %e, "exited with error");
    }
    res
}

fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file: {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // the TUI owns the terminal, so logs only go to the file
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: &Receiver<LoadOutcome>,
) -> Result<()> {
    loop {
        // handlers run to completion one at a time, so view state needs no lock
        while let Ok(outcome) = rx.try_recv() {
            app.session.finish(outcome);
        }
        terminal.draw(|f| ui::draw(f, app))?;
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(k) = event::read()? {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                if ui::handle_key(app, k) {
                    break;
                }
            }
        }
    }
    Ok(())
}
