mod actions;
mod app;
mod input;
mod persistence;
mod view;

use anyhow::{Context, Result};
use app::App;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event as CEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use persistence::{default_data_dir, FileStorage};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use sipdeck_data::load_deck_config_or_default;
use std::fs::{self, File};
use std::io::{self, stdout, IsTerminal};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    pub cards: Option<PathBuf>,
    pub seed: Option<u64>,
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
}

pub fn run(options: LaunchOptions) -> Result<()> {
    let data_dir = options
        .data_dir
        .clone()
        .or_else(default_data_dir)
        .context("no data directory; pass --data-dir or set SIPDECK_DATA")?;
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("create data directory {}", data_dir.display()))?;
    init_logging(&data_dir)?;

    let config = load_deck_config_or_default(options.config.as_deref())?;
    info!(data_dir = %data_dir.display(), ?config, "starting");
    let mut app = App::bootstrap(
        config,
        options.seed,
        options.cards.as_deref(),
        FileStorage::new(&data_dir),
    );

    ensure_interactive_terminal()?;

    enable_raw_mode().map_err(|err| {
        anyhow::anyhow!(
            "failed to enable raw mode; ensure the process owns an interactive terminal: {err}"
        )
    })?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let run_result = run_loop(&mut terminal, &mut app);
    app.shutdown();
    restore_terminal(&mut terminal)?;
    run_result
}

pub fn run_with_args(args: &[String]) -> Result<()> {
    let options = parse_options(args);
    run(options)
}

fn parse_options(args: &[String]) -> LaunchOptions {
    let mut cards = None;
    let mut seed = None;
    let mut config = std::env::var_os("SIPDECK_CONFIG").map(PathBuf::from);
    let mut data_dir = None;
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--cards" => {
                if let Some(value) = args.get(idx + 1) {
                    cards = Some(PathBuf::from(value));
                    idx += 1;
                }
            }
            "--seed" => {
                if let Some(value) = args.get(idx + 1) {
                    seed = value.parse::<u64>().ok();
                    idx += 1;
                }
            }
            "--config" => {
                if let Some(value) = args.get(idx + 1) {
                    config = Some(PathBuf::from(value));
                    idx += 1;
                }
            }
            "--data-dir" => {
                if let Some(value) = args.get(idx + 1) {
                    data_dir = Some(PathBuf::from(value));
                    idx += 1;
                }
            }
            _ => {}
        }
        idx += 1;
    }
    LaunchOptions {
        cards,
        seed,
        config,
        data_dir,
    }
}

/// The terminal belongs to the UI, so logs only go to a file and only when
/// `SIPDECK_LOG` is set.
fn init_logging(data_dir: &Path) -> Result<()> {
    let Ok(env) = std::env::var("SIPDECK_LOG") else {
        return Ok(());
    };
    let filter = tracing_subscriber::EnvFilter::from_str(&env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let path = data_dir.join("sipdeck.log");
    let file = File::options()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}

fn run_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let frame_rate = Duration::from_millis(16);
    let started = Instant::now();
    let size = terminal.size().context("read terminal size")?;
    app.on_resize(size.width, size.height);
    while !app.should_quit {
        terminal.draw(|frame| view::draw(frame, app))?;
        if event::poll(frame_rate)? {
            let now = started.elapsed();
            match event::read()? {
                CEvent::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if app.handle_roster_key(key) {
                        continue;
                    }
                    actions::dispatch(app, input::map_key(key), now);
                }
                CEvent::Mouse(mouse) => app.handle_mouse(mouse, now),
                CEvent::Resize(width, height) => app.on_resize(width, height),
                _ => {}
            }
        }
        app.on_tick(started.elapsed());
    }
    Ok(())
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("leave alternate screen")?;
    terminal.show_cursor().context("show cursor")?;
    Ok(())
}

fn ensure_interactive_terminal() -> Result<()> {
    if io::stdin().is_terminal() && io::stdout().is_terminal() {
        return Ok(());
    }
    anyhow::bail!(
        "sipdeck requires an interactive TTY (run directly in a terminal, not a piped/headless shell)"
    );
}
