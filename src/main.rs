use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::PathBuf,
    sync::Mutex,
    time::Instant,
};
use tracing::{error, info, warn, Level};

use typesim::{
    app::{App, DynStore},
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    finger::Alphabet,
    kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore},
    runtime::{CrosstermEventSource, FixedTicker, Runner},
    saved_texts::SavedTextStore,
    session::{Orientation, Session, MAX_TEXT_HEIGHT},
};

/// keyboard typing simulator with live scoring and finger guidance
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Practice typing any text you like. Errors, accuracy and speed are scored live, the keyboard diagram shows which finger strikes each key, and texts can be saved for later sessions."
)]
pub struct Cli {
    /// text to practice instead of the last one used
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// mismatches allowed before the session stops (999 means unlimited)
    #[clap(short = 'e', long, value_parser = clap::value_parser!(u64).range(1..))]
    max_errors: Option<u64>,

    /// keyboard diagram to show
    #[clap(short = 'a', long, value_enum)]
    alphabet: Option<Alphabet>,

    /// place the source and typing panes side by side or stacked
    #[clap(short = 'o', long, value_enum)]
    orientation: Option<Orientation>,

    /// lines shown in each text pane
    #[clap(long, value_parser = clap::value_parser!(u16).range(1..=MAX_TEXT_HEIGHT as i64))]
    height: Option<u16>,

    /// directory holding saved texts
    #[clap(long)]
    data_dir: Option<PathBuf>,

    /// where to write the log
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// log debug output, including every session transition
    #[clap(short = 'v', long)]
    verbose: bool,
}

impl Cli {
    /// Layer command line values over the persisted config.
    fn apply_to(&self, mut cfg: Config) -> Config {
        if let Some(prompt) = &self.prompt {
            cfg.source_text = prompt.clone();
        }
        if let Some(max_errors) = self.max_errors {
            cfg.max_errors = max_errors as usize;
        }
        if let Some(alphabet) = self.alphabet {
            cfg.alphabet = alphabet;
        }
        if let Some(orientation) = self.orientation {
            cfg.orientation = orientation;
        }
        if let Some(height) = self.height {
            cfg.text_height = height;
        }
        cfg
    }

    fn log_level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        }
    }
}

fn init_logging(cli: &Cli) -> io::Result<()> {
    let Some(path) = cli.log_file.clone().or_else(AppDirs::log_path) else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(cli.log_level())
        .init();
    Ok(())
}

fn open_store(cli: &Cli) -> DynStore {
    let backend: Box<dyn KeyValueStore> = match cli.data_dir.clone().or_else(AppDirs::data_dir) {
        Some(dir) => {
            info!("saved texts live in {}", dir.display());
            Box::new(FileKeyValueStore::with_dir(dir))
        }
        None => {
            warn!("no data directory available, saved texts will not persist");
            Box::new(MemoryKeyValueStore::default())
        }
    };
    SavedTextStore::open(backend)
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Err(e) = init_logging(&cli) {
        eprintln!("logging disabled: {e}");
    }

    let config_store = FileConfigStore::new();
    let cfg = cli.apply_to(config_store.load());
    let session = Session::new(cfg.source_text.clone(), cfg.session_settings());
    let mut app = App::new(session, open_store(&cli));

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = config_store.save(&Config::from(app.session())) {
        error!("failed to save config: {}", e);
    }
    info!("exiting");

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        let event = runner.step();
        app.on_event(event, Instant::now());

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}
