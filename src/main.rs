use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use gravity_connect_four::ai::AiTier;
use gravity_connect_four::config::{AppConfig, Difficulty};
use gravity_connect_four::game::GravityMode;
use gravity_connect_four::session::Session;
use gravity_connect_four::ui::App;
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Connect Four with reversible gravity, in the terminal.
#[derive(Parser, Debug)]
#[command(name = "gravity-four", version, about)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Board preset: easy, normal or hard
    #[arg(short, long)]
    difficulty: Option<Difficulty>,

    /// Gravity mode: fixed or reversing
    #[arg(short, long)]
    mode: Option<GravityMode>,

    /// Play against the computer at this tier: easy, medium or hard
    #[arg(long, conflicts_with = "pvp")]
    ai: Option<AiTier>,

    /// Two players at one keyboard
    #[arg(long)]
    pvp: bool,

    /// Where to write logs; the terminal belongs to the UI
    #[arg(long, default_value = "gravity_four.log")]
    log_file: PathBuf,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn init_logging(path: &Path) -> Result<()> {
    let log_file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", AppConfig::default_toml());
        return Ok(());
    }

    init_logging(&cli.log_file)?;

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    if let Some(difficulty) = cli.difficulty {
        config.game.difficulty = difficulty;
    }
    if let Some(mode) = cli.mode {
        config.game.gravity_mode = mode;
    }
    if let Some(tier) = cli.ai {
        config.game.vs_computer = true;
        config.game.ai_tier = tier;
    }
    if cli.pvp {
        config.game.vs_computer = false;
    }

    let game = config.game_config();
    info!(
        rows = game.rows,
        cols = game.cols,
        prefill = game.prefill,
        mode = %game.gravity_mode,
        opponent = ?game.opponent,
        "starting session"
    );
    let session = Session::new(game).context("invalid game configuration")?;
    let mut app = App::new(session, config);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = app.run(&mut terminal);

    // Restore terminal, even on error
    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let _ = terminal.show_cursor();

    info!("session ended");
    res.context("terminal UI failed")
}
