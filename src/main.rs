use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

use decimal_calculator::{
    config::{parse_level, AppConfig},
    logging, repl, Dispatcher, HistoryStore, LineEditor, OperationRegistry, VERSION,
};

/// Interactive decimal calculator with persisted history
#[derive(Parser, Debug)]
#[command(name = "calculator")]
#[command(version = VERSION)]
#[command(about = "Interactive decimal calculator with persisted history", long_about = None)]
struct Args {
    /// CSV file holding the calculation history
    #[arg(long)]
    history_file: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, value_parser = parse_level_arg)]
    log_level: Option<LevelFilter>,

    /// Log file (appended to)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Also write logs to stderr
    #[arg(short, long)]
    debug: bool,

    /// Evaluate one command and exit (e.g. --eval "add 2 3")
    #[arg(short, long, value_name = "COMMAND")]
    eval: Option<String>,
}

fn parse_level_arg(value: &str) -> Result<LevelFilter, String> {
    parse_level(value).ok_or_else(|| format!("unknown log level '{}'", value))
}

fn main() -> Result<()> {
    // Environment first (.env included), flags override it
    let mut config = AppConfig::from_env();
    let args = Args::parse();

    if let Some(path) = args.history_file {
        config.history_file = path;
    }
    if let Some(level) = args.log_level {
        config.log_level = level;
    }
    if let Some(path) = args.log_file {
        config.log_file = path;
    }
    config.debug_mode |= args.debug;

    logging::init(&config)?;
    tracing::info!(history = %config.history_file.display(), "configuration loaded");

    let registry = OperationRegistry::with_builtins().context("Failed to register operations")?;
    let history = HistoryStore::new(config.history_file.clone());
    let mut dispatcher = Dispatcher::new(registry, history);

    let mut stdout = io::stdout();

    if let Some(command) = args.eval {
        repl::run_once(&mut dispatcher, &command, &mut stdout)?;
        return Ok(());
    }

    repl::print_banner(&mut stdout)?;
    let mut editor = LineEditor::new()?;
    repl::run(&mut dispatcher, &mut editor, &mut stdout)?;

    Ok(())
}
