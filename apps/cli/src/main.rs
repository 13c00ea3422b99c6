mod commands;
mod config;
mod shell;

use std::env;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use skriv_core::OsFileSystem;
use skriv_session::{Workbench, WorkbenchConfig};
use skriv_settings::{AppPaths, Preferences, PreferencesStore};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::commands::TabCommand;
use crate::config::ConfigArgs;

/// 記錄層級的環境變數。 / Environment variable holding the log filter.
const LOG_ENV: &str = "SKRIV_LOG";

#[derive(Parser)]
#[command(
    name = "skriv",
    about = "Tab and session manager for the skriv editor",
    author,
    version
)]
struct Cli {
    /// 指定資料夾；預設依環境變數或系統位置。 / Data directory (defaults to SKRIV_DATA_DIR or the platform data dir).
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Tab(TabCommand),
    /// 互動模式。 / Interactive session driven by stdin, with debounced autosave.
    Shell(ShellArgs),
    /// 檢視或修改偏好設定。 / Show or change preferences.
    Config(ConfigArgs),
}

#[derive(Args)]
struct ShellArgs {
    /// 啟動時開啟的檔案。 / Files to open on startup.
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    init_tracing();
    let Cli { data_dir, command } = Cli::parse();

    let paths = AppPaths::resolve(data_dir.as_deref());
    let mut preferences = PreferencesStore::load(paths.preferences_file())
        .context("failed to load preferences")?;
    let bench_config = workbench_config(&paths, preferences.preferences());

    match command {
        Commands::Config(args) => config::run(&mut preferences, &args),
        Commands::Shell(args) => {
            let cwd = env::current_dir().context("failed to determine the working directory")?;
            shell::run(start(&bench_config)?, cwd, args.paths)
        }
        Commands::Tab(command) => {
            let cwd = env::current_dir().context("failed to determine the working directory")?;
            let mut bench = start(&bench_config)?;
            let outcome = commands::execute(&mut bench, &cwd, command, read_stdin);
            let (_, saved) = bench.shutdown();
            if !saved {
                warn!(path = %bench_config.session_path.display(), "session was not saved");
            }
            outcome
        }
    }
}

fn start(config: &WorkbenchConfig) -> Result<Workbench> {
    Workbench::start(config, OsFileSystem::shared()).context("failed to start the session")
}

fn read_stdin() -> Result<String> {
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .context("failed to read new content from stdin")?;
    Ok(text)
}

fn workbench_config(paths: &AppPaths, preferences: &Preferences) -> WorkbenchConfig {
    WorkbenchConfig {
        session_path: paths.session_file(),
        scratch_dir: paths.scratch_dir(),
        quiet_interval: preferences.autosave.quiet_interval(),
        autosave_enabled: preferences.autosave.enabled,
        restore_session: preferences.session.restore,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}
