use std::future;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use skriv_session::Workbench;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use crate::commands::{self, TabCommand};

/// 互動模式中的一行指令。 / One line of shell input.
#[derive(Parser)]
#[command(no_binary_name = true)]
enum ShellCommand {
    #[command(flatten)]
    Tab(TabCommand),
    /// 開啟快速切換。 / Open the quick switcher on the next most recent tab.
    Switch {
        /// 從最久未使用的分頁開始。 / Start from the least recently used tab.
        #[arg(long)]
        reverse: bool,
    },
    /// 再按一次切換鍵。 / Move the quick-switch selection one step.
    Next,
    /// 放開修飾鍵。 / Commit the quick-switch selection.
    Release,
    /// 取消快速切換。 / Close the quick switcher without switching.
    Cancel,
    /// 儲存並離開。 / Save and exit.
    Quit,
}

enum Flow {
    Continue,
    Quit,
}

/// 在單執行緒 runtime 上執行互動模式。 / Runs the shell on a current-thread runtime.
pub fn run(bench: Workbench, cwd: PathBuf, paths: Vec<PathBuf>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;
    let outcome = runtime.block_on(event_loop(bench, cwd, paths));
    // 中斷後 stdin 的阻塞讀取仍在進行，不等它結束。 /
    // After Ctrl-C a blocking stdin read is still in flight; do not wait for it.
    runtime.shutdown_background();
    outcome
}

/// Multiplexes stdin lines, the autosave deadline and Ctrl-C.
/// Every exit path ends in the forced application-close save.
async fn event_loop(mut bench: Workbench, cwd: PathBuf, paths: Vec<PathBuf>) -> Result<()> {
    if !paths.is_empty() {
        if let Err(err) = commands::open(&mut bench, &cwd, paths) {
            eprintln!("Error: {err:#}");
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);
    let mut listening = true;

    loop {
        let deadline = bench.next_autosave();
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => match handle_line(&mut bench, &cwd, &line) {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Quit) => break,
                    Err(err) => eprintln!("Error: {err:#}"),
                },
                Ok(None) => {
                    debug!("stdin closed");
                    break;
                }
                Err(err) => {
                    warn!(error = %err, "failed to read from stdin");
                    break;
                }
            },
            _ = autosave_due(deadline) => {
                bench.poll_autosave(Instant::now());
            }
            result = &mut interrupt, if listening => match result {
                Ok(()) => {
                    info!("interrupted");
                    break;
                }
                Err(err) => {
                    warn!(error = %err, "cannot listen for Ctrl-C");
                    listening = false;
                }
            },
        }
    }

    let (session, saved) = bench.shutdown();
    info!(tabs = session.tabs.len(), saved, "shell closed");
    Ok(())
}

async fn autosave_due(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => future::pending().await,
    }
}

fn handle_line(bench: &mut Workbench, cwd: &Path, line: &str) -> Result<Flow> {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.is_empty() {
        return Ok(Flow::Continue);
    }

    match ShellCommand::try_parse_from(words)? {
        ShellCommand::Tab(command) => commands::execute(bench, cwd, command, || {
            Err(anyhow!("edit in the shell needs --text"))
        })?,
        ShellCommand::Switch { reverse } => match bench.open_switcher(reverse) {
            Some(id) => println!("switching to {}", commands::describe(bench, id)),
            None => println!("quick switch needs at least two tabs"),
        },
        ShellCommand::Next => match bench.advance_switcher() {
            Some(id) => println!("switching to {}", commands::describe(bench, id)),
            None => println!("quick switch is not open"),
        },
        ShellCommand::Release => match bench.release_switcher()? {
            Some(id) => println!("active {}", commands::describe(bench, id)),
            None => println!("quick switch is not open"),
        },
        ShellCommand::Cancel => bench.cancel_switcher(),
        ShellCommand::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}
