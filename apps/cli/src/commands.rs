use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Subcommand};
use skriv_core::{SaveOutcome, Tab, TabId, TabLocation};
use skriv_session::Workbench;

/// 對分頁的操作，命令列與互動模式共用。 / Tab verbs shared by one-shot commands and the shell.
#[derive(Subcommand)]
pub enum TabCommand {
    /// 開啟檔案。 / Open files as tabs, reusing tabs that are already open.
    Open(OpenArgs),
    /// 建立新的暫存分頁。 / Create an empty scratch tab.
    New,
    /// 列出分頁。 / List open tabs in display order.
    List,
    /// 切換作用中分頁。 / Make a tab active.
    Activate(TabArgs),
    /// 關閉分頁。 / Close a tab.
    Close(TabArgs),
    /// 重新命名分頁；已存檔的分頁會一併改名檔案。 / Rename a tab (and its file, when it has one).
    Rename(RenameArgs),
    /// 取代分頁內容。 / Replace a tab's content.
    Edit(EditArgs),
    /// 儲存作用中分頁。 / Save the active tab.
    Save(SaveArgs),
}

#[derive(Args)]
pub struct OpenArgs {
    #[arg(required = true, value_name = "PATH")]
    paths: Vec<PathBuf>,
}

#[derive(Args)]
pub struct TabArgs {
    /// 1 起算的位置或分頁 id。 / 1-based position or tab id.
    #[arg(value_name = "TAB")]
    tab: String,
}

#[derive(Args)]
pub struct RenameArgs {
    #[arg(value_name = "TAB")]
    tab: String,
    #[arg(value_name = "NAME")]
    name: String,
}

#[derive(Args)]
pub struct EditArgs {
    #[arg(value_name = "TAB")]
    tab: String,
    /// 新內容；多個字詞以空白連接。 / New content; several words are joined with single spaces.
    #[arg(long, num_args = 1.., allow_hyphen_values = true)]
    text: Option<Vec<String>>,
}

#[derive(Args)]
pub struct SaveArgs {
    /// 另存新檔的路徑。 / Destination path ("save as").
    #[arg(long = "as", value_name = "PATH")]
    destination: Option<PathBuf>,
}

/// 執行單一分頁操作。 / Runs one tab verb.
///
/// `missing_text` supplies the content for `edit` when `--text` is absent.
pub fn execute<F>(bench: &mut Workbench, cwd: &Path, command: TabCommand, missing_text: F) -> Result<()>
where
    F: FnOnce() -> Result<String>,
{
    match command {
        TabCommand::Open(args) => open(bench, cwd, args.paths),
        TabCommand::New => new_tab(bench),
        TabCommand::List => {
            list(bench);
            Ok(())
        }
        TabCommand::Activate(args) => activate(bench, &args.tab),
        TabCommand::Close(args) => close(bench, &args.tab),
        TabCommand::Rename(args) => rename(bench, &args.tab, &args.name),
        TabCommand::Edit(args) => {
            let text = match args.text {
                Some(words) => words.join(" "),
                None => missing_text()?,
            };
            edit(bench, &args.tab, text)
        }
        TabCommand::Save(args) => save(bench, cwd, args.destination),
    }
}

/// 以 1 起算的位置或分頁 id 選取分頁。 / Selects a tab by 1-based position or by id.
pub fn resolve_tab(bench: &Workbench, selector: &str) -> Result<TabId> {
    if let Ok(position) = selector.parse::<usize>() {
        return position
            .checked_sub(1)
            .and_then(|index| bench.tabs().get(index))
            .map(|tab| tab.id)
            .ok_or_else(|| anyhow!("no tab at position {position}"));
    }
    let id = TabId::from_str(selector)
        .with_context(|| format!("'{selector}' is neither a tab position nor a tab id"))?;
    if bench.registry().tab(id).is_none() {
        bail!("no open tab with id {id}");
    }
    Ok(id)
}

/// 相對路徑以啟動時的工作目錄為準。 / Relative launch paths are taken relative to the launch directory.
pub fn resolve_launch_path(cwd: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}

pub fn open(bench: &mut Workbench, cwd: &Path, paths: Vec<PathBuf>) -> Result<()> {
    let report = bench.open_paths(
        paths
            .into_iter()
            .map(|path| resolve_launch_path(cwd, path)),
    );
    for id in &report.opened {
        println!("opened {}", describe(bench, *id));
    }
    for id in &report.reused {
        println!("already open {}", describe(bench, *id));
    }
    if report.is_clean() {
        return Ok(());
    }
    for (_, err) in &report.failures {
        eprintln!("Error: {err}");
    }
    bail!("{} path(s) could not be opened", report.failures.len())
}

fn new_tab(bench: &mut Workbench) -> Result<()> {
    let id = bench.create_tab().context("failed to create a scratch tab")?;
    println!("created {}", describe(bench, id));
    Ok(())
}

/// 依顯示順序列出分頁：作用中、未儲存、位置、名稱、位置、id。 /
/// One line per tab in display order: active marker, dirty marker, position, name, location, id.
fn list(bench: &Workbench) {
    let active = bench.active_id();
    for (index, tab) in bench.tabs().iter().enumerate() {
        let marker = if Some(tab.id) == active { '*' } else { ' ' };
        let dirty = if tab.is_dirty() { '+' } else { ' ' };
        println!(
            "{marker}{dirty}\t{}\t{}\t{}\t{}",
            index + 1,
            tab.name,
            location(tab),
            tab.id
        );
    }
}

fn activate(bench: &mut Workbench, selector: &str) -> Result<()> {
    let id = resolve_tab(bench, selector)?;
    bench.activate(id)?;
    println!("active {}", describe(bench, id));
    Ok(())
}

fn close(bench: &mut Workbench, selector: &str) -> Result<()> {
    let id = resolve_tab(bench, selector)?;
    let outcome = bench.close_tab(id)?;
    println!("closed {}", outcome.closed.name);
    if let Some(replacement) = outcome.replacement {
        println!("created {}", describe(bench, replacement));
    }
    if let Some(err) = outcome.scratch_cleanup {
        eprintln!("Warning: {err}");
    }
    Ok(())
}

fn rename(bench: &mut Workbench, selector: &str, name: &str) -> Result<()> {
    let id = resolve_tab(bench, selector)?;
    if bench.rename_tab(id, name)? {
        println!("renamed to {}", describe(bench, id));
    } else {
        println!("name unchanged");
    }
    Ok(())
}

fn edit(bench: &mut Workbench, selector: &str, text: String) -> Result<()> {
    let id = resolve_tab(bench, selector)?;
    let cursor = text.len();
    bench.update_content(id, text)?;
    bench.set_cursor(id, cursor)?;
    println!("edited {}", describe(bench, id));
    Ok(())
}

/// 明確存檔；暫存分頁必須提供 `--as`。 / Explicit save; a scratch tab needs a destination.
fn save(bench: &mut Workbench, cwd: &Path, destination: Option<PathBuf>) -> Result<()> {
    let outcome = match destination {
        Some(path) => bench.save_active_as(resolve_launch_path(cwd, path))?,
        None => bench.save_active(|_| None)?,
    };
    match outcome {
        SaveOutcome::Saved { id, path } => {
            println!("saved {} to {}", describe(bench, id), path.display());
        }
        SaveOutcome::Cancelled => println!("not saved: scratch tab needs a destination (--as PATH)"),
        SaveOutcome::NoActiveTab => bail!("no active tab"),
    }
    Ok(())
}

pub fn describe(bench: &Workbench, id: TabId) -> String {
    match bench.registry().tab(id) {
        Some(tab) => tab.name.clone(),
        None => id.to_string(),
    }
}

fn location(tab: &Tab) -> String {
    match &tab.location {
        TabLocation::Persisted { path } => path.display().to_string(),
        TabLocation::Scratch { .. } => "(scratch)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skriv_core::OsFileSystem;
    use skriv_session::WorkbenchConfig;
    use tempfile::tempdir;

    #[test]
    fn selectors_accept_positions_and_ids() {
        let dir = tempdir().unwrap();
        let config = WorkbenchConfig::in_dir(dir.path());
        let mut bench = Workbench::start(&config, OsFileSystem::shared()).unwrap();
        let second = bench.create_tab().unwrap();

        assert_eq!(resolve_tab(&bench, "2").unwrap(), second);
        assert_eq!(resolve_tab(&bench, &second.to_string()).unwrap(), second);
        assert!(resolve_tab(&bench, "0").is_err());
        assert!(resolve_tab(&bench, "3").is_err());
        assert!(resolve_tab(&bench, "not-a-tab").is_err());
        assert!(resolve_tab(&bench, &TabId::new().to_string()).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn launch_paths_resolve_against_cwd() {
        let cwd = Path::new("/work");
        assert_eq!(
            resolve_launch_path(cwd, PathBuf::from("notes.txt")),
            Path::new("/work/notes.txt")
        );
        assert_eq!(
            resolve_launch_path(cwd, PathBuf::from("/abs/notes.txt")),
            Path::new("/abs/notes.txt")
        );
    }
}
