use anyhow::{Context, Result};
use clap::{ArgAction, Args};
use skriv_settings::{Preferences, PreferencesStore};

#[derive(Args)]
pub struct ConfigArgs {
    /// 開關自動儲存。 / Turn debounced autosave on or off.
    #[arg(long, action = ArgAction::Set, value_name = "BOOL")]
    autosave: Option<bool>,
    /// 自動儲存前的靜止時間（毫秒）。 / Quiet interval before an autosave, in milliseconds.
    #[arg(long, value_name = "MS")]
    quiet_interval_ms: Option<u64>,
    /// 啟動時是否還原上次的分頁。 / Whether startup restores the previous tabs.
    #[arg(long, action = ArgAction::Set, value_name = "BOOL")]
    restore: Option<bool>,
}

impl ConfigArgs {
    fn has_changes(&self) -> bool {
        self.autosave.is_some() || self.quiet_interval_ms.is_some() || self.restore.is_some()
    }
}

/// 套用變更後列出目前的偏好設定。 / Applies any requested changes, then prints the effective preferences.
pub fn run(store: &mut PreferencesStore, args: &ConfigArgs) -> Result<()> {
    if args.has_changes() {
        store
            .update(|prefs| {
                if let Some(enabled) = args.autosave {
                    prefs.autosave.enabled = enabled;
                }
                if let Some(interval) = args.quiet_interval_ms {
                    prefs.autosave.quiet_interval_ms = interval;
                }
                if let Some(restore) = args.restore {
                    prefs.session.restore = restore;
                }
            })
            .context("failed to save preferences")?;
        println!("saved {}", store.path().display());
    }
    print(store.preferences());
    Ok(())
}

fn print(prefs: &Preferences) {
    println!("autosave.enabled = {}", prefs.autosave.enabled);
    println!("autosave.quiet_interval_ms = {}", prefs.autosave.quiet_interval_ms);
    println!("session.restore = {}", prefs.session.restore);
}
