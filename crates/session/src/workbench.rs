use std::path::PathBuf;
use std::time::{Duration, Instant};

use skriv_core::{
    CloseOutcome, MruTracker, OpenReport, SaveOutcome, ScratchStore, Session, SharedFileSystem,
    Tab, TabError, TabId, TabRegistry,
};
use tracing::info;

use crate::autosave::{AutosaveScheduler, DEFAULT_QUIET_INTERVAL};
use crate::codec::SessionCodec;

/// 啟動工作台所需的設定。 / Settings needed to start a [`Workbench`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkbenchConfig {
    pub session_path: PathBuf,
    pub scratch_dir: PathBuf,
    pub quiet_interval: Duration,
    pub autosave_enabled: bool,
    /// When false startup ignores the previous session file.
    pub restore_session: bool,
}

impl WorkbenchConfig {
    /// 以資料夾推導預設路徑。 / Default layout below a data directory.
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            session_path: data_dir.join("session.json"),
            scratch_dir: data_dir.join("scratch"),
            quiet_interval: DEFAULT_QUIET_INTERVAL,
            autosave_enabled: true,
            restore_session: true,
        }
    }
}

/// The single owner of live editor state for one process.
/// 單一行程內編輯器狀態的唯一擁有者。
///
/// Wraps every registry mutation so the MRU tracker stays a permutation of
/// the open ids and the autosave timer observes the change. Tab close and
/// [`shutdown`](Self::shutdown) force a save instead of waiting for the timer.
#[derive(Debug)]
pub struct Workbench {
    registry: TabRegistry,
    mru: MruTracker,
    autosave: AutosaveScheduler,
}

impl Workbench {
    /// 載入上次的工作階段並準備好至少一個分頁。 /
    /// Restores the previous session and guarantees at least one open tab.
    pub fn start(config: &WorkbenchConfig, fs: SharedFileSystem) -> Result<Self, TabError> {
        let scratch = ScratchStore::new(&config.scratch_dir, fs.clone());
        let codec = SessionCodec::new(&config.session_path, fs.clone(), scratch.clone());
        let session = if config.restore_session {
            codec.load()
        } else {
            Session::default()
        };
        let restored = session.tabs.len();

        let mut registry = TabRegistry::new(session, fs, scratch);
        let active = registry.ensure_not_empty()?;
        let mut mru = MruTracker::with_order(&registry.session().mru_order, &registry.ids());
        mru.activate(active);

        let mut autosave = AutosaveScheduler::new(codec, config.quiet_interval);
        autosave.set_enabled(config.autosave_enabled);
        if registry.len() != restored {
            autosave.notify_mutation(Instant::now());
        }
        info!(restored, open = registry.len(), "workbench started");

        Ok(Self {
            registry,
            mru,
            autosave,
        })
    }

    pub fn registry(&self) -> &TabRegistry {
        &self.registry
    }

    pub fn session(&self) -> &Session {
        self.registry.session()
    }

    pub fn mru(&self) -> &MruTracker {
        &self.mru
    }

    pub fn autosave(&self) -> &AutosaveScheduler {
        &self.autosave
    }

    pub fn tabs(&self) -> &[Tab] {
        self.registry.tabs()
    }

    pub fn active_id(&self) -> Option<TabId> {
        self.registry.active_id()
    }

    pub fn create_tab(&mut self) -> Result<TabId, TabError> {
        let before = self.registry.active_id();
        let id = self.registry.create_tab()?;
        self.after_mutation(before);
        Ok(id)
    }

    /// 開啟路徑（檔案選擇器、命令列、拖放或第二個實例）。 /
    /// Handles an "open these paths" request from any source.
    pub fn open_paths<I, P>(&mut self, paths: I) -> OpenReport
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let before = self.registry.active_id();
        let report = self.registry.open_paths(paths);
        if !report.opened.is_empty() || !report.reused.is_empty() {
            self.after_mutation(before);
        }
        report
    }

    pub fn activate(&mut self, id: TabId) -> Result<(), TabError> {
        self.registry.activate(id)?;
        self.mru.activate(id);
        self.autosave.notify_mutation(Instant::now());
        Ok(())
    }

    /// 關閉分頁並強制儲存。 / Closes a tab and forces a save before returning.
    pub fn close_tab(&mut self, id: TabId) -> Result<CloseOutcome, TabError> {
        let before = self.registry.active_id();
        let outcome = self.registry.close_tab(id)?;
        self.after_mutation(before);
        self.flush();
        Ok(outcome)
    }

    pub fn rename_tab(&mut self, id: TabId, new_name: &str) -> Result<bool, TabError> {
        let renamed = self.registry.rename_tab(id, new_name)?;
        if renamed {
            self.autosave.notify_mutation(Instant::now());
        }
        Ok(renamed)
    }

    pub fn update_content(&mut self, id: TabId, content: impl Into<String>) -> Result<(), TabError> {
        self.registry.update_content(id, content)?;
        self.autosave.notify_mutation(Instant::now());
        Ok(())
    }

    pub fn set_cursor(&mut self, id: TabId, position: usize) -> Result<(), TabError> {
        self.registry.set_cursor(id, position)?;
        self.autosave.notify_mutation(Instant::now());
        Ok(())
    }

    pub fn save_active<F>(&mut self, choose_destination: F) -> Result<SaveOutcome, TabError>
    where
        F: FnOnce(&Tab) -> Option<PathBuf>,
    {
        let outcome = self.registry.save_active(choose_destination)?;
        if matches!(outcome, SaveOutcome::Saved { .. }) {
            self.autosave.notify_mutation(Instant::now());
        }
        Ok(outcome)
    }

    pub fn save_active_as(&mut self, destination: impl Into<PathBuf>) -> Result<SaveOutcome, TabError> {
        let outcome = self.registry.save_active_as(destination)?;
        if matches!(outcome, SaveOutcome::Saved { .. }) {
            self.autosave.notify_mutation(Instant::now());
        }
        Ok(outcome)
    }

    /// 開啟快速切換。 / Opens the quick-switch UI; `None` when fewer than two tabs are open.
    pub fn open_switcher(&mut self, reverse: bool) -> Option<TabId> {
        self.mru.open_switcher(reverse)
    }

    pub fn advance_switcher(&mut self) -> Option<TabId> {
        self.mru.advance()
    }

    /// 放開修飾鍵：啟用選取的分頁。 / Commits the quick-switch selection as the active tab.
    pub fn release_switcher(&mut self) -> Result<Option<TabId>, TabError> {
        let Some(selection) = self.mru.release() else {
            return Ok(None);
        };
        self.registry.activate(selection)?;
        self.autosave.notify_mutation(Instant::now());
        Ok(Some(selection))
    }

    pub fn cancel_switcher(&mut self) {
        self.mru.cancel();
    }

    pub fn next_autosave(&self) -> Option<Instant> {
        self.autosave.deadline()
    }

    /// 計時到期時執行自動儲存。 / Runs the debounced save if its deadline has passed.
    pub fn poll_autosave(&mut self, now: Instant) -> bool {
        if !self.autosave.is_due(now) {
            return false;
        }
        self.stamp_mru();
        self.autosave.poll(now, self.registry.session())
    }

    /// 立即強制儲存。 / Forces a save right now.
    pub fn flush(&mut self) -> bool {
        self.stamp_mru();
        self.autosave.flush(self.registry.session())
    }

    /// 應用程式關閉：強制儲存完成後才交回狀態。 /
    /// Application-close request: completes a forced save, then hands back the final state.
    pub fn shutdown(mut self) -> (Session, bool) {
        let saved = self.flush();
        (self.registry.into_session(), saved)
    }

    fn after_mutation(&mut self, previous_active: Option<TabId>) {
        self.mru.sync(&self.registry.ids());
        if let Some(active) = self.registry.active_id() {
            if Some(active) != previous_active {
                self.mru.activate(active);
            }
        }
        self.autosave.notify_mutation(Instant::now());
    }

    fn stamp_mru(&mut self) {
        self.registry.session_mut().mru_order = self.mru.order().to_vec();
    }
}
