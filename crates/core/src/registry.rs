use std::io;
use std::path::{self, Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::fs::{write_atomic, SharedFileSystem};
use crate::scratch::{scratch_display_name, ScratchError, ScratchStore};
use crate::state::Session;
use crate::tab::{display_name_for, Tab, TabId, TabLocation};

/// 分頁操作的錯誤。 / Errors surfaced by tab lifecycle operations.
#[derive(Debug, Error)]
pub enum TabError {
    #[error(transparent)]
    Scratch(#[from] ScratchError),
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to rename {} to {}: {source}", from.display(), to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot rename to {}: the file already exists", path.display())]
    RenameTargetExists { path: PathBuf },
    #[error("invalid tab name '{0}'")]
    InvalidName(String),
    #[error("no open tab with id {0}")]
    UnknownTab(TabId),
}

/// `open_paths` 的逐一路徑結果。 / Per-path outcome of [`TabRegistry::open_paths`].
#[derive(Debug, Default)]
pub struct OpenReport {
    /// Tabs created for paths that were not open yet.
    pub opened: Vec<TabId>,
    /// Already-open tabs that were re-activated instead of duplicated.
    pub reused: Vec<TabId>,
    pub failures: Vec<(PathBuf, TabError)>,
}

impl OpenReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// 關閉分頁的結果。 / What happened when a tab was closed.
#[derive(Debug)]
pub struct CloseOutcome {
    pub closed: Tab,
    /// 關閉後的作用中分頁。 / Active tab after the close.
    pub active: Option<TabId>,
    /// Fresh scratch tab created because the last tab was closed.
    pub replacement: Option<TabId>,
    /// Best-effort scratch cleanup failure; the close itself still happened.
    pub scratch_cleanup: Option<ScratchError>,
}

/// 明確存檔的結果。 / Outcome of an explicit save request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved { id: TabId, path: PathBuf },
    /// 使用者取消了目的地選擇。 / The destination chooser was dismissed.
    Cancelled,
    NoActiveTab,
}

/// 管理開啟中分頁的有序集合。 / Owns the ordered collection of open tabs and their lifecycle.
#[derive(Debug)]
pub struct TabRegistry {
    session: Session,
    fs: SharedFileSystem,
    scratch: ScratchStore,
}

impl TabRegistry {
    pub fn new(session: Session, fs: SharedFileSystem, scratch: ScratchStore) -> Self {
        Self {
            session,
            fs,
            scratch,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.session.tabs
    }

    pub fn len(&self) -> usize {
        self.session.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.session.tabs.is_empty()
    }

    pub fn ids(&self) -> Vec<TabId> {
        self.session.ids()
    }

    pub fn tab(&self, id: TabId) -> Option<&Tab> {
        self.session.tab(id)
    }

    pub fn active_id(&self) -> Option<TabId> {
        self.session.active_tab_id
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.session.active_tab()
    }

    /// 依完整路徑尋找已開啟的分頁。 / Finds the open tab persisted at exactly `path`.
    pub fn find_by_path(&self, path: &Path) -> Option<TabId> {
        self.session
            .tabs
            .iter()
            .find(|tab| tab.path() == Some(path))
            .map(|tab| tab.id)
    }

    /// 啟動時整理狀態：確保至少一個分頁且作用中分頁有效。 /
    /// Startup normalisation: guarantees at least one tab and a valid active id.
    pub fn ensure_not_empty(&mut self) -> Result<TabId, TabError> {
        if self.session.tabs.is_empty() {
            return self.create_tab();
        }
        match self.session.active_tab() {
            Some(tab) => Ok(tab.id),
            None => {
                let first = self.session.tabs[0].id;
                self.session.active_tab_id = Some(first);
                Ok(first)
            }
        }
    }

    pub fn activate(&mut self, id: TabId) -> Result<(), TabError> {
        if self.session.tab(id).is_none() {
            return Err(TabError::UnknownTab(id));
        }
        self.session.active_tab_id = Some(id);
        Ok(())
    }

    /// 建立新的暫存分頁並設為作用中。 / Creates an empty scratch tab, appends it and makes it active.
    ///
    /// 配置暫存檔失敗時不會新增分頁。 / Nothing is added when the scratch file cannot be allocated.
    pub fn create_tab(&mut self) -> Result<TabId, TabError> {
        let tab = self.allocate_scratch_tab()?;
        let id = tab.id;
        self.session.tabs.push(tab);
        self.session.active_tab_id = Some(id);
        debug!(tab = %id, "created scratch tab");
        Ok(id)
    }

    /// 開啟多個路徑；單一路徑失敗不影響其他路徑。 /
    /// Opens each path in turn; a failure on one path never aborts the others.
    pub fn open_paths<I, P>(&mut self, paths: I) -> OpenReport
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut report = OpenReport::default();
        for path in paths {
            let path = path.into();
            if let Some(existing) = self.find_by_path(&path) {
                self.session.active_tab_id = Some(existing);
                report.reused.push(existing);
                continue;
            }
            match self.fs.read_to_string(&path) {
                Ok(content) => {
                    let tab = Tab::persisted(path, content);
                    let id = tab.id;
                    self.session.tabs.push(tab);
                    self.session.active_tab_id = Some(id);
                    report.opened.push(id);
                }
                Err(source) => {
                    warn!(path = %path.display(), error = %source, "failed to open file");
                    report
                        .failures
                        .push((path.clone(), TabError::Read { path, source }));
                }
            }
        }
        report
    }

    /// 關閉分頁。 / Closes a tab.
    ///
    /// If the closed tab was active, activation falls to the tab that slid into
    /// its slot (clamped to the new bounds). Closing the last tab replaces it
    /// with a fresh scratch tab; that tab is allocated first, so an allocation
    /// failure aborts the close and the registry is never left empty.
    pub fn close_tab(&mut self, id: TabId) -> Result<CloseOutcome, TabError> {
        let index = self
            .session
            .position(id)
            .ok_or(TabError::UnknownTab(id))?;
        let replacement = if self.session.tabs.len() == 1 {
            Some(self.allocate_scratch_tab()?)
        } else {
            None
        };

        let was_active = self.session.active_tab_id == Some(id);
        let closed = self.session.tabs.remove(index);

        let scratch_cleanup = closed.scratch_path().and_then(|scratch_path| {
            self.scratch.delete(scratch_path).err().map(|err| {
                warn!(tab = %id, error = %err, "failed to delete scratch file of closed tab");
                err
            })
        });

        let replacement_id = replacement.map(|tab| {
            let new_id = tab.id;
            self.session.tabs.push(tab);
            self.session.active_tab_id = Some(new_id);
            new_id
        });
        if replacement_id.is_none() && was_active {
            let slot = index.min(self.session.tabs.len() - 1);
            self.session.active_tab_id = Some(self.session.tabs[slot].id);
        }

        debug!(tab = %id, "closed tab");
        Ok(CloseOutcome {
            closed,
            active: self.session.active_tab_id,
            replacement: replacement_id,
            scratch_cleanup,
        })
    }

    /// 重新命名分頁。 / Renames a tab, returning `false` for a no-op.
    ///
    /// 已存檔分頁會先在磁碟上改名，成功後才更新名稱。 / For a persisted tab
    /// the file is renamed first; name and path change only once that succeeded.
    pub fn rename_tab(&mut self, id: TabId, new_name: &str) -> Result<bool, TabError> {
        let trimmed = new_name.trim();
        let tab = self.session.tab(id).ok_or(TabError::UnknownTab(id))?;
        if trimmed.is_empty() || trimmed == tab.name {
            return Ok(false);
        }
        if trimmed == "." || trimmed == ".." || trimmed.chars().any(path::is_separator) {
            return Err(TabError::InvalidName(trimmed.to_string()));
        }

        let renamed_path = match tab.path() {
            Some(current) => {
                let target = current
                    .parent()
                    .map(|dir| dir.join(trimmed))
                    .unwrap_or_else(|| PathBuf::from(trimmed));
                if self.fs.exists(&target) {
                    return Err(TabError::RenameTargetExists { path: target });
                }
                self.fs
                    .rename(current, &target)
                    .map_err(|source| TabError::Rename {
                        from: current.to_path_buf(),
                        to: target.clone(),
                        source,
                    })?;
                Some(target)
            }
            None => None,
        };

        let tab = self
            .session
            .tab_mut(id)
            .ok_or(TabError::UnknownTab(id))?;
        if let Some(path) = renamed_path {
            tab.location = TabLocation::Persisted { path };
        }
        tab.name = trimmed.to_string();
        Ok(true)
    }

    /// 編輯器內容變更時呼叫。 / Change callback entry point for the editing widget.
    pub fn update_content(&mut self, id: TabId, content: impl Into<String>) -> Result<(), TabError> {
        let tab = self
            .session
            .tab_mut(id)
            .ok_or(TabError::UnknownTab(id))?;
        tab.content = content.into();
        Ok(())
    }

    pub fn set_cursor(&mut self, id: TabId, position: usize) -> Result<(), TabError> {
        let tab = self
            .session
            .tab_mut(id)
            .ok_or(TabError::UnknownTab(id))?;
        tab.cursor_position = position;
        Ok(())
    }

    /// 儲存作用中分頁。 / Saves the active tab.
    ///
    /// A scratch tab has no path yet, so `choose_destination` (the file
    /// picker) is asked for one and the call behaves like
    /// [`save_active_as`](Self::save_active_as). On a write failure the file
    /// on disk and `saved_content` are left untouched and the tab stays dirty.
    pub fn save_active<F>(&mut self, choose_destination: F) -> Result<SaveOutcome, TabError>
    where
        F: FnOnce(&Tab) -> Option<PathBuf>,
    {
        let Some(tab) = self.session.active_tab() else {
            return Ok(SaveOutcome::NoActiveTab);
        };
        let id = tab.id;
        let Some(path) = tab.path().map(Path::to_path_buf) else {
            return match choose_destination(tab) {
                Some(destination) => self.save_active_as(destination),
                None => Ok(SaveOutcome::Cancelled),
            };
        };

        let content = tab.content.clone();
        write_atomic(self.fs.as_ref(), &path, &content).map_err(|source| TabError::Write {
            path: path.clone(),
            source,
        })?;
        if let Some(tab) = self.session.tab_mut(id) {
            tab.saved_content = content;
        }
        Ok(SaveOutcome::Saved { id, path })
    }

    /// 另存作用中分頁至新路徑。 / Writes the active tab to `destination` and turns it into a persisted tab.
    pub fn save_active_as(
        &mut self,
        destination: impl Into<PathBuf>,
    ) -> Result<SaveOutcome, TabError> {
        let destination = destination.into();
        let Some(tab) = self.session.active_tab() else {
            return Ok(SaveOutcome::NoActiveTab);
        };
        let id = tab.id;
        let content = tab.content.clone();
        let previous_scratch = tab.scratch_path().map(Path::to_path_buf);

        write_atomic(self.fs.as_ref(), &destination, &content).map_err(|source| {
            TabError::Write {
                path: destination.clone(),
                source,
            }
        })?;
        if let Some(scratch_path) = previous_scratch {
            if let Err(err) = self.scratch.delete(&scratch_path) {
                warn!(tab = %id, error = %err, "failed to delete scratch file after save as");
            }
        }

        if let Some(tab) = self.session.tab_mut(id) {
            tab.location = TabLocation::Persisted {
                path: destination.clone(),
            };
            tab.name = display_name_for(&destination);
            tab.saved_content = content;
        }
        Ok(SaveOutcome::Saved {
            id,
            path: destination,
        })
    }

    fn allocate_scratch_tab(&mut self) -> Result<Tab, TabError> {
        let allocation = self.scratch.allocate(self.session.next_scratch_sequence)?;
        self.session.next_scratch_sequence = self
            .session
            .next_scratch_sequence
            .max(allocation.sequence + 1);
        Ok(Tab::scratch(
            scratch_display_name(allocation.sequence),
            allocation.path,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::OsFileSystem;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn registry() -> (TempDir, TabRegistry) {
        let dir = tempdir().unwrap();
        let fs = OsFileSystem::shared();
        let scratch = ScratchStore::new(dir.path().join("scratch"), fs.clone());
        let registry = TabRegistry::new(Session::default(), fs, scratch);
        (dir, registry)
    }

    #[test]
    fn create_tab_names_from_counter_and_activates() {
        let (_dir, mut registry) = registry();
        let first = registry.create_tab().unwrap();
        let second = registry.create_tab().unwrap();

        assert_eq!(registry.tab(first).unwrap().name, "new 1");
        assert_eq!(registry.tab(second).unwrap().name, "new 2");
        assert_eq!(registry.active_id(), Some(second));
        assert_eq!(registry.session().next_scratch_sequence, 3);
        assert!(registry.tab(second).unwrap().scratch_path().unwrap().exists());
    }

    #[test]
    fn counter_is_not_reused_after_close() {
        let (_dir, mut registry) = registry();
        let first = registry.create_tab().unwrap();
        registry.create_tab().unwrap();
        registry.close_tab(first).unwrap();
        let third = registry.create_tab().unwrap();
        assert_eq!(registry.tab(third).unwrap().name, "new 3");
    }

    #[test]
    fn create_tab_failure_adds_nothing() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let fs = OsFileSystem::shared();
        let scratch = ScratchStore::new(blocker.join("scratch"), fs.clone());
        let mut registry = TabRegistry::new(Session::default(), fs, scratch);

        assert!(matches!(registry.create_tab(), Err(TabError::Scratch(_))));
        assert!(registry.is_empty());
        assert_eq!(registry.session().next_scratch_sequence, 1);
    }

    #[test]
    fn open_paths_reuses_existing_and_reports_failures() {
        let (dir, mut registry) = registry();
        let alpha = dir.path().join("alpha.txt");
        let beta = dir.path().join("beta.txt");
        let missing = dir.path().join("missing.txt");
        fs::write(&alpha, "alpha").unwrap();
        fs::write(&beta, "beta").unwrap();

        let report = registry.open_paths([alpha.clone(), missing.clone(), beta.clone()]);
        assert_eq!(report.opened.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, missing);
        assert_eq!(registry.active_id(), Some(report.opened[1]));

        let again = registry.open_paths([alpha.clone()]);
        assert!(again.opened.is_empty());
        assert_eq!(again.reused, vec![report.opened[0]]);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.active_id(), Some(report.opened[0]));

        let tab = registry.tab(report.opened[0]).unwrap();
        assert_eq!(tab.name, "alpha.txt");
        assert_eq!(tab.saved_content, "alpha");
        assert!(!tab.is_dirty());
    }

    #[test]
    fn closing_active_tab_activates_same_slot() {
        let (_dir, mut registry) = registry();
        let a = registry.create_tab().unwrap();
        let b = registry.create_tab().unwrap();
        let c = registry.create_tab().unwrap();

        registry.activate(b).unwrap();
        let outcome = registry.close_tab(b).unwrap();
        assert_eq!(outcome.active, Some(c));

        let outcome = registry.close_tab(c).unwrap();
        assert_eq!(outcome.active, Some(a));
        assert!(outcome.replacement.is_none());
    }

    #[test]
    fn closing_inactive_tab_keeps_active() {
        let (_dir, mut registry) = registry();
        let a = registry.create_tab().unwrap();
        let b = registry.create_tab().unwrap();
        registry.close_tab(a).unwrap();
        assert_eq!(registry.active_id(), Some(b));
    }

    #[test]
    fn closing_deletes_scratch_file() {
        let (_dir, mut registry) = registry();
        let a = registry.create_tab().unwrap();
        registry.create_tab().unwrap();
        let scratch_path = registry.tab(a).unwrap().scratch_path().unwrap().to_path_buf();

        let outcome = registry.close_tab(a).unwrap();
        assert!(outcome.scratch_cleanup.is_none());
        assert!(!scratch_path.exists());
    }

    #[test]
    fn closing_last_tab_yields_fresh_scratch_tab() {
        let (_dir, mut registry) = registry();
        let only = registry.create_tab().unwrap();
        let outcome = registry.close_tab(only).unwrap();

        let replacement = outcome.replacement.unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.active_id(), Some(replacement));
        assert_ne!(replacement, only);
        assert_eq!(registry.tab(replacement).unwrap().name, "new 2");
    }

    #[test]
    fn create_close_sequences_never_empty_and_ids_stay_unique() {
        let (dir, mut registry) = registry();
        let doc = dir.path().join("doc.txt");
        fs::write(&doc, "doc").unwrap();
        registry.create_tab().unwrap();

        let mut seen = HashSet::new();
        // 簡單的線性同餘序列，確保可重現。 / Deterministic pseudo-random walk.
        let mut state: u64 = 0x5eed;
        for _ in 0..200 {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            match (state >> 33) % 3 {
                0 => {
                    registry.create_tab().unwrap();
                }
                1 => {
                    registry.open_paths([doc.clone()]);
                }
                _ => {
                    let ids = registry.ids();
                    let victim = ids[(state as usize >> 7) % ids.len()];
                    registry.close_tab(victim).unwrap();
                }
            }
            assert!(!registry.is_empty());
            let ids = registry.ids();
            let unique: HashSet<_> = ids.iter().copied().collect();
            assert_eq!(unique.len(), ids.len());
            assert!(registry.active_tab().is_some());
            seen.extend(ids);
        }
        assert!(seen.len() > 1);
    }

    #[test]
    fn rename_persisted_tab_moves_file_first() {
        let (dir, mut registry) = registry();
        let original = dir.path().join("draft.txt");
        fs::write(&original, "body").unwrap();
        let id = registry.open_paths([original.clone()]).opened[0];

        assert!(registry.rename_tab(id, "  final.txt ").unwrap());
        let renamed = dir.path().join("final.txt");
        let tab = registry.tab(id).unwrap();
        assert_eq!(tab.name, "final.txt");
        assert_eq!(tab.path(), Some(renamed.as_path()));
        assert!(!original.exists());
        assert_eq!(fs::read_to_string(renamed).unwrap(), "body");
    }

    #[test]
    fn rename_noops_and_failures_leave_metadata_alone() {
        let (dir, mut registry) = registry();
        let original = dir.path().join("keep.txt");
        let taken = dir.path().join("taken.txt");
        fs::write(&original, "keep").unwrap();
        fs::write(&taken, "other").unwrap();
        let id = registry.open_paths([original.clone()]).opened[0];

        assert!(!registry.rename_tab(id, "   ").unwrap());
        assert!(!registry.rename_tab(id, "keep.txt").unwrap());
        assert!(matches!(
            registry.rename_tab(id, "taken.txt"),
            Err(TabError::RenameTargetExists { .. })
        ));
        assert!(matches!(
            registry.rename_tab(id, "sub/dir.txt"),
            Err(TabError::InvalidName(_))
        ));

        fs::remove_file(&original).unwrap();
        assert!(matches!(
            registry.rename_tab(id, "gone.txt"),
            Err(TabError::Rename { .. })
        ));
        let tab = registry.tab(id).unwrap();
        assert_eq!(tab.name, "keep.txt");
        assert_eq!(tab.path(), Some(original.as_path()));
    }

    #[test]
    fn rename_scratch_tab_only_changes_name() {
        let (_dir, mut registry) = registry();
        let id = registry.create_tab().unwrap();
        let scratch_path = registry.tab(id).unwrap().scratch_path().unwrap().to_path_buf();

        assert!(registry.rename_tab(id, "ideas").unwrap());
        let tab = registry.tab(id).unwrap();
        assert_eq!(tab.name, "ideas");
        assert_eq!(tab.scratch_path(), Some(scratch_path.as_path()));
    }

    #[test]
    fn save_active_writes_persisted_tab() {
        let (dir, mut registry) = registry();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "old").unwrap();
        let id = registry.open_paths([path.clone()]).opened[0];
        registry.update_content(id, "new").unwrap();
        assert!(registry.tab(id).unwrap().is_dirty());

        let outcome = registry
            .save_active(|_| panic!("persisted tabs never ask for a destination"))
            .unwrap();
        assert_eq!(outcome, SaveOutcome::Saved { id, path: path.clone() });
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert!(!registry.tab(id).unwrap().is_dirty());
    }

    #[test]
    fn save_failure_leaves_tab_dirty() {
        let (dir, mut registry) = registry();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "old").unwrap();
        let id = registry.open_paths([path.clone()]).opened[0];
        registry.update_content(id, "new").unwrap();

        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();
        assert!(matches!(
            registry.save_active(|_| None),
            Err(TabError::Write { .. })
        ));
        let tab = registry.tab(id).unwrap();
        assert_eq!(tab.saved_content, "old");
        assert!(tab.is_dirty());
    }

    #[test]
    fn failed_save_keeps_file_on_disk() {
        let (dir, mut registry) = registry();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "old").unwrap();
        let id = registry.open_paths([path.clone()]).opened[0];
        registry.update_content(id, "x".repeat(3000)).unwrap();

        fs::create_dir(crate::fs::temp_path_for(&path)).unwrap();
        assert!(matches!(
            registry.save_active(|_| None),
            Err(TabError::Write { .. })
        ));
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");
        assert!(registry.tab(id).unwrap().is_dirty());
    }

    #[test]
    fn failed_save_as_keeps_scratch_tab_and_destination() {
        let (dir, mut registry) = registry();
        let id = registry.create_tab().unwrap();
        let scratch_path = registry.tab(id).unwrap().scratch_path().unwrap().to_path_buf();
        registry.update_content(id, "draft").unwrap();
        let destination = dir.path().join("existing.txt");
        fs::write(&destination, "keep me").unwrap();

        fs::create_dir(crate::fs::temp_path_for(&destination)).unwrap();
        assert!(registry.save_active_as(destination.clone()).is_err());
        assert_eq!(fs::read_to_string(&destination).unwrap(), "keep me");
        let tab = registry.tab(id).unwrap();
        assert_eq!(tab.scratch_path(), Some(scratch_path.as_path()));
        assert_eq!(tab.name, "new 1");
    }

    #[test]
    fn saving_scratch_tab_asks_for_destination() {
        let (dir, mut registry) = registry();
        let id = registry.create_tab().unwrap();
        let scratch_path = registry.tab(id).unwrap().scratch_path().unwrap().to_path_buf();
        registry.update_content(id, "fresh idea").unwrap();

        assert_eq!(registry.save_active(|_| None).unwrap(), SaveOutcome::Cancelled);
        assert!(!registry.tab(id).unwrap().is_persisted());

        let destination = dir.path().join("idea.md");
        let chosen = destination.clone();
        let outcome = registry.save_active(move |tab| {
            assert_eq!(tab.name, "new 1");
            Some(chosen)
        });
        assert_eq!(
            outcome.unwrap(),
            SaveOutcome::Saved {
                id,
                path: destination.clone()
            }
        );

        let tab = registry.tab(id).unwrap();
        assert_eq!(tab.name, "idea.md");
        assert_eq!(tab.path(), Some(destination.as_path()));
        assert!(tab.scratch_path().is_none());
        assert!(!tab.is_dirty());
        assert!(!scratch_path.exists());
        assert_eq!(fs::read_to_string(destination).unwrap(), "fresh idea");
    }

    #[test]
    fn save_without_active_tab_is_noop() {
        let (dir, mut registry) = registry();
        assert_eq!(registry.save_active(|_| None).unwrap(), SaveOutcome::NoActiveTab);
        assert_eq!(
            registry.save_active_as(dir.path().join("x.txt")).unwrap(),
            SaveOutcome::NoActiveTab
        );
    }

    #[test]
    fn ensure_not_empty_repairs_startup_state() {
        let (_dir, mut registry) = registry();
        let created = registry.ensure_not_empty().unwrap();
        assert_eq!(registry.active_id(), Some(created));

        registry.session_mut().active_tab_id = Some(TabId::new());
        assert_eq!(registry.ensure_not_empty().unwrap(), created);
        assert_eq!(registry.active_id(), Some(created));
    }
}
