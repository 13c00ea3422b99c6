use std::collections::HashSet;
use std::io;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use skriv_core::{
    write_atomic, ScratchError, ScratchStore, Session, SharedFileSystem, Tab, TabId, TabLocation,
    FIRST_SCRATCH_SEQUENCE,
};
use thiserror::Error;
use tracing::{debug, warn};

/// Current session file format version.
pub const SESSION_FORMAT_VERSION: u32 = 1;

/// 工作階段持久化時可能出現的錯誤。 / Error type for session persistence.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session file I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid session payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
    #[error("unsupported session format version {0}")]
    UnsupportedVersion(u32),
    #[error(transparent)]
    Scratch(#[from] ScratchError),
}

/// On-disk shape of the session file.
/// 工作階段檔案的磁碟格式。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionFile {
    #[serde(default = "default_format_version")]
    format_version: u32,
    tabs: Vec<TabRecord>,
    #[serde(default)]
    active_tab_id: Option<TabId>,
    next_scratch_sequence: u64,
    #[serde(default)]
    mru_order: Vec<TabId>,
}

fn default_format_version() -> u32 {
    SESSION_FORMAT_VERSION
}

/// 單一分頁的紀錄；內容欄位永遠寫成空字串。 / One tab record; body fields are always written empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TabRecord {
    id: TabId,
    name: String,
    #[serde(
        default,
        with = "crate::serde_path::option",
        skip_serializing_if = "Option::is_none"
    )]
    path: Option<PathBuf>,
    #[serde(
        default,
        with = "crate::serde_path::option",
        skip_serializing_if = "Option::is_none"
    )]
    scratch_path: Option<PathBuf>,
    #[serde(default)]
    content: String,
    #[serde(default)]
    saved_content: String,
    #[serde(default)]
    cursor_position: usize,
}

impl TabRecord {
    fn from_tab(tab: &Tab) -> Self {
        Self {
            id: tab.id,
            name: tab.name.clone(),
            path: tab.path().map(Path::to_path_buf),
            scratch_path: tab.scratch_path().map(Path::to_path_buf),
            content: String::new(),
            saved_content: String::new(),
            cursor_position: tab.cursor_position,
        }
    }

    /// 必須恰好有 `path` 或 `scratchPath` 其中之一。 / Exactly one of `path`/`scratchPath` must be present.
    fn location(&self) -> Option<TabLocation> {
        match (&self.path, &self.scratch_path) {
            (Some(path), None) => Some(TabLocation::Persisted { path: path.clone() }),
            (None, Some(scratch_path)) => Some(TabLocation::Scratch {
                scratch_path: scratch_path.clone(),
            }),
            _ => None,
        }
    }
}

/// Serialises the session index and restores tab bodies on startup.
/// 序列化工作階段索引，並在啟動時還原分頁內容。
///
/// Tab bodies never enter the session file: scratch bodies live in their
/// scratch file and persisted bodies are re-read from their path on load.
#[derive(Debug, Clone)]
pub struct SessionCodec {
    session_path: PathBuf,
    fs: SharedFileSystem,
    scratch: ScratchStore,
}

impl SessionCodec {
    pub fn new(session_path: impl Into<PathBuf>, fs: SharedFileSystem, scratch: ScratchStore) -> Self {
        Self {
            session_path: session_path.into(),
            fs,
            scratch,
        }
    }

    pub fn session_path(&self) -> &Path {
        &self.session_path
    }

    /// 儲存工作階段；失敗只記錄不拋出。 / Persists the session, logging and swallowing any failure.
    ///
    /// Returns whether the cycle completed. On failure the previous session
    /// file stays in place until the next successful cycle.
    pub fn save(&self, session: &Session) -> bool {
        match self.try_save(session) {
            Ok(()) => true,
            Err(err) => {
                warn!(path = %self.session_path.display(), error = %err, "session save failed");
                false
            }
        }
    }

    /// 寫入暫存內容後以原子方式覆寫工作階段檔。 /
    /// Writes every scratch body, then atomically replaces the session file.
    pub fn try_save(&self, session: &Session) -> Result<(), SessionError> {
        for tab in &session.tabs {
            if let Some(scratch_path) = tab.scratch_path() {
                self.scratch.write(scratch_path, &tab.content)?;
            }
        }

        let file = SessionFile {
            format_version: SESSION_FORMAT_VERSION,
            tabs: session.tabs.iter().map(TabRecord::from_tab).collect(),
            active_tab_id: session.active_tab_id,
            next_scratch_sequence: session.next_scratch_sequence,
            mru_order: session.mru_order.clone(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        write_atomic(self.fs.as_ref(), &self.session_path, &json).map_err(|source| {
            SessionError::Io {
                path: self.session_path.clone(),
                source,
            }
        })?;
        debug!(path = %self.session_path.display(), tabs = session.tabs.len(), "session saved");
        Ok(())
    }

    /// 載入工作階段；檔案不存在或無法解析時回傳預設值。 /
    /// Loads the session, falling back to the default session when the file is absent or unreadable.
    pub fn load(&self) -> Session {
        match self.try_load() {
            Ok(Some(session)) => session,
            Ok(None) => Session::default(),
            Err(err) => {
                warn!(
                    path = %self.session_path.display(),
                    error = %err,
                    "discarding unreadable session file"
                );
                Session::default()
            }
        }
    }

    /// Loads the session file. `Ok(None)` means there is no file yet.
    ///
    /// Each tab body is re-read from its scratch file or its path; a body that
    /// cannot be read turns into an empty tab rather than an error. Records
    /// that break the one-location rule or repeat an id are dropped.
    ///
    /// 其餘欄位照原樣保留，但有兩處修正： / Everything else is kept as written, with two repairs:
    /// an `activeTabId` that names no loaded tab falls back to the first tab,
    /// and `nextScratchSequence` is raised to at least
    /// [`FIRST_SCRATCH_SEQUENCE`].
    pub fn try_load(&self) -> Result<Option<Session>, SessionError> {
        let contents = match self.fs.read_to_string(&self.session_path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(SessionError::Io {
                    path: self.session_path.clone(),
                    source,
                })
            }
        };
        let file: SessionFile = serde_json::from_str(&contents)?;
        if file.format_version > SESSION_FORMAT_VERSION {
            return Err(SessionError::UnsupportedVersion(file.format_version));
        }

        let mut seen = HashSet::with_capacity(file.tabs.len());
        let mut tabs = Vec::with_capacity(file.tabs.len());
        for record in file.tabs {
            let Some(location) = record.location() else {
                warn!(tab = %record.id, "dropping tab record without exactly one location");
                continue;
            };
            if !seen.insert(record.id) {
                warn!(tab = %record.id, "dropping duplicate tab record");
                continue;
            }
            let body = self.read_body(&location);
            tabs.push(Tab {
                id: record.id,
                name: record.name,
                location,
                saved_content: body.clone(),
                content: body,
                cursor_position: record.cursor_position,
            });
        }

        let active_tab_id = match file.active_tab_id {
            Some(id) if !seen.contains(&id) => tabs.first().map(|tab| tab.id),
            other => other,
        };

        Ok(Some(Session {
            tabs,
            active_tab_id,
            next_scratch_sequence: file.next_scratch_sequence.max(FIRST_SCRATCH_SEQUENCE),
            mru_order: file.mru_order,
        }))
    }

    fn read_body(&self, location: &TabLocation) -> String {
        let result = match location {
            TabLocation::Scratch { scratch_path } => self
                .scratch
                .read(scratch_path)
                .map_err(|err| err.to_string()),
            TabLocation::Persisted { path } => self
                .fs
                .read_to_string(path)
                .map_err(|err| format!("failed to read {}: {err}", path.display())),
        };
        result.unwrap_or_else(|err| {
            warn!(error = %err, "tab body unavailable, restoring as empty");
            String::new()
        })
    }
}
