use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 分頁的不透明識別碼，建立後終身不變且不會重複使用。 / Opaque tab identifier; stable for the tab's lifetime and never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(Uuid);

impl TabId {
    /// 產生新的隨機識別碼。 / Generates a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TabId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TabId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// 分頁內容的後端儲存位置。 / Where a tab's body is backed.
///
/// 一個分頁要嘛已存檔於使用者路徑，要嘛位於暫存區，不會兩者皆是或皆否。
/// A tab is either persisted at a user-chosen path or kept in the scratch
/// area, never both and never neither.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TabLocation {
    Persisted { path: PathBuf },
    Scratch { scratch_path: PathBuf },
}

impl TabLocation {
    pub fn path(&self) -> Option<&Path> {
        match self {
            TabLocation::Persisted { path } => Some(path),
            TabLocation::Scratch { .. } => None,
        }
    }

    pub fn scratch_path(&self) -> Option<&Path> {
        match self {
            TabLocation::Persisted { .. } => None,
            TabLocation::Scratch { scratch_path } => Some(scratch_path),
        }
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self, TabLocation::Persisted { .. })
    }
}

/// 一份開啟中的文件。 / One open document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tab {
    pub id: TabId,
    pub name: String,
    pub location: TabLocation,
    pub content: String,
    /// 最後一次成功存檔（或載入）時的內容。 / Text as of the last successful save, or as of load.
    pub saved_content: String,
    /// 僅供使用者便利，不影響正確性。 / Caret offset; a convenience only, never load-bearing.
    pub cursor_position: usize,
}

impl Tab {
    /// 建立空白的暫存分頁。 / Creates an empty scratch tab.
    pub fn scratch(name: impl Into<String>, scratch_path: impl Into<PathBuf>) -> Self {
        Self {
            id: TabId::new(),
            name: name.into(),
            location: TabLocation::Scratch {
                scratch_path: scratch_path.into(),
            },
            content: String::new(),
            saved_content: String::new(),
            cursor_position: 0,
        }
    }

    /// 由磁碟內容建立已存檔分頁。 / Creates a persisted tab whose content was just read from `path`.
    pub fn persisted(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        let path = path.into();
        let content = content.into();
        Self {
            id: TabId::new(),
            name: display_name_for(&path),
            location: TabLocation::Persisted { path },
            saved_content: content.clone(),
            content,
            cursor_position: 0,
        }
    }

    /// `content != saved_content`。
    pub fn is_dirty(&self) -> bool {
        self.content != self.saved_content
    }

    pub fn path(&self) -> Option<&Path> {
        self.location.path()
    }

    pub fn scratch_path(&self) -> Option<&Path> {
        self.location.scratch_path()
    }

    pub fn is_persisted(&self) -> bool {
        self.location.is_persisted()
    }
}

/// 由路徑取得顯示名稱（檔名）。 / Display name for a document stored at `path` (its basename).
pub fn display_name_for(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
