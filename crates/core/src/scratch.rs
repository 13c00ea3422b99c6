use std::io;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::fs::{write_atomic, SharedFileSystem};

const SCRATCH_FILE_PREFIX: &str = "new-";
const SCRATCH_FILE_EXTENSION: &str = "txt";

/// 暫存區操作的錯誤。 / Errors raised by the scratch storage gateway.
#[derive(Debug, Error)]
pub enum ScratchError {
    #[error("failed to prepare scratch directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write scratch file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read scratch file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to delete scratch file {}: {source}", path.display())]
    Delete {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// 新配置的暫存檔與其序號。 / A freshly allocated scratch file and the sequence number it was named after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchAllocation {
    pub path: PathBuf,
    pub sequence: u64,
}

/// 未存檔文件的暫存區。 / Directory-backed scratch area holding bodies of never-saved documents.
#[derive(Debug, Clone)]
pub struct ScratchStore {
    root: PathBuf,
    fs: SharedFileSystem,
}

impl ScratchStore {
    pub fn new(root: impl Into<PathBuf>, fs: SharedFileSystem) -> Self {
        Self {
            root: root.into(),
            fs,
        }
    }

    /// 依序號推導暫存檔路徑。 / Path a scratch file for `sequence` is stored at.
    pub fn path_for(&self, sequence: u64) -> PathBuf {
        self.root.join(format!(
            "{SCRATCH_FILE_PREFIX}{sequence}.{SCRATCH_FILE_EXTENSION}"
        ))
    }

    /// 配置新的空白暫存檔。 / Allocates a new, empty scratch file.
    ///
    /// Starts at `next_sequence` and skips forward past any sequence whose file
    /// already exists, so an orphaned body is never overwritten. The returned
    /// sequence is the one the file was actually named after.
    pub fn allocate(&self, next_sequence: u64) -> Result<ScratchAllocation, ScratchError> {
        self.ensure_root()?;
        let mut sequence = next_sequence.max(1);
        while self.fs.exists(&self.path_for(sequence)) {
            sequence += 1;
        }
        let path = self.path_for(sequence);
        self.fs
            .write(&path, "")
            .map_err(|source| ScratchError::Write {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), sequence, "allocated scratch file");
        Ok(ScratchAllocation { path, sequence })
    }

    /// 覆寫暫存檔內容。 / Replaces a scratch file's body with `contents`.
    ///
    /// The body is swapped in atomically; a failed write keeps the previous one.
    pub fn write(&self, path: &Path, contents: &str) -> Result<(), ScratchError> {
        self.ensure_root()?;
        write_atomic(self.fs.as_ref(), path, contents).map_err(|source| {
            ScratchError::Write {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    pub fn read(&self, path: &Path) -> Result<String, ScratchError> {
        self.fs
            .read_to_string(path)
            .map_err(|source| ScratchError::Read {
                path: path.to_path_buf(),
                source,
            })
    }

    /// 刪除暫存檔；檔案不存在時視為成功。 / Deletes a scratch file; a missing file counts as success.
    pub fn delete(&self, path: &Path) -> Result<(), ScratchError> {
        match self.fs.remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(ScratchError::Delete {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn ensure_root(&self) -> Result<(), ScratchError> {
        self.fs
            .create_dir_all(&self.root)
            .map_err(|source| ScratchError::CreateDir {
                path: self.root.clone(),
                source,
            })
    }
}

/// 暫存分頁的預設名稱。 / Placeholder display name for the scratch tab created from `sequence`.
pub fn scratch_display_name(sequence: u64) -> String {
    format!("new {sequence}")
}
