use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 宿主環境提供的檔案 I/O 原語。 / File I/O primitives consumed from the host environment.
///
/// 核心只依賴這些操作的契約：成功時回傳內容或 `()`，失敗時回傳可辨識的 `io::Error`。
/// The core only depends on their contract: success yields content or `()`,
/// failure yields a distinguishable `io::Error`.
pub trait FileSystem: fmt::Debug + Send + Sync {
    fn exists(&self, path: &Path) -> bool;
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
    fn remove_file(&self, path: &Path) -> io::Result<()>;
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// 以共享方式持有的檔案系統實作。 / Shared handle to a file-system implementation.
pub type SharedFileSystem = Arc<dyn FileSystem>;

/// 直接對應 `std::fs` 的實作。 / Implementation backed directly by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl OsFileSystem {
    /// 建立共享的 `OsFileSystem`。 / Returns an `OsFileSystem` behind a shared handle.
    pub fn shared() -> SharedFileSystem {
        Arc::new(OsFileSystem)
    }
}

impl FileSystem for OsFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        fs::write(path, contents.as_bytes())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }
}

/// 以臨時檔案搭配 rename 實現原子寫入。 / Writes data atomically via a temporary sibling file followed by rename.
///
/// 寫入失敗時原檔案保持不變。 / On failure the previous file is left untouched.
pub fn write_atomic(fs: &dyn FileSystem, path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs.create_dir_all(parent)?;
        }
    }
    let tmp_path = temp_path_for(path);
    let result = fs
        .write(&tmp_path, contents)
        .and_then(|()| fs.rename(&tmp_path, path));
    if result.is_err() {
        // 清掉殘留的部分寫入。 / Drop whatever part of the temp file made it to disk.
        let _ = fs.remove_file(&tmp_path);
    }
    result
}

/// `notes.txt` -> `notes.txt.tmp`, never another file's name.
pub(crate) fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
