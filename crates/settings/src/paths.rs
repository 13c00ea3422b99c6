use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

/// 覆寫資料夾位置的環境變數。 / Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "SKRIV_DATA_DIR";

const APP_DIR_NAME: &str = "skriv";
const FALLBACK_DIR_NAME: &str = ".skriv";

/// Well-known locations below the application data directory.
/// 應用程式資料夾內的固定位置。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    data_dir: PathBuf,
}

impl AppPaths {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// 依序採用：明確指定、環境變數、系統資料夾、目前目錄。 /
    /// Resolution order: explicit override, `SKRIV_DATA_DIR`, the platform data
    /// directory, then `./.skriv`.
    pub fn resolve(explicit: Option<&Path>) -> Self {
        let from_env = env::var_os(DATA_DIR_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        Self::resolve_with(explicit, from_env, dirs::data_dir())
    }

    fn resolve_with(
        explicit: Option<&Path>,
        from_env: Option<PathBuf>,
        platform: Option<PathBuf>,
    ) -> Self {
        let data_dir = explicit
            .map(Path::to_path_buf)
            .or(from_env)
            .or_else(|| platform.map(|dir| dir.join(APP_DIR_NAME)))
            .unwrap_or_else(|| PathBuf::from(FALLBACK_DIR_NAME));
        debug!(path = %data_dir.display(), "resolved data directory");
        Self::new(data_dir)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn session_file(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }

    pub fn scratch_dir(&self) -> PathBuf {
        self.data_dir.join("scratch")
    }

    pub fn preferences_file(&self) -> PathBuf {
        self.data_dir.join("preferences.json")
    }
}
