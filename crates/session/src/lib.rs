//! Session persistence and autosave for the skriv editor shell.
//! skriv 編輯器的工作階段持久化與自動儲存。

pub mod autosave;
pub mod codec;
mod serde_path;
pub mod workbench;

pub use autosave::{AutosaveScheduler, DebounceTimer, DEFAULT_QUIET_INTERVAL};
pub use codec::{SessionCodec, SessionError, SESSION_FORMAT_VERSION};
pub use workbench::{Workbench, WorkbenchConfig};
