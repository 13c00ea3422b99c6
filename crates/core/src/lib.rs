//! Tab model, tab registry and MRU tracking for the skriv editor shell.
//! skriv 編輯器的分頁模型、分頁登錄與最近使用順序。

pub mod fs;
pub mod mru;
pub mod registry;
pub mod scratch;
pub mod state;
pub mod tab;

pub use fs::{write_atomic, FileSystem, OsFileSystem, SharedFileSystem};
pub use mru::{MruTracker, QuickSwitch};
pub use registry::{CloseOutcome, OpenReport, SaveOutcome, TabError, TabRegistry};
pub use scratch::{scratch_display_name, ScratchAllocation, ScratchError, ScratchStore};
pub use state::{Session, FIRST_SCRATCH_SEQUENCE};
pub use tab::{display_name_for, Tab, TabId, TabLocation};
