use crate::tab::{Tab, TabId};

/// 暫存序號的起始值。 / Value the scratch sequence counter starts from.
pub const FIRST_SCRATCH_SEQUENCE: u64 = 1;

/// Process-wide editor state that survives restarts.
/// 行程層級、可跨重新啟動保存的編輯器狀態。
///
/// One instance exists per process. It is owned by the tab registry and lent
/// to the MRU tracker and autosave scheduler rather than living in a global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Display order.
    pub tabs: Vec<Tab>,
    pub active_tab_id: Option<TabId>,
    /// 只增不減；關閉分頁也不會回收序號。 / Never decremented, never reused.
    pub next_scratch_sequence: u64,
    /// MRU order as of the last save. The live order belongs to `MruTracker`.
    pub mru_order: Vec<TabId>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            tabs: Vec::new(),
            active_tab_id: None,
            next_scratch_sequence: FIRST_SCRATCH_SEQUENCE,
            mru_order: Vec::new(),
        }
    }
}

impl Session {
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn ids(&self) -> Vec<TabId> {
        self.tabs.iter().map(|tab| tab.id).collect()
    }

    pub fn position(&self, id: TabId) -> Option<usize> {
        self.tabs.iter().position(|tab| tab.id == id)
    }

    pub fn tab(&self, id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|tab| tab.id == id)
    }

    pub fn tab_mut(&mut self, id: TabId) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|tab| tab.id == id)
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.active_tab_id.and_then(|id| self.tab(id))
    }
}
