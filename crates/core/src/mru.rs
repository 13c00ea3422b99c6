use std::collections::HashSet;

use crate::tab::TabId;

/// 快速切換介面開啟時的凍結快照。 / Frozen snapshot browsed while the quick-switch UI is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickSwitch {
    snapshot: Vec<TabId>,
    index: usize,
    reverse: bool,
}

impl QuickSwitch {
    pub fn snapshot(&self) -> &[TabId] {
        &self.snapshot
    }

    /// 目前選取的位置。 / Index of the visually selected entry.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn selection(&self) -> TabId {
        self.snapshot[self.index]
    }
}

/// 最近使用順序（最新在前），與顯示順序互相獨立。 /
/// Most-recently-used ordering over open tab ids, most recent first.
///
/// `order` is always a permutation of the open ids handed to [`sync`](Self::sync).
/// Only explicit activation promotes an id to the front.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MruTracker {
    order: Vec<TabId>,
    switcher: Option<QuickSwitch>,
}

impl MruTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以先前保存的順序建立，並與目前開啟的分頁對齊。 /
    /// Seeds the tracker from a persisted order, reconciled against the open ids.
    pub fn with_order(saved: &[TabId], open: &[TabId]) -> Self {
        let mut tracker = Self {
            order: Vec::with_capacity(open.len()),
            switcher: None,
        };
        let mut seen = HashSet::with_capacity(saved.len());
        for id in saved {
            if seen.insert(*id) {
                tracker.order.push(*id);
            }
        }
        tracker.sync(open);
        tracker
    }

    pub fn order(&self) -> &[TabId] {
        &self.order
    }

    pub fn switcher(&self) -> Option<&QuickSwitch> {
        self.switcher.as_ref()
    }

    pub fn is_switching(&self) -> bool {
        self.switcher.is_some()
    }

    /// 分頁集合變動後同步：移除已關閉者、新分頁附加於尾端。 /
    /// Reconciles with the open set: drops closed ids and appends new ones at the back.
    pub fn sync(&mut self, open: &[TabId]) {
        let open_set: HashSet<TabId> = open.iter().copied().collect();
        self.order.retain(|id| open_set.contains(id));
        for id in open {
            if !self.order.contains(id) {
                self.order.push(*id);
            }
        }

        let mut too_few = false;
        if let Some(switcher) = &mut self.switcher {
            let selected = switcher.snapshot.get(switcher.index).copied();
            switcher.snapshot.retain(|id| open_set.contains(id));
            too_few = switcher.snapshot.len() < 2;
            if !too_few {
                let fallback = switcher.index.min(switcher.snapshot.len() - 1);
                switcher.index = selected
                    .and_then(|id| switcher.snapshot.iter().position(|candidate| *candidate == id))
                    .unwrap_or(fallback);
            }
        }
        if too_few {
            self.switcher = None;
        }
    }

    /// 分頁被啟用。 / Records an activation of `id`.
    ///
    /// With the quick-switch UI closed the id moves to the front. While it is
    /// open only the selection inside the frozen snapshot follows.
    pub fn activate(&mut self, id: TabId) {
        if let Some(switcher) = &mut self.switcher {
            if let Some(position) = switcher.snapshot.iter().position(|candidate| *candidate == id) {
                switcher.index = position;
            }
            return;
        }
        self.promote(id);
    }

    /// 開啟快速切換，回傳初始選取。 / Opens the quick-switch UI and returns the initial selection.
    ///
    /// The selection starts one step away from the current tab: position 1, or
    /// the last position in reverse mode. Disabled with fewer than two tabs.
    pub fn open_switcher(&mut self, reverse: bool) -> Option<TabId> {
        if self.order.len() < 2 {
            return None;
        }
        let index = if reverse { self.order.len() - 1 } else { 1 };
        let switcher = QuickSwitch {
            snapshot: self.order.clone(),
            index,
            reverse,
        };
        let selection = switcher.selection();
        self.switcher = Some(switcher);
        Some(selection)
    }

    /// 重複按下切換鍵。 / Moves the selection one step in the switcher's direction, wrapping around.
    pub fn advance(&mut self) -> Option<TabId> {
        let switcher = self.switcher.as_mut()?;
        let len = switcher.snapshot.len();
        switcher.index = if switcher.reverse {
            (switcher.index + len - 1) % len
        } else {
            (switcher.index + 1) % len
        };
        Some(switcher.selection())
    }

    /// 放開修飾鍵：確認選取並關閉介面。 / Releases the modifier: commits the selection and closes the UI.
    pub fn release(&mut self) -> Option<TabId> {
        let switcher = self.switcher.take()?;
        let selection = switcher.selection();
        self.promote(selection);
        Some(selection)
    }

    /// 關閉介面但不改變順序。 / Closes the UI without reordering.
    pub fn cancel(&mut self) {
        self.switcher = None;
    }

    fn promote(&mut self, id: TabId) {
        if let Some(position) = self.order.iter().position(|candidate| *candidate == id) {
            let id = self.order.remove(position);
            self.order.insert(0, id);
        }
    }
}
