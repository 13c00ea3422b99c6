use std::time::{Duration, Instant};

use skriv_core::Session;
use tracing::{debug, info};

use crate::codec::SessionCodec;

/// 預設的靜止間隔。 / Default quiet interval before an autosave fires.
pub const DEFAULT_QUIET_INTERVAL: Duration = Duration::from_millis(500);

/// Single cancelable deadline used to debounce bursts of mutations.
/// 可取消的單一計時器，用於合併連續變更。
///
/// Arming replaces any pending deadline; timers are never stacked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebounceTimer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl DebounceTimer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    pub fn quiet_interval(&self) -> Duration {
        self.quiet
    }

    /// 取消舊的計時並重新起算。 / Cancels any pending deadline and arms a new one at `now + quiet`.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    /// Returns whether a deadline was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        matches!(self.deadline, Some(deadline) if now >= deadline)
    }

    /// 到期時觸發一次並解除。 / Fires once when the deadline has passed, disarming the timer.
    pub fn fire(&mut self, now: Instant) -> bool {
        if self.is_due(now) {
            self.deadline = None;
            true
        } else {
            false
        }
    }
}

/// Debounced persistence driver.
/// 防抖自動儲存排程器。
///
/// Every observed mutation re-arms the timer; when it fires the session is
/// handed to [`SessionCodec::save`]. Tab close and application close call
/// [`flush`](Self::flush), which saves immediately regardless of the timer.
#[derive(Debug)]
pub struct AutosaveScheduler {
    timer: DebounceTimer,
    codec: SessionCodec,
    enabled: bool,
    completed_saves: u64,
}

impl AutosaveScheduler {
    pub fn new(codec: SessionCodec, quiet: Duration) -> Self {
        Self {
            timer: DebounceTimer::new(quiet),
            codec,
            enabled: true,
            completed_saves: 0,
        }
    }

    pub fn codec(&self) -> &SessionCodec {
        &self.codec
    }

    pub fn timer(&self) -> &DebounceTimer {
        &self.timer
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// 關閉後只有強制儲存會寫入。 / When disabled only forced saves write the session.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.timer.cancel();
        }
    }

    /// Number of save cycles that completed successfully.
    pub fn completed_saves(&self) -> u64 {
        self.completed_saves
    }

    pub fn notify_mutation(&mut self, now: Instant) {
        if !self.enabled {
            return;
        }
        self.timer.arm(now);
        debug!(quiet_ms = self.timer.quiet_interval().as_millis() as u64, "autosave armed");
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.timer.is_due(now)
    }

    /// 計時到期時執行儲存。 / Runs a save cycle if the quiet interval has elapsed; returns whether it fired.
    pub fn poll(&mut self, now: Instant, session: &Session) -> bool {
        if !self.timer.fire(now) {
            return false;
        }
        debug!("autosave timer fired");
        self.run(session);
        true
    }

    /// 強制立即儲存（關閉分頁或結束程式時）。 / Forced save for tab close and application close.
    pub fn flush(&mut self, session: &Session) -> bool {
        self.timer.cancel();
        info!(tabs = session.tabs.len(), "forced session save");
        self.run(session)
    }

    fn run(&mut self, session: &Session) -> bool {
        let saved = self.codec.save(session);
        if saved {
            self.completed_saves += 1;
        }
        saved
    }
}
