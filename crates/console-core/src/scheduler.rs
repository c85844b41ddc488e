//! Cooperative background refresh.
//!
//! The timer loop lives in the platform layer; each tick asks the
//! [`InteractionGate`] first and stays out of the way while the operator has
//! a modal open or a delete is waiting on the store.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use console_types::event::RefreshMode;

use crate::console::Console;
use crate::ports::ClockPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModalKind {
    DeleteConfirm,
    Edit,
    Detail,
}

/// Shared "interaction in progress" flag, clone-cheap via Rc.
#[derive(Clone, Default)]
pub struct InteractionGate {
    open: Rc<RefCell<Vec<ModalKind>>>,
}

impl InteractionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, kind: ModalKind) {
        let mut open = self.open.borrow_mut();
        if !open.contains(&kind) {
            open.push(kind);
        }
    }

    pub fn close(&self, kind: ModalKind) {
        self.open.borrow_mut().retain(|k| *k != kind);
    }

    pub fn is_open(&self, kind: ModalKind) -> bool {
        self.open.borrow().contains(&kind)
    }

    pub fn is_busy(&self) -> bool {
        !self.open.borrow().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A modal was open or a delete was in flight
    Skipped,
    Refreshed { sessions: usize },
    Failed,
}

pub struct RefreshScheduler {
    interval_ms: u64,
    gate: InteractionGate,
}

impl RefreshScheduler {
    pub fn new(interval_ms: u64, gate: InteractionGate) -> Self {
        Self { interval_ms, gate }
    }

    /// Tier interval, gated by the console's own modals.
    pub fn for_console(console: &Console) -> Self {
        Self::new(console.profile().refresh_interval_ms, console.interaction())
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    pub async fn tick(&self, console: &Console) -> TickOutcome {
        if self.gate.is_busy() {
            log::debug!("Background refresh skipped: modal open");
            return TickOutcome::Skipped;
        }
        if console.state().deletion().is_busy() {
            log::debug!("Background refresh skipped: delete in progress");
            return TickOutcome::Skipped;
        }
        match console.refresh(RefreshMode::Background).await {
            Ok(sessions) => TickOutcome::Refreshed { sessions },
            Err(_) => TickOutcome::Failed,
        }
    }

    /// Sleep, tick, repeat for as long as `keep_running` says so.
    pub async fn run(
        &self,
        console: &Console,
        clock: &dyn ClockPort,
        mut keep_running: impl FnMut() -> bool,
    ) {
        while keep_running() {
            clock.sleep(self.interval_ms).await;
            if !keep_running() {
                break;
            }
            self.tick(console).await;
        }
    }
}
