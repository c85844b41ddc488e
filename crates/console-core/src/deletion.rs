//! Server-confirmed deletion.
//!
//! A delete walks `Idle → Confirming → Requesting → Committed | Failed`.
//! Nothing is removed locally until the store has confirmed; the caller then
//! removes the confirmed ids and forces a reload.

use serde::Serialize;

use console_types::{ConsoleError, Result};

use crate::net::{with_retry, RetryPolicy};
use crate::ports::{ClockPort, MessageSourcePort};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "ids", rename_all = "lowercase")]
pub enum DeleteTarget {
    Single(String),
    Bulk(Vec<String>),
}

impl DeleteTarget {
    pub fn ids(&self) -> Vec<String> {
        match self {
            DeleteTarget::Single(id) => vec![id.clone()],
            DeleteTarget::Bulk(ids) => ids.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum DeletionState {
    Idle,
    Confirming { target: DeleteTarget, opened_at_ms: u64 },
    Requesting { target: DeleteTarget },
    Committed { deleted: Vec<String> },
    Failed { message: String },
}

/// Drives the per-action state machine, including the confirmation
/// dialog's dismissal debounce.
#[derive(Debug)]
pub struct DeletionFlow {
    state: DeletionState,
    debounce_ms: u64,
}

impl DeletionFlow {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            state: DeletionState::Idle,
            debounce_ms,
        }
    }

    pub fn state(&self) -> &DeletionState {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        matches!(
            self.state,
            DeletionState::Confirming { .. } | DeletionState::Requesting { .. }
        )
    }

    /// Opens the confirmation step. Refused while another delete is
    /// still pending.
    pub fn open(&mut self, target: DeleteTarget, now_ms: u64) -> bool {
        if self.is_busy() {
            return false;
        }
        self.state = DeletionState::Confirming {
            target,
            opened_at_ms: now_ms,
        };
        true
    }

    /// A dismissal arriving inside the debounce window is the dialog's own
    /// opening event leaking through; it is ignored.
    pub fn dismiss(&mut self, now_ms: u64) -> bool {
        match &self.state {
            DeletionState::Confirming { opened_at_ms, .. } => {
                if now_ms.saturating_sub(*opened_at_ms) < self.debounce_ms {
                    log::debug!("Ignoring dismissal {}ms after open", now_ms.saturating_sub(*opened_at_ms));
                    return false;
                }
                self.state = DeletionState::Idle;
                true
            }
            _ => false,
        }
    }

    pub fn confirm(&mut self) -> Option<DeleteTarget> {
        match std::mem::replace(&mut self.state, DeletionState::Idle) {
            DeletionState::Confirming { target, .. } => {
                self.state = DeletionState::Requesting {
                    target: target.clone(),
                };
                Some(target)
            }
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Enter `Requesting` directly, for deletes that were confirmed
    /// elsewhere.
    pub fn begin(&mut self, target: DeleteTarget) {
        if !matches!(self.state, DeletionState::Requesting { .. }) {
            self.state = DeletionState::Requesting { target };
        }
    }

    pub fn commit(&mut self, deleted: Vec<String>) {
        self.state = DeletionState::Committed { deleted };
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.state = DeletionState::Failed {
            message: message.into(),
        };
    }

    pub fn reset(&mut self) {
        self.state = DeletionState::Idle;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedDelete {
    pub session_id: String,
    pub error: String,
}

/// Per-item accounting for a bulk delete
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<FailedDelete>,
}

impl BulkDeleteReport {
    pub fn succeeded_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// `PartialBulkFailure` unless every item was deleted.
    pub fn ensure_complete(&self) -> Result<()> {
        if self.is_complete() {
            Ok(())
        } else {
            Err(ConsoleError::PartialBulkFailure {
                succeeded: self.succeeded_count(),
                failed: self.failed_count(),
            })
        }
    }
}

pub async fn delete_one(
    source: &dyn MessageSourcePort,
    clock: &dyn ClockPort,
    policy: &RetryPolicy,
    token: &str,
    session_id: &str,
) -> Result<()> {
    with_retry(clock, policy, || source.delete(token, session_id)).await
}

/// Rejects oversize batches before anything is sent.
pub fn check_bulk_limit(requested: usize, limit: usize) -> Result<()> {
    if requested > limit {
        return Err(ConsoleError::ValidationLimitExceeded {
            operation: "bulk delete".to_string(),
            requested,
            limit,
        });
    }
    Ok(())
}

/// One request at a time, in order. A lost credential stops the batch and
/// the untried ids are reported as failed.
pub async fn delete_many(
    source: &dyn MessageSourcePort,
    clock: &dyn ClockPort,
    policy: &RetryPolicy,
    token: &str,
    ids: &[String],
    limit: usize,
) -> Result<BulkDeleteReport> {
    let mut unique: Vec<&String> = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(&id) {
            unique.push(id);
        }
    }
    check_bulk_limit(unique.len(), limit)?;

    let mut report = BulkDeleteReport::default();
    let mut remaining = unique.into_iter();
    while let Some(id) = remaining.next() {
        match delete_one(source, clock, policy, token, id).await {
            Ok(()) => report.succeeded.push(id.clone()),
            Err(ConsoleError::NotAuthenticated) => {
                log::warn!("Bulk delete stopped: credential rejected");
                let error = ConsoleError::NotAuthenticated.to_string();
                report.failed.push(FailedDelete {
                    session_id: id.clone(),
                    error: error.clone(),
                });
                report.failed.extend(remaining.by_ref().map(|rest| FailedDelete {
                    session_id: rest.clone(),
                    error: error.clone(),
                }));
                break;
            }
            Err(e) => {
                log::warn!("Delete of session {} failed: {}", id, e);
                report.failed.push(FailedDelete {
                    session_id: id.clone(),
                    error: e.to_string(),
                });
            }
        }
    }
    Ok(report)
}
