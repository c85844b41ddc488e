use serde::{Deserialize, Serialize};

use crate::error::ConsoleError;
use crate::profile::DeviceTier;

/// Who asked for a reload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshMode {
    /// Operator action: shows loading state, failures are surfaced
    Foreground,
    /// Timer driven: silent, failures only logged
    Background,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Operator-facing message, worded for the device tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub text: String,
}

impl Notification {
    pub fn new(level: NotificationLevel, text: impl Into<String>) -> Self {
        Self { level, text: text.into() }
    }

    /// `action` is a short verb phrase such as "delete conversation".
    pub fn for_error(tier: DeviceTier, action: &str, err: &ConsoleError) -> Self {
        let text = match (tier, err) {
            (DeviceTier::Compact, ConsoleError::NotAuthenticated) => "Please sign in".to_string(),
            (DeviceTier::Compact, ConsoleError::NetworkTimeout(_)) => "Timed out".to_string(),
            (DeviceTier::Compact, ConsoleError::ValidationLimitExceeded { limit, .. }) => {
                format!("Max {}", limit)
            }
            (DeviceTier::Compact, _) => format!("Could not {}", action),
            (_, ConsoleError::NotAuthenticated) => {
                format!("Could not {}: your session has expired, please sign in again", action)
            }
            (_, err) => format!("Could not {}: {}", action, err),
        };
        Self::new(NotificationLevel::Error, text)
    }

    pub fn deleted(tier: DeviceTier, count: usize) -> Self {
        let text = match (tier, count) {
            (DeviceTier::Compact, 1) => "Deleted".to_string(),
            (DeviceTier::Compact, n) => format!("{} deleted", n),
            (_, 1) => "Conversation deleted".to_string(),
            (_, n) => format!("{} conversations deleted", n),
        };
        Self::new(NotificationLevel::Success, text)
    }

    pub fn partial_delete(tier: DeviceTier, succeeded: usize, failed: usize) -> Self {
        let text = match tier {
            DeviceTier::Compact => format!("{} deleted, {} failed", succeeded, failed),
            _ => format!(
                "{} conversations deleted, {} could not be deleted",
                succeeded, failed
            ),
        };
        Self::new(NotificationLevel::Warning, text)
    }
}

/// Events emitted by the console pipeline.
/// The presentation layer drains these for reactive updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConsoleEvent {
    LoadStarted { mode: RefreshMode },

    LoadCompleted { mode: RefreshMode, sessions: usize },

    /// Only emitted for foreground loads
    LoadFailed { message: String },

    /// A snapshot arrived after a newer one was already applied
    LoadDiscarded { ticket: u64 },

    SelectionChanged { session_id: Option<String> },

    DeleteCommitted { session_id: String },

    BulkDeleteFinished { succeeded: usize, failed: usize },

    Notify(Notification),
}
