//! UI-level state that drives rendering.
//! This is a read-only projection of the console's event stream, updated
//! by draining the EventBus after every action and timer tick.

use std::collections::VecDeque;

use serde::Serialize;

use console_types::event::{ConsoleEvent, Notification, NotificationLevel, RefreshMode};

/// Toasts kept on screen at once; older ones drop off
pub const MAX_NOTIFICATIONS: usize = 5;

/// State visible to the view layer
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    /// Foreground load in flight. Background refreshes never set it.
    pub loading: bool,
    /// A delete request is waiting for the store
    pub deleting: bool,
    /// Sessions in the last applied load
    pub session_count: usize,
    pub selected: Option<String>,
    pub notifications: VecDeque<Notification>,
    /// Last foreground load failure, cleared by the next success
    pub last_error: Option<String>,
    /// Status line text
    pub status_text: String,
}

impl UiState {
    pub fn new() -> Self {
        Self {
            loading: false,
            deleting: false,
            session_count: 0,
            selected: None,
            notifications: VecDeque::new(),
            last_error: None,
            status_text: "Ready".to_string(),
        }
    }

    /// Process events from the EventBus and update UI state
    pub fn process_events(&mut self, events: Vec<ConsoleEvent>) {
        for event in events {
            match event {
                ConsoleEvent::LoadStarted { mode: RefreshMode::Foreground } => {
                    self.loading = true;
                    self.status_text = "Loading conversations...".to_string();
                }
                ConsoleEvent::LoadStarted { mode: RefreshMode::Background } => {}
                ConsoleEvent::LoadCompleted { mode, sessions } => {
                    self.session_count = sessions;
                    if mode == RefreshMode::Foreground {
                        self.loading = false;
                        self.last_error = None;
                    }
                    self.status_text = match sessions {
                        1 => "1 conversation".to_string(),
                        n => format!("{} conversations", n),
                    };
                }
                ConsoleEvent::LoadFailed { message } => {
                    self.loading = false;
                    self.status_text = "Load failed".to_string();
                    self.last_error = Some(message);
                }
                ConsoleEvent::LoadDiscarded { ticket } => {
                    log::debug!("UI ignoring stale load #{}", ticket);
                }
                ConsoleEvent::SelectionChanged { session_id } => {
                    self.selected = session_id;
                }
                ConsoleEvent::DeleteCommitted { session_id } => {
                    self.deleting = false;
                    if self.selected.as_deref() == Some(session_id.as_str()) {
                        self.selected = None;
                    }
                }
                ConsoleEvent::BulkDeleteFinished { .. } => {
                    self.deleting = false;
                }
                ConsoleEvent::Notify(notification) => {
                    if notification.level == NotificationLevel::Error {
                        self.deleting = false;
                    }
                    self.push_notification(notification);
                }
            }
        }
    }

    /// Called by the view right before it awaits a delete.
    pub fn mark_deleting(&mut self) {
        self.deleting = true;
        self.status_text = "Deleting...".to_string();
    }

    pub fn push_notification(&mut self, notification: Notification) {
        if self.notifications.len() == MAX_NOTIFICATIONS {
            self.notifications.pop_front();
        }
        self.notifications.push_back(notification);
    }

    pub fn dismiss_notification(&mut self, index: usize) -> Option<Notification> {
        self.notifications.remove(index)
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain(..).collect()
    }

    pub fn is_busy(&self) -> bool {
        self.loading || self.deleting
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}
