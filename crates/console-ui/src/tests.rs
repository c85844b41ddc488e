#[cfg(test)]
mod tests {
    use crate::state::*;
    use console_types::error::ConsoleError;
    use console_types::event::*;
    use console_types::profile::DeviceTier;

    // ─── UiState Tests ───────────────────────────────────────

    #[test]
    fn test_ui_state_initial() {
        let state = UiState::new();
        assert!(!state.loading);
        assert!(!state.deleting);
        assert_eq!(state.session_count, 0);
        assert!(state.selected.is_none());
        assert!(state.notifications.is_empty());
        assert_eq!(state.status_text, "Ready");
        assert!(!state.is_busy());
    }

    #[test]
    fn test_foreground_load_toggles_loading() {
        let mut state = UiState::new();
        state.process_events(vec![ConsoleEvent::LoadStarted { mode: RefreshMode::Foreground }]);
        assert!(state.loading);
        assert!(state.is_busy());
        assert_eq!(state.status_text, "Loading conversations...");

        state.process_events(vec![ConsoleEvent::LoadCompleted {
            mode: RefreshMode::Foreground,
            sessions: 3,
        }]);
        assert!(!state.loading);
        assert_eq!(state.session_count, 3);
        assert_eq!(state.status_text, "3 conversations");
    }

    #[test]
    fn test_background_load_never_toggles_loading() {
        let mut state = UiState::new();
        state.process_events(vec![ConsoleEvent::LoadStarted { mode: RefreshMode::Background }]);
        assert!(!state.loading);
        assert_eq!(state.status_text, "Ready");

        state.process_events(vec![ConsoleEvent::LoadCompleted {
            mode: RefreshMode::Background,
            sessions: 1,
        }]);
        assert!(!state.loading);
        assert_eq!(state.status_text, "1 conversation");
    }

    #[test]
    fn test_background_completion_keeps_foreground_spinner() {
        let mut state = UiState::new();
        state.process_events(vec![
            ConsoleEvent::LoadStarted { mode: RefreshMode::Foreground },
            ConsoleEvent::LoadStarted { mode: RefreshMode::Background },
            ConsoleEvent::LoadCompleted { mode: RefreshMode::Background, sessions: 2 },
        ]);
        assert!(state.loading);
    }

    #[test]
    fn test_load_failed() {
        let mut state = UiState::new();
        state.process_events(vec![
            ConsoleEvent::LoadStarted { mode: RefreshMode::Foreground },
            ConsoleEvent::LoadFailed { message: "Not authenticated".to_string() },
        ]);
        assert!(!state.loading);
        assert_eq!(state.status_text, "Load failed");
        assert_eq!(state.last_error.as_deref(), Some("Not authenticated"));

        state.process_events(vec![ConsoleEvent::LoadCompleted {
            mode: RefreshMode::Foreground,
            sessions: 0,
        }]);
        assert!(state.last_error.is_none());
    }

    #[test]
    fn test_selection_tracking() {
        let mut state = UiState::new();
        state.process_events(vec![ConsoleEvent::SelectionChanged {
            session_id: Some("s1".to_string()),
        }]);
        assert_eq!(state.selected.as_deref(), Some("s1"));

        state.mark_deleting();
        assert!(state.deleting);
        state.process_events(vec![ConsoleEvent::DeleteCommitted { session_id: "s1".to_string() }]);
        assert!(!state.deleting);
        assert!(state.selected.is_none());
    }

    #[test]
    fn test_failed_delete_clears_deleting() {
        let mut state = UiState::new();
        state.mark_deleting();
        let err = ConsoleError::NetworkTimeout(8000);
        state.process_events(vec![ConsoleEvent::Notify(Notification::for_error(
            DeviceTier::Compact,
            "delete conversation",
            &err,
        ))]);
        assert!(!state.deleting);
        assert_eq!(state.notifications.len(), 1);
        assert_eq!(state.notifications[0].text, "Timed out");
    }

    #[test]
    fn test_bulk_finished_clears_deleting() {
        let mut state = UiState::new();
        state.mark_deleting();
        state.process_events(vec![ConsoleEvent::BulkDeleteFinished { succeeded: 2, failed: 1 }]);
        assert!(!state.deleting);
    }

    #[test]
    fn test_notifications_capped() {
        let mut state = UiState::new();
        for n in 1..=MAX_NOTIFICATIONS + 2 {
            state.push_notification(Notification::deleted(DeviceTier::Full, n));
        }
        assert_eq!(state.notifications.len(), MAX_NOTIFICATIONS);
        assert_eq!(state.notifications[0].text, "3 conversations deleted");
    }

    #[test]
    fn test_dismiss_and_take_notifications() {
        let mut state = UiState::new();
        state.push_notification(Notification::new(NotificationLevel::Info, "a"));
        state.push_notification(Notification::new(NotificationLevel::Info, "b"));

        let dismissed = state.dismiss_notification(0).unwrap();
        assert_eq!(dismissed.text, "a");
        assert!(state.dismiss_notification(5).is_none());

        let rest = state.take_notifications();
        assert_eq!(rest.len(), 1);
        assert!(state.notifications.is_empty());
    }

    #[test]
    fn test_discarded_load_is_ignored() {
        let mut state = UiState::new();
        state.process_events(vec![ConsoleEvent::LoadDiscarded { ticket: 4 }]);
        assert_eq!(state.status_text, "Ready");
    }

    #[test]
    fn test_ui_state_serializes_camel_case() {
        let mut state = UiState::new();
        state.session_count = 2;
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["sessionCount"], 2);
        assert_eq!(json["statusText"], "Ready");
        assert!(json["notifications"].as_array().unwrap().is_empty());
    }
}
