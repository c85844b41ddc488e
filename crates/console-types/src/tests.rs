#[cfg(test)]
mod tests {
    use crate::config::*;
    use crate::error::*;
    use crate::Result;
    use crate::event::*;
    use crate::message::*;
    use crate::profile::*;
    use crate::session::*;
    use crate::view::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    // ─── Message Tests ───────────────────────────────────────

    #[test]
    fn test_message_user_constructor() {
        let msg = Message::user("s1", "2024-03-01T10:00:00Z", "hi");
        assert_eq!(msg.session_id, "s1");
        assert!(msg.is_user());
        assert!(msg.user_info.is_none());
        assert!(msg.user_email.is_none());
    }

    #[test]
    fn test_message_deserializes_camel_case() {
        let json = r#"{
            "sessionId": "abc",
            "timestamp": "2024-03-01T10:00:00Z",
            "messageType": "assistant",
            "content": "Hello!",
            "userInfo": {"firstName": "Ana"},
            "userEmail": "ana@example.com"
        }"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.session_id, "abc");
        assert_eq!(msg.message_type, MessageType::Assistant);
        assert_eq!(msg.user_info.unwrap().first_name.as_deref(), Some("Ana"));
        assert_eq!(msg.user_email.as_deref(), Some("ana@example.com"));
    }

    #[test]
    fn test_message_missing_content_defaults_empty() {
        let json = r#"{"sessionId":"a","timestamp":"x","messageType":"user"}"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.content, "");
    }

    #[test]
    fn test_parse_timestamp_rfc3339_with_offset() {
        let ts = parse_timestamp("2024-03-01T12:00:00+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_timestamp_sql_form() {
        let ts = parse_timestamp("2024-03-01 10:05:30").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 1, 10, 5, 30).unwrap());
    }

    #[test]
    fn test_parse_timestamp_garbage() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("2024-13-45T99:00:00Z").is_none());
    }

    // ─── Session Tests ───────────────────────────────────────

    #[test]
    fn test_set_appointment_roundtrip() {
        let mut agg = SessionAggregate {
            session_id: "s1".to_string(),
            user_name: ANONYMOUS_USER.to_string(),
            user_email: None,
            message_count: 0,
            first_message: SESSION_STARTED.to_string(),
            started_at: None,
            last_activity: None,
            duration_minutes: 0,
            duration: "0m".to_string(),
            has_appointment: false,
            appointment_id: None,
            appointment: None,
            messages: Vec::new(),
        };
        agg.set_appointment(Some(&AppointmentRef::new(7)));
        assert!(agg.has_appointment);
        assert_eq!(agg.appointment_id, Some(7));

        agg.set_appointment(None);
        assert!(!agg.has_appointment);
        assert!(agg.appointment_id.is_none());
        assert!(agg.appointment.is_none());
    }

    #[test]
    fn test_appointment_ref_deserializes_partial() {
        let a: AppointmentRef = serde_json::from_str(r#"{"appointmentId": 12}"#).unwrap();
        assert_eq!(a.appointment_id, 12);
        assert!(a.name.is_empty());
    }

    // ─── Profile Tests ───────────────────────────────────────

    #[test]
    fn test_classify_known_signals() {
        assert_eq!(DeviceTier::classify("desktop"), DeviceTier::Full);
        assert_eq!(DeviceTier::classify(" Tablet "), DeviceTier::Medium);
        assert_eq!(DeviceTier::classify("mobile"), DeviceTier::Compact);
    }

    #[test]
    fn test_classify_unknown_is_compact() {
        assert_eq!(DeviceTier::classify(""), DeviceTier::Compact);
        assert_eq!(DeviceTier::classify("smart-fridge"), DeviceTier::Compact);
    }

    #[test]
    fn test_viewport_breakpoints() {
        assert_eq!(DeviceTier::from_viewport_width(375), DeviceTier::Compact);
        assert_eq!(DeviceTier::from_viewport_width(768), DeviceTier::Medium);
        assert_eq!(DeviceTier::from_viewport_width(1023), DeviceTier::Medium);
        assert_eq!(DeviceTier::from_viewport_width(1440), DeviceTier::Full);
    }

    #[test]
    fn test_resolve_is_deterministic() {
        assert_eq!(DeviceProfile::resolve("tablet"), DeviceProfile::resolve("tablet"));
        assert_eq!(DeviceProfile::resolve("???"), DeviceProfile::for_tier(DeviceTier::Compact));
    }

    #[test]
    fn test_higher_tiers_refresh_more_often() {
        let compact = DeviceProfile::for_tier(DeviceTier::Compact);
        let medium = DeviceProfile::for_tier(DeviceTier::Medium);
        let full = DeviceProfile::for_tier(DeviceTier::Full);
        assert!(compact.refresh_interval_ms > medium.refresh_interval_ms);
        assert!(medium.refresh_interval_ms > full.refresh_interval_ms);
        assert!(compact.max_bulk_ops < full.max_bulk_ops);
    }

    #[test]
    fn test_page_size_defaults_and_snapping() {
        let full = DeviceProfile::for_tier(DeviceTier::Full);
        assert_eq!(full.default_page_size(ViewMode::Table), 25);
        assert_eq!(full.snap_page_size(ViewMode::Table, 47), 50);
        assert_eq!(full.snap_page_size(ViewMode::Table, 0), 25);
        assert_eq!(full.snap_page_size(ViewMode::Table, 10_000), 100);
    }

    #[test]
    fn test_default_view_mode_by_tier() {
        assert_eq!(DeviceProfile::for_tier(DeviceTier::Compact).default_view_mode(), ViewMode::List);
        assert_eq!(DeviceProfile::for_tier(DeviceTier::Full).default_view_mode(), ViewMode::Grid);
    }

    // ─── View Tests ──────────────────────────────────────────

    #[test]
    fn test_view_mode_parse() {
        for mode in ViewMode::all() {
            assert_eq!(ViewMode::parse(mode.as_str()), Some(*mode));
        }
        assert_eq!(ViewMode::parse("carousel"), None);
    }

    #[test]
    fn test_date_range_swaps_reversed_bounds() {
        let a = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let b = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let range = DateRange::new(a, b);
        assert_eq!(range.start, b);
        assert!(range.contains(a));
        assert!(range.contains(b));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()));
    }

    #[test]
    fn test_view_state_defaults() {
        let v = ViewState::new(ViewMode::Grid, 12);
        assert_eq!(v.page, 1);
        assert_eq!(v.sort_key, SortKey::Recency);
        assert_eq!(v.sort_order, SortOrder::Desc);
        assert!(v.is_unfiltered());
    }

    #[test]
    fn test_category_filter_serde_names() {
        let json = serde_json::to_string(&CategoryFilter::HasAppointment).unwrap();
        assert_eq!(json, "\"has-appointment\"");
    }

    // ─── Event / Notification Tests ──────────────────────────

    #[test]
    fn test_notification_compact_is_terse() {
        let err = ConsoleError::Network("connection reset".to_string());
        let compact = Notification::for_error(DeviceTier::Compact, "delete conversation", &err);
        let full = Notification::for_error(DeviceTier::Full, "delete conversation", &err);
        assert_eq!(compact.level, NotificationLevel::Error);
        assert_eq!(compact.text, "Could not delete conversation");
        assert!(full.text.contains("connection reset"));
        assert!(full.text.len() > compact.text.len());
    }

    #[test]
    fn test_notification_deleted_plural() {
        assert_eq!(Notification::deleted(DeviceTier::Full, 1).text, "Conversation deleted");
        assert_eq!(Notification::deleted(DeviceTier::Full, 3).text, "3 conversations deleted");
        assert_eq!(Notification::deleted(DeviceTier::Compact, 3).text, "3 deleted");
    }

    #[test]
    fn test_event_serialization_roundtrip() {
        let event = ConsoleEvent::BulkDeleteFinished { succeeded: 3, failed: 1 };
        let json = serde_json::to_string(&event).unwrap();
        let back: ConsoleEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    // ─── Config Tests ────────────────────────────────────────

    #[test]
    fn test_config_defaults() {
        let c = ConsoleConfig::default();
        assert_eq!(c.confirm_debounce_ms, 100);
        assert_eq!(c.messages_url(), "/api/chat/messages");
    }

    #[test]
    fn test_config_partial_json_uses_defaults() {
        let c = ConsoleConfig::from_json(r#"{"api_base": "https://bot.example.com/"}"#).unwrap();
        assert_eq!(c.messages_url(), "https://bot.example.com/api/chat/messages");
        assert_eq!(c.reload_settle_ms, 500);
    }

    #[test]
    fn test_config_invalid_json() {
        let err = ConsoleConfig::from_json("{nope").unwrap_err();
        assert!(matches!(err, ConsoleError::Serialization(_)));
    }

    #[test]
    fn test_session_url_encodes_id() {
        let c = ConsoleConfig::default();
        assert_eq!(c.session_url("a b/c"), "/api/chat/messages/a%20b%2Fc");
        assert_eq!(c.session_url("sess-1_x.y~z"), "/api/chat/messages/sess-1_x.y~z");
        assert_eq!(c.session_url("café?q"), "/api/chat/messages/caf%C3%A9%3Fq");
    }

    // ─── Error Tests ─────────────────────────────────────────

    #[test]
    fn test_retryable_classification() {
        assert!(ConsoleError::NetworkTimeout(100).is_retryable());
        assert!(ConsoleError::Network("x".into()).is_retryable());
        assert!(ConsoleError::Http { status: 503, message: String::new() }.is_retryable());
        assert!(!ConsoleError::Http { status: 404, message: String::new() }.is_retryable());
        assert!(!ConsoleError::NotAuthenticated.is_retryable());
        assert!(!ConsoleError::Rejected("no".into()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let e = ConsoleError::PartialBulkFailure { succeeded: 3, failed: 1 };
        assert_eq!(e.to_string(), "1 of 4 items failed");
        let e = ConsoleError::ValidationLimitExceeded {
            operation: "bulk delete".into(),
            requested: 12,
            limit: 10,
        };
        assert_eq!(e.to_string(), "bulk delete: 12 items requested, limit is 10");
    }

    #[test]
    fn test_serde_error_converts() {
        let err: ConsoleError = serde_json::from_str::<Message>("[]").unwrap_err().into();
        assert!(matches!(err, ConsoleError::Serialization(_)));
        let _: Result<()> = Err(err);
    }
}
