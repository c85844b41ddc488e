#[cfg(test)]
mod tests {
    use crate::app::{load_config, parse_value, RefreshLoop};
    use chrono::NaiveDate;
    use console_core::scheduler::ModalKind;
    use console_types::config::ConsoleConfig;
    use console_types::view::{CategoryFilter, SortKey, SortOrder};

    // ─── Config Tests ────────────────────────────────────────

    #[test]
    fn test_missing_config_uses_defaults() {
        assert_eq!(load_config(None), ConsoleConfig::default());
        assert_eq!(load_config(Some("   ")), ConsoleConfig::default());
    }

    #[test]
    fn test_partial_config_overrides() {
        let config = load_config(Some(r#"{"api_base":"https://clinic.example","reload_settle_ms":0}"#));
        assert_eq!(config.api_base, "https://clinic.example");
        assert_eq!(config.reload_settle_ms, 0);
        assert_eq!(config.confirm_debounce_ms, 100);
    }

    #[test]
    fn test_malformed_config_falls_back() {
        assert_eq!(load_config(Some("{not json")), ConsoleConfig::default());
    }

    // ─── Argument Parsing Tests ──────────────────────────────

    #[test]
    fn test_parse_wire_spellings() {
        let category: CategoryFilter = parse_value("category", "has-appointment").unwrap();
        assert_eq!(category, CategoryFilter::HasAppointment);
        let key: SortKey = parse_value("sort key", " message-count ").unwrap();
        assert_eq!(key, SortKey::MessageCount);
        let order: SortOrder = parse_value("sort order", "asc").unwrap();
        assert_eq!(order, SortOrder::Asc);
        let modal: ModalKind = parse_value("modal kind", "delete-confirm").unwrap();
        assert_eq!(modal, ModalKind::DeleteConfirm);
        let day: NaiveDate = parse_value("date", "2024-03-01").unwrap();
        assert_eq!(day, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    // ─── Refresh Loop Tests ──────────────────────────────────

    #[test]
    fn test_refresh_loop_single_instance() {
        let refresh_loop = RefreshLoop::default();
        let first = refresh_loop.begin().unwrap();
        assert!(refresh_loop.begin().is_none(), "already running");
        assert!(refresh_loop.is_current(first));
    }

    #[test]
    fn test_restart_retires_sleeping_loop() {
        let refresh_loop = RefreshLoop::default();
        let old = refresh_loop.begin().unwrap();
        refresh_loop.stop();
        assert!(!refresh_loop.is_current(old));

        let new = refresh_loop.begin().unwrap();
        assert_ne!(old, new);
        assert!(!refresh_loop.is_current(old), "old loop exits on waking");
        assert!(refresh_loop.is_current(new));

        refresh_loop.stop();
        assert!(!refresh_loop.is_current(new));
    }
}
