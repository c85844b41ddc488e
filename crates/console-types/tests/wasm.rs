//! WASM-target tests for console-types.
//!
//! Mirrors a subset of the native unit tests but runs under
//! wasm32-unknown-unknown via `wasm-pack test --node`.

use wasm_bindgen_test::*;

use console_types::config::*;
use console_types::error::*;
use console_types::event::*;
use console_types::message::*;
use console_types::profile::*;
use console_types::view::*;

// ─── Message Tests ───────────────────────────────────────

#[wasm_bindgen_test]
fn message_wire_format_roundtrip() {
    let msg = Message::user("s1", "2024-03-01T10:00:00Z", "hi").with_email("a@b.c");
    let json = serde_json::to_string(&msg).unwrap();
    assert!(json.contains("\"sessionId\":\"s1\""));
    assert!(json.contains("\"messageType\":\"user\""));
    let back: Message = serde_json::from_str(&json).unwrap();
    assert_eq!(back, msg);
}

#[wasm_bindgen_test]
fn message_unparsable_timestamp() {
    let msg = Message::assistant("s1", "not a date", "hello");
    assert!(msg.parsed_timestamp().is_none());
}

// ─── Profile Tests ───────────────────────────────────────

#[wasm_bindgen_test]
fn profile_unknown_signal_is_compact() {
    let p = DeviceProfile::resolve("watch");
    assert_eq!(p.tier, DeviceTier::Compact);
    assert_eq!(p.max_bulk_ops, 10);
}

#[wasm_bindgen_test]
fn profile_page_size_options_nonempty() {
    for tier in DeviceTier::all() {
        let p = DeviceProfile::for_tier(*tier);
        for mode in ViewMode::all() {
            assert!(!p.page_size_options(*mode).is_empty());
            assert_eq!(p.default_page_size(*mode), p.page_size_options(*mode)[0]);
        }
    }
}

// ─── Notification / Error Tests ──────────────────────────

#[wasm_bindgen_test]
fn notification_not_authenticated() {
    let n = Notification::for_error(DeviceTier::Compact, "load", &ConsoleError::NotAuthenticated);
    assert_eq!(n.text, "Please sign in");
}

#[wasm_bindgen_test]
fn error_timeout_is_retryable() {
    assert!(ConsoleError::NetworkTimeout(8_000).is_retryable());
    assert_eq!(ConsoleError::NetworkTimeout(8_000).to_string(), "Timeout after 8000ms");
}

// ─── Config Tests ────────────────────────────────────────

#[wasm_bindgen_test]
fn config_lookup_url() {
    let mut c = ConsoleConfig::default();
    c.api_base = "https://api.example.com".to_string();
    assert_eq!(
        c.appointments_lookup_url(),
        "https://api.example.com/api/appointments/by-sessions"
    );
}
