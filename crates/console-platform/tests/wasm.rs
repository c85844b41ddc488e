//! WASM-target tests for console-platform (Node.js runtime).
//!
//! Tests MemoryPreferences, wire decoding, URL building and the timer clock
//! under wasm32-unknown-unknown via `wasm-pack test --node`.
//!
//! localStorage and live HTTP need a browser and are not covered here.

use wasm_bindgen_test::*;

use console_core::ports::{ClockPort, FetchParams, PreferencePort};
use console_platform::http::{decode_ack, decode_links, decode_messages, fetch_url, status_error};
use console_platform::storage::MemoryPreferences;
use console_platform::TimerClock;
use console_types::config::ConsoleConfig;
use console_types::message::MessageType;
use console_types::ConsoleError;

// ─── MemoryPreferences Tests ─────────────────────────────

#[wasm_bindgen_test]
fn memory_preferences_backend_name() {
    assert_eq!(MemoryPreferences::new().backend_name(), "memory");
}

#[wasm_bindgen_test]
fn memory_preferences_get_missing() {
    let prefs = MemoryPreferences::new();
    assert_eq!(prefs.get("nope").unwrap(), None);
    assert!(prefs.is_empty());
}

#[wasm_bindgen_test]
fn memory_preferences_set_overwrite_remove() {
    let prefs = MemoryPreferences::new();
    prefs.set("console:pref:full:grid:page_size", "12").unwrap();
    prefs.set("console:pref:full:grid:page_size", "24").unwrap();
    assert_eq!(
        prefs.get("console:pref:full:grid:page_size").unwrap().as_deref(),
        Some("24")
    );
    assert_eq!(prefs.len(), 1);
    prefs.remove("console:pref:full:grid:page_size").unwrap();
    prefs.remove("never-set").unwrap();
    assert!(prefs.is_empty());
}

// ─── URL Tests ───────────────────────────────────────────

#[wasm_bindgen_test]
fn fetch_url_collection() {
    let config = ConsoleConfig {
        api_base: "https://clinic.example/".to_string(),
        ..ConsoleConfig::default()
    };
    let params = FetchParams { session_id: None, limit: 500, days: 30 };
    assert_eq!(
        fetch_url(&config, &params),
        "https://clinic.example/api/chat/messages?limit=500&days=30"
    );
}

#[wasm_bindgen_test]
fn fetch_url_single_session_is_encoded() {
    let config = ConsoleConfig::default();
    let params = FetchParams { session_id: Some("a b/c".to_string()), limit: 200, days: 7 };
    assert_eq!(
        fetch_url(&config, &params),
        "/api/chat/messages/a%20b%2Fc?limit=200&days=7"
    );
}

// ─── Decoding Tests ──────────────────────────────────────

#[wasm_bindgen_test]
fn decode_bare_message_array() {
    let body = r#"[
        {"sessionId":"s1","timestamp":"2024-03-01T10:00:00Z","messageType":"user","content":"hi"},
        {"sessionId":"s1","timestamp":"2024-03-01T10:01:00Z","messageType":"assistant","content":"hello"}
    ]"#;
    let messages = decode_messages(body).unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].message_type, MessageType::Assistant);
}

#[wasm_bindgen_test]
fn decode_message_envelope() {
    let body = r#"{"success":true,"data":[{"sessionId":"s1","timestamp":"","messageType":"user"}]}"#;
    let messages = decode_messages(body).unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, "");
}

#[wasm_bindgen_test]
fn decode_rejected_envelope() {
    let body = r#"{"success":false,"error":"table locked"}"#;
    assert_eq!(
        decode_messages(body).unwrap_err(),
        ConsoleError::Rejected("table locked".to_string())
    );
}

#[wasm_bindgen_test]
fn decode_garbage_is_serialization_error() {
    assert!(matches!(decode_messages("<html>"), Err(ConsoleError::Serialization(_))));
}

#[wasm_bindgen_test]
fn decode_links_bare_and_envelope() {
    let bare = r#"{"s1":{"appointmentId":7,"name":"Ana","date":"2024-03-04","time":"10:00"}}"#;
    let map = decode_links(bare).unwrap();
    assert_eq!(map["s1"].appointment_id, 7);
    assert_eq!(map["s1"].name, "Ana");

    let wrapped = r#"{"success":true,"appointments":{"s2":{"appointmentId":9}}}"#;
    let map = decode_links(wrapped).unwrap();
    assert_eq!(map.len(), 1);
    assert_eq!(map["s2"].appointment_id, 9);
}

#[wasm_bindgen_test]
fn decode_delete_acknowledgements() {
    assert!(decode_ack("").is_ok());
    assert!(decode_ack("OK").is_ok());
    assert!(decode_ack(r#"{"success":true}"#).is_ok());
    assert!(matches!(
        decode_ack(r#"{"success":false,"message":"not yours"}"#),
        Err(ConsoleError::Rejected(m)) if m == "not yours"
    ));
}

#[wasm_bindgen_test]
fn status_errors() {
    assert_eq!(status_error(401, ""), ConsoleError::NotAuthenticated);
    assert_eq!(status_error(403, "forbidden"), ConsoleError::NotAuthenticated);

    let err = status_error(503, r#"{"error":"maintenance"}"#);
    assert_eq!(err, ConsoleError::Http { status: 503, message: "maintenance".to_string() });
    assert!(err.is_retryable());

    let err = status_error(404, "  ");
    assert_eq!(err, ConsoleError::Http { status: 404, message: "unknown error".to_string() });
    assert!(!err.is_retryable());
}

// ─── Clock Tests ─────────────────────────────────────────

#[wasm_bindgen_test]
async fn timer_clock_sleeps() {
    let clock = TimerClock::new();
    let before = clock.now_ms();
    assert!(before > 0);
    clock.sleep(5).await;
    assert!(clock.now_ms() >= before);
}
