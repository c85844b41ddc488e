use serde::{Deserialize, Serialize};

/// Deployment configuration for the console.
///
/// Tier-dependent limits live in [`crate::profile::DeviceProfile`], not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub api_base: String,
    /// Collection path for chat messages; a session id is appended for
    /// single-session reads and deletes
    pub messages_path: String,
    pub appointments_lookup_path: String,
    /// `localStorage` key holding the bearer token
    pub token_storage_key: String,
    /// Prefix for persisted view preferences
    pub preference_prefix: String,
    /// Pause before the verification reload that follows a delete.
    /// Zero for a strongly consistent store.
    pub reload_settle_ms: u64,
    /// Window after a confirmation dialog opens during which dismissals
    /// are ignored
    pub confirm_debounce_ms: u64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            messages_path: "/api/chat/messages".to_string(),
            appointments_lookup_path: "/api/appointments/by-sessions".to_string(),
            token_storage_key: "console:auth_token".to_string(),
            preference_prefix: "console:pref".to_string(),
            reload_settle_ms: 500,
            confirm_debounce_ms: 100,
        }
    }
}

impl ConsoleConfig {
    pub fn from_json(raw: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn messages_url(&self) -> String {
        format!("{}{}", self.api_base.trim_end_matches('/'), self.messages_path)
    }

    pub fn session_url(&self, session_id: &str) -> String {
        format!("{}/{}", self.messages_url(), urlencoding::encode(session_id))
    }

    pub fn appointments_lookup_url(&self) -> String {
        format!(
            "{}{}",
            self.api_base.trim_end_matches('/'),
            self.appointments_lookup_path
        )
    }
}
