//! Port traits: the hexagonal architecture boundary.
//!
//! These traits are defined here in `console-core` (pure Rust).
//! Implementations live in `console-platform` (browser adapters).
//! The core never imports platform code; it only depends on these traits.

use async_trait::async_trait;
use console_types::{message::Message, session::LinkMap, Result};

// ─── Auth Port ───────────────────────────────────────────────

/// Source of the bearer credential. Expiry policy belongs to the
/// implementation; `None` means "do not even try".
pub trait AuthPort {
    fn bearer_token(&self) -> Option<String>;
}

// ─── Message Source Port ─────────────────────────────────────

/// Tier-derived bounds sent along with every message fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchParams {
    /// Restrict the fetch to one session
    pub session_id: Option<String>,
    pub limit: usize,
    pub days: u32,
}

#[async_trait(?Send)]
pub trait MessageSourcePort {
    async fn fetch(&self, token: &str, params: &FetchParams) -> Result<Vec<Message>>;

    /// Remove every message of a session. `Ok` only when the store
    /// confirmed the removal.
    async fn delete(&self, token: &str, session_id: &str) -> Result<()>;
}

// ─── Appointment Store Port ──────────────────────────────────

#[async_trait(?Send)]
pub trait AppointmentStorePort {
    /// One request for all ids. Sessions without an appointment are
    /// simply absent from the map.
    async fn batch_lookup(&self, token: &str, session_ids: &[String]) -> Result<LinkMap>;
}

// ─── Preference Port ─────────────────────────────────────────

/// Synchronous key-value persistence (localStorage shaped).
/// Callers go through [`crate::view_state::Preferences`], which swallows
/// every error.
pub trait PreferencePort {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;

    /// Name of this backend (for logging/debug)
    fn backend_name(&self) -> &str;
}

// ─── Clock Port ──────────────────────────────────────────────

#[async_trait(?Send)]
pub trait ClockPort {
    /// Milliseconds since the Unix epoch
    fn now_ms(&self) -> u64;

    async fn sleep(&self, ms: u64);
}
