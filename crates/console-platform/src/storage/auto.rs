//! Auto-detect the best available preference backend.
//!
//! Priority: localStorage → Memory (fallback)

use std::rc::Rc;

use console_core::ports::PreferencePort;

use super::{LocalStoragePreferences, MemoryPreferences};

/// Returns a trait object so callers are backend-agnostic. Never fails:
/// preferences are a convenience.
pub fn auto_detect_preferences() -> Rc<dyn PreferencePort> {
    match LocalStoragePreferences::open() {
        Ok(local) => {
            log::info!("Preference backend: localStorage");
            Rc::new(local)
        }
        Err(e) => {
            log::warn!("localStorage unavailable ({}), falling back to memory", e);
            Rc::new(MemoryPreferences::new())
        }
    }
}
