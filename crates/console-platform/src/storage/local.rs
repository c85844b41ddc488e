//! `localStorage` preference backend.
//! Persistent per origin; unavailable in some private-browsing modes.

use console_core::ports::PreferencePort;
use console_types::{ConsoleError, Result};

use crate::auth::local_storage;

const PROBE_KEY: &str = "console:probe";

pub struct LocalStoragePreferences {
    storage: web_sys::Storage,
}

impl LocalStoragePreferences {
    /// Opens `localStorage` and checks that it accepts writes.
    pub fn open() -> Result<Self> {
        let storage = local_storage()?;
        storage
            .set_item(PROBE_KEY, "1")
            .map_err(|e| ConsoleError::Storage(format!("{:?}", e)))?;
        let _ = storage.remove_item(PROBE_KEY);
        Ok(Self { storage })
    }
}

impl PreferencePort for LocalStoragePreferences {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| ConsoleError::Storage(format!("{:?}", e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.storage
            .set_item(key, value)
            .map_err(|e| ConsoleError::Storage(format!("{:?}", e)))
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.storage
            .remove_item(key)
            .map_err(|e| ConsoleError::Storage(format!("{:?}", e)))
    }

    fn backend_name(&self) -> &str {
        "localstorage"
    }
}
