//! Bearer token kept in `localStorage` by the surrounding admin site.

use console_core::ports::AuthPort;
use console_types::{ConsoleError, Result};

pub struct LocalStorageAuth {
    key: String,
}

impl LocalStorageAuth {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store_token(&self, token: &str) -> Result<()> {
        local_storage()?
            .set_item(&self.key, token)
            .map_err(|e| ConsoleError::Storage(format!("{:?}", e)))
    }

    pub fn clear_token(&self) -> Result<()> {
        local_storage()?
            .remove_item(&self.key)
            .map_err(|e| ConsoleError::Storage(format!("{:?}", e)))
    }
}

impl AuthPort for LocalStorageAuth {
    fn bearer_token(&self) -> Option<String> {
        let storage = match local_storage() {
            Ok(s) => s,
            Err(e) => {
                log::warn!("Cannot read credential: {}", e);
                return None;
            }
        };
        storage
            .get_item(&self.key)
            .ok()
            .flatten()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

pub(crate) fn local_storage() -> Result<web_sys::Storage> {
    let window =
        web_sys::window().ok_or_else(|| ConsoleError::Storage("No window object".to_string()))?;
    window
        .local_storage()
        .map_err(|e| ConsoleError::Storage(format!("{:?}", e)))?
        .ok_or_else(|| ConsoleError::Storage("localStorage not available".to_string()))
}
