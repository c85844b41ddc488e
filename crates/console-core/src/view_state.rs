//! View state and the preferences that outlive a page view.
//!
//! Each view mode is its own pagination context: switching modes restores
//! that mode's remembered page size for the current tier and starts on page
//! one. Preference reads and writes never fail outward; anything missing or
//! unreadable falls back to the tier default.

use std::rc::Rc;

use console_types::{
    profile::{DeviceProfile, DeviceTier},
    view::{CategoryFilter, DateRange, SortKey, SortOrder, ViewMode, ViewState},
};

use crate::ports::PreferencePort;

/// Scoped, failure-proof wrapper over a [`PreferencePort`]
#[derive(Clone)]
pub struct Preferences {
    port: Rc<dyn PreferencePort>,
    prefix: String,
    tier: DeviceTier,
}

impl Preferences {
    pub fn new(port: Rc<dyn PreferencePort>, prefix: impl Into<String>, tier: DeviceTier) -> Self {
        Self {
            port,
            prefix: prefix.into(),
            tier,
        }
    }

    pub fn page_size_key(&self, mode: ViewMode) -> String {
        format!("{}:{}:{}:page_size", self.prefix, self.tier.as_str(), mode.as_str())
    }

    pub fn view_mode_key(&self) -> String {
        format!("{}:{}:view_mode", self.prefix, self.tier.as_str())
    }

    pub fn load_page_size(&self, mode: ViewMode) -> Option<usize> {
        let key = self.page_size_key(mode);
        match self.read(&key)?.trim().parse::<usize>() {
            Ok(size) if size > 0 => Some(size),
            _ => {
                log::debug!("Ignoring unreadable preference {}", key);
                None
            }
        }
    }

    pub fn save_page_size(&self, mode: ViewMode, size: usize) {
        self.write(&self.page_size_key(mode), &size.to_string());
    }

    pub fn load_view_mode(&self) -> Option<ViewMode> {
        let key = self.view_mode_key();
        let raw = self.read(&key)?;
        let mode = ViewMode::parse(&raw);
        if mode.is_none() {
            log::debug!("Ignoring unreadable preference {}", key);
        }
        mode
    }

    pub fn save_view_mode(&self, mode: ViewMode) {
        self.write(&self.view_mode_key(), mode.as_str());
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.port.get(key) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Preference read {} failed on {}: {}", key, self.port.backend_name(), e);
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.port.set(key, value) {
            log::warn!("Preference write {} failed on {}: {}", key, self.port.backend_name(), e);
        }
    }
}

/// Owns the operator's [`ViewState`]. Any change to what is shown resets
/// the page to 1.
pub struct ViewStateManager {
    profile: DeviceProfile,
    prefs: Preferences,
    state: ViewState,
}

impl ViewStateManager {
    pub fn new(profile: DeviceProfile, prefs: Preferences) -> Self {
        let mode = prefs
            .load_view_mode()
            .unwrap_or_else(|| profile.default_view_mode());
        let page_size = restore_page_size(&profile, &prefs, mode);
        Self {
            profile,
            prefs,
            state: ViewState::new(mode, page_size),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if mode == self.state.view_mode {
            return;
        }
        self.state.view_mode = mode;
        self.state.page_size = restore_page_size(&self.profile, &self.prefs, mode);
        self.state.page = 1;
        self.prefs.save_view_mode(mode);
    }

    /// Snaps to the tier's offered sizes and remembers the choice for the
    /// current view mode.
    pub fn change_page_size(&mut self, requested: usize) {
        let size = self.profile.snap_page_size(self.state.view_mode, requested);
        self.state.page_size = size;
        self.state.page = 1;
        self.prefs.save_page_size(self.state.view_mode, size);
    }

    pub fn set_search(&mut self, term: &str) {
        if self.state.search_term != term {
            self.state.search_term = term.to_string();
            self.state.page = 1;
        }
    }

    pub fn set_category(&mut self, category: CategoryFilter) {
        if self.state.category != category {
            self.state.category = category;
            self.state.page = 1;
        }
    }

    pub fn set_date_range(&mut self, range: Option<DateRange>) {
        if self.state.date_range != range {
            self.state.date_range = range;
            self.state.page = 1;
        }
    }

    pub fn set_sort(&mut self, key: SortKey, order: SortOrder) {
        if self.state.sort_key != key || self.state.sort_order != order {
            self.state.sort_key = key;
            self.state.sort_order = order;
            self.state.page = 1;
        }
    }

    /// Clamped against the real page count when the page is served.
    pub fn go_to_page(&mut self, page: usize) {
        self.state.page = page.max(1);
    }

    /// Keep the stored page in line with what was actually served.
    pub fn sync_page(&mut self, served: usize) {
        self.state.page = served;
    }

    /// Resets search, category, date range and sort. View mode and page
    /// size are preferences and stay.
    pub fn clear_filters(&mut self) {
        let fresh = ViewState::new(self.state.view_mode, self.state.page_size);
        self.state = fresh;
    }
}

fn restore_page_size(profile: &DeviceProfile, prefs: &Preferences, mode: ViewMode) -> usize {
    prefs
        .load_page_size(mode)
        .map(|size| profile.snap_page_size(mode, size))
        .unwrap_or_else(|| profile.default_page_size(mode))
}
