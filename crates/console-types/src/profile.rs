//! Device tiers and the limits each one runs under.
//!
//! A [`DeviceProfile`] is selected once per page view and passed to every
//! component that needs a limit. Nothing branches on the device elsewhere.

use serde::{Deserialize, Serialize};

use crate::view::ViewMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceTier {
    /// Phones
    Compact,
    /// Tablets
    Medium,
    /// Desktops
    Full,
}

impl DeviceTier {
    /// Classify a client signal such as `"mobile"` or `"desktop"`.
    /// Unknown signals land on the most conservative tier.
    pub fn classify(signal: &str) -> Self {
        match signal.trim().to_ascii_lowercase().as_str() {
            "full" | "desktop" | "laptop" | "wide" => DeviceTier::Full,
            "medium" | "tablet" | "ipad" => DeviceTier::Medium,
            _ => DeviceTier::Compact,
        }
    }

    /// Breakpoints: below 768px compact, below 1024px medium.
    pub fn from_viewport_width(width: u32) -> Self {
        match width {
            0..=767 => DeviceTier::Compact,
            768..=1023 => DeviceTier::Medium,
            _ => DeviceTier::Full,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceTier::Compact => "compact",
            DeviceTier::Medium => "medium",
            DeviceTier::Full => "full",
        }
    }

    pub fn all() -> &'static [DeviceTier] {
        &[DeviceTier::Compact, DeviceTier::Medium, DeviceTier::Full]
    }
}

/// Immutable per-tier operating limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceProfile {
    pub tier: DeviceTier,
    /// Extra attempts after the first one
    pub max_retries: u32,
    pub timeout_ms: u64,
    /// Upper bound on messages requested per load
    pub fetch_limit: usize,
    pub retry_delay_ms: u64,
    /// How many days back a load reaches
    pub day_limit: u32,
    /// Aggregates kept after a load, most recent first
    pub max_sessions: usize,
    pub max_bulk_ops: usize,
    pub max_export: usize,
    pub refresh_interval_ms: u64,
    /// Number of ranked terms the analysis returns
    pub top_terms: usize,
}

impl DeviceProfile {
    pub fn resolve(signal: &str) -> Self {
        Self::for_tier(DeviceTier::classify(signal))
    }

    pub fn for_tier(tier: DeviceTier) -> Self {
        match tier {
            DeviceTier::Compact => Self {
                tier,
                max_retries: 2,
                timeout_ms: 8_000,
                fetch_limit: 200,
                retry_delay_ms: 1_500,
                day_limit: 7,
                max_sessions: 50,
                max_bulk_ops: 10,
                max_export: 50,
                refresh_interval_ms: 60_000,
                top_terms: 5,
            },
            DeviceTier::Medium => Self {
                tier,
                max_retries: 3,
                timeout_ms: 12_000,
                fetch_limit: 500,
                retry_delay_ms: 1_000,
                day_limit: 30,
                max_sessions: 150,
                max_bulk_ops: 25,
                max_export: 200,
                refresh_interval_ms: 45_000,
                top_terms: 10,
            },
            DeviceTier::Full => Self {
                tier,
                max_retries: 3,
                timeout_ms: 15_000,
                fetch_limit: 1_000,
                retry_delay_ms: 750,
                day_limit: 90,
                max_sessions: 500,
                max_bulk_ops: 50,
                max_export: 1_000,
                refresh_interval_ms: 30_000,
                top_terms: 20,
            },
        }
    }

    /// Page sizes offered for a view mode; the first entry is the default.
    pub fn page_size_options(&self, mode: ViewMode) -> &'static [usize] {
        match (self.tier, mode) {
            (DeviceTier::Compact, ViewMode::Grid) => &[6, 12],
            (DeviceTier::Compact, _) => &[10, 20],
            (DeviceTier::Medium, ViewMode::Grid) => &[9, 18, 27],
            (DeviceTier::Medium, ViewMode::List) => &[15, 30, 50],
            (DeviceTier::Medium, ViewMode::Table) => &[20, 40, 60],
            (DeviceTier::Full, ViewMode::Grid) => &[12, 24, 48],
            (DeviceTier::Full, ViewMode::List) => &[20, 50, 100],
            (DeviceTier::Full, ViewMode::Table) => &[25, 50, 100],
        }
    }

    pub fn default_page_size(&self, mode: ViewMode) -> usize {
        self.page_size_options(mode)[0]
    }

    /// Compact screens start in the list view; wider ones in the grid.
    pub fn default_view_mode(&self) -> ViewMode {
        match self.tier {
            DeviceTier::Compact => ViewMode::List,
            _ => ViewMode::Grid,
        }
    }

    /// Snap an arbitrary size to the closest offered option.
    pub fn snap_page_size(&self, mode: ViewMode, requested: usize) -> usize {
        let options = self.page_size_options(mode);
        options
            .iter()
            .copied()
            .min_by_key(|opt| opt.abs_diff(requested))
            .unwrap_or(options[0])
    }
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self::for_tier(DeviceTier::Compact)
    }
}
