//! Device tier detection from the browser window.

use console_types::profile::{DeviceProfile, DeviceTier};

/// Viewport width decides the tier. Without a window (workers, tests) the
/// tier falls back to the most conservative one.
pub fn detect_tier() -> DeviceTier {
    let width = web_sys::window()
        .and_then(|w| w.inner_width().ok())
        .and_then(|v| v.as_f64());

    match width {
        Some(w) if w.is_finite() && w >= 0.0 => {
            let tier = DeviceTier::from_viewport_width(w as u32);
            log::info!("Device tier: {} ({}px viewport)", tier.as_str(), w);
            tier
        }
        _ => {
            log::warn!("Viewport width unavailable, using {} tier", DeviceTier::Compact.as_str());
            DeviceTier::Compact
        }
    }
}

/// Tier from an explicit signal (e.g. a `?tier=` override) when given,
/// otherwise from the viewport.
pub fn detect_profile(signal: Option<&str>) -> DeviceProfile {
    match signal.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => DeviceProfile::resolve(s),
        None => DeviceProfile::for_tier(detect_tier()),
    }
}
