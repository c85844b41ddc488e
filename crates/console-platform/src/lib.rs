//! Browser adapters for the console-core ports.
//!
//! Everything here touches `window`, `fetch()` or timers; the core never
//! imports this crate.

pub mod http;
pub mod auth;
pub mod storage;
pub mod clock;
pub mod device;

pub use auth::LocalStorageAuth;
pub use clock::TimerClock;
pub use device::{detect_profile, detect_tier};
pub use http::{HttpAppointmentStore, HttpMessageSource};
