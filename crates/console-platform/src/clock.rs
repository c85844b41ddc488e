//! Wall clock and timers from the browser event loop.

use async_trait::async_trait;
use gloo_timers::future::TimeoutFuture;

use console_core::ports::ClockPort;

#[derive(Debug, Clone, Copy, Default)]
pub struct TimerClock;

impl TimerClock {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait(?Send)]
impl ClockPort for TimerClock {
    fn now_ms(&self) -> u64 {
        js_sys::Date::now() as u64
    }

    async fn sleep(&self, ms: u64) {
        // setTimeout takes a 32-bit delay
        let ms = ms.min(u32::MAX as u64) as u32;
        TimeoutFuture::new(ms).await;
    }
}
