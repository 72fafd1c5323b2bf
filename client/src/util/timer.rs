//! Browser timer and wall clock for the session clock.
//!
//! DESIGN
//! ======
//! Renewal fires are spawned on the Leptos local executor and delayed with
//! `gloo-timers`. `setTimeout` clamps delays above `i32::MAX` milliseconds
//! (about 24.8 days) to zero, so long delays are slept in chunks.

#[cfg(test)]
#[path = "timer_test.rs"]
mod timer_test;

use std::time::Duration;

use futures::future::LocalBoxFuture;
use session::{TimeSource, TimerDriver};
use time::OffsetDateTime;

/// Longest single `setTimeout` delay.
#[cfg(any(test, feature = "csr"))]
pub(crate) const MAX_TIMEOUT: Duration = Duration::from_millis(i32::MAX as u64);

#[cfg(any(test, feature = "csr"))]
/// Split `delay` into `setTimeout`-safe sleeps. Zero yields one zero sleep.
pub(crate) fn timeout_chunks(delay: Duration) -> Vec<Duration> {
    let mut chunks = Vec::new();
    let mut remaining = delay;
    loop {
        let chunk = remaining.min(MAX_TIMEOUT);
        chunks.push(chunk);
        remaining -= chunk;
        if remaining.is_zero() {
            return chunks;
        }
    }
}

#[cfg(any(test, feature = "csr"))]
/// Convert `Date.now()` milliseconds to an [`OffsetDateTime`].
pub(crate) fn from_epoch_millis(millis: f64) -> OffsetDateTime {
    // Date.now() is integral milliseconds.
    #[allow(clippy::cast_possible_truncation)]
    let whole = millis as i64;
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(whole) * 1_000_000).unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

/// [`TimerDriver`] on the browser event loop.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserTimer;

impl TimerDriver for BrowserTimer {
    fn spawn_after(&self, delay: Duration, task: LocalBoxFuture<'static, ()>) {
        #[cfg(feature = "csr")]
        leptos::task::spawn_local(async move {
            for chunk in timeout_chunks(delay) {
                gloo_timers::future::sleep(chunk).await;
            }
            task.await;
        });
        #[cfg(not(feature = "csr"))]
        {
            log::debug!("timer: no browser event loop, dropping fire due in {}s", delay.as_secs());
            drop(task);
        }
    }
}

/// [`TimeSource`] reading `Date.now()`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserTime;

impl TimeSource for BrowserTime {
    fn now(&self) -> OffsetDateTime {
        #[cfg(feature = "csr")]
        {
            from_epoch_millis(js_sys::Date::now())
        }
        #[cfg(not(feature = "csr"))]
        {
            OffsetDateTime::now_utc()
        }
    }
}
