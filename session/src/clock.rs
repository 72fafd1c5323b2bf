//! Single-timer renewal scheduler.
//!
//! DESIGN
//! ======
//! A [`SessionClock`] owns at most one pending fire. The fire future is
//! wrapped in [`Abortable`] and the clock keeps only the [`AbortHandle`], so
//! `disarm` cancels without needing access to the driver's task. Once a fire
//! starts running it releases its own slot: re-arming from inside the fire
//! (the renewal-success path) must not abort the task doing the re-arming.
//!
//! Timers themselves run on a [`TimerDriver`]: tokio in native builds,
//! `gloo-timers` in the browser, a manual driver in tests.

#[cfg(test)]
#[path = "clock_test.rs"]
mod clock_test;

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

use futures::future::{AbortHandle, Abortable, LocalBoxFuture};
use time::{Duration, OffsetDateTime};

/// Source of wall-clock time.
pub trait TimeSource {
    fn now(&self) -> OffsetDateTime;
}

/// [`TimeSource`] backed by the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Runs a future after a delay on the host's event loop.
pub trait TimerDriver {
    /// Sleep for `delay`, then drive `task` to completion.
    fn spawn_after(&self, delay: std::time::Duration, task: LocalBoxFuture<'static, ()>);
}

/// [`TimerDriver`] on the current tokio `LocalSet`.
///
/// Must be used from within a `LocalSet`, since session futures are `!Send`.
#[cfg(feature = "tokio")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

#[cfg(feature = "tokio")]
impl TimerDriver for TokioTimer {
    fn spawn_after(&self, delay: std::time::Duration, task: LocalBoxFuture<'static, ()>) {
        tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });
    }
}

/// Result of [`SessionClock::arm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmOutcome {
    /// A fire is pending after the given delay (zero means "immediately").
    Scheduled(std::time::Duration),
    /// The expiry has already passed; nothing was armed.
    Expired,
}

/// Compute when a renewal for `expires_at` should fire.
///
/// - More than `lead` remaining: fire `lead` before expiry.
/// - Some time remaining, but no more than `lead`: fire immediately.
/// - Nothing remaining: `None`.
#[must_use]
pub fn renewal_delay(expires_at: OffsetDateTime, now: OffsetDateTime, lead: Duration) -> Option<std::time::Duration> {
    let remaining = expires_at - now;
    if remaining <= Duration::ZERO {
        None
    } else if remaining > lead {
        Some((remaining - lead).unsigned_abs())
    } else {
        Some(std::time::Duration::ZERO)
    }
}

struct Pending {
    id: u64,
    handle: AbortHandle,
}

/// Arms and disarms the single renewal timer of one session.
pub struct SessionClock {
    driver: Rc<dyn TimerDriver>,
    time: Rc<dyn TimeSource>,
    lead: Duration,
    pending: Rc<RefCell<Option<Pending>>>,
    next_id: Cell<u64>,
}

impl SessionClock {
    #[must_use]
    pub fn new(driver: Rc<dyn TimerDriver>, time: Rc<dyn TimeSource>, lead: Duration) -> Self {
        Self { driver, time, lead, pending: Rc::new(RefCell::new(None)), next_id: Cell::new(0) }
    }

    /// Lead time applied before expiry.
    #[must_use]
    pub fn lead(&self) -> Duration {
        self.lead
    }

    /// Current wall-clock time as seen by this clock.
    #[must_use]
    pub fn now(&self) -> OffsetDateTime {
        self.time.now()
    }

    /// Schedule `on_fire` for `expires_at - lead`, replacing any pending fire.
    pub fn arm<F>(&self, expires_at: OffsetDateTime, on_fire: F) -> ArmOutcome
    where
        F: Future<Output = ()> + 'static,
    {
        self.disarm();
        let Some(delay) = renewal_delay(expires_at, self.time.now(), self.lead) else {
            return ArmOutcome::Expired;
        };

        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        let (handle, registration) = AbortHandle::new_pair();
        let slot = Rc::clone(&self.pending);
        let fire = Abortable::new(
            async move {
                release(&slot, id);
                on_fire.await;
            },
            registration,
        );
        *self.pending.borrow_mut() = Some(Pending { id, handle });
        self.driver.spawn_after(
            delay,
            Box::pin(async move {
                if fire.await.is_err() {
                    log::trace!("clock: fire {id} cancelled before it ran");
                }
            }),
        );
        ArmOutcome::Scheduled(delay)
    }

    /// Cancel any pending fire. No effect when nothing is armed.
    pub fn disarm(&self) {
        if let Some(pending) = self.pending.borrow_mut().take() {
            pending.handle.abort();
        }
    }

    /// Whether a fire is pending.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.pending.borrow().is_some()
    }
}

impl Drop for SessionClock {
    fn drop(&mut self) {
        self.disarm();
    }
}

fn release(slot: &RefCell<Option<Pending>>, id: u64) {
    let mut slot = slot.borrow_mut();
    if slot.as_ref().is_some_and(|p| p.id == id) {
        *slot = None;
    }
}
