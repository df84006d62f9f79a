//! Countdown timers driving the expiry display and resend cooldown.
//!
//! Both timers run as background tokio tasks and publish through watch
//! channels, so any number of renderers can observe them. Replacing or
//! dropping a timer aborts its task; a stale timer never outlives the
//! challenge it was started for.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::clock::Clock;
use super::traits::FlowNotifier;
use super::types::FlowNotice;

/// State of the expiry countdown published once per second.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiryTick {
    /// Whole seconds until the code expires, clamped to zero
    pub seconds_left: i64,
    /// The countdown rendered as `m:ss`
    pub display: String,
}

/// Render a second count as `m:ss` with zero-padded seconds.
pub fn format_remaining(seconds: i64) -> String {
    let clamped = seconds.max(0);
    format!("{}:{:02}", clamped / 60, clamped % 60)
}

fn seconds_until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (deadline - now).num_seconds().max(0)
}

/// Ticking countdown toward a code's expiry deadline.
///
/// Publishes an [`ExpiryTick`] every second and emits
/// [`FlowNotice::CodeExpired`] exactly once when the deadline passes,
/// then stops on its own. A deadline already in the past expires on the
/// first tick.
#[derive(Debug)]
pub struct ExpiryCountdown {
    handle: JoinHandle<()>,
    ticks: watch::Receiver<ExpiryTick>,
}

impl ExpiryCountdown {
    pub fn start<C, N>(deadline: DateTime<Utc>, clock: Arc<C>, notifier: Arc<N>) -> Self
    where
        C: Clock + 'static,
        N: FlowNotifier + 'static,
    {
        let initial_left = seconds_until(deadline, clock.now());
        let (tx, rx) = watch::channel(ExpiryTick {
            seconds_left: initial_left,
            display: format_remaining(initial_left),
        });

        let handle = tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(Duration::from_secs(1));
            loop {
                interval_timer.tick().await;
                let seconds_left = seconds_until(deadline, clock.now());
                let _ = tx.send(ExpiryTick {
                    seconds_left,
                    display: format_remaining(seconds_left),
                });
                if seconds_left == 0 {
                    notifier.notify(FlowNotice::CodeExpired);
                    break;
                }
            }
        });

        Self { handle, ticks: rx }
    }

    /// Latest published tick.
    pub fn snapshot(&self) -> ExpiryTick {
        self.ticks.borrow().clone()
    }

    /// Receiver for observing ticks as they are published.
    pub fn subscribe(&self) -> watch::Receiver<ExpiryTick> {
        self.ticks.clone()
    }

    /// Stop ticking without waiting for the deadline.
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for ExpiryCountdown {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Ticking cooldown gating how soon a code can be resent.
///
/// Starts at the configured second count and counts down to zero, where
/// it stays. Resend is allowed once [`ResendCooldown::seconds_left`]
/// reports zero.
#[derive(Debug)]
pub struct ResendCooldown {
    handle: JoinHandle<()>,
    seconds: watch::Receiver<u64>,
}

impl ResendCooldown {
    pub fn start(seconds: u64) -> Self {
        let (tx, rx) = watch::channel(seconds);

        let handle = tokio::spawn(async move {
            let mut remaining = seconds;
            let mut interval_timer = tokio::time::interval(Duration::from_secs(1));
            // The first tick completes immediately; consume it so the
            // initial value holds for a full second.
            interval_timer.tick().await;
            while remaining > 0 {
                interval_timer.tick().await;
                remaining -= 1;
                let _ = tx.send(remaining);
            }
        });

        Self { handle, seconds: rx }
    }

    /// Seconds until resend unlocks; zero once the cooldown elapsed.
    pub fn seconds_left(&self) -> u64 {
        *self.seconds.borrow()
    }

    /// Receiver for observing the countdown as it is published.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.seconds.clone()
    }

    /// Stop counting down.
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for ResendCooldown {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
