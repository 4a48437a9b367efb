//! Client-side reconciliation against the authoritative room state.
//!
//! The server never corrects clients directly. A playing client compares its
//! own play-head with the last authoritative position at a fixed interval and
//! asks for a fresh sync when the two are too far apart. There is no latency
//! compensation and no clock estimation.

use std::time::Duration;

/// What a client should do after comparing its play-head with the room.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reconcile {
    /// The local play-head is close enough.
    InSync,
    /// The local play-head should jump to `target`.
    Resync { target: f64 },
}

/// A fixed-threshold drift check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftCheck {
    tolerance: f64,
}

impl DriftCheck {
    pub fn new(tolerance_in_seconds: f64) -> Self {
        Self {
            tolerance: tolerance_in_seconds.abs(),
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Returns how far ahead (positive) or behind (negative) the local play-head is
    pub fn drift(local: f64, authoritative: f64) -> f64 {
        local - authoritative
    }

    pub fn evaluate(&self, local: f64, authoritative: f64) -> Reconcile {
        if Self::drift(local, authoritative).abs() > self.tolerance {
            Reconcile::Resync {
                target: authoritative,
            }
        } else {
            Reconcile::InSync
        }
    }
}

/// Exponential reconnect backoff with a capped number of attempts.
///
/// After the last attempt the client gives up and shows a permanent
/// failure notice.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    pub initial_delay_in_seconds: f64,
    pub multiplier: f64,
    pub max_delay_in_seconds: f64,
    pub max_attempts: u32,
}

impl ReconnectPolicy {
    /// Returns the delay before the given attempt (starting at 0),
    /// or `None` if the client should give up.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }

        let delay = self.initial_delay_in_seconds * self.multiplier.powi(attempt as i32);
        let capped = delay.min(self.max_delay_in_seconds).max(0.);

        Some(Duration::from_secs_f64(capped))
    }

    /// Returns every delay the client will wait through before giving up
    pub fn schedule(&self) -> Vec<Duration> {
        (0..self.max_attempts).filter_map(|a| self.delay_for(a)).collect()
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay_in_seconds: 1.,
            multiplier: 2.,
            max_delay_in_seconds: 30.,
            max_attempts: 8,
        }
    }
}
