use std::time::Duration;

use crate::{DriftCheck, ReconnectPolicy};

/// The configuration of room synchronization
#[derive(Debug, Clone)]
pub struct Config {
    /// How far a client's play-head may drift from the room before it resyncs
    pub drift_tolerance_in_seconds: f64,
    /// How often a playing client compares its play-head with the room
    pub sync_interval_in_seconds: f64,
    /// How long a host request waits for the host to answer
    pub host_request_timeout_in_seconds: f64,
    /// How long a room that nobody ever joined is kept around
    pub empty_room_ttl_in_seconds: f64,
    /// The room that always exists, if any
    pub default_room: Option<String>,
    /// How clients retry a dropped connection
    pub reconnect: ReconnectPolicy,
}

impl Config {
    /// The drift check clients should run against the room state
    pub fn drift_check(&self) -> DriftCheck {
        DriftCheck::new(self.drift_tolerance_in_seconds)
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs_f64(self.sync_interval_in_seconds)
    }

    pub fn host_request_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.host_request_timeout_in_seconds)
    }

    pub fn empty_room_ttl(&self) -> Duration {
        Duration::from_secs_f64(self.empty_room_ttl_in_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // Half a second is where listeners start to notice an echo
            drift_tolerance_in_seconds: 0.5,
            sync_interval_in_seconds: 5.0,
            host_request_timeout_in_seconds: 30.0,
            empty_room_ttl_in_seconds: 60.0 * 5.,
            default_room: Some("lobby".to_string()),
            reconnect: ReconnectPolicy::default(),
        }
    }
}
