use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::TrackRef;

/// Whether a room is playing its current track.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Playing,
    Paused,
    /// Nothing is playing and the position is at the start.
    #[default]
    Stopped,
}

#[derive(Debug, Error, PartialEq)]
pub enum PlaybackError {
    #[error("No track is loaded")]
    NothingLoaded,
    #[error("Position {0} is not a valid offset in seconds")]
    InvalidPosition(f64),
    #[error("Volume {0} must be between 0 and 1")]
    InvalidVolume(f32),
}

/// The authoritative playback record of a room.
///
/// The position is stored as a checkpoint: the offset at the moment of the
/// last authoritative update. While playing, the current offset is the
/// checkpoint plus the time elapsed since it was taken.
#[derive(Debug, Clone)]
pub struct Playback {
    track: Option<TrackRef>,
    state: PlaybackState,
    position: f64,
    checkpoint_at: Instant,
    volume: f32,
}

/// A point-in-time copy of a [Playback], as sent to clients.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSnapshot {
    pub track: Option<TrackRef>,
    pub state: PlaybackState,
    /// The offset in seconds at the time the snapshot was taken
    pub position: f64,
    pub volume: f32,
}

impl Playback {
    pub fn new() -> Self {
        Self {
            track: None,
            state: PlaybackState::Stopped,
            position: 0.,
            checkpoint_at: Instant::now(),
            volume: 1.,
        }
    }

    pub fn track(&self) -> Option<&TrackRef> {
        self.track.as_ref()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Returns the offset in seconds at the given instant
    pub fn position_at(&self, now: Instant) -> f64 {
        match self.state {
            PlaybackState::Playing => {
                self.position + now.saturating_duration_since(self.checkpoint_at).as_secs_f64()
            }
            _ => self.position,
        }
    }

    pub fn snapshot_at(&self, now: Instant) -> PlaybackSnapshot {
        PlaybackSnapshot {
            track: self.track.clone(),
            state: self.state,
            position: self.position_at(now),
            volume: self.volume,
        }
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.snapshot_at(Instant::now())
    }

    /// Loads a track without starting it.
    pub fn load(&mut self, track: TrackRef) {
        self.track = Some(track);
        self.state = PlaybackState::Stopped;
        self.checkpoint(0.);
    }

    /// Starts or resumes playback.
    ///
    /// A different track than the current one is loaded first and starts at
    /// the given position, or at the beginning. Resuming the same track
    /// without a position continues where it was.
    pub fn play(
        &mut self,
        track: Option<TrackRef>,
        position: Option<f64>,
    ) -> Result<(), PlaybackError> {
        let position = position.map(validate_position).transpose()?;

        if let Some(track) = track {
            if self.track.as_ref() != Some(&track) {
                self.load(track);
            }
        }

        if self.track.is_none() {
            return Err(PlaybackError::NothingLoaded);
        }

        let position = position.unwrap_or_else(|| self.position_at(Instant::now()));

        self.state = PlaybackState::Playing;
        self.checkpoint(position);

        Ok(())
    }

    /// Pauses playback, at the given position or wherever it currently is.
    pub fn pause(&mut self, position: Option<f64>) -> Result<(), PlaybackError> {
        let position = position.map(validate_position).transpose()?;

        if self.track.is_none() {
            return Err(PlaybackError::NothingLoaded);
        }

        let position = position.unwrap_or_else(|| self.position_at(Instant::now()));

        self.state = PlaybackState::Paused;
        self.checkpoint(position);

        Ok(())
    }

    /// Stops playback and rewinds to the start. The track stays loaded.
    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
        self.checkpoint(0.);
    }

    /// Moves the play-head, keeping the current state.
    pub fn seek(&mut self, position: f64) -> Result<(), PlaybackError> {
        let position = validate_position(position)?;

        if self.track.is_none() {
            return Err(PlaybackError::NothingLoaded);
        }

        self.checkpoint(position);
        Ok(())
    }

    pub fn set_volume(&mut self, volume: f32) -> Result<(), PlaybackError> {
        if !volume.is_finite() || !(0.0..=1.0).contains(&volume) {
            return Err(PlaybackError::InvalidVolume(volume));
        }

        self.volume = volume;
        Ok(())
    }

    fn checkpoint(&mut self, position: f64) {
        self.position = position;
        self.checkpoint_at = Instant::now();
    }
}

impl Default for Playback {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_position(position: f64) -> Result<f64, PlaybackError> {
    if position.is_finite() && position >= 0. {
        Ok(position)
    } else {
        Err(PlaybackError::InvalidPosition(position))
    }
}
