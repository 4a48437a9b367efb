use std::{env, path::PathBuf};

use jamroom_collab::{is_valid_room_id, UploadPolicy};
use jamroom_core::Config;
use thiserror::Error;

/// The default port the server will listen on.
pub const DEFAULT_PORT: u16 = 9050;
pub const DEFAULT_MUSIC_DIR: &str = "./music";
pub const DEFAULT_MAX_UPLOAD_MB: u64 = 50;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Process settings, read from the environment at startup
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Where uploaded tracks are stored and served from
    pub music_dir: PathBuf,
    pub max_upload_bytes: u64,
    /// The room that always exists, `None` if disabled
    pub default_room: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JAMROOM_PORT must be a port number, got {0}")]
    InvalidPort(String),
    #[error("JAMROOM_MAX_UPLOAD_MB must be a positive number, got {0}")]
    InvalidUploadLimit(String),
    #[error("JAMROOM_DEFAULT_ROOM must only contain letters, digits, - and _, got {0}")]
    InvalidDefaultRoom(String),
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key-value source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("JAMROOM_PORT") {
            Some(port) => port
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(port))?,
            None => DEFAULT_PORT,
        };

        let music_dir = lookup("JAMROOM_MUSIC_DIR")
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MUSIC_DIR.to_string())
            .into();

        let max_upload_bytes = match lookup("JAMROOM_MAX_UPLOAD_MB") {
            Some(limit) => limit
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|l| *l > 0)
                .and_then(|l| l.checked_mul(BYTES_PER_MB))
                .ok_or(ConfigError::InvalidUploadLimit(limit))?,
            None => DEFAULT_MAX_UPLOAD_MB * BYTES_PER_MB,
        };

        // An empty value turns the default room off
        let default_room = match lookup("JAMROOM_DEFAULT_ROOM") {
            Some(room) if room.is_empty() => None,
            Some(room) if is_valid_room_id(&room) => Some(room),
            Some(room) => return Err(ConfigError::InvalidDefaultRoom(room)),
            None => Config::default().default_room,
        };

        Ok(Self {
            port,
            music_dir,
            max_upload_bytes,
            default_room,
        })
    }

    /// The room tuning this process runs with
    pub fn collab_config(&self) -> Config {
        Config {
            default_room: self.default_room.clone(),
            ..Default::default()
        }
    }

    pub fn upload_policy(&self) -> UploadPolicy {
        UploadPolicy::with_max_size(self.max_upload_bytes)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            music_dir: DEFAULT_MUSIC_DIR.into(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * BYTES_PER_MB,
            default_room: Config::default().default_room,
        }
    }
}
