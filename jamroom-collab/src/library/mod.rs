mod directory;

pub use directory::*;

use async_trait::async_trait;
use jamroom_core::TrackRef;
use std::path::Path;
use thiserror::Error;

/// The shared collection of tracks that rooms play from.
#[async_trait]
pub trait TrackStore
where
    Self: Send + Sync + 'static,
{
    /// Returns every playable track, sorted by file name.
    async fn list(&self) -> Result<Vec<TrackRef>, LibraryError>;

    /// Looks up a single track by its file name.
    async fn track(&self, filename: &str) -> Result<TrackRef, LibraryError>;

    /// Stores an uploaded file and returns the reference to it.
    ///
    /// The stored name may differ from the requested one if a file with that
    /// name already exists.
    async fn store(&self, filename: &str, data: &[u8]) -> Result<TrackRef, LibraryError>;

    /// The rules uploads are checked against
    fn policy(&self) -> &UploadPolicy;
}

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Track {0} does not exist")]
    NotFound(String),
    #[error("Files of type {0} are not allowed")]
    UnsupportedType(String),
    #[error("File is {size} bytes, the limit is {max} bytes")]
    TooLarge { size: u64, max: u64 },
    #[error("{0} is not a valid file name")]
    InvalidName(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Which files may enter the library.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    /// Lowercase extensions without the dot
    pub allowed_extensions: Vec<String>,
    pub max_size_in_bytes: u64,
}

impl UploadPolicy {
    pub const DEFAULT_EXTENSIONS: [&'static str; 8] =
        ["mp3", "wav", "ogg", "flac", "m4a", "aac", "opus", "webm"];
    pub const DEFAULT_MAX_SIZE_IN_BYTES: u64 = 50 * 1024 * 1024;

    pub fn with_max_size(max_size_in_bytes: u64) -> Self {
        Self {
            max_size_in_bytes,
            ..Default::default()
        }
    }

    /// Returns true if the file name has an allowed extension
    pub fn is_allowed(&self, filename: &str) -> bool {
        extension_of(filename).is_some_and(|e| self.allowed_extensions.contains(&e))
    }

    /// Checks an upload and returns the file name it should be stored as.
    pub fn check(&self, filename: &str, size: u64) -> Result<String, LibraryError> {
        let filename = sanitize_filename(filename)?;

        if !self.is_allowed(&filename) {
            let extension = extension_of(&filename).unwrap_or_else(|| "unknown".to_string());
            return Err(LibraryError::UnsupportedType(extension));
        }

        if size > self.max_size_in_bytes {
            return Err(LibraryError::TooLarge {
                size,
                max: self.max_size_in_bytes,
            });
        }

        Ok(filename)
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            allowed_extensions: Self::DEFAULT_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            max_size_in_bytes: Self::DEFAULT_MAX_SIZE_IN_BYTES,
        }
    }
}

fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
}

/// Strips any directory part a browser may send and rejects names that
/// could escape the library directory.
pub fn sanitize_filename(filename: &str) -> Result<String, LibraryError> {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    let is_valid = !base.is_empty()
        && !base.starts_with('.')
        && base.len() <= 255
        && !base.chars().any(|c| c.is_control());

    if is_valid {
        Ok(base.to_string())
    } else {
        Err(LibraryError::InvalidName(filename.to_string()))
    }
}
