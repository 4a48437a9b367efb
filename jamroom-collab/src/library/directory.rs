use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use jamroom_core::TrackRef;
use log::{info, warn};
use tokio::{fs, io::AsyncWriteExt};

use super::{sanitize_filename, LibraryError, TrackStore, UploadPolicy};

/// A [TrackStore] backed by a flat directory on disk
pub struct DirectoryLibrary {
    root: PathBuf,
    policy: UploadPolicy,
}

impl DirectoryLibrary {
    /// How many alternative names are tried when a file name is taken
    const MAX_NAME_ATTEMPTS: usize = 100;

    pub fn new(root: impl Into<PathBuf>, policy: UploadPolicy) -> Self {
        Self {
            root: root.into(),
            policy,
        }
    }

    /// Creates the library directory if it does not exist yet
    pub async fn ensure_exists(&self) -> Result<(), LibraryError> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn write_new(&self, filename: &str, data: &[u8]) -> Result<bool, LibraryError> {
        let path = self.root.join(filename);

        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await;

        let mut file = match file {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        if let Err(e) = file.write_all(data).await {
            // Don't leave half-written tracks behind
            let _ = fs::remove_file(&path).await;
            return Err(e.into());
        }

        file.flush().await?;
        Ok(true)
    }
}

#[async_trait]
impl TrackStore for DirectoryLibrary {
    async fn list(&self) -> Result<Vec<TrackRef>, LibraryError> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Music directory {} does not exist", self.root.display());
                return Ok(vec![]);
            }
            Err(e) => return Err(e.into()),
        };

        let mut tracks = vec![];

        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            let filename = entry.file_name().to_string_lossy().into_owned();

            if metadata.is_file() && !filename.starts_with('.') && self.policy.is_allowed(&filename)
            {
                tracks.push(TrackRef::new(filename, metadata.len()));
            }
        }

        tracks.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(tracks)
    }

    async fn track(&self, filename: &str) -> Result<TrackRef, LibraryError> {
        let not_found = || LibraryError::NotFound(filename.to_string());

        let sanitized = sanitize_filename(filename).map_err(|_| not_found())?;
        if sanitized != filename || !self.policy.is_allowed(filename) {
            return Err(not_found());
        }

        let metadata = match fs::metadata(self.root.join(filename)).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(e.into()),
        };

        if !metadata.is_file() {
            return Err(not_found());
        }

        Ok(TrackRef::new(filename, metadata.len()))
    }

    async fn store(&self, filename: &str, data: &[u8]) -> Result<TrackRef, LibraryError> {
        let filename = self.policy.check(filename, data.len() as u64)?;
        self.ensure_exists().await?;

        for attempt in 0..Self::MAX_NAME_ATTEMPTS {
            let candidate = candidate_name(&filename, attempt);

            if self.write_new(&candidate, data).await? {
                info!("Stored {} ({} bytes)", candidate, data.len());
                return Ok(TrackRef::new(candidate, data.len() as u64));
            }
        }

        Err(LibraryError::InvalidName(filename))
    }

    fn policy(&self) -> &UploadPolicy {
        &self.policy
    }
}

/// Returns `name.ext`, then `name (1).ext`, `name (2).ext`, and so on
fn candidate_name(filename: &str, attempt: usize) -> String {
    if attempt == 0 {
        return filename.to_string();
    }

    let path = Path::new(filename);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    match path.extension() {
        Some(ext) => format!("{} ({}).{}", stem, attempt, ext.to_string_lossy()),
        None => format!("{} ({})", stem, attempt),
    }
}
