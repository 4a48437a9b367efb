use std::path::Path;

use url::Url;

/// The path under which stored tracks are served
pub const MUSIC_PATH: &str = "/music";

/// A pointer into the shared track collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRef {
    /// The stored file name, which is also the track identifier
    pub filename: String,
    /// The file name without its extension
    pub name: String,
    /// Size of the stored file in bytes
    pub size: u64,
    /// Where clients fetch the audio from
    pub url: String,
}

impl TrackRef {
    pub fn new(filename: impl Into<String>, size: u64) -> Self {
        let filename = filename.into();

        let name = Path::new(&filename)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| filename.clone());

        Self {
            url: url_for(&filename),
            name,
            filename,
            size,
        }
    }

    /// Returns the lowercased extension of the file, if any
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.filename)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
    }
}

fn url_for(filename: &str) -> String {
    let fallback = format!("{}/{}", MUSIC_PATH, filename);

    let Ok(mut url) = Url::parse("http://localhost").and_then(|u| u.join(MUSIC_PATH)) else {
        return fallback;
    };

    if let Ok(mut segments) = url.path_segments_mut() {
        segments.push(filename);
    } else {
        return fallback;
    }

    url.path().to_string()
}

#[cfg(test)]
mod test {
    use super::TrackRef;

    #[test]
    fn track_urls_are_escaped() {
        let track = TrackRef::new("Daft Punk - One More Time.mp3", 1024);

        assert_eq!(track.name, "Daft Punk - One More Time");
        assert_eq!(track.url, "/music/Daft%20Punk%20-%20One%20More%20Time.mp3");
        assert_eq!(track.extension().as_deref(), Some("mp3"));
    }

    #[test]
    fn tracks_without_extension_keep_their_name() {
        let track = TrackRef::new("README", 3);

        assert_eq!(track.name, "README");
        assert_eq!(track.extension(), None);
    }
}
