use std::{
    fs, io,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};

pub const DATA_DIR: &str = "SSID_Data";
pub const PHOTO_DIR: &str = "SSID_Photos";
pub const AUDIO_DIR: &str = "SSID_Audio";

/// Directory layout under the storage root.
#[derive(Debug, Clone)]
pub struct StorageLayout {
    root: PathBuf,
}

impl StorageLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// JSON journals for readings and media metadata.
    pub fn data_dir(&self) -> PathBuf {
        self.root.join(DATA_DIR)
    }

    pub fn photo_dir(&self) -> PathBuf {
        self.root.join(PHOTO_DIR)
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.root.join(AUDIO_DIR)
    }

    pub fn create_all(&self) -> io::Result<()> {
        fs::create_dir_all(self.data_dir())?;
        fs::create_dir_all(self.photo_dir())?;
        fs::create_dir_all(self.audio_dir())
    }

    /// Where the capture pipeline should write a photo taken at `now`.
    pub fn photo_path(&self, now: DateTime<Utc>) -> PathBuf {
        self.photo_dir()
            .join(format!("photo_{}.jpg", now.timestamp_millis()))
    }

    /// Where the recorder should write an audio clip started at `now`.
    pub fn audio_path(&self, now: DateTime<Utc>) -> PathBuf {
        self.audio_dir()
            .join(format!("sound_{}.aac", now.timestamp_millis()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn paths() {
        let layout = StorageLayout::new("/survey");
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(layout.data_dir(), PathBuf::from("/survey/SSID_Data"));
        assert_eq!(
            layout.photo_path(now),
            PathBuf::from("/survey/SSID_Photos/photo_1700000000123.jpg")
        );
        assert_eq!(
            layout.audio_path(now),
            PathBuf::from("/survey/SSID_Audio/sound_1700000000123.aac")
        );
    }

    #[test]
    fn creates_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StorageLayout::new(dir.path().join("root"));
        layout.create_all().unwrap();
        assert!(layout.data_dir().is_dir());
        assert!(layout.photo_dir().is_dir());
        assert!(layout.audio_dir().is_dir());
    }
}
