//! Durable, append-only session journal.
//!
//! Readings go into `SSID_Data/sensor_data_<yyyyMMdd>_<n>.json` as
//! `{ "readings": [...] }`. A file number is picked the first time the
//! journal writes and again whenever the rotation window has passed since
//! the last pick; in between every append lands in the same file. Picking
//! a number scans the directory so numbering resumes after a restart on
//! the same date.
//!
//! Photo and audio metadata go into a fresh
//! `images_<yyyyMMdd>_<n>.json` per capture as `{ "photos": [...] }`.
//!
//! Each append rewrites the whole file, so its cost grows with the file;
//! the rotation window keeps files small.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{MediaMetadata, SensorReading};

mod layout;
pub mod naming;
pub mod store;

pub use layout::StorageLayout;

pub const READINGS_PREFIX: &str = "sensor_data";
pub const READINGS_FIELD: &str = "readings";
pub const MEDIA_PREFIX: &str = "images";
pub const MEDIA_FIELD: &str = "photos";

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("failed to access {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    /// The file exists but is not JSON. It is left as is.
    #[error("{} is not valid JSON: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The file parses but has no array under the expected field.
    #[error("{} has no `{field}` array", .path.display())]
    MissingField { path: PathBuf, field: String },

    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result of a successful append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appended {
    pub path: PathBuf,
    pub number: u32,
    /// Entries in the file after the append
    pub entries: usize,
}

/// Tracks which file number is current and when it was picked.
#[derive(Debug, Clone, Copy)]
pub struct Rotation {
    window_ms: i64,
    selected: Option<(i64, u32)>,
}

impl Rotation {
    pub fn new(window: Duration) -> Self {
        Self {
            window_ms: i64::try_from(window.as_millis()).unwrap_or(i64::MAX),
            selected: None,
        }
    }

    /// The current file number, unless none was picked yet or the window
    /// has run out.
    pub fn current(&self, now_ms: i64) -> Option<u32> {
        let (selected_at, number) = self.selected?;
        if now_ms.saturating_sub(selected_at) > self.window_ms {
            None
        } else {
            Some(number)
        }
    }

    pub fn select(&mut self, now_ms: i64, number: u32) {
        self.selected = Some((now_ms, number));
    }
}

/// Rotating journal of [`SensorReading`]s. Only one writer may own it.
#[derive(Debug)]
pub struct Journal {
    layout: StorageLayout,
    date: String,
    rotation: Rotation,
}

impl Journal {
    /// `date` is the `yyyyMMdd` stamp used for every file this session.
    pub fn open(layout: StorageLayout, date: impl Into<String>, window: Duration) -> Self {
        Self {
            layout,
            date: date.into(),
            rotation: Rotation::new(window),
        }
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    pub fn append(
        &mut self,
        reading: &SensorReading,
        now: DateTime<Utc>,
    ) -> Result<Appended, JournalError> {
        let dir = self.layout.data_dir();
        fs::create_dir_all(&dir).map_err(|source| io_error(&dir, source))?;

        let now_ms = now.timestamp_millis();
        let number = match self.rotation.current(now_ms) {
            Some(x) => x,
            None => {
                let number = naming::next_file_number(&dir, READINGS_PREFIX, &self.date)
                    .map_err(|source| io_error(&dir, source))?;
                self.rotation.select(now_ms, number);
                tracing::info!(number, date = %self.date, "Starting new journal file");
                number
            }
        };

        let path = dir.join(naming::file_name(READINGS_PREFIX, &self.date, number));
        let entries = store::append(&path, READINGS_FIELD, reading)?;
        tracing::debug!(path = %path.display(), entries, "Reading appended");

        Ok(Appended {
            path,
            number,
            entries,
        })
    }
}

/// Writes one metadata file per captured photo or audio clip.
#[derive(Debug, Clone)]
pub struct MediaJournal {
    layout: StorageLayout,
    date: String,
}

impl MediaJournal {
    pub fn open(layout: StorageLayout, date: impl Into<String>) -> Self {
        Self {
            layout,
            date: date.into(),
        }
    }

    pub fn record(&self, metadata: &MediaMetadata) -> Result<Appended, JournalError> {
        let dir = self.layout.data_dir();
        fs::create_dir_all(&dir).map_err(|source| io_error(&dir, source))?;

        let number = naming::next_file_number(&dir, MEDIA_PREFIX, &self.date)
            .map_err(|source| io_error(&dir, source))?;
        let path = dir.join(naming::file_name(MEDIA_PREFIX, &self.date, number));
        let entries = store::append(&path, MEDIA_FIELD, metadata)?;

        Ok(Appended {
            path,
            number,
            entries,
        })
    }
}

fn io_error(path: &Path, source: io::Error) -> JournalError {
    JournalError::Io {
        path: path.to_owned(),
        source,
    }
}
