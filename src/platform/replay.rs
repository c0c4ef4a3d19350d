//! Replays a recorded GPS track as a location source.
//!
//! Used when the process runs without real radios: only location is
//! available, every other source stays absent.

use std::{path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::Deserialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{EventSink, Platform, PushSource, SourceEvent};
use crate::{config::ReplayConfig, model::LocationData};

pub fn platform(config: &ReplayConfig) -> Result<Platform> {
    let track = GpsTrack::from_csv(&config.gps_track)?;
    tracing::info!(
        fixes = track.fixes.len(),
        track = %config.gps_track.display(),
        "Replaying GPS track"
    );
    Ok(Platform {
        push_sources: vec![Box::new(track)],
        ..Default::default()
    })
}

/// One CSV row. Extra columns such as `speed` are ignored.
#[derive(Deserialize)]
struct TrackRow {
    timestamp_ms: u64,
    lat: f64,
    lon: f64,
    accuracy: f32,
}

/// Pushes each fix after the same delay that separated it from the
/// previous one in the recording.
pub struct GpsTrack {
    fixes: Vec<(u64, LocationData)>,
    cancellation: Option<CancellationToken>,
    task: Option<JoinHandle<()>>,
}

impl GpsTrack {
    /// Reads a track with `timestamp_ms,lat,lon,accuracy` columns.
    pub fn from_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open GPS track {}", path.display()))?;

        let mut fixes = Vec::new();
        for row in reader.deserialize::<TrackRow>() {
            let row = row.with_context(|| format!("Malformed GPS track {}", path.display()))?;
            let location = LocationData {
                latitude: row.lat,
                longitude: row.lon,
                accuracy: row.accuracy,
            };
            fixes.push((row.timestamp_ms, location));
        }

        Ok(Self {
            fixes,
            cancellation: None,
            task: None,
        })
    }
}

impl PushSource for GpsTrack {
    fn name(&self) -> &str {
        "gps-replay"
    }

    fn register(&mut self, sink: EventSink) -> Result<()> {
        self.unregister();

        let cancellation = CancellationToken::new();
        let token = cancellation.clone();
        let fixes = self.fixes.clone();

        self.task = Some(tokio::spawn(async move {
            let mut previous: Option<u64> = None;
            for (at_ms, location) in fixes {
                if let Some(previous) = previous {
                    let delay = Duration::from_millis(at_ms.saturating_sub(previous));
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = token.cancelled() => return,
                    }
                }
                previous = Some(at_ms);

                if !sink.send(SourceEvent::Location(location)) {
                    return;
                }
            }
            tracing::debug!("GPS track finished");
        }));
        self.cancellation = Some(cancellation);
        Ok(())
    }

    fn unregister(&mut self) {
        if let Some(cancellation) = self.cancellation.take() {
            cancellation.cancel();
        }
        self.task.take();
    }
}
