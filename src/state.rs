//! Latest known value of every source.
//!
//! Each field has exactly one writer: push events go through
//! [`SensorState::apply`] on the event pump, the polled sources are set
//! by their own driver. [`SensorState::snapshot`] copies every field
//! under one read lock, so a journal entry never mixes two instants.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::{
    bluetooth::{DeviceRegistry, DiscoveredDevice},
    cellular::CellularInfo,
    model::{
        epoch_millis, utc_time, EnvironmentalData, LocationData, MediaMetadata, OrientationData,
        SensorReading,
    },
    orientation::OrientationEstimator,
    platform::SourceEvent,
    satellite::{self, SatelliteInfo},
    sound,
    wifi::WifiNetwork,
};

#[derive(Debug, Default)]
struct Readings {
    location: Option<LocationData>,
    orientation: OrientationEstimator,
    ambient_lux: Option<f32>,
    decibel_level: Option<f32>,
    satellites: Option<SatelliteInfo>,
    bluetooth: DeviceRegistry,

    battery_percent: Option<u8>,
    cellular: Option<CellularInfo>,
    wifi: Vec<WifiNetwork>,
}

/// Consistent copy of all latest values.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub location: Option<LocationData>,
    pub orientation: Option<OrientationData>,
    pub environmental: EnvironmentalData,
    pub wifi_networks: Vec<WifiNetwork>,
}

impl Snapshot {
    pub fn into_reading(self, now: DateTime<Utc>) -> SensorReading {
        SensorReading {
            timestamp: epoch_millis(now),
            utc_time: utc_time(now),
            location: self.location,
            orientation: self.orientation,
            environmental: self.environmental,
            wifi_networks: self.wifi_networks,
        }
    }

    pub fn into_media(
        self,
        now: DateTime<Utc>,
        photo_filename: Option<String>,
        audio_filename: Option<String>,
    ) -> MediaMetadata {
        MediaMetadata {
            photo_filename,
            audio_filename,
            timestamp: epoch_millis(now),
            utc_time: utc_time(now),
            location: self.location,
            orientation: self.orientation,
            environmental: self.environmental,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SensorState {
    inner: Arc<RwLock<Readings>>,
}

impl SensorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds a push notification into the latest values.
    pub fn apply(&self, event: SourceEvent) {
        let mut readings = self.inner.write();
        match event {
            SourceEvent::Location(location) => readings.location = Some(location),
            SourceEvent::SatelliteStatus(observations) => {
                readings.satellites = Some(satellite::summarize(&observations));
            }
            SourceEvent::Accelerometer(sample) => {
                readings.orientation.update_accelerometer(sample);
            }
            SourceEvent::Magnetometer(sample) => {
                readings.orientation.update_magnetometer(sample);
            }
            SourceEvent::Light(lux) => readings.ambient_lux = Some(lux),
            SourceEvent::AudioFrame(samples) => {
                if let Some(level) = sound::decibels(&samples) {
                    readings.decibel_level = Some(level);
                }
            }
            SourceEvent::AudioUnavailable => readings.decibel_level = None,
            SourceEvent::BluetoothFound(device) => {
                if readings.bluetooth.observe(device) {
                    tracing::debug!(devices = readings.bluetooth.len(), "New Bluetooth device");
                }
            }
        }
    }

    pub fn set_wifi(&self, networks: Vec<WifiNetwork>) {
        self.inner.write().wifi = networks;
    }

    pub fn set_battery(&self, percent: u8) {
        self.inner.write().battery_percent = Some(percent);
    }

    pub fn set_cellular(&self, info: CellularInfo) {
        self.inner.write().cellular = Some(info);
    }

    pub fn snapshot(&self) -> Snapshot {
        let readings = self.inner.read();
        Snapshot {
            location: readings.location,
            orientation: readings.orientation.latest(),
            environmental: EnvironmentalData {
                ambient_lux: readings.ambient_lux,
                battery_percent: readings.battery_percent,
                bluetooth_devices: readings.bluetooth.devices(),
                decibel_level: readings.decibel_level,
                cellular_info: readings.cellular.clone(),
                satellite_info: readings.satellites.clone(),
            },
            wifi_networks: readings.wifi.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use mac_address::MacAddress;

    use super::*;
    use crate::{
        bluetooth::BondState,
        cellular::{self, CellRecord},
        satellite::SatelliteObservation,
    };

    fn device(last: u8, rssi: i16) -> DiscoveredDevice {
        DiscoveredDevice {
            address: MacAddress::new([0x10, 0x20, 0x30, 0x40, 0x50, last]),
            name: None,
            rssi: Some(rssi),
            device_class: None,
            bond_state: BondState::Unpaired,
        }
    }

    #[test]
    fn never_populated_is_absent() {
        let snapshot = SensorState::new().snapshot();
        assert_eq!(snapshot.location, None);
        assert_eq!(snapshot.orientation, None);
        assert_eq!(snapshot.environmental, EnvironmentalData::default());
        assert!(snapshot.wifi_networks.is_empty());
    }

    #[test]
    fn merge_is_idempotent() {
        let state = SensorState::new();
        state.apply(SourceEvent::Location(LocationData {
            latitude: 51.5,
            longitude: -0.12,
            accuracy: 8.0,
        }));
        state.apply(SourceEvent::Light(320.0));
        state.apply(SourceEvent::AudioFrame(vec![100, 2_000, -50]));
        state.apply(SourceEvent::Accelerometer([0.0, 0.0, 9.81]));
        state.apply(SourceEvent::Magnetometer([0.0, 30.0, -40.0]));
        state.apply(SourceEvent::BluetoothFound(device(1, -60)));
        state.apply(SourceEvent::SatelliteStatus(vec![SatelliteObservation {
            constellation: 1,
            svid: 4,
            used_in_fix: true,
            cn0_dbhz: 33.0,
            elevation: 10.0,
            azimuth: 20.0,
        }]));
        state.set_battery(77);
        state.set_cellular(
            cellular::resolve(
                "26201",
                Some("Telekom"),
                13,
                &[CellRecord::Lte {
                    ci: 9,
                    tac: 1,
                    dbm: -90,
                }],
            )
            .unwrap(),
        );

        let first = state.snapshot();
        let second = state.snapshot();
        assert_eq!(first, second);
        assert_eq!(first.environmental.battery_percent, Some(77));
        assert!(first.orientation.is_some());
        assert_eq!(first.environmental.satellite_info.unwrap().satellites_used, 1);
    }

    #[test]
    fn bluetooth_sightings_merge_by_address() {
        let state = SensorState::new();
        state.apply(SourceEvent::BluetoothFound(device(1, -80)));
        state.apply(SourceEvent::BluetoothFound(device(1, -40)));
        assert_eq!(state.snapshot().environmental.bluetooth_devices.len(), 1);
        let devices = state.snapshot().environmental.bluetooth_devices;
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].rssi, Some(-40));
    }

    #[test]
    fn audio_unavailable_clears_level() {
        let state = SensorState::new();
        state.apply(SourceEvent::AudioFrame(vec![i16::MAX]));
        assert_eq!(state.snapshot().environmental.decibel_level, Some(0.0));
        state.apply(SourceEvent::AudioFrame(Vec::new()));
        assert_eq!(state.snapshot().environmental.decibel_level, Some(0.0));
        state.apply(SourceEvent::AudioUnavailable);
        assert_eq!(state.snapshot().environmental.decibel_level, None);
    }

    #[test]
    fn reading_from_snapshot() {
        let now = Utc.with_ymd_and_hms(2025, 3, 9, 8, 0, 0).unwrap();
        let reading = SensorState::new().snapshot().into_reading(now);
        assert_eq!(reading.timestamp, now.timestamp_millis().to_string());
        assert_eq!(reading.utc_time, "2025-03-09 08:00:00");

        let media = SensorState::new()
            .snapshot()
            .into_media(now, Some("photo_1.jpg".into()), None);
        assert_eq!(media.photo_filename.as_deref(), Some("photo_1.jpg"));
        assert_eq!(media.audio_filename, None);
    }
}
