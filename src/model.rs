//! Records written to the journal.
//!
//! Field names follow the on-disk JSON (camelCase). Optional values are
//! left out of the document entirely rather than written as defaults.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    bluetooth::BluetoothDeviceInfo, cellular::CellularInfo, satellite::SatelliteInfo,
    wifi::WifiNetwork,
};

/// Format of the `utcTime` field.
pub const UTC_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationData {
    pub latitude: f64,
    pub longitude: f64,
    /// Horizontal accuracy in meters
    pub accuracy: f32,
}

/// Device orientation in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientationData {
    pub azimuth: f32,
    pub pitch: f32,
    pub roll: f32,
}

/// Latest known value of every environmental source at one instant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentalData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ambient_lux: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_percent: Option<u8>,
    pub bluetooth_devices: Vec<BluetoothDeviceInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decibel_level: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cellular_info: Option<CellularInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub satellite_info: Option<SatelliteInfo>,
}

/// One journal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    /// Epoch milliseconds as a decimal string
    pub timestamp: String,
    pub utc_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<OrientationData>,
    pub environmental: EnvironmentalData,
    pub wifi_networks: Vec<WifiNetwork>,
}

/// Metadata captured alongside a photo or an audio clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_filename: Option<String>,
    pub timestamp: String,
    pub utc_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<OrientationData>,
    pub environmental: EnvironmentalData,
}

pub fn epoch_millis(now: DateTime<Utc>) -> String {
    now.timestamp_millis().to_string()
}

pub fn utc_time(now: DateTime<Utc>) -> String {
    now.format(UTC_TIME_FORMAT).to_string()
}
