use mac_address::MacAddress;
use serde::{Deserialize, Serialize};

/// Recorded in place of an empty SSID.
pub const HIDDEN_SSID: &str = "Hidden";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiNetwork {
    pub ssid: String,
    pub bssid: MacAddress,
    /// dBm
    pub rssi: i32,
    /// MHz
    pub frequency: u32,
    pub channel: u32,
    pub capabilities: String,
}

/// Raw access point as returned by the platform scan.
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub ssid: String,
    pub bssid: MacAddress,
    pub level: i32,
    pub frequency: u32,
    pub capabilities: Option<String>,
}

pub fn channel_from_frequency(frequency: u32) -> u32 {
    match frequency {
        2412..=2484 => (frequency - 2412) / 5 + 1,
        5170..=5825 => (frequency - 5000) / 5,
        _ => 0,
    }
}

impl From<ScanResult> for WifiNetwork {
    fn from(value: ScanResult) -> Self {
        let ssid = if value.ssid.is_empty() {
            HIDDEN_SSID.to_owned()
        } else {
            value.ssid
        };
        Self {
            ssid,
            bssid: value.bssid,
            rssi: value.level,
            frequency: value.frequency,
            channel: channel_from_frequency(value.frequency),
            capabilities: value.capabilities.unwrap_or_default(),
        }
    }
}

/// Maps a scan into records, strongest first.
pub fn rank(results: Vec<ScanResult>) -> Vec<WifiNetwork> {
    let mut networks: Vec<WifiNetwork> = results.into_iter().map(WifiNetwork::from).collect();
    // stable, so equal levels keep scan order
    networks.sort_by(|a, b| b.rssi.cmp(&a.rssi));
    networks
}
