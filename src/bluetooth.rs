use std::collections::BTreeMap;

use mac_address::MacAddress;
use serde::{Deserialize, Serialize};

pub const UNKNOWN_DEVICE_NAME: &str = "Unknown Device";
pub const UNKNOWN_DEVICE_CLASS: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum BondState {
    Paired,
    Pairing,
    Unpaired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BluetoothDeviceInfo {
    pub name: String,
    pub address: MacAddress,
    /// dBm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rssi: Option<i16>,
    pub device_class: String,
    pub bond_state: BondState,
}

/// A device as reported by one discovery notification.
#[derive(Debug, Clone)]
pub struct DiscoveredDevice {
    pub address: MacAddress,
    pub name: Option<String>,
    pub rssi: Option<i16>,
    pub device_class: Option<u32>,
    pub bond_state: BondState,
}

impl From<DiscoveredDevice> for BluetoothDeviceInfo {
    fn from(value: DiscoveredDevice) -> Self {
        Self {
            name: value
                .name
                .unwrap_or_else(|| UNKNOWN_DEVICE_NAME.to_owned()),
            address: value.address,
            // i16::MIN is the radio stack's "no reading" marker
            rssi: value.rssi.filter(|x| *x != i16::MIN),
            device_class: value
                .device_class
                .map(|x| x.to_string())
                .unwrap_or_else(|| UNKNOWN_DEVICE_CLASS.to_owned()),
            bond_state: value.bond_state,
        }
    }
}

/// Every device seen during the session, keyed by address.
///
/// A repeat sighting replaces the stored record. Entries are never removed.
#[derive(Debug, Default, Clone)]
pub struct DeviceRegistry {
    devices: BTreeMap<MacAddress, BluetoothDeviceInfo>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the sighting, returning true if the address was not known yet.
    pub fn observe(&mut self, device: DiscoveredDevice) -> bool {
        let info = BluetoothDeviceInfo::from(device);
        self.devices.insert(info.address, info).is_none()
    }

    pub fn get(&self, address: &MacAddress) -> Option<&BluetoothDeviceInfo> {
        self.devices.get(address)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Devices ordered by address.
    pub fn devices(&self) -> Vec<BluetoothDeviceInfo> {
        self.devices.values().cloned().collect()
    }
}
