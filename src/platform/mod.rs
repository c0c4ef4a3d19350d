//! Boundary to the sensor and radio drivers.
//!
//! Polled sources are traits called from their driver loop. Push sources
//! deliver [`SourceEvent`]s through an [`EventSink`] from the moment they
//! are registered until they are unregistered.

use anyhow::Result;
use tokio::sync::mpsc;

use crate::{
    bluetooth::DiscoveredDevice,
    cellular::CellRecord,
    model::LocationData,
    orientation::Vector3,
    satellite::SatelliteObservation,
    wifi::ScanResult,
};

pub mod replay;

/// Notification from a push-driven source.
#[derive(Debug, Clone)]
pub enum SourceEvent {
    Location(LocationData),
    SatelliteStatus(Vec<SatelliteObservation>),
    Accelerometer(Vector3),
    Magnetometer(Vector3),
    /// Ambient light, lux
    Light(f32),
    /// 16-bit PCM from the microphone
    AudioFrame(Vec<i16>),
    AudioUnavailable,
    BluetoothFound(DiscoveredDevice),
}

/// Sending half handed to push sources. Sends never block.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<SourceEvent>,
}

impl EventSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SourceEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Returns false once the session has stopped listening.
    pub fn send(&self, event: SourceEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

pub trait WifiScanner: Send {
    fn start_scan(&mut self) -> Result<()>;
    fn scan_results(&mut self) -> Result<Vec<ScanResult>>;
}

pub trait BluetoothRadio: Send {
    fn is_discovering(&self) -> bool;
    fn start_discovery(&mut self) -> Result<()>;
    fn cancel_discovery(&mut self) -> Result<()>;
}

pub trait Telephony: Send {
    /// MCC followed by MNC, e.g. `"310260"`
    fn network_operator(&self) -> Result<String>;
    fn network_operator_name(&self) -> Result<Option<String>>;
    fn network_type(&self) -> Result<i32>;
    fn all_cell_info(&self) -> Result<Vec<CellRecord>>;
}

pub trait BatteryMonitor: Send {
    fn capacity_percent(&mut self) -> Result<u8>;
}

pub trait PushSource: Send {
    fn name(&self) -> &str;
    fn register(&mut self, sink: EventSink) -> Result<()>;
    fn unregister(&mut self);
}

/// Handles to every source present on this device. A missing handle
/// leaves its fields absent for the whole session.
#[derive(Default)]
pub struct Platform {
    pub wifi: Option<Box<dyn WifiScanner>>,
    pub bluetooth: Option<Box<dyn BluetoothRadio>>,
    pub telephony: Option<Box<dyn Telephony>>,
    pub battery: Option<Box<dyn BatteryMonitor>>,
    pub push_sources: Vec<Box<dyn PushSource>>,
}
