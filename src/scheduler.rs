//! Periodic drivers and the session that owns them.
//!
//! Every cadence gets its own task:
//! - snapshot: Wi-Fi scan, battery read, merge, journal append
//! - cellular: refresh the modem state
//! - bluetooth: restart discovery, which the radio ends on its own
//!
//! A fourth task drains push notifications into [`SensorState`]. Tasks only
//! share the state handle; a failing source degrades its own field and
//! never holds up another task.

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use futures::future::{self, BoxFuture, FutureExt};
use parking_lot::Mutex;
use tokio::{sync::mpsc, task::JoinHandle, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{
    cellular::{self, CellularInfo},
    config::Config,
    journal::{naming, Appended, Journal, JournalError, MediaJournal, StorageLayout},
    platform::{
        BatteryMonitor, BluetoothRadio, EventSink, Platform, PushSource, SourceEvent, Telephony,
        WifiScanner,
    },
    state::SensorState,
    status::StatusBoard,
    wifi::{self, WifiNetwork},
};

/// Work done on every tick of a periodic task.
trait Driver: Send + 'static {
    const NAME: &'static str;

    fn tick(&mut self) -> BoxFuture<'_, ()>;

    /// Runs once after the last tick.
    fn stop(&mut self) {}
}

fn spawn_driver<D: Driver>(
    mut driver: D,
    period: Duration,
    cancellation: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => driver.tick().await,
                _ = cancellation.cancelled() => break,
            }
        }
        driver.stop();
        tracing::debug!(driver = D::NAME, "Driver stopped");
    })
}

struct SnapshotDriver {
    state: SensorState,
    status: StatusBoard,
    journal: Arc<Mutex<Journal>>,
    wifi: Option<Box<dyn WifiScanner>>,
    battery: Option<Box<dyn BatteryMonitor>>,
}

fn scan_wifi(scanner: &mut dyn WifiScanner) -> Result<Vec<WifiNetwork>> {
    scanner.start_scan().context("Failed to start scan")?;
    let results = scanner.scan_results().context("Failed to read scan results")?;
    Ok(wifi::rank(results))
}

impl SnapshotDriver {
    fn poll_sources(&mut self) {
        if let Some(scanner) = self.wifi.as_deref_mut() {
            match scan_wifi(scanner) {
                Ok(networks) => self.state.set_wifi(networks),
                Err(e) => {
                    tracing::debug!(error = format!("{e:#}"), "Wi-Fi scan error");
                    self.status.warn("WiFi scan failed");
                }
            }
        }

        if let Some(battery) = self.battery.as_deref_mut() {
            match battery.capacity_percent() {
                Ok(percent) => self.state.set_battery(percent),
                Err(e) => self.status.warn(format!("Battery read failed: {e:#}")),
            }
        }
    }
}

async fn save_snapshot(state: &SensorState, status: &StatusBoard, journal: &Arc<Mutex<Journal>>) {
    let now = Utc::now();
    let snapshot = state.snapshot();
    let wifi_count = snapshot.wifi_networks.len();
    let bluetooth_count = snapshot.environmental.bluetooth_devices.len();
    let battery = snapshot.environmental.battery_percent.unwrap_or(0);

    let reading = snapshot.into_reading(now);
    let journal = Arc::clone(journal);
    // each append rewrites the whole file
    let saved = tokio::task::spawn_blocking(move || journal.lock().append(&reading, now)).await;

    match saved {
        Ok(Ok(_)) => status.info(format!(
            "Data saved: {wifi_count} WiFi, {bluetooth_count} BT, {battery}% battery"
        )),
        Ok(Err(e)) => status.warn(format!("Save failed: {e}")),
        Err(e) => status.warn(format!("Save failed: {e}")),
    }
}

impl Driver for SnapshotDriver {
    const NAME: &'static str = "snapshot";

    fn tick(&mut self) -> BoxFuture<'_, ()> {
        async move {
            self.poll_sources();
            save_snapshot(&self.state, &self.status, &self.journal).await;
        }
        .boxed()
    }
}

struct CellularDriver {
    state: SensorState,
    status: StatusBoard,
    telephony: Box<dyn Telephony>,
}

fn read_cellular(telephony: &dyn Telephony) -> Result<Option<CellularInfo>> {
    let operator = telephony.network_operator()?;
    let name = telephony.network_operator_name()?;
    let network_type = telephony.network_type()?;
    let cells = telephony.all_cell_info()?;
    Ok(cellular::resolve(
        &operator,
        name.as_deref(),
        network_type,
        &cells,
    ))
}

impl Driver for CellularDriver {
    const NAME: &'static str = "cellular";

    fn tick(&mut self) -> BoxFuture<'_, ()> {
        match read_cellular(&*self.telephony) {
            Ok(Some(info)) => self.state.set_cellular(info),
            // nothing visible: keep the last known cell
            Ok(None) => {}
            Err(e) => self.status.warn(format!("Cellular info failed: {e:#}")),
        }
        future::ready(()).boxed()
    }
}

struct BluetoothDriver {
    status: StatusBoard,
    radio: Box<dyn BluetoothRadio>,
}

fn restart_discovery(radio: &mut dyn BluetoothRadio) -> Result<()> {
    if radio.is_discovering() {
        radio.cancel_discovery()?;
    }
    radio.start_discovery()
}

impl Driver for BluetoothDriver {
    const NAME: &'static str = "bluetooth";

    fn tick(&mut self) -> BoxFuture<'_, ()> {
        if let Err(e) = restart_discovery(&mut *self.radio) {
            self.status.warn(format!("Bluetooth scan failed: {e:#}"));
        }
        future::ready(()).boxed()
    }

    fn stop(&mut self) {
        if self.radio.is_discovering() {
            if let Err(e) = self.radio.cancel_discovery() {
                tracing::warn!(error = format!("{e:#}"), "Failed to cancel Bluetooth discovery");
            }
        }
    }
}

fn spawn_event_pump(
    state: SensorState,
    mut rx: mpsc::UnboundedReceiver<SourceEvent>,
    cancellation: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                event = rx.recv() => match event {
                    Some(event) => state.apply(event),
                    None => break,
                },
                _ = cancellation.cancelled() => break,
            }
        }
        tracing::debug!("Event pump stopped");
    })
}

/// A running collection session.
///
/// Holds every source handle for the session's lifetime. [`Session::shutdown`]
/// stops all tasks and unregisters all push sources; dropping the session
/// without it still cancels the tasks and unregisters the sources.
pub struct Session {
    state: SensorState,
    status: StatusBoard,
    layout: StorageLayout,
    media: MediaJournal,
    cancellation: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
    push_sources: Vec<Box<dyn PushSource>>,
}

impl Session {
    /// Registers the push sources and spawns the drivers. Must be called
    /// from within a Tokio runtime.
    pub fn start(config: &Config, platform: Platform) -> Self {
        let state = SensorState::new();
        let status = StatusBoard::new();
        let cancellation = CancellationToken::new();
        status.info("Starting...");

        let fallback;
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                status.warn(format!("Invalid config, using default cadences: {e:#}"));
                fallback = Config {
                    storage_root: config.storage_root.clone(),
                    replay: config.replay.clone(),
                    ..Config::default()
                };
                &fallback
            }
        };

        let layout = StorageLayout::new(&config.storage_root);
        if let Err(e) = layout.create_all() {
            status.warn(format!(
                "Failed to create storage under {}: {e}",
                layout.root().display()
            ));
        }
        let date = naming::date_stamp(&Local::now());
        let journal = Journal::open(
            layout.clone(),
            date.clone(),
            Duration::from_millis(config.rotation_window_ms),
        );
        let media = MediaJournal::open(layout.clone(), date);

        let Platform {
            wifi,
            bluetooth,
            telephony,
            battery,
            mut push_sources,
        } = platform;

        let (sink, rx) = EventSink::channel();
        let mut tasks = vec![spawn_event_pump(
            state.clone(),
            rx,
            cancellation.clone(),
        )];

        for source in &mut push_sources {
            match source.register(sink.clone()) {
                Ok(()) => tracing::info!(source = source.name(), "Push source registered"),
                Err(e) => status.warn(format!("{} setup failed: {e:#}", source.name())),
            }
        }

        if wifi.is_none() {
            tracing::warn!("No Wi-Fi scanner, networks will not be recorded");
        }
        if battery.is_none() {
            tracing::warn!("No battery monitor, battery level will not be recorded");
        }
        tasks.push(spawn_driver(
            SnapshotDriver {
                state: state.clone(),
                status: status.clone(),
                journal: Arc::new(Mutex::new(journal)),
                wifi,
                battery,
            },
            config.snapshot_interval(),
            cancellation.clone(),
        ));

        match telephony {
            Some(telephony) => tasks.push(spawn_driver(
                CellularDriver {
                    state: state.clone(),
                    status: status.clone(),
                    telephony,
                },
                config.cellular_interval(),
                cancellation.clone(),
            )),
            None => tracing::warn!("No telephony service, cellular info will not be recorded"),
        }

        match bluetooth {
            Some(radio) => tasks.push(spawn_driver(
                BluetoothDriver {
                    status: status.clone(),
                    radio,
                },
                config.bluetooth_interval(),
                cancellation.clone(),
            )),
            None => tracing::warn!("No Bluetooth radio, devices will not be recorded"),
        }

        Self {
            state,
            status,
            layout,
            media,
            cancellation,
            tasks,
            push_sources,
        }
    }

    pub fn state(&self) -> &SensorState {
        &self.state
    }

    pub fn status(&self) -> &StatusBoard {
        &self.status
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// Journals the current snapshot for a photo saved under `file_name`.
    pub fn record_photo(&self, file_name: &str) -> Result<Appended, JournalError> {
        self.record_media(Some(file_name.to_owned()), None, "Photo")
    }

    /// Journals the current snapshot for an audio clip saved under `file_name`.
    pub fn record_audio(&self, file_name: &str) -> Result<Appended, JournalError> {
        self.record_media(None, Some(file_name.to_owned()), "Audio")
    }

    fn record_media(
        &self,
        photo: Option<String>,
        audio: Option<String>,
        kind: &str,
    ) -> Result<Appended, JournalError> {
        let metadata = self.state.snapshot().into_media(Utc::now(), photo, audio);
        match self.media.record(&metadata) {
            Ok(appended) => {
                self.status.info(format!("{kind} + metadata saved"));
                Ok(appended)
            }
            Err(e) => {
                self.status
                    .warn(format!("{kind} metadata save failed: {e}"));
                Err(e)
            }
        }
    }

    /// Stops every task, waits for them to finish and unregisters the
    /// push sources.
    pub async fn shutdown(mut self) {
        self.cancellation.cancel();
        let tasks = std::mem::take(&mut self.tasks);
        for result in futures::future::join_all(tasks).await {
            if let Err(e) = result {
                tracing::error!(error = %e, "Session task failed");
            }
        }
        self.release();
        tracing::info!("Session stopped");
    }

    fn release(&mut self) {
        self.cancellation.cancel();
        for mut source in self.push_sources.drain(..) {
            source.unregister();
            tracing::debug!(source = source.name(), "Push source unregistered");
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.release();
    }
}
