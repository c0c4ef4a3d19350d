//! End-to-end: a replayed GPS track flows through a session into the journal.

use std::{fs, time::Duration};

use serde_json::Value;
use surveyor::{
    config::{Config, ReplayConfig},
    platform::replay,
    scheduler::Session,
};

const TRACK: &str = "timestamp_ms,lat,lon,accuracy,speed
1700000000000,46.2044,6.1432,6.0,0.0
1700000000010,46.2045,6.1433,5.5,0.8
";

#[tokio::test]
async fn replayed_track_is_journaled() {
    let dir = tempfile::tempdir().unwrap();
    let track = dir.path().join("track.csv");
    fs::write(&track, TRACK).unwrap();

    let config = Config {
        storage_root: dir.path().join("survey"),
        snapshot_interval_ms: 25,
        replay: Some(ReplayConfig { gps_track: track }),
        ..Default::default()
    };
    let platform = replay::platform(config.replay.as_ref().unwrap()).unwrap();

    let session = Session::start(&config, platform);
    tokio::time::sleep(Duration::from_millis(200)).await;
    let data_dir = session.layout().data_dir();
    session.shutdown().await;

    let journals: Vec<_> = fs::read_dir(&data_dir)
        .unwrap()
        .map(|x| x.unwrap().path())
        .filter(|x| {
            let name = x.file_name().unwrap().to_str().unwrap();
            name.starts_with("sensor_data_") && name.ends_with(".json")
        })
        .collect();
    assert_eq!(journals.len(), 1, "{journals:?}");
    let path = &journals[0];
    assert!(path.to_str().unwrap().ends_with("_1.json"));
    let value: Value = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
    let readings = value["readings"].as_array().unwrap();
    assert!(readings.len() >= 2);

    let last = readings.last().unwrap();
    assert_eq!(last["location"]["latitude"], 46.2045);
    assert!(last["timestamp"].as_str().unwrap().parse::<i64>().is_ok());
    assert_eq!(last["wifiNetworks"], Value::Array(Vec::new()));
    assert!(last["environmental"].get("cellularInfo").is_none());
    assert!(last["environmental"].get("batteryPercent").is_none());
}
