//! Field survey logger.
//!
//! Samples location, orientation, radios and ambient conditions on fixed
//! cadences and journals a merged snapshot to rotating JSON files.

pub mod bluetooth;
pub mod cellular;
pub mod config;
pub mod journal;
pub mod logging;
pub mod model;
pub mod orientation;
pub mod platform;
pub mod satellite;
pub mod scheduler;
pub mod sound;
pub mod state;
pub mod status;
pub mod wifi;
