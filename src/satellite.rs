//! GNSS status summaries.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Constellation {
    #[strum(serialize = "GPS")]
    Gps,
    #[strum(serialize = "SBAS")]
    Sbas,
    #[strum(serialize = "GLONASS")]
    Glonass,
    #[strum(serialize = "QZSS")]
    Qzss,
    #[strum(serialize = "BeiDou")]
    BeiDou,
    #[strum(serialize = "Galileo")]
    Galileo,
    #[strum(serialize = "IRNSS")]
    Irnss,
    Unknown,
}

impl Constellation {
    /// Maps the GNSS status constellation code.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Constellation::Gps,
            2 => Constellation::Sbas,
            3 => Constellation::Glonass,
            4 => Constellation::Qzss,
            5 => Constellation::BeiDou,
            6 => Constellation::Galileo,
            7 => Constellation::Irnss,
            _ => Constellation::Unknown,
        }
    }

    fn id_prefix(self) -> &'static str {
        match self {
            Constellation::Galileo => "E",
            Constellation::BeiDou => "C",
            _ => "",
        }
    }

    /// Nominal orbit altitude in km.
    pub fn altitude_km(self) -> u32 {
        match self {
            Constellation::Gps => 20_200,
            Constellation::Glonass => 19_100,
            Constellation::Galileo => 23_200,
            Constellation::BeiDou => 21_500,
            Constellation::Qzss => 32_600,
            Constellation::Sbas | Constellation::Irnss => 35_786,
            Constellation::Unknown => 20_000,
        }
    }

    /// Nominal orbital speed in km/s.
    pub fn speed_km_s(self) -> f32 {
        match self {
            Constellation::Gps => 3.87,
            Constellation::Glonass => 3.64,
            Constellation::Galileo => 3.60,
            Constellation::BeiDou => 3.07,
            Constellation::Qzss => 1.59,
            Constellation::Sbas | Constellation::Irnss => 3.07,
            Constellation::Unknown => 3.5,
        }
    }

    pub fn display_name(self, svid: i32) -> String {
        format!("{self}-{}{svid}", self.id_prefix())
    }
}

/// One satellite from a GNSS status event.
#[derive(Debug, Clone, Copy)]
pub struct SatelliteObservation {
    pub constellation: i32,
    pub svid: i32,
    pub used_in_fix: bool,
    /// Carrier-to-noise density, dB-Hz
    pub cn0_dbhz: f32,
    pub elevation: f32,
    pub azimuth: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SatelliteDetails {
    pub id: i32,
    pub name: String,
    pub signal_strength: f32,
    pub elevation: f32,
    pub azimuth: f32,
    pub constellation: String,
    pub altitude: u32,
    pub speed: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SatelliteInfo {
    pub satellite_count: usize,
    pub satellites_used: usize,
    pub used_satellites: Vec<SatelliteDetails>,
}

impl From<&SatelliteObservation> for SatelliteDetails {
    fn from(value: &SatelliteObservation) -> Self {
        let constellation = Constellation::from_code(value.constellation);
        Self {
            id: value.svid,
            name: constellation.display_name(value.svid),
            signal_strength: value.cn0_dbhz,
            elevation: value.elevation,
            azimuth: value.azimuth,
            constellation: constellation.to_string(),
            altitude: constellation.altitude_km(),
            speed: constellation.speed_km_s(),
        }
    }
}

/// Summarizes a status event: satellites used in the fix, strongest first.
pub fn summarize(observations: &[SatelliteObservation]) -> SatelliteInfo {
    let mut used: Vec<SatelliteDetails> = observations
        .iter()
        .filter(|x| x.used_in_fix)
        .map(SatelliteDetails::from)
        .collect();
    used.sort_by(|a, b| b.signal_strength.total_cmp(&a.signal_strength));

    SatelliteInfo {
        satellite_count: observations.len(),
        satellites_used: used.len(),
        used_satellites: used,
    }
}
