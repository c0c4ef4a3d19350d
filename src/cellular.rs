use serde::{Deserialize, Serialize};

pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellularInfo {
    pub cell_id: String,
    pub lac: String,
    pub mcc: String,
    pub mnc: String,
    /// dBm
    pub signal_strength: i32,
    pub network_type: String,
    pub carrier_name: String,
}

/// A visible cell as reported by the modem. Each radio generation names
/// its identity fields differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellRecord {
    Gsm { cid: i32, lac: i32, dbm: i32 },
    Cdma { base_station_id: i32, network_id: i32, dbm: i32 },
    Wcdma { cid: i32, lac: i32, dbm: i32 },
    Lte { ci: i32, tac: i32, dbm: i32 },
    Nr { nci: i64, tac: i32, dbm: i32 },
    Unrecognized,
}

impl CellRecord {
    /// `(cell id, location area code, signal strength)`
    pub fn identity(&self) -> (String, String, i32) {
        match *self {
            CellRecord::Gsm { cid, lac, dbm } => (cid.to_string(), lac.to_string(), dbm),
            CellRecord::Cdma {
                base_station_id,
                network_id,
                dbm,
            } => (base_station_id.to_string(), network_id.to_string(), dbm),
            CellRecord::Wcdma { cid, lac, dbm } => (cid.to_string(), lac.to_string(), dbm),
            CellRecord::Lte { ci, tac, dbm } => (ci.to_string(), tac.to_string(), dbm),
            CellRecord::Nr { nci, tac, dbm } => (nci.to_string(), tac.to_string(), dbm),
            CellRecord::Unrecognized => (UNKNOWN.to_owned(), UNKNOWN.to_owned(), 0),
        }
    }
}

/// Splits an operator code such as `"310260"` into `(mcc, mnc)`.
pub fn parse_operator(code: &str) -> (String, String) {
    let mcc = code.get(..3).map(str::to_owned);
    let mnc = if code.len() >= 5 {
        code.get(3..).map(str::to_owned)
    } else {
        None
    };
    (
        mcc.unwrap_or_else(|| UNKNOWN.to_owned()),
        mnc.unwrap_or_else(|| UNKNOWN.to_owned()),
    )
}

pub fn network_type_label(network_type: i32) -> &'static str {
    match network_type {
        1 => "2G GPRS",
        2 => "2G EDGE",
        3 => "3G UMTS",
        8 => "3G HSDPA",
        9 => "3G HSUPA",
        10 => "3G HSPA",
        15 => "3G HSPA+",
        13 => "4G LTE",
        20 => "5G NR",
        _ => UNKNOWN,
    }
}

/// Builds the cellular record from the current modem state.
///
/// Uses the first visible cell, which is not necessarily the strongest.
/// Returns `None` when no cell is visible.
pub fn resolve(
    operator_code: &str,
    operator_name: Option<&str>,
    network_type: i32,
    cells: &[CellRecord],
) -> Option<CellularInfo> {
    let cell = cells.first()?;
    let (cell_id, lac, signal_strength) = cell.identity();
    let (mcc, mnc) = parse_operator(operator_code);

    Some(CellularInfo {
        cell_id,
        lac,
        mcc,
        mnc,
        signal_strength,
        network_type: network_type_label(network_type).to_owned(),
        carrier_name: operator_name.unwrap_or(UNKNOWN).to_owned(),
    })
}
