use std::{fs, io, path::Path};

use chrono::{DateTime, TimeZone};

pub const EXTENSION: &str = "json";

/// `yyyyMMdd` stamp for the calendar date of `now`.
pub fn date_stamp<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%Y%m%d").to_string()
}

/// `<prefix>_<date>_<number>.json`
pub fn file_name(prefix: &str, date: &str, number: u32) -> String {
    format!("{prefix}_{date}_{number}.{EXTENSION}")
}

/// Sequence number of `name` if it belongs to `<prefix>_<date>_*.json`.
pub fn parse_number(name: &str, prefix: &str, date: &str) -> Option<u32> {
    let rest = name
        .strip_prefix(prefix)?
        .strip_prefix('_')?
        .strip_prefix(date)?
        .strip_prefix('_')?;
    let stem = rest.strip_suffix(EXTENSION)?.strip_suffix('.')?;
    stem.rsplit('_').next()?.parse().ok()
}

/// One past the highest number already on disk for this prefix and date,
/// or 1 if there is none. Unparseable suffixes are ignored.
pub fn next_file_number(dir: &Path, prefix: &str, date: &str) -> io::Result<u32> {
    let entries = match fs::read_dir(dir) {
        Ok(x) => x,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(1),
        Err(e) => return Err(e),
    };

    let mut max = 0;
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        if let Some(number) = name.to_str().and_then(|x| parse_number(x, prefix, date)) {
            max = max.max(number);
        }
    }
    max.checked_add(1).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::Other,
            format!("no file number left after {prefix}_{date}_{max}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn names() {
        assert_eq!(
            file_name("sensor_data", "20250101", 3),
            "sensor_data_20250101_3.json"
        );
        assert_eq!(
            parse_number("sensor_data_20250101_12.json", "sensor_data", "20250101"),
            Some(12)
        );
        assert_eq!(
            parse_number("sensor_data_20250102_1.json", "sensor_data", "20250101"),
            None
        );
        assert_eq!(
            parse_number("sensor_data_20250101_1.json.tmp", "sensor_data", "20250101"),
            None
        );
        assert_eq!(
            parse_number("sensor_data_20250101_x.json", "sensor_data", "20250101"),
            None
        );
        assert_eq!(parse_number("images_20250101_4.json", "sensor_data", "20250101"), None);
    }

    #[test]
    fn date_format() {
        let now = Utc.with_ymd_and_hms(2025, 1, 9, 23, 59, 59).unwrap();
        assert_eq!(date_stamp(&now), "20250109");
    }

    #[test]
    fn discovery_resumes_after_highest() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "sensor_data_20250101_1.json",
            "sensor_data_20250101_3.json",
            "sensor_data_20241231_9.json",
            "images_20250101_7.json",
            "sensor_data_20250101_5.json.tmp",
            "sensor_data_20250101_notes.json",
        ] {
            fs::write(dir.path().join(name), "{}").unwrap();
        }
        assert_eq!(
            next_file_number(dir.path(), "sensor_data", "20250101").unwrap(),
            4
        );
        assert_eq!(next_file_number(dir.path(), "images", "20250101").unwrap(), 8);
        assert_eq!(
            next_file_number(dir.path(), "sensor_data", "20250102").unwrap(),
            1
        );
    }

    #[test]
    fn exhausted_numbers_are_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("sensor_data_20250101_4294967295.json"), "{}").unwrap();

        let err = next_file_number(dir.path(), "sensor_data", "20250101").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Other);
        assert_eq!(
            next_file_number(dir.path(), "sensor_data", "20250102").unwrap(),
            1
        );
    }

    #[test]
    fn missing_directory_starts_at_one() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            next_file_number(&dir.path().join("absent"), "sensor_data", "20250101").unwrap(),
            1
        );
    }
}
