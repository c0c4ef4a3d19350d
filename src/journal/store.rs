//! Whole-document read-modify-write of one journal file.

use std::{
    ffi::OsString,
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use serde::Serialize;
use serde_json::{Map, Value};

use super::JournalError;

/// Appends `record` to the array under `field` in the JSON document at
/// `path`, creating `{ "<field>": [] }` if the file does not exist.
///
/// The file is only replaced once the new document is fully written, and
/// a file that does not parse is never touched. Returns the number of
/// entries now in the file.
pub fn append<T: Serialize>(path: &Path, field: &str, record: &T) -> Result<usize, JournalError> {
    let mut document = match fs::read(path) {
        Ok(data) => serde_json::from_slice::<Value>(&data).map_err(|source| {
            JournalError::Corrupt {
                path: path.to_owned(),
                source,
            }
        })?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let mut map = Map::new();
            map.insert(field.to_owned(), Value::Array(Vec::new()));
            Value::Object(map)
        }
        Err(source) => {
            return Err(JournalError::Io {
                path: path.to_owned(),
                source,
            })
        }
    };

    let entries = document
        .as_object_mut()
        .and_then(|x| x.get_mut(field))
        .and_then(Value::as_array_mut)
        .ok_or_else(|| JournalError::MissingField {
            path: path.to_owned(),
            field: field.to_owned(),
        })?;
    entries.push(serde_json::to_value(record)?);
    let count = entries.len();

    let data = serde_json::to_vec(&document)?;
    replace(path, &data).map_err(|source| JournalError::Io {
        path: path.to_owned(),
        source,
    })?;
    Ok(count)
}

/// Path of the scratch file used while rewriting `path`.
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

// write-then-rename: readers see either the old or the new document
fn replace(path: &Path, data: &[u8]) -> io::Result<()> {
    let temp = temp_path(path);
    if let Err(e) = write_synced(&temp, data).and_then(|()| fs::rename(&temp, path)) {
        if let Err(cleanup) = fs::remove_file(&temp) {
            tracing::debug!(path = %temp.display(), error = %cleanup, "Scratch file not removed");
        }
        return Err(e);
    }
    sync_parent(path)
}

fn write_synced(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}

/// Makes the rename itself durable.
#[cfg(unix)]
fn sync_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => File::open(dir)?.sync_all(),
        _ => Ok(()),
    }
}

#[cfg(not(unix))]
fn sync_parent(_path: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn creates_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sensor_data_20250101_1.json");
        assert_eq!(append(&path, "readings", &json!({ "n": 1 })).unwrap(), 1);

        let value: Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(value, json!({ "readings": [{ "n": 1 }] }));
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn preserves_prior_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sensor_data_20250101_1.json");
        append(&path, "readings", &json!({ "n": 1 })).unwrap();
        assert_eq!(append(&path, "readings", &json!({ "n": 2 })).unwrap(), 2);

        let value: Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(value, json!({ "readings": [{ "n": 1 }, { "n": 2 }] }));
    }

    #[test]
    fn keeps_other_top_level_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.json");
        fs::write(&path, r#"{"device":"pixel","readings":[]}"#).unwrap();
        append(&path, "readings", &json!(1)).unwrap();

        let value: Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(value, json!({ "device": "pixel", "readings": [1] }));
    }

    #[test]
    fn corrupt_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.json");
        let garbage = br#"{"readings":[{"n":1},"#;
        fs::write(&path, garbage).unwrap();

        let err = append(&path, "readings", &json!({ "n": 2 })).unwrap_err();
        assert!(matches!(err, JournalError::Corrupt { .. }), "{err}");
        assert_eq!(fs::read(&path).unwrap(), garbage);
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn wrong_shape_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.json");
        for content in [r#"[1,2]"#, r#"{"photos":[]}"#, r#"{"readings":{}}"#] {
            fs::write(&path, content).unwrap();
            let err = append(&path, "readings", &json!(3)).unwrap_err();
            assert!(matches!(err, JournalError::MissingField { .. }), "{err}");
            assert_eq!(fs::read_to_string(&path).unwrap(), content);
        }
    }

    #[cfg(unix)]
    #[test]
    fn failed_replace_removes_scratch_file() {
        let dir = tempfile::tempdir().unwrap();
        // a non-empty directory cannot be renamed over
        let path = dir.path().join("blocked.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        assert!(replace(&path, b"{}").is_err());
        assert!(!temp_path(&path).exists());
        assert!(path.join("keep").exists());
    }

    #[test]
    fn scratch_name() {
        assert_eq!(
            temp_path(Path::new("/d/sensor_data_20250101_1.json")),
            PathBuf::from("/d/sensor_data_20250101_1.json.tmp")
        );
    }
}
