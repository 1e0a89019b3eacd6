use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::{fs, path::PathBuf};
use tracing::warn;

use super::{MarkerStore, MARKER_KEY};

/// Marker persisted as a small JSON key/value file, so it survives restarts.
///
/// Writes go to `<path>.tmp` first and are renamed into place.
pub struct FileMarkerStore {
    path: PathBuf,
}

impl FileMarkerStore {
    /// Point the store at `path`, creating its parent directory if needed.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating marker directory {}", parent.display()))?;
        }
        Ok(Self { path })
    }

    fn read_map(&self) -> Result<Map<String, Value>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", self.path.display()));
            }
        };
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) | Err(_) => {
                warn!(path = %self.path.display(), "marker file is not a JSON object; ignoring it");
                Ok(Map::new())
            }
        }
    }
}

impl MarkerStore for FileMarkerStore {
    fn load(&self) -> Result<Option<String>> {
        let map = self.read_map()?;
        Ok(map
            .get(MARKER_KEY)
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    fn save(&self, marker: &str) -> Result<()> {
        let mut map = self.read_map()?;
        map.insert(MARKER_KEY.to_string(), Value::String(marker.to_string()));

        let tmp = self.path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(&Value::Object(map))
            .context("serialising marker file")?;
        fs::write(&tmp, body).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path).with_context(|| {
            format!("renaming `{}` → `{}`", tmp.display(), self.path.display())
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_means_no_marker() {
        let tmp = tempdir().unwrap();
        let store = FileMarkerStore::new(tmp.path().join("state/marker.json")).unwrap();
        assert_eq!(store.load().unwrap(), None);
        assert!(tmp.path().join("state").is_dir());
    }

    #[test]
    fn marker_survives_reopen() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("marker.json");
        {
            let store = FileMarkerStore::new(&path).unwrap();
            store.save("2024-01-02").unwrap();
        }
        let reopened = FileMarkerStore::new(&path).unwrap();
        assert_eq!(reopened.load().unwrap().as_deref(), Some("2024-01-02"));
        assert!(!tmp.path().join("marker.json.tmp").exists());
    }

    #[test]
    fn save_keeps_unrelated_keys() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("marker.json");
        fs::write(&path, r#"{"theme":"dark"}"#).unwrap();

        let store = FileMarkerStore::new(&path).unwrap();
        store.save("2024-02-01").unwrap();

        let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["theme"], "dark");
        assert_eq!(raw[MARKER_KEY], "2024-02-01");
    }

    #[test]
    fn corrupt_file_is_treated_as_empty() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("marker.json");
        fs::write(&path, "not json").unwrap();

        let store = FileMarkerStore::new(&path).unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.save("2024-03-01").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("2024-03-01"));
    }
}
