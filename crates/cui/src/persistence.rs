use sipdeck_core::{Storage, StorageError};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// One JSON file per key under a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                    ch
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(body) => Ok(Some(body)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value)?;
        fs::rename(&staging, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

pub fn default_data_dir() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("SIPDECK_DATA") {
        return Some(PathBuf::from(path));
    }
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".sipdeck"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sipdeck_core::{ManualClock, PreferenceStore, ROSTER_KEY};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    #[test]
    fn set_get_remove_roundtrip() {
        let dir = unique_temp_dir();
        let mut storage = FileStorage::new(&dir);
        assert_eq!(storage.get("players").expect("get"), None);
        storage.set("players", "[\"Ana\"]").expect("set");
        assert_eq!(
            storage.get("players").expect("get").as_deref(),
            Some("[\"Ana\"]")
        );
        storage.remove("players").expect("remove");
        storage.remove("players").expect("remove twice");
        assert_eq!(storage.get("players").expect("get"), None);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn keys_are_sanitized_into_file_names() {
        let storage = FileStorage::new("/tmp/sipdeck");
        assert_eq!(
            storage.path_for("../card filters"),
            PathBuf::from("/tmp/sipdeck/___card_filters.json")
        );
    }

    #[test]
    fn stale_roster_file_is_deleted() {
        let dir = unique_temp_dir();
        let clock = ManualClock::at(1_000);
        let mut store = PreferenceStore::with_clock(FileStorage::new(&dir), clock);
        store.save_roster(&["Ana".to_string(), "Ben".to_string()]);
        assert!(store.storage().path_for(ROSTER_KEY).exists());
        store.clock().advance(Duration::from_secs(25 * 60 * 60));
        assert_eq!(store.load_roster(), None);
        assert!(!store.storage().path_for(ROSTER_KEY).exists());
        let _ = fs::remove_dir_all(dir);
    }

    fn unique_temp_dir() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "sipdeck_cui_persistence_test_{}_{}",
            std::process::id(),
            nanos
        ))
    }
}
