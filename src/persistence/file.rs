//! JSON save file with backup rotation
//!
//! Writes go to `<path>.tmp` first, the previous save moves to `<path>.bak`,
//! then the temp file is renamed into place. A corrupt save falls back to
//! the backup before falling back to defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use super::{Persistence, SaveData};

#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, ext: &str) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".");
        name.push(ext);
        PathBuf::from(name)
    }

    pub fn backup_path(&self) -> PathBuf {
        self.sibling("bak")
    }

    fn read(path: &Path) -> anyhow::Result<SaveData> {
        let json = fs::read_to_string(path).with_context(|| format!("failed reading {}", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("corrupt save {}", path.display()))
    }

    fn write(&self, data: &SaveData) -> anyhow::Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).with_context(|| format!("failed creating {}", dir.display()))?;
        }

        let json = serde_json::to_string_pretty(data).context("failed encoding save data")?;
        let tmp = self.sibling("tmp");
        fs::write(&tmp, json).with_context(|| format!("failed writing {}", tmp.display()))?;

        if self.path.exists() {
            let bak = self.backup_path();
            fs::rename(&self.path, &bak).with_context(|| format!("failed rotating {}", bak.display()))?;
        }
        fs::rename(&tmp, &self.path).with_context(|| format!("failed replacing {}", self.path.display()))?;
        Ok(())
    }
}

impl Persistence for JsonFilePersistence {
    fn load(&mut self) -> SaveData {
        if !self.path.exists() && !self.backup_path().exists() {
            log::info!("No save at {}, starting fresh", self.path.display());
            return SaveData::default();
        }

        match Self::read(&self.path) {
            Ok(data) => return data,
            Err(err) => log::warn!("{err:#}"),
        }
        match Self::read(&self.backup_path()) {
            Ok(data) => {
                log::warn!("Restored save from backup");
                data
            }
            Err(err) => {
                log::warn!("{err:#}; using defaults");
                SaveData::default()
            }
        }
    }

    fn save(&mut self, data: &SaveData) {
        match self.write(data) {
            Ok(()) => log::debug!("Saved to {}", self.path.display()),
            Err(err) => log::error!("Save failed: {err:#}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("swarmfall-save-{}-{name}", std::process::id()))
    }

    fn cleanup(store: &JsonFilePersistence) {
        let _ = fs::remove_file(store.path());
        let _ = fs::remove_file(store.backup_path());
    }

    #[test]
    fn test_missing_file_is_default() {
        let mut store = JsonFilePersistence::new(temp_path("missing.json"));
        assert_eq!(store.load(), SaveData::default());
    }

    #[test]
    fn test_save_then_load() {
        let mut store = JsonFilePersistence::new(temp_path("roundtrip.json"));
        let data = SaveData {
            currency: 123,
            ..Default::default()
        };
        store.save(&data);
        assert_eq!(store.load(), data);
        cleanup(&store);
    }

    #[test]
    fn test_second_save_rotates_backup() {
        let mut store = JsonFilePersistence::new(temp_path("rotate.json"));
        let first = SaveData {
            currency: 1,
            ..Default::default()
        };
        let second = SaveData {
            currency: 2,
            ..Default::default()
        };
        store.save(&first);
        store.save(&second);
        assert!(store.backup_path().exists());
        assert_eq!(JsonFilePersistence::read(&store.backup_path()).expect("backup").currency, 1);
        cleanup(&store);
    }

    #[test]
    fn test_corrupt_save_uses_backup() {
        let mut store = JsonFilePersistence::new(temp_path("corrupt.json"));
        let first = SaveData {
            currency: 9,
            ..Default::default()
        };
        store.save(&first);
        store.save(&first);
        fs::write(store.path(), "{ not json").expect("write");
        assert_eq!(store.load().currency, 9);
        cleanup(&store);
    }

    #[test]
    fn test_corrupt_without_backup_is_default() {
        let mut store = JsonFilePersistence::new(temp_path("garbage.json"));
        fs::write(store.path(), "garbage").expect("write");
        assert_eq!(store.load(), SaveData::default());
        cleanup(&store);
    }
}
