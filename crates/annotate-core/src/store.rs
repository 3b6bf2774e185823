// File: crates/annotate-core/src/store.rs
// Summary: Key-value persistence of drawings and indicator configs per ticker.
// Notes:
// - A payload that fails to parse is logged, removed and replaced by an empty
//   default so one bad write never wedges a chart.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{error, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::drawing::ChartDrawings;
use crate::error::StoreError;
use crate::indicator::IndicatorConfig;

/// String storage keyed by name.
pub trait KeyValueStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key under a directory.
#[derive(Clone, Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store under `<data dir>/constellation/annotations`, or `./annotations`
    /// when the platform has no data directory.
    pub fn default_location() -> Self {
        let root = dirs::data_local_dir()
            .map(|d| d.join("constellation").join("annotations"))
            .unwrap_or_else(|| PathBuf::from("annotations"));
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<escaped key>.json`. Bytes outside `[A-Za-z0-9_.-]` become `%XX`,
    /// so distinct keys never share a file.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let mut name = String::with_capacity(key.len());
        for b in key.bytes() {
            if b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.') {
                name.push(b as char);
            } else {
                name.push_str(&format!("%{b:02X}"));
            }
        }
        self.root.join(format!("{name}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { key: key.to_string(), source }),
        }
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let io = |source| StoreError::Io { key: key.to_string(), source };
        fs::create_dir_all(&self.root).map_err(io)?;
        fs::write(self.path_for(key), value).map_err(io)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(StoreError::Io { key: key.to_string(), source: e }),
            _ => Ok(()),
        }
    }
}

pub fn drawings_key(ticker: &str) -> String {
    format!("chartDrawings_{ticker}")
}

pub fn indicators_key(ticker: &str) -> String {
    format!("chartIndicators_{ticker}")
}

/// Typed access to a [`KeyValueStore`] for one kind of chart state.
pub struct ChartStorage<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> ChartStorage<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Drawings saved for `ticker`; empty when nothing or garbage is stored.
    pub fn load_drawings(&mut self, ticker: &str) -> Result<ChartDrawings, StoreError> {
        let mut drawings: ChartDrawings = self.load_or_default(&drawings_key(ticker))?;
        let dropped = drawings.dedup_ids();
        if dropped > 0 {
            warn!("{ticker}: dropped {dropped} drawing(s) with duplicate ids");
        }
        Ok(drawings)
    }

    pub fn save_drawings(&mut self, ticker: &str, drawings: &ChartDrawings) -> Result<(), StoreError> {
        self.save_json(&drawings_key(ticker), drawings)?;
        info!("{ticker}: saved {} drawing(s)", drawings.len());
        Ok(())
    }

    pub fn load_indicators(&mut self, ticker: &str) -> Result<Vec<IndicatorConfig>, StoreError> {
        self.load_or_default(&indicators_key(ticker))
    }

    pub fn save_indicators(&mut self, ticker: &str, configs: &[IndicatorConfig]) -> Result<(), StoreError> {
        self.save_json(&indicators_key(ticker), configs)?;
        info!("{ticker}: saved {} indicator(s)", configs.len());
        Ok(())
    }

    fn load_or_default<T: DeserializeOwned + Default>(&mut self, key: &str) -> Result<T, StoreError> {
        let raw = match self.store.load(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(T::default()),
            Err(StoreError::Io { source, .. }) if source.kind() == ErrorKind::InvalidData => {
                error!("discarding unreadable '{key}': {source}");
                self.store.remove(key)?;
                return Ok(T::default());
            }
            Err(e) => return Err(e),
        };
        match serde_json::from_str(&raw) {
            Ok(v) => Ok(v),
            Err(e) => {
                error!("discarding unreadable '{key}': {e}");
                self.store.remove(key)?;
                Ok(T::default())
            }
        }
    }

    fn save_json<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(value).map_err(|source| StoreError::Serialize { key: key.to_string(), source })?;
        self.store.save(key, &json)
    }
}
