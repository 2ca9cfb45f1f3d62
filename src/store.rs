use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::EngineResult;

pub const SHIPMENTS_KEY: &str = "shakti_shipments";
pub const DRIVERS_KEY: &str = "shakti_drivers";
pub const VEHICLES_KEY: &str = "shakti_vehicles";
pub const CLIENTS_KEY: &str = "shakti_clients";

/// Persistence port for the engine's collections. Each collection lives
/// under a fixed key as a JSON array. Any key-value or document store
/// satisfies this; the engine holds its invariants before `save` is
/// invoked and never retries on its own.
pub trait CollectionStore: Send + Sync + 'static {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn save(&self, key: &str, payload: &str) -> Result<()>;
}

pub fn load_collection<T: DeserializeOwned>(
    store: &dyn CollectionStore,
    key: &str,
) -> EngineResult<Vec<T>> {
    let raw = store.load(key)?;
    match raw {
        Some(payload) => {
            let items = serde_json::from_str(&payload)
                .with_context(|| format!("collection {key} holds malformed JSON"))?;
            Ok(items)
        }
        None => Ok(Vec::new()),
    }
}

pub fn save_collection<T: Serialize>(
    store: &dyn CollectionStore,
    key: &str,
    items: &[T],
) -> EngineResult<()> {
    let payload = serde_json::to_string(items)
        .with_context(|| format!("collection {key} failed to serialize"))?;
    store.save(key, &payload)?;
    Ok(())
}

/// In-memory store; the default for tests and single-process embedding.
#[derive(Default)]
pub struct MemoryStore {
    cells: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CollectionStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let cells = self.cells.lock().expect("memory store poisoned");
        Ok(cells.get(key).cloned())
    }

    fn save(&self, key: &str, payload: &str) -> Result<()> {
        let mut cells = self.cells.lock().expect("memory store poisoned");
        cells.insert(key.to_string(), payload.to_string());
        Ok(())
    }
}

/// File-backed store mirroring each collection to `<root>/<key>.json`.
/// Writes go through a temp file in the same directory and are persisted
/// atomically, so an interrupted save never truncates a collection.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("failed to create store directory {}", root.display()))?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl CollectionStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(payload) => Ok(Some(payload)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => {
                Err(err).with_context(|| format!("failed to read collection {}", path.display()))
            }
        }
    }

    fn save(&self, key: &str, payload: &str) -> Result<()> {
        let path = self.path_for(key);
        let mut tmp = tempfile::NamedTempFile::new_in(&self.root)
            .context("failed to create temp file for collection save")?;
        tmp.write_all(payload.as_bytes())
            .context("failed to write collection payload")?;
        tmp.persist(&path)
            .with_context(|| format!("failed to persist collection {}", path.display()))?;
        Ok(())
    }
}
