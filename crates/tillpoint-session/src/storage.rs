//! Durable client-side key/value storage the session record persists through
//!
//! All reads and writes are synchronous and local. Storage failures are never
//! surfaced to callers, a record that cannot be read back is the same as no
//! record (see the parse handling in the store).

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use anyhow::Context as _;
use tillpoint_shared::log_err_as_warn;
use tracing::warn;

pub trait SessionStorage: Send + 'static {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// Storage that lives only as long as the process, shared between clones
///
/// Clones share the same underlying map so tests can keep a handle to inspect
/// what the store persisted.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage(Arc<Mutex<HashMap<String, String>>>);

impl SessionStorage for InMemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.0.lock().expect("mutex poisoned").get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.0
            .lock()
            .expect("mutex poisoned")
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.0.lock().expect("mutex poisoned").remove(key);
    }
}

/// Storage backed by a single json file, for native clients that need the
/// session to survive a restart
///
/// Writes go through on every mutation. Write failures are logged and
/// swallowed, the worst case is the user logs in again after a restart.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    cache: HashMap<String, String>,
}

impl FileStorage {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cache = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(map) => map,
                Err(err) => {
                    warn!(?err, ?path, "stored data failed to parse, starting empty");
                    HashMap::new()
                }
            },
            // Missing file is the normal first-run case
            Err(_) => HashMap::new(),
        };
        Self { path, cache }
    }

    fn write_through(&self) -> anyhow::Result<()> {
        let contents =
            serde_json::to_string(&self.cache).context("failed to serialize storage map")?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("failed to write storage file: {:?}", self.path))
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.cache.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.cache.insert(key.to_string(), value.to_string());
        log_err_as_warn!(self.write_through());
    }

    fn remove(&mut self, key: &str) {
        self.cache.remove(key);
        log_err_as_warn!(self.write_through());
    }
}
