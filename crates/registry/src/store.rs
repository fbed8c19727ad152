use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};

use common::{Error, Result, Subscriber};

const SCHEMA_VERSION: u32 = 1;

/// On-disk envelope for the whole registry.
///
/// The map is insertion-ordered and keyed by chat id, so fan-out iteration
/// order is stable across save/load. The file is always rewritten in full;
/// there is no incremental persistence.
#[derive(Debug, Serialize, Deserialize)]
struct RegistryFile {
    version: u32,
    subscribers: IndexMap<String, Subscriber>,
}

impl Default for RegistryFile {
    fn default() -> Self {
        Self {
            version: SCHEMA_VERSION,
            subscribers: IndexMap::new(),
        }
    }
}

/// Durable subscriber registry.
///
/// A process-wide singleton. Every mutation runs under one mutex and
/// rewrites the whole file before returning, so the in-memory and durable
/// views never diverge across a restart and concurrent mutations for
/// different subscribers cannot clobber each other.
pub struct SubscriberStore {
    path: PathBuf,
    inner: Mutex<RegistryFile>,
}

impl SubscriberStore {
    /// Open the registry at `path`.
    ///
    /// A missing or unreadable or corrupt file is not fatal: the registry
    /// starts empty and the next mutation recreates the file.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file = read_registry(&path);
        info!(
            path = %path.display(),
            subscribers = file.subscribers.len(),
            "Subscriber registry loaded"
        );
        Self {
            path,
            inner: Mutex::new(file),
        }
    }

    pub async fn get(&self, id: &str) -> Option<Subscriber> {
        self.inner.lock().await.subscribers.get(id).cloned()
    }

    /// Atomic read-modify-write of one subscriber record.
    ///
    /// Creates a default record (`enabled = true`, joined today) when the
    /// id has never been seen, applies `mutate`, then rewrites the durable
    /// file. The mutation is lost — and surfaced as `Error::Registry` —
    /// if the write fails.
    pub async fn upsert<F>(&self, id: &str, mutate: F) -> Result<Subscriber>
    where
        F: FnOnce(&mut Subscriber),
    {
        let mut inner = self.inner.lock().await;
        let entry = inner
            .subscribers
            .entry(id.to_string())
            .or_insert_with(|| Subscriber::new(id));
        mutate(entry);
        let updated = entry.clone();
        persist(&self.path, &inner)?;
        Ok(updated)
    }

    pub async fn set_enabled(&self, id: &str, enabled: bool) -> Result<Subscriber> {
        self.upsert(id, |s| s.enabled = enabled).await
    }

    /// Snapshot of all enabled subscribers, in registry insertion order.
    pub async fn list_enabled(&self) -> Vec<Subscriber> {
        self.inner
            .lock()
            .await
            .subscribers
            .values()
            .filter(|s| s.enabled)
            .cloned()
            .collect()
    }

    /// Snapshot of every subscriber, for the admin endpoint.
    pub async fn list_all(&self) -> Vec<Subscriber> {
        self.inner.lock().await.subscribers.values().cloned().collect()
    }

    /// `(total, enabled)` counts for the health probe.
    pub async fn counts(&self) -> (usize, usize) {
        let inner = self.inner.lock().await;
        let enabled = inner.subscribers.values().filter(|s| s.enabled).count();
        (inner.subscribers.len(), enabled)
    }
}

fn read_registry(path: &Path) -> RegistryFile {
    if !path.exists() {
        return RegistryFile::default();
    }
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read registry file — starting empty");
            return RegistryFile::default();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(file) => file,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Corrupt registry file — starting empty");
            RegistryFile::default()
        }
    }
}

/// Rewrite the whole registry file. Temp file + rename, so a crash
/// mid-write never leaves a half-written record behind.
fn persist(path: &Path, file: &RegistryFile) -> Result<()> {
    let json = serde_json::to_string_pretty(file)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json.as_bytes())
        .map_err(|e| Error::Registry(format!("write {}: {e}", tmp.display())))?;
    std::fs::rename(&tmp, path)
        .map_err(|e| Error::Registry(format!("rename into {}: {e}", path.display())))?;
    Ok(())
}
