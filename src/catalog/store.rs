use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context as _;
use async_trait::async_trait;
use tokio::fs;

use crate::formats::CatalogState;

/// Whole-catalog override that takes precedence over the JSON resources.
#[async_trait]
pub trait OverrideStore: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet.
    async fn load(&self) -> anyhow::Result<Option<CatalogState>>;
    async fn save(&self, state: &CatalogState) -> anyhow::Result<()>;
}

#[derive(Debug, Clone)]
pub struct JsonFileOverrideStore {
    path: PathBuf,
}

impl JsonFileOverrideStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl OverrideStore for JsonFileOverrideStore {
    async fn load(&self) -> anyhow::Result<Option<CatalogState>> {
        read_json(&self.path)
            .await
            .with_context(|| format!("read: {}", self.path.display()))
    }

    async fn save(&self, state: &CatalogState) -> anyhow::Result<()> {
        write_json_atomic(&self.path, state)
            .await
            .with_context(|| format!("write: {}", self.path.display()))
    }
}

/// Single keyed slot holding the serialized catalog, like browser local storage.
#[derive(Debug, Default)]
pub struct MemoryOverrideStore {
    slot: Mutex<Option<String>>,
}

impl MemoryOverrideStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(raw.into())),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }
}

#[async_trait]
impl OverrideStore for MemoryOverrideStore {
    async fn load(&self) -> anyhow::Result<Option<CatalogState>> {
        let Some(raw) = self.raw() else {
            return Ok(None);
        };
        let value: Option<CatalogState> =
            serde_json::from_str(&raw).context("parse stored catalog")?;
        Ok(value)
    }

    async fn save(&self, state: &CatalogState) -> anyhow::Result<()> {
        let raw = serde_json::to_string(state).context("serialize catalog")?;
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| anyhow::anyhow!("override slot lock poisoned"))?;
        *slot = Some(raw);
        Ok(())
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<Option<T>> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    // A stored literal `null` means no override.
    let value: Option<T> = serde_json::from_slice(&bytes).context("parse json")?;
    Ok(value)
}

async fn write_json_atomic<T: serde::Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("create parent dir: {}", parent.display()))?;
    }

    let tmp_path = path.with_extension(format!("tmp.{}", uuid::Uuid::new_v4().simple()));
    let data = serde_json::to_vec_pretty(value).context("serialize json")?;
    fs::write(&tmp_path, &data)
        .await
        .with_context(|| format!("write tmp: {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("rename tmp to final: {}", path.display()))?;
    Ok(())
}
