// src/db/storage.rs
use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// The durable key-value medium backing the stores. Each key maps to one
/// serialized blob; the stores never write partial values.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    async fn get(&self, key: &str) -> io::Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> io::Result<()>;
    async fn remove(&self, key: &str) -> io::Result<()>;
}

/// File-per-key storage under a data directory. This is the production
/// medium: writes go through a temp file and a rename so a crash mid-write
/// leaves the previous blob intact.
pub struct FileStorage {
    root: PathBuf,
}

impl std::fmt::Debug for FileStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStorage")
            .field("root", &self.root)
            .finish()
    }
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileStorage { root: root.into() }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    async fn ensure_root(&self) -> io::Result<()> {
        if !Path::new(&self.root).exists() {
            tokio::fs::create_dir_all(&self.root).await?;
            tracing::info!("created storage directory {}", self.root.display());
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    async fn get(&self, key: &str) -> io::Result<Option<String>> {
        match tokio::fs::read_to_string(self.entry_path(key)).await {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn set(&self, key: &str, value: &str) -> io::Result<()> {
        self.ensure_root().await?;
        let path = self.entry_path(key);
        let tmp = self.root.join(format!("{key}.json.tmp"));
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> io::Result<()> {
        match tokio::fs::remove_file(self.entry_path(key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }
}

/// In-memory storage for tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStorage for MemoryStorage {
    async fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> io::Result<()> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> io::Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}
