use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, instrument};

/// The fixed key the access token is stored under.
pub const TOKEN_KEY: &str = "mapboxToken";

#[async_trait]
pub trait TokenStore: Debug + Send + Sync {
    async fn get(&self) -> Result<Option<String>, TokenStoreError>;

    async fn set(&self, token: &str) -> Result<(), TokenStoreError>;
}

/// Persists the token in a JSON object on disk, next to any other keys already in the file.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileTokenStore { path: path.into() }
    }

    async fn read_entries(&self) -> Result<BTreeMap<String, String>, TokenStoreError> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(TokenStoreError::io(e, &self.path)),
        }
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn get(&self) -> Result<Option<String>, TokenStoreError> {
        let mut entries = self.read_entries().await?;
        let token = entries.remove(TOKEN_KEY).filter(|token| !token.is_empty());
        debug!(found = token.is_some(), "🔑 Read stored token");
        Ok(token)
    }

    #[instrument(skip_all, fields(path = %self.path.display()))]
    async fn set(&self, token: &str) -> Result<(), TokenStoreError> {
        let mut entries = self.read_entries().await?;
        entries.insert(TOKEN_KEY.to_string(), token.to_string());

        let content = serde_json::to_string_pretty(&entries)?;
        fs::write(&self.path, content).await.map_err(|e| TokenStoreError::io(e, &self.path))?;
        debug!("🔑 Stored token");
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum TokenStoreError {
    #[error("unable to access token store '{}': {source}", path.display())]
    Io { source: io::Error, path: PathBuf },
    #[error("token store is corrupt: {0}")]
    Json(#[from] serde_json::Error),
}

impl TokenStoreError {
    fn io(source: io::Error, path: &Path) -> Self {
        TokenStoreError::Io {
            source,
            path: path.to_path_buf(),
        }
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: std::sync::Mutex<Option<String>>,
}

#[cfg(test)]
impl MemoryTokenStore {
    pub fn with_token(token: &str) -> Self {
        MemoryTokenStore {
            token: std::sync::Mutex::new(Some(token.to_string())),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self) -> Result<Option<String>, TokenStoreError> {
        Ok(self.token.lock().unwrap().clone())
    }

    async fn set(&self, token: &str) -> Result<(), TokenStoreError> {
        *self.token.lock().unwrap() = Some(token.to_string());
        Ok(())
    }
}
