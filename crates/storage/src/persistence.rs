//! Data persistence layer
//!
//! Stores a single serde value as a versioned JSON document with an md5
//! checksum. Writes go through a temp file and a rename so a crash never
//! leaves a half-written document behind.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

/// Persistence error types
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Corruption detected
    #[error("Corruption detected: {0}")]
    Corruption(String),

    /// Version mismatch
    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Expected version
        expected: u32,
        /// Found version
        found: u32,
    },
}

/// Result type for persistence operations
pub type Result<T> = std::result::Result<T, PersistenceError>;

/// On-disk envelope
#[derive(Debug, Serialize, Deserialize)]
struct VersionedState<T> {
    version: u32,
    checksum: String,
    data: T,
}

fn checksum_of<T: Serialize>(data: &T) -> Result<String> {
    let json = serde_json::to_string(data)?;
    Ok(format!("{:x}", md5::compute(json)))
}

impl<T: Serialize> VersionedState<T> {
    fn new(version: u32, data: T) -> Result<Self> {
        let checksum = checksum_of(&data)?;
        Ok(Self { version, checksum, data })
    }

    fn verify_checksum(&self) -> Result<()> {
        let computed = checksum_of(&self.data)?;
        if computed != self.checksum {
            return Err(PersistenceError::Corruption(format!(
                "Checksum mismatch: expected {}, got {}",
                self.checksum, computed
            )));
        }
        Ok(())
    }
}

/// Persistence configuration
#[derive(Debug, Clone)]
pub struct PersistenceConfig {
    /// Path to the persistence file
    pub path: PathBuf,
    /// Current schema version
    pub version: u32,
}

impl PersistenceConfig {
    /// Create a configuration for schema version 1
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), version: 1 }
    }
}

/// A value mirrored to a JSON file
///
/// The in-memory copy is authoritative; every mutation is written through.
pub struct PersistedState<T> {
    config: PersistenceConfig,
    state: RwLock<T>,
}

impl<T> PersistedState<T>
where
    T: Serialize + DeserializeOwned + Clone + Default,
{
    /// Open the file at `config.path`, starting from `T::default()` when it
    /// does not exist yet
    pub async fn open(config: PersistenceConfig) -> Result<Self> {
        let data = match load_from_disk(&config).await {
            Ok(data) => data,
            Err(PersistenceError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %config.path.display(), "no persisted state, using defaults");
                T::default()
            }
            Err(e) => return Err(e),
        };

        Ok(Self { config, state: RwLock::new(data) })
    }

    /// Like [`Self::open`], but a corrupt, unreadable or outdated document is
    /// discarded and the state starts from `T::default()`
    ///
    /// Other IO errors are still returned.
    pub async fn open_or_reset(config: PersistenceConfig) -> Result<Self> {
        match Self::open(config.clone()).await {
            Err(e @ (PersistenceError::Corruption(_)
            | PersistenceError::VersionMismatch { .. }
            | PersistenceError::Serialization(_))) => {
                tracing::warn!(path = %config.path.display(), error = %e, "discarding persisted state");
                let state = Self { config, state: RwLock::new(T::default()) };
                state.clear().await?;
                Ok(state)
            }
            other => other,
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Get a copy of the current state
    pub async fn get(&self) -> T {
        self.state.read().await.clone()
    }

    /// Replace the state and persist
    pub async fn set(&self, new_state: T) -> Result<()> {
        let mut state = self.state.write().await;
        *state = new_state;
        self.write_to_disk(&*state).await
    }

    /// Reset to the default and remove the file
    pub async fn clear(&self) -> Result<()> {
        let mut state = self.state.write().await;
        *state = T::default();

        match fs::remove_file(&self.config.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_to_disk(&self, data: &T) -> Result<()> {
        let versioned = VersionedState::new(self.config.version, data)?;
        let json = serde_json::to_string_pretty(&versioned)?;

        if let Some(parent) = self.config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let temp_path = self.config.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(json.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&temp_path, &self.config.path).await?;

        Ok(())
    }
}

async fn load_from_disk<T: DeserializeOwned + Serialize>(config: &PersistenceConfig) -> Result<T> {
    let contents = fs::read_to_string(&config.path).await?;
    let versioned: VersionedState<T> = serde_json::from_str(&contents)?;

    versioned.verify_checksum()?;

    if versioned.version != config.version {
        return Err(PersistenceError::VersionMismatch {
            expected: config.version,
            found: versioned.version,
        });
    }

    Ok(versioned.data)
}
