//! Persisted read position and the stores that keep it between runs.

use crate::error::Result;
use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// File name of the default state file, placed in the system temp directory.
pub const DEFAULT_STATE_FILE: &str = ".log_tail-state.yml";

/// Where reading left off in the tracked log file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TailState {
    /// Byte offset into the live file. `None` until the first pass completes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<u64>,

    /// First line of the live file, terminator included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_line: Option<String>,
}

impl TailState {
    pub fn new(cursor: u64, first_line: impl Into<String>) -> Self {
        Self {
            cursor: Some(cursor),
            first_line: Some(first_line.into()),
        }
    }
}

/// Durable storage for a [`TailState`].
///
/// `recall` must return an empty state when nothing has been stored yet and
/// only fail on genuine I/O or decoding trouble.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Returns the last remembered state, or `TailState::default()`.
    async fn recall(&self) -> Result<TailState>;

    /// Overwrites the remembered state.
    async fn remember(&self, state: &TailState) -> Result<()>;
}

/// Keeps state as a YAML document on disk.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Default for FileStateStore {
    fn default() -> Self {
        Self::new(std::env::temp_dir().join(DEFAULT_STATE_FILE))
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn recall(&self) -> Result<TailState> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no state at {}, starting fresh", self.path.display());
                return Ok(TailState::default());
            }
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(TailState::default());
        }
        Ok(serde_yaml::from_str(&content)?)
    }

    async fn remember(&self, state: &TailState) -> Result<()> {
        let encoded = serde_yaml::to_string(state)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        // Replace by rename so a crash never leaves a half-written state file.
        let temp_path = self.temp_path();
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(encoded.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&temp_path, &self.path).await?;

        debug!("remembered {:?} at {}", state, self.path.display());
        Ok(())
    }
}

/// In-process store, useful when the caller persists state elsewhere.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    state: Mutex<TailState>,
}

impl MemoryStateStore {
    pub fn new(state: TailState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Copy of the currently held state.
    pub fn snapshot(&self) -> TailState {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn recall(&self) -> Result<TailState> {
        Ok(self.snapshot())
    }

    async fn remember(&self, state: &TailState) -> Result<()> {
        *self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = state.clone();
        Ok(())
    }
}

#[async_trait]
impl<S: StateStore + ?Sized> StateStore for std::sync::Arc<S> {
    async fn recall(&self) -> Result<TailState> {
        (**self).recall().await
    }

    async fn remember(&self, state: &TailState) -> Result<()> {
        (**self).remember(state).await
    }
}
