//! Settings for following a log file.

use crate::state::FileStateStore;
use crate::tail::{RotatingTail, RotationPolicy};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How often a followed file is re-read when no change notification arrives.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Options for [`crate::follow_log`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailOptions {
    /// State file location. `None` uses the default [`FileStateStore`].
    pub state_path: Option<PathBuf>,

    /// Upper bound between passes; filesystem events trigger passes sooner.
    pub poll_interval: Duration,

    /// What a pass does when `<path>.1` cannot be verified after a rotation.
    /// Defaults to [`RotationPolicy::Strict`].
    pub rotation_policy: RotationPolicy,
}

impl Default for TailOptions {
    fn default() -> Self {
        Self {
            state_path: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            rotation_policy: RotationPolicy::default(),
        }
    }
}

impl TailOptions {
    pub fn state_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.state_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn rotation_policy(mut self, policy: RotationPolicy) -> Self {
        self.rotation_policy = policy;
        self
    }

    pub(crate) fn build_tail(&self, path: &Path) -> RotatingTail {
        let store = match &self.state_path {
            Some(state_path) => FileStateStore::new(state_path),
            None => FileStateStore::default(),
        };
        RotatingTail::with_store(path, store).rotation_policy(self.rotation_policy)
    }
}
