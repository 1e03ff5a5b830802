//! Rotation-aware incremental reading of a log file.
//!
//! Each call to [`RotatingTail::process_new_lines`] recalls the saved
//! [`TailState`], works out whether the file was renamed to `<path>.1` since
//! the previous call, drains whatever was left unread in the rotated file and
//! then reads the live file from the saved cursor to its end.

use crate::error::{Error, HandlerError, Result};
use crate::reader::{CursorReader, LineReader, OnLine};
use crate::state::{FileStateStore, StateStore, TailState};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// Suffix logrotate gives the previous generation of a log file.
pub const ROTATED_SUFFIX: &str = ".1";

/// What to do when the file was rotated but `<path>.1` does not start with
/// the remembered first line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RotationPolicy {
    /// Fail with [`Error::RotationVerification`] and emit nothing.
    #[default]
    Strict,
    /// Skip the rotated file and start the live file from the beginning.
    /// Lines of the lost generation are dropped.
    SkipUnverified,
}

/// Reads the lines appended to a log file since the previous call.
pub struct RotatingTail<R: LineReader = CursorReader> {
    path: PathBuf,
    store: Box<dyn StateStore>,
    reader: R,
    policy: RotationPolicy,
}

impl RotatingTail<CursorReader> {
    /// Tails `path`, keeping state in the default [`FileStateStore`].
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self::with_store(path, FileStateStore::default())
    }

    /// Tails `path`, keeping state in `store`.
    pub fn with_store<P: AsRef<Path>, S: StateStore + 'static>(path: P, store: S) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            store: Box::new(store),
            reader: CursorReader,
            policy: RotationPolicy::default(),
        }
    }
}

impl<R: LineReader> RotatingTail<R> {
    /// Swaps the line reader, keeping path, store and policy.
    pub fn with_reader<R2: LineReader>(self, reader: R2) -> RotatingTail<R2> {
        RotatingTail {
            path: self.path,
            store: self.store,
            reader,
            policy: self.policy,
        }
    }

    pub fn rotation_policy(mut self, policy: RotationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `<path>.1`
    pub fn rotated_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(ROTATED_SUFFIX);
        PathBuf::from(name)
    }

    /// Passes every line added since the previous call to `on_line`, in file
    /// order and with terminators kept, then saves the new position.
    ///
    /// Returns the number of lines delivered. If `on_line` fails the error is
    /// returned as [`Error::Handler`] and the cursor is not advanced, so those
    /// lines are delivered again on the next call.
    pub async fn process_new_lines<F, E>(&self, mut on_line: F) -> Result<usize>
    where
        F: FnMut(String) -> std::result::Result<(), E> + Send,
        E: Into<HandlerError>,
    {
        let mut delivered = 0usize;
        let mut deliver = |line: String| -> Result<()> {
            on_line(line).map_err(|e| Error::Handler(e.into()))?;
            delivered += 1;
            Ok(())
        };

        let mut state = self.store.recall().await?;
        let first_line_now = self.reader.first_line(&self.path).await?;

        if let Some(cursor) = state.cursor {
            if was_rotated(&state, &first_line_now) {
                self.drain_rotated(&state, cursor, &mut deliver).await?;
                state.cursor = Some(0);
            }
        }

        // Saved before the live read so a failure there does not repeat the drain.
        if first_line_now != state.first_line {
            state.first_line = first_line_now;
            self.store.remember(&state).await?;
        }

        let start = state.cursor.unwrap_or(0);
        let end = self.reader.read_from(&self.path, start, &mut deliver).await?;
        state.cursor = Some(end);
        self.store.remember(&state).await?;

        debug!(
            "processed {} new lines from {} (cursor {} -> {})",
            delivered,
            self.path.display(),
            start,
            end
        );
        Ok(delivered)
    }

    /// Collects the new lines instead of handing them to a callback.
    pub async fn collect_new_lines(&self) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        self.process_new_lines(|line| {
            lines.push(line);
            Ok::<(), HandlerError>(())
        })
        .await?;
        Ok(lines)
    }

    async fn drain_rotated(
        &self,
        state: &TailState,
        cursor: u64,
        on_line: &mut OnLine<'_>,
    ) -> Result<()> {
        let rotated = self.rotated_path();

        let rotated_first_line = match self.reader.first_line(&rotated).await {
            Ok(line) => line,
            Err(Error::FileNotFound { .. }) if self.policy == RotationPolicy::SkipUnverified => {
                None
            }
            Err(e) => return Err(e),
        };

        if rotated_first_line != state.first_line {
            match self.policy {
                RotationPolicy::Strict => {
                    return Err(Error::RotationVerification {
                        path: rotated.display().to_string(),
                    });
                }
                RotationPolicy::SkipUnverified => {
                    warn!(
                        "{} was rotated but {} is not the file last read, skipping it",
                        self.path.display(),
                        rotated.display()
                    );
                    return Ok(());
                }
            }
        }

        info!(
            "{} was rotated, draining {} from byte {}",
            self.path.display(),
            rotated.display(),
            cursor
        );
        self.reader.read_from(&rotated, cursor, on_line).await?;
        Ok(())
    }
}

/// A changed first line means rotation, but only once a baseline exists.
/// An unknown first line (the file was empty last time) is not a baseline.
fn was_rotated(state: &TailState, first_line_now: &Option<String>) -> bool {
    state.first_line.is_some() && *first_line_now != state.first_line
}
