//! Incremental reading of a growing log file that survives log rotation.
//!
//! Each pass reads only the lines appended since the previous pass, which
//! may have happened in another process: the read position and the file's
//! first line are kept in a [`StateStore`]. When the file has been renamed to
//! `<path>.1` and replaced (logrotate-style), the unread tail of the rotated
//! file is delivered before the new file is read.
//!
//! # Example
//!
//! ```rust,no_run
//! use log_tail::{FileStateStore, RotatingTail};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tail = RotatingTail::with_store(
//!         "/var/log/apache2/access.log",
//!         FileStateStore::new("/var/lib/my-app/access-tail.yml"),
//!     );
//!
//!     tail.process_new_lines(|line| {
//!         print!("{}", line);
//!         Ok::<(), std::io::Error>(())
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```

mod error;
mod options;
mod reader;
mod state;
mod stream;
mod tail;
mod watcher;

#[cfg(test)]
mod test_helpers;

pub use error::{Error, HandlerError, Result};
pub use options::{DEFAULT_POLL_INTERVAL, TailOptions};
pub use reader::{CursorReader, LineReader, MAX_FIRST_LINE_LEN, OnLine};
pub use state::{DEFAULT_STATE_FILE, FileStateStore, MemoryStateStore, StateStore, TailState};
pub use stream::TailStream;
pub use tail::{ROTATED_SUFFIX, RotatingTail, RotationPolicy};

use std::path::Path;
use tokio_stream::Stream;

/// Follows a log file, yielding the new lines of each pass as a batch.
///
/// Delivery is at-most-once. The cursor is saved before a batch is queued,
/// so batches still buffered when the stream is dropped are not read again
/// on the next run. Use [`RotatingTail::process_new_lines`] when every line
/// must be handled.
///
/// # Example
///
/// ```rust,no_run
/// use log_tail::{follow_log, TailOptions};
/// use tokio_stream::StreamExt;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let options = TailOptions::default().state_path("/tmp/app-tail.yml");
///     let mut stream = follow_log("app.log", options).await?;
///
///     while let Some(batch) = stream.next().await {
///         for line in batch? {
///             print!("{}", line);
///         }
///     }
///
///     Ok(())
/// }
/// ```
pub async fn follow_log<P: AsRef<Path>>(
    path: P,
    options: TailOptions,
) -> Result<impl Stream<Item = Result<Vec<String>>>> {
    TailStream::new(path, options).await
}
