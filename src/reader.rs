//! Reading log files line by line from a byte offset.

use crate::error::{Error, Result};
use async_trait::async_trait;
use log::{debug, warn};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncSeekExt, BufReader};

/// Per-line callback used by readers. Lines keep their terminator.
pub type OnLine<'a> = dyn FnMut(String) -> Result<()> + Send + 'a;

/// Produces the lines of a file from a byte offset onwards.
#[async_trait]
pub trait LineReader: Send + Sync {
    /// Sends every line from `offset` to end-of-file through `on_line` and
    /// returns the offset reached.
    async fn read_from(&self, path: &Path, offset: u64, on_line: &mut OnLine<'_>) -> Result<u64>;

    /// The first line of the file, or `None` while there is no complete
    /// first line (empty file, or a first line not yet terminated).
    async fn first_line(&self, path: &Path) -> Result<Option<String>>;
}

/// Reads a file through a buffered tokio handle scoped to each call.
#[derive(Debug, Clone, Copy, Default)]
pub struct CursorReader;

#[async_trait]
impl LineReader for CursorReader {
    async fn read_from(&self, path: &Path, offset: u64, on_line: &mut OnLine<'_>) -> Result<u64> {
        let mut file = File::open(path)
            .await
            .map_err(|e| Error::from_open(e, path))?;
        let current_size = file.metadata().await?.len();

        if offset_beyond_end(current_size, offset) {
            warn!(
                "cursor {} is past the end of {} ({} bytes), nothing to read",
                offset,
                path.display(),
                current_size
            );
            return Ok(current_size);
        }

        file.seek(std::io::SeekFrom::Start(offset)).await?;
        let mut reader = BufReader::new(file);
        let mut position = offset;
        let mut count = 0usize;
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let read = reader.read_until(b'\n', &mut buf).await?;
            if read == 0 {
                break;
            }
            position += read as u64;
            count += 1;
            on_line(String::from_utf8(std::mem::take(&mut buf))?)?;
        }

        debug!(
            "read {} lines from {} ({}..{})",
            count,
            path.display(),
            offset,
            position
        );
        Ok(position)
    }

    async fn first_line(&self, path: &Path) -> Result<Option<String>> {
        let file = File::open(path)
            .await
            .map_err(|e| Error::from_open(e, path))?;
        let mut reader = BufReader::new(file).take(MAX_FIRST_LINE_LEN);
        let mut buf = Vec::new();
        reader.read_until(b'\n', &mut buf).await?;

        match settled_first_line(buf) {
            FirstLine::Terminated(bytes) => Ok(Some(String::from_utf8(bytes)?)),
            FirstLine::Capped(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            FirstLine::Unsettled => Ok(None),
        }
    }
}

/// Longest prefix of the first line used to recognise a file.
pub const MAX_FIRST_LINE_LEN: u64 = 64 * 1024;

#[derive(Debug, PartialEq, Eq)]
enum FirstLine {
    Terminated(Vec<u8>),
    Capped(Vec<u8>),
    Unsettled,
}

/// A first line identifies the file only once appends can no longer change
/// it: when it is terminated, or when it already fills the length cap. A
/// line still being written is unknown.
fn settled_first_line(buf: Vec<u8>) -> FirstLine {
    if buf.last() == Some(&b'\n') {
        FirstLine::Terminated(buf)
    } else if buf.len() as u64 >= MAX_FIRST_LINE_LEN {
        FirstLine::Capped(buf)
    } else {
        FirstLine::Unsettled
    }
}

/// A cursor past the end means the file shrank underneath us.
fn offset_beyond_end(current_size: u64, offset: u64) -> bool {
    current_size < offset
}
