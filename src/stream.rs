//! Following a log file as a stream of line batches.

use crate::error::{Error, Result};
use crate::options::TailOptions;
use crate::tail::RotatingTail;
use crate::watcher::{FileWatcher, is_event_relevant};
use futures::Stream;
use log::{debug, error};
use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Yields the lines of every pass over a followed log file.
///
/// A pass runs immediately, then whenever the file or its `.1` sibling
/// changes, and at least once per poll interval. Each pass that finds new
/// lines produces one `Vec<String>`; an error ends the stream after it is
/// yielded.
///
/// Delivery is at-most-once: a pass saves the cursor before its batch is
/// queued, so batches not yet taken from the stream when it is dropped are
/// lost to later runs.
pub struct TailStream {
    receiver: mpsc::UnboundedReceiver<Result<Vec<String>>>,
    shutdown_tx: broadcast::Sender<()>,
    _task_handle: JoinHandle<()>,
}

impl TailStream {
    pub async fn new<P: AsRef<Path>>(path: P, options: TailOptions) -> Result<Self> {
        let tail = options.build_tail(path.as_ref());
        let poll_interval = options.poll_interval;

        let mut watcher = FileWatcher::new(tail.path())?;
        watcher.start_watching()?;

        let (tx, rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let task_handle = tokio::spawn(async move {
            follow_task(tail, watcher, poll_interval, tx, shutdown_rx).await;
        });

        Ok(TailStream {
            receiver: rx,
            shutdown_tx,
            _task_handle: task_handle,
        })
    }

    #[cfg(test)]
    pub fn is_closed(&self) -> bool {
        self.receiver.is_closed()
    }
}

impl Drop for TailStream {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());
    }
}

async fn follow_task(
    tail: RotatingTail,
    mut watcher: FileWatcher,
    poll_interval: Duration,
    tx: mpsc::UnboundedSender<Result<Vec<String>>>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    if !run_pass(&tail, &tx).await {
        return;
    }

    let names = watcher.watched_names();
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,

            _ = ticker.tick() => {
                if !run_pass(&tail, &tx).await {
                    break;
                }
            }

            event = watcher.next_event() => {
                match event {
                    Some(Ok(event)) => {
                        if is_event_relevant(&event, &names) && !run_pass(&tail, &tx).await {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        error!("watcher failed for {}: {}", tail.path().display(), e);
                        let _ = tx.send(Err(Error::Watcher(e)));
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    debug!("stopped following {}", tail.path().display());
}

/// Runs one pass and forwards its outcome. Returns whether to keep going.
async fn run_pass(tail: &RotatingTail, tx: &mpsc::UnboundedSender<Result<Vec<String>>>) -> bool {
    match tail.collect_new_lines().await {
        Ok(lines) => {
            if !lines.is_empty() && tx.send(Ok(lines)).is_err() {
                return false;
            }
            true
        }
        // Between a rename and the new file being created.
        Err(Error::FileNotFound { path }) if Path::new(&path) == tail.path() => {
            debug!("{} does not exist yet, waiting", path);
            true
        }
        Err(e) => {
            error!("giving up on {}: {}", tail.path().display(), e);
            let _ = tx.send(Err(e));
            false
        }
    }
}

impl Stream for TailStream {
    type Item = Result<Vec<String>>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.receiver).poll_recv(cx)
    }
}
