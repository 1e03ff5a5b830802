//! Filesystem notifications for a log file and its rotated sibling.

use crate::error::Result;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

/// Watches the directory holding a log file.
///
/// The directory is watched rather than the file so the watch survives the
/// file being renamed away and recreated.
pub(crate) struct FileWatcher {
    watcher: RecommendedWatcher,
    receiver: mpsc::UnboundedReceiver<notify::Result<Event>>,
    file_path: PathBuf,
}

impl FileWatcher {
    pub(crate) fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file_path = path.as_ref().to_path_buf();
        let (tx, rx) = mpsc::unbounded_channel();

        let watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default(),
        )?;

        Ok(Self {
            watcher,
            receiver: rx,
            file_path,
        })
    }

    pub(crate) fn start_watching(&mut self) -> Result<()> {
        let watch_path = watch_dir(&self.file_path);
        self.watcher.watch(watch_path, RecursiveMode::NonRecursive)?;
        Ok(())
    }

    pub(crate) async fn next_event(&mut self) -> Option<notify::Result<Event>> {
        self.receiver.recv().await
    }

    /// File names whose events should trigger a pass: the log and `<log>.1`.
    pub(crate) fn watched_names(&self) -> Vec<String> {
        self.file_path
            .file_name()
            .map(|name| {
                let name = name.to_string_lossy().to_string();
                vec![format!("{}{}", name, crate::tail::ROTATED_SUFFIX), name]
            })
            .unwrap_or_default()
    }
}

/// The parent directory, or the current directory for bare file names.
fn watch_dir(file_path: &Path) -> &Path {
    match file_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Whether `event` touches any of `names`.
pub(crate) fn is_event_relevant(event: &Event, names: &[String]) -> bool {
    event.paths.iter().any(|path| {
        path.file_name()
            .map(|name| names.iter().any(|n| name.to_string_lossy() == n.as_str()))
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::EventKind;
    use notify::event::{DataChange, ModifyKind, RenameMode};

    fn event(kind: EventKind, paths: &[&str]) -> Event {
        Event {
            kind,
            paths: paths.iter().map(PathBuf::from).collect(),
            attrs: Default::default(),
        }
    }

    fn names() -> Vec<String> {
        vec!["app.log.1".to_string(), "app.log".to_string()]
    }

    #[test]
    fn test_watched_names_include_rotated_sibling() {
        let watcher = FileWatcher::new("/var/log/app.log").unwrap();
        assert_eq!(watcher.watched_names(), names());
    }

    #[test]
    fn test_watch_dir() {
        assert_eq!(watch_dir(Path::new("/var/log/app.log")), Path::new("/var/log"));
        assert_eq!(watch_dir(Path::new("app.log")), Path::new("."));
    }

    #[test]
    fn test_modify_of_live_file_is_relevant() {
        let e = event(
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            &["/var/log/app.log"],
        );
        assert!(is_event_relevant(&e, &names()));
    }

    #[test]
    fn test_rename_to_rotated_name_is_relevant() {
        let e = event(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &["/var/log/app.log", "/var/log/app.log.1"],
        );
        assert!(is_event_relevant(&e, &names()));
    }

    #[test]
    fn test_other_files_are_not_relevant() {
        let e = event(
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            &["/var/log/app.log.2", "/var/log/other.log", "/"],
        );
        assert!(!is_event_relevant(&e, &names()));
        assert!(!is_event_relevant(&event(EventKind::Any, &[]), &names()));
    }

    #[test]
    fn test_relevance_is_case_sensitive() {
        let e = event(
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            &["/var/log/App.Log"],
        );
        assert!(!is_event_relevant(&e, &names()));
    }

    #[tokio::test]
    async fn test_start_watching_temp_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut watcher = FileWatcher::new(dir.path().join("app.log")).unwrap();

        assert!(watcher.start_watching().is_ok());

        let result = tokio::time::timeout(
            std::time::Duration::from_millis(10),
            watcher.next_event(),
        )
        .await;
        assert!(result.is_err());
    }
}
