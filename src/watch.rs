//! Everything related to waiting for a followed file to change.
//!
//! Two disciplines are available. Polling sleeps for a fixed interval and is
//! the default, since it behaves the same on every filesystem (network mounts
//! included). Notification mode proxies [`notify`] events for the file's
//! parent directory, so that rotations which replace the file are observed
//! too, and falls back to a periodic tick in case events are lost.

use std::ffi::OsString;
use std::fmt::{self, Debug, Formatter};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::Watcher;
use tokio::sync::mpsc;
use tokio::time::{self, Instant};

/// Upper bound on how long notification mode waits without an event.
const NOTIFY_FALLBACK: Duration = Duration::from_secs(1);

/// Which discipline is used to learn that a file grew or was replaced.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum WatchMode {
    #[default]
    Poll,
    Notify,
}

pub(crate) enum GrowthWatch {
    Poll {
        interval: Duration,
    },
    Notify {
        // Dropping the watcher stops the events, so it lives as long as the
        // receiver does.
        _watcher: notify::RecommendedWatcher,
        file_name: OsString,
        event_stream: mpsc::UnboundedReceiver<Result<notify::Event, notify::Error>>,
    },
}

impl Debug for GrowthWatch {
    fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
        match self {
            GrowthWatch::Poll { interval } => {
                f.debug_struct("Poll").field("interval", interval).finish()
            }
            GrowthWatch::Notify { file_name, .. } => f
                .debug_struct("Notify")
                .field("file_name", file_name)
                .finish_non_exhaustive(),
        }
    }
}

impl GrowthWatch {
    pub(crate) fn new(mode: WatchMode, path: &Path, poll_interval: Duration) -> io::Result<Self> {
        match mode {
            WatchMode::Poll => Ok(GrowthWatch::Poll {
                interval: poll_interval,
            }),
            WatchMode::Notify => Self::notify(path),
        }
    }

    fn notify(path: &Path) -> io::Result<Self> {
        let (dir, file_name) = split_file_path(path)?;

        let (tx, rx) = mpsc::unbounded_channel();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            // The only way `send` can fail is if the receiver is dropped,
            // which also drops this watcher.
            let _ = tx.send(res);
        })
        .map_err(into_io_error)?;

        watcher
            .watch(&dir, notify::RecursiveMode::NonRecursive)
            .map_err(into_io_error)?;

        Ok(GrowthWatch::Notify {
            _watcher: watcher,
            file_name,
            event_stream: rx,
        })
    }

    /// Resolves once the file may have changed.
    ///
    /// Spurious wakeups are fine; callers re-read and re-inspect the file
    /// every time.
    pub(crate) async fn changed(&mut self) -> io::Result<()> {
        match self {
            GrowthWatch::Poll { interval } => {
                time::sleep(*interval).await;
                Ok(())
            }
            GrowthWatch::Notify {
                file_name,
                event_stream,
                ..
            } => {
                let deadline = Instant::now() + NOTIFY_FALLBACK;
                loop {
                    let event = match time::timeout_at(deadline, event_stream.recv()).await {
                        Err(_elapsed) => return Ok(()),
                        Ok(None) => {
                            return Err(io::Error::new(
                                io::ErrorKind::BrokenPipe,
                                "file watcher stopped",
                            ))
                        }
                        Ok(Some(res)) => res.map_err(into_io_error)?,
                    };

                    let ours = event
                        .paths
                        .iter()
                        .any(|p| p.file_name() == Some(file_name.as_os_str()));
                    if ours {
                        return Ok(());
                    }
                }
            }
        }
    }
}

fn into_io_error(e: notify::Error) -> io::Error {
    match e.kind {
        notify::ErrorKind::Io(io_err) => io_err,
        // Runtime event errors should only be std::io, but need to handle
        // this case anyway.
        kind => io::Error::new(io::ErrorKind::Other, format!("Event error: {:?}", kind)),
    }
}

/// Splits a file path into an absolute, canonical parent directory and the
/// file name.
fn split_file_path(path: &Path) -> io::Result<(PathBuf, OsString)> {
    let dir = match path.parent() {
        Some(parent) if parent != Path::new("") => parent.to_path_buf(),
        _ => std::env::current_dir()?,
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "Filename not found in path"))?
        .to_os_string();

    let dir = dir.canonicalize().unwrap_or(dir);

    Ok((dir, file_name))
}
