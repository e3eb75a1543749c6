//! Everything related to following a single growing file.

use std::fmt;
use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::fs::{metadata, File};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncSeekExt, BufReader};

use crate::source::{strip_terminator, LineSource};
use crate::watch::{GrowthWatch, WatchMode};

/// When the first record after a seek or reopen is thrown away.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SkipPolicy {
    /// Always discard it, it may be the tail end of a line.
    #[default]
    Always,
    /// Discard it only if the read position is not at the start of a line.
    Misaligned,
}

/// Knobs for [`FileTail`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TailOptions {
    /// How many bytes before the end of the file to start reading from.
    pub lookback: u64,
    pub watch: WatchMode,
    /// Sleep between checks in [`WatchMode::Poll`].
    pub poll_interval: Duration,
    pub skip: SkipPolicy,
}

impl Default for TailOptions {
    fn default() -> Self {
        TailOptions {
            lookback: 512,
            watch: WatchMode::Poll,
            poll_interval: Duration::from_millis(250),
            skip: SkipPolicy::Always,
        }
    }
}

/// Identity of the file behind a path, used to notice it was replaced.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct FileId {
    dev: u64,
    ino: u64,
}

#[cfg(unix)]
fn file_id(meta: &Metadata) -> Option<FileId> {
    use std::os::unix::fs::MetadataExt;

    Some(FileId {
        dev: meta.dev(),
        ino: meta.ino(),
    })
}

// Without a stable identity only truncation can be detected.
#[cfg(not(unix))]
fn file_id(_meta: &Metadata) -> Option<FileId> {
    None
}

async fn open_file(path: &Path) -> io::Result<(File, Metadata)> {
    let file = File::open(path).await?;
    let meta = file.metadata().await?;
    if meta.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::Other,
            "is a directory, not a file",
        ));
    }

    Ok((file, meta))
}

/// Follows a file from near its end, surviving truncation and rotation.
///
/// Records are only emitted once their newline has been written; a partial
/// line at the end of the file is held back until it is complete.
pub struct FileTail {
    path: PathBuf,
    reader: BufReader<File>,
    /// Bytes consumed from the current file, including the initial seek.
    pos: u64,
    identity: Option<FileId>,
    /// The path now names a different file; switch once the old one is drained.
    replaced: bool,
    partial: Vec<u8>,
    skip_next: bool,
    skip: SkipPolicy,
    watch: GrowthWatch,
}

impl fmt::Debug for FileTail {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        f.debug_struct("FileTail")
            .field("path", &self.path)
            .field("pos", &self.pos)
            .field("identity", &self.identity)
            .field("replaced", &self.replaced)
            .field("skip_next", &self.skip_next)
            .field("watch", &self.watch)
            .finish_non_exhaustive()
    }
}

impl FileTail {
    /// Opens `path` and positions the reader `options.lookback` bytes before
    /// its current end.
    pub async fn open(path: impl Into<PathBuf>, options: &TailOptions) -> io::Result<Self> {
        let path = path.into();
        let (mut file, meta) = open_file(&path).await?;

        let start = meta.len().saturating_sub(options.lookback);
        let skip_next = match options.skip {
            SkipPolicy::Always => true,
            SkipPolicy::Misaligned if start == 0 => false,
            SkipPolicy::Misaligned => {
                file.seek(io::SeekFrom::Start(start - 1)).await?;
                file.read_u8().await? != b'\n'
            }
        };
        file.seek(io::SeekFrom::Start(start)).await?;

        let watch = GrowthWatch::new(options.watch, &path, options.poll_interval)?;
        log::debug!("following {} from byte {}", path.display(), start);

        Ok(FileTail {
            path,
            reader: BufReader::new(file),
            pos: start,
            identity: file_id(&meta),
            replaced: false,
            partial: Vec::new(),
            skip_next,
            skip: options.skip,
            watch,
        })
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// Looks at what the path currently names. Truncation reopens right
    /// away; a replacement is only flagged so the old file can be drained.
    async fn inspect(&mut self) -> io::Result<()> {
        let meta = match metadata(&self.path).await {
            Ok(meta) => meta,
            // Moved away and not recreated yet.
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };

        let identity = file_id(&meta);
        if identity.is_some() && identity != self.identity {
            self.replaced = true;
        } else if meta.len() < self.pos {
            log::info!("{}: file truncated", self.path.display());
            self.reopen().await?;
        }

        Ok(())
    }

    /// Starts over at the beginning of whatever file the path names now.
    ///
    /// Returns `false` if the path vanished in the meantime.
    async fn reopen(&mut self) -> io::Result<bool> {
        let (file, meta) = match open_file(&self.path).await {
            Ok(opened) => opened,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e),
        };
        log::info!("{}: re-opened", self.path.display());

        self.reader = BufReader::new(file);
        self.pos = 0;
        self.identity = file_id(&meta);
        self.replaced = false;
        self.partial.clear();
        self.skip_next = self.skip == SkipPolicy::Always;

        Ok(true)
    }
}

#[async_trait]
impl LineSource for FileTail {
    async fn next_record(&mut self) -> io::Result<Option<Vec<u8>>> {
        loop {
            let n = self.reader.read_until(b'\n', &mut self.partial).await?;
            self.pos += n as u64;

            if self.partial.last() == Some(&b'\n') {
                let mut record = std::mem::take(&mut self.partial);
                if std::mem::take(&mut self.skip_next) {
                    continue;
                }
                strip_terminator(&mut record);
                return Ok(Some(record));
            }

            if n > 0 {
                // Partial line; the next read reports EOF or the rest of it.
                continue;
            }

            if self.replaced && self.reopen().await? {
                continue;
            }

            self.watch.changed().await?;
            self.inspect().await?;
        }
    }
}
