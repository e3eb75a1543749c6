//! Where records come from.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures_util::stream::{self, Stream};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};

/// A followed input as named on the command line.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Source {
    Stdin,
    File(PathBuf),
}

impl Source {
    /// Parses a command-line identifier; `""` and `"-"` mean standard input.
    pub fn from_arg(arg: &str) -> Self {
        match arg {
            "" | "-" => Source::Stdin,
            path => Source::File(PathBuf::from(path)),
        }
    }

    /// The text shown in the label column, before trimming.
    pub fn label(&self) -> String {
        match self {
            Source::Stdin => "/dev/stdin".to_string(),
            Source::File(path) => path.display().to_string(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Source::Stdin => None,
            Source::File(path) => Some(path.as_path()),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Something that produces newline-delimited records as they appear.
#[async_trait]
pub trait LineSource: Send {
    /// Waits for the next complete record, without its line terminator.
    ///
    /// Returns `Ok(None)` once the source is exhausted for good.
    async fn next_record(&mut self) -> io::Result<Option<Vec<u8>>>;
}

/// Adapts a [`LineSource`] into a lazy stream of records.
///
/// The stream ends when the source is exhausted; an error is yielded as an
/// item and the source is polled again only if the stream is.
pub fn records<S: LineSource>(source: S) -> impl Stream<Item = io::Result<Vec<u8>>> {
    stream::unfold(source, |mut source| async move {
        match source.next_record().await {
            Ok(Some(record)) => Some((Ok(record), source)),
            Ok(None) => None,
            Err(e) => Some((Err(e), source)),
        }
    })
}

/// Removes the line terminator, `\n` or `\r\n`, from a record in place.
pub(crate) fn strip_terminator(record: &mut Vec<u8>) {
    if record.last() == Some(&b'\n') {
        record.pop();
        if record.last() == Some(&b'\r') {
            record.pop();
        }
    }
}

/// A stream that is read once from its start, like standard input.
///
/// No seeking and no discarded first record. A final line without a
/// terminator is still emitted when the stream ends.
pub struct PipeSource<R> {
    reader: R,
    exhausted: bool,
}

impl PipeSource<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R> PipeSource<R> {
    pub fn new(reader: R) -> Self {
        PipeSource {
            reader,
            exhausted: false,
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> LineSource for PipeSource<R> {
    async fn next_record(&mut self) -> io::Result<Option<Vec<u8>>> {
        if self.exhausted {
            return Ok(None);
        }

        let mut record = Vec::new();
        let n = self.reader.read_until(b'\n', &mut record).await?;
        if n == 0 {
            self.exhausted = true;
            return Ok(None);
        }
        strip_terminator(&mut record);

        Ok(Some(record))
    }
}
