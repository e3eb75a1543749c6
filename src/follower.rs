//! The per-source worker: records in, colored rows out.

use std::io::Write;

use crossterm::style::Color;
use futures_util::pin_mut;
use futures_util::stream::StreamExt;

use crate::error::{Error, Result};
use crate::layout::partition;
use crate::output::Multiplexer;
use crate::record::{decode, DecodeMode};
use crate::source::{records, LineSource};

/// Renders every record of one source through a shared [`Multiplexer`].
#[derive(Debug)]
pub struct Follower<W> {
    label: String,
    color: Color,
    mode: DecodeMode,
    content_width: usize,
    output: Multiplexer<W>,
}

impl<W: Write> Follower<W> {
    pub fn new(
        label: impl Into<String>,
        color: Color,
        mode: DecodeMode,
        content_width: usize,
        output: Multiplexer<W>,
    ) -> Self {
        Follower {
            label: label.into(),
            color,
            mode,
            content_width,
            output,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Consumes `source` until it ends or fails.
    ///
    /// Records that fail to decode are logged and skipped. Read and write
    /// failures end the follow.
    pub async fn run<S: LineSource>(self, source: S) -> Result<()> {
        log::debug!("{}: follower started", self.label);

        let records = records(source);
        pin_mut!(records);

        while let Some(record) = records.next().await {
            let record = record.map_err(|e| Error::read(self.label.as_str(), e))?;
            self.emit(&record)?;
        }

        log::debug!("{}: source exhausted", self.label);
        Ok(())
    }

    fn emit(&self, raw: &[u8]) -> Result<()> {
        let text = match decode(raw, self.mode) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("{}: error parsing line: {}", self.label, e);
                return Ok(());
            }
        };

        let fragments = partition(&text, self.content_width);
        self.output
            .write_line(&self.label, self.color, &fragments)
            .map_err(Error::Write)
    }
}
