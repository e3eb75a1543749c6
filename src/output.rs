//! Serializing rows from many followers onto one output stream.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use crossterm::queue;
use crossterm::style::{Color, ResetColor, SetForegroundColor};
use crossterm::tty::IsTty;
use parking_lot::Mutex;

use crate::layout::{trim_label, LABEL_WIDTH};

/// Colors handed out to sources in command-line order.
pub const PALETTE: [Color; 6] = [
    Color::DarkGreen,
    Color::DarkCyan,
    Color::DarkYellow,
    Color::DarkBlue,
    Color::DarkRed,
    Color::DarkMagenta,
];

/// Color for the source at `ordinal`, cycling through [`PALETTE`].
pub fn color_for(ordinal: usize) -> Color {
    PALETTE[ordinal % PALETTE.len()]
}

/// Whether rows are wrapped in color escapes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ColorChoice {
    /// Color when stdout is a terminal and `NO_COLOR` is not set.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    /// Resolves `Auto` against the process' stdout and environment.
    pub fn enabled(self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                let no_color = std::env::var_os("NO_COLOR").map_or(false, |v| !v.is_empty());
                !no_color && io::stdout().is_tty()
            }
        }
    }
}

struct Sink<W> {
    writer: W,
    colored: bool,
}

/// Shared handle to the output stream.
///
/// Clones write to the same stream. Every call to [`write_line`] renders all
/// fragments of one line while holding the lock, so rows of different lines
/// never interleave.
///
/// [`write_line`]: Multiplexer::write_line
pub struct Multiplexer<W> {
    sink: Arc<Mutex<Sink<W>>>,
}

impl<W> Clone for Multiplexer<W> {
    fn clone(&self) -> Self {
        Multiplexer {
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<W> fmt::Debug for Multiplexer<W> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Multiplexer")
            .field("handles", &Arc::strong_count(&self.sink))
            .finish_non_exhaustive()
    }
}

impl Multiplexer<io::Stdout> {
    pub fn stdout(color: ColorChoice) -> Self {
        Self::new(io::stdout(), color.enabled())
    }
}

impl<W: Write> Multiplexer<W> {
    pub fn new(writer: W, colored: bool) -> Self {
        Multiplexer {
            sink: Arc::new(Mutex::new(Sink { writer, colored })),
        }
    }

    /// Writes one row per fragment, each prefixed with the trimmed `label`,
    /// as a single uninterrupted block.
    pub fn write_line(&self, label: &str, color: Color, fragments: &[&str]) -> io::Result<()> {
        let label = trim_label(label, LABEL_WIDTH);

        let mut sink = self.sink.lock();
        let Sink { writer, colored } = &mut *sink;
        for fragment in fragments {
            if *colored {
                queue!(writer, SetForegroundColor(color))?;
            }
            write!(writer, "|{:<width$}| {}", label, fragment, width = LABEL_WIDTH)?;
            if *colored {
                queue!(writer, ResetColor)?;
            }
            writer.write_all(b"\n")?;
        }
        writer.flush()
    }

    /// Returns the underlying writer once every other handle is gone.
    pub fn into_inner(self) -> Option<W> {
        Arc::try_unwrap(self.sink)
            .ok()
            .map(|sink| sink.into_inner().writer)
    }
}
