//! Follow several growing log files at once, interleaved into one terminal
//! stream.
//!
//! Every source gets its own color and a fixed-width label column, and long
//! lines are wrapped under that label so each printed row says where it came
//! from. Files are followed from near their end and survive truncation and
//! rotation; standard input is read as a plain pipe.
//!
//! ## Example
//!
//! ```no_run
//! use tailmux::{run, ColorChoice, DecodeMode, Multiplexer, Source, TailOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let sources = vec![
//!         Source::from_arg("some/file.log"),
//!         Source::from_arg("/some/other/file.log"),
//!     ];
//!     let output = Multiplexer::stdout(ColorChoice::Auto);
//!
//!     // Returns once every source is exhausted or broken.
//!     run(&sources, DecodeMode::Raw, &TailOptions::default(), 120, output).await;
//! }
//! ```
//!
//! ## Caveats
//!
//! The first line read from a file after seeking to its end, or after
//! re-opening it, is dropped because the byte-based seek may land in the
//! middle of a line. [`SkipPolicy::Misaligned`] only drops it when the read
//! position really is mid-line.

mod app;
mod config;
mod error;
mod follower;
mod layout;
mod output;
mod record;
mod source;
mod tail;
mod watch;

pub use app::run;
pub use config::{Cli, Config};
pub use error::{Error, Result};
pub use follower::Follower;
pub use layout::{content_width, partition, trim_label, FRAME_WIDTH, LABEL_WIDTH};
pub use output::{color_for, ColorChoice, Multiplexer, PALETTE};
pub use record::{decode, DecodeError, DecodeMode, StructuredRecord};
pub use source::{records, LineSource, PipeSource, Source};
pub use tail::{FileTail, SkipPolicy, TailOptions};
pub use watch::WatchMode;

#[cfg(doctest)]
doc_comment::doctest!("../README.md");
