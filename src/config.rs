//! Command-line configuration.

use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::output::ColorChoice;
use crate::record::DecodeMode;
use crate::source::Source;
use crate::tail::{SkipPolicy, TailOptions};
use crate::watch::WatchMode;

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
enum WatchArg {
    Poll,
    Notify,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
enum ColorArg {
    Auto,
    Always,
    Never,
}

/// Follow several log files at once, each in its own color.
#[derive(Debug, Parser)]
#[command(name = "tailmux", version)]
pub struct Cli {
    /// Parse log files as Docker JSON format
    #[arg(short = 'd', long = "docker", visible_alias = "json")]
    docker: bool,

    /// How to notice that a file changed
    #[arg(short = 'w', long, value_enum, default_value_t = WatchArg::Poll)]
    watch: WatchArg,

    /// Milliseconds between checks when polling
    #[arg(
        long,
        value_name = "MS",
        default_value_t = 250,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    poll_interval: u64,

    /// Start this many bytes before the end of each file
    #[arg(long, value_name = "BYTES", default_value_t = 512)]
    lookback: u64,

    /// Only drop the first line read when it is actually cut off
    #[arg(long)]
    exact_start: bool,

    /// When to colorize output
    #[arg(long, value_enum, default_value_t = ColorArg::Auto)]
    color: ColorArg,

    /// Use this terminal width instead of asking the terminal
    #[arg(long, value_name = "COLUMNS", value_parser = clap::value_parser!(u16).range(1..))]
    width: Option<u16>,

    /// Files to follow; none, `-` or an empty name reads standard input
    #[arg(value_name = "FILES")]
    files: Vec<String>,
}

/// Everything a run needs, validated.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub sources: Vec<Source>,
    pub decode_mode: DecodeMode,
    pub tail: TailOptions,
    pub color: ColorChoice,
    /// Terminal width override; `None` asks the terminal once at startup.
    pub width: Option<u16>,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        let sources = if cli.files.is_empty() {
            vec![Source::Stdin]
        } else {
            cli.files.iter().map(|f| Source::from_arg(f)).collect()
        };

        Config {
            sources,
            decode_mode: if cli.docker {
                DecodeMode::Structured
            } else {
                DecodeMode::Raw
            },
            tail: TailOptions {
                lookback: cli.lookback,
                watch: match cli.watch {
                    WatchArg::Poll => WatchMode::Poll,
                    WatchArg::Notify => WatchMode::Notify,
                },
                poll_interval: Duration::from_millis(cli.poll_interval),
                skip: if cli.exact_start {
                    SkipPolicy::Misaligned
                } else {
                    SkipPolicy::Always
                },
            },
            color: match cli.color {
                ColorArg::Auto => ColorChoice::Auto,
                ColorArg::Always => ColorChoice::Always,
                ColorArg::Never => ColorChoice::Never,
            },
            width: cli.width,
        }
    }
}

impl Config {
    /// Parses the process arguments, exiting with usage on error.
    pub fn from_args() -> Self {
        Cli::parse().into()
    }

    pub fn try_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Cli::try_parse_from(args).map(Config::from)
    }
}
