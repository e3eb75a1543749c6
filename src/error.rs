//! Per-source failures.
//!
//! None of these cross a follower's boundary: the orchestrator logs them and
//! the remaining followers keep running.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The source could not be opened, so following never started.
    #[error("Error reading file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Reading or waiting for more data failed after following started.
    #[error("Error following {label}: {source}")]
    Read {
        label: String,
        #[source]
        source: io::Error,
    },
    /// The shared output stream refused a write.
    #[error("Error writing output: {0}")]
    Write(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn open(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Open {
            path: path.into(),
            source,
        }
    }

    pub fn read(label: impl Into<String>, source: io::Error) -> Self {
        Self::Read {
            label: label.into(),
            source,
        }
    }
}
