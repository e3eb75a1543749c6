//! Turning raw records into displayable text.

use std::borrow::Cow;

use serde::Deserialize;
use thiserror::Error;

/// How the bytes of a record are interpreted before display.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum DecodeMode {
    /// Display the record as-is.
    #[default]
    Raw,
    /// Each record is a single-line JSON log entry as written by Docker's
    /// `json-file` logging driver.
    Structured,
}

/// One line of a Docker `json-file` log.
///
/// Only `log` is displayed; `stream` and `time` are accepted so that they
/// could be surfaced later.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct StructuredRecord {
    pub log: String,
    #[serde(default)]
    pub stream: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decodes one record according to `mode`.
///
/// Raw records that are not valid UTF-8 are converted lossily rather than
/// rejected.
pub fn decode(raw: &[u8], mode: DecodeMode) -> Result<Cow<'_, str>, DecodeError> {
    match mode {
        DecodeMode::Raw => Ok(String::from_utf8_lossy(raw)),
        DecodeMode::Structured => {
            let record: StructuredRecord = serde_json::from_slice(raw)?;
            let mut text = record.log;
            let kept = text.trim_end_matches('\n').len();
            text.truncate(kept);
            Ok(Cow::Owned(text))
        }
    }
}
