//! Failures surfaced by the calculator.
//!
//! Domain problems (bad field text, a rest that does not exist) are
//! recoverable: the model stays queryable and the caller decides whether to
//! report them. File and format problems come from loading the config or
//! payload and from CSV export.

use crate::ParameterKey;
use std::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Payload could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Result table could not be written
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// App config could not be parsed
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Config or payload parsed but holds unusable values
    #[error("Configuration error: {0}")]
    Config(String),

    /// Field text that is not a finite number; the model reads it as 0
    #[error("Invalid numeric input for {key}: {input:?}")]
    InvalidNumericInput { key: ParameterKey, input: String },

    /// `index` is 0-based, the message is 1-based like the table
    #[error("Rest {} does not exist (schedule has {len} rests)", .index + 1)]
    RestIndex { index: usize, len: usize },

    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),
}
