use std::path::PathBuf;

use chrono::NaiveDate;

/// Precondition failures of the timeline layout engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("grid range is inverted: {start} > {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },

    #[error("grid range {start}..={end} does not cover whole weeks")]
    NotWeekAligned { start: NaiveDate, end: NaiveDate },

    #[error("shared day threshold must be at least 1")]
    ZeroThreshold,
}

/// Errors raised while loading off-day data or resolving configuration.
#[derive(Debug, thiserror::Error)]
pub enum OffdayError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed off-day document {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("item {index}: invalid date {value:?}")]
    InvalidDate { index: usize, value: String },

    #[error("item {index}: name is empty")]
    EmptyName { index: usize },

    #[error("no user id left to assign to {name:?}")]
    IdSpaceExhausted { name: String },

    #[error("failed to serialize output: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Layout(#[from] LayoutError),
}
