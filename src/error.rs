// src/error.rs
// =============================================================================
// Error types for the crawl pipeline.
//
// Every stage of the pipeline fails with a CrawlError:
// - Transport: the network or the server let us down
// - Parse: markup or a link we could not make sense of
// - Format: the data was there but not in the shape we expected
// - Cancelled: we were told to stop (never reported as a failure)
// - Config: the pipeline could not even be set up
//
// The application layer (main.rs) wraps these in anyhow::Error, while the
// pipeline itself keeps the typed variants so workers can tell "the server
// erred" apart from "I was told to stop".
// =============================================================================

use thiserror::Error;

// Errors produced while counting pages, resolving links or downloading recipes
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CrawlError {
    /// Network-level failure or a non-success HTTP status
    #[error("transport error: {0}")]
    Transport(String),

    /// Input to a parser was malformed (bad markup, unresolvable link)
    #[error("parse error: {0}")]
    Parse(String),

    /// Data was present but not in the expected shape
    #[error("format error: {0}")]
    Format(String),

    /// The operation was abandoned because cancellation fired
    #[error("operation cancelled")]
    Cancelled,

    /// The pipeline could not be constructed with the given options
    #[error("invalid pipeline configuration: {0}")]
    Config(String),
}

impl CrawlError {
    /// True when the error only exists because cancellation fired
    pub fn is_cancellation(&self) -> bool {
        matches!(self, CrawlError::Cancelled)
    }
}

impl From<reqwest::Error> for CrawlError {
    fn from(error: reqwest::Error) -> Self {
        CrawlError::Transport(error.to_string())
    }
}
