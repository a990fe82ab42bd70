//! Error types for the scrape pipeline.
//!
//! Neither error is ever surfaced to an HTTP caller: both degrade to an empty
//! grid at the boundary where they are caught, and are only logged.

use thiserror::Error;

/// Failure to obtain a document (or a scraped grid) from a remote service.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("Could not decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

/// The fetched document could not be structurally parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Parse error at byte {position}: {message}")]
pub struct ParseError {
    pub position: usize,
    pub message: String,
}

impl ParseError {
    pub fn new<S: Into<String>>(position: usize, message: S) -> ParseError {
        ParseError {
            position,
            message: message.into(),
        }
    }
}
