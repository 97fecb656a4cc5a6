//! Error handling for srafetch.
//!
//! Every failure the crate can produce is a variant of [`Error`]. Resolution
//! errors concern a whole accession; the transfer variants (`Connect`, `Auth`,
//! `SizeQuery`, `Retrieve`, `Stream`, `IOError`) are scoped to a single task and
//! are caught by the worker pool at the task boundary.

use std::io;
use thiserror::Error;

/// Errors that can happen when using srafetch.
#[derive(Error, Debug)]
pub enum Error {
    /// The accession could not be turned into a list of remote locations.
    ///
    /// Covers unknown accessions, an unreachable metadata service, non-success
    /// HTTP statuses and malformed or empty responses.
    #[error("cannot resolve accession {accession}: {reason}")]
    Resolution { accession: String, reason: String },

    /// A combined location string does not have the `server/path` shape.
    #[error("invalid remote location: {0}")]
    InvalidLocation(String),

    /// The control connection could not be established in time.
    #[error("cannot connect to {server}: {reason}")]
    Connect { server: String, reason: String },

    /// The server rejected the anonymous login.
    #[error("login rejected by {server}: {reason}")]
    Auth { server: String, reason: String },

    /// The server refused to report the size of an object.
    #[error("size query failed for {path}: {reason}")]
    SizeQuery { path: String, reason: String },

    /// The server refused to start sending an object.
    #[error("retrieve failed for {path}: {reason}")]
    Retrieve { path: String, reason: String },

    /// Reading the remote byte stream failed mid-transfer.
    #[error("stream error: {0}")]
    Stream(#[source] io::Error),

    /// I/O Error.
    ///
    /// Local file creation or write failure.
    #[error("I/O error: {source}")]
    IOError {
        #[from]
        source: io::Error,
    },

    /// Error from the Reqwest library.
    #[error("Reqwest error: {source}")]
    Reqwest {
        #[from]
        source: reqwest::Error,
    },

    /// Error from the HTTP middleware stack.
    #[error("HTTP middleware error: {source}")]
    Middleware {
        #[from]
        source: reqwest_middleware::Error,
    },
}

impl Error {
    /// Short, stable label naming the error kind, used in logs and summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Resolution { .. } => "resolution",
            Error::InvalidLocation(_) => "invalid-location",
            Error::Connect { .. } => "connect",
            Error::Auth { .. } => "auth",
            Error::SizeQuery { .. } => "size-query",
            Error::Retrieve { .. } => "retrieve",
            Error::Stream(_) => "stream",
            Error::IOError { .. } => "io",
            Error::Reqwest { .. } | Error::Middleware { .. } => "http",
        }
    }

    pub(crate) fn resolution(accession: &str, reason: impl std::fmt::Display) -> Self {
        Error::Resolution {
            accession: accession.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for operations that can fail with a srafetch error.
pub type Result<T> = std::result::Result<T, Error>;
