//
// Copyright (c) 2025 Nathan Fiedler
//

//! Error taxonomy for this crate.
//!
//! A plain enum with a hand-written [`std::fmt::Display`] and
//! [`std::error::Error`] impl rather than a derive-macro crate, since the
//! surface here is small and fixed.

use std::fmt;
use std::path::PathBuf;

/// Errors that can arise while validating parameters, opening a source, or
/// reading from one mid-stream.
#[derive(Debug)]
pub enum Error {
    /// A chunking parameter (min/avg/max size) was out of bounds, or the
    /// three sizes were not ordered `min <= avg <= max`.
    InvalidParameter(String),
    /// The source adapter could not open or map the requested input.
    SourceOpenFailure { path: Option<PathBuf>, source: std::io::Error },
    /// A read from the source failed partway through chunking. Any chunks
    /// already yielded before this error remain valid.
    SourceReadFailure(std::io::Error),
    /// The value passed to construct a [`crate::Source`] does not conform
    /// to any of the accepted input shapes.
    ///
    /// [`crate::Source`] is a closed enum, so the type system rejects this
    /// case before it ever reaches a `Result`; the variant exists so the
    /// error taxonomy stays complete for callers matching on `Error`
    /// exhaustively, and for any future input shape that can't be checked
    /// at compile time (e.g. one parsed from a config value).
    InvalidInputType(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidParameter(msg) => write!(f, "invalid chunking parameter: {msg}"),
            Error::SourceOpenFailure { path: Some(p), source } => {
                write!(f, "failed to open source {}: {source}", p.display())
            }
            Error::SourceOpenFailure { path: None, source } => {
                write!(f, "failed to open source: {source}")
            }
            Error::SourceReadFailure(err) => write!(f, "failed to read from source: {err}"),
            Error::InvalidInputType(msg) => write!(f, "unsupported source input: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::SourceOpenFailure { source, .. } => Some(source),
            Error::SourceReadFailure(err) => Some(err),
            Error::InvalidParameter(_) | Error::InvalidInputType(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::SourceReadFailure(err)
    }
}

impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::SourceReadFailure(ioerr) => ioerr,
            Error::SourceOpenFailure { source, .. } => source,
            Error::InvalidParameter(msg) => Self::new(std::io::ErrorKind::InvalidInput, msg),
            Error::InvalidInputType(msg) => Self::new(std::io::ErrorKind::InvalidInput, msg),
        }
    }
}
