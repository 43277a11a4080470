//! Error handling with this crate's `Result` type.

use std::io;
use std::path::PathBuf;
use std::result::Result as StdResult;

use thiserror::Error;

/// Specialized `Result` type used for error handling in this crate.
pub type Result<T> = StdResult<T, Error>;

/// Errors that abort a sparsify run. None of them are retried.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unable to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unable to stat {}: {source}", .path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} is not a regular file", .path.display())]
    NotRegularFile { path: PathBuf },
    #[error("chunk size must be greater than zero")]
    ZeroChunkSize,
    #[error("unable to rewind to the start of the file: {source}")]
    Rewind {
        #[source]
        source: io::Error,
    },
    /// A block came back shorter than requested, or the read failed.
    #[error("short read @ {offset}: {source}")]
    ShortRead {
        offset: u64,
        expected: usize,
        actual: usize,
        #[source]
        source: io::Error,
    },
    #[error("hole punch @ {offset} failed: {source}")]
    HolePunch {
        offset: u64,
        len: u64,
        #[source]
        source: io::Error,
    },
}

/// Coarse classification of an [`Error`], used to pick an exit status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The target could not be opened or inspected; nothing was scanned.
    Access,
    /// The scan started and stopped at a failing read or hole punch.
    Scan,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Open { .. }
            | Error::Stat { .. }
            | Error::NotRegularFile { .. }
            | Error::ZeroChunkSize => ErrorKind::Access,
            Error::Rewind { .. } | Error::ShortRead { .. } | Error::HolePunch { .. } => {
                ErrorKind::Scan
            }
        }
    }

    /// Offset of the block the scan stopped at, if any.
    pub fn offset(&self) -> Option<u64> {
        match *self {
            Error::ShortRead { offset, .. } | Error::HolePunch { offset, .. } => Some(offset),
            _ => None,
        }
    }
}
