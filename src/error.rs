//! Errors that abort a scan.
//!
//! Short or otherwise malformed lines are not errors; they are skipped while
//! counting. Everything here is fatal and leaves no output behind.

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::split::ByteRange;

#[derive(Error, Debug)]
pub enum Error {
    #[error("input file {path:?} does not exist")]
    InputNotFound { path: PathBuf },

    #[error("input file {path:?} could not be read: {source}")]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("worker {worker} failed while reading bytes {range}: {source}")]
    WorkerIo {
        worker: usize,
        range: ByteRange,
        #[source]
        source: io::Error,
    },

    #[error("worker {worker} panicked")]
    WorkerPanicked { worker: usize },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("could not write output to {path:?}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not serialize result: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl Error {
    /// Sorts a failed open of the input into not-found and everything else
    pub(crate) fn input(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Error::InputNotFound { path }
        } else {
            Error::InputUnreadable { path, source }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
