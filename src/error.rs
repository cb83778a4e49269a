//! Error types for quire operations.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while converting chapters or assembling a book.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("unexpected chapter structure in {}: {what}", path.display())]
    Structure { path: PathBuf, what: String },

    #[error("invalid title manifest {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "title manifest has {titles} entries but there are {chapters} chapters (no title for {first_untitled})"
    )]
    ManifestMismatch {
        chapters: usize,
        titles: usize,
        first_untitled: String,
    },

    #[error("generated XHTML for {} is not well-formed: {message}", path.display())]
    MalformedOutput { path: PathBuf, message: String },

    #[error("invalid selector `{selector}`")]
    Selector { selector: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("conversion task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl Error {
    pub(crate) fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub(crate) fn structure(path: impl AsRef<Path>, what: impl Into<String>) -> Self {
        Error::Structure {
            path: path.as_ref().to_path_buf(),
            what: what.into(),
        }
    }

    /// Path of the file the error is about, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Error::Io { path, .. }
            | Error::Parse { path, .. }
            | Error::Structure { path, .. }
            | Error::Manifest { path, .. }
            | Error::MalformedOutput { path, .. } => Some(path),
            _ => None,
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
