//! VFS Error Types

use std::io;
use thiserror::Error;

/// Result type for VFS operations
pub type VfsResult<T> = Result<T, VfsError>;

/// Error type for VFS operations
#[derive(Error, Debug)]
pub enum VfsError {
    /// Malformed percent-encoding in a locator path
    #[error("invalid locator path '{path}': {reason}")]
    Normalization { path: String, reason: String },

    /// No registered resolver accepted the locator
    #[error(
        "could not create directory from locator, no matching resolver was found [{locator}]\n\
         either pass an explicit resolver list, or register your own resolver \
         with add_default_resolver / set_default_resolvers"
    )]
    NoMatchingResolver { locator: String },

    /// The matching resolver failed to build its directory
    #[error("could not create directory using {resolver} from locator {locator}")]
    DirectoryCreation {
        resolver: String,
        locator: String,
        #[source]
        source: Box<VfsError>,
    },

    /// A file's byte stream could not be opened
    #[error("could not open stream for '{path}': {source}")]
    StreamOpen {
        path: String,
        #[source]
        source: io::Error,
    },

    /// File or directory not found
    #[error("path not found: {path}")]
    NotFound { path: String },

    /// Path exists but is not a directory
    #[error("not a directory: {path}")]
    NotADirectory { path: String },

    /// File is not a readable ZIP archive
    #[error("invalid archive '{path}': {source}")]
    InvalidArchive {
        path: String,
        #[source]
        source: zip::result::ZipError,
    },

    /// Nested archive entry missing from its container
    #[error("entry '{entry}' not found in archive '{archive}'")]
    EntryNotFound { archive: String, entry: String },

    /// IO error on a specific path
    #[error("IO error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Custom error message, for user resolvers
    #[error("{message}")]
    Custom { message: String },
}

/// Coarse classification of [`VfsError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Normalization,
    NoMatchingResolver,
    DirectoryCreation,
    StreamOpen,
    /// A backend cause (missing path, bad archive, io)
    Backend,
}

impl VfsError {
    /// Create a custom error
    pub fn custom(message: impl Into<String>) -> Self {
        VfsError::Custom {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            VfsError::Normalization { .. } => ErrorKind::Normalization,
            VfsError::NoMatchingResolver { .. } => ErrorKind::NoMatchingResolver,
            VfsError::DirectoryCreation { .. } => ErrorKind::DirectoryCreation,
            VfsError::StreamOpen { .. } => ErrorKind::StreamOpen,
            VfsError::NotFound { .. }
            | VfsError::NotADirectory { .. }
            | VfsError::InvalidArchive { .. }
            | VfsError::EntryNotFound { .. }
            | VfsError::Io { .. }
            | VfsError::Custom { .. } => ErrorKind::Backend,
        }
    }

    pub(crate) fn io(path: impl Into<String>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            VfsError::NotFound { path }
        } else {
            VfsError::Io { path, source }
        }
    }

    pub(crate) fn stream(path: impl Into<String>, source: io::Error) -> Self {
        VfsError::StreamOpen {
            path: path.into(),
            source,
        }
    }
}

impl From<io::Error> for VfsError {
    fn from(err: io::Error) -> Self {
        VfsError::Io {
            path: String::new(),
            source: err,
        }
    }
}
