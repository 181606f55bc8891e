//! Error types for wavforge

use thiserror::Error;

/// Result type alias for wavforge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for wavforge
///
/// Every kind maps to a negative process exit code via [`Error::exit_code`];
/// 0 is reserved for success.
#[derive(Error, Debug)]
pub enum Error {
    /// Allocation failure
    #[error("Out of memory.")]
    OutOfMemory,

    /// File was not found at the given path
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Unable to write to a file
    #[error("Invalid write permissions: {0}")]
    InvalidWritePermissions(String),

    /// Unable to write to a file (disk space)
    #[error("Not enough disk space for file write operation.")]
    NoDiskSpace,

    /// File exists but is not in the expected format
    #[error("File exists but is in an unexpected format: {0}")]
    InvalidFileType(String),

    /// Invalid call
    #[error("Invalid call. {0}")]
    InvalidCall(String),

    /// Invalid input data
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Feature not yet supported
    #[error("Feature not yet supported: {0}")]
    FeatureNotSupported(String),

    /// Within multiple tasks, one or more failed
    #[error("One or more tasks failed.")]
    PartialFailure,

    /// Unsupported version (of a file etc.)
    #[error("Invalid version: {0}")]
    BadVersion(String),

    /// The file exceeded the maximum size supported by the system
    #[error("File overflow.")]
    FileOverflow,

    /// An error occurred while writing the file
    #[error("File write error: {0}")]
    FileWriteError(String),

    /// Bad data format
    #[error("Bad data format: {0}")]
    BadFormat(String),

    /// A value is too large for the type required by a given file format
    #[error("A value is too large for the type required by a given file format: {0}")]
    UnsupportedSize(String),

    /// A read extended past the end of the buffer
    #[error("Truncated data: need {need} bytes, have {have}")]
    Truncated { need: usize, have: usize },
}

impl Error {
    /// Create a bad-format error
    pub fn bad_format<S: Into<String>>(msg: S) -> Self {
        Error::BadFormat(msg.into())
    }

    /// Create an invalid-call error
    pub fn invalid_call<S: Into<String>>(msg: S) -> Self {
        Error::InvalidCall(msg.into())
    }

    /// Create an invalid-data error
    pub fn invalid_data<S: Into<String>>(msg: S) -> Self {
        Error::InvalidData(msg.into())
    }

    /// Create a bad-version error
    pub fn bad_version<S: Into<String>>(msg: S) -> Self {
        Error::BadVersion(msg.into())
    }

    /// Create a feature-not-supported error
    pub fn feature_not_supported<S: Into<String>>(msg: S) -> Self {
        Error::FeatureNotSupported(msg.into())
    }

    /// Create an unsupported-size error
    pub fn unsupported_size<S: Into<String>>(msg: S) -> Self {
        Error::UnsupportedSize(msg.into())
    }

    /// Map a file-read failure onto the error taxonomy
    pub fn from_read(err: &std::io::Error, path: &str) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Error::FileNotFound(path.to_string()),
            std::io::ErrorKind::PermissionDenied => {
                Error::InvalidWritePermissions(path.to_string())
            }
            _ => Error::InvalidData(format!("{}: {}", path, err)),
        }
    }

    /// Map a file-write failure onto the error taxonomy
    pub fn from_write(err: &std::io::Error, path: &str) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => {
                Error::InvalidWritePermissions(path.to_string())
            }
            _ => Error::FileWriteError(format!("{}: {}", path, err)),
        }
    }

    /// The process exit code for this error kind
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::OutOfMemory => -1,
            Error::FileNotFound(_) => -2,
            Error::InvalidWritePermissions(_) => -3,
            Error::NoDiskSpace => -4,
            Error::InvalidFileType(_) => -5,
            Error::InvalidCall(_) => -6,
            Error::InvalidData(_) | Error::Truncated { .. } => -7,
            Error::Internal(_) => -8,
            Error::FeatureNotSupported(_) => -9,
            Error::PartialFailure => -10,
            Error::BadVersion(_) => -11,
            Error::FileOverflow => -12,
            Error::FileWriteError(_) => -13,
            Error::BadFormat(_) => -14,
            Error::UnsupportedSize(_) => -15,
        }
    }
}
