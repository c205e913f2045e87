//! Error types for signing configuration resolution

use droidsign_core::error::{Error, ErrorCode};
use std::path::PathBuf;
use thiserror::Error;

/// Result alias for this crate
pub type Result<T> = std::result::Result<T, SigningError>;

/// Errors raised while loading signing properties.
///
/// A missing properties file is not represented here: absence is reported
/// through [`crate::signing::PropertiesOrigin::Absent`].
#[derive(Error, Debug)]
pub enum SigningError {
    /// The file exists but is not valid UTF-8 text
    #[error("Malformed properties file {}: {source}", .path.display())]
    Malformed {
        /// File that was read
        path: PathBuf,
        /// Decoding failure
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// The file exists but could not be read
    #[error("Failed to read properties file {}: {source}", .path.display())]
    Io {
        /// File that could not be read
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },
}

impl SigningError {
    /// Path of the properties file that failed
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Malformed { path, .. } | Self::Io { path, .. } => path,
        }
    }
}

impl From<SigningError> for Error {
    fn from(err: SigningError) -> Self {
        match err {
            SigningError::Malformed { path, source } => {
                Error::malformed_config(&path, &source).with_source(source)
            }
            SigningError::Io { path, source } => {
                let code = match source.kind() {
                    std::io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
                    _ => ErrorCode::IoError,
                };
                Error::new(
                    code,
                    format!("Failed to read properties file {}: {}", path.display(), source),
                )
                .with_source(source)
            }
        }
    }
}
