use std::{io, sync::Arc};

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum KensakuError {
    /// Reading a posting, dictionary or bitmap file failed.
    #[error("File io error: '{0}'")]
    FileIo(Arc<io::Error>),
    /// On-disk data doesn't decode into a valid posting.
    #[error("Index collapsed: '{0}'")]
    IndexCollapsed(String),
    /// Configuration doesn't match the data or the reader types.
    #[error("Inconsistent config: '{0}'")]
    InconsistentConfig(String),
    /// Invalid argument was passed by the user.
    #[error("An invalid argument was passed: '{0}'")]
    InvalidArgument(String),
    #[error("Internal error: '{0}'")]
    InternalError(String),
}

pub type Result<T> = std::result::Result<T, KensakuError>;

impl From<io::Error> for KensakuError {
    fn from(io_err: io::Error) -> KensakuError {
        KensakuError::FileIo(Arc::new(io_err))
    }
}

impl From<serde_json::Error> for KensakuError {
    fn from(err: serde_json::Error) -> KensakuError {
        KensakuError::InvalidArgument(err.to_string())
    }
}

impl KensakuError {
    pub fn is_file_io(&self) -> bool {
        matches!(self, KensakuError::FileIo(_))
    }
}
