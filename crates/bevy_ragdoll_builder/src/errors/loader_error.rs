use thiserror::Error;

/// Errors produced while reading skeleton or configuration files.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum LoaderError {
    /// An [IO](std::io) Error
    #[error("Could not read file: {0}")]
    Io(#[from] std::io::Error),
    /// A [RON](ron) Error
    #[error("Could not parse RON: {0}")]
    RonSpannedError(#[from] ron::error::SpannedError),
    #[error("Could not serialize RON: {0}")]
    RonError(#[from] ron::Error),
    #[error("Bone path {0:?} is not valid")]
    InvalidBonePath(String),
    #[error("Parent of bone {0:?} is not defined before it")]
    UnknownParent(String),
}
