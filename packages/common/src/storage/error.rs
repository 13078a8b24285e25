use std::fmt;

/// Errors that can occur while publishing artifacts.
#[derive(Debug)]
pub enum StorageError {
    /// The object key is empty or would escape the store's namespace.
    InvalidKey(String),
    /// An I/O error occurred.
    Io(std::io::Error),
    /// The store is misconfigured (bad region, missing credentials, ...).
    Config(String),
    /// The backend could not be reached or returned a transport error.
    Backend(String),
    /// The backend answered but refused the object.
    Rejected { status: u16 },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKey(key) => write!(f, "invalid object key: {key:?}"),
            Self::Io(err) => write!(f, "storage IO error: {err}"),
            Self::Config(msg) => write!(f, "storage misconfigured: {msg}"),
            Self::Backend(msg) => write!(f, "storage backend error: {msg}"),
            Self::Rejected { status } => write!(f, "storage backend rejected upload ({status})"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
