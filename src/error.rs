//! Error types shared by the conversion core.
//!
//! A single enum carries every way a file can fail so that batch callers can
//! match on the failure instead of parsing messages.

use std::io;
use std::path::PathBuf;

use image::ImageError;

pub type Result<T> = std::result::Result<T, ConvertError>;

/// Why a conversion (or a whole batch) did not produce an output.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("{} is not an accepted input (extension: {extension:?})", path.display())]
    Unacceptable { path: PathBuf, extension: String },

    #[error("unknown target format: {0}")]
    UnknownTarget(String),

    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },

    #[error("no encoder available for {format} output")]
    UnsupportedTarget { format: String },

    #[error("failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Coarse grouping of [`ConvertError`] used for summaries and UI badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Rejected,
    Decode,
    Encode,
    FileSystem,
}

impl FailureKind {
    pub fn as_str(&self) -> &str {
        match self {
            FailureKind::Rejected => "rejected",
            FailureKind::Decode => "decode",
            FailureKind::Encode => "encode",
            FailureKind::FileSystem => "filesystem",
        }
    }
}

impl ConvertError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ConvertError::Unacceptable { .. } | ConvertError::UnknownTarget(_) => FailureKind::Rejected,
            ConvertError::Decode { .. } => FailureKind::Decode,
            ConvertError::UnsupportedTarget { .. } | ConvertError::Encode { .. } => FailureKind::Encode,
            ConvertError::Io { .. } => FailureKind::FileSystem,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ConvertError::Io { path: path.into(), source }
    }
}

impl From<ConvertError> for String {
    fn from(error: ConvertError) -> Self {
        error.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_group_variants() {
        let rejected = ConvertError::Unacceptable {
            path: PathBuf::from("a.txt"),
            extension: "txt".to_string(),
        };
        assert_eq!(rejected.kind(), FailureKind::Rejected);

        let unsupported = ConvertError::UnsupportedTarget { format: "heic".to_string() };
        assert_eq!(unsupported.kind(), FailureKind::Encode);

        let io = ConvertError::io("out", io::Error::other("disk full"));
        assert_eq!(io.kind(), FailureKind::FileSystem);
        assert_eq!(io.kind().as_str(), "filesystem");
    }

    #[test]
    fn messages_name_the_file() {
        let err = ConvertError::Unacceptable {
            path: PathBuf::from("notes.txt"),
            extension: "txt".to_string(),
        };
        let message: String = err.into();
        assert!(message.contains("notes.txt"));
        assert!(message.contains("\"txt\""));
    }
}
