use std::io;
use std::path::{Path, PathBuf};

/// A recoverable error that affected a single entry of a swap.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum FilesystemError {
    #[error("No such file or directory: {path:?}")]
    NotFound { path: PathBuf },

    #[error("Permission denied: {path:?}")]
    PermissionDenied { path: PathBuf },

    #[error("{message}: {path:?}")]
    Other { path: PathBuf, message: String },
}

impl FilesystemError {
    /// Classify an I/O error that occurred while working on `path`.
    pub fn from_io(source: &io::Error, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Other {
                path,
                message: source.to_string(),
            },
        }
    }

    /// The path at fault.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound { path } | Self::PermissionDenied { path } | Self::Other { path, .. } => {
                path
            }
        }
    }
}

/// An error that aborted a swap halfway through.
///
/// Whatever the steps before it did stays done.
#[derive(thiserror::Error, Debug)]
pub enum SwapError {
    #[error("Failed to remove the previous backup at {path:?}")]
    RemoveBackup { source: io::Error, path: PathBuf },

    #[error("Failed to create the backup directory at {path:?}")]
    CreateBackup { source: io::Error, path: PathBuf },

    #[error("Failed to recreate the mods directory at {path:?}")]
    CreateMods { source: io::Error, path: PathBuf },

    #[error("Failed to read the modpack directory at {path:?}")]
    ReadModPack { source: io::Error, path: PathBuf },
}
