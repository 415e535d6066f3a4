use std::path::{Path, PathBuf};
use std::{fs, io};

use serde_yml::Value;

use crate::{ConfigError, Configuration, build};

/// The config file looked up in the current directory by default.
pub const DEFAULT_CONFIG_FILE: &str = "fmps.yml";

#[derive(thiserror::Error, Debug)]
#[must_use]
pub enum LoadError {
    #[error("An I/O error occurred, path at fault: {path:?}")]
    Io { source: io::Error, path: PathBuf },

    #[error("Failed to deserialize the config file from YAML")]
    SerdeYml(#[from] serde_yml::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl LoadError {
    /// Whether this is the config file simply not being there.
    #[must_use]
    pub fn is_missing_file(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

impl Configuration {
    /// Read, decode and [`build`] the YAML config file at `path`.
    ///
    /// # Errors
    ///
    /// This function will return an error if `path` can't be read, if it does
    /// not hold valid YAML, or if [`build`] rejects the decoded tree.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let yml = fs::read_to_string(path).map_err(|source| LoadError::Io {
            source,
            path: path.to_path_buf(),
        })?;
        let raw: Value = serde_yml::from_str(&yml)?;
        Ok(build(&raw)?)
    }
}
