use std::fmt;
use std::path::PathBuf;

/// Everything that can be wrong with a configuration tree.
///
/// Whether one of these is fatal depends on where it comes from: at the top
/// level it aborts [`build`](crate::build), inside a modpack entry it only
/// gets that entry skipped.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum ConfigError {
    #[error("Missing key {key:?}{scope}")]
    MissingKey { key: &'static str, scope: Scope },

    #[error("Could not locate {kind} ({path:?})")]
    NotFound { kind: DirectoryKind, path: PathBuf },

    #[error("The {kind} ({path:?}) is not a directory")]
    NotADirectory { kind: DirectoryKind, path: PathBuf },

    #[error("Key {key:?}{scope} should be {expected}")]
    InvalidValue {
        key: &'static str,
        scope: Scope,
        expected: &'static str,
    },
}

/// Where in the configuration tree a key was looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    TopLevel,
    ModPack(String),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TopLevel => Ok(()),
            Self::ModPack(name) => write!(f, " in {name:?} in \"modpacks\""),
        }
    }
}

/// The directories a configuration requires to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum DirectoryKind {
    #[strum(to_string = "factorio config directory")]
    Install,
    #[strum(to_string = "mods directory")]
    Mods,
    #[strum(to_string = "modpack directory")]
    ModPack,
}
