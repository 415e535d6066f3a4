use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_yml::Value;

use crate::resolver::{ensure_directory, optional_bool};
use crate::{ConfigError, DirectoryKind, Scope, path};

/// The directory inside the install directory where modpacks live.
pub const MODPACKS_DIRECTORY: &str = "modpacks";

/// A validated, named **modpack**.
///
/// Its [`dir`](Self::dir) was verified to be an existing directory when the
/// descriptor was resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[must_use]
pub struct ModPackDescriptor {
    name: String,
    #[serde(rename = "symlink")]
    use_symlink: bool,
    #[serde(rename = "directory")]
    dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    mods: Option<Vec<String>>,
}

impl ModPackDescriptor {
    pub const DIRECTORY_KEY: &str = "directory";
    pub const SYMLINK_KEY: &str = "symlink";
    pub const MODS_KEY: &str = "mods";

    /// Resolve the modpack entry `name: entry` found under `modpacks`.
    ///
    /// `default_symlink` is used unless the entry sets `symlink` itself.
    pub(crate) fn resolve(
        name: String,
        entry: &Value,
        install_dir: &Path,
        default_symlink: bool,
    ) -> Result<Self, ConfigError> {
        let scope = Scope::ModPack(name.clone());
        if !(entry.is_mapping() || entry.is_null()) {
            return Err(ConfigError::InvalidValue {
                key: Self::DIRECTORY_KEY,
                scope,
                expected: "set inside a mapping",
            });
        }

        let use_symlink =
            optional_bool(entry, Self::SYMLINK_KEY, &scope)?.unwrap_or(default_symlink);

        let directory = entry
            .get(Self::DIRECTORY_KEY)
            .ok_or_else(|| ConfigError::MissingKey {
                key: Self::DIRECTORY_KEY,
                scope: scope.clone(),
            })?
            .as_str()
            .ok_or_else(|| ConfigError::InvalidValue {
                key: Self::DIRECTORY_KEY,
                scope: scope.clone(),
                expected: "a path",
            })?;
        let joined = install_dir.join(MODPACKS_DIRECTORY).join(directory);
        let dir = path::resolve(joined.to_string_lossy());
        ensure_directory(DirectoryKind::ModPack, &dir)?;

        let mods = match entry.get(Self::MODS_KEY) {
            None | Some(Value::Null) => None,
            Some(Value::Sequence(mods)) => Some(
                mods.iter()
                    .map(|entry| entry.as_str().map(str::to_owned))
                    .collect::<Option<Vec<_>>>()
                    .ok_or(ConfigError::InvalidValue {
                        key: Self::MODS_KEY,
                        scope: scope.clone(),
                        expected: "a list of mod names",
                    })?,
            ),
            Some(_) => {
                return Err(ConfigError::InvalidValue {
                    key: Self::MODS_KEY,
                    scope,
                    expected: "a list of mod names",
                });
            }
        };

        Ok(Self {
            name,
            use_symlink,
            dir,
            mods,
        })
    }

    /// The key this modpack was declared under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The effective link policy, with the configuration default folded in.
    #[must_use]
    pub const fn use_symlink(&self) -> bool {
        self.use_symlink
    }

    pub const fn link_mode(&self) -> LinkMode {
        match self.use_symlink {
            true => LinkMode::Symlink,
            false => LinkMode::Copy,
        }
    }

    /// The mod allow-list. Parsed, but not yet used when swapping.
    #[must_use]
    pub fn mods(&self) -> Option<&[String]> {
        self.mods.as_deref()
    }
}

/// How a modpack's entries end up in the mods directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[must_use]
pub enum LinkMode {
    /// Symlink each entry back to the modpack directory.
    #[strum(to_string = "link")]
    Symlink,
    /// Copy each entry's bytes and metadata.
    #[strum(to_string = "copy")]
    Copy,
}
