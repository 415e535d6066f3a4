use std::fs;
use std::path::Path;

use serde_yml::{Mapping, Value};
use tracing::instrument;

use crate::{
    ConfigError, Configuration, DirectoryKind, ModPackDescriptor, Scope, SkippedModPack, path,
};

pub const SYMLINK_KEY: &str = "symlink";
pub const CONFIG_KEY: &str = "config";
pub const MODPACKS_KEY: &str = "modpacks";

/// The live mods directory, relative to the install directory.
pub const MODS_DIRECTORY: &str = "mods";
/// The backup directory, relative to the install directory.
pub const BACKUP_DIRECTORY: &str = "backup";

/// The link policy used when neither the config nor the modpack sets one.
pub const DEFAULT_USE_SYMLINK: bool = true;

/// Build a validated [`Configuration`] out of a decoded config tree.
///
/// # Errors
///
/// Fails if `config` or `modpacks` is missing, if the install directory or
/// its `mods` subdirectory does not exist (or isn't a directory), or if a
/// top-level key holds a value of the wrong type. Broken modpack entries
/// are not errors: they get logged, skipped and listed in
/// [`Configuration::skipped`].
#[instrument(level = "debug", skip_all)]
pub fn build(raw: &Value) -> Result<Configuration, ConfigError> {
    let use_symlink =
        optional_bool(raw, SYMLINK_KEY, &Scope::TopLevel)?.unwrap_or(DEFAULT_USE_SYMLINK);

    let install_dir = raw
        .get(CONFIG_KEY)
        .ok_or(ConfigError::MissingKey {
            key: CONFIG_KEY,
            scope: Scope::TopLevel,
        })?
        .as_str()
        .ok_or(ConfigError::InvalidValue {
            key: CONFIG_KEY,
            scope: Scope::TopLevel,
            expected: "a path",
        })?;
    let install_dir = path::resolve(install_dir);
    ensure_directory(DirectoryKind::Install, &install_dir)?;
    tracing::debug!(?install_dir, "Resolved the install directory");

    let mods_dir = install_dir.join(MODS_DIRECTORY);
    ensure_directory(DirectoryKind::Mods, &mods_dir)?;
    let backup_dir = install_dir.join(BACKUP_DIRECTORY);

    let entries = match raw.get(MODPACKS_KEY) {
        None => {
            return Err(ConfigError::MissingKey {
                key: MODPACKS_KEY,
                scope: Scope::TopLevel,
            });
        }
        Some(Value::Null) => None,
        Some(Value::Mapping(entries)) => Some(entries),
        Some(_) => {
            return Err(ConfigError::InvalidValue {
                key: MODPACKS_KEY,
                scope: Scope::TopLevel,
                expected: "a mapping of modpack names to modpacks",
            });
        }
    };

    let mut modpacks = vec![];
    let mut skipped = vec![];
    for (key, entry) in entries.into_iter().flat_map(Mapping::iter) {
        let name = entry_name(key);
        match ModPackDescriptor::resolve(name.clone(), entry, &install_dir, use_symlink) {
            Ok(modpack) => {
                tracing::debug!(modpack = %name, dir = ?modpack.dir(), "Resolved a modpack");
                modpacks.push(modpack);
            }
            Err(error) => {
                tracing::warn!(modpack = %name, %error, "Skipping a misconfigured modpack");
                skipped.push(SkippedModPack { name, error });
            }
        }
    }

    Ok(Configuration {
        use_symlink,
        install_dir,
        mods_dir,
        backup_dir,
        modpacks,
        skipped,
    })
}

impl TryFrom<&Value> for Configuration {
    type Error = ConfigError;

    fn try_from(raw: &Value) -> Result<Self, Self::Error> {
        build(raw)
    }
}

/// Look up an optional boolean `key` in `table`.
pub(crate) fn optional_bool(
    table: &Value,
    key: &'static str,
    scope: &Scope,
) -> Result<Option<bool>, ConfigError> {
    match table.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(value)) => Ok(Some(*value)),
        Some(_) => Err(ConfigError::InvalidValue {
            key,
            scope: scope.clone(),
            expected: "either true or false",
        }),
    }
}

/// Make sure `path` exists and is a directory, following symlinks.
pub(crate) fn ensure_directory(kind: DirectoryKind, path: &Path) -> Result<(), ConfigError> {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(ConfigError::NotADirectory {
            kind,
            path: path.to_path_buf(),
        }),
        Err(_) => Err(ConfigError::NotFound {
            kind,
            path: path.to_path_buf(),
        }),
    }
}

/// YAML happily accepts `1:` or `true:` as keys, so stringify those.
fn entry_name(key: &Value) -> String {
    match key {
        Value::String(name) => name.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(boolean) => boolean.to_string(),
        other => serde_yml::to_string(other)
            .map(|repr| repr.trim_end().to_owned())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use serde_yml::Value;

    use super::{build, entry_name, optional_bool};
    use crate::{ConfigError, Scope};

    #[test]
    fn non_string_keys_are_stringified() {
        assert_eq!(entry_name(&Value::from(7)), "7");
        assert_eq!(entry_name(&Value::Bool(false)), "false");
        assert_eq!(entry_name(&Value::from("vanilla")), "vanilla");
    }

    #[test]
    fn booleans_must_be_booleans() {
        let table: Value = serde_yml::from_str("symlink: \"yes\"").unwrap();
        assert!(matches!(
            optional_bool(&table, "symlink", &Scope::TopLevel),
            Err(ConfigError::InvalidValue { key: "symlink", .. })
        ));
        let table: Value = serde_yml::from_str("symlink: false").unwrap();
        assert_eq!(
            optional_bool(&table, "symlink", &Scope::TopLevel),
            Ok(Some(false))
        );
        assert_eq!(optional_bool(&Value::Null, "symlink", &Scope::TopLevel), Ok(None));
    }

    #[test]
    fn empty_tree_is_missing_config() {
        assert_eq!(
            build(&Value::Null),
            Err(ConfigError::MissingKey {
                key: "config",
                scope: Scope::TopLevel
            })
        );
    }
}
