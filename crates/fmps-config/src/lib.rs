//! Configuration side of **fmps**, the Factorio modpack swapper.
//!
//! ## What's being configured?
//!
//! A Factorio installation directory (the `config` key) holding a live `mods`
//! directory, a `backup` directory that gets overwritten on every swap and a
//! `modpacks` directory with one subdirectory per pack:
//!
//! ```not-rust
//! <config>/
//!     mods/
//!     backup/
//!     modpacks/
//!         vanilla/
//!         krastorio/
//! ```
//!
//! The YAML config file is decoded into a generic [`serde_yml::Value`] tree
//! first, and [`build`] turns that tree into a validated [`Configuration`].
//! Modpacks that fail validation are skipped (see [`Configuration::skipped`])
//! instead of failing the whole configuration.

#![allow(clippy::missing_errors_doc)]

use std::path::{Path, PathBuf};

use serde::Serialize;

mod error;
mod file;
mod modpack;
pub mod path;
mod resolver;
mod selection;
pub use error::*;
pub use file::*;
pub use modpack::*;
pub use resolver::*;
pub use selection::*;

/// The validated, top-level **configuration** of a single run.
///
/// Only [`build`] (or [`Configuration::load`]) can produce one, and nothing
/// can change it afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[must_use]
pub struct Configuration {
    #[serde(rename = "symlink")]
    use_symlink: bool,
    install_dir: PathBuf,
    mods_dir: PathBuf,
    backup_dir: PathBuf,
    modpacks: Vec<ModPackDescriptor>,
    #[serde(skip)]
    skipped: Vec<SkippedModPack>,
}

impl Configuration {
    /// The default link policy, inherited by modpacks that don't set their own.
    #[must_use]
    pub const fn use_symlink(&self) -> bool {
        self.use_symlink
    }

    #[must_use]
    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    /// The live mods directory, `<install_dir>/mods`.
    #[must_use]
    pub fn mods_dir(&self) -> &Path {
        &self.mods_dir
    }

    /// Where the previous contents of [`Self::mods_dir`] end up after a swap.
    /// Not guaranteed to exist.
    #[must_use]
    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// All resolved modpacks, in the order they appear in the config file.
    #[must_use]
    pub fn modpacks(&self) -> &[ModPackDescriptor] {
        &self.modpacks
    }

    /// Modpack entries that were dropped during resolution, with the reason.
    #[must_use]
    pub fn skipped(&self) -> &[SkippedModPack] {
        &self.skipped
    }

    /// Returns the first modpack called `name`, if there is one.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&ModPackDescriptor> {
        self.modpacks.iter().find(|modpack| modpack.name() == name)
    }
}

/// A modpack entry that did not make it into the [`Configuration`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedModPack {
    pub name: String,
    pub error: ConfigError,
}
