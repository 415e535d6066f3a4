use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

use fmps_config::LinkMode;

use crate::FilesystemError;

/// The steps of a swap, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum Phase {
    #[strum(to_string = "backing up")]
    BackingUp,
    #[strum(to_string = "evacuating")]
    Evacuating,
    #[strum(to_string = "populating")]
    Populating,
}

/// What happened to a single entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Moved out of the mods directory into the backup directory.
    Moved { to: PathBuf },
    /// Symlinked into the mods directory.
    Linked { link: PathBuf, target: PathBuf },
    /// Copied into the mods directory.
    Copied { to: PathBuf },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Moved { to } | Self::Copied { to } => write!(f, "{}", to.display()),
            Self::Linked { link, target } => {
                write!(f, "{} -> {}", link.display(), target.display())
            }
        }
    }
}

/// The outcome of processing one directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryOutcome {
    pub phase: Phase,
    /// The entry's file name.
    pub name: OsString,
    pub result: Result<Action, FilesystemError>,
}

impl EntryOutcome {
    #[must_use]
    pub const fn is_err(&self) -> bool {
        self.result.is_err()
    }
}

/// Something worth telling the user about while a swap is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapEvent<'a> {
    PhaseStarted(Phase),
    /// The mods directory couldn't be read, so there was nothing to evacuate.
    ModsMissing(&'a FilesystemError),
    /// An entry showed up in a directory listing, but could not be read.
    Unlisted(&'a FilesystemError),
    Entry(&'a EntryOutcome),
}

/// Everything a finished swap did, entry by entry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct Report {
    pub modpack: String,
    pub link_mode: LinkMode,
    /// Set if the mods directory could not be read when evacuating it.
    pub mods_missing: Option<FilesystemError>,
    /// Entries that could not even be listed, so they were left alone.
    pub unlisted: Vec<FilesystemError>,
    pub evacuated: Vec<EntryOutcome>,
    pub populated: Vec<EntryOutcome>,
}

impl Report {
    pub(crate) fn new(modpack: impl Into<String>, link_mode: LinkMode) -> Self {
        Self {
            modpack: modpack.into(),
            link_mode,
            mods_missing: None,
            unlisted: vec![],
            evacuated: vec![],
            populated: vec![],
        }
    }

    /// All entries that failed, evacuated ones first.
    pub fn failures(&self) -> impl Iterator<Item = &EntryOutcome> {
        self.evacuated
            .iter()
            .chain(&self.populated)
            .filter(|outcome| outcome.is_err())
    }

    /// Whether every single entry made it.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.mods_missing.is_none()
            && self.unlisted.is_empty()
            && self.failures().next().is_none()
    }
}
