use std::fs::{self, DirEntry};
use std::io;
use std::path::{self, Path};

use fmps_config::{Configuration, LinkMode, ModPackDescriptor};
use itertools::Itertools;
use tracing::instrument;
use walkdir::WalkDir;

use crate::{Action, EntryOutcome, FilesystemError, Phase, Report, SwapError, SwapEvent};

/// Swaps the live mods directory of a [`Configuration`] for a modpack.
///
/// There is no locking whatsoever: two engines working on the same mods
/// directory at once will make a mess of it.
#[derive(Debug, Clone, Copy)]
#[must_use]
pub struct SwapEngine<'config> {
    config: &'config Configuration,
}

impl<'config> SwapEngine<'config> {
    pub const fn new(config: &'config Configuration) -> Self {
        Self { config }
    }

    /// Same as [`Self::swap_with`], minus the running commentary.
    pub fn swap(&self, selected: &ModPackDescriptor) -> Result<Report, SwapError> {
        self.swap_with(selected, |_| {})
    }

    /// Back up the mods directory and repopulate it from `selected`.
    ///
    /// 1. The backup directory is removed (if present) and created empty.
    /// 2. Every entry of the mods directory is moved into the backup.
    /// 3. Every entry of the modpack directory is symlinked or copied into the
    ///    mods directory, depending on [`ModPackDescriptor::link_mode`].
    ///
    /// `observer` sees every [`SwapEvent`] as it happens. Failures of single
    /// entries are only reported, and the swap moves on to the next one.
    ///
    /// # Errors
    ///
    /// Returns a [`SwapError`] if the backup directory can't be cleared or
    /// created, if the mods directory can't be recreated, or if the modpack
    /// directory can't be listed. Steps that already ran are not undone, and
    /// none of this is crash-safe: a removed backup is gone before the new
    /// one is filled.
    #[instrument(skip_all, fields(modpack = selected.name(), mode = %selected.link_mode()))]
    pub fn swap_with<F>(
        &self,
        selected: &ModPackDescriptor,
        mut observer: F,
    ) -> Result<Report, SwapError>
    where
        F: FnMut(SwapEvent<'_>),
    {
        let mut report = Report::new(selected.name(), selected.link_mode());

        observer(SwapEvent::PhaseStarted(Phase::BackingUp));
        self.reset_backup()?;

        observer(SwapEvent::PhaseStarted(Phase::Evacuating));
        self.evacuate(&mut report, &mut observer);

        observer(SwapEvent::PhaseStarted(Phase::Populating));
        self.populate(selected, &mut report, &mut observer)?;

        tracing::info!(
            evacuated = report.evacuated.len(),
            populated = report.populated.len(),
            failed = report.failures().count(),
            "Done"
        );
        Ok(report)
    }

    fn reset_backup(&self) -> Result<(), SwapError> {
        let backup_dir = self.config.backup_dir();
        tracing::info!(?backup_dir, "Backing up the mods directory");

        let removal = match fs::symlink_metadata(backup_dir) {
            Ok(metadata) if metadata.is_dir() => fs::remove_dir_all(backup_dir),
            Ok(_) => fs::remove_file(backup_dir),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error),
        };
        removal.map_err(|source| SwapError::RemoveBackup {
            source,
            path: backup_dir.to_path_buf(),
        })?;

        fs::create_dir(backup_dir).map_err(|source| SwapError::CreateBackup {
            source,
            path: backup_dir.to_path_buf(),
        })
    }

    fn evacuate(&self, report: &mut Report, observer: &mut impl FnMut(SwapEvent<'_>)) {
        let mods_dir = self.config.mods_dir();
        let (entries, unlisted) = match sorted_entries(mods_dir) {
            Ok(listing) => listing,
            Err(error) => {
                let error = FilesystemError::from_io(&error, mods_dir);
                tracing::warn!(%error, "Nothing to evacuate");
                observer(SwapEvent::ModsMissing(&error));
                report.mods_missing = Some(error);
                return;
            }
        };
        record_unlisted(mods_dir, unlisted, report, observer);

        for entry in entries {
            let destination = self.config.backup_dir().join(entry.file_name());
            let result = move_entry(&entry.path(), &destination)
                .map(|()| Action::Moved { to: destination });
            record(&mut report.evacuated, Phase::Evacuating, &entry, result, observer);
        }
    }

    fn populate(
        &self,
        selected: &ModPackDescriptor,
        report: &mut Report,
        observer: &mut impl FnMut(SwapEvent<'_>),
    ) -> Result<(), SwapError> {
        let mods_dir = self.config.mods_dir();
        if !mods_dir.is_dir() {
            fs::create_dir_all(mods_dir).map_err(|source| SwapError::CreateMods {
                source,
                path: mods_dir.to_path_buf(),
            })?;
        }

        let (entries, unlisted) =
            sorted_entries(selected.dir()).map_err(|source| SwapError::ReadModPack {
                source,
                path: selected.dir().to_path_buf(),
            })?;
        record_unlisted(selected.dir(), unlisted, report, observer);

        for entry in entries {
            let source = entry.path();
            let destination = mods_dir.join(entry.file_name());
            let result = match selected.link_mode() {
                LinkMode::Symlink => link_entry(&source, &destination),
                LinkMode::Copy => copy_entry(&source, &destination),
            };
            record(&mut report.populated, Phase::Populating, &entry, result, observer);
        }
        Ok(())
    }
}

fn record(
    outcomes: &mut Vec<EntryOutcome>,
    phase: Phase,
    entry: &DirEntry,
    result: Result<Action, FilesystemError>,
    observer: &mut impl FnMut(SwapEvent<'_>),
) {
    let outcome = EntryOutcome {
        phase,
        name: entry.file_name(),
        result,
    };
    match &outcome.result {
        Ok(action) => tracing::debug!(%phase, name = ?outcome.name, %action),
        Err(error) => tracing::warn!(%phase, name = ?outcome.name, %error, "Skipping an entry"),
    }
    observer(SwapEvent::Entry(&outcome));
    outcomes.push(outcome);
}

fn record_unlisted(
    directory: &Path,
    unlisted: Vec<io::Error>,
    report: &mut Report,
    observer: &mut impl FnMut(SwapEvent<'_>),
) {
    for error in unlisted {
        let error = FilesystemError::from_io(&error, directory);
        tracing::warn!(%error, "Skipping an unreadable entry");
        observer(SwapEvent::Unlisted(&error));
        report.unlisted.push(error);
    }
}

/// Directory entries sorted by file name, so the log reads the same each time.
/// Entries that fail to be read come back separately.
fn sorted_entries(directory: &Path) -> io::Result<(Vec<DirEntry>, Vec<io::Error>)> {
    Ok(split_listing(fs::read_dir(directory)?, DirEntry::file_name))
}

fn split_listing<T, K: Ord>(
    listing: impl IntoIterator<Item = io::Result<T>>,
    key: impl FnMut(&T) -> K,
) -> (Vec<T>, Vec<io::Error>) {
    let (entries, errors): (Vec<_>, Vec<_>) = listing.into_iter().partition_result();
    let entries = entries.into_iter().sorted_unstable_by_key(key).collect_vec();
    (entries, errors)
}

fn move_entry(source: &Path, destination: &Path) -> Result<(), FilesystemError> {
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == io::ErrorKind::CrossesDevices => {
            copy_across(source, destination)?;
            remove_entry(source)
        }
        Err(error) => Err(FilesystemError::from_io(&error, source)),
    }
}

/// The copying half of a cross-device move. Symlinks stay symlinks.
fn copy_across(source: &Path, destination: &Path) -> Result<(), FilesystemError> {
    let metadata =
        fs::symlink_metadata(source).map_err(|error| FilesystemError::from_io(&error, source))?;
    if metadata.file_type().is_symlink() {
        let target =
            fs::read_link(source).map_err(|error| FilesystemError::from_io(&error, source))?;
        symlink(&target, destination)
            .map_err(|error| FilesystemError::from_io(&error, destination))
    } else {
        copy_entry(source, destination).map(drop)
    }
}

fn remove_entry(path: &Path) -> Result<(), FilesystemError> {
    let metadata =
        fs::symlink_metadata(path).map_err(|error| FilesystemError::from_io(&error, path))?;
    let removal = match metadata.is_dir() {
        true => fs::remove_dir_all(path),
        false => fs::remove_file(path),
    };
    removal.map_err(|error| FilesystemError::from_io(&error, path))
}

fn link_entry(source: &Path, link: &Path) -> Result<Action, FilesystemError> {
    // A dangling source would still link fine, so check it first.
    fs::metadata(source).map_err(|error| FilesystemError::from_io(&error, source))?;
    let target =
        path::absolute(source).map_err(|error| FilesystemError::from_io(&error, source))?;
    symlink(&target, link).map_err(|error| FilesystemError::from_io(&error, link))?;
    Ok(Action::Linked {
        link: link.to_path_buf(),
        target,
    })
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    if target.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    }
}

fn copy_entry(source: &Path, destination: &Path) -> Result<Action, FilesystemError> {
    let metadata =
        fs::metadata(source).map_err(|error| FilesystemError::from_io(&error, source))?;

    if metadata.is_dir() {
        match copy_dir::copy_dir(source, destination) {
            Err(error) => return Err(FilesystemError::from_io(&error, destination)),
            Ok(error_list) if !error_list.is_empty() => {
                return Err(FilesystemError::Other {
                    path: destination.to_path_buf(),
                    message: format!("{} nested entries could not be copied", error_list.len()),
                });
            }
            Ok(_) => {}
        }
        preserve_tree_times(source, destination)
            .map_err(|error| kept_copy(&error, destination))?;
    } else {
        // `fs::copy` would silently overwrite it.
        if fs::symlink_metadata(destination).is_ok() {
            return Err(FilesystemError::Other {
                path: destination.to_path_buf(),
                message: "Destination already exists".into(),
            });
        }
        fs::copy(source, destination)
            .map_err(|error| FilesystemError::from_io(&error, destination))?;
        preserve_times(&metadata, destination).map_err(|error| kept_copy(&error, destination))?;
    }

    Ok(Action::Copied {
        to: destination.to_path_buf(),
    })
}

/// The bytes made it, so the copy stays, but the entry still counts as failed.
fn kept_copy(error: &io::Error, destination: &Path) -> FilesystemError {
    FilesystemError::Other {
        path: destination.to_path_buf(),
        message: format!(
            "Copied, but failed to keep the timestamps ({error}), the copy was left in place"
        ),
    }
}

/// [`preserve_times`] for everything below `source`. Contents go first, since
/// touching them would bump the modification time of their directory.
fn preserve_tree_times(source: &Path, destination: &Path) -> io::Result<()> {
    for entry in WalkDir::new(source).contents_first(true) {
        let entry = entry?;
        let file_type = entry.file_type();
        // Directories can't be opened like files on Windows.
        if file_type.is_symlink() || (cfg!(windows) && file_type.is_dir()) {
            continue;
        }
        let relative = entry.path().strip_prefix(source).map_err(io::Error::other)?;
        preserve_times(&entry.metadata()?, &destination.join(relative))?;
    }
    Ok(())
}

/// `fs::copy` keeps the permissions, but not the timestamps.
fn preserve_times(metadata: &fs::Metadata, destination: &Path) -> io::Result<()> {
    let mut times = fs::FileTimes::new().set_modified(metadata.modified()?);
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    let file = if cfg!(windows) {
        fs::File::options().write(true).open(destination)?
    } else {
        fs::File::open(destination)?
    };
    file.set_times(times)
}
