//! Expansion and normalization of paths coming from the config file.
//!
//! Nothing here touches the filesystem, so a resolved path may very well not
//! exist. Checking that is up to the caller.

use std::env;
use std::path::{self, Component, Path, PathBuf};

/// Expand `$VAR`/`${VAR}` references and a leading `~`, then [`normalize`].
///
/// Unknown variables are kept as written, and so is `~` when there's no home
/// directory to expand it to.
#[must_use]
pub fn resolve(raw: impl AsRef<str>) -> PathBuf {
    let expanded = expand_home(&expand_vars(raw.as_ref()));
    normalize(Path::new(&expanded))
}

/// Lexically collapse `.` and `..` components and redundant separators.
///
/// A `..` that would climb above the root is dropped, one that would climb
/// above the start of a relative path is kept. An empty path becomes `.`.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = vec![];
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                Some(Component::ParentDir | Component::CurDir) | None => {
                    components.push(component);
                }
            },
            other => components.push(other),
        }
    }

    if components.is_empty() {
        return PathBuf::from(".");
    }
    components.into_iter().collect()
}

fn expand_vars(raw: &str) -> String {
    let mut expanded = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(dollar) = rest.find('$') {
        expanded.push_str(&rest[..dollar]);
        let after = &rest[dollar + 1..];
        let (name, consumed) = match after.strip_prefix('{') {
            Some(braced) => braced
                .find('}')
                .map_or(("", 0), |end| (&braced[..end], end + 2)),
            None => {
                let end = after
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                    .unwrap_or(after.len());
                (&after[..end], end)
            }
        };

        let value = (!name.is_empty())
            .then(|| env::var(name).ok())
            .flatten();
        match value {
            Some(value) => {
                expanded.push_str(&value);
                rest = &after[consumed..];
            }
            None => {
                expanded.push('$');
                rest = after;
            }
        }
    }
    expanded.push_str(rest);
    expanded
}

fn expand_home(path: &str) -> String {
    let Some(rest) = path.strip_prefix('~') else {
        return path.to_owned();
    };
    // `~user` is not supported.
    if !(rest.is_empty() || rest.starts_with(path::is_separator)) {
        return path.to_owned();
    }
    match dirs::home_dir() {
        Some(home) => format!("{}{rest}", home.display()),
        None => path.to_owned(),
    }
}
