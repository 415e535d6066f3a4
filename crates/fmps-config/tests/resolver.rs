use std::fs;
use std::path::Path;

use color_eyre::eyre::Report;
use fmps_config::{
    ConfigError, Configuration, DirectoryKind, LinkMode, LoadError, Scope, Selection,
    SelectionError, build,
};
use rstest::{fixture, rstest};
use serde_yml::Value;
use tempdir::TempDir;

const TEMPDIR_PREFIX: &str = "fmps-config-test";

/// A scratch Factorio installation with an empty `mods` directory and two
/// modpacks, `vanilla` (empty) and `krastorio` (one mod).
#[derive(Debug)]
#[must_use]
pub struct Install {
    pub dir: TempDir,
}

impl Install {
    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn config(&self, rest: &str) -> Value {
        let yml = format!("config: '{}'\n{rest}", self.root().display());
        serde_yml::from_str(&yml).unwrap()
    }
}

#[fixture]
fn install() -> Install {
    (|| -> Result<Install, Box<dyn std::error::Error>> {
        let dir = TempDir::new(TEMPDIR_PREFIX)?;
        fs::create_dir(dir.path().join("mods"))?;
        fs::create_dir_all(dir.path().join("modpacks/vanilla"))?;
        fs::create_dir_all(dir.path().join("modpacks/krastorio"))?;
        fs::write(dir.path().join("modpacks/krastorio/k2.zip"), b"k2")?;
        Ok(Install { dir })
    })()
    .unwrap()
}

#[rstest]
fn resolves_every_valid_modpack(install: Install) -> Result<(), Report> {
    let raw = install.config(
        "
modpacks:
  vanilla:
    directory: vanilla
  krastorio:
    directory: ./krastorio
    symlink: false
    mods: [k2, flib]
",
    );
    let config = build(&raw)?;

    assert!(config.use_symlink());
    assert_eq!(config.mods_dir(), install.root().join("mods"));
    assert_eq!(config.backup_dir(), install.root().join("backup"));
    assert!(config.skipped().is_empty());

    let names: Vec<_> = config.modpacks().iter().map(|pack| pack.name()).collect();
    assert_eq!(names, ["vanilla", "krastorio"]);

    let vanilla = &config.modpacks()[0];
    assert_eq!(vanilla.dir(), install.root().join("modpacks/vanilla"));
    assert_eq!(vanilla.link_mode(), LinkMode::Symlink);
    assert_eq!(vanilla.mods(), None);

    let krastorio = &config.modpacks()[1];
    assert_eq!(krastorio.dir(), install.root().join("modpacks/krastorio"));
    assert_eq!(krastorio.link_mode(), LinkMode::Copy);
    assert_eq!(
        krastorio.mods(),
        Some(["k2".to_owned(), "flib".to_owned()].as_slice())
    );
    Ok(())
}

#[rstest]
fn modpacks_inherit_the_default_link_policy(install: Install) -> Result<(), Report> {
    let raw = install.config(
        "
symlink: false
modpacks:
  vanilla: { directory: vanilla }
  krastorio: { directory: krastorio, symlink: true }
",
    );
    let config = build(&raw)?;
    assert!(!config.use_symlink());
    assert!(!config.modpacks()[0].use_symlink());
    assert!(config.modpacks()[1].use_symlink());
    Ok(())
}

#[rstest]
fn broken_modpacks_are_skipped(install: Install) -> Result<(), Report> {
    let raw = install.config(
        "
modpacks:
  vanilla:
    directory: vanilla
  broken:
    directory: ./modpacks/missing
",
    );
    let config = build(&raw)?;

    assert_eq!(config.modpacks().len(), 1);
    assert_eq!(config.modpacks()[0].name(), "vanilla");
    assert_eq!(config.skipped().len(), 1);
    assert_eq!(config.skipped()[0].name, "broken");
    assert!(matches!(
        config.skipped()[0].error,
        ConfigError::NotFound {
            kind: DirectoryKind::ModPack,
            ..
        }
    ));
    Ok(())
}

#[rstest]
fn every_kind_of_broken_modpack_is_skipped(install: Install) -> Result<(), Report> {
    fs::write(install.root().join("modpacks/not-a-dir.zip"), b"")?;
    let raw = install.config(
        "
modpacks:
  no-directory: { symlink: true }
  empty:
  file: { directory: not-a-dir.zip }
  wrong-symlink: { directory: vanilla, symlink: sometimes }
  wrong-mods: { directory: vanilla, mods: k2 }
  scalar: vanilla
  krastorio: { directory: krastorio }
",
    );
    let config = build(&raw)?;

    assert_eq!(config.modpacks().len(), 1);
    assert_eq!(config.modpacks()[0].name(), "krastorio");

    let errors: Vec<_> = config
        .skipped()
        .iter()
        .map(|skipped| (skipped.name.as_str(), &skipped.error))
        .collect();
    assert_eq!(errors.len(), 6);
    assert_eq!(
        errors[0],
        (
            "no-directory",
            &ConfigError::MissingKey {
                key: "directory",
                scope: Scope::ModPack("no-directory".into()),
            }
        )
    );
    assert!(matches!(errors[1].1, ConfigError::MissingKey { .. }));
    assert!(matches!(errors[2].1, ConfigError::NotADirectory { .. }));
    assert!(matches!(errors[3].1, ConfigError::InvalidValue { key: "symlink", .. }));
    assert!(matches!(errors[4].1, ConfigError::InvalidValue { key: "mods", .. }));
    assert!(matches!(errors[5].1, ConfigError::InvalidValue { .. }));
    Ok(())
}

#[rstest]
fn duplicate_directories_are_allowed(install: Install) -> Result<(), Report> {
    let raw = install.config(
        "
modpacks:
  vanilla: { directory: vanilla }
  also-vanilla: { directory: vanilla }
",
    );
    let config = build(&raw)?;
    assert_eq!(config.modpacks().len(), 2);
    assert_eq!(config.find("also-vanilla"), Some(&config.modpacks()[1]));
    assert_eq!(config.find("krastorio"), None);
    Ok(())
}

#[rstest]
fn missing_config_key_is_fatal() {
    let raw: Value = serde_yml::from_str("modpacks: {}").unwrap();
    assert_eq!(
        build(&raw),
        Err(ConfigError::MissingKey {
            key: "config",
            scope: Scope::TopLevel,
        })
    );
}

#[rstest]
fn missing_modpacks_key_is_fatal(install: Install) {
    let raw = install.config("symlink: true");
    assert_eq!(
        build(&raw),
        Err(ConfigError::MissingKey {
            key: "modpacks",
            scope: Scope::TopLevel,
        })
    );
}

#[rstest]
fn null_modpacks_means_no_modpacks(install: Install) -> Result<(), Report> {
    let config = build(&install.config("modpacks:"))?;
    assert!(config.modpacks().is_empty());
    Ok(())
}

#[rstest]
fn missing_install_directory_is_fatal(install: Install) {
    let missing = install.root().join("nowhere");
    let raw: Value = serde_yml::from_str(&format!(
        "config: '{}'\nmodpacks: {{}}",
        missing.display()
    ))
    .unwrap();
    assert_eq!(
        build(&raw),
        Err(ConfigError::NotFound {
            kind: DirectoryKind::Install,
            path: missing,
        })
    );
}

#[rstest]
fn install_directory_must_be_a_directory(install: Install) -> Result<(), Report> {
    let file = install.root().join("factorio.exe");
    fs::write(&file, b"")?;
    let raw: Value = serde_yml::from_str(&format!("config: '{}'\nmodpacks: {{}}", file.display()))?;
    assert!(matches!(
        build(&raw),
        Err(ConfigError::NotADirectory {
            kind: DirectoryKind::Install,
            ..
        })
    ));
    Ok(())
}

#[rstest]
fn missing_mods_directory_is_fatal(install: Install) -> Result<(), Report> {
    fs::remove_dir(install.root().join("mods"))?;
    assert!(matches!(
        build(&install.config("modpacks: {}")),
        Err(ConfigError::NotFound {
            kind: DirectoryKind::Mods,
            ..
        })
    ));

    fs::write(install.root().join("mods"), b"")?;
    assert!(matches!(
        build(&install.config("modpacks: {}")),
        Err(ConfigError::NotADirectory {
            kind: DirectoryKind::Mods,
            ..
        })
    ));
    Ok(())
}

#[rstest]
fn install_directory_is_normalized(install: Install) -> Result<(), Report> {
    let raw: Value = serde_yml::from_str(&format!(
        "config: '{}/mods/../.'\nmodpacks: {{}}",
        install.root().display()
    ))?;
    let config = build(&raw)?;
    assert_eq!(config.install_dir(), install.root());
    Ok(())
}

#[rstest]
fn selection(install: Install) -> Result<(), Report> {
    let raw = install.config(
        "
modpacks:
  vanilla: { directory: vanilla }
  krastorio: { directory: krastorio }
",
    );
    let config = build(&raw)?;

    assert_eq!(config.select("exit"), Ok(Selection::Exit));
    assert_eq!(config.select(" QUIT \n"), Ok(Selection::Exit));
    assert_eq!(
        config.select("1"),
        Ok(Selection::Pack {
            index: 1,
            modpack: &config.modpacks()[1],
        })
    );
    assert_eq!(
        config.select("2"),
        Err(SelectionError::OutOfRange {
            input: "2".into(),
            available: 2,
        })
    );
    assert!(matches!(
        config.select("99999999999999999999999999"),
        Err(SelectionError::OutOfRange { .. })
    ));
    assert!(matches!(
        config.select("krastorio"),
        Err(SelectionError::NotANumber { .. })
    ));
    assert!(matches!(
        config.select("-1"),
        Err(SelectionError::NotANumber { .. })
    ));
    Ok(())
}

#[rstest]
fn load_from_file(install: Install) -> Result<(), Report> {
    let file = install.root().join("fmps.yml");
    fs::write(
        &file,
        format!(
            "config: '{}'\nmodpacks:\n  vanilla:\n    directory: vanilla\n",
            install.root().display()
        ),
    )?;
    let config = Configuration::load(&file)?;
    assert_eq!(config.modpacks().len(), 1);

    let error = Configuration::load(install.root().join("missing.yml")).unwrap_err();
    assert!(error.is_missing_file());

    fs::write(&file, "modpacks: [")?;
    assert!(matches!(
        Configuration::load(&file),
        Err(LoadError::SerdeYml(_))
    ));

    fs::write(&file, "modpacks: {}")?;
    assert!(matches!(
        Configuration::load(&file),
        Err(LoadError::Config(ConfigError::MissingKey { key: "config", .. }))
    ));
    Ok(())
}
