mod cli;
mod menu;

use std::io;
use std::path::Path;

use clap::{CommandFactory, Parser};
use cli::{OutputFormat, Subcommand};
use color_eyre::Section;
use color_eyre::eyre::Report;
use color_eyre::owo_colors::OwoColorize;
use eyre::{Context, OptionExt};
use fmps_config::{Configuration, LoadError, ModPackDescriptor};
use tracing::instrument;

use crate::cli::Options;

const EXAMPLE_CONFIG_URL: &str = "https://github.com/Chronophylos/FactorioModPackSwapper";

fn main() -> Result<(), Report> {
    let options = Options::parse();
    color_eyre::install()?;
    install_tracing()?;

    let status = run_with_options(options);
    if let Err(mut report) = status {
        if let Some(error) = report.downcast_ref::<LoadError>() {
            match error {
                error if error.is_missing_file() => {
                    report = report
                        .with_note(|| "No config file.")
                        .with_suggestion(|| {
                            format!("Checkout the example config at {EXAMPLE_CONFIG_URL}.")
                        });
                }
                LoadError::Io { .. } => {
                    report = report
                        .with_note(|| "fmps encountered an I/O error reading its config file.")
                        .with_suggestion(|| "Ensure you have permission to read it.");
                }
                LoadError::SerdeYml(_) => {
                    report = report
                        .with_note(|| "The config file is not valid YAML.")
                        .with_suggestion(|| {
                            format!("Compare it with the example config at {EXAMPLE_CONFIG_URL}.")
                        });
                }
                LoadError::Config(_) => {
                    report = report
                        .wrap_err(format!("{} Invalid configuration", "[ERROR]".red().bold()))
                        .with_note(|| "Nothing was changed on disk.");
                }
            }
        }

        return Err(report);
    }

    Ok(())
}

#[instrument(name = "action_handling", skip_all)]
fn run_with_options(options: Options) -> Result<(), Report> {
    match options.subcommand {
        None => {
            let config = load_config(&options.config)?;
            menu::run(&config)
        }

        Some(Subcommand::List { format }) => {
            let config = load_config(&options.config)?;
            match format {
                OutputFormat::Human => {
                    for (index, modpack) in config.modpacks().iter().enumerate() {
                        println!(
                            "{index}: {name} {mode} {dir}",
                            name = modpack.name().bold().green(),
                            mode = format!("[{}]", modpack.link_mode()).cyan(),
                            dir = modpack.dir().display().white(),
                        );
                    }
                }
                OutputFormat::Yaml => println!("{}", serde_yml::to_string(&config)?),
            }
            Ok(())
        }

        Some(Subcommand::Swap { ref modpack, yes }) => {
            let config = load_config(&options.config)?;
            let selected = find_modpack(&config, modpack)?;
            if yes || menu::confirm(selected)? {
                menu::swap(&config, selected)?;
            }
            Ok(())
        }

        Some(Subcommand::Completions { shell }) => {
            let mut command = Options::command();
            let bin_name = env!("CARGO_CRATE_NAME");
            let mut stdout = std::io::stdout();
            clap_complete::generate(shell, &mut command, bin_name, &mut stdout);
            Ok(())
        }
    }
}

/// Load the config file and print a warning for every skipped modpack.
fn load_config(path: &Path) -> Result<Configuration, LoadError> {
    let config = Configuration::load(path)?;
    for skipped in config.skipped() {
        eprintln!("{} {}", "[WARNING]".yellow().bold(), skipped.error.yellow());
    }
    Ok(config)
}

/// Find a modpack by name, or by its number in the menu.
fn find_modpack<'config>(
    config: &'config Configuration,
    modpack: &str,
) -> Result<&'config ModPackDescriptor, Report> {
    config
        .find(modpack)
        .or_else(|| {
            let index = modpack.trim().parse::<usize>().ok()?;
            config.modpacks().get(index)
        })
        .ok_or_eyre(format!("There is no modpack called {modpack:?}"))
        .with_suggestion(|| "Run `fmps list` to see the available modpacks.")
}

fn install_tracing() -> Result<(), Report> {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};
    let format_layer = fmt::layer().pretty().without_time().with_writer(io::stderr);
    let filter_layer =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("error"))?;
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(format_layer)
        .with(ErrorLayer::default())
        .try_init()
        .wrap_err("Failed to install the tracing subscriber")?;
    Ok(())
}
