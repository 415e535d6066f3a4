//! The interactive side of fmps: the modpack menu, confirmation and the
//! running log of a swap.

use color_eyre::eyre::Report;
use color_eyre::owo_colors::OwoColorize;
use eyre::Context;
use fmps_config::{Configuration, LinkMode, ModPackDescriptor, Selection};
use fmps_swap::{Phase, SwapEngine, SwapEvent};
use inquire::InquireError;

/// Show the menu until a modpack gets loaded or the user leaves.
pub fn run(config: &Configuration) -> Result<(), Report> {
    loop {
        println!("Select modpack to load:");
        for (index, modpack) in config.modpacks().iter().enumerate() {
            println!("{index}: {}", modpack.name());
        }

        let Some(input) = prompt(inquire::Text::new(
            "Select a modpack to load or type exit to quit:",
        ))
        .wrap_err("Failed to prompt for a modpack")?
        else {
            return Ok(());
        };

        match config.select(&input) {
            Ok(Selection::Exit) => return Ok(()),
            Ok(Selection::Pack { modpack, .. }) => {
                if confirm(modpack)? {
                    return swap(config, modpack);
                }
            }
            Err(error) => eprintln!("{} {error}", "[INVALID]".yellow().bold()),
        }
    }
}

/// Ask whether `modpack` should really be loaded. Defaults to yes.
pub fn confirm(modpack: &ModPackDescriptor) -> Result<bool, Report> {
    println!("Loading '{}'", modpack.name().green());
    let confirmed = prompt(inquire::Confirm::new("continue?").with_default(true))
        .wrap_err("Failed to prompt for confirmation")?;
    Ok(confirmed.unwrap_or(false))
}

/// Swap to `modpack`, printing every step as it happens.
pub fn swap(config: &Configuration, modpack: &ModPackDescriptor) -> Result<(), Report> {
    let report = SwapEngine::new(config)
        .swap_with(modpack, |event| match event {
            SwapEvent::PhaseStarted(Phase::BackingUp) => {
                println!("Backing up mods directory to {}", config.backup_dir().display());
            }
            SwapEvent::PhaseStarted(Phase::Evacuating) => {}
            SwapEvent::PhaseStarted(Phase::Populating) => match modpack.link_mode() {
                LinkMode::Symlink => println!("Linking files"),
                LinkMode::Copy => println!("Copying files"),
            },
            SwapEvent::ModsMissing(error) | SwapEvent::Unlisted(error) => {
                eprintln!("{} {error}", "[WARNING]".yellow().bold());
            }
            SwapEvent::Entry(outcome) => match &outcome.result {
                Ok(action) => println!(
                    "{name} -> {action}",
                    name = outcome.name.to_string_lossy().bold(),
                    action = action.dimmed(),
                ),
                Err(error) => eprintln!(
                    "{} {name}: {error}",
                    "[FAILED]".red().bold(),
                    name = outcome.name.to_string_lossy().bold(),
                ),
            },
        })
        .wrap_err_with(|| format!("Failed to load {:?}", modpack.name()))?;

    let failed = report.failures().count();
    match failed {
        0 => println!("Loaded '{}'", report.modpack.green()),
        _ => println!(
            "Loaded '{}', {} entries failed",
            report.modpack.yellow(),
            failed.red().bold()
        ),
    }
    Ok(())
}

/// Run a prompt, treating Esc and Ctrl-C as "no answer" rather than an error.
fn prompt<T>(prompt: impl Prompt<T>) -> Result<Option<T>, InquireError> {
    match prompt.ask() {
        Ok(answer) => Ok(Some(answer)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(error) => Err(error),
    }
}

trait Prompt<T> {
    fn ask(self) -> Result<T, InquireError>;
}

impl Prompt<String> for inquire::Text<'_> {
    fn ask(self) -> Result<String, InquireError> {
        self.prompt()
    }
}

impl Prompt<bool> for inquire::Confirm<'_> {
    fn ask(self) -> Result<bool, InquireError> {
        self.prompt()
    }
}
