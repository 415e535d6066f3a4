use std::num::IntErrorKind;

use crate::{Configuration, ModPackDescriptor};

/// What the user can type instead of a modpack number to leave.
pub const EXIT_TOKENS: [&str; 2] = ["exit", "quit"];

/// A valid answer to the "which modpack?" prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<'config> {
    Pack {
        index: usize,
        modpack: &'config ModPackDescriptor,
    },
    Exit,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("{input:?} is not a modpack number")]
    NotANumber { input: String },

    #[error("There is no modpack number {input}, there are only {available} of them")]
    OutOfRange { input: String, available: usize },
}

impl Configuration {
    /// Interpret `input` as either an exit token or an index into
    /// [`Self::modpacks`].
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::NotANumber`] for anything that is neither,
    /// and [`SelectionError::OutOfRange`] for indices past the last modpack.
    pub fn select(&self, input: &str) -> Result<Selection<'_>, SelectionError> {
        let input = input.trim();
        if EXIT_TOKENS
            .iter()
            .any(|token| token.eq_ignore_ascii_case(input))
        {
            return Ok(Selection::Exit);
        }

        let out_of_range = || SelectionError::OutOfRange {
            input: input.to_owned(),
            available: self.modpacks().len(),
        };
        let index = match input.parse::<usize>() {
            Ok(index) => index,
            Err(error) if *error.kind() == IntErrorKind::PosOverflow => {
                return Err(out_of_range());
            }
            Err(_) => {
                return Err(SelectionError::NotANumber {
                    input: input.to_owned(),
                });
            }
        };

        self.modpacks()
            .get(index)
            .map(|modpack| Selection::Pack { index, modpack })
            .ok_or_else(out_of_range)
    }
}
