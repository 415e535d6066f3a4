//! The **mod swapping** procedure of fmps.
//!
//! A swap takes the live mods directory of a [`Configuration`], moves its
//! contents into the backup directory and repopulates it from the selected
//! [`ModPackDescriptor`], either by symlinking or by copying. See
//! [`SwapEngine::swap_with`] for the details.
//!
//! [`Configuration`]: fmps_config::Configuration
//! [`ModPackDescriptor`]: fmps_config::ModPackDescriptor

#![allow(clippy::missing_errors_doc)]

mod engine;
mod error;
mod report;
pub use engine::*;
pub use error::*;
pub use report::*;
