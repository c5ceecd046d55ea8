//! Contribution-margin scenario calculator.
//!
//! Re-exports [`margincalc_core`] and, with the `python` feature, builds the `_lib`
//! Python extension module.

pub use margincalc_core::*;

#[cfg(feature = "python")]
mod python;
