//! # notenwerk
//!
//! Turns raw classroom measurements (slider scores, elapsed times, athletic
//! performances) into grades and points, and analyses corrected exams.
//!
//! Every operation is a synchronous function over borrowed inputs that
//! returns a fresh value; nothing here performs I/O or holds shared state.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Exam statistics and point adjustment suggestions
pub mod analysis;
/// Tagged grading configurations and environment settings
pub mod config;
/// A module defining a bunch of constant values to be used throughout
pub mod constants;
/// Error taxonomy shared by all graders
pub mod error;
/// For all things related to grading
pub mod grade;
/// Table renderings of grading and analysis results
pub mod report;
/// Rounding and descriptive statistics helpers
pub mod util;

pub use config::{GradingConfig, Measurement, Outcome, Settings};
pub use error::{GradingError, Result};
