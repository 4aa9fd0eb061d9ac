//! Terminal UI helpers for goswap.
//!
//! This crate provides consistent output formatting, spinners and error
//! display for the goswap CLI.

pub mod output;
pub mod spinner;
pub mod style;

pub use output::{Output, Verbosity};
pub use spinner::Spinner;
pub use style::Style;
