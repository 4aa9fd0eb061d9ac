//! Output formatting for the goswap CLI.

use crate::style::Style;
use goswap_core::error::{Error, Fix};
use std::io::{self, Write};

/// Verbosity level for output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Only errors
    Silent,
    /// Summary line only
    Quiet,
    /// Normal output
    #[default]
    Normal,
    /// Verbose output
    Verbose,
}

impl Verbosity {
    /// Derive verbosity from `-q` count and `-v` flag.
    pub fn from_flags(quiet: u8, verbose: bool) -> Self {
        match (quiet, verbose) {
            (0, true) => Verbosity::Verbose,
            (0, false) => Verbosity::Normal,
            (1, _) => Verbosity::Quiet,
            _ => Verbosity::Silent,
        }
    }
}

/// Output handler for consistent CLI output.
///
/// Results go to stdout; status, hints and errors go to stderr.
#[derive(Debug, Clone, Default)]
pub struct Output {
    verbosity: Verbosity,
}

impl Output {
    /// Create an output handler with specified verbosity.
    pub fn with_verbosity(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    /// Whether spinners should be drawn.
    pub fn shows_progress(&self) -> bool {
        self.verbosity >= Verbosity::Normal
    }

    /// Print the one-line result of a command on stdout.
    pub fn result(&self, message: &str) {
        if self.verbosity >= Verbosity::Quiet {
            println!("{}", message);
        }
    }

    /// Print an info message.
    pub fn info(&self, message: &str) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("{}", message);
        }
    }

    /// Print a structured error with context and fixes.
    pub fn print_error(&self, error: &Error) {
        eprintln!("{}: {}", Style::error("error"), error);

        if let Some(path) = error.path() {
            eprintln!("  {} {}", Style::dim("-->"), path.display());
        }

        let mut source = std::error::Error::source(error);
        while let Some(cause) = source {
            eprintln!("  {} {}", Style::dim("caused by:"), cause);
            source = cause.source();
        }

        let fixes = error.fixes();
        if !fixes.is_empty() {
            eprintln!();
            for fix in fixes {
                self.print_fix(fix);
            }
        }
    }

    /// Print a fix suggestion.
    pub fn print_fix(&self, fix: &Fix) {
        eprintln!("{}: {}", Style::info("fix"), fix.description);
    }

    /// Flush stdout and stderr.
    pub fn flush(&self) {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(0, false), Verbosity::Normal);
        assert_eq!(Verbosity::from_flags(0, true), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(1, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(2, false), Verbosity::Silent);
    }

    #[test]
    fn test_progress_hidden_when_quiet() {
        assert!(Output::default().shows_progress());
        assert!(!Output::with_verbosity(Verbosity::Quiet).shows_progress());
    }
}
