//! Report destinations.

use crate::error::{Result, RuleError};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

/// Where a rule writes its report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputTarget {
    /// Process standard output.
    #[default]
    Stdout,
    /// Process standard error.
    Stderr,
    /// A file, created or truncated when opened.
    File(PathBuf),
}

impl OutputTarget {
    /// Resolves a configured `out` value: `""` and `"stdout"` map to standard
    /// output, `"stderr"` to standard error, anything else is a file path.
    pub fn parse(out: &str) -> Self {
        match out {
            "" | "stdout" => Self::Stdout,
            "stderr" => Self::Stderr,
            path => Self::File(PathBuf::from(path)),
        }
    }

    /// Opens the destination.
    pub fn open(&self) -> Result<Output> {
        match self {
            Self::Stdout => Ok(Output::Stdout),
            Self::Stderr => Ok(Output::Stderr),
            Self::File(path) => File::create(path)
                .map(Output::File)
                .map_err(|source| RuleError::OutputCreate {
                    path: path.clone(),
                    source,
                }),
        }
    }
}

/// An open report destination.
///
/// Standard streams take the process-wide lock for each `write_all`, and
/// formatters emit every line with a single `write_all`, so several rules can
/// share them without mixing partial lines. Files are never closed explicitly; the handle is
/// released when the owning rule is dropped.
#[derive(Debug)]
pub enum Output {
    /// Standard output.
    Stdout,
    /// Standard error.
    Stderr,
    /// An opened file.
    File(File),
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout => io::stdout().lock().write(buf),
            Self::Stderr => io::stderr().lock().write(buf),
            Self::File(file) => file.write(buf),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            Self::Stdout => io::stdout().lock().write_all(buf),
            Self::Stderr => io::stderr().lock().write_all(buf),
            Self::File(file) => file.write_all(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout => io::stdout().flush(),
            Self::Stderr => io::stderr().flush(),
            Self::File(file) => file.flush(),
        }
    }
}
