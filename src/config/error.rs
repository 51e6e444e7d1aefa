use std::path::PathBuf;
use thiserror::Error;

use crate::core::parser::ParseError;

/// Errors that can occur while loading a keymap.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Keymap file does not exist.
    #[error("Keymap file not found: {0}")]
    NotFound(PathBuf),
    /// A line could not be parsed.
    #[error("Parse error on line {line}: {message}")]
    InvalidSyntax { line: usize, message: String },
    /// A `$variable` was used but never defined.
    #[error("Undefined variable '${variable}' on line {line}")]
    UndefinedVariable { variable: String, line: usize },
    /// A `set` line names an unknown setting or has a bad value.
    #[error("Invalid setting '{name}' on line {line}: {message}")]
    InvalidSetting {
        name: String,
        line: usize,
        message: String,
    },
    /// A binding spec was rejected by the combo parser.
    #[error("Invalid binding on line {line}: {source}")]
    InvalidSpec {
        line: usize,
        #[source]
        source: ParseError,
    },
    /// Generic I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
