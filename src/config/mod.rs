//! Engine settings and keymap files.
//!
//! This module provides everything needed to configure an engine from
//! outside the code:
//!
//! - **Settings**: `EngineConfig` (sequence timeout, settle delay, platform)
//! - **Keymap files**: named shortcuts and settings in a line-based format
//! - **Loading**: `KeymapFile` checks the path up front and parses on demand
//!
//! # Example
//!
//! ```no_run
//! use keytrap::config::KeymapFile;
//!
//! let file = KeymapFile::new("/home/user/.config/keytrap/keymap.conf".into())?;
//! let keymap = file.load()?;
//! println!("Loaded {} shortcuts", keymap.entries.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod keymap;
pub mod settings;

use std::fs;
use std::path::{Path, PathBuf};

pub use error::ConfigError;
pub use keymap::{parse_keymap, Keymap, KeymapEntry};
pub use settings::EngineConfig;

/// A keymap file on disk.
///
/// Construction validates that the file exists; reading and parsing
/// happen on every `load()` so edits are picked up.
#[derive(Debug)]
pub struct KeymapFile {
    /// Path to the keymap file.
    path: PathBuf,
}

impl KeymapFile {
    /// Creates a handle for the given keymap file.
    ///
    /// A leading `~` is expanded to the home directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the file doesn't exist.
    pub fn new(path: PathBuf) -> Result<Self, ConfigError> {
        let path = match path.to_str() {
            Some(raw) => PathBuf::from(shellexpand::tilde(raw).as_ref()),
            None => path,
        };

        if !path.exists() {
            return Err(ConfigError::NotFound(path));
        }

        // Symlinks are allowed, but worth a note
        if path.read_link().is_ok() {
            tracing::warn!(path = %path.display(), "keymap file is a symlink");
        }

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the raw keymap file content.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read.
    pub fn read(&self) -> Result<String, ConfigError> {
        Ok(fs::read_to_string(&self.path)?)
    }

    /// Reads and parses the keymap.
    pub fn load(&self) -> Result<Keymap, ConfigError> {
        let content = self.read()?;
        let keymap = parse_keymap(&content)?;

        tracing::info!(
            path = %self.path.display(),
            entries = keymap.entries.len(),
            "loaded keymap"
        );
        Ok(keymap)
    }
}

#[cfg(test)]
mod tests;
