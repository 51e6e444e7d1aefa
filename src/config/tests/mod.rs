//! Config module tests
//!
//! Contains test suites for keymap loading:
//! - Keymap parsing (bind lines, flags, settings, variables)
//! - Keymap files on disk (tilde expansion, missing files)

#[cfg(test)]
mod file_tests;
