//! Shortcut registry tests
//!
//! Contains test suites for the named shortcut layer:
//! - Registration, replacement and removal
//! - Shared specs across several names
//! - Option handling (private, prevent_default, phase)

#[cfg(test)]
mod registry_tests;
