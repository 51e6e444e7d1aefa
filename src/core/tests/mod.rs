//! Core module tests
//!
//! Contains test suites for core functionality:
//! - Spec parsing tests (phases, aliases, shifted keys)
//! - Binding table tests (ordering, replacement, removal)
//! - Engine dispatch tests (combos, sequences, timers, keyup suppression)

#[cfg(test)]
mod parser_tests;
