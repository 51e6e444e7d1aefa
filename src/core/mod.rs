// Copyright 2025 bakri (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! src/core/mod.rs
//!
//! Keybinding engine core
//!
//! This module contains the data structures and algorithms that turn key
//! events into action calls:
//! - Key tables, aliases and event normalisation
//! - Spec parsing into steps with inferred phases
//! - The binding table and sequence progress tracking
//! - The dispatcher (`Engine`) and its injected clock
//! - Display hints and keystroke simulation
//!
//! Nothing here touches a UI toolkit or the file system, so every rule
//! can be unit tested with synthetic events and a manual clock.

pub mod display;
pub mod engine;
pub mod keys;
pub mod normalizer;
pub mod parser;
pub mod sequence;
pub mod simulate;
pub mod table;
pub mod timer;
pub mod types;

pub use engine::{DispatchOutcome, Engine};
pub use keys::{KeyTable, Platform};
pub use parser::{ParseError, ParsedCombo};
pub use timer::{Clock, ManualClock, SystemClock};
pub use types::*;

#[cfg(test)]
mod tests;
