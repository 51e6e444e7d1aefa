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

//! Keytrap
//!
//! A keyboard shortcut engine: bind actions to key specifications such as
//! `"mod+s"`, `"ctrl+alt+del"` or `"up up down down"`, feed it key events,
//! and it decides which actions fire.
//!
//! # Features
//!
//! - **Combos and sequences:** `+` joins keys into one step, whitespace
//!   joins steps into a sequence with an idle timeout
//! - **Phase inference:** Each step listens on press, down or up,
//!   whichever reports that key reliably
//! - **Named shortcuts:** Register, remove and list user-visible actions
//! - **Keymap files:** Shortcuts and settings in a line-based format
//! - **Deterministic time:** Timers run on an injected clock
//!
//! # Architecture
//!
//! - **`core`:** Engine, parser, key tables, sequence tracking, timers
//! - **`config`:** Engine settings and keymap files
//! - **`shortcuts`:** Named shortcut registry on top of one engine
//!
//! # Examples
//!
//! ## Binding a sequence
//!
//! ```
//! use keytrap::config::EngineConfig;
//! use keytrap::core::{action, Engine, EventResponse, KeyEvent, Phase};
//!
//! let mut engine = Engine::new(EngineConfig::default());
//! engine.bind("g i", action(|_, _| EventResponse::Default), None)?;
//!
//! engine.handle_key(&KeyEvent::new("g", Phase::Press));
//! let outcome = engine.handle_key(&KeyEvent::new("i", Phase::Press));
//! assert_eq!(outcome.fired, vec!["g i".to_string()]);
//! # Ok::<(), keytrap::core::ParseError>(())
//! ```
//!
//! ## Loading a keymap
//!
//! ```no_run
//! use keytrap::config::KeymapFile;
//! use keytrap::core::{action, EventResponse};
//! use keytrap::shortcuts::KeyboardShortcuts;
//!
//! let keymap = KeymapFile::new("~/.config/keytrap/keymap.conf".into())?.load()?;
//! let mut shortcuts = KeyboardShortcuts::new(keymap.settings);
//! keymap.register_all(&mut shortcuts, |entry| {
//!     let name = entry.name.clone();
//!     action(move |_, _| {
//!         println!("{}", name);
//!         EventResponse::Default
//!     })
//! })?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod core;
pub mod shortcuts;

// Re-export commonly used types for convenience
pub use crate::config::EngineConfig;
pub use crate::core::{action, Action, Engine, EventResponse, KeyEvent, Modifier, Phase, RawKeyEvent};
pub use crate::shortcuts::{KeyboardShortcuts, ShortcutOptions};
