// Copyright 2025 Eric Jingryd (tidynest@proton.me)
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

//! src/core/types.rs
//!
//! Core type definitions for the keybinding engine
//!
//! This module defines the fundamental types used throughout the engine:
//! - `Modifier` / `Modifiers`: The four modifier keys and an unordered set of them
//! - `Phase`: Which stage of a key event a binding listens for
//! - `KeyStep`: One parsed, atomic step of a binding specification
//! - `RawKeyEvent`: A platform key event before normalisation
//! - `KeyEvent`: A normalised `(character, modifiers, phase)` event
//! - `EventResponse`: What an action asks the host to do with the event
//!
//! Modifier sets are `BTreeSet`s so that `ctrl+alt` and `alt+ctrl` compare
//! equal and always print in the same order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

/// Keyboard modifier keys
///
/// Ordering is the canonical display order (shift, ctrl, alt, meta).
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    /// Shift key
    Shift,
    /// Control key
    Ctrl,
    /// Alt / Option key
    Alt,
    /// Meta / Command / Windows key
    Meta,
}

impl Modifier {
    /// Resolve a canonical key name to a modifier, if it is one
    pub fn from_key(key: &str) -> Option<Modifier> {
        match key {
            "shift" => Some(Modifier::Shift),
            "ctrl" => Some(Modifier::Ctrl),
            "alt" => Some(Modifier::Alt),
            "meta" => Some(Modifier::Meta),
            _ => None,
        }
    }

    /// Canonical key name of this modifier
    pub fn as_str(self) -> &'static str {
        match self {
            Modifier::Shift => "shift",
            Modifier::Ctrl => "ctrl",
            Modifier::Alt => "alt",
            Modifier::Meta => "meta",
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unordered set of held modifiers
pub type Modifiers = BTreeSet<Modifier>;

/// Returns true if `key` names one of the four modifier keys
pub fn is_modifier(key: &str) -> bool {
    Modifier::from_key(key).is_some()
}

/// The event stage a binding listens for
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Character press: reports the produced (possibly shifted) character
    Press,
    /// Key down: reports the physical key
    Down,
    /// Key up: reports the physical key
    Up,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Press => write!(f, "press"),
            Phase::Down => write!(f, "down"),
            Phase::Up => write!(f, "up"),
        }
    }
}

impl std::str::FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "press" | "keypress" => Ok(Phase::Press),
            "down" | "keydown" => Ok(Phase::Down),
            "up" | "keyup" => Ok(Phase::Up),
            other => Err(format!("unknown phase '{}'", other)),
        }
    }
}

/// One atomic step of a binding specification
///
/// `"ctrl+shift+k"` parses to a single step with key `k`, modifiers
/// `{ctrl, shift}` and phase `Down`. Immutable once parsed.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct KeyStep {
    /// Resolved key identifier (the last key of the step)
    pub key: String,

    /// Modifiers that must be held
    pub modifiers: Modifiers,

    /// Event phase this step matches
    pub phase: Phase,
}

impl fmt::Display for KeyStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in &self.modifiers {
            if modifier.as_str() != self.key {
                write!(f, "{}+", modifier)?;
            }
        }
        write!(f, "{} ({})", self.key, self.phase)
    }
}

/// What the element under focus is, as far as shortcuts are concerned
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum Target {
    /// Ordinary, non-editable focus
    #[default]
    Document,
    /// Text input, select, text area or content-editable region
    Editable,
    /// Editable element that explicitly opted into shortcut handling
    Bound,
}

/// A platform key event before normalisation
///
/// `code` follows the DOM `which`/`keyCode` convention: for `Press` it is
/// the produced character's code point, for `Down`/`Up` it is the
/// physical key code.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawKeyEvent {
    pub phase: Phase,
    pub code: u32,
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
    pub target: Target,
}

impl RawKeyEvent {
    /// Create an event with no modifiers held
    pub fn new(phase: Phase, code: u32) -> Self {
        Self {
            phase,
            code,
            shift: false,
            ctrl: false,
            alt: false,
            meta: false,
            target: Target::Document,
        }
    }

    /// Set the held modifiers (builder pattern)
    pub fn with_modifiers(mut self, modifiers: &Modifiers) -> Self {
        self.shift = modifiers.contains(&Modifier::Shift);
        self.ctrl = modifiers.contains(&Modifier::Ctrl);
        self.alt = modifiers.contains(&Modifier::Alt);
        self.meta = modifiers.contains(&Modifier::Meta);
        self
    }

    /// Set the focus target (builder pattern)
    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }
}

/// A normalised key event as seen by the dispatcher
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyEvent {
    /// Canonical character or key name (`"a"`, `"A"`, `"enter"`, `"f5"`)
    pub character: String,

    /// Modifiers held while the event was produced
    pub modifiers: Modifiers,

    pub phase: Phase,

    pub target: Target,
}

impl KeyEvent {
    /// Create an event with no modifiers held
    pub fn new(character: &str, phase: Phase) -> Self {
        Self {
            character: character.to_string(),
            modifiers: Modifiers::new(),
            phase,
            target: Target::Document,
        }
    }

    /// Set the held modifiers (builder pattern)
    pub fn with_modifiers(mut self, modifiers: impl IntoIterator<Item = Modifier>) -> Self {
        self.modifiers = modifiers.into_iter().collect();
        self
    }

    /// Set the focus target (builder pattern)
    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    /// True when ctrl or meta is held
    ///
    /// Press events without either of these are matched on character
    /// identity alone.
    pub fn has_control_modifier(&self) -> bool {
        self.modifiers.contains(&Modifier::Ctrl) || self.modifiers.contains(&Modifier::Meta)
    }
}

/// What an action asks the host to do with the triggering event
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum EventResponse {
    /// Let the event continue normally
    #[default]
    Default,
    /// Suppress the default action and stop propagation
    PreventDefault,
}

/// An action bound to a key specification
///
/// Receives the triggering event (`None` for manual triggers) and the
/// source specification that matched.
pub type Action = Rc<dyn Fn(Option<&KeyEvent>, &str) -> EventResponse>;

/// Wrap a closure into an [`Action`]
pub fn action<F>(f: F) -> Action
where
    F: Fn(Option<&KeyEvent>, &str) -> EventResponse + 'static,
{
    Rc::new(f)
}
