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

//! Raw key event normalisation
//!
//! Converts a platform event (key code, modifier flags, phase) into the
//! canonical `(character, modifiers, phase)` triple the dispatcher works on.

use crate::core::keys::KeyTable;
use crate::core::types::{KeyEvent, Modifier, Modifiers, Phase, RawKeyEvent};

/// Derive the canonical character for a raw event
///
/// Press events report the produced character. Without shift it is
/// lowercased, so bindings keep working with caps lock on. Down and up
/// events report a physical key: special keys and punctuation come from
/// the key tables, everything else is the lowercased key code.
///
/// Returns `None` when the event carries no usable character.
pub fn character_from_event(table: &KeyTable, event: &RawKeyEvent) -> Option<String> {
    if event.code == 0 {
        return None;
    }

    if event.phase == Phase::Press {
        let character = char::from_u32(event.code)?;
        return Some(if event.shift {
            character.to_string()
        } else {
            character.to_lowercase().collect()
        });
    }

    if let Some(name) = table.special_key(event.code) {
        return Some(name.to_string());
    }

    if let Some(punctuation) = table.punctuation_key(event.code) {
        return Some(punctuation.to_string());
    }

    // Down and up report letters in uppercase whether or not shift is held
    char::from_u32(event.code).map(|c| c.to_lowercase().collect())
}

/// Collect the modifier flags of a raw event into a set
pub fn event_modifiers(event: &RawKeyEvent) -> Modifiers {
    let mut modifiers = Modifiers::new();

    if event.shift {
        modifiers.insert(Modifier::Shift);
    }
    if event.alt {
        modifiers.insert(Modifier::Alt);
    }
    if event.ctrl {
        modifiers.insert(Modifier::Ctrl);
    }
    if event.meta {
        modifiers.insert(Modifier::Meta);
    }

    modifiers
}

/// Normalise a raw event, or `None` if it has no character
pub fn normalize(table: &KeyTable, event: &RawKeyEvent) -> Option<KeyEvent> {
    let character = character_from_event(table, event)?;

    Some(KeyEvent {
        character,
        modifiers: event_modifiers(event),
        phase: event.phase,
        target: event.target,
    })
}
