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

//! Keystroke simulation
//!
//! Produces the raw events a browser delivers for a physical keystroke:
//! down, press (only for printable keys without ctrl/meta) and up.
//! Used by the replay command and the engine tests.
//!
//! # Replay scripts
//! ```text
//! # comment
//! type g          # down + press + up
//! type ctrl+s
//! down shift      # single raw events
//! up shift
//! wait 1200       # milliseconds
//! ```

use std::time::Duration;
use thiserror::Error;

use crate::core::keys::KeyTable;
use crate::core::parser::keys_from_step;
use crate::core::types::{Modifier, Modifiers, Phase, RawKeyEvent};

/// Simulation errors
#[derive(Debug, Error, PartialEq)]
pub enum SimulateError {
    /// The key has no known key code
    #[error("Cannot simulate unknown key '{0}'")]
    UnknownKey(String),

    /// The keystroke text has no keys
    #[error("Empty keystroke")]
    Empty,

    /// A replay script line could not be parsed
    #[error("Script error on line {line}: {message}")]
    InvalidLine { line: usize, message: String },
}

/// One step of a replay script
#[derive(Clone, Debug, PartialEq)]
pub enum ScriptStep {
    Event(RawKeyEvent),
    Wait(Duration),
}

/// A keystroke resolved to physical terms
struct Stroke {
    code: u32,
    modifiers: Modifiers,
    press_char: Option<char>,
    is_modifier: bool,
}

fn resolve(table: &KeyTable, keystroke: &str) -> Result<Stroke, SimulateError> {
    let keys = keys_from_step(keystroke.trim());
    let Some(last) = keys.last() else {
        return Err(SimulateError::Empty);
    };

    let mut modifiers = Modifiers::new();
    for key in &keys {
        if let Some(modifier) = Modifier::from_key(table.resolve_alias(key)) {
            modifiers.insert(modifier);
        }
    }

    let key = table.resolve_alias(last);
    let mut chars = key.chars();
    let single = match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    };

    let (physical, press_char) = match single {
        Some(c) if c.is_ascii_uppercase() => {
            modifiers.insert(Modifier::Shift);
            (c.to_ascii_lowercase().to_string(), Some(c))
        }
        Some(c) => match table.unshifted(key) {
            Some(unshifted) => {
                modifiers.insert(Modifier::Shift);
                (unshifted.to_string(), Some(c))
            }
            None if modifiers.contains(&Modifier::Shift) => {
                let shifted = table
                    .shifted(key)
                    .and_then(|s| s.chars().next())
                    .unwrap_or_else(|| c.to_ascii_uppercase());
                (key.to_string(), Some(shifted))
            }
            None => (key.to_string(), Some(c)),
        },
        None => (key.to_string(), None),
    };

    let code = match (table.code_for(&physical), single) {
        (Some(code), _) => code,
        (None, Some(c)) => c as u32,
        (None, None) => return Err(SimulateError::UnknownKey(physical)),
    };

    // Browsers send no press while ctrl or meta is held
    let control = modifiers.contains(&Modifier::Ctrl) || modifiers.contains(&Modifier::Meta);

    Ok(Stroke {
        code,
        press_char: if control { None } else { press_char },
        is_modifier: Modifier::from_key(key).is_some(),
        modifiers,
    })
}

/// Raw events for one full keystroke (`"g"`, `"ctrl+s"`, `"?"`)
pub fn keystroke(table: &KeyTable, keystroke: &str) -> Result<Vec<RawKeyEvent>, SimulateError> {
    let stroke = resolve(table, keystroke)?;
    let mut events = vec![RawKeyEvent::new(Phase::Down, stroke.code).with_modifiers(&stroke.modifiers)];

    if let Some(c) = stroke.press_char {
        events.push(RawKeyEvent::new(Phase::Press, c as u32).with_modifiers(&stroke.modifiers));
    }

    events.push(raw_event(table, Phase::Up, keystroke)?);
    Ok(events)
}

/// A single raw event of the given phase
///
/// Releasing a modifier clears its own flag, as browsers report it.
pub fn raw_event(table: &KeyTable, phase: Phase, keystroke: &str) -> Result<RawKeyEvent, SimulateError> {
    let stroke = resolve(table, keystroke)?;
    let mut modifiers = stroke.modifiers.clone();

    let code = match phase {
        Phase::Press => stroke.press_char.map(|c| c as u32).unwrap_or(stroke.code),
        Phase::Down => stroke.code,
        Phase::Up => {
            if stroke.is_modifier {
                if let Some(name) = table.special_key(stroke.code) {
                    if let Some(modifier) = Modifier::from_key(name) {
                        modifiers.remove(&modifier);
                    }
                }
            }
            stroke.code
        }
    };

    Ok(RawKeyEvent::new(phase, code).with_modifiers(&modifiers))
}

/// Parse a replay script
pub fn parse_script(table: &KeyTable, content: &str) -> Result<Vec<ScriptStep>, SimulateError> {
    let mut steps = Vec::new();

    for (line_num, line) in content.lines().enumerate() {
        let line_num = line_num + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let invalid = |message: String| SimulateError::InvalidLine {
            line: line_num,
            message,
        };

        // `command argument [# comment]`; the argument is one word, so `type #` is the hash key
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default();
        let argument = words
            .next()
            .ok_or_else(|| invalid(format!("missing argument in '{}'", line)))?;
        if let Some(extra) = words.next().filter(|word| !word.starts_with('#')) {
            return Err(invalid(format!("unexpected '{}' after '{}'", extra, argument)));
        }

        match command {
            "type" => {
                let events = keystroke(table, argument).map_err(|e| invalid(e.to_string()))?;
                steps.extend(events.into_iter().map(ScriptStep::Event));
            }
            "wait" => {
                let ms: u64 = argument
                    .parse()
                    .map_err(|_| invalid(format!("expected milliseconds, found '{}'", argument)))?;
                steps.push(ScriptStep::Wait(Duration::from_millis(ms)));
            }
            phase => {
                let phase: Phase = phase.parse().map_err(invalid)?;
                let event = raw_event(table, phase, argument).map_err(|e| invalid(e.to_string()))?;
                steps.push(ScriptStep::Event(event));
            }
        }
    }

    Ok(steps)
}
