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

//! src/core/parser.rs
//!
//! Binding specification parser
//!
//! This module turns strings like `"ctrl+alt+del"` or `"g i"` into
//! ordered lists of `KeyStep`s. It handles:
//! - Sequences: steps separated by whitespace
//! - Combos: keys inside a step separated by `+` (a lone `+` is the plus key)
//! - Aliases (`option`, `command`, `return`, `escape`, `mod`)
//! - Shifted punctuation for down/up bindings (`!` → `shift+1`)
//! - Phase inference for steps without an explicit phase
//!
//! # Architecture
//! The parser uses nom combinators to tokenise the input, then resolves
//! each step against the engine's `KeyTable`.
//!
//! Unknown key names are never an error: they are matched literally.

use nom::{
    bytes::complete::{take_till, take_till1},
    character::complete::{char, multispace0, multispace1},
    multi::separated_list1,
    sequence::preceded,
    IResult, Parser,
};
use serde::Serialize;
use thiserror::Error;

use crate::core::keys::KeyTable;
use crate::core::types::{KeyStep, Modifier, Modifiers, Phase};

/// Parse errors for binding specifications
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("Invalid key binding '{spec}': {reason}")]
    InvalidSpec { spec: String, reason: String },
}

/// A fully parsed binding specification
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ParsedCombo {
    /// Whitespace-normalised source spec (`"g   i"` becomes `"g i"`)
    pub spec: String,

    /// Source text of each step, in order
    pub step_specs: Vec<String>,

    /// Resolved steps, in order
    pub steps: Vec<KeyStep>,
}

impl ParsedCombo {
    /// True when this is a multi-step sequence
    pub fn is_sequence(&self) -> bool {
        self.steps.len() > 1
    }
}

/// Parse a binding specification
///
/// # Arguments
/// * `spec` - The binding string, e.g. `"mod+s"` or `"up up down down"`
/// * `phase` - Explicit phase for every step, or `None` to infer per step
/// * `table` - Key tables of the engine the binding is for
///
/// # Errors
/// `ParseError::InvalidSpec` when the input is empty or a step has no keys.
///
/// # Example
/// ```
/// use keytrap::core::keys::{KeyTable, Platform};
/// use keytrap::core::parser::parse_spec;
///
/// let table = KeyTable::new(Platform::Other);
/// let combo = parse_spec("ctrl+alt+del", None, &table)?;
/// assert_eq!(combo.steps[0].key, "del");
/// # Ok::<(), keytrap::core::parser::ParseError>(())
/// ```
pub fn parse_spec(spec: &str, phase: Option<Phase>, table: &KeyTable) -> Result<ParsedCombo, ParseError> {
    let invalid = |reason: &str| ParseError::InvalidSpec {
        spec: spec.to_string(),
        reason: reason.to_string(),
    };

    let (rest, step_specs) = split_steps(spec).map_err(|_| invalid("no key steps"))?;
    if !rest.trim().is_empty() {
        return Err(invalid("unexpected trailing input"));
    }

    let mut steps = Vec::with_capacity(step_specs.len());
    for step in &step_specs {
        let keys = keys_from_step(step);
        if keys.is_empty() {
            return Err(invalid(&format!("step '{}' has no keys", step)));
        }
        steps.push(key_info(&keys, phase, table));
    }

    Ok(ParsedCombo {
        spec: step_specs.join(" "),
        step_specs: step_specs.iter().map(|s| s.to_string()).collect(),
        steps,
    })
}

/// Split a spec into whitespace-separated sequence steps
pub fn split_steps(input: &str) -> IResult<&str, Vec<&str>> {
    preceded(
        multispace0,
        separated_list1(multispace1, take_till1(|c: char| c.is_whitespace())),
    )
    .parse(input)
}

/// Split one step into its `+`-separated keys
///
/// A doubled `+` anywhere in the step is the plus key: `ctrl++` is ctrl
/// with plus, `ctrl++a` yields `ctrl`, `+`, `a`. A step made only of `+`
/// is the plus key. Any other empty fragment (`ctrl+`, `+a`) is dropped.
pub fn keys_from_step(step: &str) -> Vec<&str> {
    if !step.is_empty() && step.chars().all(|c| c == '+') {
        return vec!["+"];
    }

    let split: IResult<&str, Vec<&str>> =
        separated_list1(char('+'), take_till(|c: char| c == '+')).parse(step);
    let fragments = match split {
        Ok((_, fragments)) => fragments,
        Err(_) => return Vec::new(),
    };

    let last = fragments.len().saturating_sub(1);
    fragments
        .iter()
        .enumerate()
        .filter_map(|(idx, fragment)| {
            if !fragment.is_empty() {
                return Some(*fragment);
            }
            // The gap between the two halves of `++`
            let doubled = idx > 0 && idx < last && !fragments[idx - 1].is_empty();
            doubled.then_some("+")
        })
        .collect()
}

/// Resolve the keys of one step into a `KeyStep`
///
/// The last key is the step's key; every modifier key encountered is
/// collected into the modifier set.
pub fn key_info(keys: &[&str], phase: Option<Phase>, table: &KeyTable) -> KeyStep {
    let mut modifiers = Modifiers::new();
    let mut key = String::new();

    for raw in keys {
        let mut resolved = table.resolve_alias(raw);

        // Down/up events report the physical key, so shifted punctuation
        // is bound as shift + the unshifted key (US layout only)
        if matches!(phase, Some(p) if p != Phase::Press) {
            if let Some(unshifted) = table.unshifted(resolved) {
                resolved = unshifted;
                modifiers.insert(Modifier::Shift);
            }
        }

        if let Some(modifier) = Modifier::from_key(resolved) {
            modifiers.insert(modifier);
        }

        if !table.is_known(resolved) {
            tracing::debug!(key = resolved, "unknown key name, matching literally");
        }

        key = resolved.to_string();
    }

    let phase = pick_best_phase(&key, &modifiers, phase, table);

    KeyStep {
        key,
        modifiers,
        phase,
    }
}

/// Pick the phase a step should listen on
///
/// Keys without a press character (arrows, function keys, enter, ...)
/// default to `Down`, everything else to `Press`. Modifiers are not
/// reported reliably by press events, so any modifier forces `Down`.
pub fn pick_best_phase(key: &str, modifiers: &Modifiers, phase: Option<Phase>, table: &KeyTable) -> Phase {
    let phase = phase.unwrap_or(if table.prefers_down(key) {
        Phase::Down
    } else {
        Phase::Press
    });

    if phase == Phase::Press && !modifiers.is_empty() {
        return Phase::Down;
    }

    phase
}
