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

//! src/core/engine.rs
//!
//! The keybinding engine
//!
//! Owns one binding table, one sequence tracker and one direct map, and
//! decides for every key event which actions fire.
//!
//! # Dispatch
//! 1. Normalise the event; events without a character are ignored
//! 2. Collect every binding on that key whose phase and modifiers match
//!    (sequence steps only when the sequence is at their level)
//! 3. If sequence steps matched, run only those at the highest level
//! 4. Otherwise run every plain binding, each once
//! 5. Reset the sequences the event did not advance
//!
//! Actions run synchronously on the caller's thread. A panicking action
//! unwinds through `handle` and skips the remaining candidates of that
//! event; isolating it is up to the host.
//!
//! # Example
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
//! # Ok::<(), keytrap::core::parser::ParseError>(())
//! ```

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::config::EngineConfig;
use crate::core::keys::KeyTable;
use crate::core::normalizer::normalize;
use crate::core::parser::{parse_spec, ParseError, ParsedCombo};
use crate::core::sequence::SequenceTracker;
use crate::core::table::{Binding, BindingTable, StepRole};
use crate::core::timer::{Clock, SystemClock};
use crate::core::types::{
    is_modifier, Action, EventResponse, KeyEvent, KeyStep, Modifier, Modifiers, Phase,
    RawKeyEvent, Target,
};

/// Decides whether an event must be ignored before a binding fires
///
/// Arguments: the event, the matched spec, and the sequence it belongs to.
pub type StopFilter = Box<dyn Fn(&KeyEvent, &str, Option<&str>) -> bool>;

/// Result of dispatching one event
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DispatchOutcome {
    /// Specs whose actions ran, in order
    pub fired: Vec<String>,

    /// Sequences advanced by this event
    pub advanced: Vec<String>,

    /// An action asked to suppress the default and stop propagation
    pub default_prevented: bool,
}

impl DispatchOutcome {
    /// True when nothing fired and no sequence moved
    pub fn is_empty(&self) -> bool {
        self.fired.is_empty() && self.advanced.is_empty()
    }
}

/// The default stop filter: ignore editable targets that did not opt in
pub fn default_stop_filter(event: &KeyEvent, _spec: &str, _sequence: Option<&str>) -> bool {
    event.target == Target::Editable
}

/// A self-contained keybinding engine
///
/// Instances share no state; a host may keep one per UI scope.
pub struct Engine {
    keys: KeyTable,
    table: BindingTable,
    sequences: SequenceTracker,
    direct: HashMap<(String, Option<Phase>), Action>,
    clock: Box<dyn Clock>,
    stop_filter: StopFilter,
}

impl Engine {
    /// Create an engine driven by the system clock
    pub fn new(config: EngineConfig) -> Self {
        Self::with_clock(config, SystemClock::new())
    }

    /// Create an engine driven by the given clock
    pub fn with_clock(config: EngineConfig, clock: impl Clock + 'static) -> Self {
        Self {
            keys: KeyTable::new(config.platform),
            table: BindingTable::new(),
            sequences: SequenceTracker::new(config.sequence_timeout(), config.settle_delay()),
            direct: HashMap::new(),
            clock: Box::new(clock),
            stop_filter: Box::new(default_stop_filter),
        }
    }

    /// Replace the stop filter
    pub fn set_stop_filter<F>(&mut self, filter: F)
    where
        F: Fn(&KeyEvent, &str, Option<&str>) -> bool + 'static,
    {
        self.stop_filter = Box::new(filter);
    }

    pub fn keys(&self) -> &KeyTable {
        &self.keys
    }

    pub fn table(&self) -> &BindingTable {
        &self.table
    }

    pub fn sequences(&self) -> &SequenceTracker {
        &self.sequences
    }

    /// Parse a spec with this engine's key tables
    pub fn parse(&self, spec: &str, phase: Option<Phase>) -> Result<ParsedCombo, ParseError> {
        parse_spec(spec, phase, &self.keys)
    }

    /// Bind an action to a spec
    ///
    /// Binding the same spec again (same phase) replaces the previous
    /// action. Nothing is inserted when the key spec does not parse.
    pub fn bind(&mut self, spec: &str, action: Action, phase: Option<Phase>) -> Result<ParsedCombo, ParseError> {
        let parsed = self.parse(spec, phase)?;

        self.direct
            .insert((parsed.spec.clone(), phase), action.clone());

        if parsed.is_sequence() {
            self.bind_sequence(&parsed, action, phase);
        } else {
            let step = &parsed.steps[0];
            self.bind_step(&parsed.spec, step, StepRole::Fire(action), None, 0);
        }

        tracing::debug!(spec = %parsed.spec, steps = parsed.steps.len(), "bound");
        Ok(parsed)
    }

    fn bind_sequence(&mut self, parsed: &ParsedCombo, action: Action, phase: Option<Phase>) {
        self.sequences.register(&parsed.spec);

        // Non-final steps advance the sequence and announce the phase of
        // the step after them, so one sequence can mix press and down keys
        let last = parsed.steps.len() - 1;
        for (level, (step, step_spec)) in parsed.steps.iter().zip(&parsed.step_specs).enumerate() {
            let role = if level == last {
                StepRole::Finish {
                    action: action.clone(),
                    explicit_phase: phase,
                }
            } else {
                StepRole::Advance {
                    next_phase: parsed.steps[level + 1].phase,
                }
            };

            self.bind_step(step_spec, step, role, Some(&parsed.spec), level);
        }
    }

    fn bind_step(&mut self, combo: &str, step: &KeyStep, role: StepRole, sequence: Option<&str>, level: usize) {
        let replaced = self.table.find_replaced(
            &step.key,
            &step.modifiers,
            step.phase,
            combo,
            sequence,
            level,
        );
        if !replaced.is_empty() {
            tracing::debug!(combo, replaced = replaced.len(), "replacing existing binding");
        }
        self.table.remove_positions(&step.key, &replaced);

        self.table.insert(
            &step.key,
            Binding {
                modifiers: step.modifiers.clone(),
                phase: step.phase,
                combo: combo.to_string(),
                sequence: sequence.map(str::to_string),
                level,
                role,
            },
        );
    }

    /// Remove every binding created from `spec`, in any phase
    ///
    /// Returns the number of table entries removed.
    pub fn unbind(&mut self, spec: &str) -> Result<usize, ParseError> {
        // Down and up bindings may live under the unshifted key
        let inferred = self.parse(spec, None)?;
        let physical = self.parse(spec, Some(Phase::Down))?;

        let mut keys: HashSet<&str> = HashSet::new();
        for step in inferred.steps.iter().chain(&physical.steps) {
            keys.insert(&step.key);
        }

        let mut removed = 0;
        for key in keys {
            removed += self.table.remove(key, &inferred.spec);
        }

        if inferred.is_sequence() {
            self.sequences.forget(&inferred.spec);
        }
        self.direct.retain(|(bound, _), _| bound != &inferred.spec);

        tracing::debug!(spec = %inferred.spec, removed, "unbound");
        Ok(removed)
    }

    /// Run the action bound to exactly `(spec, phase)`, without a key event
    ///
    /// Returns `None` when nothing is bound under that pair.
    pub fn trigger(&self, spec: &str, phase: Option<Phase>) -> Option<EventResponse> {
        let spec = spec.split_whitespace().collect::<Vec<_>>().join(" ");
        let action = self.direct.get(&(spec.clone(), phase))?.clone();

        tracing::debug!(spec = %spec, "manual trigger");
        Some(action(None, &spec))
    }

    /// Drop every binding and all sequence state
    pub fn reset(&mut self) {
        self.table.clear();
        self.direct.clear();
        self.sequences.clear();
        tracing::debug!("engine reset");
    }

    /// Run due timers
    ///
    /// Hosts without a steady event stream should call this when
    /// `next_deadline` passes. `handle` calls it before every dispatch.
    pub fn poll(&mut self) -> bool {
        let now = self.clock.now();
        self.sequences.poll(now)
    }

    /// Clock time of the earliest pending timer
    pub fn next_deadline(&self) -> Option<Duration> {
        self.sequences.next_deadline()
    }

    /// Dispatch a raw platform event
    pub fn handle(&mut self, raw: &RawKeyEvent) -> DispatchOutcome {
        match normalize(&self.keys, raw) {
            Some(event) => self.handle_key(&event),
            None => DispatchOutcome::default(),
        }
    }

    /// Dispatch a normalised event
    pub fn handle_key(&mut self, event: &KeyEvent) -> DispatchOutcome {
        self.poll();

        if event.character.is_empty() {
            return DispatchOutcome::default();
        }

        // The final key of a completed sequence must not fire again on release
        if event.phase == Phase::Up && self.sequences.take_suppressed_up(&event.character) {
            return DispatchOutcome::default();
        }

        self.dispatch(event)
    }

    fn dispatch(&mut self, event: &KeyEvent) -> DispatchOutcome {
        // A modifier released on its own matches as itself
        let modifiers: Modifiers = match Modifier::from_key(&event.character) {
            Some(modifier) if event.phase == Phase::Up => [modifier].into_iter().collect(),
            _ => event.modifiers.clone(),
        };

        let matches = self.table.find_matches(
            &event.character,
            &modifiers,
            event.phase,
            event.has_control_modifier(),
            &self.sequences,
        );

        // Only the longest matching sequences fire: 'a option b' must not
        // also complete 'option b'
        let max_level = matches
            .iter()
            .filter(|b| b.sequence.is_some())
            .map(|b| b.level)
            .max()
            .unwrap_or(0);

        let mut outcome = DispatchOutcome::default();
        let mut keep: HashSet<String> = HashSet::new();
        let mut processed_sequence = false;

        for binding in matches.iter().filter(|b| b.sequence.is_some()) {
            if binding.level != max_level {
                continue;
            }
            processed_sequence = true;
            if let Some(sequence) = &binding.sequence {
                keep.insert(sequence.clone());
            }
            self.fire(binding, event, &mut outcome);
        }

        if !processed_sequence {
            for binding in matches.iter().filter(|b| b.sequence.is_none()) {
                self.fire(binding, event, &mut outcome);
            }
        }

        // A key of the phase sequences are waiting for resets every
        // sequence it did not advance. Modifiers are skipped since they
        // are pressed ahead of the key they qualify, and so is the press
        // that follows a down which already advanced a sequence.
        let ignore_this_press = event.phase == Phase::Press && self.sequences.ignore_next_press();
        if self.sequences.expected_phase() == Some(event.phase)
            && !is_modifier(&event.character)
            && !ignore_this_press
        {
            self.sequences.reset_except(&keep);
        }

        self.sequences
            .set_ignore_next_press(processed_sequence && event.phase == Phase::Down);

        tracing::trace!(
            character = %event.character,
            phase = %event.phase,
            fired = outcome.fired.len(),
            "dispatched"
        );
        outcome
    }

    fn fire(&mut self, binding: &Binding, event: &KeyEvent, outcome: &mut DispatchOutcome) {
        if (self.stop_filter)(event, &binding.combo, binding.sequence.as_deref()) {
            return;
        }

        match (&binding.role, &binding.sequence) {
            (StepRole::Fire(action), _) => {
                let response = action(Some(event), &binding.combo);
                record(outcome, &binding.combo, response);
            }
            (StepRole::Advance { next_phase }, Some(sequence)) => {
                let now = self.clock.now();
                self.sequences.advance(sequence, *next_phase, now);
                outcome.advanced.push(sequence.clone());
            }
            (StepRole::Finish { action, explicit_phase }, Some(sequence)) => {
                let response = action(Some(event), sequence);
                record(outcome, sequence, response);

                if *explicit_phase != Some(Phase::Up) {
                    self.sequences.suppress_next_up(&event.character);
                }
                let now = self.clock.now();
                self.sequences.complete(sequence, now);
            }
            (_, None) => {
                tracing::warn!(combo = %binding.combo, "sequence step without a sequence");
            }
        }
    }
}

fn record(outcome: &mut DispatchOutcome, spec: &str, response: EventResponse) {
    outcome.fired.push(spec.to_string());
    if response == EventResponse::PreventDefault {
        outcome.default_prevented = true;
    }
}
