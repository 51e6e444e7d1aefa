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

//! Binding table
//!
//! Maps a resolved key to every binding that can fire on it. Lookups are
//! HashMap-based, so the per-event cost only depends on how many bindings
//! share the pressed key.
//!
//! Ordering per key: sequence steps come first, plain bindings after them,
//! each group in insertion order. The dispatcher relies on this to let
//! sequences take precedence.
//!
//! Invariant: for a given key there is at most one plain binding per
//! `(spec, phase)` and one sequence step per `(sequence, level)`.
//! Re-binding finds the previous entry and removes it before inserting.

use std::collections::HashMap;
use std::fmt;

use crate::core::sequence::SequenceTracker;
use crate::core::types::{Action, Modifiers, Phase};

/// What happens when a binding matches
#[derive(Clone)]
pub enum StepRole {
    /// Plain binding: run the action
    Fire(Action),
    /// Non-final sequence step: advance the sequence and expect `next_phase`
    Advance { next_phase: Phase },
    /// Final sequence step: run the action and reset the sequence
    Finish {
        action: Action,
        /// Phase given at bind time, if any
        explicit_phase: Option<Phase>,
    },
}

impl fmt::Debug for StepRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepRole::Fire(_) => write!(f, "Fire"),
            StepRole::Advance { next_phase } => write!(f, "Advance({})", next_phase),
            StepRole::Finish { explicit_phase, .. } => write!(f, "Finish({:?})", explicit_phase),
        }
    }
}

/// One entry of the binding table
#[derive(Clone, Debug)]
pub struct Binding {
    /// Modifiers that must be held
    pub modifiers: Modifiers,

    /// Phase this entry listens on
    pub phase: Phase,

    /// Source spec of this entry (the step text for sequence steps)
    pub combo: String,

    /// Sequence this step belongs to, `None` for plain bindings
    pub sequence: Option<String>,

    /// Step index within the sequence (0 for plain bindings)
    pub level: usize,

    pub role: StepRole,
}

impl Binding {
    /// True when the entry accepts an event with these modifiers and phase
    ///
    /// Press events without ctrl or meta held are matched on the
    /// character alone: press cannot report modifiers reliably there.
    pub fn accepts(&self, modifiers: &Modifiers, phase: Phase, control_held: bool) -> bool {
        if self.phase != phase {
            return false;
        }

        (phase == Phase::Press && !control_held) || self.modifiers == *modifiers
    }

    /// True when `other` would take this entry's slot
    fn same_slot(&self, combo: &str, sequence: Option<&str>, level: usize) -> bool {
        match (sequence, &self.sequence) {
            (None, None) => self.combo == combo,
            (Some(seq), Some(own)) => own == seq && self.level == level,
            _ => false,
        }
    }
}

/// Registry of bindings keyed by resolved key identifier
#[derive(Clone, Debug, Default)]
pub struct BindingTable {
    bindings: HashMap<String, Vec<Binding>>,
}

impl BindingTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Adds a binding for a key.
    ///
    /// Sequence steps go to the front of the key's list, plain bindings
    /// to the back.
    pub fn insert(&mut self, key: &str, binding: Binding) {
        let list = self.bindings.entry(key.to_string()).or_default();

        if binding.sequence.is_some() {
            list.insert(0, binding);
        } else {
            list.push(binding);
        }
    }

    /// Finds every binding that fires for an event on `key`.
    ///
    /// Sequence steps only match when the sequence is currently at their
    /// level.
    pub fn find_matches(
        &self,
        key: &str,
        modifiers: &Modifiers,
        phase: Phase,
        control_held: bool,
        sequences: &SequenceTracker,
    ) -> Vec<Binding> {
        let Some(list) = self.bindings.get(key) else {
            return Vec::new();
        };

        list.iter()
            .filter(|b| match &b.sequence {
                Some(seq) => sequences.level(seq) == b.level,
                None => true,
            })
            .filter(|b| b.accepts(modifiers, phase, control_held))
            .cloned()
            .collect()
    }

    /// Finds the positions of entries a new binding would overwrite.
    ///
    /// An entry is overwritten when it matches the new binding's
    /// modifiers and phase and occupies the same slot: the same plain
    /// spec, or the same sequence at the same level.
    pub fn find_replaced(
        &self,
        key: &str,
        modifiers: &Modifiers,
        phase: Phase,
        combo: &str,
        sequence: Option<&str>,
        level: usize,
    ) -> Vec<usize> {
        let Some(list) = self.bindings.get(key) else {
            return Vec::new();
        };

        list.iter()
            .enumerate()
            .filter(|(_, b)| b.accepts(modifiers, phase, false))
            .filter(|(_, b)| b.same_slot(combo, sequence, level))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Removes entries by position (as returned by `find_replaced`).
    pub fn remove_positions(&mut self, key: &str, positions: &[usize]) {
        let Some(list) = self.bindings.get_mut(key) else {
            return;
        };

        for &idx in positions.iter().rev() {
            if idx < list.len() {
                list.remove(idx);
            }
        }

        if list.is_empty() {
            self.bindings.remove(key);
        }
    }

    /// Removes every entry on `key` that came from `spec`, in any phase.
    ///
    /// For sequences `spec` is the whole sequence string. Returns the
    /// number of removed entries.
    pub fn remove(&mut self, key: &str, spec: &str) -> usize {
        let Some(list) = self.bindings.get_mut(key) else {
            return 0;
        };

        let before = list.len();
        list.retain(|b| match &b.sequence {
            Some(seq) => seq != spec,
            None => b.combo != spec,
        });
        let removed = before - list.len();

        if list.is_empty() {
            self.bindings.remove(key);
        }

        removed
    }

    /// All bindings currently registered on a key, in evaluation order.
    pub fn bindings_for(&self, key: &str) -> &[Binding] {
        self.bindings.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the total number of bindings tracked.
    pub fn total_bindings(&self) -> usize {
        self.bindings.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }
}
