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

//! Named shortcut registry
//!
//! The surface UI layers talk to. Every shortcut has a user-visible name
//! and a spec; several names may share a spec. The registry keeps the
//! engine's bindings in step with the named entries:
//!
//! - **register**: binds the key spec, replacing an entry with the same name and spec
//! - **remove**: unbinds only that name; other names on the same spec stay bound
//! - **trigger**: runs a bound action without a key event
//! - **actions**: lists the public (non-private) entries in registration order
//!
//! # Example
//!
//! ```
//! use keytrap::config::EngineConfig;
//! use keytrap::core::{action, EventResponse};
//! use keytrap::shortcuts::{KeyboardShortcuts, ShortcutOptions};
//!
//! let mut shortcuts = KeyboardShortcuts::new(EngineConfig::default());
//! shortcuts.register(
//!     "Save",
//!     "mod+s",
//!     action(|_, _| EventResponse::Default),
//!     ShortcutOptions::default().prevent_default(),
//! )?;
//!
//! assert_eq!(shortcuts.actions().len(), 1);
//! assert_eq!(shortcuts.trigger("mod+s", None), Some(EventResponse::PreventDefault));
//! # Ok::<(), keytrap::shortcuts::ShortcutError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::EngineConfig;
use crate::core::engine::{DispatchOutcome, Engine};
use crate::core::parser::ParseError;
use crate::core::types::{Action, EventResponse, KeyEvent, Phase, RawKeyEvent};

/// Registry errors
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ShortcutError {
    /// The key spec did not parse; nothing was registered
    #[error(transparent)]
    Spec(#[from] ParseError),
}

/// Per-shortcut options
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ShortcutOptions {
    /// Suppress the event's default action whenever the shortcut fires
    pub prevent_default: bool,

    /// Hide the shortcut from `actions()`
    pub private: bool,

    /// Force a phase instead of inferring one per step
    pub phase: Option<Phase>,
}

impl ShortcutOptions {
    pub fn prevent_default(mut self) -> Self {
        self.prevent_default = true;
        self
    }

    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }

    pub fn on_phase(mut self, phase: Phase) -> Self {
        self.phase = Some(phase);
        self
    }
}

/// A registered shortcut
#[derive(Clone)]
pub struct ShortcutEntry {
    pub name: String,
    pub spec: String,
    pub action: Action,
    pub options: ShortcutOptions,
}

impl fmt::Debug for ShortcutEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShortcutEntry")
            .field("name", &self.name)
            .field("spec", &self.spec)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Named shortcuts on top of one engine
pub struct KeyboardShortcuts {
    engine: Engine,
    entries: Vec<ShortcutEntry>,
}

impl KeyboardShortcuts {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_engine(Engine::new(config))
    }

    /// Wrap an existing engine (e.g. one driven by a manual clock)
    pub fn with_engine(engine: Engine) -> Self {
        Self {
            engine,
            entries: Vec::new(),
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    /// Register an action under a name and spec
    ///
    /// Registering the same `(name, spec)` again replaces the earlier
    /// entry in place, along with its binding under whatever phase it
    /// used. The new action owns the key afterwards.
    ///
    /// # Errors
    /// `ShortcutError::Spec` if the key spec does not parse. Nothing is
    /// registered in that case.
    pub fn register(
        &mut self,
        name: &str,
        spec: &str,
        action: Action,
        options: ShortcutOptions,
    ) -> Result<(), ShortcutError> {
        let entry = ShortcutEntry {
            name: name.to_string(),
            spec: spec.to_string(),
            action,
            options,
        };

        match self
            .entries
            .iter()
            .position(|e| e.name == name && e.spec == spec)
        {
            Some(pos) => {
                self.engine.unbind(spec)?;
                self.entries[pos] = entry;

                bind_entries(&mut self.engine, &self.entries, spec, Some(pos))?;
                let replaced = &self.entries[pos];
                self.engine
                    .bind(spec, wrap_action(&replaced.action, &replaced.options), options.phase)?;
            }
            None => {
                self.engine
                    .bind(spec, wrap_action(&entry.action, &entry.options), options.phase)?;
                self.entries.push(entry);
            }
        }

        tracing::debug!(name, spec, "shortcut registered");
        Ok(())
    }

    /// Remove the shortcut registered under `(name, spec)`
    ///
    /// Other names bound to the same spec are bound again, so they keep
    /// working. Returns false if no such shortcut exists.
    pub fn remove(&mut self, name: &str, spec: &str) -> Result<bool, ShortcutError> {
        let Some(pos) = self
            .entries
            .iter()
            .position(|e| e.name == name && e.spec == spec)
        else {
            return Ok(false);
        };

        self.entries.remove(pos);
        self.engine.unbind(spec)?;
        bind_entries(&mut self.engine, &self.entries, spec, None)?;

        tracing::debug!(name, spec, "shortcut removed");
        Ok(true)
    }

    /// Run the action bound to exactly `(spec, phase)`
    pub fn trigger(&self, spec: &str, phase: Option<Phase>) -> Option<EventResponse> {
        self.engine.trigger(spec, phase)
    }

    /// Public shortcuts in registration order
    pub fn actions(&self) -> Vec<&ShortcutEntry> {
        self.entries.iter().filter(|e| !e.options.private).collect()
    }

    /// Forget every shortcut and binding
    pub fn reset(&mut self) {
        self.entries.clear();
        self.engine.reset();
    }

    /// Dispatch a raw platform event
    pub fn handle(&mut self, raw: &RawKeyEvent) -> DispatchOutcome {
        self.engine.handle(raw)
    }

    /// Dispatch a normalised event
    pub fn handle_key(&mut self, event: &KeyEvent) -> DispatchOutcome {
        self.engine.handle_key(event)
    }
}

/// Apply the options that change how an action reaches the engine
/// Bind every entry on `spec` in registration order, except `skip`
fn bind_entries(
    engine: &mut Engine,
    entries: &[ShortcutEntry],
    spec: &str,
    skip: Option<usize>,
) -> Result<(), ShortcutError> {
    for (idx, entry) in entries.iter().enumerate() {
        if entry.spec != spec || Some(idx) == skip {
            continue;
        }
        engine.bind(spec, wrap_action(&entry.action, &entry.options), entry.options.phase)?;
    }
    Ok(())
}

fn wrap_action(action: &Action, options: &ShortcutOptions) -> Action {
    if !options.prevent_default {
        return action.clone();
    }

    let inner = action.clone();
    crate::core::types::action(move |event, spec| {
        inner(event, spec);
        EventResponse::PreventDefault
    })
}

#[cfg(test)]
mod tests;
