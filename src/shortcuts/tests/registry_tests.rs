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

use std::cell::RefCell;
use std::rc::Rc;

use super::super::*;
use crate::core::{
    action,
    keys::Platform,
    simulate::keystroke,
    timer::ManualClock,
    types::{Action, EventResponse, Phase},
};

type Log = Rc<RefCell<Vec<String>>>;

fn shortcuts() -> KeyboardShortcuts {
    let config = EngineConfig::default().with_platform(Platform::Other);
    KeyboardShortcuts::with_engine(Engine::with_clock(config, ManualClock::new()))
}

/// Helper to create an action that records its label
fn recorder(log: &Log, label: &str) -> Action {
    let log = Rc::clone(log);
    let label = label.to_string();
    action(move |_, _| {
        log.borrow_mut().push(label.clone());
        EventResponse::Default
    })
}

fn type_key(shortcuts: &mut KeyboardShortcuts, combo: &str) -> Vec<DispatchOutcome> {
    let events = keystroke(shortcuts.engine().keys(), combo).unwrap();
    events.iter().map(|raw| shortcuts.handle(raw)).collect()
}

// ============================================================================
// Register / remove
// ============================================================================

#[test]
fn test_register_and_fire() {
    let log = Log::default();
    let mut s = shortcuts();

    s.register("Inbox", "g i", recorder(&log, "Inbox"), ShortcutOptions::default())
        .unwrap();

    type_key(&mut s, "g");
    type_key(&mut s, "i");
    assert_eq!(*log.borrow(), vec!["Inbox"]);
}

#[test]
fn test_register_then_remove_round_trip() {
    let log = Log::default();
    let mut s = shortcuts();

    s.register("Save", "mod+s", recorder(&log, "Save"), ShortcutOptions::default())
        .unwrap();
    assert!(s.remove("Save", "mod+s").unwrap());

    type_key(&mut s, "ctrl+s");
    assert!(log.borrow().is_empty());
    assert!(s.actions().is_empty());
    assert!(s.engine().table().is_empty());
}

#[test]
fn test_remove_unknown_is_noop() {
    let mut s = shortcuts();
    assert!(!s.remove("Nothing", "x").unwrap());
}

#[test]
fn test_invalid_spec_registers_nothing() {
    let log = Log::default();
    let mut s = shortcuts();

    let result = s.register("Broken", "  ", recorder(&log, "Broken"), ShortcutOptions::default());

    assert!(matches!(result, Err(ShortcutError::Spec(_))));
    assert!(s.actions().is_empty());
    assert!(s.engine().table().is_empty());
}

#[test]
fn test_same_name_and_spec_replaces_in_place() {
    let log = Log::default();
    let mut s = shortcuts();

    s.register("Help", "?", recorder(&log, "first"), ShortcutOptions::default())
        .unwrap();
    s.register("Other", "x", recorder(&log, "other"), ShortcutOptions::default())
        .unwrap();
    s.register("Help", "?", recorder(&log, "second"), ShortcutOptions::default())
        .unwrap();

    let names: Vec<&str> = s.actions().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Help", "Other"]);

    type_key(&mut s, "?");
    assert_eq!(*log.borrow(), vec!["second"]);
}

#[test]
fn test_reregister_with_new_phase_drops_old_binding() {
    let log = Log::default();
    let mut s = shortcuts();

    s.register("Save", "s", recorder(&log, "old"), ShortcutOptions::default().on_phase(Phase::Down))
        .unwrap();
    s.register("Save", "s", recorder(&log, "new"), ShortcutOptions::default().on_phase(Phase::Up))
        .unwrap();

    type_key(&mut s, "s");
    assert_eq!(*log.borrow(), vec!["new"]);

    assert_eq!(s.trigger("s", Some(Phase::Down)), None);
    assert_eq!(s.trigger("s", Some(Phase::Up)), Some(EventResponse::Default));
    assert_eq!(s.actions().len(), 1);
}

// ============================================================================
// Shared specs
// ============================================================================

#[test]
fn test_removing_one_name_keeps_the_other() {
    let log = Log::default();
    let mut s = shortcuts();

    s.register("First", "a", recorder(&log, "First"), ShortcutOptions::default())
        .unwrap();
    s.register("Second", "a", recorder(&log, "Second"), ShortcutOptions::default())
        .unwrap();

    // The latest registration owns the key
    type_key(&mut s, "a");
    assert_eq!(*log.borrow(), vec!["Second"]);

    assert!(s.remove("Second", "a").unwrap());
    type_key(&mut s, "a");
    assert_eq!(*log.borrow(), vec!["Second", "First"]);

    let names: Vec<&str> = s.actions().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["First"]);
}

#[test]
fn test_same_name_on_two_specs() {
    let log = Log::default();
    let mut s = shortcuts();

    s.register("Up", "k", recorder(&log, "k"), ShortcutOptions::default())
        .unwrap();
    s.register("Up", "up", recorder(&log, "up"), ShortcutOptions::default())
        .unwrap();
    assert_eq!(s.actions().len(), 2);

    s.remove("Up", "k").unwrap();
    type_key(&mut s, "k");
    type_key(&mut s, "up");

    assert_eq!(*log.borrow(), vec!["up"]);
}

#[test]
fn test_reregister_shared_spec_takes_the_key() {
    let log = Log::default();
    let mut s = shortcuts();

    s.register("A", "x", recorder(&log, "a"), ShortcutOptions::default())
        .unwrap();
    s.register("B", "x", recorder(&log, "b"), ShortcutOptions::default())
        .unwrap();
    s.register("A", "x", recorder(&log, "a2"), ShortcutOptions::default())
        .unwrap();

    type_key(&mut s, "x");
    assert_eq!(*log.borrow(), vec!["a2"]);

    assert!(s.remove("A", "x").unwrap());
    log.borrow_mut().clear();
    type_key(&mut s, "x");
    assert_eq!(*log.borrow(), vec!["b"]);
}

// ============================================================================
// Options
// ============================================================================

#[test]
fn test_private_shortcuts_are_hidden() {
    let log = Log::default();
    let mut s = shortcuts();

    s.register("Visible", "a", recorder(&log, "Visible"), ShortcutOptions::default())
        .unwrap();
    s.register(
        "Hidden",
        "b",
        recorder(&log, "Hidden"),
        ShortcutOptions::default().private(),
    )
    .unwrap();

    let names: Vec<&str> = s.actions().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Visible"]);

    // Hidden, but still bound
    type_key(&mut s, "b");
    assert_eq!(*log.borrow(), vec!["Hidden"]);
}

#[test]
fn test_prevent_default_option() {
    let log = Log::default();
    let mut s = shortcuts();

    s.register(
        "Save",
        "mod+s",
        recorder(&log, "Save"),
        ShortcutOptions::default().prevent_default(),
    )
    .unwrap();

    let outcomes = type_key(&mut s, "ctrl+s");
    assert!(outcomes[0].default_prevented);
    assert_eq!(s.trigger("mod+s", None), Some(EventResponse::PreventDefault));
}

#[test]
fn test_phase_option() {
    let log = Log::default();
    let mut s = shortcuts();

    s.register(
        "Release",
        "a",
        recorder(&log, "Release"),
        ShortcutOptions::default().on_phase(Phase::Up),
    )
    .unwrap();

    let outcomes = type_key(&mut s, "a");
    assert!(outcomes[1].fired.is_empty());
    assert_eq!(outcomes[2].fired, vec!["a"]);
    assert_eq!(s.trigger("a", Some(Phase::Up)), Some(EventResponse::Default));
}

#[test]
fn test_reset_forgets_everything() {
    let log = Log::default();
    let mut s = shortcuts();

    s.register("A", "a", recorder(&log, "A"), ShortcutOptions::default())
        .unwrap();
    s.reset();

    type_key(&mut s, "a");
    assert!(log.borrow().is_empty());
    assert!(s.actions().is_empty());
}

#[test]
fn test_options_deserialize() {
    let options: ShortcutOptions = serde_json::from_str(r#"{"prevent_default": true, "private": false, "phase": "up"}"#).unwrap();

    assert!(options.prevent_default);
    assert_eq!(options.phase, Some(Phase::Up));
}
