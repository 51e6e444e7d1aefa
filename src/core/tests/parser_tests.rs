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

//! Parser module tests
//!
//! Tests for turning binding specs into key steps:
//! - Sequence splitting and whitespace normalisation
//! - Combo splitting, including the plus key
//! - Alias resolution (`mod`, `command`, `option`, ...)
//! - Phase inference and the modifier override
//! - Shifted punctuation for explicit down/up bindings

use crate::core::{
    keys::{KeyTable, Platform},
    parser::*,
    types::{Modifier, Modifiers, Phase},
};

fn table() -> KeyTable {
    KeyTable::new(Platform::Other)
}

fn mods(list: &[Modifier]) -> Modifiers {
    list.iter().copied().collect()
}

// ============================================================================
// Splitting
// ============================================================================

#[test]
fn test_split_steps() {
    let (rest, steps) = split_steps("up up  down").unwrap();
    assert_eq!(rest, "");
    assert_eq!(steps, vec!["up", "up", "down"]);
}

#[test]
fn test_keys_from_step() {
    assert_eq!(keys_from_step("ctrl+alt+del"), vec!["ctrl", "alt", "del"]);
    assert_eq!(keys_from_step("+"), vec!["+"]);
    assert_eq!(keys_from_step("ctrl++"), vec!["ctrl", "+"]);
    assert_eq!(keys_from_step("a"), vec!["a"]);
}

#[test]
fn test_doubled_plus_anywhere_is_the_plus_key() {
    assert_eq!(keys_from_step("ctrl++a"), vec!["ctrl", "+", "a"]);
    assert_eq!(keys_from_step("ctrl+shift++"), vec!["ctrl", "shift", "+"]);
    assert_eq!(keys_from_step("++"), vec!["+"]);

    let combo = parse_spec("alt++", None, &table()).unwrap();
    assert_eq!(combo.steps[0].key, "+");
    assert!(combo.steps[0].modifiers.contains(&Modifier::Alt));
}

#[test]
fn test_empty_fragments_are_dropped() {
    assert_eq!(keys_from_step("ctrl+"), vec!["ctrl"]);
    assert_eq!(keys_from_step("+a"), vec!["a"]);
}

#[test]
fn test_spec_whitespace_is_normalised() {
    let combo = parse_spec("  g   i ", None, &table()).unwrap();

    assert_eq!(combo.spec, "g i");
    assert_eq!(combo.step_specs, vec!["g", "i"]);
    assert!(combo.is_sequence());
}

#[test]
fn test_empty_spec_is_rejected() {
    assert!(matches!(
        parse_spec("", None, &table()),
        Err(ParseError::InvalidSpec { .. })
    ));
    assert!(parse_spec("   ", None, &table()).is_err());
}

// ============================================================================
// Key resolution
// ============================================================================

#[test]
fn test_single_letter_is_press() {
    let combo = parse_spec("a", None, &table()).unwrap();
    let step = &combo.steps[0];

    assert_eq!(step.key, "a");
    assert!(step.modifiers.is_empty());
    assert_eq!(step.phase, Phase::Press);
    assert!(!combo.is_sequence());
}

#[test]
fn test_uppercase_stays_uppercase() {
    let combo = parse_spec("A", None, &table()).unwrap();
    assert_eq!(combo.steps[0].key, "A");
    assert_eq!(combo.steps[0].phase, Phase::Press);
}

#[test]
fn test_combo_collects_modifiers() {
    let combo = parse_spec("ctrl+alt+del", None, &table()).unwrap();
    let step = &combo.steps[0];

    assert_eq!(step.key, "del");
    assert_eq!(step.modifiers, mods(&[Modifier::Ctrl, Modifier::Alt]));
    assert_eq!(step.phase, Phase::Down);
}

#[test]
fn test_modifier_order_independence() {
    let a = parse_spec("ctrl+shift+k", None, &table()).unwrap();
    let b = parse_spec("shift+ctrl+k", None, &table()).unwrap();

    assert_eq!(a.steps[0].modifiers, b.steps[0].modifiers);
}

#[test]
fn test_aliases() {
    let t = table();

    assert_eq!(parse_spec("command+k", None, &t).unwrap().steps[0].modifiers, mods(&[Modifier::Meta]));
    assert_eq!(parse_spec("option+k", None, &t).unwrap().steps[0].modifiers, mods(&[Modifier::Alt]));
    assert_eq!(parse_spec("return", None, &t).unwrap().steps[0].key, "enter");
    assert_eq!(parse_spec("escape", None, &t).unwrap().steps[0].key, "esc");
}

#[test]
fn test_mod_follows_platform() {
    let mac = KeyTable::new(Platform::Mac);

    assert_eq!(parse_spec("mod+s", None, &mac).unwrap().steps[0].modifiers, mods(&[Modifier::Meta]));
    assert_eq!(parse_spec("mod+s", None, &table()).unwrap().steps[0].modifiers, mods(&[Modifier::Ctrl]));
}

#[test]
fn test_modifier_alone_includes_itself() {
    let combo = parse_spec("shift", None, &table()).unwrap();
    let step = &combo.steps[0];

    assert_eq!(step.key, "shift");
    assert_eq!(step.modifiers, mods(&[Modifier::Shift]));
    assert_eq!(step.phase, Phase::Down);
}

#[test]
fn test_plus_key() {
    let plain = parse_spec("+", None, &table()).unwrap();
    assert_eq!(plain.steps[0].key, "+");

    let combo = parse_spec("ctrl++", None, &table()).unwrap();
    assert_eq!(combo.steps[0].key, "+");
    assert_eq!(combo.steps[0].modifiers, mods(&[Modifier::Ctrl]));
}

#[test]
fn test_unknown_key_matches_literally() {
    let combo = parse_spec("hyper", None, &table()).unwrap();
    assert_eq!(combo.steps[0].key, "hyper");
    assert_eq!(combo.steps[0].phase, Phase::Press);
}

// ============================================================================
// Phases
// ============================================================================

#[test]
fn test_special_keys_prefer_down() {
    let t = table();

    for key in ["enter", "esc", "left", "f5", "pageup", "space", "backspace"] {
        let combo = parse_spec(key, None, &t).unwrap();
        assert_eq!(combo.steps[0].phase, Phase::Down, "{} should bind on down", key);
    }
}

#[test]
fn test_digits_prefer_press() {
    // Numpad digits share their names with the top-row digits
    let combo = parse_spec("5", None, &table()).unwrap();
    assert_eq!(combo.steps[0].phase, Phase::Press);
}

#[test]
fn test_explicit_phase_wins() {
    let combo = parse_spec("a", Some(Phase::Up), &table()).unwrap();
    assert_eq!(combo.steps[0].phase, Phase::Up);

    let combo = parse_spec("enter", Some(Phase::Press), &table()).unwrap();
    assert_eq!(combo.steps[0].phase, Phase::Press);
}

#[test]
fn test_press_with_modifiers_becomes_down() {
    let combo = parse_spec("ctrl+a", Some(Phase::Press), &table()).unwrap();
    assert_eq!(combo.steps[0].phase, Phase::Down);
}

#[test]
fn test_sequence_phases_per_step() {
    let combo = parse_spec("g enter", None, &table()).unwrap();

    assert_eq!(combo.steps[0].phase, Phase::Press);
    assert_eq!(combo.steps[1].phase, Phase::Down);
}

// ============================================================================
// Shifted punctuation
// ============================================================================

#[test]
fn test_shifted_punctuation_on_press_is_kept() {
    let combo = parse_spec("?", None, &table()).unwrap();
    let step = &combo.steps[0];

    assert_eq!(step.key, "?");
    assert!(step.modifiers.is_empty());
    assert_eq!(step.phase, Phase::Press);
}

#[test]
fn test_shifted_punctuation_on_down_is_unshifted() {
    let combo = parse_spec("?", Some(Phase::Down), &table()).unwrap();
    let step = &combo.steps[0];

    assert_eq!(step.key, "/");
    assert_eq!(step.modifiers, mods(&[Modifier::Shift]));
    assert_eq!(step.phase, Phase::Down);
}

#[test]
fn test_pick_best_phase() {
    let t = table();
    let none = Modifiers::new();

    assert_eq!(pick_best_phase("a", &none, None, &t), Phase::Press);
    assert_eq!(pick_best_phase("enter", &none, None, &t), Phase::Down);
    assert_eq!(pick_best_phase("a", &mods(&[Modifier::Alt]), None, &t), Phase::Down);
    assert_eq!(pick_best_phase("a", &mods(&[Modifier::Alt]), Some(Phase::Up), &t), Phase::Up);
}
