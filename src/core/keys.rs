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

//! src/core/keys.rs
//!
//! Static key tables
//!
//! Everything the parser and normaliser need to know about physical keys:
//! - Special key codes (arrows, function keys, modifiers, ...) that cannot
//!   be reported by a character press
//! - Punctuation key codes for down/up events
//! - The US-layout shift map (`!` → `1` + shift)
//! - Spec aliases (`option` → `alt`, `mod` → platform command key)
//!
//! A `KeyTable` is built once per engine. The set of keys that prefer the
//! `Down` phase is precomputed at construction instead of being derived on
//! every parse.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Host platform, used to resolve the `mod` alias
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// macOS / iOS: `mod` is the command key
    Mac,
    /// Everything else: `mod` is control
    Other,
}

impl Platform {
    /// The platform this binary was compiled for
    pub fn current() -> Self {
        if cfg!(any(target_os = "macos", target_os = "ios")) {
            Platform::Mac
        } else {
            Platform::Other
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Platform::current()
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mac" | "macos" | "darwin" => Ok(Platform::Mac),
            "other" | "linux" | "windows" => Ok(Platform::Other),
            other => Err(format!("unknown platform '{}'", other)),
        }
    }
}

/// Key codes that have no usable press character
const SPECIAL_KEYS: &[(u32, &str)] = &[
    (8, "backspace"),
    (9, "tab"),
    (13, "enter"),
    (16, "shift"),
    (17, "ctrl"),
    (18, "alt"),
    (20, "capslock"),
    (27, "esc"),
    (32, "space"),
    (33, "pageup"),
    (34, "pagedown"),
    (35, "end"),
    (36, "home"),
    (37, "left"),
    (38, "up"),
    (39, "right"),
    (40, "down"),
    (45, "ins"),
    (46, "del"),
    (91, "meta"),
    (93, "meta"),
    (224, "meta"),
];

/// Punctuation key codes, only consulted for down/up events
///
/// The first code listed for a character is its canonical code.
const PUNCTUATION_KEYS: &[(u32, &str)] = &[
    (186, ";"),
    (187, "="),
    (188, ","),
    (189, "-"),
    (190, "."),
    (191, "/"),
    (192, "`"),
    (219, "["),
    (220, "\\"),
    (221, "]"),
    (222, "'"),
    (106, "*"),
    (107, "+"),
    (109, "-"),
    (110, "."),
    (111, "/"),
];

/// Shifted characters on a US layout and the key that produces them
const SHIFT_MAP: &[(&str, &str)] = &[
    ("~", "`"),
    ("!", "1"),
    ("@", "2"),
    ("#", "3"),
    ("$", "4"),
    ("%", "5"),
    ("^", "6"),
    ("&", "7"),
    ("*", "8"),
    ("(", "9"),
    (")", "0"),
    ("_", "-"),
    ("+", "="),
    (":", ";"),
    ("\"", "'"),
    ("<", ","),
    (">", "."),
    ("?", "/"),
    ("|", "\\"),
];

/// Numeric keypad codes (`96` is keypad `0`)
const NUMPAD_START: u32 = 96;
/// Function key codes (`112` is `f1`)
const FUNCTION_START: u32 = 112;
const FUNCTION_KEYS: u32 = 19;

/// Precomputed key lookup tables for one engine
#[derive(Clone, Debug)]
pub struct KeyTable {
    platform: Platform,
    special: HashMap<u32, String>,
    punctuation: HashMap<u32, &'static str>,
    to_unshifted: HashMap<&'static str, &'static str>,
    to_shifted: HashMap<&'static str, &'static str>,
    aliases: HashMap<&'static str, &'static str>,
    /// Canonical key name → code, used for simulation
    codes: HashMap<String, u32>,
    /// Keys that cannot be reported by a press event
    down_preferred: HashSet<String>,
}

impl KeyTable {
    /// Build the tables for a platform
    pub fn new(platform: Platform) -> Self {
        let mut special: HashMap<u32, String> = SPECIAL_KEYS
            .iter()
            .map(|(code, name)| (*code, name.to_string()))
            .collect();

        for i in 1..=FUNCTION_KEYS {
            special.insert(FUNCTION_START + i - 1, format!("f{}", i));
        }
        for digit in 0..=9 {
            special.insert(NUMPAD_START + digit, digit.to_string());
        }

        // The numeric keypad is reachable through press, everything else
        // in the special table is not
        let numpad = NUMPAD_START..FUNCTION_START;
        let down_preferred = special
            .iter()
            .filter(|(code, _)| !numpad.contains(*code))
            .map(|(_, name)| name.clone())
            .collect();

        let mut codes: HashMap<String, u32> = HashMap::new();
        for (code, name) in SPECIAL_KEYS {
            codes.entry(name.to_string()).or_insert(*code);
        }
        for i in 1..=FUNCTION_KEYS {
            codes.insert(format!("f{}", i), FUNCTION_START + i - 1);
        }
        for (code, name) in PUNCTUATION_KEYS {
            codes.entry(name.to_string()).or_insert(*code);
        }

        let mod_key = match platform {
            Platform::Mac => "meta",
            Platform::Other => "ctrl",
        };

        Self {
            platform,
            special,
            punctuation: PUNCTUATION_KEYS.iter().copied().collect(),
            to_unshifted: SHIFT_MAP.iter().copied().collect(),
            to_shifted: SHIFT_MAP.iter().map(|(s, u)| (*u, *s)).collect(),
            aliases: [
                ("option", "alt"),
                ("command", "meta"),
                ("return", "enter"),
                ("escape", "esc"),
                ("mod", mod_key),
            ]
            .into_iter()
            .collect(),
            codes,
            down_preferred,
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Resolve a spec alias (`option` → `alt`), or return the key unchanged
    pub fn resolve_alias<'a>(&self, key: &'a str) -> &'a str {
        self.aliases.get(key).copied().unwrap_or(key)
    }

    /// Key name for a down/up key code in the special table
    pub fn special_key(&self, code: u32) -> Option<&str> {
        self.special.get(&code).map(String::as_str)
    }

    /// Character for a down/up punctuation key code
    pub fn punctuation_key(&self, code: u32) -> Option<&'static str> {
        self.punctuation.get(&code).copied()
    }

    /// Unshifted key for a shifted character (`!` → `1`)
    pub fn unshifted(&self, key: &str) -> Option<&'static str> {
        self.to_unshifted.get(key).copied()
    }

    /// Shifted character for an unshifted key (`1` → `!`)
    pub fn shifted(&self, key: &str) -> Option<&'static str> {
        self.to_shifted.get(key).copied()
    }

    /// True when the key cannot be reported by a press event
    pub fn prefers_down(&self, key: &str) -> bool {
        self.down_preferred.contains(key)
    }

    /// Physical key code for a canonical key name
    ///
    /// Letters and digits map to their uppercase ASCII code, as browsers
    /// report them on down/up.
    pub fn code_for(&self, key: &str) -> Option<u32> {
        if let Some(code) = self.codes.get(key) {
            return Some(*code);
        }

        let mut chars = key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphanumeric() => Some(c.to_ascii_uppercase() as u32),
            _ => None,
        }
    }

    /// True when the key name is something the tables know about
    ///
    /// Single characters are always known; anything else must be a
    /// special key, alias or modifier.
    pub fn is_known(&self, key: &str) -> bool {
        key.chars().count() == 1
            || self.codes.contains_key(key)
            || self.aliases.contains_key(key)
    }
}

impl Default for KeyTable {
    fn default() -> Self {
        Self::new(Platform::current())
    }
}
