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

//! src/config/keymap.rs
//!
//! Keymap file parser
//!
//! A keymap file declares named shortcuts and engine settings:
//!
//! ```text
//! # Comment line
//! $leader = g                 # trailing comment
//! set sequence_timeout = 1500
//! bind  = $leader i, Go to inbox
//! bindd = ctrl+s, Save, prevent
//! bindu = shift, Shift released, private
//! ```
//!
//! - `bind` infers the phase, `bindp` / `bindd` / `bindu` force press,
//!   down and up
//! - Trailing flags: `prevent` and `private`
//! - Settings: `sequence_timeout` (ms), `settle_delay` (ms), `platform`
//! - Comments: a `#` that starts a line, or a whitespace-separated `#`
//!   word anywhere after it (`bind = #, Hash` still binds the `#` key)
//!
//! # Architecture
//! Two-pass parsing, like the binding parser it grew out of:
//! 1. First pass: Collect variable definitions
//! 2. Second pass: Parse settings and bindings with variable substitution
//!
//! Every spec is then run through the combo parser for the final
//! platform, so a keymap that loads is a keymap that binds.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_till, take_till1, take_while1},
    character::complete::{char, space0, space1},
    combinator::map,
    multi::many0,
    sequence::preceded,
    IResult, Parser,
};
use std::collections::HashMap;

use crate::config::error::ConfigError;
use crate::config::settings::EngineConfig;
use crate::core::keys::KeyTable;
use crate::core::parser::parse_spec;
use crate::core::types::{Action, Phase};
use crate::shortcuts::{KeyboardShortcuts, ShortcutError, ShortcutOptions};

/// One `bind` line of a keymap
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeymapEntry {
    /// Binding spec after variable substitution
    pub spec: String,

    /// User-visible name
    pub name: String,

    pub options: ShortcutOptions,

    /// Line number in the source file (1-based)
    pub line: usize,
}

/// A parsed keymap file
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Keymap {
    pub settings: EngineConfig,
    pub entries: Vec<KeymapEntry>,
}

impl Keymap {
    /// Register every entry, creating each action with `make_action`
    pub fn register_all<F>(&self, shortcuts: &mut KeyboardShortcuts, mut make_action: F) -> Result<(), ShortcutError>
    where
        F: FnMut(&KeymapEntry) -> Action,
    {
        for entry in &self.entries {
            shortcuts.register(&entry.name, &entry.spec, make_action(entry), entry.options)?;
        }
        Ok(())
    }
}

/// Raw fields of a bind line before validation
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BindLine {
    pub phase: Option<Phase>,
    pub spec: String,
    pub name: String,
    pub flags: Vec<String>,
}

/// Parse a complete keymap file
///
/// # Arguments
/// * `content` - The full keymap file content as a string
///
/// # Returns
/// The settings and entries, or the first error with its line number
pub fn parse_keymap(content: &str) -> Result<Keymap, ConfigError> {
    // First pass: Collect variable definitions
    let variables = collect_variables(content);

    // Second pass: Parse settings and bindings
    let mut keymap = Keymap::default();

    for (line_num, line) in content.lines().enumerate() {
        let line_num = line_num + 1;

        let line_trimmed = strip_comment(line.trim());
        if line_trimmed.is_empty() || line_trimmed.starts_with('#') || line_trimmed.starts_with('$') {
            continue;
        }

        let substituted = substitute_variables(line_trimmed, &variables);
        if let Some(variable) = undefined_variable(&substituted) {
            return Err(ConfigError::UndefinedVariable {
                variable,
                line: line_num,
            });
        }

        if substituted.starts_with("set") {
            let (name, value) = match parse_setting_line(&substituted) {
                Ok((_, pair)) => pair,
                Err(e) => {
                    return Err(ConfigError::InvalidSyntax {
                        line: line_num,
                        message: format!("{:?}", e),
                    })
                }
            };
            apply_setting(&mut keymap.settings, name, value, line_num)?;
            continue;
        }

        if !substituted.starts_with("bind") {
            return Err(ConfigError::InvalidSyntax {
                line: line_num,
                message: format!("expected 'bind' or 'set', found '{}'", substituted),
            });
        }

        let bind = match parse_bind_line(&substituted) {
            Ok((_, bind)) => bind,
            Err(e) => {
                return Err(ConfigError::InvalidSyntax {
                    line: line_num,
                    message: format!("{:?}", e),
                })
            }
        };

        keymap.entries.push(entry_from_line(bind, line_num)?);
    }

    // Validate every spec against the final platform
    let table = KeyTable::new(keymap.settings.platform);
    for entry in &keymap.entries {
        parse_spec(&entry.spec, entry.options.phase, &table).map_err(|source| ConfigError::InvalidSpec {
            line: entry.line,
            source,
        })?;
    }

    tracing::debug!(entries = keymap.entries.len(), "keymap parsed");
    Ok(keymap)
}

/// Collect variable definitions from a keymap
///
/// Variable definition format: `$name = value`
pub fn collect_variables(contents: &str) -> HashMap<String, String> {
    let mut variables = HashMap::new();

    for line in contents.lines() {
        let line_trimmed = strip_comment(line.trim());

        if let Some(definition) = line_trimmed.strip_prefix('$') {
            if let Some((name, value)) = definition.split_once('=') {
                variables.insert(name.trim().to_string(), value.trim().to_string());
            }
        }
    }

    variables
}

/// Cut a trailing comment from a line
///
/// A comment starts at a `#` with whitespace before it and whitespace or
/// the end of the line after it. A `#` glued to other text is a key.
pub fn strip_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    for (idx, _) in line.match_indices('#') {
        let preceded = idx > 0 && bytes[idx - 1].is_ascii_whitespace();
        let followed = bytes.get(idx + 1).is_none_or(|b| b.is_ascii_whitespace());
        if preceded && followed {
            return line[..idx].trim_end();
        }
    }
    line
}

/// Substitute variables in a line
///
/// Longer names are substituted first so `$leader` wins over `$lead`.
pub fn substitute_variables(line: &str, variables: &HashMap<String, String>) -> String {
    let mut names: Vec<&String> = variables.keys().collect();
    names.sort_by_key(|name| std::cmp::Reverse(name.len()));

    let mut result = line.to_string();
    for name in names {
        let pattern = format!("${}", name);
        result = result.replace(&pattern, &variables[name]);
    }

    result
}

/// First `$name` left in a line after substitution
///
/// A lone `$` (the dollar key) is not a variable.
fn undefined_variable(line: &str) -> Option<String> {
    line.match_indices('$').find_map(|(idx, _)| {
        let name: String = line[idx + 1..]
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .collect();
        (!name.is_empty()).then_some(name)
    })
}

/// Parse a single bind line
///
/// Format: `bind[p|d|u] = SPEC, NAME[, FLAG]*`
pub fn parse_bind_line(input: &str) -> IResult<&str, BindLine> {
    let (input, phase) = parse_bind_type(input)?;
    let (input, _) = (space0, char('='), space0).parse(input)?;
    let (input, spec) = take_till1(|c: char| c == ',').parse(input)?;
    let (input, _) = (space0, char(','), space0).parse(input)?;
    let (input, name) = take_till1(|c: char| c == ',').parse(input)?;
    let (input, flags) = many0(preceded(
        (space0, char(','), space0),
        take_till(|c: char| c == ','),
    ))
    .parse(input)?;

    Ok((
        input,
        BindLine {
            phase,
            spec: spec.trim().to_string(),
            name: name.trim().to_string(),
            flags: flags.into_iter().map(|f| f.trim().to_string()).collect(),
        },
    ))
}

/// Parse the bind keyword into an optional forced phase
///
/// `bindp`, `bindd` and `bindu` must be tried before `bind`.
pub fn parse_bind_type(input: &str) -> IResult<&str, Option<Phase>> {
    alt((
        map(tag("bindp"), |_| Some(Phase::Press)),
        map(tag("bindd"), |_| Some(Phase::Down)),
        map(tag("bindu"), |_| Some(Phase::Up)),
        map(tag("bind"), |_| None),
    ))
    .parse(input)
}

/// Parse a `set NAME = VALUE` line
pub fn parse_setting_line(input: &str) -> IResult<&str, (&str, &str)> {
    let (input, _) = (tag("set"), space1).parse(input)?;
    let (input, name) = take_while1(|c: char| c.is_alphanumeric() || c == '_').parse(input)?;
    let (input, _) = (space0, char('='), space0).parse(input)?;
    let value = input.trim();

    Ok(("", (name, value)))
}

fn apply_setting(settings: &mut EngineConfig, name: &str, value: &str, line: usize) -> Result<(), ConfigError> {
    let invalid = |message: String| ConfigError::InvalidSetting {
        name: name.to_string(),
        line,
        message,
    };

    match name {
        "sequence_timeout" => {
            settings.sequence_timeout_ms = value
                .parse()
                .map_err(|_| invalid(format!("expected milliseconds, found '{}'", value)))?;
        }
        "settle_delay" => {
            settings.settle_delay_ms = value
                .parse()
                .map_err(|_| invalid(format!("expected milliseconds, found '{}'", value)))?;
        }
        "platform" => {
            settings.platform = value.parse().map_err(invalid)?;
        }
        _ => return Err(invalid("unknown setting".to_string())),
    }

    Ok(())
}

fn entry_from_line(bind: BindLine, line: usize) -> Result<KeymapEntry, ConfigError> {
    let mut options = ShortcutOptions {
        phase: bind.phase,
        ..ShortcutOptions::default()
    };

    for flag in &bind.flags {
        match flag.as_str() {
            "prevent" => options.prevent_default = true,
            "private" => options.private = true,
            "" => {}
            other => {
                return Err(ConfigError::InvalidSyntax {
                    line,
                    message: format!("unknown flag '{}'", other),
                })
            }
        }
    }

    Ok(KeymapEntry {
        spec: bind.spec,
        name: bind.name,
        options,
        line,
    })
}
