//! Plain-text shortcut hints
//!
//! Formats a spec for people: keys are uppercased, well-known keys become
//! their keyboard glyphs, combo keys are written next to each other and
//! sequence steps are separated by ` › `.
//!
//! `"command+a"` → `"⌘A"`, `"g i"` → `"G › I"`.

use crate::core::keys::Platform;

/// Separator between sequence steps
pub const SEQUENCE_SEPARATOR: &str = " › ";

fn glyph(key: &str, platform: Platform) -> Option<&'static str> {
    let glyph = match key {
        "enter" | "return" => "⏎",
        "command" | "meta" => "⌘",
        "option" | "alt" => "⌥",
        "shift" => "⇧",
        "ctrl" | "control" => "Ctrl",
        "esc" | "escape" => "⎋",
        "delete" | "backspace" => "⌫",
        "left" => "←",
        "right" => "→",
        "up" => "↑",
        "down" => "↓",
        "mod" => match platform {
            Platform::Mac => "⌘",
            Platform::Other => "Ctrl",
        },
        _ => return None,
    };
    Some(glyph)
}

/// Format a spec as a user-facing hint
pub fn format_keybinding(spec: &str, platform: Platform) -> String {
    spec.split_whitespace()
        .map(|step| {
            let keys: Vec<&str> = if step == "+" {
                vec!["+"]
            } else {
                step.split('+').filter(|k| !k.is_empty()).collect()
            };

            keys.into_iter()
                .map(|key| match glyph(key, platform) {
                    Some(glyph) => glyph.to_string(),
                    None => key.to_uppercase(),
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join(SEQUENCE_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uppercases_simple_letters() {
        assert_eq!(format_keybinding("a", Platform::Other), "A");
    }

    #[test]
    fn test_formats_combos() {
        assert_eq!(format_keybinding("a+b", Platform::Other), "AB");
    }

    #[test]
    fn test_formats_sequences() {
        assert_eq!(format_keybinding("a b", Platform::Other), "A › B");
        assert_eq!(
            format_keybinding("up up down down", Platform::Other),
            "↑ › ↑ › ↓ › ↓"
        );
    }

    #[test]
    fn test_formats_modifiers() {
        assert_eq!(format_keybinding("ctrl", Platform::Other), "Ctrl");
        assert_eq!(format_keybinding("alt", Platform::Other), "⌥");
        assert_eq!(format_keybinding("command", Platform::Other), "⌘");
        assert_eq!(format_keybinding("meta", Platform::Other), "⌘");
        assert_eq!(format_keybinding("shift", Platform::Other), "⇧");
    }

    #[test]
    fn test_mod_follows_platform() {
        assert_eq!(format_keybinding("mod+s", Platform::Mac), "⌘S");
        assert_eq!(format_keybinding("mod+s", Platform::Other), "CtrlS");
    }
}
