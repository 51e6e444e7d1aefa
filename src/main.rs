//! CLI entry point for keytrap
//!
//! Provides a command-line interface for inspecting specs, listing
//! keymap files and replaying scripted keystrokes against a keymap.

use clap::{Parser, Subcommand};
use colored::*;
use keytrap::config::{Keymap, KeymapEntry, KeymapFile};
use keytrap::core::display::format_keybinding;
use keytrap::core::normalizer::normalize;
use keytrap::core::simulate::{parse_script, ScriptStep};
use keytrap::core::{action, Engine, EventResponse, KeyTable, ManualClock, Phase, Platform};
use keytrap::shortcuts::KeyboardShortcuts;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser)]
#[command(name = "keytrap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how a key spec is parsed
    Parse {
        /// Key spec, e.g. "mod+s" or "g i"
        spec: String,

        /// Force a phase (press, down, up)
        #[arg(short, long)]
        phase: Option<Phase>,

        /// Platform used to resolve "mod" (mac, other)
        #[arg(long)]
        platform: Option<Platform>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List the shortcuts of a keymap file
    List {
        /// Path to the keymap file
        #[arg(short, long, default_value = "~/.config/keytrap/keymap.conf")]
        keymap: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Replay a keystroke script against a keymap
    Replay {
        /// Path to the keymap file
        #[arg(short, long, default_value = "~/.config/keytrap/keymap.conf")]
        keymap: PathBuf,

        /// Path to the script (type/press/down/up/wait lines)
        #[arg(short, long)]
        script: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            spec,
            phase,
            platform,
            json,
        } => parse_command(&spec, phase, platform.unwrap_or_default(), json)?,
        Commands::List { keymap, json } => list_shortcuts(&keymap, json)?,
        Commands::Replay { keymap, script } => replay(&keymap, &script)?,
    }

    Ok(())
}

/// Console logging on stderr, filtered by RUST_LOG (default: warn)
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(filter);

    tracing_subscriber::registry().with(console_layer).init();
}

/// Print the parsed steps of a spec
fn parse_command(spec: &str, phase: Option<Phase>, platform: Platform, as_json: bool) -> anyhow::Result<()> {
    let table = KeyTable::new(platform);
    let combo = keytrap::core::parser::parse_spec(spec, phase, &table)?;
    let hint = format_keybinding(&combo.spec, platform);

    if as_json {
        let output = json!({
            "spec": &combo.spec,
            "hint": &hint,
            "sequence": combo.is_sequence(),
            "steps": &combo.steps,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{} {}  {}", "→".cyan(), combo.spec.bold(), hint.dimmed());
    for (idx, step) in combo.steps.iter().enumerate() {
        println!("  {} {}", format!("{}.", idx + 1).dimmed(), step.to_string().cyan());
    }

    Ok(())
}

fn load_keymap(path: &Path) -> anyhow::Result<(KeymapFile, Keymap)> {
    let file = KeymapFile::new(path.to_path_buf())?;
    let keymap = file.load()?;
    Ok((file, keymap))
}

/// List the public shortcuts in a keymap file
fn list_shortcuts(path: &Path, as_json: bool) -> anyhow::Result<()> {
    let (file, keymap) = load_keymap(path)?;
    let platform = keymap.settings.platform;
    let public: Vec<&KeymapEntry> = keymap.entries.iter().filter(|e| !e.options.private).collect();

    if as_json {
        let entries: Vec<_> = public
            .iter()
            .map(|entry| {
                json!({
                    "name": &entry.name,
                    "spec": &entry.spec,
                    "hint": format_keybinding(&entry.spec, platform),
                    "options": &entry.options,
                    "line": entry.line,
                })
            })
            .collect();
        let output = json!({
            "settings": &keymap.settings,
            "entries": entries,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", format!("Shortcuts from: {}\n", file.path().display()).bold());

    for entry in &public {
        let hint = format_keybinding(&entry.spec, platform).cyan().bold();
        let mut flags = Vec::new();
        if let Some(phase) = entry.options.phase {
            flags.push(phase.to_string());
        }
        if entry.options.prevent_default {
            flags.push("prevent".to_string());
        }

        println!(
            "{} → {} {}",
            hint,
            entry.name.green(),
            if flags.is_empty() {
                String::new()
            } else {
                format!("[{}]", flags.join(", ")).dimmed().to_string()
            }
        );
    }

    println!(
        "\n{} Total: {} shortcuts ({} private)",
        "✓".green(),
        public.len(),
        keymap.entries.len() - public.len()
    );

    Ok(())
}

/// Feed a keystroke script through an engine running on a manual clock
fn replay(keymap_path: &Path, script_path: &Path) -> anyhow::Result<()> {
    let (_, keymap) = load_keymap(keymap_path)?;

    let script_path = PathBuf::from(
        shellexpand::tilde(
            script_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Invalid path encoding"))?,
        )
        .as_ref(),
    );
    let script = fs::read_to_string(&script_path)
        .map_err(|e| anyhow::anyhow!("Failed to read script: {}", e))?;

    let clock = ManualClock::new();
    let engine = Engine::with_clock(keymap.settings, clock.clone());
    let mut shortcuts = KeyboardShortcuts::with_engine(engine);

    keymap.register_all(&mut shortcuts, |entry| {
        let name = entry.name.clone();
        action(move |_, spec| {
            println!("    {} {} ({})", "✓".green(), name.green().bold(), spec);
            EventResponse::Default
        })
    })?;

    let steps = parse_script(shortcuts.engine().keys(), &script)?;
    println!(
        "{} Replaying {} steps against {} shortcuts\n",
        "→".cyan(),
        steps.len(),
        keymap.entries.len()
    );

    let mut fired = 0;
    for step in steps {
        match step {
            ScriptStep::Wait(duration) => {
                clock.advance(duration);
                shortcuts.engine_mut().poll();
                println!("  {}", format!("wait {}ms", duration.as_millis()).dimmed());
            }
            ScriptStep::Event(raw) => {
                let label = match normalize(shortcuts.engine().keys(), &raw) {
                    Some(event) => {
                        let mods: Vec<&str> = event.modifiers.iter().map(|m| m.as_str()).collect();
                        if mods.is_empty() {
                            format!("{} {}", event.phase, event.character)
                        } else {
                            format!("{} {} [{}]", event.phase, event.character, mods.join("+"))
                        }
                    }
                    None => format!("{} code {}", raw.phase, raw.code),
                };
                println!("  {}", label.cyan());

                let outcome = shortcuts.handle(&raw);
                for sequence in &outcome.advanced {
                    println!("    {} {}", "…".yellow(), sequence.dimmed());
                }
                if outcome.default_prevented {
                    println!("    {}", "default prevented".magenta());
                }
                fired += outcome.fired.len();
            }
        }
    }

    println!("\n{} {} action{} fired", "✓".green(), fired, if fired == 1 { "" } else { "s" });

    Ok(())
}
