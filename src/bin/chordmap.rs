// Chordmap CLI
// Replays a script of key edges through the keymap and prints what the host sees

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;

use chordmap_core::config::parse_key_action;
use chordmap_core::{Config, KeyPos, Keymap, KeyboardEngine, Profile, ProfileKind, RecordingHost};

/// Split-keyboard keymap simulator
#[derive(Parser, Debug)]
#[command(name = "chordmap")]
#[command(version)]
#[command(about = "Replay key events through a crkbd keymap", long_about = None)]
struct Args {
    /// TOML configuration file (defaults to the user config directory)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Keymap profile, overriding the config file (classic or modal)
    #[arg(short, long, value_name = "PROFILE")]
    profile: Option<String>,

    /// Event script; read from stdin when omitted
    #[arg(short, long, value_name = "SCRIPT")]
    script: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Validate config and exit
    #[arg(long)]
    check_config: bool,
}

/// One line of an event script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Press(KeyPos, u32),
    Release(KeyPos, u32),
    Tick(u32),
}

/// `row,col` or a keymap expression bound on the lowest layer
fn parse_position(token: &str, keymap: &Keymap) -> Result<KeyPos> {
    if let Some((row, col)) = token.split_once(',') {
        let pos = KeyPos::new(
            row.trim().parse().with_context(|| format!("bad row in '{}'", token))?,
            col.trim().parse().with_context(|| format!("bad column in '{}'", token))?,
        );
        if !pos.is_valid() {
            bail!("{} is not a key on the 3x6+3 layout", pos);
        }
        return Ok(pos);
    }

    let action = parse_key_action(token).with_context(|| format!("bad key '{}'", token))?;
    Keymap::positions()
        .find(|&pos| keymap.action_on_layer(0, pos) == action)
        .ok_or_else(|| anyhow!("{} is not bound on the base layer", action))
}

fn parse_time(token: Option<&str>) -> Result<u32> {
    let token = token.ok_or_else(|| anyhow!("missing timestamp"))?;
    token
        .parse()
        .with_context(|| format!("bad timestamp '{}'", token))
}

fn parse_step(line: &str, keymap: &Keymap) -> Result<Option<Step>> {
    let line = line.split('#').next().unwrap_or("").trim();
    if line.is_empty() {
        return Ok(None);
    }

    let mut tokens = line.split_whitespace();
    let verb = tokens.next().unwrap_or("");
    let step = match verb {
        "press" | "release" => {
            let key = tokens.next().ok_or_else(|| anyhow!("{} needs a key", verb))?;
            let pos = parse_position(key, keymap)?;
            let time = parse_time(tokens.next())?;
            if verb == "press" {
                Step::Press(pos, time)
            } else {
                Step::Release(pos, time)
            }
        }
        "tick" => Step::Tick(parse_time(tokens.next())?),
        other => bail!("unknown command '{}'", other),
    };
    if let Some(extra) = tokens.next() {
        bail!("unexpected '{}'", extra);
    }
    Ok(Some(step))
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_toml_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::load_default().context("failed to load default config")?,
    };
    if let Some(name) = &args.profile {
        config.profile =
            ProfileKind::from_str(name).map_err(|_| anyhow!("unknown profile '{}'", name))?;
    }
    Ok(config)
}

fn read_script(args: &Args) -> Result<String> {
    match &args.script {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display())),
        None => {
            let mut script = String::new();
            io::stdin()
                .read_to_string(&mut script)
                .context("failed to read script from stdin")?;
            Ok(script)
        }
    }
}

fn run(profile: Profile, script: &str) -> Result<()> {
    let mut engine = KeyboardEngine::new(profile, RecordingHost::new());
    engine.post_init();

    for (number, line) in script.lines().enumerate() {
        let step = parse_step(line, engine.keymap())
            .with_context(|| format!("script line {}", number + 1))?;
        match step {
            Some(Step::Press(pos, time)) => engine.press(pos, time),
            Some(Step::Release(pos, time)) => engine.release(pos, time),
            Some(Step::Tick(time)) => engine.tick(time),
            None => continue,
        }
        for event in engine.host_mut().take_events() {
            println!("{:>8}  {}", engine.now(), event);
        }
    }

    if !engine.is_idle() {
        log::warn!("script ended with a decision still pending");
    }
    for keystate in engine.held_keys() {
        log::warn!("{} still held at the end of the script", keystate.pos);
    }
    for keycode in engine.host().stuck_keys() {
        log::warn!("{} registered and never released", keycode);
    }
    println!("state: {}", engine.state());
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let config = load_config(&args)?;
    let profile = config.build_profile();

    if args.check_config {
        println!(
            "Configuration is valid: {} profile, {} layers, {} combos",
            config.profile,
            profile.keymap.len(),
            profile.combos.len()
        );
        return Ok(());
    }

    let script = read_script(&args)?;
    run(profile, &script)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classic_keymap() -> Keymap {
        Profile::classic().keymap
    }

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["chordmap", "--config", "/tmp/test.toml"]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/test.toml")));
        assert!(args.profile.is_none());
        assert!(!args.verbose);
        assert!(!args.check_config);
    }

    #[test]
    fn test_args_with_options() {
        let args = Args::parse_from([
            "chordmap",
            "--profile",
            "classic",
            "--script",
            "taps.txt",
            "--verbose",
            "--check-config",
        ]);
        assert_eq!(args.profile.as_deref(), Some("classic"));
        assert_eq!(args.script, Some(PathBuf::from("taps.txt")));
        assert!(args.verbose);
        assert!(args.check_config);
    }

    #[test]
    fn test_parse_step_by_name_and_position() {
        let keymap = classic_keymap();
        assert_eq!(
            parse_step("press KC_Q 10", &keymap).unwrap(),
            Some(Step::Press(KeyPos::new(0, 1), 10))
        );
        assert_eq!(
            parse_step("release 3,4 200  # space", &keymap).unwrap(),
            Some(Step::Release(KeyPos::new(3, 4), 200))
        );
        assert_eq!(parse_step("tick 500", &keymap).unwrap(), Some(Step::Tick(500)));
        assert_eq!(parse_step("   # comment only", &keymap).unwrap(), None);
    }

    #[test]
    fn test_parse_step_errors() {
        let keymap = classic_keymap();
        assert!(parse_step("press KC_Q", &keymap).is_err());
        assert!(parse_step("press 3,0 10", &keymap).is_err());
        assert!(parse_step("hold KC_Q 10", &keymap).is_err());
        assert!(parse_step("tick 10 20", &keymap).is_err());
        assert!(parse_step("press KC_F13 10", &keymap).is_err());
    }
}
