//! Line protocol front end.
//!
//! Reads one `#command` per line from stdin and prints the tagged reply
//! lines to stdout. Logs go to stderr, so stdout stays the game transcript.

use anyhow::{bail, Context, Result};
use chronicles_core::{CharacterClass, HeadlessConfig, HeadlessGame, SessionConfig};
use std::io::{self, BufRead, Write};

/// Run the game until `#quit`, game over or end of input.
pub async fn run_headless(config: HeadlessConfig) -> Result<()> {
    let mut game = HeadlessGame::new(config)
        .await
        .context("failed to start game")?;

    let mut stdout = io::stdout();
    for line in game.banner() {
        println!("{line}");
    }
    println!();
    stdout.flush().ok();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Error reading input: {e}");
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let reply = game.execute(line).await;
        for out in &reply.lines {
            println!("{out}");
        }
        println!();
        stdout.flush().ok();

        if reply.quit {
            break;
        }
    }

    tracing::info!(commands = game.command_count(), "session ended");
    Ok(())
}

/// Build the game configuration from environment variables and arguments.
///
/// Arguments win over the environment.
pub fn parse_config_from_args(args: &[String], session: SessionConfig) -> Result<HeadlessConfig> {
    let mut name: Option<String> = None;
    let mut class = CharacterClass::Warrior;
    let mut load: Option<String> = None;
    let mut session = session;

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        let value = || {
            args.get(i + 1)
                .cloned()
                .with_context(|| format!("{flag} needs a value"))
        };
        match flag {
            "--name" => name = Some(value()?),
            "--class" => class = value()?.parse()?,
            "--load" => load = Some(value()?),
            "--seed" => {
                let seed = value()?;
                session.seed = Some(
                    seed.parse()
                        .with_context(|| format!("invalid seed '{seed}'"))?,
                );
            }
            "--catalog" => session.catalog_path = Some(value()?.into()),
            "--quests" => session.quests_path = Some(value()?.into()),
            "--save-dir" => session.save_dir = value()?.into(),
            other => bail!("unknown argument '{other}' (try --help)"),
        }
        i += 2;
    }

    let config = match load {
        Some(saved) => HeadlessConfig::resume(saved),
        None => HeadlessConfig::custom(name.unwrap_or_else(|| "Adventurer".to_string()), class),
    };
    Ok(config.with_session(session))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("chronicles")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = parse_config_from_args(&args(&[]), SessionConfig::new()).unwrap();
        assert_eq!(config.name, "Adventurer");
        assert_eq!(config.class, CharacterClass::Warrior);
        assert!(!config.load);
    }

    #[test]
    fn test_flags_override_environment() {
        let env = SessionConfig::new().with_save_dir("from_env").with_seed(1);
        let config = parse_config_from_args(
            &args(&["--name", "Aria", "--class", "mage", "--seed", "7", "--save-dir", "cli"]),
            env,
        )
        .unwrap();

        assert_eq!(config.name, "Aria");
        assert_eq!(config.class, CharacterClass::Mage);
        assert_eq!(config.session.seed, Some(7));
        assert_eq!(config.session.save_dir, PathBuf::from("cli"));
    }

    #[test]
    fn test_data_file_flags() {
        let config = parse_config_from_args(
            &args(&["--catalog", "items.txt", "--quests", "quests.txt"]),
            SessionConfig::new(),
        )
        .unwrap();
        assert_eq!(config.session.catalog_path, Some(PathBuf::from("items.txt")));
        assert_eq!(config.session.quests_path, Some(PathBuf::from("quests.txt")));
    }

    #[test]
    fn test_load_flag() {
        let config = parse_config_from_args(&args(&["--load", "Aria"]), SessionConfig::new()).unwrap();
        assert!(config.load);
        assert_eq!(config.name, "Aria");
    }

    #[test]
    fn test_bad_arguments() {
        assert!(parse_config_from_args(&args(&["--class", "bard"]), SessionConfig::new()).is_err());
        assert!(parse_config_from_args(&args(&["--seed", "abc"]), SessionConfig::new()).is_err());
        assert!(parse_config_from_args(&args(&["--name"]), SessionConfig::new()).is_err());
        assert!(parse_config_from_args(&args(&["--fly"]), SessionConfig::new()).is_err());
    }
}
