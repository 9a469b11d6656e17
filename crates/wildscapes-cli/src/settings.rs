//! Command-line settings read from the environment.

use anyhow::{bail, Context};
use std::path::PathBuf;
use wildscapes_core::{BotDifficulty, EndGameRule, GameConfig};

pub const DEFAULT_STORE: &str = "wildscapes-stats.json";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub players: Vec<String>,
    /// Fixed shuffle seed; entropy when absent
    pub seed: Option<u64>,
    pub bot: BotDifficulty,
    pub store_path: PathBuf,
    pub end_rule: EndGameRule,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parse settings from any key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let players: Vec<String> = lookup("WILDSCAPES_PLAYERS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_else(|| vec!["Player 1".to_string()]);
        if players.is_empty() {
            bail!("WILDSCAPES_PLAYERS names no players");
        }

        let seed = lookup("WILDSCAPES_SEED")
            .map(|raw| raw.trim().parse::<u64>())
            .transpose()
            .context("WILDSCAPES_SEED must be an unsigned integer")?;

        let bot = match lookup("WILDSCAPES_BOT").as_deref().map(str::trim) {
            None | Some("greedy") => BotDifficulty::Greedy,
            Some("random") => BotDifficulty::Random,
            Some(other) => bail!("unknown bot difficulty {other:?}, expected random or greedy"),
        };

        let end_rule = match lookup("WILDSCAPES_END_RULE").as_deref().map(str::trim) {
            None | Some("immediate") => EndGameRule::Immediate,
            Some("finish-round") => EndGameRule::FinishRound,
            Some(other) => bail!("unknown end rule {other:?}, expected immediate or finish-round"),
        };

        let store_path = lookup("WILDSCAPES_STORE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE));

        Ok(Self {
            players,
            seed,
            bot,
            store_path,
            end_rule,
        })
    }

    pub fn game_config(&self) -> GameConfig {
        GameConfig::with_end_rule(self.end_rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn parse(pairs: &[(&str, &str)]) -> anyhow::Result<Settings> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let settings = parse(&[]).unwrap();
        assert_eq!(settings.players, vec!["Player 1".to_string()]);
        assert_eq!(settings.seed, None);
        assert_eq!(settings.bot, BotDifficulty::Greedy);
        assert_eq!(settings.store_path, PathBuf::from(DEFAULT_STORE));
        assert_eq!(settings.end_rule, EndGameRule::Immediate);
    }

    #[test]
    fn test_explicit_values() {
        let settings = parse(&[
            ("WILDSCAPES_PLAYERS", "Ada, Bo ,,Cy"),
            ("WILDSCAPES_SEED", "42"),
            ("WILDSCAPES_BOT", "random"),
            ("WILDSCAPES_STORE", "/tmp/w.json"),
            ("WILDSCAPES_END_RULE", "finish-round"),
        ])
        .unwrap();
        assert_eq!(settings.players, vec!["Ada", "Bo", "Cy"]);
        assert_eq!(settings.seed, Some(42));
        assert_eq!(settings.bot, BotDifficulty::Random);
        assert_eq!(settings.store_path, PathBuf::from("/tmp/w.json"));
        assert_eq!(settings.game_config().end_rule, EndGameRule::FinishRound);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(parse(&[("WILDSCAPES_SEED", "soon")]).is_err());
        assert!(parse(&[("WILDSCAPES_BOT", "clever")]).is_err());
        assert!(parse(&[("WILDSCAPES_END_RULE", "never")]).is_err());
        assert!(parse(&[("WILDSCAPES_PLAYERS", " , ")]).is_err());
    }
}
