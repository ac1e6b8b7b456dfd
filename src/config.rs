//! Server-level game defaults (session rules + bot profile) from TOML.
//!
//! See `GameConfig` for the expected schema. Every rule can still be
//! overridden per game in the `start_game` request.

use serde::Deserialize;
use tracing::{error, info};

use crate::bot::BotProfile;

#[derive(Clone, Copy, Debug, Deserialize, Default)]
pub struct GameConfig {
  #[serde(default)]
  pub rules: GameRules,
  #[serde(default)]
  pub bot: BotProfile,
}

/// Session rules. `round_timeout_secs = 0` disables the round deadline.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GameRules {
  pub question_limit: u32,
  pub starting_lives: u32,
  pub round_timeout_secs: u64,
  /// Questions played per level tier before the next one (easy → hard).
  pub questions_per_level: u32,
}

impl Default for GameRules {
  fn default() -> Self {
    Self {
      question_limit: 15,
      starting_lives: 3,
      round_timeout_secs: 30,
      questions_per_level: 5,
    }
  }
}

/// Attempt to load `GameConfig` from GAME_CONFIG_PATH. On any parsing/IO
/// error, returns None and the built-in defaults apply.
pub fn load_game_config_from_env() -> Option<GameConfig> {
  let path = std::env::var("GAME_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<GameConfig>(&s) {
      Ok(cfg) => {
        info!(target: "mathduel_backend", %path, "Loaded game config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "mathduel_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "mathduel_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_apply_when_tables_are_missing() {
    let cfg: GameConfig = toml::from_str("").expect("empty config");
    assert_eq!(cfg.rules, GameRules::default());
    assert!((cfg.bot.base_accuracy - 0.85).abs() < f64::EPSILON);
  }

  #[test]
  fn partial_tables_override_only_named_fields() {
    let cfg: GameConfig = toml::from_str(
      r#"
      [rules]
      question_limit = 5
      starting_lives = 1

      [bot]
      base_accuracy = 0.5
      "#,
    )
    .expect("partial config");
    assert_eq!(cfg.rules.question_limit, 5);
    assert_eq!(cfg.rules.starting_lives, 1);
    assert_eq!(cfg.rules.round_timeout_secs, 30);
    assert!((cfg.bot.base_accuracy - 0.5).abs() < f64::EPSILON);
    assert!((cfg.bot.max_think_secs - 3.0).abs() < f64::EPSILON);
  }
}
