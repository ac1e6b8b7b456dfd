//! Domain models shared across the backend: difficulty tiers, game modes,
//! players, problems, and per-round verdicts.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GameError;

/// Difficulty tiers. Doubles as the per-question level of a progressive game.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}
impl Default for Difficulty {
  fn default() -> Self { Difficulty::Easy }
}

impl Difficulty {
  /// Static level mapping: 1=easy, 2=medium, 3=hard. Anything else is rejected.
  pub fn from_level(level: u8) -> Result<Self, GameError> {
    match level {
      1 => Ok(Difficulty::Easy),
      2 => Ok(Difficulty::Medium),
      3 => Ok(Difficulty::Hard),
      other => Err(GameError::InvalidLevel(other)),
    }
  }

  pub fn level(self) -> u8 {
    match self {
      Difficulty::Easy => 1,
      Difficulty::Medium => 2,
      Difficulty::Hard => 3,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Difficulty::Easy => "Easy",
      Difficulty::Medium => "Medium",
      Difficulty::Hard => "Hard",
    }
  }
}

/// How the session was set up: all humans, or one human against the bot.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
  Multiplayer,
  SoloVsBot,
}
impl Default for GameMode {
  fn default() -> Self { GameMode::Multiplayer }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlayerKind {
  Human,
  Bot,
}

/// Roster entry as supplied at game start.
#[derive(Clone, Debug, Deserialize)]
pub struct RosterEntry {
  pub name: String,
  #[serde(rename = "isBot", default)]
  pub is_bot: bool,
}

const AVATARS: &[&str] = &["👦", "👧", "🧑", "👩", "🤖", "👨", "👴", "👵"];

/// One participant. Created at game setup, mutated each round by the flow
/// manager, discarded with the session.
#[derive(Clone, Debug, Serialize)]
pub struct Player {
  pub id: String,
  pub name: String,
  pub avatar: String,
  pub kind: PlayerKind,
  pub score: u32,
  pub lives: u32,
  pub correct_answers: u32,
  pub last_response_secs: f64,
}

impl Player {
  pub fn new(name: impl Into<String>, kind: PlayerKind, lives: u32) -> Self {
    let avatar = AVATARS
      .choose(&mut rand::thread_rng())
      .copied()
      .unwrap_or("🙂")
      .to_string();
    Self {
      id: Uuid::new_v4().to_string(),
      name: name.into(),
      avatar,
      kind,
      score: 0,
      lives,
      correct_answers: 0,
      last_response_secs: 0.0,
    }
  }

  pub fn is_bot(&self) -> bool {
    self.kind == PlayerKind::Bot
  }

  /// Still in the game; lives hitting 0 means eliminated.
  pub fn is_active(&self) -> bool {
    self.lives > 0
  }

  pub fn record_correct(&mut self) {
    self.score += 1;
    self.correct_answers += 1;
  }

  /// Losing a life clamps at zero, never underflows.
  pub fn record_miss(&mut self) {
    self.lives = self.lives.saturating_sub(1);
  }
}

/// One generated arithmetic question. Exactly one is active per session;
/// replaced when the next round starts.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Problem {
  pub text: String,
  pub answer: i64,
}

impl Problem {
  /// Tolerant match so "24" and "24.0" both count as the integer 24.
  pub fn matches(&self, value: f64) -> bool {
    (value - self.answer as f64).abs() < 1e-6
  }
}

/// Outcome of a single submission within a round.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
  Correct,
  Wrong,
  /// Unparseable input; scored like a wrong answer.
  Invalid,
  /// The round deadline passed without a submission.
  Timeout,
}

impl Verdict {
  pub fn is_correct(self) -> bool {
    matches!(self, Verdict::Correct)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn lives_clamp_at_zero() {
    let mut p = Player::new("Ada", PlayerKind::Human, 1);
    p.record_miss();
    p.record_miss();
    assert_eq!(p.lives, 0);
    assert!(!p.is_active());
  }

  #[test]
  fn problem_match_tolerates_decimal_input() {
    let p = Problem { text: "6 × 4".into(), answer: 24 };
    assert!(p.matches(24.0));
    assert!(p.matches(24.000_000_01));
    assert!(!p.matches(23.0));
  }

  #[test]
  fn level_mapping_is_total_over_1_to_3() {
    assert_eq!(Difficulty::from_level(1).unwrap(), Difficulty::Easy);
    assert_eq!(Difficulty::from_level(3).unwrap(), Difficulty::Hard);
    assert_eq!(Difficulty::from_level(4), Err(GameError::InvalidLevel(4)));
    assert_eq!(Difficulty::from_level(0), Err(GameError::InvalidLevel(0)));
  }
}
