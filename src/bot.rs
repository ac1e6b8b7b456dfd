//! Bot answer simulation.
//!
//! Pure: given the correct answer and the session difficulty, produce the
//! value the bot will submit plus a simulated think time. The host decides
//! whether to actually wait it out (WebSocket) or only record it (HTTP).
//! Harder settings make the bot slower and less accurate, keeping it
//! beatable by humans; the curve is a config tunable, not a contract.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;

use crate::domain::Difficulty;

/// Accuracy/latency profile, overridable via the `[bot]` config table.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct BotProfile {
  pub base_accuracy: f64,
  pub accuracy_step: f64,
  pub min_think_secs: f64,
  pub max_think_secs: f64,
}

impl Default for BotProfile {
  fn default() -> Self {
    Self {
      base_accuracy: 0.85,
      accuracy_step: 0.10,
      min_think_secs: 0.5,
      max_think_secs: 3.0,
    }
  }
}

impl BotProfile {
  /// Chance of answering correctly at a difficulty.
  pub fn accuracy(&self, difficulty: Difficulty) -> f64 {
    let level = f64::from(difficulty.level());
    (self.base_accuracy - self.accuracy_step * (level - 1.0)).clamp(0.0, 1.0)
  }

  /// Think-time window at a difficulty; widens as the level rises.
  pub fn think_window(&self, difficulty: Difficulty) -> (f64, f64) {
    let level = f64::from(difficulty.level());
    let lo = self.min_think_secs.max(0.0);
    let hi = (self.max_think_secs + 0.5 * (level - 1.0)).max(lo + 0.1);
    (lo, hi)
  }
}

/// One simulated submission.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BotAnswer {
  pub value: i64,
  pub think_secs: f64,
}

/// A wrong bot answer is the correct one, nudged.
const SKEWS: &[i64] = &[-2, -1, 1, 2];

/// Produce the bot's answer for one problem.
pub fn simulate_answer<R: Rng>(
  profile: &BotProfile,
  correct: i64,
  difficulty: Difficulty,
  rng: &mut R,
) -> BotAnswer {
  let (lo, hi) = profile.think_window(difficulty);
  let think_secs = rng.gen_range(lo..hi);
  let value = if rng.gen_bool(profile.accuracy(difficulty)) {
    correct
  } else {
    correct + SKEWS.choose(rng).copied().unwrap_or(1)
  };
  BotAnswer { value, think_secs }
}
