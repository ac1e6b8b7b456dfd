//! Round and session orchestration: the game flow state machine.
//!
//! Phases: Setup → InRound → Evaluating → (InRound | GameOver). All methods
//! are synchronous and free of I/O: the host owns clocks, ticks, and bot
//! scheduling, the engine owns the rules. One `GameSession` value per game,
//! mutated exclusively through these methods.

use std::collections::HashMap;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::bot::{simulate_answer, BotAnswer, BotProfile};
use crate::config::GameRules;
use crate::domain::{Difficulty, GameMode, Player, PlayerKind, Problem, RosterEntry, Verdict};
use crate::error::GameError;
use crate::generator::QuestionGenerator;
use crate::util::{parse_answer, round2};

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
  Setup,
  InRound,
  Evaluating,
  GameOver,
}

/// Session aggregate: roster plus round bookkeeping. Owned by the session,
/// reset only by starting a new game.
#[derive(Debug)]
pub struct GameStats {
  pub question_index: u32,
  pub started_at: Instant,
  pub players: Vec<Player>,
  pub difficulty: Difficulty,
  pub mode: GameMode,
  pub active: bool,
}

/// Everything `GameSession::start` needs.
#[derive(Clone, Debug)]
pub struct GameSettings {
  pub mode: GameMode,
  pub difficulty: Difficulty,
  pub roster: Vec<RosterEntry>,
  pub rules: GameRules,
  pub bot: BotProfile,
}

#[derive(Clone, Debug)]
struct Submission {
  value: Option<f64>,
  elapsed_secs: f64,
  verdict: Verdict,
}

/// The live round: one problem, answered by each active player at most once.
#[derive(Debug)]
pub struct ActiveRound {
  pub number: u32,
  pub level: Difficulty,
  pub problem: Problem,
  pub started_at: Instant,
  submissions: HashMap<String, Submission>,
}

/// Snapshot of a freshly started round, pushed to the host as `problem`.
#[derive(Clone, Debug, Serialize)]
pub struct RoundStart {
  pub number: u32,
  pub level: Difficulty,
  pub text: String,
  pub timeout_secs: u64,
}

/// Per-player outcome of an evaluated round.
#[derive(Clone, Debug, Serialize)]
pub struct PlayerResult {
  pub player_id: String,
  pub name: String,
  pub verdict: Verdict,
  pub answer: Option<f64>,
  pub elapsed_secs: f64,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
  QuestionLimit,
  LastStanding,
  AllEliminated,
  Aborted,
}

#[derive(Clone, Debug, Serialize)]
pub struct GameSummary {
  pub winner: Option<Player>,
  pub ranking: Vec<Player>,
  pub questions_asked: u32,
  pub duration_secs: f64,
  pub reason: GameOverReason,
}

/// What follows an evaluated round.
#[derive(Clone, Debug)]
pub enum NextStep {
  Round(RoundStart),
  Over(GameSummary),
}

#[derive(Clone, Debug)]
pub struct RoundOutcome {
  pub number: u32,
  pub results: Vec<PlayerResult>,
  /// Players whose lives hit zero in this round.
  pub eliminated: Vec<String>,
  pub next: NextStep,
}

/// Result of one submission: the immediate ack plus, when this submission
/// closed the round, the evaluated outcome.
#[derive(Debug)]
pub struct SubmitOutcome {
  pub player_id: String,
  pub correct: bool,
  pub round: Option<RoundOutcome>,
}

#[derive(Debug)]
pub struct GameSession {
  pub id: String,
  stats: GameStats,
  phase: Phase,
  round: Option<ActiveRound>,
  rules: GameRules,
  bot_profile: BotProfile,
  over_reason: Option<GameOverReason>,
}

impl GameSession {
  /// Validate the roster, build the players, and open the first round.
  /// Solo-vs-bot setups that arrive without a bot entry get the house bot.
  pub fn start(settings: GameSettings) -> Result<(Self, RoundStart), GameError> {
    let GameSettings { mode, difficulty, mut roster, rules, bot } = settings;
    if mode == GameMode::SoloVsBot && !roster.iter().any(|e| e.is_bot) {
      roster.push(RosterEntry { name: "Math Bot".into(), is_bot: true });
    }
    if roster.is_empty() {
      return Err(GameError::EmptyRoster);
    }
    let players: Vec<Player> = roster
      .into_iter()
      .map(|e| {
        let kind = if e.is_bot { PlayerKind::Bot } else { PlayerKind::Human };
        let name = if e.name.trim().is_empty() { "Player".to_string() } else { e.name.trim().to_string() };
        Player::new(name, kind, rules.starting_lives.max(1))
      })
      .collect();

    let mut session = Self {
      id: Uuid::new_v4().to_string(),
      stats: GameStats {
        question_index: 0,
        started_at: Instant::now(),
        players,
        difficulty,
        mode,
        active: true,
      },
      phase: Phase::Setup,
      round: None,
      rules,
      bot_profile: bot,
      over_reason: None,
    };
    let first = session.begin_round();
    info!(
      target: "game",
      id = %session.id,
      players = session.stats.players.len(),
      difficulty = %difficulty.label(),
      ?mode,
      "Game started"
    );
    Ok((session, first))
  }

  fn begin_round(&mut self) -> RoundStart {
    self.stats.question_index += 1;
    let number = self.stats.question_index;
    let level = self.level_for(number);
    let problem = QuestionGenerator::for_difficulty(level).generate();
    debug!(target: "game", id = %self.id, number, level = %level.label(), text = %problem.text, "Question loaded");
    let start = RoundStart {
      number,
      level,
      text: problem.text.clone(),
      timeout_secs: self.rules.round_timeout_secs,
    };
    self.round = Some(ActiveRound {
      number,
      level,
      problem,
      started_at: Instant::now(),
      submissions: HashMap::new(),
    });
    self.phase = Phase::InRound;
    start
  }

  /// Per-question level: walks easy → hard by round index, capped at hard.
  /// The session difficulty setting stays fixed; it drives the bot profile.
  fn level_for(&self, number: u32) -> Difficulty {
    let per = self.rules.questions_per_level.max(1);
    let level = ((number - 1) / per + 1).min(3) as u8;
    Difficulty::from_level(level).unwrap_or(self.stats.difficulty)
  }

  /// Record one player's answer. Malformed input is scored as incorrect,
  /// never returned as an error.
  pub fn submit_answer(&mut self, player_id: &str, raw: &str) -> Result<SubmitOutcome, GameError> {
    if !self.stats.active || self.phase != Phase::InRound {
      return Err(GameError::GameNotActive);
    }
    let player = self
      .stats
      .players
      .iter()
      .find(|p| p.id == player_id)
      .ok_or_else(|| GameError::UnknownPlayer(player_id.to_string()))?;
    if !player.is_active() {
      return Err(GameError::PlayerEliminated(player.name.clone()));
    }
    let elapsed = match &self.round {
      Some(r) => r.started_at.elapsed().as_secs_f64(),
      None => return Err(GameError::GameNotActive),
    };
    self.record_submission(player_id, parse_answer(raw), elapsed)
  }

  fn record_submission(
    &mut self,
    player_id: &str,
    value: Option<f64>,
    elapsed_secs: f64,
  ) -> Result<SubmitOutcome, GameError> {
    let round = match self.round.as_mut() {
      Some(r) => r,
      None => return Err(GameError::GameNotActive),
    };
    if round.submissions.contains_key(player_id) {
      return Err(GameError::AlreadyAnswered(player_id.to_string()));
    }
    let verdict = match value {
      Some(v) if round.problem.matches(v) => Verdict::Correct,
      Some(_) => Verdict::Wrong,
      None => Verdict::Invalid,
    };
    round
      .submissions
      .insert(player_id.to_string(), Submission { value, elapsed_secs, verdict });
    if let Some(p) = self.stats.players.iter_mut().find(|p| p.id == player_id) {
      p.last_response_secs = elapsed_secs;
    }
    debug!(
      target: "game",
      id = %self.id,
      player = %player_id,
      ?verdict,
      elapsed_secs = %format!("{elapsed_secs:.2}"),
      "Answer recorded"
    );
    let round_outcome = if self.all_active_answered() { Some(self.evaluate_round()) } else { None };
    Ok(SubmitOutcome {
      player_id: player_id.to_string(),
      correct: verdict.is_correct(),
      round: round_outcome,
    })
  }

  fn all_active_answered(&self) -> bool {
    match &self.round {
      Some(r) => self
        .stats
        .players
        .iter()
        .filter(|p| p.is_active())
        .all(|p| r.submissions.contains_key(&p.id)),
      None => false,
    }
  }

  /// Timeout path: the host tick calls this when the round deadline passes.
  /// Active players without a submission are scored as `Timeout`.
  pub fn force_evaluate(&mut self) -> Result<RoundOutcome, GameError> {
    if !self.stats.active || self.phase != Phase::InRound || self.round.is_none() {
      return Err(GameError::GameNotActive);
    }
    Ok(self.evaluate_round())
  }

  /// Apply verdicts: +1 score for correct, one life off (clamped) otherwise.
  fn evaluate_round(&mut self) -> RoundOutcome {
    self.phase = Phase::Evaluating;
    let round = match self.round.take() {
      Some(r) => r,
      None => {
        let summary = self.finish(GameOverReason::Aborted);
        return RoundOutcome {
          number: self.stats.question_index,
          results: vec![],
          eliminated: vec![],
          next: NextStep::Over(summary),
        };
      }
    };

    let mut results = Vec::with_capacity(self.stats.players.len());
    let mut eliminated = Vec::new();
    let session_id = self.id.clone();
    for p in self.stats.players.iter_mut() {
      if !p.is_active() {
        continue;
      }
      let (verdict, answer, elapsed) = match round.submissions.get(&p.id) {
        Some(s) => (s.verdict, s.value, s.elapsed_secs),
        None => (Verdict::Timeout, None, round.started_at.elapsed().as_secs_f64()),
      };
      if verdict.is_correct() {
        p.record_correct();
      } else {
        p.record_miss();
        if !p.is_active() {
          eliminated.push(p.id.clone());
          info!(target: "game", id = %session_id, player = %p.name, "Player eliminated");
        }
      }
      results.push(PlayerResult {
        player_id: p.id.clone(),
        name: p.name.clone(),
        verdict,
        answer,
        elapsed_secs: round2(elapsed),
      });
    }

    let next = self.advance_or_finish();
    RoundOutcome { number: round.number, results, eliminated, next }
  }

  /// Terminal when the question limit is reached or too few players remain;
  /// otherwise the next round opens immediately.
  fn advance_or_finish(&mut self) -> NextStep {
    let active = self.stats.players.iter().filter(|p| p.is_active()).count();
    let roster = self.stats.players.len();
    if active == 0 {
      return NextStep::Over(self.finish(GameOverReason::AllEliminated));
    }
    if roster > 1 && active <= 1 {
      return NextStep::Over(self.finish(GameOverReason::LastStanding));
    }
    if self.stats.question_index >= self.rules.question_limit.max(1) {
      return NextStep::Over(self.finish(GameOverReason::QuestionLimit));
    }
    NextStep::Round(self.begin_round())
  }

  fn finish(&mut self, reason: GameOverReason) -> GameSummary {
    self.stats.active = false;
    self.phase = Phase::GameOver;
    self.round = None;
    self.over_reason = Some(reason);
    let summary = self.summary(reason);
    info!(
      target: "game",
      id = %self.id,
      ?reason,
      winner = summary.winner.as_ref().map(|w| w.name.as_str()).unwrap_or("draw"),
      questions = summary.questions_asked,
      "Game over"
    );
    summary
  }

  /// Host-driven cancellation (client pressed end-game or went away).
  pub fn abort(&mut self) -> GameSummary {
    match self.game_over_summary() {
      Some(summary) => summary,
      None => self.finish(GameOverReason::Aborted),
    }
  }

  /// Final summary once the game has ended.
  pub fn game_over_summary(&self) -> Option<GameSummary> {
    self.over_reason.map(|reason| self.summary(reason))
  }

  /// Winner rule: highest score, tie broken by most lives, further tie is a
  /// draw. The ranking keeps roster order among full ties.
  fn summary(&self, reason: GameOverReason) -> GameSummary {
    let mut ranking: Vec<Player> = self.stats.players.clone();
    ranking.sort_by(|a, b| (b.score, b.lives).cmp(&(a.score, a.lives)));
    let winner = match ranking.as_slice() {
      [] => None,
      [only] => Some(only.clone()),
      [first, second, ..] => {
        if (first.score, first.lives) == (second.score, second.lives) {
          None
        } else {
          Some(first.clone())
        }
      }
    };
    GameSummary {
      winner,
      ranking,
      questions_asked: self.stats.question_index,
      duration_secs: round2(self.stats.started_at.elapsed().as_secs_f64()),
      reason,
    }
  }

  /// Simulate answers for every active bot that hasn't answered this round.
  /// Nothing is recorded; the host schedules or applies them.
  pub fn simulate_bots(&self) -> Vec<(String, BotAnswer)> {
    let round = match &self.round {
      Some(r) => r,
      None => return vec![],
    };
    let mut rng = rand::thread_rng();
    self
      .stats
      .players
      .iter()
      .filter(|p| p.is_bot() && p.is_active() && !round.submissions.contains_key(&p.id))
      .map(|p| {
        (
          p.id.clone(),
          simulate_answer(&self.bot_profile, round.problem.answer, self.stats.difficulty, &mut rng),
        )
      })
      .collect()
  }

  /// Record bot answers immediately (HTTP flow): the simulated think time is
  /// written as the response time instead of being slept. Returns the
  /// outcome when a bot submission closed the round.
  pub fn apply_bot_answers(&mut self) -> Option<RoundOutcome> {
    for (player_id, answer) in self.simulate_bots() {
      if let Ok(outcome) = self.record_submission(&player_id, Some(answer.value as f64), answer.think_secs) {
        if outcome.round.is_some() {
          return outcome.round;
        }
      }
    }
    None
  }

  pub fn phase(&self) -> Phase {
    self.phase
  }

  pub fn stats(&self) -> &GameStats {
    &self.stats
  }

  pub fn players(&self) -> &[Player] {
    &self.stats.players
  }

  pub fn current_round(&self) -> Option<&ActiveRound> {
    self.round.as_ref()
  }

  pub fn rules(&self) -> &GameRules {
    &self.rules
  }

  pub fn round_number(&self) -> Option<u32> {
    self.round.as_ref().map(|r| r.number)
  }

  pub fn round_elapsed_secs(&self) -> Option<f64> {
    self.round.as_ref().map(|r| r.started_at.elapsed().as_secs_f64())
  }

  /// Seconds until the round deadline, clamped at 0. None when no round is
  /// live or the timeout is disabled.
  pub fn round_remaining_secs(&self) -> Option<f64> {
    let r = self.round.as_ref()?;
    if self.rules.round_timeout_secs == 0 {
      return None;
    }
    let limit = self.rules.round_timeout_secs as f64;
    Some((limit - r.started_at.elapsed().as_secs_f64()).max(0.0))
  }

  pub fn round_timed_out(&self) -> bool {
    matches!(self.round_remaining_secs(), Some(r) if r <= 0.0)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn human(name: &str) -> RosterEntry {
    RosterEntry { name: name.into(), is_bot: false }
  }

  fn bot(name: &str) -> RosterEntry {
    RosterEntry { name: name.into(), is_bot: true }
  }

  fn rules(limit: u32, lives: u32) -> GameRules {
    GameRules {
      question_limit: limit,
      starting_lives: lives,
      round_timeout_secs: 0,
      questions_per_level: 5,
    }
  }

  fn settings(roster: Vec<RosterEntry>, rules: GameRules) -> GameSettings {
    GameSettings {
      mode: GameMode::Multiplayer,
      difficulty: Difficulty::Easy,
      roster,
      rules,
      bot: BotProfile::default(),
    }
  }

  fn correct_answer(s: &GameSession) -> String {
    s.current_round().expect("live round").problem.answer.to_string()
  }

  fn wrong_answer(s: &GameSession) -> String {
    (s.current_round().expect("live round").problem.answer + 1).to_string()
  }

  fn player_ids(s: &GameSession) -> Vec<String> {
    s.players().iter().map(|p| p.id.clone()).collect()
  }

  #[test]
  fn five_rounds_reach_game_over_with_deterministic_winner() {
    let (mut s, first) =
      GameSession::start(settings(vec![human("Ada"), bot("Math Bot")], rules(5, 3))).expect("start");
    assert_eq!(first.number, 1);
    let [ada, robot] = [player_ids(&s)[0].clone(), player_ids(&s)[1].clone()];

    let mut last = None;
    for round in 1..=5 {
      let good = correct_answer(&s);
      let ack = s.submit_answer(&ada, &good).expect("human submit");
      assert!(ack.correct);
      assert!(ack.round.is_none(), "round must wait for the bot");
      // The bot fumbles the first two rounds, then recovers.
      let bot_answer = if round <= 2 { wrong_answer(&s) } else { correct_answer(&s) };
      let outcome = s.submit_answer(&robot, &bot_answer).expect("bot submit").round.expect("round closes");
      last = Some(outcome);
    }

    let outcome = last.expect("outcome");
    match outcome.next {
      NextStep::Over(summary) => {
        assert_eq!(summary.reason, GameOverReason::QuestionLimit);
        assert_eq!(summary.questions_asked, 5);
        let winner = summary.winner.expect("winner");
        assert_eq!(winner.name, "Ada");
        assert_eq!(winner.score, 5);
        assert_eq!(summary.ranking[1].score, 3);
        assert_eq!(summary.ranking[1].lives, 1);
      }
      NextStep::Round(_) => panic!("expected game over after the question limit"),
    }
    assert_eq!(s.phase(), Phase::GameOver);
    assert!(!s.stats().active);
  }

  #[test]
  fn wrong_answer_costs_one_life_for_that_player_only() {
    let (mut s, _) =
      GameSession::start(settings(vec![human("Ada"), human("Grace")], rules(10, 3))).expect("start");
    let [ada, grace] = [player_ids(&s)[0].clone(), player_ids(&s)[1].clone()];
    let bad = wrong_answer(&s);
    let good = correct_answer(&s);
    s.submit_answer(&ada, &bad).expect("submit");
    s.submit_answer(&grace, &good).expect("submit");
    assert_eq!(s.players()[0].lives, 2);
    assert_eq!(s.players()[1].lives, 3);
    assert_eq!(s.players()[1].score, 1);
  }

  #[test]
  fn non_numeric_input_scores_as_invalid_without_erroring() {
    let (mut s, _) = GameSession::start(settings(vec![human("Ada"), human("Grace")], rules(10, 3)))
      .expect("start");
    let [ada, grace] = [player_ids(&s)[0].clone(), player_ids(&s)[1].clone()];
    let ack = s.submit_answer(&ada, "banana").expect("invalid input is not an error");
    assert!(!ack.correct);
    let good = correct_answer(&s);
    let outcome = s.submit_answer(&grace, &good).expect("submit").round.expect("closes");
    let ada_result = outcome.results.iter().find(|r| r.player_id == ada).expect("result");
    assert_eq!(ada_result.verdict, Verdict::Invalid);
    assert_eq!(ada_result.answer, None);
    assert_eq!(s.players()[0].lives, 2);
  }

  #[test]
  fn elimination_ends_a_two_player_game() {
    let (mut s, _) =
      GameSession::start(settings(vec![human("Ada"), bot("Math Bot")], rules(10, 1))).expect("start");
    let [ada, robot] = [player_ids(&s)[0].clone(), player_ids(&s)[1].clone()];
    let good = correct_answer(&s);
    let bad = wrong_answer(&s);
    s.submit_answer(&ada, &good).expect("submit");
    let outcome = s.submit_answer(&robot, &bad).expect("submit").round.expect("closes");
    assert_eq!(outcome.eliminated, vec![robot]);
    match outcome.next {
      NextStep::Over(summary) => {
        assert_eq!(summary.reason, GameOverReason::LastStanding);
        assert_eq!(summary.winner.expect("winner").name, "Ada");
      }
      NextStep::Round(_) => panic!("expected last-standing game over"),
    }
  }

  #[test]
  fn timeout_scores_missing_players_and_costs_a_life() {
    let mut cfg = rules(10, 3);
    cfg.round_timeout_secs = 30;
    let (mut s, _) = GameSession::start(settings(vec![human("Ada"), bot("Math Bot")], cfg)).expect("start");
    let [ada, robot] = [player_ids(&s)[0].clone(), player_ids(&s)[1].clone()];
    let good = correct_answer(&s);
    s.submit_answer(&ada, &good).expect("submit");
    let outcome = s.force_evaluate().expect("force evaluate");
    let bot_result = outcome.results.iter().find(|r| r.player_id == robot).expect("result");
    assert_eq!(bot_result.verdict, Verdict::Timeout);
    assert_eq!(s.players()[1].lives, 2);
    assert_eq!(s.players()[0].score, 1);
  }

  #[test]
  fn eliminated_players_cannot_submit() {
    let (mut s, _) = GameSession::start(settings(
      vec![human("Ada"), human("Grace"), human("Linus")],
      rules(10, 1),
    ))
    .expect("start");
    let ids = player_ids(&s);
    let good = correct_answer(&s);
    let bad = wrong_answer(&s);
    s.submit_answer(&ids[0], &good).expect("submit");
    s.submit_answer(&ids[1], &good).expect("submit");
    let outcome = s.submit_answer(&ids[2], &bad).expect("submit").round.expect("closes");
    assert_eq!(outcome.eliminated, vec![ids[2].clone()]);
    assert!(matches!(outcome.next, NextStep::Round(_)), "two players remain");
    assert_eq!(
      s.submit_answer(&ids[2], "1").unwrap_err(),
      GameError::PlayerEliminated("Linus".into())
    );
  }

  #[test]
  fn duplicate_and_post_game_submissions_are_rejected() {
    let (mut s, _) =
      GameSession::start(settings(vec![human("Ada"), human("Grace")], rules(1, 3))).expect("start");
    let [ada, grace] = [player_ids(&s)[0].clone(), player_ids(&s)[1].clone()];
    let good = correct_answer(&s);
    s.submit_answer(&ada, &good).expect("submit");
    assert_eq!(s.submit_answer(&ada, &good).unwrap_err(), GameError::AlreadyAnswered(ada.clone()));
    s.submit_answer(&grace, &good).expect("submit closes the one-question game");
    assert_eq!(s.submit_answer(&ada, "3").unwrap_err(), GameError::GameNotActive);
  }

  #[test]
  fn full_tie_is_a_draw() {
    let (mut s, _) =
      GameSession::start(settings(vec![human("Ada"), human("Grace")], rules(3, 3))).expect("start");
    let [ada, grace] = [player_ids(&s)[0].clone(), player_ids(&s)[1].clone()];
    let mut last = None;
    for _ in 0..3 {
      let good = correct_answer(&s);
      s.submit_answer(&ada, &good).expect("submit");
      last = s.submit_answer(&grace, &good).expect("submit").round;
    }
    match last.expect("outcome").next {
      NextStep::Over(summary) => {
        assert!(summary.winner.is_none(), "equal score and lives is a draw");
        assert_eq!(summary.ranking.len(), 2);
      }
      NextStep::Round(_) => panic!("expected game over"),
    }
  }

  #[test]
  fn solo_roster_plays_to_the_question_limit() {
    let (mut s, _) = GameSession::start(settings(vec![human("Ada")], rules(2, 3))).expect("start");
    let ada = player_ids(&s)[0].clone();
    let good = correct_answer(&s);
    let outcome = s.submit_answer(&ada, &good).expect("submit").round.expect("closes");
    assert!(matches!(outcome.next, NextStep::Round(_)));
    let good = correct_answer(&s);
    let outcome = s.submit_answer(&ada, &good).expect("submit").round.expect("closes");
    match outcome.next {
      NextStep::Over(summary) => {
        assert_eq!(summary.reason, GameOverReason::QuestionLimit);
        assert_eq!(summary.winner.expect("sole player wins").name, "Ada");
      }
      NextStep::Round(_) => panic!("expected game over"),
    }
  }

  #[test]
  fn losing_every_life_solo_ends_with_all_eliminated() {
    let (mut s, _) = GameSession::start(settings(vec![human("Ada")], rules(10, 1))).expect("start");
    let ada = player_ids(&s)[0].clone();
    let bad = wrong_answer(&s);
    let outcome = s.submit_answer(&ada, &bad).expect("submit").round.expect("closes");
    match outcome.next {
      NextStep::Over(summary) => {
        assert_eq!(summary.reason, GameOverReason::AllEliminated);
        assert!(summary.winner.is_none());
      }
      NextStep::Round(_) => panic!("expected game over"),
    }
    assert_eq!(s.players()[0].lives, 0);
  }

  #[test]
  fn level_progresses_by_round_index() {
    let mut cfg = rules(15, 5);
    cfg.questions_per_level = 1;
    let (mut s, first) = GameSession::start(settings(vec![human("Ada")], cfg)).expect("start");
    assert_eq!(first.level, Difficulty::Easy);
    let ada = player_ids(&s)[0].clone();
    let mut levels = vec![first.level];
    for _ in 0..3 {
      let good = correct_answer(&s);
      match s.submit_answer(&ada, &good).expect("submit").round.expect("closes").next {
        NextStep::Round(rs) => levels.push(rs.level),
        NextStep::Over(_) => break,
      }
    }
    assert_eq!(
      levels,
      vec![Difficulty::Easy, Difficulty::Medium, Difficulty::Hard, Difficulty::Hard]
    );
  }

  #[test]
  fn empty_roster_is_rejected_and_solo_vs_bot_gets_the_house_bot() {
    assert_eq!(
      GameSession::start(settings(vec![], rules(5, 3))).unwrap_err(),
      GameError::EmptyRoster
    );
    let mut cfg = settings(vec![human("Ada")], rules(5, 3));
    cfg.mode = GameMode::SoloVsBot;
    let (s, _) = GameSession::start(cfg).expect("start");
    assert_eq!(s.players().len(), 2);
    assert!(s.players()[1].is_bot());
    assert_eq!(s.players()[1].name, "Math Bot");
  }

  #[test]
  fn applied_bot_answers_close_the_round() {
    let (mut s, _) =
      GameSession::start(settings(vec![human("Ada"), bot("Math Bot")], rules(10, 3))).expect("start");
    let ada = player_ids(&s)[0].clone();
    assert_eq!(s.simulate_bots().len(), 1);
    let good = correct_answer(&s);
    s.submit_answer(&ada, &good).expect("submit");
    let outcome = s.apply_bot_answers().expect("bot closes the round");
    assert_eq!(outcome.results.len(), 2);
    assert!(s.players()[1].last_response_secs > 0.0, "think time recorded");
  }

  #[test]
  fn abort_finishes_the_session() {
    let (mut s, _) =
      GameSession::start(settings(vec![human("Ada"), human("Grace")], rules(10, 3))).expect("start");
    let summary = s.abort();
    assert_eq!(summary.reason, GameOverReason::Aborted);
    assert_eq!(s.phase(), Phase::GameOver);
    assert!(s.current_round().is_none());
  }
}
