//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::config::GameRules;
use crate::domain::{Difficulty, GameMode, Player, RosterEntry, Verdict};
use crate::engine::{
    GameOverReason, GameSession, GameSummary, Phase, PlayerResult, RoundOutcome, RoundStart,
};
use crate::util::round2;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    StartGame {
        #[serde(default)]
        mode: GameMode,
        /// Difficulty level 1–3.
        level: u8,
        players: Vec<RosterEntry>,
        #[serde(default)]
        overrides: Option<RuleOverrides>,
    },
    SubmitAnswer {
        #[serde(rename = "playerId")]
        player_id: String,
        answer: String,
    },
    AbortGame,
}

/// Optional per-game rule overrides on top of the server defaults.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct RuleOverrides {
    #[serde(rename = "questionLimit")]
    pub question_limit: Option<u32>,
    #[serde(rename = "startingLives")]
    pub starting_lives: Option<u32>,
    #[serde(rename = "roundTimeoutSecs")]
    pub round_timeout_secs: Option<u64>,
    #[serde(rename = "questionsPerLevel")]
    pub questions_per_level: Option<u32>,
}

impl RuleOverrides {
    pub fn apply(&self, base: GameRules) -> GameRules {
        GameRules {
            question_limit: self.question_limit.unwrap_or(base.question_limit),
            starting_lives: self.starting_lives.unwrap_or(base.starting_lives),
            round_timeout_secs: self.round_timeout_secs.unwrap_or(base.round_timeout_secs),
            questions_per_level: self.questions_per_level.unwrap_or(base.questions_per_level),
        }
    }
}

/// Messages the server pushes back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    GameStarted {
        game: GameSnapshot,
    },
    Problem {
        number: u32,
        level: Difficulty,
        text: String,
        #[serde(rename = "timeoutSecs")]
        timeout_secs: u64,
    },
    AnswerAck {
        #[serde(rename = "playerId")]
        player_id: String,
        correct: bool,
    },
    RoundResult {
        number: u32,
        results: Vec<PlayerResultOut>,
        scoreboard: Vec<PlayerOut>,
        eliminated: Vec<String>,
    },
    TimerTick {
        #[serde(rename = "elapsedSecs")]
        elapsed_secs: f64,
        #[serde(rename = "remainingSecs")]
        remaining_secs: Option<f64>,
    },
    GameOver {
        summary: SummaryOut,
    },
    Error {
        message: String,
    },
}

/// DTO used by both WS and HTTP for player delivery.
#[derive(Debug, Serialize)]
pub struct PlayerOut {
    pub id: String,
    pub name: String,
    pub avatar: String,
    #[serde(rename = "isBot")]
    pub is_bot: bool,
    pub score: u32,
    pub lives: u32,
    #[serde(rename = "correctAnswers")]
    pub correct_answers: u32,
    #[serde(rename = "lastResponseSecs")]
    pub last_response_secs: f64,
}

pub fn to_player_out(p: &Player) -> PlayerOut {
    PlayerOut {
        id: p.id.clone(),
        name: p.name.clone(),
        avatar: p.avatar.clone(),
        is_bot: p.is_bot(),
        score: p.score,
        lives: p.lives,
        correct_answers: p.correct_answers,
        last_response_secs: round2(p.last_response_secs),
    }
}

#[derive(Debug, Serialize)]
pub struct PlayerResultOut {
    #[serde(rename = "playerId")]
    pub player_id: String,
    pub name: String,
    pub verdict: Verdict,
    pub answer: Option<f64>,
    #[serde(rename = "elapsedSecs")]
    pub elapsed_secs: f64,
}

pub fn to_result_out(r: &PlayerResult) -> PlayerResultOut {
    PlayerResultOut {
        player_id: r.player_id.clone(),
        name: r.name.clone(),
        verdict: r.verdict,
        answer: r.answer,
        elapsed_secs: r.elapsed_secs,
    }
}

/// The active question as delivered to clients. The answer never leaves the
/// server.
#[derive(Debug, Serialize)]
pub struct ProblemOut {
    pub number: u32,
    pub level: Difficulty,
    pub text: String,
    #[serde(rename = "timeoutSecs")]
    pub timeout_secs: u64,
}

pub fn to_problem_out(rs: &RoundStart) -> ProblemOut {
    ProblemOut {
        number: rs.number,
        level: rs.level,
        text: rs.text.clone(),
        timeout_secs: rs.timeout_secs,
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryOut {
    pub winner: Option<PlayerOut>,
    pub ranking: Vec<PlayerOut>,
    #[serde(rename = "questionsAsked")]
    pub questions_asked: u32,
    #[serde(rename = "durationSecs")]
    pub duration_secs: f64,
    pub reason: GameOverReason,
}

pub fn to_summary_out(s: &GameSummary) -> SummaryOut {
    SummaryOut {
        winner: s.winner.as_ref().map(to_player_out),
        ranking: s.ranking.iter().map(to_player_out).collect(),
        questions_asked: s.questions_asked,
        duration_secs: s.duration_secs,
        reason: s.reason,
    }
}

/// Full session snapshot for `game_started` and the HTTP snapshot endpoint.
#[derive(Debug, Serialize)]
pub struct GameSnapshot {
    pub id: String,
    pub phase: Phase,
    pub mode: GameMode,
    pub difficulty: Difficulty,
    #[serde(rename = "questionIndex")]
    pub question_index: u32,
    pub players: Vec<PlayerOut>,
    pub problem: Option<ProblemOut>,
}

/// Convert the live session (internal) to the public DTO.
pub fn snapshot(session: &GameSession) -> GameSnapshot {
    let stats = session.stats();
    GameSnapshot {
        id: session.id.clone(),
        phase: session.phase(),
        mode: stats.mode,
        difficulty: stats.difficulty,
        question_index: stats.question_index,
        players: session.players().iter().map(to_player_out).collect(),
        problem: session.current_round().map(|r| ProblemOut {
            number: r.number,
            level: r.level,
            text: r.problem.text.clone(),
            timeout_secs: session.rules().round_timeout_secs,
        }),
    }
}

/// Build the `problem` push for a freshly started round.
pub fn problem_message(rs: &RoundStart) -> ServerWsMessage {
    ServerWsMessage::Problem {
        number: rs.number,
        level: rs.level,
        text: rs.text.clone(),
        timeout_secs: rs.timeout_secs,
    }
}

/// Build the `round_result` push for an evaluated round.
pub fn round_result_message(session: &GameSession, outcome: &RoundOutcome) -> ServerWsMessage {
    ServerWsMessage::RoundResult {
        number: outcome.number,
        results: outcome.results.iter().map(to_result_out).collect(),
        scoreboard: session.players().iter().map(to_player_out).collect(),
        eliminated: outcome.eliminated.clone(),
    }
}

pub fn game_over_message(summary: &GameSummary) -> ServerWsMessage {
    ServerWsMessage::GameOver { summary: to_summary_out(summary) }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct StartGameIn {
    #[serde(default)]
    pub mode: GameMode,
    /// Difficulty level 1–3.
    pub level: u8,
    pub players: Vec<RosterEntry>,
    #[serde(default)]
    pub overrides: Option<RuleOverrides>,
}

#[derive(Debug, Serialize)]
pub struct StartGameOut {
    pub game: GameSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct AnswerIn {
    #[serde(rename = "playerId")]
    pub player_id: String,
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct RoundResultOut {
    pub number: u32,
    pub results: Vec<PlayerResultOut>,
    pub eliminated: Vec<String>,
}

/// Flattened submission response for the HTTP flow: the ack plus whatever
/// the submission triggered.
#[derive(Debug, Serialize)]
pub struct AnswerOut {
    pub correct: bool,
    #[serde(rename = "roundComplete")]
    pub round_complete: bool,
    pub round: Option<RoundResultOut>,
    pub next: Option<ProblemOut>,
    #[serde(rename = "gameOver")]
    pub game_over: Option<SummaryOut>,
}

#[derive(Debug, Serialize)]
pub struct AbortOut {
    pub summary: SummaryOut,
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
