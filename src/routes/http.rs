//! HTTP endpoint handlers. These are thin wrappers that forward to the game
//! engine. Bot answers are applied as soon as a round opens in this flow:
//! their simulated think time is recorded as the response time, not slept.

use std::sync::Arc;
use axum::{
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
  Json,
};
use tracing::{info, instrument};

use crate::engine::{GameSession, NextStep};
use crate::error::GameError;
use crate::protocol::*;
use crate::state::AppState;

fn error_response(e: GameError) -> (StatusCode, Json<ErrorOut>) {
  let status = match e {
    GameError::SessionNotFound(_) | GameError::UnknownPlayer(_) => StatusCode::NOT_FOUND,
    _ => StatusCode::BAD_REQUEST,
  };
  (status, Json(ErrorOut { message: e.to_string() }))
}

/// Keep applying bot answers while their submissions alone close rounds;
/// all-bot rosters simulate a whole game in one call.
fn drive_bots(session: &mut GameSession) {
  while let Some(outcome) = session.apply_bot_answers() {
    if matches!(outcome.next, NextStep::Over(_)) {
      break;
    }
  }
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip(state, body), fields(level = body.level, players = body.players.len()))]
pub async fn http_start_game(
  State(state): State<Arc<AppState>>,
  Json(body): Json<StartGameIn>,
) -> impl IntoResponse {
  let settings = match state.game_settings(body.mode, body.level, body.players, body.overrides) {
    Ok(s) => s,
    Err(e) => return error_response(e).into_response(),
  };
  let (mut session, _first) = match GameSession::start(settings) {
    Ok(v) => v,
    Err(e) => return error_response(e).into_response(),
  };
  drive_bots(&mut session);
  info!(target: "game", id = %session.id, "HTTP game started");
  let snap = snapshot(&session);
  state.insert_session(session).await;
  Json(StartGameOut { game: snap }).into_response()
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_game_snapshot(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> impl IntoResponse {
  match state.session(&id).await {
    Ok(shared) => {
      let session = shared.lock().await;
      Json(snapshot(&session)).into_response()
    }
    Err(e) => error_response(e).into_response(),
  }
}

#[instrument(level = "info", skip(state, body), fields(%id, player = %body.player_id))]
pub async fn http_submit_answer(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<AnswerIn>,
) -> impl IntoResponse {
  let shared = match state.session(&id).await {
    Ok(s) => s,
    Err(e) => return error_response(e).into_response(),
  };
  let mut session = shared.lock().await;
  let outcome = match session.submit_answer(&body.player_id, &body.answer) {
    Ok(o) => o,
    Err(e) => return error_response(e).into_response(),
  };
  info!(target: "game", id = %session.id, player = %body.player_id, correct = outcome.correct, "HTTP answer evaluated");

  let mut out = AnswerOut {
    correct: outcome.correct,
    round_complete: outcome.round.is_some(),
    round: None,
    next: None,
    game_over: None,
  };
  if let Some(r) = outcome.round {
    out.round = Some(RoundResultOut {
      number: r.number,
      results: r.results.iter().map(to_result_out).collect(),
      eliminated: r.eliminated.clone(),
    });
    match r.next {
      NextStep::Round(rs) => out.next = Some(to_problem_out(&rs)),
      NextStep::Over(summary) => out.game_over = Some(to_summary_out(&summary)),
    }
    // The fresh round needs the bots again; they may even finish the game
    // when every remaining human was just eliminated.
    drive_bots(&mut session);
    if out.game_over.is_none() {
      if let Some(summary) = session.game_over_summary() {
        out.next = None;
        out.game_over = Some(to_summary_out(&summary));
      }
    }
  }
  Json(out).into_response()
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_abort_game(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> impl IntoResponse {
  match state.session(&id).await {
    Ok(shared) => {
      let summary = {
        let mut session = shared.lock().await;
        session.abort()
      };
      state.remove_session(&id).await;
      info!(target: "game", %id, "HTTP game aborted");
      Json(AbortOut { summary: to_summary_out(&summary) }).into_response()
    }
    Err(e) => error_response(e).into_response(),
  }
}
