//! WebSocket upgrade + game loop. One session per connection. The loop
//! multiplexes three sources with `select!`: client messages, the 1 s timer
//! tick (elapsed display + round timeout), and delayed bot answers. Every
//! game event is pushed to the client as a JSON message.

use std::sync::Arc;
use std::time::Duration;

use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument};

use crate::engine::{GameSession, NextStep, RoundOutcome};
use crate::protocol::{
  game_over_message, problem_message, round_result_message, snapshot, ClientWsMessage,
  ServerWsMessage,
};
use crate::state::{AppState, SharedSession};
use crate::util::{round2, trunc_for_log};

/// A bot answer coming back from its sleep task. Tagged with the round it
/// was produced for so late arrivals are dropped, not misapplied.
#[derive(Debug)]
struct BotSubmission {
  round: u32,
  player_id: String,
  value: i64,
}

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "mathduel_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "mathduel_backend", "WebSocket connected");
  let mut session: Option<SharedSession> = None;
  let (bot_tx, mut bot_rx) = mpsc::unbounded_channel::<BotSubmission>();
  let mut tick = tokio::time::interval(Duration::from_secs(1));

  loop {
    tokio::select! {
      maybe_msg = socket.recv() => {
        let msg = match maybe_msg {
          Some(Ok(m)) => m,
          _ => break,
        };
        match msg {
          Message::Text(txt) => {
            let replies = match serde_json::from_str::<ClientWsMessage>(&txt) {
              Ok(incoming) => {
                debug!(target: "mathduel_backend", msg = %trunc_for_log(&txt, 256), "WS received");
                handle_client_ws(incoming, &state, &mut session, &bot_tx).await
              }
              Err(e) => vec![ServerWsMessage::Error { message: format!("Invalid JSON: {e}") }],
            };
            if send_all(&mut socket, replies).await.is_err() {
              break;
            }
          }
          Message::Ping(payload) => {
            let _ = socket.send(Message::Pong(payload)).await;
          }
          Message::Close(_) => break,
          _ => {}
        }
      }

      Some(bot) = bot_rx.recv() => {
        let replies = apply_bot_submission(&session, bot, &bot_tx).await;
        if send_all(&mut socket, replies).await.is_err() {
          break;
        }
      }

      _ = tick.tick() => {
        let replies = on_tick(&session, &bot_tx).await;
        if send_all(&mut socket, replies).await.is_err() {
          break;
        }
      }
    }
  }

  // The connection owns its game; drop it from the store on the way out.
  if let Some(shared) = session {
    let mut s = shared.lock().await;
    if s.stats().active {
      s.abort();
    }
    state.remove_session(&s.id).await;
  }
  info!(target: "mathduel_backend", "WebSocket disconnected");
}

async fn handle_client_ws(
  msg: ClientWsMessage,
  state: &Arc<AppState>,
  session: &mut Option<SharedSession>,
  bot_tx: &mpsc::UnboundedSender<BotSubmission>,
) -> Vec<ServerWsMessage> {
  match msg {
    ClientWsMessage::Ping => vec![ServerWsMessage::Pong],

    ClientWsMessage::StartGame { mode, level, players, overrides } => {
      // A fresh start replaces any game this connection was running.
      if let Some(shared) = session.take() {
        let mut old = shared.lock().await;
        old.abort();
        state.remove_session(&old.id).await;
      }
      let settings = match state.game_settings(mode, level, players, overrides) {
        Ok(s) => s,
        Err(e) => return vec![ServerWsMessage::Error { message: e.to_string() }],
      };
      match GameSession::start(settings) {
        Ok((new_session, first)) => {
          tracing::info!(target: "game", id = %new_session.id, "WS game started");
          let snap = snapshot(&new_session);
          let shared = state.insert_session(new_session).await;
          schedule_bots(&shared, bot_tx).await;
          *session = Some(shared);
          vec![ServerWsMessage::GameStarted { game: snap }, problem_message(&first)]
        }
        Err(e) => vec![ServerWsMessage::Error { message: e.to_string() }],
      }
    }

    ClientWsMessage::SubmitAnswer { player_id, answer } => {
      let shared = match session {
        Some(s) => s.clone(),
        None => return vec![no_game_error()],
      };
      let mut s = shared.lock().await;
      match s.submit_answer(&player_id, &answer) {
        Ok(outcome) => {
          tracing::info!(target: "game", id = %s.id, player = %player_id, correct = outcome.correct, "WS answer evaluated");
          let mut replies = vec![ServerWsMessage::AnswerAck {
            player_id: outcome.player_id.clone(),
            correct: outcome.correct,
          }];
          if let Some(round) = outcome.round {
            push_round_outcome(&mut replies, &s, &round);
            if matches!(round.next, NextStep::Round(_)) {
              drop(s);
              schedule_bots(&shared, bot_tx).await;
            }
          }
          replies
        }
        Err(e) => vec![ServerWsMessage::Error { message: e.to_string() }],
      }
    }

    ClientWsMessage::AbortGame => match session.take() {
      Some(shared) => {
        let mut s = shared.lock().await;
        let summary = s.abort();
        state.remove_session(&s.id).await;
        vec![game_over_message(&summary)]
      }
      None => vec![no_game_error()],
    },
  }
}

/// One sleep task per pending bot answer, the async stand-in for the desktop
/// single-shot timers.
async fn schedule_bots(shared: &SharedSession, bot_tx: &mpsc::UnboundedSender<BotSubmission>) {
  let (round, sims) = {
    let s = shared.lock().await;
    match s.round_number() {
      Some(n) => (n, s.simulate_bots()),
      None => return,
    }
  };
  for (player_id, answer) in sims {
    let tx = bot_tx.clone();
    tokio::spawn(async move {
      tokio::time::sleep(Duration::from_secs_f64(answer.think_secs)).await;
      let _ = tx.send(BotSubmission { round, player_id, value: answer.value });
    });
  }
}

async fn apply_bot_submission(
  session: &Option<SharedSession>,
  bot: BotSubmission,
  bot_tx: &mpsc::UnboundedSender<BotSubmission>,
) -> Vec<ServerWsMessage> {
  let shared = match session {
    Some(s) => s.clone(),
    None => return vec![],
  };
  let mut s = shared.lock().await;
  if s.round_number() != Some(bot.round) || !s.stats().active {
    return vec![];
  }
  match s.submit_answer(&bot.player_id, &bot.value.to_string()) {
    Ok(outcome) => {
      debug!(target: "game", id = %s.id, player = %bot.player_id, correct = outcome.correct, "Bot answer applied");
      let mut replies = vec![ServerWsMessage::AnswerAck {
        player_id: outcome.player_id.clone(),
        correct: outcome.correct,
      }];
      if let Some(round) = outcome.round {
        push_round_outcome(&mut replies, &s, &round);
        if matches!(round.next, NextStep::Round(_)) {
          drop(s);
          schedule_bots(&shared, bot_tx).await;
        }
      }
      replies
    }
    // The player was eliminated or the round already closed; drop silently.
    Err(_) => vec![],
  }
}

/// Periodic tick: advance the elapsed display and enforce the round deadline.
async fn on_tick(
  session: &Option<SharedSession>,
  bot_tx: &mpsc::UnboundedSender<BotSubmission>,
) -> Vec<ServerWsMessage> {
  let shared = match session {
    Some(s) => s.clone(),
    None => return vec![],
  };
  let mut s = shared.lock().await;
  let elapsed = match s.round_elapsed_secs() {
    Some(e) => e,
    None => return vec![],
  };
  if s.round_timed_out() {
    match s.force_evaluate() {
      Ok(outcome) => {
        tracing::info!(target: "game", id = %s.id, round = outcome.number, "Round timed out");
        let mut replies = Vec::new();
        push_round_outcome(&mut replies, &s, &outcome);
        if matches!(outcome.next, NextStep::Round(_)) {
          drop(s);
          schedule_bots(&shared, bot_tx).await;
        }
        replies
      }
      Err(_) => vec![],
    }
  } else {
    vec![ServerWsMessage::TimerTick {
      elapsed_secs: round2(elapsed),
      remaining_secs: s.round_remaining_secs().map(round2),
    }]
  }
}

fn push_round_outcome(replies: &mut Vec<ServerWsMessage>, session: &GameSession, outcome: &RoundOutcome) {
  replies.push(round_result_message(session, outcome));
  match &outcome.next {
    NextStep::Round(rs) => replies.push(problem_message(rs)),
    NextStep::Over(summary) => replies.push(game_over_message(summary)),
  }
}

fn no_game_error() -> ServerWsMessage {
  ServerWsMessage::Error { message: "no active game on this connection".into() }
}

async fn send_all(socket: &mut WebSocket, replies: Vec<ServerWsMessage>) -> Result<(), axum::Error> {
  for reply in replies {
    let out = serde_json::to_string(&reply).unwrap_or_else(|e| {
      serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
    });
    if let Err(e) = socket.send(Message::Text(out)).await {
      error!(target: "mathduel_backend", error = %e, "WS send error");
      return Err(e);
    }
  }
  Ok(())
}
