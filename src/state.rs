//! Application state: config defaults plus the in-memory session store.
//!
//! One `GameSession` per started game, keyed by its uuid. Sessions are
//! wrapped in a `tokio::sync::Mutex` so the WebSocket loop and the HTTP
//! handlers can mutate them exclusively; the engine itself stays
//! single-threaded and synchronous.

use std::{collections::HashMap, sync::Arc};
use tokio::sync::{Mutex, RwLock};
use tracing::{info, instrument};

use crate::config::{load_game_config_from_env, GameConfig};
use crate::domain::{Difficulty, GameMode, RosterEntry};
use crate::engine::{GameSession, GameSettings};
use crate::error::GameError;
use crate::protocol::RuleOverrides;

pub type SharedSession = Arc<Mutex<GameSession>>;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<RwLock<HashMap<String, SharedSession>>>,
    pub config: GameConfig,
}

impl AppState {
    /// Build state from env: load the TOML config or fall back to defaults.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let config = load_game_config_from_env().unwrap_or_default();
        info!(
            target: "mathduel_backend",
            question_limit = config.rules.question_limit,
            starting_lives = config.rules.starting_lives,
            round_timeout_secs = config.rules.round_timeout_secs,
            questions_per_level = config.rules.questions_per_level,
            "Game defaults loaded"
        );
        Self { sessions: Arc::new(RwLock::new(HashMap::new())), config }
    }

    /// Resolve a start request against the server defaults.
    pub fn game_settings(
        &self,
        mode: GameMode,
        level: u8,
        roster: Vec<RosterEntry>,
        overrides: Option<RuleOverrides>,
    ) -> Result<GameSettings, GameError> {
        let difficulty = Difficulty::from_level(level)?;
        let rules = match overrides {
            Some(o) => o.apply(self.config.rules),
            None => self.config.rules,
        };
        Ok(GameSettings { mode, difficulty, roster, rules, bot: self.config.bot })
    }

    /// Register a freshly started session and hand back its shared handle.
    #[instrument(level = "debug", skip(self, session), fields(id = %session.id))]
    pub async fn insert_session(&self, session: GameSession) -> SharedSession {
        let id = session.id.clone();
        let shared = Arc::new(Mutex::new(session));
        self.sessions.write().await.insert(id, shared.clone());
        shared
    }

    pub async fn session(&self, id: &str) -> Result<SharedSession, GameError> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| GameError::SessionNotFound(id.to_string()))
    }

    /// Drop a finished session from the store.
    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn remove_session(&self, id: &str) {
        self.sessions.write().await.remove(id);
    }
}
