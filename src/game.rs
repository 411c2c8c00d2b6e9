//! Game flow state machine
//!
//! ```text
//! AwaitingPlayer -> StartScreen -> Playing <-> LevelTransition
//!                        ^            |
//!                        |            v
//!                        +------- GameOver
//! ```
//!
//! The host forwards pointer, focus and frame callbacks here. Every call
//! returns immediately; the only loop is the engine's, and it is started
//! and stopped from this module.

use crate::GameConfig;
use crate::error::{GameError, Result};
use crate::highscores::SessionHighScore;
use crate::persistence::{Persistence, Player};
use crate::platform::{InputController, PointerAction};
use crate::settings::Settings;
use crate::sim::{GameEvent, GamePhase, GameState, LoopHandle, PhysicsEngine};

/// Where the game flow is, as shown to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// No player identity yet
    AwaitingPlayer,
    /// Player known, entities laid out, waiting for pointer-down
    StartScreen,
    Playing,
    LevelTransition,
    GameOver { won: bool },
}

/// Level a new run begins on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartLevel {
    /// Restart from level 1
    First,
    /// Keep the level the last run reached
    Current,
}

pub struct Game<P: Persistence> {
    config: GameConfig,
    engine: PhysicsEngine,
    input: InputController,
    state: GameState,
    settings: Settings,
    persistence: P,
    player: Option<Player>,
    high_score: SessionHighScore,
}

impl<P: Persistence> Game<P> {
    pub fn new(config: GameConfig, settings: Settings, persistence: P, seed: u64) -> Self {
        let state = GameState::new(&config, 1, settings.effective_ball_speed());
        Self {
            engine: PhysicsEngine::new(config.clone(), seed),
            input: InputController::new(&config),
            state,
            settings,
            persistence,
            player: None,
            high_score: SessionHighScore::default(),
            config,
        }
    }

    pub fn status(&self) -> GameStatus {
        if self.player.is_none() {
            return GameStatus::AwaitingPlayer;
        }
        match self.state.phase {
            GamePhase::Idle => GameStatus::StartScreen,
            GamePhase::Playing => GameStatus::Playing,
            GamePhase::LevelTransition => GameStatus::LevelTransition,
            GamePhase::GameOver { won } => GameStatus::GameOver { won },
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Entities for drawing
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn high_score(&self) -> &SessionHighScore {
        &self.high_score
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    pub fn persistence_mut(&mut self) -> &mut P {
        &mut self.persistence
    }

    /// Handle of the running frame loop, if any
    pub fn loop_handle(&self) -> Option<LoopHandle> {
        self.engine.active_handle()
    }

    /// Resolve (or create) the player by name and show the start screen.
    ///
    /// A storage failure is retried once after the configured delay; if the
    /// retry also fails the player cannot proceed.
    pub fn submit_player_name(&mut self, name: &str) -> Result<&Player> {
        let player = match self.persistence.get_or_create_player(name) {
            Ok(player) => player,
            Err(err @ GameError::EmptyName) => return Err(err),
            Err(first) => {
                log::warn!(
                    "Player lookup failed ({first}), retrying in {:?}",
                    self.config.startup_retry_delay
                );
                std::thread::sleep(self.config.startup_retry_delay);
                self.persistence.get_or_create_player(name).map_err(|err| {
                    log::error!("Player lookup failed again: {err}");
                    GameError::PersistenceUnavailable {
                        attempts: 2,
                        reason: err.to_string(),
                    }
                })?
            }
        };

        log::info!(
            "Player '{}' ready (high score {})",
            player.name,
            player.high_score
        );
        self.engine.stop();
        self.high_score = SessionHighScore::new(player.high_score);
        self.state = GameState::new(&self.config, 1, self.settings.effective_ball_speed());
        Ok(self.player.insert(player))
    }

    /// Rename the active player. Nothing changes if the name is taken.
    pub fn rename_player(&mut self, new_name: &str) -> Result<&Player> {
        let id = self.player.as_ref().ok_or(GameError::NoActivePlayer)?.id;
        let renamed = self.persistence.update_player_name(id, new_name)?;
        log::info!("Player {} renamed to '{}'", id, renamed.name);
        Ok(self.player.insert(renamed))
    }

    /// Pointer-down starts a run from the start screen; ignored otherwise
    pub fn on_pointer_down(&mut self) -> bool {
        if self.player.is_none() {
            return false;
        }
        match self.input.on_pointer_down(self.state.phase) {
            PointerAction::Start => self.begin(StartLevel::Current).is_ok(),
            PointerAction::Ignored => false,
        }
    }

    /// Move the paddle under the pointer while the ball is in play
    pub fn on_pointer_move(&mut self, pointer_x: f32) -> bool {
        self.input.on_pointer_move(&mut self.state, pointer_x)
    }

    /// Start a run immediately from level 1
    pub fn start_new_game(&mut self) -> Result<LoopHandle> {
        self.begin(StartLevel::First)
    }

    /// Start a run immediately from the level last reached
    pub fn continue_game(&mut self) -> Result<LoopHandle> {
        self.begin(StartLevel::Current)
    }

    /// Go back to the start screen after a run, laid out for `from`
    pub fn replay(&mut self, from: StartLevel) -> Result<()> {
        if self.player.is_none() {
            return Err(GameError::NoActivePlayer);
        }
        self.engine.stop();
        let level = self.start_level(from);
        self.state.reset(&self.config, level);
        Ok(())
    }

    /// Reset score, lay out the level and launch the ball
    fn begin(&mut self, from: StartLevel) -> Result<LoopHandle> {
        let player = self.player.as_ref().ok_or(GameError::NoActivePlayer)?;
        let stored_best = player.high_score;

        self.engine.stop();
        let level = self.start_level(from);
        self.state.reset(&self.config, level);
        self.engine
            .set_ball_speed(self.settings.effective_ball_speed(), &mut self.state);
        self.high_score = SessionHighScore::new(stored_best);

        self.engine.launch(&mut self.state);
        self.state.phase = GamePhase::Playing;
        log::info!(
            "Run started on level {} at speed {}",
            self.state.level,
            self.state.ball_speed
        );
        Ok(self.engine.start())
    }

    fn start_level(&self, from: StartLevel) -> u32 {
        match from {
            StartLevel::First => 1,
            StartLevel::Current => self.state.level,
        }
    }

    /// Run one frame on the active loop
    pub fn frame(&mut self) -> Vec<GameEvent> {
        match self.engine.active_handle() {
            Some(handle) => self.frame_for(handle),
            None => Vec::new(),
        }
    }

    /// Run one frame for a specific loop handle; stale handles do nothing
    pub fn frame_for(&mut self, handle: LoopHandle) -> Vec<GameEvent> {
        let events = self.engine.frame(handle, &mut self.state);
        for event in &events {
            match event {
                GameEvent::ObstacleDestroyed { score, .. } => {
                    let was_record = self.high_score.is_new_record();
                    if self.high_score.record(*score) && !was_record {
                        log::info!("New high score: {score}");
                    }
                }
                GameEvent::BallLost { score, level } | GameEvent::RunCompleted { score, level } => {
                    self.finish_run(*score, *level);
                }
                _ => {}
            }
        }
        events
    }

    /// Report the final result. Failures are logged and otherwise ignored;
    /// the run is over either way.
    fn finish_run(&mut self, score: u64, level: u32) {
        self.engine.stop();
        let Some(player) = self.player.as_mut() else {
            return;
        };

        player.high_score = player.high_score.max(score);
        match self.persistence.update_player_score(player.id, score, level) {
            Ok(()) => log::info!("Recorded score {score} (level {level}) for '{}'", player.name),
            Err(err) => log::error!("Score submission failed: {err}"),
        }
    }

    /// Halt the loop mid-run. Returns whether anything was paused.
    pub fn pause(&mut self) -> bool {
        if !self.state.phase.is_in_play() {
            return false;
        }
        let stopped = self.engine.stop();
        if stopped {
            log::info!("Paused");
        }
        stopped
    }

    /// Restart the loop of a paused run
    pub fn resume(&mut self) -> Option<LoopHandle> {
        if !self.is_paused() {
            return None;
        }
        log::info!("Resumed");
        Some(self.engine.start())
    }

    pub fn is_paused(&self) -> bool {
        self.state.phase.is_in_play() && !self.engine.is_running()
    }

    /// Pick up settings changed while the game was in the background. The
    /// ball keeps its direction at the new speed.
    pub fn on_focus_regained(&mut self, settings: &Settings) {
        self.settings = settings.clone();
        self.engine
            .set_ball_speed(settings.effective_ball_speed(), &mut self.state);
    }

    /// Stop everything; safe to call repeatedly
    pub fn teardown(&mut self) {
        self.engine.stop();
    }
}
