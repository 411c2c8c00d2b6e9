//! Physics engine lifecycle
//!
//! The host calls [`PhysicsEngine::frame`] from its display-refresh
//! callback with the handle it was given by [`PhysicsEngine::start`]. Only
//! the most recently issued handle is live, so a callback left over from a
//! stopped or restarted loop cannot tick the game a second time per frame.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::state::{GameEvent, GameState};
use super::tick::{launch_ball, tick};
use crate::GameConfig;

/// Identifies one run of the frame loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoopHandle(u64);

impl LoopHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct PhysicsEngine {
    config: GameConfig,
    rng: Pcg32,
    active: Option<LoopHandle>,
    next_handle: u64,
}

impl PhysicsEngine {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Self {
            config,
            rng: Pcg32::seed_from_u64(seed),
            active: None,
            next_handle: 1,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Start a loop, cancelling any loop already running
    pub fn start(&mut self) -> LoopHandle {
        if let Some(old) = self.active.take() {
            log::debug!("Cancelling frame loop {} before restart", old.id());
        }
        let handle = LoopHandle(self.next_handle);
        self.next_handle += 1;
        self.active = Some(handle);
        log::debug!("Frame loop {} started", handle.id());
        handle
    }

    /// Stop the running loop. Safe to call when nothing is running; returns
    /// whether a loop was stopped.
    pub fn stop(&mut self) -> bool {
        match self.active.take() {
            Some(handle) => {
                log::debug!("Frame loop {} stopped", handle.id());
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_handle(&self) -> Option<LoopHandle> {
        self.active
    }

    /// Run one tick for `handle`. Stale handles do nothing. The loop stops
    /// itself once the run ends.
    pub fn frame(&mut self, handle: LoopHandle, state: &mut GameState) -> Vec<GameEvent> {
        if self.active != Some(handle) {
            return Vec::new();
        }

        let events = tick(state, &self.config, &mut self.rng);
        if !state.phase.is_in_play() {
            self.stop();
        }
        events
    }

    /// Give the idle ball its launch velocity
    pub fn launch(&mut self, state: &mut GameState) {
        launch_ball(state, &mut self.rng);
    }

    /// Change ball speed mid-run; the ball keeps its heading
    pub fn set_ball_speed(&self, speed: f32, state: &mut GameState) {
        if speed != state.ball_speed {
            log::info!("Ball speed {} -> {}", state.ball_speed, speed);
        }
        state.set_ball_speed(speed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::GamePhase;
    use glam::Vec2;

    fn engine() -> PhysicsEngine {
        PhysicsEngine::new(GameConfig::default(), 42)
    }

    fn playing(config: &GameConfig) -> GameState {
        let mut state = GameState::new(config, 1, 6.0);
        state.phase = GamePhase::Playing;
        state
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut engine = engine();
        assert!(!engine.stop());
        engine.start();
        assert!(engine.stop());
        assert!(!engine.stop());
        assert!(!engine.is_running());
    }

    #[test]
    fn test_restart_invalidates_old_handle() {
        let mut engine = engine();
        let mut state = playing(engine.config());
        engine.launch(&mut state);

        let old = engine.start();
        let new = engine.start();
        assert_ne!(old, new);
        assert_eq!(engine.active_handle(), Some(new));

        let before = state.ball.pos;
        assert!(engine.frame(old, &mut state).is_empty());
        assert_eq!(state.ball.pos, before);
        assert_eq!(state.time_ticks, 0);

        engine.frame(new, &mut state);
        assert_eq!(state.time_ticks, 1);
        assert_ne!(state.ball.pos, before);
    }

    #[test]
    fn test_frame_after_stop_is_noop() {
        let mut engine = engine();
        let mut state = playing(engine.config());
        let handle = engine.start();
        engine.stop();

        engine.frame(handle, &mut state);
        assert_eq!(state.time_ticks, 0);
    }

    #[test]
    fn test_loop_stops_on_game_over() {
        let mut engine = engine();
        let mut state = playing(engine.config());
        state.ball.pos = Vec2::new(100.0, engine.config().screen_height + 1.0);
        let handle = engine.start();

        let events = engine.frame(handle, &mut state);
        assert_eq!(events.len(), 1);
        assert!(!engine.is_running());
        assert_eq!(state.phase, GamePhase::GameOver { won: false });
    }

    #[test]
    fn test_set_ball_speed_keeps_heading() {
        let mut engine = engine();
        let mut state = playing(engine.config());
        engine.launch(&mut state);
        let heading = state.ball.vel.normalize();

        engine.set_ball_speed(4.0, &mut state);
        assert!((state.ball.speed() - 4.0).abs() < 1e-4);
        assert!((state.ball.vel.normalize() - heading).length() < 1e-5);
    }

    #[test]
    fn test_same_seed_same_launch() {
        let config = GameConfig::default();
        let mut a = PhysicsEngine::new(config.clone(), 9);
        let mut b = PhysicsEngine::new(config.clone(), 9);
        let mut sa = GameState::new(&config, 1, 6.0);
        let mut sb = GameState::new(&config, 1, 6.0);
        for _ in 0..5 {
            a.launch(&mut sa);
            b.launch(&mut sb);
            assert_eq!(sa.ball.vel, sb.ball.vel);
        }
    }
}
