//! Pointer input mapping
//!
//! Pointer x (mouse or touch, in screen pixels) drives the paddle center
//! directly; there is no smoothing or speed limit.

use crate::GameConfig;
use crate::sim::{GamePhase, GameState};

/// What a pointer-down means in the current phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    /// Begin play
    Start,
    Ignored,
}

#[derive(Debug, Clone)]
pub struct InputController {
    screen_width: f32,
}

impl InputController {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            screen_width: config.screen_width,
        }
    }

    /// Paddle x that centers a paddle of `paddle_width` under `pointer_x`,
    /// clamped to the screen
    pub fn paddle_target(&self, pointer_x: f32, paddle_width: f32) -> f32 {
        let max_x = (self.screen_width - paddle_width).max(0.0);
        (pointer_x - paddle_width / 2.0).clamp(0.0, max_x)
    }

    /// Move the paddle under the pointer. Ignored unless the ball is in play,
    /// and for non-finite coordinates. Returns whether the paddle moved.
    pub fn on_pointer_move(&self, state: &mut GameState, pointer_x: f32) -> bool {
        if !state.phase.is_in_play() || !pointer_x.is_finite() {
            return false;
        }
        let target = self.paddle_target(pointer_x, state.paddle.width);
        let moved = target != state.paddle.x;
        state.paddle.x = target;
        moved
    }

    /// Pointer-down only ever starts a game that has not started yet
    pub fn on_pointer_down(&self, phase: GamePhase) -> PointerAction {
        match phase {
            GamePhase::Idle => PointerAction::Start,
            _ => PointerAction::Ignored,
        }
    }
}
