//! Game state and core simulation types
//!
//! Plain data owned by a single game instance. Every other component reads
//! and mutates it; nothing here schedules or decides anything.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::levels::generate;
use crate::GameConfig;
use crate::consts::*;

/// Current phase of the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Entities laid out, waiting for the first pointer-down
    Idle,
    /// Engine ticking
    Playing,
    /// Level cleared, next layout pending (engine still ticking)
    LevelTransition,
    /// Run ended
    GameOver { won: bool },
}

impl GamePhase {
    /// Whether the ball is live in this phase
    pub fn is_in_play(&self) -> bool {
        matches!(self, GamePhase::Playing | GamePhase::LevelTransition)
    }
}

/// The ball. `pos` is the top-left corner of its bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
}

impl Ball {
    pub fn new(config: &GameConfig) -> Self {
        let mut ball = Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            size: BALL_SIZE,
        };
        ball.recenter(config);
        ball
    }

    /// Move to the start position and stop
    pub fn recenter(&mut self, config: &GameConfig) {
        self.pos = Vec2::new(
            (config.screen_width - self.size) / 2.0,
            (config.screen_height - self.size) / 2.0,
        );
        self.vel = Vec2::ZERO;
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.size / 2.0)
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        self.rect_at(self.pos)
    }

    /// Bounding box if the ball's top-left corner were at `pos`
    #[inline]
    pub fn rect_at(&self, pos: Vec2) -> Rect {
        Rect::new(pos.x, pos.y, self.size, self.size)
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

/// The player's paddle. Only `x` ever changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Paddle {
    /// Centered paddle at the configured height
    pub fn new(config: &GameConfig) -> Self {
        Self {
            x: config.paddle_max_x() / 2.0,
            y: config.paddle_top(),
            width: PADDLE_WIDTH,
            height: PADDLE_HEIGHT,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Set x, clamped to `[0, screen_width - width]`
    pub fn set_x(&mut self, x: f32, screen_width: f32) {
        let max_x = (screen_width - self.width).max(0.0);
        self.x = x.clamp(0.0, max_x);
    }
}

/// A destructible obstacle. Position never changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    pub destroyed: bool,
}

impl Obstacle {
    pub fn new(id: u32, pos: Vec2, width: f32, height: f32) -> Self {
        Self {
            id,
            pos,
            width,
            height,
            destroyed: false,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.width, self.height)
    }

    /// Flip to destroyed. Returns false if it already was.
    pub fn destroy(&mut self) -> bool {
        let was_alive = !self.destroyed;
        self.destroyed = true;
        was_alive
    }
}

/// Which half of a level transition is pending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionStage {
    /// Bump the level counter and relaunch the ball
    LevelUp,
    /// Lay out the new level's obstacles
    SpawnObstacles,
}

/// Countdown toward the next transition stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelTransition {
    pub stage: TransitionStage,
    pub ticks_remaining: u32,
}

/// Things that happened during a tick, consumed by the state machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    WallBounce,
    PaddleHit { hit_position: f32 },
    ObstacleDestroyed { id: u32, score: u64 },
    /// Last obstacle of `level` destroyed
    LevelCleared { level: u32 },
    /// Level counter incremented and ball relaunched
    LevelUp { level: u32 },
    /// New layout in place
    LevelStarted { level: u32, obstacles: usize },
    /// Ball dropped past the bottom edge
    BallLost { score: u64, level: u32 },
    /// Final configured level cleared
    RunCompleted { score: u64, level: u32 },
}

/// Complete state of one game instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub ball: Ball,
    pub paddle: Paddle,
    pub obstacles: Vec<Obstacle>,
    pub score: u64,
    /// Current level (1-based)
    pub level: u32,
    pub phase: GamePhase,
    /// Pending level transition, if any
    pub transition: Option<LevelTransition>,
    /// Configured ball speed in pixels per tick
    pub ball_speed: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl GameState {
    /// Lay out `level` with an idle ball and a centered paddle
    pub fn new(config: &GameConfig, level: u32, ball_speed: f32) -> Self {
        let level = level.max(1);
        Self {
            ball: Ball::new(config),
            paddle: Paddle::new(config),
            obstacles: generate(level, config.screen_width, config.top_offset),
            score: 0,
            level,
            phase: GamePhase::Idle,
            transition: None,
            ball_speed,
            time_ticks: 0,
        }
    }

    /// Reset for a fresh session at `level`: score to zero, entities re-laid out
    pub fn reset(&mut self, config: &GameConfig, level: u32) {
        *self = Self::new(config, level, self.ball_speed);
    }

    /// Obstacles still standing
    pub fn remaining_obstacles(&self) -> usize {
        self.obstacles.iter().filter(|o| !o.destroyed).count()
    }

    /// Change the configured speed, rescaling the current velocity so its
    /// direction is kept
    pub fn set_ball_speed(&mut self, speed: f32) {
        let current = self.ball.speed();
        if current > f32::EPSILON {
            self.ball.vel *= speed / current;
        }
        self.ball_speed = speed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_idle_and_centered() {
        let config = GameConfig::default();
        let state = GameState::new(&config, 1, 6.0);

        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.score, 0);
        assert_eq!(state.level, 1);
        assert_eq!(state.ball.vel, Vec2::ZERO);
        assert!((state.ball.center().x - config.screen_width / 2.0).abs() < 1e-4);
        assert!((state.paddle.x - 150.0).abs() < 1e-4);
        assert_eq!(state.remaining_obstacles(), 25);
    }

    #[test]
    fn test_level_zero_is_treated_as_level_one() {
        let state = GameState::new(&GameConfig::default(), 0, 6.0);
        assert_eq!(state.level, 1);
    }

    #[test]
    fn test_paddle_set_x_clamps() {
        let config = GameConfig::default();
        let mut paddle = Paddle::new(&config);

        paddle.set_x(-25.0, config.screen_width);
        assert_eq!(paddle.x, 0.0);

        paddle.set_x(1000.0, config.screen_width);
        assert_eq!(paddle.x, config.screen_width - PADDLE_WIDTH);
    }

    #[test]
    fn test_obstacle_destroy_is_one_way() {
        let mut obstacle = Obstacle::new(3, Vec2::new(10.0, 10.0), 60.0, 20.0);
        assert!(obstacle.destroy());
        assert!(!obstacle.destroy());
        assert!(obstacle.destroyed);
    }

    #[test]
    fn test_set_ball_speed_preserves_direction() {
        let mut state = GameState::new(&GameConfig::default(), 1, 4.0);
        state.ball.vel = Vec2::new(3.0, -4.0) * 0.8; // length 4
        state.set_ball_speed(8.0);

        assert!((state.ball.speed() - 8.0).abs() < 1e-4);
        assert!((state.ball.vel.x - 4.8).abs() < 1e-4);
        assert!((state.ball.vel.y + 6.4).abs() < 1e-4);
        assert_eq!(state.ball_speed, 8.0);
    }

    #[test]
    fn test_set_ball_speed_on_idle_ball_only_records_speed() {
        let mut state = GameState::new(&GameConfig::default(), 1, 4.0);
        state.set_ball_speed(8.0);
        assert_eq!(state.ball.vel, Vec2::ZERO);
        assert_eq!(state.ball_speed, 8.0);
    }
}
