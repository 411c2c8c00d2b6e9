//! Brick Breaker - a ball-and-paddle arcade game
//!
//! Core modules:
//! - `sim`: Discrete-time simulation (physics, collisions, level layouts)
//! - `platform`: Pointer input mapping
//! - `game`: Screen/phase state machine wiring the simulation to persistence
//! - `persistence`: Key-value record store and player repository
//! - `settings`: Difficulty and ball speed preferences

pub mod error;
pub mod game;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;

pub use error::{GameError, Result};
pub use game::{Game, GameStatus, StartLevel};
pub use highscores::{Leaderboard, SessionHighScore};
pub use settings::{Difficulty, Settings};

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Game configuration constants
pub mod consts {
    /// Ball bounding box edge (the ball is drawn as a circle inside it)
    pub const BALL_SIZE: f32 = 16.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 100.0;
    pub const PADDLE_HEIGHT: f32 = 15.0;
    /// Distance from the screen bottom to the paddle top
    pub const PADDLE_BOTTOM_OFFSET: f32 = 50.0;

    /// Obstacle defaults
    pub const OBSTACLE_WIDTH: f32 = 60.0;
    pub const OBSTACLE_HEIGHT: f32 = 20.0;
    pub const OBSTACLE_SPACING: f32 = 10.0;
    /// Minimum obstacle width when a row has to shrink to fit narrow screens
    pub const MIN_OBSTACLE_WIDTH: f32 = 4.0;

    /// Points per destroyed obstacle
    pub const SCORE_PER_OBSTACLE: u64 = 10;

    /// Ball speed (pixels per tick) when no settings are available
    pub const DEFAULT_BALL_SPEED: f32 = 6.0;
}

/// Screen geometry and timing shared by every component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub screen_width: f32,
    pub screen_height: f32,
    /// Vertical offset of the first obstacle row
    pub top_offset: f32,
    /// Last level of a run. `None` keeps generating levels forever.
    pub max_level: Option<u32>,
    /// Ticks between clearing a level and relaunching the ball
    pub level_up_delay_ticks: u32,
    /// Ticks between relaunching the ball and spawning the next layout
    pub obstacle_spawn_delay_ticks: u32,
    /// Wait before the single retry when resolving the player at startup
    pub startup_retry_delay: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            screen_width: 400.0,
            screen_height: 700.0,
            top_offset: 60.0,
            max_level: None,
            level_up_delay_ticks: 6,
            obstacle_spawn_delay_ticks: 12,
            startup_retry_delay: Duration::from_millis(500),
        }
    }
}

impl GameConfig {
    /// Y coordinate of the paddle's top edge
    #[inline]
    pub fn paddle_top(&self) -> f32 {
        self.screen_height - consts::PADDLE_BOTTOM_OFFSET
    }

    /// Largest legal paddle x
    #[inline]
    pub fn paddle_max_x(&self) -> f32 {
        (self.screen_width - consts::PADDLE_WIDTH).max(0.0)
    }
}
