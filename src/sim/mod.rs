//! Discrete-time simulation module
//!
//! All gameplay logic lives here:
//! - Fixed step per display frame, velocities in pixels per tick
//! - Seeded RNG only
//! - No rendering, storage or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod engine;
pub mod levels;
pub mod state;
pub mod tick;

pub use collision::{BounceAxis, Rect, bounce_axis, hit_position, paddle_contact, rebound_vx};
pub use engine::{LoopHandle, PhysicsEngine};
pub use levels::{LayoutPattern, LevelGenerator, generate};
pub use state::{
    Ball, GameEvent, GamePhase, GameState, LevelTransition, Obstacle, Paddle, TransitionStage,
};
pub use tick::{launch_ball, tick};
