//! Collision detection and response for axis-aligned boxes
//!
//! Everything in the arena is a rectangle: the ball's bounding box, the
//! paddle, and every obstacle. Tests here are plain AABB overlaps; the
//! interesting part is the response (rebound angle off the paddle, bounce
//! axis off an obstacle).

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle, origin at the top-left, y growing downward
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Strict overlap; touching edges do not count
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.horizontal_overlap(other)
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    #[inline]
    pub fn horizontal_overlap(&self, other: &Rect) -> bool {
        self.left() < other.right() && self.right() > other.left()
    }

    /// Grown by `margin` on every side
    #[inline]
    pub fn expanded(&self, margin: f32) -> Rect {
        Rect::new(
            self.x - margin,
            self.y - margin,
            self.width + margin * 2.0,
            self.height + margin * 2.0,
        )
    }
}

/// Paddle contact test for a ball box.
///
/// Unlike [`Rect::overlaps`] a ball whose bottom lands exactly on the paddle
/// top counts as contact, so the predictive check catches a ball that would
/// come to rest on the paddle next tick.
#[inline]
pub fn paddle_contact(ball: &Rect, paddle: &Rect) -> bool {
    ball.horizontal_overlap(paddle) && ball.bottom() >= paddle.top() && ball.top() < paddle.bottom()
}

/// Normalized contact position along the paddle: 0 = left edge, 1 = right edge
#[inline]
pub fn hit_position(ball_center_x: f32, paddle: &Rect) -> f32 {
    if paddle.width <= 0.0 {
        return 0.5;
    }
    ((ball_center_x - paddle.left()) / paddle.width).clamp(0.0, 1.0)
}

/// Horizontal velocity after a paddle hit.
///
/// Center gives a straight rebound, edges give `±speed`.
#[inline]
pub fn rebound_vx(hit_position: f32, speed: f32) -> f32 {
    (hit_position - 0.5) * speed * 2.0
}

/// Velocity component to invert after an obstacle hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BounceAxis {
    /// Invert vx
    Horizontal,
    /// Invert vy
    Vertical,
}

/// Pick the bounce axis from the center-to-center offset.
///
/// The axis with the larger separation is taken as the one the ball did not
/// penetrate along. This is an approximation of the true contact normal and
/// misjudges corner hits on wide obstacles; it is kept because the rebound
/// feel depends on it.
#[inline]
pub fn bounce_axis(ball_center: Vec2, obstacle_center: Vec2) -> BounceAxis {
    let d = ball_center - obstacle_center;
    if d.x.abs() > d.y.abs() {
        BounceAxis::Horizontal
    } else {
        BounceAxis::Vertical
    }
}

/// Apply a bounce to a velocity
#[inline]
pub fn reflect_velocity(velocity: Vec2, axis: BounceAxis) -> Vec2 {
    match axis {
        BounceAxis::Horizontal => Vec2::new(-velocity.x, velocity.y),
        BounceAxis::Vertical => Vec2::new(velocity.x, -velocity.y),
    }
}
