//! Demo-mode paddle AI
//!
//! Produces a pointer x the host can feed to the input controller, so a run
//! can play itself without a player.

use crate::GameConfig;

use super::state::GameState;

/// Pointer x that puts the paddle under the ball's predicted landing spot.
///
/// A slow oscillating offset varies the contact point so rebounds are not a
/// perfect loop.
pub fn paddle_target(state: &GameState, config: &GameConfig) -> f32 {
    let ball = &state.ball;
    let center_x = ball.center().x;
    let paddle_top = state.paddle.y;

    let landing_x = if ball.vel.y > 0.0 {
        let ticks = ((paddle_top - (ball.pos.y + ball.size)) / ball.vel.y).max(0.0);
        fold_into(
            center_x + ball.vel.x * ticks,
            ball.size / 2.0,
            config.screen_width - ball.size / 2.0,
        )
    } else {
        center_x
    };

    let time_factor = state.time_ticks as f32 * 0.02;
    let offset = (time_factor.sin() * 0.25 + (time_factor * 0.7).sin() * 0.1) * state.paddle.width;
    landing_x + offset
}

/// Reflect `x` back into `[min, max]` as if it bounced off both ends
fn fold_into(x: f32, min: f32, max: f32) -> f32 {
    let span = max - min;
    if span <= 0.0 {
        return min;
    }
    let period = span * 2.0;
    let t = (x - min).rem_euclid(period);
    if t <= span { min + t } else { min + period - t }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::GamePhase;
    use glam::Vec2;

    #[test]
    fn test_fold_into() {
        assert_eq!(fold_into(50.0, 0.0, 100.0), 50.0);
        assert_eq!(fold_into(130.0, 0.0, 100.0), 70.0);
        assert_eq!(fold_into(-20.0, 0.0, 100.0), 20.0);
    }

    #[test]
    fn test_target_tracks_rising_ball() {
        let config = GameConfig::default();
        let mut state = GameState::new(&config, 1, 6.0);
        state.phase = GamePhase::Playing;
        state.ball.vel = Vec2::new(2.0, -6.0);
        let target = paddle_target(&state, &config);
        // time_ticks is zero so there is no offset
        assert!((target - state.ball.center().x).abs() < 1e-4);
    }

    #[test]
    fn test_target_predicts_landing() {
        let config = GameConfig::default();
        let mut state = GameState::new(&config, 1, 6.0);
        state.ball.pos = Vec2::new(100.0, state.paddle.y - state.ball.size - 60.0);
        state.ball.vel = Vec2::new(3.0, 6.0);
        let target = paddle_target(&state, &config);
        // 10 ticks to the paddle, 30 px to the right
        assert!((target - (state.ball.center().x + 30.0)).abs() < 1e-3);
    }
}
