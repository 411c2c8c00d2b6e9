//! Discrete-time simulation tick
//!
//! One call advances the game by one display frame. Velocities are in
//! pixels per tick, so there is no `dt`. Within a tick the order is fixed:
//! pending level transition, walls, paddle, obstacles, loss check, then the
//! position advance. All collision checks run against the ball's current
//! position; the advance at the end is the only place it moves.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::collision::{bounce_axis, hit_position, paddle_contact, rebound_vx, reflect_velocity};
use super::levels::generate;
use super::state::{GameEvent, GamePhase, GameState, LevelTransition, TransitionStage};
use crate::GameConfig;
use crate::consts::*;

/// Advance the game state by one tick.
///
/// Does nothing unless the ball is in play. Returns what happened, in order.
pub fn tick(state: &mut GameState, config: &GameConfig, rng: &mut Pcg32) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if !state.phase.is_in_play() {
        return events;
    }

    state.time_ticks += 1;

    advance_transition(state, config, rng, &mut events);

    resolve_walls(state, config, &mut events);
    resolve_paddle(state, &mut events);
    resolve_obstacles(state, config, &mut events);
    if !state.phase.is_in_play() {
        return events;
    }

    if state.ball.pos.y > config.screen_height {
        lose_ball(state, &mut events);
        return events;
    }

    advance_ball(state, &mut events);
    events
}

/// Launch the ball from where it is at 45 degrees upward, random side, at
/// the configured speed
pub fn launch_ball(state: &mut GameState, rng: &mut Pcg32) {
    let dir_x = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
    state.ball.vel = Vec2::new(dir_x, -1.0).normalize() * state.ball_speed;
}

/// Run down the pending transition countdown and apply its stage when due
fn advance_transition(
    state: &mut GameState,
    config: &GameConfig,
    rng: &mut Pcg32,
    events: &mut Vec<GameEvent>,
) {
    let Some(mut transition) = state.transition else {
        return;
    };

    transition.ticks_remaining = transition.ticks_remaining.saturating_sub(1);
    if transition.ticks_remaining > 0 {
        state.transition = Some(transition);
        return;
    }

    match transition.stage {
        TransitionStage::LevelUp => {
            state.level += 1;
            state.ball.recenter(config);
            launch_ball(state, rng);
            log::info!("Level up: now on level {}", state.level);
            events.push(GameEvent::LevelUp { level: state.level });
            state.transition = Some(LevelTransition {
                stage: TransitionStage::SpawnObstacles,
                ticks_remaining: config.obstacle_spawn_delay_ticks,
            });
        }
        TransitionStage::SpawnObstacles => {
            // Cells within one ball size of the ball are left out, so nothing
            // is destroyed before it has been on screen
            let clearance = state.ball.rect().expanded(state.ball.size);
            let layout = generate(state.level, config.screen_width, config.top_offset);
            let generated = layout.len();
            state.obstacles = layout
                .into_iter()
                .filter(|o| !o.rect().overlaps(&clearance))
                .collect();
            if state.obstacles.len() < generated {
                log::debug!(
                    "Left out {} obstacles around the ball",
                    generated - state.obstacles.len()
                );
            }
            state.transition = None;
            state.phase = GamePhase::Playing;
            log::info!(
                "Level {} started with {} obstacles",
                state.level,
                state.obstacles.len()
            );
            events.push(GameEvent::LevelStarted {
                level: state.level,
                obstacles: state.obstacles.len(),
            });
        }
    }
}

/// Side and top walls. The bottom is open.
///
/// Velocity is pointed away from the wall rather than blindly negated, so a
/// ball clamped onto a wall can never flip back into it on the next tick.
fn resolve_walls(state: &mut GameState, config: &GameConfig, events: &mut Vec<GameEvent>) {
    let ball = &mut state.ball;
    let mut bounced = false;

    if ball.pos.x <= 0.0 {
        ball.pos.x = 0.0;
        ball.vel.x = ball.vel.x.abs();
        bounced = true;
    } else if ball.pos.x + ball.size >= config.screen_width {
        ball.pos.x = config.screen_width - ball.size;
        ball.vel.x = -ball.vel.x.abs();
        bounced = true;
    }

    if ball.pos.y <= 0.0 {
        ball.pos.y = 0.0;
        ball.vel.y = ball.vel.y.abs();
        bounced = true;
    }

    if bounced {
        events.push(GameEvent::WallBounce);
    }
}

/// Predictive paddle check: bounce if next tick's box would touch the paddle.
///
/// A falling ball can also end up inside the paddle without a predicted
/// touch, when the pointer sweeps the paddle sideways into a ball already
/// below its top edge. That ball is lifted back onto the paddle so the next
/// tick bounces it.
fn resolve_paddle(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if state.ball.vel.y <= 0.0 {
        return;
    }

    let paddle = state.paddle.rect();
    let predicted = state.ball.rect_at(state.ball.pos + state.ball.vel);
    if paddle_contact(&predicted, &paddle) {
        let hit = hit_position(state.ball.center().x, &paddle);
        state.ball.vel.y = -state.ball.vel.y;
        state.ball.vel.x = rebound_vx(hit, state.ball_speed);
        state.ball.pos.y = paddle.top() - state.ball.size;
        events.push(GameEvent::PaddleHit { hit_position: hit });
        return;
    }

    if state.ball.rect().overlaps(&paddle) {
        state.ball.pos.y = paddle.top() - state.ball.size;
    }
}

/// Destroy every standing obstacle the ball overlaps.
///
/// More than one obstacle can go in the same tick; each one flips the
/// velocity on its own axis.
fn resolve_obstacles(state: &mut GameState, config: &GameConfig, events: &mut Vec<GameEvent>) {
    let ball_rect = state.ball.rect();
    let ball_center = state.ball.center();
    let mut destroyed = 0usize;

    for obstacle in state.obstacles.iter_mut().filter(|o| !o.destroyed) {
        let rect = obstacle.rect();
        if !ball_rect.overlaps(&rect) {
            continue;
        }
        if !obstacle.destroy() {
            continue;
        }

        destroyed += 1;
        state.score += SCORE_PER_OBSTACLE;
        let axis = bounce_axis(ball_center, rect.center());
        state.ball.vel = reflect_velocity(state.ball.vel, axis);
        events.push(GameEvent::ObstacleDestroyed {
            id: obstacle.id,
            score: state.score,
        });
    }

    if destroyed == 0 || state.remaining_obstacles() > 0 {
        return;
    }

    log::info!("Level {} cleared (score {})", state.level, state.score);
    events.push(GameEvent::LevelCleared { level: state.level });

    if config.max_level.is_some_and(|max| state.level >= max) {
        log::info!("Final level cleared, run complete");
        state.phase = GamePhase::GameOver { won: true };
        state.transition = None;
        events.push(GameEvent::RunCompleted {
            score: state.score,
            level: state.level,
        });
        return;
    }

    state.phase = GamePhase::LevelTransition;
    state.transition = Some(LevelTransition {
        stage: TransitionStage::LevelUp,
        ticks_remaining: config.level_up_delay_ticks,
    });
}

fn lose_ball(state: &mut GameState, events: &mut Vec<GameEvent>) {
    state.phase = GamePhase::GameOver { won: false };
    state.transition = None;
    log::info!(
        "Ball lost: game over at level {} with score {}",
        state.level,
        state.score
    );
    events.push(GameEvent::BallLost {
        score: state.score,
        level: state.level,
    });
}

/// Commit `pos + vel`, refusing to let a descending ball pass into the paddle
fn advance_ball(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let paddle = state.paddle.rect();
    let mut next = state.ball.pos + state.ball.vel;

    if state.ball.vel.y > 0.0 && paddle_contact(&state.ball.rect_at(next), &paddle) {
        next.y = paddle.top() - state.ball.size;
        let hit = hit_position(next.x + state.ball.size / 2.0, &paddle);
        state.ball.vel.y = -state.ball.vel.y;
        state.ball.vel.x = rebound_vx(hit, state.ball_speed);
        events.push(GameEvent::PaddleHit { hit_position: hit });
    }

    state.ball.pos = next;
}
