//! Brick Breaker headless runner
//!
//! Plays a run with the demo autopilot against the on-disk record store,
//! then prints the leaderboard.

use std::env;
use std::path::PathBuf;

use anyhow::Context;

use brick_breaker::persistence::{JsonFileStore, Persistence, PlayerRepository};
use brick_breaker::sim::autopilot;
use brick_breaker::{Difficulty, Game, GameConfig, GameStatus, Leaderboard, Settings};

const DEFAULT_DATA_DIR: &str = "brick-breaker-data";
const DEFAULT_PLAYER: &str = "Autopilot";
const DEFAULT_MAX_FRAMES: u64 = 20_000;

fn read_env_u64(name: &str, default: u64) -> u64 {
    match env::var(name) {
        Ok(value) => match value.parse::<u64>() {
            Ok(parsed) if parsed > 0 => parsed,
            _ => {
                log::warn!("Ignoring {name}={value:?}, using {default}");
                default
            }
        },
        Err(_) => default,
    }
}

fn read_env_string(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn read_env_difficulty(name: &str) -> Option<Difficulty> {
    let value = env::var(name).ok()?;
    let difficulty = Difficulty::from_str(&value);
    if difficulty.is_none() {
        log::warn!("Ignoring {name}={value:?}, expected easy, medium or hard");
    }
    difficulty
}

fn time_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    log::info!("Brick Breaker (headless) starting...");

    let data_dir = PathBuf::from(read_env_string("BRICK_BREAKER_DATA_DIR", DEFAULT_DATA_DIR));
    let player_name = read_env_string("BRICK_BREAKER_PLAYER", DEFAULT_PLAYER);
    let max_frames = read_env_u64("BRICK_BREAKER_MAX_FRAMES", DEFAULT_MAX_FRAMES);
    let seed = read_env_u64("BRICK_BREAKER_SEED", time_seed());

    let store = JsonFileStore::open(&data_dir)
        .with_context(|| format!("failed to open data directory {}", data_dir.display()))?;
    let mut repo = PlayerRepository::open(store).context("failed to load player records")?;

    let mut settings = Settings::load(repo.store());
    if let Some(difficulty) = read_env_difficulty("BRICK_BREAKER_DIFFICULTY") {
        settings.apply_difficulty(difficulty);
        if let Err(err) = settings.save(repo.store_mut()) {
            log::warn!("Could not save settings: {err}");
        }
    }
    log::info!(
        "Difficulty {} (ball speed {}), seed {seed}",
        settings.difficulty.as_str(),
        settings.effective_ball_speed()
    );

    let mut game = Game::new(GameConfig::default(), settings, repo, seed);
    let player = game
        .submit_player_name(&player_name)
        .context("could not resolve player")?;
    log::info!("Playing as '{}' (best {})", player.name, player.high_score);

    game.on_pointer_down();

    let mut frames = 0u64;
    while matches!(
        game.status(),
        GameStatus::Playing | GameStatus::LevelTransition
    ) && frames < max_frames
    {
        let target = autopilot::paddle_target(game.state(), game.config());
        game.on_pointer_move(target);
        game.frame();
        frames += 1;
    }

    let state = game.state();
    match game.status() {
        GameStatus::GameOver { won: true } => {
            log::info!("Run complete: score {} on level {}", state.score, state.level)
        }
        GameStatus::GameOver { won: false } => {
            log::info!("Game over: score {} on level {}", state.score, state.level)
        }
        status => log::info!(
            "Stopped after {frames} frames ({status:?}): score {} on level {}",
            state.score,
            state.level
        ),
    }
    if game.high_score().is_new_record() {
        log::info!("New personal best: {}", game.high_score().best());
    }
    game.teardown();

    let players = game
        .persistence()
        .get_all_players()
        .context("failed to read players")?;
    let board = Leaderboard::from_players(&players);
    if board.is_empty() {
        println!("No scores yet");
    } else {
        println!("{:>4}  {:<20} {:>8} {:>6}", "Rank", "Name", "Score", "Level");
        for entry in &board.entries {
            println!(
                "{:>4}  {:<20} {:>8} {:>6}",
                entry.rank, entry.name, entry.high_score, entry.best_level
            );
        }
    }

    Ok(())
}
