//! Game settings and preferences
//!
//! Persisted in the record store under their own key, separate from player
//! records. Anything unreadable falls back to the defaults.

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_BALL_SPEED, PADDLE_HEIGHT};
use crate::error::Result;
use crate::persistence::{RecordStore, save_record};

/// Difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Ball speed for this preset, in pixels per tick
    pub fn ball_speed(&self) -> f32 {
        match self {
            Difficulty::Easy => 4.0,
            Difficulty::Medium => DEFAULT_BALL_SPEED,
            Difficulty::Hard => 8.0,
        }
    }
}

/// Player preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub difficulty: Difficulty,
    /// Pixels per tick. Normally the preset's speed but may be tuned freely.
    pub ball_speed: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_difficulty(Difficulty::default())
    }
}

impl Settings {
    /// Record store key
    const STORAGE_KEY: &'static str = "game_settings";

    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ball_speed: difficulty.ball_speed(),
        }
    }

    /// Switch preset, resetting ball speed to the preset's
    pub fn apply_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.ball_speed = difficulty.ball_speed();
    }

    /// Speed the engine should use.
    ///
    /// Clamped to the paddle height so a ball can never skip over the paddle
    /// in one tick; non-finite or non-positive values use the preset.
    pub fn effective_ball_speed(&self) -> f32 {
        if !self.ball_speed.is_finite() || self.ball_speed <= 0.0 {
            return self.difficulty.ball_speed();
        }
        self.ball_speed.clamp(1.0, PADDLE_HEIGHT)
    }

    /// Load settings, falling back to defaults on any problem
    pub fn load<S: RecordStore + ?Sized>(store: &S) -> Self {
        match store.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    settings
                }
                Err(err) => {
                    log::warn!("Settings unreadable ({err}), using defaults");
                    Self::default()
                }
            },
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(err) => {
                log::warn!("Settings unavailable ({err}), using defaults");
                Self::default()
            }
        }
    }

    pub fn save<S: RecordStore + ?Sized>(&self, store: &mut S) -> Result<()> {
        save_record(store, Self::STORAGE_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}
