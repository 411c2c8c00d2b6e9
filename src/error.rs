//! Error taxonomy for persistence and session setup
//!
//! Gameplay itself never fails; only the collaborators around it do.

use core::fmt;

#[derive(Debug)]
pub enum GameError {
    /// Backing store could not be read or written
    Storage(std::io::Error),
    /// A stored record could not be encoded or decoded
    Corrupt(serde_json::Error),
    /// Player names must contain something besides whitespace
    EmptyName,
    /// Another player already owns this name
    NameTaken { name: String },
    PlayerNotFound { id: u64 },
    /// An operation needs a resolved player and none is set
    NoActivePlayer,
    /// The player could not be resolved even after retrying
    PersistenceUnavailable { attempts: u32, reason: String },
}

pub type Result<T> = std::result::Result<T, GameError>;

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "storage error: {err}"),
            Self::Corrupt(err) => write!(f, "corrupt record: {err}"),
            Self::EmptyName => write!(f, "player name must not be empty"),
            Self::NameTaken { name } => write!(f, "the name \"{name}\" is already taken"),
            Self::PlayerNotFound { id } => write!(f, "no player with id {id}"),
            Self::NoActivePlayer => write!(f, "no active player"),
            Self::PersistenceUnavailable { attempts, reason } => write!(
                f,
                "player storage unavailable after {attempts} attempts: {reason}"
            ),
        }
    }
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Corrupt(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for GameError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err)
    }
}

impl From<serde_json::Error> for GameError {
    fn from(err: serde_json::Error) -> Self {
        Self::Corrupt(err)
    }
}
