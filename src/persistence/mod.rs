//! Player records and settings persistence
//!
//! Features:
//! - Key-value record store trait with in-memory and JSON-file backends
//! - Player repository owning its store (no process-wide caches)
//! - Corrupt records fall back to defaults instead of failing the game

pub mod players;
pub mod store;

pub use players::{Clock, GameSession, Player, PlayerRepository, PlayerStats};
pub use store::{JsonFileStore, MemoryStore};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// String-keyed store of JSON documents
pub trait RecordStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Player and score persistence as the game sees it
pub trait Persistence {
    /// Look up a player by name, creating one if missing. Surrounding
    /// whitespace is trimmed; the rest must match exactly, case included.
    /// A name that is empty after trimming is rejected.
    fn get_or_create_player(&mut self, name: &str) -> Result<Player>;

    /// Record a finished game: running maxima and sums, plus a session row
    fn update_player_score(&mut self, player_id: u64, score: u64, level: u32) -> Result<()>;

    /// Rename; fails if another player already has `new_name`
    fn update_player_name(&mut self, player_id: u64, new_name: &str) -> Result<Player>;

    /// All players, best high score first, most recently updated first on ties
    fn get_all_players(&self) -> Result<Vec<Player>>;

    /// A player's most recent sessions, newest first
    fn get_player_sessions(&self, player_id: u64, limit: usize) -> Result<Vec<GameSession>>;
}

/// Read and decode `key`. Missing or undecodable records give the default;
/// only storage failures are errors.
pub fn load_record_or_default<T, S>(store: &S, key: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
    S: RecordStore + ?Sized,
{
    let Some(json) = store.get(key)? else {
        return Ok(T::default());
    };
    match serde_json::from_str(&json) {
        Ok(value) => Ok(value),
        Err(err) => {
            log::warn!("Record '{key}' is unreadable ({err}), using defaults");
            Ok(T::default())
        }
    }
}

/// Encode and write `value` under `key`
pub fn save_record<T, S>(store: &mut S, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    S: RecordStore + ?Sized,
{
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_record_is_default() {
        let store = MemoryStore::new();
        let value: Vec<u32> = load_record_or_default(&store, "nothing").unwrap();
        assert!(value.is_empty());
    }

    #[test]
    fn test_corrupt_record_is_default() {
        let mut store = MemoryStore::new();
        store.set("numbers", "{not json").unwrap();
        let value: Vec<u32> = load_record_or_default(&store, "numbers").unwrap();
        assert!(value.is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        save_record(&mut store, "numbers", &vec![1u32, 2, 3]).unwrap();
        let value: Vec<u32> = load_record_or_default(&store, "numbers").unwrap();
        assert_eq!(value, vec![1, 2, 3]);
    }
}
