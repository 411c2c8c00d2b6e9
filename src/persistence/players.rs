//! Player profiles and game history
//!
//! The repository keeps an in-memory copy of every record and writes the
//! whole collection back on each change. It is built once around an owned
//! store; dropping it is the only teardown.

use serde::{Deserialize, Serialize};

use super::{Persistence, RecordStore, load_record_or_default, save_record};
use crate::error::{GameError, Result};

const PLAYERS_KEY: &str = "players";
const SESSIONS_KEY: &str = "game_sessions";
const COUNTERS_KEY: &str = "id_counters";

/// A player's profile and running totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: u64,
    pub name: String,
    pub high_score: u64,
    pub total_games: u32,
    pub total_score: u64,
    pub best_level: u32,
    /// Unix timestamp (ms)
    pub created_at: u64,
    /// Unix timestamp (ms)
    pub updated_at: u64,
}

/// One finished game. Never modified after it is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    pub id: u64,
    pub player_id: u64,
    pub score: u64,
    pub level: u32,
    /// Unix timestamp (ms)
    pub played_at: u64,
}

/// Summary shown on a profile screen
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStats {
    pub games: u32,
    pub high_score: u64,
    pub best_level: u32,
    pub average_score: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdCounters {
    next_player_id: u64,
    next_session_id: u64,
}

impl Default for IdCounters {
    fn default() -> Self {
        Self {
            next_player_id: 1,
            next_session_id: 1,
        }
    }
}

/// Millisecond timestamp source
pub type Clock = Box<dyn Fn() -> u64>;

fn system_clock_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn normalize_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(GameError::EmptyName);
    }
    Ok(name.to_string())
}

pub struct PlayerRepository<S: RecordStore> {
    store: S,
    players: Vec<Player>,
    sessions: Vec<GameSession>,
    counters: IdCounters,
    clock: Clock,
}

impl<S: RecordStore> PlayerRepository<S> {
    /// Load every record from `store`
    pub fn open(store: S) -> Result<Self> {
        Self::open_with_clock(store, Box::new(system_clock_ms))
    }

    /// Like [`open`](Self::open) with a custom millisecond clock
    pub fn open_with_clock(store: S, clock: Clock) -> Result<Self> {
        let players: Vec<Player> = load_record_or_default(&store, PLAYERS_KEY)?;
        let sessions: Vec<GameSession> = load_record_or_default(&store, SESSIONS_KEY)?;
        let mut counters: IdCounters = load_record_or_default(&store, COUNTERS_KEY)?;

        // Counters may be missing or stale if a record was reset by hand
        let max_player = players.iter().map(|p| p.id).max().unwrap_or(0);
        let max_session = sessions.iter().map(|s| s.id).max().unwrap_or(0);
        counters.next_player_id = counters.next_player_id.max(max_player + 1);
        counters.next_session_id = counters.next_session_id.max(max_session + 1);

        log::info!(
            "Loaded {} players and {} game sessions",
            players.len(),
            sessions.len()
        );

        Ok(Self {
            store,
            players,
            sessions,
            counters,
            clock,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn player(&self, player_id: u64) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn get_player_stats(&self, player_id: u64) -> Result<PlayerStats> {
        let player = self
            .player(player_id)
            .ok_or(GameError::PlayerNotFound { id: player_id })?;
        let average_score = if player.total_games == 0 {
            0.0
        } else {
            player.total_score as f64 / player.total_games as f64
        };
        Ok(PlayerStats {
            games: player.total_games,
            high_score: player.high_score,
            best_level: player.best_level,
            average_score,
        })
    }

    fn player_index(&self, player_id: u64) -> Result<usize> {
        self.players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or(GameError::PlayerNotFound { id: player_id })
    }

    /// Write players and counters; the cache is only replaced once both land
    fn commit_players(&mut self, players: Vec<Player>, counters: IdCounters) -> Result<()> {
        self.commit(players, None, counters)
    }

    /// Write every changed collection, then swap the cache. A failed write
    /// leaves the cache untouched; the next commit rewrites each record from
    /// it, so a row left behind by the failed write is replaced rather than
    /// duplicated.
    fn commit(
        &mut self,
        players: Vec<Player>,
        sessions: Option<Vec<GameSession>>,
        counters: IdCounters,
    ) -> Result<()> {
        if let Some(sessions) = &sessions {
            save_record(&mut self.store, SESSIONS_KEY, sessions)?;
        }
        save_record(&mut self.store, PLAYERS_KEY, &players)?;
        save_record(&mut self.store, COUNTERS_KEY, &counters)?;

        self.players = players;
        if let Some(sessions) = sessions {
            self.sessions = sessions;
        }
        self.counters = counters;
        Ok(())
    }
}

impl<S: RecordStore> Persistence for PlayerRepository<S> {
    fn get_or_create_player(&mut self, name: &str) -> Result<Player> {
        let name = normalize_name(name)?;
        if let Some(player) = self.players.iter().find(|p| p.name == name) {
            return Ok(player.clone());
        }

        let now = (self.clock)();
        let mut counters = self.counters;
        let player = Player {
            id: counters.next_player_id,
            name,
            high_score: 0,
            total_games: 0,
            total_score: 0,
            best_level: 1,
            created_at: now,
            updated_at: now,
        };
        counters.next_player_id += 1;

        let mut players = self.players.clone();
        players.push(player.clone());
        self.commit_players(players, counters)?;

        log::info!("Created player '{}' (id {})", player.name, player.id);
        Ok(player)
    }

    fn update_player_score(&mut self, player_id: u64, score: u64, level: u32) -> Result<()> {
        let index = self.player_index(player_id)?;
        let now = (self.clock)();
        let mut counters = self.counters;

        let mut players = self.players.clone();
        let player = &mut players[index];
        player.high_score = player.high_score.max(score);
        player.best_level = player.best_level.max(level);
        player.total_games += 1;
        player.total_score += score;
        player.updated_at = now;

        let mut sessions = self.sessions.clone();
        sessions.push(GameSession {
            id: counters.next_session_id,
            player_id,
            score,
            level,
            played_at: now,
        });
        counters.next_session_id += 1;

        self.commit(players, Some(sessions), counters)?;

        log::debug!("Recorded score {score} at level {level} for player {player_id}");
        Ok(())
    }

    fn update_player_name(&mut self, player_id: u64, new_name: &str) -> Result<Player> {
        let name = normalize_name(new_name)?;
        let index = self.player_index(player_id)?;
        if self
            .players
            .iter()
            .any(|p| p.id != player_id && p.name == name)
        {
            return Err(GameError::NameTaken { name });
        }

        let mut players = self.players.clone();
        let player = &mut players[index];
        player.name = name;
        player.updated_at = (self.clock)();
        let renamed = player.clone();

        let counters = self.counters;
        self.commit_players(players, counters)?;
        Ok(renamed)
    }

    fn get_all_players(&self) -> Result<Vec<Player>> {
        let mut players = self.players.clone();
        players.sort_by(|a, b| {
            b.high_score
                .cmp(&a.high_score)
                .then(b.updated_at.cmp(&a.updated_at))
        });
        Ok(players)
    }

    fn get_player_sessions(&self, player_id: u64, limit: usize) -> Result<Vec<GameSession>> {
        let mut sessions: Vec<GameSession> = self
            .sessions
            .iter()
            .filter(|s| s.player_id == player_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.played_at.cmp(&a.played_at).then(b.id.cmp(&a.id)));
        sessions.truncate(limit);
        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Clock that advances by one second on every read
    fn ticking_clock() -> Clock {
        let now = Rc::new(Cell::new(1_000_000u64));
        Box::new(move || {
            let t = now.get();
            now.set(t + 1_000);
            t
        })
    }

    fn repo() -> PlayerRepository<MemoryStore> {
        PlayerRepository::open_with_clock(MemoryStore::new(), ticking_clock()).unwrap()
    }

    #[test]
    fn test_create_player_defaults() {
        let mut repo = repo();
        let player = repo.get_or_create_player("Ada").unwrap();
        assert_eq!(player.id, 1);
        assert_eq!(player.name, "Ada");
        assert_eq!(player.high_score, 0);
        assert_eq!(player.total_games, 0);
        assert_eq!(player.total_score, 0);
        assert_eq!(player.best_level, 1);
        assert_eq!(player.created_at, player.updated_at);
    }

    #[test]
    fn test_lookup_is_exact_and_case_sensitive() {
        let mut repo = repo();
        let a = repo.get_or_create_player("Ada").unwrap();
        let again = repo.get_or_create_player("  Ada ").unwrap();
        let lower = repo.get_or_create_player("ada").unwrap();

        assert_eq!(a.id, again.id);
        assert_ne!(a.id, lower.id);
        assert_eq!(repo.get_all_players().unwrap().len(), 2);
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut repo = repo();
        assert!(matches!(
            repo.get_or_create_player("   "),
            Err(GameError::EmptyName)
        ));
    }

    #[test]
    fn test_update_score_tracks_maxima_and_sums() {
        let mut repo = repo();
        let id = repo.get_or_create_player("Ada").unwrap().id;

        repo.update_player_score(id, 120, 3).unwrap();
        repo.update_player_score(id, 80, 2).unwrap();

        let player = repo.player(id).unwrap();
        assert_eq!(player.high_score, 120);
        assert_eq!(player.best_level, 3);
        assert_eq!(player.total_games, 2);
        assert_eq!(player.total_score, 200);

        let stats = repo.get_player_stats(id).unwrap();
        assert_eq!(stats.average_score, 100.0);
    }

    #[test]
    fn test_update_score_unknown_player() {
        let mut repo = repo();
        assert!(matches!(
            repo.update_player_score(99, 10, 1),
            Err(GameError::PlayerNotFound { id: 99 })
        ));
    }

    #[test]
    fn test_sessions_newest_first_and_limited() {
        let mut repo = repo();
        let id = repo.get_or_create_player("Ada").unwrap().id;
        let other = repo.get_or_create_player("Bob").unwrap().id;
        for score in [10, 20, 30, 40] {
            repo.update_player_score(id, score, 1).unwrap();
        }
        repo.update_player_score(other, 999, 5).unwrap();

        let sessions = repo.get_player_sessions(id, 3).unwrap();
        let scores: Vec<u64> = sessions.iter().map(|s| s.score).collect();
        assert_eq!(scores, vec![40, 30, 20]);
        assert!(sessions.iter().all(|s| s.player_id == id));
    }

    #[test]
    fn test_rename_collision_leaves_state_untouched() {
        let mut repo = repo();
        let ada = repo.get_or_create_player("Ada").unwrap();
        repo.get_or_create_player("Bob").unwrap();

        let err = repo.update_player_name(ada.id, "Bob").unwrap_err();
        assert!(matches!(err, GameError::NameTaken { .. }));
        assert_eq!(repo.player(ada.id).unwrap(), &ada);
    }

    #[test]
    fn test_rename_to_own_name_and_new_name() {
        let mut repo = repo();
        let ada = repo.get_or_create_player("Ada").unwrap();

        let same = repo.update_player_name(ada.id, "Ada").unwrap();
        assert_eq!(same.name, "Ada");

        let renamed = repo.update_player_name(ada.id, "Countess").unwrap();
        assert_eq!(renamed.name, "Countess");
        assert!(renamed.updated_at > ada.updated_at);
        assert_eq!(repo.get_or_create_player("Countess").unwrap().id, ada.id);
    }

    #[test]
    fn test_all_players_ordering() {
        let mut repo = repo();
        let a = repo.get_or_create_player("A").unwrap().id;
        let b = repo.get_or_create_player("B").unwrap().id;
        let c = repo.get_or_create_player("C").unwrap().id;
        repo.update_player_score(a, 50, 1).unwrap();
        repo.update_player_score(b, 90, 2).unwrap();
        // Same high score as A but updated later
        repo.update_player_score(c, 50, 1).unwrap();

        let order: Vec<u64> = repo.get_all_players().unwrap().iter().map(|p| p.id).collect();
        assert_eq!(order, vec![b, c, a]);
    }

    #[test]
    fn test_reopen_restores_records_and_ids() {
        let mut repo = repo();
        let id = repo.get_or_create_player("Ada").unwrap().id;
        repo.update_player_score(id, 70, 2).unwrap();

        let store = repo.into_store();
        let mut reopened = PlayerRepository::open_with_clock(store, ticking_clock()).unwrap();
        assert_eq!(reopened.player(id).unwrap().high_score, 70);
        assert_eq!(reopened.get_player_sessions(id, 10).unwrap().len(), 1);

        let bob = reopened.get_or_create_player("Bob").unwrap();
        assert_eq!(bob.id, id + 1);
    }

    /// Memory store whose next `fail_writes` writes to `fail_key` error out
    struct FlakyStore {
        inner: MemoryStore,
        fail_key: &'static str,
        fail_writes: u32,
    }

    impl RecordStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<()> {
            if key == self.fail_key && self.fail_writes > 0 {
                self.fail_writes -= 1;
                return Err(GameError::Storage(std::io::Error::other("disk full")));
            }
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_failed_score_write_leaves_no_partial_state() {
        let store = FlakyStore {
            inner: MemoryStore::new(),
            fail_key: PLAYERS_KEY,
            fail_writes: 0,
        };
        let mut repo = PlayerRepository::open_with_clock(store, ticking_clock()).unwrap();
        let id = repo.get_or_create_player("Ada").unwrap().id;

        repo.store_mut().fail_writes = 1;
        assert!(matches!(
            repo.update_player_score(id, 40, 2),
            Err(GameError::Storage(_))
        ));
        assert_eq!(repo.player(id).unwrap().total_games, 0);
        assert!(repo.get_player_sessions(id, 10).unwrap().is_empty());

        repo.update_player_score(id, 60, 3).unwrap();
        assert_eq!(repo.player(id).unwrap().total_games, 1);

        // The stored rows agree with the cache and ids stay unique
        let stored: Vec<GameSession> =
            load_record_or_default(repo.store(), SESSIONS_KEY).unwrap();
        let ids: Vec<u64> = stored.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1]);
        assert_eq!(stored[0].score, 60);

        repo.update_player_score(id, 10, 1).unwrap();
        let sessions = repo.get_player_sessions(id, 10).unwrap();
        let mut ids: Vec<u64> = sessions.iter().map(|s| s.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_corrupt_records_fall_back_to_empty() {
        let mut store = MemoryStore::new();
        store.set(PLAYERS_KEY, "not json").unwrap();
        store.set(SESSIONS_KEY, "{\"oops\": true}").unwrap();

        let mut repo = PlayerRepository::open_with_clock(store, ticking_clock()).unwrap();
        assert!(repo.get_all_players().unwrap().is_empty());
        assert_eq!(repo.get_or_create_player("Ada").unwrap().id, 1);
    }
}
