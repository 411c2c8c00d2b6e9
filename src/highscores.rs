//! High score tracking
//!
//! Two views: the running best within a session (seeded from the player's
//! stored high score), and a leaderboard built from the persisted players.

use crate::persistence::Player;

/// Maximum number of leaderboard rows
pub const MAX_LEADERBOARD_ENTRIES: usize = 10;

/// Best score seen so far, starting from the player's stored record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionHighScore {
    stored_best: u64,
    best: u64,
}

impl SessionHighScore {
    pub fn new(stored_best: u64) -> Self {
        Self {
            stored_best,
            best: stored_best,
        }
    }

    /// Feed the current score. Returns true when it beats everything seen so far.
    pub fn record(&mut self, score: u64) -> bool {
        if score > self.best {
            self.best = score;
            true
        } else {
            false
        }
    }

    pub fn best(&self) -> u64 {
        self.best
    }

    pub fn stored_best(&self) -> u64 {
        self.stored_best
    }

    /// Whether this session has beaten the stored record
    pub fn is_new_record(&self) -> bool {
        self.best > self.stored_best
    }
}

/// A single leaderboard row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    /// 1-indexed
    pub rank: usize,
    pub name: String,
    pub high_score: u64,
    pub best_level: u32,
}

/// Top players by high score
#[derive(Debug, Clone, Default)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Rank players that have scored. Players are ordered by high score,
    /// most recently updated first on ties.
    pub fn from_players(players: &[Player]) -> Self {
        let mut ranked: Vec<&Player> = players.iter().filter(|p| p.high_score > 0).collect();
        ranked.sort_by(|a, b| {
            b.high_score
                .cmp(&a.high_score)
                .then(b.updated_at.cmp(&a.updated_at))
        });

        let entries = ranked
            .into_iter()
            .take(MAX_LEADERBOARD_ENTRIES)
            .enumerate()
            .map(|(i, p)| LeaderboardEntry {
                rank: i + 1,
                name: p.name.clone(),
                high_score: p.high_score,
                best_level: p.best_level,
            })
            .collect();

        Self { entries }
    }

    /// Check if a score would make the board
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_LEADERBOARD_ENTRIES {
            return true;
        }
        self.entries.last().map(|e| score > e.high_score).unwrap_or(true)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.high_score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.high_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: u64, name: &str, high_score: u64, updated_at: u64) -> Player {
        Player {
            id,
            name: name.to_string(),
            high_score,
            total_games: 1,
            total_score: high_score,
            best_level: 1,
            created_at: 0,
            updated_at,
        }
    }

    #[test]
    fn test_session_high_score() {
        let mut high = SessionHighScore::new(50);
        assert!(!high.record(30));
        assert!(!high.record(50));
        assert!(!high.is_new_record());
        assert!(high.record(60));
        assert!(high.is_new_record());
        assert_eq!(high.best(), 60);
        assert_eq!(high.stored_best(), 50);
    }

    #[test]
    fn test_leaderboard_ranks_and_skips_zero_scores() {
        let players = vec![
            player(1, "a", 40, 1),
            player(2, "b", 90, 2),
            player(3, "c", 0, 3),
            player(4, "d", 40, 5),
        ];
        let board = Leaderboard::from_players(&players);
        let names: Vec<&str> = board.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["b", "d", "a"]);
        assert_eq!(board.entries[2].rank, 3);
        assert_eq!(board.top_score(), Some(90));
    }

    #[test]
    fn test_leaderboard_caps_and_qualifies() {
        let players: Vec<Player> = (1..=15)
            .map(|i| player(i, &format!("p{i}"), i * 10, i))
            .collect();
        let board = Leaderboard::from_players(&players);
        assert_eq!(board.entries.len(), MAX_LEADERBOARD_ENTRIES);
        // Lowest on the board is 60
        assert!(!board.qualifies(60));
        assert!(board.qualifies(61));
        assert_eq!(board.potential_rank(200), Some(1));
        assert_eq!(board.potential_rank(61), Some(10));
        assert_eq!(board.potential_rank(0), None);
    }

    #[test]
    fn test_empty_board() {
        let board = Leaderboard::from_players(&[]);
        assert!(board.is_empty());
        assert_eq!(board.potential_rank(10), Some(1));
    }
}
