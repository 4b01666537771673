//! High score leaderboard
//!
//! Kept inside the save data; tracks the top 10 runs.

use serde::{Deserialize, Serialize};

use crate::sim::{CharacterKind, RunStats};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Wave reached
    pub wave: u32,
    pub kills: u32,
    pub character: CharacterKind,
    /// Unix timestamp (seconds) when achieved
    pub timestamp: u64,
}

impl HighScoreEntry {
    pub fn from_stats(stats: &RunStats, timestamp: u64) -> Self {
        Self {
            score: stats.score,
            wave: stats.wave,
            kills: stats.kills,
            character: stats.character,
            timestamp,
        }
    }
}

/// High score leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Must beat the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert an entry if it qualifies; returns the rank achieved (1-indexed)
    pub fn add(&mut self, entry: HighScoreEntry) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }

        // Sorted descending by score; ties keep the older entry first
        let pos = self.entries.iter().position(|e| entry.score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(score: u64) -> HighScoreEntry {
        HighScoreEntry {
            score,
            wave: 1,
            kills: 0,
            character: CharacterKind::Gunner,
            timestamp: 0,
        }
    }

    #[test]
    fn test_zero_never_qualifies() {
        let scores = HighScores::new();
        assert!(!scores.qualifies(0));
        assert!(scores.qualifies(1));
    }

    #[test]
    fn test_sorted_and_ranked() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add(entry(100)), Some(1));
        assert_eq!(scores.add(entry(300)), Some(1));
        assert_eq!(scores.add(entry(200)), Some(2));
        let order: Vec<u64> = scores.entries.iter().map(|e| e.score).collect();
        assert_eq!(order, vec![300, 200, 100]);
        assert_eq!(scores.top_score(), Some(300));
    }

    #[test]
    fn test_capped_at_ten() {
        let mut scores = HighScores::new();
        for s in 1..=12 {
            scores.add(entry(s * 10));
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.potential_rank(5), None);
        assert_eq!(scores.add(entry(25)), None);
        assert_eq!(scores.potential_rank(1000), Some(1));
    }
}
