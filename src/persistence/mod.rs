//! Cross-run persistence: currency, unlocks, lifetime statistics and scores
//!
//! The simulation never touches storage. The host reads [`SaveData`] once at
//! run start and writes it at checkpoints (periodic snapshot, run end).
//! Implementations swallow and log their own failures.

mod file;

pub use file::JsonFilePersistence;

use serde::{Deserialize, Serialize};

use crate::highscores::{HighScoreEntry, HighScores};
use crate::sim::{CharacterKind, RunOutcome, RunStats};

/// Current save layout version
pub const SAVE_VERSION: u32 = 1;

/// Totals across every finished run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifetimeStats {
    pub runs: u32,
    pub deaths: u32,
    pub kills: u64,
    pub bosses_defeated: u32,
    pub best_wave: u32,
    pub best_score: u64,
    pub time_played: f64,
    pub currency_earned: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveData {
    pub version: u32,
    /// Spendable currency
    pub currency: u64,
    pub unlocked: Vec<CharacterKind>,
    pub lifetime: LifetimeStats,
    pub high_scores: HighScores,
    /// Latest snapshot of a run that has not finished (crash recovery)
    pub in_progress: Option<RunStats>,
}

impl Default for SaveData {
    fn default() -> Self {
        Self {
            version: SAVE_VERSION,
            currency: 0,
            unlocked: vec![CharacterKind::Gunner],
            lifetime: LifetimeStats::default(),
            high_scores: HighScores::new(),
            in_progress: None,
        }
    }
}

impl SaveData {
    pub fn is_unlocked(&self, character: CharacterKind) -> bool {
        character.unlock_cost() == 0 || self.unlocked.contains(&character)
    }

    /// Spend currency to unlock a character; false if unaffordable or owned
    pub fn unlock(&mut self, character: CharacterKind) -> bool {
        if self.is_unlocked(character) {
            return false;
        }
        let cost = character.unlock_cost();
        if self.currency < cost {
            return false;
        }
        self.currency -= cost;
        self.unlocked.push(character);
        log::info!("Unlocked {} for {cost}", character.as_str());
        true
    }

    pub fn record_snapshot(&mut self, stats: &RunStats) {
        self.in_progress = Some(stats.clone());
    }

    /// Fold a finished run in; returns the leaderboard rank if it placed
    pub fn finish_run(&mut self, stats: &RunStats, outcome: RunOutcome, timestamp: u64) -> Option<usize> {
        let life = &mut self.lifetime;
        life.runs += 1;
        if outcome == RunOutcome::Died {
            life.deaths += 1;
        }
        life.kills += u64::from(stats.kills);
        life.bosses_defeated += stats.bosses_defeated;
        life.best_wave = life.best_wave.max(stats.wave);
        life.best_score = life.best_score.max(stats.score);
        life.time_played += f64::from(stats.elapsed);
        life.currency_earned += stats.currency_earned;

        self.currency += stats.currency_earned;
        self.in_progress = None;
        self.high_scores.add(HighScoreEntry::from_stats(stats, timestamp))
    }

    /// Recover a run that never reached its end (counted, no high score)
    pub fn recover_interrupted(&mut self) -> Option<RunStats> {
        let stats = self.in_progress.take()?;
        log::info!(
            "Recovering interrupted run: wave {}, score {}",
            stats.wave,
            stats.score
        );
        self.lifetime.runs += 1;
        self.lifetime.kills += u64::from(stats.kills);
        self.lifetime.time_played += f64::from(stats.elapsed);
        self.lifetime.currency_earned += stats.currency_earned;
        self.currency += stats.currency_earned;
        Some(stats)
    }
}

/// Storage collaborator
pub trait Persistence {
    /// Read the save (defaults when absent or unreadable)
    fn load(&mut self) -> SaveData;
    /// Write the save; failures are logged, never returned
    fn save(&mut self, data: &SaveData);
}

/// In-memory store (tests, headless runs)
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    pub data: Option<SaveData>,
    /// Number of writes performed
    pub writes: usize,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: SaveData) -> Self {
        Self {
            data: Some(data),
            writes: 0,
        }
    }
}

impl Persistence for MemoryPersistence {
    fn load(&mut self) -> SaveData {
        self.data.clone().unwrap_or_default()
    }

    fn save(&mut self, data: &SaveData) {
        self.data = Some(data.clone());
        self.writes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(score: u64, currency: u64) -> RunStats {
        RunStats {
            score,
            wave: 3,
            kills: 12,
            currency_earned: currency,
            elapsed: 95.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_gunner_always_unlocked() {
        let save = SaveData::default();
        assert!(save.is_unlocked(CharacterKind::Gunner));
        assert!(!save.is_unlocked(CharacterKind::Summoner));
    }

    #[test]
    fn test_unlock_spends_currency() {
        let mut save = SaveData {
            currency: 300,
            ..Default::default()
        };
        assert!(!save.unlock(CharacterKind::Engineer));
        assert!(save.unlock(CharacterKind::Summoner));
        assert_eq!(save.currency, 50);
        assert!(!save.unlock(CharacterKind::Summoner));
    }

    #[test]
    fn test_finish_run_folds_stats() {
        let mut save = SaveData::default();
        save.record_snapshot(&stats(10, 1));
        let rank = save.finish_run(&stats(420, 42), RunOutcome::Died, 1_700_000_000);
        assert_eq!(rank, Some(1));
        assert_eq!(save.currency, 42);
        assert_eq!(save.lifetime.runs, 1);
        assert_eq!(save.lifetime.deaths, 1);
        assert_eq!(save.lifetime.kills, 12);
        assert_eq!(save.lifetime.best_wave, 3);
        assert!(save.in_progress.is_none());
    }

    #[test]
    fn test_recover_interrupted() {
        let mut save = SaveData::default();
        assert!(save.recover_interrupted().is_none());
        save.record_snapshot(&stats(100, 10));
        let recovered = save.recover_interrupted().expect("snapshot");
        assert_eq!(recovered.score, 100);
        assert_eq!(save.currency, 10);
        assert!(save.high_scores.is_empty());
        assert!(save.in_progress.is_none());
    }

    #[test]
    fn test_memory_persistence() {
        let mut store = MemoryPersistence::new();
        assert_eq!(store.load(), SaveData::default());
        let mut save = SaveData::default();
        save.currency = 7;
        store.save(&save);
        assert_eq!(store.load().currency, 7);
        assert_eq!(store.writes, 1);
    }
}
