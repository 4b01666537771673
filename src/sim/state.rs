//! Run state and shared simulation types
//!
//! Everything a run owns lives in [`Run`]; the per-frame logic that mutates it
//! is in [`super::tick`].

use glam::Vec2;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::boss::BossArchetype;
use super::collectible::PowerUpKind;
use super::combo::Combo;
use super::enemy::EnemyKind;
use super::player::{CharacterKind, Upgrade};
use super::store::EntityStore;
use super::wave::WaveScheduler;
use crate::consts::*;

/// Play-field extent supplied by the host (origin at the top-left corner)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldBounds {
    pub width: f32,
    pub height: f32,
}

impl Default for FieldBounds {
    fn default() -> Self {
        Self::new(DEFAULT_FIELD_WIDTH, DEFAULT_FIELD_HEIGHT)
    }
}

impl FieldBounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True when both extents are finite and positive
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    /// Clamp a centre point so an object with `half` extents stays inside
    pub fn clamp(&self, point: Vec2, half: Vec2) -> Vec2 {
        let max = Vec2::new(self.width, self.height) - half;
        // Objects wider than the field sit on its centre line
        Vec2::new(
            if max.x < half.x { self.width * 0.5 } else { point.x.clamp(half.x, max.x) },
            if max.y < half.y { self.height * 0.5 } else { point.y.clamp(half.y, max.y) },
        )
    }
}

/// Top-level run phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Nothing started yet
    Ready,
    /// Picking a character
    CharacterSelect,
    /// Active gameplay
    Playing,
    /// Gameplay frozen by the player
    Paused,
    /// Frozen while an upgrade is chosen
    LevelUp,
    /// The player died
    GameOver,
    /// Run ended by the player
    Ended,
}

impl GamePhase {
    /// A run exists and has not finished
    pub fn in_run(self) -> bool {
        matches!(self, GamePhase::Playing | GamePhase::Paused | GamePhase::LevelUp)
    }
}

/// Fire-and-forget notification for audio/UI collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RunStarted(CharacterKind),
    Paused,
    Resumed,
    MuteToggled(bool),
    WaveStarted(u32),
    Hit { pos: Vec2, damage: f32 },
    Deflect { pos: Vec2 },
    EnemyKilled { kind: EnemyKind, pos: Vec2, score: u64 },
    PlayerHurt { damage: f32 },
    PlayerDied,
    ExperienceCollected(u32),
    LootCollected { currency: u64 },
    PowerUpCollected(PowerUpKind),
    LevelUp(u32),
    UpgradeChosen(Upgrade),
    BossWarning(BossArchetype),
    BossSpawned(BossArchetype),
    BossPhaseChanged(BossArchetype),
    BossShieldBroken,
    BossDefeated { archetype: BossArchetype, bonus: u64 },
}

/// How a finished run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    Died,
    Quit,
}

/// Per-run statistics (snapshotted for crash recovery)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub seed: u64,
    pub character: CharacterKind,
    pub score: u64,
    pub kills: u32,
    pub wave: u32,
    pub level: u32,
    pub elapsed: f32,
    pub max_combo: u32,
    pub bosses_defeated: u32,
    pub currency_earned: u64,
    pub damage_dealt: f32,
    pub damage_taken: f32,
}

/// Persistence handoff queued by the run and drained by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Checkpoint {
    /// Periodic in-progress snapshot
    Snapshot(RunStats),
    /// The run is over
    Finished { stats: RunStats, outcome: RunOutcome },
}

/// A single run of the game
pub struct Run {
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub character: CharacterKind,
    /// Characters the player may pick
    pub unlocked: Vec<CharacterKind>,
    pub store: EntityStore,
    pub waves: WaveScheduler,
    pub combo: Combo,
    pub stats: RunStats,
    pub field: FieldBounds,
    pub snapshot_interval: f32,
    pub snapshot_timer: f32,
    /// Offers shown in the level-up phase
    pub upgrade_choices: Vec<Upgrade>,
    /// Level-ups still waiting for a choice
    pub pending_level_ups: u32,
    pub muted: bool,
    events: Vec<GameEvent>,
    checkpoints: Vec<Checkpoint>,
}

impl Run {
    /// Create an idle run with the given seed
    pub fn new(seed: u64, field: FieldBounds) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Ready,
            character: CharacterKind::Gunner,
            unlocked: vec![CharacterKind::Gunner],
            store: EntityStore::new(),
            waves: WaveScheduler::new(),
            combo: Combo::default(),
            stats: RunStats {
                seed,
                ..Default::default()
            },
            field,
            snapshot_interval: STATS_SNAPSHOT_INTERVAL,
            snapshot_timer: 0.0,
            upgrade_choices: Vec::new(),
            pending_level_ups: 0,
            muted: false,
            events: Vec::new(),
            checkpoints: Vec::new(),
        }
    }

    pub fn set_unlocked(&mut self, unlocked: &[CharacterKind]) {
        self.unlocked = unlocked.to_vec();
        if !self.unlocked.contains(&CharacterKind::Gunner) {
            self.unlocked.insert(0, CharacterKind::Gunner);
        }
    }

    pub fn open_character_select(&mut self) {
        if matches!(self.phase, GamePhase::Ready | GamePhase::GameOver | GamePhase::Ended) {
            self.phase = GamePhase::CharacterSelect;
        }
    }

    /// Pick a character; locked characters are refused
    pub fn select_character(&mut self, character: CharacterKind) -> bool {
        if !self.unlocked.contains(&character) {
            log::warn!("{} is locked", character.as_str());
            return false;
        }
        self.character = character;
        true
    }

    /// Start (or restart) a run with the selected character
    pub fn begin(&mut self) {
        if self.phase.in_run() {
            self.finish(RunOutcome::Quit);
        }
        self.store.reset();
        self.store.setup_player(self.character, self.field);
        self.waves = WaveScheduler::new();
        self.combo = Combo::default();
        self.stats = RunStats {
            seed: self.seed,
            character: self.character,
            wave: self.waves.wave,
            level: 1,
            ..Default::default()
        };
        self.snapshot_timer = 0.0;
        self.upgrade_choices.clear();
        self.pending_level_ups = 0;
        self.phase = GamePhase::Playing;
        log::info!("Run started as {} (seed {})", self.character.as_str(), self.seed);
        self.emit(GameEvent::RunStarted(self.character));
        self.emit(GameEvent::WaveStarted(self.waves.wave));
    }

    /// End the current run by the player's choice
    pub fn end_run(&mut self) {
        if self.phase.in_run() {
            self.finish(RunOutcome::Quit);
            self.phase = GamePhase::Ended;
        }
    }

    /// Apply the level-up offer at `index`; returns false for a bad index
    pub fn choose_upgrade(&mut self, index: usize) -> bool {
        if self.phase != GamePhase::LevelUp {
            return false;
        }
        let Some(&upgrade) = self.upgrade_choices.get(index) else {
            return false;
        };
        if let Some(player) = self.store.player_mut() {
            player.apply_upgrade(upgrade);
        }
        self.emit(GameEvent::UpgradeChosen(upgrade));
        self.pending_level_ups = self.pending_level_ups.saturating_sub(1);
        if self.pending_level_ups > 0 {
            self.roll_upgrades();
        } else {
            self.upgrade_choices.clear();
            self.phase = GamePhase::Playing;
        }
        true
    }

    /// Draw three distinct upgrade offers
    pub(crate) fn roll_upgrades(&mut self) {
        let mut pool = Upgrade::ALL.to_vec();
        pool.shuffle(&mut self.rng);
        pool.truncate(3);
        self.upgrade_choices = pool;
    }

    pub(crate) fn finish(&mut self, outcome: RunOutcome) {
        log::info!(
            "Run finished ({outcome:?}): score {}, wave {}, {} kills",
            self.stats.score,
            self.stats.wave,
            self.stats.kills
        );
        self.checkpoints.push(Checkpoint::Finished {
            stats: self.stats.clone(),
            outcome,
        });
    }

    pub(crate) fn snapshot(&mut self) {
        log::debug!("stats snapshot at {:.1}s", self.stats.elapsed);
        self.checkpoints.push(Checkpoint::Snapshot(self.stats.clone()));
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take every notification queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Take pending persistence checkpoints
    pub fn drain_checkpoints(&mut self) -> Vec<Checkpoint> {
        std::mem::take(&mut self.checkpoints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_clamp() {
        let field = FieldBounds::new(100.0, 50.0);
        let half = Vec2::splat(5.0);
        assert_eq!(field.clamp(Vec2::new(-10.0, 60.0), half), Vec2::new(5.0, 45.0));
        assert_eq!(field.clamp(Vec2::new(50.0, 20.0), half), Vec2::new(50.0, 20.0));
        // Too large to fit: centred
        assert_eq!(field.clamp(Vec2::new(0.0, 0.0), Vec2::splat(40.0)), Vec2::new(50.0, 25.0));
    }

    #[test]
    fn test_new_run_is_ready() {
        let run = Run::new(1, FieldBounds::default());
        assert_eq!(run.phase, GamePhase::Ready);
        assert!(run.store.player().is_none());
    }

    #[test]
    fn test_begin_places_player_at_centre() {
        let field = FieldBounds::new(400.0, 300.0);
        let mut run = Run::new(1, field);
        run.begin();
        assert_eq!(run.phase, GamePhase::Playing);
        let player = run.store.player().expect("player");
        assert_eq!(player.pos, field.center());
        let events = run.drain_events();
        assert!(events.contains(&GameEvent::RunStarted(CharacterKind::Gunner)));
        assert!(run.drain_events().is_empty());
    }

    #[test]
    fn test_locked_character_refused() {
        let mut run = Run::new(1, FieldBounds::default());
        assert!(!run.select_character(CharacterKind::Engineer));
        run.set_unlocked(&[CharacterKind::Engineer]);
        assert!(run.select_character(CharacterKind::Engineer));
        assert!(run.unlocked.contains(&CharacterKind::Gunner));
    }

    #[test]
    fn test_restart_records_quit() {
        let mut run = Run::new(1, FieldBounds::default());
        run.begin();
        run.begin();
        let checkpoints = run.drain_checkpoints();
        assert!(matches!(
            checkpoints.as_slice(),
            [Checkpoint::Finished {
                outcome: RunOutcome::Quit,
                ..
            }]
        ));
    }

    #[test]
    fn test_choose_upgrade_resumes() {
        let mut run = Run::new(1, FieldBounds::default());
        run.begin();
        run.phase = GamePhase::LevelUp;
        run.pending_level_ups = 1;
        run.roll_upgrades();
        assert_eq!(run.upgrade_choices.len(), 3);
        assert!(!run.choose_upgrade(7));
        assert!(run.choose_upgrade(0));
        assert_eq!(run.phase, GamePhase::Playing);
    }
}
