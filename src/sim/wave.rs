//! Wave progression and spawn scheduling
//!
//! The scheduler only describes spawns ([`SpawnRequest`]); the entity store
//! turns them into enemies.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::boss::BossArchetype;
use super::enemy::{EnemyKind, SpawnRequest};
use crate::consts::*;

/// Lifecycle notifications from [`WaveScheduler::update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaveEvent {
    WaveAdvanced(u32),
    BossWarning(BossArchetype),
    SpawnBoss(BossArchetype),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct BossCountdown {
    archetype: BossArchetype,
    remaining: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveScheduler {
    pub wave: u32,
    /// Seconds into the current wave
    pub wave_time: f32,
    pub spawn_timer: f32,
    pub spawn_interval: f32,
    pub spawned: u32,
    /// Spawns allowed this wave
    pub quota: u32,
    /// A boss is alive; regular spawning is suspended
    pub boss_active: bool,
    boss_countdown: Option<BossCountdown>,
}

impl Default for WaveScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveScheduler {
    pub fn new() -> Self {
        Self {
            wave: 1,
            wave_time: 0.0,
            spawn_timer: 0.0,
            spawn_interval: INITIAL_SPAWN_INTERVAL,
            spawned: 0,
            quota: BASE_WAVE_QUOTA,
            boss_active: false,
            boss_countdown: None,
        }
    }

    pub fn boss_pending(&self) -> bool {
        self.boss_countdown.is_some()
    }

    /// Advance wave time and the spawn timer
    pub fn update(&mut self, dt: f32) -> Vec<WaveEvent> {
        let mut events = Vec::new();

        self.wave_time += dt;
        if !self.boss_active {
            // At most one spawn is ever owed
            self.spawn_timer = (self.spawn_timer + dt).min(self.spawn_interval);
        }

        // A warning raised this frame starts counting next frame
        if let Some(countdown) = &mut self.boss_countdown {
            countdown.remaining -= dt;
            if countdown.remaining <= 0.0 {
                let archetype = countdown.archetype;
                self.boss_countdown = None;
                self.boss_active = true;
                events.push(WaveEvent::SpawnBoss(archetype));
            }
        }

        while self.wave_time >= WAVE_DURATION {
            self.wave_time -= WAVE_DURATION;
            self.advance_wave();
            events.push(WaveEvent::WaveAdvanced(self.wave));

            if self.wave % BOSS_WAVE_INTERVAL == 0 {
                if self.boss_active || self.boss_countdown.is_some() {
                    log::info!("Wave {}: boss already present, encounter skipped", self.wave);
                } else {
                    let archetype = BossArchetype::for_wave(self.wave);
                    log::info!("Wave {}: {} approaching", self.wave, archetype.name());
                    self.boss_countdown = Some(BossCountdown {
                        archetype,
                        remaining: BOSS_WARNING_DELAY,
                    });
                    events.push(WaveEvent::BossWarning(archetype));
                }
            }
        }

        events
    }

    fn advance_wave(&mut self) {
        self.wave += 1;
        self.spawned = 0;
        self.quota = BASE_WAVE_QUOTA + WAVE_QUOTA_GROWTH * (self.wave - 1);
        self.spawn_interval = (self.spawn_interval * SPAWN_INTERVAL_DECAY).max(MIN_SPAWN_INTERVAL);
        log::info!(
            "Wave {} (quota {}, interval {:.2}s)",
            self.wave,
            self.quota,
            self.spawn_interval
        );
    }

    /// Mark the active boss as gone so regular spawning resumes
    pub fn boss_defeated(&mut self) {
        self.boss_active = false;
    }

    /// Zero or one regular spawn for this frame
    pub fn spawn_enemies(
        &mut self,
        field_w: f32,
        field_h: f32,
        player_pos: Vec2,
        rng: &mut impl Rng,
    ) -> Option<SpawnRequest> {
        if self.boss_active || self.spawned >= self.quota || self.spawn_timer < self.spawn_interval {
            return None;
        }
        self.spawn_timer = 0.0;
        self.spawned += 1;

        let kind = self.create_random_enemy(rng);
        let pos = edge_position(rng, field_w, field_h, player_pos);
        log::debug!("spawn {} at ({:.0}, {:.0})", kind.tag(), pos.x, pos.y);
        Some(SpawnRequest::new(kind, pos, self.wave))
    }

    /// Weighted pick among kinds unlocked for the current wave
    pub fn create_random_enemy(&self, rng: &mut impl Rng) -> EnemyKind {
        let eligible: Vec<EnemyKind> = EnemyKind::SPAWNABLE
            .into_iter()
            .filter(|k| k.stats().min_wave <= self.wave && k.stats().weight > 0)
            .collect();
        let total: u32 = eligible.iter().map(|k| k.stats().weight).sum();
        if total == 0 {
            return EnemyKind::Basic;
        }
        let mut roll = rng.random_range(0..total);
        for kind in eligible {
            let weight = kind.stats().weight;
            if roll < weight {
                return kind;
            }
            roll -= weight;
        }
        EnemyKind::Basic
    }
}

/// Uniform point just outside one of the four field edges, away from the player
fn edge_position(rng: &mut impl Rng, w: f32, h: f32, player_pos: Vec2) -> Vec2 {
    let w = w.max(1.0);
    let h = h.max(1.0);
    let m = SPAWN_EDGE_MARGIN;
    let pos = match rng.random_range(0..4) {
        0 => Vec2::new(rng.random_range(0.0..w), -m),
        1 => Vec2::new(rng.random_range(0.0..w), h + m),
        2 => Vec2::new(-m, rng.random_range(0.0..h)),
        _ => Vec2::new(w + m, rng.random_range(0.0..h)),
    };
    if pos.distance(player_pos) < m * 3.0 {
        // Mirror through the field centre
        Vec2::new(w, h) - pos
    } else {
        pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_wave_one_always_basic() {
        let waves = WaveScheduler::new();
        let mut rng = Pcg32::seed_from_u64(9);
        for _ in 0..500 {
            assert_eq!(waves.create_random_enemy(&mut rng), EnemyKind::Basic);
        }
    }

    #[test]
    fn test_later_waves_mix_kinds() {
        let mut waves = WaveScheduler::new();
        waves.wave = 6;
        let mut rng = Pcg32::seed_from_u64(9);
        let kinds: std::collections::HashSet<_> =
            (0..500).map(|_| waves.create_random_enemy(&mut rng)).collect();
        assert_eq!(kinds.len(), EnemyKind::SPAWNABLE.len());
    }

    #[test]
    fn test_spawn_on_interval_outside_field() {
        let mut waves = WaveScheduler::new();
        let mut rng = Pcg32::seed_from_u64(4);
        let player = Vec2::new(400.0, 300.0);
        waves.update(1.0);
        assert!(waves.spawn_enemies(800.0, 600.0, player, &mut rng).is_none());
        waves.update(1.0);
        let req = waves
            .spawn_enemies(800.0, 600.0, player, &mut rng)
            .expect("due");
        let p = req.pos;
        assert!(p.x < 0.0 || p.y < 0.0 || p.x > 800.0 || p.y > 600.0);
        // Only one per call
        assert!(waves.spawn_enemies(800.0, 600.0, player, &mut rng).is_none());
    }

    #[test]
    fn test_quota_caps_spawns() {
        let mut waves = WaveScheduler::new();
        let mut rng = Pcg32::seed_from_u64(4);
        let mut count = 0;
        for _ in 0..1400 {
            waves.update(0.02);
            if waves.spawn_enemies(800.0, 600.0, Vec2::ZERO, &mut rng).is_some() {
                count += 1;
            }
        }
        assert_eq!(waves.wave, 1);
        assert_eq!(count, 10);
    }

    #[test]
    fn test_boss_wave_warning_then_spawn() {
        let mut waves = WaveScheduler::new();
        let mut events = Vec::new();
        for _ in 0..4 {
            events.extend(waves.update(WAVE_DURATION));
        }
        assert_eq!(waves.wave, 5);
        assert!(events.contains(&WaveEvent::BossWarning(BossArchetype::Necromancer)));
        assert!(!events.iter().any(|e| matches!(e, WaveEvent::SpawnBoss(_))));

        let events = waves.update(BOSS_WARNING_DELAY);
        assert_eq!(events, vec![WaveEvent::SpawnBoss(BossArchetype::Necromancer)]);
        assert!(waves.boss_active);

        let mut rng = Pcg32::seed_from_u64(1);
        waves.update(5.0);
        assert!(waves.spawn_enemies(800.0, 600.0, Vec2::ZERO, &mut rng).is_none());

        waves.boss_defeated();
        waves.update(5.0);
        assert!(waves.spawn_enemies(800.0, 600.0, Vec2::ZERO, &mut rng).is_some());
    }

    proptest! {
        #[test]
        fn prop_wave_monotonic(steps in prop::collection::vec(0.0f32..3.0, 1..400)) {
            let mut waves = WaveScheduler::new();
            let mut last_wave = waves.wave;
            let mut last_interval = waves.spawn_interval;
            let mut elapsed = 0.0f32;
            for dt in steps {
                waves.update(dt);
                elapsed += dt;
                prop_assert!(waves.wave >= last_wave);
                prop_assert!(waves.spawn_interval <= last_interval);
                prop_assert!(waves.spawn_interval >= MIN_SPAWN_INTERVAL);
                last_wave = waves.wave;
                last_interval = waves.spawn_interval;
            }
            prop_assert!(waves.wave as f32 >= (elapsed / WAVE_DURATION).floor() - 1.0);
        }
    }
}
