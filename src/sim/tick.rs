//! Per-frame run orchestration
//!
//! Phase gate, then store update, spawning, collision resolution, combo decay
//! and terminal checks, in that order.

use glam::Vec2;

use super::effects::ParticleKind;
use super::resolver::resolve_all;
use super::state::{FieldBounds, GameEvent, GamePhase, Run, RunOutcome};
use super::wave::WaveEvent;
use crate::sanitize_dt;

/// Input intent for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Pause toggle
    pub pause: bool,
    /// Start over with the same character
    pub restart: bool,
    /// Audio mute toggle
    pub mute: bool,
}

impl TickInput {
    /// Movement intent as a (not yet normalized) vector, +y down
    pub fn direction(&self) -> Vec2 {
        let x = self.right as i32 - self.left as i32;
        let y = self.down as i32 - self.up as i32;
        Vec2::new(x as f32, y as f32)
    }
}

/// Advance the run by one frame
pub fn tick(run: &mut Run, input: &TickInput, dt: f32, field: FieldBounds) {
    let dt = sanitize_dt(dt);
    if field.is_valid() {
        run.field = field;
    }

    if input.mute {
        run.muted = !run.muted;
        run.emit(GameEvent::MuteToggled(run.muted));
    }

    if input.restart && run.phase != GamePhase::Ready && run.phase != GamePhase::CharacterSelect {
        run.begin();
        return;
    }

    if input.pause {
        match run.phase {
            GamePhase::Playing => {
                run.phase = GamePhase::Paused;
                run.emit(GameEvent::Paused);
                return;
            }
            GamePhase::Paused => {
                run.phase = GamePhase::Playing;
                run.emit(GameEvent::Resumed);
            }
            _ => {}
        }
    }

    if run.phase != GamePhase::Playing {
        return;
    }

    run.stats.elapsed += dt;
    let field = run.field;
    let wave = run.waves.wave;

    // Entity updates
    run.store.update(dt, input.direction(), field, wave, &mut run.rng);
    for event in run.store.drain_events() {
        if let GameEvent::PlayerHurt { damage } = event {
            run.stats.damage_taken += damage;
        }
        run.emit(event);
    }

    // Spawning
    let player_pos = run.store.player_pos().unwrap_or_else(|| field.center());
    for event in run.waves.update(dt) {
        match event {
            WaveEvent::WaveAdvanced(n) => {
                run.stats.wave = n;
                run.emit(GameEvent::WaveStarted(n));
            }
            WaveEvent::BossWarning(archetype) => run.emit(GameEvent::BossWarning(archetype)),
            WaveEvent::SpawnBoss(archetype) => {
                let pos = boss_entry_point(field, player_pos);
                log::info!("{} enters the field", archetype.name());
                run.store.spawn_boss(archetype, pos, run.waves.wave);
                run.emit(GameEvent::BossSpawned(archetype));
            }
        }
    }
    if let Some(request) = run
        .waves
        .spawn_enemies(field.width, field.height, player_pos, &mut run.rng)
    {
        run.store.add_enemies([request]);
    }

    // Collisions
    let resolution = resolve_all(&mut run.store, &mut run.combo, &mut run.rng);
    run.stats.score += resolution.score;
    run.stats.currency_earned += resolution.currency;
    run.stats.kills += resolution.kills;
    run.stats.damage_dealt += resolution.damage_dealt;
    run.stats.damage_taken += resolution.damage_taken;
    for event in resolution.events {
        run.emit(event);
    }

    run.combo.update(dt);
    run.stats.max_combo = run.stats.max_combo.max(run.combo.best);

    // Terminal conditions
    if !run.store.player().is_some_and(|p| p.is_alive()) {
        player_died(run);
        return;
    }
    if run.waves.boss_active && run.store.boss().is_none_or(|b| !b.is_alive()) {
        boss_defeated(run);
    }

    run.snapshot_timer += dt;
    if run.snapshot_timer >= run.snapshot_interval {
        run.snapshot_timer = 0.0;
        run.snapshot();
    }

    if resolution.levels_gained > 0 {
        run.pending_level_ups += resolution.levels_gained;
        if let Some(player) = run.store.player() {
            run.stats.level = player.level;
            let level = player.level;
            log::info!("Level up: {level}");
            run.emit(GameEvent::LevelUp(level));
        }
        run.roll_upgrades();
        run.phase = GamePhase::LevelUp;
    }
}

fn player_died(run: &mut Run) {
    if let Some(pos) = run.store.player_pos() {
        run.store
            .add_burst(&mut run.rng, ParticleKind::PlayerDeath, pos, 30, 200.0);
    }
    run.phase = GamePhase::GameOver;
    run.emit(GameEvent::PlayerDied);
    run.finish(RunOutcome::Died);
}

fn boss_defeated(run: &mut Run) {
    run.waves.boss_defeated();
    let Some((archetype, pos)) = run.store.boss().and_then(|b| match b.kind {
        super::enemy::EnemyKind::Boss(archetype) => Some((archetype, b.body.pos)),
        _ => None,
    }) else {
        return;
    };
    let bonus = (archetype.score_value() as f32 * run.combo.multiplier()).round() as u64;
    run.stats.score += bonus;
    run.stats.currency_earned += bonus / 10;
    run.stats.bosses_defeated += 1;
    run.store.add_boss_loot(pos, bonus / 5);
    run.store
        .add_burst(&mut run.rng, ParticleKind::BossDeath, pos, 40, 260.0);
    log::info!("{} defeated (+{bonus})", archetype.name());
    run.emit(GameEvent::BossDefeated { archetype, bonus });
}

/// Boss entry point: the field edge midpoint farthest from the player
fn boss_entry_point(field: FieldBounds, player_pos: Vec2) -> Vec2 {
    let inset = 60.0;
    [
        Vec2::new(field.width * 0.5, inset),
        Vec2::new(field.width * 0.5, field.height - inset),
        Vec2::new(inset, field.height * 0.5),
        Vec2::new(field.width - inset, field.height * 0.5),
    ]
    .into_iter()
    .max_by(|a, b| {
        a.distance_squared(player_pos)
            .partial_cmp(&b.distance_squared(player_pos))
            .unwrap_or(std::cmp::Ordering::Equal)
    })
    .unwrap_or_else(|| field.center())
}
