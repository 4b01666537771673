//! Read-only per-frame view for renderers and UI

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::boss::BossPhase;
use super::collision::Positioned;
use super::effects::ParticleKind;
use super::state::{GamePhase, Run};
use super::store::BossStatus;
use super::weapons::Weapon;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteView {
    pub id: u32,
    /// Variant tag used to pick the sprite/animation
    pub tag: String,
    pub pos: Vec2,
    pub size: Vec2,
    pub alive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleView {
    pub kind: ParticleKind,
    pub pos: Vec2,
    pub size: f32,
    pub life: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hud {
    pub phase: GamePhase,
    pub score: u64,
    pub wave: u32,
    pub kills: u32,
    pub health: f32,
    pub max_health: f32,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next: u32,
    pub combo: u32,
    pub multiplier: f32,
    pub currency: u64,
    pub elapsed: f32,
    pub muted: bool,
    pub boss: Option<BossStatus>,
    pub boss_warning: bool,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub player: Option<SpriteView>,
    pub companions: Vec<SpriteView>,
    pub enemies: Vec<SpriteView>,
    pub projectiles: Vec<SpriteView>,
    pub collectibles: Vec<SpriteView>,
    pub particles: Vec<ParticleView>,
    /// (position, value, remaining life)
    pub damage_numbers: Vec<(Vec2, f32, f32)>,
    /// Active boss hazard rings (centre, radius)
    pub hazards: Vec<(Vec2, f32)>,
    pub hud: Hud,
}

fn sprite(id: u32, tag: impl Into<String>, obj: &impl Positioned, alive: bool) -> SpriteView {
    SpriteView {
        id,
        tag: tag.into(),
        pos: obj.position(),
        size: obj.size(),
        alive,
    }
}

impl RenderSnapshot {
    pub fn capture(run: &Run) -> Self {
        let store = &run.store;
        let player = store.player();

        let enemies = store
            .enemies()
            .iter()
            .map(|e| {
                let tag = match e.boss_state() {
                    Some(boss) if matches!(boss.phase, BossPhase::Transitioning { .. }) => {
                        format!("{}_transition", e.kind.tag())
                    }
                    _ if e.blocks_damage() => format!("{}_guard", e.kind.tag()),
                    _ => e.kind.tag().to_string(),
                };
                sprite(e.id, tag, e, e.is_alive())
            })
            .collect();

        let mut projectiles: Vec<SpriteView> = store
            .player_projectiles()
            .iter()
            .chain(store.enemy_projectiles())
            .enumerate()
            .map(|(i, p)| {
                let tag = match p.side {
                    super::projectile::Side::Player => "shot",
                    super::projectile::Side::Enemy => "enemy_shot",
                };
                sprite(i as u32, tag, p, p.is_alive())
            })
            .collect();

        let mut companions = Vec::new();
        if let Some(player) = player {
            companions = player
                .companions
                .iter()
                .enumerate()
                .map(|(i, c)| sprite(i as u32, "companion", c, true))
                .collect();
            if let Some(turret) = &player.turret {
                let base = projectiles.len() as u32;
                projectiles.extend(turret.orbs.iter().enumerate().map(|(i, orb)| SpriteView {
                    id: base + i as u32,
                    tag: "homing_orb".to_string(),
                    pos: orb.pos,
                    size: orb.bounds().size(),
                    alive: orb.alive,
                }));
            }
        }

        let hazards = store
            .enemies()
            .iter()
            .filter_map(|e| e.boss_state()?.shockwave())
            .map(|w| (w.center, w.radius))
            .collect();

        let hud = Hud {
            phase: run.phase,
            score: run.stats.score,
            wave: run.waves.wave,
            kills: run.stats.kills,
            health: player.map_or(0.0, |p| p.health),
            max_health: player.map_or(0.0, |p| p.max_health),
            level: player.map_or(1, |p| p.level),
            xp: player.map_or(0, |p| p.xp),
            xp_to_next: player.map_or(0, |p| p.xp_to_next),
            combo: run.combo.count,
            multiplier: run.combo.multiplier(),
            currency: run.stats.currency_earned,
            elapsed: run.stats.elapsed,
            muted: run.muted,
            boss: store.boss_status().copied(),
            boss_warning: run.waves.boss_pending(),
        };

        Self {
            player: player.map(|p| {
                let tag = match p.weapon {
                    Weapon::Blaster(_) => p.character.as_str().to_lowercase(),
                    Weapon::Weaponless => format!("{}_unarmed", p.character.as_str().to_lowercase()),
                };
                sprite(0, tag, p, p.is_alive())
            }),
            companions,
            enemies,
            projectiles,
            collectibles: store
                .collectibles()
                .iter()
                .map(|c| sprite(c.id, c.kind.tag(), c, c.is_alive()))
                .collect(),
            particles: store
                .particles()
                .iter()
                .map(|p| ParticleView {
                    kind: p.kind,
                    pos: p.pos,
                    size: p.size,
                    life: p.life,
                })
                .collect(),
            damage_numbers: store
                .damage_numbers()
                .iter()
                .map(|n| (n.pos, n.value, n.life))
                .collect(),
            hazards,
            hud,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::{EnemyKind, SpawnRequest};
    use crate::sim::state::FieldBounds;

    #[test]
    fn test_capture_lists_entities() {
        let mut run = Run::new(3, FieldBounds::new(640.0, 480.0));
        run.begin();
        run.store
            .add_enemies([SpawnRequest::new(EnemyKind::Shielded, Vec2::new(10.0, 10.0), 5)]);
        run.store.add_experience_orb(Vec2::new(50.0, 50.0), 2);

        let snap = RenderSnapshot::capture(&run);
        assert_eq!(snap.player.as_ref().map(|p| p.tag.as_str()), Some("gunner"));
        assert_eq!(snap.enemies.len(), 1);
        assert_eq!(snap.enemies[0].tag, "shielded_guard");
        assert_eq!(snap.collectibles[0].tag, "orb");
        assert_eq!(snap.hud.health, 100.0);
        assert_eq!(snap.hud.phase, GamePhase::Playing);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut run = Run::new(3, FieldBounds::default());
        run.begin();
        let json = serde_json::to_string(&RenderSnapshot::capture(&run)).expect("serialize");
        let back: RenderSnapshot = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.hud.wave, 1);
    }
}
