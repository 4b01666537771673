//! Collision resolution: every pairwise interaction rule, once per frame
//!
//! Sweeps run in a fixed order over the entity store. Kills are collected
//! while sweeping and rewarded afterwards; boss deaths are left to the run.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::collectible::{CollectibleKind, PowerUpKind};
use super::collision::{Positioned, overlaps};
use super::combo::Combo;
use super::effects::ParticleKind;
use super::enemy::{DamageSource, Enemy, EnemyKind};
use super::state::GameEvent;
use super::store::EntityStore;
use super::weapons::WeaponHit;
use crate::consts::*;
use crate::direction_to;

/// Everything the run needs to fold into its statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub score: u64,
    pub currency: u64,
    pub kills: u32,
    pub levels_gained: u32,
    pub damage_dealt: f32,
    pub damage_taken: f32,
    pub events: Vec<GameEvent>,
}

#[derive(Debug, Clone, Copy)]
struct Kill {
    kind: EnemyKind,
    pos: Vec2,
    score_value: u32,
}

enum HitOutcome {
    Deflected,
    Damaged { dealt: f32, killed: bool },
    Ignored,
}

fn hit_enemy(enemy: &mut Enemy, damage: f32, source: DamageSource) -> HitOutcome {
    if !enemy.is_alive() {
        return HitOutcome::Ignored;
    }
    if enemy.boss_state().is_some_and(|b| b.is_transitioning()) {
        return HitOutcome::Ignored;
    }
    if enemy.blocks_damage() {
        return HitOutcome::Deflected;
    }
    let dealt = enemy.take_damage(damage, source);
    if dealt <= 0.0 {
        // Fully absorbed (boss shield pool)
        return HitOutcome::Deflected;
    }
    HitOutcome::Damaged {
        dealt,
        killed: !enemy.is_alive(),
    }
}

/// Apply all interaction rules for this frame
pub fn resolve_all(store: &mut EntityStore, combo: &mut Combo, rng: &mut Pcg32) -> Resolution {
    let mut out = Resolution::default();
    let mut kills: Vec<Kill> = Vec::new();
    let mut hits: Vec<(Vec2, f32)> = Vec::new();
    let mut deflects: Vec<Vec2> = Vec::new();

    // Dead enemies from earlier frames are skipped by `hit_enemy`
    let mut record = |enemy: &Enemy, outcome: HitOutcome, at: Vec2, out: &mut Resolution| match outcome {
        HitOutcome::Deflected => deflects.push(at),
        HitOutcome::Damaged { dealt, killed } => {
            out.damage_dealt += dealt;
            hits.push((at, dealt));
            if killed && !enemy.is_boss() {
                kills.push(Kill {
                    kind: enemy.kind,
                    pos: enemy.body.pos,
                    score_value: enemy.score_value,
                });
            }
        }
        HitOutcome::Ignored => {}
    };

    // 1. Player projectiles vs enemies
    for projectile in store.player_projectiles.iter_mut() {
        for enemy in store.enemies.iter_mut() {
            if !projectile.is_alive() {
                break;
            }
            if !enemy.is_alive() || projectile.has_struck(enemy.id) || !overlaps(&*projectile, &*enemy) {
                continue;
            }
            let outcome = hit_enemy(enemy, projectile.damage, DamageSource::Projectile);
            if matches!(outcome, HitOutcome::Damaged { .. }) {
                projectile.register_hit(enemy.id);
            } else {
                // Shields stop the shot
                projectile.kill();
            }
            record(enemy, outcome, projectile.pos, &mut out);
        }
    }
    store.player_projectiles.retain(|p| p.is_alive());

    if let Some(player) = store.player.as_mut().filter(|p| p.is_alive()) {
        // 2. Enemy projectiles vs player
        for projectile in store.enemy_projectiles.iter_mut() {
            if projectile.is_alive() && overlaps(&*projectile, &*player) {
                projectile.kill();
                let taken = player.take_damage(projectile.damage);
                if taken > 0.0 {
                    out.damage_taken += taken;
                    out.events.push(GameEvent::PlayerHurt { damage: taken });
                }
            }
        }

        // 3. Contact
        for enemy in store.enemies.iter_mut().filter(|e| e.is_alive()) {
            if !overlaps(&*player, &*enemy) {
                continue;
            }
            let taken = player.take_damage(enemy.contact_damage());
            if taken > 0.0 {
                out.damage_taken += taken;
                out.events.push(GameEvent::PlayerHurt { damage: taken });
            }
            let away = direction_to(player.pos, enemy.body.pos);
            enemy.push(away * CONTACT_KNOCKBACK);
        }

        // 4. Companions
        for companion in player.companions.iter_mut().filter(|c| c.is_ready()) {
            let Some(enemy) = store
                .enemies
                .iter_mut()
                .find(|e| e.is_alive() && overlaps(&*companion, &**e))
            else {
                continue;
            };
            companion.trigger();
            let at = enemy.body.pos;
            let outcome = hit_enemy(enemy, companion.damage, DamageSource::Companion);
            record(enemy, outcome, at, &mut out);
        }

        // 5. Multi-target weapon systems
        let weapon_hits: Vec<WeaponHit> = player
            .turret
            .as_mut()
            .map(|t| t.collide(&store.enemies))
            .unwrap_or_default();
        for hit in weapon_hits {
            if let Some(enemy) = store.enemies.iter_mut().find(|e| e.id == hit.enemy_id) {
                let outcome = hit_enemy(enemy, hit.damage, DamageSource::Weapon);
                record(enemy, outcome, hit.impact, &mut out);
            }
        }
    }
    store.enemy_projectiles.retain(|p| p.is_alive());

    // Cues for this frame's hits
    for (pos, damage) in hits {
        store.add_damage_number(pos, damage);
        store.add_burst(rng, ParticleKind::Hit, pos, 4, 80.0);
        out.events.push(GameEvent::Hit { pos, damage });
    }
    for pos in deflects {
        store.add_burst(rng, ParticleKind::Deflect, pos, 3, 60.0);
        out.events.push(GameEvent::Deflect { pos });
    }

    // Kill rewards
    for kill in kills {
        combo.register_kill();
        let score = (kill.score_value as f32 * combo.multiplier()).round() as u64;
        out.score += score;
        out.currency += score / 10;
        out.kills += 1;
        store.add_experience_orb(kill.pos, (kill.score_value / 2).max(1));
        if rng.random_bool(POWER_UP_DROP_CHANCE) {
            store.add_power_up(kill.pos, PowerUpKind::random(rng));
        }
        store.add_burst(rng, ParticleKind::Death, kill.pos, 10, 140.0);
        out.events.push(GameEvent::EnemyKilled {
            kind: kill.kind,
            pos: kill.pos,
            score,
        });
    }

    // 6. Collectibles vs player
    collect_pickups(store, rng, &mut out);

    out
}

fn collect_pickups(store: &mut EntityStore, rng: &mut Pcg32, out: &mut Resolution) {
    let Some(player) = store.player.as_mut().filter(|p| p.is_alive()) else {
        return;
    };
    let mut magnet = false;
    let mut picked = Vec::new();
    for collectible in store.collectibles.iter_mut().filter(|c| c.is_alive()) {
        if !collectible.in_reach(player.pos) {
            continue;
        }
        collectible.collected = true;
        picked.push(collectible.position());
        match collectible.kind {
            CollectibleKind::Experience(xp) => {
                out.levels_gained += player.gain_xp(xp);
                out.events.push(GameEvent::ExperienceCollected(xp));
            }
            CollectibleKind::PowerUp(kind) => {
                match kind {
                    PowerUpKind::Heal => player.heal(player.max_health * 0.25),
                    PowerUpKind::Magnet => magnet = true,
                    PowerUpKind::Haste => player.haste_timer = 6.0,
                }
                out.events.push(GameEvent::PowerUpCollected(kind));
            }
            CollectibleKind::Loot { currency } => {
                out.currency += currency;
                out.events.push(GameEvent::LootCollected { currency });
            }
        }
    }
    if magnet {
        for collectible in store.collectibles.iter_mut() {
            if matches!(collectible.kind, CollectibleKind::Experience(_)) {
                collectible.magnetized = true;
            }
        }
    }
    store.collectibles.retain(|c| c.is_alive());
    for pos in picked {
        store.add_burst(rng, ParticleKind::Pickup, pos, 3, 50.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::SpawnRequest;
    use crate::sim::player::CharacterKind;
    use crate::sim::projectile::{Projectile, Side};
    use crate::sim::state::FieldBounds;
    use rand::SeedableRng;

    fn setup() -> (EntityStore, Combo, Pcg32) {
        let mut store = EntityStore::new();
        store.setup_player(CharacterKind::Gunner, FieldBounds::new(800.0, 600.0));
        (store, Combo::default(), Pcg32::seed_from_u64(11))
    }

    fn shot(at: Vec2) -> Projectile {
        Projectile::new(Side::Player, at, Vec2::ZERO, 1.0, 1.0)
    }

    #[test]
    fn test_two_shots_kill_basic_with_exact_rewards() {
        let (mut store, mut combo, mut rng) = setup();
        let at = Vec2::new(100.0, 100.0);
        store.add_enemies([SpawnRequest::new(EnemyKind::Basic, at, 1)]);
        store.add_projectiles([shot(at), shot(at)]);

        let res = resolve_all(&mut store, &mut combo, &mut rng);
        assert_eq!(res.kills, 1);
        assert_eq!(res.score, 10);
        assert_eq!(res.currency, 1);
        assert_eq!(combo.count, 1);
        assert!(store.player_projectiles().is_empty());
        let orbs: Vec<_> = store
            .collectibles()
            .iter()
            .filter_map(|c| match c.kind {
                CollectibleKind::Experience(v) => Some(v),
                _ => None,
            })
            .collect();
        assert_eq!(orbs, vec![5]);
        assert_eq!(
            res.events
                .iter()
                .filter(|e| matches!(e, GameEvent::Hit { .. }))
                .count(),
            2
        );
    }

    #[test]
    fn test_orb_value_ignores_combo() {
        let (mut store, mut combo, mut rng) = setup();
        for _ in 0..4 {
            combo.register_kill();
        }
        let at = Vec2::new(100.0, 100.0);
        store.add_enemies([SpawnRequest::new(EnemyKind::Basic, at, 1)]);
        let mut heavy = shot(at);
        heavy.damage = 5.0;
        store.add_projectile(heavy);

        let res = resolve_all(&mut store, &mut combo, &mut rng);
        assert_eq!(combo.count, 5);
        assert_eq!(res.score, 13);
        assert_eq!(res.currency, 1);
        let orbs: Vec<u32> = store
            .collectibles()
            .iter()
            .filter_map(|c| match c.kind {
                CollectibleKind::Experience(v) => Some(v),
                _ => None,
            })
            .collect();
        assert_eq!(orbs, vec![5]);
    }

    #[test]
    fn test_transitioning_boss_shows_no_hit() {
        let (mut store, mut combo, mut rng) = setup();
        let at = Vec2::new(100.0, 100.0);
        store.spawn_boss(crate::sim::boss::BossArchetype::Necromancer, at, 5);
        let max = store.enemies[0].body.max_health;
        store.enemies[0].take_damage(max * 0.6, DamageSource::Projectile);
        assert!(store.enemies[0].boss_state().is_some_and(|b| b.is_transitioning()));
        store.add_projectile(shot(at));

        let res = resolve_all(&mut store, &mut combo, &mut rng);
        assert!(res.events.is_empty());
        assert!(store.damage_numbers().is_empty());
        assert_eq!(res.damage_dealt, 0.0);
    }

    #[test]
    fn test_absorbed_hit_on_golem_shield_deflects() {
        let (mut store, mut combo, mut rng) = setup();
        let at = Vec2::new(100.0, 100.0);
        store.spawn_boss(crate::sim::boss::BossArchetype::AncientGolem, at, 15);
        let health = store.enemies[0].body.health;
        store.add_projectile(shot(at));

        let res = resolve_all(&mut store, &mut combo, &mut rng);
        assert_eq!(store.enemies[0].body.health, health);
        assert_eq!(res.events, vec![GameEvent::Deflect { pos: at }]);
        assert!(store.damage_numbers().is_empty());
    }

    #[test]
    fn test_shield_deflects_lethal_hit() {
        let (mut store, mut combo, mut rng) = setup();
        let at = Vec2::new(100.0, 100.0);
        store.add_enemies([SpawnRequest::new(EnemyKind::Shielded, at, 5)]);
        let mut big = shot(at);
        big.damage = 1000.0;
        store.add_projectile(big);

        let res = resolve_all(&mut store, &mut combo, &mut rng);
        assert!(store.enemies()[0].is_alive());
        assert_eq!(res.kills, 0);
        assert_eq!(res.events, vec![GameEvent::Deflect { pos: at }]);
        assert!(store.damage_numbers().is_empty());
    }

    #[test]
    fn test_piercing_hits_each_enemy_once() {
        let (mut store, mut combo, mut rng) = setup();
        let at = Vec2::new(100.0, 100.0);
        store.add_enemies([
            SpawnRequest::new(EnemyKind::Tank, at, 3),
            SpawnRequest::new(EnemyKind::Tank, at, 3),
        ]);
        store.add_projectile(shot(at).with_pierce(3));

        resolve_all(&mut store, &mut combo, &mut rng);
        resolve_all(&mut store, &mut combo, &mut rng);
        let hp: Vec<f32> = store.enemies().iter().map(|e| e.body.max_health - e.body.health).collect();
        assert_eq!(hp, vec![1.0, 1.0]);
        assert_eq!(store.player_projectiles().len(), 1);
    }

    #[test]
    fn test_contact_damages_and_knocks_back() {
        let (mut store, mut combo, mut rng) = setup();
        let player_pos = store.player_pos().expect("player");
        let at = player_pos + Vec2::new(5.0, 0.0);
        store.add_enemies([SpawnRequest::new(EnemyKind::Basic, at, 1)]);

        let res = resolve_all(&mut store, &mut combo, &mut rng);
        assert_eq!(res.damage_taken, 10.0);
        assert_eq!(store.enemies()[0].body.pos, at + Vec2::new(CONTACT_KNOCKBACK, 0.0));
        // Grace window: the second overlap does nothing
        let res = resolve_all(&mut store, &mut combo, &mut rng);
        assert_eq!(res.damage_taken, 0.0);
    }

    #[test]
    fn test_enemy_projectile_hits_player() {
        let (mut store, mut combo, mut rng) = setup();
        let player_pos = store.player_pos().expect("player");
        store.add_projectile(Projectile::new(Side::Enemy, player_pos, Vec2::ZERO, 8.0, 1.0));
        let res = resolve_all(&mut store, &mut combo, &mut rng);
        assert_eq!(res.damage_taken, 8.0);
        assert!(store.enemy_projectiles().is_empty());
    }

    #[test]
    fn test_boss_death_not_rewarded() {
        let (mut store, mut combo, mut rng) = setup();
        let at = Vec2::new(100.0, 100.0);
        store.spawn_boss(crate::sim::boss::BossArchetype::Necromancer, at, 5);
        store.enemies[0].body.health = 0.5;
        store.add_projectile(shot(at));

        let res = resolve_all(&mut store, &mut combo, &mut rng);
        assert!(!store.enemies()[0].is_alive());
        assert_eq!(res.kills, 0);
        assert_eq!(res.score, 0);
    }

    #[test]
    fn test_orb_pickup_levels_player() {
        let (mut store, mut combo, mut rng) = setup();
        let player_pos = store.player_pos().expect("player");
        store.add_experience_orb(player_pos, 10);
        let res = resolve_all(&mut store, &mut combo, &mut rng);
        assert_eq!(res.levels_gained, 1);
        assert!(store.collectibles().is_empty());
    }

    #[test]
    fn test_magnet_pulls_all_orbs() {
        let (mut store, mut combo, mut rng) = setup();
        let player_pos = store.player_pos().expect("player");
        store.add_power_up(player_pos, PowerUpKind::Magnet);
        store.add_experience_orb(Vec2::new(10.0, 10.0), 1);
        resolve_all(&mut store, &mut combo, &mut rng);
        assert!(store.collectibles().iter().all(|c| c.magnetized));
    }

    #[test]
    fn test_companion_tick_is_cooldown_gated() {
        let (mut store, mut combo, mut rng) = setup();
        store.reset();
        store.setup_player(CharacterKind::Summoner, FieldBounds::new(800.0, 600.0));
        let seeker_pos = store.player().expect("player").companions[0].pos;
        store.add_enemies([SpawnRequest::new(EnemyKind::Tank, seeker_pos, 3)]);

        resolve_all(&mut store, &mut combo, &mut rng);
        resolve_all(&mut store, &mut combo, &mut rng);
        let enemy = &store.enemies()[0];
        assert_eq!(enemy.body.max_health - enemy.body.health, 1.5);
    }
}
