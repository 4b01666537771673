//! Whole-run scenarios through the public API

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use swarmfall::persistence::{MemoryPersistence, Persistence, SaveData};
use swarmfall::sim::{
    Boss, BossArchetype, BossEvent, BossPhase, CharacterKind, CollectibleKind, Combo, DamageSource,
    EnemyKind, EntityStore, FieldBounds, GameEvent, GamePhase, Projectile, Run, Side, SpawnRequest,
    TickInput, WaveScheduler, resolve_all, tick,
};
use swarmfall::{Session, Settings};

fn field() -> FieldBounds {
    FieldBounds::new(800.0, 600.0)
}

fn playing(seed: u64) -> Run {
    let mut run = Run::new(seed, field());
    run.begin();
    run.drain_events();
    run
}

fn shot(at: Vec2, damage: f32) -> Projectile {
    Projectile::new(Side::Player, at, Vec2::ZERO, damage, 1.0)
}

#[test]
fn basic_enemy_two_shots_exact_accounting() {
    let mut store = EntityStore::new();
    store.setup_player(CharacterKind::Gunner, field());
    let mut combo = Combo::default();
    let mut rng = Pcg32::seed_from_u64(7);
    let at = Vec2::new(100.0, 100.0);
    store.add_enemies([SpawnRequest::new(EnemyKind::Basic, at, 1)]);
    assert_eq!(store.enemies()[0].body.health, 2.0);

    // First hit: wounded, shot spent, nothing awarded
    store.add_projectile(shot(at, 1.0));
    let first = resolve_all(&mut store, &mut combo, &mut rng);
    assert_eq!(store.enemies()[0].body.health, 1.0);
    assert!(store.enemies()[0].is_alive());
    assert!(store.player_projectiles().is_empty());
    assert_eq!(first.kills, 0);
    assert_eq!(first.score, 0);
    assert!(store.collectibles().is_empty());

    // Second hit: dead, one orb, one award
    store.add_projectile(shot(at, 1.0));
    let second = resolve_all(&mut store, &mut combo, &mut rng);
    assert_eq!(store.enemies()[0].body.health, 0.0);
    assert!(!store.enemies()[0].is_alive());
    assert!(store.player_projectiles().is_empty());
    assert_eq!(second.kills, 1);
    assert_eq!(second.score, 10);
    assert_eq!(second.currency, 1);
    assert_eq!(combo.count, 1);
    let orbs: Vec<u32> = store
        .collectibles()
        .iter()
        .filter_map(|c| match c.kind {
            CollectibleKind::Experience(v) => Some(v),
            _ => None,
        })
        .collect();
    assert_eq!(orbs, vec![5]);
    let kills: Vec<&GameEvent> = second
        .events
        .iter()
        .filter(|e| matches!(e, GameEvent::EnemyKilled { .. }))
        .collect();
    assert_eq!(kills.len(), 1);
    assert!(matches!(
        kills[0],
        GameEvent::EnemyKilled {
            kind: EnemyKind::Basic,
            score: 10,
            ..
        }
    ));
}

#[test]
fn kill_through_tick_folds_into_stats() {
    let mut run = playing(7);
    let at = Vec2::new(100.0, 100.0);
    run.store.add_enemies([SpawnRequest::new(EnemyKind::Basic, at, 1)]);
    run.store.add_projectiles([shot(at, 1.0), shot(at, 1.0)]);

    tick(&mut run, &TickInput::default(), 0.016, field());

    assert_eq!(run.stats.kills, 1);
    assert_eq!(run.stats.score, 10);
    assert_eq!(run.stats.currency_earned, 1);
    let events = run.drain_events();
    assert_eq!(events.iter().filter(|e| matches!(e, GameEvent::Hit { .. })).count(), 2);
}

#[test]
fn shielded_enemy_deflects_lethal_hit() {
    let mut run = playing(7);
    let at = Vec2::new(100.0, 100.0);
    run.store.add_enemies([SpawnRequest::new(EnemyKind::Shielded, at, 5)]);
    run.store.add_projectile(shot(at, 1000.0));

    tick(&mut run, &TickInput::default(), 0.016, field());

    assert_eq!(run.store.enemies().len(), 1);
    assert!(run.store.enemies()[0].is_alive());
    assert_eq!(run.stats.kills, 0);
    assert_eq!(run.stats.score, 0);
    let events = run.drain_events();
    assert!(events.iter().any(|e| matches!(e, GameEvent::Deflect { .. })));
    assert!(!events.iter().any(|e| matches!(e, GameEvent::Hit { .. })));
}

#[test]
fn wave_one_enemies_are_basic() {
    let waves = WaveScheduler::new();
    for seed in 0..200 {
        let mut rng = Pcg32::seed_from_u64(seed);
        assert_eq!(waves.create_random_enemy(&mut rng), EnemyKind::Basic);
    }
}

#[test]
fn boss_transitions_once_then_attacks_again() {
    let mut rng = Pcg32::seed_from_u64(3);
    let (mut boss, mut body) = Boss::spawn(BossArchetype::Necromancer, Vec2::new(400.0, 300.0), 5);
    let player = Vec2::new(600.0, 300.0);

    let opening = body.max_health * 0.55;
    boss.take_damage(&mut body, opening, DamageSource::Projectile);
    assert!(boss.is_transitioning());
    let health = body.health;
    assert_eq!(boss.take_damage(&mut body, 5.0, DamageSource::Projectile), 0.0);
    assert_eq!(body.health, health);

    for _ in 0..200 {
        boss.update(&mut body, 0.01, player, &mut rng);
    }
    assert_eq!(boss.phase, BossPhase::Two);

    let mut fired = 0;
    for _ in 0..400 {
        boss.update(&mut body, 0.01, player, &mut rng);
        fired += boss.drain_projectiles().len();
    }
    assert!(fired > 0);

    boss.take_damage(&mut body, 1.0, DamageSource::Projectile);
    let transitions = boss
        .drain_events()
        .into_iter()
        .filter(|e| *e == BossEvent::TransitionStarted)
        .count();
    assert_eq!(transitions, 1);
}

#[test]
fn splitting_terminates_at_depth_two() {
    let mut store = EntityStore::new();
    store.setup_player(CharacterKind::Gunner, field());
    let mut combo = Combo::default();
    let mut rng = Pcg32::seed_from_u64(5);
    store.add_enemies([SpawnRequest::new(EnemyKind::Splitting, Vec2::new(60.0, 60.0), 4)]);

    let mut generations = Vec::new();
    let mut kills = 0;
    for _ in 0..4 {
        store.add_projectile(
            shot(Vec2::new(60.0, 60.0), 1000.0)
                .with_size(Vec2::splat(400.0))
                .with_pierce(64),
        );
        kills += resolve_all(&mut store, &mut combo, &mut rng).kills;
        store.update(0.016, Vec2::ZERO, field(), 4, &mut rng);
        generations.push(store.enemies().len());
    }
    assert_eq!(generations, vec![2, 4, 0, 0]);
    assert_eq!(kills, 7);
}

struct Shared(Rc<RefCell<MemoryPersistence>>);

impl Persistence for Shared {
    fn load(&mut self) -> SaveData {
        self.0.borrow_mut().load()
    }

    fn save(&mut self, data: &SaveData) {
        self.0.borrow_mut().save(data);
    }
}

#[test]
fn death_persists_run_results() {
    let store = Rc::new(RefCell::new(MemoryPersistence::new()));
    let settings = Settings {
        seed: Some(21),
        ..Default::default()
    };
    let mut session = Session::new(settings, Box::new(Shared(store.clone())), field()).with_clock(|| 1_000);
    assert!(session.begin(CharacterKind::Gunner));

    let at = Vec2::new(100.0, 100.0);
    let run = session.run_mut();
    run.store.add_enemies([SpawnRequest::new(EnemyKind::Basic, at, 1)]);
    run.store.add_projectiles([shot(at, 1.0), shot(at, 1.0)]);
    session.frame(&TickInput::default(), 0.016, field());
    assert_eq!(session.run().stats.score, 10);

    if let Some(player) = session.run_mut().store.player_mut() {
        player.health = 0.0;
    }
    session.frame(&TickInput::default(), 0.016, field());
    assert_eq!(session.phase(), GamePhase::GameOver);
    assert_eq!(session.last_rank(), Some(1));

    let saved = store.borrow().data.clone().expect("save written");
    assert_eq!(saved.currency, 1);
    assert_eq!(saved.lifetime.runs, 1);
    assert_eq!(saved.lifetime.deaths, 1);
    assert_eq!(saved.lifetime.kills, 1);
    assert_eq!(saved.high_scores.top_score(), Some(10));
    assert_eq!(saved.high_scores.entries[0].timestamp, 1_000);
    assert!(saved.in_progress.is_none());
}

#[test]
fn same_seed_same_run() {
    let input = TickInput {
        right: true,
        ..Default::default()
    };
    let mut a = playing(99);
    let mut b = playing(99);
    for _ in 0..600 {
        tick(&mut a, &input, 0.02, field());
        tick(&mut b, &input, 0.02, field());
    }
    assert_eq!(a.stats, b.stats);
    assert_eq!(a.store.enemies().len(), b.store.enemies().len());
}
