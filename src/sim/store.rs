//! Entity store: owns every live object of a run

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::boss::{BossArchetype, BossEvent, BossPhase};
use super::collectible::{Collectible, CollectibleKind, PowerUpKind};
use super::collision::Obstacles;
use super::effects::{DamageNumber, Particle, ParticleKind, burst};
use super::enemy::{Enemy, EnemyContext, EnemyKind, SpawnRequest};
use super::player::{CharacterKind, Player};
use super::projectile::{Projectile, Side};
use super::state::{FieldBounds, GameEvent};

/// Default cosmetic particle cap (see `QualityPreset`)
pub const DEFAULT_MAX_PARTICLES: usize = 400;

/// Boss values mirrored for the HUD after every update
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BossStatus {
    pub id: u32,
    pub archetype: BossArchetype,
    pub health: f32,
    pub max_health: f32,
    pub phase: BossPhase,
    pub shield: Option<f32>,
}

pub struct EntityStore {
    pub(crate) player: Option<Player>,
    pub(crate) enemies: Vec<Enemy>,
    pub(crate) player_projectiles: Vec<Projectile>,
    pub(crate) enemy_projectiles: Vec<Projectile>,
    pub(crate) collectibles: Vec<Collectible>,
    pub(crate) particles: Vec<Particle>,
    pub(crate) damage_numbers: Vec<DamageNumber>,
    pub(crate) boss: Option<BossStatus>,
    obstacles: Option<Box<dyn Obstacles>>,
    max_particles: usize,
    show_damage_numbers: bool,
    events: Vec<GameEvent>,
    next_id: u32,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            player: None,
            enemies: Vec::new(),
            player_projectiles: Vec::new(),
            enemy_projectiles: Vec::new(),
            collectibles: Vec::new(),
            particles: Vec::new(),
            damage_numbers: Vec::new(),
            boss: None,
            obstacles: None,
            max_particles: DEFAULT_MAX_PARTICLES,
            show_damage_numbers: true,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Drop every entity (settings and terrain are kept)
    pub fn reset(&mut self) {
        self.player = None;
        self.enemies.clear();
        self.player_projectiles.clear();
        self.enemy_projectiles.clear();
        self.collectibles.clear();
        self.particles.clear();
        self.damage_numbers.clear();
        self.boss = None;
        self.events.clear();
        self.next_id = 1;
    }

    /// Build the player for `character` at the field centre
    pub fn setup_player(&mut self, character: CharacterKind, field: FieldBounds) {
        self.player = Some(Player::new(character, field.center()));
    }

    pub fn set_obstacles(&mut self, obstacles: Option<Box<dyn Obstacles>>) {
        self.obstacles = obstacles;
    }

    pub fn configure_effects(&mut self, max_particles: usize, damage_numbers: bool) {
        self.max_particles = max_particles;
        self.show_damage_numbers = damage_numbers;
        if !damage_numbers {
            self.damage_numbers.clear();
        }
        self.particles.truncate(max_particles);
    }

    fn alloc_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    pub fn player_mut(&mut self) -> Option<&mut Player> {
        self.player.as_mut()
    }

    pub fn player_pos(&self) -> Option<Vec2> {
        self.player.as_ref().map(|p| p.pos)
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn player_projectiles(&self) -> &[Projectile] {
        &self.player_projectiles
    }

    pub fn enemy_projectiles(&self) -> &[Projectile] {
        &self.enemy_projectiles
    }

    pub fn collectibles(&self) -> &[Collectible] {
        &self.collectibles
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn damage_numbers(&self) -> &[DamageNumber] {
        &self.damage_numbers
    }

    pub fn boss_status(&self) -> Option<&BossStatus> {
        self.boss.as_ref()
    }

    /// The boss enemy, alive or freshly killed
    pub fn boss(&self) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.is_boss())
    }

    /// Turn spawn descriptions into enemies; returns the new ids
    pub fn add_enemies(&mut self, requests: impl IntoIterator<Item = SpawnRequest>) -> Vec<u32> {
        requests
            .into_iter()
            .map(|request| {
                let id = self.alloc_id();
                self.enemies.push(Enemy::new(id, &request));
                id
            })
            .collect()
    }

    pub fn spawn_boss(&mut self, archetype: BossArchetype, pos: Vec2, wave: u32) -> u32 {
        let id = self.alloc_id();
        let enemy = Enemy::boss(id, archetype, pos, wave);
        self.boss = Some(boss_status(&enemy));
        self.enemies.push(enemy);
        id
    }

    pub fn add_projectile(&mut self, projectile: Projectile) {
        match projectile.side {
            Side::Player => self.player_projectiles.push(projectile),
            Side::Enemy => self.enemy_projectiles.push(projectile),
        }
    }

    pub fn add_projectiles(&mut self, projectiles: impl IntoIterator<Item = Projectile>) {
        for projectile in projectiles {
            self.add_projectile(projectile);
        }
    }

    pub fn add_experience_orb(&mut self, pos: Vec2, value: u32) -> u32 {
        self.add_collectible(CollectibleKind::Experience(value), pos)
    }

    pub fn add_power_up(&mut self, pos: Vec2, kind: PowerUpKind) -> u32 {
        self.add_collectible(CollectibleKind::PowerUp(kind), pos)
    }

    pub fn add_boss_loot(&mut self, pos: Vec2, currency: u64) -> u32 {
        self.add_collectible(CollectibleKind::Loot { currency }, pos)
    }

    fn add_collectible(&mut self, kind: CollectibleKind, pos: Vec2) -> u32 {
        let id = self.alloc_id();
        self.collectibles.push(Collectible::new(id, kind, pos));
        id
    }

    pub fn add_particles(&mut self, particles: Vec<Particle>) {
        let room = self.max_particles.saturating_sub(self.particles.len());
        self.particles.extend(particles.into_iter().take(room));
    }

    pub fn add_burst(&mut self, rng: &mut Pcg32, kind: ParticleKind, pos: Vec2, count: usize, speed: f32) {
        if self.particles.len() < self.max_particles {
            let parts = burst(rng, kind, pos, count, speed);
            self.add_particles(parts);
        }
    }

    pub fn add_damage_number(&mut self, pos: Vec2, value: f32) {
        if self.show_damage_numbers {
            self.damage_numbers.push(DamageNumber::new(pos, value));
        }
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take notifications raised during updates
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advance every entity one frame, in a fixed order
    pub fn update(&mut self, dt: f32, move_dir: Vec2, field: FieldBounds, wave: u32, rng: &mut Pcg32) {
        let obstacles = self.obstacles.as_deref();

        // Player movement, weapon and companions
        if let Some(player) = &mut self.player {
            player.move_by(dt, move_dir, field, obstacles);
            player.update_weapons(dt, &self.enemies, &mut self.player_projectiles);
        }
        let player_pos = self.player_pos().unwrap_or_else(|| field.center());

        // Enemies, draining their fired projectiles
        let mut ctx = EnemyContext {
            rng,
            field,
            obstacles,
        };
        for enemy in &mut self.enemies {
            enemy.update(dt, player_pos, &mut ctx);
            self.enemy_projectiles.extend(enemy.drain_projectiles());
        }

        // Boss: status sync and read-once queues
        self.boss = None;
        let mut minions = Vec::new();
        let mut hazard_damage = 0.0;
        let mut boss_events = Vec::new();
        if let Some(enemy) = self.enemies.iter_mut().find(|e| e.is_boss() && e.is_alive()) {
            let status = boss_status(enemy);
            if let Some(boss) = enemy.boss_state_mut() {
                minions = boss.drain_minions();
                hazard_damage = boss.take_player_damage();
                boss_events = boss
                    .drain_events()
                    .into_iter()
                    .map(|e| (boss.archetype, e))
                    .collect();
            }
            self.boss = Some(status);
        }
        if !minions.is_empty() {
            self.add_enemies(
                minions
                    .into_iter()
                    .map(|pos| SpawnRequest::new(EnemyKind::Basic, pos, wave)),
            );
        }
        for (archetype, event) in boss_events {
            match event {
                BossEvent::TransitionStarted => {}
                BossEvent::PhaseTwo => self.emit(GameEvent::BossPhaseChanged(archetype)),
                BossEvent::ShieldBroken => self.emit(GameEvent::BossShieldBroken),
                BossEvent::PatternFired(kind) => log::debug!("{} used {kind:?}", archetype.name()),
                BossEvent::MinionsSummoned(n) => log::debug!("{} summoned {n}", archetype.name()),
                BossEvent::ShieldRestored => log::debug!("{} shield restored", archetype.name()),
            }
        }
        if hazard_damage > 0.0
            && let Some(player) = &mut self.player
        {
            let taken = player.take_damage(hazard_damage);
            if taken > 0.0 {
                self.events.push(GameEvent::PlayerHurt { damage: taken });
            }
        }

        // Projectiles of both sides
        for projectile in self
            .player_projectiles
            .iter_mut()
            .chain(self.enemy_projectiles.iter_mut())
        {
            projectile.update(dt);
        }
        self.player_projectiles.retain(|p| p.is_alive());
        self.enemy_projectiles.retain(|p| p.is_alive());

        // Cosmetics
        for particle in &mut self.particles {
            particle.update(dt);
        }
        self.particles.retain(|p| p.is_alive());
        for number in &mut self.damage_numbers {
            number.update(dt);
        }
        self.damage_numbers.retain(|n| n.is_alive());

        // Collectibles
        let attract_to = self.player_pos();
        for collectible in &mut self.collectibles {
            collectible.update(dt, attract_to);
        }
        self.collectibles.retain(|c| c.is_alive());

        // Splitting deaths queue children, merged after the sweep
        let mut children = Vec::new();
        for enemy in self.enemies.iter_mut().filter(|e| !e.is_alive() && !e.split_resolved) {
            enemy.split_resolved = true;
            children.extend(enemy.split_children(wave));
        }
        self.enemies.retain(|e| e.is_alive());
        if !children.is_empty() {
            log::debug!("{} split children", children.len());
            self.add_enemies(children);
        }
    }
}

fn boss_status(enemy: &Enemy) -> BossStatus {
    let boss = enemy.boss_state();
    BossStatus {
        id: enemy.id,
        archetype: match enemy.kind {
            EnemyKind::Boss(archetype) => archetype,
            _ => BossArchetype::Necromancer,
        },
        health: enemy.body.health,
        max_health: enemy.body.max_health,
        phase: boss.map(|b| b.phase).unwrap_or(BossPhase::One),
        shield: boss.and_then(|b| b.shield()).filter(|s| s.active).map(|s| s.health),
    }
}
