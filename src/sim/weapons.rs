//! Player weapons: the cooldown blaster, companions and the homing turret

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, Positioned};
use super::enemy::Enemy;
use super::projectile::{Projectile, Side};
use crate::{direction_to, point_on_circle};

/// Primary weapon slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Weapon {
    /// Fires projectiles on a cooldown
    Blaster(Blaster),
    /// No gun; damage comes from companions
    Weaponless,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blaster {
    pub cooldown: f32,
    pub timer: f32,
    pub damage: f32,
    pub speed: f32,
    pub lifetime: f32,
    /// Hits per projectile (1 = single hit)
    pub pierce: u32,
}

impl Default for Blaster {
    fn default() -> Self {
        Self {
            cooldown: 0.4,
            timer: 0.0,
            damage: 1.0,
            speed: 500.0,
            lifetime: 1.5,
            pierce: 1,
        }
    }
}

impl Blaster {
    /// Tick the cooldown; returns a projectile when the blaster fires
    pub fn update(&mut self, dt: f32, origin: Vec2, aim: Vec2, damage_scale: f32) -> Option<Projectile> {
        self.timer -= dt;
        if self.timer > 0.0 || aim == Vec2::ZERO {
            return None;
        }
        self.timer = self.cooldown;
        Some(
            Projectile::new(
                Side::Player,
                origin,
                aim.normalize() * self.speed,
                self.damage * damage_scale,
                self.lifetime,
            )
            .with_pierce(self.pierce),
        )
    }
}

/// How a companion moves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CompanionKind {
    /// Circles the player at a fixed radius
    Orbiter { angle: f32, radius: f32, angular_speed: f32 },
    /// Hunts the nearest enemy inside its aggro radius
    Seeker { aggro_radius: f32, speed: f32 },
}

/// A damage-dealing companion entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Companion {
    pub kind: CompanionKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub damage: f32,
    /// Seconds between damage ticks
    pub tick_interval: f32,
    pub tick_timer: f32,
    /// Cached target id, revalidated every frame
    pub target: Option<u32>,
}

impl Companion {
    pub fn orbiter(angle: f32) -> Self {
        Self {
            kind: CompanionKind::Orbiter {
                angle,
                radius: 70.0,
                angular_speed: 3.0,
            },
            pos: Vec2::ZERO,
            size: Vec2::splat(16.0),
            damage: 1.0,
            tick_interval: 0.5,
            tick_timer: 0.0,
            target: None,
        }
    }

    pub fn seeker(pos: Vec2) -> Self {
        Self {
            kind: CompanionKind::Seeker {
                aggro_radius: 260.0,
                speed: 220.0,
            },
            pos,
            size: Vec2::splat(18.0),
            damage: 1.5,
            tick_interval: 0.6,
            tick_timer: 0.0,
            target: None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.tick_timer <= 0.0
    }

    /// Restart the damage cooldown after a hit
    pub fn trigger(&mut self) {
        self.tick_timer = self.tick_interval;
    }

    pub fn update(&mut self, dt: f32, player_pos: Vec2, enemies: &[Enemy]) {
        self.tick_timer = (self.tick_timer - dt).max(0.0);

        match &mut self.kind {
            CompanionKind::Orbiter {
                angle,
                radius,
                angular_speed,
            } => {
                *angle = (*angle + *angular_speed * dt) % std::f32::consts::TAU;
                self.pos = point_on_circle(player_pos, *radius, *angle);
            }
            CompanionKind::Seeker {
                aggro_radius,
                speed,
            } => {
                let aggro = *aggro_radius;
                let speed = *speed;

                // Drop a stale target: dead, gone, or out of reach
                let still_valid = self.target.is_some_and(|id| {
                    enemies
                        .iter()
                        .any(|e| e.id == id && e.is_alive() && e.body.pos.distance(player_pos) <= aggro)
                });
                if !still_valid {
                    self.target = nearest_enemy(enemies, player_pos, aggro).map(|e| e.id);
                }

                let goal = self
                    .target
                    .and_then(|id| enemies.iter().find(|e| e.id == id))
                    .map(|e| e.body.pos)
                    .unwrap_or(player_pos + Vec2::new(0.0, -40.0));
                let to_goal = goal - self.pos;
                let step = speed * dt;
                if to_goal.length() <= step {
                    self.pos = goal;
                } else {
                    self.pos += to_goal.normalize() * step;
                }
            }
        }
    }
}

impl Positioned for Companion {
    fn position(&self) -> Vec2 {
        self.pos
    }
    fn size(&self) -> Vec2 {
        self.size
    }
}

/// Nearest living enemy within `radius` of `from`
pub fn nearest_enemy(enemies: &[Enemy], from: Vec2, radius: f32) -> Option<&Enemy> {
    enemies
        .iter()
        .filter(|e| e.is_alive())
        .map(|e| (e, e.body.pos.distance_squared(from)))
        .filter(|(_, d2)| *d2 <= radius * radius)
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(e, _)| e)
}

/// One hit produced by a multi-target weapon system
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponHit {
    pub enemy_id: u32,
    pub damage: f32,
    pub impact: Vec2,
}

/// Homing orb launched by the turret
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomingOrb {
    pub pos: Vec2,
    pub vel: Vec2,
    pub target: Option<u32>,
    pub ttl: f32,
    pub alive: bool,
}

impl HomingOrb {
    const SIZE: f32 = 10.0;

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::splat(Self::SIZE))
    }
}

/// Turret that launches homing orbs at nearby enemies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomingTurret {
    pub fire_interval: f32,
    pub timer: f32,
    pub range: f32,
    pub damage: f32,
    pub orb_speed: f32,
    pub orbs: Vec<HomingOrb>,
}

impl Default for HomingTurret {
    fn default() -> Self {
        Self {
            fire_interval: 1.2,
            timer: 0.0,
            range: 320.0,
            damage: 2.0,
            orb_speed: 260.0,
            orbs: Vec::new(),
        }
    }
}

impl HomingTurret {
    pub fn update(&mut self, dt: f32, player_pos: Vec2, enemies: &[Enemy]) {
        self.timer -= dt;
        if self.timer <= 0.0
            && let Some(target) = nearest_enemy(enemies, player_pos, self.range)
        {
            self.timer = self.fire_interval;
            self.orbs.push(HomingOrb {
                pos: player_pos,
                vel: direction_to(player_pos, target.body.pos) * self.orb_speed,
                target: Some(target.id),
                ttl: 3.0,
                alive: true,
            });
        }

        for orb in &mut self.orbs {
            orb.ttl -= dt;
            if orb.ttl <= 0.0 {
                orb.alive = false;
                continue;
            }
            // Re-acquire if the cached target died
            let target = orb
                .target
                .and_then(|id| enemies.iter().find(|e| e.id == id && e.is_alive()))
                .or_else(|| nearest_enemy(enemies, orb.pos, self.range));
            orb.target = target.map(|e| e.id);
            if let Some(target) = target {
                let desired = direction_to(orb.pos, target.body.pos) * self.orb_speed;
                orb.vel = orb.vel.lerp(desired, (dt * 6.0).min(1.0));
            }
            orb.pos += orb.vel * dt;
        }
        self.orbs.retain(|o| o.alive);
    }

    /// Consume orbs that touch an enemy and report the hits
    pub fn collide(&mut self, enemies: &[Enemy]) -> Vec<WeaponHit> {
        let mut hits = Vec::new();
        for orb in self.orbs.iter_mut().filter(|o| o.alive) {
            let bounds = orb.bounds();
            if let Some(enemy) = enemies
                .iter()
                .find(|e| e.is_alive() && e.bounds().overlaps(&bounds))
            {
                orb.alive = false;
                hits.push(WeaponHit {
                    enemy_id: enemy.id,
                    damage: self.damage,
                    impact: orb.pos,
                });
            }
        }
        self.orbs.retain(|o| o.alive);
        hits
    }
}
