//! Projectiles for both sides of the fight

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Positioned;

/// Who fired the projectile (decides which collision sweep it joins)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Player,
    Enemy,
}

/// Hit semantics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pierce {
    /// Destroyed by the first hit
    Single,
    /// Survives until `max_hits` hits have been registered
    Piercing { max_hits: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub side: Side,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub damage: f32,
    /// Remaining lifetime in seconds
    pub ttl: f32,
    pub pierce: Pierce,
    pub hits: u32,
    /// Enemy ids already struck (piercing rounds hit each enemy once)
    #[serde(default)]
    pub struck: Vec<u32>,
    alive: bool,
}

impl Projectile {
    pub fn new(side: Side, pos: Vec2, vel: Vec2, damage: f32, ttl: f32) -> Self {
        Self {
            side,
            pos,
            vel,
            size: Vec2::splat(8.0),
            damage,
            ttl,
            pierce: Pierce::Single,
            hits: 0,
            struck: Vec::new(),
            alive: true,
        }
    }

    pub fn with_pierce(mut self, max_hits: u32) -> Self {
        if max_hits > 1 {
            self.pierce = Pierce::Piercing { max_hits };
        }
        self
    }

    pub fn with_size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// Advance position and lifetime
    pub fn update(&mut self, dt: f32) {
        if !self.alive {
            return;
        }
        self.pos += self.vel * dt;
        self.ttl -= dt;
        if self.ttl <= 0.0 {
            self.alive = false;
        }
    }

    /// Whether this projectile already struck the given enemy
    pub fn has_struck(&self, enemy_id: u32) -> bool {
        self.struck.contains(&enemy_id)
    }

    /// Record a hit; returns true if the projectile is spent
    pub fn register_hit(&mut self, target_id: u32) -> bool {
        self.hits += 1;
        self.struck.push(target_id);
        let spent = match self.pierce {
            Pierce::Single => true,
            Pierce::Piercing { max_hits } => self.hits >= max_hits,
        };
        if spent {
            self.alive = false;
        }
        spent
    }
}

impl Positioned for Projectile {
    fn position(&self) -> Vec2 {
        self.pos
    }
    fn size(&self) -> Vec2 {
        self.size
    }
}
