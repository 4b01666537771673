//! Pickups: experience orbs, power-ups and boss loot

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Positioned;
use crate::consts::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Restore a chunk of health
    Heal,
    /// Pull every orb on the field to the player
    Magnet,
    /// Temporary movement speed boost
    Haste,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [PowerUpKind::Heal, PowerUpKind::Magnet, PowerUpKind::Haste];

    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CollectibleKind {
    Experience(u32),
    PowerUp(PowerUpKind),
    /// Dropped by bosses; never expires
    Loot { currency: u64 },
}

impl CollectibleKind {
    pub fn tag(&self) -> &'static str {
        match self {
            CollectibleKind::Experience(_) => "orb",
            CollectibleKind::PowerUp(PowerUpKind::Heal) => "powerup_heal",
            CollectibleKind::PowerUp(PowerUpKind::Magnet) => "powerup_magnet",
            CollectibleKind::PowerUp(PowerUpKind::Haste) => "powerup_haste",
            CollectibleKind::Loot { .. } => "loot",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collectible {
    pub id: u32,
    pub kind: CollectibleKind,
    pub pos: Vec2,
    /// Seconds until it disappears (`None` = permanent)
    pub ttl: Option<f32>,
    /// Pulled toward the player regardless of distance
    pub magnetized: bool,
    pub collected: bool,
}

impl Collectible {
    pub fn new(id: u32, kind: CollectibleKind, pos: Vec2) -> Self {
        let ttl = match kind {
            CollectibleKind::Experience(_) => Some(ORB_LIFETIME),
            CollectibleKind::PowerUp(_) => Some(POWER_UP_LIFETIME),
            CollectibleKind::Loot { .. } => None,
        };
        Self {
            id,
            kind,
            pos,
            ttl,
            magnetized: false,
            collected: false,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.ttl.is_some_and(|t| t <= 0.0)
    }

    pub fn is_alive(&self) -> bool {
        !self.collected && !self.is_expired()
    }

    pub fn in_reach(&self, player_pos: Vec2) -> bool {
        self.pos.distance(player_pos) <= COLLECT_RADIUS
    }

    /// Age the pickup and drift toward the player when close (or magnetized)
    pub fn update(&mut self, dt: f32, player_pos: Option<Vec2>) {
        if let Some(ttl) = &mut self.ttl {
            *ttl -= dt;
        }
        let Some(target) = player_pos else {
            return;
        };
        let to_player = target - self.pos;
        let dist = to_player.length();
        if dist > 0.0 && (self.magnetized || dist <= ATTRACT_RADIUS) {
            let step = (ATTRACT_SPEED * dt).min(dist);
            self.pos += to_player / dist * step;
        }
    }
}

impl Positioned for Collectible {
    fn position(&self) -> Vec2 {
        self.pos
    }
    fn size(&self) -> Vec2 {
        Vec2::splat(12.0)
    }
}
