//! Cosmetic transient effects (never affect gameplay)

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Particle colour/animation tag for the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    Hit,
    Deflect,
    Death,
    PlayerDeath,
    BossDeath,
    Pickup,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub kind: ParticleKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32, // 0-1, decreases over time
    pub size: f32,
}

impl Particle {
    pub fn update(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        self.vel *= 0.92;
        self.life -= dt * 2.0;
        self.size *= 0.99;
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

/// Floating damage number
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DamageNumber {
    pub pos: Vec2,
    pub value: f32,
    pub life: f32,
}

impl DamageNumber {
    pub const LIFETIME: f32 = 0.8;

    pub fn new(pos: Vec2, value: f32) -> Self {
        Self {
            pos,
            value,
            life: Self::LIFETIME,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.pos.y -= 40.0 * dt;
        self.life -= dt;
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

/// Burst of `count` particles radiating from `pos`
pub fn burst(rng: &mut impl Rng, kind: ParticleKind, pos: Vec2, count: usize, speed: f32) -> Vec<Particle> {
    (0..count)
        .map(|_| {
            let angle = rng.random_range(0.0..std::f32::consts::TAU);
            let s = speed * rng.random_range(0.5..1.0);
            Particle {
                kind,
                pos,
                vel: Vec2::from_angle(angle) * s,
                life: 1.0,
                size: rng.random_range(2.0..5.0),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_burst_count() {
        let mut rng = Pcg32::seed_from_u64(3);
        let parts = burst(&mut rng, ParticleKind::Hit, Vec2::ZERO, 12, 100.0);
        assert_eq!(parts.len(), 12);
        assert!(parts.iter().all(|p| p.is_alive()));
    }

    #[test]
    fn test_particle_fades() {
        let mut p = Particle {
            kind: ParticleKind::Death,
            pos: Vec2::ZERO,
            vel: Vec2::X,
            life: 1.0,
            size: 3.0,
        };
        for _ in 0..60 {
            p.update(1.0 / 60.0);
        }
        assert!(!p.is_alive());
    }

    #[test]
    fn test_damage_number_rises_and_expires() {
        let mut n = DamageNumber::new(Vec2::new(0.0, 100.0), 3.0);
        n.update(0.5);
        assert!(n.pos.y < 100.0);
        assert!(n.is_alive());
        n.update(0.5);
        assert!(!n.is_alive());
    }
}
