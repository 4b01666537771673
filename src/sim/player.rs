//! The player character

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Obstacles, Positioned, slide_move};
use super::enemy::Enemy;
use super::projectile::Projectile;
use super::state::FieldBounds;
use super::weapons::{Blaster, Companion, HomingTurret, Weapon};
use crate::consts::*;

/// Selectable characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CharacterKind {
    /// Blaster only
    #[default]
    Gunner,
    /// Weaponless, fights through two seeker companions
    Summoner,
    /// Blaster plus a homing turret
    Engineer,
}

impl CharacterKind {
    pub const ALL: [CharacterKind; 3] = [
        CharacterKind::Gunner,
        CharacterKind::Summoner,
        CharacterKind::Engineer,
    ];

    /// Currency needed to unlock (0 = always available)
    pub fn unlock_cost(self) -> u64 {
        match self {
            CharacterKind::Gunner => 0,
            CharacterKind::Summoner => 250,
            CharacterKind::Engineer => 500,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CharacterKind::Gunner => "Gunner",
            CharacterKind::Summoner => "Summoner",
            CharacterKind::Engineer => "Engineer",
        }
    }
}

/// Level-up choices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Upgrade {
    MaxHealth,
    Swiftness,
    Power,
    RapidFire,
    Piercing,
    Orbiter,
    Heal,
}

impl Upgrade {
    pub const ALL: [Upgrade; 7] = [
        Upgrade::MaxHealth,
        Upgrade::Swiftness,
        Upgrade::Power,
        Upgrade::RapidFire,
        Upgrade::Piercing,
        Upgrade::Orbiter,
        Upgrade::Heal,
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub character: CharacterKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub hitbox: Vec2,
    pub speed: f32,
    pub health: f32,
    pub max_health: f32,
    pub weapon: Weapon,
    pub companions: Vec<Companion>,
    pub turret: Option<HomingTurret>,
    /// Last non-zero movement direction (aim when idle)
    pub facing: Vec2,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next: u32,
    pub damage_scale: f32,
    /// Invulnerability after a hit
    pub hurt_timer: f32,
    pub haste_timer: f32,
}

impl Player {
    pub fn new(character: CharacterKind, pos: Vec2) -> Self {
        let (weapon, companions, turret) = match character {
            CharacterKind::Gunner => (Weapon::Blaster(Blaster::default()), Vec::new(), None),
            CharacterKind::Summoner => (
                Weapon::Weaponless,
                vec![
                    Companion::seeker(pos + Vec2::new(-30.0, 0.0)),
                    Companion::seeker(pos + Vec2::new(30.0, 0.0)),
                ],
                None,
            ),
            CharacterKind::Engineer => (
                Weapon::Blaster(Blaster::default()),
                Vec::new(),
                Some(HomingTurret::default()),
            ),
        };

        Self {
            character,
            pos,
            size: Vec2::splat(PLAYER_SIZE),
            hitbox: Vec2::new(PLAYER_HITBOX.0, PLAYER_HITBOX.1),
            speed: PLAYER_SPEED,
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            weapon,
            companions,
            turret,
            facing: Vec2::X,
            level: 1,
            xp: 0,
            xp_to_next: xp_for_level(1),
            damage_scale: 1.0,
            hurt_timer: 0.0,
            haste_timer: 0.0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn is_invulnerable(&self) -> bool {
        self.hurt_timer > 0.0
    }

    pub fn effective_speed(&self) -> f32 {
        if self.haste_timer > 0.0 {
            self.speed * 1.5
        } else {
            self.speed
        }
    }

    /// Apply damage unless in the post-hit grace window; returns damage taken
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        if !self.is_alive() || self.is_invulnerable() || amount <= 0.0 {
            return 0.0;
        }
        let before = self.health;
        self.health = (self.health - amount).clamp(0.0, self.max_health);
        self.hurt_timer = PLAYER_HURT_GRACE;
        before - self.health
    }

    pub fn heal(&mut self, amount: f32) {
        if self.is_alive() {
            self.health = (self.health + amount.max(0.0)).clamp(0.0, self.max_health);
        }
    }

    /// Move along the input direction, clamped to the field
    pub fn move_by(&mut self, dt: f32, dir: Vec2, field: FieldBounds, obstacles: Option<&dyn Obstacles>) {
        self.hurt_timer = (self.hurt_timer - dt).max(0.0);
        self.haste_timer = (self.haste_timer - dt).max(0.0);

        if !self.is_alive() {
            return;
        }
        let dir = dir.normalize_or_zero();
        if dir != Vec2::ZERO {
            self.facing = dir;
        }
        let delta = dir * self.effective_speed() * dt;
        let moved = slide_move(self.pos, self.hitbox, delta, obstacles);
        self.pos = field.clamp(moved, self.size * 0.5);
    }

    /// Fire the primary weapon and advance companions and the turret
    pub fn update_weapons(&mut self, dt: f32, enemies: &[Enemy], out: &mut Vec<Projectile>) {
        if !self.is_alive() {
            return;
        }
        if let Weapon::Blaster(blaster) = &mut self.weapon
            && let Some(shot) = blaster.update(dt, self.pos, self.facing, self.damage_scale)
        {
            out.push(shot);
        }
        for companion in &mut self.companions {
            companion.update(dt, self.pos, enemies);
        }
        if let Some(turret) = &mut self.turret {
            turret.update(dt, self.pos, enemies);
        }
    }

    /// Add experience; returns the number of levels gained
    pub fn gain_xp(&mut self, amount: u32) -> u32 {
        self.xp += amount;
        let mut gained = 0;
        while self.xp >= self.xp_to_next {
            self.xp -= self.xp_to_next;
            self.level += 1;
            self.xp_to_next = xp_for_level(self.level);
            gained += 1;
        }
        gained
    }

    pub fn apply_upgrade(&mut self, upgrade: Upgrade) {
        match upgrade {
            Upgrade::MaxHealth => {
                self.max_health += 20.0;
                self.heal(20.0);
            }
            Upgrade::Swiftness => self.speed *= 1.1,
            Upgrade::Power => {
                self.damage_scale += 0.25;
                for companion in &mut self.companions {
                    companion.damage *= 1.25;
                }
                if let Some(turret) = &mut self.turret {
                    turret.damage *= 1.25;
                }
            }
            Upgrade::RapidFire => {
                if let Weapon::Blaster(blaster) = &mut self.weapon {
                    blaster.cooldown = (blaster.cooldown * 0.85).max(0.08);
                }
                for companion in &mut self.companions {
                    companion.tick_interval = (companion.tick_interval * 0.85).max(0.1);
                }
                if let Some(turret) = &mut self.turret {
                    turret.fire_interval = (turret.fire_interval * 0.85).max(0.2);
                }
            }
            Upgrade::Piercing => {
                if let Weapon::Blaster(blaster) = &mut self.weapon {
                    blaster.pierce += 1;
                }
            }
            Upgrade::Orbiter => {
                let n = self.companions.len() as f32;
                self.companions.push(Companion::orbiter(n * 1.3));
            }
            Upgrade::Heal => self.heal(self.max_health * 0.3),
        }
        log::debug!("applied upgrade {upgrade:?}");
    }
}

/// Experience required to advance from `level`
pub fn xp_for_level(level: u32) -> u32 {
    10 + 5 * level.saturating_sub(1)
}

impl Positioned for Player {
    fn position(&self) -> Vec2 {
        self.pos
    }
    fn size(&self) -> Vec2 {
        self.size
    }
    fn collision_size(&self) -> Option<Vec2> {
        Some(self.hitbox)
    }
}
