//! Boss behaviour state machine
//!
//! Phase One -> Transitioning -> Phase Two. Each archetype owns one or two
//! independently cooling attack patterns plus its own timed mechanics. The
//! boss only mutates its own [`Body`] and fills read-once queues (minion
//! positions, projectiles, player damage, events) that the entity store drains
//! once per frame.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::enemy::{Body, DamageSource};
use super::projectile::{Projectile, Side};
use crate::consts::*;
use crate::{direction_to, point_on_circle};

/// Boss archetypes, cycled through every boss wave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossArchetype {
    Necromancer,
    VampireLord,
    AncientGolem,
}

impl BossArchetype {
    pub const ALL: [BossArchetype; 3] = [
        BossArchetype::Necromancer,
        BossArchetype::VampireLord,
        BossArchetype::AncientGolem,
    ];

    /// Archetype for the boss wave `wave` (5 -> necromancer, 10 -> vampire, ...)
    pub fn for_wave(wave: u32) -> Self {
        let encounter = (wave / BOSS_WAVE_INTERVAL).max(1);
        Self::ALL[((encounter - 1) % 3) as usize]
    }

    pub fn tag(self) -> &'static str {
        match self {
            BossArchetype::Necromancer => "boss_necromancer",
            BossArchetype::VampireLord => "boss_vampire_lord",
            BossArchetype::AncientGolem => "boss_ancient_golem",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BossArchetype::Necromancer => "Necromancer",
            BossArchetype::VampireLord => "Vampire Lord",
            BossArchetype::AncientGolem => "Ancient Golem",
        }
    }

    pub fn score_value(self) -> u32 {
        match self {
            BossArchetype::Necromancer => 500,
            BossArchetype::VampireLord => 650,
            BossArchetype::AncientGolem => 800,
        }
    }

    /// (health, speed, contact damage, size)
    fn base_stats(self) -> (f32, f32, f32, f32) {
        match self {
            BossArchetype::Necromancer => (120.0, 45.0, 15.0, 64.0),
            BossArchetype::VampireLord => (150.0, 70.0, 18.0, 56.0),
            BossArchetype::AncientGolem => (220.0, 30.0, 25.0, 80.0),
        }
    }

    fn patterns(self) -> Vec<AttackPattern> {
        match self {
            BossArchetype::Necromancer => vec![
                AttackPattern::new(PatternKind::BoneVolley, 3.0, 10.0, 450.0),
                AttackPattern::new(PatternKind::DeathNova, 6.0, 8.0, 250.0),
            ],
            BossArchetype::VampireLord => vec![
                AttackPattern::new(PatternKind::Dash, 5.0, 20.0, 350.0),
                AttackPattern::new(PatternKind::BloodBolt, 2.5, 8.0, 400.0),
            ],
            BossArchetype::AncientGolem => vec![
                AttackPattern::new(PatternKind::GroundPound, 6.0, 25.0, 200.0),
                AttackPattern::new(PatternKind::RockThrow, 3.5, 15.0, 500.0),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BossPhase {
    One,
    Transitioning { remaining: f32 },
    Two,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatternKind {
    BoneVolley,
    DeathNova,
    Dash,
    BloodBolt,
    GroundPound,
    RockThrow,
}

/// One independently cooling attack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackPattern {
    pub kind: PatternKind,
    pub cooldown: f32,
    /// Seconds until ready
    pub timer: f32,
    pub damage: f32,
    pub range: f32,
}

impl AttackPattern {
    fn new(kind: PatternKind, cooldown: f32, damage: f32, range: f32) -> Self {
        Self {
            kind,
            cooldown,
            timer: cooldown * 0.5,
            damage,
            range,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.timer <= 0.0
    }
}

/// Fixed-direction charge (aimed once, at fire time)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dash {
    pub velocity: Vec2,
    pub remaining: f32,
    pub damage: f32,
}

/// Radially expanding ground-pound hazard
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shockwave {
    pub center: Vec2,
    pub radius: f32,
    pub max_radius: f32,
    pub damage: f32,
    pub hit_player: bool,
}

/// Rechargeable damage-absorbing shield
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShieldPool {
    pub health: f32,
    pub capacity: f32,
    pub active: bool,
    /// Seconds until the shield comes back after breaking
    pub recharge: f32,
}

impl ShieldPool {
    fn restore(&mut self) {
        self.active = true;
        self.health = self.capacity;
        self.recharge = 0.0;
    }
}

/// Archetype-specific mechanics, each independently timed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Mechanic {
    Necromancer {
        summon_timer: f32,
        summon_interval: f32,
    },
    Vampire {
        dash: Option<Dash>,
        /// Seconds until the next life-steal window opens
        life_steal_cooldown: f32,
        /// Remaining seconds of the open window
        life_steal_window: f32,
        life_steal_ratio: f32,
    },
    Golem {
        shockwave: Option<Shockwave>,
        shield: ShieldPool,
    },
}

/// Notifications raised by the boss, drained by the entity store
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BossEvent {
    TransitionStarted,
    PhaseTwo,
    PatternFired(PatternKind),
    MinionsSummoned(u32),
    ShieldBroken,
    ShieldRestored,
}

const SUMMON_INTERVAL: f32 = 8.0;
const SUMMON_RADIUS: f32 = 60.0;
const SUMMON_SCALE_PHASE_TWO: f32 = 0.6;
const LIFE_STEAL_EVERY: f32 = 8.0;
const LIFE_STEAL_DURATION: f32 = 3.0;
const LIFE_STEAL_RATIO: f32 = 0.1;
const LIFE_STEAL_RATIO_PHASE_TWO: f32 = 0.2;
const DASH_SPEED: f32 = 480.0;
const DASH_DURATION: f32 = 0.5;
const SHOCKWAVE_GROWTH: f32 = 240.0;
const SHOCKWAVE_MAX_RADIUS: f32 = 180.0;
const GOLEM_DAMAGE_REDUCTION: f32 = 0.3;
const GOLEM_SHIELD_FRACTION: f32 = 0.2;
const GOLEM_SHIELD_RECHARGE: f32 = 12.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub archetype: BossArchetype,
    pub phase: BossPhase,
    pub patterns: Vec<AttackPattern>,
    pub speed_scale: f32,
    pub mechanic: Mechanic,
    minions: Vec<Vec2>,
    projectiles: Vec<Projectile>,
    player_damage: f32,
    events: Vec<BossEvent>,
}

impl Boss {
    /// Build the state machine and its body for an encounter on `wave`
    pub fn spawn(archetype: BossArchetype, pos: Vec2, wave: u32) -> (Self, Body) {
        let (health, speed, contact_damage, size) = archetype.base_stats();
        let encounter = (wave / BOSS_WAVE_INTERVAL).max(1);
        let health = health * (1.0 + 0.25 * (encounter - 1) as f32);

        let body = Body {
            pos,
            size: Vec2::splat(size),
            hitbox: Some(Vec2::splat(size * 0.8)),
            speed,
            health,
            max_health: health,
            contact_damage,
        };

        let mechanic = match archetype {
            BossArchetype::Necromancer => Mechanic::Necromancer {
                summon_timer: SUMMON_INTERVAL * 0.5,
                summon_interval: SUMMON_INTERVAL,
            },
            BossArchetype::VampireLord => Mechanic::Vampire {
                dash: None,
                life_steal_cooldown: LIFE_STEAL_EVERY,
                life_steal_window: 0.0,
                life_steal_ratio: LIFE_STEAL_RATIO,
            },
            BossArchetype::AncientGolem => {
                let capacity = health * GOLEM_SHIELD_FRACTION;
                Mechanic::Golem {
                    shockwave: None,
                    shield: ShieldPool {
                        health: capacity,
                        capacity,
                        active: true,
                        recharge: 0.0,
                    },
                }
            }
        };

        let boss = Self {
            archetype,
            phase: BossPhase::One,
            patterns: archetype.patterns(),
            speed_scale: 1.0,
            mechanic,
            minions: Vec::new(),
            projectiles: Vec::new(),
            player_damage: 0.0,
            events: Vec::new(),
        };
        (boss, body)
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.phase, BossPhase::Transitioning { .. })
    }

    pub fn is_dashing(&self) -> bool {
        matches!(self.mechanic, Mechanic::Vampire { dash: Some(_), .. })
    }

    pub fn life_steal_active(&self) -> bool {
        matches!(self.mechanic, Mechanic::Vampire { life_steal_window, .. } if life_steal_window > 0.0)
    }

    pub fn shield(&self) -> Option<&ShieldPool> {
        match &self.mechanic {
            Mechanic::Golem { shield, .. } => Some(shield),
            _ => None,
        }
    }

    pub fn shockwave(&self) -> Option<&Shockwave> {
        match &self.mechanic {
            Mechanic::Golem { shockwave, .. } => shockwave.as_ref(),
            _ => None,
        }
    }

    pub fn contact_damage(&self, body: &Body) -> f32 {
        match &self.mechanic {
            Mechanic::Vampire { dash: Some(dash), .. } => dash.damage.max(body.contact_damage),
            _ => body.contact_damage,
        }
    }

    pub fn drain_minions(&mut self) -> Vec<Vec2> {
        std::mem::take(&mut self.minions)
    }

    pub fn drain_projectiles(&mut self) -> Vec<Projectile> {
        std::mem::take(&mut self.projectiles)
    }

    pub fn drain_events(&mut self) -> Vec<BossEvent> {
        std::mem::take(&mut self.events)
    }

    /// Damage dealt to the player by hazards since the last call
    pub fn take_player_damage(&mut self) -> f32 {
        std::mem::take(&mut self.player_damage)
    }

    /// Damage contract: no-op while transitioning; flat reduction, then shield
    /// absorption (overflow carries), then health, then life-steal.
    pub fn take_damage(&mut self, body: &mut Body, amount: f32, source: DamageSource) -> f32 {
        if self.is_transitioning() || body.health <= 0.0 {
            return 0.0;
        }

        let mut damage = amount.max(0.0);

        if let Mechanic::Golem { shield, .. } = &mut self.mechanic {
            damage *= 1.0 - GOLEM_DAMAGE_REDUCTION;
            if shield.active {
                let absorbed = damage.min(shield.health);
                shield.health -= absorbed;
                damage -= absorbed;
                if shield.health <= 0.0 {
                    shield.health = 0.0;
                    shield.active = false;
                    shield.recharge = GOLEM_SHIELD_RECHARGE;
                    self.events.push(BossEvent::ShieldBroken);
                }
            }
        }

        let dealt = body.apply_damage(damage);

        if self.phase == BossPhase::One
            && body.health > 0.0
            && body.health_ratio() <= BOSS_PHASE_THRESHOLD
        {
            log::info!("{} entering phase transition", self.archetype.name());
            self.phase = BossPhase::Transitioning {
                remaining: BOSS_TRANSITION_DURATION,
            };
            if let Mechanic::Vampire { dash, .. } = &mut self.mechanic {
                *dash = None;
            }
            self.events.push(BossEvent::TransitionStarted);
        }

        if let Mechanic::Vampire {
            life_steal_window,
            life_steal_ratio,
            ..
        } = &self.mechanic
            && *life_steal_window > 0.0
            && source != DamageSource::Boss
        {
            body.heal(dealt * life_steal_ratio);
        }

        dealt
    }

    /// Advance timers, movement and pattern evaluation
    pub fn update(&mut self, body: &mut Body, dt: f32, player_pos: Vec2, rng: &mut Pcg32) {
        if body.health <= 0.0 {
            return;
        }

        if let BossPhase::Transitioning { remaining } = &mut self.phase {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.enter_phase_two();
            }
            return;
        }

        for pattern in &mut self.patterns {
            pattern.timer -= dt;
        }

        self.update_mechanic(body, dt, player_pos);

        // Movement: an active dash overrides steering
        let mut dashing = false;
        if let Mechanic::Vampire { dash, .. } = &mut self.mechanic {
            if let Some(d) = dash {
                body.pos += d.velocity * dt;
                d.remaining -= dt;
                dashing = true;
            }
            if matches!(dash, Some(d) if d.remaining <= 0.0) {
                *dash = None;
            }
        }
        if !dashing {
            let dir = direction_to(body.pos, player_pos);
            body.pos += dir * body.speed * self.speed_scale * dt;
        }

        if !dashing {
            let dist = body.pos.distance(player_pos);
            if let Some(index) = self
                .patterns
                .iter()
                .position(|p| p.is_ready() && dist <= p.range)
            {
                let pattern = self.patterns[index].clone();
                self.patterns[index].timer = pattern.cooldown;
                self.fire(&pattern, body, player_pos, rng);
            }
        }
    }

    fn update_mechanic(&mut self, body: &Body, dt: f32, player_pos: Vec2) {
        match &mut self.mechanic {
            Mechanic::Necromancer {
                summon_timer,
                summon_interval,
            } => {
                *summon_timer -= dt;
                if *summon_timer <= 0.0 {
                    *summon_timer = *summon_interval;
                    for i in 0..4 {
                        let angle = i as f32 * std::f32::consts::FRAC_PI_2;
                        self.minions.push(point_on_circle(body.pos, SUMMON_RADIUS, angle));
                    }
                    self.events.push(BossEvent::MinionsSummoned(4));
                }
            }
            Mechanic::Vampire {
                life_steal_cooldown,
                life_steal_window,
                ..
            } => {
                if *life_steal_window > 0.0 {
                    *life_steal_window = (*life_steal_window - dt).max(0.0);
                } else {
                    *life_steal_cooldown -= dt;
                    if *life_steal_cooldown <= 0.0 {
                        *life_steal_cooldown = LIFE_STEAL_EVERY;
                        *life_steal_window = LIFE_STEAL_DURATION;
                    }
                }
            }
            Mechanic::Golem { shockwave, shield } => {
                if !shield.active {
                    shield.recharge -= dt;
                    if shield.recharge <= 0.0 {
                        shield.restore();
                        self.events.push(BossEvent::ShieldRestored);
                    }
                }
                if let Some(wave) = shockwave {
                    wave.radius = (wave.radius + SHOCKWAVE_GROWTH * dt).min(wave.max_radius);
                    if !wave.hit_player && wave.center.distance(player_pos) <= wave.radius {
                        wave.hit_player = true;
                        self.player_damage += wave.damage;
                    }
                    if wave.radius >= wave.max_radius {
                        *shockwave = None;
                    }
                }
            }
        }
    }

    fn fire(&mut self, pattern: &AttackPattern, body: &Body, player_pos: Vec2, rng: &mut Pcg32) {
        log::debug!("{} fires {:?}", self.archetype.name(), pattern.kind);
        let aim = direction_to(body.pos, player_pos);
        let aim = if aim == Vec2::ZERO { Vec2::X } else { aim };
        let base_angle = aim.y.atan2(aim.x);

        match pattern.kind {
            PatternKind::BoneVolley => {
                for i in -2..=2 {
                    let angle = base_angle + i as f32 * 0.2;
                    self.shoot(body.pos, Vec2::from_angle(angle) * 260.0, pattern.damage, 8.0);
                }
            }
            PatternKind::DeathNova => {
                let offset = rng.random_range(0.0..std::f32::consts::TAU);
                for i in 0..12 {
                    let angle = offset + i as f32 * std::f32::consts::TAU / 12.0;
                    self.shoot(body.pos, Vec2::from_angle(angle) * 180.0, pattern.damage, 10.0);
                }
            }
            PatternKind::Dash => {
                if let Mechanic::Vampire { dash, .. } = &mut self.mechanic {
                    *dash = Some(Dash {
                        velocity: aim * DASH_SPEED,
                        remaining: DASH_DURATION,
                        damage: pattern.damage,
                    });
                }
            }
            PatternKind::BloodBolt => {
                for i in 0..3 {
                    let speed = 280.0 + i as f32 * 30.0;
                    self.shoot(body.pos, aim * speed, pattern.damage, 8.0);
                }
            }
            PatternKind::GroundPound => {
                if let Mechanic::Golem { shockwave, .. } = &mut self.mechanic {
                    *shockwave = Some(Shockwave {
                        center: body.pos,
                        radius: 0.0,
                        max_radius: SHOCKWAVE_MAX_RADIUS,
                        damage: pattern.damage,
                        hit_player: false,
                    });
                }
            }
            PatternKind::RockThrow => {
                self.shoot(body.pos, aim * 240.0, pattern.damage, 20.0);
            }
        }
        self.events.push(BossEvent::PatternFired(pattern.kind));
    }

    fn shoot(&mut self, from: Vec2, vel: Vec2, damage: f32, size: f32) {
        self.projectiles.push(
            Projectile::new(Side::Enemy, from, vel, damage, 4.0).with_size(Vec2::splat(size)),
        );
    }

    fn enter_phase_two(&mut self) {
        log::info!("{} enters phase two", self.archetype.name());
        self.phase = BossPhase::Two;
        self.speed_scale = PHASE_TWO_SPEED_SCALE;
        for pattern in &mut self.patterns {
            pattern.cooldown *= PHASE_TWO_COOLDOWN_SCALE;
            pattern.timer = pattern.timer.min(pattern.cooldown);
        }
        match &mut self.mechanic {
            Mechanic::Necromancer {
                summon_interval,
                summon_timer,
            } => {
                *summon_interval *= SUMMON_SCALE_PHASE_TWO;
                *summon_timer = summon_timer.min(*summon_interval);
            }
            Mechanic::Vampire {
                life_steal_ratio, ..
            } => {
                *life_steal_ratio = LIFE_STEAL_RATIO_PHASE_TWO;
            }
            Mechanic::Golem { shield, .. } => {
                shield.restore();
                self.events.push(BossEvent::ShieldRestored);
            }
        }
        self.events.push(BossEvent::PhaseTwo);
    }
}
