//! Enemy descriptors and behaviours
//!
//! Enemies are data-driven: a stat table keyed by [`EnemyKind`] plus a small
//! closed set of behaviour strategies ([`Behavior`]). Bosses are enemies whose
//! behaviour is a full state machine (see [`super::boss`]).

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::boss::{Boss, BossArchetype};
use super::collision::{Obstacles, Positioned, slide_move};
use super::projectile::{Projectile, Side};
use super::state::FieldBounds;
use crate::consts::MAX_SPLIT_DEPTH;
use crate::direction_to;

/// Enemy variant tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Basic,
    Fast,
    Tank,
    Flying,
    Ranged,
    Teleporting,
    Splitting,
    Shielded,
    Boss(BossArchetype),
}

/// Static stat row for a regular enemy kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyStats {
    pub speed: f32,
    pub health: f32,
    pub contact_damage: f32,
    pub score: u32,
    pub size: f32,
    /// Relative spawn weight
    pub weight: u32,
    /// First wave this kind may spawn in
    pub min_wave: u32,
}

const fn row(
    speed: f32,
    health: f32,
    contact_damage: f32,
    score: u32,
    size: f32,
    weight: u32,
    min_wave: u32,
) -> EnemyStats {
    EnemyStats {
        speed,
        health,
        contact_damage,
        score,
        size,
        weight,
        min_wave,
    }
}

const BASIC: EnemyStats = row(60.0, 2.0, 10.0, 10, 28.0, 40, 1);
const FAST: EnemyStats = row(120.0, 1.0, 6.0, 15, 22.0, 20, 2);
const TANK: EnemyStats = row(35.0, 8.0, 20.0, 30, 40.0, 10, 3);
const FLYING: EnemyStats = row(90.0, 2.0, 8.0, 20, 26.0, 15, 2);
const RANGED: EnemyStats = row(50.0, 3.0, 8.0, 25, 28.0, 12, 3);
const TELEPORTING: EnemyStats = row(70.0, 3.0, 12.0, 30, 28.0, 8, 4);
const SPLITTING: EnemyStats = row(55.0, 4.0, 10.0, 20, 34.0, 10, 4);
const SHIELDED: EnemyStats = row(45.0, 5.0, 12.0, 35, 32.0, 8, 5);

impl EnemyKind {
    /// Every kind the wave scheduler may pick, in table order
    pub const SPAWNABLE: [EnemyKind; 8] = [
        EnemyKind::Basic,
        EnemyKind::Fast,
        EnemyKind::Tank,
        EnemyKind::Flying,
        EnemyKind::Ranged,
        EnemyKind::Teleporting,
        EnemyKind::Splitting,
        EnemyKind::Shielded,
    ];

    /// Stat row for this kind. Bosses carry their own stats and read as basic here.
    pub fn stats(self) -> &'static EnemyStats {
        match self {
            EnemyKind::Basic => &BASIC,
            EnemyKind::Fast => &FAST,
            EnemyKind::Tank => &TANK,
            EnemyKind::Flying => &FLYING,
            EnemyKind::Ranged => &RANGED,
            EnemyKind::Teleporting => &TELEPORTING,
            EnemyKind::Splitting => &SPLITTING,
            EnemyKind::Shielded => &SHIELDED,
            EnemyKind::Boss(_) => &BASIC,
        }
    }

    pub fn is_boss(self) -> bool {
        matches!(self, EnemyKind::Boss(_))
    }

    /// Animation/variant tag for the renderer
    pub fn tag(self) -> &'static str {
        match self {
            EnemyKind::Basic => "basic",
            EnemyKind::Fast => "fast",
            EnemyKind::Tank => "tank",
            EnemyKind::Flying => "flying",
            EnemyKind::Ranged => "ranged",
            EnemyKind::Teleporting => "teleporting",
            EnemyKind::Splitting => "splitting",
            EnemyKind::Shielded => "shielded",
            EnemyKind::Boss(arch) => arch.tag(),
        }
    }
}

/// Where damage came from (bosses treat their own hazards differently)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageSource {
    Projectile,
    Contact,
    Companion,
    Weapon,
    Boss,
}

/// Request to create an enemy; the entity store assigns ids
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnRequest {
    pub kind: EnemyKind,
    pub pos: Vec2,
    /// Wave the enemy belongs to (health scaling)
    pub wave: u32,
    pub split_depth: u8,
}

impl SpawnRequest {
    pub fn new(kind: EnemyKind, pos: Vec2, wave: u32) -> Self {
        Self {
            kind,
            pos,
            wave,
            split_depth: 0,
        }
    }
}

/// Physical state shared by every enemy (bosses included)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub size: Vec2,
    pub hitbox: Option<Vec2>,
    pub speed: f32,
    pub health: f32,
    pub max_health: f32,
    pub contact_damage: f32,
}

impl Body {
    /// Subtract health (clamped to [0, max]); returns the amount actually removed
    pub fn apply_damage(&mut self, amount: f32) -> f32 {
        let before = self.health;
        self.health = (self.health - amount.max(0.0)).clamp(0.0, self.max_health);
        before - self.health
    }

    /// Restore health; a dead body stays dead
    pub fn heal(&mut self, amount: f32) {
        if self.health > 0.0 {
            self.health = (self.health + amount.max(0.0)).clamp(0.0, self.max_health);
        }
    }

    pub fn health_ratio(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            self.health / self.max_health
        }
    }

    pub fn hitbox_size(&self) -> Vec2 {
        self.hitbox.unwrap_or(self.size)
    }
}

/// Per-kind behaviour strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Behavior {
    /// Walk straight at the player
    Chase,
    /// Sine-wobbling flight, ignores terrain
    Flying { wobble: f32 },
    /// Keep distance, telegraph, then fire at the player
    Ranged { cooldown: f32, telegraph: Option<f32> },
    /// Chase, periodically blink next to the player
    Teleport { timer: f32 },
    /// Chase; splits into two smaller copies on death
    Split { depth: u8 },
    /// Chase with a cycling invulnerability shield
    Shield { timer: f32, active: bool },
    /// Full boss state machine
    Boss(Box<Boss>),
}

/// Per-frame context handed to enemy updates
pub struct EnemyContext<'a> {
    pub rng: &'a mut Pcg32,
    pub field: FieldBounds,
    pub obstacles: Option<&'a dyn Obstacles>,
}

const RANGED_FIRE_INTERVAL: f32 = 2.5;
const RANGED_TELEGRAPH: f32 = 0.6;
const RANGED_PREFERRED_DIST: f32 = 220.0;
const RANGED_SHOT_SPEED: f32 = 220.0;
const RANGED_SHOT_DAMAGE: f32 = 8.0;
const TELEPORT_INTERVAL: f32 = 3.5;
const TELEPORT_DISTANCE: f32 = 160.0;
const SHIELD_UP: f32 = 2.0;
const SHIELD_DOWN: f32 = 3.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub body: Body,
    pub score_value: u32,
    pub behavior: Behavior,
    /// Projectiles fired this frame, drained by the entity store
    #[serde(skip)]
    shots: Vec<Projectile>,
    /// Set once the split children have been released
    #[serde(default)]
    pub split_resolved: bool,
}

impl Enemy {
    /// Build a regular enemy from its stat row
    pub fn new(id: u32, request: &SpawnRequest) -> Self {
        let stats = request.kind.stats();
        let wave_scale = 1.0 + 0.1 * request.wave.saturating_sub(1) as f32;
        let depth = request.split_depth.min(MAX_SPLIT_DEPTH);
        let depth_scale = 0.5f32.powi(depth as i32);
        let size_scale = 0.75f32.powi(depth as i32);

        let health = (stats.health * wave_scale * depth_scale).max(1.0);
        let size = Vec2::splat(stats.size * size_scale);

        let behavior = match request.kind {
            EnemyKind::Flying => Behavior::Flying { wobble: 0.0 },
            EnemyKind::Ranged => Behavior::Ranged {
                cooldown: RANGED_FIRE_INTERVAL,
                telegraph: None,
            },
            EnemyKind::Teleporting => Behavior::Teleport {
                timer: TELEPORT_INTERVAL,
            },
            EnemyKind::Splitting => Behavior::Split { depth },
            EnemyKind::Shielded => Behavior::Shield {
                timer: SHIELD_UP,
                active: true,
            },
            _ => Behavior::Chase,
        };

        Self {
            id,
            kind: request.kind,
            body: Body {
                pos: request.pos,
                size,
                hitbox: Some(size * 0.75),
                speed: stats.speed,
                health,
                max_health: health,
                contact_damage: stats.contact_damage,
            },
            score_value: stats.score,
            behavior,
            shots: Vec::new(),
            split_resolved: false,
        }
    }

    /// Build a boss enemy
    pub fn boss(id: u32, archetype: BossArchetype, pos: Vec2, wave: u32) -> Self {
        let (boss, body) = Boss::spawn(archetype, pos, wave);
        Self {
            id,
            kind: EnemyKind::Boss(archetype),
            body,
            score_value: archetype.score_value(),
            behavior: Behavior::Boss(Box::new(boss)),
            shots: Vec::new(),
            split_resolved: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.body.health > 0.0
    }

    pub fn is_boss(&self) -> bool {
        self.kind.is_boss()
    }

    pub fn boss_state(&self) -> Option<&Boss> {
        match &self.behavior {
            Behavior::Boss(boss) => Some(boss),
            _ => None,
        }
    }

    pub fn boss_state_mut(&mut self) -> Option<&mut Boss> {
        match &mut self.behavior {
            Behavior::Boss(boss) => Some(boss),
            _ => None,
        }
    }

    /// True while a shield blocks all incoming hits
    pub fn blocks_damage(&self) -> bool {
        matches!(self.behavior, Behavior::Shield { active: true, .. })
    }

    /// Contact damage right now (bosses hit harder mid-dash)
    pub fn contact_damage(&self) -> f32 {
        match &self.behavior {
            Behavior::Boss(boss) => boss.contact_damage(&self.body),
            _ => self.body.contact_damage,
        }
    }

    /// Apply damage; returns the health actually removed
    pub fn take_damage(&mut self, amount: f32, source: DamageSource) -> f32 {
        if !self.is_alive() {
            return 0.0;
        }
        match &mut self.behavior {
            Behavior::Boss(boss) => boss.take_damage(&mut self.body, amount, source),
            Behavior::Shield { active: true, .. } => 0.0,
            _ => self.body.apply_damage(amount),
        }
    }

    /// Small positional shove (contact knockback)
    pub fn push(&mut self, delta: Vec2) {
        if matches!(&self.behavior, Behavior::Boss(b) if b.is_transitioning()) {
            return;
        }
        self.body.pos += delta;
    }

    /// Take everything fired since the last drain
    pub fn drain_projectiles(&mut self) -> Vec<Projectile> {
        let mut shots = std::mem::take(&mut self.shots);
        if let Behavior::Boss(boss) = &mut self.behavior {
            shots.extend(boss.drain_projectiles());
        }
        shots
    }

    /// Children produced by a dead splitting enemy (empty at max depth)
    pub fn split_children(&self, wave: u32) -> Vec<SpawnRequest> {
        let Behavior::Split { depth } = self.behavior else {
            return Vec::new();
        };
        if self.is_alive() || depth >= MAX_SPLIT_DEPTH {
            return Vec::new();
        }
        let offset = self.body.size.x * 0.4;
        [-1.0f32, 1.0]
            .iter()
            .map(|side| SpawnRequest {
                kind: EnemyKind::Splitting,
                pos: self.body.pos + Vec2::new(offset * side, 0.0),
                wave,
                split_depth: depth + 1,
            })
            .collect()
    }

    /// Advance movement and behaviour by `dt`
    pub fn update(&mut self, dt: f32, player_pos: Vec2, ctx: &mut EnemyContext<'_>) {
        if !self.is_alive() {
            return;
        }

        let to_player = direction_to(self.body.pos, player_pos);
        let dist = self.body.pos.distance(player_pos);
        let speed = self.body.speed;

        match &mut self.behavior {
            Behavior::Chase | Behavior::Split { .. } => {
                walk(&mut self.body, to_player * speed * dt, ctx.obstacles);
            }
            Behavior::Flying { wobble } => {
                *wobble += dt * 4.0;
                let side = to_player.perp() * wobble.sin() * 0.6;
                // Flyers ignore terrain
                self.body.pos += (to_player + side).normalize_or_zero() * speed * dt;
            }
            Behavior::Ranged {
                cooldown,
                telegraph,
            } => {
                if let Some(remaining) = telegraph {
                    *remaining -= dt;
                    if *remaining <= 0.0 {
                        *telegraph = None;
                        *cooldown = RANGED_FIRE_INTERVAL;
                        self.shots.push(Projectile::new(
                            Side::Enemy,
                            self.body.pos,
                            to_player * RANGED_SHOT_SPEED,
                            RANGED_SHOT_DAMAGE,
                            4.0,
                        ));
                    }
                } else {
                    let step = if dist > RANGED_PREFERRED_DIST + 40.0 {
                        to_player
                    } else if dist < RANGED_PREFERRED_DIST - 40.0 {
                        -to_player
                    } else {
                        Vec2::ZERO
                    };
                    walk(&mut self.body, step * speed * dt, ctx.obstacles);

                    *cooldown -= dt;
                    if *cooldown <= 0.0 {
                        *telegraph = Some(RANGED_TELEGRAPH);
                    }
                }
            }
            Behavior::Teleport { timer } => {
                *timer -= dt;
                if *timer <= 0.0 {
                    *timer = TELEPORT_INTERVAL;
                    let angle = ctx.rng.random_range(0.0..std::f32::consts::TAU);
                    let target = player_pos + Vec2::from_angle(angle) * TELEPORT_DISTANCE;
                    self.body.pos = ctx.field.clamp(target, self.body.size * 0.5);
                } else {
                    walk(&mut self.body, to_player * speed * dt, ctx.obstacles);
                }
            }
            Behavior::Shield { timer, active } => {
                *timer -= dt;
                if *timer <= 0.0 {
                    *active = !*active;
                    *timer = if *active { SHIELD_UP } else { SHIELD_DOWN };
                }
                walk(&mut self.body, to_player * speed * dt, ctx.obstacles);
            }
            Behavior::Boss(boss) => {
                boss.update(&mut self.body, dt, player_pos, ctx.rng);
            }
        }
    }
}

fn walk(body: &mut Body, delta: Vec2, obstacles: Option<&dyn Obstacles>) {
    body.pos = slide_move(body.pos, body.hitbox_size(), delta, obstacles);
}

impl Positioned for Enemy {
    fn position(&self) -> Vec2 {
        self.body.pos
    }
    fn size(&self) -> Vec2 {
        self.body.size
    }
    fn collision_size(&self) -> Option<Vec2> {
        self.body.hitbox
    }
}
