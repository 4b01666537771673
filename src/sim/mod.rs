//! Frame-driven simulation module
//!
//! All gameplay logic lives here. This module stays free of I/O:
//! - Seeded RNG only (one `Pcg32` per run)
//! - Stable iteration order (insertion order, ids ascending)
//! - No rendering, audio or persistence dependencies

pub mod boss;
pub mod collectible;
pub mod collision;
pub mod combo;
pub mod effects;
pub mod enemy;
pub mod player;
pub mod projectile;
pub mod resolver;
pub mod snapshot;
pub mod state;
pub mod store;
pub mod tick;
pub mod wave;
pub mod weapons;

pub use boss::{Boss, BossArchetype, BossEvent, BossPhase};
pub use collectible::{Collectible, CollectibleKind, PowerUpKind};
pub use collision::{Aabb, Obstacles, Positioned, RectObstacles, distance, overlaps};
pub use combo::Combo;
pub use enemy::{DamageSource, Enemy, EnemyKind, SpawnRequest};
pub use player::{CharacterKind, Player, Upgrade};
pub use projectile::{Pierce, Projectile, Side};
pub use resolver::{Resolution, resolve_all};
pub use snapshot::RenderSnapshot;
pub use state::{Checkpoint, FieldBounds, GameEvent, GamePhase, Run, RunOutcome, RunStats};
pub use store::EntityStore;
pub use tick::{TickInput, tick};
pub use wave::{WaveEvent, WaveScheduler};
