//! Swarmfall - a top-down survival-combat simulation core
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (entities, waves, bosses, collisions, run state)
//! - `game_loop`: Frame pump with clamped delta time
//! - `persistence`: Cross-run currency, unlocks and statistics
//! - `settings`: Player preferences and tunables
//! - `audio`: Event-to-cue mapping for the audio collaborator
//! - `session`: Run plus persistence and event sinks, as a host drives it

pub mod audio;
pub mod game_loop;
pub mod highscores;
pub mod persistence;
pub mod session;
pub mod settings;
pub mod sim;

pub use game_loop::{FrameScheduler, GameLoop, ManualScheduler};
pub use highscores::HighScores;
pub use session::Session;
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Hard cap on a single frame's delta time (seconds)
    pub const MAX_FRAME_DT: f32 = 0.02;
    /// Replacement for non-finite or negative delta times
    pub const FALLBACK_DT: f32 = 1.0 / 60.0;

    /// Default play-field size (host may resize every frame)
    pub const DEFAULT_FIELD_WIDTH: f32 = 1280.0;
    pub const DEFAULT_FIELD_HEIGHT: f32 = 720.0;

    /// Player defaults
    pub const PLAYER_SPEED: f32 = 200.0;
    pub const PLAYER_MAX_HEALTH: f32 = 100.0;
    pub const PLAYER_SIZE: f32 = 32.0;
    pub const PLAYER_HITBOX: (f32, f32) = (20.0, 24.0);
    /// Invulnerability after taking a hit
    pub const PLAYER_HURT_GRACE: f32 = 0.5;

    /// Waves
    pub const WAVE_DURATION: f32 = 30.0;
    pub const INITIAL_SPAWN_INTERVAL: f32 = 2.0;
    pub const SPAWN_INTERVAL_DECAY: f32 = 0.95;
    pub const MIN_SPAWN_INTERVAL: f32 = 0.5;
    pub const BASE_WAVE_QUOTA: u32 = 10;
    pub const WAVE_QUOTA_GROWTH: u32 = 5;
    pub const SPAWN_EDGE_MARGIN: f32 = 40.0;
    pub const BOSS_WAVE_INTERVAL: u32 = 5;
    pub const BOSS_WARNING_DELAY: f32 = 3.0;

    /// Combo
    pub const COMBO_WINDOW: f32 = 3.0;

    /// Collisions
    pub const CONTACT_KNOCKBACK: f32 = 10.0;

    /// Collectibles
    pub const ORB_LIFETIME: f32 = 30.0;
    pub const POWER_UP_LIFETIME: f32 = 15.0;
    pub const COLLECT_RADIUS: f32 = 24.0;
    pub const ATTRACT_RADIUS: f32 = 120.0;
    pub const ATTRACT_SPEED: f32 = 320.0;
    pub const POWER_UP_DROP_CHANCE: f64 = 0.04;

    /// Enemies
    pub const MAX_SPLIT_DEPTH: u8 = 2;

    /// Boss
    pub const BOSS_PHASE_THRESHOLD: f32 = 0.5;
    pub const BOSS_TRANSITION_DURATION: f32 = 1.5;
    pub const PHASE_TWO_COOLDOWN_SCALE: f32 = 0.7;
    pub const PHASE_TWO_SPEED_SCALE: f32 = 1.3;

    /// Orchestrator
    pub const STATS_SNAPSHOT_INTERVAL: f32 = 30.0;
}

/// Sanitize a raw frame delta (seconds): non-finite or negative values fall back
/// to a fixed step, everything else is capped at `MAX_FRAME_DT`.
#[inline]
pub fn sanitize_dt(dt: f32) -> f32 {
    if !dt.is_finite() || dt < 0.0 {
        log::warn!("invalid frame delta {dt}, using fallback");
        return consts::FALLBACK_DT;
    }
    dt.min(consts::MAX_FRAME_DT)
}

/// Unit vector pointing from `from` to `to`, or zero when they coincide
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}

/// Point on a circle of `radius` around `center` at `angle` radians
#[inline]
pub fn point_on_circle(center: Vec2, radius: f32, angle: f32) -> Vec2 {
    center + Vec2::from_angle(angle) * radius
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_dt() {
        assert_eq!(sanitize_dt(0.01), 0.01);
        assert_eq!(sanitize_dt(0.5), consts::MAX_FRAME_DT);
        assert_eq!(sanitize_dt(f32::NAN), consts::FALLBACK_DT);
        assert_eq!(sanitize_dt(f32::INFINITY), consts::FALLBACK_DT);
        assert_eq!(sanitize_dt(-1.0), consts::FALLBACK_DT);
    }

    #[test]
    fn test_point_on_circle() {
        let p = point_on_circle(Vec2::new(10.0, 10.0), 5.0, 0.0);
        assert!((p - Vec2::new(15.0, 10.0)).length() < 0.001);
    }
}
