//! Audio cue mapping
//!
//! The simulation only emits [`GameEvent`]s. This module turns them into
//! sound cues and hands those to whatever backend the host provides.

use crate::settings::Settings;
use crate::sim::{GameEvent, PowerUpKind};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Projectile connects
    Hit,
    /// Shot bounces off an active shield
    Deflect,
    /// Regular enemy dies
    EnemyDeath,
    /// Boss dies
    BossDeath,
    PlayerHurt,
    PlayerDeath,
    /// Orb or loot collected
    Pickup,
    PowerUp,
    LevelUp,
    /// New wave begins
    WaveStart,
    BossWarning,
    /// Boss enters its second phase
    BossRoar,
    ShieldBreak,
    /// Menu confirm (run start, upgrade pick)
    Confirm,
}

impl SoundEffect {
    /// Cue for a simulation event, if it has one
    pub fn from_event(event: &GameEvent) -> Option<Self> {
        let cue = match event {
            GameEvent::RunStarted(_) | GameEvent::UpgradeChosen(_) => SoundEffect::Confirm,
            GameEvent::WaveStarted(_) => SoundEffect::WaveStart,
            GameEvent::Hit { .. } => SoundEffect::Hit,
            GameEvent::Deflect { .. } => SoundEffect::Deflect,
            GameEvent::EnemyKilled { .. } => SoundEffect::EnemyDeath,
            GameEvent::PlayerHurt { .. } => SoundEffect::PlayerHurt,
            GameEvent::PlayerDied => SoundEffect::PlayerDeath,
            GameEvent::ExperienceCollected(_) | GameEvent::LootCollected { .. } => SoundEffect::Pickup,
            GameEvent::PowerUpCollected(PowerUpKind::Heal) => SoundEffect::Pickup,
            GameEvent::PowerUpCollected(_) => SoundEffect::PowerUp,
            GameEvent::LevelUp(_) => SoundEffect::LevelUp,
            GameEvent::BossWarning(_) => SoundEffect::BossWarning,
            GameEvent::BossPhaseChanged(_) => SoundEffect::BossRoar,
            GameEvent::BossShieldBroken => SoundEffect::ShieldBreak,
            GameEvent::BossDefeated { .. } => SoundEffect::BossDeath,
            GameEvent::Paused
            | GameEvent::Resumed
            | GameEvent::MuteToggled(_)
            | GameEvent::BossSpawned(_) => return None,
        };
        Some(cue)
    }
}

/// Fire-and-forget receiver of simulation events (audio, UI, analytics)
pub trait EventSink {
    fn notify(&mut self, event: &GameEvent);
}

/// Whatever actually makes noise
pub trait AudioBackend {
    fn play(&mut self, effect: SoundEffect, volume: f32);
}

/// Backend that drops every cue (headless runs)
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentBackend;

impl AudioBackend for SilentBackend {
    fn play(&mut self, _effect: SoundEffect, _volume: f32) {}
}

/// Audio manager for the game
#[derive(Debug)]
pub struct AudioManager<B: AudioBackend> {
    backend: B,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl<B: AudioBackend> AudioManager<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    pub fn from_settings(backend: B, settings: &Settings) -> Self {
        let mut manager = Self::new(backend);
        manager.set_master_volume(settings.master_volume);
        manager.set_sfx_volume(settings.sfx_volume);
        manager.set_muted(settings.muted);
        manager
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        self.backend.play(effect, vol);
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: AudioBackend> EventSink for AudioManager<B> {
    fn notify(&mut self, event: &GameEvent) {
        if let GameEvent::MuteToggled(muted) = event {
            self.set_muted(*muted);
            return;
        }
        if let Some(effect) = SoundEffect::from_event(event) {
            self.play(effect);
        }
    }
}
