//! Player preferences and tunables
//!
//! Stored as JSON next to the save file, separately from run data.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::consts::STATS_SNAPSHOT_INTERVAL;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 100,
            QualityPreset::Medium => 400,
            QualityPreset::High => 1500,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Particle effects (hits, deaths, pickups)
    pub particles: bool,
    /// Floating damage numbers
    pub damage_numbers: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === Accessibility ===
    /// Reduced motion (fewer particles, no damage numbers)
    pub reduced_motion: bool,

    // === Run ===
    /// Seconds between crash-recovery snapshots
    pub snapshot_interval_secs: f32,
    /// Fixed seed for every run (random when unset)
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            particles: true,
            damage_numbers: true,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,

            reduced_motion: false,

            snapshot_interval_secs: STATS_SNAPSHOT_INTERVAL,
            seed: None,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset (applies preset defaults)
    pub fn from_preset(preset: QualityPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;

        // Low preset drops damage numbers for performance
        if preset == QualityPreset::Low {
            self.damage_numbers = false;
        }
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else if self.reduced_motion {
            QualityPreset::Low.max_particles()
        } else {
            self.quality.max_particles()
        }
    }

    /// Effective damage-number toggle (respects reduced_motion)
    pub fn show_damage_numbers(&self) -> bool {
        self.damage_numbers && !self.reduced_motion
    }

    /// Snapshot interval, falling back to the default for nonsense values
    pub fn snapshot_interval(&self) -> f32 {
        if self.snapshot_interval_secs.is_finite() && self.snapshot_interval_secs > 0.0 {
            self.snapshot_interval_secs
        } else {
            STATS_SNAPSHOT_INTERVAL
        }
    }

    /// Load settings from a JSON file, using defaults when missing or invalid
    pub fn load_from(path: &Path) -> Self {
        match Self::read(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(err) => {
                if path.exists() {
                    log::warn!("Ignoring settings file: {err:#}");
                } else {
                    log::info!("Using default settings");
                }
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> anyhow::Result<Self> {
        let json = fs::read_to_string(path).with_context(|| format!("failed reading {}", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("invalid settings {}", path.display()))
    }

    /// Save settings as pretty JSON
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).with_context(|| format!("failed creating {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("failed writing {}", path.display()))?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("swarmfall-settings-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_particle_cap() {
        let mut settings = Settings::from_preset(QualityPreset::High);
        assert_eq!(settings.max_particles(), 1500);
        settings.particles = false;
        assert_eq!(settings.max_particles(), 0);
    }

    #[test]
    fn test_low_preset_drops_damage_numbers() {
        let settings = Settings::from_preset(QualityPreset::Low);
        assert!(!settings.damage_numbers);
    }

    #[test]
    fn test_reduced_motion_tones_down_effects() {
        let settings = Settings {
            quality: QualityPreset::High,
            reduced_motion: true,
            ..Default::default()
        };
        assert_eq!(settings.max_particles(), QualityPreset::Low.max_particles());
        assert!(!settings.show_damage_numbers());
        assert!(Settings::default().show_damage_numbers());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let settings = Settings::load_from(&temp_path("missing.json"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("roundtrip.json");
        let settings = Settings {
            seed: Some(42),
            muted: true,
            ..Default::default()
        };
        settings.save_to(&path).expect("save");
        assert_eq!(Settings::load_from(&path), settings);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let path = temp_path("partial.json");
        fs::write(&path, r#"{ "quality": "Low" }"#).expect("write");
        let settings = Settings::load_from(&path);
        assert_eq!(settings.quality, QualityPreset::Low);
        assert!(settings.particles);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_invalid_snapshot_interval() {
        let settings = Settings {
            snapshot_interval_secs: -1.0,
            ..Default::default()
        };
        assert_eq!(settings.snapshot_interval(), STATS_SNAPSHOT_INTERVAL);
    }
}
