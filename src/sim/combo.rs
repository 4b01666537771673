//! Kill-streak accumulator

use serde::{Deserialize, Serialize};

use crate::consts::COMBO_WINDOW;

/// Slack for frame deltas that are not exact in binary (0.02, 1/60)
const WINDOW_EPSILON: f64 = 1e-4;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Combo {
    /// Lifetime kills for the run (never reset)
    pub kills: u32,
    /// Current streak
    pub count: u32,
    /// Seconds left before the streak drops
    pub timer: f32,
    /// Longest streak this run
    pub best: u32,
    /// Seconds since the last kill, accumulated in f64
    #[serde(default)]
    since_kill: f64,
}

impl Combo {
    pub fn register_kill(&mut self) {
        self.kills += 1;
        self.count += 1;
        self.best = self.best.max(self.count);
        self.timer = COMBO_WINDOW;
        self.since_kill = 0.0;
    }

    pub fn update(&mut self, dt: f32) {
        if self.count == 0 {
            return;
        }
        self.since_kill += f64::from(dt);
        let remaining = f64::from(COMBO_WINDOW) - self.since_kill;
        if remaining <= WINDOW_EPSILON {
            self.timer = 0.0;
            self.count = 0;
        } else {
            self.timer = remaining as f32;
        }
    }

    /// Score multiplier tier for the current streak
    pub fn multiplier(&self) -> f32 {
        match self.count {
            0..5 => 1.0,
            5..10 => 1.25,
            10..20 => 1.5,
            20..50 => 2.0,
            _ => 2.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplier_tiers() {
        let mut combo = Combo::default();
        let mut seen = Vec::new();
        for _ in 0..60 {
            combo.register_kill();
            seen.push((combo.count, combo.multiplier()));
        }
        assert_eq!(seen[3], (4, 1.0));
        assert_eq!(seen[4], (5, 1.25));
        assert_eq!(seen[9], (10, 1.5));
        assert_eq!(seen[19], (20, 2.0));
        assert_eq!(seen[48], (49, 2.0));
        assert_eq!(seen[49], (50, 2.5));
    }

    #[test]
    fn test_combo_decays_after_window() {
        let mut combo = Combo::default();
        combo.register_kill();
        // 0.25 is exact in binary, so twelve steps land on 3.0 precisely
        for _ in 0..11 {
            combo.update(0.25);
            assert!(combo.count > 0);
        }
        combo.update(0.25);
        assert_eq!(combo.count, 0);
        assert_eq!(combo.kills, 1);
        assert_eq!(combo.best, 1);
    }

    #[test]
    fn test_combo_decays_at_frame_rates() {
        for dt in [0.02f32, 1.0 / 60.0, 0.01] {
            let steps = (COMBO_WINDOW / dt).round() as usize;
            let mut combo = Combo::default();
            combo.register_kill();
            for step in 1..steps {
                combo.update(dt);
                assert!(combo.count > 0, "dt {dt}: dropped early at step {step}");
            }
            combo.update(dt);
            assert_eq!(combo.count, 0, "dt {dt}: still active after {steps} steps");
        }
    }

    #[test]
    fn test_kill_refreshes_window() {
        let mut combo = Combo::default();
        combo.register_kill();
        combo.update(2.5);
        combo.register_kill();
        combo.update(2.5);
        assert_eq!(combo.count, 2);
    }
}
