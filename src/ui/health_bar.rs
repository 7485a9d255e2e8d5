//! Player health bar widget state

/// Health bar shown above the player
#[derive(Debug, Clone, PartialEq)]
pub struct HealthBar {
    current: f64,
    max: f64,
}

impl HealthBar {
    pub fn new(current: f64, max: f64) -> Self {
        let max = max.max(1.0);
        Self {
            current: current.clamp(0.0, max),
            max,
        }
    }

    /// Show a new current health value (clamped to the bar range)
    pub fn update(&mut self, current: f64) {
        self.current = current.clamp(0.0, self.max);
    }

    pub fn set_max(&mut self, max: f64) {
        self.max = max.max(1.0);
        self.current = self.current.min(self.max);
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Fill ratio (0.0 - 1.0)
    pub fn fraction(&self) -> f32 {
        (self.current / self.max) as f32
    }
}
