//! Save preferences
//!
//! Persisted under their own storage key, separate from game saves.

use serde::{Deserialize, Serialize};

use crate::consts::{CHECKPOINT_INTERVAL_SECS, NOTIFICATION_DURATION_MS, SETTINGS_KEY_SUFFIX};
use crate::platform::KeyValueStorage;
use crate::storage_key;

/// Auto-checkpoint frequency presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CheckpointFrequency {
    Relaxed,
    #[default]
    Normal,
    Frequent,
}

impl CheckpointFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckpointFrequency::Relaxed => "Relaxed",
            CheckpointFrequency::Normal => "Normal",
            CheckpointFrequency::Frequent => "Frequent",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "relaxed" | "slow" => Some(CheckpointFrequency::Relaxed),
            "normal" => Some(CheckpointFrequency::Normal),
            "frequent" | "fast" => Some(CheckpointFrequency::Frequent),
            _ => None,
        }
    }

    /// Checkpoint interval for this preset (seconds)
    pub fn interval_secs(&self) -> f32 {
        match self {
            CheckpointFrequency::Relaxed => CHECKPOINT_INTERVAL_SECS * 2.0,
            CheckpointFrequency::Normal => CHECKPOINT_INTERVAL_SECS,
            CheckpointFrequency::Frequent => CHECKPOINT_INTERVAL_SECS / 2.0,
        }
    }
}

/// Save-related settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Write auto-checkpoints
    pub auto_save: bool,
    pub checkpoint_frequency: CheckpointFrequency,
    /// Seconds between checkpoints
    pub checkpoint_interval_secs: f32,

    // === Notifications ===
    /// Show save/load toasts
    pub show_notifications: bool,
    /// Toast lifetime (ms)
    pub notification_duration_ms: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_save: true,
            checkpoint_frequency: CheckpointFrequency::Normal,
            checkpoint_interval_secs: CHECKPOINT_INTERVAL_SECS,
            show_notifications: true,
            notification_duration_ms: NOTIFICATION_DURATION_MS,
        }
    }
}

impl Settings {
    /// Apply a frequency preset (updates the interval)
    pub fn apply_frequency(&mut self, frequency: CheckpointFrequency) {
        self.checkpoint_frequency = frequency;
        self.checkpoint_interval_secs = frequency.interval_secs();
    }

    /// Checkpoint interval in ms
    pub fn checkpoint_interval_ms(&self) -> f64 {
        self.checkpoint_interval_secs as f64 * 1000.0
    }

    /// Load settings, falling back to defaults when missing or corrupt
    pub fn load(storage: &dyn KeyValueStorage, namespace: &str) -> Self {
        let key = storage_key(namespace, SETTINGS_KEY_SUFFIX);
        if let Ok(Some(json)) = storage.get_item(&key) {
            match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from storage");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring corrupt settings: {}", e),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    pub fn save(&self, storage: &dyn KeyValueStorage, namespace: &str) {
        let key = storage_key(namespace, SETTINGS_KEY_SUFFIX);
        match serde_json::to_string(self) {
            Ok(json) => match storage.set_item(&key, &json) {
                Ok(()) => log::info!("Settings saved"),
                Err(e) => log::error!("Failed to save settings: {}", e),
            },
            Err(e) => log::error!("Failed to serialize settings: {}", e),
        }
    }
}
