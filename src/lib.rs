//! Spellbound - save and progression persistence for a 2D RPG
//!
//! Core modules:
//! - `story`: Narrative flags, choice records, flag cascades
//! - `progression`: Spell and ability unlock registries
//! - `player`: The live player entity the save layer reads and writes
//! - `scene`: Scene host boundary (player lookup, scene transitions)
//! - `persistence`: Snapshots, save slots, applying saves, auto-checkpoints
//! - `platform`: Browser/native storage and time
//! - `settings`: Persisted save preferences
//! - `ui`: Toast notifications and the health bar widget

pub mod persistence;
pub mod platform;
pub mod player;
pub mod progression;
pub mod scene;
pub mod settings;
pub mod story;
pub mod ui;

pub use persistence::{SaveData, SaveManager, SaveSlot};
pub use player::{Attributes, ItemStack, Player, RawStats};
pub use progression::UnlockRegistry;
pub use scene::{SceneHost, SceneState};
pub use settings::Settings;
pub use story::StoryFlags;

/// Build constants for the save layer
pub mod consts {
    /// Schema version written into every snapshot
    pub const SAVE_VERSION: &str = "1.2.0";

    /// Default storage namespace (prefix of every storage key)
    pub const DEFAULT_NAMESPACE: &str = "spellbound";

    /// Key suffix for the manual save slot
    pub const MANUAL_SLOT_SUFFIX: &str = "save";
    /// Key suffix for the auto-checkpoint slot
    pub const CHECKPOINT_SLOT_SUFFIX: &str = "checkpoint";
    /// Key suffix for the story flags autosave
    pub const STORY_KEY_SUFFIX: &str = "story";
    /// Key suffix for the spell registry autosave
    pub const SPELLS_KEY_SUFFIX: &str = "spells";
    /// Key suffix for the ability registry autosave
    pub const ABILITIES_KEY_SUFFIX: &str = "abilities";
    /// Key suffix for persisted settings
    pub const SETTINGS_KEY_SUFFIX: &str = "settings";

    /// Auto-checkpoint interval (seconds)
    pub const CHECKPOINT_INTERVAL_SECS: f32 = 30.0;

    /// How long save/load toasts stay on screen (ms)
    pub const NOTIFICATION_DURATION_MS: f64 = 2_000.0;

    /// Name the player object is registered under in a scene
    pub const PLAYER_KEY: &str = "player";
}

/// Build a storage key under a namespace (`<namespace>_<suffix>`)
#[inline]
pub fn storage_key(namespace: &str, suffix: &str) -> String {
    format!("{}_{}", namespace, suffix)
}
