//! Save/load persistence
//!
//! Features:
//! - Manual and checkpoint slots as versioned JSON snapshots
//! - Optional story/spell/ability sections (old saves still load)
//! - Checkpoints on a timer, skipped while the player is busy
//! - Unlock resync from story flags after every load

pub mod apply;
pub mod checkpoint;
pub mod error;
pub mod gateway;
pub mod manager;
pub mod snapshot;
pub mod summary;

pub use apply::{ApplyTargets, apply_save_data};
pub use checkpoint::{CheckpointDecision, CheckpointScheduler, RepeatingTimer};
pub use error::{SaveError, SaveResult};
pub use gateway::{SaveGateway, SaveSlot};
pub use manager::SaveManager;
pub use snapshot::{
    AbilitiesSnapshot, AttributesSnapshot, PlayerSnapshot, RawStatsSnapshot, SaveData,
    SaveSources, SpellsSnapshot, create_save_data,
};
pub use summary::{SaveSummary, format_date, format_playtime};
