//! Save slots on durable storage
//!
//! Two independent slots share one namespace: `<namespace>_save` for manual
//! saves and `<namespace>_checkpoint` for auto-checkpoints.

use super::error::{SaveError, SaveResult};
use super::snapshot::SaveData;
use crate::consts::{CHECKPOINT_SLOT_SUFFIX, MANUAL_SLOT_SUFFIX, SAVE_VERSION};
use crate::platform::SharedStorage;
use crate::storage_key;

/// Which save slot to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveSlot {
    /// Player-initiated save
    Manual,
    /// Automatic checkpoint
    Checkpoint,
}

impl SaveSlot {
    pub fn from_checkpoint_flag(is_checkpoint: bool) -> Self {
        if is_checkpoint {
            SaveSlot::Checkpoint
        } else {
            SaveSlot::Manual
        }
    }

    pub fn key_suffix(&self) -> &'static str {
        match self {
            SaveSlot::Manual => MANUAL_SLOT_SUFFIX,
            SaveSlot::Checkpoint => CHECKPOINT_SLOT_SUFFIX,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SaveSlot::Manual => "save",
            SaveSlot::Checkpoint => "checkpoint",
        }
    }
}

/// Reads and writes snapshots in their slots
pub struct SaveGateway {
    storage: SharedStorage,
    namespace: String,
}

impl SaveGateway {
    pub fn new(storage: SharedStorage, namespace: impl Into<String>) -> Self {
        Self {
            storage,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Storage key of a slot
    pub fn slot_key(&self, slot: SaveSlot) -> String {
        storage_key(&self.namespace, slot.key_suffix())
    }

    /// Serialize and write a snapshot
    pub fn write(&self, slot: SaveSlot, data: &SaveData) -> SaveResult<()> {
        let json = serde_json::to_string(data).map_err(SaveError::Serialize)?;
        self.storage.set_item(&self.slot_key(slot), &json)?;
        Ok(())
    }

    /// Write a snapshot, logging failures. Returns true on success.
    pub fn save_game(&self, slot: SaveSlot, data: &SaveData) -> bool {
        match self.write(slot, data) {
            Ok(()) => {
                log::info!("Game saved to {} slot (scene {})", slot.label(), data.scene);
                true
            }
            Err(e) => {
                log::error!("Failed to write {} slot: {}", slot.label(), e);
                false
            }
        }
    }

    /// Read and parse a slot. Absent is `Ok(None)`, not an error.
    pub fn read(&self, slot: SaveSlot) -> SaveResult<Option<SaveData>> {
        let Some(json) = self.storage.get_item(&self.slot_key(slot))? else {
            return Ok(None);
        };
        let data = serde_json::from_str(&json).map_err(SaveError::Parse)?;
        Ok(Some(data))
    }

    /// Load a slot; absent, unreadable or corrupt data all yield `None`
    ///
    /// A parseable save missing sections is returned as-is; the applier
    /// decides whether it is usable.
    pub fn load_game(&self, slot: SaveSlot) -> Option<SaveData> {
        match self.read(slot) {
            Ok(Some(data)) => {
                if !data.is_current_version() {
                    log::warn!(
                        "Loading {} slot written by version '{}' (current '{}')",
                        slot.label(),
                        data.version,
                        SAVE_VERSION
                    );
                }
                Some(data)
            }
            Ok(None) => None,
            Err(e) => {
                log::error!("Failed to load {} slot: {}", slot.label(), e);
                None
            }
        }
    }

    /// Whether a slot holds anything (not whether it parses)
    pub fn has_save_data(&self, slot: SaveSlot) -> bool {
        matches!(self.storage.get_item(&self.slot_key(slot)), Ok(Some(_)))
    }

    /// Remove exactly one slot. Deleting an empty slot is fine.
    pub fn delete_save(&self, slot: SaveSlot) {
        match self.storage.remove_item(&self.slot_key(slot)) {
            Ok(()) => log::info!("Deleted {} slot", slot.label()),
            Err(e) => log::error!("Failed to delete {} slot: {}", slot.label(), e),
        }
    }
}
