//! Capability unlocks (spells and abilities)

pub mod unlocks;

pub use unlocks::{
    ABILITY_CATALOG, SPELL_CATALOG, UnlockCatalog, UnlockGate, UnlockKind, UnlockRegistry,
};
