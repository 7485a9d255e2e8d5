//! Unlock registries
//!
//! Spells and abilities share one registry shape; a catalog supplies the
//! built-in defaults, which story markers gate which capability, and the
//! storage key the registry autosaves to.

use std::collections::BTreeSet;

use crate::consts::{ABILITIES_KEY_SUFFIX, SPELLS_KEY_SUFFIX};
use crate::platform::SharedStorage;
use crate::story::markers;
use crate::storage_key;

/// Which kind of capability a registry tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockKind {
    Spell,
    Ability,
}

impl UnlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnlockKind::Spell => "spell",
            UnlockKind::Ability => "ability",
        }
    }
}

/// A capability granted once a story marker is present
#[derive(Debug, Clone, Copy)]
pub struct UnlockGate {
    pub capability: &'static str,
    pub marker: &'static str,
}

/// Static description of a registry
#[derive(Debug)]
pub struct UnlockCatalog {
    pub kind: UnlockKind,
    pub key_suffix: &'static str,
    /// Always unlocked, never persisted
    pub defaults: &'static [&'static str],
    pub gates: &'static [UnlockGate],
}

pub static SPELL_CATALOG: UnlockCatalog = UnlockCatalog {
    kind: UnlockKind::Spell,
    key_suffix: SPELLS_KEY_SUFFIX,
    defaults: &["fireball", "mend"],
    gates: &[
        UnlockGate {
            capability: "ice_lance",
            marker: markers::SPELL_ICE_LANCE_UNLOCKED,
        },
        UnlockGate {
            capability: "chain_lightning",
            marker: markers::SPELL_CHAIN_LIGHTNING_UNLOCKED,
        },
        UnlockGate {
            capability: "meteor",
            marker: markers::ACT_3_STARTED,
        },
    ],
};

pub static ABILITY_CATALOG: UnlockCatalog = UnlockCatalog {
    kind: UnlockKind::Ability,
    key_suffix: ABILITIES_KEY_SUFFIX,
    defaults: &[],
    gates: &[
        UnlockGate {
            capability: "dash",
            marker: markers::SHRINE_WIND_CLEANSED,
        },
        UnlockGate {
            capability: "double_jump",
            marker: markers::ZEPHYR_BOOTS_FOUND,
        },
        UnlockGate {
            capability: "wall_climb",
            marker: markers::ACT_2_STARTED,
        },
    ],
};

/// Set of unlocked capability ids for one play session
pub struct UnlockRegistry {
    catalog: &'static UnlockCatalog,
    unlocked: BTreeSet<String>,
    storage: SharedStorage,
    key: String,
}

impl UnlockRegistry {
    /// Spell registry (starts with the default spells)
    pub fn spells(storage: SharedStorage, namespace: &str) -> Self {
        Self::load(&SPELL_CATALOG, storage, namespace)
    }

    /// Ability registry (starts empty)
    pub fn abilities(storage: SharedStorage, namespace: &str) -> Self {
        Self::load(&ABILITY_CATALOG, storage, namespace)
    }

    /// Create a registry, restoring whatever its storage key holds
    pub fn load(catalog: &'static UnlockCatalog, storage: SharedStorage, namespace: &str) -> Self {
        let key = storage_key(namespace, catalog.key_suffix);
        let mut registry = Self {
            catalog,
            unlocked: BTreeSet::new(),
            storage,
            key,
        };

        match registry.storage.get_item(&registry.key) {
            Ok(Some(json)) => match serde_json::from_str::<Vec<String>>(&json) {
                Ok(ids) => registry.unlocked.extend(ids),
                Err(e) => log::error!(
                    "Ignoring corrupt {} unlocks at '{}': {}",
                    catalog.kind.as_str(),
                    registry.key,
                    e
                ),
            },
            Ok(None) => {}
            Err(e) => log::error!("Failed to read {} unlocks: {}", catalog.kind.as_str(), e),
        }
        registry.add_defaults();

        registry
    }

    pub fn kind(&self) -> UnlockKind {
        self.catalog.kind
    }

    /// Unlock a capability. Returns true if it was newly unlocked.
    pub fn unlock(&mut self, id: &str) -> bool {
        if !self.unlocked.insert(id.to_string()) {
            return false;
        }
        log::info!("Unlocked {}: {}", self.catalog.kind.as_str(), id);
        self.persist();
        true
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked.contains(id)
    }

    pub fn unlocked_count(&self) -> usize {
        self.unlocked.len()
    }

    /// Unlocked ids (sorted)
    pub fn unlocked(&self) -> Vec<String> {
        self.unlocked.iter().cloned().collect()
    }

    /// Grant every gated capability whose marker is present. Never removes.
    ///
    /// Returns how many capabilities were newly unlocked.
    pub fn sync_with_story_flags(&mut self, flags: &[String]) -> usize {
        let mut granted = 0;
        for gate in self.catalog.gates {
            if flags.iter().any(|f| f == gate.marker)
                && self.unlocked.insert(gate.capability.to_string())
            {
                log::info!(
                    "Granted {} '{}' from story marker '{}'",
                    self.catalog.kind.as_str(),
                    gate.capability,
                    gate.marker
                );
                granted += 1;
            }
        }
        if granted > 0 {
            self.persist();
        }
        granted
    }

    /// Serialized form: the unlocked ids, without the implicit defaults
    pub fn to_snapshot(&self) -> Vec<String> {
        self.unlocked
            .iter()
            .filter(|id| !self.catalog.defaults.contains(&id.as_str()))
            .cloned()
            .collect()
    }

    /// Replace the unlocked set with exactly `ids` (plus the defaults)
    pub fn restore(&mut self, ids: &[String]) {
        self.unlocked = ids.iter().cloned().collect();
        self.add_defaults();
        self.persist();
    }

    /// Back to the built-in defaults (new game)
    pub fn reset(&mut self) {
        self.unlocked.clear();
        self.add_defaults();
        self.persist();
    }

    fn add_defaults(&mut self) {
        self.unlocked
            .extend(self.catalog.defaults.iter().map(|d| d.to_string()));
    }

    /// Write to the registry key; failures are logged and swallowed
    fn persist(&self) {
        let json = match serde_json::to_string(&self.to_snapshot()) {
            Ok(json) => json,
            Err(e) => {
                log::error!("Failed to serialize {} unlocks: {}", self.catalog.kind.as_str(), e);
                return;
            }
        };
        if let Err(e) = self.storage.set_item(&self.key, &json) {
            log::error!("Failed to persist {} unlocks: {}", self.catalog.kind.as_str(), e);
        }
    }
}
