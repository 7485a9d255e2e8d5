//! Story flag store
//!
//! Holds narrative markers and the player's recorded choices. Every
//! mutation is also written to its own storage key, independent of the
//! save slots, so narrative progress survives even without a manual save.

use std::collections::BTreeSet;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::cascade::{StoryEvent, cascades_for};
use super::markers;
use crate::consts::STORY_KEY_SUFFIX;
use crate::platform::{Clock, SharedStorage};
use crate::storage_key;

/// Story act, derived from markers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Act {
    One,
    Two,
    Three,
}

impl Act {
    pub fn number(&self) -> u8 {
        match self {
            Act::One => 1,
            Act::Two => 2,
            Act::Three => 3,
        }
    }
}

/// A decision the player made in dialogue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceRecord {
    pub id: String,
    pub description: String,
    /// Unix ms when the choice was made
    pub timestamp: f64,
    #[serde(default)]
    pub consequences: Vec<String>,
}

/// Serialized story state (the `story` section of a save)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorySnapshot {
    pub flags: Vec<String>,
    pub choices: Vec<ChoiceRecord>,
}

/// Narrative markers + choice history for one play session
pub struct StoryFlags {
    flags: BTreeSet<String>,
    choices: Vec<ChoiceRecord>,
    /// Cascade notifications not yet shown
    events: Vec<StoryEvent>,
    storage: SharedStorage,
    clock: Rc<dyn Clock>,
    key: String,
}

impl StoryFlags {
    /// Create the store, restoring whatever its storage key holds
    pub fn load(storage: SharedStorage, namespace: &str, clock: Rc<dyn Clock>) -> Self {
        let key = storage_key(namespace, STORY_KEY_SUFFIX);
        let mut store = Self {
            flags: BTreeSet::new(),
            choices: Vec::new(),
            events: Vec::new(),
            storage,
            clock,
            key,
        };

        match store.storage.get_item(&store.key) {
            Ok(Some(json)) => match serde_json::from_str::<StorySnapshot>(&json) {
                Ok(snapshot) => {
                    store.flags = snapshot.flags.into_iter().collect();
                    store.choices = snapshot.choices;
                    log::info!(
                        "Loaded story state ({} flags, {} choices)",
                        store.flags.len(),
                        store.choices.len()
                    );
                }
                Err(e) => log::error!("Ignoring corrupt story state at '{}': {}", store.key, e),
            },
            Ok(None) => log::info!("No story state found, starting fresh"),
            Err(e) => log::error!("Failed to read story state: {}", e),
        }

        store
    }

    /// Set a marker, firing any cascades it triggers
    pub fn set_flag(&mut self, marker: &str) {
        let mut pending = vec![marker.to_string()];
        let mut changed = false;

        while let Some(next) = pending.pop() {
            if self.flags.contains(&next) {
                continue;
            }
            for cascade in cascades_for(&next) {
                if self.flags.contains(cascade.derived) {
                    continue;
                }
                self.events.push(cascade.event);
                pending.push(cascade.derived.to_string());
            }
            log::debug!("Story flag set: {}", next);
            self.flags.insert(next);
            changed = true;
        }

        if changed {
            self.persist();
        }
    }

    pub fn has_flag(&self, marker: &str) -> bool {
        self.flags.contains(marker)
    }

    /// Copy of all markers (sorted)
    pub fn all_flags(&self) -> Vec<String> {
        self.flags.iter().cloned().collect()
    }

    /// Append a choice record stamped with the current time
    pub fn record_choice(&mut self, id: &str, description: &str, consequences: &[&str]) {
        self.choices.push(ChoiceRecord {
            id: id.to_string(),
            description: description.to_string(),
            timestamp: self.clock.now_ms(),
            consequences: consequences.iter().map(|c| c.to_string()).collect(),
        });
        self.persist();
    }

    /// Whether a choice with this id was ever recorded
    pub fn has_choice(&self, id: &str) -> bool {
        self.choices.iter().any(|c| c.id == id)
    }

    pub fn choices(&self) -> &[ChoiceRecord] {
        &self.choices
    }

    pub fn current_act(&self) -> Act {
        if self.has_flag(markers::ACT_3_STARTED) {
            Act::Three
        } else if self.has_flag(markers::ACT_2_STARTED) {
            Act::Two
        } else {
            Act::One
        }
    }

    /// Number of relic fragments collected (0-3)
    pub fn fragment_count(&self) -> usize {
        markers::FRAGMENTS
            .iter()
            .filter(|f| self.has_flag(f))
            .count()
    }

    /// Take pending cascade notifications
    pub fn drain_events(&mut self) -> Vec<StoryEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn to_snapshot(&self) -> StorySnapshot {
        StorySnapshot {
            flags: self.all_flags(),
            choices: self.choices.clone(),
        }
    }

    /// Replace all state with a snapshot's. Cascades are not re-run.
    pub fn restore(&mut self, snapshot: &StorySnapshot) {
        self.flags = snapshot.flags.iter().cloned().collect();
        self.choices = snapshot.choices.clone();
        self.events.clear();
        self.persist();
    }

    /// Forget everything (new game)
    pub fn reset(&mut self) {
        self.flags.clear();
        self.choices.clear();
        self.events.clear();
        self.persist();
    }

    /// Write to the story key; failures are logged and swallowed
    fn persist(&self) {
        let json = match serde_json::to_string(&self.to_snapshot()) {
            Ok(json) => json,
            Err(e) => {
                log::error!("Failed to serialize story state: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.set_item(&self.key, &json) {
            log::error!("Failed to persist story state: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{KeyValueStorage, ManualClock, MemoryStorage};
    use crate::story::markers::*;

    fn fresh(storage: &Rc<MemoryStorage>) -> StoryFlags {
        StoryFlags::load(storage.clone(), "test", Rc::new(ManualClock::new(1_000.0)))
    }

    #[test]
    fn test_set_flag_is_idempotent() {
        let storage = MemoryStorage::shared();
        let mut story = fresh(&storage);
        story.set_flag("met_elder");
        story.set_flag("met_elder");
        assert!(story.has_flag("met_elder"));
        assert_eq!(story.all_flags(), vec!["met_elder".to_string()]);
    }

    #[test]
    fn test_cascade_sets_derived_marker_and_event() {
        let storage = MemoryStorage::shared();
        let mut story = fresh(&storage);
        story.set_flag(BOSS_FROST_WARDEN_DEFEATED);

        assert!(story.has_flag(SPELL_ICE_LANCE_UNLOCKED));
        assert_eq!(
            story.drain_events(),
            vec![StoryEvent::SpellUnlocked { spell: "ice_lance" }]
        );
        assert!(story.drain_events().is_empty());

        // Already set: no second notification
        story.set_flag(BOSS_FROST_WARDEN_DEFEATED);
        assert!(story.drain_events().is_empty());
    }

    #[test]
    fn test_cascade_skips_event_for_known_marker() {
        let storage = MemoryStorage::shared();
        let mut story = fresh(&storage);
        story.set_flag(SPELL_ICE_LANCE_UNLOCKED);
        assert!(story.drain_events().is_empty());

        story.set_flag(BOSS_FROST_WARDEN_DEFEATED);
        assert!(story.has_flag(BOSS_FROST_WARDEN_DEFEATED));
        assert!(story.drain_events().is_empty());
    }

    #[test]
    fn test_failed_autosave_keeps_store_usable() {
        let storage = Rc::new(MemoryStorage::with_quota(0));
        let mut story = fresh(&storage);

        story.set_flag(BOSS_FROST_WARDEN_DEFEATED);
        story.record_choice("spare_bandit", "Let the bandit go", &[]);
        assert!(story.has_flag(SPELL_ICE_LANCE_UNLOCKED));
        assert!(story.has_choice("spare_bandit"));
        assert!(storage.is_empty());

        story.restore(&StorySnapshot {
            flags: vec![FRAGMENT_TIDE.to_string()],
            choices: vec![],
        });
        assert_eq!(story.all_flags(), vec![FRAGMENT_TIDE.to_string()]);
        assert!(!story.has_choice("spare_bandit"));
    }

    #[test]
    fn test_cascade_chains() {
        let storage = MemoryStorage::shared();
        let mut story = fresh(&storage);
        story.set_flag(BOSS_STORM_DRAKE_DEFEATED);

        assert!(story.has_flag(SPELL_CHAIN_LIGHTNING_UNLOCKED));
        assert!(story.has_flag(ACT_2_STARTED));
        assert_eq!(story.current_act(), Act::Two);
        assert_eq!(story.drain_events().len(), 2);
    }

    #[test]
    fn test_current_act_prefers_act_three() {
        let storage = MemoryStorage::shared();
        let mut story = fresh(&storage);
        assert_eq!(story.current_act(), Act::One);

        story.set_flag(ACT_3_STARTED);
        assert_eq!(story.current_act(), Act::Three);

        story.set_flag(ACT_2_STARTED);
        assert_eq!(story.current_act(), Act::Three);
        assert_eq!(story.current_act().number(), 3);
    }

    #[test]
    fn test_fragment_count() {
        let storage = MemoryStorage::shared();
        let mut story = fresh(&storage);
        assert_eq!(story.fragment_count(), 0);
        story.set_flag(FRAGMENT_TIDE);
        story.set_flag("fragment_fake");
        assert_eq!(story.fragment_count(), 1);
        story.set_flag(FRAGMENT_EMBER);
        story.set_flag(FRAGMENT_GALE);
        assert_eq!(story.fragment_count(), 3);
    }

    #[test]
    fn test_record_choice_uses_clock() {
        let storage = MemoryStorage::shared();
        let clock = ManualClock::new(5_000.0);
        let mut story = StoryFlags::load(storage.clone(), "test", Rc::new(clock.clone()));

        story.record_choice("spare_bandit", "Let the bandit go", &["bandit_ally"]);
        clock.advance(100.0);
        story.record_choice("take_relic", "Took the relic", &[]);

        assert!(story.has_choice("spare_bandit"));
        assert!(!story.has_choice("kill_bandit"));
        let choices = story.choices();
        assert_eq!(choices.len(), 2);
        assert_eq!(choices[0].timestamp, 5_000.0);
        assert_eq!(choices[0].consequences, vec!["bandit_ally".to_string()]);
        assert_eq!(choices[1].timestamp, 5_100.0);
    }

    #[test]
    fn test_mutations_persist_and_reload() {
        let storage = MemoryStorage::shared();
        {
            let mut story = fresh(&storage);
            story.set_flag(FRAGMENT_EMBER);
            story.record_choice("oath", "Swore the oath", &["knight_path"]);
        }
        assert!(storage.get_item("test_story").unwrap().is_some());

        let story = fresh(&storage);
        assert!(story.has_flag(FRAGMENT_EMBER));
        assert!(story.has_choice("oath"));
    }

    #[test]
    fn test_corrupt_autosave_is_ignored() {
        let storage = MemoryStorage::shared();
        storage.set_item("test_story", "{not json").unwrap();
        let story = fresh(&storage);
        assert!(story.all_flags().is_empty());
    }

    #[test]
    fn test_restore_replaces_state() {
        let storage = MemoryStorage::shared();
        let mut story = fresh(&storage);
        story.set_flag("old_marker");

        let snapshot = StorySnapshot {
            flags: vec![FRAGMENT_GALE.to_string(), FRAGMENT_GALE.to_string()],
            choices: vec![],
        };
        story.restore(&snapshot);

        assert!(!story.has_flag("old_marker"));
        assert_eq!(story.all_flags(), vec![FRAGMENT_GALE.to_string()]);
        assert_eq!(story.to_snapshot().flags.len(), 1);
    }

    #[test]
    fn test_snapshot_tolerates_missing_fields() {
        let snapshot: StorySnapshot = serde_json::from_str(r#"{"flags": ["a"]}"#).unwrap();
        assert_eq!(snapshot.flags, vec!["a".to_string()]);
        assert!(snapshot.choices.is_empty());
    }
}
