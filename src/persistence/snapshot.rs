//! Save snapshot format and builder
//!
//! A snapshot is one self-contained JSON document. The `story`, `spells`
//! and `abilities` sections arrived in later builds, so each is optional:
//! older saves simply lack the key, and a build without the matching store
//! leaves it out.

use serde::{Deserialize, Serialize};

use crate::consts::SAVE_VERSION;
use crate::player::{Attributes, ItemStack, Player};
use crate::progression::UnlockRegistry;
use crate::scene::{SceneHost, locate_player};
use crate::story::{StoryFlags, StorySnapshot};

/// Player section of a save
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub attributes: AttributesSnapshot,
    /// Absent in saves that predate the inventory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<ItemStack>>,
}

impl PlayerSnapshot {
    /// Copy the live player's persisted state
    pub fn capture(player: &Player) -> Self {
        Self {
            x: player.pos.x,
            y: player.pos.y,
            attributes: AttributesSnapshot::capture(&player.attributes),
            items: Some(player.items.clone()),
        }
    }
}

/// Attribute block as stored in a save
///
/// Every field is optional. Applying a save overwrites only the fields it
/// carries, so an older save leaves attributes it never knew about alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttributesSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_health: Option<f64>,
    #[serde(rename = "atack", skip_serializing_if = "Option::is_none")]
    pub attack: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defense: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_stat_points: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_stats: Option<RawStatsSnapshot>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawStatsSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vitality: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endurance: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agility: Option<u32>,
}

fn overwrite<T: Copy>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

impl AttributesSnapshot {
    pub fn capture(attributes: &Attributes) -> Self {
        let raw = &attributes.raw_stats;
        Self {
            level: Some(attributes.level),
            experience: Some(attributes.experience),
            health: Some(attributes.health),
            base_health: Some(attributes.base_health),
            attack: Some(attributes.attack),
            defense: Some(attributes.defense),
            available_stat_points: Some(attributes.available_stat_points),
            raw_stats: Some(RawStatsSnapshot {
                vitality: Some(raw.vitality),
                strength: Some(raw.strength),
                endurance: Some(raw.endurance),
                agility: Some(raw.agility),
            }),
        }
    }

    /// Overwrite the fields present in the save
    pub fn apply_to(&self, attributes: &mut Attributes) {
        overwrite(&mut attributes.level, self.level);
        overwrite(&mut attributes.experience, self.experience);
        overwrite(&mut attributes.health, self.health);
        overwrite(&mut attributes.base_health, self.base_health);
        overwrite(&mut attributes.attack, self.attack);
        overwrite(&mut attributes.defense, self.defense);
        overwrite(&mut attributes.available_stat_points, self.available_stat_points);
        if let Some(raw) = &self.raw_stats {
            let stats = &mut attributes.raw_stats;
            overwrite(&mut stats.vitality, raw.vitality);
            overwrite(&mut stats.strength, raw.strength);
            overwrite(&mut stats.endurance, raw.endurance);
            overwrite(&mut stats.agility, raw.agility);
        }
    }

    /// The saved attributes over a fresh player's
    pub fn resolve(&self) -> Attributes {
        let mut attributes = Attributes::default();
        self.apply_to(&mut attributes);
        attributes
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellsSnapshot {
    #[serde(default)]
    pub unlocked_spells: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilitiesSnapshot {
    #[serde(default)]
    pub unlocked_abilities: Vec<String>,
}

/// A complete save (what a slot holds)
///
/// `player` is always written, but stays optional when reading so that an
/// incomplete document still parses and can be rejected by the applier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player: Option<PlayerSnapshot>,
    /// Scene the player was in
    pub scene: String,
    /// Unix ms at creation
    pub timestamp: f64,
    /// Session time played at creation (ms)
    pub playtime: f64,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub story: Option<StorySnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spells: Option<SpellsSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abilities: Option<AbilitiesSnapshot>,
}

impl SaveData {
    /// Whether this save was written by the current schema version
    pub fn is_current_version(&self) -> bool {
        self.version == SAVE_VERSION
    }
}

/// Stores a snapshot may draw from; any may be absent
#[derive(Clone, Copy, Default)]
pub struct SaveSources<'a> {
    pub story: Option<&'a StoryFlags>,
    pub spells: Option<&'a UnlockRegistry>,
    pub abilities: Option<&'a UnlockRegistry>,
}

/// Build a snapshot from the live scene and stores
///
/// Returns `None` when no player can be found. Reads only.
pub fn create_save_data(
    scene: &dyn SceneHost,
    sources: SaveSources<'_>,
    session_start_ms: f64,
    now_ms: f64,
) -> Option<SaveData> {
    let player = locate_player(scene)?;

    Some(SaveData {
        player: Some(PlayerSnapshot::capture(player)),
        scene: scene.scene_key().to_string(),
        timestamp: now_ms,
        playtime: (now_ms - session_start_ms).max(0.0),
        version: SAVE_VERSION.to_string(),
        story: sources.story.map(StoryFlags::to_snapshot),
        spells: sources.spells.map(|s| SpellsSnapshot {
            unlocked_spells: s.to_snapshot(),
        }),
        abilities: sources.abilities.map(|a| AbilitiesSnapshot {
            unlocked_abilities: a.to_snapshot(),
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{ManualClock, MemoryStorage};
    use crate::scene::SceneState;
    use std::rc::Rc;

    fn scene_with_player() -> SceneState {
        let mut player = Player::new("player");
        player.set_position(12.5, -4.0);
        player.attributes.level = 3;
        player.add_item("potion", 2);
        SceneState::new("village").with_player(player)
    }

    #[test]
    fn test_build_fails_without_player() {
        let scene = SceneState::new("village");
        assert!(create_save_data(&scene, SaveSources::default(), 0.0, 10.0).is_none());
    }

    #[test]
    fn test_build_captures_player_and_meta() {
        let scene = scene_with_player();
        let data = create_save_data(&scene, SaveSources::default(), 1_000.0, 61_000.0).unwrap();

        let player = data.player.as_ref().unwrap();
        assert_eq!((player.x, player.y), (12.5, -4.0));
        assert_eq!(player.attributes.level, Some(3));
        assert_eq!(player.items, Some(vec![ItemStack::new("potion", 2)]));
        assert_eq!(data.scene, "village");
        assert_eq!(data.timestamp, 61_000.0);
        assert_eq!(data.playtime, 60_000.0);
        assert!(data.is_current_version());
    }

    #[test]
    fn test_absent_stores_are_omitted_from_json() {
        let scene = scene_with_player();
        let data = create_save_data(&scene, SaveSources::default(), 0.0, 0.0).unwrap();
        let json = serde_json::to_value(&data).unwrap();

        assert!(json.get("story").is_none());
        assert!(json.get("spells").is_none());
        assert!(json.get("abilities").is_none());
        assert!(json["player"]["attributes"]["atack"].is_number());
    }

    #[test]
    fn test_present_stores_are_included() {
        let storage = MemoryStorage::shared();
        let mut story = StoryFlags::load(storage.clone(), "t", Rc::new(ManualClock::new(0.0)));
        story.set_flag("met_elder");
        let mut spells = UnlockRegistry::spells(storage.clone(), "t");
        spells.unlock("ice_lance");
        let mut abilities = UnlockRegistry::abilities(storage, "t");
        abilities.unlock("dash");

        let scene = scene_with_player();
        let sources = SaveSources {
            story: Some(&story),
            spells: Some(&spells),
            abilities: Some(&abilities),
        };
        let data = create_save_data(&scene, sources, 0.0, 0.0).unwrap();
        let json = serde_json::to_value(&data).unwrap();

        assert_eq!(json["story"]["flags"][0], "met_elder");
        assert_eq!(json["spells"]["unlockedSpells"][0], "ice_lance");
        assert_eq!(json["abilities"]["unlockedAbilities"][0], "dash");
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut scene = scene_with_player();
        let data = create_save_data(&scene, SaveSources::default(), 0.0, 0.0).unwrap();

        let live = scene.player.as_mut().unwrap();
        live.attributes.health = 1.0;
        live.add_item("potion", 10);

        let saved = data.player.unwrap();
        assert_eq!(saved.attributes.health, Some(100.0));
        assert_eq!(saved.items.unwrap()[0].count, 2);
    }

    #[test]
    fn test_partial_attributes_overwrite_only_present_fields() {
        let mut attributes = Attributes {
            base_health: 250.0,
            attack: 40.0,
            ..Default::default()
        };
        attributes.raw_stats.strength = 7;

        let saved: AttributesSnapshot =
            serde_json::from_str(r#"{"level": 2, "health": 80, "rawStats": {"agility": 3}}"#)
                .unwrap();
        saved.apply_to(&mut attributes);

        assert_eq!(attributes.level, 2);
        assert_eq!(attributes.health, 80.0);
        assert_eq!(attributes.base_health, 250.0);
        assert_eq!(attributes.attack, 40.0);
        assert_eq!(attributes.raw_stats.strength, 7);
        assert_eq!(attributes.raw_stats.agility, 3);
        assert_eq!(saved.resolve().base_health, 100.0);
    }

    #[test]
    fn test_captured_attributes_roundtrip() {
        let mut attributes = Attributes {
            health: 87.5,
            experience: 12.5,
            ..Default::default()
        };
        attributes.raw_stats.vitality = 4;

        let json = serde_json::to_string(&AttributesSnapshot::capture(&attributes)).unwrap();
        let parsed: AttributesSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.resolve(), attributes);
    }

    #[test]
    fn test_old_save_without_sections_parses() {
        let json = r#"{
            "player": {"x": 1, "y": 2, "attributes": {"level": 4}, "items": []},
            "scene": "village",
            "timestamp": 1700000000000,
            "playtime": 5000,
            "version": "1.0.0"
        }"#;
        let data: SaveData = serde_json::from_str(json).unwrap();
        assert!(data.story.is_none());
        assert!(data.spells.is_none());
        assert!(data.abilities.is_none());
        assert!(!data.is_current_version());
        let player = data.player.unwrap();
        assert_eq!(player.attributes.level, Some(4));
        assert_eq!(player.attributes.health, None);
        assert_eq!(player.items, Some(vec![]));
    }
}
