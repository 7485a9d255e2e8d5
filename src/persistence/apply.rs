//! Applying a loaded save to the live game
//!
//! Steps run in a fixed order: player position, attributes, health bar,
//! story, spells, abilities, unlock resync, then the scene switch. An error
//! part-way leaves earlier steps applied; there is no rollback.

use super::error::{SaveError, SaveResult};
use super::snapshot::{PlayerSnapshot, SaveData};
use crate::progression::UnlockRegistry;
use crate::scene::{SceneHost, find_player_source, locate_player_mut};
use crate::story::StoryFlags;

/// Stores a save is applied to; any may be absent
#[derive(Default)]
pub struct ApplyTargets<'a> {
    pub story: Option<&'a mut StoryFlags>,
    pub spells: Option<&'a mut UnlockRegistry>,
    pub abilities: Option<&'a mut UnlockRegistry>,
}

/// Check a save has the parts every apply needs
pub fn validate(data: Option<&SaveData>) -> SaveResult<(&SaveData, &PlayerSnapshot)> {
    let data = data.ok_or(SaveError::MissingSnapshot)?;
    let player = data.player.as_ref().ok_or(SaveError::MissingPlayer)?;
    Ok((data, player))
}

/// Push a save into the live player and stores. Returns true on success.
///
/// Sections missing from the save leave the matching store untouched.
pub fn apply_save_data(
    data: Option<&SaveData>,
    scene: &mut dyn SceneHost,
    targets: ApplyTargets<'_>,
) -> bool {
    let (data, player) = match validate(data) {
        Ok(parts) => parts,
        Err(e) => {
            log::error!("Invalid save data: {}", e);
            return false;
        }
    };

    if find_player_source(scene).is_none() {
        log::error!(
            "Cannot apply save: no player in scene '{}'",
            scene.scene_key()
        );
        return false;
    }

    match apply_steps(data, player, scene, targets) {
        Ok(()) => {
            log::info!("Save applied (scene {})", data.scene);
            true
        }
        Err(e) => {
            log::error!("Failed to apply save: {}", e);
            false
        }
    }
}

fn apply_steps(
    data: &SaveData,
    snapshot: &PlayerSnapshot,
    scene: &mut dyn SceneHost,
    mut targets: ApplyTargets<'_>,
) -> SaveResult<()> {
    {
        let player = locate_player_mut(scene).ok_or(SaveError::PlayerNotFound)?;
        player.set_position(snapshot.x, snapshot.y);
        snapshot.attributes.apply_to(&mut player.attributes);
        if let Some(items) = &snapshot.items {
            player.items = items.clone();
        }
        if !player.refresh_health_bar() {
            log::debug!("Player has no health bar to refresh");
        }
    }

    if let (Some(story), Some(flags)) = (&data.story, targets.story.as_deref_mut()) {
        flags.restore(story);
    }
    if let (Some(spells), Some(registry)) = (&data.spells, targets.spells.as_deref_mut()) {
        registry.restore(&spells.unlocked_spells);
    }
    if let (Some(abilities), Some(registry)) = (&data.abilities, targets.abilities.as_deref_mut()) {
        registry.restore(&abilities.unlocked_abilities);
    }

    // Saves from before a capability existed still grant it via its marker
    if data.story.is_some() {
        if let Some(flags) = targets.story.as_deref() {
            let markers = flags.all_flags();
            for registry in [targets.spells.as_deref_mut(), targets.abilities.as_deref_mut()]
                .into_iter()
                .flatten()
            {
                registry.sync_with_story_flags(&markers);
            }
        }
    }

    if !data.scene.is_empty() && data.scene != scene.scene_key() {
        scene.start_scene(&data.scene)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SAVE_VERSION;
    use crate::persistence::snapshot::{AbilitiesSnapshot, SpellsSnapshot};
    use crate::platform::{ManualClock, MemoryStorage};
    use crate::player::{ItemStack, Player};
    use crate::scene::SceneState;
    use crate::story::{StorySnapshot, markers};
    use std::rc::Rc;

    struct Stores {
        story: StoryFlags,
        spells: UnlockRegistry,
        abilities: UnlockRegistry,
    }

    impl Stores {
        fn new() -> Self {
            let storage = MemoryStorage::shared();
            Self {
                story: StoryFlags::load(storage.clone(), "t", Rc::new(ManualClock::new(0.0))),
                spells: UnlockRegistry::spells(storage.clone(), "t"),
                abilities: UnlockRegistry::abilities(storage, "t"),
            }
        }

        fn targets(&mut self) -> ApplyTargets<'_> {
            ApplyTargets {
                story: Some(&mut self.story),
                spells: Some(&mut self.spells),
                abilities: Some(&mut self.abilities),
            }
        }
    }

    fn save_in(scene: &str) -> SaveData {
        let mut player = Player::new("player");
        player.set_position(50.0, 75.0);
        player.attributes.level = 9;
        player.attributes.health = 40.0;
        player.add_item("ether", 3);
        SaveData {
            player: Some(PlayerSnapshot::capture(&player)),
            scene: scene.to_string(),
            version: SAVE_VERSION.to_string(),
            ..Default::default()
        }
    }

    fn village() -> SceneState {
        SceneState::new("village").with_player(Player::new("player").with_health_bar())
    }

    #[test]
    fn test_missing_save_or_player_rejected() {
        let mut scene = village();
        let mut stores = Stores::new();
        assert!(!apply_save_data(None, &mut scene, stores.targets()));

        let data = SaveData {
            scene: "castle".to_string(),
            ..Default::default()
        };
        assert!(!apply_save_data(Some(&data), &mut scene, stores.targets()));
        assert!(scene.transitions().is_empty());
        assert!(matches!(validate(Some(&data)), Err(SaveError::MissingPlayer)));
        assert!(matches!(validate(None), Err(SaveError::MissingSnapshot)));
    }

    #[test]
    fn test_no_player_in_scene_rejected() {
        let mut scene = SceneState::new("village");
        let mut stores = Stores::new();
        assert!(!apply_save_data(Some(&save_in("castle")), &mut scene, stores.targets()));
        assert!(scene.transitions().is_empty());
    }

    #[test]
    fn test_applies_player_state() {
        let mut scene = village();
        let mut stores = Stores::new();
        assert!(apply_save_data(Some(&save_in("village")), &mut scene, stores.targets()));

        let player = scene.player.as_ref().unwrap();
        assert_eq!((player.pos.x, player.pos.y), (50.0, 75.0));
        assert_eq!(player.attributes.level, 9);
        assert_eq!(player.items, vec![ItemStack::new("ether", 3)]);
        assert_eq!(player.health_bar.as_ref().unwrap().current(), 40.0);
    }

    #[test]
    fn test_scene_transition_only_on_mismatch() {
        let mut scene = village();
        let mut stores = Stores::new();
        assert!(apply_save_data(Some(&save_in("village")), &mut scene, stores.targets()));
        assert!(scene.transitions().is_empty());

        assert!(apply_save_data(Some(&save_in("castle")), &mut scene, stores.targets()));
        assert_eq!(scene.transitions(), &["castle".to_string()]);
    }

    #[test]
    fn test_missing_sections_leave_stores_untouched() {
        let mut scene = village();
        let mut stores = Stores::new();
        stores.story.set_flag(markers::FRAGMENT_EMBER);
        stores.spells.unlock("meteor");
        stores.abilities.unlock("dash");

        assert!(apply_save_data(Some(&save_in("village")), &mut scene, stores.targets()));

        assert_eq!(stores.story.all_flags(), vec![markers::FRAGMENT_EMBER.to_string()]);
        assert!(stores.spells.is_unlocked("meteor"));
        assert!(stores.abilities.is_unlocked("dash"));
    }

    #[test]
    fn test_sections_restore_and_resync() {
        let mut scene = village();
        let mut stores = Stores::new();
        stores.abilities.unlock("double_jump");

        let mut data = save_in("village");
        data.story = Some(StorySnapshot {
            flags: vec![
                markers::SPELL_ICE_LANCE_UNLOCKED.to_string(),
                markers::SHRINE_WIND_CLEANSED.to_string(),
            ],
            choices: vec![],
        });
        data.abilities = Some(AbilitiesSnapshot {
            unlocked_abilities: vec![],
        });

        assert!(apply_save_data(Some(&data), &mut scene, stores.targets()));

        assert!(stores.story.has_flag(markers::SHRINE_WIND_CLEANSED));
        // No spells section: granted through the story marker
        assert!(stores.spells.is_unlocked("ice_lance"));
        // Abilities replaced wholesale, then resynced
        assert!(!stores.abilities.is_unlocked("double_jump"));
        assert!(stores.abilities.is_unlocked("dash"));
    }

    #[test]
    fn test_spells_section_restores() {
        let mut scene = village();
        let mut stores = Stores::new();
        stores.spells.unlock("chain_lightning");

        let mut data = save_in("village");
        data.spells = Some(SpellsSnapshot {
            unlocked_spells: vec!["meteor".to_string()],
        });
        assert!(apply_save_data(Some(&data), &mut scene, stores.targets()));
        assert!(stores.spells.is_unlocked("meteor"));
        assert!(stores.spells.is_unlocked("fireball"));
        assert!(!stores.spells.is_unlocked("chain_lightning"));
    }

    #[test]
    fn test_failed_transition_keeps_partial_apply() {
        let mut scene = village().with_known_scenes(&["village"]);
        let mut stores = Stores::new();

        let mut data = save_in("atlantis");
        data.story = Some(StorySnapshot {
            flags: vec![markers::FRAGMENT_TIDE.to_string()],
            choices: vec![],
        });

        assert!(!apply_save_data(Some(&data), &mut scene, stores.targets()));
        // Earlier steps stay applied
        assert_eq!(scene.player.as_ref().unwrap().pos.x, 50.0);
        assert!(stores.story.has_flag(markers::FRAGMENT_TIDE));
        assert_eq!(scene.scene_key(), "village");
    }

    #[test]
    fn test_applies_without_any_stores() {
        let mut scene = village();
        assert!(apply_save_data(
            Some(&save_in("village")),
            &mut scene,
            ApplyTargets::default()
        ));
    }
}
