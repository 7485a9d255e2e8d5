//! Save coordinator
//!
//! Owns everything the save layer needs for one play session: the story
//! and unlock stores, both save slots, the checkpoint scheduler, settings
//! and toasts. The host hands in its scene on each call; nothing here keeps
//! a reference to it.

use std::rc::Rc;

use super::apply::{ApplyTargets, apply_save_data};
use super::checkpoint::{CheckpointDecision, CheckpointScheduler};
use super::gateway::{SaveGateway, SaveSlot};
use super::snapshot::{SaveData, SaveSources, create_save_data};
use super::summary::SaveSummary;
use crate::platform::{Clock, SharedStorage};
use crate::progression::UnlockRegistry;
use crate::scene::SceneHost;
use crate::settings::Settings;
use crate::story::StoryFlags;
use crate::ui::NotificationQueue;

/// Save/load coordinator for one play session
pub struct SaveManager {
    storage: SharedStorage,
    namespace: String,
    clock: Rc<dyn Clock>,
    settings: Settings,
    story: StoryFlags,
    spells: UnlockRegistry,
    abilities: UnlockRegistry,
    gateway: SaveGateway,
    scheduler: CheckpointScheduler,
    notifications: NotificationQueue,
    /// Unix ms the session started (playtime origin)
    session_start_ms: f64,
}

impl SaveManager {
    /// Start a session: load settings and stores, start the checkpoint timer
    pub fn new(storage: SharedStorage, namespace: &str, clock: Rc<dyn Clock>) -> Self {
        let settings = Settings::load(&*storage, namespace);
        let story = StoryFlags::load(storage.clone(), namespace, clock.clone());
        let mut spells = UnlockRegistry::spells(storage.clone(), namespace);
        let mut abilities = UnlockRegistry::abilities(storage.clone(), namespace);

        let markers = story.all_flags();
        spells.sync_with_story_flags(&markers);
        abilities.sync_with_story_flags(&markers);

        let mut notifications = NotificationQueue::new(settings.notification_duration_ms);
        notifications.set_enabled(settings.show_notifications);

        let scheduler =
            CheckpointScheduler::new(settings.checkpoint_interval_ms(), settings.auto_save);
        let gateway = SaveGateway::new(storage.clone(), namespace);
        let session_start_ms = clock.now_ms();

        log::info!("Save session started (namespace '{}')", namespace);

        Self {
            storage,
            namespace: namespace.to_string(),
            clock,
            settings,
            story,
            spells,
            abilities,
            gateway,
            scheduler,
            notifications,
            session_start_ms,
        }
    }

    pub fn story(&self) -> &StoryFlags {
        &self.story
    }

    pub fn story_mut(&mut self) -> &mut StoryFlags {
        &mut self.story
    }

    pub fn spells(&self) -> &UnlockRegistry {
        &self.spells
    }

    pub fn spells_mut(&mut self) -> &mut UnlockRegistry {
        &mut self.spells
    }

    pub fn abilities(&self) -> &UnlockRegistry {
        &self.abilities
    }

    pub fn abilities_mut(&mut self) -> &mut UnlockRegistry {
        &mut self.abilities
    }

    pub fn gateway(&self) -> &SaveGateway {
        &self.gateway
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    /// Time played this session (ms)
    pub fn playtime_ms(&self) -> f64 {
        (self.clock.now_ms() - self.session_start_ms).max(0.0)
    }

    /// Set a story flag and grant whatever it unlocks
    pub fn set_flag(&mut self, marker: &str) {
        self.story.set_flag(marker);
        self.sync_unlocks();
    }

    fn sync_unlocks(&mut self) {
        let markers = self.story.all_flags();
        self.spells.sync_with_story_flags(&markers);
        self.abilities.sync_with_story_flags(&markers);
    }

    /// Build a snapshot of the live game; `None` if the scene has no player
    pub fn create_save_data(&self, scene: &dyn SceneHost) -> Option<SaveData> {
        let sources = SaveSources {
            story: Some(&self.story),
            spells: Some(&self.spells),
            abilities: Some(&self.abilities),
        };
        create_save_data(scene, sources, self.session_start_ms, self.clock.now_ms())
    }

    /// Build and write a snapshot. Returns false if either step failed.
    pub fn save_game(&mut self, scene: &dyn SceneHost, is_checkpoint: bool) -> bool {
        let slot = SaveSlot::from_checkpoint_flag(is_checkpoint);
        let saved = match self.create_save_data(scene) {
            Some(data) => self.gateway.save_game(slot, &data),
            None => {
                log::error!("Cannot save: no player in scene '{}'", scene.scene_key());
                false
            }
        };

        match (saved, slot) {
            (true, SaveSlot::Manual) => self.notifications.success("Game saved"),
            (true, SaveSlot::Checkpoint) => self.notifications.success("Checkpoint"),
            (false, _) => self.notifications.failure("Save failed"),
        }
        saved
    }

    /// Read a slot; `None` when empty or corrupt
    pub fn load_game(&self, load_checkpoint: bool) -> Option<SaveData> {
        self.gateway.load_game(SaveSlot::from_checkpoint_flag(load_checkpoint))
    }

    pub fn has_save_data(&self, is_checkpoint: bool) -> bool {
        self.gateway.has_save_data(SaveSlot::from_checkpoint_flag(is_checkpoint))
    }

    pub fn delete_save(&self, is_checkpoint: bool) {
        self.gateway.delete_save(SaveSlot::from_checkpoint_flag(is_checkpoint));
    }

    /// Push a snapshot into the live player and the owned stores
    pub fn apply_save_data(&mut self, data: Option<&SaveData>, scene: &mut dyn SceneHost) -> bool {
        let targets = ApplyTargets {
            story: Some(&mut self.story),
            spells: Some(&mut self.spells),
            abilities: Some(&mut self.abilities),
        };
        apply_save_data(data, scene, targets)
    }

    /// Load a slot and apply it, with on-screen feedback
    pub fn load_and_apply(&mut self, scene: &mut dyn SceneHost, load_checkpoint: bool) -> bool {
        let Some(data) = self.load_game(load_checkpoint) else {
            self.notifications.failure("No save found");
            return false;
        };
        let applied = self.apply_save_data(Some(&data), scene);
        if applied {
            self.notifications.success("Game loaded");
        } else {
            self.notifications.failure("Load failed");
        }
        applied
    }

    /// Write a checkpoint unless auto-save is off or the player is busy
    pub fn try_checkpoint(&mut self, scene: &dyn SceneHost) -> bool {
        match self.scheduler.check(scene) {
            CheckpointDecision::Save => self.save_game(scene, true),
            CheckpointDecision::Busy => {
                log::info!("Player busy, skipping checkpoint");
                false
            }
            CheckpointDecision::NoPlayer => {
                log::debug!("No player, skipping checkpoint");
                false
            }
            CheckpointDecision::Disabled => false,
        }
    }

    /// Per-frame update: ages toasts, surfaces story events and runs the
    /// checkpoint timer
    pub fn update(&mut self, dt_ms: f64, scene: &dyn SceneHost) {
        self.notifications.update(dt_ms);
        for event in self.story.drain_events() {
            self.notifications.push(crate::ui::ToastKind::Info, event.message());
        }
        if self.scheduler.update(dt_ms) {
            self.try_checkpoint(scene);
        }
    }

    pub fn set_auto_save(&mut self, enabled: bool) {
        self.scheduler.set_auto_save(enabled);
        self.settings.auto_save = enabled;
        self.settings.save(&*self.storage, &self.namespace);
    }

    pub fn is_auto_save_enabled(&self) -> bool {
        self.scheduler.is_auto_save_enabled()
    }

    pub fn start_checkpoint_timer(&mut self) {
        self.scheduler.start_checkpoint_timer();
    }

    pub fn stop_checkpoint_timer(&mut self) {
        self.scheduler.stop_checkpoint_timer();
    }

    pub fn is_checkpoint_timer_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Replace settings, apply them to the scheduler and toasts, persist
    pub fn apply_settings(&mut self, settings: Settings) {
        self.scheduler.set_auto_save(settings.auto_save);
        self.scheduler.set_interval_ms(settings.checkpoint_interval_ms());
        self.notifications = NotificationQueue::new(settings.notification_duration_ms);
        self.notifications.set_enabled(settings.show_notifications);
        settings.save(&*self.storage, &self.namespace);
        self.settings = settings;
    }

    /// Summary of a slot for the load menu
    pub fn slot_summary(&self, is_checkpoint: bool) -> Option<SaveSummary> {
        self.load_game(is_checkpoint)
            .as_ref()
            .and_then(SaveSummary::from_save)
    }

    /// Wipe both slots and all progression, restart the playtime clock
    pub fn start_new_game(&mut self) {
        self.gateway.delete_save(SaveSlot::Manual);
        self.gateway.delete_save(SaveSlot::Checkpoint);
        self.story.reset();
        self.spells.reset();
        self.abilities.reset();
        self.session_start_ms = self.clock.now_ms();
        self.scheduler.start_checkpoint_timer();
        log::info!("Started new game");
    }
}
