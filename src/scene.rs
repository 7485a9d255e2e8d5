//! Scene host boundary
//!
//! The save layer never owns scenes. It needs three things from the host:
//! the current scene id, a way to find the live player, and a primitive to
//! switch scenes.

use std::collections::HashMap;

use thiserror::Error;

use crate::consts::PLAYER_KEY;
use crate::player::Player;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("Unknown scene '{0}'")]
    UnknownScene(String),
}

/// Where a scene may keep its player, in lookup order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerSource {
    /// The scene's well-known player field
    Field,
    /// The scene's keyed data store, under `"player"`
    Data,
    /// The scene's named-object registry, under `"player"`
    Named,
}

impl PlayerSource {
    pub const LOOKUP_ORDER: [PlayerSource; 3] =
        [PlayerSource::Field, PlayerSource::Data, PlayerSource::Named];
}

/// What the save layer needs from the running scene
pub trait SceneHost {
    /// Identifier of the current scene
    fn scene_key(&self) -> &str;

    /// Player at one lookup location
    fn player_at(&self, source: PlayerSource) -> Option<&Player>;

    fn player_at_mut(&mut self, source: PlayerSource) -> Option<&mut Player>;

    /// Switch to another scene
    fn start_scene(&mut self, key: &str) -> Result<(), SceneError>;
}

/// First location in lookup order that holds a player
pub fn find_player_source(scene: &dyn SceneHost) -> Option<PlayerSource> {
    PlayerSource::LOOKUP_ORDER
        .into_iter()
        .find(|source| scene.player_at(*source).is_some())
}

/// Find the live player through the lookup chain
pub fn locate_player(scene: &dyn SceneHost) -> Option<&Player> {
    let source = find_player_source(scene)?;
    scene.player_at(source)
}

/// Mutable variant of [`locate_player`]
pub fn locate_player_mut(scene: &mut dyn SceneHost) -> Option<&mut Player> {
    let source = find_player_source(scene)?;
    scene.player_at_mut(source)
}

/// In-process scene used natively and in tests
#[derive(Debug, Clone, Default)]
pub struct SceneState {
    key: String,
    /// Scenes `start_scene` accepts; empty accepts any
    known_scenes: Vec<String>,
    pub player: Option<Player>,
    pub data: HashMap<String, Player>,
    pub children: Vec<Player>,
    /// Every scene switch requested, in order
    transitions: Vec<String>,
}

impl SceneState {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    /// Place the player in the well-known field
    pub fn with_player(mut self, player: Player) -> Self {
        self.player = Some(player);
        self
    }

    /// Restrict `start_scene` to these ids
    pub fn with_known_scenes(mut self, scenes: &[&str]) -> Self {
        self.known_scenes = scenes.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Store the player in the keyed data store
    pub fn set_data_player(&mut self, player: Player) {
        self.data.insert(PLAYER_KEY.to_string(), player);
    }

    /// Add a named child object
    pub fn add_child(&mut self, player: Player) {
        self.children.push(player);
    }

    pub fn transitions(&self) -> &[String] {
        &self.transitions
    }
}

impl SceneHost for SceneState {
    fn scene_key(&self) -> &str {
        &self.key
    }

    fn player_at(&self, source: PlayerSource) -> Option<&Player> {
        match source {
            PlayerSource::Field => self.player.as_ref(),
            PlayerSource::Data => self.data.get(PLAYER_KEY),
            PlayerSource::Named => self.children.iter().find(|c| c.name == PLAYER_KEY),
        }
    }

    fn player_at_mut(&mut self, source: PlayerSource) -> Option<&mut Player> {
        match source {
            PlayerSource::Field => self.player.as_mut(),
            PlayerSource::Data => self.data.get_mut(PLAYER_KEY),
            PlayerSource::Named => self.children.iter_mut().find(|c| c.name == PLAYER_KEY),
        }
    }

    fn start_scene(&mut self, key: &str) -> Result<(), SceneError> {
        if !self.known_scenes.is_empty() && !self.known_scenes.iter().any(|s| s == key) {
            return Err(SceneError::UnknownScene(key.to_string()));
        }
        log::info!("Scene transition: {} -> {}", self.key, key);
        self.transitions.push(key.to_string());
        self.key = key.to_string();
        Ok(())
    }
}
