//! The live player entity
//!
//! Only the parts the save layer reads or writes live here: position,
//! attribute block, inventory, busy flags and the optional health bar.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::ui::HealthBar;

/// Raw per-stat point allocations (before derived bonuses)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawStats {
    pub vitality: u32,
    pub strength: u32,
    pub endurance: u32,
    pub agility: u32,
}

impl RawStats {
    /// Total points allocated across all stats
    pub fn total(&self) -> u32 {
        self.vitality + self.strength + self.endurance + self.agility
    }
}

/// Player attribute block
///
/// Combat numbers are `f64` because saves may carry fractional values
/// (buffs, partial regen). Missing fields fall back to the starting values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Attributes {
    pub level: u32,
    pub experience: f64,
    /// Current health
    pub health: f64,
    /// Maximum health before buffs
    pub base_health: f64,
    /// Stored under the legacy `atack` key so existing saves keep loading
    #[serde(rename = "atack")]
    pub attack: f64,
    pub defense: f64,
    /// Points earned on level-up and not yet allocated
    pub available_stat_points: u32,
    pub raw_stats: RawStats,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            level: 1,
            experience: 0.0,
            health: 100.0,
            base_health: 100.0,
            attack: 10.0,
            defense: 5.0,
            available_stat_points: 0,
            raw_stats: RawStats::default(),
        }
    }
}

/// An inventory slot: item id and stack size
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub id: String,
    pub count: u32,
}

impl ItemStack {
    pub fn new(id: impl Into<String>, count: u32) -> Self {
        Self {
            id: id.into(),
            count,
        }
    }
}

/// The player entity as seen by the save layer
#[derive(Debug, Clone)]
pub struct Player {
    /// Object name used by the scene's named-object registry
    pub name: String,
    /// Position of the player's container in world space
    pub pos: Vec2,
    pub attributes: Attributes,
    pub items: Vec<ItemStack>,
    /// False while a cutscene, dialogue or knockback has locked movement
    pub can_move: bool,
    pub is_attacking: bool,
    /// On-screen health bar, absent in headless scenes
    pub health_bar: Option<HealthBar>,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pos: Vec2::ZERO,
            attributes: Attributes::default(),
            items: Vec::new(),
            can_move: true,
            is_attacking: false,
            health_bar: None,
        }
    }

    /// Attach a health bar sized to the current base health
    pub fn with_health_bar(mut self) -> Self {
        self.health_bar = Some(HealthBar::new(
            self.attributes.health,
            self.attributes.base_health,
        ));
        self
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.pos = Vec2::new(x, y);
    }

    /// True while the player is in a non-interruptible action
    pub fn is_busy(&self) -> bool {
        !self.can_move || self.is_attacking
    }

    /// Add items, stacking onto an existing slot with the same id
    pub fn add_item(&mut self, id: &str, count: u32) {
        if count == 0 {
            return;
        }
        match self.items.iter_mut().find(|s| s.id == id) {
            Some(stack) => stack.count += count,
            None => self.items.push(ItemStack::new(id, count)),
        }
    }

    /// How many of an item the player carries
    pub fn item_count(&self, id: &str) -> u32 {
        self.items
            .iter()
            .filter(|s| s.id == id)
            .map(|s| s.count)
            .sum()
    }

    /// Push current health into the health bar. Returns false if there is none.
    pub fn refresh_health_bar(&mut self) -> bool {
        let health = self.attributes.health;
        let base = self.attributes.base_health;
        match self.health_bar.as_mut() {
            Some(bar) => {
                bar.set_max(base);
                bar.update(health);
                true
            }
            None => false,
        }
    }
}
