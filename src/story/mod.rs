//! Narrative progress tracking
//!
//! Story markers are plain string ids. Some markers cascade into others
//! (defeating a boss sets the matching spell marker); see [`cascade`].

pub mod cascade;
pub mod flags;

pub use cascade::{FLAG_CASCADES, FlagCascade, StoryEvent, cascades_for};
pub use flags::{Act, ChoiceRecord, StoryFlags, StorySnapshot};

/// Well-known story marker ids
pub mod markers {
    pub const ACT_2_STARTED: &str = "act2_started";
    pub const ACT_3_STARTED: &str = "act3_started";

    /// The three collectible relic fragments
    pub const FRAGMENT_EMBER: &str = "fragment_ember";
    pub const FRAGMENT_TIDE: &str = "fragment_tide";
    pub const FRAGMENT_GALE: &str = "fragment_gale";
    pub const FRAGMENTS: [&str; 3] = [FRAGMENT_EMBER, FRAGMENT_TIDE, FRAGMENT_GALE];

    pub const BOSS_FROST_WARDEN_DEFEATED: &str = "boss_frost_warden_defeated";
    pub const BOSS_STORM_DRAKE_DEFEATED: &str = "boss_storm_drake_defeated";
    pub const BOSS_HOLLOW_KING_DEFEATED: &str = "boss_hollow_king_defeated";

    pub const SPELL_ICE_LANCE_UNLOCKED: &str = "spell_ice_lance_unlocked";
    pub const SPELL_CHAIN_LIGHTNING_UNLOCKED: &str = "spell_chain_lightning_unlocked";

    pub const SHRINE_WIND_CLEANSED: &str = "shrine_wind_cleansed";
    pub const ZEPHYR_BOOTS_FOUND: &str = "zephyr_boots_found";
}
