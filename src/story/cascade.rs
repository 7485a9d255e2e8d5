//! Flag cascades
//!
//! Setting a trigger marker also sets a derived marker and raises a
//! notification event. Cascades may chain; a marker that is already set
//! never re-triggers its cascade.

use super::flags::Act;
use super::markers::*;

/// Notification raised when a cascade fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryEvent {
    SpellUnlocked { spell: &'static str },
    ActStarted { act: Act },
}

impl StoryEvent {
    /// Player-facing text for the notification toast
    pub fn message(&self) -> String {
        match self {
            StoryEvent::SpellUnlocked { spell } => {
                format!("New spell learned: {}", spell.replace('_', " "))
            }
            StoryEvent::ActStarted { act } => format!("Act {} begins", act.number()),
        }
    }
}

/// One row of the cascade table
#[derive(Debug, Clone, Copy)]
pub struct FlagCascade {
    pub trigger: &'static str,
    pub derived: &'static str,
    pub event: StoryEvent,
}

pub const FLAG_CASCADES: &[FlagCascade] = &[
    FlagCascade {
        trigger: BOSS_FROST_WARDEN_DEFEATED,
        derived: SPELL_ICE_LANCE_UNLOCKED,
        event: StoryEvent::SpellUnlocked { spell: "ice_lance" },
    },
    FlagCascade {
        trigger: BOSS_STORM_DRAKE_DEFEATED,
        derived: SPELL_CHAIN_LIGHTNING_UNLOCKED,
        event: StoryEvent::SpellUnlocked {
            spell: "chain_lightning",
        },
    },
    FlagCascade {
        trigger: SPELL_CHAIN_LIGHTNING_UNLOCKED,
        derived: ACT_2_STARTED,
        event: StoryEvent::ActStarted { act: Act::Two },
    },
    FlagCascade {
        trigger: BOSS_HOLLOW_KING_DEFEATED,
        derived: ACT_3_STARTED,
        event: StoryEvent::ActStarted { act: Act::Three },
    },
];

/// Cascades fired by a marker
pub fn cascades_for(marker: &str) -> impl Iterator<Item = &'static FlagCascade> + '_ {
    FLAG_CASCADES.iter().filter(move |c| c.trigger == marker)
}
