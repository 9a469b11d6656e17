//! Tunable game parameters.
//!
//! [`GameConfig::default`] reproduces the printed game: 72 tokens, three per
//! slot, five slots and five face-up animals (three of each when solo), and a
//! hand limit of four animal cards.

use crate::board::Terrain;
use serde::{Deserialize, Serialize};

/// When the game ends once the end condition has been met
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndGameRule {
    /// End right after the turn in which the condition was detected
    #[default]
    Immediate,
    /// Let the round finish so every player has taken the same number of turns
    FinishRound,
}

/// Game parameters fixed at game start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Number of tokens of each terrain in the bag
    pub token_counts: Vec<(Terrain, u32)>,
    /// Tokens dealt into each supply slot
    pub slot_size: usize,
    pub slots_solo: usize,
    pub slots_multiplayer: usize,
    pub face_up_solo: usize,
    pub face_up_multiplayer: usize,
    /// Maximum uncompleted animal cards in a hand
    pub hand_limit: usize,
    /// The game ends when a player finishes a turn with at most this many empty cells
    pub end_empty_cells: usize,
    pub end_rule: EndGameRule,
    pub max_players: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            token_counts: vec![
                (Terrain::Field, 15),
                (Terrain::Water, 15),
                (Terrain::Mountain, 12),
                (Terrain::Trunk, 12),
                (Terrain::Treetop, 10),
                (Terrain::Building, 8),
            ],
            slot_size: 3,
            slots_solo: 3,
            slots_multiplayer: 5,
            face_up_solo: 3,
            face_up_multiplayer: 5,
            hand_limit: 4,
            end_empty_cells: 2,
            end_rule: EndGameRule::Immediate,
            max_players: 4,
        }
    }
}

impl GameConfig {
    /// Default parameters with a different end-game rule
    pub fn with_end_rule(end_rule: EndGameRule) -> Self {
        Self {
            end_rule,
            ..Self::default()
        }
    }

    pub fn slot_count(&self, solo: bool) -> usize {
        if solo {
            self.slots_solo
        } else {
            self.slots_multiplayer
        }
    }

    pub fn face_up_count(&self, solo: bool) -> usize {
        if solo {
            self.face_up_solo
        } else {
            self.face_up_multiplayer
        }
    }

    /// Total tokens in a freshly generated bag
    pub fn bag_size(&self) -> usize {
        self.token_counts.iter().map(|(_, n)| *n as usize).sum()
    }
}
