//! Game actions that players can take.
//!
//! This module defines all possible actions in the game and the events
//! that result from those actions.

use crate::bag::SlotId;
use crate::board::Terrain;
use crate::hex::HexCoord;
use crate::player::{PlayerId, PlayerSeat};
use serde::{Deserialize, Serialize};

/// All possible actions, applied in turn order to the active player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameAction {
    // ==================== Setup ====================
    /// Seat the players, build the bag, slots and deck. One player means solo.
    StartGame {
        players: Vec<PlayerSeat>,
        solo_mode: bool,
    },

    // ==================== Draft ====================
    /// Take every token from a central slot
    SelectSlot(SlotId),
    /// Put one of the drafted tokens on the board
    PlaceToken {
        position: HexCoord,
        token_index: usize,
    },
    /// Take back the most recent token placed this turn
    Undo,

    // ==================== Animal Cards ====================
    /// Take a face-up animal card into hand
    TakeAnimalCard(String),
    /// Take no animal card this turn
    SkipTakeCard,

    // ==================== Animal Cubes ====================
    /// Choose which habitat cell of a hand card the next cube fills
    SelectHabitatCell {
        card_id: String,
        habitat_index: usize,
    },
    /// Put the selected animal's cube on a board cell
    PlaceAnimalEmoji(HexCoord),
    /// Drop any pending habitat selection
    SkipPlaceCubes,

    // ==================== Turn Management ====================
    /// Refill, rescore and pass to the next player
    EndTurn,
}

/// Events that occur as a result of actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    GameStarted {
        players: usize,
        solo_mode: bool,
    },

    SlotSelected {
        player: PlayerId,
        slot: SlotId,
        tokens: Vec<Terrain>,
    },

    TokenPlaced {
        player: PlayerId,
        terrain: Terrain,
        position: HexCoord,
        stack_level: u8,
    },

    /// An undone token went back to the tokens still to place
    TokenReturned {
        player: PlayerId,
        terrain: Terrain,
        position: HexCoord,
    },

    AnimalCardTaken {
        player: PlayerId,
        card_id: String,
    },

    /// No card was taken, either by choice or because the hand is full
    CardTakeSkipped {
        player: PlayerId,
        hand_full: bool,
    },

    HabitatCellSelected {
        player: PlayerId,
        card_id: String,
        habitat_index: usize,
    },

    AnimalPlaced {
        player: PlayerId,
        card_id: String,
        habitat_index: usize,
        position: HexCoord,
    },

    AnimalCompleted {
        player: PlayerId,
        card_id: String,
        points: u32,
    },

    CubePlacementSkipped {
        player: PlayerId,
    },

    SlotRefilled {
        slot: SlotId,
        tokens: usize,
    },

    FaceUpRefilled {
        cards: usize,
    },

    TurnEnded {
        player: PlayerId,
        next_player: PlayerId,
    },

    RoundStarted {
        round: u32,
    },

    /// The game is over; `winner` is the seat with the highest total
    GameEnded {
        winner: PlayerId,
        total_score: u32,
    },
}

impl GameEvent {
    /// An optional step that was declined or short-circuited
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            GameEvent::CardTakeSkipped { .. } | GameEvent::CubePlacementSkipped { .. }
        )
    }
}
