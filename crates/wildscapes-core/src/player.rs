//! Player state: board, animal cards and scores.

use crate::animals::{AnimalCard, PlacedAnimalEmoji};
use crate::board::Board;
use crate::hex::HexCoord;
use crate::scoring::{score_environment, EnvironmentScore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Seat index of a player (0-based turn order)
pub type PlayerId = usize;

/// Seat color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerColor {
    Green,
    Blue,
    Orange,
    Purple,
}

impl PlayerColor {
    /// Get color for a player index
    pub fn for_player(id: PlayerId) -> Self {
        match id % 4 {
            0 => PlayerColor::Green,
            1 => PlayerColor::Blue,
            2 => PlayerColor::Orange,
            _ => PlayerColor::Purple,
        }
    }
}

/// Who sits down at `START_GAME`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSeat {
    pub name: String,
    pub color: Option<PlayerColor>,
    /// Persistent profile this seat plays as, if any
    pub profile_id: Option<Uuid>,
}

impl PlayerSeat {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: None,
            profile_id: None,
        }
    }

    pub fn with_profile(name: impl Into<String>, profile_id: Uuid) -> Self {
        Self {
            profile_id: Some(profile_id),
            ..Self::named(name)
        }
    }
}

/// A player's complete state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: PlayerId,
    pub name: String,
    pub color: PlayerColor,
    pub profile_id: Option<Uuid>,
    pub board: Board,
    pub placed_emojis: Vec<PlacedAnimalEmoji>,
    /// Uncompleted animal cards
    pub hand_cards: Vec<AnimalCard>,
    pub completed_cards: Vec<AnimalCard>,
    /// Points from completed animal cards only
    pub score: u32,
    /// Environment breakdown as of the last end of turn
    pub environment: EnvironmentScore,
    pub turns_taken: u32,
}

impl PlayerState {
    pub fn new(id: PlayerId, seat: PlayerSeat) -> Self {
        Self {
            id,
            name: seat.name,
            color: seat.color.unwrap_or_else(|| PlayerColor::for_player(id)),
            profile_id: seat.profile_id,
            board: Board::new(),
            placed_emojis: Vec::new(),
            hand_cards: Vec::new(),
            completed_cards: Vec::new(),
            score: 0,
            environment: EnvironmentScore::default(),
            turns_taken: 0,
        }
    }

    /// Sum of completed card points
    pub fn animal_score(&self) -> u32 {
        self.completed_cards.iter().map(|c| c.points).sum()
    }

    /// Recompute `score` and `environment` from the current board and cards
    pub fn refresh_scores(&mut self) {
        self.score = self.animal_score();
        self.environment = score_environment(&self.board);
    }

    /// Animal points plus freshly computed environment points
    pub fn total_score(&self) -> u32 {
        self.animal_score() + score_environment(&self.board).total
    }

    pub fn hand_card(&self, card_id: &str) -> Option<&AnimalCard> {
        self.hand_cards.iter().find(|c| c.id == card_id)
    }

    /// The animal cube sitting on a board cell, if any
    pub fn emoji_at(&self, position: HexCoord) -> Option<&PlacedAnimalEmoji> {
        self.placed_emojis.iter().find(|e| e.position == position)
    }

    /// Whether an animal cube locks this cell against further tokens
    pub fn is_locked(&self, position: HexCoord) -> bool {
        self.emoji_at(position).is_some()
    }

    pub fn emojis_for<'a>(&'a self, card_id: &'a str) -> impl Iterator<Item = &'a PlacedAnimalEmoji> {
        self.placed_emojis.iter().filter(move |e| e.card_id == card_id)
    }

    /// Whether a habitat cell of a card already carries a cube
    pub fn is_habitat_filled(&self, card_id: &str, habitat_index: usize) -> bool {
        self.emojis_for(card_id).any(|e| e.habitat_index == habitat_index)
    }

    /// Total animal cubes placed, the end-game tiebreaker
    pub fn cubes_placed(&self) -> usize {
        self.placed_emojis.len()
    }

    /// Move a card from hand to completed once every habitat cell has a cube
    pub fn complete_if_filled(&mut self, card_id: &str) -> Option<&AnimalCard> {
        let card = self.hand_card(card_id)?;
        if self.emojis_for(card_id).count() < card.cubes_required() {
            return None;
        }
        let index = self.hand_cards.iter().position(|c| c.id == card_id)?;
        let card = self.hand_cards.remove(index);
        self.completed_cards.push(card);
        self.completed_cards.last()
    }
}
