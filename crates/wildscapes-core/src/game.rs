//! Core game state machine.
//!
//! This module contains the main `GameState` struct and the reducer that
//! moves it from one snapshot to the next. Callers never mutate a state in
//! place: [`GameState::apply_action`] returns a new snapshot, identical to
//! the old one when the action is rejected.

use crate::actions::{GameAction, GameEvent};
use crate::animals::{catalog, AnimalCard, AnimalDeck, PlacedAnimalEmoji};
use crate::bag::{deal_initial_slots, refill_slot, SlotId, TokenBag, TokenSlot};
use crate::board::TerrainToken;
use crate::config::{EndGameRule, GameConfig};
use crate::hex::HexCoord;
use crate::player::{PlayerId, PlayerSeat, PlayerState};
use crate::scoring::{score_environment, EnvironmentScore};
use crate::stats::{standings, Standing};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Overall game phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for `StartGame`
    #[default]
    Setup,
    Playing,
    Ended,
}

/// Step within a player's turn. Always advances in declaration order, then wraps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TurnPhase {
    #[default]
    SelectSlot,
    PlaceTokens,
    TakeCard,
    PlaceCubes,
}

impl TurnPhase {
    /// The step after this one
    pub fn next(self) -> Self {
        match self {
            TurnPhase::SelectSlot => TurnPhase::PlaceTokens,
            TurnPhase::PlaceTokens => TurnPhase::TakeCard,
            TurnPhase::TakeCard => TurnPhase::PlaceCubes,
            TurnPhase::PlaceCubes => TurnPhase::SelectSlot,
        }
    }
}

/// Reasons an action is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("Game has not started")]
    GameNotStarted,

    #[error("Game already started")]
    GameAlreadyStarted,

    #[error("Game is over")]
    GameOver,

    #[error("Action not allowed during {0:?}")]
    InvalidPhase(TurnPhase),

    #[error("At least one player is required")]
    NoPlayers,

    #[error("At most {0} players can play")]
    TooManyPlayers(usize),

    #[error("No such slot")]
    NoSuchSlot,

    #[error("Slot is empty")]
    EmptySlot,

    #[error("No such token to place")]
    NoSuchToken,

    #[error("Position is off the board")]
    OffBoard,

    #[error("An animal occupies that cell")]
    CellLocked,

    #[error("Token cannot be stacked there")]
    IllegalStack,

    #[error("Don't have that card")]
    NoSuchCard,

    #[error("Card has no such habitat cell")]
    NoSuchHabitatCell,

    #[error("Habitat cell already has an animal")]
    HabitatCellFilled,

    #[error("No habitat cell selected")]
    NoHabitatSelected,

    #[error("Board cell does not match the habitat")]
    HabitatMismatch,

    #[error("Nothing to undo")]
    NothingToUndo,
}

/// A fresh shuffle seed from the thread RNG
pub fn entropy_seed() -> u64 {
    rand::thread_rng().gen()
}

/// A successful step: the next snapshot and what happened
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: GameState,
    pub events: Vec<GameEvent>,
}

/// The complete game state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    /// Seat of the active player
    pub current_player: PlayerId,
    pub players: Vec<PlayerState>,
    /// Central supply slots
    pub slots: Vec<TokenSlot>,
    pub token_bag: TokenBag,
    pub deck: AnimalDeck,
    pub turn_phase: TurnPhase,
    /// Tokens drafted this turn and not yet placed
    pub tokens_to_place: Vec<TerrainToken>,
    pub selected_slot: Option<SlotId>,
    /// Round number (starts at 1)
    pub round_number: u32,
    pub solo_mode: bool,
    /// Pending habitat selection for the next animal cube
    pub selected_animal_card: Option<String>,
    pub selected_habitat_index: Option<usize>,
    pub config: GameConfig,
    /// Successful actions since `StartGame`
    pub actions_applied: u32,
    /// Skips, including the full-hand short-circuit
    pub actions_skipped: u32,
    /// Ids of tokens placed this turn, oldest first
    #[serde(default)]
    placed_this_turn: Vec<u32>,
    /// End condition met under [`EndGameRule::FinishRound`]
    #[serde(default)]
    end_triggered: bool,
    /// Seed for the bag and deck shuffles (for deterministic replays)
    rng_seed: u64,
}

impl GameState {
    /// A fresh game in setup, seeded from entropy
    pub fn new() -> Self {
        Self::with_seed(entropy_seed())
    }

    /// A fresh game in setup with a fixed shuffle seed
    pub fn with_seed(seed: u64) -> Self {
        Self::with_config(GameConfig::default(), seed)
    }

    pub fn with_config(config: GameConfig, seed: u64) -> Self {
        Self {
            phase: GamePhase::Setup,
            current_player: 0,
            players: Vec::new(),
            slots: Vec::new(),
            token_bag: TokenBag::default(),
            deck: AnimalDeck::default(),
            turn_phase: TurnPhase::SelectSlot,
            tokens_to_place: Vec::new(),
            selected_slot: None,
            round_number: 1,
            solo_mode: false,
            selected_animal_card: None,
            selected_habitat_index: None,
            config,
            actions_applied: 0,
            actions_skipped: 0,
            placed_this_turn: Vec::new(),
            end_triggered: false,
            rng_seed: seed,
        }
    }

    /// Seed used for the shuffles
    pub fn seed(&self) -> u64 {
        self.rng_seed
    }

    // ==================== Queries ====================

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn get_player(&self, id: PlayerId) -> Option<&PlayerState> {
        self.players.get(id)
    }

    fn get_player_mut(&mut self, id: PlayerId) -> Option<&mut PlayerState> {
        self.players.get_mut(id)
    }

    /// The active player, once the game has started
    pub fn active_player(&self) -> Option<&PlayerState> {
        self.get_player(self.current_player)
    }

    /// Cards in a player's hand
    pub fn hand_count(&self, id: PlayerId) -> usize {
        self.get_player(id).map_or(0, |p| p.hand_cards.len())
    }

    pub fn slot(&self, id: SlotId) -> Option<&TokenSlot> {
        self.slots.iter().find(|s| s.id == id)
    }

    pub fn face_up_animals(&self) -> &[AnimalCard] {
        &self.deck.face_up
    }

    pub fn is_finished(&self) -> bool {
        self.phase == GamePhase::Ended
    }

    /// Fresh environment breakdown for a player
    pub fn environment_score(&self, id: PlayerId) -> EnvironmentScore {
        self.get_player(id)
            .map(|p| score_environment(&p.board))
            .unwrap_or_default()
    }

    /// Players ranked by total score; rank 1 wins
    pub fn final_standings(&self) -> Vec<Standing> {
        standings(&self.players)
    }

    /// Whether `PlaceToken { position, token_index }` would currently be accepted
    pub fn can_place_token(&self, position: HexCoord, token_index: usize) -> bool {
        self.require(TurnPhase::PlaceTokens).is_ok()
            && self
                .tokens_to_place
                .get(token_index)
                .is_some_and(|token| self.check_token_placement(position, token).is_ok())
    }

    /// Whether `PlaceAnimalEmoji(position)` would currently be accepted
    pub fn can_place_emoji(&self, position: HexCoord) -> bool {
        self.require(TurnPhase::PlaceCubes).is_ok() && self.check_emoji_placement(position).is_ok()
    }

    /// Board cells of the active player satisfying a hand card's habitat cell
    pub fn habitat_targets(&self, card_id: &str, habitat_index: usize) -> Vec<HexCoord> {
        let Some(player) = self.active_player() else {
            return Vec::new();
        };
        let Some(cell) = player
            .hand_card(card_id)
            .and_then(|card| card.habitat.get(habitat_index))
        else {
            return Vec::new();
        };
        player
            .board
            .positions()
            .into_iter()
            .filter(|&pos| !player.is_locked(pos) && cell.is_satisfied_by(&player.board.terrains_at(pos)))
            .collect()
    }

    /// Actions the active player can take that are accepted and make progress
    pub fn valid_actions(&self) -> Vec<GameAction> {
        let mut actions = Vec::new();
        if self.phase != GamePhase::Playing {
            return actions;
        }
        let Some(player) = self.active_player() else {
            return actions;
        };

        match self.turn_phase {
            TurnPhase::SelectSlot => {
                for slot in self.slots.iter().filter(|s| !s.is_empty()) {
                    actions.push(GameAction::SelectSlot(slot.id));
                }
            }

            TurnPhase::PlaceTokens => {
                let mut seen = Vec::new();
                for (token_index, token) in self.tokens_to_place.iter().enumerate() {
                    // Identical terrain gives identical placements
                    if seen.contains(&token.terrain) {
                        continue;
                    }
                    seen.push(token.terrain);
                    for position in HexCoord::board_cells() {
                        if self.check_token_placement(position, token).is_ok() {
                            actions.push(GameAction::PlaceToken {
                                position,
                                token_index,
                            });
                        }
                    }
                }
                if !self.placed_this_turn.is_empty() {
                    actions.push(GameAction::Undo);
                }
            }

            TurnPhase::TakeCard => {
                if player.hand_cards.len() < self.config.hand_limit {
                    for card in &self.deck.face_up {
                        actions.push(GameAction::TakeAnimalCard(card.id.clone()));
                    }
                }
                actions.push(GameAction::SkipTakeCard);
            }

            TurnPhase::PlaceCubes => {
                match (&self.selected_animal_card, self.selected_habitat_index) {
                    (Some(card_id), Some(index)) => {
                        for position in self.habitat_targets(card_id, index) {
                            actions.push(GameAction::PlaceAnimalEmoji(position));
                        }
                        actions.push(GameAction::SkipPlaceCubes);
                    }
                    _ => {
                        for card in &player.hand_cards {
                            for habitat_index in 0..card.habitat.len() {
                                if !player.is_habitat_filled(&card.id, habitat_index)
                                    && !self.habitat_targets(&card.id, habitat_index).is_empty()
                                {
                                    actions.push(GameAction::SelectHabitatCell {
                                        card_id: card.id.clone(),
                                        habitat_index,
                                    });
                                }
                            }
                        }
                    }
                }
                actions.push(GameAction::EndTurn);
            }
        }

        actions
    }

    // ==================== Reducer ====================

    /// Apply an action, returning the next snapshot.
    ///
    /// A rejected action yields an unchanged copy of `self`; use
    /// [`GameState::try_apply`] to learn why.
    pub fn apply_action(&self, action: GameAction) -> GameState {
        match self.try_apply(action) {
            Ok(transition) => transition.state,
            Err(_) => self.clone(),
        }
    }

    /// Apply an action, returning the next snapshot and its events, or the rejection reason
    pub fn try_apply(&self, action: GameAction) -> Result<Transition, GameError> {
        let mut next = self.clone();
        match next.step(action.clone()) {
            Ok(events) => {
                next.actions_applied += 1;
                if events.iter().any(GameEvent::is_skip) {
                    next.actions_skipped += 1;
                }
                Ok(Transition {
                    state: next,
                    events,
                })
            }
            Err(err) => {
                debug!(?action, error = %err, "action rejected");
                Err(err)
            }
        }
    }

    fn step(&mut self, action: GameAction) -> Result<Vec<GameEvent>, GameError> {
        match (&action, self.phase) {
            (GameAction::StartGame { .. }, GamePhase::Setup) => {}
            (GameAction::StartGame { .. }, _) => return Err(GameError::GameAlreadyStarted),
            (_, GamePhase::Setup) => return Err(GameError::GameNotStarted),
            (_, GamePhase::Ended) => return Err(GameError::GameOver),
            (_, GamePhase::Playing) => {}
        }

        let mut events = Vec::new();
        let player = self.current_player;

        match action {
            // ==================== Setup ====================
            GameAction::StartGame { players, solo_mode } => {
                events.push(self.start(players, solo_mode)?);
            }

            // ==================== Draft ====================
            GameAction::SelectSlot(slot_id) => {
                self.require(TurnPhase::SelectSlot)?;
                let slot = self
                    .slots
                    .iter_mut()
                    .find(|s| s.id == slot_id)
                    .ok_or(GameError::NoSuchSlot)?;
                if slot.is_empty() {
                    return Err(GameError::EmptySlot);
                }

                self.tokens_to_place = slot.take_all();
                self.selected_slot = Some(slot_id);
                self.placed_this_turn.clear();
                self.turn_phase = TurnPhase::PlaceTokens;

                events.push(GameEvent::SlotSelected {
                    player,
                    slot: slot_id,
                    tokens: self.tokens_to_place.iter().map(|t| t.terrain).collect(),
                });
            }

            GameAction::PlaceToken {
                position,
                token_index,
            } => {
                self.require(TurnPhase::PlaceTokens)?;
                let token = *self
                    .tokens_to_place
                    .get(token_index)
                    .ok_or(GameError::NoSuchToken)?;
                self.check_token_placement(position, &token)?;

                let stack_level = self
                    .get_player_mut(player)
                    .and_then(|p| p.board.place(token, position))
                    .ok_or(GameError::IllegalStack)?;
                self.tokens_to_place.remove(token_index);
                self.placed_this_turn.push(token.id);

                events.push(GameEvent::TokenPlaced {
                    player,
                    terrain: token.terrain,
                    position,
                    stack_level,
                });

                if self.tokens_to_place.is_empty() {
                    self.turn_phase = TurnPhase::TakeCard;
                }
            }

            GameAction::Undo => {
                self.require(TurnPhase::PlaceTokens)?;
                let token_id = *self.placed_this_turn.last().ok_or(GameError::NothingToUndo)?;
                let placed = self
                    .get_player_mut(player)
                    .and_then(|p| p.board.remove_top(token_id))
                    .ok_or(GameError::NothingToUndo)?;
                self.placed_this_turn.pop();
                self.tokens_to_place.push(placed.token);

                events.push(GameEvent::TokenReturned {
                    player,
                    terrain: placed.token.terrain,
                    position: placed.position,
                });
            }

            // ==================== Animal Cards ====================
            GameAction::TakeAnimalCard(card_id) => {
                self.require(TurnPhase::TakeCard)?;
                let hand_limit = self.config.hand_limit;
                let hand_size = self.hand_count(player);

                if hand_size >= hand_limit {
                    events.push(GameEvent::CardTakeSkipped {
                        player,
                        hand_full: true,
                    });
                } else {
                    let card = self
                        .deck
                        .take_face_up(&card_id)
                        .ok_or(GameError::NoSuchCard)?;
                    if let Some(p) = self.get_player_mut(player) {
                        p.hand_cards.push(card);
                    }
                    events.push(GameEvent::AnimalCardTaken { player, card_id });
                }
                self.turn_phase = TurnPhase::PlaceCubes;
            }

            GameAction::SkipTakeCard => {
                self.require(TurnPhase::TakeCard)?;
                self.turn_phase = TurnPhase::PlaceCubes;
                events.push(GameEvent::CardTakeSkipped {
                    player,
                    hand_full: false,
                });
            }

            // ==================== Animal Cubes ====================
            GameAction::SelectHabitatCell {
                card_id,
                habitat_index,
            } => {
                self.require(TurnPhase::PlaceCubes)?;
                let p = self.get_player(player).ok_or(GameError::GameNotStarted)?;
                let card = p.hand_card(&card_id).ok_or(GameError::NoSuchCard)?;
                if habitat_index >= card.habitat.len() {
                    return Err(GameError::NoSuchHabitatCell);
                }
                if p.is_habitat_filled(&card_id, habitat_index) {
                    return Err(GameError::HabitatCellFilled);
                }

                self.selected_animal_card = Some(card_id.clone());
                self.selected_habitat_index = Some(habitat_index);
                events.push(GameEvent::HabitatCellSelected {
                    player,
                    card_id,
                    habitat_index,
                });
            }

            GameAction::PlaceAnimalEmoji(position) => {
                self.require(TurnPhase::PlaceCubes)?;
                let (card_id, habitat_index, emoji) = self.check_emoji_placement(position)?;
                let round = self.round_number;

                let p = self.get_player_mut(player).ok_or(GameError::GameNotStarted)?;
                p.placed_emojis.push(PlacedAnimalEmoji {
                    card_id: card_id.clone(),
                    position,
                    emoji,
                    habitat_index,
                    round,
                });
                let completed = p.complete_if_filled(&card_id).map(|card| card.points);

                self.selected_animal_card = None;
                self.selected_habitat_index = None;

                events.push(GameEvent::AnimalPlaced {
                    player,
                    card_id: card_id.clone(),
                    habitat_index,
                    position,
                });
                if let Some(points) = completed {
                    events.push(GameEvent::AnimalCompleted {
                        player,
                        card_id,
                        points,
                    });
                }
            }

            GameAction::SkipPlaceCubes => {
                self.require(TurnPhase::PlaceCubes)?;
                self.selected_animal_card = None;
                self.selected_habitat_index = None;
                events.push(GameEvent::CubePlacementSkipped { player });
            }

            // ==================== Turn Management ====================
            GameAction::EndTurn => {
                self.require(TurnPhase::PlaceCubes)?;
                events.extend(self.end_turn());
            }
        }

        Ok(events)
    }

    // ==================== Helper Methods ====================

    fn require(&self, expected: TurnPhase) -> Result<(), GameError> {
        if self.turn_phase == expected {
            Ok(())
        } else {
            Err(GameError::InvalidPhase(self.turn_phase))
        }
    }

    fn start(&mut self, seats: Vec<PlayerSeat>, solo_mode: bool) -> Result<GameEvent, GameError> {
        if seats.is_empty() {
            return Err(GameError::NoPlayers);
        }
        if seats.len() > self.config.max_players {
            return Err(GameError::TooManyPlayers(self.config.max_players));
        }

        let solo_mode = solo_mode || seats.len() == 1;
        let mut rng = StdRng::seed_from_u64(self.rng_seed);

        let mut bag = TokenBag::generate(&self.config, &mut rng);
        self.slots = deal_initial_slots(
            &mut bag,
            self.config.slot_count(solo_mode),
            self.config.slot_size,
        );
        self.token_bag = bag;
        self.deck = AnimalDeck::shuffled(catalog(), self.config.face_up_count(solo_mode), &mut rng);

        self.players = seats
            .into_iter()
            .enumerate()
            .map(|(id, seat)| PlayerState::new(id, seat))
            .collect();
        self.phase = GamePhase::Playing;
        self.turn_phase = TurnPhase::SelectSlot;
        self.current_player = 0;
        self.round_number = 1;
        self.solo_mode = solo_mode;
        self.clear_turn_state();

        info!(
            players = self.players.len(),
            solo_mode,
            seed = self.rng_seed,
            "game started"
        );

        Ok(GameEvent::GameStarted {
            players: self.players.len(),
            solo_mode,
        })
    }

    /// Bound, lock and stacking checks for a token on the active player's board
    fn check_token_placement(&self, position: HexCoord, token: &TerrainToken) -> Result<u8, GameError> {
        if !position.is_on_board() {
            return Err(GameError::OffBoard);
        }
        let player = self.active_player().ok_or(GameError::GameNotStarted)?;
        if player.is_locked(position) {
            return Err(GameError::CellLocked);
        }
        let check = player.board.check_placement(position, token.terrain);
        if check.allowed {
            Ok(check.level)
        } else {
            Err(GameError::IllegalStack)
        }
    }

    /// Validate the pending habitat selection against a board cell
    fn check_emoji_placement(&self, position: HexCoord) -> Result<(String, usize, String), GameError> {
        let (Some(card_id), Some(habitat_index)) =
            (&self.selected_animal_card, self.selected_habitat_index)
        else {
            return Err(GameError::NoHabitatSelected);
        };
        if !position.is_on_board() {
            return Err(GameError::OffBoard);
        }

        let player = self.active_player().ok_or(GameError::GameNotStarted)?;
        let card = player.hand_card(card_id).ok_or(GameError::NoSuchCard)?;
        let cell = card
            .habitat
            .get(habitat_index)
            .ok_or(GameError::NoSuchHabitatCell)?;

        if !cell.is_satisfied_by(&player.board.terrains_at(position)) {
            return Err(GameError::HabitatMismatch);
        }
        if player.is_locked(position) {
            return Err(GameError::CellLocked);
        }

        Ok((card_id.clone(), habitat_index, card.emoji.clone()))
    }

    fn clear_turn_state(&mut self) {
        self.tokens_to_place.clear();
        self.selected_slot = None;
        self.selected_animal_card = None;
        self.selected_habitat_index = None;
        self.placed_this_turn.clear();
    }

    fn end_turn(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let finished = self.current_player;
        let slot_size = self.config.slot_size;

        if let Some(slot_id) = self.selected_slot {
            if refill_slot(&mut self.slots, &mut self.token_bag, slot_id, slot_size) {
                events.push(GameEvent::SlotRefilled {
                    slot: slot_id,
                    tokens: self.slot(slot_id).map_or(0, |s| s.tokens.len()),
                });
            }
        }

        let turned = self.deck.refill(self.config.face_up_count(self.solo_mode));
        if turned > 0 {
            events.push(GameEvent::FaceUpRefilled { cards: turned });
        }

        for p in &mut self.players {
            p.refresh_scores();
        }
        if let Some(p) = self.get_player_mut(finished) {
            p.turns_taken += 1;
        }

        let condition_met = self.token_bag.len() < slot_size
            || self
                .get_player(finished)
                .is_some_and(|p| p.board.empty_cells() <= self.config.end_empty_cells);

        let next_player = (finished + 1) % self.players.len().max(1);
        events.push(GameEvent::TurnEnded {
            player: finished,
            next_player,
        });

        self.current_player = next_player;
        self.turn_phase = TurnPhase::SelectSlot;
        self.clear_turn_state();

        let wrapped = next_player == 0;
        if wrapped {
            self.round_number += 1;
        }
        let ends = match self.config.end_rule {
            EndGameRule::Immediate => condition_met,
            EndGameRule::FinishRound => {
                self.end_triggered |= condition_met;
                let nothing_to_draft = self.slots.iter().all(TokenSlot::is_empty);
                (self.end_triggered && wrapped) || nothing_to_draft
            }
        };

        if ends {
            self.phase = GamePhase::Ended;
            let standings = self.final_standings();
            if let Some(winner) = standings.first() {
                info!(
                    winner = winner.player,
                    total = winner.total_score,
                    round = self.round_number,
                    "game ended"
                );
                events.push(GameEvent::GameEnded {
                    winner: winner.player,
                    total_score: winner.total_score,
                });
            }
        } else if wrapped {
            debug!(round = self.round_number, "round started");
            events.push(GameEvent::RoundStarted {
                round: self.round_number,
            });
        }

        events
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
