//! A game table: seats, the running game and the bots playing it.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;
use wildscapes_core::game::entropy_seed;
use wildscapes_core::{
    Bot, BotDifficulty, GameAction, GameConfig, GameError, GameEvent, GameState, PlayerSeat,
    Standing,
};

#[derive(Debug, Error)]
pub enum TableError {
    #[error("Table is full")]
    TableFull,

    #[error("No one is seated")]
    NoSeats,

    #[error("Game already started")]
    GameAlreadyStarted,

    #[error("Game not started")]
    GameNotStarted,

    #[error("Bot for seat {0} found no action")]
    Stalled(usize),

    #[error("Game did not finish within {0} actions")]
    TooManyActions(usize),

    #[error("Invalid action: {0}")]
    InvalidAction(#[from] GameError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TableStatus {
    Waiting,
    InGame,
    Finished,
}

/// Someone sitting at the table
#[derive(Debug, Clone)]
pub struct TableSeat {
    pub name: String,
    pub profile_id: Option<Uuid>,
}

pub struct GameTable {
    pub id: Uuid,
    pub status: TableStatus,
    pub seats: Vec<TableSeat>,
    game: GameState,
    bots: Vec<Bot>,
}

impl GameTable {
    pub fn new(config: GameConfig, seed: Option<u64>) -> Self {
        let game = GameState::with_config(config, seed.unwrap_or_else(entropy_seed));
        Self {
            id: Uuid::new_v4(),
            status: TableStatus::Waiting,
            seats: Vec::new(),
            game,
            bots: Vec::new(),
        }
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn is_full(&self) -> bool {
        self.seats.len() >= self.game.config.max_players
    }

    pub fn add_seat(&mut self, name: impl Into<String>, profile_id: Option<Uuid>) -> Result<usize, TableError> {
        if self.status != TableStatus::Waiting {
            return Err(TableError::GameAlreadyStarted);
        }
        if self.is_full() {
            return Err(TableError::TableFull);
        }
        self.seats.push(TableSeat {
            name: name.into(),
            profile_id,
        });
        Ok(self.seats.len() - 1)
    }

    /// Start the game with a bot of `difficulty` behind every seat
    pub fn start(&mut self, difficulty: BotDifficulty) -> Result<Vec<GameEvent>, TableError> {
        if self.status != TableStatus::Waiting {
            return Err(TableError::GameAlreadyStarted);
        }
        if self.seats.is_empty() {
            return Err(TableError::NoSeats);
        }

        let players = self
            .seats
            .iter()
            .map(|seat| match seat.profile_id {
                Some(id) => PlayerSeat::with_profile(seat.name.clone(), id),
                None => PlayerSeat::named(seat.name.clone()),
            })
            .collect();
        let events = self.apply_action(GameAction::StartGame {
            players,
            solo_mode: self.seats.len() == 1,
        })?;

        let seed = self.game.seed();
        self.bots = (0..self.seats.len())
            .map(|i| Bot::with_seed(i, difficulty, seed.wrapping_add(i as u64 + 1)))
            .collect();
        self.status = TableStatus::InGame;
        info!(table = %self.id, seats = self.seats.len(), ?difficulty, "table started");
        Ok(events)
    }

    pub fn apply_action(&mut self, action: GameAction) -> Result<Vec<GameEvent>, TableError> {
        let transition = self.game.try_apply(action)?;
        self.game = transition.state;
        if self.game.is_finished() {
            self.status = TableStatus::Finished;
        }
        Ok(transition.events)
    }

    /// Let the bot of the active seat take one action
    pub fn step_bot(&mut self) -> Result<Vec<GameEvent>, TableError> {
        if self.status != TableStatus::InGame {
            return Err(TableError::GameNotStarted);
        }
        let seat = self.game.current_player;
        let action = self
            .bots
            .get_mut(seat)
            .and_then(|bot| bot.choose_action(&self.game))
            .ok_or(TableError::Stalled(seat))?;
        debug!(seat, ?action, "bot action");
        self.apply_action(action)
    }

    /// Run bots until the game ends. Returns the number of actions taken.
    pub fn play_to_end(&mut self, max_actions: usize) -> Result<usize, TableError> {
        let mut taken = 0;
        while self.status == TableStatus::InGame {
            if taken >= max_actions {
                return Err(TableError::TooManyActions(max_actions));
            }
            self.step_bot()?;
            taken += 1;
        }
        Ok(taken)
    }

    pub fn standings(&self) -> Vec<Standing> {
        self.game.final_standings()
    }

    pub fn summary(&self) -> TableSummary {
        TableSummary {
            id: self.id,
            status: self.status,
            seed: self.game.seed(),
            rounds: self.game.round_number,
            actions: self.game.actions_applied,
            standings: self.standings(),
        }
    }
}

/// Printable snapshot of a table
#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    pub id: Uuid,
    pub status: TableStatus,
    pub seed: u64,
    pub rounds: u32,
    pub actions: u32,
    pub standings: Vec<Standing>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with(names: &[&str], seed: u64) -> GameTable {
        let mut table = GameTable::new(GameConfig::default(), Some(seed));
        for name in names {
            table.add_seat(*name, None).unwrap();
        }
        table
    }

    #[test]
    fn test_create_table() {
        let table = table_with(&["Host"], 1);
        assert_eq!(table.seats.len(), 1);
        assert!(!table.is_full());
        assert_eq!(table.status, TableStatus::Waiting);
    }

    #[test]
    fn test_seat_limit() {
        let mut table = table_with(&["A", "B", "C", "D"], 1);
        assert!(table.is_full());
        assert!(matches!(table.add_seat("E", None), Err(TableError::TableFull)));
    }

    #[test]
    fn test_start_requires_seats() {
        let mut table = table_with(&[], 1);
        assert!(matches!(table.start(BotDifficulty::Random), Err(TableError::NoSeats)));
        assert!(matches!(table.step_bot(), Err(TableError::GameNotStarted)));
    }

    #[test]
    fn test_start_and_play_to_end() {
        let mut table = table_with(&["A", "B"], 5);
        let events = table.start(BotDifficulty::Greedy).unwrap();
        assert_eq!(
            events,
            vec![GameEvent::GameStarted {
                players: 2,
                solo_mode: false
            }]
        );
        assert!(matches!(table.add_seat("Late", None), Err(TableError::GameAlreadyStarted)));

        let taken = table.play_to_end(10_000).unwrap();
        assert!(taken > 0);
        assert_eq!(table.status, TableStatus::Finished);

        let summary = table.summary();
        assert_eq!(summary.standings.len(), 2);
        assert_eq!(summary.seed, 5);
    }

    #[test]
    fn test_rejected_action_reports_reason() {
        let mut table = table_with(&["Solo"], 3);
        table.start(BotDifficulty::Random).unwrap();
        let err = table.apply_action(GameAction::EndTurn).unwrap_err();
        assert!(matches!(err, TableError::InvalidAction(GameError::InvalidPhase(_))));
    }
}
