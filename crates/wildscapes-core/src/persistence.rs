//! Persistence collaborator: user and player profiles plus finished-game records.
//!
//! The engine never depends on a store to keep playing. [`record_finished_game`]
//! builds the statistics record first and only then tries to persist it, so a
//! failing store costs the saved copy, never the local result. Profiles are
//! looked up before anything is written; a game is reported as [`SaveStatus::Partial`]
//! when its record landed but some profile totals did not.

use crate::game::GameState;
use crate::stats::GameStats;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record {0} already exists")]
    Duplicate(Uuid),

    #[error("Record {0} not found")]
    NotFound(Uuid),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed store data: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A person who can own several player profiles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub display_name: String,
    pub avatar_emoji: String,
    pub handle: String,
    pub player_ids: Vec<Uuid>,
    pub created_at: u64,
    pub updated_at: u64,
}

/// A playing identity with lifetime totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub display_name: String,
    pub avatar_emoji: String,
    pub color_theme: String,
    pub total_games_played: u32,
    pub total_points_earned: u32,
    pub highest_score: u32,
    pub created_at: u64,
    pub updated_at: u64,
}

impl PlayerProfile {
    /// Fold one finished game into the lifetime totals
    pub fn record_game(&mut self, final_score: u32, now: u64) {
        self.total_games_played += 1;
        self.total_points_earned += final_score;
        self.highest_score = self.highest_score.max(final_score);
        self.updated_at = now;
    }
}

/// Storage for users, player profiles and game records
pub trait ProfileStore {
    fn create_user(&mut self, user: UserRecord) -> Result<UserRecord, StoreError>;

    fn create_player(&mut self, player: PlayerProfile) -> Result<PlayerProfile, StoreError>;

    /// Remove a user record
    fn delete_user(&mut self, user_id: Uuid) -> Result<(), StoreError>;

    /// Replace an existing profile
    fn update_player(&mut self, player: PlayerProfile) -> Result<PlayerProfile, StoreError>;

    fn get_users(&self) -> Result<Vec<UserRecord>, StoreError>;

    fn get_players(&self) -> Result<Vec<PlayerProfile>, StoreError>;

    fn create_game_stats(&mut self, stats: GameStats) -> Result<GameStats, StoreError>;

    fn get_game_stats(&self) -> Result<Vec<GameStats>, StoreError>;
}

/// Store kept entirely in memory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    pub users: Vec<UserRecord>,
    pub players: Vec<PlayerProfile>,
    pub games: Vec<GameStats>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for MemoryStore {
    fn create_user(&mut self, user: UserRecord) -> Result<UserRecord, StoreError> {
        if self.users.iter().any(|u| u.id == user.id) {
            return Err(StoreError::Duplicate(user.id));
        }
        self.users.push(user.clone());
        Ok(user)
    }

    fn create_player(&mut self, player: PlayerProfile) -> Result<PlayerProfile, StoreError> {
        if self.players.iter().any(|p| p.id == player.id) {
            return Err(StoreError::Duplicate(player.id));
        }
        self.players.push(player.clone());
        Ok(player)
    }

    fn delete_user(&mut self, user_id: Uuid) -> Result<(), StoreError> {
        let before = self.users.len();
        self.users.retain(|u| u.id != user_id);
        if self.users.len() == before {
            return Err(StoreError::NotFound(user_id));
        }
        Ok(())
    }

    fn update_player(&mut self, player: PlayerProfile) -> Result<PlayerProfile, StoreError> {
        let slot = self
            .players
            .iter_mut()
            .find(|p| p.id == player.id)
            .ok_or(StoreError::NotFound(player.id))?;
        *slot = player.clone();
        Ok(player)
    }

    fn get_users(&self) -> Result<Vec<UserRecord>, StoreError> {
        Ok(self.users.clone())
    }

    fn get_players(&self) -> Result<Vec<PlayerProfile>, StoreError> {
        Ok(self.players.clone())
    }

    fn create_game_stats(&mut self, stats: GameStats) -> Result<GameStats, StoreError> {
        if self.games.iter().any(|g| g.id == stats.id) {
            return Err(StoreError::Duplicate(stats.id));
        }
        self.games.push(stats.clone());
        Ok(stats)
    }

    fn get_game_stats(&self) -> Result<Vec<GameStats>, StoreError> {
        Ok(self.games.clone())
    }
}

/// Seconds since the Unix epoch
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Create a user together with one linked player profile.
///
/// If the profile cannot be created the user is removed again, so no user is
/// left pointing at a missing profile.
pub fn create_user_with_default_player<S: ProfileStore + ?Sized>(
    store: &mut S,
    display_name: &str,
    handle: &str,
    avatar_emoji: &str,
) -> Result<(UserRecord, PlayerProfile), StoreError> {
    let now = unix_now();
    let user_id = Uuid::new_v4();
    let player_id = Uuid::new_v4();

    let user = store.create_user(UserRecord {
        id: user_id,
        display_name: display_name.to_string(),
        avatar_emoji: avatar_emoji.to_string(),
        handle: handle.to_string(),
        player_ids: vec![player_id],
        created_at: now,
        updated_at: now,
    })?;
    let created = store.create_player(PlayerProfile {
        id: player_id,
        user_id,
        display_name: display_name.to_string(),
        avatar_emoji: avatar_emoji.to_string(),
        color_theme: "forest".to_string(),
        total_games_played: 0,
        total_points_earned: 0,
        highest_score: 0,
        created_at: now,
        updated_at: now,
    });
    match created {
        Ok(player) => Ok((user, player)),
        Err(err) => {
            if let Err(cleanup) = store.delete_user(user_id) {
                warn!(user = %user_id, error = %cleanup, "could not remove user without a profile");
            }
            Err(err)
        }
    }
}

/// How much of a finished game reached the store
#[derive(Debug)]
pub enum SaveStatus {
    /// The game record and every linked profile were written
    Saved,
    /// The game record was written; these profiles were not updated
    Partial(Vec<(Uuid, StoreError)>),
    /// Nothing was written
    NotSaved(StoreError),
}

impl SaveStatus {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveStatus::Saved)
    }

    /// Whether the game record itself is in the store
    pub fn game_recorded(&self) -> bool {
        !matches!(self, SaveStatus::NotSaved(_))
    }
}

/// A finished game's statistics and whether they reached the store
#[derive(Debug)]
pub struct RecordedGame {
    pub stats: GameStats,
    pub persisted: SaveStatus,
}

/// Build the statistics for a finished game and try to persist them.
///
/// Profiles of seated players are updated with the game's scores. Any store
/// failure is logged and reported in `persisted`; `stats` is always complete.
pub fn record_finished_game<S: ProfileStore + ?Sized>(
    store: &mut S,
    state: &GameState,
    game_id: &str,
) -> RecordedGame {
    let now = unix_now();
    let stats = GameStats::from_game(state, game_id, now);

    let persisted = persist(store, &stats, now);
    match &persisted {
        SaveStatus::Saved => info!(game_id, players = stats.players.len(), "game stats saved"),
        SaveStatus::Partial(failed) => {
            for (profile, err) in failed {
                warn!(game_id, %profile, error = %err, "game saved but profile not updated");
            }
        }
        SaveStatus::NotSaved(err) => warn!(game_id, error = %err, "failed to save game stats"),
    }

    RecordedGame { stats, persisted }
}

fn persist<S: ProfileStore + ?Sized>(store: &mut S, stats: &GameStats, now: u64) -> SaveStatus {
    let profiles = match store.get_players() {
        Ok(profiles) => profiles,
        Err(err) => return SaveStatus::NotSaved(err),
    };

    let mut failed = Vec::new();
    let mut updates = Vec::new();
    for seat in &stats.players {
        let Some(profile_id) = seat.profile_id else {
            continue;
        };
        match profiles.iter().find(|p| p.id == profile_id) {
            Some(profile) => {
                let mut profile = profile.clone();
                profile.record_game(seat.final_score, now);
                updates.push(profile);
            }
            None => failed.push((profile_id, StoreError::NotFound(profile_id))),
        }
    }

    if let Err(err) = store.create_game_stats(stats.clone()) {
        return SaveStatus::NotSaved(err);
    }

    for profile in updates {
        let id = profile.id;
        if let Err(err) = store.update_player(profile) {
            failed.push((id, err));
        }
    }

    if failed.is_empty() {
        SaveStatus::Saved
    } else {
        SaveStatus::Partial(failed)
    }
}
