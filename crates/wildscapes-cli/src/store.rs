//! Profile store backed by a single JSON file.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;
use wildscapes_core::persistence::{MemoryStore, PlayerProfile, ProfileStore, StoreError, UserRecord};
use uuid::Uuid;
use wildscapes_core::GameStats;

/// Keeps every record in memory and rewrites the file after each change
pub struct JsonFileStore {
    path: PathBuf,
    data: MemoryStore,
}

impl JsonFileStore {
    /// Load the store at `path`, starting empty if the file does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => MemoryStore::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == ErrorKind::NotFound => MemoryStore::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), games = data.games.len(), "store opened");
        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(&self.data)?;
        fs::write(&self.path, text)?;
        Ok(())
    }

    /// Apply a change to the in-memory copy, then persist it. The change is
    /// rolled back if writing fails.
    fn commit<T>(&mut self, change: impl FnOnce(&mut MemoryStore) -> Result<T, StoreError>) -> Result<T, StoreError> {
        let before = self.data.clone();
        let value = change(&mut self.data)?;
        if let Err(e) = self.save() {
            self.data = before;
            return Err(e);
        }
        Ok(value)
    }
}

impl ProfileStore for JsonFileStore {
    fn create_user(&mut self, user: UserRecord) -> Result<UserRecord, StoreError> {
        self.commit(|data| data.create_user(user))
    }

    fn create_player(&mut self, player: PlayerProfile) -> Result<PlayerProfile, StoreError> {
        self.commit(|data| data.create_player(player))
    }

    fn delete_user(&mut self, user_id: Uuid) -> Result<(), StoreError> {
        self.commit(|data| data.delete_user(user_id))
    }

    fn update_player(&mut self, player: PlayerProfile) -> Result<PlayerProfile, StoreError> {
        self.commit(|data| data.update_player(player))
    }

    fn get_users(&self) -> Result<Vec<UserRecord>, StoreError> {
        self.data.get_users()
    }

    fn get_players(&self) -> Result<Vec<PlayerProfile>, StoreError> {
        self.data.get_players()
    }

    fn create_game_stats(&mut self, stats: GameStats) -> Result<GameStats, StoreError> {
        self.commit(|data| data.create_game_stats(stats))
    }

    fn get_game_stats(&self) -> Result<Vec<GameStats>, StoreError> {
        self.data.get_game_stats()
    }
}
