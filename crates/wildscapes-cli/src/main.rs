//! Wildscapes command-line table.
//!
//! Seats the configured players, lets bots play a full game through the
//! engine, records the result in a JSON store and prints the standings.

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;
use wildscapes_core::persistence::{create_user_with_default_player, record_finished_game};
use wildscapes_core::{ProfileStore, SaveStatus, Standing};

mod settings;
mod store;
mod table;

use settings::Settings;
use store::JsonFileStore;
use table::GameTable;

const MAX_ACTIONS: usize = 20_000;

const AVATARS: [&str; 4] = ["🦊", "🐻", "🦉", "🦫"];

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env()?;
    let mut store = JsonFileStore::open(&settings.store_path)?;
    info!(store = %store.path().display(), players = settings.players.len(), "starting Wildscapes");

    let mut table = GameTable::new(settings.game_config(), settings.seed);
    for (i, name) in settings.players.iter().enumerate() {
        let profile_id = resolve_profile(&mut store, name, AVATARS[i % AVATARS.len()]);
        table.add_seat(name.clone(), profile_id)?;
    }

    table.start(settings.bot)?;
    let actions = table.play_to_end(MAX_ACTIONS)?;
    info!(actions, rounds = table.game().round_number, "game over");

    let recorded = record_finished_game(&mut store, table.game(), &table.id.to_string());
    match &recorded.persisted {
        SaveStatus::Saved => {}
        SaveStatus::Partial(failed) => {
            eprintln!("warning: game saved, but {} profile(s) were not updated", failed.len());
        }
        SaveStatus::NotSaved(err) => eprintln!("warning: results were not saved: {err}"),
    }

    print_standings(&table.standings(), table.game().seed());
    println!("{}", serde_json::to_string_pretty(&table.summary())?);
    Ok(())
}

/// Find the profile named `name`, creating a user and profile if there is none.
/// Store trouble only costs the link to a profile.
fn resolve_profile(store: &mut JsonFileStore, name: &str, avatar: &str) -> Option<Uuid> {
    let existing = match store.get_players() {
        Ok(players) => players.into_iter().find(|p| p.display_name == name),
        Err(err) => {
            warn!(name, error = %err, "could not read profiles");
            return None;
        }
    };
    if let Some(profile) = existing {
        return Some(profile.id);
    }

    let handle = name.to_lowercase().replace(' ', "-");
    match create_user_with_default_player(store, name, &handle, avatar) {
        Ok((_, profile)) => {
            info!(name, profile = %profile.id, "created profile");
            Some(profile.id)
        }
        Err(err) => {
            warn!(name, error = %err, "could not create profile");
            None
        }
    }
}

fn print_standings(standings: &[Standing], seed: u64) {
    println!("Final standings (seed {seed})");
    for s in standings {
        let env = &s.environment;
        println!(
            "#{} {:<12} {:>3} pts [{:?}: {}]  animals {:>2}  trees {:>2}  mountains {:>2}  fields {:>2}  buildings {:>2}  rivers {:>2}",
            s.rank,
            s.name,
            s.total_score,
            s.rating,
            s.rating.label(),
            s.animal_points,
            env.trees,
            env.mountains,
            env.fields,
            env.buildings,
            env.rivers,
        );
    }
}
