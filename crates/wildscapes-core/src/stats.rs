//! End-of-game standings and the statistics record kept for each finished game.

use crate::animals::{AnimalCard, HabitatKind};
use crate::board::Terrain;
use crate::game::GameState;
use crate::hex::{HexCoord, BOARD_CELLS};
use crate::player::{PlayerId, PlayerState};
use crate::scoring::{isolated_cells, largest_region, score_environment, EnvironmentScore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Letter grade for a final score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rating {
    S,
    A,
    B,
    C,
    D,
}

impl Rating {
    pub fn from_score(score: u32) -> Self {
        match score {
            80.. => Rating::S,
            60..=79 => Rating::A,
            40..=59 => Rating::B,
            20..=39 => Rating::C,
            _ => Rating::D,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Rating::S => "Legendary",
            Rating::A => "Excellent",
            Rating::B => "Great",
            Rating::C => "Good",
            Rating::D => "Keep trying",
        }
    }
}

/// One player's place in the final ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub player: PlayerId,
    pub name: String,
    /// 1-based; rank 1 wins
    pub rank: usize,
    pub animal_points: u32,
    pub environment: EnvironmentScore,
    pub total_score: u32,
    pub cubes_placed: usize,
    pub rating: Rating,
}

/// Rank players by total score, then animal cubes placed, then seat order
pub fn standings(players: &[PlayerState]) -> Vec<Standing> {
    let mut ranked: Vec<Standing> = players
        .iter()
        .map(|p| {
            let environment = score_environment(&p.board);
            let animal_points = p.animal_score();
            let total_score = animal_points + environment.total;
            Standing {
                player: p.id,
                name: p.name.clone(),
                rank: 0,
                animal_points,
                environment,
                total_score,
                cubes_placed: p.cubes_placed(),
                rating: Rating::from_score(total_score),
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.total_score
            .cmp(&a.total_score)
            .then(b.cubes_placed.cmp(&a.cubes_placed))
            .then(a.player.cmp(&b.player))
    });
    for (i, standing) in ranked.iter_mut().enumerate() {
        standing.rank = i + 1;
    }
    ranked
}

/// How the game was played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameMode {
    Solo,
    LocalMultiplayer,
}

/// Token and layout statistics across every player's board
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardStats {
    pub total_tokens_placed: usize,
    /// Keyed by terrain name
    pub tokens_by_terrain: BTreeMap<String, usize>,
    /// Mean height over occupied cells
    pub average_stack_height: f64,
    pub max_stack_height: usize,
    pub tallest_stack_positions: Vec<HexCoord>,
    pub largest_field_group: usize,
    pub largest_mountain_group: usize,
    pub largest_river_group: usize,
    pub isolated_tiles: usize,
    pub unused_cells: usize,
    /// Occupied share of all boards, rounded to a whole percent
    pub coverage_percent: u32,
    pub most_common_terrain: Option<Terrain>,
    pub least_common_terrain: Option<Terrain>,
}

impl BoardStats {
    pub fn from_players(players: &[PlayerState]) -> Self {
        let mut stats = BoardStats::default();
        let mut occupied = 0usize;
        let mut height_sum = 0usize;
        let mut counts: BTreeMap<Terrain, usize> = BTreeMap::new();

        for player in players {
            let board = &player.board;
            stats.total_tokens_placed += board.len();
            for (terrain, count) in board.terrain_counts() {
                *counts.entry(terrain).or_default() += count;
            }

            for position in board.positions() {
                let height = board.height_at(position);
                occupied += 1;
                height_sum += height;
                if height > stats.max_stack_height {
                    stats.max_stack_height = height;
                    stats.tallest_stack_positions.clear();
                }
                if height == stats.max_stack_height && !stats.tallest_stack_positions.contains(&position) {
                    stats.tallest_stack_positions.push(position);
                }
            }

            stats.largest_field_group = stats.largest_field_group.max(largest_region(board, Terrain::Field));
            stats.largest_mountain_group = stats
                .largest_mountain_group
                .max(largest_region(board, Terrain::Mountain));
            stats.largest_river_group = stats.largest_river_group.max(largest_region(board, Terrain::Water));
            stats.isolated_tiles += isolated_cells(board);
            stats.unused_cells += board.empty_cells();
        }

        let total_cells = BOARD_CELLS * players.len();
        if occupied > 0 {
            stats.average_stack_height = height_sum as f64 / occupied as f64;
        }
        if total_cells > 0 {
            stats.coverage_percent = ((occupied as f64 / total_cells as f64) * 100.0).round() as u32;
        }
        stats.tallest_stack_positions.sort();

        let placed: Vec<(Terrain, usize)> = counts.into_iter().filter(|&(_, n)| n > 0).collect();
        // Ties go to the terrain listed first
        stats.most_common_terrain = placed
            .iter()
            .rev()
            .max_by_key(|&&(_, n)| n)
            .map(|&(t, _)| t);
        stats.least_common_terrain = placed.iter().min_by_key(|&&(_, n)| n).map(|&(t, _)| t);
        stats.tokens_by_terrain = placed
            .into_iter()
            .map(|(t, n)| (t.name().to_string(), n))
            .collect();

        stats
    }
}

/// Progress on one collected animal card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardStat {
    pub card_id: String,
    pub name: String,
    pub habitat_kind: HabitatKind,
    pub cubes_placed: usize,
    pub cubes_required: usize,
    pub completed: bool,
    /// Card points, or 0 when unfinished
    pub points: u32,
    pub first_cube_round: Option<u32>,
    pub completion_round: Option<u32>,
}

impl CardStat {
    fn new(player: &PlayerState, card: &AnimalCard, completed: bool) -> Self {
        let rounds: Vec<u32> = player.emojis_for(&card.id).map(|e| e.round).collect();
        Self {
            card_id: card.id.clone(),
            name: card.name.clone(),
            habitat_kind: card.habitat_kind,
            cubes_placed: rounds.len(),
            cubes_required: card.cubes_required(),
            completed,
            points: if completed { card.points } else { 0 },
            first_cube_round: rounds.iter().min().copied(),
            completion_round: if completed { rounds.iter().max().copied() } else { None },
        }
    }
}

/// Animal card statistics across every player
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimalStats {
    pub total_collected: usize,
    pub total_completed: usize,
    pub total_partial: usize,
    pub total_points: u32,
    /// Share of the five habitat kinds among collected cards, 0.0 to 1.0
    pub diversity_score: f64,
    pub habitat_breakdown: BTreeMap<String, usize>,
    pub average_cubes_per_animal: f64,
    pub card_stats: Vec<CardStat>,
    pub most_valuable_animal: Option<String>,
}

impl AnimalStats {
    pub fn from_players(players: &[PlayerState]) -> Self {
        let card_stats: Vec<CardStat> = players
            .iter()
            .flat_map(|p| {
                p.completed_cards
                    .iter()
                    .map(move |c| CardStat::new(p, c, true))
                    .chain(p.hand_cards.iter().map(move |c| CardStat::new(p, c, false)))
            })
            .collect();

        let total_collected = card_stats.len();
        let total_completed = card_stats.iter().filter(|c| c.completed).count();
        let total_cubes: usize = card_stats.iter().map(|c| c.cubes_placed).sum();

        let mut habitat_breakdown = BTreeMap::new();
        for stat in &card_stats {
            *habitat_breakdown
                .entry(stat.habitat_kind.name().to_string())
                .or_insert(0) += 1;
        }

        let most_valuable_animal = card_stats
            .iter()
            .filter(|c| c.completed)
            .rev()
            .max_by_key(|c| c.points)
            .map(|c| c.name.clone());

        Self {
            total_collected,
            total_completed,
            total_partial: total_collected - total_completed,
            total_points: card_stats.iter().map(|c| c.points).sum(),
            diversity_score: habitat_breakdown.len() as f64 / HabitatKind::ALL.len() as f64,
            habitat_breakdown,
            average_cubes_per_animal: if total_collected > 0 {
                total_cubes as f64 / total_collected as f64
            } else {
                0.0
            },
            card_stats,
            most_valuable_animal,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallGameStats {
    /// Sum of every player's total
    pub final_score: u32,
    pub environment_points: u32,
    pub animal_points: u32,
    pub turns_taken: u32,
    pub rounds_played: u32,
    pub total_actions: u32,
    pub skipped_actions: u32,
    pub player_count: usize,
    pub average_score_per_player: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerGameStats {
    /// Persistent profile, when the seat had one
    pub profile_id: Option<Uuid>,
    pub seat: PlayerId,
    pub player_name: String,
    pub final_score: u32,
    pub environment_points: u32,
    pub animal_points: u32,
    pub turns_taken: u32,
    pub tokens_placed: usize,
    pub animals_completed: usize,
    pub rank: usize,
    pub is_winner: bool,
    pub rating: Rating,
}

/// Record persisted once per finished game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStats {
    pub id: Uuid,
    pub game_id: String,
    pub mode: GameMode,
    /// Unix seconds
    pub created_at: u64,
    pub seed: u64,
    pub board: BoardStats,
    pub animals: AnimalStats,
    pub overall: OverallGameStats,
    pub players: Vec<PlayerGameStats>,
}

impl GameStats {
    pub fn from_game(state: &GameState, game_id: impl Into<String>, created_at: u64) -> Self {
        let standings = state.final_standings();

        let players: Vec<PlayerGameStats> = standings
            .iter()
            .filter_map(|s| {
                let p = state.get_player(s.player)?;
                Some(PlayerGameStats {
                    profile_id: p.profile_id,
                    seat: p.id,
                    player_name: p.name.clone(),
                    final_score: s.total_score,
                    environment_points: s.environment.total,
                    animal_points: s.animal_points,
                    turns_taken: p.turns_taken,
                    tokens_placed: p.board.len(),
                    animals_completed: p.completed_cards.len(),
                    rank: s.rank,
                    is_winner: s.rank == 1,
                    rating: s.rating,
                })
            })
            .collect();

        let final_score: u32 = players.iter().map(|p| p.final_score).sum();
        let overall = OverallGameStats {
            final_score,
            environment_points: players.iter().map(|p| p.environment_points).sum(),
            animal_points: players.iter().map(|p| p.animal_points).sum(),
            turns_taken: players.iter().map(|p| p.turns_taken).sum(),
            rounds_played: state.round_number,
            total_actions: state.actions_applied,
            skipped_actions: state.actions_skipped,
            player_count: players.len(),
            average_score_per_player: if players.is_empty() {
                0.0
            } else {
                final_score as f64 / players.len() as f64
            },
        };

        Self {
            id: Uuid::new_v4(),
            game_id: game_id.into(),
            mode: if state.solo_mode {
                GameMode::Solo
            } else {
                GameMode::LocalMultiplayer
            },
            created_at,
            seed: state.seed(),
            board: BoardStats::from_players(&state.players),
            animals: AnimalStats::from_players(&state.players),
            overall,
            players,
        }
    }

    pub fn winner(&self) -> Option<&PlayerGameStats> {
        self.players.iter().find(|p| p.is_winner)
    }
}
