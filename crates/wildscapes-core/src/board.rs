//! Terrain tokens and the per-player hex board.
//!
//! This module contains:
//! - Terrain types and the tokens drawn from the bag
//! - The stacking rules deciding what may go on top of what
//! - The player board: a multiset of placed tokens with stack queries

use crate::hex::{HexCoord, BOARD_CELLS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Tallest stack allowed on a single cell
pub const MAX_STACK_HEIGHT: usize = 3;

/// Tallest pile of trunks allowed under a treetop
pub const MAX_TRUNK_HEIGHT: usize = 2;

/// Terrain printed on a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    /// Yellow field, always flat
    Field,
    /// Blue water, always flat
    Water,
    /// Grey mountain, stacks up to three high
    Mountain,
    /// Brown tree trunk
    Trunk,
    /// Green tree canopy, caps a tree
    Treetop,
    /// Red roof, caps a building
    Building,
}

impl Terrain {
    /// All terrain types
    pub const ALL: [Terrain; 6] = [
        Terrain::Field,
        Terrain::Water,
        Terrain::Mountain,
        Terrain::Trunk,
        Terrain::Treetop,
        Terrain::Building,
    ];

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Terrain::Field => "Field",
            Terrain::Water => "Water",
            Terrain::Mountain => "Mountain",
            Terrain::Trunk => "Trunk",
            Terrain::Treetop => "Tree Top",
            Terrain::Building => "Building",
        }
    }

    /// Field and water lie flat: they only go on empty cells and nothing goes on them
    pub fn is_flat(&self) -> bool {
        matches!(self, Terrain::Field | Terrain::Water)
    }

    /// Terrain that can carry a building roof
    pub fn is_building_base(&self) -> bool {
        matches!(self, Terrain::Trunk | Terrain::Mountain | Terrain::Building)
    }
}

impl std::fmt::Display for Terrain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A single token from the bag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TerrainToken {
    /// Unique id within one game
    pub id: u32,
    pub terrain: Terrain,
}

impl TerrainToken {
    pub const fn new(id: u32, terrain: Terrain) -> Self {
        Self { id, terrain }
    }
}

/// A token sitting on a player's board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlacedToken {
    pub token: TerrainToken,
    pub position: HexCoord,
    /// Zero-indexed height within the stack at `position`
    pub stack_level: u8,
}

impl PlacedToken {
    pub fn terrain(&self) -> Terrain {
        self.token.terrain
    }
}

/// Outcome of asking whether a terrain can go on a stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackCheck {
    pub allowed: bool,
    /// Level the new token would occupy (the current stack height)
    pub level: u8,
}

/// Decide whether `terrain` may be placed on `stack` (bottom first).
///
/// Rules, in priority order:
/// 1. An empty cell accepts anything at level 0.
/// 2. A stack of height 3 accepts nothing.
/// 3. Field and water are flat: never placed on top of anything, never built upon.
/// 4. Nothing goes on a treetop.
/// 5. A building roof goes on trunk, mountain or building.
/// 6. Mountain on mountain while the result stays within height 3.
/// 7. Trunk on trunk while the result stays within height 2; treetop on any trunk.
/// 8. Everything else is rejected.
pub fn can_place(stack: &[Terrain], terrain: Terrain) -> StackCheck {
    let height = stack.len();
    let level = height as u8;
    let allowed = match stack.last() {
        None => true,
        Some(_) if height >= MAX_STACK_HEIGHT => false,
        Some(top) if top.is_flat() || terrain.is_flat() => false,
        Some(Terrain::Treetop) => false,
        Some(top) if terrain == Terrain::Building && top.is_building_base() => true,
        Some(Terrain::Mountain) => terrain == Terrain::Mountain,
        Some(Terrain::Trunk) => match terrain {
            Terrain::Trunk => height < MAX_TRUNK_HEIGHT,
            Terrain::Treetop => true,
            _ => false,
        },
        Some(_) => false,
    };
    StackCheck { allowed, level }
}

/// A player's personal board
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// Placed tokens in placement order
    tokens: Vec<PlacedToken>,
}

impl Board {
    /// Create an empty board
    pub fn new() -> Self {
        Self::default()
    }

    /// Every placed token, in placement order
    pub fn tokens(&self) -> &[PlacedToken] {
        &self.tokens
    }

    /// Number of tokens on the board (not cells)
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens at a cell, bottom first
    pub fn stack_at(&self, position: HexCoord) -> Vec<&PlacedToken> {
        let mut stack: Vec<&PlacedToken> = self
            .tokens
            .iter()
            .filter(|t| t.position == position)
            .collect();
        stack.sort_by_key(|t| t.stack_level);
        stack
    }

    /// Terrain at a cell, bottom first
    pub fn terrains_at(&self, position: HexCoord) -> Vec<Terrain> {
        self.stack_at(position).iter().map(|t| t.terrain()).collect()
    }

    /// Number of tokens stacked on a cell
    pub fn height_at(&self, position: HexCoord) -> usize {
        self.tokens.iter().filter(|t| t.position == position).count()
    }

    /// Highest token on a cell
    pub fn top_at(&self, position: HexCoord) -> Option<&PlacedToken> {
        self.tokens
            .iter()
            .filter(|t| t.position == position)
            .max_by_key(|t| t.stack_level)
    }

    /// Terrain of the highest token on a cell
    pub fn top_terrain_at(&self, position: HexCoord) -> Option<Terrain> {
        self.top_at(position).map(PlacedToken::terrain)
    }

    /// Whether a cell carries at least one token
    pub fn is_occupied(&self, position: HexCoord) -> bool {
        self.tokens.iter().any(|t| t.position == position)
    }

    /// Distinct occupied cells, sorted
    pub fn positions(&self) -> Vec<HexCoord> {
        self.tokens
            .iter()
            .map(|t| t.position)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Number of distinct occupied cells
    pub fn occupied_cells(&self) -> usize {
        self.positions().len()
    }

    /// Number of cells still without any token
    pub fn empty_cells(&self) -> usize {
        BOARD_CELLS.saturating_sub(self.occupied_cells())
    }

    /// Run the stacking rules for a terrain at a cell, including the bound check
    pub fn check_placement(&self, position: HexCoord, terrain: Terrain) -> StackCheck {
        let check = can_place(&self.terrains_at(position), terrain);
        StackCheck {
            allowed: check.allowed && position.is_on_board(),
            ..check
        }
    }

    /// Place a token on top of the stack at `position`.
    ///
    /// Returns the stack level the token landed on, or `None` if the stacking
    /// rules or the bound check reject it.
    pub fn place(&mut self, token: TerrainToken, position: HexCoord) -> Option<u8> {
        let check = self.check_placement(position, token.terrain);
        if !check.allowed {
            return None;
        }

        self.tokens.push(PlacedToken {
            token,
            position,
            stack_level: check.level,
        });
        debug_assert!(self.height_at(position) <= MAX_STACK_HEIGHT);
        debug_assert!(self.is_consistent());
        Some(check.level)
    }

    /// Remove a token by id if it is the top of its stack
    pub fn remove_top(&mut self, token_id: u32) -> Option<PlacedToken> {
        let placed = *self.tokens.iter().find(|t| t.token.id == token_id)?;
        if self.top_at(placed.position).map(|t| t.token.id) != Some(token_id) {
            return None;
        }
        self.tokens.retain(|t| t.token.id != token_id);
        Some(placed)
    }

    /// Count of tokens per terrain
    pub fn terrain_counts(&self) -> Vec<(Terrain, usize)> {
        Terrain::ALL
            .iter()
            .map(|&terrain| {
                let count = self.tokens.iter().filter(|t| t.terrain() == terrain).count();
                (terrain, count)
            })
            .collect()
    }

    /// Every cell holds levels `0..k` with no gaps or duplicates and `k <= 3`
    pub fn is_consistent(&self) -> bool {
        self.positions().into_iter().all(|position| {
            let stack = self.stack_at(position);
            stack.len() <= MAX_STACK_HEIGHT
                && stack
                    .iter()
                    .enumerate()
                    .all(|(i, t)| t.stack_level as usize == i)
        })
    }
}
