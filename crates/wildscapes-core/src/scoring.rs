//! Environment scoring.
//!
//! Every category is recomputed from the board alone:
//! - Trees: each treetop scores by the height of its tree
//! - Mountains: connected ranges of equal height, scored per mountain
//! - Fields: connected fields, 5 points per pair
//! - Buildings: each roof standing on a base
//! - Rivers: connected water, scored by length

use crate::board::{Board, PlacedToken, Terrain};
use crate::hex::HexCoord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Points per connected pair of fields
const FIELD_PAIR_POINTS: u32 = 5;

/// Points per building stack
const BUILDING_POINTS: u32 = 2;

/// Environment points of one board, by category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnvironmentScore {
    pub trees: u32,
    pub mountains: u32,
    pub fields: u32,
    pub buildings: u32,
    pub rivers: u32,
    pub total: u32,
}

/// Score every category of a board
pub fn score_environment(board: &Board) -> EnvironmentScore {
    let tops = TopMap::new(board);
    let trees = score_trees(board);
    let mountains = score_mountains_with(&tops);
    let fields = score_fields_with(&tops);
    let buildings = score_buildings(board);
    let rivers = score_rivers_with(&tops);

    EnvironmentScore {
        trees,
        mountains,
        fields,
        buildings,
        rivers,
        total: trees + mountains + fields + buildings + rivers,
    }
}

/// Points for a tree of the given height (treetop plus trunks below it)
pub fn tree_points(height: usize) -> u32 {
    match height {
        1 => 1,
        2 => 3,
        3 => 7,
        _ => 0,
    }
}

/// Points for one mountain of the given height
pub fn mountain_points(height: usize) -> u32 {
    match height {
        1 => 1,
        2 => 3,
        3 => 6,
        _ => 0,
    }
}

/// Points for a river of the given length
pub fn river_points(length: usize) -> u32 {
    match length {
        0 | 1 => 0,
        2 => 2,
        3 => 5,
        4 => 8,
        5 => 11,
        6 => 15,
        n => 15 + 4 * (n as u32 - 6),
    }
}

/// Points for a connected field region
pub fn field_points(size: usize) -> u32 {
    (size as u32 / 2) * FIELD_PAIR_POINTS
}

pub fn score_trees(board: &Board) -> u32 {
    board
        .positions()
        .into_iter()
        .filter_map(|position| {
            let stack = board.stack_at(position);
            let treetop = stack.iter().find(|t| t.terrain() == Terrain::Treetop)?;
            let trunks = stack
                .iter()
                .filter(|t| t.terrain() == Terrain::Trunk && t.stack_level < treetop.stack_level)
                .count();
            Some(tree_points(1 + trunks))
        })
        .sum()
}

pub fn score_mountains(board: &Board) -> u32 {
    score_mountains_with(&TopMap::new(board))
}

pub fn score_fields(board: &Board) -> u32 {
    score_fields_with(&TopMap::new(board))
}

pub fn score_buildings(board: &Board) -> u32 {
    board
        .positions()
        .into_iter()
        .filter(|&position| {
            let stack = board.stack_at(position);
            stack
                .iter()
                .filter(|t| t.terrain() == Terrain::Building)
                .any(|roof| {
                    stack
                        .iter()
                        .any(|t| t.terrain().is_building_base() && t.stack_level < roof.stack_level)
                })
        })
        .count() as u32
        * BUILDING_POINTS
}

pub fn score_rivers(board: &Board) -> u32 {
    score_rivers_with(&TopMap::new(board))
}

fn score_mountains_with(tops: &TopMap) -> u32 {
    tops.regions(|top| (top.terrain() == Terrain::Mountain).then_some(top.stack_level))
        .into_iter()
        .map(|(level, cells)| cells.len() as u32 * mountain_points(level as usize + 1))
        .sum()
}

fn score_fields_with(tops: &TopMap) -> u32 {
    tops.regions(|top| (top.terrain() == Terrain::Field).then_some(()))
        .into_iter()
        .map(|(_, cells)| field_points(cells.len()))
        .sum()
}

fn score_rivers_with(tops: &TopMap) -> u32 {
    tops.regions(|top| (top.terrain() == Terrain::Water).then_some(()))
        .into_iter()
        .map(|(_, cells)| river_points(cells.len()))
        .sum()
}

/// Size of the largest connected region whose top token shows `terrain`
pub fn largest_region(board: &Board, terrain: Terrain) -> usize {
    TopMap::new(board)
        .regions(|top| (top.terrain() == terrain).then_some(()))
        .into_iter()
        .map(|(_, cells)| cells.len())
        .max()
        .unwrap_or(0)
}

/// Every connected region whose top token shows `terrain`
pub fn regions_of(board: &Board, terrain: Terrain) -> Vec<Vec<HexCoord>> {
    TopMap::new(board)
        .regions(|top| (top.terrain() == terrain).then_some(()))
        .into_iter()
        .map(|(_, cells)| cells)
        .collect()
}

/// Occupied cells with no occupied neighbour
pub fn isolated_cells(board: &Board) -> usize {
    let tops = TopMap::new(board);
    tops.0
        .keys()
        .filter(|pos| pos.neighbors().iter().all(|n| !tops.0.contains_key(n)))
        .count()
}

/// Top token of every occupied cell
struct TopMap(BTreeMap<HexCoord, PlacedToken>);

impl TopMap {
    fn new(board: &Board) -> Self {
        let mut tops: BTreeMap<HexCoord, PlacedToken> = BTreeMap::new();
        for token in board.tokens() {
            let replace = tops
                .get(&token.position)
                .map_or(true, |current| token.stack_level > current.stack_level);
            if replace {
                tops.insert(token.position, *token);
            }
        }
        Self(tops)
    }

    /// Connected components over occupied cells.
    ///
    /// `key` selects the cells taking part; neighbours join a region only when
    /// their key equals the key of the cell the region started from.
    fn regions<K, F>(&self, key: F) -> Vec<(K, Vec<HexCoord>)>
    where
        K: PartialEq + Copy,
        F: Fn(&PlacedToken) -> Option<K>,
    {
        let mut visited: HashSet<HexCoord> = HashSet::new();
        let mut regions = Vec::new();

        for (&start, top) in &self.0 {
            if visited.contains(&start) {
                continue;
            }
            let Some(seed_key) = key(top) else {
                continue;
            };

            let mut region = Vec::new();
            let mut queue = vec![start];
            visited.insert(start);

            while let Some(current) = queue.pop() {
                region.push(current);
                for neighbor in current.neighbors() {
                    if visited.contains(&neighbor) {
                        continue;
                    }
                    let joins = self
                        .0
                        .get(&neighbor)
                        .and_then(&key)
                        .is_some_and(|k| k == seed_key);
                    if joins {
                        visited.insert(neighbor);
                        queue.push(neighbor);
                    }
                }
            }

            regions.push((seed_key, region));
        }

        regions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::TerrainToken;
    use pretty_assertions::assert_eq;

    /// Build a board from (q, r, stack bottom-first) entries
    fn board_of(cells: &[(i32, i32, &[Terrain])]) -> Board {
        let mut board = Board::new();
        let mut id = 0;
        for &(q, r, stack) in cells {
            for &terrain in stack {
                board
                    .place(TerrainToken::new(id, terrain), HexCoord::new(q, r))
                    .expect("test stack is legal");
                id += 1;
            }
        }
        board
    }

    use Terrain::*;

    #[test]
    fn test_tree_heights() {
        assert_eq!(score_trees(&board_of(&[(0, 0, &[Treetop])])), 1);
        assert_eq!(score_trees(&board_of(&[(0, 0, &[Trunk, Treetop])])), 3);
        assert_eq!(score_trees(&board_of(&[(0, 0, &[Trunk, Trunk, Treetop])])), 7);
        assert_eq!(score_trees(&board_of(&[(0, 0, &[Trunk, Trunk])])), 0);
    }

    #[test]
    fn test_trees_are_scored_independently() {
        let board = board_of(&[(0, 0, &[Trunk, Treetop]), (1, 0, &[Trunk, Treetop])]);
        assert_eq!(score_trees(&board), 6);
    }

    #[test]
    fn test_fields() {
        let four = board_of(&[
            (0, 0, &[Field]),
            (1, 0, &[Field]),
            (0, 1, &[Field]),
            (1, -1, &[Field]),
        ]);
        assert_eq!(score_fields(&four), 10);

        let two_pairs = board_of(&[
            (0, 0, &[Field]),
            (1, 0, &[Field]),
            (-3, 3, &[Field]),
            (-3, 2, &[Field]),
        ]);
        assert_eq!(score_fields(&two_pairs), 10);

        let run_of_three = board_of(&[(0, 0, &[Field]), (1, 0, &[Field]), (2, 0, &[Field])]);
        assert_eq!(score_fields(&run_of_three), 5);

        assert_eq!(score_fields(&board_of(&[(0, 0, &[Field])])), 0);
    }

    #[test]
    fn test_river_table() {
        let expected = [(1, 0), (2, 2), (3, 5), (4, 8), (5, 11), (6, 15), (7, 19), (8, 23)];
        for (length, points) in expected {
            assert_eq!(river_points(length), points, "river of length {length}");
        }
    }

    #[test]
    fn test_connected_rivers() {
        const WATER: &[Terrain] = &[Water];

        let five: Vec<(i32, i32, &[Terrain])> = (-2..=2).map(|q| (q, 0, WATER)).collect();
        assert_eq!(score_rivers(&board_of(&five)), 11);

        let eight: Vec<(i32, i32, &[Terrain])> = (-3..=3)
            .map(|q| (q, 0, WATER))
            .chain(std::iter::once((0, 1, WATER)))
            .collect();
        assert_eq!(score_rivers(&board_of(&eight)), 23);
    }

    #[test]
    fn test_mountain_ranges_split_by_height() {
        let even = board_of(&[
            (0, 0, &[Mountain, Mountain]),
            (1, 0, &[Mountain, Mountain]),
            (2, 0, &[Mountain, Mountain]),
        ]);
        assert_eq!(score_mountains(&even), 9);

        let split = board_of(&[
            (0, 0, &[Mountain]),
            (1, 0, &[Mountain, Mountain]),
            (2, 0, &[Mountain, Mountain]),
        ]);
        assert_eq!(score_mountains(&split), 7);
    }

    #[test]
    fn test_capped_mountain_is_not_a_mountain() {
        let board = board_of(&[(0, 0, &[Mountain, Building]), (1, 0, &[Mountain])]);
        assert_eq!(score_mountains(&board), 1);
        assert_eq!(score_buildings(&board), 2);
    }

    #[test]
    fn test_buildings_need_a_base() {
        let board = board_of(&[
            (0, 0, &[Building]),
            (1, 0, &[Trunk, Building]),
            (2, 0, &[Mountain, Building]),
            (3, 0, &[Building, Building]),
            (0, 1, &[Mountain, Mountain, Building]),
        ]);
        assert_eq!(score_buildings(&board), 8);
    }

    #[test]
    fn test_score_environment_totals_categories() {
        let board = board_of(&[
            (0, 0, &[Trunk, Treetop]),
            (1, 0, &[Field]),
            (2, 0, &[Field]),
            (0, 1, &[Water]),
            (-1, 1, &[Water]),
            (-1, 0, &[Mountain]),
            (-2, 0, &[Trunk, Building]),
        ]);
        let score = score_environment(&board);
        assert_eq!(
            score,
            EnvironmentScore {
                trees: 3,
                mountains: 1,
                fields: 5,
                buildings: 2,
                rivers: 2,
                total: 13,
            }
        );
        assert_eq!(score_environment(&board), score);
    }

    #[test]
    fn test_region_helpers() {
        let board = board_of(&[
            (0, 0, &[Water]),
            (1, 0, &[Water]),
            (3, -3, &[Water]),
            (-3, 3, &[Field]),
        ]);
        assert_eq!(largest_region(&board, Water), 2);
        assert_eq!(regions_of(&board, Water).len(), 2);
        assert_eq!(largest_region(&board, Mountain), 0);
        assert_eq!(isolated_cells(&board), 2);
    }
}
