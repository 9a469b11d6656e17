//! Hex coordinate system using axial coordinates (q, r).
//!
//! Each player's board is a bounded hexagon of radius 3 around the origin,
//! which gives 37 legal cells. Only cells are addressed; the game never needs
//! vertices or edges.

use serde::{Deserialize, Serialize};

/// Radius of a player's hex board
pub const BOARD_RADIUS: i32 = 3;

/// Number of cells on a board of radius [`BOARD_RADIUS`]
pub const BOARD_CELLS: usize = 37;

/// Direction of a neighbouring cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HexDirection {
    East,
    NorthEast,
    NorthWest,
    West,
    SouthWest,
    SouthEast,
}

impl HexDirection {
    /// All directions in counter-clockwise order starting from East
    pub const ALL: [HexDirection; 6] = [
        HexDirection::East,
        HexDirection::NorthEast,
        HexDirection::NorthWest,
        HexDirection::West,
        HexDirection::SouthWest,
        HexDirection::SouthEast,
    ];

    /// Axial offset for one step in this direction
    pub const fn offset(self) -> (i32, i32) {
        match self {
            HexDirection::East => (1, 0),
            HexDirection::NorthEast => (1, -1),
            HexDirection::NorthWest => (0, -1),
            HexDirection::West => (-1, 0),
            HexDirection::SouthWest => (-1, 1),
            HexDirection::SouthEast => (0, 1),
        }
    }
}

/// Axial coordinate for hex grid.
///
/// In axial coordinates:
/// - `q` increases going east (right)
/// - `r` increases going southeast
/// - The third coordinate `s` (not stored) satisfies: q + r + s = 0
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct HexCoord {
    /// Column (increases going east)
    pub q: i32,
    /// Row (increases going southeast)
    pub r: i32,
}

impl HexCoord {
    /// Create a new hex coordinate
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The origin cell at the centre of the board
    pub const fn origin() -> Self {
        Self::new(0, 0)
    }

    /// The implicit third coordinate (s = -q - r)
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// The six neighbouring cells, in [`HexDirection::ALL`] order
    pub fn neighbors(&self) -> [HexCoord; 6] {
        HexDirection::ALL.map(|dir| self.neighbor(dir))
    }

    /// Get the neighbour in a specific direction
    pub fn neighbor(&self, direction: HexDirection) -> HexCoord {
        let (dq, dr) = direction.offset();
        HexCoord::new(self.q + dq, self.r + dr)
    }

    /// Whether `other` is one of the six neighbours of this cell
    pub fn is_adjacent(&self, other: &HexCoord) -> bool {
        self.distance_to(other) == 1
    }

    /// Distance to another hex (in hex steps)
    pub fn distance_to(&self, other: &HexCoord) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        ((dq + dr + ds) / 2) as u32
    }

    /// Whether this cell lies on a player's board (`|q|, |r|, |s| <= 3`)
    pub fn is_on_board(&self) -> bool {
        self.within_radius(BOARD_RADIUS)
    }

    /// Whether this cell lies inside a hexagon of the given radius
    pub fn within_radius(&self, radius: i32) -> bool {
        self.q.abs() <= radius && self.r.abs() <= radius && self.s().abs() <= radius
    }

    /// The on-board neighbours of this cell
    pub fn board_neighbors(&self) -> impl Iterator<Item = HexCoord> {
        self.neighbors().into_iter().filter(HexCoord::is_on_board)
    }

    /// Every cell of a hexagon with the given radius, sorted by (q, r)
    pub fn hexagon(radius: i32) -> Vec<HexCoord> {
        let mut cells = Vec::new();
        for q in -radius..=radius {
            let r_min = (-radius).max(-q - radius);
            let r_max = radius.min(-q + radius);
            for r in r_min..=r_max {
                cells.push(HexCoord::new(q, r));
            }
        }
        cells
    }

    /// Every cell of a player's board
    pub fn board_cells() -> Vec<HexCoord> {
        Self::hexagon(BOARD_RADIUS)
    }
}

impl std::fmt::Display for HexCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_hex_neighbors() {
        let center = HexCoord::origin();
        let neighbors = center.neighbors();

        let unique: HashSet<_> = neighbors.iter().collect();
        assert_eq!(unique.len(), 6);

        for neighbor in &neighbors {
            assert_eq!(center.distance_to(neighbor), 1);
            assert!(center.is_adjacent(neighbor));
        }
    }

    #[test]
    fn test_hex_distance() {
        let a = HexCoord::new(0, 0);
        let b = HexCoord::new(2, -1);
        assert_eq!(a.distance_to(&b), 2);

        let c = HexCoord::new(-3, 3);
        assert_eq!(a.distance_to(&c), 3);
    }

    #[test]
    fn test_board_has_37_cells() {
        let cells = HexCoord::board_cells();
        assert_eq!(cells.len(), BOARD_CELLS);
        assert!(cells.iter().all(HexCoord::is_on_board));

        let unique: HashSet<_> = cells.iter().collect();
        assert_eq!(unique.len(), BOARD_CELLS);
    }

    #[test]
    fn test_bound_check() {
        assert!(HexCoord::new(3, -3).is_on_board());
        assert!(HexCoord::new(-3, 0).is_on_board());
        assert!(!HexCoord::new(3, 1).is_on_board()); // s = -4
        assert!(!HexCoord::new(4, -2).is_on_board());
        assert!(!HexCoord::new(0, -4).is_on_board());
    }

    #[test]
    fn test_corner_has_three_board_neighbors() {
        let corner = HexCoord::new(3, -3);
        assert_eq!(corner.board_neighbors().count(), 3);
        assert_eq!(HexCoord::origin().board_neighbors().count(), 6);
    }

    #[test]
    fn test_neighbor_matches_direction_offsets() {
        let hex = HexCoord::new(1, -1);
        for (dir, neighbor) in HexDirection::ALL.iter().zip(hex.neighbors()) {
            assert_eq!(hex.neighbor(*dir), neighbor);
        }
    }
}
