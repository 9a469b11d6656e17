//! Animal objective cards.
//!
//! This module contains:
//! - Habitat cells and animal cards
//! - The fixed card catalog
//! - The shuffled deck with its face-up row
//! - Habitat matching against a board stack

use crate::board::Terrain;
use crate::hex::HexCoord;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Broad habitat family an animal belongs to, used in statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitatKind {
    Forest,
    Field,
    Water,
    Mountain,
    Building,
}

impl HabitatKind {
    pub const ALL: [HabitatKind; 5] = [
        HabitatKind::Forest,
        HabitatKind::Field,
        HabitatKind::Water,
        HabitatKind::Mountain,
        HabitatKind::Building,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            HabitatKind::Forest => "forest",
            HabitatKind::Field => "field",
            HabitatKind::Water => "water",
            HabitatKind::Mountain => "mountain",
            HabitatKind::Building => "building",
        }
    }
}

/// One required cell of an animal's habitat pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitatCell {
    /// Terrain the top token must show
    pub terrain: Terrain,
    /// 0 means a lone ground-level token; n > 0 means at least n tokens beneath
    pub stack_level: u8,
    /// Position within the card's own layout, not on the board
    pub relative_pos: HexCoord,
}

impl HabitatCell {
    pub const fn new(terrain: Terrain, stack_level: u8, q: i32, r: i32) -> Self {
        Self {
            terrain,
            stack_level,
            relative_pos: HexCoord::new(q, r),
        }
    }

    /// Whether a board stack (bottom first) satisfies this cell.
    ///
    /// The top token must show the required terrain. Level 0 demands a stack of
    /// exactly one token; a taller stack with the same top does not count.
    pub fn is_satisfied_by(&self, stack: &[Terrain]) -> bool {
        let Some(&top) = stack.last() else {
            return false;
        };
        if top != self.terrain {
            return false;
        }
        let height = stack.len();
        if self.stack_level == 0 {
            height == 1
        } else {
            height > self.stack_level as usize
        }
    }
}

/// An animal objective card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimalCard {
    pub id: String,
    pub name: String,
    pub species: String,
    pub habitat: Vec<HabitatCell>,
    pub points: u32,
    pub emoji: String,
    pub can_rotate: bool,
    pub description: String,
    pub habitat_kind: HabitatKind,
}

impl AnimalCard {
    /// Number of animal cubes needed to complete this card
    pub fn cubes_required(&self) -> usize {
        self.habitat.len()
    }
}

/// Record that one habitat cell of a hand card is satisfied by a board cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedAnimalEmoji {
    pub card_id: String,
    pub position: HexCoord,
    pub emoji: String,
    pub habitat_index: usize,
    /// Round in which the cube was placed
    pub round: u32,
}

#[allow(clippy::too_many_arguments)]
fn card(
    id: &str,
    name: &str,
    species: &str,
    emoji: &str,
    points: u32,
    can_rotate: bool,
    habitat_kind: HabitatKind,
    habitat: Vec<HabitatCell>,
    description: &str,
) -> AnimalCard {
    AnimalCard {
        id: id.to_string(),
        name: name.to_string(),
        species: species.to_string(),
        habitat,
        points,
        emoji: emoji.to_string(),
        can_rotate,
        description: description.to_string(),
        habitat_kind,
    }
}

/// The full animal card catalog
pub fn catalog() -> Vec<AnimalCard> {
    use HabitatKind as K;
    use Terrain::*;
    let c = HabitatCell::new;

    vec![
        card("red-fox", "Red Fox", "Vulpes vulpes", "🦊", 4, true, K::Forest,
            vec![c(Field, 0, 0, 0), c(Treetop, 1, 1, 0)],
            "Hunts along the edge where meadow meets woodland."),
        card("brown-bear", "Brown Bear", "Ursus arctos", "🐻", 9, true, K::Forest,
            vec![c(Treetop, 2, 0, 0), c(Mountain, 1, 1, 0), c(Water, 0, 0, 1)],
            "Needs old forest, high ground and a fishing stream."),
        card("golden-eagle", "Golden Eagle", "Aquila chrysaetos", "🦅", 7, false, K::Mountain,
            vec![c(Mountain, 2, 0, 0), c(Mountain, 1, 1, -1)],
            "Nests on the highest crags."),
        card("common-frog", "Common Frog", "Rana temporaria", "🐸", 3, true, K::Water,
            vec![c(Water, 0, 0, 0), c(Water, 0, 1, 0)],
            "Spawns in still, shallow water."),
        card("beaver", "Eurasian Beaver", "Castor fiber", "🦫", 6, true, K::Water,
            vec![c(Water, 0, 0, 0), c(Treetop, 1, 1, 0), c(Water, 0, 0, 1)],
            "Fells riverside trees to dam the flow."),
        card("hare", "Brown Hare", "Lepus europaeus", "🐇", 3, true, K::Field,
            vec![c(Field, 0, 0, 0), c(Field, 0, 1, -1)],
            "Boxes in open fields in early spring."),
        card("tawny-owl", "Tawny Owl", "Strix aluco", "🦉", 4, false, K::Forest,
            vec![c(Treetop, 2, 0, 0)],
            "Roosts in the tallest trees."),
        card("mallard", "Mallard", "Anas platyrhynchos", "🦆", 3, true, K::Water,
            vec![c(Water, 0, 0, 0), c(Field, 0, 0, 1)],
            "Dabbles where water borders grassland."),
        card("ibex", "Alpine Ibex", "Capra ibex", "🐐", 5, true, K::Mountain,
            vec![c(Mountain, 1, 0, 0), c(Mountain, 0, 1, 0)],
            "Climbs between foothills and ridges."),
        card("red-squirrel", "Red Squirrel", "Sciurus vulgaris", "🐿️", 5, true, K::Forest,
            vec![c(Treetop, 1, 0, 0), c(Treetop, 1, 1, 0)],
            "Leaps from canopy to canopy."),
        card("white-stork", "White Stork", "Ciconia ciconia", "🪶", 5, true, K::Building,
            vec![c(Building, 1, 0, 0), c(Water, 0, 1, 0)],
            "Nests on rooftops near wetlands."),
        card("noctule-bat", "Noctule Bat", "Nyctalus noctula", "🦇", 7, true, K::Building,
            vec![c(Building, 2, 0, 0), c(Treetop, 1, 0, 1)],
            "Roosts in tall buildings, feeds over woodland."),
        card("hedgehog", "Hedgehog", "Erinaceus europaeus", "🦔", 4, true, K::Field,
            vec![c(Field, 0, 0, 0), c(Treetop, 0, 1, 0)],
            "Forages under hedgerows and young trees."),
        card("red-deer", "Red Deer", "Cervus elaphus", "🦌", 6, true, K::Forest,
            vec![c(Field, 0, 0, 0), c(Treetop, 1, 1, -1), c(Field, 0, 1, 0)],
            "Grazes clearings, shelters among trees."),
        card("salmon", "Atlantic Salmon", "Salmo salar", "🐟", 5, false, K::Water,
            vec![c(Water, 0, 0, 0), c(Water, 0, 1, 0), c(Water, 0, 2, 0)],
            "Runs up long rivers to spawn."),
        card("marmot", "Alpine Marmot", "Marmota marmota", "🐹", 3, true, K::Mountain,
            vec![c(Mountain, 0, 0, 0), c(Field, 0, 1, 0)],
            "Burrows in meadows below the peaks."),
        card("swallow", "Barn Swallow", "Hirundo rustica", "🐦", 8, true, K::Building,
            vec![c(Building, 1, 0, 0), c(Field, 0, 1, 0), c(Building, 1, 2, -1)],
            "Nests in barns and hunts over fields."),
        card("grey-wolf", "Grey Wolf", "Canis lupus", "🐺", 10, false, K::Mountain,
            vec![c(Treetop, 2, 0, 0), c(Mountain, 2, 1, 0)],
            "Roams wild forest and mountain ranges."),
    ]
}

/// The shuffled draw pile and the face-up row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimalDeck {
    pub draw_pile: Vec<AnimalCard>,
    pub face_up: Vec<AnimalCard>,
}

impl AnimalDeck {
    /// Shuffle `cards` and turn the first `face_up_count` face up
    pub fn shuffled<R: Rng>(mut cards: Vec<AnimalCard>, face_up_count: usize, rng: &mut R) -> Self {
        cards.shuffle(rng);
        let split = face_up_count.min(cards.len());
        let draw_pile = cards.split_off(split);
        Self {
            draw_pile,
            face_up: cards,
        }
    }

    pub fn face_up_card(&self, card_id: &str) -> Option<&AnimalCard> {
        self.face_up.iter().find(|c| c.id == card_id)
    }

    /// Remove a face-up card. The row is not refilled until [`AnimalDeck::refill`].
    pub fn take_face_up(&mut self, card_id: &str) -> Option<AnimalCard> {
        let index = self.face_up.iter().position(|c| c.id == card_id)?;
        Some(self.face_up.remove(index))
    }

    /// Top the face-up row back up to `target` cards. Returns how many were turned.
    pub fn refill(&mut self, target: usize) -> usize {
        let needed = target.saturating_sub(self.face_up.len()).min(self.draw_pile.len());
        self.face_up.extend(self.draw_pile.drain(..needed));
        needed
    }
}
