//! The token bag and the central supply slots.

use crate::board::{Terrain, TerrainToken};
use crate::config::GameConfig;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Identifier of a central supply slot
pub type SlotId = usize;

/// Shuffled pool of tokens not yet in play
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBag {
    tokens: Vec<TerrainToken>,
}

impl TokenBag {
    /// A bag holding exactly these tokens, in this order
    pub fn from_tokens(tokens: Vec<TerrainToken>) -> Self {
        Self { tokens }
    }

    /// Build one token per configured count and shuffle them
    pub fn generate<R: Rng>(config: &GameConfig, rng: &mut R) -> Self {
        let mut tokens = Vec::with_capacity(config.bag_size());
        let mut id = 0;
        for &(terrain, count) in &config.token_counts {
            for _ in 0..count {
                tokens.push(TerrainToken::new(id, terrain));
                id += 1;
            }
        }
        let mut bag = Self { tokens };
        bag.shuffle(rng);
        bag
    }

    /// Uniform Fisher-Yates shuffle
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        self.tokens.shuffle(rng);
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[TerrainToken] {
        &self.tokens
    }

    /// Take up to `count` tokens from the front. A short bag yields what it has.
    pub fn draw(&mut self, count: usize) -> Vec<TerrainToken> {
        let count = count.min(self.tokens.len());
        self.tokens.drain(..count).collect()
    }

    /// How many tokens of a terrain remain
    pub fn count_of(&self, terrain: Terrain) -> usize {
        self.tokens.iter().filter(|t| t.terrain == terrain).count()
    }
}

/// One of the central supply slots players draft from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSlot {
    pub id: SlotId,
    pub tokens: Vec<TerrainToken>,
}

impl TokenSlot {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Draw fresh tokens from the bag into this slot
    pub fn refill(&mut self, bag: &mut TokenBag, slot_size: usize) {
        self.tokens = bag.draw(slot_size);
    }

    /// Take every token out of the slot
    pub fn take_all(&mut self) -> Vec<TerrainToken> {
        std::mem::take(&mut self.tokens)
    }
}

/// Fill `slot_count` slots from the bag, `slot_size` tokens each
pub fn deal_initial_slots(bag: &mut TokenBag, slot_count: usize, slot_size: usize) -> Vec<TokenSlot> {
    (0..slot_count)
        .map(|id| TokenSlot {
            id,
            tokens: bag.draw(slot_size),
        })
        .collect()
}

/// Refill the slot with the given id, if it exists
pub fn refill_slot(slots: &mut [TokenSlot], bag: &mut TokenBag, slot_id: SlotId, slot_size: usize) -> bool {
    match slots.iter_mut().find(|s| s.id == slot_id) {
        Some(slot) => {
            slot.refill(bag, slot_size);
            true
        }
        None => false,
    }
}
