//! Automated players.
//!
//! This module provides two difficulty levels:
//! - Random: uniform over the valid actions
//! - Greedy: completes animals first, then places tokens that raise the
//!   environment score, then takes cards the board already suits

use crate::actions::GameAction;
use crate::board::Terrain;
use crate::game::{GameState, TurnPhase};
use crate::player::PlayerId;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Bot difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BotDifficulty {
    Random,
    Greedy,
}

/// A bot player that can decide on actions
pub struct Bot {
    pub player: PlayerId,
    pub difficulty: BotDifficulty,
    rng: StdRng,
}

impl Bot {
    pub fn new(player: PlayerId, difficulty: BotDifficulty) -> Self {
        Self {
            player,
            difficulty,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(player: PlayerId, difficulty: BotDifficulty, seed: u64) -> Self {
        Self {
            player,
            difficulty,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Choose an action, or `None` when it is not this bot's turn or nothing is valid
    pub fn choose_action(&mut self, game: &GameState) -> Option<GameAction> {
        if game.current_player != self.player {
            return None;
        }
        let valid_actions = game.valid_actions();
        if valid_actions.is_empty() {
            return None;
        }

        match self.difficulty {
            BotDifficulty::Random => self.choose_random(&valid_actions),
            BotDifficulty::Greedy => self.choose_greedy(game, &valid_actions),
        }
    }

    /// Random: any valid action, but never undo while something else is possible
    fn choose_random(&mut self, actions: &[GameAction]) -> Option<GameAction> {
        let forward: Vec<&GameAction> = actions.iter().filter(|a| **a != GameAction::Undo).collect();
        if forward.is_empty() {
            return actions.choose(&mut self.rng).cloned();
        }
        forward.choose(&mut self.rng).map(|a| (*a).clone())
    }

    fn choose_greedy(&mut self, game: &GameState, actions: &[GameAction]) -> Option<GameAction> {
        match game.turn_phase {
            TurnPhase::SelectSlot => {
                let scored = actions
                    .iter()
                    .map(|action| {
                        let score = match action {
                            GameAction::SelectSlot(id) => game
                                .slot(*id)
                                .map_or(0, |s| s.tokens.iter().map(|t| terrain_weight(t.terrain)).sum()),
                            _ => i32::MIN,
                        };
                        (action, score)
                    })
                    .collect();
                self.pick_best(scored)
            }

            TurnPhase::PlaceTokens => {
                let scored = actions
                    .iter()
                    .filter(|a| matches!(a, GameAction::PlaceToken { .. }))
                    .map(|action| (action, self.score_after(game, action)))
                    .collect();
                self.pick_best(scored)
                    .or_else(|| actions.first().cloned())
            }

            TurnPhase::TakeCard => {
                let player = game.get_player(self.player)?;
                let scored = actions
                    .iter()
                    .map(|action| {
                        let score = match action {
                            GameAction::TakeAnimalCard(id) => game
                                .deck
                                .face_up_card(id)
                                .map_or(0, |card| {
                                    let matched = card
                                        .habitat
                                        .iter()
                                        .filter(|cell| {
                                            player.board.positions().into_iter().any(|pos| {
                                                !player.is_locked(pos)
                                                    && cell.is_satisfied_by(&player.board.terrains_at(pos))
                                            })
                                        })
                                        .count() as i32;
                                    matched * 10 + card.points as i32
                                }),
                            _ => 0,
                        };
                        (action, score)
                    })
                    .collect();
                self.pick_best(scored)
            }

            TurnPhase::PlaceCubes => {
                // Place a pending cube first
                if let Some(place) = actions
                    .iter()
                    .find(|a| matches!(a, GameAction::PlaceAnimalEmoji(_)))
                {
                    return Some(place.clone());
                }

                // Then work on the card closest to completion
                let player = game.get_player(self.player)?;
                let scored: Vec<(&GameAction, i32)> = actions
                    .iter()
                    .filter_map(|action| match action {
                        GameAction::SelectHabitatCell { card_id, .. } => {
                            let card = player.hand_card(card_id)?;
                            let remaining = card.cubes_required() - player.emojis_for(card_id).count();
                            Some((action, card.points as i32 * 2 - remaining as i32 * 3))
                        }
                        _ => None,
                    })
                    .collect();
                if !scored.is_empty() {
                    return self.pick_best(scored);
                }

                actions
                    .iter()
                    .find(|a| **a == GameAction::EndTurn)
                    .cloned()
                    .or_else(|| self.choose_random(actions))
            }
        }
    }

    /// Environment total plus habitat matches after applying a placement
    fn score_after(&self, game: &GameState, action: &GameAction) -> i32 {
        let Ok(transition) = game.try_apply(action.clone()) else {
            return i32::MIN;
        };
        let next = transition.state;
        let Some(player) = next.get_player(self.player) else {
            return i32::MIN;
        };

        let environment = next.environment_score(self.player).total as i32;
        let matches: usize = player
            .hand_cards
            .iter()
            .flat_map(|card| {
                card.habitat
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| !player.is_habitat_filled(&card.id, *i))
                    .map(move |(i, _)| (card.id.as_str(), i))
            })
            .filter(|(card_id, i)| {
                player.board.positions().into_iter().any(|pos| {
                    !player.is_locked(pos)
                        && player
                            .hand_card(card_id)
                            .and_then(|c| c.habitat.get(*i))
                            .is_some_and(|cell| cell.is_satisfied_by(&player.board.terrains_at(pos)))
                })
            })
            .count();

        environment * 2 + matches as i32
    }

    /// Highest score wins, ties broken at random
    fn pick_best(&mut self, scored: Vec<(&GameAction, i32)>) -> Option<GameAction> {
        let best = scored.iter().map(|(_, s)| *s).max()?;
        let top: Vec<&GameAction> = scored
            .into_iter()
            .filter(|(_, s)| *s == best)
            .map(|(a, _)| a)
            .collect();
        top.choose(&mut self.rng).map(|a| (*a).clone())
    }
}

/// Rough value of drafting a terrain
fn terrain_weight(terrain: Terrain) -> i32 {
    match terrain {
        Terrain::Treetop => 3,
        Terrain::Mountain | Terrain::Water | Terrain::Field => 2,
        Terrain::Trunk | Terrain::Building => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GamePhase;
    use crate::player::PlayerSeat;

    fn play_out(seed: u64, players: usize, difficulty: BotDifficulty) -> GameState {
        let seats = (0..players).map(|i| PlayerSeat::named(format!("Bot {i}"))).collect();
        let mut game = GameState::with_seed(seed).apply_action(GameAction::StartGame {
            players: seats,
            solo_mode: false,
        });
        let mut bots: Vec<Bot> = (0..players)
            .map(|i| Bot::with_seed(i, difficulty, seed + i as u64))
            .collect();

        for _ in 0..5_000 {
            if game.is_finished() {
                break;
            }
            let bot = &mut bots[game.current_player];
            let action = bot.choose_action(&game).expect("bot found no action");
            game = game.try_apply(action).expect("bot chose a rejected action").state;
        }
        game
    }

    #[test]
    fn test_bot_waits_for_its_turn() {
        let game = GameState::with_seed(1).apply_action(GameAction::StartGame {
            players: vec![PlayerSeat::named("A"), PlayerSeat::named("B")],
            solo_mode: false,
        });
        let mut bot = Bot::with_seed(1, BotDifficulty::Greedy, 1);
        assert!(bot.choose_action(&game).is_none());
    }

    #[test]
    fn test_random_bot_finishes_solo_game() {
        let game = play_out(21, 1, BotDifficulty::Random);
        assert_eq!(game.phase, GamePhase::Ended);
    }

    #[test]
    fn test_greedy_bots_finish_and_score() {
        let game = play_out(7, 2, BotDifficulty::Greedy);
        assert_eq!(game.phase, GamePhase::Ended);
        let standings = game.final_standings();
        assert!(standings[0].total_score > 0);
    }
}
