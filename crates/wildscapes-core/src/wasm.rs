//! WebAssembly bindings for the Wildscapes engine.
//!
//! This module exposes the reducer to JavaScript through wasm-bindgen.
//! Actions and state cross the boundary as JSON.

use wasm_bindgen::prelude::*;

use crate::actions::GameAction;
use crate::bot::{Bot, BotDifficulty};
use crate::game::GameState;
use crate::player::PlayerSeat;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// WASM-exposed game wrapper
#[wasm_bindgen]
pub struct WasmGame {
    state: GameState,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a game in setup with a fixed shuffle seed
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> WasmGame {
        WasmGame {
            state: GameState::with_seed(seed),
        }
    }

    /// Seat players from a JSON array of names and start. Returns events JSON.
    #[wasm_bindgen(js_name = startGame)]
    pub fn start_game(&mut self, player_names_json: &str, solo_mode: bool) -> Result<String, JsValue> {
        let names: Vec<String> = serde_json::from_str(player_names_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid player names: {}", e)))?;
        let action = GameAction::StartGame {
            players: names.into_iter().map(PlayerSeat::named).collect(),
            solo_mode,
        };
        self.try_action(action)
    }

    /// Apply an action from JSON. Returns whether it was accepted.
    pub fn apply(&mut self, action_json: &str) -> bool {
        match serde_json::from_str::<GameAction>(action_json) {
            Ok(action) => self.try_action(action).is_ok(),
            Err(_) => false,
        }
    }

    /// Apply an action from JSON, returning events JSON or the rejection reason
    #[wasm_bindgen(js_name = tryApply)]
    pub fn try_apply(&mut self, action_json: &str) -> Result<String, JsValue> {
        let action: GameAction = serde_json::from_str(action_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid action JSON: {}", e)))?;
        self.try_action(action)
    }

    /// Get the current game state as JSON
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> String {
        serde_json::to_string(&self.state).unwrap_or_else(|_| "{}".to_string())
    }

    /// Get valid actions for the active player as JSON array
    #[wasm_bindgen(js_name = getValidActions)]
    pub fn get_valid_actions(&self) -> String {
        serde_json::to_string(&self.state.valid_actions()).unwrap_or_else(|_| "[]".to_string())
    }

    /// Environment breakdown for a player as JSON
    #[wasm_bindgen(js_name = scoreEnvironment)]
    pub fn score_environment(&self, player: usize) -> String {
        serde_json::to_string(&self.state.environment_score(player)).unwrap_or_else(|_| "{}".to_string())
    }

    /// Final ranking as JSON
    #[wasm_bindgen(js_name = getStandings)]
    pub fn get_standings(&self) -> String {
        serde_json::to_string(&self.state.final_standings()).unwrap_or_else(|_| "[]".to_string())
    }

    #[wasm_bindgen(js_name = isFinished)]
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    #[wasm_bindgen(js_name = getCurrentPlayer)]
    pub fn get_current_player(&self) -> usize {
        self.state.current_player
    }

    /// Get a bot's suggested action for the active player.
    /// difficulty: "Random" or "Greedy"
    #[wasm_bindgen(js_name = getBotAction)]
    pub fn get_bot_action(&self, difficulty: &str) -> String {
        let diff = match difficulty {
            "Random" => BotDifficulty::Random,
            _ => BotDifficulty::Greedy,
        };

        let mut bot = Bot::new(self.state.current_player, diff);
        match bot.choose_action(&self.state) {
            Some(action) => serde_json::to_string(&action).unwrap_or_else(|_| "null".to_string()),
            None => "null".to_string(),
        }
    }
}

impl WasmGame {
    fn try_action(&mut self, action: GameAction) -> Result<String, JsValue> {
        let transition = self
            .state
            .try_apply(action)
            .map_err(|e| JsValue::from_str(&format!("Action rejected: {}", e)))?;
        self.state = transition.state;
        Ok(serde_json::to_string(&transition.events).unwrap_or_else(|_| "[]".to_string()))
    }
}
