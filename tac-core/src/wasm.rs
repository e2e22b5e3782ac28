//! WASM bindings for tac-core
//!
//! Provides a JavaScript-friendly API over the board and move engine.

use wasm_bindgen::prelude::*;

use crate::{Board, Distribution, PieceRef, Player, SplitRules, Team};

fn player_from(idx: u8) -> Result<Player, JsValue> {
    Player::from_index(idx as usize).ok_or_else(|| JsValue::from_str("player must be 0-3"))
}

fn piece_ref(player: u8, rank: u8) -> Result<PieceRef, JsValue> {
    PieceRef::new(player_from(player)?, rank).ok_or_else(|| JsValue::from_str("rank must be 0-3"))
}

/// WASM-friendly wrapper around Board
#[wasm_bindgen]
pub struct WasmBoard {
    inner: Board,
}

#[wasm_bindgen]
impl WasmBoard {
    /// Create the starting board
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmBoard {
        WasmBoard {
            inner: Board::new(),
        }
    }

    /// Create board from notation
    #[wasm_bindgen(js_name = fromNotation)]
    pub fn from_notation(text: &str) -> Result<WasmBoard, JsValue> {
        let inner = text
            .parse::<Board>()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(WasmBoard { inner })
    }

    /// Get board notation
    #[wasm_bindgen(js_name = toNotation)]
    pub fn to_notation(&self) -> String {
        self.inner.to_string()
    }

    /// Position of a player's piece by rank, in position notation
    pub fn resolve(&self, player: u8, rank: u8) -> Result<String, JsValue> {
        Ok(self.inner.resolve(piece_ref(player, rank)?).to_string())
    }

    /// Check (commit = false) or play a single-segment move.
    /// Returns true if the move is legal.
    #[wasm_bindgen(js_name = tryMove)]
    pub fn try_move(
        &mut self,
        player: u8,
        rank: u8,
        count: i8,
        avoid_home: bool,
        commit: bool,
        sweep_all: bool,
    ) -> Result<bool, JsValue> {
        let piece = piece_ref(player, rank)?;
        Ok(self
            .inner
            .try_move(piece, count, avoid_home, commit, sweep_all))
    }

    /// Bring a yard piece onto the entry square. Returns true if legal.
    #[wasm_bindgen(js_name = tryEnter)]
    pub fn try_enter(&mut self, player: u8, commit: bool) -> Result<bool, JsValue> {
        Ok(self.inner.try_enter(player_from(player)?, commit))
    }

    /// Exchange two pieces. Returns true if legal.
    #[wasm_bindgen(js_name = trySwap)]
    pub fn try_swap(
        &mut self,
        player_a: u8,
        rank_a: u8,
        player_b: u8,
        rank_b: u8,
        commit: bool,
    ) -> Result<bool, JsValue> {
        let a = piece_ref(player_a, rank_a)?;
        let b = piece_ref(player_b, rank_b)?;
        Ok(self.inner.try_swap(a, b, commit))
    }

    /// Get split distributions as a JSON array of notation strings
    pub fn splits(
        &mut self,
        player: u8,
        team_moves: bool,
        move_blocked_teammate: bool,
    ) -> Result<JsValue, JsValue> {
        let rules = SplitRules {
            team_moves,
            move_blocked_teammate,
        };
        let found: Vec<String> = self
            .inner
            .splits_for(player_from(player)?, rules)
            .iter()
            .map(Distribution::to_string)
            .collect();
        serde_wasm_bindgen::to_value(&found).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Play a distribution given in notation. Returns true if legal.
    #[wasm_bindgen(js_name = applyDistribution)]
    pub fn apply_distribution(&mut self, text: &str) -> Result<bool, JsValue> {
        let distribution = text
            .parse::<Distribution>()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(self.inner.apply_distribution(&distribution))
    }

    /// Check whether a player's home stretch is full
    #[wasm_bindgen(js_name = homeFull)]
    pub fn home_full(&self, player: u8) -> Result<bool, JsValue> {
        Ok(self.inner.home_full(player_from(player)?))
    }

    /// Winning team: 0 (none), 1 (players 0 & 2), or 2 (players 1 & 3)
    pub fn winner(&self) -> u8 {
        match self.inner.winner() {
            None => 0,
            Some(Team::A) => 1,
            Some(Team::B) => 2,
        }
    }

    /// Clone the board
    #[wasm_bindgen(js_name = clone)]
    pub fn clone_board(&self) -> WasmBoard {
        WasmBoard {
            inner: self.inner.clone(),
        }
    }
}

impl Default for WasmBoard {
    fn default() -> Self {
        Self::new()
    }
}
