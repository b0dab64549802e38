use serde::{Deserialize, Serialize};

use super::{
    game_states::{
        buy_stock_state::BuyStockState, dispose_stock_state::DisposeStockState,
        merge_state::MergerChoiceState,
    },
    tile::Tile,
};

/// The phase a game is in, as seen by clients.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    PlaceTile,
    FoundChain,
    MergerChoice,
    DisposeStock,
    BuyStocks,
    GameOver,
}

/// The engine's own state, with everything each phase needs to continue.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AcquireGameState {
    PlaceTile,
    FoundChain(Tile),
    MergerChoice(MergerChoiceState),
    DisposeStock(DisposeStockState),
    BuyStock(BuyStockState),
    GameOver,
}

impl AcquireGameState {
    pub fn phase(&self) -> Phase {
        match self {
            AcquireGameState::PlaceTile => Phase::PlaceTile,
            AcquireGameState::FoundChain(_) => Phase::FoundChain,
            AcquireGameState::MergerChoice(_) => Phase::MergerChoice,
            AcquireGameState::DisposeStock(_) => Phase::DisposeStock,
            AcquireGameState::BuyStock(_) => Phase::BuyStocks,
            AcquireGameState::GameOver => Phase::GameOver,
        }
    }
}
