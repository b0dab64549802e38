#[derive(Debug, PartialEq, Eq, Clone)]
pub struct BuyStockState {
    // worked out once, when the player enters the phase
    pub end_game_available: bool,
}

impl BuyStockState {
    pub fn new(end_game_available: bool) -> Self {
        BuyStockState { end_game_available }
    }
}
