use serde::{Deserialize, Serialize};

use super::{
    acquire_constants::STOCK_PER_HOTEL,
    acquire_error::RuleViolation,
    game_board::GameBoard,
    hotel_data::{Hotel, PriceClass},
    player::Player,
};

/// Public facts about one chain, as shown to every player.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct ChainInfo {
    pub hotel: Hotel,
    pub price_class: PriceClass,
    pub size: usize,
    pub price: u32,
    pub stock_available: u32,
    pub active: bool,
    pub safe: bool,
}

/// The bank's share pools. Chain membership and size live on the board.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ChainRegistry {
    stock_available: [u32; Hotel::count()],
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainRegistry {
    pub fn new() -> Self {
        Self {
            stock_available: [STOCK_PER_HOTEL; Hotel::count()],
        }
    }

    pub fn stock_available(&self, hotel: Hotel) -> u32 {
        self.stock_available[hotel.index()]
    }

    pub fn withdraw(&mut self, hotel: Hotel, shares: u32) -> Result<(), RuleViolation> {
        let available = &mut self.stock_available[hotel.index()];
        if *available < shares {
            return Err(RuleViolation::StockUnavailable);
        }
        *available -= shares;
        Ok(())
    }

    pub fn deposit(&mut self, hotel: Hotel, shares: u32) {
        self.stock_available[hotel.index()] += shares;
    }

    /// The founder's free share, if the pool still has one.
    pub fn grant_founder_share(&mut self, hotel: Hotel, founder: &mut Player) -> bool {
        match self.withdraw(hotel, 1) {
            Ok(()) => {
                founder.add_stock(hotel, 1);
                true
            }
            Err(_) => false,
        }
    }

    pub fn info(&self, board: &GameBoard, hotel: Hotel) -> ChainInfo {
        let size = board.get_hotel_chain_size(hotel);
        ChainInfo {
            hotel,
            price_class: hotel.price_class(),
            size,
            price: hotel.get_stock_value(size),
            stock_available: self.stock_available(hotel),
            active: board.is_active(hotel),
            safe: board.is_safe(hotel),
        }
    }

    pub fn summaries(&self, board: &GameBoard) -> Vec<ChainInfo> {
        Hotel::iter().map(|hotel| self.info(board, hotel)).collect()
    }
}
