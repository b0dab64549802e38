pub const BOARD_ROWS: usize = 9;
pub const BOARD_COLS: usize = 12;
pub const TILE_COUNT: usize = BOARD_ROWS * BOARD_COLS;

pub const HAND_SIZE: usize = 6;
pub const STARTING_CASH: u32 = 6000;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 6;

pub const STOCK_PER_HOTEL: u32 = 25;
pub const STOCK_TO_BUY_PER_TURN: u32 = 3;

pub const SAFE_CHAIN_SIZE: usize = 11;
pub const GAME_ENDING_CHAIN_SIZE: usize = 41;

// bonuses are split in whole hundreds, leftovers go out one unit at a time
pub const BONUS_UNIT: u32 = 100;
