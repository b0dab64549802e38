pub mod acquire_constants;
pub mod acquire_error;
pub mod acquire_game;
pub mod acquire_game_state;
pub mod acquire_request;
pub mod acquire_response;
pub mod game_board;
pub mod game_options;
pub mod game_snapshot;
pub mod game_states;
pub mod hotel_chains;
pub mod hotel_data;
pub mod merger;
pub mod player;
pub mod stock_market;
pub mod tile;
pub mod tile_bag;

#[cfg(test)]
mod invariant_tests;
