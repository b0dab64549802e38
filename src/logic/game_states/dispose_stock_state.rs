use std::collections::VecDeque;

use super::merge_state::MergerState;
use crate::logic::{hotel_data::Hotel, player::PlayerId};

/// One defunct chain being wound up, one stockholder at a time.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct DisposeStockState {
    pub merger: MergerState,
    pub defunct_chain: Hotel,
    /// Price frozen at the size the chain had when it went defunct.
    pub defunct_price: u32,
    pub disposers: VecDeque<PlayerId>,
}

impl DisposeStockState {
    pub fn new(
        merger: MergerState,
        defunct_chain: Hotel,
        defunct_price: u32,
        disposers: impl IntoIterator<Item = PlayerId>,
    ) -> Self {
        DisposeStockState {
            merger,
            defunct_chain,
            defunct_price,
            disposers: disposers.into_iter().collect(),
        }
    }

    pub fn current_disposer(&self) -> Option<PlayerId> {
        self.disposers.front().copied()
    }

    // Called once the current disposer has decided.
    // Returns true if every stockholder has now disposed of their shares.
    pub fn player_handled_stock(&mut self) -> bool {
        self.disposers.pop_front();
        self.disposers.is_empty()
    }
}
