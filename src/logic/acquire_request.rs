use serde::{Deserialize, Serialize};

use super::{hotel_data::Hotel, player::PlayerId};

// This represents what the "game" is asking for, and from whom
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(tag = "request", rename_all = "snake_case")]
pub enum AcquireRequest {
    PlaceTile {
        player: PlayerId,
    },
    FoundChain {
        player: PlayerId,
        options: Vec<Hotel>,
    },
    ChooseMergerSurvivor {
        player: PlayerId,
        tied: Vec<Hotel>,
    },
    DisposeStock {
        player: PlayerId,
        defunct_chain: Hotel,
        surviving_chain: Hotel,
        holding: u32,
        price: u32,
        // false when the survivor's pool is empty
        trade_available: bool,
    },
    BuyStock {
        player: PlayerId,
        end_game_available: bool,
    },
    GameOver,
}

impl AcquireRequest {
    pub fn player(&self) -> Option<PlayerId> {
        match self {
            AcquireRequest::PlaceTile { player }
            | AcquireRequest::FoundChain { player, .. }
            | AcquireRequest::ChooseMergerSurvivor { player, .. }
            | AcquireRequest::DisposeStock { player, .. }
            | AcquireRequest::BuyStock { player, .. } => Some(*player),
            AcquireRequest::GameOver => None,
        }
    }
}
