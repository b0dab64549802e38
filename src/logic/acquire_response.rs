use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use super::{
    acquire_error::{AcquireError, RuleViolation, ValidationError},
    hotel_data::Hotel,
    merger::Disposition,
    player::PlayerId,
    stock_market::StockPurchase,
    tile::Tile,
};

/// What a player (human or bot) sends to the game.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AcquireResponse {
    PlaceTile {
        tile: Tile,
    },
    FoundChain {
        chain: Hotel,
    },
    BuyStocks {
        #[serde(default)]
        purchases: StockPurchase,
    },
    MergerChoice {
        surviving_chain: Hotel,
    },
    MergerDisposition {
        defunct_chain: Hotel,
        sell: u32,
        trade: u32,
        hold: u32,
    },
    EndTurn,
    EndGame,
}

impl AcquireResponse {
    pub fn disposition(defunct_chain: Hotel, disposition: Disposition) -> Self {
        AcquireResponse::MergerDisposition {
            defunct_chain,
            sell: disposition.sell,
            trade: disposition.trade,
            hold: disposition.hold,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct AcquirePlayerResponse {
    pub player: PlayerId,
    pub response: AcquireResponse,
}

impl AcquirePlayerResponse {
    pub fn new(response: AcquireResponse, player: PlayerId) -> Self {
        AcquirePlayerResponse { response, player }
    }
}

// Chain and tile fields arrive as plain strings so a bad name can be reported
// with the kind that belongs to the action, not as a generic parse failure.
#[derive(Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum WireAction {
    PlaceTile {
        tile: String,
    },
    FoundChain {
        chain: String,
    },
    BuyStocks {
        #[serde(default)]
        purchases: BTreeMap<String, u32>,
    },
    MergerChoice {
        surviving_chain: String,
    },
    MergerDisposition {
        defunct_chain: String,
        sell: u32,
        trade: u32,
        hold: u32,
    },
    EndTurn,
    EndGame,
}

fn chain(name: &str, violation: RuleViolation) -> Result<Hotel, RuleViolation> {
    name.parse().map_err(|_| violation)
}

/// Reads an action payload as sent by a transport collaborator.
pub fn parse_action(json: &str) -> Result<AcquireResponse, AcquireError> {
    let wire: WireAction = serde_json::from_str(json)
        .map_err(|error| ValidationError::MalformedAction(error.to_string()))?;

    let response = match wire {
        WireAction::PlaceTile { tile } => AcquireResponse::PlaceTile {
            tile: tile.parse().map_err(|_| RuleViolation::InvalidTile)?,
        },
        WireAction::FoundChain { chain: name } => AcquireResponse::FoundChain {
            chain: chain(&name, RuleViolation::ChainNotAvailable)?,
        },
        WireAction::BuyStocks { purchases } => AcquireResponse::BuyStocks {
            purchases: purchases
                .iter()
                .map(|(name, quantity)| -> Result<(Hotel, u32), RuleViolation> {
                    Ok((chain(name, RuleViolation::StockUnavailable)?, *quantity))
                })
                .collect::<Result<StockPurchase, RuleViolation>>()?,
        },
        WireAction::MergerChoice { surviving_chain } => AcquireResponse::MergerChoice {
            surviving_chain: chain(&surviving_chain, RuleViolation::InvalidChain)?,
        },
        WireAction::MergerDisposition {
            defunct_chain,
            sell,
            trade,
            hold,
        } => AcquireResponse::MergerDisposition {
            defunct_chain: chain(&defunct_chain, RuleViolation::InvalidDisposition)?,
            sell,
            trade,
            hold,
        },
        WireAction::EndTurn => AcquireResponse::EndTurn,
        WireAction::EndGame => AcquireResponse::EndGame,
    };
    Ok(response)
}

impl fmt::Display for AcquireResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcquireResponse::PlaceTile { tile } => write!(f, "places tile {}", tile),
            AcquireResponse::FoundChain { chain } => write!(f, "founds {}", chain),
            AcquireResponse::BuyStocks { purchases } if purchases.is_empty() => {
                write!(f, "buys no stock")
            }
            AcquireResponse::BuyStocks { purchases } => {
                let parts: Vec<String> = purchases
                    .iter()
                    .map(|(hotel, quantity)| format!("{} {}", quantity, hotel))
                    .collect();
                write!(f, "buys {}", parts.join(", "))
            }
            AcquireResponse::MergerChoice { surviving_chain } => {
                write!(f, "chooses {} to survive the merger", surviving_chain)
            }
            AcquireResponse::MergerDisposition {
                defunct_chain,
                sell,
                trade,
                hold,
            } => write!(
                f,
                "disposes of {}: sells {}, trades {}, holds {}",
                defunct_chain, sell, trade, hold
            ),
            AcquireResponse::EndTurn => write!(f, "ends their turn"),
            AcquireResponse::EndGame => write!(f, "ends the game"),
        }
    }
}
