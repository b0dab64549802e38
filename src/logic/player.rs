use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{hotel_data::Hotel, tile::Tile};

/// Seat index in turn order.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub usize);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.0 + 1)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotKind {
    /// Picks uniformly among the legal actions.
    Random,
    /// Always takes the first legal action: never buys, holds every share.
    Passive,
}

impl FromStr for BotKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(BotKind::Random),
            "passive" => Ok(BotKind::Passive),
            other => Err(format!("unknown bot kind `{}`", other)),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type", content = "strategy")]
pub enum PlayerKind {
    Human,
    Bot(BotKind),
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub kind: PlayerKind,
    pub stocks: [u32; Hotel::count()],
    pub cash: u32,
    pub tiles: Vec<Tile>,
    pub connected: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: &str, kind: PlayerKind, cash: u32) -> Self {
        Self {
            id,
            name: name.to_string(),
            kind,
            stocks: [0; Hotel::count()],
            cash,
            tiles: Vec::new(),
            connected: matches!(kind, PlayerKind::Bot(_)),
        }
    }

    pub fn is_bot(&self) -> bool {
        matches!(self.kind, PlayerKind::Bot(_))
    }

    pub fn holding(&self, hotel: Hotel) -> u32 {
        self.stocks[hotel.index()]
    }

    pub fn add_stock(&mut self, hotel: Hotel, shares: u32) {
        self.stocks[hotel.index()] += shares;
    }

    /// Callers validate the holding first.
    pub fn remove_stock(&mut self, hotel: Hotel, shares: u32) {
        self.stocks[hotel.index()] -= shares;
    }

    /// Non-zero holdings only.
    pub fn holdings(&self) -> BTreeMap<Hotel, u32> {
        Hotel::iter()
            .filter(|hotel| self.holding(*hotel) > 0)
            .map(|hotel| (hotel, self.holding(hotel)))
            .collect()
    }

    pub fn has_tile(&self, tile: Tile) -> bool {
        self.tiles.contains(&tile)
    }

    pub fn take_tile(&mut self, tile: Tile) -> Option<Tile> {
        let index = self.tiles.iter().position(|t| *t == tile)?;
        Some(self.tiles.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_player() {
        let player = Player::new(PlayerId(0), "Ada", PlayerKind::Human, 6000);
        assert_eq!(player.cash, 6000);
        assert_eq!(player.holdings().len(), 0);
        assert_eq!(player.connected, false);
        assert_eq!(player.is_bot(), false);

        let bot = Player::new(PlayerId(1), "Bot", PlayerKind::Bot(BotKind::Random), 6000);
        assert_eq!(bot.connected, true);
        assert_eq!(bot.is_bot(), true);
    }

    #[test]
    fn test_stock_and_tiles() {
        let mut player = Player::new(PlayerId(0), "Ada", PlayerKind::Human, 6000);
        player.add_stock(Hotel::Festival, 3);
        player.remove_stock(Hotel::Festival, 1);
        assert_eq!(player.holding(Hotel::Festival), 2);
        assert_eq!(player.holdings().get(&Hotel::Festival), Some(&2));

        player.tiles.push(Tile::new(1, 1));
        assert_eq!(player.has_tile(Tile::new(1, 1)), true);
        assert_eq!(player.take_tile(Tile::new(1, 1)), Some(Tile::new(1, 1)));
        assert_eq!(player.take_tile(Tile::new(1, 1)), None);
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&PlayerKind::Bot(BotKind::Passive)).unwrap();
        assert_eq!(json, r#"{"type":"bot","strategy":"passive"}"#);
        let json = serde_json::to_string(&PlayerKind::Human).unwrap();
        assert_eq!(json, r#"{"type":"human"}"#);
        assert_eq!(PlayerId(2).to_string(), "Player 3");
    }
}
