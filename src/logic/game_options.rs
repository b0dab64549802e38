use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use typed_builder::TypedBuilder;

use super::{
    acquire_constants::{MAX_PLAYERS, MIN_PLAYERS, STARTING_CASH},
    player::{BotKind, PlayerKind},
};

#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum ConfigError {
    #[error("Acquire needs {} to {} players, got {0}", MIN_PLAYERS, MAX_PLAYERS)]
    PlayerCount(usize),
    #[error("seat {0} has an empty name")]
    EmptyName(usize),
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct SeatConfig {
    pub name: String,
    pub kind: PlayerKind,
}

impl SeatConfig {
    pub fn human(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: PlayerKind::Human,
        }
    }

    pub fn bot(name: &str, kind: BotKind) -> Self {
        Self {
            name: name.to_string(),
            kind: PlayerKind::Bot(kind),
        }
    }
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct GameOptions {
    /// In turn order, before the starting-tile draw picks who goes first.
    pub seats: Vec<SeatConfig>,
    #[builder(default = STARTING_CASH)]
    pub starting_cash: u32,
    /// Fixed seed for the tile bag and the bots; entropy when unset.
    #[builder(default, setter(strip_option))]
    pub seed: Option<u64>,
    #[builder(default = true)]
    pub draw_starting_tiles: bool,
}

impl GameOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.seats.len()) {
            return Err(ConfigError::PlayerCount(self.seats.len()));
        }
        if let Some(index) = self.seats.iter().position(|seat| seat.name.trim().is_empty()) {
            return Err(ConfigError::EmptyName(index));
        }
        Ok(())
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let options = GameOptions::builder()
            .seats(vec![SeatConfig::human("Ada"), SeatConfig::bot("Bot", BotKind::Random)])
            .build();
        assert_eq!(options.starting_cash, 6000);
        assert_eq!(options.seed, None);
        assert_eq!(options.draw_starting_tiles, true);
        assert_eq!(options.validate(), Ok(()));
    }

    #[test]
    fn test_player_count_bounds() {
        let seats = |n: usize| (0..n).map(|i| SeatConfig::human(&format!("P{}", i))).collect();

        let options = GameOptions::builder().seats(seats(1)).build();
        assert_eq!(options.validate(), Err(ConfigError::PlayerCount(1)));

        let options = GameOptions::builder().seats(seats(7)).build();
        assert_eq!(options.validate(), Err(ConfigError::PlayerCount(7)));

        let options = GameOptions::builder().seats(seats(6)).seed(3).build();
        assert_eq!(options.validate(), Ok(()));
    }

    #[test]
    fn test_empty_name_rejected() {
        let options = GameOptions::builder()
            .seats(vec![SeatConfig::human("Ada"), SeatConfig::human("  ")])
            .build();
        assert_eq!(options.validate(), Err(ConfigError::EmptyName(1)));
    }
}
