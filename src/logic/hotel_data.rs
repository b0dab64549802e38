use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::acquire_constants::{GAME_ENDING_CHAIN_SIZE, SAFE_CHAIN_SIZE};

/// The seven hotel chains. Declaration order is the fixed tie-break order.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hotel {
    Tower,
    Luxor,
    American,
    Worldwide,
    Festival,
    Imperial,
    Continental,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceClass {
    Cheap,
    Medium,
    Expensive,
}

impl Hotel {
    pub const ALL: [Hotel; 7] = [
        Hotel::Tower,
        Hotel::Luxor,
        Hotel::American,
        Hotel::Worldwide,
        Hotel::Festival,
        Hotel::Imperial,
        Hotel::Continental,
    ];

    pub const fn count() -> usize {
        Self::ALL.len()
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn iter() -> impl Iterator<Item = Hotel> {
        Self::ALL.into_iter()
    }

    pub fn price_class(&self) -> PriceClass {
        match self {
            Hotel::Tower | Hotel::Luxor => PriceClass::Cheap,
            Hotel::American | Hotel::Worldwide | Hotel::Festival => PriceClass::Medium,
            Hotel::Imperial | Hotel::Continental => PriceClass::Expensive,
        }
    }

    pub fn initial(&self) -> char {
        match self {
            Hotel::Tower => 'T',
            Hotel::Luxor => 'L',
            Hotel::American => 'A',
            Hotel::Worldwide => 'W',
            Hotel::Festival => 'F',
            Hotel::Imperial => 'I',
            Hotel::Continental => 'C',
        }
    }

    pub fn from_initial(initial: char) -> Option<Hotel> {
        let initial = initial.to_ascii_uppercase();
        Hotel::iter().find(|hotel| hotel.initial() == initial)
    }

    fn get_hotel_row_advantage(&self) -> usize {
        match self.price_class() {
            PriceClass::Cheap => 0,
            PriceClass::Medium => 1,
            PriceClass::Expensive => 2,
        }
    }

    // None below the founding size, the chain is not on the board
    fn get_row_from_chain_length(&self, chain_length: usize) -> Option<usize> {
        let base_row = match chain_length {
            0 | 1 => return None,
            2 => 0,
            3 => 1,
            4 => 2,
            5 => 3,
            6..=10 => 4,
            11..=20 => 5,
            21..=30 => 6,
            31..=40 => 7,
            _ => 8,
        };
        Some(base_row + self.get_hotel_row_advantage())
    }

    /// Share price for a chain of the given size. Zero when the chain is dormant.
    pub fn get_stock_value(&self, chain_length: usize) -> u32 {
        self.get_row_from_chain_length(chain_length)
            .map(|row| (row as u32 + 2) * 100)
            .unwrap_or(0)
    }

    pub fn get_majority_holder_bonus(&self, chain_length: usize) -> u32 {
        self.get_stock_value(chain_length) * 10
    }

    pub fn get_minority_holder_bonus(&self, chain_length: usize) -> u32 {
        self.get_stock_value(chain_length) * 5
    }
}

pub fn is_safe_size(chain_length: usize) -> bool {
    chain_length >= SAFE_CHAIN_SIZE
}

pub fn is_game_ending_size(chain_length: usize) -> bool {
    chain_length >= GAME_ENDING_CHAIN_SIZE
}

impl fmt::Display for Hotel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Hotel::Festival => "Festival",
            Hotel::Continental => "Continental",
            Hotel::Worldwide => "Worldwide",
            Hotel::Tower => "Tower",
            Hotel::American => "American",
            Hotel::Imperial => "Imperial",
            Hotel::Luxor => "Luxor",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Hotel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hotel::iter()
            .find(|hotel| hotel.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown hotel chain `{}`", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_table_cheap_class() {
        let expected = [
            (2, 200),
            (3, 300),
            (4, 400),
            (5, 500),
            (6, 600),
            (10, 600),
            (11, 700),
            (20, 700),
            (21, 800),
            (31, 900),
            (40, 900),
            (41, 1000),
            (108, 1000),
        ];
        for (size, price) in expected {
            assert_eq!(Hotel::Tower.get_stock_value(size), price, "size {}", size);
            assert_eq!(Hotel::Luxor.get_stock_value(size), price, "size {}", size);
        }
    }

    #[test]
    fn test_price_classes_are_offset() {
        assert_eq!(Hotel::American.get_stock_value(2), 300);
        assert_eq!(Hotel::Festival.get_stock_value(41), 1100);
        assert_eq!(Hotel::Imperial.get_stock_value(2), 400);
        assert_eq!(Hotel::Continental.get_stock_value(41), 1200);
    }

    #[test]
    fn test_dormant_chain_has_no_price() {
        assert_eq!(Hotel::Continental.get_stock_value(0), 0);
        assert_eq!(Hotel::Continental.get_stock_value(1), 0);
        assert_eq!(Hotel::Continental.get_majority_holder_bonus(0), 0);
    }

    #[test]
    fn test_price_is_monotonic_in_size() {
        for hotel in Hotel::iter() {
            let mut last = 0;
            for size in 0..=108 {
                let price = hotel.get_stock_value(size);
                assert!(price >= last);
                last = price;
            }
        }
    }

    #[test]
    fn test_bonuses() {
        assert_eq!(Hotel::Worldwide.get_majority_holder_bonus(5), 6000);
        assert_eq!(Hotel::Worldwide.get_minority_holder_bonus(5), 3000);
    }

    #[test]
    fn test_names_round_trip() {
        for hotel in Hotel::iter() {
            assert_eq!(hotel.to_string().parse::<Hotel>(), Ok(hotel));
            assert_eq!(Hotel::from_initial(hotel.initial()), Some(hotel));
        }
        assert!("Sackson".parse::<Hotel>().is_err());
        assert_eq!(
            serde_json::to_string(&Hotel::Continental).unwrap(),
            "\"continental\""
        );
    }
}
