use crate::logic::{hotel_data::Hotel, player::PlayerId, tile::Tile};

/// The merge maker has to pick the survivor among equally large chains.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct MergerChoiceState {
    pub merge_maker: PlayerId,
    pub tile: Tile,
    pub touched: Vec<Hotel>,
    pub tied: Vec<Hotel>,
}

/// A merger whose survivor is known.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct MergerState {
    pub merge_maker: PlayerId,
    pub tile: Tile,
    pub surviving_hotel: Hotel,
    /// Still to be wound up after the current one, in order.
    pub defunct_hotels_remaining: Vec<Hotel>,
}

impl MergerState {
    pub fn new(merge_maker: PlayerId, tile: Tile, surviving_hotel: Hotel, defuncts: Vec<Hotel>) -> Self {
        MergerState {
            merge_maker,
            tile,
            surviving_hotel,
            defunct_hotels_remaining: defuncts,
        }
    }

    pub fn next_defunct_hotel(&mut self) -> Option<Hotel> {
        match self.defunct_hotels_remaining.is_empty() {
            true => None,
            false => Some(self.defunct_hotels_remaining.remove(0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defuncts_come_out_in_order() {
        let mut merger = MergerState::new(
            PlayerId(0),
            Tile::new(0, 0),
            Hotel::Tower,
            vec![Hotel::Festival, Hotel::Luxor],
        );
        assert_eq!(merger.next_defunct_hotel(), Some(Hotel::Festival));
        assert_eq!(merger.next_defunct_hotel(), Some(Hotel::Luxor));
        assert_eq!(merger.next_defunct_hotel(), None);
    }
}
