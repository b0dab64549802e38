use rand::{seq::SliceRandom, Rng};

use super::tile::Tile;

/// The face-down draw pile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileBag {
    tiles: Vec<Tile>,
}

impl TileBag {
    pub fn shuffled<R: Rng>(rng: &mut R) -> Self {
        let mut tiles: Vec<Tile> = Tile::all().collect();
        tiles.shuffle(rng);
        Self { tiles }
    }

    /// A bag that deals in exactly the given order.
    pub fn from_draw_order(mut tiles: Vec<Tile>) -> Self {
        tiles.reverse();
        Self { tiles }
    }

    pub fn draw(&mut self) -> Option<Tile> {
        self.tiles.pop()
    }

    pub fn remaining(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}
