use crate::logic::{player::PlayerId, tile::Tile};

/// Tracks the starting-tile draw that decides who goes first.
#[derive(Default)]
pub struct GameStartState {
    leader: Option<(Tile, PlayerId)>,
}

impl GameStartState {
    pub fn new() -> Self {
        Self::default()
    }

    // call this after a player has drawn their starting tile
    pub fn player_drew_tile(&mut self, player: PlayerId, tile: Tile) {
        if self.leader.map_or(true, |(leading, _)| tile < leading) {
            self.leader = Some((tile, player));
        }
    }

    /// The tile closest to 1-A so far and who drew it.
    pub fn winner(&self) -> Option<(Tile, PlayerId)> {
        self.leader
    }
}
