//! What a seat is allowed to see of the game, pushed after every change.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{
    acquire_game::{AcquireGame, FinalScore},
    acquire_game_state::Phase,
    acquire_request::AcquireRequest,
    game_board::{Cell, TileStatus},
    hotel_chains::ChainInfo,
    hotel_data::Hotel,
    player::{PlayerId, PlayerKind},
    tile::Tile,
};

/// The viewing seat's private information.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct SelfView {
    pub id: PlayerId,
    pub cash: u32,
    pub holdings: BTreeMap<Hotel, u32>,
    pub hand: Vec<(Tile, TileStatus)>,
}

/// Public information about any seat.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub kind: PlayerKind,
    pub connected: bool,
    pub hand_size: usize,
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Increases by one with every accepted action.
    pub version: u64,
    pub board: Vec<Vec<Cell>>,
    pub chains: Vec<ChainInfo>,
    pub active_chains: Vec<Hotel>,
    pub current_player: PlayerId,
    pub phase: Phase,
    pub request: AcquireRequest,
    /// Only ever true in the current player's own snapshot.
    pub end_game_available: bool,
    pub you: Option<SelfView>,
    pub players: Vec<PlayerView>,
    pub tiles_remaining: usize,
    pub final_scores: Option<Vec<FinalScore>>,
}

impl GameSnapshot {
    /// Builds the view for `seat`, or a public view when `seat` is `None`.
    pub fn new(game: &AcquireGame, version: u64, seat: Option<PlayerId>) -> Self {
        let you = seat.and_then(|id| game.player(id)).map(|player| SelfView {
            id: player.id,
            cash: player.cash,
            holdings: player.holdings(),
            hand: game.hand_status(player.id),
        });

        GameSnapshot {
            version,
            board: game.board().rows().map(|row| row.to_vec()).collect(),
            chains: game.chains().summaries(game.board()),
            active_chains: game.board().get_active_hotels(),
            current_player: game.current_player(),
            phase: game.phase(),
            request: game.request(),
            end_game_available: seat == Some(game.current_player()) && game.end_game_available(),
            you,
            players: game
                .players()
                .iter()
                .map(|player| PlayerView {
                    id: player.id,
                    name: player.name.clone(),
                    kind: player.kind,
                    connected: player.connected,
                    hand_size: player.tiles.len(),
                })
                .collect(),
            tiles_remaining: game.bag_remaining(),
            final_scores: game.final_scores().map(|scores| scores.to_vec()),
        }
    }

    pub fn cell(&self, tile: Tile) -> Cell {
        self.board
            .get(tile.row)
            .and_then(|row| row.get(tile.col))
            .copied()
            .unwrap_or(Cell::Empty)
    }

    pub fn chain(&self, hotel: Hotel) -> Option<&ChainInfo> {
        self.chains.iter().find(|info| info.hotel == hotel)
    }

    /// Whether the game is waiting on the viewing seat.
    pub fn is_my_turn(&self) -> bool {
        match (&self.you, self.request.player()) {
            (Some(you), Some(awaited)) => you.id == awaited,
            _ => false,
        }
    }
}

/// A client's copy of the latest snapshot.
#[derive(Debug, Default, Clone)]
pub struct SnapshotMirror {
    latest: Option<GameSnapshot>,
}

impl SnapshotMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps `snapshot` if it is newer than what is held. Returns whether it was kept.
    pub fn apply(&mut self, snapshot: GameSnapshot) -> bool {
        if let Some(latest) = &self.latest {
            if snapshot.version <= latest.version {
                return false;
            }
        }
        self.latest = Some(snapshot);
        true
    }

    pub fn latest(&self) -> Option<&GameSnapshot> {
        self.latest.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::acquire_game::tests::options;

    #[test]
    fn test_snapshot_hides_other_hands() {
        let game = AcquireGame::new(&options(3)).unwrap();
        let snapshot = GameSnapshot::new(&game, 1, Some(PlayerId(1)));

        let you = snapshot.you.as_ref().unwrap();
        assert_eq!(you.id, PlayerId(1));
        assert_eq!(you.hand.len(), 6);
        assert_eq!(you.cash, 6000);
        assert_eq!(snapshot.players.len(), 3);
        assert!(snapshot.players.iter().all(|player| player.hand_size == 6));
        assert_eq!(snapshot.is_my_turn(), false);

        let public = GameSnapshot::new(&game, 1, None);
        assert_eq!(public.you, None);
        assert_eq!(public.phase, Phase::PlaceTile);
        assert_eq!(public.board.len(), 9);
        assert_eq!(public.chains.len(), 7);
    }

    #[test]
    fn test_snapshot_serializes() {
        let game = AcquireGame::new(&options(2)).unwrap();
        let snapshot = GameSnapshot::new(&game, 4, Some(PlayerId(0)));
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: GameSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
        assert_eq!(back.is_my_turn(), true);
    }

    #[test]
    fn test_mirror_ignores_stale_and_duplicate_snapshots() {
        let game = AcquireGame::new(&options(2)).unwrap();
        let mut mirror = SnapshotMirror::new();

        assert_eq!(mirror.apply(GameSnapshot::new(&game, 2, None)), true);
        let held = mirror.latest().cloned();

        assert_eq!(mirror.apply(GameSnapshot::new(&game, 2, None)), false);
        assert_eq!(mirror.apply(GameSnapshot::new(&game, 1, None)), false);
        assert_eq!(mirror.latest().cloned(), held);

        assert_eq!(mirror.apply(GameSnapshot::new(&game, 3, None)), true);
        assert_eq!(mirror.latest().map(|s| s.version), Some(3));
    }
}
