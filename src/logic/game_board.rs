use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use super::{
    acquire_constants::{BOARD_COLS, BOARD_ROWS},
    hotel_data::{is_safe_size, Hotel},
    tile::Tile,
};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    Empty,
    Orphan,
    Hotel(Hotel),
}

/// Legality of an empty coordinate against the live board.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileStatus {
    Playable,
    /// Would start an eighth chain. May still be placed, but nothing gets founded.
    Unfoundable,
    /// Would merge two safe chains. Can never be placed.
    Dead,
    Occupied,
}

impl TileStatus {
    pub fn is_placeable(&self) -> bool {
        matches!(self, TileStatus::Playable | TileStatus::Unfoundable)
    }
}

/// What placing a tile on an empty coordinate does to the board.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum PlacementKind {
    Orphan,
    /// Touches orphans only, with every chain already on the board.
    OrphanCluster,
    FoundChain,
    Grow(Hotel),
    Merge(Vec<Hotel>),
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct GameBoard {
    cells: [[Cell; BOARD_COLS]; BOARD_ROWS],
    chain_sizes: [usize; Hotel::count()],
}

impl Default for GameBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl GameBoard {
    pub fn new() -> GameBoard {
        GameBoard {
            cells: [[Cell::Empty; BOARD_COLS]; BOARD_ROWS],
            chain_sizes: [0; Hotel::count()],
        }
    }

    pub fn get_cell_state(&self, tile: Tile) -> Cell {
        match tile.is_on_board() {
            true => self.cells[tile.row][tile.col],
            false => Cell::Empty,
        }
    }

    pub fn get_hotel_at(&self, tile: Tile) -> Option<Hotel> {
        match self.get_cell_state(tile) {
            Cell::Hotel(hotel) => Some(hotel),
            _ => None,
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell; BOARD_COLS]> {
        self.cells.iter()
    }

    pub fn tile_count(&self) -> usize {
        Tile::all()
            .filter(|tile| self.get_cell_state(*tile) != Cell::Empty)
            .count()
    }

    pub fn get_hotel_chain_size(&self, hotel: Hotel) -> usize {
        self.chain_sizes[hotel.index()]
    }

    pub fn is_active(&self, hotel: Hotel) -> bool {
        self.get_hotel_chain_size(hotel) > 0
    }

    pub fn is_safe(&self, hotel: Hotel) -> bool {
        is_safe_size(self.get_hotel_chain_size(hotel))
    }

    pub fn get_active_hotels(&self) -> Vec<Hotel> {
        Hotel::iter().filter(|hotel| self.is_active(*hotel)).collect()
    }

    pub fn get_inactive_hotels(&self) -> Vec<Hotel> {
        Hotel::iter().filter(|hotel| !self.is_active(*hotel)).collect()
    }

    /// Distinct chains orthogonally adjacent to `tile`, in chain order.
    pub fn get_adjacent_hotels(&self, tile: Tile) -> Vec<Hotel> {
        let mut hotel_is_adjacent = [false; Hotel::count()];
        for neighbor in tile.neighbors() {
            if let Cell::Hotel(hotel) = self.get_cell_state(neighbor) {
                hotel_is_adjacent[hotel.index()] = true;
            }
        }

        Hotel::iter()
            .filter(|hotel| hotel_is_adjacent[hotel.index()])
            .collect()
    }

    fn is_cell_next_to_orphan(&self, tile: Tile) -> bool {
        tile.neighbors()
            .any(|neighbor| self.get_cell_state(neighbor) == Cell::Orphan)
    }

    pub fn classify(&self, tile: Tile) -> TileStatus {
        if !tile.is_on_board() || self.get_cell_state(tile) != Cell::Empty {
            return TileStatus::Occupied;
        }

        let adjacent_hotels = self.get_adjacent_hotels(tile);
        let adjacent_safe_chains = adjacent_hotels
            .iter()
            .filter(|hotel| self.is_safe(**hotel))
            .count();

        if adjacent_safe_chains > 1 {
            return TileStatus::Dead;
        }

        if adjacent_hotels.is_empty()
            && self.is_cell_next_to_orphan(tile)
            && self.get_inactive_hotels().is_empty()
        {
            return TileStatus::Unfoundable;
        }

        TileStatus::Playable
    }

    pub fn placement_kind(&self, tile: Tile) -> PlacementKind {
        let adjacent_hotels = self.get_adjacent_hotels(tile);
        match adjacent_hotels.len() {
            0 if !self.is_cell_next_to_orphan(tile) => PlacementKind::Orphan,
            0 if self.get_inactive_hotels().is_empty() => PlacementKind::OrphanCluster,
            0 => PlacementKind::FoundChain,
            1 => PlacementKind::Grow(adjacent_hotels[0]),
            _ => PlacementKind::Merge(adjacent_hotels),
        }
    }

    fn set_cell(&mut self, tile: Tile, cell: Cell) {
        if let Cell::Hotel(previous) = self.cells[tile.row][tile.col] {
            self.chain_sizes[previous.index()] -= 1;
        }
        if let Cell::Hotel(next) = cell {
            self.chain_sizes[next.index()] += 1;
        }
        self.cells[tile.row][tile.col] = cell;
    }

    /// Puts a tile down without incorporating it into anything.
    pub fn place_orphan(&mut self, tile: Tile) {
        self.set_cell(tile, Cell::Orphan);
    }

    /// Turns `tile` and every orphan connected to it into `hotel`.
    /// Returns the number of cells that joined the chain.
    pub fn flood_hotel(&mut self, tile: Tile, hotel: Hotel) -> usize {
        fn fill(board: &mut GameBoard, tile: Tile, hotel: Hotel) -> usize {
            if board.get_cell_state(tile) != Cell::Orphan {
                return 0;
            }
            board.set_cell(tile, Cell::Hotel(hotel));

            1 + tile
                .neighbors()
                .map(|neighbor| fill(board, neighbor, hotel))
                .sum::<usize>()
        }

        fill(self, tile, hotel)
    }

    /// Returns the number of tiles handed over to the survivor.
    pub fn replace_defunct_hotel_with_surviving_hotel(
        &mut self,
        defunct_hotel: Hotel,
        surviving_hotel: Hotel,
    ) -> usize {
        let defunct_tiles: Vec<Tile> = Tile::all()
            .filter(|tile| self.get_hotel_at(*tile) == Some(defunct_hotel))
            .collect();
        for tile in &defunct_tiles {
            self.set_cell(*tile, Cell::Hotel(surviving_hotel));
        }
        defunct_tiles.len()
    }

    pub fn get_hotel_stock_price(&self, hotel: Hotel) -> u32 {
        hotel.get_stock_value(self.get_hotel_chain_size(hotel))
    }

    pub fn get_hotel_majority_stock_bonus(&self, hotel: Hotel) -> u32 {
        hotel.get_majority_holder_bonus(self.get_hotel_chain_size(hotel))
    }

    pub fn get_hotel_minority_stock_bonus(&self, hotel: Hotel) -> u32 {
        hotel.get_minority_holder_bonus(self.get_hotel_chain_size(hotel))
    }

    /// Recounts every chain from the cells and compares with the running sizes.
    pub fn chain_sizes_are_consistent(&self) -> bool {
        Hotel::iter().all(|hotel| {
            let counted = Tile::all()
                .filter(|tile| self.get_hotel_at(*tile) == Some(hotel))
                .count();
            counted == self.get_hotel_chain_size(hotel) && counted != 1
        })
    }

    #[cfg(test)]
    pub(crate) fn fill(&mut self, tiles: impl IntoIterator<Item = Tile>, cell: Cell) {
        for tile in tiles {
            self.set_cell(tile, cell);
        }
    }
}

#[cfg(test)]
pub(crate) fn row_of(row: usize, cols: std::ops::Range<usize>) -> Vec<Tile> {
    cols.map(|col| Tile::new(row, col)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::acquire_constants::SAFE_CHAIN_SIZE;

    #[test]
    fn test_new_game_board() {
        let game_board = GameBoard::new();
        assert_eq!(game_board.rows().count(), BOARD_ROWS);
        assert_eq!(game_board.tile_count(), 0);
        assert_eq!(game_board.get_active_hotels().len(), 0);
    }

    #[test]
    fn test_get_hotel_at() {
        let mut game_board = GameBoard::new();
        game_board.fill(row_of(0, 0..2), Cell::Hotel(Hotel::Luxor));
        assert_eq!(game_board.get_hotel_at(Tile::new(0, 0)), Some(Hotel::Luxor));
        assert_eq!(game_board.get_hotel_at(Tile::new(1, 0)), None);
    }

    #[test]
    fn test_get_active_hotels() {
        let mut game_board = GameBoard::new();
        game_board.fill(row_of(0, 0..2), Cell::Hotel(Hotel::Luxor));
        game_board.fill(row_of(2, 0..2), Cell::Hotel(Hotel::Tower));

        let active_hotels = game_board.get_active_hotels();
        let inactive_hotels = game_board.get_inactive_hotels();

        for hotel in vec![Hotel::Luxor, Hotel::Tower] {
            assert_eq!(active_hotels.contains(&hotel), true);
            assert_eq!(inactive_hotels.contains(&hotel), false);
        }

        for hotel in vec![
            Hotel::American,
            Hotel::Worldwide,
            Hotel::Festival,
            Hotel::Imperial,
            Hotel::Continental,
        ] {
            assert_eq!(active_hotels.contains(&hotel), false);
            assert_eq!(inactive_hotels.contains(&hotel), true);
        }
    }

    #[test]
    fn test_get_hotel_chain_size() {
        let mut game_board = GameBoard::new();
        game_board.fill(row_of(0, 0..2), Cell::Hotel(Hotel::Luxor));
        game_board.fill(row_of(2, 0..4), Cell::Hotel(Hotel::Tower));
        game_board.fill(row_of(4, 0..8), Cell::Hotel(Hotel::American));

        assert_eq!(game_board.get_hotel_chain_size(Hotel::Luxor), 2);
        assert_eq!(game_board.get_hotel_chain_size(Hotel::Tower), 4);
        assert_eq!(game_board.get_hotel_chain_size(Hotel::American), 8);
        assert_eq!(game_board.chain_sizes_are_consistent(), true);
    }

    #[test]
    fn test_get_adjacent_hotels() {
        let mut game_board = GameBoard::new();
        game_board.fill([Tile::new(0, 1)], Cell::Hotel(Hotel::Tower));
        game_board.fill([Tile::new(1, 0)], Cell::Hotel(Hotel::Festival));
        game_board.fill([Tile::new(1, 2)], Cell::Hotel(Hotel::Luxor));

        assert_eq!(
            game_board.get_adjacent_hotels(Tile::new(0, 0)),
            vec![Hotel::Tower, Hotel::Festival]
        );
        assert_eq!(
            game_board.get_adjacent_hotels(Tile::new(1, 1)),
            vec![Hotel::Tower, Hotel::Luxor, Hotel::Festival]
        );
    }

    #[test]
    fn test_classify_occupied_and_playable() {
        let mut game_board = GameBoard::new();
        assert_eq!(game_board.classify(Tile::new(0, 0)), TileStatus::Playable);

        game_board.place_orphan(Tile::new(0, 0));
        assert_eq!(game_board.classify(Tile::new(0, 0)), TileStatus::Occupied);
        assert_eq!(
            game_board.classify(Tile::new(BOARD_ROWS, BOARD_COLS)),
            TileStatus::Occupied
        );
    }

    #[test]
    fn test_classify_eighth_chain_is_unfoundable() {
        let mut game_board = GameBoard::new();
        for (i, hotel) in Hotel::iter().enumerate() {
            game_board.fill(row_of(i, 0..2), Cell::Hotel(hotel));
        }
        game_board.place_orphan(Tile::new(BOARD_ROWS - 1, BOARD_COLS - 1));

        let next_to_orphan = Tile::new(BOARD_ROWS - 2, BOARD_COLS - 1);
        assert_eq!(game_board.classify(next_to_orphan), TileStatus::Unfoundable);
        assert_eq!(
            game_board.placement_kind(next_to_orphan),
            PlacementKind::OrphanCluster
        );
        assert_eq!(game_board.classify(next_to_orphan).is_placeable(), true);
    }

    #[test]
    fn test_classify_merging_safe_chains_is_dead() {
        let mut game_board = GameBoard::new();
        game_board.fill(row_of(0, 0..SAFE_CHAIN_SIZE), Cell::Hotel(Hotel::Luxor));
        game_board.fill(row_of(2, 0..SAFE_CHAIN_SIZE), Cell::Hotel(Hotel::Tower));

        assert_eq!(game_board.classify(Tile::new(1, 0)), TileStatus::Dead);
        assert_eq!(game_board.classify(Tile::new(1, 0)).is_placeable(), false);

        // one safe chain and one small chain is an ordinary merger
        let mut game_board = GameBoard::new();
        game_board.fill(row_of(0, 0..SAFE_CHAIN_SIZE), Cell::Hotel(Hotel::Luxor));
        game_board.fill(row_of(2, 0..3), Cell::Hotel(Hotel::Tower));
        assert_eq!(game_board.classify(Tile::new(1, 0)), TileStatus::Playable);
    }

    #[test]
    fn test_placement_kind() {
        let mut game_board = GameBoard::new();
        assert_eq!(game_board.placement_kind(Tile::new(0, 0)), PlacementKind::Orphan);
        game_board.place_orphan(Tile::new(0, 0));
        assert_eq!(
            game_board.placement_kind(Tile::new(0, 1)),
            PlacementKind::FoundChain
        );

        let mut game_board = GameBoard::new();
        game_board.fill(row_of(0, 0..2), Cell::Hotel(Hotel::Worldwide));
        game_board.fill(row_of(2, 0..2), Cell::Hotel(Hotel::Continental));
        game_board.fill(row_of(1, 2..4), Cell::Hotel(Hotel::Imperial));
        assert_eq!(
            game_board.placement_kind(Tile::new(1, 1)),
            PlacementKind::Merge(vec![Hotel::Worldwide, Hotel::Imperial, Hotel::Continental])
        );
        assert_eq!(
            game_board.placement_kind(Tile::new(1, 4)),
            PlacementKind::Grow(Hotel::Imperial)
        );
    }

    #[test]
    fn test_flood_absorbs_connected_orphans() {
        let mut game_board = GameBoard::new();
        game_board.fill([Tile::new(0, 0)], Cell::Hotel(Hotel::Luxor));
        game_board.fill([Tile::new(0, 1)], Cell::Hotel(Hotel::Luxor));
        game_board.place_orphan(Tile::new(0, 3));
        game_board.place_orphan(Tile::new(1, 3));
        game_board.place_orphan(Tile::new(5, 5));

        game_board.place_orphan(Tile::new(0, 2));
        let joined = game_board.flood_hotel(Tile::new(0, 2), Hotel::Luxor);

        assert_eq!(joined, 3);
        assert_eq!(game_board.get_hotel_chain_size(Hotel::Luxor), 5);
        assert_eq!(game_board.get_cell_state(Tile::new(5, 5)), Cell::Orphan);
        assert_eq!(game_board.chain_sizes_are_consistent(), true);
    }

    #[test]
    fn test_replace_defunct_hotel() {
        let mut game_board = GameBoard::new();
        game_board.fill(row_of(0, 0..3), Cell::Hotel(Hotel::Tower));
        game_board.fill(row_of(2, 0..5), Cell::Hotel(Hotel::American));

        let moved = game_board.replace_defunct_hotel_with_surviving_hotel(Hotel::Tower, Hotel::American);

        assert_eq!(moved, 3);
        assert_eq!(game_board.get_hotel_chain_size(Hotel::Tower), 0);
        assert_eq!(game_board.get_hotel_chain_size(Hotel::American), 8);
        assert_eq!(game_board.is_active(Hotel::Tower), false);
        assert_eq!(game_board.get_hotel_stock_price(Hotel::American), 700);
    }
}
