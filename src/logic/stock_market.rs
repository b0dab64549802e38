//! Share pricing and the once-per-turn purchase.
//!
//! A purchase is validated as a whole before anything moves: either every
//! requested share changes hands or none does.

use std::collections::BTreeMap;

use super::{
    acquire_constants::STOCK_TO_BUY_PER_TURN,
    acquire_error::RuleViolation,
    game_board::GameBoard,
    hotel_chains::ChainRegistry,
    hotel_data::Hotel,
    player::Player,
};

/// Requested shares per chain.
pub type StockPurchase = BTreeMap<Hotel, u32>;

/// Total price of `purchases` at current prices, or the first rule it breaks.
pub fn purchase_cost(
    board: &GameBoard,
    registry: &ChainRegistry,
    cash: u32,
    purchases: &StockPurchase,
) -> Result<u32, RuleViolation> {
    if purchases.values().any(|quantity| *quantity == 0) {
        return Err(RuleViolation::InvalidStockQuantity);
    }

    let requested = purchases
        .values()
        .fold(0u32, |total, quantity| total.saturating_add(*quantity));
    if requested > STOCK_TO_BUY_PER_TURN {
        return Err(RuleViolation::MaxStocksExceeded {
            requested,
            max: STOCK_TO_BUY_PER_TURN,
        });
    }

    let mut cost = 0;
    for (hotel, quantity) in purchases {
        if !board.is_active(*hotel) || registry.stock_available(*hotel) < *quantity {
            return Err(RuleViolation::StockUnavailable);
        }
        cost += board.get_hotel_stock_price(*hotel) * quantity;
    }

    if cost > cash {
        return Err(RuleViolation::InsufficientFunds { cost, cash });
    }
    Ok(cost)
}

/// Validates and executes a purchase. Returns what it cost.
pub fn buy_stocks(
    board: &GameBoard,
    registry: &mut ChainRegistry,
    player: &mut Player,
    purchases: &StockPurchase,
) -> Result<u32, RuleViolation> {
    let cost = purchase_cost(board, registry, player.cash, purchases)?;

    for (hotel, quantity) in purchases {
        registry.withdraw(*hotel, *quantity)?;
        player.add_stock(*hotel, *quantity);
    }
    player.cash -= cost;

    Ok(cost)
}

/// Every purchase the player could make right now, the empty one included.
pub fn affordable_purchases(
    board: &GameBoard,
    registry: &ChainRegistry,
    cash: u32,
) -> Vec<StockPurchase> {
    let active = board.get_active_hotels();

    // multisets of up to three chains, built in non-decreasing chain order
    let mut candidates: Vec<Vec<Hotel>> = vec![Vec::new()];
    let mut frontier: Vec<Vec<Hotel>> = vec![Vec::new()];
    for _ in 0..STOCK_TO_BUY_PER_TURN {
        let mut next = Vec::new();
        for picks in &frontier {
            let from = picks.last().copied();
            for hotel in active.iter().filter(|hotel| from.map_or(true, |last| **hotel >= last)) {
                let mut extended = picks.clone();
                extended.push(*hotel);
                next.push(extended);
            }
        }
        candidates.extend(next.iter().cloned());
        frontier = next;
    }

    candidates
        .into_iter()
        .map(|picks| {
            let mut purchase = StockPurchase::new();
            for hotel in picks {
                *purchase.entry(hotel).or_insert(0) += 1;
            }
            purchase
        })
        .filter(|purchase| purchase_cost(board, registry, cash, purchase).is_ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{
        game_board::{row_of, Cell},
        player::{PlayerId, PlayerKind},
    };

    fn board_with_two_chains() -> GameBoard {
        let mut board = GameBoard::new();
        // Tower at $300, American at $400
        board.fill(row_of(0, 0..3), Cell::Hotel(Hotel::Tower));
        board.fill(row_of(2, 0..3), Cell::Hotel(Hotel::American));
        board
    }

    fn purchase(entries: &[(Hotel, u32)]) -> StockPurchase {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_buy_stocks() {
        let board = board_with_two_chains();
        let mut registry = ChainRegistry::new();
        let mut player = Player::new(PlayerId(0), "Ada", PlayerKind::Human, 6000);

        let cost = buy_stocks(
            &board,
            &mut registry,
            &mut player,
            &purchase(&[(Hotel::Tower, 1), (Hotel::American, 2)]),
        )
        .unwrap();

        assert_eq!(cost, 300 + 2 * 400);
        assert_eq!(player.cash, 6000 - 1100);
        assert_eq!(player.holding(Hotel::American), 2);
        assert_eq!(registry.stock_available(Hotel::American), 23);
    }

    #[test]
    fn test_more_than_three_is_rejected_whole() {
        let board = board_with_two_chains();
        let mut registry = ChainRegistry::new();
        let mut player = Player::new(PlayerId(0), "Ada", PlayerKind::Human, 6000);

        let result = buy_stocks(
            &board,
            &mut registry,
            &mut player,
            &purchase(&[(Hotel::Tower, 2), (Hotel::American, 2)]),
        );

        assert_eq!(
            result,
            Err(RuleViolation::MaxStocksExceeded { requested: 4, max: 3 })
        );
        assert_eq!(player.cash, 6000);
        assert_eq!(player.holdings().len(), 0);
        assert_eq!(registry, ChainRegistry::new());
    }

    #[test]
    fn test_huge_quantities_exceed_the_limit() {
        let board = board_with_two_chains();
        let registry = ChainRegistry::new();

        assert_eq!(
            purchase_cost(
                &board,
                &registry,
                6000,
                &purchase(&[(Hotel::Tower, u32::MAX), (Hotel::American, 2)]),
            ),
            Err(RuleViolation::MaxStocksExceeded {
                requested: u32::MAX,
                max: 3
            })
        );
        assert_eq!(
            purchase_cost(&board, &registry, 6000, &purchase(&[(Hotel::Tower, u32::MAX)])),
            Err(RuleViolation::MaxStocksExceeded {
                requested: u32::MAX,
                max: 3
            })
        );
    }

    #[test]
    fn test_insufficient_funds_changes_nothing() {
        let board = board_with_two_chains();
        let mut registry = ChainRegistry::new();
        let mut player = Player::new(PlayerId(0), "Ada", PlayerKind::Human, 1100);

        let result = buy_stocks(
            &board,
            &mut registry,
            &mut player,
            &purchase(&[(Hotel::American, 3)]),
        );

        assert_eq!(
            result,
            Err(RuleViolation::InsufficientFunds { cost: 1200, cash: 1100 })
        );
        assert_eq!(player.cash, 1100);
        assert_eq!(player.holding(Hotel::American), 0);
        assert_eq!(registry.stock_available(Hotel::American), 25);
    }

    #[test]
    fn test_unavailable_stock() {
        let board = board_with_two_chains();
        let mut registry = ChainRegistry::new();
        registry.withdraw(Hotel::Tower, 24).unwrap();

        assert_eq!(
            purchase_cost(&board, &registry, 6000, &purchase(&[(Hotel::Tower, 2)])),
            Err(RuleViolation::StockUnavailable)
        );
        assert_eq!(
            purchase_cost(&board, &registry, 6000, &purchase(&[(Hotel::Festival, 1)])),
            Err(RuleViolation::StockUnavailable)
        );
        assert_eq!(
            purchase_cost(&board, &registry, 6000, &purchase(&[(Hotel::Tower, 0)])),
            Err(RuleViolation::InvalidStockQuantity)
        );
        assert_eq!(purchase_cost(&board, &registry, 6000, &StockPurchase::new()), Ok(0));
    }

    #[test]
    fn test_affordable_purchases() {
        let mut board = GameBoard::new();
        board.fill(row_of(0, 0..2), Cell::Hotel(Hotel::Tower));
        let registry = ChainRegistry::new();

        // nothing, 1, 2 or 3 Tower at $200
        assert_eq!(affordable_purchases(&board, &registry, 6000).len(), 4);
        assert_eq!(affordable_purchases(&board, &registry, 0).len(), 1);
        assert_eq!(affordable_purchases(&board, &registry, 400).len(), 3);

        board.fill(row_of(2, 0..2), Cell::Hotel(Hotel::Luxor));
        assert_eq!(affordable_purchases(&board, &registry, 6000).len(), 10);
    }
}
