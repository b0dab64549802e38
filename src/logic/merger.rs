//! Merger resolution rules: who survives, in which order the defunct chains are
//! wound up, who is paid which bonus, and which dispositions are acceptable.
//!
//! Everything here is a pure function of the board and the holdings; the turn
//! engine in `acquire_game` sequences the steps and moves the money.

use serde::{Deserialize, Serialize};

use super::{
    acquire_constants::BONUS_UNIT, acquire_error::RuleViolation, game_board::GameBoard,
    hotel_data::Hotel, player::PlayerId,
};

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum SurvivorSelection {
    Decided { survivor: Hotel, defuncts: Vec<Hotel> },
    /// The largest chains are the same size, the merge maker picks one.
    Tied(Vec<Hotel>),
}

/// How a stockholder winds up their shares of a defunct chain.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub struct Disposition {
    pub sell: u32,
    pub trade: u32,
    pub hold: u32,
}

pub fn select_survivor(board: &GameBoard, touched: &[Hotel]) -> SurvivorSelection {
    let largest = touched
        .iter()
        .map(|hotel| board.get_hotel_chain_size(*hotel))
        .max()
        .unwrap_or(0);

    let tied: Vec<Hotel> = touched
        .iter()
        .copied()
        .filter(|hotel| board.get_hotel_chain_size(*hotel) == largest)
        .collect();

    match tied.as_slice() {
        [survivor] => SurvivorSelection::Decided {
            survivor: *survivor,
            defuncts: defunct_order(board, touched, *survivor),
        },
        _ => SurvivorSelection::Tied(tied),
    }
}

/// Every touched chain but the survivor, largest first, equal sizes in chain order.
pub fn defunct_order(board: &GameBoard, touched: &[Hotel], survivor: Hotel) -> Vec<Hotel> {
    let mut defuncts: Vec<Hotel> = touched
        .iter()
        .copied()
        .filter(|hotel| *hotel != survivor)
        .collect();
    defuncts.sort_by(|a, b| {
        board
            .get_hotel_chain_size(*b)
            .cmp(&board.get_hotel_chain_size(*a))
            .then(a.cmp(b))
    });
    defuncts
}

pub fn turn_order_from(start: PlayerId, player_count: usize) -> Vec<PlayerId> {
    (0..player_count)
        .map(|offset| PlayerId((start.0 + offset) % player_count))
        .collect()
}

/// Splits `amount` evenly in whole bonus units; leftover units go one each to the
/// recipients in the order given.
pub fn split_bonus(amount: u32, recipients: &[PlayerId]) -> Vec<(PlayerId, u32)> {
    if recipients.is_empty() {
        return Vec::new();
    }
    let count = recipients.len() as u32;
    let units = amount / BONUS_UNIT;
    let loose_change = amount % BONUS_UNIT;
    let base = units / count;
    let leftover = units % count;

    recipients
        .iter()
        .enumerate()
        .map(|(i, player)| {
            let mut share = base * BONUS_UNIT;
            if (i as u32) < leftover {
                share += BONUS_UNIT;
            }
            if i == 0 {
                share += loose_change;
            }
            (*player, share)
        })
        .collect()
}

/// Majority and minority payouts for one chain.
///
/// `holdings` must be listed in turn order starting from the active player,
/// which is also the order leftover units are handed out in.
pub fn shareholder_bonuses(
    holdings: &[(PlayerId, u32)],
    majority: u32,
    minority: u32,
) -> Vec<(PlayerId, u32)> {
    let holders: Vec<(PlayerId, u32)> = holdings
        .iter()
        .copied()
        .filter(|(_, shares)| *shares > 0)
        .collect();

    let Some(top) = holders.iter().map(|(_, shares)| *shares).max() else {
        return Vec::new();
    };
    let leaders: Vec<PlayerId> = holders
        .iter()
        .filter(|(_, shares)| *shares == top)
        .map(|(player, _)| *player)
        .collect();

    if leaders.len() > 1 {
        return split_bonus(majority, &leaders);
    }

    let leader = leaders[0];
    let second = holders
        .iter()
        .map(|(_, shares)| *shares)
        .filter(|shares| *shares < top)
        .max();

    match second {
        None => vec![(leader, majority + minority)],
        Some(second) => {
            let runners_up: Vec<PlayerId> = holders
                .iter()
                .filter(|(_, shares)| *shares == second)
                .map(|(player, _)| *player)
                .collect();
            let mut payouts = vec![(leader, majority)];
            payouts.extend(split_bonus(minority, &runners_up));
            payouts
        }
    }
}

pub fn validate_disposition(
    holding: u32,
    disposition: &Disposition,
    survivor_available: u32,
) -> Result<(), RuleViolation> {
    let Disposition { sell, trade, hold } = *disposition;
    if sell.checked_add(trade).and_then(|sum| sum.checked_add(hold)) != Some(holding) {
        return Err(RuleViolation::InvalidDisposition);
    }
    if trade % 2 != 0 {
        return Err(RuleViolation::TradeNotEven);
    }
    // an empty survivor pool disables trading outright
    if trade > 0 && (survivor_available == 0 || trade / 2 > survivor_available) {
        return Err(RuleViolation::InsufficientStockToTrade);
    }
    Ok(())
}

/// Every acceptable disposition, ordered from "hold everything" outward.
pub fn legal_dispositions(holding: u32, survivor_available: u32) -> Vec<Disposition> {
    let mut dispositions = Vec::new();
    for sell in 0..=holding {
        let max_trade = ((holding - sell) / 2).min(survivor_available) * 2;
        for trade in (0..=max_trade).step_by(2) {
            dispositions.push(Disposition {
                sell,
                trade,
                hold: holding - sell - trade,
            });
        }
    }
    dispositions
}
