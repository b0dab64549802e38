//! Whole games of random legal play, checking the conservation laws after
//! every single action.

use proptest::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

use super::{
    acquire_constants::{HAND_SIZE, SAFE_CHAIN_SIZE, STOCK_PER_HOTEL},
    acquire_game::AcquireGame,
    acquire_game_state::{AcquireGameState, Phase},
    acquire_response::{AcquirePlayerResponse, AcquireResponse},
    game_options::{GameOptions, SeatConfig},
    hotel_data::Hotel,
};

fn seeded_game(players: usize, seed: u64) -> AcquireGame {
    let options = GameOptions::builder()
        .seats(
            (0..players)
                .map(|i| SeatConfig::human(&format!("Seat {}", i + 1)))
                .collect(),
        )
        .seed(seed)
        .build();
    AcquireGame::new(&options).unwrap()
}

// Plays until the game ends or `max_actions` is reached, calling `check` after
// every accepted action with the state before and after.
fn play(
    game: &mut AcquireGame,
    seed: u64,
    max_actions: usize,
    mut check: impl FnMut(&AcquireGame, &AcquireResponse, &AcquireGame),
) {
    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..max_actions {
        let Some(id) = game.awaiting_player() else { break };
        let actions = game.legal_actions(id);
        assert!(!actions.is_empty(), "no legal action in {:?}", game.phase());

        // rarely end the game early so long games still get played out
        let others: Vec<&AcquireResponse> = actions
            .iter()
            .filter(|a| **a != AcquireResponse::EndGame)
            .collect();
        let can_end = others.len() < actions.len();
        let action = match can_end && (others.is_empty() || rng.gen_bool(0.1)) {
            true => AcquireResponse::EndGame,
            false => others[rng.gen_range(0..others.len())].clone(),
        };

        let before = game.clone();
        game.apply(AcquirePlayerResponse::new(action.clone(), id))
            .unwrap_or_else(|error| panic!("legal action {} rejected: {}", action, error));
        check(&before, &action, game);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn test_random_play_keeps_invariants(players in 2usize..=6, seed in any::<u64>()) {
        let mut game = seeded_game(players, seed);
        prop_assert_eq!(game.check_invariants(), Ok(()));

        play(&mut game, seed, 600, |_, _, after| {
            assert_eq!(after.check_invariants(), Ok(()));
            for hotel in Hotel::iter() {
                assert!(after.chains().stock_available(hotel) <= STOCK_PER_HOTEL);
            }
            assert!(after.board().get_active_hotels().len() <= 7);
            for player in after.players() {
                assert!(player.tiles.len() <= HAND_SIZE);
            }
        });
    }

    #[test]
    fn test_accepted_dispositions_obey_the_law(players in 2usize..=6, seed in any::<u64>()) {
        let mut game = seeded_game(players, seed);
        play(&mut game, seed, 600, |before, action, _| {
            if let (
                AcquireGameState::DisposeStock(disposal),
                AcquireResponse::MergerDisposition { sell, trade, hold, .. },
            ) = (before.state(), action)
            {
                let disposer = disposal.current_disposer().unwrap();
                let pre_holding = before.player(disposer).unwrap().holding(disposal.defunct_chain);
                let pool = before.chains().stock_available(disposal.merger.surviving_hotel);
                assert_eq!(sell + trade + hold, pre_holding);
                assert_eq!(trade % 2, 0);
                assert!(*trade <= 2 * pool);
            }
        });
    }

    #[test]
    fn test_safe_chains_are_never_absorbed(players in 2usize..=6, seed in any::<u64>()) {
        let mut game = seeded_game(players, seed);
        play(&mut game, seed, 600, |before, _, after| {
            for hotel in Hotel::iter() {
                if before.board().get_hotel_chain_size(hotel) >= SAFE_CHAIN_SIZE {
                    assert!(after.board().is_active(hotel), "{} was safe and vanished", hotel);
                }
            }
        });
    }

    #[test]
    fn test_same_seed_same_game(seed in any::<u64>()) {
        let mut a = seeded_game(4, seed);
        let mut b = seeded_game(4, seed);
        play(&mut a, seed, 200, |_, _, _| {});
        play(&mut b, seed, 200, |_, _, _| {});
        prop_assert_eq!(a, b);
    }
}

#[test]
fn test_long_games_finish() {
    for seed in 0..4 {
        let mut game = seeded_game(3, seed);
        play(&mut game, seed, 20_000, |_, _, _| {});
        assert_eq!(game.phase(), Phase::GameOver, "seed {}", seed);

        let scores = game.final_scores().unwrap();
        assert!(scores.iter().any(|score| score.winner));
        for score in scores {
            assert_eq!(score.total, score.cash_on_hand + score.bonuses + score.liquidation);
        }
        for hotel in game.board().get_active_hotels() {
            assert!(game.players().iter().all(|player| player.holding(hotel) == 0));
        }
    }
}
