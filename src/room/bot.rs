use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::logic::{
    acquire_response::AcquireResponse, game_snapshot::GameSnapshot, player::BotKind,
};

/// Decides a bot seat's next action from what that seat can see.
///
/// `legal` is never empty when this is called. Whatever is returned goes through
/// the same validation as a human's action.
pub trait BotStrategy {
    fn choose(&mut self, view: &GameSnapshot, legal: &[AcquireResponse]) -> AcquireResponse;
}

pub struct RandomBot {
    rng: StdRng,
}

impl RandomBot {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        RandomBot { rng }
    }
}

impl BotStrategy for RandomBot {
    fn choose(&mut self, _view: &GameSnapshot, legal: &[AcquireResponse]) -> AcquireResponse {
        // ending the game is left to the humans
        let candidates: Vec<&AcquireResponse> = legal
            .iter()
            .filter(|action| **action != AcquireResponse::EndGame)
            .collect();
        match candidates.is_empty() {
            true => AcquireResponse::EndTurn,
            false => candidates[self.rng.gen_range(0..candidates.len())].clone(),
        }
    }
}

/// Takes the first legal action: never buys, holds every share.
pub struct PassiveBot;

impl BotStrategy for PassiveBot {
    fn choose(&mut self, _view: &GameSnapshot, legal: &[AcquireResponse]) -> AcquireResponse {
        legal.first().cloned().unwrap_or(AcquireResponse::EndTurn)
    }
}

pub fn strategy_for(kind: BotKind, seed: Option<u64>) -> Box<dyn BotStrategy + Send> {
    match kind {
        BotKind::Random => Box::new(RandomBot::new(seed)),
        BotKind::Passive => Box::new(PassiveBot),
    }
}
