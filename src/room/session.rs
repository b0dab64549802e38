//! The per-room aggregate: one game, one writer.

use std::collections::BTreeMap;

use tracing::{debug, error, info, instrument, warn};

use super::bot::{strategy_for, BotStrategy};
use crate::logic::{
    acquire_error::AcquireError,
    acquire_game::AcquireGame,
    acquire_game_state::Phase,
    acquire_response::AcquirePlayerResponse,
    game_options::{ConfigError, GameOptions},
    game_snapshot::GameSnapshot,
    player::{PlayerId, PlayerKind},
};

pub struct GameSession {
    game: AcquireGame,
    version: u64,
    bots: BTreeMap<PlayerId, Box<dyn BotStrategy + Send>>,
    poisoned: bool,
}

impl GameSession {
    pub fn new(options: &GameOptions) -> Result<Self, ConfigError> {
        let game = AcquireGame::new(options)?;
        Ok(Self::from_game(game, options.seed))
    }

    /// Wraps an already started game. Bot seats get their strategy from `seed`.
    pub fn from_game(game: AcquireGame, seed: Option<u64>) -> Self {
        let bots = game
            .players()
            .iter()
            .filter_map(|player| match player.kind {
                PlayerKind::Bot(kind) => Some((
                    player.id,
                    strategy_for(kind, seed.map(|seed| seed.wrapping_add(player.id.0 as u64 + 1))),
                )),
                PlayerKind::Human => None,
            })
            .collect();

        let mut session = GameSession {
            game,
            version: 0,
            bots,
            poisoned: false,
        };
        session.drive_bots();
        session
    }

    pub fn game(&self) -> &AcquireGame {
        &self.game
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    pub fn snapshot(&self, seat: Option<PlayerId>) -> GameSnapshot {
        GameSnapshot::new(&self.game, self.version, seat)
    }

    /// Applies a player's action, then lets any bots whose turn it becomes act.
    #[instrument(skip(self, action), fields(player = %action.player, action = %action.response))]
    pub fn submit(&mut self, action: AcquirePlayerResponse) -> Result<Phase, AcquireError> {
        self.apply_checked(action)?;
        let bot_moves = self.drive_bots();
        if bot_moves > 0 {
            debug!(bot_moves, "bots acted");
        }
        Ok(self.game.phase())
    }

    // The game is only replaced once the action went through and the result
    // still balances.
    fn apply_checked(&mut self, action: AcquirePlayerResponse) -> Result<Phase, AcquireError> {
        self.refuse_if_poisoned()?;

        let player = action.player;
        let description = action.response.to_string();
        let mut next = self.game.clone();
        let result = next
            .apply(action)
            .and_then(|phase| next.check_invariants().map(|()| phase));

        match result {
            Ok(phase) => {
                self.game = next;
                self.version += 1;
                info!(%player, action = %description, ?phase, version = self.version, "action accepted");
                Ok(phase)
            }
            Err(error) if error.is_fatal() => {
                error!(%player, %error, "internal inconsistency, halting session");
                self.poisoned = true;
                Err(error)
            }
            Err(error) => {
                warn!(%player, %error, kind = ?error.kind(), "action rejected");
                Err(error)
            }
        }
    }

    fn refuse_if_poisoned(&self) -> Result<(), AcquireError> {
        match self.poisoned {
            true => Err(AcquireError::Inconsistent(
                "the session stopped after an internal inconsistency".to_string(),
            )),
            false => Ok(()),
        }
    }

    /// Plays bot seats until a human is awaited or the game is over.
    pub fn drive_bots(&mut self) -> usize {
        let mut moves = 0;
        while let Some(id) = self.game.awaiting_player() {
            let legal = self.game.legal_actions(id);
            let view = self.snapshot(Some(id));
            let Some(bot) = self.bots.get_mut(&id) else {
                break;
            };
            let response = bot.choose(&view, &legal);

            if let Err(error) = self.apply_checked(AcquirePlayerResponse::new(response, id)) {
                warn!(player = %id, %error, "bot action refused, waiting for outside input");
                break;
            }
            moves += 1;
        }
        moves
    }

    /// Records a seat's connection state. Returns whether anything changed.
    /// A halted session refuses presence changes like any action.
    pub fn set_connected(&mut self, id: PlayerId, connected: bool) -> Result<bool, AcquireError> {
        self.refuse_if_poisoned()?;
        let was = self
            .game
            .player(id)
            .map(|player| player.connected)
            .unwrap_or(false);
        self.game.set_connected(id, connected)?;
        let changed = self.game.player(id).map(|player| player.connected) != Some(was);
        if changed {
            self.version += 1;
            info!(player = %id, connected, "connection changed");
        }
        Ok(changed)
    }
}
