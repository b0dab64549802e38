use thiserror::Error;
use tokio::sync::{oneshot, watch};

use crate::logic::{
    acquire_error::AcquireError, acquire_game_state::Phase,
    acquire_response::AcquirePlayerResponse, game_snapshot::GameSnapshot, player::PlayerId,
};

/// What the room actor can be asked to do.
#[derive(Debug)]
pub enum RoomMessage {
    Submit {
        action: AcquirePlayerResponse,
        reply: oneshot::Sender<Result<Phase, AcquireError>>,
    },
    /// Subscribes a seat to its own view. Also used to reconnect.
    Connect {
        player: PlayerId,
        reply: oneshot::Sender<Result<watch::Receiver<GameSnapshot>, AcquireError>>,
    },
    Disconnect {
        player: PlayerId,
    },
    /// One-off view for `seat`, or the public view.
    Snapshot {
        seat: Option<PlayerId>,
        reply: oneshot::Sender<GameSnapshot>,
    },
    Shutdown,
}

#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum RoomError {
    #[error(transparent)]
    Rejected(#[from] AcquireError),
    #[error("the room is closed")]
    Closed,
}
