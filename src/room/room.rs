//! Actor-per-room: a single task owns the [`GameSession`] and handles one
//! message at a time, so actions are applied strictly one after another.

use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
};
use tracing::{debug, info, instrument};

use super::{
    message::{RoomError, RoomMessage},
    session::GameSession,
};
use crate::logic::{
    acquire_error::{AcquireError, ValidationError},
    acquire_game_state::Phase,
    acquire_response::{AcquirePlayerResponse, AcquireResponse},
    game_snapshot::GameSnapshot,
    player::PlayerId,
};

const ROOM_QUEUE_DEPTH: usize = 64;

/// Cloneable front for talking to a running room.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    tx: mpsc::Sender<RoomMessage>,
}

impl RoomHandle {
    pub async fn submit(&self, player: PlayerId, response: AcquireResponse) -> Result<Phase, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomMessage::Submit {
            action: AcquirePlayerResponse::new(response, player),
            reply,
        })
        .await?;
        Ok(rx.await.map_err(|_| RoomError::Closed)??)
    }

    /// Marks the seat connected and returns its snapshot stream. The current
    /// snapshot is available straight away through `borrow`.
    pub async fn connect(&self, player: PlayerId) -> Result<watch::Receiver<GameSnapshot>, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomMessage::Connect { player, reply }).await?;
        Ok(rx.await.map_err(|_| RoomError::Closed)??)
    }

    pub async fn disconnect(&self, player: PlayerId) -> Result<(), RoomError> {
        self.send(RoomMessage::Disconnect { player }).await
    }

    pub async fn snapshot(&self, seat: Option<PlayerId>) -> Result<GameSnapshot, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomMessage::Snapshot { seat, reply }).await?;
        rx.await.map_err(|_| RoomError::Closed)
    }

    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.send(RoomMessage::Shutdown).await
    }

    async fn send(&self, message: RoomMessage) -> Result<(), RoomError> {
        self.tx.send(message).await.map_err(|_| RoomError::Closed)
    }
}

struct Room {
    session: GameSession,
    seats: Vec<watch::Sender<GameSnapshot>>,
    published: u64,
}

impl Room {
    fn new(session: GameSession) -> Self {
        let seats = session
            .game()
            .players()
            .iter()
            .map(|player| watch::channel(session.snapshot(Some(player.id))).0)
            .collect();
        let published = session.version();
        Room {
            session,
            seats,
            published,
        }
    }

    #[instrument(skip_all, name = "room")]
    async fn run(mut self, mut rx: mpsc::Receiver<RoomMessage>) -> GameSession {
        info!(seats = self.seats.len(), "room open");

        while let Some(message) = rx.recv().await {
            match message {
                RoomMessage::Submit { action, reply } => {
                    let result = self.session.submit(action);
                    self.publish();
                    // the caller may have given up waiting
                    let _ = reply.send(result);
                }
                RoomMessage::Connect { player, reply } => {
                    let _ = reply.send(self.connect(player));
                }
                RoomMessage::Disconnect { player } => {
                    if let Ok(true) = self.session.set_connected(player, false) {
                        self.publish();
                    }
                }
                RoomMessage::Snapshot { seat, reply } => {
                    let _ = reply.send(self.session.snapshot(seat));
                }
                RoomMessage::Shutdown => {
                    info!("shutdown requested");
                    break;
                }
            }
        }

        info!(version = self.session.version(), "room closed");
        self.session
    }

    fn connect(&mut self, player: PlayerId) -> Result<watch::Receiver<GameSnapshot>, AcquireError> {
        let seat = self
            .seats
            .get(player.0)
            .ok_or(ValidationError::UnknownPlayer(player))?;
        let receiver = seat.subscribe();
        if self.session.set_connected(player, true)? {
            self.publish();
        }
        debug!(%player, "seat connected");
        Ok(receiver)
    }

    // Pushes every seat its own view, once per version.
    fn publish(&mut self) {
        let version = self.session.version();
        if version == self.published {
            return;
        }
        for (index, seat) in self.seats.iter().enumerate() {
            seat.send_replace(self.session.snapshot(Some(PlayerId(index))));
        }
        self.published = version;
    }
}

/// Runs `session` on its own task. The task hands the session back when it stops.
pub fn spawn_room(session: GameSession) -> (RoomHandle, JoinHandle<GameSession>) {
    let (tx, rx) = mpsc::channel(ROOM_QUEUE_DEPTH);
    let task = tokio::spawn(Room::new(session).run(rx));
    (RoomHandle { tx }, task)
}
