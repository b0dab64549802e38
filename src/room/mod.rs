pub mod bot;
pub mod message;
pub mod room;
pub mod session;

pub use message::{RoomError, RoomMessage};
pub use room::{spawn_room, RoomHandle};
pub use session::GameSession;
