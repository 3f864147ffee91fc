//! Game server connection and packets.

pub mod connector;
pub mod packets;

pub use connector::{new_game_connection, GameConnection};
