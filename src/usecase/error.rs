//! Setup and reconnect failures.
//!
//! ルーム参加前のエラー。Display 文字列はそのままクライアントへ
//! `setupError` / `reconnectFailed` として送られます。

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("You are already in a room")]
    AlreadyInRoom,
    #[error("Room not found. Check the code and try again")]
    RoomNotFound,
    #[error("That room already has two gardeners")]
    RoomFull,
    #[error("That game has already started")]
    RoomNotJoinable,
    #[error("That seat is being held for a disconnected gardener")]
    SeatHeld,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconnectError {
    #[error("Room not found. Check the code and try again")]
    RoomNotFound,
    #[error("That player is still connected")]
    AlreadyConnected,
    #[error("No session found for that player")]
    SessionNotFound,
    #[error("Your reconnect window has expired")]
    ReconnectExpired,
}
