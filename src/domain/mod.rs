//! ドメイン層
//!
//! ルーム・プレイヤー・リソース・フラワーのドメインモデルと、
//! トランスポートへの通知インターフェース（依存性の逆転）を定義します。

pub mod error;
pub mod garden;
pub mod gateway;
pub mod ids;
pub mod room;

pub use error::ActionError;
#[cfg(test)]
pub use gateway::MockBroadcastGateway;
pub use gateway::{BroadcastGateway, PushError, PusherChannel};
pub use ids::{ConnectionId, PlayerId, RoomCode, RoomCodeError};
pub use room::{Player, Room, RoomState};
