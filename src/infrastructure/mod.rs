//! Infrastructure 層
//!
//! ドメイン層が定義するインターフェースの具体実装（インメモリの
//! ルームストア、WebSocket ゲートウェイ）を提供します。

pub mod gateway;
pub mod store;

pub use gateway::WebSocketGateway;
pub use store::{RoomStore, RoomTable};
