//! ワイヤプロトコル
//!
//! クライアント/サーバ間で交換される JSON イベントの定義。すべての
//! メッセージは `{"event": "...", "data": ...}` 形式です。

pub mod events;
pub mod snapshot;

pub use events::{ClientEvent, ServerEvent};
pub use snapshot::{FlowerData, PlayerData, ResourceData, RoomSnapshot, RoomSummary};
