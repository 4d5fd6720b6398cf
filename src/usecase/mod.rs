//! UseCase 層
//!
//! アプリケーションのユースケースを実装します。
//!
//! - `lifecycle`: ルームの作成・参加・再接続・切断・退出・掃除
//! - `actions`: ゲーム中のプレイヤー操作（移動・回収・植え付け・水やり）
//! - `simulation`: ルームごとのシミュレーションループ（タイマー・リソース・天候）
//!
//! この層は `BroadcastGateway` trait を通じてのみクライアントと通信し、
//! WebSocket の詳細には依存しません。

pub mod actions;
pub mod error;
pub mod lifecycle;
pub mod simulation;

pub use actions::GameActions;
pub use error::{ReconnectError, SetupError};
pub use lifecycle::{LifecycleConfig, RejoinPolicy, RoomLifecycle};
pub use simulation::{SimulationConfig, SimulationScheduler};

use crate::domain::{BroadcastGateway, ConnectionId};
use crate::protocol::ServerEvent;

/// Push an event to one connection, logging delivery failures. Failures are
/// expected around disconnects and never abort the caller's transaction.
pub(crate) async fn push_event(
    gateway: &dyn BroadcastGateway,
    target: &ConnectionId,
    event: &ServerEvent,
) {
    if let Err(e) = gateway.push_to(target, &event.encode()).await {
        tracing::debug!("Failed to push event to '{}': {}", target, e);
    }
}

/// Broadcast an event to a list of connections.
pub(crate) async fn broadcast_event(
    gateway: &dyn BroadcastGateway,
    targets: &[ConnectionId],
    event: &ServerEvent,
) {
    gateway.broadcast(targets, &event.encode()).await;
}
