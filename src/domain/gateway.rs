//! Broadcast gateway trait 定義
//!
//! ユースケース層が必要とする「接続への通知」のインターフェースを
//! ドメイン層で定義します。具体的な実装（WebSocket）は Infrastructure 層が
//! 提供します（依存性の逆転）。

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use super::ids::ConnectionId;

/// Per-connection sender for outbound payloads (already-serialized JSON).
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[derive(Debug, Error)]
pub enum PushError {
    #[error("connection '{0}' is not registered")]
    ConnectionNotFound(String),
    #[error("failed to push message: {0}")]
    PushFailed(String),
}

/// Fan-out abstraction over the transport.
///
/// ユースケース層はこの trait にのみ依存し、WebSocket の詳細を知らない。
/// 宛先は「単一接続」または「接続リスト」で指定する（ルームの全員/
/// 送信者以外の全員といった選定はユースケース側の責務）。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BroadcastGateway: Send + Sync {
    /// Register a connection's outbound channel.
    async fn register(&self, connection: ConnectionId, sender: PusherChannel);

    /// Remove a connection's outbound channel.
    async fn unregister(&self, connection: &ConnectionId);

    /// Push a payload to a single connection.
    async fn push_to(&self, connection: &ConnectionId, payload: &str) -> Result<(), PushError>;

    /// Push a payload to every listed connection. Individual send failures
    /// are tolerated (slow or just-disconnected clients).
    async fn broadcast(&self, targets: &[ConnectionId], payload: &str);
}
