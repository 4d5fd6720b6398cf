//! WebSocket を使った BroadcastGateway 実装
//!
//! ## 責務
//!
//! - WebSocket の `UnboundedSender` を管理
//! - クライアントへのイベント送信（push_to, broadcast）
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`src/ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `UnboundedSender` を受け取り、送信に使用します。
//! 「WebSocket の生成」と「イベントの送信」が分離されます：
//! - UI 層: WebSocket 接続の受付、sender の生成
//! - Infrastructure 層: sender の管理、イベント送信

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{BroadcastGateway, ConnectionId, PushError, PusherChannel};

/// WebSocket を使った BroadcastGateway 実装
///
/// ## フィールド
///
/// - `connections`: 接続中のクライアントと対応する WebSocket sender のマップ
pub struct WebSocketGateway {
    connections: Arc<Mutex<HashMap<ConnectionId, PusherChannel>>>,
}

impl WebSocketGateway {
    pub fn new() -> Self {
        Self {
            connections: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for WebSocketGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BroadcastGateway for WebSocketGateway {
    async fn register(&self, connection: ConnectionId, sender: PusherChannel) {
        let mut connections = self.connections.lock().await;
        connections.insert(connection.clone(), sender);
        tracing::debug!("Connection '{}' registered to gateway", connection);
    }

    async fn unregister(&self, connection: &ConnectionId) {
        let mut connections = self.connections.lock().await;
        connections.remove(connection);
        tracing::debug!("Connection '{}' unregistered from gateway", connection);
    }

    async fn push_to(&self, connection: &ConnectionId, payload: &str) -> Result<(), PushError> {
        let connections = self.connections.lock().await;

        if let Some(sender) = connections.get(connection) {
            sender
                .send(payload.to_string())
                .map_err(|e| PushError::PushFailed(e.to_string()))?;
            tracing::debug!("Pushed event to connection '{}'", connection);
            Ok(())
        } else {
            Err(PushError::ConnectionNotFound(
                connection.as_str().to_string(),
            ))
        }
    }

    async fn broadcast(&self, targets: &[ConnectionId], payload: &str) {
        let connections = self.connections.lock().await;

        for target in targets {
            if let Some(sender) = connections.get(target) {
                // ブロードキャストでは一部の送信失敗を許容
                if let Err(e) = sender.send(payload.to_string()) {
                    tracing::warn!("Failed to push event to connection '{}': {}", target, e);
                }
            } else {
                tracing::warn!("Connection '{}' not found during broadcast, skipping", target);
            }
        }
    }
}
