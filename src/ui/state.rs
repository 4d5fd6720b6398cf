//! Server state shared across handlers.

use std::sync::Arc;

use crate::domain::BroadcastGateway;
use crate::infrastructure::RoomStore;
use crate::usecase::{GameActions, RoomLifecycle};

/// Shared application state
pub struct AppState {
    /// ルームライフサイクルのユースケース
    pub lifecycle: Arc<RoomLifecycle>,
    /// ゲーム中操作のユースケース
    pub actions: Arc<GameActions>,
    /// BroadcastGateway（イベント通知の抽象化）
    pub gateway: Arc<dyn BroadcastGateway>,
    /// ルームストア（HTTP エンドポイント用）
    pub store: Arc<RoomStore>,
}
