//! ゲーム中のプレイヤー操作
//!
//! 移動・リソース回収・植え付け・水やりを処理します。バリデーションは
//! すべてドメイン層（Room）が行い、この層は結果に応じたイベント配信を
//! 担当します。バリデーション失敗は操作したプレイヤーにのみ
//! `actionFailed` で通知し、他のプレイヤーには何も送りません。

use std::sync::Arc;

use crate::domain::{BroadcastGateway, ConnectionId};
use crate::domain::room::Position;
use crate::infrastructure::RoomStore;
use crate::protocol::{FlowerData, ServerEvent};

use super::{broadcast_event, push_event};

pub struct GameActions {
    store: Arc<RoomStore>,
    gateway: Arc<dyn BroadcastGateway>,
}

impl GameActions {
    pub fn new(store: Arc<RoomStore>, gateway: Arc<dyn BroadcastGateway>) -> Self {
        Self { store, gateway }
    }

    /// Relay a position update to the partner. Moves from connections not
    /// in a running game are dropped without a reply; clients send these at
    /// a high rate and an error per frame would be noise.
    pub async fn move_player(&self, connection: &ConnectionId, position: Position) {
        let mut table = self.store.lock().await;
        let Some(room) = table.room_of_connection_mut(connection) else {
            return;
        };
        let Some(id) = room
            .player_by_connection(connection)
            .map(|p| p.id.as_str().to_string())
        else {
            return;
        };
        if !room.move_player(connection, position) {
            return;
        }
        broadcast_event(
            self.gateway.as_ref(),
            &room.connections_except(connection),
            &ServerEvent::PlayerMoved { id, position },
        )
        .await;
    }

    /// Pick up a resource. Both players may race for the same one; the
    /// loser's request finds it already gone and is silently dropped, the
    /// winner gets their inventory update and everyone sees the removal.
    pub async fn collect_resource(&self, connection: &ConnectionId, resource_id: &str) {
        let mut table = self.store.lock().await;
        let Some(room) = table.room_of_connection_mut(connection) else {
            return;
        };
        let Some(player_id) = room.player_by_connection(connection).map(|p| p.id.clone()) else {
            return;
        };
        let Some((_kind, wallet)) = room.collect_resource(&player_id, resource_id) else {
            return;
        };
        push_event(
            self.gateway.as_ref(),
            connection,
            &ServerEvent::UpdatePlayerResources(wallet),
        )
        .await;
        broadcast_event(
            self.gateway.as_ref(),
            &room.connections(),
            &ServerEvent::ResourceRemoved(resource_id.to_string()),
        )
        .await;
    }

    /// Plant a seed in a slot.
    pub async fn plant_flower(&self, connection: &ConnectionId, slot_id: &str) {
        let mut table = self.store.lock().await;
        let Some(room) = table.room_of_connection_mut(connection) else {
            return;
        };
        let Some(player_id) = room.player_by_connection(connection).map(|p| p.id.clone()) else {
            return;
        };
        match room.plant_flower(&player_id, slot_id) {
            Ok(flower) => {
                let wallet = room
                    .players
                    .get(&player_id)
                    .map(|p| p.wallet)
                    .unwrap_or_default();
                push_event(
                    self.gateway.as_ref(),
                    connection,
                    &ServerEvent::UpdatePlayerResources(wallet),
                )
                .await;
                broadcast_event(
                    self.gateway.as_ref(),
                    &room.connections(),
                    &ServerEvent::FlowerPlanted(FlowerData::from(&flower)),
                )
                .await;
            }
            Err(e) => {
                push_event(
                    self.gateway.as_ref(),
                    connection,
                    &ServerEvent::ActionFailed {
                        message: e.to_string(),
                    },
                )
                .await;
            }
        }
    }

    /// Water a flower. A stage transition is announced to the whole room;
    /// plain progress is not, the next nurture or snapshot carries it.
    pub async fn nurture_flower(&self, connection: &ConnectionId, slot_id: &str) {
        let mut table = self.store.lock().await;
        let Some(room) = table.room_of_connection_mut(connection) else {
            return;
        };
        let Some(player_id) = room.player_by_connection(connection).map(|p| p.id.clone()) else {
            return;
        };
        match room.nurture_flower(&player_id, slot_id) {
            Ok(outcome) => {
                push_event(
                    self.gateway.as_ref(),
                    connection,
                    &ServerEvent::UpdatePlayerResources(outcome.wallet),
                )
                .await;
                if outcome.grew {
                    broadcast_event(
                        self.gateway.as_ref(),
                        &room.connections(),
                        &ServerEvent::FlowerGrown(FlowerData::from(&outcome.flower)),
                    )
                    .await;
                }
            }
            Err(e) => {
                push_event(
                    self.gateway.as_ref(),
                    connection,
                    &ServerEvent::ActionFailed {
                        message: e.to_string(),
                    },
                )
                .await;
            }
        }
    }
}
