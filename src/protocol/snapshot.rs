//! ドメインモデルとワイヤ表現の変換
//!
//! Room やプレイヤーの状態をクライアント向けの JSON 表現に変換します。
//! 変換は `From` 実装として定義します。

use std::collections::HashMap;

use serde::Serialize;

use crate::common::time::millis_to_rfc3339;
use crate::domain::room::{
    Flower, FlowerStage, Player, Position, Resource, ResourceKind, ResourceWallet, Room, RoomState,
    Weather,
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerData {
    pub id: String,
    pub name: String,
    pub position: Position,
    pub resources: ResourceWallet,
}

impl From<&Player> for PlayerData {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id.as_str().to_string(),
            name: player.name.clone(),
            position: player.position,
            resources: player.wallet,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceData {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub position: Position,
}

impl From<&Resource> for ResourceData {
    fn from(resource: &Resource) -> Self {
        Self {
            id: resource.id.clone(),
            kind: resource.kind,
            position: resource.position,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowerData {
    pub slot_id: String,
    pub stage: FlowerStage,
    pub planted_by: String,
    pub nurture_progress: f64,
}

impl From<&Flower> for FlowerData {
    fn from(flower: &Flower) -> Self {
        Self {
            slot_id: flower.slot_id.clone(),
            stage: flower.stage,
            planted_by: flower.planted_by.as_str().to_string(),
            nurture_progress: flower.nurture_progress,
        }
    }
}

/// Full room state sent on join and reconnect so the client can rebuild
/// its scene from scratch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub players: HashMap<String, PlayerData>,
    pub resources: Vec<ResourceData>,
    pub flowers: HashMap<String, FlowerData>,
    pub timer: u64,
    pub game_duration: u64,
    pub weather: Weather,
    pub state: RoomState,
    pub host_id: String,
}

impl From<&Room> for RoomSnapshot {
    fn from(room: &Room) -> Self {
        Self {
            players: room
                .players
                .values()
                .map(|p| (p.id.as_str().to_string(), PlayerData::from(p)))
                .collect(),
            resources: room.resources.values().map(ResourceData::from).collect(),
            flowers: room
                .flowers
                .iter()
                .map(|(slot, f)| (slot.clone(), FlowerData::from(f)))
                .collect(),
            timer: room.timer,
            game_duration: room.game_duration,
            weather: room.weather,
            state: room.state,
            host_id: room.host_id.as_str().to_string(),
        }
    }
}

/// Compact listing entry for the rooms API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub room_id: String,
    pub state: RoomState,
    pub players: usize,
    pub created_at: String,
}

impl From<&Room> for RoomSummary {
    fn from(room: &Room) -> Self {
        Self {
            room_id: room.code.as_str().to_string(),
            state: room.state,
            players: room.active_count(),
            created_at: millis_to_rfc3339(room.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::{ConnectionId, PlayerId, RoomCode};

    #[test]
    fn test_room_snapshot_shape() {
        // テスト項目: ルームスナップショットの JSON 形式
        let host = Player::new(PlayerId::generate(), ConnectionId::generate(), "aki");
        let host_id = host.id.as_str().to_string();
        let room = Room::new(RoomCode::parse("ABCDEF").unwrap(), host, 600, 0);

        let snapshot = RoomSnapshot::from(&room);
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["state"], "waiting");
        assert_eq!(json["weather"], "sunny");
        assert_eq!(json["timer"], 600);
        assert_eq!(json["gameDuration"], 600);
        assert_eq!(json["hostId"], host_id.as_str());
        assert_eq!(json["players"][&host_id]["name"], "aki");
        assert_eq!(json["players"][&host_id]["resources"]["petals"], 0);
    }

    #[test]
    fn test_resource_data_uses_type_field() {
        // テスト項目: リソースの種別フィールドは "type" で送出される
        let data = ResourceData {
            id: "r-1".to_string(),
            kind: ResourceKind::Petal,
            position: Position::ORIGIN,
        };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["type"], "petal");
        assert_eq!(json["position"]["x"], 0.0);
    }
}
