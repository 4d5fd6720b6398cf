//! Inbound and outbound event enums.
//!
//! 受信イベントは `ClientEvent`、送信イベントは `ServerEvent` として
//! 定義します。イベント名は JSON 上で camelCase になります。

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::domain::room::{Position, ResourceWallet, Weather};

use super::snapshot::{FlowerData, PlayerData, ResourceData, RoomSnapshot};

/// Events a client may send.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    #[serde(rename_all = "camelCase")]
    HostGame {
        player_name: String,
        #[serde(default)]
        duration: Option<u64>,
    },
    #[serde(rename_all = "camelCase")]
    JoinGame {
        player_name: String,
        room_id: String,
    },
    #[serde(rename_all = "camelCase")]
    ReconnectPlayer { room_id: String, player_id: String },
    PlayerMove { x: f64, y: f64, z: f64 },
    CollectResource(String),
    #[serde(rename_all = "camelCase")]
    PlantFlower { slot_id: String },
    #[serde(rename_all = "camelCase")]
    NurtureFlower { slot_id: String },
    LeaveGame,
}

/// Events the server pushes to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    SetupError {
        message: String,
    },
    #[serde(rename_all = "camelCase")]
    RoomCreated {
        room_id: String,
        player_id: String,
        initial_state: RoomSnapshot,
    },
    #[serde(rename_all = "camelCase")]
    JoinedRoom {
        room_id: String,
        player_id: String,
        initial_state: RoomSnapshot,
    },
    PartnerJoined(PlayerData),
    GameStart {
        message: String,
    },
    #[serde(rename_all = "camelCase")]
    ReconnectSuccess {
        room_id: String,
        player_id: String,
        initial_state: RoomSnapshot,
    },
    ReconnectFailed {
        message: String,
    },
    PartnerReconnected(PlayerData),
    PartnerDisconnected {
        name: String,
        message: String,
    },
    GamePaused {
        message: String,
    },
    GameResumed {
        message: String,
    },
    PlayerMoved {
        id: String,
        position: Position,
    },
    ResourceSpawned(ResourceData),
    ResourceRemoved(String),
    UpdatePlayerResources(ResourceWallet),
    FlowerPlanted(FlowerData),
    FlowerGrown(FlowerData),
    ActionFailed {
        message: String,
    },
    WeatherUpdate(Weather),
    TimerUpdate(u64),
    GameOver {
        message: String,
        blooms: usize,
    },
}

impl ServerEvent {
    /// Serialize for the wire. Serialization of these types cannot fail in
    /// practice; if it ever does, log and send nothing rather than panic.
    pub fn encode(&self) -> String {
        match serde_json::to_string(self) {
            Ok(payload) => payload,
            Err(e) => {
                error!("failed to encode server event: {e}");
                String::new()
            }
        }
    }
}
