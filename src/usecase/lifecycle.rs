//! ルームライフサイクル
//!
//! ルームの作成・参加・再接続・切断・退出・定期掃除を実装します。
//! 各操作はストアのロックを取得したままバリデーション、状態変更、
//! ブロードキャストまでを行い、1 ルーム内の処理順序を直列化します。
//! スケジューラの開始/停止だけはデッドロック回避のためロック解放後に
//! 行います。

use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tracing::info;

use crate::common::time::Clock;
use crate::domain::{BroadcastGateway, ConnectionId, PlayerId, RoomCode};
use crate::domain::room::{
    Player, ReconnectRejection, Room, RoomState, DEFAULT_GAME_DURATION_SECS, MAX_ACTIVE_PLAYERS,
    RECONNECT_GRACE_MILLIS,
};
use crate::infrastructure::RoomStore;
use crate::protocol::{PlayerData, RoomSnapshot, ServerEvent};

use super::error::{ReconnectError, SetupError};
use super::simulation::SimulationScheduler;
use super::{broadcast_event, push_event};

/// Who may take an open seat in a room that is holding a seat for a
/// disconnected player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RejoinPolicy {
    /// Anyone may join as long as the room is not full.
    #[default]
    Open,
    /// While any seat is held, newcomers are turned away; the absent player
    /// must come back through reconnect.
    HostOnly,
}

#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    pub reconnect_grace_millis: i64,
    pub cleanup_interval: Duration,
    pub rejoin_policy: RejoinPolicy,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            reconnect_grace_millis: RECONNECT_GRACE_MILLIS,
            cleanup_interval: Duration::from_secs(60),
            rejoin_policy: RejoinPolicy::default(),
        }
    }
}

pub struct RoomLifecycle {
    store: Arc<RoomStore>,
    gateway: Arc<dyn BroadcastGateway>,
    scheduler: Arc<SimulationScheduler>,
    clock: Arc<dyn Clock>,
    config: LifecycleConfig,
}

impl RoomLifecycle {
    pub fn new(
        store: Arc<RoomStore>,
        gateway: Arc<dyn BroadcastGateway>,
        scheduler: Arc<SimulationScheduler>,
        clock: Arc<dyn Clock>,
        config: LifecycleConfig,
    ) -> Self {
        Self {
            store,
            gateway,
            scheduler,
            clock,
            config,
        }
    }

    /// Create a room with the caller as host and send them the room code.
    pub async fn host_game(
        &self,
        connection: &ConnectionId,
        player_name: &str,
        duration: Option<u64>,
    ) -> Result<(), SetupError> {
        let mut table = self.store.lock().await;
        if table.code_of_connection(connection).is_some() {
            return Err(SetupError::AlreadyInRoom);
        }

        // retry on collision; with a 31-character alphabet collisions are
        // vanishingly rare
        let code = loop {
            let candidate = {
                let mut rng = rand::thread_rng();
                RoomCode::generate(&mut rng)
            };
            if !table.contains(&candidate) {
                break candidate;
            }
        };

        let duration = duration
            .filter(|d| *d > 0)
            .unwrap_or(DEFAULT_GAME_DURATION_SECS);
        let host = Player::new(PlayerId::generate(), connection.clone(), player_name);
        let player_id = host.id.clone();
        let room = Room::new(code.clone(), host, duration, self.clock.now_millis());

        push_event(
            self.gateway.as_ref(),
            connection,
            &ServerEvent::RoomCreated {
                room_id: code.as_str().to_string(),
                player_id: player_id.as_str().to_string(),
                initial_state: RoomSnapshot::from(&room),
            },
        )
        .await;
        table.insert(room);
        info!("Room '{}' created by '{}'", code, player_name);
        Ok(())
    }

    /// Take the second seat in a waiting room. Filling the room starts the
    /// game.
    pub async fn join_game(
        &self,
        connection: &ConnectionId,
        player_name: &str,
        raw_code: &str,
    ) -> Result<(), SetupError> {
        let code = RoomCode::parse(raw_code).map_err(|_| SetupError::RoomNotFound)?;

        let mut table = self.store.lock().await;
        if table.code_of_connection(connection).is_some() {
            return Err(SetupError::AlreadyInRoom);
        }
        let room = table.get_mut(&code).ok_or(SetupError::RoomNotFound)?;
        if room.is_full() {
            return Err(SetupError::RoomFull);
        }
        if room.state != RoomState::Waiting {
            return Err(SetupError::RoomNotJoinable);
        }
        if self.config.rejoin_policy == RejoinPolicy::HostOnly && !room.disconnected.is_empty() {
            return Err(SetupError::SeatHeld);
        }

        let existing = room.connections();
        let player = Player::new(PlayerId::generate(), connection.clone(), player_name);
        let player_id = player.id.clone();
        let joined_data = PlayerData::from(&player);
        room.add_player(player);

        let starting = room.active_count() == MAX_ACTIVE_PLAYERS;
        if starting {
            room.state = RoomState::Playing;
        }

        push_event(
            self.gateway.as_ref(),
            connection,
            &ServerEvent::JoinedRoom {
                room_id: code.as_str().to_string(),
                player_id: player_id.as_str().to_string(),
                initial_state: RoomSnapshot::from(&*room),
            },
        )
        .await;
        broadcast_event(
            self.gateway.as_ref(),
            &existing,
            &ServerEvent::PartnerJoined(joined_data),
        )
        .await;
        info!("'{}' joined room '{}'", player_name, code);

        if starting {
            let everyone = room.connections();
            drop(table);
            self.scheduler.clone().start(code.clone()).await;
            broadcast_event(
                self.gateway.as_ref(),
                &everyone,
                &ServerEvent::GameStart {
                    message: "Your partner has arrived. Let the garden grow!".to_string(),
                },
            )
            .await;
        }
        Ok(())
    }

    /// Restore a disconnected player's seat under a new connection.
    pub async fn reconnect_player(
        &self,
        connection: &ConnectionId,
        raw_code: &str,
        raw_player_id: &str,
    ) -> Result<(), ReconnectError> {
        let code = RoomCode::parse(raw_code).map_err(|_| ReconnectError::RoomNotFound)?;
        let player_id = PlayerId::new(raw_player_id.to_string());

        let mut table = self.store.lock().await;
        let room = table.get_mut(&code).ok_or(ReconnectError::RoomNotFound)?;
        let restored = room
            .reconnect_player(
                &player_id,
                connection.clone(),
                self.clock.now_millis(),
                self.config.reconnect_grace_millis,
            )
            .map_err(|rejection| match rejection {
                ReconnectRejection::AlreadyConnected => ReconnectError::AlreadyConnected,
                ReconnectRejection::SessionNotFound => ReconnectError::SessionNotFound,
                ReconnectRejection::Expired => ReconnectError::ReconnectExpired,
            })?;

        // filling the room resumes a paused game, or starts one that never
        // got going before the disconnect
        let announce = if room.active_count() == MAX_ACTIVE_PLAYERS {
            match room.state {
                RoomState::Paused => {
                    room.state = RoomState::Playing;
                    Some(ServerEvent::GameResumed {
                        message: "Both gardeners are back. The garden resumes!".to_string(),
                    })
                }
                RoomState::Waiting => {
                    room.state = RoomState::Playing;
                    Some(ServerEvent::GameStart {
                        message: "Your partner has arrived. Let the garden grow!".to_string(),
                    })
                }
                _ => None,
            }
        } else {
            None
        };

        push_event(
            self.gateway.as_ref(),
            connection,
            &ServerEvent::ReconnectSuccess {
                room_id: code.as_str().to_string(),
                player_id: player_id.as_str().to_string(),
                initial_state: RoomSnapshot::from(&*room),
            },
        )
        .await;
        broadcast_event(
            self.gateway.as_ref(),
            &room.connections_except(connection),
            &ServerEvent::PartnerReconnected(PlayerData::from(&restored)),
        )
        .await;
        info!("'{}' reconnected to room '{}'", restored.name, code);

        if let Some(event) = announce {
            let everyone = room.connections();
            drop(table);
            self.scheduler.clone().start(code.clone()).await;
            broadcast_event(self.gateway.as_ref(), &everyone, &event).await;
        }
        Ok(())
    }

    /// A connection dropped. The player's seat is held for the grace
    /// window; a running game pauses until they return.
    pub async fn handle_disconnect(&self, connection: &ConnectionId) {
        let mut table = self.store.lock().await;
        let Some(code) = table.code_of_connection(connection) else {
            return;
        };
        let Some(room) = table.get_mut(&code) else {
            return;
        };
        let Some(gone) = room.disconnect_connection(connection, self.clock.now_millis()) else {
            return;
        };
        info!("'{}' disconnected from room '{}'", gone.name, code);

        if room.players.is_empty() {
            if room.state != RoomState::Finished {
                room.state = RoomState::Waiting;
            }
            drop(table);
            self.scheduler.stop(&code).await;
            return;
        }

        let remaining = room.connections();
        broadcast_event(
            self.gateway.as_ref(),
            &remaining,
            &ServerEvent::PartnerDisconnected {
                name: gone.name.clone(),
                message: format!(
                    "{} lost their connection. Waiting for them to return...",
                    gone.name
                ),
            },
        )
        .await;

        if room.state == RoomState::Playing {
            room.state = RoomState::Paused;
            broadcast_event(
                self.gateway.as_ref(),
                &remaining,
                &ServerEvent::GamePaused {
                    message: "The game is paused until your partner returns.".to_string(),
                },
            )
            .await;
            drop(table);
            self.scheduler.stop(&code).await;
        }
    }

    /// Leave for good. The seat is not held; an empty room is deleted.
    pub async fn leave_game(&self, connection: &ConnectionId) {
        let mut table = self.store.lock().await;
        let Some(code) = table.code_of_connection(connection) else {
            return;
        };
        let Some(room) = table.get_mut(&code) else {
            return;
        };
        let Some(player_id) = room.player_by_connection(connection).map(|p| p.id.clone()) else {
            return;
        };
        let Some(gone) = room.remove_player(&player_id) else {
            return;
        };
        info!("'{}' left room '{}'", gone.name, code);

        // playing and paused both fall back to waiting; only a finished room
        // keeps its state for the delayed deletion
        let was_running = matches!(room.state, RoomState::Playing | RoomState::Paused);
        if room.state != RoomState::Finished {
            room.state = RoomState::Waiting;
        }
        broadcast_event(
            self.gateway.as_ref(),
            &room.connections(),
            &ServerEvent::PartnerDisconnected {
                name: gone.name.clone(),
                message: format!("{} left the garden.", gone.name),
            },
        )
        .await;

        let reclaim = room.is_reclaimable();
        if reclaim {
            table.remove(&code);
            info!("Room '{}' deleted after last player left", code);
        }
        drop(table);
        if was_running || reclaim {
            self.scheduler.stop(&code).await;
        }
    }

    /// Drop held seats whose grace window has long passed and delete rooms
    /// nobody can come back to.
    pub async fn cleanup_expired(&self) {
        let now = self.clock.now_millis();
        let mut removed = Vec::new();
        {
            let mut table = self.store.lock().await;
            for code in table.codes() {
                let Some(room) = table.get_mut(&code) else {
                    continue;
                };
                let purged =
                    room.purge_expired_disconnects(now, self.config.reconnect_grace_millis);
                if purged > 0 {
                    info!("Purged {} expired seat(s) in room '{}'", purged, code);
                    // a pause waits for the held seat; once that seat is gone
                    // the room reopens for a new partner
                    if room.state == RoomState::Paused && room.disconnected.is_empty() {
                        room.state = RoomState::Waiting;
                        info!("Room '{}' reopened after reconnect window closed", code);
                    }
                }
                if room.is_reclaimable() {
                    table.remove(&code);
                    info!("Room '{}' reclaimed by cleanup", code);
                    removed.push(code);
                }
            }
        }
        for code in removed {
            self.scheduler.stop(&code).await;
        }
    }

    /// Periodic cleanup loop, spawned once at server startup.
    pub async fn run_cleanup_sweep(self: Arc<Self>) {
        let mut ticker = interval(self.config.cleanup_interval);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            self.cleanup_expired().await;
        }
    }
}
