//! Room 集約
//!
//! ひとつのガーデンセッションを表す集約ルート。プレイヤー、切断猶予中の
//! スナップショット、リソース、花の状態をすべて保持し、バリデーション込みの
//! 操作メソッドを提供します。Room 自体は純粋なデータで、タイマー類は
//! ユースケース層のスケジューラが管理します。

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::ActionError;
use super::garden;
use super::ids::{ConnectionId, PlayerId, RoomCode};

/// A cooperative session holds at most two active gardeners.
pub const MAX_ACTIVE_PLAYERS: usize = 2;

/// Session length when the host does not choose one.
pub const DEFAULT_GAME_DURATION_SECS: u64 = 1800;

/// Resource spawning stops while this many are already on the ground.
pub const MAX_RESOURCES: usize = 30;

/// How long a disconnected player's seat is held for them.
pub const RECONNECT_GRACE_MILLIS: i64 = 45_000;

/// Chance that a spawned resource is a petal (otherwise water).
pub const PETAL_PROBABILITY: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomState {
    Waiting,
    Playing,
    Paused,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    Sunny,
    Cloudy,
    Rainy,
}

impl Weather {
    /// Multiplier applied to nurture progress under this weather.
    pub fn growth_modifier(&self) -> f64 {
        match self {
            Weather::Sunny => 1.0,
            Weather::Cloudy => 0.7,
            Weather::Rainy => 1.5,
        }
    }

    /// Pick the next weather uniformly among the two states that are not
    /// the current one. The weather always visibly changes.
    pub fn next(&self, rng: &mut impl Rng) -> Weather {
        let candidates = match self {
            Weather::Sunny => [Weather::Cloudy, Weather::Rainy],
            Weather::Cloudy => [Weather::Sunny, Weather::Rainy],
            Weather::Rainy => [Weather::Sunny, Weather::Cloudy],
        };
        candidates[rng.gen_range(0..2)]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowerStage {
    Seed,
    Sprout,
    Budding,
    Bloom,
}

impl FlowerStage {
    /// Nurture progress needed to move past this stage. `None` at bloom.
    pub fn threshold(&self) -> Option<f64> {
        match self {
            FlowerStage::Seed => Some(1.0),
            FlowerStage::Sprout => Some(2.0),
            FlowerStage::Budding => Some(3.0),
            FlowerStage::Bloom => None,
        }
    }

    pub fn next(&self) -> FlowerStage {
        match self {
            FlowerStage::Seed => FlowerStage::Sprout,
            FlowerStage::Sprout => FlowerStage::Budding,
            FlowerStage::Budding => FlowerStage::Bloom,
            FlowerStage::Bloom => FlowerStage::Bloom,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const ORIGIN: Position = Position {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceWallet {
    pub petals: u32,
    pub water: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Petal,
    Water,
}

#[derive(Debug, Clone)]
pub struct Resource {
    pub id: String,
    pub kind: ResourceKind,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub struct Flower {
    pub slot_id: String,
    pub stage: FlowerStage,
    pub planted_by: PlayerId,
    pub nurture_progress: f64,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub connection: ConnectionId,
    pub name: String,
    pub position: Position,
    pub wallet: ResourceWallet,
}

impl Player {
    pub fn new(id: PlayerId, connection: ConnectionId, name: impl Into<String>) -> Self {
        Self {
            id,
            connection,
            name: name.into(),
            position: Position::ORIGIN,
            wallet: ResourceWallet::default(),
        }
    }
}

/// A player's full state, preserved while their seat is held open.
#[derive(Debug, Clone)]
pub struct DisconnectedPlayer {
    pub snapshot: Player,
    pub disconnected_at: i64,
}

/// Why a reconnect attempt was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectRejection {
    /// The player id is still actively connected; takeover is not allowed.
    AlreadyConnected,
    /// No held seat for this player id.
    SessionNotFound,
    /// The grace window elapsed before the attempt.
    Expired,
}

/// Result of a successful nurture: the flower's new state, whether a stage
/// transition happened, and the actor's wallet after spending water.
#[derive(Debug, Clone)]
pub struct NurtureOutcome {
    pub flower: Flower,
    pub grew: bool,
    pub wallet: ResourceWallet,
}

#[derive(Debug, Clone)]
pub struct Room {
    pub code: RoomCode,
    pub state: RoomState,
    pub host_id: PlayerId,
    pub players: HashMap<PlayerId, Player>,
    pub disconnected: HashMap<PlayerId, DisconnectedPlayer>,
    pub resources: HashMap<String, Resource>,
    pub flowers: HashMap<String, Flower>,
    /// Remaining seconds, counted down by the simulation scheduler.
    pub timer: u64,
    pub game_duration: u64,
    pub weather: Weather,
    pub created_at: i64,
    next_resource_seq: u64,
}

impl Room {
    pub fn new(code: RoomCode, host: Player, game_duration: u64, now: i64) -> Self {
        let host_id = host.id.clone();
        let mut players = HashMap::new();
        players.insert(host_id.clone(), host);
        Self {
            code,
            state: RoomState::Waiting,
            host_id,
            players,
            disconnected: HashMap::new(),
            resources: HashMap::new(),
            flowers: HashMap::new(),
            timer: game_duration,
            game_duration,
            weather: Weather::Sunny,
            created_at: now,
            next_resource_seq: 0,
        }
    }

    pub fn active_count(&self) -> usize {
        self.players.len()
    }

    /// A seat held for a disconnected player still counts toward capacity.
    pub fn is_full(&self) -> bool {
        self.players.len() + self.disconnected.len() >= MAX_ACTIVE_PLAYERS
    }

    pub fn add_player(&mut self, player: Player) -> bool {
        if self.is_full() {
            return false;
        }
        self.players.insert(player.id.clone(), player);
        true
    }

    pub fn connections(&self) -> Vec<ConnectionId> {
        self.players.values().map(|p| p.connection.clone()).collect()
    }

    pub fn connections_except(&self, exclude: &ConnectionId) -> Vec<ConnectionId> {
        self.players
            .values()
            .filter(|p| &p.connection != exclude)
            .map(|p| p.connection.clone())
            .collect()
    }

    pub fn player_by_connection(&self, connection: &ConnectionId) -> Option<&Player> {
        self.players.values().find(|p| &p.connection == connection)
    }

    pub fn player_by_connection_mut(&mut self, connection: &ConnectionId) -> Option<&mut Player> {
        self.players
            .values_mut()
            .find(|p| &p.connection == connection)
    }

    pub fn contains_connection(&self, connection: &ConnectionId) -> bool {
        self.player_by_connection(connection).is_some()
    }

    /// Move the player behind `connection` into the disconnected set and
    /// return a snapshot of them. The seat is held until the grace window
    /// expires or they reconnect.
    pub fn disconnect_connection(&mut self, connection: &ConnectionId, now: i64) -> Option<Player> {
        let player_id = self.player_by_connection(connection)?.id.clone();
        let player = self.players.remove(&player_id)?;
        self.disconnected.insert(
            player_id,
            DisconnectedPlayer {
                snapshot: player.clone(),
                disconnected_at: now,
            },
        );
        Some(player)
    }

    /// Restore a disconnected player under a fresh connection. An expired
    /// attempt also purges the held seat, so a retry reports the session as
    /// gone rather than expired again.
    pub fn reconnect_player(
        &mut self,
        player_id: &PlayerId,
        connection: ConnectionId,
        now: i64,
        grace_millis: i64,
    ) -> Result<Player, ReconnectRejection> {
        if self.players.contains_key(player_id) {
            return Err(ReconnectRejection::AlreadyConnected);
        }
        let held = self
            .disconnected
            .remove(player_id)
            .ok_or(ReconnectRejection::SessionNotFound)?;
        if now - held.disconnected_at > grace_millis {
            return Err(ReconnectRejection::Expired);
        }
        let mut player = held.snapshot;
        player.connection = connection;
        self.players.insert(player_id.clone(), player.clone());
        Ok(player)
    }

    /// Permanently remove a player, both the active seat and any held one.
    pub fn remove_player(&mut self, player_id: &PlayerId) -> Option<Player> {
        self.disconnected.remove(player_id);
        self.players.remove(player_id)
    }

    /// Drop held seats whose grace window has elapsed. Returns how many
    /// were purged.
    pub fn purge_expired_disconnects(&mut self, now: i64, grace_millis: i64) -> usize {
        let before = self.disconnected.len();
        self.disconnected
            .retain(|_, held| now - held.disconnected_at <= grace_millis);
        before - self.disconnected.len()
    }

    /// A room with nobody in it and nobody expected back can be deleted,
    /// unless a game is somehow still marked as running.
    pub fn is_reclaimable(&self) -> bool {
        self.players.is_empty() && self.disconnected.is_empty() && self.state != RoomState::Playing
    }

    pub fn move_player(&mut self, connection: &ConnectionId, position: Position) -> bool {
        if self.state != RoomState::Playing {
            return false;
        }
        match self.player_by_connection_mut(connection) {
            Some(player) => {
                player.position = position;
                true
            }
            None => false,
        }
    }

    /// Pick up a resource. `None` when the resource is already gone or the
    /// game is not running; stale pickups are silently ignored.
    pub fn collect_resource(
        &mut self,
        player_id: &PlayerId,
        resource_id: &str,
    ) -> Option<(ResourceKind, ResourceWallet)> {
        if self.state != RoomState::Playing {
            return None;
        }
        let kind = self.resources.get(resource_id).map(|r| r.kind)?;
        let player = self.players.get_mut(player_id)?;
        match kind {
            ResourceKind::Petal => player.wallet.petals += 1,
            ResourceKind::Water => player.wallet.water += 1,
        }
        let wallet = player.wallet;
        self.resources.remove(resource_id);
        Some((kind, wallet))
    }

    /// Plant a seed in a slot, spending one petal.
    pub fn plant_flower(
        &mut self,
        player_id: &PlayerId,
        slot_id: &str,
    ) -> Result<Flower, ActionError> {
        if self.state != RoomState::Playing {
            return Err(ActionError::GameNotActive);
        }
        if garden::slot_position(slot_id).is_none() {
            return Err(ActionError::InvalidSlot);
        }
        if self.flowers.contains_key(slot_id) {
            return Err(ActionError::SlotOccupied);
        }
        let player = self
            .players
            .get_mut(player_id)
            .ok_or(ActionError::GameNotActive)?;
        if player.wallet.petals == 0 {
            return Err(ActionError::NeedsPetal);
        }
        player.wallet.petals -= 1;
        let flower = Flower {
            slot_id: slot_id.to_string(),
            stage: FlowerStage::Seed,
            planted_by: player_id.clone(),
            nurture_progress: 0.0,
        };
        self.flowers.insert(slot_id.to_string(), flower.clone());
        Ok(flower)
    }

    /// Water a flower, spending one water. Progress gains the current
    /// weather's modifier; reaching the stage threshold advances exactly
    /// one stage and resets progress to zero.
    pub fn nurture_flower(
        &mut self,
        player_id: &PlayerId,
        slot_id: &str,
    ) -> Result<NurtureOutcome, ActionError> {
        if self.state != RoomState::Playing {
            return Err(ActionError::GameNotActive);
        }
        let stage = match self.flowers.get(slot_id) {
            Some(flower) => flower.stage,
            None => return Err(ActionError::NoFlower),
        };
        if stage == FlowerStage::Bloom {
            return Err(ActionError::AlreadyBloomed);
        }
        let player = self
            .players
            .get_mut(player_id)
            .ok_or(ActionError::GameNotActive)?;
        if player.wallet.water == 0 {
            return Err(ActionError::NeedsWater);
        }
        player.wallet.water -= 1;
        let wallet = player.wallet;
        let modifier = self.weather.growth_modifier();
        let flower = self
            .flowers
            .get_mut(slot_id)
            .ok_or(ActionError::NoFlower)?;
        flower.nurture_progress += modifier;
        let threshold = flower.stage.threshold().unwrap_or(f64::INFINITY);
        let grew = flower.nurture_progress >= threshold;
        if grew {
            flower.stage = flower.stage.next();
            flower.nurture_progress = 0.0;
        }
        Ok(NurtureOutcome {
            flower: flower.clone(),
            grew,
            wallet,
        })
    }

    /// Spawn a new resource at a random ground position. `None` while the
    /// game is not running or the ground is already at capacity.
    pub fn spawn_resource(&mut self, rng: &mut impl Rng) -> Option<Resource> {
        if self.state != RoomState::Playing || self.resources.len() >= MAX_RESOURCES {
            return None;
        }
        self.next_resource_seq += 1;
        let kind = if rng.gen_bool(PETAL_PROBABILITY) {
            ResourceKind::Petal
        } else {
            ResourceKind::Water
        };
        let resource = Resource {
            id: format!("r-{}", self.next_resource_seq),
            kind,
            position: garden::random_resource_position(rng),
        };
        self.resources
            .insert(resource.id.clone(), resource.clone());
        Some(resource)
    }

    pub fn change_weather(&mut self, rng: &mut impl Rng) -> Weather {
        self.weather = self.weather.next(rng);
        self.weather
    }

    pub fn tick_timer(&mut self) -> u64 {
        self.timer = self.timer.saturating_sub(1);
        self.timer
    }

    pub fn reset_timer(&mut self) -> u64 {
        self.timer = self.game_duration;
        self.timer
    }

    pub fn bloom_count(&self) -> usize {
        self.flowers
            .values()
            .filter(|f| f.stage == FlowerStage::Bloom)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_room() -> Room {
        let host = Player::new(
            PlayerId::generate(),
            ConnectionId::generate(),
            "host",
        );
        Room::new(
            RoomCode::parse("ABCDEF").unwrap(),
            host,
            DEFAULT_GAME_DURATION_SECS,
            0,
        )
    }

    fn make_playing_room() -> (Room, PlayerId, PlayerId) {
        let mut room = make_room();
        let guest = Player::new(PlayerId::generate(), ConnectionId::generate(), "guest");
        let guest_id = guest.id.clone();
        assert!(room.add_player(guest));
        room.state = RoomState::Playing;
        let host_id = room.host_id.clone();
        (room, host_id, guest_id)
    }

    #[test]
    fn test_new_room_starts_waiting_with_full_timer() {
        // テスト項目: 新規ルームの初期状態
        let room = make_room();
        assert_eq!(room.state, RoomState::Waiting);
        assert_eq!(room.timer, DEFAULT_GAME_DURATION_SECS);
        assert_eq!(room.weather, Weather::Sunny);
        assert_eq!(room.active_count(), 1);
    }

    #[test]
    fn test_room_rejects_third_player() {
        // テスト項目: ルーム定員は 2 名
        // given (前提条件): 2 名が参加済みのルーム
        let (mut room, _, _) = make_playing_room();
        // when (操作): 3 人目を追加する
        let third = Player::new(PlayerId::generate(), ConnectionId::generate(), "third");
        // then (期待する結果): 追加は拒否される
        assert!(!room.add_player(third));
        assert_eq!(room.active_count(), 2);
    }

    #[test]
    fn test_held_seat_counts_toward_capacity() {
        // テスト項目: 切断猶予中の席も定員に含まれる
        // given (前提条件): 1 名が切断猶予中のルーム
        let (mut room, _, guest_id) = make_playing_room();
        let conn = room.players[&guest_id].connection.clone();
        room.disconnect_connection(&conn, 1_000);
        assert_eq!(room.active_count(), 1);
        // when (操作): 新規プレイヤーを追加する
        let newcomer = Player::new(PlayerId::generate(), ConnectionId::generate(), "new");
        // then (期待する結果): 席が確保されているため拒否される
        assert!(room.is_full());
        assert!(!room.add_player(newcomer));
    }

    #[test]
    fn test_reconnect_within_grace_restores_state() {
        // テスト項目: 猶予時間内の再接続でプレイヤー状態が復元される
        // given (前提条件): リソースを所持したまま切断したプレイヤー
        let (mut room, _, guest_id) = make_playing_room();
        room.players.get_mut(&guest_id).unwrap().wallet.petals = 3;
        let conn = room.players[&guest_id].connection.clone();
        room.disconnect_connection(&conn, 1_000);
        // when (操作): 44 秒後に再接続する
        let new_conn = ConnectionId::generate();
        let restored = room
            .reconnect_player(&guest_id, new_conn.clone(), 1_000 + 44_000, RECONNECT_GRACE_MILLIS)
            .unwrap();
        // then (期待する結果): インベントリが保持され、接続だけが新しい
        assert_eq!(restored.wallet.petals, 3);
        assert_eq!(restored.connection, new_conn);
        assert!(room.disconnected.is_empty());
    }

    #[test]
    fn test_reconnect_after_grace_is_expired_then_gone() {
        // テスト項目: 猶予時間超過後の再接続は拒否され、席も解放される
        let (mut room, _, guest_id) = make_playing_room();
        let conn = room.players[&guest_id].connection.clone();
        room.disconnect_connection(&conn, 1_000);
        // when (操作): 46 秒後に再接続する
        let result = room.reconnect_player(
            &guest_id,
            ConnectionId::generate(),
            1_000 + 46_000,
            RECONNECT_GRACE_MILLIS,
        );
        // then (期待する結果): Expired が返り、リトライは SessionNotFound になる
        assert_eq!(result.unwrap_err(), ReconnectRejection::Expired);
        let retry = room.reconnect_player(
            &guest_id,
            ConnectionId::generate(),
            1_000 + 47_000,
            RECONNECT_GRACE_MILLIS,
        );
        assert_eq!(retry.unwrap_err(), ReconnectRejection::SessionNotFound);
    }

    #[test]
    fn test_reconnect_rejects_takeover_of_active_player() {
        // テスト項目: 接続中のプレイヤー ID での再接続（乗っ取り）は拒否される
        let (mut room, host_id, _) = make_playing_room();
        let result = room.reconnect_player(
            &host_id,
            ConnectionId::generate(),
            1_000,
            RECONNECT_GRACE_MILLIS,
        );
        assert_eq!(result.unwrap_err(), ReconnectRejection::AlreadyConnected);
    }

    #[test]
    fn test_purge_expired_disconnects() {
        // テスト項目: 猶予切れの席だけが掃除される
        let (mut room, host_id, guest_id) = make_playing_room();
        let guest_conn = room.players[&guest_id].connection.clone();
        let host_conn = room.players[&host_id].connection.clone();
        room.disconnect_connection(&guest_conn, 0);
        room.disconnect_connection(&host_conn, 30_000);
        // when (操作): 猶予 45 秒で now = 50 秒時点の掃除を実行する
        let purged = room.purge_expired_disconnects(50_000, RECONNECT_GRACE_MILLIS);
        // then (期待する結果): guest のみ掃除され host の席は残る
        assert_eq!(purged, 1);
        assert!(room.disconnected.contains_key(&host_id));
        assert!(!room.disconnected.contains_key(&guest_id));
    }

    #[test]
    fn test_move_ignored_unless_playing() {
        // テスト項目: waiting 中の移動は無視される
        let mut room = make_room();
        let conn = room.players.values().next().unwrap().connection.clone();
        let target = Position { x: 1.0, y: 0.0, z: 2.0 };
        assert!(!room.move_player(&conn, target));
        room.state = RoomState::Playing;
        assert!(room.move_player(&conn, target));
        assert_eq!(room.player_by_connection(&conn).unwrap().position, target);
    }

    #[test]
    fn test_collect_resource_updates_wallet_and_removes() {
        // テスト項目: リソース回収でインベントリが増え、床から消える
        let (mut room, host_id, _) = make_playing_room();
        room.resources.insert(
            "r-1".to_string(),
            Resource {
                id: "r-1".to_string(),
                kind: ResourceKind::Water,
                position: Position::ORIGIN,
            },
        );
        let (kind, wallet) = room.collect_resource(&host_id, "r-1").unwrap();
        assert_eq!(kind, ResourceKind::Water);
        assert_eq!(wallet.water, 1);
        assert!(room.resources.is_empty());
    }

    #[test]
    fn test_stale_collect_is_noop() {
        // テスト項目: 既に回収済みのリソース ID は無視され、状態が変わらない
        let (mut room, host_id, _) = make_playing_room();
        assert!(room.collect_resource(&host_id, "r-99").is_none());
        assert_eq!(room.players[&host_id].wallet, ResourceWallet::default());
    }

    #[test]
    fn test_plant_requires_petal() {
        // テスト項目: 花びらなしでは植えられず、状態が変わらない
        let (mut room, host_id, _) = make_playing_room();
        let result = room.plant_flower(&host_id, "slot-1");
        assert_eq!(result.unwrap_err(), ActionError::NeedsPetal);
        assert!(room.flowers.is_empty());
    }

    #[test]
    fn test_plant_rejects_invalid_and_occupied_slots() {
        // テスト項目: 不正スロット / 使用中スロットへの植え付けは拒否される
        let (mut room, host_id, _) = make_playing_room();
        room.players.get_mut(&host_id).unwrap().wallet.petals = 2;
        assert_eq!(
            room.plant_flower(&host_id, "slot-42").unwrap_err(),
            ActionError::InvalidSlot
        );
        room.plant_flower(&host_id, "slot-3").unwrap();
        assert_eq!(
            room.plant_flower(&host_id, "slot-3").unwrap_err(),
            ActionError::SlotOccupied
        );
        // 失敗した植え付けで花びらは消費されない
        assert_eq!(room.players[&host_id].wallet.petals, 1);
    }

    #[test]
    fn test_plant_spends_petal_and_creates_seed() {
        // テスト項目: 植え付け成功で花びらが 1 消費され seed が生まれる
        let (mut room, host_id, _) = make_playing_room();
        room.players.get_mut(&host_id).unwrap().wallet.petals = 1;
        let flower = room.plant_flower(&host_id, "slot-5").unwrap();
        assert_eq!(flower.stage, FlowerStage::Seed);
        assert_eq!(flower.nurture_progress, 0.0);
        assert_eq!(room.players[&host_id].wallet.petals, 0);
    }

    #[test]
    fn test_nurture_progression_under_sunny_weather() {
        // テスト項目: 晴れ（補正 1.0）では水やり 3 回で満開に到達する
        // given (前提条件): seed が植わったルーム、水 4
        let (mut room, host_id, _) = make_playing_room();
        {
            let wallet = &mut room.players.get_mut(&host_id).unwrap().wallet;
            wallet.petals = 1;
            wallet.water = 4;
        }
        room.plant_flower(&host_id, "slot-1").unwrap();
        // when (操作): 水やりを繰り返す
        let first = room.nurture_flower(&host_id, "slot-1").unwrap();
        assert!(first.grew);
        assert_eq!(first.flower.stage, FlowerStage::Sprout);
        assert_eq!(first.flower.nurture_progress, 0.0);
        let second = room.nurture_flower(&host_id, "slot-1").unwrap();
        assert!(!second.grew);
        assert_eq!(second.flower.nurture_progress, 1.0);
        let third = room.nurture_flower(&host_id, "slot-1").unwrap();
        assert!(third.grew);
        assert_eq!(third.flower.stage, FlowerStage::Budding);
        // then (期待する結果): 満開の花には水やりできない
        room.flowers.get_mut("slot-1").unwrap().stage = FlowerStage::Bloom;
        assert_eq!(
            room.nurture_flower(&host_id, "slot-1").unwrap_err(),
            ActionError::AlreadyBloomed
        );
        assert_eq!(room.players[&host_id].wallet.water, 1);
    }

    #[test]
    fn test_nurture_overshoot_resets_progress_to_zero() {
        // テスト項目: 雨天補正で閾値を超過しても進捗は 0 にリセットされる
        let (mut room, host_id, _) = make_playing_room();
        {
            let wallet = &mut room.players.get_mut(&host_id).unwrap().wallet;
            wallet.petals = 1;
            wallet.water = 1;
        }
        room.plant_flower(&host_id, "slot-2").unwrap();
        room.weather = Weather::Rainy;
        // when (操作): 進捗 1.5 となる水やりを行う（seed の閾値は 1.0）
        let outcome = room.nurture_flower(&host_id, "slot-2").unwrap();
        // then (期待する結果): 超過分 0.5 は持ち越されない
        assert!(outcome.grew);
        assert_eq!(outcome.flower.stage, FlowerStage::Sprout);
        assert_eq!(outcome.flower.nurture_progress, 0.0);
    }

    #[test]
    fn test_nurture_requires_water_and_flower() {
        // テスト項目: 水なし / 花なしの水やりは拒否される
        let (mut room, host_id, _) = make_playing_room();
        assert_eq!(
            room.nurture_flower(&host_id, "slot-1").unwrap_err(),
            ActionError::NoFlower
        );
        room.players.get_mut(&host_id).unwrap().wallet.petals = 1;
        room.plant_flower(&host_id, "slot-1").unwrap();
        assert_eq!(
            room.nurture_flower(&host_id, "slot-1").unwrap_err(),
            ActionError::NeedsWater
        );
    }

    #[test]
    fn test_spawn_respects_cap_and_assigns_unique_ids() {
        // テスト項目: リソース生成は上限 30 で止まり、ID は重複しない
        let (mut room, _, _) = make_playing_room();
        let mut rng = rand::thread_rng();
        for _ in 0..MAX_RESOURCES {
            assert!(room.spawn_resource(&mut rng).is_some());
        }
        assert!(room.spawn_resource(&mut rng).is_none());
        assert_eq!(room.resources.len(), MAX_RESOURCES);
    }

    #[test]
    fn test_spawn_only_while_playing() {
        // テスト項目: waiting / paused 中はリソースが生成されない
        let mut room = make_room();
        let mut rng = rand::thread_rng();
        assert!(room.spawn_resource(&mut rng).is_none());
        room.state = RoomState::Paused;
        assert!(room.spawn_resource(&mut rng).is_none());
    }

    #[test]
    fn test_weather_never_repeats() {
        // テスト項目: 天候変化は必ず現在と異なる状態を選ぶ
        let (mut room, _, _) = make_playing_room();
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let before = room.weather;
            let after = room.change_weather(&mut rng);
            assert_ne!(before, after);
        }
    }

    #[test]
    fn test_timer_saturates_at_zero() {
        // テスト項目: タイマーは 0 で止まりアンダーフローしない
        let (mut room, _, _) = make_playing_room();
        room.timer = 1;
        assert_eq!(room.tick_timer(), 0);
        assert_eq!(room.tick_timer(), 0);
        assert_eq!(room.reset_timer(), DEFAULT_GAME_DURATION_SECS);
    }

    #[test]
    fn test_reclaimable_room() {
        // テスト項目: 空ルーム判定
        let (mut room, host_id, guest_id) = make_playing_room();
        assert!(!room.is_reclaimable());
        room.remove_player(&guest_id);
        room.remove_player(&host_id);
        // playing のままでは回収対象にならない
        assert!(!room.is_reclaimable());
        room.state = RoomState::Waiting;
        assert!(room.is_reclaimable());
    }
}
