//! インメモリのルームストア
//!
//! すべてのルームをひとつの `Mutex<RoomTable>` で保持します。ユースケース層は
//! ロックを取得したままバリデーション・状態変更・ブロードキャストまでを行う
//! ことで、1 ルーム内のイベント処理順序を直列化します。

use std::collections::HashMap;

use tokio::sync::{Mutex, MutexGuard};

use crate::domain::ids::{ConnectionId, RoomCode};
use crate::domain::room::Room;

#[derive(Debug, Default)]
pub struct RoomStore {
    table: Mutex<RoomTable>,
}

impl RoomStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self) -> MutexGuard<'_, RoomTable> {
        self.table.lock().await
    }
}

/// The actual map of rooms; only reachable through `RoomStore::lock`.
#[derive(Debug, Default)]
pub struct RoomTable {
    rooms: HashMap<RoomCode, Room>,
}

impl RoomTable {
    pub fn insert(&mut self, room: Room) {
        self.rooms.insert(room.code.clone(), room);
    }

    pub fn remove(&mut self, code: &RoomCode) -> Option<Room> {
        self.rooms.remove(code)
    }

    pub fn contains(&self, code: &RoomCode) -> bool {
        self.rooms.contains_key(code)
    }

    pub fn get(&self, code: &RoomCode) -> Option<&Room> {
        self.rooms.get(code)
    }

    pub fn get_mut(&mut self, code: &RoomCode) -> Option<&mut Room> {
        self.rooms.get_mut(code)
    }

    /// Which room the active connection belongs to. Derived by scanning, so
    /// there is no reverse index to keep in sync with grace-period moves.
    pub fn code_of_connection(&self, connection: &ConnectionId) -> Option<RoomCode> {
        self.rooms
            .values()
            .find(|room| room.contains_connection(connection))
            .map(|room| room.code.clone())
    }

    pub fn room_of_connection_mut(&mut self, connection: &ConnectionId) -> Option<&mut Room> {
        self.rooms
            .values_mut()
            .find(|room| room.contains_connection(connection))
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    pub fn codes(&self) -> Vec<RoomCode> {
        self.rooms.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::PlayerId;
    use crate::domain::room::Player;

    fn make_room(code: &str) -> (Room, ConnectionId) {
        let conn = ConnectionId::generate();
        let host = Player::new(PlayerId::generate(), conn.clone(), "host");
        let room = Room::new(RoomCode::parse(code).unwrap(), host, 600, 0);
        (room, conn)
    }

    #[tokio::test]
    async fn test_insert_and_lookup_by_connection() {
        // テスト項目: 接続 ID からルームを逆引きできる
        let store = RoomStore::new();
        let (room, conn) = make_room("ABCDEF");
        let code = room.code.clone();
        {
            let mut table = store.lock().await;
            table.insert(room);
        }
        let table = store.lock().await;
        assert_eq!(table.code_of_connection(&conn), Some(code));
        assert!(table.code_of_connection(&ConnectionId::generate()).is_none());
    }

    #[tokio::test]
    async fn test_disconnected_connection_is_not_resolvable() {
        // テスト項目: 切断猶予中の接続は逆引き対象から外れる
        let store = RoomStore::new();
        let (mut room, conn) = make_room("ABCDEF");
        room.disconnect_connection(&conn, 0);
        {
            let mut table = store.lock().await;
            table.insert(room);
        }
        let table = store.lock().await;
        assert!(table.code_of_connection(&conn).is_none());
        assert_eq!(table.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_room() {
        // テスト項目: ルームの削除
        let store = RoomStore::new();
        let (room, _) = make_room("ABCDEF");
        let code = room.code.clone();
        let mut table = store.lock().await;
        table.insert(room);
        assert!(table.remove(&code).is_some());
        assert!(table.is_empty());
    }
}
