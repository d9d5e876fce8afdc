//! InMemory Registry 実装
//!
//! ドメイン層が定義する RoomRegistry trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。
//!
//! ## 並行性
//!
//! ルームとセッションの両方を単一の Mutex の内側に置くことで、join / leave の
//! 途中状態が読み取りから観測されないことを保証します。同一ルームへの並行
//! join や、join と disconnect の競合はこのロックで直列化されます。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ChatMessage, ClientId, Participant, RemovedMember, Room, RoomId, RoomRegistry, RoomSnapshot,
    Session, Timestamp, Username,
};

#[derive(Default)]
struct RegistryState {
    /// room_id -> Room
    rooms: HashMap<RoomId, Room>,
    /// client_id -> Session
    sessions: HashMap<ClientId, Session>,
}

/// インメモリ Registry 実装
///
/// ルームディレクトリとセッション台帳を単一のロックの下に保持する。
pub struct InMemoryRoomRegistry {
    state: Mutex<RegistryState>,
}

impl InMemoryRoomRegistry {
    /// 新しい InMemoryRoomRegistry を作成
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
        }
    }
}

impl Default for InMemoryRoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoomRegistry for InMemoryRoomRegistry {
    async fn add_member(
        &self,
        room_id: RoomId,
        client_id: ClientId,
        username: Username,
        joined_at: Timestamp,
    ) -> Participant {
        let mut state = self.state.lock().await;

        let room = state
            .rooms
            .entry(room_id.clone())
            .or_insert_with(|| Room::new(room_id.clone(), joined_at));

        let participant = Participant::new(client_id.clone(), username.clone(), joined_at);
        room.upsert_member(participant.clone());

        state.sessions.insert(
            client_id.clone(),
            Session {
                client_id,
                username,
                room_id,
                joined_at,
            },
        );

        participant
    }

    async fn remove_member(&self, client_id: &ClientId) -> Option<RemovedMember> {
        let mut state = self.state.lock().await;

        let session = state.sessions.remove(client_id)?;
        let room_id = session.room_id.clone();

        let (participant, room_empty) = match state.rooms.get_mut(&room_id) {
            Some(room) => {
                let removed = room.remove_member(client_id);
                (removed, room.is_empty())
            }
            None => (None, false),
        };

        let room_removed = if room_empty {
            state.rooms.remove(&room_id);
            true
        } else {
            false
        };

        // セッションはあるがルームのエントリが欠けていた場合でも、
        // セッションの情報から参加者を復元して切断の連鎖を完遂する
        let participant = participant.unwrap_or_else(|| {
            Participant::new(
                session.client_id.clone(),
                session.username.clone(),
                session.joined_at,
            )
        });

        Some(RemovedMember {
            participant,
            room_id,
            room_removed,
        })
    }

    async fn append_message(
        &self,
        room_id: &RoomId,
        message: ChatMessage,
    ) -> Option<ChatMessage> {
        let mut state = self.state.lock().await;
        let room = state.rooms.get_mut(room_id)?;
        room.append_message(message.clone());
        Some(message)
    }

    async fn list_members(&self, room_id: &RoomId) -> Vec<Participant> {
        let state = self.state.lock().await;
        state
            .rooms
            .get(room_id)
            .map(|room| room.members.clone())
            .unwrap_or_default()
    }

    async fn member_ids(&self, room_id: &RoomId) -> Vec<ClientId> {
        let state = self.state.lock().await;
        state
            .rooms
            .get(room_id)
            .map(|room| room.members.iter().map(|m| m.id.clone()).collect())
            .unwrap_or_default()
    }

    async fn get_session(&self, client_id: &ClientId) -> Option<Session> {
        let state = self.state.lock().await;
        state.sessions.get(client_id).cloned()
    }

    async fn room_snapshot(&self, room_id: &RoomId) -> Option<RoomSnapshot> {
        let state = self.state.lock().await;
        let room = state.rooms.get(room_id)?;
        Some(RoomSnapshot {
            id: room.id.clone(),
            members: room.members.clone(),
            messages: room.messages.iter().cloned().collect(),
            created_at: room.created_at,
        })
    }

    async fn count_rooms(&self) -> usize {
        let state = self.state.lock().await;
        state.rooms.len()
    }

    async fn count_sessions(&self) -> usize {
        let state = self.state.lock().await;
        state.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MessageBody, MESSAGE_HISTORY_CAPACITY};

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - InMemoryRoomRegistry の基本的な CRUD 操作
    // - ルームの遅延生成と、空になった瞬間の削除
    // - 履歴の有限長 FIFO（最古から破棄）
    // - セッションの冪等な削除
    //
    // 【なぜこのテストが必要か】
    // - Registry は全ての UseCase が依存する状態管理の中核
    // - 「ルームの寿命 ⇔ 非空メンバーシップ」の不変条件を保証する必要がある
    // - 接続の切断 → メンバーシップ削除の連鎖の正しさを担保する
    //
    // 【どのようなシナリオをテストするか】
    // 1. 参加者追加によるルームの遅延生成
    // 2. 同一接続の再追加（上書き、重複なし）
    // 3. 最後の参加者の削除によるルームの削除
    // 4. 存在しない接続の削除（冪等性）
    // 5. 履歴の容量超過時の最古破棄
    // 6. 存在しないルームへのメッセージ追加
    // ========================================

    fn client_id(value: &str) -> ClientId {
        ClientId::new(value.to_string()).unwrap()
    }

    fn room_id(value: &str) -> RoomId {
        RoomId::new(value.to_string()).unwrap()
    }

    fn username(value: &str) -> Username {
        Username::new(value.to_string()).unwrap()
    }

    fn message(id: usize) -> ChatMessage {
        ChatMessage::new(
            format!("msg-{}", id),
            username("alice"),
            MessageBody::new(format!("message {}", id)).unwrap(),
            Timestamp::new(1000 + id as i64),
        )
    }

    #[tokio::test]
    async fn test_add_member_creates_room_lazily() {
        // テスト項目: 最初の join でルームが生成される
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        assert_eq!(registry.count_rooms().await, 0);

        // when (操作):
        let participant = registry
            .add_member(room_id("r1"), client_id("c1"), username("alice"), Timestamp::new(1000))
            .await;

        // then (期待する結果):
        assert_eq!(participant.username.as_str(), "alice");
        assert_eq!(registry.count_rooms().await, 1);
        assert_eq!(registry.count_sessions().await, 1);

        let members = registry.list_members(&room_id("r1")).await;
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].id.as_str(), "c1");
    }

    #[tokio::test]
    async fn test_add_member_records_session() {
        // テスト項目: join でセッションが記録される
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();

        // when (操作):
        registry
            .add_member(room_id("r1"), client_id("c1"), username("alice"), Timestamp::new(1000))
            .await;

        // then (期待する結果):
        let session = registry.get_session(&client_id("c1")).await.unwrap();
        assert_eq!(session.room_id.as_str(), "r1");
        assert_eq!(session.username.as_str(), "alice");
        assert_eq!(session.joined_at, Timestamp::new(1000));
    }

    #[tokio::test]
    async fn test_add_member_twice_overwrites_entry() {
        // テスト項目: 同一接続の再追加は上書きされ、重複は作られない
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        registry
            .add_member(room_id("r1"), client_id("c1"), username("alice"), Timestamp::new(1000))
            .await;

        // when (操作):
        registry
            .add_member(room_id("r1"), client_id("c1"), username("alice2"), Timestamp::new(2000))
            .await;

        // then (期待する結果):
        let members = registry.list_members(&room_id("r1")).await;
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].username.as_str(), "alice2");
        assert_eq!(registry.count_sessions().await, 1);
    }

    #[tokio::test]
    async fn test_remove_member_keeps_room_with_remaining_members() {
        // テスト項目: 残メンバーがいる場合、ルームは削除されない
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        registry
            .add_member(room_id("r1"), client_id("c1"), username("alice"), Timestamp::new(1000))
            .await;
        registry
            .add_member(room_id("r1"), client_id("c2"), username("bob"), Timestamp::new(1001))
            .await;

        // when (操作):
        let removed = registry.remove_member(&client_id("c1")).await.unwrap();

        // then (期待する結果):
        assert_eq!(removed.participant.username.as_str(), "alice");
        assert_eq!(removed.room_id.as_str(), "r1");
        assert!(!removed.room_removed);
        assert_eq!(registry.count_rooms().await, 1);
        assert_eq!(registry.count_sessions().await, 1);
    }

    #[tokio::test]
    async fn test_remove_last_member_removes_room() {
        // テスト項目: 最後の参加者の削除でルームと履歴が消える
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        registry
            .add_member(room_id("r1"), client_id("c1"), username("alice"), Timestamp::new(1000))
            .await;
        registry.append_message(&room_id("r1"), message(1)).await;

        // when (操作):
        let removed = registry.remove_member(&client_id("c1")).await.unwrap();

        // then (期待する結果):
        assert!(removed.room_removed);
        assert_eq!(registry.count_rooms().await, 0);
        assert!(registry.room_snapshot(&room_id("r1")).await.is_none());
    }

    #[tokio::test]
    async fn test_remove_member_without_session_is_noop() {
        // テスト項目: セッションのない接続の削除は何もしない（冪等性）
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();

        // when (操作):
        let removed = registry.remove_member(&client_id("ghost")).await;

        // then (期待する結果):
        assert!(removed.is_none());
    }

    #[tokio::test]
    async fn test_remove_member_twice_is_noop() {
        // テスト項目: 二重の削除は 2 回目が no-op になる
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        registry
            .add_member(room_id("r1"), client_id("c1"), username("alice"), Timestamp::new(1000))
            .await;
        registry.remove_member(&client_id("c1")).await.unwrap();

        // when (操作):
        let second = registry.remove_member(&client_id("c1")).await;

        // then (期待する結果):
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn test_append_message_to_missing_room_returns_none() {
        // テスト項目: 存在しないルームへの追加は None（メッセージ破棄）
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();

        // when (操作):
        let stored = registry.append_message(&room_id("gone"), message(1)).await;

        // then (期待する結果):
        assert!(stored.is_none());
    }

    #[tokio::test]
    async fn test_history_is_bounded_fifo() {
        // テスト項目: 101 件追加すると最古の 1 件が消え、順序が保たれる
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        registry
            .add_member(room_id("r1"), client_id("c1"), username("alice"), Timestamp::new(1000))
            .await;

        // when (操作):
        for i in 1..=(MESSAGE_HISTORY_CAPACITY + 1) {
            registry.append_message(&room_id("r1"), message(i)).await;
        }

        // then (期待する結果):
        let snapshot = registry.room_snapshot(&room_id("r1")).await.unwrap();
        assert_eq!(snapshot.messages.len(), MESSAGE_HISTORY_CAPACITY);
        assert_eq!(snapshot.messages[0].id, "msg-2");
        assert_eq!(
            snapshot.messages.last().unwrap().id,
            format!("msg-{}", MESSAGE_HISTORY_CAPACITY + 1)
        );
    }

    #[tokio::test]
    async fn test_room_snapshot_contains_members_and_history() {
        // テスト項目: スナップショットにメンバーと履歴が含まれる
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        registry
            .add_member(room_id("r1"), client_id("c1"), username("alice"), Timestamp::new(1000))
            .await;
        registry
            .add_member(room_id("r1"), client_id("c2"), username("bob"), Timestamp::new(1001))
            .await;
        registry.append_message(&room_id("r1"), message(1)).await;

        // when (操作):
        let snapshot = registry.room_snapshot(&room_id("r1")).await.unwrap();

        // then (期待する結果):
        assert_eq!(snapshot.id.as_str(), "r1");
        assert_eq!(snapshot.members.len(), 2);
        assert_eq!(snapshot.messages.len(), 1);
        assert_eq!(snapshot.created_at, Timestamp::new(1000));
    }

    #[tokio::test]
    async fn test_rooms_are_isolated() {
        // テスト項目: 別ルームのメンバーとメッセージは混ざらない
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        registry
            .add_member(room_id("r1"), client_id("c1"), username("alice"), Timestamp::new(1000))
            .await;
        registry
            .add_member(room_id("r2"), client_id("c2"), username("bob"), Timestamp::new(1001))
            .await;

        // when (操作):
        registry.append_message(&room_id("r1"), message(1)).await;

        // then (期待する結果):
        assert_eq!(registry.count_rooms().await, 2);
        let r1 = registry.room_snapshot(&room_id("r1")).await.unwrap();
        let r2 = registry.room_snapshot(&room_id("r2")).await.unwrap();
        assert_eq!(r1.messages.len(), 1);
        assert_eq!(r2.messages.len(), 0);
        assert_eq!(r1.members.len(), 1);
        assert_eq!(r2.members.len(), 1);
    }
}
