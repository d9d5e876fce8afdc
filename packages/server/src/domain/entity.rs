//! ドメイン層のエンティティ
//!
//! Room はメンバーと有限長のメッセージ履歴を持つ。Session は接続が生きて
//! いる間だけ存在し、切断と同時に破棄される。

use std::collections::VecDeque;

use super::value_object::{ClientId, MessageBody, RoomId, Timestamp, Username};

/// ルーム履歴の上限。これを超えて追加すると最古のメッセージから破棄される。
pub const MESSAGE_HISTORY_CAPACITY: usize = 100;

/// ルーム内の参加者
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub id: ClientId,
    pub username: Username,
    pub joined_at: Timestamp,
}

impl Participant {
    pub fn new(id: ClientId, username: Username, joined_at: Timestamp) -> Self {
        Self {
            id,
            username,
            joined_at,
        }
    }
}

/// ルーム履歴に保存されるチャットメッセージ
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub username: Username,
    pub body: MessageBody,
    pub timestamp: Timestamp,
}

impl ChatMessage {
    pub fn new(id: String, username: Username, body: MessageBody, timestamp: Timestamp) -> Self {
        Self {
            id,
            username,
            body,
            timestamp,
        }
    }
}

/// チャットルーム
///
/// 最初の join で遅延生成され、メンバーが空になった瞬間にディレクトリから
/// 削除される。メンバーは参加順を保持する。
#[derive(Debug, Clone)]
pub struct Room {
    pub id: RoomId,
    pub members: Vec<Participant>,
    pub messages: VecDeque<ChatMessage>,
    pub created_at: Timestamp,
}

impl Room {
    pub fn new(id: RoomId, created_at: Timestamp) -> Self {
        Self {
            id,
            members: Vec::new(),
            messages: VecDeque::new(),
            created_at,
        }
    }

    /// 参加者を追加する
    ///
    /// 同じ ClientId のエントリが既に存在する場合は上書きし、重複は作らない。
    pub fn upsert_member(&mut self, participant: Participant) {
        match self.members.iter_mut().find(|m| m.id == participant.id) {
            Some(existing) => *existing = participant,
            None => self.members.push(participant),
        }
    }

    /// 参加者を削除する
    pub fn remove_member(&mut self, client_id: &ClientId) -> Option<Participant> {
        let index = self.members.iter().position(|m| &m.id == client_id)?;
        Some(self.members.remove(index))
    }

    pub fn member(&self, client_id: &ClientId) -> Option<&Participant> {
        self.members.iter().find(|m| &m.id == client_id)
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// メッセージを履歴に追加する
    ///
    /// 履歴が上限に達している場合は最古のメッセージを破棄してから追加する。
    pub fn append_message(&mut self, message: ChatMessage) {
        if self.messages.len() >= MESSAGE_HISTORY_CAPACITY {
            self.messages.pop_front();
        }
        self.messages.push_back(message);
    }
}

/// 接続中のコネクションに対応するセッション
///
/// 接続が生きている間のみ存在し、切断と同時にルームのメンバーシップ削除へ
/// 連鎖する。
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub client_id: ClientId,
    pub username: Username,
    pub room_id: RoomId,
    pub joined_at: Timestamp,
}
