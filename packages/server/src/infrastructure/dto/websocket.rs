//! WebSocket event DTOs.
//!
//! Every frame is a JSON object whose `"event"` field names the event
//! (kebab-case) and whose remaining fields are the camelCase payload.
//! Signaling payloads (`offer` / `answer` / `candidate`) are carried as
//! opaque `serde_json::Value`s and are never interpreted by the server.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Client → server events.
///
/// 受信イベントは単一のタグ付き enum として表現し、コネクションハンドラが
/// ここからディスパッチする。未知のイベントはデシリアライズエラーになり、
/// 警告ログとともに無視される。
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ClientEvent {
    #[serde(rename_all = "camelCase")]
    JoinRoom { room_id: String, username: String },

    #[serde(rename_all = "camelCase")]
    SendMessage {
        room_id: String,
        username: String,
        message: String,
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        timestamp: Option<i64>,
    },

    #[serde(rename_all = "camelCase")]
    TypingStart { room_id: String, username: String },

    #[serde(rename_all = "camelCase")]
    TypingStop { room_id: String, username: String },

    #[serde(rename_all = "camelCase")]
    StartCall {
        room_id: String,
        username: String,
        #[serde(rename = "type")]
        call_type: String,
    },

    #[serde(rename_all = "camelCase")]
    EndCall { room_id: String, username: String },

    #[serde(rename_all = "camelCase")]
    Offer {
        target: String,
        offer: Value,
        #[serde(default)]
        room_id: Option<String>,
    },

    #[serde(rename_all = "camelCase")]
    Answer {
        target: String,
        answer: Value,
        #[serde(default)]
        room_id: Option<String>,
    },

    #[serde(rename_all = "camelCase")]
    IceCandidate {
        target: String,
        candidate: Value,
        #[serde(default)]
        room_id: Option<String>,
    },
}

/// Participant as seen on the wire
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    pub id: String,
    pub username: String,
    pub joined_at: i64,
}

/// Chat message as seen on the wire
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: String,
    pub username: String,
    pub message: String,
    pub timestamp: i64,
}

/// Server → client events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// 接続直後、この接続に払い出された ID を本人にだけ通知する
    #[serde(rename_all = "camelCase")]
    Connected { user_id: String },

    /// join した本人にだけ送るルームの完全なスナップショット
    #[serde(rename_all = "camelCase")]
    RoomData {
        users: Vec<ParticipantDto>,
        messages: Vec<MessageDto>,
        room_id: String,
        created_at: i64,
    },

    /// 参加通知（本人以外のルームメンバー宛）
    UserJoined(ParticipantDto),

    /// 退出通知（本人以外のルームメンバー宛）
    UserLeft(ParticipantDto),

    /// チャットメッセージ（送信者本人を含むルーム全員宛）
    ReceiveMessage(MessageDto),

    TypingStart { username: String },

    TypingStop { username: String },

    #[serde(rename_all = "camelCase")]
    UserStartedCall {
        user_id: String,
        username: String,
        #[serde(rename = "type")]
        call_type: String,
    },

    #[serde(rename_all = "camelCase")]
    CallEnded { user_id: String, username: String },

    Offer { sender: String, offer: Value },

    Answer { sender: String, answer: Value },

    IceCandidate { sender: String, candidate: Value },

    /// join の検証エラー（送信元の接続にのみ返す）
    JoinError { reason: String },

    /// その他のエラー（送信元の接続にのみ返す）
    Error { reason: String },
}

impl ServerEvent {
    /// Serialize the event to its wire representation.
    ///
    /// これらの型のシリアライズは失敗しない。
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("ServerEvent serialization cannot fail")
    }
}
