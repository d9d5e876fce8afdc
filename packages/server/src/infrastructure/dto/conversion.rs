//! Conversion logic between DTOs and domain entities.

use crate::domain::{entity, registry::RoomSnapshot};
use crate::infrastructure::dto::websocket as dto;

// ========================================
// Domain Entity → DTO
// ========================================

impl From<entity::Participant> for dto::ParticipantDto {
    fn from(model: entity::Participant) -> Self {
        Self {
            id: model.id.into_string(),
            username: model.username.into_string(),
            joined_at: model.joined_at.value(),
        }
    }
}

impl From<entity::ChatMessage> for dto::MessageDto {
    fn from(model: entity::ChatMessage) -> Self {
        Self {
            id: model.id,
            username: model.username.into_string(),
            message: model.body.into_string(),
            timestamp: model.timestamp.value(),
        }
    }
}

impl From<RoomSnapshot> for dto::ServerEvent {
    /// join 直後に本人へ送る room-data イベントを構築する
    fn from(snapshot: RoomSnapshot) -> Self {
        dto::ServerEvent::RoomData {
            users: snapshot.members.into_iter().map(Into::into).collect(),
            messages: snapshot.messages.into_iter().map(Into::into).collect(),
            room_id: snapshot.id.into_string(),
            created_at: snapshot.created_at.value(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClientId, MessageBody, RoomId, Timestamp, Username};

    #[test]
    fn test_domain_participant_to_dto() {
        // テスト項目: ドメインエンティティの Participant が DTO に変換される
        // given (前提条件):
        let participant = entity::Participant::new(
            ClientId::new("c1".to_string()).unwrap(),
            Username::new("alice".to_string()).unwrap(),
            Timestamp::new(1000),
        );

        // when (操作):
        let dto: dto::ParticipantDto = participant.into();

        // then (期待する結果):
        assert_eq!(dto.id, "c1");
        assert_eq!(dto.username, "alice");
        assert_eq!(dto.joined_at, 1000);
    }

    #[test]
    fn test_domain_chat_message_to_dto() {
        // テスト項目: ドメインエンティティの ChatMessage が DTO に変換される
        // given (前提条件):
        let message = entity::ChatMessage::new(
            "m1".to_string(),
            Username::new("bob".to_string()).unwrap(),
            MessageBody::new("Hi!".to_string()).unwrap(),
            Timestamp::new(2000),
        );

        // when (操作):
        let dto: dto::MessageDto = message.into();

        // then (期待する結果):
        assert_eq!(dto.id, "m1");
        assert_eq!(dto.username, "bob");
        assert_eq!(dto.message, "Hi!");
        assert_eq!(dto.timestamp, 2000);
    }

    #[test]
    fn test_room_snapshot_to_room_data_event() {
        // テスト項目: RoomSnapshot が room-data イベントに変換される
        // given (前提条件):
        let snapshot = RoomSnapshot {
            id: RoomId::new("r1".to_string()).unwrap(),
            members: vec![entity::Participant::new(
                ClientId::new("c1".to_string()).unwrap(),
                Username::new("alice".to_string()).unwrap(),
                Timestamp::new(1000),
            )],
            messages: vec![],
            created_at: Timestamp::new(1000),
        };

        // when (操作):
        let event: dto::ServerEvent = snapshot.into();
        let json: serde_json::Value = serde_json::from_str(&event.to_json()).unwrap();

        // then (期待する結果):
        assert_eq!(json["event"], "room-data");
        assert_eq!(json["users"][0]["username"], "alice");
        assert_eq!(json["messages"].as_array().unwrap().len(), 0);
        assert_eq!(json["roomId"], "r1");
    }
}
