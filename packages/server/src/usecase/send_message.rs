//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - メッセージ送信処理（検証、履歴への追加、ブロードキャスト対象選定）
//!
//! ### なぜこのテストが必要か
//! - チャットメッセージは送信者本人を含むルーム全員に届く（配達確認）
//! - 本文の上限超過・フィールド欠落が検証エラーになることを保証する
//! - 消えたルームへの送信が「黙って破棄」されることを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：メッセージ送信とブロードキャスト
//! - 異常系：フィールド欠落、本文の上限超過
//! - エッジケース：disconnect と競合して消えたルームへの送信

use std::sync::Arc;

use crate::domain::{
    ChatMessage, ClientId, DomainError, MessageBody, MessagePusher, RoomId, RoomRegistry,
    Timestamp, Username,
};

use super::error::SendMessageError;

/// 受理されたメッセージとその配送先
#[derive(Debug)]
pub struct AcceptedMessage {
    /// 履歴に保存されたメッセージ
    pub message: ChatMessage,
    /// ブロードキャスト対象（送信者本人を含むルーム全員）
    pub targets: Vec<ClientId>,
}

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// Registry（データアクセス層の抽象化）
    registry: Arc<dyn RoomRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    pusher: Arc<dyn MessagePusher>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>, pusher: Arc<dyn MessagePusher>) -> Self {
        Self { registry, pusher }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `room_id` / `username` / `body` - クライアントから届いた生の値
    /// * `id` - クライアント指定のメッセージ ID（省略時は UUID v4）
    /// * `timestamp` - クライアント指定のタイムスタンプ（省略時は現在時刻）
    /// * `now` - 現在時刻
    ///
    /// # Returns
    ///
    /// * `Ok(Some(AcceptedMessage))` - 受理（保存済みメッセージと配送先）
    /// * `Ok(None)` - ルームが存在せずメッセージは黙って破棄された
    /// * `Err(SendMessageError)` - 検証エラー（状態変更なし）
    pub async fn execute(
        &self,
        room_id: String,
        username: String,
        body: String,
        id: Option<String>,
        timestamp: Option<i64>,
        now: Timestamp,
    ) -> Result<Option<AcceptedMessage>, SendMessageError> {
        // 1. 引数を検証する
        let room_id = RoomId::new(room_id).map_err(|_| SendMessageError::InvalidMessageData)?;
        let username =
            Username::new(username).map_err(|_| SendMessageError::InvalidMessageData)?;
        let body = MessageBody::new(body).map_err(|e| match e {
            DomainError::MessageTooLong { .. } => SendMessageError::MessageTooLong,
            _ => SendMessageError::InvalidMessageData,
        })?;

        // 2. メッセージを構築する（id / timestamp は省略時に補完）
        let message = ChatMessage::new(
            id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            username,
            body,
            timestamp.map(Timestamp::new).unwrap_or(now),
        );

        // 3. 履歴に追加する。ルームが既に消えている場合は黙って破棄する
        let Some(stored) = self.registry.append_message(&room_id, message).await else {
            return Ok(None);
        };

        // 4. 配送先を取得する（送信者本人を含むルーム全員）
        let targets = self.registry.member_ids(&room_id).await;

        Ok(Some(AcceptedMessage {
            message: stored,
            targets,
        }))
    }

    /// 受理されたメッセージをルーム全員へ配送する
    pub async fn broadcast(&self, targets: Vec<ClientId>, message: &str) -> Result<(), String> {
        self.pusher
            .broadcast(targets, message)
            .await
            .map_err(|e| e.to_string())
    }

    /// 検証エラーを送信元にだけ返す
    pub async fn send_error(&self, client_id: &ClientId, message: &str) -> Result<(), String> {
        self.pusher
            .push_to(client_id, message)
            .await
            .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MAX_MESSAGE_CHARS;
    use crate::infrastructure::{
        message_pusher::WebSocketMessagePusher, registry::InMemoryRoomRegistry,
    };

    fn create_test_usecase() -> (SendMessageUseCase, Arc<InMemoryRoomRegistry>) {
        let registry = Arc::new(InMemoryRoomRegistry::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        (SendMessageUseCase::new(registry.clone(), pusher), registry)
    }

    fn client_id(value: &str) -> ClientId {
        ClientId::new(value.to_string()).unwrap()
    }

    fn room_id(value: &str) -> RoomId {
        RoomId::new(value.to_string()).unwrap()
    }

    fn username(value: &str) -> Username {
        Username::new(value.to_string()).unwrap()
    }

    async fn join(registry: &InMemoryRoomRegistry, room: &str, client: &str, name: &str) {
        registry
            .add_member(
                room_id(room),
                client_id(client),
                username(name),
                Timestamp::new(1000),
            )
            .await;
    }

    #[tokio::test]
    async fn test_send_message_targets_include_sender() {
        // テスト項目: 配送先に送信者本人が含まれる（配達確認）
        // given (前提条件):
        let (usecase, registry) = create_test_usecase();
        join(&registry, "r1", "c1", "alice").await;
        join(&registry, "r1", "c2", "bob").await;

        // when (操作):
        let accepted = usecase
            .execute(
                "r1".to_string(),
                "alice".to_string(),
                "Hello!".to_string(),
                None,
                None,
                Timestamp::new(2000),
            )
            .await
            .unwrap()
            .unwrap();

        // then (期待する結果):
        assert_eq!(accepted.targets.len(), 2);
        assert!(accepted.targets.contains(&client_id("c1")));
        assert!(accepted.targets.contains(&client_id("c2")));
        assert_eq!(accepted.message.body.as_str(), "Hello!");

        // 履歴にも追加されている
        let snapshot = registry.room_snapshot(&room_id("r1")).await.unwrap();
        assert_eq!(snapshot.messages.len(), 1);
    }

    #[tokio::test]
    async fn test_send_message_defaults_id_and_timestamp() {
        // テスト項目: id / timestamp 省略時に補完される
        // given (前提条件):
        let (usecase, registry) = create_test_usecase();
        join(&registry, "r1", "c1", "alice").await;

        // when (操作):
        let accepted = usecase
            .execute(
                "r1".to_string(),
                "alice".to_string(),
                "Hello!".to_string(),
                None,
                None,
                Timestamp::new(2000),
            )
            .await
            .unwrap()
            .unwrap();

        // then (期待する結果):
        assert!(!accepted.message.id.is_empty());
        assert_eq!(accepted.message.timestamp, Timestamp::new(2000));
    }

    #[tokio::test]
    async fn test_send_message_preserves_client_supplied_id_and_timestamp() {
        // テスト項目: クライアント指定の id / timestamp が保持される
        // given (前提条件):
        let (usecase, registry) = create_test_usecase();
        join(&registry, "r1", "c1", "alice").await;

        // when (操作):
        let accepted = usecase
            .execute(
                "r1".to_string(),
                "alice".to_string(),
                "Hello!".to_string(),
                Some("client-id-1".to_string()),
                Some(1234),
                Timestamp::new(2000),
            )
            .await
            .unwrap()
            .unwrap();

        // then (期待する結果):
        assert_eq!(accepted.message.id, "client-id-1");
        assert_eq!(accepted.message.timestamp, Timestamp::new(1234));
    }

    #[tokio::test]
    async fn test_send_message_missing_fields_rejected() {
        // テスト項目: フィールド欠落は検証エラーになり、状態は変わらない
        // given (前提条件):
        let (usecase, registry) = create_test_usecase();
        join(&registry, "r1", "c1", "alice").await;

        // when (操作):
        let result = usecase
            .execute(
                "r1".to_string(),
                "alice".to_string(),
                "".to_string(),
                None,
                None,
                Timestamp::new(2000),
            )
            .await;

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), SendMessageError::InvalidMessageData);
        let snapshot = registry.room_snapshot(&room_id("r1")).await.unwrap();
        assert_eq!(snapshot.messages.len(), 0);
    }

    #[tokio::test]
    async fn test_send_message_over_limit_rejected_not_truncated() {
        // テスト項目: 上限超過の本文は拒否され、切り詰められない
        // given (前提条件):
        let (usecase, registry) = create_test_usecase();
        join(&registry, "r1", "c1", "alice").await;

        // when (操作):
        let result = usecase
            .execute(
                "r1".to_string(),
                "alice".to_string(),
                "a".repeat(MAX_MESSAGE_CHARS + 1),
                None,
                None,
                Timestamp::new(2000),
            )
            .await;

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), SendMessageError::MessageTooLong);
        let snapshot = registry.room_snapshot(&room_id("r1")).await.unwrap();
        assert_eq!(snapshot.messages.len(), 0);
    }

    #[tokio::test]
    async fn test_send_message_to_vanished_room_is_silently_dropped() {
        // テスト項目: 消えたルームへの送信は黙って破棄される（エラーなし）
        // given (前提条件): ルームは一度も作られていない
        let (usecase, _registry) = create_test_usecase();

        // when (操作):
        let result = usecase
            .execute(
                "gone".to_string(),
                "alice".to_string(),
                "Hello?".to_string(),
                None,
                None,
                Timestamp::new(2000),
            )
            .await;

        // then (期待する結果): エラーではなく None
        assert!(result.unwrap().is_none());
    }
}
