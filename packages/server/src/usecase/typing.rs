//! UseCase: タイピング通知
//!
//! サーバ側に状態は持たない。通知の開始と終了の対応付けはクライアント UI の
//! 責務であり、サーバは宛先選定と転送だけを行う。

use std::sync::Arc;

use crate::domain::{ClientId, MessagePusher, RoomId, RoomRegistry, Username};

/// タイピング通知のユースケース
pub struct TypingIndicatorUseCase {
    /// Registry（データアクセス層の抽象化）
    registry: Arc<dyn RoomRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    pusher: Arc<dyn MessagePusher>,
}

impl TypingIndicatorUseCase {
    /// 新しい TypingIndicatorUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>, pusher: Arc<dyn MessagePusher>) -> Self {
        Self { registry, pusher }
    }

    /// 通知の宛先（本人以外のルームメンバー）を取得する
    ///
    /// roomId / username が欠けている場合は `None`（黙って無視する）。
    pub async fn targets(
        &self,
        client_id: &ClientId,
        room_id: String,
        username: String,
    ) -> Option<(Username, Vec<ClientId>)> {
        let room_id = RoomId::new(room_id).ok()?;
        let username = Username::new(username).ok()?;
        let targets = self
            .registry
            .member_ids(&room_id)
            .await
            .into_iter()
            .filter(|id| id != client_id)
            .collect();
        Some((username, targets))
    }

    /// 通知を配送する
    pub async fn broadcast(&self, targets: Vec<ClientId>, message: &str) -> Result<(), String> {
        self.pusher
            .broadcast(targets, message)
            .await
            .map_err(|e| e.to_string())
    }
}
