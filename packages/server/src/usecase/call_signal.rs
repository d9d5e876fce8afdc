//! UseCase: 通話シグナリング
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - 通話開始・終了通知の宛先選定
//! - offer / answer / ice-candidate の宛先指定転送
//!
//! ### なぜこのテストが必要か
//! - シグナリングメッセージは指定された 1 接続にだけ届かなければならない
//!   （ルームの他メンバーへの漏れはピア接続確立の誤動作につながる）
//! - 宛先が既に切断されている場合に「黙って破棄」されることを保証する
//! - サーバが通話状態を追跡しない（stateless broadcast）ことを明確にする
//!
//! ### どのような状況を想定しているか
//! - 正常系：通話開始通知、宛先指定転送
//! - エッジケース：切断済みの宛先、存在しないルーム

use std::sync::Arc;

use crate::domain::{ClientId, MessagePushError, MessagePusher, RoomId, RoomRegistry};

/// 通話シグナリングのユースケース
///
/// ペイロードの中身は一切解釈しない。誰が通話中かの管理もしない
/// （クライアントの責務）。
pub struct CallSignalUseCase {
    /// Registry（データアクセス層の抽象化）
    registry: Arc<dyn RoomRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    pusher: Arc<dyn MessagePusher>,
}

impl CallSignalUseCase {
    /// 新しい CallSignalUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>, pusher: Arc<dyn MessagePusher>) -> Self {
        Self { registry, pusher }
    }

    /// user-started-call の宛先（本人以外のルームメンバー）を取得する
    pub async fn start_call_targets(
        &self,
        client_id: &ClientId,
        room_id: String,
    ) -> Vec<ClientId> {
        let Ok(room_id) = RoomId::new(room_id) else {
            return Vec::new();
        };
        self.registry
            .member_ids(&room_id)
            .await
            .into_iter()
            .filter(|id| id != client_id)
            .collect()
    }

    /// call-ended の宛先（本人を含むルーム全員）を取得する
    pub async fn end_call_targets(&self, room_id: String) -> Vec<ClientId> {
        let Ok(room_id) = RoomId::new(room_id) else {
            return Vec::new();
        };
        self.registry.member_ids(&room_id).await
    }

    /// 通知を配送する
    pub async fn broadcast(&self, targets: Vec<ClientId>, message: &str) -> Result<(), String> {
        self.pusher
            .broadcast(targets, message)
            .await
            .map_err(|e| e.to_string())
    }

    /// シグナリングメッセージを指定された 1 接続へだけ転送する
    ///
    /// 宛先が既に切断されている場合は `ClientNotFound` が返る。呼び出し側は
    /// これを fire-and-forget の破棄として扱う（送信元へのエラー通知はしない）。
    pub async fn relay_to(
        &self,
        target: &ClientId,
        message: &str,
    ) -> Result<(), MessagePushError> {
        self.pusher.push_to(target, message).await
    }
}
