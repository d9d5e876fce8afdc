//! UseCase: 切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectUseCase::execute() メソッド
//! - 切断時の離脱シーケンス（メンバーシップ削除、通知対象選定）
//!
//! ### なぜこのテストが必要か
//! - 切断 → セッション破棄 → メンバーシップ削除の連鎖を保証する
//! - 最後のメンバーの切断でルームが消えることを保証する
//! - 二重切断・未参加接続の切断が no-op であること（冪等性）を保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加中の接続の切断と通知
//! - エッジケース：最後の参加者の切断（通知対象なし、ルーム削除）
//! - 異常系：セッションを持たない接続の切断、二重切断

use std::sync::Arc;

use crate::domain::{ClientId, MessagePusher, RoomRegistry};

use super::Departure;

/// 切断のユースケース
pub struct DisconnectUseCase {
    /// Registry（データアクセス層の抽象化）
    registry: Arc<dyn RoomRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    pusher: Arc<dyn MessagePusher>,
}

impl DisconnectUseCase {
    /// 新しい DisconnectUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>, pusher: Arc<dyn MessagePusher>) -> Self {
        Self { registry, pusher }
    }

    /// 切断を実行
    ///
    /// セッションが存在しない場合（未参加の接続、二重切断）は何もせず
    /// `None` を返す。呼び出し側にエラーを伝播することはない。
    ///
    /// # Returns
    ///
    /// * `Some(Departure)` - 離脱が発生した（user-left 通知に使う）
    /// * `None` - セッションが存在しなかった（no-op）
    pub async fn execute(&self, client_id: &ClientId) -> Option<Departure> {
        let removed = self.registry.remove_member(client_id).await?;
        let notify_targets = self.registry.member_ids(&removed.room_id).await;

        if removed.room_removed {
            tracing::debug!(
                "Room '{}' removed after last member left",
                removed.room_id.as_str()
            );
        }

        Some(Departure {
            participant: removed.participant,
            room_id: removed.room_id,
            notify_targets,
        })
    }

    /// 残メンバーへ退出通知を送る
    pub async fn broadcast_user_left(
        &self,
        departure: &Departure,
        message: &str,
    ) -> Result<(), String> {
        self.pusher
            .broadcast(departure.notify_targets.clone(), message)
            .await
            .map_err(|e| e.to_string())
    }
}
