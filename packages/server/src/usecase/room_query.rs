//! UseCase: ルーム状態の照会
//!
//! HTTP 側の観測用エンドポイント（health / room 詳細 / stats）から使われる。
//! コアのプロトコルの一部ではなく、読み取り専用でいかなる状態も変更しない。

use std::sync::Arc;

use crate::domain::{RoomId, RoomRegistry, RoomSnapshot};

/// Registry の現在のカウント
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryCounts {
    pub active_rooms: usize,
    pub active_users: usize,
}

/// ルーム照会のユースケース
pub struct RoomQueryUseCase {
    /// Registry（データアクセス層の抽象化）
    registry: Arc<dyn RoomRegistry>,
}

impl RoomQueryUseCase {
    /// 新しい RoomQueryUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    /// 現在のルーム数・接続数を取得する
    pub async fn counts(&self) -> RegistryCounts {
        RegistryCounts {
            active_rooms: self.registry.count_rooms().await,
            active_users: self.registry.count_sessions().await,
        }
    }

    /// ルームのスナップショットを取得する
    ///
    /// ルームが存在しない（または room_id が空の）場合は `None`。
    pub async fn room_snapshot(&self, room_id: String) -> Option<RoomSnapshot> {
        let room_id = RoomId::new(room_id).ok()?;
        self.registry.room_snapshot(&room_id).await
    }
}
