//! UseCase: ルーム参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - 参加処理（引数検証、旧ルームからの離脱シーケンス、スナップショット構築）
//!
//! ### なぜこのテストが必要か
//! - 検証エラー時に一切の状態変更が起きないことを保証する
//! - ルーム切替時に「離脱が完了してから参加する」順序を保証する
//! - 1 つの接続が同時に 2 つのルームに属さないという不変条件を守る
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規ルームへの参加、既存ルームへの合流
//! - 異常系：roomId / username が空
//! - エッジケース：同一接続によるルーム切替、同一ルームへの再参加

use std::sync::Arc;

use crate::domain::{
    ClientId, MessagePusher, Participant, RoomId, RoomRegistry, RoomSnapshot, Timestamp, Username,
};

use super::{error::JoinRoomError, Departure};

/// join-room の処理結果
#[derive(Debug)]
pub struct JoinOutcome {
    /// 切替前のルームからの離脱（初回 join では None）
    pub departure: Option<Departure>,
    /// 新ルームに登録された参加者
    pub participant: Participant,
    /// 本人へ返すルームのスナップショット
    pub snapshot: RoomSnapshot,
}

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    /// Registry（データアクセス層の抽象化）
    registry: Arc<dyn RoomRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    pusher: Arc<dyn MessagePusher>,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>, pusher: Arc<dyn MessagePusher>) -> Self {
        Self { registry, pusher }
    }

    /// ルーム参加を実行
    ///
    /// # Arguments
    ///
    /// * `client_id` - 参加する接続の ID
    /// * `room_id` - 参加先ルーム ID（未検証の生文字列）
    /// * `username` - ユーザー名（未検証の生文字列）
    /// * `now` - 参加時刻
    ///
    /// # Returns
    ///
    /// * `Ok(JoinOutcome)` - 参加成功
    /// * `Err(JoinRoomError)` - 検証エラーまたは内部エラー。検証エラーの
    ///   場合は状態変更を一切行わない。
    pub async fn execute(
        &self,
        client_id: ClientId,
        room_id: String,
        username: String,
        now: Timestamp,
    ) -> Result<JoinOutcome, JoinRoomError> {
        // 1. 引数を検証する（失敗時はここで打ち切り、状態は変更しない）
        let room_id = RoomId::new(room_id).map_err(|_| JoinRoomError::MissingField)?;
        let username = Username::new(username).map_err(|_| JoinRoomError::MissingField)?;

        // 2. 既に参加しているルームがあれば、先に離脱を完了させる
        let departure = self.leave_previous(&client_id).await;

        // 3. 新しいルームへ参加し、セッションを記録する
        let participant = self
            .registry
            .add_member(room_id.clone(), client_id, username, now)
            .await;

        // 4. 本人へ返すスナップショットを取得する
        let snapshot = self
            .registry
            .room_snapshot(&room_id)
            .await
            .ok_or(JoinRoomError::RoomUnavailable)?;

        Ok(JoinOutcome {
            departure,
            participant,
            snapshot,
        })
    }

    /// 接続が既にルームに属している場合、そのルームから取り除く
    async fn leave_previous(&self, client_id: &ClientId) -> Option<Departure> {
        let removed = self.registry.remove_member(client_id).await?;
        let notify_targets = self.registry.member_ids(&removed.room_id).await;
        Some(Departure {
            participant: removed.participant,
            room_id: removed.room_id,
            notify_targets,
        })
    }

    /// 旧ルームの残メンバーへ退出通知を送る
    pub async fn notify_departure(
        &self,
        departure: &Departure,
        message: &str,
    ) -> Result<(), String> {
        self.pusher
            .broadcast(departure.notify_targets.clone(), message)
            .await
            .map_err(|e| e.to_string())
    }

    /// 本人へのイベント送信（room-data, join-error）
    pub async fn send_to(&self, client_id: &ClientId, message: &str) -> Result<(), String> {
        self.pusher
            .push_to(client_id, message)
            .await
            .map_err(|e| e.to_string())
    }

    /// 新ルームの他メンバーへ参加通知を送る
    pub async fn broadcast_user_joined(
        &self,
        room_id: &RoomId,
        joined: &ClientId,
        message: &str,
    ) -> Result<(), String> {
        let targets: Vec<ClientId> = self
            .registry
            .member_ids(room_id)
            .await
            .into_iter()
            .filter(|id| id != joined)
            .collect();
        self.pusher
            .broadcast(targets, message)
            .await
            .map_err(|e| e.to_string())
    }
}
