//! Registry trait 定義
//!
//! ルームとセッションの権威ある台帳へのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! ## 不変条件
//!
//! - 1 つの接続は同時に高々 1 つのルームにのみ属する
//! - ルームはメンバーが空でない間のみ存在する（空になった瞬間に削除）
//! - メンバーシップの読み取りが、適用途中の join / leave を観測することはない

use async_trait::async_trait;

use super::entity::{ChatMessage, Participant, Session};
use super::value_object::{ClientId, RoomId, Timestamp, Username};

/// join 直後に参加者へ返すルームの完全なスナップショット
#[derive(Debug, Clone)]
pub struct RoomSnapshot {
    pub id: RoomId,
    pub members: Vec<Participant>,
    pub messages: Vec<ChatMessage>,
    pub created_at: Timestamp,
}

/// remove_member の結果
#[derive(Debug, Clone)]
pub struct RemovedMember {
    /// ルームから取り除かれた参加者
    pub participant: Participant,
    /// 参加していたルーム
    pub room_id: RoomId,
    /// この削除でルーム自体が消えたかどうか
    pub room_removed: bool,
}

/// Room/Session Registry trait
///
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装には
/// 依存しない。
#[async_trait]
pub trait RoomRegistry: Send + Sync {
    /// 参加者をルームに追加し、セッションを記録する
    ///
    /// ルームは存在しなければ遅延生成される。同じ接続の再追加はエントリを
    /// 上書きし、重複は作らない。
    async fn add_member(
        &self,
        room_id: RoomId,
        client_id: ClientId,
        username: Username,
        joined_at: Timestamp,
    ) -> Participant;

    /// 接続をその現在のルームから取り除き、セッションを破棄する
    ///
    /// メンバーシップが空になったルームはディレクトリから削除される。
    /// セッションが存在しない場合は何もしない（冪等性）。
    async fn remove_member(&self, client_id: &ClientId) -> Option<RemovedMember>;

    /// メッセージをルーム履歴に追加する
    ///
    /// ルームが存在しない場合は `None`（メッセージは破棄される）。
    async fn append_message(&self, room_id: &RoomId, message: ChatMessage)
        -> Option<ChatMessage>;

    /// ルームの参加者リストを参加順で取得する
    async fn list_members(&self, room_id: &RoomId) -> Vec<Participant>;

    /// ルームの参加者のクライアント ID を取得する
    async fn member_ids(&self, room_id: &RoomId) -> Vec<ClientId>;

    /// 接続のセッションを取得する
    async fn get_session(&self, client_id: &ClientId) -> Option<Session>;

    /// ルームのスナップショット（メンバー + 履歴）を取得する
    async fn room_snapshot(&self, room_id: &RoomId) -> Option<RoomSnapshot>;

    /// 現在のルーム数を取得する
    async fn count_rooms(&self) -> usize;

    /// 現在のセッション数を取得する
    async fn count_sessions(&self) -> usize;
}
