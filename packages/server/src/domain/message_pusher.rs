//! メッセージ送信（通知）の抽象
//!
//! UseCase 層はこの trait を通じてクライアントへイベントを届けます。
//! 具体的な実装（WebSocket）は Infrastructure 層が提供します。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{error::MessagePushError, value_object::ClientId};

/// クライアントへの送信チャンネル
///
/// 送信は fire-and-forget：受信側のタスクが WebSocket へ書き出す。
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// MessagePusher trait
///
/// 接続中クライアントの送信チャンネルを管理し、単一送信（push_to）と
/// 複数送信（broadcast）を提供する。
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// クライアントの送信チャンネルを登録する
    async fn register_client(&self, client_id: ClientId, sender: PusherChannel);

    /// クライアントの送信チャンネルを登録解除する
    async fn unregister_client(&self, client_id: &ClientId);

    /// 特定のクライアントへメッセージを送信する
    async fn push_to(&self, client_id: &ClientId, content: &str) -> Result<(), MessagePushError>;

    /// 複数のクライアントへメッセージを送信する
    ///
    /// 一部の宛先への送信失敗は許容し、他の宛先への配送を妨げない。
    async fn broadcast(
        &self,
        targets: Vec<ClientId>,
        content: &str,
    ) -> Result<(), MessagePushError>;
}
