//! ドメイン層のエラー型

use thiserror::Error;

/// 値オブジェクト生成時の検証エラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("client id must not be empty")]
    EmptyClientId,

    #[error("room id must not be empty")]
    EmptyRoomId,

    #[error("username must not be empty")]
    EmptyUsername,

    #[error("message body must not be empty")]
    EmptyMessageBody,

    #[error("message body exceeds {max} characters (got {actual})")]
    MessageTooLong { max: usize, actual: usize },
}

/// クライアントへのメッセージ送信（push）時のエラー
#[derive(Debug, Error)]
pub enum MessagePushError {
    /// 宛先クライアントが接続一覧に存在しない
    #[error("client '{0}' not found")]
    ClientNotFound(String),

    /// 送信チャンネルへの書き込みに失敗した
    #[error("failed to push message: {0}")]
    PushFailed(String),
}
