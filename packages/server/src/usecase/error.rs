//! UseCase 層のエラー型
//!
//! Display 文字列はそのままエラーイベントの reason としてクライアントに
//! 返される。

use thiserror::Error;

/// join-room 処理のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JoinRoomError {
    /// roomId または username が欠けている（検証エラー、状態変更なし）
    #[error("Room ID and username are required")]
    MissingField,

    /// join 直後のルーム参照に失敗した（内部エラー）
    #[error("Failed to join room")]
    RoomUnavailable,
}

/// send-message 処理のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SendMessageError {
    /// roomId / username / message のいずれかが欠けている
    #[error("Invalid message data")]
    InvalidMessageData,

    /// 本文が上限文字数を超えている
    #[error("Message too long")]
    MessageTooLong,
}
