//! UseCase 層
//!
//! コネクションハンドラから呼び出されるアプリケーションロジック。
//! 各 UseCase は Registry と MessagePusher の抽象にのみ依存します。

pub mod call_signal;
pub mod disconnect;
pub mod error;
pub mod join_room;
pub mod room_query;
pub mod send_message;
pub mod typing;

pub use call_signal::CallSignalUseCase;
pub use disconnect::DisconnectUseCase;
pub use error::{JoinRoomError, SendMessageError};
pub use join_room::{JoinOutcome, JoinRoomUseCase};
pub use room_query::{RegistryCounts, RoomQueryUseCase};
pub use send_message::{AcceptedMessage, SendMessageUseCase};
pub use typing::TypingIndicatorUseCase;

use crate::domain::{ClientId, Participant, RoomId};

/// ルームからの離脱結果
///
/// user-left 通知の送信に必要な情報をまとめたもの。join によるルーム切替と
/// disconnect の両方で使われる。
#[derive(Debug, Clone)]
pub struct Departure {
    /// ルームを離れた参加者
    pub participant: Participant,
    /// 離れたルーム
    pub room_id: RoomId,
    /// 退出通知の宛先（離脱時点での残メンバー）
    pub notify_targets: Vec<ClientId>,
}
