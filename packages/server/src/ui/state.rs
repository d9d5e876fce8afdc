//! Server state shared across handlers.

use std::sync::Arc;
use std::time::Instant;

use crate::domain::MessagePusher;
use crate::usecase::{
    CallSignalUseCase, DisconnectUseCase, JoinRoomUseCase, RoomQueryUseCase, SendMessageUseCase,
    TypingIndicatorUseCase,
};

/// Shared application state
pub struct AppState {
    /// JoinRoomUseCase（ルーム参加のユースケース）
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    /// DisconnectUseCase（切断のユースケース）
    pub disconnect_usecase: Arc<DisconnectUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// TypingIndicatorUseCase（タイピング通知のユースケース）
    pub typing_usecase: Arc<TypingIndicatorUseCase>,
    /// CallSignalUseCase（通話シグナリングのユースケース）
    pub call_signal_usecase: Arc<CallSignalUseCase>,
    /// RoomQueryUseCase（ルーム照会のユースケース）
    pub room_query_usecase: Arc<RoomQueryUseCase>,
    /// MessagePusher（接続チャンネルの登録・解除に使う）
    pub pusher: Arc<dyn MessagePusher>,
    /// /api/stats の uptime の基準時刻
    pub started_at: Instant,
}
