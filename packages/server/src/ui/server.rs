//! Server execution logic.

use std::sync::Arc;
use std::time::Instant;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::domain::MessagePusher;
use crate::usecase::{
    CallSignalUseCase, DisconnectUseCase, JoinRoomUseCase, RoomQueryUseCase, SendMessageUseCase,
    TypingIndicatorUseCase,
};

use super::{
    handler::{
        http::{get_room_info, get_stats, health_check},
        websocket::websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Room coordination and signaling server
///
/// This struct encapsulates the server's dependencies and provides methods to
/// run the server.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     join_room_usecase,
///     disconnect_usecase,
///     send_message_usecase,
///     typing_usecase,
///     call_signal_usecase,
///     room_query_usecase,
///     pusher,
/// );
/// server.run("127.0.0.1".to_string(), 3001).await?;
/// ```
pub struct Server {
    /// JoinRoomUseCase（ルーム参加のユースケース）
    join_room_usecase: Arc<JoinRoomUseCase>,
    /// DisconnectUseCase（切断のユースケース）
    disconnect_usecase: Arc<DisconnectUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    send_message_usecase: Arc<SendMessageUseCase>,
    /// TypingIndicatorUseCase（タイピング通知のユースケース）
    typing_usecase: Arc<TypingIndicatorUseCase>,
    /// CallSignalUseCase（通話シグナリングのユースケース）
    call_signal_usecase: Arc<CallSignalUseCase>,
    /// RoomQueryUseCase（ルーム照会のユースケース）
    room_query_usecase: Arc<RoomQueryUseCase>,
    /// MessagePusher（接続チャンネルの登録・解除に使う）
    pusher: Arc<dyn MessagePusher>,
}

impl Server {
    /// Create a new Server instance
    pub fn new(
        join_room_usecase: Arc<JoinRoomUseCase>,
        disconnect_usecase: Arc<DisconnectUseCase>,
        send_message_usecase: Arc<SendMessageUseCase>,
        typing_usecase: Arc<TypingIndicatorUseCase>,
        call_signal_usecase: Arc<CallSignalUseCase>,
        room_query_usecase: Arc<RoomQueryUseCase>,
        pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            join_room_usecase,
            disconnect_usecase,
            send_message_usecase,
            typing_usecase,
            call_signal_usecase,
            room_query_usecase,
            pusher,
        }
    }

    /// Build the axum router (also used by integration tests)
    pub fn into_router(self) -> Router {
        let app_state = Arc::new(AppState {
            join_room_usecase: self.join_room_usecase,
            disconnect_usecase: self.disconnect_usecase,
            send_message_usecase: self.send_message_usecase,
            typing_usecase: self.typing_usecase,
            call_signal_usecase: self.call_signal_usecase,
            room_query_usecase: self.room_query_usecase,
            pusher: self.pusher,
            started_at: Instant::now(),
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント（観測用）
            .route("/health", get(health_check))
            .route("/api/room/{room_id}", get(get_room_info))
            .route("/api/stats", get(get_stats))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Run the server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 3001)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address
    /// or if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.into_router();

        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        // Start the server
        tracing::info!(
            "ConnectSphere server listening on {}",
            listener.local_addr()?
        );
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Health check: http://{}/health", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        // Set up graceful shutdown signal handler
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
