//! WebSocket connection handlers.
//!
//! 1 接続 = 1 タスク。受信イベントは `ClientEvent` としてパースされ、対応
//! する UseCase へディスパッチされる。送信はすべて MessagePusher のチャン
//! ネル経由で行い、`pusher_loop` がチャンネルから WebSocket へ書き出す。

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use connectsphere_shared::time::unix_timestamp_millis;

use crate::{
    domain::{ClientId, Timestamp},
    infrastructure::dto::websocket::{ClientEvent, ServerEvent},
    ui::state::AppState,
    usecase::JoinRoomError,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives messages from the rx channel and pushes them
/// to the WebSocket sender.
///
/// This function handles the outbound message flow: events addressed to this
/// connection (via the rx channel) are written to its WebSocket.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            // Send the message to this client
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    // この接続のトランスポート ID を払い出す（クライアントは選べない）
    let client_id = ClientId::generate();
    let (tx, rx) = mpsc::unbounded_channel();
    state.pusher.register_client(client_id.clone(), tx).await;
    tracing::info!("Client '{}' connected", client_id.as_str());

    let (sender, mut receiver) = socket.split();
    let mut send_task = pusher_loop(rx, sender);

    // 本人に自身の接続 ID を通知する
    let connected = ServerEvent::Connected {
        user_id: client_id.as_str().to_string(),
    };
    if let Err(e) = state.pusher.push_to(&client_id, &connected.to_json()).await {
        tracing::error!("Failed to send connected to '{}': {}", client_id.as_str(), e);
    }

    let recv_state = state.clone();
    let recv_client_id = client_id.clone();

    // Spawn a task to receive events from this client
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    dispatch_event(&recv_state, &recv_client_id, &text).await;
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!("Client '{}' requested close", recv_client_id.as_str());
                    break;
                }
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // 切断時の後始末：ルームから離脱し、残メンバーへ退出を通知する。
    // セッションが無ければ no-op（二重切断も安全）。
    if let Some(departure) = state.disconnect_usecase.execute(&client_id).await {
        let left = ServerEvent::UserLeft(departure.participant.clone().into());
        if let Err(e) = state
            .disconnect_usecase
            .broadcast_user_left(&departure, &left.to_json())
            .await
        {
            tracing::warn!("Failed to broadcast user-left: {}", e);
        } else {
            tracing::info!(
                "User '{}' left room '{}'",
                departure.participant.username.as_str(),
                departure.room_id.as_str()
            );
        }
    }
    state.pusher.unregister_client(&client_id).await;
    tracing::info!(
        "Client '{}' disconnected and removed from registry",
        client_id.as_str()
    );
}

/// 受信イベントを対応するハンドラへ振り分ける
async fn dispatch_event(state: &Arc<AppState>, client_id: &ClientId, text: &str) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Failed to parse client event: {}", e);
            return;
        }
    };

    match event {
        ClientEvent::JoinRoom { room_id, username } => {
            handle_join_room(state, client_id, room_id, username).await;
        }
        ClientEvent::SendMessage {
            room_id,
            username,
            message,
            id,
            timestamp,
        } => {
            handle_send_message(state, client_id, room_id, username, message, id, timestamp)
                .await;
        }
        ClientEvent::TypingStart { room_id, username } => {
            handle_typing(state, client_id, room_id, username, true).await;
        }
        ClientEvent::TypingStop { room_id, username } => {
            handle_typing(state, client_id, room_id, username, false).await;
        }
        ClientEvent::StartCall {
            room_id,
            username,
            call_type,
        } => {
            handle_start_call(state, client_id, room_id, username, call_type).await;
        }
        ClientEvent::EndCall { room_id, username } => {
            handle_end_call(state, client_id, room_id, username).await;
        }
        ClientEvent::Offer {
            target,
            offer,
            room_id,
        } => {
            let event = ServerEvent::Offer {
                sender: client_id.as_str().to_string(),
                offer,
            };
            handle_relay(state, client_id, target, event, "offer", room_id).await;
        }
        ClientEvent::Answer {
            target,
            answer,
            room_id,
        } => {
            let event = ServerEvent::Answer {
                sender: client_id.as_str().to_string(),
                answer,
            };
            handle_relay(state, client_id, target, event, "answer", room_id).await;
        }
        ClientEvent::IceCandidate {
            target,
            candidate,
            room_id,
        } => {
            let event = ServerEvent::IceCandidate {
                sender: client_id.as_str().to_string(),
                candidate,
            };
            handle_relay(state, client_id, target, event, "ice-candidate", room_id).await;
        }
    }
}

async fn handle_join_room(
    state: &Arc<AppState>,
    client_id: &ClientId,
    room_id: String,
    username: String,
) {
    tracing::info!(
        "Join room request: room='{}' username='{}' client='{}'",
        room_id,
        username,
        client_id.as_str()
    );

    let now = Timestamp::new(unix_timestamp_millis());
    match state
        .join_room_usecase
        .execute(client_id.clone(), room_id, username, now)
        .await
    {
        Ok(outcome) => {
            // 1. 旧ルームの残メンバーへ退出通知（ルーム切替時のみ）
            if let Some(departure) = &outcome.departure {
                let left = ServerEvent::UserLeft(departure.participant.clone().into());
                if let Err(e) = state
                    .join_room_usecase
                    .notify_departure(departure, &left.to_json())
                    .await
                {
                    tracing::warn!("Failed to broadcast user-left: {}", e);
                }
            }

            let room_id = outcome.snapshot.id.clone();
            tracing::info!(
                "User '{}' ({}) joined room '{}'",
                outcome.participant.username.as_str(),
                client_id.as_str(),
                room_id.as_str()
            );

            // 2. 本人にだけルームのスナップショットを返す
            let room_data: ServerEvent = outcome.snapshot.into();
            if let Err(e) = state
                .join_room_usecase
                .send_to(client_id, &room_data.to_json())
                .await
            {
                tracing::error!(
                    "Failed to send room-data to '{}': {}",
                    client_id.as_str(),
                    e
                );
            }

            // 3. 新ルームの他メンバーへ参加通知
            let joined = ServerEvent::UserJoined(outcome.participant.into());
            if let Err(e) = state
                .join_room_usecase
                .broadcast_user_joined(&room_id, client_id, &joined.to_json())
                .await
            {
                tracing::warn!("Failed to broadcast user-joined: {}", e);
            }
        }
        Err(e @ JoinRoomError::MissingField) => {
            tracing::warn!("Rejected join from '{}': {}", client_id.as_str(), e);
            let error = ServerEvent::JoinError {
                reason: e.to_string(),
            };
            if let Err(e) = state
                .join_room_usecase
                .send_to(client_id, &error.to_json())
                .await
            {
                tracing::warn!("Failed to send join-error: {}", e);
            }
        }
        Err(e @ JoinRoomError::RoomUnavailable) => {
            tracing::error!("Join failed for '{}': {}", client_id.as_str(), e);
            let error = ServerEvent::Error {
                reason: e.to_string(),
            };
            if let Err(e) = state
                .join_room_usecase
                .send_to(client_id, &error.to_json())
                .await
            {
                tracing::warn!("Failed to send error: {}", e);
            }
        }
    }
}

async fn handle_send_message(
    state: &Arc<AppState>,
    client_id: &ClientId,
    room_id: String,
    username: String,
    message: String,
    id: Option<String>,
    timestamp: Option<i64>,
) {
    let now = Timestamp::new(unix_timestamp_millis());
    match state
        .send_message_usecase
        .execute(room_id, username, message, id, timestamp, now)
        .await
    {
        Ok(Some(accepted)) => {
            tracing::info!(
                "Message from '{}' broadcast to {} clients",
                accepted.message.username.as_str(),
                accepted.targets.len()
            );
            let event = ServerEvent::ReceiveMessage(accepted.message.into());
            if let Err(e) = state
                .send_message_usecase
                .broadcast(accepted.targets, &event.to_json())
                .await
            {
                tracing::warn!("Failed to broadcast message: {}", e);
            }
        }
        Ok(None) => {
            // ルームが既に消えている：送信者へのエラーは返さない（黙って破棄）
            tracing::debug!(
                "Dropped message from '{}': room no longer exists",
                client_id.as_str()
            );
        }
        Err(e) => {
            tracing::warn!("Rejected message from '{}': {}", client_id.as_str(), e);
            let error = ServerEvent::Error {
                reason: e.to_string(),
            };
            if let Err(e) = state
                .send_message_usecase
                .send_error(client_id, &error.to_json())
                .await
            {
                tracing::warn!("Failed to send error: {}", e);
            }
        }
    }
}

async fn handle_typing(
    state: &Arc<AppState>,
    client_id: &ClientId,
    room_id: String,
    username: String,
    started: bool,
) {
    // roomId / username が欠けている場合は黙って無視する
    let Some((username, targets)) = state
        .typing_usecase
        .targets(client_id, room_id, username)
        .await
    else {
        return;
    };

    let event = if started {
        ServerEvent::TypingStart {
            username: username.into_string(),
        }
    } else {
        ServerEvent::TypingStop {
            username: username.into_string(),
        }
    };
    if let Err(e) = state.typing_usecase.broadcast(targets, &event.to_json()).await {
        tracing::warn!("Failed to broadcast typing indicator: {}", e);
    }
}

async fn handle_start_call(
    state: &Arc<AppState>,
    client_id: &ClientId,
    room_id: String,
    username: String,
    call_type: String,
) {
    tracing::info!(
        "User '{}' started {} call in room '{}'",
        username,
        call_type,
        room_id
    );

    let targets = state
        .call_signal_usecase
        .start_call_targets(client_id, room_id)
        .await;
    let event = ServerEvent::UserStartedCall {
        user_id: client_id.as_str().to_string(),
        username,
        call_type,
    };
    if let Err(e) = state
        .call_signal_usecase
        .broadcast(targets, &event.to_json())
        .await
    {
        tracing::warn!("Failed to broadcast user-started-call: {}", e);
    }
}

async fn handle_end_call(
    state: &Arc<AppState>,
    client_id: &ClientId,
    room_id: String,
    username: String,
) {
    tracing::info!("User '{}' ended call in room '{}'", username, room_id);

    let targets = state.call_signal_usecase.end_call_targets(room_id).await;
    let event = ServerEvent::CallEnded {
        user_id: client_id.as_str().to_string(),
        username,
    };
    if let Err(e) = state
        .call_signal_usecase
        .broadcast(targets, &event.to_json())
        .await
    {
        tracing::warn!("Failed to broadcast call-ended: {}", e);
    }
}

/// シグナリングメッセージを宛先の 1 接続へ転送する
///
/// 宛先が不正・切断済みの場合はメッセージを破棄する（fire-and-forget、
/// 送信元へのエラー通知はしない）。
async fn handle_relay(
    state: &Arc<AppState>,
    client_id: &ClientId,
    target: String,
    event: ServerEvent,
    kind: &str,
    room_id: Option<String>,
) {
    let Ok(target) = ClientId::new(target) else {
        tracing::warn!("Dropping {} from '{}': missing target", kind, client_id.as_str());
        return;
    };

    match state
        .call_signal_usecase
        .relay_to(&target, &event.to_json())
        .await
    {
        Ok(()) => tracing::debug!(
            "{} relayed from '{}' to '{}' (room: {:?})",
            kind,
            client_id.as_str(),
            target.as_str(),
            room_id
        ),
        Err(e) => tracing::debug!(
            "Dropping {} from '{}' to '{}': {}",
            kind,
            client_id.as_str(),
            target.as_str(),
            e
        ),
    }
}
