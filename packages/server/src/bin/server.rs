//! ConnectSphere room coordination and signaling server.
//!
//! Tracks rooms and their members, relays chat and presence events to room
//! members, and forwards WebRTC negotiation messages between addressed peers.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin connectsphere-server
//! cargo run --bin connectsphere-server -- --host 0.0.0.0 --port 3001
//! ```

use std::sync::Arc;

use clap::Parser;

use connectsphere_server::{
    infrastructure::{message_pusher::WebSocketMessagePusher, registry::InMemoryRoomRegistry},
    ui::Server,
    usecase::{
        CallSignalUseCase, DisconnectUseCase, JoinRoomUseCase, RoomQueryUseCase,
        SendMessageUseCase, TypingIndicatorUseCase,
    },
};
use connectsphere_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "connectsphere-server")]
#[command(about = "Room coordination and WebRTC signaling-relay server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "3001")]
    port: u16,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Registry
    // 2. MessagePusher
    // 3. UseCases
    // 4. Server

    // 1. Create Registry (in-memory database)
    let registry = Arc::new(InMemoryRoomRegistry::new());

    // 2. Create MessagePusher (WebSocket implementation)
    let pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. Create UseCases
    let join_room_usecase = Arc::new(JoinRoomUseCase::new(registry.clone(), pusher.clone()));
    let disconnect_usecase = Arc::new(DisconnectUseCase::new(registry.clone(), pusher.clone()));
    let send_message_usecase =
        Arc::new(SendMessageUseCase::new(registry.clone(), pusher.clone()));
    let typing_usecase = Arc::new(TypingIndicatorUseCase::new(registry.clone(), pusher.clone()));
    let call_signal_usecase = Arc::new(CallSignalUseCase::new(registry.clone(), pusher.clone()));
    let room_query_usecase = Arc::new(RoomQueryUseCase::new(registry.clone()));

    // 4. Create and run the server
    let server = Server::new(
        join_room_usecase,
        disconnect_usecase,
        send_message_usecase,
        typing_usecase,
        call_signal_usecase,
        room_query_usecase,
        pusher,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
