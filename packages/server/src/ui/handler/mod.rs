//! Request handlers for WebSocket and HTTP endpoints.

pub mod http;
pub mod websocket;
