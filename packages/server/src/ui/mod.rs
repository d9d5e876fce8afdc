//! UI 層（プロトコル境界）
//!
//! WebSocket / HTTP のエンドポイントと、サーバの起動・停止を担う。

pub mod handler;
pub mod server;
pub mod signal;
pub mod state;

pub use server::Server;
