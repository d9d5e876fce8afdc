//! Room coordination and WebRTC signaling-relay server.
//!
//! This library tracks which connection is in which room, relays chat
//! messages and presence events to room members, and forwards WebRTC
//! negotiation metadata between addressed peers. Media never passes through
//! this server.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
