//! Shared utilities for the ConnectSphere signaling server.
//!
//! This crate holds the small pieces that are useful to every member of the
//! workspace: time handling and logging setup.

pub mod logger;
pub mod time;
