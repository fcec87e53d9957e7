//! Deai signaling server.
//!
//! Pairs anonymous WebSocket clients one-to-one and relays their WebRTC
//! negotiation and chat messages until one side leaves.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
