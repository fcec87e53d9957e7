//! ConnectionRegistry の実装
//!
//! - `websocket`: WebSocket の送信チャンネルを保持する実装

pub mod websocket;

pub use websocket::WebSocketConnectionRegistry;
