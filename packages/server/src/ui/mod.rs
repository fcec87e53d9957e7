//! HTTP / WebSocket front end of the signaling server.

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
pub use state::AppState;
