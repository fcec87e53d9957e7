//! LobbyRepository の実装
//!
//! - `inmemory`: プロセス内メモリに保持する実装（再起動で状態は失われる）

pub mod inmemory;

pub use inmemory::InMemoryLobbyRepository;
