//! UseCase 層のエラー定義

use thiserror::Error;

/// find_partner の失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FindPartnerError {
    /// Identity has no live connection: the client asked before its
    /// connection was established, or after it was evicted.
    #[error("User ID not found")]
    UnknownClient(String),
}

/// Room 詳細取得の失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomDetailError {
    #[error("Room not found")]
    RoomNotFound,
}
