//! Repository trait 定義
//!
//! マッチング状態（待機キュー・Room・index）へのインターフェース。
//! 実装は一つの排他領域の中で各操作を完結させること。

use std::time::Duration;

use async_trait::async_trait;

use super::{
    entity::Room,
    lobby::{LeaveOutcome, LobbyCounts, MatchOutcome, SweepReport},
    value_object::{ClientId, RoomId},
};

#[async_trait]
pub trait LobbyRepository: Send + Sync {
    /// Pair the client or queue it.
    async fn find_or_create_room(&self, client_id: &ClientId) -> MatchOutcome;

    /// Leave the client's current room, if any, and drop its waiting entry.
    async fn leave_current(&self, client_id: &ClientId) -> LeaveOutcome;

    /// Room id and partner of the client.
    async fn partner_of(&self, client_id: &ClientId) -> Option<(RoomId, ClientId)>;

    async fn get_room(&self, room_id: &RoomId) -> Option<Room>;

    async fn active_rooms(&self) -> Vec<Room>;

    async fn counts(&self) -> LobbyCounts;

    async fn sweep(&self, max_room_age: Duration, max_wait: Duration) -> SweepReport;
}
