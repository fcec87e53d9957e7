//! UseCase 層
//!
//! 操作ごとに 1 つのユースケース構造体を置き、Domain 層の trait 越しに
//! Repository と ConnectionRegistry を扱う。

pub mod check_liveness;
pub mod cleanup;
pub mod connect_client;
pub mod disconnect_client;
pub mod error;
pub mod find_partner;
pub mod get_room_detail;
pub mod get_rooms;
pub mod get_stats;
pub mod leave_room;
pub mod relay_message;

pub use check_liveness::CheckLivenessUseCase;
pub use cleanup::CleanupUseCase;
pub use connect_client::ConnectClientUseCase;
pub use disconnect_client::DisconnectClientUseCase;
pub use error::{FindPartnerError, GetRoomDetailError};
pub use find_partner::{FindPartnerResult, FindPartnerUseCase};
pub use get_room_detail::GetRoomDetailUseCase;
pub use get_rooms::{GetRoomsUseCase, RoomListing};
pub use get_stats::{GetStatsUseCase, ServerStats};
pub use leave_room::{LeaveReason, LeaveRoomUseCase};
pub use relay_message::{DropReason, RelayMessageUseCase, RelayOutcome};
