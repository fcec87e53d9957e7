//! Server state shared by every handler.

use std::{sync::Arc, time::Duration};

use crate::{
    config::ServerConfig,
    domain::{ConnectionRegistry, LobbyRepository},
    usecase::{
        CheckLivenessUseCase, CleanupUseCase, ConnectClientUseCase, DisconnectClientUseCase,
        FindPartnerUseCase, GetRoomDetailUseCase, GetRoomsUseCase, GetStatsUseCase,
        LeaveRoomUseCase, RelayMessageUseCase,
    },
};
use deai_shared::time::Clock;

/// Shared application state
pub struct AppState {
    /// ConnectClientUseCase（接続受付のユースケース）
    pub connect_client_usecase: Arc<ConnectClientUseCase>,
    /// FindPartnerUseCase（パートナー探しのユースケース）
    pub find_partner_usecase: Arc<FindPartnerUseCase>,
    /// RelayMessageUseCase（中継のユースケース）
    pub relay_message_usecase: Arc<RelayMessageUseCase>,
    /// LeaveRoomUseCase（退出のユースケース）
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    /// DisconnectClientUseCase（切断処理のユースケース）
    pub disconnect_client_usecase: Arc<DisconnectClientUseCase>,
    pub check_liveness_usecase: Arc<CheckLivenessUseCase>,
    pub cleanup_usecase: Arc<CleanupUseCase>,
    pub get_stats_usecase: Arc<GetStatsUseCase>,
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    pub clock: Arc<dyn Clock>,
    /// Bearer token expected on the admin API
    pub admin_token: String,
    /// Delay applied to each ICE candidate before it is relayed
    pub candidate_relay_delay: Duration,
}

impl AppState {
    /// Wire every usecase onto the given repository and registry.
    pub fn new(
        repository: Arc<dyn LobbyRepository>,
        registry: Arc<dyn ConnectionRegistry>,
        clock: Arc<dyn Clock>,
        config: &ServerConfig,
    ) -> Self {
        let leave_room_usecase = Arc::new(LeaveRoomUseCase::new(
            repository.clone(),
            registry.clone(),
        ));

        Self {
            connect_client_usecase: Arc::new(ConnectClientUseCase::new(
                registry.clone(),
                clock.clone(),
            )),
            find_partner_usecase: Arc::new(FindPartnerUseCase::new(
                repository.clone(),
                registry.clone(),
            )),
            relay_message_usecase: Arc::new(RelayMessageUseCase::new(
                repository.clone(),
                registry.clone(),
                clock.clone(),
            )),
            disconnect_client_usecase: Arc::new(DisconnectClientUseCase::new(
                leave_room_usecase.clone(),
                registry.clone(),
            )),
            leave_room_usecase,
            check_liveness_usecase: Arc::new(CheckLivenessUseCase::new(registry.clone())),
            cleanup_usecase: Arc::new(CleanupUseCase::new(
                repository.clone(),
                config.max_room_age,
                config.max_wait,
            )),
            get_stats_usecase: Arc::new(GetStatsUseCase::new(repository.clone(), registry)),
            get_rooms_usecase: Arc::new(GetRoomsUseCase::new(repository.clone())),
            get_room_detail_usecase: Arc::new(GetRoomDetailUseCase::new(repository)),
            clock,
            admin_token: config.admin_token.clone(),
            candidate_relay_delay: config.candidate_relay_delay,
        }
    }
}
