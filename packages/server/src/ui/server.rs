//! Server execution logic.

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    routing::{get, post},
};
use tokio::{net::TcpListener, task::JoinHandle, time::MissedTickBehavior};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ServerConfig;

use super::{
    handler::{
        get_room_detail, get_rooms, get_stats, health_check, run_cleanup, websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Signaling server
///
/// # Example
///
/// ```ignore
/// let state = Arc::new(AppState::new(repository, registry, clock, &config));
/// Server::new(state, config).run().await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
    heartbeat_interval: Duration,
    cleanup_interval: Duration,
    bind_addr: String,
}

impl Server {
    pub fn new(state: Arc<AppState>, config: ServerConfig) -> Self {
        Self {
            state,
            heartbeat_interval: config.heartbeat_interval,
            cleanup_interval: config.cleanup_interval,
            bind_addr: config.bind_addr(),
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/stats", get(get_stats))
            .route("/api/rooms", get(get_rooms))
            .route("/api/rooms/{room_id}", get(get_room_detail))
            .route("/api/cleanup", post(run_cleanup))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Start the liveness monitor and the janitor.
    pub fn spawn_background_tasks(&self) -> Vec<JoinHandle<()>> {
        let liveness = {
            let state = self.state.clone();
            let period = self.heartbeat_interval;
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    state.check_liveness_usecase.execute().await;
                }
            })
        };

        let janitor = {
            let state = self.state.clone();
            let period = self.cleanup_interval;
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    state.cleanup_usecase.execute().await;
                }
            })
        };

        vec![liveness, janitor]
    }

    /// Serve on an already bound listener until a shutdown signal arrives.
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        let app = self.router();
        let tasks = self.spawn_background_tasks();

        tracing::info!("Signaling server listening on {}", listener.local_addr()?);
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await;

        for task in tasks {
            task.abort();
        }
        result
    }

    /// Bind to the configured address and serve.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind or if there's an error
    /// during server execution.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let listener = TcpListener::bind(&self.bind_addr).await?;
        tracing::info!("Connect to: ws://{}/ws", self.bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener).await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}
