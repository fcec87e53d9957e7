//! Deai signaling server.
//!
//! Pairs anonymous clients one-to-one and relays their WebRTC negotiation.
//!
//! Run with:
//! ```not_rust
//! DEAI_ADMIN_TOKEN=secret cargo run --bin deai-server
//! cargo run --bin deai-server -- --host 0.0.0.0 --port 3000 --admin-token secret
//! ```

use std::sync::Arc;

use clap::Parser;
use deai_server::{
    config::{ServerArgs, ServerConfig},
    infrastructure::{registry::WebSocketConnectionRegistry, repository::InMemoryLobbyRepository},
    ui::{AppState, Server},
};
use deai_shared::{logger::setup_logger, time::SystemClock};

#[tokio::main]
async fn main() {
    let args = ServerArgs::parse();

    // Initialize tracing
    setup_logger(&["deai_server", "deai_shared", "tower_http"], &args.log_level);

    let config = match ServerConfig::try_from(args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize dependencies in order:
    // 1. Clock
    // 2. Repository
    // 3. ConnectionRegistry
    // 4. UseCases (AppState)
    // 5. Server
    let clock = Arc::new(SystemClock);
    let repository = Arc::new(InMemoryLobbyRepository::new(clock.clone()));
    let registry = Arc::new(WebSocketConnectionRegistry::new());
    let state = Arc::new(AppState::new(repository, registry, clock, &config));

    let server = Server::new(state, config);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
