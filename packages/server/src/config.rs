//! Server configuration.
//!
//! Every flag can also be set from a `DEAI_*` environment variable.

use std::time::Duration;

use clap::Parser;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Admin token is required (--admin-token or DEAI_ADMIN_TOKEN)")]
    MissingAdminToken,

    #[error("Invalid value for '{name}': must be greater than zero")]
    ZeroDuration { name: &'static str },
}

#[derive(Parser, Debug, Clone)]
#[command(name = "deai-server")]
#[command(about = "Signaling server pairing strangers for one-to-one WebRTC calls", long_about = None)]
pub struct ServerArgs {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "DEAI_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "DEAI_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Bearer token protecting the admin API
    #[arg(long, env = "DEAI_ADMIN_TOKEN", hide_env_values = true)]
    pub admin_token: Option<String>,

    /// Seconds between liveness probes
    #[arg(long, env = "DEAI_HEARTBEAT_INTERVAL_SECS", default_value_t = 30)]
    pub heartbeat_interval_secs: u64,

    /// Seconds between janitor sweeps
    #[arg(long, env = "DEAI_CLEANUP_INTERVAL_SECS", default_value_t = 60)]
    pub cleanup_interval_secs: u64,

    /// Minutes after which an inactive room is swept
    #[arg(long, env = "DEAI_MAX_ROOM_AGE_MINS", default_value_t = 30)]
    pub max_room_age_mins: u64,

    /// Minutes after which a waiting user is dropped from the queue
    #[arg(long, env = "DEAI_MAX_WAIT_MINS", default_value_t = 10)]
    pub max_wait_mins: u64,

    /// Delay applied to each ICE candidate before it is relayed
    #[arg(long, env = "DEAI_CANDIDATE_DELAY_MS", default_value_t = 100)]
    pub candidate_delay_ms: u64,

    /// Default log level when RUST_LOG is unset
    #[arg(long, env = "DEAI_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

/// Validated runtime settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub admin_token: String,
    pub heartbeat_interval: Duration,
    pub cleanup_interval: Duration,
    pub max_room_age: Duration,
    pub max_wait: Duration,
    pub candidate_relay_delay: Duration,
    pub log_level: String,
}

impl ServerConfig {
    /// Settings for in-process servers: loopback, ephemeral port.
    pub fn for_tests(admin_token: &str) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            admin_token: admin_token.to_string(),
            heartbeat_interval: Duration::from_secs(30),
            cleanup_interval: Duration::from_secs(60),
            max_room_age: Duration::from_secs(30 * 60),
            max_wait: Duration::from_secs(10 * 60),
            candidate_relay_delay: Duration::ZERO,
            log_level: "info".to_string(),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn non_zero(name: &'static str, value: Duration) -> Result<Duration, ConfigError> {
    if value.is_zero() {
        return Err(ConfigError::ZeroDuration { name });
    }
    Ok(value)
}

impl TryFrom<ServerArgs> for ServerConfig {
    type Error = ConfigError;

    fn try_from(args: ServerArgs) -> Result<Self, Self::Error> {
        let admin_token = args
            .admin_token
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or(ConfigError::MissingAdminToken)?;

        Ok(Self {
            host: args.host,
            port: args.port,
            admin_token,
            heartbeat_interval: non_zero(
                "heartbeat-interval-secs",
                Duration::from_secs(args.heartbeat_interval_secs),
            )?,
            cleanup_interval: non_zero(
                "cleanup-interval-secs",
                Duration::from_secs(args.cleanup_interval_secs),
            )?,
            max_room_age: non_zero(
                "max-room-age-mins",
                Duration::from_secs(args.max_room_age_mins * 60),
            )?,
            max_wait: non_zero("max-wait-mins", Duration::from_secs(args.max_wait_mins * 60))?,
            // zero is allowed: candidates are relayed immediately
            candidate_relay_delay: Duration::from_millis(args.candidate_delay_ms),
            log_level: args.log_level,
        })
    }
}
