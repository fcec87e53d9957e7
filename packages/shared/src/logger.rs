//! Logging setup utilities.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// Every crate in `crate_names` gets `default_log_level`; `RUST_LOG` overrides
/// the whole filter when set.
///
/// # Examples
///
/// ```no_run
/// use deai_shared::logger::setup_logger;
///
/// setup_logger(&["deai_server", "tower_http"], "debug");
/// ```
pub fn setup_logger(crate_names: &[&str], default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(crate_names, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn default_filter(crate_names: &[&str], level: &str) -> String {
    crate_names
        .iter()
        .map(|name| format!("{}={}", name.replace('-', "_"), level))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_normalizes_crate_names() {
        // テスト項目: クレート名のハイフンがアンダースコアに変換される
        // given (前提条件):
        let crates = ["deai-server", "tower_http"];

        // when (操作):
        let filter = default_filter(&crates, "debug");

        // then (期待する結果):
        assert_eq!(filter, "deai_server=debug,tower_http=debug");
    }
}
