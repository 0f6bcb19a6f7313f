use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingSettings;

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init_logging(settings: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&settings.level)));

    let registry = tracing_subscriber::registry().with(filter);

    match settings.format.as_str() {
        "json" => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        "pretty" => registry.with(tracing_subscriber::fmt::layer().pretty()).init(),
        _ => registry.with(tracing_subscriber::fmt::layer().compact()).init(),
    }

    info!(level = %settings.level, format = %settings.format, "Logging initialized");
}

fn default_directives(level: &str) -> String {
    let level = level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO)
        .to_string()
        .to_lowercase();
    format!("lending_dashboard={},tower_http={}", level, level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_level_falls_back_to_info() {
        assert_eq!(default_directives("chatty"), "lending_dashboard=info,tower_http=info");
        assert_eq!(default_directives("DEBUG"), "lending_dashboard=debug,tower_http=debug");
    }
}
